use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod db;
mod error;
mod models;
mod query;
mod report;
mod routes;
mod seed;
mod server;
mod state;
mod survey;

use config::Config;
use query::StudentFilter;
use state::AppState;
use survey::{MemorySurveyStore, PgSurveyStore, SurveyStore};

#[derive(Parser)]
#[command(name = "signl")]
#[command(about = "Signl peer-validated recruiting demo backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the demo API
    Serve {
        #[arg(long)]
        port: Option<u16>,
        /// Roster CSV fixture; defaults to the built-in demo roster
        #[arg(long)]
        students: Option<PathBuf>,
    },
    /// Create or upgrade the survey schema
    InitDb,
    /// Print the ranked roster
    Rank {
        #[arg(long)]
        major: Option<String>,
        #[arg(long, value_parser = parse_min_gpa_arg)]
        min_gpa: Option<f64>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        students: Option<PathBuf>,
    },
    /// Generate a markdown roster report
    Report {
        #[arg(long)]
        major: Option<String>,
        #[arg(long, value_parser = parse_min_gpa_arg)]
        min_gpa: Option<f64>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        students: Option<PathBuf>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn parse_min_gpa_arg(raw: &str) -> Result<f64, String> {
    routes::parse_min_gpa(raw).ok_or_else(|| format!("'{raw}' is not a finite number"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Serve { port, students } => {
            let roster = students.or_else(|| config.students_csv.clone());
            let snapshot = seed::load_snapshot(roster.as_deref())?;
            if snapshot.is_empty() {
                warn!("Roster is empty, /api/admin/students will return no rows");
            }
            info!("Loaded {} students", snapshot.len());

            let surveys: Arc<dyn SurveyStore> = match config.database_url.as_deref() {
                Some(url) => {
                    let pool = db::connect(url).await?;
                    info!("Saving surveys to Postgres");
                    Arc::new(PgSurveyStore::new(pool))
                }
                None => {
                    warn!("DATABASE_URL not set, surveys are kept in memory only");
                    Arc::new(MemorySurveyStore::new())
                }
            };

            let state = AppState::new(snapshot, surveys, config.strict_params);
            server::start_server(port.unwrap_or(config.port), state).await?;
        }
        Commands::InitDb => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set to a Postgres instance")?;
            let pool = db::connect(url).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Rank {
            major,
            min_gpa,
            limit,
            students,
        } => {
            let roster = students.or_else(|| config.students_csv.clone());
            let snapshot = seed::load_snapshot(roster.as_deref())?;
            let filter = StudentFilter::new(major, min_gpa);
            let ranked = query::rank_students(snapshot.as_slice(), &filter);

            if ranked.is_empty() {
                println!("No students match these filters.");
                return Ok(());
            }

            println!("Top students by composite score:");
            for student in ranked.iter().take(limit) {
                println!(
                    "- {} ({}, GPA {:.2}) score {:.1}",
                    student.name, student.major, student.gpa, student.composite_score
                );
            }
        }
        Commands::Report {
            major,
            min_gpa,
            limit,
            students,
            out,
        } => {
            let roster = students.or_else(|| config.students_csv.clone());
            let snapshot = seed::load_snapshot(roster.as_deref())?;
            let filter = StudentFilter::new(major, min_gpa);
            let report = report::build_report(&filter, snapshot.as_slice(), limit);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_gpa_flag_rejects_non_finite_values() {
        for value in ["NaN", "inf", "abc"] {
            assert!(Cli::try_parse_from(["signl", "rank", "--min-gpa", value]).is_err());
        }
    }

    #[test]
    fn min_gpa_flag_accepts_numbers() {
        let cli = Cli::try_parse_from(["signl", "report", "--min-gpa", "3.5"]).unwrap();
        match cli.command {
            Commands::Report { min_gpa, .. } => assert_eq!(min_gpa, Some(3.5)),
            _ => panic!("expected report command"),
        }
    }
}
