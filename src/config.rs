use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::anyhow;
use tracing::info;

pub struct Config {
    pub port: u16,
    pub database_url: Option<String>,
    pub students_csv: Option<PathBuf>,
    pub strict_params: bool,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: try_load(&lookup, "SIGNL_PORT", "3000")?,
            database_url: optional(&lookup, "DATABASE_URL"),
            students_csv: optional(&lookup, "SIGNL_STUDENTS_CSV").map(PathBuf::from),
            strict_params: try_load(&lookup, "SIGNL_STRICT_PARAMS", "false")?,
        })
    }
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).filter(|v| !v.trim().is_empty());
    if value.is_none() {
        info!("{key} not set");
    }
    value
}

fn try_load<F, T>(lookup: &F, key: &str, default: &str) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .trim()
        .parse()
        .map_err(|e| anyhow!("invalid {key} value: {e}"))
}
