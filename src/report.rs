use std::{collections::HashMap, fmt::Write};

use crate::models::{MajorSummary, Student};
use crate::query::{self, StudentFilter};

pub fn summarize_by_major(students: &[Student]) -> Vec<MajorSummary> {
    let mut map: HashMap<&str, (usize, f64, f64)> = HashMap::new();

    for student in students {
        let entry = map.entry(student.major.as_str()).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += student.gpa;
        entry.2 += student.composite_score;
    }

    let mut summaries: Vec<MajorSummary> = map
        .into_iter()
        .map(|(major, (count, total_gpa, total_score))| MajorSummary {
            major: major.to_string(),
            count,
            avg_gpa: total_gpa / count as f64,
            avg_composite_score: total_score / count as f64,
        })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.major.cmp(&b.major)));
    summaries
}

fn describe_filter(filter: &StudentFilter) -> String {
    match (filter.major.as_deref(), filter.min_gpa) {
        (None, None) => "all majors".to_string(),
        (Some(major), None) => major.to_string(),
        (None, Some(min_gpa)) => format!("all majors, GPA {min_gpa:.2}+"),
        (Some(major), Some(min_gpa)) => format!("{major}, GPA {min_gpa:.2}+"),
    }
}

pub fn build_report(filter: &StudentFilter, students: &[Student], limit: usize) -> String {
    let ranked = query::rank_students(students, filter);
    let summaries = summarize_by_major(&ranked);

    let mut output = String::new();

    let _ = writeln!(output, "# Signl Candidate Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} of {} students)",
        describe_filter(filter),
        ranked.len(),
        students.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Major Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No students match these filters.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} students (avg GPA {:.2}, avg score {:.1})",
                summary.major, summary.count, summary.avg_gpa, summary.avg_composite_score
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Ranked Students");

    if ranked.is_empty() {
        let _ = writeln!(output, "No students match these filters.");
    } else {
        for (position, student) in ranked.iter().take(limit).enumerate() {
            let _ = writeln!(
                output,
                "{}. {} ({}, GPA {:.2}) score {:.1} (peer {:.1}, experience {:.1})",
                position + 1,
                student.name,
                student.major,
                student.gpa,
                student.composite_score,
                student.peer_score,
                student.experience_score
            );
        }
    }

    output
}
