use std::cmp::Ordering;

use crate::models::Student;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentFilter {
    pub major: Option<String>,
    pub min_gpa: Option<f64>,
}

impl StudentFilter {
    pub fn new(major: Option<String>, min_gpa: Option<f64>) -> Self {
        Self {
            major: major.filter(|value| !value.is_empty()),
            min_gpa,
        }
    }

    pub fn matches(&self, student: &Student) -> bool {
        let major_ok = self
            .major
            .as_deref()
            .map_or(true, |major| student.major == major);
        let gpa_ok = self.min_gpa.map_or(true, |min| student.gpa >= min);

        major_ok && gpa_ok
    }

    pub fn is_empty(&self) -> bool {
        self.major.is_none() && self.min_gpa.is_none()
    }
}

/// Major match is case-sensitive; ties on composite score go to the lower id.
pub fn rank_students(students: &[Student], filter: &StudentFilter) -> Vec<Student> {
    let mut ranked: Vec<Student> = students
        .iter()
        .filter(|student| filter.matches(student))
        .cloned()
        .collect();

    ranked.sort_by(compare_rank);
    ranked
}

pub fn compare_rank(a: &Student, b: &Student) -> Ordering {
    b.composite_score
        .total_cmp(&a.composite_score)
        .then_with(|| a.id.cmp(&b.id))
}
