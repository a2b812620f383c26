use std::{collections::HashSet, io::Read, path::Path, sync::Arc};

use anyhow::{bail, Context};

use crate::models::Student;

/// Immutable roster shared by every request.
#[derive(Debug, Clone)]
pub struct StudentSnapshot {
    students: Arc<[Student]>,
}

impl StudentSnapshot {
    pub fn new(students: Vec<Student>) -> anyhow::Result<Self> {
        let mut seen = HashSet::new();

        for student in &students {
            if !seen.insert(student.id) {
                bail!("duplicate student id {}", student.id);
            }
            validate(student)?;
        }

        Ok(Self {
            students: students.into(),
        })
    }

    pub fn as_slice(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

fn validate(student: &Student) -> anyhow::Result<()> {
    let scores = [
        ("gpa", student.gpa),
        ("peer_score", student.peer_score),
        ("experience_score", student.experience_score),
        ("composite_score", student.composite_score),
    ];

    for (field, value) in scores {
        if !value.is_finite() {
            bail!("student {} has non-finite {field}", student.id);
        }
    }

    if !(0.0..=4.0).contains(&student.gpa) {
        bail!(
            "student {} has gpa {} outside 0.0..=4.0",
            student.id,
            student.gpa
        );
    }

    Ok(())
}

pub fn demo_roster() -> Vec<Student> {
    let rows = [
        (1, "Maya Chen", "Computer Science", 3.92, 94.0, 81.0, 91.4),
        (2, "Jordan Brooks", "Marketing", 3.41, 88.0, 72.0, 82.6),
        (3, "Priya Raman", "Finance", 3.77, 79.0, 85.0, 84.1),
        (4, "Diego Alvarez", "Computer Science", 3.55, 83.0, 90.0, 86.3),
        (5, "Hannah Okafor", "Mechanical Engineering", 3.68, 76.0, 78.0, 78.9),
        (6, "Liam Foster", "Finance", 3.12, 70.0, 66.0, 69.5),
        (7, "Sofia Rossi", "Marketing", 3.86, 91.0, 64.0, 80.2),
        (8, "Ethan Park", "Computer Science", 3.24, 68.0, 74.0, 71.8),
        (9, "Amara Nwosu", "Economics", 3.95, 86.0, 80.0, 88.7),
        (10, "Noah Bennett", "Finance", 3.58, 81.0, 77.0, 80.2),
    ];

    rows.into_iter()
        .map(
            |(id, name, major, gpa, peer_score, experience_score, composite_score)| Student {
                id,
                name: name.to_string(),
                major: major.to_string(),
                gpa,
                peer_score,
                experience_score,
                composite_score,
            },
        )
        .collect()
}

pub fn read_students_csv<R: Read>(reader: R) -> anyhow::Result<Vec<Student>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        id: u32,
        name: String,
        major: String,
        gpa: f64,
        peer_score: f64,
        experience_score: f64,
        composite_score: f64,
    }

    let mut reader = csv::Reader::from_reader(reader);
    let mut students = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid student row {}", index + 1))?;
        students.push(Student {
            id: row.id,
            name: row.name,
            major: row.major,
            gpa: row.gpa,
            peer_score: row.peer_score,
            experience_score: row.experience_score,
            composite_score: row.composite_score,
        });
    }

    Ok(students)
}

pub fn load_students_csv(path: &Path) -> anyhow::Result<Vec<Student>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open roster {}", path.display()))?;
    read_students_csv(file).with_context(|| format!("failed to read roster {}", path.display()))
}

/// Builds the roster from a fixture when one is given, otherwise the demo seed.
pub fn load_snapshot(path: Option<&Path>) -> anyhow::Result<StudentSnapshot> {
    let students = match path {
        Some(path) => load_students_csv(path)?,
        None => demo_roster(),
    };

    StudentSnapshot::new(students)
}
