//! Per-request view model for the dashboard: the loaded students plus whatever filters the
//! browser sent. Rendering functions take this instead of reaching for shared state.

use crate::data::student::{Gender, Student};
use serde::Deserialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StudentFilters {
    pub search: String,
    pub gender: String,
    pub program: String,
    pub year: String,
}

impl StudentFilters {
    pub fn matches(&self, student: &Student) -> bool {
        let search = self.search.trim().to_lowercase();
        let gender = self.gender.trim();
        let program = self.program.trim();
        let year = self.year.trim();

        (search.is_empty() || student.full_name.to_lowercase().contains(&search))
            && (gender.is_empty() || student.gender.as_str() == gender)
            && (program.is_empty() || student.program == program)
            && (year.is_empty() || student.year_level.to_string() == year)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudentStats {
    pub total: usize,
    pub male: usize,
    pub female: usize,
    pub other: usize,
    pub programs: usize,
}

#[derive(Debug, Clone)]
pub struct StudentsView {
    students: Vec<Student>,
    filters: StudentFilters,
}

impl StudentsView {
    pub const fn new(students: Vec<Student>, filters: StudentFilters) -> Self {
        Self { students, filters }
    }

    pub const fn filters(&self) -> &StudentFilters {
        &self.filters
    }

    pub fn filtered(&self) -> Vec<&Student> {
        self.students
            .iter()
            .filter(|student| self.filters.matches(student))
            .collect()
    }

    ///counts cover every student, not just the filtered ones
    pub fn stats(&self) -> StudentStats {
        let count = |gender: Gender| self.students.iter().filter(|s| s.gender == gender).count();

        StudentStats {
            total: self.students.len(),
            male: count(Gender::Male),
            female: count(Gender::Female),
            other: count(Gender::Other),
            programs: self.programs().len(),
        }
    }

    pub fn programs(&self) -> Vec<&str> {
        self.students
            .iter()
            .map(|s| s.program.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
