use jiff::Timestamp;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Self; 3] = [Self::Male, Self::Female, Self::Other];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownGender;

impl FromStr for Gender {
    type Err = UnknownGender;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|gender| gender.as_str() == s)
            .ok_or(UnknownGender)
    }
}

/// A persisted student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub student_id: String,
    pub full_name: String,
    pub gender: Gender,
    pub email: String,
    pub program: String,
    pub year_level: u8,
    pub university: String,
    pub created_at: Timestamp,
}

/// The user-editable part of a student, after it has passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub student_id: String,
    pub full_name: String,
    pub gender: Gender,
    pub email: String,
    pub program: String,
    pub year_level: u8,
    pub university: String,
}

impl Student {
    pub fn from_new(new: NewStudent, id: Uuid, created_at: Timestamp) -> Self {
        let NewStudent {
            student_id,
            full_name,
            gender,
            email,
            program,
            year_level,
            university,
        } = new;

        Self {
            id,
            student_id,
            full_name,
            gender,
            email,
            program,
            year_level,
            university,
            created_at,
        }
    }

    ///`id` and `created_at` are untouched
    pub fn apply(&mut self, new: NewStudent) {
        let NewStudent {
            student_id,
            full_name,
            gender,
            email,
            program,
            year_level,
            university,
        } = new;

        self.student_id = student_id;
        self.full_name = full_name;
        self.gender = gender;
        self.email = email;
        self.program = program;
        self.year_level = year_level;
        self.university = university;
    }

    pub fn to_draft(&self) -> StudentDraft {
        StudentDraft {
            student_id: Some(self.student_id.as_str().into()),
            full_name: Some(self.full_name.as_str().into()),
            gender: Some(self.gender.as_str().into()),
            email: Some(self.email.as_str().into()),
            program: Some(self.program.as_str().into()),
            year_level: Some(YearLevelInput::Number(i64::from(self.year_level))),
            university: Some(self.university.as_str().into()),
        }
    }
}

/// A free-text field as submitted. Values of any other JSON type are kept as `Mistyped` so
/// validation can reject them per field instead of the whole body failing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    Text(String),
    Mistyped(Value),
}

impl TextInput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Mistyped(_) => None,
        }
    }
}

impl From<String> for TextInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for TextInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

///`None` when missing or not a string
pub fn text_of(input: Option<&TextInput>) -> Option<&str> {
    input.and_then(TextInput::as_text)
}

/// Year levels arrive as JSON numbers from the API and as text from HTML forms and CSVs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearLevelInput {
    Number(i64),
    Fractional(f64),
    Text(String),
    Mistyped(Value),
}

impl Display for YearLevelInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Fractional(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Mistyped(v) => write!(f, "{v}"),
        }
    }
}

/// An unvalidated candidate student, as submitted by a client.
///
/// Used both for creation and as an update patch: on update, fields left as `None` keep the
/// stored value. Only these fields are read, so unknown keys in a payload never reach the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    pub student_id: Option<TextInput>,
    pub full_name: Option<TextInput>,
    pub gender: Option<TextInput>,
    pub email: Option<TextInput>,
    pub program: Option<TextInput>,
    pub year_level: Option<YearLevelInput>,
    pub university: Option<TextInput>,
}

const FIRST_NAMES: &[&str] = &[
    "John", "Jane", "Alex", "Emma", "Michael", "Sarah", "David", "Lisa", "Chris", "Amy",
];
const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Brown", "Davis", "Wilson", "Garcia", "Martinez", "Lee", "Taylor",
    "Anderson",
];
const PROGRAMS: &[&str] = &[
    "Computer Science",
    "Engineering",
    "Business Administration",
    "Psychology",
    "Biology",
    "Mathematics",
];
const UNIVERSITIES: &[&str] = &[
    "University of Example",
    "Tech Institute",
    "State University",
    "College of Science",
];

impl StudentDraft {
    /// Field-by-field merge: every field present in `patch` wins.
    #[must_use]
    pub fn overlay(self, patch: Self) -> Self {
        Self {
            student_id: patch.student_id.or(self.student_id),
            full_name: patch.full_name.or(self.full_name),
            gender: patch.gender.or(self.gender),
            email: patch.email.or(self.email),
            program: patch.program.or(self.program),
            year_level: patch.year_level.or(self.year_level),
            university: patch.university.or(self.university),
        }
    }

    pub fn random(rng: &mut impl Rng, email_domain: &str) -> Self {
        fn pick<'a>(rng: &mut impl Rng, items: &[&'a str]) -> &'a str {
            items[rng.random_range(0..items.len())]
        }

        Self {
            student_id: Some(format!("S{}", rng.random_range(10_000..=99_999)).into()),
            full_name: Some(
                format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES)).into(),
            ),
            gender: Some(Gender::ALL[rng.random_range(0..Gender::ALL.len())].as_str().into()),
            email: Some(
                format!("student{}@{email_domain}", rng.random_range(100..=999)).into(),
            ),
            program: Some(pick(rng, PROGRAMS).into()),
            year_level: Some(YearLevelInput::Number(rng.random_range(1..=5))),
            university: Some(pick(rng, UNIVERSITIES).into()),
        }
    }
}
