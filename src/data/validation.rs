//! The one rule set every caller uses to accept or reject a student.
//!
//! The JSON API, the HTML form and the CSV import all go through [`Validator`], so a record that
//! one of them accepts is accepted by all of them.

use crate::data::student::{Gender, NewStudent, StudentDraft, YearLevelInput, text_of};
use email_address::EmailAddress;
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    str::FromStr,
};

pub const STUDENT_ID_LENGTH: (usize, usize) = (5, 15);
pub const NAME_LENGTH: (usize, usize) = (2, 100);
pub const PROGRAM_LENGTH: (usize, usize) = (2, 100);
pub const UNIVERSITY_LENGTH: (usize, usize) = (2, 200);
pub const YEAR_LEVELS: (u8, u8) = (1, 5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StudentField {
    StudentId,
    FullName,
    Gender,
    Email,
    Program,
    YearLevel,
    University,
}

/// Field-level validation messages, ordered by field. Empty means the candidate is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<StudentField, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: StudentField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    #[cfg(test)]
    pub fn contains(&self, field: StudentField) -> bool {
        self.0.contains_key(&field)
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = (StudentField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    pub fn insert(&mut self, field: StudentField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn messages(&self) -> impl Iterator<Item = String> + '_ {
        self.0.values().cloned()
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, message) in self.0.values().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            f.write_str(message)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    required_email_domain: Option<String>,
}

impl Validator {
    /// `required_email_domain` is deployment policy (eg. `gmail.com`); `None` accepts any domain.
    pub fn new(required_email_domain: Option<String>) -> Self {
        let required_email_domain = required_email_domain
            .map(|domain| domain.trim().trim_start_matches('@').to_lowercase())
            .filter(|domain| !domain.is_empty());
        Self {
            required_email_domain,
        }
    }

    pub fn required_email_domain(&self) -> Option<&str> {
        self.required_email_domain.as_deref()
    }

    pub fn validate(&self, candidate: &StudentDraft) -> FieldErrors {
        self.check(candidate).err().unwrap_or_default()
    }

    /// Validates and, on success, hands back the trimmed, typed student.
    pub fn check(&self, candidate: &StudentDraft) -> Result<NewStudent, FieldErrors> {
        fn record<T>(
            errors: &mut FieldErrors,
            field: StudentField,
            result: Result<T, String>,
        ) -> Option<T> {
            result.map_err(|message| errors.insert(field, message)).ok()
        }

        let mut errors = FieldErrors::default();
        let student_id = record(
            &mut errors,
            StudentField::StudentId,
            check_student_id(text_of(candidate.student_id.as_ref())),
        );
        let full_name = record(
            &mut errors,
            StudentField::FullName,
            check_text("fullName", text_of(candidate.full_name.as_ref()), NAME_LENGTH),
        );
        let gender = record(
            &mut errors,
            StudentField::Gender,
            check_gender(text_of(candidate.gender.as_ref())),
        );
        let email = record(
            &mut errors,
            StudentField::Email,
            self.check_email(text_of(candidate.email.as_ref())),
        );
        let program = record(
            &mut errors,
            StudentField::Program,
            check_text("program", text_of(candidate.program.as_ref()), PROGRAM_LENGTH),
        );
        let year_level = record(
            &mut errors,
            StudentField::YearLevel,
            check_year_level(candidate.year_level.as_ref()),
        );
        let university = record(
            &mut errors,
            StudentField::University,
            check_text(
                "university",
                text_of(candidate.university.as_ref()),
                UNIVERSITY_LENGTH,
            ),
        );

        match (
            student_id, full_name, gender, email, program, year_level, university,
        ) {
            (
                Some(student_id),
                Some(full_name),
                Some(gender),
                Some(email),
                Some(program),
                Some(year_level),
                Some(university),
            ) => Ok(NewStudent {
                student_id,
                full_name,
                gender,
                email,
                program,
                year_level,
                university,
            }),
            _ => Err(errors),
        }
    }

    fn check_email(&self, email: Option<&str>) -> Result<String, String> {
        const MESSAGE: &str = "email is required and must be a valid email address";

        let email = email.map(str::trim).ok_or(MESSAGE)?;
        if email.chars().any(char::is_whitespace) {
            return Err(MESSAGE.into());
        }
        let parsed = EmailAddress::from_str(email).map_err(|_| MESSAGE)?;

        //named host with a top-level domain, so no `[127.0.0.1]` literals or bare hosts
        let domain = parsed.domain().to_lowercase();
        let labels: Vec<&str> = domain.split('.').collect();
        let has_tld = labels.len() >= 2
            && labels.iter().all(|l| !l.is_empty())
            && labels
                .last()
                .is_some_and(|tld| tld.chars().all(|c| c.is_ascii_alphabetic()));
        if !has_tld {
            return Err(MESSAGE.into());
        }

        if let Some(required) = &self.required_email_domain {
            if &domain != required {
                return Err(format!("email must be an address at {required}"));
            }
        }

        Ok(email.to_string())
    }
}

fn check_student_id(student_id: Option<&str>) -> Result<String, String> {
    let (min, max) = STUDENT_ID_LENGTH;
    let message = || format!("studentId is required, alphanumeric, {min}-{max} chars");

    let student_id = student_id.map(str::trim).ok_or_else(message)?;
    let len = student_id.chars().count();
    if len < min || len > max || !student_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(message());
    }
    Ok(student_id.to_string())
}

fn check_text(
    name: &str,
    value: Option<&str>,
    (min, max): (usize, usize),
) -> Result<String, String> {
    let message = || format!("{name} is required, {min}-{max} chars");

    let value = value.map(str::trim).ok_or_else(message)?;
    let len = value.chars().count();
    if len < min || len > max {
        return Err(message());
    }
    Ok(value.to_string())
}

fn check_gender(gender: Option<&str>) -> Result<Gender, String> {
    gender
        .map(str::trim)
        .and_then(|gender| gender.parse().ok())
        .ok_or_else(|| "gender is required and must be Male/Female/Other".to_string())
}

fn check_year_level(year_level: Option<&YearLevelInput>) -> Result<u8, String> {
    let (min, max) = YEAR_LEVELS;
    let message =
        || format!("yearLevel is required and must be a whole number between {min} and {max}");

    let as_integer = match year_level.ok_or_else(message)? {
        YearLevelInput::Number(n) => Some(*n),
        #[allow(clippy::cast_possible_truncation)]
        YearLevelInput::Fractional(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
        YearLevelInput::Fractional(_) | YearLevelInput::Mistyped(_) => None,
        YearLevelInput::Text(s) => s.trim().parse::<i64>().ok(),
    };

    as_integer
        .and_then(|n| u8::try_from(n).ok())
        .filter(|n| (min..=max).contains(n))
        .ok_or_else(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::student::TextInput;

    fn jane() -> StudentDraft {
        StudentDraft {
            student_id: Some("ABC12345".into()),
            full_name: Some("Jane Doe".into()),
            gender: Some("Female".into()),
            email: Some("jane@example.com".into()),
            program: Some("CS".into()),
            year_level: Some(YearLevelInput::Number(2)),
            university: Some("State U".into()),
        }
    }

    #[test]
    fn valid_candidate_has_no_errors() {
        let validator = Validator::default();
        assert!(validator.validate(&jane()).is_empty());

        let new = validator.check(&jane()).unwrap();
        assert_eq!(new.gender, Gender::Female);
        assert_eq!(new.year_level, 2);
    }

    #[test]
    fn empty_candidate_reports_every_field_in_order() {
        let errors = Validator::default().validate(&StudentDraft::default());
        let fields: Vec<_> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(
            fields,
            vec![
                StudentField::StudentId,
                StudentField::FullName,
                StudentField::Gender,
                StudentField::Email,
                StudentField::Program,
                StudentField::YearLevel,
                StudentField::University,
            ]
        );
    }

    #[test]
    fn only_violated_fields_are_reported() {
        let mut candidate = jane();
        candidate.full_name = Some(" J ".into());
        candidate.year_level = Some(YearLevelInput::Number(6));

        let errors = Validator::default().validate(&candidate);
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(StudentField::FullName));
        assert!(errors.contains(StudentField::YearLevel));
    }

    #[test]
    fn student_id_must_be_alphanumeric_and_bounded() {
        let validator = Validator::default();
        for bad in ["ABCD", "ABC-12345", "A234567890123456", ""] {
            let mut candidate = jane();
            candidate.student_id = Some(bad.into());
            assert!(
                validator.validate(&candidate).contains(StudentField::StudentId),
                "{bad:?} should be rejected"
            );
        }

        let mut candidate = jane();
        candidate.student_id = Some("A2345".into());
        assert!(validator.validate(&candidate).is_empty());
    }

    #[test]
    fn text_lengths_count_trimmed_characters() {
        let validator = Validator::default();

        let mut candidate = jane();
        candidate.university = Some(format!("  {}  ", "é".repeat(200)).into());
        assert!(validator.validate(&candidate).is_empty());

        candidate.university = Some("é".repeat(201).into());
        assert!(validator.validate(&candidate).contains(StudentField::University));

        let mut candidate = jane();
        candidate.program = Some("   ".into());
        assert!(validator.validate(&candidate).contains(StudentField::Program));
    }

    #[test]
    fn check_trims_accepted_values() {
        let mut candidate = jane();
        candidate.full_name = Some("  Jane Doe ".into());
        candidate.email = Some(" jane@example.com".into());

        let new = Validator::default().check(&candidate).unwrap();
        assert_eq!(new.full_name, "Jane Doe");
        assert_eq!(new.email, "jane@example.com");
    }

    #[test]
    fn gender_must_be_in_the_closed_set() {
        let mut candidate = jane();
        candidate.gender = Some("Unknown".into());
        assert!(Validator::default().validate(&candidate).contains(StudentField::Gender));
    }

    #[test]
    fn email_needs_a_dotted_domain() {
        let validator = Validator::default();
        for bad in [
            "jane",
            "jane@",
            "jane@localhost",
            "jane doe@example.com",
            "@example.com",
            "jane@[127.0.0.1]",
            "jane@example.123",
        ] {
            let mut candidate = jane();
            candidate.email = Some(bad.into());
            assert!(
                validator.validate(&candidate).contains(StudentField::Email),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn values_of_the_wrong_type_fail_their_own_field() {
        let mut candidate = jane();
        candidate.full_name = Some(TextInput::Mistyped(12.into()));
        candidate.year_level = Some(YearLevelInput::Mistyped(true.into()));

        let errors = Validator::default().validate(&candidate);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.get(StudentField::FullName),
            Some("fullName is required, 2-100 chars")
        );
        assert_eq!(
            errors.get(StudentField::YearLevel),
            Some("yearLevel is required and must be a whole number between 1 and 5")
        );
    }

    #[test]
    fn email_domain_policy_is_applied_when_configured() {
        let validator = Validator::new(Some("@Gmail.com".into()));
        assert_eq!(validator.required_email_domain(), Some("gmail.com"));

        let errors = validator.validate(&jane());
        assert_eq!(
            errors.get(StudentField::Email),
            Some("email must be an address at gmail.com")
        );

        let mut candidate = jane();
        candidate.email = Some("jane@GMAIL.com".into());
        assert!(validator.validate(&candidate).is_empty());
    }

    #[test]
    fn year_level_accepts_numbers_and_numeric_text_in_range() {
        let validator = Validator::default();
        let cases = [
            (YearLevelInput::Number(1), true),
            (YearLevelInput::Number(5), true),
            (YearLevelInput::Number(0), false),
            (YearLevelInput::Number(6), false),
            (YearLevelInput::Fractional(3.0), true),
            (YearLevelInput::Fractional(2.5), false),
            (YearLevelInput::Text(" 4 ".into()), true),
            (YearLevelInput::Text("four".into()), false),
            (YearLevelInput::Text(String::new()), false),
        ];

        for (input, ok) in cases {
            let mut candidate = jane();
            candidate.year_level = Some(input.clone());
            assert_eq!(validator.validate(&candidate).is_empty(), ok, "{input:?}");
        }
    }

    #[test]
    fn display_joins_messages() {
        let mut errors = FieldErrors::default();
        errors.insert(StudentField::Program, "b");
        errors.insert(StudentField::StudentId, "a");
        assert_eq!(errors.to_string(), "a; b");
    }
}
