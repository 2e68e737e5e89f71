//! Whole-file JSON persistence for students.
//!
//! Every mutation reads the full array, changes it in memory, and writes it all back. Mutations
//! are serialised by one process-wide lock, so concurrent writers never drop each other's
//! changes. Writes land in a sibling temp file which is then renamed over the data file, so
//! readers (which don't take the lock) see either the old array or the new one.

use crate::{
    data::{
        student::{NewStudent, Student, StudentDraft},
        validation::Validator,
    },
    error::{
        CreateDataDirSnafu, DuplicateStudentIdSnafu, ImportRejectedSnafu, MissingStudentSnafu,
        ParseStoreSnafu, ReadStoreSnafu, RollcallResult, SerialiseStoreSnafu,
        ValidationFailedSnafu, WriteStoreSnafu,
    },
};
use jiff::Timestamp;
use snafu::{OptionExt, ResultExt, ensure};
use std::{
    collections::HashSet,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::Mutex};
use uuid::Uuid;

#[derive(Debug)]
pub struct StudentStore {
    path: PathBuf,
    validator: Validator,
    write_lock: Mutex<()>,
}

impl StudentStore {
    pub fn new(path: impl Into<PathBuf>, validator: Validator) -> Self {
        Self {
            path: path.into(),
            validator,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn validator(&self) -> &Validator {
        &self.validator
    }

    /// All students in insertion order. A store that has never been written is empty.
    pub async fn list(&self) -> RollcallResult<Vec<Student>> {
        self.load().await
    }

    pub async fn get(&self, id: Uuid) -> RollcallResult<Student> {
        self.load()
            .await?
            .into_iter()
            .find(|student| student.id == id)
            .context(MissingStudentSnafu { id })
    }

    pub async fn create(&self, draft: &StudentDraft) -> RollcallResult<Student> {
        let new = self.check(draft)?;

        let _guard = self.write_lock.lock().await;
        let mut students = self.load().await?;
        ensure_unique(&students, &new, None)?;

        let student = Student::from_new(new, Uuid::new_v4(), Timestamp::now());
        students.push(student.clone());
        self.persist(&students).await?;

        info!(id = %student.id, student_id = %student.student_id, "Created student");
        Ok(student)
    }

    /// Merges `patch` over the stored record, then validates the merged result as a whole.
    pub async fn update(&self, id: Uuid, patch: StudentDraft) -> RollcallResult<Student> {
        let _guard = self.write_lock.lock().await;
        let mut students = self.load().await?;
        let index = students
            .iter()
            .position(|student| student.id == id)
            .context(MissingStudentSnafu { id })?;

        let candidate = students[index].to_draft().overlay(patch);
        let new = self.check(&candidate)?;
        ensure_unique(&students, &new, Some(id))?;

        let student = &mut students[index];
        student.apply(new);
        let updated = student.clone();
        self.persist(&students).await?;

        info!(%id, student_id = %updated.student_id, "Updated student");
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> RollcallResult<Student> {
        let _guard = self.write_lock.lock().await;
        let mut students = self.load().await?;
        let index = students
            .iter()
            .position(|student| student.id == id)
            .context(MissingStudentSnafu { id })?;

        let removed = students.remove(index);
        self.persist(&students).await?;

        info!(%id, student_id = %removed.student_id, "Deleted student");
        Ok(removed)
    }

    /// Adds every draft or none of them.
    ///
    /// Problems are reported per row (1-based, in `drafts` order), covering validation failures
    /// and `studentId` clashes with the store or with earlier rows.
    pub async fn create_many(&self, drafts: &[StudentDraft]) -> RollcallResult<Vec<Student>> {
        let _guard = self.write_lock.lock().await;
        let mut students = self.load().await?;

        let mut seen: HashSet<String> = students.iter().map(|s| s.student_id.clone()).collect();
        let mut problems = vec![];
        let mut accepted = vec![];
        for (i, draft) in drafts.iter().enumerate() {
            let row = i + 1;
            match self.validator.check(draft) {
                Err(errors) => problems.push(format!("Row {row}: {errors}")),
                Ok(new) if !seen.insert(new.student_id.clone()) => problems.push(format!(
                    "Row {row}: studentId {:?} must be unique",
                    new.student_id
                )),
                Ok(new) => accepted.push(new),
            }
        }
        ensure!(problems.is_empty(), ImportRejectedSnafu { problems });

        let created_at = Timestamp::now();
        let created: Vec<Student> = accepted
            .into_iter()
            .map(|new| Student::from_new(new, Uuid::new_v4(), created_at))
            .collect();
        students.extend(created.iter().cloned());
        self.persist(&students).await?;

        info!(count = created.len(), "Imported students");
        Ok(created)
    }

    fn check(&self, draft: &StudentDraft) -> RollcallResult<NewStudent> {
        self.validator
            .check(draft)
            .map_err(|errors| ValidationFailedSnafu { errors }.build())
    }

    async fn load(&self) -> RollcallResult<Vec<Student>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e).context(ReadStoreSnafu { path: &self.path }),
        };

        if raw.trim().is_empty() {
            return Ok(vec![]);
        }
        serde_json::from_str(&raw).context(ParseStoreSnafu { path: &self.path })
    }

    async fn persist(&self, students: &[Student]) -> RollcallResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .context(CreateDataDirSnafu { path: parent })?;
        }

        let serialised = serde_json::to_string_pretty(students).context(SerialiseStoreSnafu)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, serialised)
            .await
            .context(WriteStoreSnafu { path: &temp_path })?;
        fs::rename(&temp_path, &self.path)
            .await
            .context(WriteStoreSnafu { path: &self.path })?;

        debug!(count = students.len(), path = ?self.path, "Persisted students");
        Ok(())
    }
}

fn ensure_unique(
    students: &[Student],
    new: &NewStudent,
    except: Option<Uuid>,
) -> RollcallResult<()> {
    let clash = students
        .iter()
        .any(|s| Some(s.id) != except && s.student_id == new.student_id);
    ensure!(
        !clash,
        DuplicateStudentIdSnafu {
            student_id: &new.student_id
        }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{student::YearLevelInput, validation::StudentField},
        error::RollcallError,
    };
    use std::sync::Arc;
    use tempfile::TempDir;

    fn draft(student_id: &str) -> StudentDraft {
        StudentDraft {
            student_id: Some(student_id.into()),
            full_name: Some("Jane Doe".into()),
            gender: Some("Female".into()),
            email: Some("jane@example.com".into()),
            program: Some("CS".into()),
            year_level: Some(YearLevelInput::Number(2)),
            university: Some("State U".into()),
        }
    }

    fn store_in(dir: &TempDir) -> StudentStore {
        StudentStore::new(dir.path().join("data").join("students.json"), Validator::default())
    }

    #[tokio::test]
    async fn list_without_backing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.list().await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn blank_backing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("students.json");
        std::fs::write(&path, "  \n").unwrap();

        let store = StudentStore::new(path, Validator::default());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_backing_file_is_a_server_fault() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("students.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = StudentStore::new(path, Validator::default());
        let err = store.list().await.unwrap_err();
        assert!(matches!(err, RollcallError::ParseStore { .. }));
        assert!(err.status_code().is_server_error());
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamp_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let before = Timestamp::now();
        let created = store.create(&draft("ABC12345")).await.unwrap();
        assert_ne!(created.id, Uuid::nil());
        assert!(created.created_at >= before);
        assert_eq!(created.student_id, "ABC12345");
        assert_eq!(created.year_level, 2);

        assert_eq!(store.list().await.unwrap(), vec![created.clone()]);
        assert_eq!(store.get(created.id).await.unwrap(), created);

        let on_disk: Vec<Student> =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(on_disk, vec![created]);
    }

    #[tokio::test]
    async fn create_rejects_invalid_payload_without_writing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut bad = draft("ABC12345");
        bad.gender = None;
        let err = store.create(&bad).await.unwrap_err();
        let RollcallError::ValidationFailed { errors } = err else {
            panic!("expected validation failure, got {err:?}");
        };
        assert!(errors.contains(StudentField::Gender));
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn create_with_duplicate_student_id_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let original = store.create(&draft("ABC12345")).await.unwrap();
        let err = store.create(&draft("ABC12345")).await.unwrap_err();
        assert!(matches!(err, RollcallError::DuplicateStudentId { .. }));

        assert_eq!(store.list().await.unwrap(), vec![original]);
    }

    #[tokio::test]
    async fn update_changes_only_patched_fields() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let created = store.create(&draft("ABC12345")).await.unwrap();

        let patch = StudentDraft {
            year_level: Some(YearLevelInput::Number(3)),
            ..StudentDraft::default()
        };
        let updated = store.update(created.id, patch).await.unwrap();

        assert_eq!(
            updated,
            Student {
                year_level: 3,
                ..created.clone()
            }
        );
        assert_eq!(store.get(created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_validates_the_merged_record() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let created = store.create(&draft("ABC12345")).await.unwrap();

        let patch = StudentDraft {
            year_level: Some(YearLevelInput::Number(9)),
            ..StudentDraft::default()
        };
        let err = store.update(created.id, patch).await.unwrap_err();
        assert!(matches!(err, RollcallError::ValidationFailed { .. }));
        assert_eq!(store.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn update_to_another_records_student_id_is_a_duplicate() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.create(&draft("AAAAA1")).await.unwrap();
        let second = store.create(&draft("BBBBB2")).await.unwrap();

        let patch = StudentDraft {
            student_id: Some("AAAAA1".into()),
            ..StudentDraft::default()
        };
        let err = store.update(second.id, patch).await.unwrap_err();
        assert!(matches!(err, RollcallError::DuplicateStudentId { .. }));
    }

    #[tokio::test]
    async fn update_keeping_own_student_id_succeeds() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let created = store.create(&draft("ABC12345")).await.unwrap();

        let mut patch = draft("ABC12345");
        patch.full_name = Some("Jane Smith".into());
        let updated = store.update(created.id, patch).await.unwrap();

        assert_eq!(updated.full_name, "Jane Smith");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_id_are_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let id = Uuid::new_v4();

        let err = store.update(id, StudentDraft::default()).await.unwrap_err();
        assert!(matches!(err, RollcallError::MissingStudent { id: missing } if missing == id));

        let err = store.delete(id).await.unwrap_err();
        assert!(matches!(err, RollcallError::MissingStudent { .. }));
    }

    #[tokio::test]
    async fn delete_returns_removed_record_and_get_then_fails() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let keep = store.create(&draft("KEEP1")).await.unwrap();
        let gone = store.create(&draft("GONE1")).await.unwrap();

        assert_eq!(store.delete(gone.id).await.unwrap(), gone);
        assert!(matches!(
            store.get(gone.id).await.unwrap_err(),
            RollcallError::MissingStudent { .. }
        ));
        assert_eq!(store.list().await.unwrap(), vec![keep]);
    }

    #[tokio::test]
    async fn concurrent_creates_both_persist() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store_in(&dir));

        let first = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.create(&draft("FIRST1")).await })
        };
        let second = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.create(&draft("SECOND2")).await })
        };
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let mut ids: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.student_id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["FIRST1".to_string(), "SECOND2".to_string()]);
    }

    #[tokio::test]
    async fn create_many_is_all_or_nothing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.create(&draft("TAKEN1")).await.unwrap();

        let mut invalid = draft("VALID2");
        invalid.email = Some("nope".into());
        let err = store
            .create_many(&[draft("FRESH1"), draft("TAKEN1"), invalid, draft("FRESH1")])
            .await
            .unwrap_err();
        let RollcallError::ImportRejected { problems } = err else {
            panic!("expected import rejection, got {err:?}");
        };
        assert_eq!(problems.len(), 3);
        assert!(problems[0].starts_with("Row 2:"));
        assert!(problems[1].starts_with("Row 3:"));
        assert!(problems[2].starts_with("Row 4:"));
        assert_eq!(store.list().await.unwrap().len(), 1);

        let created = store
            .create_many(&[draft("FRESH1"), draft("FRESH2")])
            .await
            .unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(store.list().await.unwrap().len(), 3);
    }
}
