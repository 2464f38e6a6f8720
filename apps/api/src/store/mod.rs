//! Storage gateway — full-snapshot JSON collections on disk.
//!
//! Each named collection is one JSON file under the data directory holding
//! the whole collection; `append` is read-then-write over that snapshot,
//! serialized through a process-wide lock so concurrent handlers cannot drop
//! records. There is no schema versioning: a file written by an incompatible
//! shape surfaces a parse error to the caller.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AssessmentAttempt, Job, QuestionEvaluation, User};

const USERS: &str = "users";
const JOBS: &str = "jobs";
const ATTEMPTS: &str = "attempts";
const SESSION: &str = "session";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("collection '{collection}' is corrupt: {source}")]
    Corrupt {
        collection: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Handle to the on-disk store. Cheap to clone; all clones share one lock.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    dir: PathBuf,
    // Guards every read-modify-write cycle. Never held across .await.
    lock: Mutex<()>,
}

impl Store {
    /// Opens (and creates if needed) the data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Store {
            inner: Arc::new(StoreInner {
                dir,
                lock: Mutex::new(()),
            }),
        })
    }

    // ── generic collection operations ───────────────────────────────────

    fn path_for(&self, key: &str) -> PathBuf {
        self.inner.dir.join(format!("{key}.json"))
    }

    /// Reads a whole collection; an absent file is an empty collection.
    fn read_collection<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, StoreError> {
        let path = self.path_for(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path)?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            collection: collection.to_string(),
            source,
        })
    }

    /// Replaces a collection with a full snapshot.
    fn write_collection<T: Serialize>(
        &self,
        collection: &str,
        records: &[T],
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(records).expect("collection serialization");
        fs::write(self.path_for(collection), raw)?;
        Ok(())
    }

    fn append<T: Serialize + DeserializeOwned>(
        &self,
        collection: &str,
        record: T,
    ) -> Result<(), StoreError> {
        let _guard = self.inner.lock.lock().expect("store lock poisoned");
        let mut records: Vec<T> = self.read_collection(collection)?;
        records.push(record);
        self.write_collection(collection, &records)
    }

    // ── users ───────────────────────────────────────────────────────────

    pub fn users(&self) -> Result<Vec<User>, StoreError> {
        self.read_collection(USERS)
    }

    pub fn add_user(&self, user: User) -> Result<(), StoreError> {
        self.append(USERS, user)
    }

    // ── jobs ────────────────────────────────────────────────────────────

    pub fn jobs(&self) -> Result<Vec<Job>, StoreError> {
        self.read_collection(JOBS)
    }

    pub fn job(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs()?.into_iter().find(|j| j.id == id))
    }

    pub fn add_job(&self, job: Job) -> Result<(), StoreError> {
        self.append(JOBS, job)
    }

    /// Rewrites the snapshot with the matching record replaced. A missing id
    /// leaves the collection unchanged; callers check existence first.
    pub fn update_job(&self, updated: &Job) -> Result<(), StoreError> {
        let _guard = self.inner.lock.lock().expect("store lock poisoned");
        let jobs: Vec<Job> = self
            .read_collection::<Job>(JOBS)?
            .into_iter()
            .map(|j| {
                if j.id == updated.id {
                    updated.clone()
                } else {
                    j
                }
            })
            .collect();
        self.write_collection(JOBS, &jobs)
    }

    // ── attempts ────────────────────────────────────────────────────────

    pub fn attempts(&self) -> Result<Vec<AssessmentAttempt>, StoreError> {
        self.read_collection(ATTEMPTS)
    }

    pub fn attempt(&self, id: Uuid) -> Result<Option<AssessmentAttempt>, StoreError> {
        Ok(self.attempts()?.into_iter().find(|a| a.id == id))
    }

    pub fn add_attempt(&self, attempt: AssessmentAttempt) -> Result<(), StoreError> {
        self.append(ATTEMPTS, attempt)
    }

    // ── session slot ────────────────────────────────────────────────────

    /// The single-record slot holding the currently signed-in user.
    pub fn current_user(&self) -> Result<Option<User>, StoreError> {
        let path = self.path_for(SESSION);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                collection: SESSION.to_string(),
                source,
            })
    }

    pub fn set_current_user(&self, user: &User) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(user).expect("user serialization");
        fs::write(self.path_for(SESSION), raw)?;
        Ok(())
    }

    pub fn clear_session(&self) -> Result<(), StoreError> {
        let path = self.path_for(SESSION);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    // ── per-attempt evaluation breakdown ────────────────────────────────

    pub fn save_evaluations(
        &self,
        attempt_id: Uuid,
        evaluations: &[QuestionEvaluation],
    ) -> Result<(), StoreError> {
        self.write_collection(&format!("eval_{attempt_id}"), evaluations)
    }

    /// Missing breakdown reads as empty — reports render the summary alone.
    pub fn load_evaluations(&self, attempt_id: Uuid) -> Result<Vec<QuestionEvaluation>, StoreError> {
        self.read_collection(&format!("eval_{attempt_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttemptStatus, Difficulty, UserRole};
    use chrono::Utc;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn sample_user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: "sam".to_string(),
            email: email.to_string(),
            role: UserRole::Student,
            full_name: "Sam Carter".to_string(),
            contact_number: "9998887776".to_string(),
            dob: "2000-01-15".to_string(),
            created_at: Utc::now(),
            password: "password123".to_string(),
        }
    }

    fn sample_job() -> Job {
        Job {
            id: Uuid::new_v4(),
            recruiter_id: Uuid::new_v4(),
            title: "Platform Engineer".to_string(),
            description: "Rust, Tokio".to_string(),
            skills: vec!["Rust".to_string(), "Tokio".to_string()],
            difficulty: Difficulty::Hard,
            num_questions: 8,
            duration_minutes: 45,
            deadline: "2026-12-01".to_string(),
            threshold: 40,
            is_coding_enabled: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_absent_collection_reads_empty() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        assert!(store.users().unwrap().is_empty());
        assert!(store.current_user().unwrap().is_none());
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        store.add_user(sample_user("a@x.io")).unwrap();
        store.add_user(sample_user("b@x.io")).unwrap();
        let users = store.users().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email, "a@x.io");
        assert_eq!(users[1].email, "b@x.io");
    }

    #[test]
    fn test_update_job_replaces_matching_record_only() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let job_a = sample_job();
        let job_b = sample_job();
        store.add_job(job_a.clone()).unwrap();
        store.add_job(job_b.clone()).unwrap();

        let mut edited = job_a.clone();
        edited.title = "Staff Platform Engineer".to_string();
        edited.threshold = 55;
        store.update_job(&edited).unwrap();

        let jobs = store.jobs().unwrap();
        assert_eq!(jobs[0].title, "Staff Platform Engineer");
        assert_eq!(jobs[0].threshold, 55);
        assert_eq!(jobs[1].title, job_b.title);
    }

    #[test]
    fn test_job_round_trips_every_field() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let job = sample_job();
        store.add_job(job.clone()).unwrap();
        let loaded = store.job(job.id).unwrap().unwrap();
        assert_eq!(
            serde_json::to_value(&job).unwrap(),
            serde_json::to_value(&loaded).unwrap()
        );
    }

    #[test]
    fn test_session_slot_set_get_clear() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let user = sample_user("session@x.io");
        store.set_current_user(&user).unwrap();
        assert_eq!(store.current_user().unwrap().unwrap().id, user.id);
        store.clear_session().unwrap();
        assert!(store.current_user().unwrap().is_none());
        // Clearing an already-empty slot is fine.
        store.clear_session().unwrap();
    }

    #[test]
    fn test_evaluations_keyed_by_attempt_id() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let attempt_id = Uuid::new_v4();
        let evals = vec![QuestionEvaluation {
            question_id: "q-0".to_string(),
            is_correct: false,
            marks_obtained: 0.0,
            ai_feedback: "Off-topic answer.".to_string(),
            correct_answer: Some("Use Arc<Mutex<T>>".to_string()),
        }];
        store.save_evaluations(attempt_id, &evals).unwrap();
        let loaded = store.load_evaluations(attempt_id).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].question_id, "q-0");
        // A different attempt id has no breakdown.
        assert!(store.load_evaluations(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_collection_surfaces_parse_error() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        std::fs::write(dir.path().join("jobs.json"), "not json at all").unwrap();
        match store.jobs() {
            Err(StoreError::Corrupt { collection, .. }) => assert_eq!(collection, "jobs"),
            other => panic!("expected corrupt error, got {other:?}"),
        }
    }

    #[test]
    fn test_attempt_round_trip() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let mut answers = HashMap::new();
        answers.insert("q-0".to_string(), "b".to_string());
        let attempt = AssessmentAttempt {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            start_time: Utc::now(),
            end_time: Some(Utc::now()),
            answers,
            score: 62.0,
            status: AttemptStatus::Qualified,
            is_suspicious: false,
            suspicious_reason: None,
            feedback: "Solid fundamentals.".to_string(),
            resume_url: Some("attached-pdf".to_string()),
        };
        store.add_attempt(attempt.clone()).unwrap();
        let loaded = store.attempt(attempt.id).unwrap().unwrap();
        assert_eq!(loaded.score, 62.0);
        assert_eq!(loaded.status, AttemptStatus::Qualified);
        assert_eq!(loaded.answers["q-0"], "b");
    }
}
