//! The attempt state machine, kept free of HTTP and I/O so its invariants
//! are directly testable: the countdown never goes negative, expiry fires
//! exactly once, and a manual submission blocks any later automatic one.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Job, Question};

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running { remaining_seconds: u32 },
    /// The clock hit zero and automatic submission must run. Returned at
    /// most once per session.
    Expired,
}

#[derive(Debug, Error)]
#[error("a submission for this attempt is already in progress")]
pub struct AlreadySubmitting;

/// One in-flight assessment, from a generated question set through
/// submission. Held in memory only; the durable attempt record is written
/// at submission time.
#[derive(Debug)]
pub struct AttemptSession {
    pub id: Uuid,
    pub job: Job,
    pub student_id: Uuid,
    pub resume_summary: String,
    pub questions: Vec<Question>,
    pub started_at: DateTime<Utc>,
    answers: HashMap<String, String>,
    duration_seconds: u32,
    remaining_seconds: u32,
    submitting: bool,
}

impl AttemptSession {
    pub fn new(job: Job, student_id: Uuid, resume_summary: String, questions: Vec<Question>) -> Self {
        let duration_seconds = job.duration_minutes * 60;
        AttemptSession {
            id: Uuid::new_v4(),
            job,
            student_id,
            resume_summary,
            questions,
            started_at: Utc::now(),
            answers: HashMap::new(),
            duration_seconds,
            remaining_seconds: duration_seconds,
            submitting: false,
        }
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn answers(&self) -> &HashMap<String, String> {
        &self.answers
    }

    /// Records (or overwrites) the answer for one question. Navigation is
    /// random-access; a re-visited question keeps its previous answer until
    /// explicitly changed. Unknown question ids are rejected.
    pub fn record_answer(&mut self, question_id: &str, answer: String) -> bool {
        if !self.questions.iter().any(|q| q.id == question_id) {
            return false;
        }
        self.answers.insert(question_id.to_string(), answer);
        true
    }

    /// Advances the countdown by one second. The remaining time is clamped
    /// at zero, and `Expired` is reported exactly once: reaching zero flips
    /// the submitting flag, so later ticks (and ticks after a manual
    /// submission has begun) report `Running`.
    pub fn tick(&mut self) -> Tick {
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
        }
        if self.remaining_seconds == 0 && !self.submitting {
            self.submitting = true;
            return Tick::Expired;
        }
        Tick::Running {
            remaining_seconds: self.remaining_seconds,
        }
    }

    /// Marks the session as submitting (manual path). Fails if a
    /// submission — manual or automatic — is already running.
    pub fn begin_submission(&mut self) -> Result<(), AlreadySubmitting> {
        if self.submitting {
            return Err(AlreadySubmitting);
        }
        self.submitting = true;
        Ok(())
    }

    /// Re-opens the session after a failed evaluation call: answers are
    /// kept and the caller may submit again. The countdown is not
    /// restarted.
    pub fn reopen_after_failure(&mut self) {
        self.submitting = false;
    }

    /// Whole minutes spent, floored against the remaining clock but never
    /// reported as less than one minute.
    pub fn elapsed_minutes(&self) -> u32 {
        let taken_seconds = self.duration_seconds - self.remaining_seconds;
        let minutes = (taken_seconds as f64 / 60.0).round() as u32;
        minutes.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, QuestionType};
    use chrono::Utc;

    fn sample_job(duration_minutes: u32) -> Job {
        Job {
            id: Uuid::new_v4(),
            recruiter_id: Uuid::new_v4(),
            title: "Compiler Engineer".to_string(),
            description: "LLVM, Rust".to_string(),
            skills: vec![],
            difficulty: Difficulty::Medium,
            num_questions: 2,
            duration_minutes,
            deadline: "2026-11-30".to_string(),
            threshold: 30,
            is_coding_enabled: false,
            created_at: Utc::now(),
        }
    }

    fn sample_question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            question_type: QuestionType::Subjective,
            text: "Explain monomorphization.".to_string(),
            marks: 50,
            options: None,
            correct_option_id: None,
            rubric: None,
            initial_code: None,
            test_cases: None,
        }
    }

    fn session(duration_minutes: u32) -> AttemptSession {
        AttemptSession::new(
            sample_job(duration_minutes),
            Uuid::new_v4(),
            "summary".to_string(),
            vec![sample_question("q-0"), sample_question("q-1")],
        )
    }

    #[test]
    fn test_countdown_starts_at_duration_in_seconds() {
        let s = session(30);
        assert_eq!(s.remaining_seconds(), 1800);
    }

    #[test]
    fn test_countdown_never_goes_negative_and_expires_once() {
        let mut s = session(30);
        // Burn the whole clock.
        for _ in 0..1799 {
            assert!(matches!(s.tick(), Tick::Running { .. }));
        }
        assert_eq!(s.tick(), Tick::Expired);
        // Clock stays at zero and never expires again.
        for _ in 0..5 {
            assert_eq!(
                s.tick(),
                Tick::Running {
                    remaining_seconds: 0
                }
            );
        }
    }

    #[test]
    fn test_manual_submission_blocks_automatic_one() {
        let mut s = session(1);
        s.tick();
        s.begin_submission().unwrap();
        for _ in 0..120 {
            assert!(matches!(s.tick(), Tick::Running { .. }));
        }
    }

    #[test]
    fn test_double_manual_submission_rejected_until_reopened() {
        let mut s = session(1);
        s.begin_submission().unwrap();
        assert!(s.begin_submission().is_err());
        s.reopen_after_failure();
        assert!(s.begin_submission().is_ok());
    }

    #[test]
    fn test_answers_overwrite_and_persist_across_navigation() {
        let mut s = session(30);
        assert!(s.record_answer("q-0", "first draft".to_string()));
        assert!(s.record_answer("q-1", "other".to_string()));
        // Re-visiting q-0 shows the prior answer until changed.
        assert_eq!(s.answers()["q-0"], "first draft");
        assert!(s.record_answer("q-0", "final".to_string()));
        assert_eq!(s.answers()["q-0"], "final");
        assert_eq!(s.answers().len(), 2);
    }

    #[test]
    fn test_unknown_question_id_rejected() {
        let mut s = session(30);
        assert!(!s.record_answer("q-99", "ghost".to_string()));
        assert!(s.answers().is_empty());
    }

    #[test]
    fn test_elapsed_minutes_rounds_and_floors_at_one() {
        // durationMinutes=30, submission with 20 min left → 10 elapsed.
        let mut s = session(30);
        for _ in 0..600 {
            s.tick();
        }
        assert_eq!(s.remaining_seconds(), 1200);
        assert_eq!(s.elapsed_minutes(), 10);

        // Instant submission still reports one minute.
        let s = session(30);
        assert_eq!(s.elapsed_minutes(), 1);

        // 90 seconds in rounds to 2.
        let mut s = session(30);
        for _ in 0..90 {
            s.tick();
        }
        assert_eq!(s.elapsed_minutes(), 2);
    }

    #[test]
    fn test_expiry_elapsed_is_full_duration() {
        let mut s = session(1);
        for _ in 0..60 {
            s.tick();
        }
        assert_eq!(s.remaining_seconds(), 0);
        assert_eq!(s.elapsed_minutes(), 1);
    }
}
