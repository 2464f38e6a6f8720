use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A recruiter-posted job campaign. Threshold and question count are
/// recruiter-chosen and deliberately not range-checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub recruiter_id: Uuid,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub difficulty: Difficulty,
    pub num_questions: u32,
    pub duration_minutes: u32,
    /// Campaign deadline as entered, `YYYY-MM-DD`. The campaign stays open
    /// through 23:59:59.999 of that day.
    pub deadline: String,
    /// Minimum score (0–100) a candidate must reach to qualify.
    pub threshold: u32,
    pub is_coding_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Skills are extracted from the description by comma-split at posting
    /// time; there is no dedicated skills field on the posting form.
    pub fn skills_from_description(description: &str) -> Vec<String> {
        description
            .split(',')
            .map(|s| s.trim().to_string())
            .collect()
    }

    /// Whether candidates can still start this assessment at `now`.
    /// An unparseable deadline counts as already passed.
    pub fn accepts_candidates(&self, now: DateTime<Utc>) -> bool {
        let Ok(date) = NaiveDate::parse_from_str(&self.deadline, "%Y-%m-%d") else {
            return false;
        };
        now.date_naive() <= date
    }
}
