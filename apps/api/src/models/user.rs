use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Student,
    Recruiter,
    Admin,
}

/// A registered account. Role is fixed at registration; records are never
/// updated or deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub full_name: String,
    pub contact_number: String,
    /// Date of birth as entered, `YYYY-MM-DD`.
    pub dob: String,
    pub created_at: DateTime<Utc>,
    pub password: String,
}

/// The user shape returned by API responses — everything except the password.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub full_name: String,
    pub contact_number: String,
    pub dob: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            full_name: user.full_name.clone(),
            contact_number: user.contact_number.clone(),
            dob: user.dob.clone(),
            created_at: user.created_at,
        }
    }
}
