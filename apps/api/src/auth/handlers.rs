//! Registration, login, and session endpoints.
//!
//! Credentials are stored and compared in plaintext to keep the persistence
//! layer a faithful snapshot of whatever was registered; responses never echo
//! the password back (see [`UserProfile`]).

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::session::current_user;
use crate::errors::AppError;
use crate::models::{User, UserProfile, UserRole};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: UserRole,
    pub contact_number: String,
    pub dob: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserProfile,
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    validate_registration(&request)?;

    let user = User {
        id: Uuid::new_v4(),
        username: request.username,
        email: request.email,
        role: request.role,
        full_name: request.full_name,
        contact_number: request.contact_number,
        dob: request.dob,
        created_at: Utc::now(),
        password: request.password,
    };
    state.store.add_user(user.clone())?;
    info!("Registered {:?} account for '{}'", user.role, user.username);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: UserProfile::from(&user),
        }),
    ))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<UserProfile>, AppError> {
    if !is_valid_email(&request.email) {
        return Err(AppError::Validation(
            "Invalid email format. Please check for @ and domain.".to_string(),
        ));
    }

    let users = state.store.users()?;
    let user = users
        .into_iter()
        .find(|u| u.email == request.email && u.password == request.password)
        .ok_or(AppError::Unauthorized)?;

    state.store.set_current_user(&user)?;
    info!("User '{}' logged in", user.username);
    Ok(Json(UserProfile::from(&user)))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.store.clear_session()?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn handle_me(State(state): State<AppState>) -> Result<Json<UserProfile>, AppError> {
    let user = current_user(&state.store)?;
    Ok(Json(UserProfile::from(&user)))
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

/// Checks run in a fixed order; the first failure is the one reported.
fn validate_registration(request: &RegisterRequest) -> Result<(), AppError> {
    if !is_valid_email(&request.email) {
        return Err(AppError::Validation(
            "Invalid email format. Must contain '@' and domain.".to_string(),
        ));
    }
    if request.password.len() < 8 {
        return Err(AppError::Validation(
            "Security threshold: Password must be 8+ characters.".to_string(),
        ));
    }
    if request.contact_number.len() != 10
        || !request.contact_number.chars().all(|c| c.is_ascii_digit())
    {
        return Err(AppError::Validation(
            "Contact must be exactly 10 digits (no characters).".to_string(),
        ));
    }
    if request.full_name.is_empty() || request.username.is_empty() || request.dob.is_empty() {
        return Err(AppError::Validation("All fields are mandatory.".to_string()));
    }
    Ok(())
}

/// local-part `@` domain `.` tld, with no whitespace or extra `@` anywhere.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    let clean = |s: &str| !s.is_empty() && !s.chars().any(|c| c.is_whitespace() || c == '@');
    clean(local) && clean(host) && clean(tld) && !host.contains(char::is_whitespace)
}
