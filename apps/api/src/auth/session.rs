//! Session and role gates. The SPA's navigation guards become handler-level
//! checks here: no session is 401, the wrong role is 403.

use crate::errors::AppError;
use crate::models::{User, UserRole};
use crate::store::Store;

/// The signed-in user from the session slot, or `Unauthorized`.
pub fn current_user(store: &Store) -> Result<User, AppError> {
    store.current_user()?.ok_or(AppError::Unauthorized)
}

/// Recruiter-only surfaces (posting and editing jobs).
pub fn require_recruiter(user: &User) -> Result<(), AppError> {
    if user.role == UserRole::Recruiter {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
