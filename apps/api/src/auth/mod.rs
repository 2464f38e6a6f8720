//! Accounts and the single-slot session.

pub mod handlers;
pub mod session;
