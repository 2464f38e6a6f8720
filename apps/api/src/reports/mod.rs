//! Reporting surface: performance reports, leaderboards, profiles.

pub mod handlers;
