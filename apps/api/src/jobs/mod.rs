//! Job campaigns and the dashboard.

pub mod handlers;
