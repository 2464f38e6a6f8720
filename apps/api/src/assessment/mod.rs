//! Timed assessment attempts: the in-memory session, its countdown, and the
//! HTTP surface for starting, answering, and submitting.

pub mod attempt;
pub mod handlers;
pub mod sessions;
