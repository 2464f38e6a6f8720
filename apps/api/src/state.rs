use std::sync::Arc;

use crate::ai::AssessmentAi;
use crate::assessment::sessions::ActiveAttempts;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    /// AI gateway seam. Production wires `GeminiClient`; tests substitute
    /// a scripted backend.
    pub ai: Arc<dyn AssessmentAi>,
    /// In-flight assessment sessions and their countdown tasks.
    pub attempts: ActiveAttempts,
}
