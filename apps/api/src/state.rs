use crate::pipeline::Pipeline;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds only immutable handles; nothing is shared between analysis runs.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
}
