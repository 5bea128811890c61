use crate::layout::CompositionConfig;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Service-wide page budget and split limit; requests may override per call.
    pub composition: CompositionConfig,
}
