use thiserror::Error;

/// Errors raised at the boundary between a host and the numeric core.
///
/// Nothing on the per-sample path returns these; divergence and out-of-range
/// parameters are absorbed where they occur.
#[derive(Debug, Error)]
pub enum AnomaliesError {
    #[error("Unknown attractor family \"{0}\"")]
    UnknownFamily(String),
    #[error("Sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),
    #[error("Malformed scope settings: {0}")]
    Settings(#[from] serde_json::Error),
}
