use thiserror::Error;

/// Failure of an external collaborator. Never propagated out of a trading
/// cycle: every variant has a documented fallback in [`crate::fallback`]
/// or at the call site.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned status {status}")]
    Status { service: &'static str, status: u16 },

    #[error("failed to decode {service} response: {reason}")]
    Decode {
        service: &'static str,
        reason: String,
    },

    #[error("{service} returned an empty price series")]
    EmptySeries { service: &'static str },

    #[error("model inference failed: {0}")]
    Inference(String),
}
