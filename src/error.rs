// Typed errors for the generation pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    /// The request was superseded or the screen went away before the call
    /// finished.
    #[error("generation cancelled")]
    Cancelled,

    /// The image service reported a failure.
    #[error("image service failed: {0}")]
    Service(String),
}
