use thiserror::Error;

/// Failures at the fetch boundary. None of these are fatal; the accumulator
/// keeps its items and the user can trigger the fetch again.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not reach the question source: {0}")]
    Transport(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response shape: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Short text for the inline error line.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Transport(_) | FetchError::Timeout(_) => {
                "Oops! Something went wrong.. check your connection".to_string()
            }
            FetchError::Status { status, message } => {
                format!("Oops! Something went wrong.. ({} {})", status, message)
            }
            FetchError::Malformed(_) => {
                "Oops! Something went wrong.. unreadable response".to_string()
            }
        }
    }
}
