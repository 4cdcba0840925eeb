use shared::validation::ValidationErrors;
use thiserror::Error;

/// Failure of a single repository call.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("server unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("server returned no content")]
    EmptyBody,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("problem {0} is not in the current list")]
    UnknownProblem(i64),
    #[error("no deletion is awaiting confirmation")]
    NothingToConfirm,
}
