use shared::error::ValidationError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport failure: {message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(value: reqwest::Error) -> Self {
        Self::new(value.to_string())
    }
}

/// Terminal failure of one exchange. None of these poison the controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("server responded with status {status}")]
    Server { status: u16, detail: Option<String> },
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },
}

impl ExchangeError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ExchangeError::Validation(_))
    }

    pub fn server_detail(&self) -> Option<&str> {
        match self {
            ExchangeError::Server { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}
