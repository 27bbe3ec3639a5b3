use reqwest::StatusCode;
use thiserror::Error;

/// Failures raised by the HTTP wrapper.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response reached us: DNS, refused connection, timeout.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Http { status: StatusCode, message: String },

    /// The body did not match the declared content type or the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(StatusCode::FORBIDDEN)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Failures surfaced by the domain services. Callers branch on the variant,
/// never on a raw status code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("session expired, please log in again")]
    Unauthenticated,

    #[error("not allowed: {0}")]
    Forbidden(String),

    #[error("could not reach the server: {0}")]
    Network(String),

    #[error("{0}")]
    Failed(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<ApiError> for ServiceError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(message) => Self::Network(message),
            ApiError::Decode(message) => Self::Decode(message),
            ApiError::Http { status, .. } if status == StatusCode::UNAUTHORIZED => {
                Self::Unauthenticated
            }
            ApiError::Http { status, message } if status == StatusCode::FORBIDDEN => {
                Self::Forbidden(message)
            }
            ApiError::Http { message, .. } => Self::Failed(message),
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        Self::Failed(err.to_string())
    }
}

/// Failures of the durable session storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}
