#![forbid(unsafe_code)]

use crate::auth::AuthError;
use deck_storage::StoreError;
use serde_json::{Value, json};

/// The failure surface exposed to the request layer. Every business-rule
/// violation maps to one of these synchronously; nothing is retried here.
#[derive(Debug)]
pub enum ApiError {
    AuthenticationRequired,
    AuthorizationDenied,
    Validation(&'static str),
    Conflict { revision_id: i64 },
    DuplicateName { name: String },
    NotFound,
    Storage,
}

impl ApiError {
    /// Stable machine-readable rejection kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthenticationRequired => "authentication-required",
            Self::AuthorizationDenied => "authorization-denied",
            Self::Validation(_) => "invalid-edit",
            Self::Conflict { .. } => "already-edited-elsewhere",
            Self::DuplicateName { .. } => "duplicate-name",
            Self::NotFound => "not-found",
            Self::Storage => "storage",
        }
    }

    pub fn to_payload(&self) -> Value {
        json!({ "error": self.kind(), "message": self.to_string() })
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationRequired => write!(f, "authentication required"),
            Self::AuthorizationDenied => write!(f, "not allowed for this principal"),
            Self::Validation(message) => write!(f, "invalid edit: {message}"),
            Self::Conflict { revision_id } => {
                write!(f, "target is already staged in open revision {revision_id}")
            }
            Self::DuplicateName { name } => write!(f, "duplicate name: {name}"),
            Self::NotFound => write!(f, "not found"),
            Self::Storage => write!(f, "storage failure"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            // Storage faults are logged in full here and surfaced opaque;
            // internal detail must not reach the caller.
            StoreError::Io(err) => {
                tracing::error!(error = %err, "storage io failure");
                Self::Storage
            }
            StoreError::Sql(err) => {
                tracing::error!(error = %err, "storage sql failure");
                Self::Storage
            }
            StoreError::InvalidInput(message) | StoreError::InvalidEdit(message) => {
                Self::Validation(message)
            }
            StoreError::EditConflict { revision_id } => Self::Conflict { revision_id },
            StoreError::DuplicateName { name } => Self::DuplicateName { name },
            StoreError::UnknownRevision | StoreError::UnknownCategory | StoreError::UnknownCard => {
                Self::NotFound
            }
            StoreError::RevisionClosed { .. } => Self::Validation("revision is not open"),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::UnknownToken => Self::AuthenticationRequired,
            AuthError::Unavailable => {
                tracing::error!("session backend unavailable");
                Self::Storage
            }
        }
    }
}
