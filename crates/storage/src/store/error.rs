#![forbid(unsafe_code)]

use deck_core::model::RevisionState;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
    InvalidEdit(&'static str),
    EditConflict { revision_id: i64 },
    DuplicateName { name: String },
    UnknownRevision,
    UnknownCategory,
    UnknownCard,
    RevisionClosed { state: RevisionState },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::InvalidEdit(message) => write!(f, "invalid edit: {message}"),
            Self::EditConflict { revision_id } => {
                write!(f, "target is already staged in open revision {revision_id}")
            }
            Self::DuplicateName { name } => write!(f, "duplicate name: {name}"),
            Self::UnknownRevision => write!(f, "unknown revision"),
            Self::UnknownCategory => write!(f, "unknown category"),
            Self::UnknownCard => write!(f, "unknown card"),
            Self::RevisionClosed { state } => {
                write!(f, "revision is not open (state={})", state.as_str())
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}
