use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid date format: {0:?} (expected dd.MM.yyyy)")]
    InvalidDateFormat(String),

    #[error("invalid snapshot label derived from {0:?}")]
    InvalidSnapshotLabel(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("record store unavailable: {0}")]
    StoreUnavailable(String),
}

impl Error {
    /// Returns `true` for caller mistakes (bad dates, empty labels,
    /// malformed input) that should be reported back rather than retried.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidDateFormat(_) | Self::InvalidSnapshotLabel(_) | Self::InvalidData(_)
        )
    }

    /// Returns `true` when the store as a whole can no longer serve requests.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match err.sqlite_error_code() {
            Some(ErrorCode::CannotOpen | ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt) => {
                Self::StoreUnavailable(err.to_string())
            }
            _ => Self::Database(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
