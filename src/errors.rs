use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("Encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("BSON: {0}")]
    Bson(#[from] bson::error::Error),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("malformed pattern: {0}")]
    MalformedPattern(String),

    #[error("storage failure: {0}")]
    StorageFailure(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("reply too large: {0} bytes")]
    ReplyTooLarge(usize),

    #[error("invalid reply: {0}")]
    InvalidReply(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
    /// True for the namespace-guard rejection, which leaves storage untouched.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}
