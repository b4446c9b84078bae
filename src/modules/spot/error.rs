#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("spotID is required")]
    InvalidRecordingId,

    #[error("expiration should be at most {max} seconds (7 days), got {requested}")]
    DurationTooLong { requested: u64, max: u64 },

    #[error("key is required")]
    MissingKey,

    #[error("key not found")]
    NotFound,

    #[error("key is expired")]
    Expired,

    #[error("key does not grant access to spot {0}")]
    WrongRecording(u64),

    #[error("user not found")]
    UserNotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
