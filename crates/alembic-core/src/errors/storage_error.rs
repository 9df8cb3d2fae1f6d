/// Storage-layer errors for SQLite operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("artifact '{id}' already exists")]
    AlreadyExists { id: String },

    #[error("artifact '{id}' not found")]
    NotFound { id: String },

    #[error("corrupt embedding blob for '{id}': {reason}")]
    CorruptEmbedding { id: String, reason: String },
}
