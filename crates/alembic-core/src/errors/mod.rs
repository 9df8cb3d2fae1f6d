mod alembic_error;
mod learning_error;
mod provider_error;
mod storage_error;
mod validation_error;

pub use alembic_error::{AlembicError, ProviderAttempt};
pub use learning_error::LearningError;
pub use provider_error::ProviderError;
pub use storage_error::StorageError;
pub use validation_error::ValidationError;

/// Convenience alias used across the workspace.
pub type AlembicResult<T> = Result<T, AlembicError>;
