use async_trait::async_trait;

use crate::domain::url::errors::UrlError;
use crate::domain::url::models::CreateUrlCommand;
use crate::domain::url::models::UrlRecord;

/// Port for URL record service operations.
#[async_trait]
pub trait UrlServicePort: Send + Sync + 'static {
    /// Store a short URL for the user named in the command.
    ///
    /// # Errors
    /// * `ShortCodeExists` - Caller-chosen code is taken
    /// * `CodeGenerationExhausted` - Every generated code collided
    /// * `OwnerNotFound` - Authenticated user no longer exists
    /// * `DatabaseError` - Database operation failed
    async fn shorten(&self, command: CreateUrlCommand) -> Result<UrlRecord, UrlError>;
}

/// Persistence operations for URL records.
#[async_trait]
pub trait UrlRepository: Send + Sync + 'static {
    /// Persist a new record.
    ///
    /// # Errors
    /// * `ShortCodeExists` - Code violates the unique constraint
    /// * `OwnerNotFound` - No user with the record's owner id
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, record: UrlRecord) -> Result<UrlRecord, UrlError>;
}
