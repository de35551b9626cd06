use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::url::errors::UrlError;
use crate::domain::url::models::UrlRecord;
use crate::domain::url::ports::UrlRepository;

pub struct PostgresUrlRepository {
    pool: PgPool,
}

impl PostgresUrlRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRepository for PostgresUrlRepository {
    async fn create(&self, record: UrlRecord) -> Result<UrlRecord, UrlError> {
        sqlx::query(
            r#"
            INSERT INTO urls (id, code, target_url, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            "#,
        )
        .bind(record.id.0)
        .bind(record.short_code.as_str())
        .bind(record.target_url.as_str())
        .bind(record.user_id.0)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() && db_err.constraint() == Some("urls_code_key") {
                    return UrlError::ShortCodeExists(record.short_code.to_string());
                }
                if db_err.is_foreign_key_violation() {
                    return UrlError::OwnerNotFound(record.user_id.to_string());
                }
            }
            UrlError::DatabaseError(e.to_string())
        })?;

        Ok(record)
    }
}
