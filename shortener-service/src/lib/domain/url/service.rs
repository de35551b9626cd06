use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::url::errors::UrlError;
use crate::domain::url::models::CreateUrlCommand;
use crate::domain::url::models::ShortCode;
use crate::domain::url::models::TargetUrl;
use crate::domain::url::models::UrlId;
use crate::domain::url::models::UrlRecord;
use crate::domain::url::ports::UrlRepository;
use crate::domain::url::ports::UrlServicePort;
use crate::domain::user::models::UserId;

/// Attempts at finding a free generated code before giving up.
const MAX_GENERATION_ATTEMPTS: usize = 3;

pub struct UrlService<LR>
where
    LR: UrlRepository,
{
    repository: Arc<LR>,
}

impl<LR> UrlService<LR>
where
    LR: UrlRepository,
{
    pub fn new(repository: Arc<LR>) -> Self {
        Self { repository }
    }

    fn record(short_code: ShortCode, target_url: TargetUrl, user_id: UserId) -> UrlRecord {
        UrlRecord {
            id: UrlId::new(),
            short_code,
            target_url,
            user_id,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
impl<LR> UrlServicePort for UrlService<LR>
where
    LR: UrlRepository,
{
    async fn shorten(&self, command: CreateUrlCommand) -> Result<UrlRecord, UrlError> {
        if let Some(short_code) = command.short_code {
            let record = Self::record(short_code, command.target_url, command.user_id);
            return self.repository.create(record).await;
        }

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let record = Self::record(
                ShortCode::generate(),
                command.target_url.clone(),
                command.user_id,
            );

            match self.repository.create(record).await {
                Err(UrlError::ShortCodeExists(code)) => {
                    tracing::debug!(attempt, code = %code, "Generated short code collided");
                }
                result => return result,
            }
        }

        Err(UrlError::CodeGenerationExhausted(MAX_GENERATION_ATTEMPTS))
    }
}
