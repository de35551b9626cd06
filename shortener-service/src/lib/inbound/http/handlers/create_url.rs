use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::url::models::CreateUrlCommand;
use crate::domain::url::models::ShortCode;
use crate::domain::url::models::TargetUrl;
use crate::domain::url::models::UrlRecord;
use crate::domain::user::models::UserId;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::url::errors::UrlError;

/// `POST /shorten`, owned by the caller identified by the token.
pub async fn create_url(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    body: Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<ApiSuccess<CreateUrlResponseData>, ApiError> {
    let Json(body) = body?;

    state
        .url_service
        .shorten(body.try_into_command(auth_user.user_id)?)
        .await
        .map_err(ApiError::from)
        .map(|ref record| ApiSuccess::new(StatusCode::CREATED, record.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateUrlRequest {
    url: String,
    #[serde(default)]
    code: Option<String>,
}

impl CreateUrlRequest {
    fn try_into_command(self, user_id: UserId) -> Result<CreateUrlCommand, UrlError> {
        let target_url = TargetUrl::new(self.url)?;
        let short_code = self.code.map(ShortCode::new).transpose()?;
        Ok(CreateUrlCommand::new(target_url, short_code, user_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateUrlResponseData {
    pub id: String,
    #[serde(rename = "shortCode")]
    pub short_code: String,
    #[serde(rename = "targetURL")]
    pub target_url: String,
}

impl From<&UrlRecord> for CreateUrlResponseData {
    fn from(record: &UrlRecord) -> Self {
        Self {
            id: record.id.to_string(),
            short_code: record.short_code.to_string(),
            target_url: record.target_url.to_string(),
        }
    }
}
