use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::Password;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// `POST /user/login`
///
/// Malformed credentials get the same answer as wrong ones.
pub async fn authenticate(
    State(state): State<AppState>,
    body: Result<Json<AuthenticateRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<AuthenticateResponseData>, ApiError> {
    let Json(body) = body?;

    let email = EmailAddress::new(body.email).map_err(|_| UserError::InvalidCredentials)?;
    let password = Password::new(body.password).map_err(|_| UserError::InvalidCredentials)?;

    let token = state
        .user_service
        .login(LoginCommand::new(email, password))
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        AuthenticateResponseData::new(token),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthenticateRequestBody {
    email: String,
    password: String,
}

/// The token travels under `message` for existing clients and under `token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticateResponseData {
    pub message: String,
    pub token: String,
}

impl AuthenticateResponseData {
    fn new(token: String) -> Self {
        Self {
            message: token.clone(),
            token,
        }
    }
}
