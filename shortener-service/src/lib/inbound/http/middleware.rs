use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;

/// Extension type to store the authenticated user ID in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Why an `Authorization` header could not yield a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderRejection {
    /// Not a bearer header at all
    Malformed,
    /// Bearer scheme without a token after it
    MissingToken,
}

/// Gate run on every request.
///
/// Requests without an `Authorization` header pass through anonymously.
/// A present header must carry a valid bearer token; its claims are then
/// attached to the request for handlers and guards further down.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = match bearer_token(req.headers().get(AUTHORIZATION)) {
        Ok(None) => None,
        Ok(Some(token)) => Some(token.to_owned()),
        Err(HeaderRejection::Malformed) => {
            return Err(reject(StatusCode::BAD_REQUEST, "Invalid token"));
        }
        Err(HeaderRejection::MissingToken) => {
            tracing::warn!("Bearer header without a token");
            return Err(reject(StatusCode::UNAUTHORIZED, "Invalid token"));
        }
    };

    let Some(token) = token else {
        return Ok(next.run(req).await);
    };

    let claims: auth::Claims = state.authenticator.validate_token(&token).map_err(|e| {
        tracing::warn!("JWT validation failed: {}", e);
        reject(StatusCode::UNAUTHORIZED, "Invalid token")
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Guard for routes that need a signed-in user.
///
/// Turns the claims left by [`authenticate`] into an [`AuthenticatedUser`].
pub async fn require_authentication(mut req: Request, next: Next) -> Result<Response, Response> {
    let user_id = req
        .extensions()
        .get::<auth::Claims>()
        .and_then(|claims| claims.subject())
        .and_then(|sub| {
            UserId::from_string(sub)
                .map_err(|e| tracing::warn!("Failed to parse user ID from token: {}", e))
                .ok()
        })
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Not authenticated"))?;

    req.extensions_mut().insert(AuthenticatedUser { user_id });

    Ok(next.run(req).await)
}

fn bearer_token(header: Option<&HeaderValue>) -> Result<Option<&str>, HeaderRejection> {
    let Some(header) = header else {
        return Ok(None);
    };

    let value = header.to_str().map_err(|_| HeaderRejection::Malformed)?;
    if !value.starts_with("Bearer") {
        return Err(HeaderRejection::Malformed);
    }

    value
        .split_whitespace()
        .nth(1)
        .map(Some)
        .ok_or(HeaderRejection::MissingToken)
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}
