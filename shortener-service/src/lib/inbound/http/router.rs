use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::authenticate::authenticate;
use super::handlers::create_url::create_url;
use super::handlers::create_user::create_user;
use super::middleware::authenticate as auth_middleware;
use super::middleware::require_authentication;
use crate::domain::url::ports::UrlServicePort;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub url_service: Arc<dyn UrlServicePort>,
    pub authenticator: Arc<Authenticator>,
}

/// Build the HTTP router.
///
/// # Arguments
/// * `user_service` - Signup and login
/// * `url_service` - Short URL creation
/// * `authenticator` - Validates bearer tokens on incoming requests
pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    url_service: Arc<dyn UrlServicePort>,
    authenticator: Arc<Authenticator>,
) -> Router {
    let state = AppState {
        user_service,
        url_service,
        authenticator,
    };

    let public_routes = Router::new()
        .route("/user/signup", post(create_user))
        .route("/user/login", post(authenticate));

    let protected_routes = Router::new()
        .route("/shorten", post(create_url))
        .route_layer(middleware::from_fn(require_authentication));

    // Headers stay out of the span: they carry bearer tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
