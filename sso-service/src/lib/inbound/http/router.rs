use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::is_admin::is_admin;
use super::handlers::login::login;
use super::handlers::register::register;
use crate::domain::identity::ports::AuthServicePort;

pub struct AppState<S: AuthServicePort> {
    pub auth_service: Arc<S>,
}

// Derived Clone would demand S: Clone.
impl<S: AuthServicePort> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
        }
    }
}

pub fn create_router<S: AuthServicePort>(auth_service: Arc<S>) -> Router {
    let state = AppState { auth_service };

    // Headers stay out of the span; they may carry credentials.
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
        .route("/v1/auth/login", post(login::<S>))
        .route("/v1/auth/register", post(register::<S>))
        .route("/v1/users/:user_id/is-admin", get(is_admin::<S>))
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
