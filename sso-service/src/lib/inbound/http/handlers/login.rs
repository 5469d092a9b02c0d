use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::require_text;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::models::AppId;
use crate::domain::identity::ports::AuthServicePort;
use crate::identity::errors::AuthError;
use crate::inbound::http::router::AppState;

pub async fn login<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let Json(body) = body?;

    require_text(&body.email, "email")?;
    require_text(&body.password, "password")?;
    if body.app_id == 0 {
        return Err(AuthError::MissingField("app_id").into());
    }

    state
        .auth_service
        .login(&body.email, &body.password, AppId(body.app_id))
        .await
        .map_err(ApiError::from)
        .map(|token| ApiSuccess::new(StatusCode::OK, LoginResponseData { token }))
}

/// Absent fields deserialize to their zero values and are rejected above.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    app_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
}
