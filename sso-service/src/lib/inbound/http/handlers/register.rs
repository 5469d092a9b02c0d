use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::require_text;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn register<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    let Json(body) = body?;

    require_text(&body.email, "email")?;
    require_text(&body.password, "password")?;

    let email = EmailAddress::new(body.email)
        .map_err(|e| ApiError::BadRequest(format!("Invalid email: {}", e)))?;

    state
        .auth_service
        .register_new_user(email.as_str(), &body.password)
        .await
        .map_err(ApiError::from)
        .map(|user_id| {
            ApiSuccess::new(
                StatusCode::CREATED,
                RegisterResponseData { user_id: user_id.0 },
            )
        })
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub user_id: i64,
}
