use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::models::UserId;
use crate::domain::identity::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn is_admin<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<String>,
) -> Result<ApiSuccess<IsAdminResponseData>, ApiError> {
    let user_id = user_id
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid user id: {}", user_id)))?;
    if user_id == 0 {
        return Err(ApiError::BadRequest("user_id is required".to_string()));
    }

    state
        .auth_service
        .is_admin(UserId(user_id))
        .await
        .map_err(ApiError::from)
        .map(|is_admin| ApiSuccess::new(StatusCode::OK, IsAdminResponseData { is_admin }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IsAdminResponseData {
    pub is_admin: bool,
}
