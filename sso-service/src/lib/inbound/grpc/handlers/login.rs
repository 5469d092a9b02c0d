use tonic::Status;

use super::into_status;
use super::require_id;
use super::require_text;
use crate::domain::identity::models::AppId;
use crate::domain::identity::ports::AuthServicePort;
use crate::proto::LoginRequest;
use crate::proto::LoginResponse;

pub async fn login<S>(service: &S, request: LoginRequest) -> Result<LoginResponse, Status>
where
    S: AuthServicePort + ?Sized,
{
    require_text(&request.email, "email")?;
    require_text(&request.password, "password")?;
    require_id(i64::from(request.app_id), "app_id")?;

    let token = service
        .login(&request.email, &request.password, AppId(request.app_id))
        .await
        .map_err(|e| into_status(e, "failed to login"))?;

    Ok(LoginResponse { token })
}
