use tonic::Status;

use super::into_status;
use super::require_text;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::ports::AuthServicePort;
use crate::proto::RegisterRequest;
use crate::proto::RegisterResponse;

pub async fn register<S>(service: &S, request: RegisterRequest) -> Result<RegisterResponse, Status>
where
    S: AuthServicePort + ?Sized,
{
    require_text(&request.email, "email")?;
    require_text(&request.password, "password")?;

    let email = EmailAddress::new(request.email)
        .map_err(|e| Status::invalid_argument(format!("Invalid email: {}", e)))?;

    let user_id = service
        .register_new_user(email.as_str(), &request.password)
        .await
        .map_err(|e| into_status(e, "failed to register user"))?;

    Ok(RegisterResponse { user_id: user_id.0 })
}
