use tonic::Status;

use super::into_status;
use super::require_id;
use crate::domain::identity::models::UserId;
use crate::domain::identity::ports::AuthServicePort;
use crate::proto::IsAdminRequest;
use crate::proto::IsAdminResponse;

pub async fn is_admin<S>(service: &S, request: IsAdminRequest) -> Result<IsAdminResponse, Status>
where
    S: AuthServicePort + ?Sized,
{
    require_id(request.user_id, "user_id")?;

    let is_admin = service
        .is_admin(UserId(request.user_id))
        .await
        .map_err(|e| into_status(e, "failed to check admin status"))?;

    Ok(IsAdminResponse { is_admin })
}
