use std::sync::Arc;

use tonic::Request;
use tonic::Response;
use tonic::Status;

use super::handlers::is_admin;
use super::handlers::login;
use super::handlers::register;
use crate::domain::identity::ports::AuthServicePort;
use crate::proto::auth_server::Auth as AuthProto;
use crate::proto::IsAdminRequest;
use crate::proto::IsAdminResponse;
use crate::proto::LoginRequest;
use crate::proto::LoginResponse;
use crate::proto::RegisterRequest;
use crate::proto::RegisterResponse;

pub struct AuthGrpcService<S>
where
    S: AuthServicePort,
{
    service: Arc<S>,
}

impl<S> AuthGrpcService<S>
where
    S: AuthServicePort,
{
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl<S> AuthProto for AuthGrpcService<S>
where
    S: AuthServicePort,
{
    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        let response = login::login(self.service.as_ref(), request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let response = register::register(self.service.as_ref(), request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn is_admin(
        &self,
        request: Request<IsAdminRequest>,
    ) -> Result<Response<IsAdminResponse>, Status> {
        let response = is_admin::is_admin(self.service.as_ref(), request.into_inner()).await?;
        Ok(Response::new(response))
    }
}
