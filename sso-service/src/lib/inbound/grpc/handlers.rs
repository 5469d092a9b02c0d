use tonic::Status;

use crate::identity::errors::AuthError;

pub mod is_admin;
pub mod login;
pub mod register;

/// Map a service failure onto a status code.
///
/// `internal_message` replaces whatever detail an internal error carries.
fn into_status(err: AuthError, internal_message: &'static str) -> Status {
    match err {
        AuthError::InvalidCredentials => Status::invalid_argument("invalid email or password"),
        AuthError::InvalidAppId => Status::invalid_argument("invalid app_id"),
        AuthError::MissingField(field) => Status::invalid_argument(format!("{} is required", field)),
        AuthError::UserAlreadyExists => Status::already_exists("user already exists"),
        AuthError::UserNotFound => Status::not_found("user not found"),
        AuthError::Internal { .. } => Status::internal(internal_message),
    }
}

fn require_text(value: &str, field: &'static str) -> Result<(), Status> {
    if value.is_empty() {
        return Err(Status::invalid_argument(format!("{} is required", field)));
    }
    Ok(())
}

fn require_id(value: i64, field: &'static str) -> Result<(), Status> {
    if value == 0 {
        return Err(Status::invalid_argument(format!("{} is required", field)));
    }
    Ok(())
}
