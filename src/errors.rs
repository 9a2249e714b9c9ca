


use hyper::StatusCode;
use thiserror::Error;
use crate::constants::*;



//// the whole failure taxonomy of the core; every controller maps one of these
//// onto the response envelope, nothing gets swallowed silently
#[derive(Debug, Error)]
pub enum AppError{
    #[error("{0}")]
    Validation(String), //// first failing field message, in schema declaration order
    #[error("{}", AUTH_FAILED)]
    AuthInvalid, //// missing/expired/bad-signature token or wrong credentials
    #[error("{}", ACCESS_DENIED)]
    AccessDenied, //// verified identity whose role is not allowed to do this
    #[error("{}", NOT_FOUND_APPLICATION)]
    NotFound,
    #[error("{}", ALREADY_REVIEWED)]
    AlreadyReviewed,
    #[error("{}", INVALID_DECISION)]
    InvalidDecision,
    #[error("malformed password hash")]
    InvalidHashFormat,
    #[error("decryption failed")]
    DecryptionFailed,
    #[error("{}", INTERNAL_SERVER_ERROR)]
    Internal(String), //// detail is logged server side, never sent to the caller
}

impl AppError{

    pub fn status(&self) -> StatusCode{
        match self{
            AppError::Validation(_) => StatusCode::NOT_ACCEPTABLE,
            AppError::AuthInvalid => StatusCode::UNAUTHORIZED,
            AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::AlreadyReviewed => StatusCode::CONFLICT,
            AppError::InvalidDecision => StatusCode::NOT_ACCEPTABLE,
            AppError::InvalidHashFormat => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DecryptionFailed => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    //// the message that is safe to put inside the response envelope; internal
    //// and cipher infrastructure failures are collapsed to a generic line
    pub fn public_message(&self) -> String{
        match self{
            AppError::Internal(detail) => {
                log::error!("internal error - {}", detail);
                INTERNAL_SERVER_ERROR.to_string()
            },
            AppError::InvalidHashFormat | AppError::DecryptionFailed => {
                log::error!("cipher infrastructure error - {}", self);
                INTERNAL_SERVER_ERROR.to_string()
            },
            other => other.to_string(),
        }
    }

}

impl From<mongodb::error::Error> for AppError{
    fn from(e: mongodb::error::Error) -> AppError{
        AppError::Internal(e.to_string())
    }
}
