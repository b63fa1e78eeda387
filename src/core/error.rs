use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::core::translator::ExceptionTranslator;
use crate::shared::messages;
use crate::shared::types::ResponseCode;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Business error: {context}")]
    Business {
        context: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Database error: {0}")]
    Integration(#[from] sqlx::Error),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Broad failure class of an [`AppError`]; decides the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Business,
    Authorization,
    Integration,
    InvalidToken,
    Unclassified,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorKind::Business => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Authorization => StatusCode::UNAUTHORIZED,
            ErrorKind::Integration => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::InvalidToken => StatusCode::UNAUTHORIZED,
            ErrorKind::Unclassified => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn response_code(self) -> ResponseCode {
        match self {
            ErrorKind::Authorization | ErrorKind::InvalidToken => ResponseCode::Unauthorised,
            _ => ResponseCode::Error,
        }
    }

    pub fn message_key(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => messages::ILLEGAL_ARGUMENT,
            ErrorKind::Business => messages::BUSINESS,
            ErrorKind::Authorization => messages::AUTHORIZATION,
            ErrorKind::Integration => messages::INTEGRATION,
            ErrorKind::InvalidToken => messages::INVALID_TOKEN,
            ErrorKind::Unclassified => messages::UNCATEGORIZED,
        }
    }
}

impl AppError {
    /// Wrap a lower-level failure with the operation and input that caused it.
    pub fn business(context: impl Into<String>, source: AppError) -> Self {
        AppError::Business {
            context: context.into(),
            source: Box::new(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            AppError::Business { .. } => ErrorKind::Business,
            AppError::Authorization(_) => ErrorKind::Authorization,
            AppError::Integration(_) => ErrorKind::Integration,
            AppError::InvalidToken(_) => ErrorKind::InvalidToken,
            AppError::Internal(_) => ErrorKind::Unclassified,
        }
    }

    /// Human readable description of this error and every source below it.
    pub fn cause_chain(&self) -> String {
        let mut description = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            description.push_str(": ");
            description.push_str(&cause.to_string());
            source = cause.source();
        }
        description
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ExceptionTranslator::shared().translate(&self, "request", &"-")
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
