use std::collections::HashSet;
use std::hash::BuildHasher;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::error::{AppError, Result};
use crate::core::translator;
use crate::shared::constants::CACHE_CONTROL_VALUE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseCode {
    Success,
    Unsuccess,
    Error,
    Unauthorised,
}

/// Inbound envelope wrapping the single request parameter.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceRequest<T> {
    pub parameter: Option<T>,
}

impl<T> ServiceRequest<T> {
    pub fn require_parameter(&self) -> Result<&T> {
        self.parameter
            .as_ref()
            .ok_or_else(|| AppError::InvalidArgument("The required parameter is null".to_string()))
    }
}

/// Outbound envelope: `{code, result?, error?}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceResponse<T> {
    pub code: ResponseCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ServiceError>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceError {
    pub message: String,
    pub cause: String,
}

impl ServiceResponse<()> {
    pub fn failure(code: ResponseCode, error: ServiceError) -> Self {
        Self {
            code,
            result: None,
            error: Some(error),
        }
    }
}

/// Result values that can be "present but empty" (collections).
pub trait Payload {
    fn is_empty_payload(&self) -> bool {
        false
    }
}

impl Payload for String {}

impl<T> Payload for Vec<T> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl<T, S: BuildHasher> Payload for HashSet<T, S> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

/// A successful (non-error) outcome of a pipeline operation, ready to be sent.
///
/// Absent or empty results become `UNSUCCESS`/404; anything else is
/// `SUCCESS`/200. A cache hint is only ever attached to a success.
#[derive(Debug)]
pub struct Envelope<T> {
    status: StatusCode,
    body: ServiceResponse<T>,
    cache_control: Option<&'static str>,
}

impl<T: Payload> Envelope<T> {
    pub fn from_result(result: Option<T>) -> Self {
        match result {
            Some(value) if !value.is_empty_payload() => Self {
                status: StatusCode::OK,
                body: ServiceResponse {
                    code: ResponseCode::Success,
                    result: Some(value),
                    error: None,
                },
                cache_control: None,
            },
            _ => Self {
                status: StatusCode::NOT_FOUND,
                body: ServiceResponse {
                    code: ResponseCode::Unsuccess,
                    result: None,
                    error: None,
                },
                cache_control: None,
            },
        }
    }
}

impl<T> Envelope<T> {
    pub fn cacheable(mut self) -> Self {
        if self.body.code == ResponseCode::Success {
            self.cache_control = Some(CACHE_CONTROL_VALUE);
        }
        self
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[cfg(test)]
    pub fn body(&self) -> &ServiceResponse<T> {
        &self.body
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let mut response = translator::json_response(self.status, &self.body, None);
        if let Some(value) = self.cache_control {
            response
                .headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static(value));
        }
        response
    }
}
