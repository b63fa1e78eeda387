//! Translation of pipeline failures into response envelopes.
//!
//! Every handler funnels its outcome through [`ExceptionTranslator::respond`],
//! so each failure leaves the service as a JSON envelope with a status code
//! that identifies its broad class.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, OnceLock};

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use minijinja::Value;
use serde::Serialize;

use crate::core::error::{AppError, Result};
use crate::shared::messages::{self, MessageSource, TemplateMessageSource};
use crate::shared::types::{Envelope, ServiceError, ServiceResponse};

/// Body sent when an envelope cannot be serialized.
const FALLBACK_BODY: &str = r#"{"code":"ERROR","error":{"message":"Unhandled exception while translating a failure","cause":"serialization"}}"#;

static SHARED_TRANSLATOR: OnceLock<ExceptionTranslator> = OnceLock::new();

pub struct ExceptionTranslator {
    messages: Arc<dyn MessageSource>,
}

impl Default for ExceptionTranslator {
    fn default() -> Self {
        Self::new(Arc::new(TemplateMessageSource::new()))
    }
}

impl ExceptionTranslator {
    pub fn new(messages: Arc<dyn MessageSource>) -> Self {
        Self { messages }
    }

    /// Translator with the built-in catalog, for failures raised outside a
    /// handler (extractor rejections, the token gate).
    pub fn shared() -> &'static ExceptionTranslator {
        SHARED_TRANSLATOR.get_or_init(ExceptionTranslator::default)
    }

    pub fn respond<T, C>(&self, method: &str, request: &C, outcome: Result<Envelope<T>>) -> Response
    where
        T: Serialize,
        C: Debug + ?Sized,
    {
        match outcome {
            Ok(envelope) => envelope.into_response(),
            Err(error) => self.translate(&error, method, request),
        }
    }

    pub fn translate<C: Debug + ?Sized>(&self, error: &AppError, method: &str, request: &C) -> Response {
        let kind = error.kind();
        let status = kind.status();
        let message = self.describe(kind.message_key(), method, request);
        let cause = error.cause_chain();

        tracing::error!(
            method = %method,
            status = status.as_u16(),
            cause = %cause,
            "{}",
            message
        );

        let body = ServiceResponse::failure(kind.response_code(), ServiceError { message, cause });
        json_response(status, &body, Some(error))
    }

    /// Render the message for `key`; never fails.
    fn describe<C: Debug + ?Sized>(&self, key: &str, method: &str, request: &C) -> String {
        let request = format!("{:?}", request);
        let mut args: HashMap<&str, Value> = HashMap::new();
        args.insert("method", Value::from(method));
        args.insert("request", Value::from(request.as_str()));

        match self.messages.message(key, &args) {
            Ok(message) => message,
            Err(lookup_error) => {
                tracing::warn!("Message lookup for {} failed: {}", key, lookup_error);
                let error_type = lookup_error.to_string();
                args.insert("error_type", Value::from(error_type.as_str()));
                self.messages
                    .message(messages::UNHANDLED, &args)
                    .unwrap_or_else(|_| {
                        format!(
                            "Unhandled exception {} processing request {} in {}",
                            error_type, request, method
                        )
                    })
            }
        }
    }
}

/// Serialize `body` as the JSON response. A serialization failure is itself
/// translated into a fixed 500 body and logged with the original failure.
pub fn json_response<B: Serialize + ?Sized>(
    status: StatusCode,
    body: &B,
    original: Option<&AppError>,
) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (
            status,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(
                original = ?original,
                translation_error = %e,
                "Failed to serialize response envelope"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                )],
                FALLBACK_BODY,
            )
                .into_response()
        }
    }
}
