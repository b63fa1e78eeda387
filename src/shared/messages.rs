//! Localized messages for translated failures.
//!
//! Messages are Jinja templates keyed by a dotted message key. The built-in
//! catalog is en-US; callers render a key with `method` and `request`
//! arguments (and `error_type` for the unhandled message).

use minijinja::{Environment, UndefinedBehavior, Value};
use std::collections::HashMap;
use thiserror::Error;

pub const ILLEGAL_ARGUMENT: &str = "error.illegal_argument";
pub const BUSINESS: &str = "error.business";
pub const AUTHORIZATION: &str = "error.authorization";
pub const INTEGRATION: &str = "error.integration";
pub const INVALID_TOKEN: &str = "error.invalid_token";
pub const UNCATEGORIZED: &str = "error.uncategorized";
pub const UNHANDLED: &str = "error.unhandled";

const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    (
        ILLEGAL_ARGUMENT,
        "Invalid or missing required parameter invoking {{ method }}",
    ),
    (
        BUSINESS,
        "Business error processing request {{ request }} in {{ method }}",
    ),
    (
        AUTHORIZATION,
        "Not authorised to invoke {{ method }} with request {{ request }}",
    ),
    (
        INTEGRATION,
        "Data source unavailable processing request {{ request }} in {{ method }}",
    ),
    (
        INVALID_TOKEN,
        "Invalid or expired token invoking {{ method }} with request {{ request }}",
    ),
    (
        UNCATEGORIZED,
        "Unexpected error processing request {{ request }} in {{ method }}",
    ),
    (
        UNHANDLED,
        "Unhandled exception {{ error_type }} processing request {{ request }} in {{ method }}",
    ),
];

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Message '{0}' not found")]
    NotFound(String),

    #[error("Failed to render message: {0}")]
    RenderError(String),
}

/// Resolves a message key plus arguments into user-facing text.
pub trait MessageSource: Send + Sync {
    fn message(&self, key: &str, args: &HashMap<&str, Value>) -> Result<String, MessageError>;
}

/// Message source backed by a minijinja environment.
///
/// Undefined arguments are an error rather than an empty string, so a
/// template that references a missing argument fails loudly.
pub struct TemplateMessageSource {
    env: Environment<'static>,
}

impl Default for TemplateMessageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateMessageSource {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        for &(key, template) in DEFAULT_MESSAGES {
            if let Err(e) = env.add_template(key, template) {
                tracing::warn!("Failed to load message {}: {}", key, e);
            }
        }

        Self { env }
    }

    /// Replace (or add) the template for a single key.
    #[cfg(test)]
    pub fn with_message(
        mut self,
        key: &'static str,
        template: &'static str,
    ) -> Result<Self, MessageError> {
        self.env
            .add_template(key, template)
            .map_err(|e| MessageError::RenderError(e.to_string()))?;
        Ok(self)
    }
}

impl MessageSource for TemplateMessageSource {
    fn message(&self, key: &str, args: &HashMap<&str, Value>) -> Result<String, MessageError> {
        let template = self
            .env
            .get_template(key)
            .map_err(|_| MessageError::NotFound(key.to_string()))?;

        let render_ctx = Value::from_iter(args.iter().map(|(k, v)| (*k, v.clone())));

        template
            .render(render_ctx)
            .map_err(|e| MessageError::RenderError(e.to_string()))
    }
}
