use std::sync::Arc;

use axum::{extract::State, response::Response};

use crate::core::error::AppError;
use crate::core::extractor::AppJson;
use crate::core::translator::ExceptionTranslator;
use crate::features::auth::services::TokenService;
use crate::shared::constants::TOKEN_TTL;
use crate::shared::types::{Envelope, ServiceRequest, ServiceResponse};

#[derive(Clone)]
pub struct TokenState {
    pub token_service: Arc<TokenService>,
    pub translator: Arc<ExceptionTranslator>,
}

/// Issue a bearer token for the given subject
///
/// The token expires after six minutes.
#[utoipa::path(
    post,
    path = "/categoryApi/generateToken",
    request_body = ServiceRequest<String>,
    responses(
        (status = 200, description = "Token issued", body = ServiceResponse<String>),
        (status = 400, description = "Missing subject"),
        (status = 401, description = "Invalid client credentials or blank subject"),
        (status = 403, description = "Missing anti-forgery token")
    ),
    security(("basic_auth" = [])),
    tag = "auth"
)]
pub async fn generate_token(
    State(state): State<TokenState>,
    payload: Result<AppJson<ServiceRequest<String>>, AppError>,
) -> Response {
    let request = match payload {
        Ok(AppJson(request)) => request,
        Err(e) => return state.translator.translate(&e, "generateToken", "-"),
    };
    let outcome = request
        .require_parameter()
        .and_then(|subject| state.token_service.generate_token(subject, TOKEN_TTL))
        .map(|token| Envelope::from_result(Some(token)));

    state.translator.respond("generateToken", &request, outcome)
}
