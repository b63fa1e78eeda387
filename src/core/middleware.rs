use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::prelude::*;
use sha2::{Digest, Sha256};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

use crate::core::translator::ExceptionTranslator;
use crate::features::auth::TokenService;
use crate::shared::constants::{XSRF_COOKIE, XSRF_HEADER};

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::now_v7().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    // If origins list contains "*", allow any origin
    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

/// HTTP Basic gate. `valid_credentials` is `username:password`; a mismatch
/// is answered with an empty 401 and a Basic challenge for `realm`.
pub fn basic_auth_middleware(
    valid_credentials: Arc<String>,
    realm: &'static str,
) -> impl Fn(
    Request,
    Next,
)
    -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, Response>> + Send>>
       + Clone {
    let challenge = HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm))
        .unwrap_or_else(|_| HeaderValue::from_static("Basic"));

    move |req: Request, next: Next| {
        let credentials = valid_credentials.clone();
        let challenge = challenge.clone();
        Box::pin(async move {
            let presented = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Basic "))
                .and_then(|encoded| BASE64_STANDARD.decode(encoded.trim()).ok())
                .and_then(|decoded| String::from_utf8(decoded).ok());

            if presented.as_deref() == Some(credentials.as_str()) {
                return Ok(next.run(req).await);
            }

            tracing::warn!("Rejected Basic credentials for {}", req.uri().path());
            let mut response = StatusCode::UNAUTHORIZED.into_response();
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, challenge);
            Err(response)
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Bearer gate for the category endpoints.
///
/// A missing or non-Bearer header is an empty 401. A token that fails
/// validation is translated into an `UNAUTHORISED` envelope.
pub async fn bearer_auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let Some(token) = bearer_token(req.headers()) else {
        return Err(StatusCode::UNAUTHORIZED.into_response());
    };

    let subject = tokens.validate_token(&token).map_err(|e| {
        ExceptionTranslator::shared().translate(&e, "authorize", req.uri())
    })?;

    req.extensions_mut().insert(subject);
    Ok(next.run(req).await)
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

fn xsrf_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == XSRF_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Double-submit anti-forgery check.
///
/// Unsafe methods must echo the `XSRF-TOKEN` cookie in the `X-XSRF-TOKEN`
/// header or get an empty 403. Safe requests without the cookie get one.
pub async fn csrf_middleware(req: Request, next: Next) -> Response {
    let cookie = xsrf_cookie(req.headers());

    if is_safe(req.method()) {
        let mut response = next.run(req).await;
        if cookie.is_none() {
            let issued = format!("{}={}; Path=/", XSRF_COOKIE, Uuid::new_v4());
            if let Ok(value) = HeaderValue::from_str(&issued) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        return response;
    }

    let echoed = req
        .headers()
        .get(XSRF_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim);
    let matches = matches!((cookie.as_deref(), echoed), (Some(c), Some(h)) if c == h);

    if !matches {
        tracing::warn!(
            "Rejected {} {}: anti-forgery token missing or mismatched",
            req.method(),
            req.uri().path()
        );
        return StatusCode::FORBIDDEN.into_response();
    }

    next.run(req).await
}

fn etag_matches(if_none_match: &HeaderValue, etag: &str) -> bool {
    if_none_match
        .to_str()
        .map(|value| {
            value.split(',').map(str::trim).any(|candidate| {
                candidate == "*" || candidate.trim_start_matches("W/") == etag
            })
        })
        .unwrap_or(false)
}

/// Shallow ETag for successful GET responses: the body is hashed after the
/// handler ran, and a matching `If-None-Match` turns the reply into a 304.
pub async fn etag_middleware(req: Request, next: Next) -> Response {
    if req.method() != Method::GET {
        return next.run(req).await;
    }

    let if_none_match = req.headers().get(header::IF_NONE_MATCH).cloned();
    let response = next.run(req).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Failed to buffer response body for ETag: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let digest = Sha256::digest(&bytes);
    let etag = format!("\"0{}\"", hex::encode(&digest[..16]));
    if let Ok(value) = HeaderValue::from_str(&etag) {
        parts.headers.insert(header::ETAG, value);
    }

    if if_none_match.is_some_and(|candidates| etag_matches(&candidates, &etag)) {
        parts.status = StatusCode::NOT_MODIFIED;
        parts.headers.remove(header::CONTENT_LENGTH);
        parts.headers.remove(header::CONTENT_TYPE);
        return Response::from_parts(parts, Body::empty());
    }

    Response::from_parts(parts, Body::from(bytes))
}
