use std::sync::Arc;

use axum::{middleware::from_fn, routing::post, Router};

use crate::core::middleware;
use crate::features::auth::handlers::{self, TokenState};

/// Token routes, guarded by the API client's Basic credentials
pub fn routes(state: TokenState, client_credentials: Arc<String>) -> Router {
    Router::new()
        .route("/generateToken", post(handlers::generate_token))
        .route_layer(from_fn(middleware::basic_auth_middleware(
            client_credentials,
            "category-api",
        )))
        .with_state(state)
}
