use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};

use crate::core::middleware;
use crate::features::auth::TokenService;
use crate::features::categories::handlers::{self, CategoryState};

/// Create routes for the categories feature
///
/// Every route requires a bearer token issued by `/generateToken`.
pub fn routes(state: CategoryState, tokens: Arc<TokenService>) -> Router {
    Router::new()
        .route("/create", post(handlers::create_category))
        .route("/category", get(handlers::get_category))
        .route("/getCategoryChildren", get(handlers::get_category_children))
        .route("/updateVisibility", patch(handlers::update_visibility))
        .route_layer(from_fn_with_state(
            tokens,
            middleware::bearer_auth_middleware,
        ))
        .with_state(state)
}
