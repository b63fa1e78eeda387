use std::sync::Arc;

use axum::{middleware::from_fn, Router};

use crate::core::middleware;
use crate::core::translator::ExceptionTranslator;
use crate::features::auth::{routes as auth_routes, TokenService, TokenState};
use crate::features::categories::{routes as categories_routes, CategoryService, CategoryState};

/// Everything the `/categoryApi` routes need
#[derive(Clone)]
pub struct ApiContext {
    pub category_service: Arc<CategoryService>,
    pub token_service: Arc<TokenService>,
    pub translator: Arc<ExceptionTranslator>,
    /// API client credentials ("username:password") guarding `/generateToken`
    pub client_credentials: Arc<String>,
}

/// The `/categoryApi` router.
///
/// Anti-forgery runs first, then the shallow ETag, then the per-route
/// credential gates.
pub fn api_routes(context: ApiContext) -> Router {
    let categories = categories_routes::routes(
        CategoryState {
            service: context.category_service,
            translator: Arc::clone(&context.translator),
        },
        Arc::clone(&context.token_service),
    );
    let tokens = auth_routes::routes(
        TokenState {
            token_service: context.token_service,
            translator: context.translator,
        },
        context.client_credentials,
    );

    Router::new()
        .nest("/categoryApi", categories.merge(tokens))
        .layer(from_fn(middleware::etag_middleware))
        .layer(from_fn(middleware::csrf_middleware))
}
