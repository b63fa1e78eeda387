use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::handlers as auth_handlers;
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::shared::types::{ResponseCode, ServiceError, ServiceRequest, ServiceResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::generate_token,
        // Categories
        categories_handlers::create_category,
        categories_handlers::get_category,
        categories_handlers::get_category_children,
        categories_handlers::update_visibility,
    ),
    components(
        schemas(
            // Shared
            ResponseCode,
            ServiceError,
            ServiceRequest<String>,
            ServiceResponse<String>,
            // Categories
            categories_dtos::CategoryDto,
            ServiceRequest<categories_dtos::CategoryDto>,
            ServiceResponse<categories_dtos::CategoryDto>,
            ServiceResponse<Vec<categories_dtos::CategoryDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Bearer token issuance"),
        (name = "categories", description = "Hierarchical categories"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Category API",
        version = "0.1.0",
        description = "Hierarchical category management",
    )
)]
pub struct ApiDoc;

/// Adds the Bearer JWT and client Basic security schemes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
