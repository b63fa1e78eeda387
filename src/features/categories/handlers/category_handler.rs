use std::collections::HashSet;
use std::sync::Arc;

use axum::{extract::State, response::Response};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::core::translator::ExceptionTranslator;
use crate::features::auth::model::AuthenticatedSubject;
use crate::features::categories::dtos::CategoryDto;
use crate::features::categories::models::CategoryKey;
use crate::features::categories::services::CategoryService;
use crate::shared::types::{Envelope, ServiceRequest, ServiceResponse};

#[derive(Clone)]
pub struct CategoryState {
    pub service: Arc<CategoryService>,
    pub translator: Arc<ExceptionTranslator>,
}

/// Either key addresses a category; `categoryId` wins when both are given
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CategoryKeyQuery {
    pub category_id: Option<String>,
    pub slug: Option<String>,
}

impl CategoryKeyQuery {
    fn key(&self) -> Result<CategoryKey> {
        CategoryKey::from_parts(self.category_id.as_deref(), self.slug.as_deref())
    }
}

/// Create a category
///
/// The store assigns the id; a parent is referenced by its id.
#[utoipa::path(
    post,
    path = "/categoryApi/create",
    request_body = ServiceRequest<CategoryDto>,
    responses(
        (status = 200, description = "Category created", body = ServiceResponse<CategoryDto>),
        (status = 400, description = "Missing keys or invalid category"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Missing anti-forgery token"),
        (status = 500, description = "Category could not be stored")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<CategoryState>,
    subject: AuthenticatedSubject,
    payload: std::result::Result<AppJson<ServiceRequest<CategoryDto>>, AppError>,
) -> Response {
    let request = match payload {
        Ok(AppJson(request)) => request,
        Err(e) => return state.translator.translate(&e, "createCategory", "-"),
    };
    let outcome = create(&state.service, &subject, &request).await;
    state.translator.respond("createCategory", &request, outcome)
}

async fn create(
    service: &CategoryService,
    subject: &AuthenticatedSubject,
    request: &ServiceRequest<CategoryDto>,
) -> Result<Envelope<CategoryDto>> {
    let dto = request.require_parameter()?;
    dto.lookup_key()?;
    dto.validate()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))?;

    tracing::info!("Creating category slug={:?} for {}", dto.slug, subject.sub);
    let created = service.create_category(dto.to_new_category()?).await?;
    Ok(Envelope::from_result(Some(CategoryDto::from(created))))
}

/// Get a category by id or slug
#[utoipa::path(
    get,
    path = "/categoryApi/category",
    params(CategoryKeyQuery),
    responses(
        (status = 200, description = "Category found", body = ServiceResponse<CategoryDto>),
        (status = 400, description = "Neither categoryId nor slug supplied"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<CategoryState>,
    query: std::result::Result<AppQuery<CategoryKeyQuery>, AppError>,
) -> Response {
    let query = match query {
        Ok(AppQuery(query)) => query,
        Err(e) => return state.translator.translate(&e, "getCategory", "-"),
    };
    let outcome = lookup(&state.service, &query).await;
    state.translator.respond("getCategory", &query, outcome)
}

async fn lookup(
    service: &CategoryService,
    query: &CategoryKeyQuery,
) -> Result<Envelope<CategoryDto>> {
    let key = query.key()?;
    let found = service.get_category_by_id_or_slug(&key).await?;
    Ok(Envelope::from_result(found.map(CategoryDto::from)).cacheable())
}

/// Get the direct children of a category
#[utoipa::path(
    get,
    path = "/categoryApi/getCategoryChildren",
    params(CategoryKeyQuery),
    responses(
        (status = 200, description = "Children found", body = ServiceResponse<Vec<CategoryDto>>),
        (status = 400, description = "Neither categoryId nor slug supplied"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "No children")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn get_category_children(
    State(state): State<CategoryState>,
    query: std::result::Result<AppQuery<CategoryKeyQuery>, AppError>,
) -> Response {
    let query = match query {
        Ok(AppQuery(query)) => query,
        Err(e) => return state.translator.translate(&e, "getCategoryChildren", "-"),
    };
    let outcome = children(&state.service, &query).await;
    state
        .translator
        .respond("getCategoryChildren", &query, outcome)
}

async fn children(
    service: &CategoryService,
    query: &CategoryKeyQuery,
) -> Result<Envelope<HashSet<CategoryDto>>> {
    let key = query.key()?;
    let children: HashSet<CategoryDto> = service
        .get_category_children(&key)
        .await?
        .into_iter()
        .map(CategoryDto::from)
        .collect();
    Ok(Envelope::from_result(Some(children)).cacheable())
}

/// Show or hide a category
///
/// Echoes the request when at least one row changed.
#[utoipa::path(
    patch,
    path = "/categoryApi/updateVisibility",
    request_body = ServiceRequest<CategoryDto>,
    responses(
        (status = 200, description = "Visibility updated", body = ServiceResponse<CategoryDto>),
        (status = 400, description = "Neither id nor slug supplied"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Missing anti-forgery token"),
        (status = 404, description = "No category changed")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn update_visibility(
    State(state): State<CategoryState>,
    subject: AuthenticatedSubject,
    payload: std::result::Result<AppJson<ServiceRequest<CategoryDto>>, AppError>,
) -> Response {
    let request = match payload {
        Ok(AppJson(request)) => request,
        Err(e) => return state.translator.translate(&e, "updateVisibility", "-"),
    };
    let outcome = change_visibility(&state.service, &subject, &request).await;
    state
        .translator
        .respond("updateVisibility", &request, outcome)
}

async fn change_visibility(
    service: &CategoryService,
    subject: &AuthenticatedSubject,
    request: &ServiceRequest<CategoryDto>,
) -> Result<Envelope<CategoryDto>> {
    let dto = request.require_parameter()?;
    let key = dto.lookup_key()?;

    tracing::info!(
        "Setting visibility of {} to {} for {}",
        key,
        dto.is_visible,
        subject.sub
    );
    let rows = service.update_visibility(&key, dto.is_visible).await?;
    Ok(Envelope::from_result((rows > 0).then(|| dto.clone())))
}
