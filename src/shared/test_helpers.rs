//! Fixtures shared by the unit and HTTP tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{http::HeaderValue, Router};
use base64::prelude::*;
use fake::{faker::lorem::en::Word, Fake};
use uuid::Uuid;

use crate::core::app::{api_routes, ApiContext};
use crate::core::error::{AppError, Result};
use crate::core::translator::ExceptionTranslator;
use crate::features::auth::TokenService;
use crate::features::categories::models::{Category, CategoryKey, NewCategory};
use crate::features::categories::repositories::CategoryRepository;
use crate::features::categories::CategoryService;

pub const TEST_JWT_SECRET: &str = "test-secret";
pub const TEST_ISSUER: &str = "category-api";
pub const TEST_CLIENT_CREDENTIALS: &str = "client:client-secret";
pub const XSRF_TEST_TOKEN: &str = "3f0c5b1e-xsrf";

/// A category with a generated name
pub fn sample_category(slug: &str, parent: Option<&Category>) -> Category {
    let word: String = Word().fake();
    Category {
        id: Uuid::new_v4(),
        name: Some(word),
        slug: slug.to_string(),
        is_visible: true,
        parent_category_id: parent.map(|p| p.id),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryCall {
    FindByKey(CategoryKey),
    FindChildren(CategoryKey),
    UpdateVisibility(CategoryKey, bool),
    Save(NewCategory),
}

/// In-memory repository that records every call it receives
#[derive(Default)]
pub struct MockCategoryRepository {
    categories: Mutex<Vec<Category>>,
    calls: Mutex<Vec<RepositoryCall>>,
    failing: AtomicBool,
}

impl MockCategoryRepository {
    pub fn with_categories(categories: Vec<Category>) -> Self {
        Self {
            categories: Mutex::new(categories),
            ..Default::default()
        }
    }

    /// Make every subsequent call fail with a data-access error
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<RepositoryCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RepositoryCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Integration(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn matches(category: &Category, key: &CategoryKey) -> bool {
        match key {
            CategoryKey::ById(id) => category.id == *id,
            CategoryKey::BySlug(slug) => category.slug == *slug,
        }
    }
}

#[async_trait]
impl CategoryRepository for MockCategoryRepository {
    async fn find_by_key(&self, key: &CategoryKey) -> Result<Option<Category>> {
        self.record(RepositoryCall::FindByKey(key.clone()))?;
        let categories = self.categories.lock().unwrap();
        Ok(categories.iter().find(|c| Self::matches(c, key)).cloned())
    }

    async fn find_children(&self, key: &CategoryKey) -> Result<Vec<Category>> {
        self.record(RepositoryCall::FindChildren(key.clone()))?;
        let categories = self.categories.lock().unwrap();
        let parent_ids: Vec<Uuid> = categories
            .iter()
            .filter(|c| Self::matches(c, key))
            .map(|c| c.id)
            .collect();
        Ok(categories
            .iter()
            .filter(|c| {
                c.parent_category_id
                    .is_some_and(|parent| parent_ids.contains(&parent))
            })
            .cloned()
            .collect())
    }

    async fn update_visibility(&self, key: &CategoryKey, is_visible: bool) -> Result<u64> {
        self.record(RepositoryCall::UpdateVisibility(key.clone(), is_visible))?;
        let mut categories = self.categories.lock().unwrap();
        let mut rows = 0;
        for category in categories.iter_mut().filter(|c| Self::matches(c, key)) {
            category.is_visible = is_visible;
            rows += 1;
        }
        Ok(rows)
    }

    async fn save(&self, category: &NewCategory) -> Result<Category> {
        self.record(RepositoryCall::Save(category.clone()))?;
        let created = Category {
            id: Uuid::now_v7(),
            name: category.name.clone(),
            slug: category.slug.clone(),
            is_visible: category.is_visible,
            parent_category_id: category.parent_category_id,
        };
        self.categories.lock().unwrap().push(created.clone());
        Ok(created)
    }
}

pub fn test_token_service() -> Arc<TokenService> {
    Arc::new(TokenService::new(
        TEST_JWT_SECRET,
        TEST_ISSUER.to_string(),
        Duration::ZERO,
    ))
}

/// `Authorization` value carrying a fresh bearer token
pub fn bearer_header() -> HeaderValue {
    let token = test_token_service()
        .generate_token("test-client", Duration::from_secs(60))
        .unwrap();
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

/// `Authorization` value carrying Basic `credentials`
pub fn basic_header(credentials: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Basic {}", BASE64_STANDARD.encode(credentials))).unwrap()
}

/// The `/categoryApi` router over `repository`
pub fn test_router(repository: Arc<MockCategoryRepository>) -> Router {
    api_routes(ApiContext {
        category_service: Arc::new(CategoryService::new(
            repository,
            Duration::from_secs(60),
        )),
        token_service: test_token_service(),
        translator: Arc::new(ExceptionTranslator::default()),
        client_credentials: Arc::new(TEST_CLIENT_CREDENTIALS.to_string()),
    })
}
