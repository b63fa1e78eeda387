use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, CategoryKey, NewCategory};

const FIND_BY_ID: &str =
    "SELECT id, name, slug, is_visible, parent_category_id FROM categories WHERE id = $1";
const FIND_BY_SLUG: &str =
    "SELECT id, name, slug, is_visible, parent_category_id FROM categories WHERE slug = $1";

/// Persistence boundary for categories.
///
/// Lookups take a [`CategoryKey`], so an implementation is only ever asked
/// to filter by id or by slug, never both.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_key(&self, key: &CategoryKey) -> Result<Option<Category>>;

    /// Direct children of the category addressed by `key`.
    async fn find_children(&self, key: &CategoryKey) -> Result<Vec<Category>>;

    /// Set the visibility flag; returns the number of rows changed.
    async fn update_visibility(&self, key: &CategoryKey, is_visible: bool) -> Result<u64>;

    async fn save(&self, category: &NewCategory) -> Result<Category>;
}

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn find_by_key(&self, key: &CategoryKey) -> Result<Option<Category>> {
        let query = match key {
            CategoryKey::ById(id) => sqlx::query_as::<_, Category>(FIND_BY_ID).bind(*id),
            CategoryKey::BySlug(slug) => {
                sqlx::query_as::<_, Category>(FIND_BY_SLUG).bind(slug.clone())
            }
        };

        query.fetch_optional(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to find category by {}: {:?}", key, e);
            AppError::Integration(e)
        })
    }

    async fn find_children(&self, key: &CategoryKey) -> Result<Vec<Category>> {
        let result = match key {
            CategoryKey::ById(id) => {
                sqlx::query_as::<_, Category>(
                    "SELECT id, name, slug, is_visible, parent_category_id \
                     FROM categories WHERE parent_category_id = $1 ORDER BY slug",
                )
                .bind(*id)
                .fetch_all(&self.pool)
                .await
            }
            CategoryKey::BySlug(slug) => {
                sqlx::query_as::<_, Category>(
                    "SELECT c.id, c.name, c.slug, c.is_visible, c.parent_category_id \
                     FROM categories c \
                     JOIN categories p ON c.parent_category_id = p.id \
                     WHERE p.slug = $1 \
                     ORDER BY c.slug",
                )
                .bind(slug.as_str())
                .fetch_all(&self.pool)
                .await
            }
        };

        result.map_err(|e| {
            tracing::error!("Failed to find children of {}: {:?}", key, e);
            AppError::Integration(e)
        })
    }

    async fn update_visibility(&self, key: &CategoryKey, is_visible: bool) -> Result<u64> {
        let result = match key {
            CategoryKey::ById(id) => {
                sqlx::query(
                    "UPDATE categories SET is_visible = $1, updated_at = NOW() WHERE id = $2",
                )
                .bind(is_visible)
                .bind(*id)
                .execute(&self.pool)
                .await
            }
            CategoryKey::BySlug(slug) => {
                sqlx::query(
                    "UPDATE categories SET is_visible = $1, updated_at = NOW() WHERE slug = $2",
                )
                .bind(is_visible)
                .bind(slug.as_str())
                .execute(&self.pool)
                .await
            }
        };

        result.map(|done| done.rows_affected()).map_err(|e| {
            tracing::error!("Failed to update visibility of {}: {:?}", key, e);
            AppError::Integration(e)
        })
    }

    async fn save(&self, category: &NewCategory) -> Result<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, slug, is_visible, parent_category_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, slug, is_visible, parent_category_id",
        )
        .bind(Uuid::now_v7())
        .bind(category.name.as_deref())
        .bind(category.slug.as_str())
        .bind(category.is_visible)
        .bind(category.parent_category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create category {}: {:?}", category.slug, e);
            AppError::Integration(e)
        })
    }
}
