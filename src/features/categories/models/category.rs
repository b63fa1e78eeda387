use std::fmt;

use sqlx::FromRow;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Database model for category
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: Option<String>,
    pub slug: String,
    pub is_visible: bool,
    pub parent_category_id: Option<Uuid>,
}

/// Values for a category that does not exist yet; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: Option<String>,
    pub slug: String,
    pub is_visible: bool,
    pub parent_category_id: Option<Uuid>,
}

/// Lookup key for a single category. Id wins over slug when both are known.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategoryKey {
    ById(Uuid),
    BySlug(String),
}

impl CategoryKey {
    /// Build a key from the raw `(id, slug)` pair of a request.
    ///
    /// Blank values count as absent. A present id must be a valid UUID.
    pub fn from_parts(id: Option<&str>, slug: Option<&str>) -> Result<Self> {
        let id = id.map(str::trim).filter(|s| !s.is_empty());
        let slug = slug.map(str::trim).filter(|s| !s.is_empty());

        match (id, slug) {
            (Some(id), _) => parse_category_id(id).map(CategoryKey::ById),
            (None, Some(slug)) => Ok(CategoryKey::BySlug(slug.to_string())),
            (None, None) => Err(AppError::InvalidArgument(format!(
                "The received required keys are invalid.[id={:?}, slug={:?}]",
                id, slug
            ))),
        }
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKey::ById(id) => write!(f, "id={}", id),
            CategoryKey::BySlug(slug) => write!(f, "slug={}", slug),
        }
    }
}

pub fn parse_category_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|e| AppError::InvalidArgument(format!("Invalid category id '{}': {}", raw, e)))
}

/// A category with its resolved ancestors, nearest parent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub category: Category,
    pub ancestors: Vec<Category>,
}

impl CategoryNode {
    #[cfg(test)]
    pub fn leaf(category: Category) -> Self {
        Self {
            category,
            ancestors: Vec::new(),
        }
    }
}
