use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, CategoryKey, CategoryNode, NewCategory};
use crate::features::categories::repositories::CategoryRepository;
use crate::shared::cache::{CachePolicy, ReadThroughCache};
use crate::shared::constants::MAX_PARENT_DEPTH;

type LookupCache = ReadThroughCache<CategoryKey, CategoryKey, Option<CategoryNode>>;
type ChildrenCache = ReadThroughCache<CategoryKey, CategoryKey, Vec<CategoryNode>>;

fn cache_key(key: &CategoryKey) -> CategoryKey {
    key.clone()
}

fn always(_: &Option<CategoryNode>) -> bool {
    true
}

#[allow(clippy::ptr_arg)]
fn has_children(children: &Vec<CategoryNode>) -> bool {
    !children.is_empty()
}

/// Service for category operations
///
/// Reads go through two read-through caches. A lookup caches absent results
/// too; a children query never caches an empty set. Any successful mutation
/// clears both caches.
pub struct CategoryService {
    repository: Arc<dyn CategoryRepository>,
    lookups: LookupCache,
    children: ChildrenCache,
}

impl CategoryService {
    pub fn new(repository: Arc<dyn CategoryRepository>, cache_ttl: Duration) -> Self {
        Self {
            repository,
            lookups: ReadThroughCache::new(
                "category",
                CachePolicy {
                    key: cache_key,
                    store_if: always,
                },
                cache_ttl,
            ),
            children: ReadThroughCache::new(
                "category_children",
                CachePolicy {
                    key: cache_key,
                    store_if: has_children,
                },
                cache_ttl,
            ),
        }
    }

    /// Get a category with its parent chain by id or slug
    pub async fn get_category_by_id_or_slug(
        &self,
        key: &CategoryKey,
    ) -> Result<Option<CategoryNode>> {
        self.lookups
            .get_or_load(key, || self.load_category(key))
            .await
            .map_err(|e| AppError::business(format!("Failed to get category by {}", key), e))
    }

    pub async fn create_category(&self, category: NewCategory) -> Result<CategoryNode> {
        let created = self.persist(&category).await.map_err(|e| {
            AppError::business(format!("Failed to create category slug={}", category.slug), e)
        })?;

        self.invalidate();
        tracing::info!(
            "Category created: id={}, slug={}",
            created.category.id,
            created.category.slug
        );
        Ok(created)
    }

    /// Direct children of a category; an empty result is never cached
    pub async fn get_category_children(&self, key: &CategoryKey) -> Result<Vec<CategoryNode>> {
        self.children
            .get_or_load(key, || self.load_children(key))
            .await
            .map_err(|e| AppError::business(format!("Failed to get children of {}", key), e))
    }

    /// Returns the number of rows changed
    pub async fn update_visibility(&self, key: &CategoryKey, is_visible: bool) -> Result<u64> {
        let rows = self
            .repository
            .update_visibility(key, is_visible)
            .await
            .map_err(|e| {
                AppError::business(format!("Failed to update visibility of {}", key), e)
            })?;

        if rows > 0 {
            self.invalidate();
            tracing::info!(
                "Category visibility updated: {}, is_visible={}, rows={}",
                key,
                is_visible,
                rows
            );
        }
        Ok(rows)
    }

    async fn load_category(&self, key: &CategoryKey) -> Result<Option<CategoryNode>> {
        match self.repository.find_by_key(key).await? {
            Some(category) => {
                let ancestors = self.resolve_ancestors(&category).await?;
                Ok(Some(CategoryNode {
                    category,
                    ancestors,
                }))
            }
            None => Ok(None),
        }
    }

    async fn load_children(&self, key: &CategoryKey) -> Result<Vec<CategoryNode>> {
        let children = self.repository.find_children(key).await?;

        // Siblings share one parent, so one chain serves them all
        let ancestors = match children.first() {
            Some(first) => self.resolve_ancestors(first).await?,
            None => Vec::new(),
        };

        Ok(children
            .into_iter()
            .map(|category| CategoryNode {
                category,
                ancestors: ancestors.clone(),
            })
            .collect())
    }

    async fn persist(&self, category: &NewCategory) -> Result<CategoryNode> {
        let created = self.repository.save(category).await?;
        let ancestors = self.resolve_ancestors(&created).await?;
        Ok(CategoryNode {
            category: created,
            ancestors,
        })
    }

    /// Walk parent ids upwards, nearest first. Stops at the depth cap, at a
    /// repeated id, or at a parent that does not exist.
    async fn resolve_ancestors(&self, category: &Category) -> Result<Vec<Category>> {
        let mut ancestors: Vec<Category> = Vec::new();
        let mut seen = HashSet::from([category.id]);
        let mut next = category.parent_category_id;

        while let Some(parent_id) = next {
            if ancestors.len() >= MAX_PARENT_DEPTH || !seen.insert(parent_id) {
                break;
            }
            match self
                .repository
                .find_by_key(&CategoryKey::ById(parent_id))
                .await?
            {
                Some(parent) => {
                    next = parent.parent_category_id;
                    ancestors.push(parent);
                }
                None => {
                    tracing::warn!(
                        "Category {} references missing parent {}",
                        category.id,
                        parent_id
                    );
                    break;
                }
            }
        }

        Ok(ancestors)
    }

    fn invalidate(&self) {
        self.lookups.invalidate_all();
        self.children.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::shared::test_helpers::{sample_category, MockCategoryRepository, RepositoryCall};

    fn service(repository: &Arc<MockCategoryRepository>) -> CategoryService {
        CategoryService::new(repository.clone(), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_lookup_with_both_keys_queries_by_id_only() {
        let category = sample_category("slug-1", None);
        let repository = Arc::new(MockCategoryRepository::with_categories(vec![
            category.clone(),
        ]));
        let service = service(&repository);

        let key =
            CategoryKey::from_parts(Some(&category.id.to_string()), Some("slug-1")).unwrap();
        let found = service.get_category_by_id_or_slug(&key).await.unwrap();

        assert_eq!(found.unwrap().category, category);
        assert_eq!(
            repository.calls(),
            vec![RepositoryCall::FindByKey(CategoryKey::ById(category.id))]
        );
    }

    #[tokio::test]
    async fn test_repeated_lookup_hits_repository_once() {
        let category = sample_category("col-000", None);
        let repository = Arc::new(MockCategoryRepository::with_categories(vec![category]));
        let service = service(&repository);
        let key = CategoryKey::BySlug("col-000".to_string());

        for _ in 0..3 {
            assert!(service
                .get_category_by_id_or_slug(&key)
                .await
                .unwrap()
                .is_some());
        }

        assert_eq!(repository.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_absent_lookup_is_cached() {
        let repository = Arc::new(MockCategoryRepository::default());
        let service = service(&repository);
        let key = CategoryKey::BySlug("missing".to_string());

        assert!(service.get_category_by_id_or_slug(&key).await.unwrap().is_none());
        assert!(service.get_category_by_id_or_slug(&key).await.unwrap().is_none());

        assert_eq!(repository.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_children_are_not_cached() {
        let parent = sample_category("parent", None);
        let repository = Arc::new(MockCategoryRepository::with_categories(vec![
            parent.clone(),
        ]));
        let service = service(&repository);
        let key = CategoryKey::ById(parent.id);

        for _ in 0..3 {
            assert!(service.get_category_children(&key).await.unwrap().is_empty());
        }

        assert_eq!(
            repository
                .calls()
                .iter()
                .filter(|call| matches!(call, RepositoryCall::FindChildren(_)))
                .count(),
            3
        );
    }

    #[tokio::test]
    async fn test_children_are_cached_with_parent_chain() {
        let parent = sample_category("parent", None);
        let first = sample_category("first", Some(&parent));
        let second = sample_category("second", Some(&parent));
        let repository = Arc::new(MockCategoryRepository::with_categories(vec![
            parent.clone(),
            first,
            second,
        ]));
        let service = service(&repository);
        let key = CategoryKey::BySlug("parent".to_string());

        let children = service.get_category_children(&key).await.unwrap();
        let again = service.get_category_children(&key).await.unwrap();

        assert_eq!(children.len(), 2);
        assert_eq!(children, again);
        assert!(children.iter().all(|node| node.ancestors == vec![parent.clone()]));
        assert_eq!(
            repository
                .calls()
                .iter()
                .filter(|call| matches!(call, RepositoryCall::FindChildren(_)))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_repository_failures_become_business_errors() {
        let repository = Arc::new(MockCategoryRepository::default());
        repository.fail();
        let service = service(&repository);
        let key = CategoryKey::BySlug("col-000".to_string());

        let lookup = service.get_category_by_id_or_slug(&key).await.unwrap_err();
        let children = service.get_category_children(&key).await.unwrap_err();
        let update = service.update_visibility(&key, true).await.unwrap_err();

        for error in [lookup, children, update] {
            assert_eq!(error.kind(), ErrorKind::Business);
            assert!(error.cause_chain().contains("slug=col-000"));
        }
    }

    #[tokio::test]
    async fn test_update_visibility_reports_rows_and_refreshes_cache() {
        let category = sample_category("col-000", None);
        let repository = Arc::new(MockCategoryRepository::with_categories(vec![category]));
        let service = service(&repository);
        let key = CategoryKey::BySlug("col-000".to_string());

        let before = service.get_category_by_id_or_slug(&key).await.unwrap().unwrap();
        let rows = service.update_visibility(&key, !before.category.is_visible).await.unwrap();
        let after = service.get_category_by_id_or_slug(&key).await.unwrap().unwrap();

        assert_eq!(rows, 1);
        assert_eq!(after.category.is_visible, !before.category.is_visible);
    }

    #[tokio::test]
    async fn test_update_visibility_of_unknown_category_changes_nothing() {
        let repository = Arc::new(MockCategoryRepository::default());
        let service = service(&repository);

        let rows = service
            .update_visibility(&CategoryKey::BySlug("col-000".to_string()), true)
            .await
            .unwrap();

        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_create_resolves_parent_and_invalidates() {
        let parent = sample_category("parent", None);
        let repository = Arc::new(MockCategoryRepository::with_categories(vec![
            parent.clone(),
        ]));
        let service = service(&repository);
        let parent_key = CategoryKey::ById(parent.id);

        assert!(service.get_category_children(&parent_key).await.unwrap().is_empty());
        let created = service
            .create_category(NewCategory {
                name: Some("Floral".to_string()),
                slug: "floral".to_string(),
                is_visible: true,
                parent_category_id: Some(parent.id),
            })
            .await
            .unwrap();
        let children = service.get_category_children(&parent_key).await.unwrap();

        assert_eq!(created.ancestors, vec![parent]);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].category.slug, "floral");
    }

    #[tokio::test]
    async fn test_parent_cycle_terminates() {
        let mut a = sample_category("a", None);
        let mut b = sample_category("b", None);
        a.parent_category_id = Some(b.id);
        b.parent_category_id = Some(a.id);
        let repository = Arc::new(MockCategoryRepository::with_categories(vec![
            a.clone(),
            b.clone(),
        ]));
        let service = service(&repository);

        let node = service
            .get_category_by_id_or_slug(&CategoryKey::ById(a.id))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(node.ancestors, vec![b]);
    }

    #[tokio::test]
    async fn test_parent_chain_is_capped() {
        let mut chain = vec![sample_category("c0", None)];
        for i in 1..=MAX_PARENT_DEPTH + 3 {
            let next = sample_category(&format!("c{}", i), chain.last());
            chain.push(next);
        }
        let leaf_id = chain.last().unwrap().id;
        let repository = Arc::new(MockCategoryRepository::with_categories(chain));
        let service = service(&repository);

        let node = service
            .get_category_by_id_or_slug(&CategoryKey::ById(leaf_id))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(node.ancestors.len(), MAX_PARENT_DEPTH);
    }
}
