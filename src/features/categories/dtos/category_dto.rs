use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{
    parse_category_id, Category, CategoryKey, CategoryNode, NewCategory,
};
use crate::shared::constants::MAX_PARENT_DEPTH;
use crate::shared::types::Payload;

/// Wire form of a category.
///
/// `parentCategory` nests the resolved ancestors, nearest first. Two DTOs
/// are equal when their id, name and slug match.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(no_recursion)]
pub struct CategoryDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[validate(length(max = 50, message = "Name must not exceed 50 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[validate(
        length(min = 1, max = 50, message = "Slug must be 1-50 characters"),
        regex(
            path = "*crate::shared::validation::SLUG_REGEX",
            message = "Slug must be lowercase alphanumeric segments separated by single hyphens"
        )
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default)]
    pub is_visible: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_category: Option<Box<CategoryDto>>,
}

impl PartialEq for CategoryDto {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name && self.slug == other.slug
    }
}

impl Eq for CategoryDto {}

impl Hash for CategoryDto {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.name.hash(state);
        self.slug.hash(state);
    }
}

impl Payload for CategoryDto {}

impl CategoryDto {
    /// Key this DTO addresses; id wins when both id and slug are set.
    pub fn lookup_key(&self) -> Result<CategoryKey> {
        CategoryKey::from_parts(self.id.as_deref(), self.slug.as_deref())
    }

    /// Build the DTO for `category`, nesting `ancestors` (nearest first).
    ///
    /// When the chain stops before a declared parent (depth cap, cycle or a
    /// dangling reference) the parent is emitted as an id-only stub so the
    /// linkage survives.
    pub fn from_lineage(category: &Category, ancestors: &[Category]) -> Self {
        let parent_category = match ancestors.split_first() {
            Some((parent, rest)) => Some(Box::new(Self::from_lineage(parent, rest))),
            None => category.parent_category_id.map(|id| {
                Box::new(CategoryDto {
                    id: Some(id.to_string()),
                    ..Default::default()
                })
            }),
        };

        Self {
            id: Some(category.id.to_string()),
            name: category.name.clone(),
            slug: Some(category.slug.clone()),
            is_visible: category.is_visible,
            parent_category,
        }
    }

    /// Flatten this DTO back into entities, the category itself first.
    ///
    /// Every level needs an id and a slug, except an id-only parent stub
    /// which ends the chain.
    pub fn into_lineage(self) -> Result<Vec<Category>> {
        let mut lineage = Vec::new();
        let mut current = Some(self);

        while let Some(dto) = current.take() {
            let id = dto
                .id
                .as_deref()
                .ok_or_else(|| AppError::InvalidArgument("Category id is required".to_string()))
                .and_then(parse_category_id)?;
            let slug = dto.slug.ok_or_else(|| {
                AppError::InvalidArgument(format!("Category {} has no slug", id))
            })?;

            let parent = dto.parent_category.map(|parent| *parent);
            let parent_category_id = match &parent {
                Some(parent) => Some(
                    parent
                        .id
                        .as_deref()
                        .ok_or_else(|| {
                            AppError::InvalidArgument("Parent category id is required".to_string())
                        })
                        .and_then(parse_category_id)?,
                ),
                None => None,
            };

            lineage.push(Category {
                id,
                name: dto.name,
                slug,
                is_visible: dto.is_visible,
                parent_category_id,
            });

            current = parent.filter(|p| p.slug.is_some());
        }

        Ok(lineage)
    }

    /// Values for persisting this DTO as a new category. The client id is
    /// ignored; the parent is referenced by id only.
    pub fn to_new_category(&self) -> Result<NewCategory> {
        let slug = self
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AppError::InvalidArgument("A slug is required to create a category".to_string())
            })?;

        let parent_category_id = match &self.parent_category {
            Some(parent) => match parent.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                Some(id) => Some(parse_category_id(id)?),
                None => {
                    return Err(AppError::InvalidArgument(
                        "The parent category must be referenced by id".to_string(),
                    ))
                }
            },
            None => None,
        };

        Ok(NewCategory {
            name: self.name.clone(),
            slug: slug.to_string(),
            is_visible: self.is_visible,
            parent_category_id,
        })
    }
}

impl From<CategoryNode> for CategoryDto {
    fn from(node: CategoryNode) -> Self {
        let depth = node.ancestors.len().min(MAX_PARENT_DEPTH);
        Self::from_lineage(&node.category, &node.ancestors[..depth])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn category(slug: &str, parent: Option<&Category>) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: Some(format!("{} name", slug)),
            slug: slug.to_string(),
            is_visible: slug.len() % 2 == 0,
            parent_category_id: parent.map(|p| p.id),
        }
    }

    #[test]
    fn test_three_level_chain_survives_conversion() {
        let root = category("root", None);
        let middle = category("middle", Some(&root));
        let leaf = category("leaf-1", Some(&middle));

        let dto = CategoryDto::from(CategoryNode {
            category: leaf.clone(),
            ancestors: vec![middle.clone(), root.clone()],
        });
        let lineage = dto.into_lineage().unwrap();

        assert_eq!(lineage, vec![leaf, middle, root]);
    }

    #[test]
    fn test_serializes_camel_case_and_omits_nulls() {
        let mut root = category("root", None);
        root.name = None;
        root.is_visible = false;
        let child = category("child", Some(&root));

        let dto = CategoryDto::from(CategoryNode {
            category: child.clone(),
            ancestors: vec![root.clone()],
        });
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["slug"], "child");
        assert_eq!(json["isVisible"], child.is_visible);
        assert_eq!(json["parentCategory"]["id"], root.id.to_string());
        assert!(json["parentCategory"].get("name").is_none());
        assert_eq!(json["parentCategory"]["isVisible"], false);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let dto: CategoryDto =
            serde_json::from_str(r#"{"slug":"col-000","colour":"red"}"#).unwrap();

        assert_eq!(dto.slug.as_deref(), Some("col-000"));
        assert!(!dto.is_visible);
    }

    #[test]
    fn test_unresolved_parent_becomes_stub() {
        let parent_id = Uuid::new_v4();
        let mut orphan = category("orphan", None);
        orphan.parent_category_id = Some(parent_id);

        let dto = CategoryDto::from(CategoryNode::leaf(orphan.clone()));
        let parent = dto.parent_category.clone().unwrap();

        assert_eq!(parent.id, Some(parent_id.to_string()));
        assert!(parent.slug.is_none());
        assert_eq!(dto.into_lineage().unwrap(), vec![orphan]);
    }

    #[test]
    fn test_nesting_is_capped() {
        let mut chain = vec![category("c0", None)];
        for i in 1..=MAX_PARENT_DEPTH + 2 {
            let next = category(&format!("c{}", i), chain.last());
            chain.push(next);
        }
        chain.reverse();
        let leaf = chain.remove(0);

        let dto = CategoryDto::from(CategoryNode {
            category: leaf,
            ancestors: chain,
        });

        let mut depth = 0;
        let mut current = dto.parent_category.as_deref();
        while let Some(parent) = current {
            if parent.slug.is_some() {
                depth += 1;
            }
            current = parent.parent_category.as_deref();
        }
        assert_eq!(depth, MAX_PARENT_DEPTH);
    }

    #[test]
    fn test_equality_ignores_visibility_and_parent() {
        let a = CategoryDto {
            id: Some("1".into()),
            name: Some("Floral".into()),
            slug: Some("slug-1".into()),
            is_visible: true,
            parent_category: None,
        };
        let b = CategoryDto {
            is_visible: false,
            parent_category: Some(Box::default()),
            ..a.clone()
        };

        let set: HashSet<CategoryDto> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_new_category_ignores_client_id() {
        let parent_id = Uuid::new_v4();
        let dto = CategoryDto {
            id: Some(Uuid::new_v4().to_string()),
            name: Some("Floral".into()),
            slug: Some("floral".into()),
            is_visible: true,
            parent_category: Some(Box::new(CategoryDto {
                id: Some(parent_id.to_string()),
                ..Default::default()
            })),
        };

        let new_category = dto.to_new_category().unwrap();

        assert_eq!(
            new_category,
            NewCategory {
                name: Some("Floral".into()),
                slug: "floral".into(),
                is_visible: true,
                parent_category_id: Some(parent_id),
            }
        );
    }

    #[test]
    fn test_parent_by_slug_is_rejected() {
        let dto = CategoryDto {
            slug: Some("child".into()),
            parent_category: Some(Box::new(CategoryDto {
                slug: Some("root".into()),
                ..Default::default()
            })),
            ..Default::default()
        };

        assert!(matches!(
            dto.to_new_category(),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_slug_format_is_validated() {
        let dto = CategoryDto {
            slug: Some("Not A Slug".into()),
            ..Default::default()
        };

        assert!(dto.validate().is_err());
    }
}
