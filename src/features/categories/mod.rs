//! Hierarchical categories.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/categoryApi/create` | Create a category |
//! | GET | `/categoryApi/category` | Get a category by `categoryId` or `slug` |
//! | GET | `/categoryApi/getCategoryChildren` | Direct children of a category |
//! | PATCH | `/categoryApi/updateVisibility` | Show or hide a category |
//!
//! Reads are cached in memory and answered with `Cache-Control: max-age=14400`.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use handlers::CategoryState;
pub use repositories::PgCategoryRepository;
pub use services::CategoryService;
