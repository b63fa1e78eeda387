pub mod category;

pub use category::{parse_category_id, Category, CategoryKey, CategoryNode, NewCategory};
