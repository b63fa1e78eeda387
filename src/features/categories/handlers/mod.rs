pub mod category_handler;

pub use category_handler::{
    __path_create_category, __path_get_category, __path_get_category_children,
    __path_update_visibility, create_category, get_category, get_category_children,
    update_visibility, CategoryState,
};
