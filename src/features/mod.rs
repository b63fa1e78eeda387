pub mod auth;
pub mod categories;
