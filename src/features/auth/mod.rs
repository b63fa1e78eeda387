//! Token issuance and verification.
//!
//! `/categoryApi/generateToken` sits behind the API client's HTTP Basic
//! credentials and returns a short-lived HS256 bearer token. The bearer gate
//! in `core::middleware` validates that token on every category endpoint.

pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;

pub use handlers::TokenState;
pub use services::TokenService;
