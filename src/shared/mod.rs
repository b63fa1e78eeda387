pub mod cache;
pub mod constants;
pub mod messages;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;
