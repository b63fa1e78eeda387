use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating category slugs
    /// Must be lowercase alphanumeric with single hyphens between segments
    /// - Valid: "slug-1", "col-000", "floral"
    /// - Invalid: "-slug", "slug-", "slug--1", "Slug", "slug_1"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}
