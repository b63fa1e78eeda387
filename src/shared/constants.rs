use std::time::Duration;

/// Lifetime of tokens issued by `/generateToken` (6 minutes)
pub const TOKEN_TTL: Duration = Duration::from_secs(6 * 60);

/// Freshness hint attached to cacheable successful reads (4 hours)
pub const CACHE_CONTROL_VALUE: &str = "max-age=14400";

/// How many ancestors are resolved and nested under `parentCategory`
pub const MAX_PARENT_DEPTH: usize = 5;

// =============================================================================
// ANTI-FORGERY
// =============================================================================

/// Cookie carrying the anti-forgery token (double-submit)
pub const XSRF_COOKIE: &str = "XSRF-TOKEN";

/// Header that must echo the anti-forgery cookie on unsafe methods
pub const XSRF_HEADER: &str = "x-xsrf-token";
