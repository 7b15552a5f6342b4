//! API name sanitization
//!
//! API names end up in file names (`research/…_research_{api_name}.md`) and in
//! the state file path, so they are reduced to `[a-z0-9_]`.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Longest accepted API name after sanitization.
pub const MAX_API_NAME_LEN: usize = 64;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"[^a-z0-9]+").expect("separator pattern is valid")
});

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ApiNameError {
    #[error("API name is empty after sanitization")]
    Empty,

    #[error("API name exceeds {MAX_API_NAME_LEN} characters")]
    TooLong,
}

/// Sanitize an API name for use in file names.
///
/// Lower-cases the input, collapses runs of other characters into a single
/// underscore and trims leading/trailing underscores.
///
/// ```rust
/// use dltforge_utils::api_name::sanitize_api_name;
///
/// assert_eq!(sanitize_api_name("GitHub").unwrap(), "github");
/// assert_eq!(sanitize_api_name("Stripe API v2").unwrap(), "stripe_api_v2");
/// assert!(sanitize_api_name("--").is_err());
/// ```
pub fn sanitize_api_name(raw: &str) -> Result<String, ApiNameError> {
    let lowered = raw.trim().to_lowercase();
    let collapsed = SEPARATORS.replace_all(&lowered, "_");
    let sanitized = collapsed.trim_matches('_').to_string();

    if sanitized.is_empty() {
        return Err(ApiNameError::Empty);
    }
    if sanitized.len() > MAX_API_NAME_LEN {
        return Err(ApiNameError::TooLong);
    }

    Ok(sanitized)
}
