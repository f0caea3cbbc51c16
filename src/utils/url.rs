//! Endpoint URL helpers
//!
//! The assistant endpoint is configured as a base URL; the question route is
//! appended here so trailing slashes in user configuration never produce
//! `//ask`.

/// Default assistant endpoint used when neither the CLI nor the config names one.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000";

/// Normalize a base URL by removing trailing slashes.
///
/// # Examples
///
/// ```
/// use hikmat::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:5000/"), "http://localhost:5000");
/// assert_eq!(normalize_base_url("http://localhost:5000///"), "http://localhost:5000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a route onto a base URL without doubling slashes.
///
/// ```
/// use hikmat::utils::url::construct_endpoint_url;
///
/// assert_eq!(
///     construct_endpoint_url("http://localhost:5000/", "/ask"),
///     "http://localhost:5000/ask"
/// );
/// ```
pub fn construct_endpoint_url(base_url: &str, route: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let route = route.trim_start_matches('/');
    format!("{}/{}", normalized_base, route)
}

/// Resolve the endpoint from the CLI override, then config, then the default.
pub fn resolve_endpoint(cli: Option<&str>, configured: Option<&str>) -> String {
    let chosen = cli
        .filter(|value| !value.trim().is_empty())
        .or(configured.filter(|value| !value.trim().is_empty()))
        .unwrap_or(DEFAULT_ENDPOINT);
    normalize_base_url(chosen)
}
