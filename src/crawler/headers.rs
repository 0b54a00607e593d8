use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT,
};

/// Accept header sent with every page request
pub const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Build browser-like request headers for Kompas pages
///
/// Values that are not valid header values are left out rather than failing
/// the request. `Accept-Encoding` is not set here so the client keeps
/// handling decompression itself.
///
/// # Arguments
///
/// * `user_agent` - User agent string (typically a modern browser UA)
/// * `accept_language` - Accept-Language value, e.g. `en-US,en;q=0.5`
///
/// # Examples
///
/// ```
/// use kabar::crawler::headers::build_browser_headers;
///
/// let headers = build_browser_headers(
///     "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36",
///     "en-US,en;q=0.5",
/// );
/// assert!(headers.contains_key("user-agent"));
/// ```
pub fn build_browser_headers(user_agent: &str, accept_language: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, value);
    }
    if let Ok(value) = HeaderValue::from_str(accept_language) {
        headers.insert(ACCEPT_LANGUAGE, value);
    }
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));

    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );

    headers
}
