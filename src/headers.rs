//! Shared response headers

use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::EXPIRES;
use axum::http::header::PRAGMA;
use axum::response::Response;
use chrono::Utc;

/// Search engine crawler instructions
pub static X_ROBOTS_TAG: HeaderName = HeaderName::from_static("x-robots-tag");

/// Caches must never store or reuse the response
const NEVER_CACHE: &str = "max-age=0, no-cache, no-store, must-revalidate, private";

/// HTTP date format, always GMT
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Mark a response as "never cache, never index"
///
/// Used for redirects and authentication challenges, a cached redirect can not be disabled or
/// protected afterwards.
pub fn never_cache(mut response: Response) -> Response {
    let headers = response.headers_mut();

    headers.insert(CACHE_CONTROL, HeaderValue::from_static(NEVER_CACHE));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

    // already expired
    let expires = Utc::now().format(HTTP_DATE_FORMAT).to_string();
    if let Ok(expires) = HeaderValue::from_str(&expires) {
        headers.insert(EXPIRES, expires);
    }

    headers.insert(X_ROBOTS_TAG.clone(), HeaderValue::from_static("noindex"));

    response
}

/// Allow caches to keep the response for a short while
pub fn cache_for(mut response: Response, seconds: u32) -> Response {
    if let Ok(cache_control) = HeaderValue::from_str(&format!("max-age={seconds}")) {
        response.headers_mut().insert(CACHE_CONTROL, cache_control);
    }

    response
}
