//! The root!
//!
//! The most important part of Waypost, every request outside of the admin ends up here

use std::str::Utf8Error;

use axum::Extension;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CONTENT_TYPE;
use axum::http::header::HOST;
use axum::http::header::LOCATION;
use axum::response::IntoResponse;
use axum::response::Response;
use percent_encoding::percent_decode_str;

use crate::api::CurrentUser;
use crate::api::JwtKeys;
use crate::headers::cache_for;
use crate::qr;
use crate::qr::QrFormat;
use crate::qr::UnsupportedFormat;
use crate::quick_create::add_form_location;
use crate::quick_create::destination_from_path;
use crate::redirects::is_valid_slug;
use crate::resolver::redirect_response;
use crate::resolver::resolve;
use crate::settings::ADMIN_INDEX;
use crate::settings::RootRedirect;
use crate::settings::Settings;
use crate::storage::Storage;
use crate::users::Role;

/// How long QR codes can be cached, in seconds
const QR_CODE_MAX_AGE: u32 = 300;

/// What a request path points to
#[derive(Debug, PartialEq, Eq)]
enum Target<'a> {
    /// The empty path
    Root,

    /// A full URL to start a new redirect with
    QuickCreate(String),

    /// `{slug}.{extension}`
    QrCode { slug: &'a str, extension: &'a str },

    /// `{slug}` or `{slug}/`
    Slug(&'a str),

    /// Nothing we know of
    Unknown,
}

impl<'a> Target<'a> {
    /// Classify a decoded path
    fn parse(path: &'a str, query: Option<&str>) -> Self {
        let path = path.strip_prefix('/').unwrap_or(path);

        if path.is_empty() {
            return Self::Root;
        }

        if let Some(destination) = destination_from_path(path, query) {
            return Self::QuickCreate(destination);
        }

        let slug = path.strip_suffix('/').unwrap_or(path);
        if is_valid_slug(slug) {
            return Self::Slug(slug);
        }

        match path.rsplit_once('.') {
            Some((slug, extension))
                if is_valid_slug(slug)
                    && !extension.is_empty()
                    && extension.chars().all(|ch| ch.is_ascii_alphanumeric()) =>
            {
                Self::QrCode { slug, extension }
            }
            _ => Self::Unknown,
        }
    }
}

/// Outcome on the empty path
#[derive(Debug, PartialEq, Eq)]
pub enum RootOutcome {
    /// No root redirect configured
    NotFound,

    /// Redirect to the location
    Redirect(String),
}

/// Decide what happens on the empty path
pub fn resolve_root(root_redirect: &RootRedirect) -> RootOutcome {
    match root_redirect {
        RootRedirect::Disabled => RootOutcome::NotFound,
        RootRedirect::Admin => RootOutcome::Redirect(ADMIN_INDEX.to_string()),
        RootRedirect::Url(url) => RootOutcome::Redirect(url.clone()),
    }
}

impl IntoResponse for RootOutcome {
    fn into_response(self) -> Response {
        match self {
            RootOutcome::NotFound => StatusCode::NOT_FOUND.into_response(),
            RootOutcome::Redirect(location) => redirect_response(StatusCode::FOUND, &location),
        }
    }
}

/// The root!
///
/// All wildcard requests end up in this function.
///
/// The path decides between the root redirect, quick-create, QR codes and slug redirects
pub async fn root<S: Storage>(
    Extension(storage): Extension<S>,
    Extension(jwt_keys): Extension<JwtKeys>,
    Extension(settings): Extension<Settings>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, (StatusCode, String)> {
    let path = url_decode_path(uri.path()).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "URL contains invalid UTF-8 characters".to_string(),
        )
    })?;

    match Target::parse(&path, uri.query()) {
        Target::Root => Ok(resolve_root(&settings.root_redirect).into_response()),
        Target::QuickCreate(destination) => {
            Ok(quick_create(&storage, &jwt_keys, &headers, &destination).await)
        }
        Target::QrCode { slug, extension } => {
            qr_code(&storage, &settings, &headers, slug, extension).await
        }
        Target::Slug(slug) => {
            tracing::debug!("Looking for slug: /{slug}");

            let authorization = headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok());

            let resolution = resolve(&storage, slug, authorization)
                .await
                .map_err(internal_error)?;

            Ok(resolution.into_response())
        }
        Target::Unknown => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

/// Send an operator to the add form, prefilled with the destination
///
/// Anonymous visitors get a `404 Not Found`, the feature does not exist for them.
async fn quick_create<S: Storage>(
    storage: &S,
    jwt_keys: &JwtKeys,
    headers: &HeaderMap,
    destination: &str,
) -> Response {
    let is_allowed = CurrentUser::from_headers(headers, jwt_keys, storage)
        .await
        .and_then(|current_user| current_user.role.is_allowed(Role::Manager));

    if is_allowed.is_err() {
        tracing::debug!("Quick-create without a valid operator");

        return StatusCode::NOT_FOUND.into_response();
    }

    match HeaderValue::from_str(&add_form_location(destination)) {
        Ok(location) => (StatusCode::FOUND, [(LOCATION, location)]).into_response(),
        Err(err) => internal_error(err).into_response(),
    }
}

/// Render the QR code of a short link
async fn qr_code<S: Storage>(
    storage: &S,
    settings: &Settings,
    headers: &HeaderMap,
    slug: &str,
    extension: &str,
) -> Result<Response, (StatusCode, String)> {
    let format = match extension.parse::<QrFormat>() {
        Ok(format) => format,
        Err(UnsupportedFormat(extension)) => {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Unsupported image format: {extension}"),
            ));
        }
    };

    let redirect = storage
        .find_single_redirect_by_slug(slug)
        .await
        .map_err(internal_error)?;

    if !redirect.is_some_and(|redirect| redirect.is_enabled) {
        tracing::debug!(r#"QR code for slug "{slug}" not found"#);

        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    let url = format!("{}/{slug}", base_url(settings, headers));
    let image = qr::render(&url, format).map_err(internal_error)?;

    Ok(cache_for(
        ([(CONTENT_TYPE, format.content_type())], image).into_response(),
        QR_CODE_MAX_AGE,
    ))
}

/// Absolute base of the short links
///
/// `PUBLIC_URL` when configured, the `Host` of the request otherwise
fn base_url(settings: &Settings, headers: &HeaderMap) -> String {
    settings
        .public_url
        .clone()
        .or_else(|| {
            headers
                .get(HOST)
                .and_then(|host| host.to_str().ok())
                .map(|host| format!("http://{host}"))
        })
        .unwrap_or_default()
}

/// Utility function for mapping any error into a `500 Internal Server Error`
/// response.
fn internal_error<E>(err: E) -> (StatusCode, String)
where
    E: std::error::Error,
{
    tracing::error!("Internal server error: {err}");

    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// URL decode path
///
/// Uses percentage encoding for the decoding, might error in case of invalid UTF-8
fn url_decode_path(path: &str) -> Result<String, Utf8Error> {
    let decoded = percent_decode_str(path);

    decoded.decode_utf8().map(|decoded| decoded.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert_eq!(Target::Root, Target::parse("/", None));
        assert_eq!(Target::Root, Target::parse("", None));

        assert_eq!(Target::Slug("test"), Target::parse("/test", None));
        assert_eq!(Target::Slug("test"), Target::parse("/test/", None));

        assert_eq!(
            Target::QrCode {
                slug: "test",
                extension: "png"
            },
            Target::parse("/test.png", None)
        );
        assert_eq!(
            Target::QrCode {
                slug: "test",
                extension: "gif"
            },
            Target::parse("/test.gif", None)
        );

        assert_eq!(
            Target::QuickCreate("https://example.com".to_string()),
            Target::parse("/https://example.com", None)
        );

        assert_eq!(Target::Unknown, Target::parse("/test//", None));
        assert_eq!(Target::Unknown, Target::parse("/some/nested/path", None));
        assert_eq!(Target::Unknown, Target::parse("/ ", None));
        assert_eq!(Target::Unknown, Target::parse("/test.png/", None));
    }

    #[test]
    fn test_resolve_root() {
        assert_eq!(RootOutcome::NotFound, resolve_root(&RootRedirect::Disabled));
        assert_eq!(
            RootOutcome::Redirect("/-/admin/".to_string()),
            resolve_root(&RootRedirect::Admin)
        );
        assert_eq!(
            RootOutcome::Redirect("https://example.com".to_string()),
            resolve_root(&RootRedirect::Url("https://example.com".to_string()))
        );
    }
}
