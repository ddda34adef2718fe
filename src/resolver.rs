//! Redirect resolution
//!
//! Slug lookup, enabled check and Basic authentication, in that order

use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::LOCATION;
use axum::http::header::WWW_AUTHENTICATE;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::basic_auth;
use crate::headers::never_cache;
use crate::storage;
use crate::storage::Storage;

/// Outcome of resolving a slug
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Unknown or disabled slug, both look the same from the outside
    NotFound,

    /// The redirect is protected and no matching credentials were provided
    AuthRequired,

    /// Go to the destination
    Redirect {
        /// Location of the redirect
        destination: String,

        /// `308` instead of `307`
        is_permanent: bool,
    },
}

/// Resolve a slug with the raw `Authorization` header of the request
///
/// Only storage failures end up as errors
pub async fn resolve<S: Storage>(
    storage: &S,
    slug: &str,
    authorization: Option<&str>,
) -> storage::Result<Resolution> {
    let redirect = storage.find_single_redirect_by_slug(slug).await?;

    let Some(redirect) = redirect.filter(|redirect| redirect.is_enabled) else {
        tracing::debug!(r#"Slug "{slug}" not found"#);

        return Ok(Resolution::NotFound);
    };

    if let Some((username, password)) = redirect.credentials() {
        if !basic_auth::verify(authorization, username, password) {
            tracing::debug!(r#"Slug "{slug}" requires authentication"#);

            return Ok(Resolution::AuthRequired);
        }
    }

    tracing::debug!(r#"Slug "{slug}" redirecting to: {}"#, redirect.destination);

    Ok(Resolution::Redirect {
        destination: redirect.destination,
        is_permanent: redirect.is_permanent,
    })
}

impl IntoResponse for Resolution {
    fn into_response(self) -> Response {
        match self {
            Resolution::NotFound => StatusCode::NOT_FOUND.into_response(),
            Resolution::AuthRequired => never_cache(
                (
                    StatusCode::UNAUTHORIZED,
                    [(WWW_AUTHENTICATE, HeaderValue::from_static("Basic"))],
                    "Authentication required",
                )
                    .into_response(),
            ),
            Resolution::Redirect {
                destination,
                is_permanent,
            } => {
                let status_code = if is_permanent {
                    StatusCode::PERMANENT_REDIRECT
                } else {
                    StatusCode::TEMPORARY_REDIRECT
                };

                redirect_response(status_code, &destination)
            }
        }
    }
}

/// Build a never cached redirect response
///
/// A destination that can not be used as a header value results in a server error
pub fn redirect_response(status_code: StatusCode, destination: &str) -> Response {
    match HeaderValue::from_str(destination) {
        Ok(location) => never_cache((status_code, [(LOCATION, location)]).into_response()),
        Err(err) => {
            tracing::error!("Invalid redirect location {destination:?}: {err}");

            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    use super::*;
    use crate::storage::CreateRedirectValues;
    use crate::storage::Memory;
    use crate::storage::UpdateRedirectValues;

    async fn setup(values: CreateRedirectValues<'_>) -> Memory {
        let storage = Memory::new();
        storage.create_redirect(&values).await.unwrap();
        storage
    }

    fn values<'a>(slug: &'a str, password: Option<&'a str>) -> CreateRedirectValues<'a> {
        CreateRedirectValues {
            slug,
            destination: "https://example.com",
            is_permanent: false,
            is_enabled: true,
            basic_auth_username: password.map(|_| "username"),
            basic_auth_password: password,
        }
    }

    fn redirect(is_permanent: bool) -> Resolution {
        Resolution::Redirect {
            destination: "https://example.com".to_string(),
            is_permanent,
        }
    }

    #[tokio::test]
    async fn test_unknown_slug() {
        let storage = Memory::new();

        let resolution = resolve(&storage, "unknown", None).await.unwrap();
        assert_eq!(Resolution::NotFound, resolution);
    }

    #[tokio::test]
    async fn test_redirect() {
        let storage = setup(values("test", None)).await;

        let resolution = resolve(&storage, "test", None).await.unwrap();
        assert_eq!(redirect(false), resolution);

        // repeated resolution has the same outcome
        let resolution = resolve(&storage, "test", None).await.unwrap();
        assert_eq!(redirect(false), resolution);
    }

    #[tokio::test]
    async fn test_permanent_redirect() {
        let storage = setup(CreateRedirectValues {
            is_permanent: true,
            ..values("test", None)
        })
        .await;

        let resolution = resolve(&storage, "test", None).await.unwrap();
        assert_eq!(redirect(true), resolution);
    }

    #[tokio::test]
    async fn test_unprotected_ignores_authorization() {
        let storage = setup(values("test", None)).await;

        for header in ["garbage", "Basic", "Basic mypassword", "Bearer token"] {
            let resolution = resolve(&storage, "test", Some(header)).await.unwrap();
            assert_eq!(redirect(false), resolution);
        }
    }

    #[tokio::test]
    async fn test_protected() {
        let storage = setup(values("basic", Some("password"))).await;

        let resolution = resolve(&storage, "basic", None).await.unwrap();
        assert_eq!(Resolution::AuthRequired, resolution);

        let header = format!("Basic {}", STANDARD.encode("username:wrong"));
        let resolution = resolve(&storage, "basic", Some(&header)).await.unwrap();
        assert_eq!(Resolution::AuthRequired, resolution);

        let header = format!("Basic {}", STANDARD.encode("username:password"));
        let resolution = resolve(&storage, "basic", Some(&header)).await.unwrap();
        assert_eq!(redirect(false), resolution);
    }

    #[tokio::test]
    async fn test_disabled_is_not_found() {
        let storage = setup(values("basic", Some("password"))).await;

        let existing = storage
            .find_single_redirect_by_slug("basic")
            .await
            .unwrap()
            .unwrap();

        let values = UpdateRedirectValues {
            is_enabled: Some(false),
            ..UpdateRedirectValues::default()
        };
        storage.update_redirect(&existing, &values).await.unwrap();

        let header = format!("Basic {}", STANDARD.encode("username:password"));

        let resolution = resolve(&storage, "basic", None).await.unwrap();
        assert_eq!(Resolution::NotFound, resolution);

        let resolution = resolve(&storage, "basic", Some(&header)).await.unwrap();
        assert_eq!(Resolution::NotFound, resolution);
    }
}
