//! Redirects API endpoints
//!
//! Everything related to the redirect management

use axum::Extension;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;

use crate::redirects::Redirect;
use crate::redirects::normalize_credential;
use crate::redirects::validate_redirect;
use crate::storage::CreateRedirectValues;
use crate::storage::RedirectFilter;
use crate::storage::Storage;
use crate::storage::UpdateRedirectValues;
use crate::users::Role;

use super::CurrentUser;
use super::Error;
use super::Form;
use super::PathParameters;
use super::QueryParameters;
use super::Success;

/// Redirect response going to the operator
///
/// The Basic authentication password is never shown
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectResponse {
    /// Slug used to identify the redirect
    pub slug: String,

    /// Url where the slug will redirect to
    pub destination: String,

    /// Type of redirect
    pub is_permanent: bool,

    /// Visible to visitors
    pub is_enabled: bool,

    /// Username for Basic authentication
    pub basic_auth_username: Option<String>,

    /// Is the redirect protected by Basic authentication
    pub has_basic_auth: bool,

    /// Creation date
    pub created_at: NaiveDateTime,

    /// Last modified at
    pub modified_at: NaiveDateTime,
}

impl RedirectResponse {
    /// Create a response from a [`Redirect`](Redirect)
    fn from_redirect(redirect: Redirect) -> Self {
        Self {
            has_basic_auth: redirect.credentials().is_some(),
            slug: redirect.slug,
            destination: redirect.destination,
            is_permanent: redirect.is_permanent,
            is_enabled: redirect.is_enabled,
            basic_auth_username: redirect.basic_auth_username,
            created_at: redirect.created_at,
            modified_at: redirect.modified_at,
        }
    }

    /// Create a response from multiple [`Redirect`](Redirect)s
    fn from_redirect_multiple(redirects: Vec<Redirect>) -> Vec<Self> {
        redirects.into_iter().map(Self::from_redirect).collect()
    }
}

/// List filters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Search in slug and destination
    search: Option<String>,

    /// Only (non-)permanent redirects
    is_permanent: Option<bool>,

    /// Only enabled or disabled redirects
    is_enabled: Option<bool>,
}

/// List all redirects
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     'http://localhost:6000/-/admin/api/redirects?search=example&isEnabled=true'
/// ```
///
/// Response:
/// ```json
/// { "data": [ { "slug": "some-easy-name", "destination": "https://example.com" ... } ] }
/// ```
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    QueryParameters(query): QueryParameters<ListQuery>,
) -> Result<Success<Vec<RedirectResponse>>, Error> {
    current_user.role.is_allowed(Role::Manager)?;

    let filter = RedirectFilter {
        search: query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty()),
        is_permanent: query.is_permanent,
        is_enabled: query.is_enabled,
    };

    let redirects = storage.find_all_redirects(&filter).await?;

    Ok(Success::ok(RedirectResponse::from_redirect_multiple(
        redirects,
    )))
}

/// Get a single redirect
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/-/admin/api/redirects/some-easy-name
/// ```
pub async fn single<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(slug): PathParameters<String>,
) -> Result<Success<RedirectResponse>, Error> {
    current_user.role.is_allowed(Role::Manager)?;

    fetch_redirect(&storage, &slug)
        .await
        .map(|redirect| Success::ok(RedirectResponse::from_redirect(redirect)))
}

/// Create redirect form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRedirectForm {
    /// Slug to create a redirect with
    slug: String,

    /// Url to redirect to
    destination: String,

    /// Type of redirect, defaults to temporary
    is_permanent: Option<bool>,

    /// Defaults to enabled
    is_enabled: Option<bool>,

    /// Optional username, requires a password
    basic_auth_username: Option<String>,

    /// Optional password, protects the redirect
    basic_auth_password: Option<String>,
}

/// Create a redirect based on the [`CreateRedirectForm`](CreateRedirectForm) form
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "slug": "some-easy-name", "destination": "https://www.example.com/" }' \
///     http://localhost:6000/-/admin/api/redirects
/// ```
pub async fn create<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<CreateRedirectForm>,
) -> Result<Success<RedirectResponse>, Error> {
    current_user.role.is_allowed(Role::Manager)?;

    let slug = form.slug.trim();
    let destination = form.destination.trim();
    let basic_auth_username = form
        .basic_auth_username
        .as_deref()
        .and_then(normalize_credential);
    let basic_auth_password = form
        .basic_auth_password
        .as_deref()
        .and_then(normalize_credential);

    validate_redirect(slug, destination, basic_auth_username, basic_auth_password)?;

    let values = CreateRedirectValues {
        slug,
        destination,
        is_permanent: form.is_permanent.unwrap_or(false),
        is_enabled: form.is_enabled.unwrap_or(true),
        basic_auth_username,
        basic_auth_password,
    };

    let redirect = storage.create_redirect(&values).await?;

    tracing::info!(
        r#"Redirect "{}" created by `{}`"#,
        redirect.slug,
        current_user.username
    );

    Ok(Success::created(RedirectResponse::from_redirect(redirect)))
}

/// Update redirect form
///
/// All fields are optional and are not touched when not provided, an empty username or password
/// clears it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRedirectForm {
    /// New destination
    destination: Option<String>,

    /// New type of redirect
    is_permanent: Option<bool>,

    /// Enable or disable the redirect
    is_enabled: Option<bool>,

    /// New username
    basic_auth_username: Option<String>,

    /// New password
    basic_auth_password: Option<String>,
}

/// Update a redirect based on the [`UpdateRedirectForm`](UpdateRedirectForm) form
///
/// Request:
/// ```sh
/// curl -v -XPATCH -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "isEnabled": false }' \
///     http://localhost:6000/-/admin/api/redirects/some-easy-name
/// ```
pub async fn update<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(slug): PathParameters<String>,
    Form(form): Form<UpdateRedirectForm>,
) -> Result<Success<RedirectResponse>, Error> {
    current_user.role.is_allowed(Role::Manager)?;

    let redirect = fetch_redirect(&storage, &slug).await?;

    let values = UpdateRedirectValues {
        destination: form.destination.as_deref().map(str::trim),
        is_permanent: form.is_permanent,
        is_enabled: form.is_enabled,
        basic_auth_username: form.basic_auth_username.as_deref().map(normalize_credential),
        basic_auth_password: form.basic_auth_password.as_deref().map(normalize_credential),
    };

    // validate the redirect as it will be after the update
    validate_redirect(
        &redirect.slug,
        values.destination.unwrap_or(&redirect.destination),
        values
            .basic_auth_username
            .unwrap_or(redirect.basic_auth_username.as_deref()),
        values
            .basic_auth_password
            .unwrap_or(redirect.basic_auth_password.as_deref()),
    )?;

    let updated_redirect = storage.update_redirect(&redirect, &values).await?;

    tracing::info!(
        r#"Redirect "{}" updated by `{}`"#,
        redirect.slug,
        current_user.username
    );

    Ok(Success::ok(RedirectResponse::from_redirect(
        updated_redirect,
    )))
}

/// Delete a redirect
///
/// Request:
/// ```sh
/// curl -v -XDELETE \
///     -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/-/admin/api/redirects/some-easy-name
/// ```
pub async fn delete<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(slug): PathParameters<String>,
) -> Result<Success<&'static str>, Error> {
    current_user.role.is_allowed(Role::Manager)?;

    let redirect = fetch_redirect(&storage, &slug).await?;

    storage.delete_redirect(&redirect).await?;

    tracing::info!(
        r#"Redirect "{}" deleted by `{}`"#,
        redirect.slug,
        current_user.username
    );

    Ok(Success::<&'static str>::no_content())
}

/// Prefill for the add form
#[derive(Debug, Deserialize)]
pub struct AddFormQuery {
    /// Destination to start with
    destination: Option<String>,
}

/// Initial values of a new redirect
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFormResponse {
    /// Prefilled destination
    pub destination: Option<String>,

    /// Default type
    pub is_permanent: bool,

    /// Default visibility
    pub is_enabled: bool,
}

/// Initial values for the redirect add form
///
/// Target of the quick-create flow, the destination comes from the query string
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     'http://localhost:6000/-/admin/redirects/add?destination=https%3A%2F%2Fexample.com'
/// ```
pub async fn add_form<S: Storage>(
    current_user: CurrentUser<S>,
    QueryParameters(query): QueryParameters<AddFormQuery>,
) -> Result<Success<AddFormResponse>, Error> {
    current_user.role.is_allowed(Role::Manager)?;

    Ok(Success::ok(AddFormResponse {
        destination: query.destination,
        is_permanent: false,
        is_enabled: true,
    }))
}

/// Fetch redirect from storage
async fn fetch_redirect<S: Storage>(storage: &S, slug: &str) -> Result<Redirect, Error> {
    storage
        .find_single_redirect_by_slug(slug)
        .await?
        .map_or_else(|| Err(Error::not_found("Redirect not found")), Ok)
}
