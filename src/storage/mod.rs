//! All things related to the storage of redirects and operators

use core::fmt;

use async_trait::async_trait;
use uuid::Uuid;

pub use memory::Memory;
pub use postgres::Postgres;

use crate::redirects::Redirect;
use crate::users::Role;
use crate::users::User;

mod memory;
mod postgres;

/// Storage errors
#[derive(Debug)]
pub enum Error {
    /// A connection error with the storage
    Connection(String),

    /// A redirect with the same slug already exists
    DuplicateSlug,
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Connection(error) => write!(f, "Connection error: {error}"),
            Error::DuplicateSlug => write!(f, "Slug already exists"),
        }
    }
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Values to create a User
pub struct CreateUserValues<'a> {
    /// The initial session ID for the user
    pub session_id: &'a Uuid,

    /// The role of the user
    pub role: Role,

    /// The username
    pub username: &'a str,

    /// The hashed password
    pub hashed_password: &'a str,
}

/// Values to create a Redirect
pub struct CreateRedirectValues<'a> {
    /// The slug of the redirect
    pub slug: &'a str,

    /// The URL the redirect goes to
    pub destination: &'a str,

    /// Use a permanent redirect
    pub is_permanent: bool,

    /// Make the redirect available to visitors
    pub is_enabled: bool,

    /// Optional Basic authentication username
    pub basic_auth_username: Option<&'a str>,

    /// Optional Basic authentication password
    pub basic_auth_password: Option<&'a str>,
}

/// Values to update a Redirect
///
/// Fields set to `None` are not touched
#[derive(Default)]
pub struct UpdateRedirectValues<'a> {
    /// New destination
    pub destination: Option<&'a str>,

    /// New type of redirect
    pub is_permanent: Option<bool>,

    /// Enable or disable the redirect
    pub is_enabled: Option<bool>,

    /// Set (`Some(Some(_))`) or clear (`Some(None)`) the username
    pub basic_auth_username: Option<Option<&'a str>>,

    /// Set (`Some(Some(_))`) or clear (`Some(None)`) the password
    pub basic_auth_password: Option<Option<&'a str>>,
}

/// Filters for listing redirects
#[derive(Default)]
pub struct RedirectFilter<'a> {
    /// Case insensitive search in slug and destination
    pub search: Option<&'a str>,

    /// Only permanent or only temporary redirects
    pub is_permanent: Option<bool>,

    /// Only enabled or only disabled redirects
    pub is_enabled: Option<bool>,
}

impl RedirectFilter<'_> {
    /// Does the redirect pass the filter?
    pub fn matches(&self, redirect: &Redirect) -> bool {
        let search_matches = self.search.is_none_or(|search| {
            let search = search.to_lowercase();

            redirect.slug.to_lowercase().contains(&search)
                || redirect.destination.to_lowercase().contains(&search)
        });

        search_matches
            && self
                .is_permanent
                .is_none_or(|is_permanent| redirect.is_permanent == is_permanent)
            && self
                .is_enabled
                .is_none_or(|is_enabled| redirect.is_enabled == is_enabled)
    }
}

/// Storage with all supported operations
#[async_trait]
pub trait Storage: Clone + Send + Sync + 'static {
    /// Check if the storage is reachable
    async fn ping(&self) -> Result<()>;

    /// Find any single user
    async fn find_any_single_user(&self) -> Result<Option<User>>;

    /// Finds all users
    async fn find_all_users(&self) -> Result<Vec<User>>;

    /// Finds a single user by its username
    async fn find_single_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Finds a single user by its ID
    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>>;

    /// Create a single user
    async fn create_user(&self, values: &CreateUserValues<'_>) -> Result<User>;

    /// Find all redirects matching the filter, ordered by slug
    async fn find_all_redirects(&self, filter: &RedirectFilter<'_>) -> Result<Vec<Redirect>>;

    /// Find a single redirect by slug
    ///
    /// DOES NOT respect the enabled flag, handle with care
    async fn find_single_redirect_by_slug(&self, slug: &str) -> Result<Option<Redirect>>;

    /// Create a redirect
    ///
    /// Fails with [`Error::DuplicateSlug`] when the slug is taken
    async fn create_redirect(&self, values: &CreateRedirectValues<'_>) -> Result<Redirect>;

    /// Update a single redirect
    async fn update_redirect(
        &self,
        redirect: &Redirect,
        values: &UpdateRedirectValues<'_>,
    ) -> Result<Redirect>;

    /// Delete a redirect, for good
    async fn delete_redirect(&self, redirect: &Redirect) -> Result<()>;
}

/// Convert any backend error to a storage connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Connection(err.to_string())
}
