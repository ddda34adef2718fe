//! Runtime settings
//!
//! Everything is read from the environment once, on startup

use std::env::var;

use crate::password::generate;

/// The admin index, target of the `admin` root redirect
pub const ADMIN_INDEX: &str = "/-/admin/";

/// Get the value of ENV var, or a default
///
/// Only when:
/// - It is set
/// - It is not empty
pub fn env_var_or_else<F>(var_name: &'static str, or_else: F) -> String
where
    F: FnOnce() -> String,
{
    env_var(var_name).unwrap_or_else(or_else)
}

/// Get the value of ENV var when it is set and not empty
pub fn env_var(var_name: &'static str) -> Option<String> {
    var(var_name).ok().filter(|value| !value.is_empty())
}

/// What to do with a request on the empty path
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RootRedirect {
    /// Nothing is configured, the root does not exist
    Disabled,

    /// Send visitors to the admin index
    Admin,

    /// Send visitors to a fixed URL
    Url(String),
}

impl RootRedirect {
    /// Parse the `ROOT_REDIRECT_URL` value
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" => Self::Disabled,
            "admin" => Self::Admin,
            url => Self::Url(url.to_string()),
        }
    }
}

/// All settings used by the app
#[derive(Clone, Debug)]
pub struct Settings {
    /// Root path behavior
    pub root_redirect: RootRedirect,

    /// Absolute base URL used for QR codes, without trailing slash
    pub public_url: Option<String>,

    /// Secret used to sign operator tokens
    pub jwt_secret: String,

    /// Username for the first operator
    pub initial_username: Option<String>,

    /// Password for the first operator
    pub initial_password: Option<String>,
}

impl Settings {
    /// Collect the settings from the environment
    pub fn from_env() -> Self {
        let root_redirect = RootRedirect::parse(&env_var("ROOT_REDIRECT_URL").unwrap_or_default());

        let jwt_secret = env_var_or_else("JWT_SECRET", || {
            let jwt_secret = generate();
            tracing::info!("`JWT_SECRET` is not set, generating temporary one: {jwt_secret}");
            jwt_secret
        });

        Self {
            root_redirect,
            public_url: env_var("PUBLIC_URL").map(|url| url.trim_end_matches('/').to_string()),
            jwt_secret,
            initial_username: env_var("INITIAL_USERNAME"),
            initial_password: env_var("INITIAL_PASSWORD"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root_redirect() {
        assert_eq!(RootRedirect::parse(""), RootRedirect::Disabled);
        assert_eq!(RootRedirect::parse("  "), RootRedirect::Disabled);
        assert_eq!(RootRedirect::parse("admin"), RootRedirect::Admin);
        assert_eq!(
            RootRedirect::parse("https://example.com"),
            RootRedirect::Url("https://example.com".to_string())
        );
    }
}
