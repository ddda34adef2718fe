//! Redirects

use core::fmt;

use chrono::naive::NaiveDateTime;
use url::Url;

/// URL schemes accepted as destination
const ALLOWED_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

/// Maximum length of a slug
pub const MAX_SLUG_LENGTH: usize = 50;

/// Maximum length of a destination
pub const MAX_DESTINATION_LENGTH: usize = 2048;

/// Maximum length of a Basic authentication username or password
pub const MAX_CREDENTIAL_LENGTH: usize = 255;

/// A slug pointing to a destination
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Redirect {
    /// External identifier, unique
    pub slug: String,

    /// Location the redirect goes to
    pub destination: String,

    /// Use `308 Permanent Redirect` instead of `307 Temporary Redirect`
    pub is_permanent: bool,

    /// Disabled redirects do not exist for visitors
    pub is_enabled: bool,

    /// Username for Basic authentication
    pub basic_auth_username: Option<String>,

    /// Password for Basic authentication, gates the redirect when set
    pub basic_auth_password: Option<String>,

    /// Creation date
    pub created_at: NaiveDateTime,

    /// Last modified at
    pub modified_at: NaiveDateTime,
}

impl Redirect {
    /// The credentials a visitor needs to provide, if any
    ///
    /// Only a non-empty password protects a redirect, a missing username means an empty one.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let password = self
            .basic_auth_password
            .as_deref()
            .filter(|password| !password.is_empty())?;

        Some((self.basic_auth_username.as_deref().unwrap_or_default(), password))
    }
}

/// Reasons a redirect can not be saved
#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// The slug is empty, too long or contains characters outside `[-a-zA-Z0-9_]`
    InvalidSlug,

    /// The destination is not an absolute URL
    InvalidDestination(String),

    /// The destination is longer than [`MAX_DESTINATION_LENGTH`]
    DestinationTooLong,

    /// A username or password is longer than [`MAX_CREDENTIAL_LENGTH`]
    CredentialTooLong,

    /// A username is set without a password
    UsernameWithoutPassword,
}

impl std::error::Error for ValidationError {}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidationError::InvalidSlug => write!(
                f,
                "Slug can only contain letters, numbers, underscores or hyphens"
            ),
            ValidationError::InvalidDestination(reason) => {
                write!(f, "Invalid destination: {reason}")
            }
            ValidationError::DestinationTooLong => write!(
                f,
                "Destination can not be longer than {MAX_DESTINATION_LENGTH} characters"
            ),
            ValidationError::CredentialTooLong => write!(
                f,
                "Username and password can not be longer than {MAX_CREDENTIAL_LENGTH} characters"
            ),
            ValidationError::UsernameWithoutPassword => {
                write!(f, "A password is required when a username is set")
            }
        }
    }
}

/// Is the slug URL path safe?
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LENGTH
        && slug
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

/// Parse an absolute URL with a supported scheme and a host
pub fn parse_destination(destination: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(destination)
        .map_err(|err| ValidationError::InvalidDestination(err.to_string()))?;

    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        return Err(ValidationError::InvalidDestination(format!(
            r#"Unsupported scheme "{}""#,
            url.scheme()
        )));
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::InvalidDestination(
            "Missing host".to_string(),
        ));
    }

    Ok(url)
}

/// Validate a redirect before it is written
pub fn validate_redirect(
    slug: &str,
    destination: &str,
    basic_auth_username: Option<&str>,
    basic_auth_password: Option<&str>,
) -> Result<(), ValidationError> {
    if !is_valid_slug(slug) {
        return Err(ValidationError::InvalidSlug);
    }

    if destination.chars().count() > MAX_DESTINATION_LENGTH {
        return Err(ValidationError::DestinationTooLong);
    }

    parse_destination(destination)?;

    if [basic_auth_username, basic_auth_password]
        .into_iter()
        .flatten()
        .any(|credential| credential.chars().count() > MAX_CREDENTIAL_LENGTH)
    {
        return Err(ValidationError::CredentialTooLong);
    }

    if basic_auth_username.is_some() && basic_auth_password.is_none() {
        return Err(ValidationError::UsernameWithoutPassword);
    }

    Ok(())
}

/// Empty credential fields mean "not set"
pub fn normalize_credential(value: &str) -> Option<&str> {
    Some(value).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn redirect(username: Option<&str>, password: Option<&str>) -> Redirect {
        Redirect {
            slug: "test".to_string(),
            destination: "https://example.com".to_string(),
            is_permanent: false,
            is_enabled: true,
            basic_auth_username: username.map(ToString::to_string),
            basic_auth_password: password.map(ToString::to_string),
            created_at: Utc::now().naive_utc(),
            modified_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_valid_slug() {
        assert!(is_valid_slug("some-slug_1"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("some/slug"));
        assert!(!is_valid_slug("some.png"));
        assert!(!is_valid_slug("🦙"));
        assert!(!is_valid_slug(&"a".repeat(MAX_SLUG_LENGTH + 1)));
    }

    #[test]
    fn test_parse_destination() {
        assert!(parse_destination("https://example.com").is_ok());
        assert!(parse_destination("ftp://example.com/file").is_ok());
        assert!(parse_destination("example.com").is_err());
        assert!(parse_destination("javascript:alert(1)").is_err());
        assert!(parse_destination("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_validate_credentials() {
        let validate = |username, password| {
            validate_redirect("test", "https://example.com", username, password)
        };

        assert_eq!(Ok(()), validate(None, None));
        assert_eq!(Ok(()), validate(None, Some("password")));
        assert_eq!(Ok(()), validate(Some("username"), Some("password")));
        assert_eq!(
            Err(ValidationError::UsernameWithoutPassword),
            validate(Some("username"), None)
        );
    }

    #[test]
    fn test_validate_lengths() {
        let destination = format!("https://example.com/{}", "a".repeat(MAX_DESTINATION_LENGTH));
        assert_eq!(
            Err(ValidationError::DestinationTooLong),
            validate_redirect("test", &destination, None, None)
        );

        let destination = format!("https://example.com/{}", "a".repeat(2000));
        assert_eq!(Ok(()), validate_redirect("test", &destination, None, None));

        let long = "a".repeat(MAX_CREDENTIAL_LENGTH + 1);
        let longest = "a".repeat(MAX_CREDENTIAL_LENGTH);
        let validate = |username, password| {
            validate_redirect("test", "https://example.com", username, password)
        };

        assert_eq!(
            Err(ValidationError::CredentialTooLong),
            validate(Some(long.as_str()), Some("password"))
        );
        assert_eq!(
            Err(ValidationError::CredentialTooLong),
            validate(None, Some(long.as_str()))
        );
        assert_eq!(
            Ok(()),
            validate(Some(longest.as_str()), Some(longest.as_str()))
        );
    }

    #[test]
    fn test_credentials() {
        assert_eq!(None, redirect(None, None).credentials());
        assert_eq!(None, redirect(Some("username"), Some("")).credentials());
        assert_eq!(None, redirect(Some("username"), None).credentials());
        assert_eq!(
            Some(("", "password")),
            redirect(None, Some("password")).credentials()
        );
        assert_eq!(
            Some(("username", "password")),
            redirect(Some("username"), Some("password")).credentials()
        );
    }
}
