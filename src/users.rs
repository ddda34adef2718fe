//! Operators managing the redirects

use anyhow::Result;
use chrono::naive::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::password::generate;
use crate::password::hash;
use crate::settings::Settings;
use crate::storage;
use crate::storage::CreateUserValues;
use crate::storage::Storage;

/// User roles
///
/// Stored as the `user_role_type` Postgres enum
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "user_role_type", rename_all = "lowercase")]
pub enum Role {
    /// Manage users/redirects
    Admin,
    /// Manage redirects
    Manager,
}

/// An operator, one row of the `users` table
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub session_id: Uuid,
    pub username: String,
    pub hashed_password: String,
    pub role: Role,
    #[allow(dead_code)] // used by storage
    pub created_at: NaiveDateTime,
    #[allow(dead_code)] // used by storage
    pub updated_at: NaiveDateTime,
}

/// Errors when creating an operator
#[derive(Debug)]
pub enum CreateOperatorError {
    /// The password could not be hashed
    Hash(String),

    /// The storage failed
    Storage(storage::Error),
}

impl std::error::Error for CreateOperatorError {}

impl std::fmt::Display for CreateOperatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CreateOperatorError::Hash(error) => write!(f, "Could not hash password: {error}"),
            CreateOperatorError::Storage(error) => write!(f, "{error}"),
        }
    }
}

/// Create an operator
///
/// Every write path creating users goes through here, a fresh session is always started
pub async fn create_operator<S: Storage>(
    storage: &S,
    username: &str,
    password: &str,
    role: Role,
) -> core::result::Result<User, CreateOperatorError> {
    let hashed_password =
        hash(password).map_err(|err| CreateOperatorError::Hash(err.to_string()))?;

    let values = CreateUserValues {
        session_id: &Uuid::new_v4(),
        role,
        username,
        hashed_password: &hashed_password,
    };

    storage
        .create_user(&values)
        .await
        .map_err(CreateOperatorError::Storage)
}

/// Make sure there is always someone who can log in
pub async fn ensure_initial_user<S: Storage>(storage: &S, settings: &Settings) -> Result<()> {
    let user = storage.find_any_single_user().await?;

    if user.is_none() {
        let username = settings.initial_username.clone().unwrap_or_else(|| {
            let initial_username = Uuid::new_v4().to_string();
            tracing::info!(
                "`INITIAL_USERNAME` not set, generating new username: {initial_username}"
            );
            initial_username
        });

        let password = settings.initial_password.clone().unwrap_or_else(|| {
            let initial_password = generate();
            tracing::info!(
                "`INITIAL_PASSWORD` not set, generating new password: {initial_password}"
            );
            initial_password
        });

        create_operator(storage, &username, &password, Role::Admin).await?;

        tracing::info!("Initial user `{username}` created");
    }

    Ok(())
}
