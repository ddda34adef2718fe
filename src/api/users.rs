//! Operator API management

use axum::Extension;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::password::generate;
use crate::password::verify;
use crate::storage::Storage;
use crate::users::Role;
use crate::users::User;
use crate::users::create_operator;

use super::CurrentUser;
use super::Error;
use super::Form;
use super::JwtKeys;
use super::Success;
use super::current_user::Token;
use super::current_user::generate_token;

/// The user response information
///
/// A subset of all the information, ready to be serialized for the outside world
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// The user ID
    pub id: Uuid,

    /// The username
    pub username: String,

    /// The role of the user
    pub role: Role,

    /// The password, if generated
    // Password should only be added when newly generated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserResponse {
    /// Create a user response from a [`User`](User)
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            password: None,
        }
    }
}

/// Login form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    /// Username of the user
    username: String,
    /// Password of the user
    password: String,
}

/// Get a token for an operator "session"
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "username": "admin", "password": "verysecret" }' \
///     http://localhost:6000/-/admin/api/users/token
/// ```
///
/// Response
/// ```json
/// { "data": { "token_type": "Bearer", "access_token": "some token" } }
/// ```
pub async fn token<S: Storage>(
    Extension(jwt_keys): Extension<JwtKeys>,
    Extension(storage): Extension<S>,
    Form(form): Form<LoginForm>,
) -> Result<Success<Token>, Error> {
    let user = storage.find_single_user_by_username(&form.username).await?;

    match user {
        Some(user) if verify(&user.hashed_password, &form.password) => {
            generate_token(&jwt_keys, &user).map(Success::ok)
        }
        _ => Err(Error::bad_request("Invalid user")),
    }
}

/// List all operators
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/-/admin/api/users
/// ```
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
) -> Result<Success<Vec<UserResponse>>, Error> {
    current_user.role.is_allowed(Role::Admin)?;

    let users = storage.find_all_users().await?;

    Ok(Success::ok(users.iter().map(UserResponse::from_user).collect()))
}

/// Get the current operator
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/-/admin/api/users/me
/// ```
pub async fn me<S: Storage>(current_user: CurrentUser<S>) -> Success<UserResponse> {
    Success::ok(UserResponse::from_user(&current_user))
}

/// Create user form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserForm {
    /// Role of the new user
    role: Role,
    /// Username of the new user
    username: String,
    /// Optional password of the new user
    ///
    /// When not provided a new password will be generated and returned in the response, this will
    /// be the only time the password is visible -- make sure to capture it.
    password: Option<String>,
}

/// Create an operator based on the [`CreateUserForm`](CreateUserForm) form
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "role": "manager", "username": "some-other-username" }' \
///     http://localhost:6000/-/admin/api/users
/// ```
pub async fn create<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<CreateUserForm>,
) -> Result<Success<UserResponse>, Error> {
    current_user.role.is_allowed(Role::Admin)?;

    let username = form.username.trim();
    if username.is_empty() {
        return Err(Error::bad_request("Username can not be empty"));
    }

    let existing_user = storage.find_single_user_by_username(username).await?;

    if existing_user.is_some() {
        return Err(Error::bad_request("User already exists"));
    }

    let (is_generated, password) = match form.password {
        Some(password) if !password.is_empty() => (false, password),
        _ => (true, generate()),
    };

    let user = create_operator(&storage, username, &password, form.role)
        .await
        .map_err(Error::internal_server_error)?;

    tracing::info!("Operator `{}` created by `{}`", user.username, current_user.username);

    let mut response = UserResponse::from_user(&user);

    // only add the generated password, its the only time the password is known to anybody
    if is_generated {
        response.password = Some(password);
    }

    Ok(Success::created(response))
}
