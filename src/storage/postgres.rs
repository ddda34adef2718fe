//! Postgres storage

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::redirects::Redirect;
use crate::users::User;

use super::CreateRedirectValues;
use super::CreateUserValues;
use super::Error;
use super::RedirectFilter;
use super::Result;
use super::Storage;
use super::UpdateRedirectValues;
use super::connection_error;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Columns of the users table
const USER_COLUMNS: &str = "id, session_id, username, hashed_password, role, created_at, updated_at";

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage from a connection string
    ///
    /// Migrations will be run
    pub async fn connect(database_connection_string: &str) -> Result<Self> {
        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_connection_string)
            .await
            .map_err(connection_error)?;

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn new_with_pool(connection_pool: PgPool) -> Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .map_err(|err| Error::Connection(format!("Migrations could not run: {err}")))?;

        Ok(Self { connection_pool })
    }
}

#[async_trait]
impl Storage for Postgres {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(())
    }

    async fn find_any_single_user(&self) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users LIMIT 1"
        ))
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn find_all_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY username"
        ))
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(users)
    }

    async fn find_single_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 LIMIT 1"
        ))
        .bind(username)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn create_user(&self, values: &CreateUserValues<'_>) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r"
            INSERT INTO users (id, session_id, username, hashed_password, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(values.session_id)
        .bind(values.username)
        .bind(values.hashed_password)
        .bind(values.role)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn find_all_redirects(&self, filter: &RedirectFilter<'_>) -> Result<Vec<Redirect>> {
        let redirects = sqlx::query_as::<_, Redirect>(
            r"
            SELECT *
            FROM redirects
            WHERE ($1::text IS NULL
                    OR slug ILIKE '%' || $1 || '%'
                    OR destination ILIKE '%' || $1 || '%')
                AND ($2::boolean IS NULL OR is_permanent = $2)
                AND ($3::boolean IS NULL OR is_enabled = $3)
            ORDER BY slug
            ",
        )
        .bind(filter.search)
        .bind(filter.is_permanent)
        .bind(filter.is_enabled)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(redirects)
    }

    async fn find_single_redirect_by_slug(&self, slug: &str) -> Result<Option<Redirect>> {
        let redirect = sqlx::query_as::<_, Redirect>(
            r"
            SELECT *
            FROM redirects
            WHERE slug = $1
            LIMIT 1
            ",
        )
        .bind(slug)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(redirect)
    }

    async fn create_redirect(&self, values: &CreateRedirectValues<'_>) -> Result<Redirect> {
        let redirect = sqlx::query_as::<_, Redirect>(
            r"
            INSERT INTO redirects (
                slug,
                destination,
                is_permanent,
                is_enabled,
                basic_auth_username,
                basic_auth_password
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(values.slug)
        .bind(values.destination)
        .bind(values.is_permanent)
        .bind(values.is_enabled)
        .bind(values.basic_auth_username)
        .bind(values.basic_auth_password)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref database_error) if database_error.is_unique_violation() => {
                Error::DuplicateSlug
            }
            err => connection_error(err),
        })?;

        Ok(redirect)
    }

    async fn update_redirect(
        &self,
        redirect: &Redirect,
        values: &UpdateRedirectValues<'_>,
    ) -> Result<Redirect> {
        let updated_redirect = sqlx::query_as::<_, Redirect>(
            r"
            UPDATE redirects
            SET destination = $1,
                is_permanent = $2,
                is_enabled = $3,
                basic_auth_username = $4,
                basic_auth_password = $5,
                modified_at = CURRENT_TIMESTAMP
            WHERE slug = $6
            RETURNING *
            ",
        )
        .bind(values.destination.unwrap_or(&redirect.destination))
        .bind(values.is_permanent.unwrap_or(redirect.is_permanent))
        .bind(values.is_enabled.unwrap_or(redirect.is_enabled))
        .bind(
            values
                .basic_auth_username
                .unwrap_or(redirect.basic_auth_username.as_deref()),
        )
        .bind(
            values
                .basic_auth_password
                .unwrap_or(redirect.basic_auth_password.as_deref()),
        )
        .bind(&redirect.slug)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(updated_redirect)
    }

    async fn delete_redirect(&self, redirect: &Redirect) -> Result<()> {
        sqlx::query(
            r"
            DELETE FROM redirects
            WHERE slug = $1
            ",
        )
        .bind(&redirect.slug)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(())
    }
}
