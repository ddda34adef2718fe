//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
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

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// All users in storage
    users: Arc<Mutex<HashMap<Uuid, User>>>,

    /// All redirects in storage, by slug
    redirects: Arc<Mutex<HashMap<String, Redirect>>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for Memory {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_any_single_user(&self) -> Result<Option<User>> {
        Ok(self.users.lock().await.values().next().cloned())
    }

    async fn find_all_users(&self) -> Result<Vec<User>> {
        let mut users = self
            .users
            .lock()
            .await
            .values()
            .cloned()
            .collect::<Vec<User>>();

        users.sort_by(|a, b| a.username.cmp(&b.username));

        Ok(users)
    }

    async fn find_single_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().await.get(id).cloned())
    }

    async fn create_user(&self, values: &CreateUserValues<'_>) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            session_id: *values.session_id,
            username: values.username.to_string(),
            hashed_password: values.hashed_password.to_string(),
            role: values.role,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        };

        self.users.lock().await.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_all_redirects(&self, filter: &RedirectFilter<'_>) -> Result<Vec<Redirect>> {
        let mut redirects = self
            .redirects
            .lock()
            .await
            .values()
            .filter(|redirect| filter.matches(redirect))
            .cloned()
            .collect::<Vec<Redirect>>();

        redirects.sort_by(|a, b| a.slug.cmp(&b.slug));

        Ok(redirects)
    }

    async fn find_single_redirect_by_slug(&self, slug: &str) -> Result<Option<Redirect>> {
        Ok(self.redirects.lock().await.get(slug).cloned())
    }

    async fn create_redirect(&self, values: &CreateRedirectValues<'_>) -> Result<Redirect> {
        let mut redirects = self.redirects.lock().await;

        let Entry::Vacant(entry) = redirects.entry(values.slug.to_string()) else {
            return Err(Error::DuplicateSlug);
        };

        let redirect = Redirect {
            slug: values.slug.to_string(),
            destination: values.destination.to_string(),
            is_permanent: values.is_permanent,
            is_enabled: values.is_enabled,
            basic_auth_username: values.basic_auth_username.map(ToString::to_string),
            basic_auth_password: values.basic_auth_password.map(ToString::to_string),
            created_at: Utc::now().naive_utc(),
            modified_at: Utc::now().naive_utc(),
        };

        Ok(entry.insert(redirect).clone())
    }

    async fn update_redirect(
        &self,
        redirect: &Redirect,
        values: &UpdateRedirectValues<'_>,
    ) -> Result<Redirect> {
        self.redirects
            .lock()
            .await
            .get_mut(&redirect.slug)
            .map(|redirect| {
                if let Some(destination) = values.destination {
                    redirect.destination = destination.to_string();
                }

                if let Some(is_permanent) = values.is_permanent {
                    redirect.is_permanent = is_permanent;
                }

                if let Some(is_enabled) = values.is_enabled {
                    redirect.is_enabled = is_enabled;
                }

                if let Some(username) = values.basic_auth_username {
                    redirect.basic_auth_username = username.map(ToString::to_string);
                }

                if let Some(password) = values.basic_auth_password {
                    redirect.basic_auth_password = password.map(ToString::to_string);
                }

                redirect.modified_at = Utc::now().naive_utc();

                redirect.clone()
            })
            .ok_or_else(|| Error::Connection(format!(r#"Redirect "{}" is gone"#, redirect.slug)))
    }

    async fn delete_redirect(&self, redirect: &Redirect) -> Result<()> {
        self.redirects.lock().await.remove(&redirect.slug);

        Ok(())
    }
}
