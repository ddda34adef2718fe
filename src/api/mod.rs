//! All admin endpoint setup

use axum::Router;
use axum::routing::get;
use axum::routing::post;
use serde::Serialize;

pub use current_user::CurrentUser;
pub use current_user::JwtKeys;
pub use request::Form;
pub use request::PathParameters;
pub use request::QueryParameters;
pub use response::Error;
pub use response::Success;

use crate::settings::ADMIN_INDEX;
use crate::storage::Storage;

mod current_user;
mod redirects;
mod request;
mod response;
mod users;

/// The path the redirect add form lives at
pub const ADD_REDIRECT_FORM: &str = "/-/admin/redirects/add";

/// Get the Axum router for all admin routes
pub fn router<S: Storage>() -> Router {
    Router::new()
        .route(ADMIN_INDEX, get(index))
        .route(ADD_REDIRECT_FORM, get(redirects::add_form::<S>))
        .route("/-/admin/api/users/token", post(users::token::<S>))
        .route(
            "/-/admin/api/users",
            get(users::list::<S>).post(users::create::<S>),
        )
        .route("/-/admin/api/users/me", get(users::me::<S>))
        .route(
            "/-/admin/api/redirects",
            get(redirects::list::<S>).post(redirects::create::<S>),
        )
        .route(
            "/-/admin/api/redirects/{slug}",
            get(redirects::single::<S>)
                .patch(redirects::update::<S>)
                .delete(redirects::delete::<S>),
        )
}

/// The admin index
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    /// Name of the admin
    pub title: &'static str,

    /// Where the redirects are managed
    pub redirects: &'static str,

    /// Where tokens are handed out
    pub token: &'static str,
}

/// Entry point of the admin
///
/// Request:
/// ```sh
/// curl -v http://localhost:6000/-/admin/
/// ```
pub async fn index() -> Success<IndexResponse> {
    Success::ok(IndexResponse {
        title: "Waypost administration",
        redirects: "/-/admin/api/redirects",
        token: "/-/admin/api/users/token",
    })
}
