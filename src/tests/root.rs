use axum::http::StatusCode;

use crate::settings::RootRedirect;
use crate::tests::helper;

#[tokio::test]
async fn test_root() {
    let mut app = helper::setup_test_app().await;

    let response = helper::visit(&mut app, "/", None).await;
    assert_eq!(StatusCode::NOT_FOUND, response.status_code);
    assert_eq!(None, response.header("location"));
}

#[tokio::test]
async fn test_root_to_admin() {
    let mut app = helper::setup_test_app_with_root(RootRedirect::Admin).await;

    let response = helper::visit(&mut app, "/", None).await;
    assert_eq!(StatusCode::FOUND, response.status_code);
    assert_eq!(Some("/-/admin/".to_string()), response.header("location"));
    assert_eq!(Some("noindex".to_string()), response.header("x-robots-tag"));

    let response = helper::visit(&mut app, "/-/admin/", None).await;
    assert_eq!(StatusCode::OK, response.status_code);
}

#[tokio::test]
async fn test_root_to_url() {
    let mut app = helper::setup_test_app_with_root(RootRedirect::Url(
        "https://example.com/home".to_string(),
    ))
    .await;

    let response = helper::visit(&mut app, "/", None).await;
    assert_eq!(StatusCode::FOUND, response.status_code);
    assert_eq!(
        Some("https://example.com/home".to_string()),
        response.header("location")
    );
    assert_eq!(
        Some("max-age=0, no-cache, no-store, must-revalidate, private".to_string()),
        response.header("cache-control")
    );
}

#[tokio::test]
async fn test_root_with_valid_utf8() {
    let mut app = helper::setup_test_app().await;

    let response = helper::visit(&mut app, "/%20", None).await;
    assert_eq!(StatusCode::NOT_FOUND, response.status_code);
    assert_eq!(None, response.header("location"));
}

#[tokio::test]
async fn test_root_with_invalid_utf8() {
    let mut app = helper::setup_test_app().await;

    let response = helper::visit(&mut app, "/%c0", None).await;
    assert_eq!(StatusCode::BAD_REQUEST, response.status_code);
    assert_eq!(None, response.header("location"));
    assert!(
        response
            .text()
            .contains("URL contains invalid UTF-8 characters")
    );
}

#[tokio::test]
async fn test_nested_path() {
    let mut app = helper::setup_test_app().await;

    let response = helper::visit(&mut app, "/some/nested/path", None).await;
    assert_eq!(StatusCode::NOT_FOUND, response.status_code);
}
