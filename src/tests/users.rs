use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_current_user() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let (status_code, user) = helper::current_user(&mut app, &access_token).await;
    assert_eq!(StatusCode::OK, status_code);

    let user = user.unwrap();
    assert_eq!("admin", user.username);
    assert_eq!("admin", user.role);
    assert!(user.password.is_none());

    let (status_code, _) = helper::current_user(&mut app, "Bearer invalid").await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
}

#[tokio::test]
async fn test_create_manager() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let (status_code, user, _) =
        helper::maybe_create_user(&mut app, &access_token, "manager", "manager", None).await;
    assert_eq!(StatusCode::CREATED, status_code);

    let user = user.unwrap();
    assert_eq!("manager", user.username);
    assert_eq!("manager", user.role);

    // generated password is only shown once
    let password = user.password.unwrap();
    let manager_token = helper::maybe_login(&mut app, "manager", &password)
        .await
        .unwrap();

    let (status_code, _) = helper::list_users(&mut app, &manager_token).await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);

    // managers manage redirects
    let (status_code, _, _) =
        helper::maybe_create_redirect(&mut app, &manager_token, "test", "https://example.com")
            .await;
    assert_eq!(StatusCode::CREATED, status_code);

    let (status_code, users) = helper::list_users(&mut app, &access_token).await;
    assert_eq!(StatusCode::OK, status_code);

    let users = users.unwrap();
    assert_eq!(2, users.len());
    assert!(
        users
            .iter()
            .any(|user| user.username == "manager" && user.role == "manager")
    );
}

#[tokio::test]
async fn test_create_user_with_password() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let (status_code, user, _) = helper::maybe_create_user(
        &mut app,
        &access_token,
        "someone",
        "admin",
        Some("anothersecret"),
    )
    .await;
    assert_eq!(StatusCode::CREATED, status_code);
    assert!(user.unwrap().password.is_none());

    let access_token = helper::maybe_login(&mut app, "someone", "anothersecret").await;
    assert!(access_token.is_some());
}

#[tokio::test]
async fn test_create_duplicate_user() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let (status_code, _, message) =
        helper::maybe_create_user(&mut app, &access_token, "admin", "manager", None).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("User already exists".to_string()), message);

    let (status_code, _, message) =
        helper::maybe_create_user(&mut app, &access_token, " ", "manager", None).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Username can not be empty".to_string()), message);
}
