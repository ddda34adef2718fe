use crate::tests::helper;

#[tokio::test]
async fn test_login() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;
    assert!(access_token.len() > 10);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::maybe_login(&mut app, "admin", "wrong").await;
    assert!(access_token.is_none());
}

#[tokio::test]
async fn test_login_with_unknown_user() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::maybe_login(&mut app, "nobody", "verysecret").await;
    assert!(access_token.is_none());
}
