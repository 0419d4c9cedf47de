mod common;

#[tokio::test]
async fn health_check_works() {
    let app = common::spawn_app().await;

    let response = app.get("/health_check", None).await;

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}
