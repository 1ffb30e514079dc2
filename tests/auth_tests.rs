mod common;

use serde_json::json;
use std::time::Duration;

use crm_client::access::Role;
use crm_client::auth::TokenStore;
use crm_client::error::ErrorKind;
use crm_client::view::LoginForm;
use crm_client::CrmClient;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

#[tokio::test]
async fn test_login_stores_token_and_user() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "ana@empresa-a.com", "password": "secreto"})))
        .respond_with(ok(json!({
            "token": "fresh_token",
            "usuario": user_json(1, "ceo", Some(1))
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with_store(options(&server));
    let session = client.auth().login("ana@empresa-a.com", "secreto").await.unwrap();

    assert_eq!(session.token, "fresh_token");
    assert_eq!(session.user.unwrap().role, Role::Ceo);
    assert_eq!(client.session.token().unwrap(), "fresh_token");
    assert_eq!(store.load("token").unwrap().as_deref(), Some("fresh_token"));
}

#[tokio::test]
async fn test_login_failure_keeps_form_usable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(fail(401, "Credenciales inválidas"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ok(json!({
            "token": "second_try",
            "usuario": user_json(1, "comercial", Some(1))
        })))
        .mount(&server)
        .await;

    let (client, store) = client_with_store(options(&server));
    let mut form = LoginForm::new();
    form.email = "ana@empresa-a.com".to_string();
    form.password = "wrong".to_string();

    let err = form.submit(client.auth()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(form.error.as_deref(), Some("Credenciales inválidas"));
    assert!(!client.session.is_authenticated());
    assert_eq!(store.load("token").unwrap(), None);

    // retry without any reset
    form.password = "right".to_string();
    form.submit(client.auth()).await.unwrap();
    assert_eq!(form.error, None);
    assert_eq!(client.session.token().unwrap(), "second_try");
}

#[tokio::test]
async fn test_login_form_starts_empty() {
    let form = LoginForm::new();
    assert!(form.email.is_empty());
    assert!(form.password.is_empty());
}

#[tokio::test]
async fn test_connection_failure_message() {
    let client = CrmClient::new("http://127.0.0.1:1/api").unwrap();
    let mut form = LoginForm::new();

    let err = form.submit(client.auth()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(form.error.unwrap().starts_with("Connection error"));
}

#[tokio::test]
async fn test_timeout_is_a_connection_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "usuario": user_json(1, "ceo", Some(1))}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = logged_in_client(
        options(&server).with_request_timeout(Some(Duration::from_millis(200))),
    );
    let err = client.auth().me().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err.user_message().contains("timed out"));
}

#[tokio::test]
async fn test_me_sends_bearer_and_resolves_user() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("Authorization", "Bearer test_token"))
        .respond_with(ok(json!({"usuario": user_json(9, "directivo", Some(3))})))
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(options(&server));
    let user = client.auth().me().await.unwrap();
    assert_eq!(user.role, Role::Directivo);
    assert_eq!(client.session.user().unwrap(), user);
}

#[tokio::test]
async fn test_me_without_session_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ok(json!({"usuario": user_json(9, "ceo", None)})))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _) = client_with_store(options(&server));
    assert!(client.auth().me().await.is_err());
}

#[tokio::test]
async fn test_logout_and_restore() {
    let server = MockServer::start().await;
    let (client, store) = client_with_store(options(&server));

    store.save("token", "persisted").unwrap();
    assert!(client.auth().restore().unwrap());
    assert_eq!(client.session.token().unwrap(), "persisted");

    client.auth().logout().unwrap();
    assert!(!client.session.is_authenticated());
    assert_eq!(store.load("token").unwrap(), None);
    assert!(!client.auth().restore().unwrap());
}
