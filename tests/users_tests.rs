mod common;

use serde_json::json;
use std::time::Duration;

use crm_client::access::{Role, Tab};
use crm_client::error::Error;
use crm_client::models::Id;
use crm_client::view::Dashboard;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer};

use common::*;

async fn mount_users(server: &MockServer, users: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/usuarios"))
        .respond_with(ok(json!({ "usuarios": users })))
        .mount(server)
        .await;
}

async fn admin_dashboard(server: &MockServer, actor: serde_json::Value) -> Dashboard {
    mount_session(server, actor).await;
    mount_leads(server, json!([])).await;
    let dashboard = Dashboard::new(logged_in_client(options(server)));
    dashboard.mount().await.unwrap();
    dashboard.select_tab(Tab::Users).await.unwrap();
    dashboard
}

#[tokio::test]
async fn test_create_user_sends_payload_and_refetches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/usuarios"))
        .respond_with(ok(json!({"usuarios": [user_json(1, "superadmin", None)]})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/usuarios"))
        .respond_with(ok(json!({"usuarios": [user_json(1, "superadmin", None), user_json(9, "comercial", Some(2))]})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/empresas"))
        .respond_with(ok(json!({"empresas": [{"id": 2, "nombre": "Empresa B"}]})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/usuarios"))
        .and(header("Authorization", "Bearer test_token"))
        .and(body_json(json!({
            "nombre": "Luis",
            "email": "luis@empresa-b.com",
            "password": "secreto",
            "role": "comercial",
            "empresa_id": 2,
            "activo": true
        })))
        .respond_with(ok(json!({"id": 9})))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = admin_dashboard(&server, user_json(1, "superadmin", None)).await;
    assert_eq!(dashboard.state().users.len(), 1);

    dashboard.open_create_user().unwrap();
    dashboard
        .with_user_form(|form| {
            form.name = "Luis".to_string();
            form.email = "luis@empresa-b.com".to_string();
            form.password = "secreto".to_string();
            form.set_company(Some(Id::Num(2)))
        })
        .unwrap()
        .unwrap();
    dashboard.submit_user_form().await.unwrap();

    let state = dashboard.state();
    assert!(!state.user_modal.is_open());
    assert_eq!(state.users.len(), 2);
    assert_eq!(state.users[1].role, Role::Comercial);
}

#[tokio::test]
async fn test_edit_with_blank_password_leaves_it_out() {
    let server = MockServer::start().await;
    mount_users(&server, json!([user_json(1, "ceo", Some(4)), user_json(5, "directivo", Some(4))])).await;

    Mock::given(method("PUT"))
        .and(path("/api/usuarios/5"))
        .and(body_json(json!({
            "nombre": "Marta",
            "email": "user5@empresa-a.com",
            "role": "comercial",
            "empresa_id": 4,
            "activo": false
        })))
        .respond_with(ok(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = admin_dashboard(&server, user_json(1, "ceo", Some(4))).await;

    dashboard.open_edit_user(&Id::Num(5)).unwrap();
    let form = dashboard.state().user_modal.form().cloned().unwrap();
    assert_eq!(form.name, "User 5");
    assert!(form.password.is_empty());

    dashboard
        .with_user_form(|form| {
            form.name = "Marta".to_string();
            form.active = false;
            form.set_role(Role::Comercial)
        })
        .unwrap()
        .unwrap();
    dashboard.submit_user_form().await.unwrap();
    assert!(!dashboard.state().user_modal.is_open());
}

#[tokio::test]
async fn test_failed_create_keeps_form_open() {
    let server = MockServer::start().await;
    mount_users(&server, json!([user_json(1, "ceo", Some(4))])).await;

    Mock::given(method("POST"))
        .and(path("/api/usuarios"))
        .respond_with(fail(400, "El email ya está registrado"))
        .mount(&server)
        .await;

    let dashboard = admin_dashboard(&server, user_json(1, "ceo", Some(4))).await;

    dashboard.open_create_user().unwrap();
    dashboard.with_user_form(|form| {
        form.name = "Luis".to_string();
        form.email = "user1@empresa-a.com".to_string();
        form.password = "secreto".to_string();
    });

    let err = dashboard.submit_user_form().await.unwrap_err();
    assert!(matches!(err, Error::Api(_)));

    let state = dashboard.state();
    assert!(state.user_modal.is_creating());
    let form = state.user_modal.form().unwrap();
    assert_eq!(form.message.as_deref(), Some("El email ya está registrado"));
    assert_eq!(form.name, "Luis");
}

#[tokio::test]
async fn test_missing_password_is_caught_before_sending() {
    let server = MockServer::start().await;
    mount_users(&server, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/api/usuarios"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let dashboard = admin_dashboard(&server, user_json(1, "ceo", Some(4))).await;

    dashboard.open_create_user().unwrap();
    dashboard.with_user_form(|form| {
        form.name = "Luis".to_string();
        form.email = "luis@empresa-a.com".to_string();
    });

    let err = dashboard.submit_user_form().await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    let state = dashboard.state();
    assert!(state.user_modal.form().unwrap().message.is_some());
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let server = MockServer::start().await;
    mount_users(&server, json!([user_json(1, "superadmin", None), user_json(7, "comercial", Some(2))])).await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/empresas"))
        .respond_with(ok(json!({"empresas": []})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/usuarios/7"))
        .respond_with(ok(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = admin_dashboard(&server, user_json(1, "superadmin", None)).await;

    dashboard.request_delete_user(&Id::Num(7)).unwrap();
    assert_eq!(dashboard.state().pending_delete.unwrap().name, "User 7");
    dashboard.cancel_delete();
    assert!(dashboard.state().pending_delete.is_none());
    assert!(dashboard.confirm_delete().await.is_err());

    dashboard.request_delete_user(&Id::Num(7)).unwrap();
    dashboard.confirm_delete().await.unwrap();
    assert!(dashboard.state().pending_delete.is_none());
}

#[tokio::test]
async fn test_failed_delete_shows_admin_message() {
    let server = MockServer::start().await;
    mount_users(&server, json!([user_json(1, "ceo", Some(4)), user_json(7, "comercial", Some(4))])).await;

    Mock::given(method("DELETE"))
        .and(path("/api/usuarios/7"))
        .respond_with(fail(409, "El usuario tiene leads asignados"))
        .mount(&server)
        .await;

    let dashboard = admin_dashboard(&server, user_json(1, "ceo", Some(4))).await;

    dashboard.request_delete_user(&Id::Num(7)).unwrap();
    assert!(dashboard.confirm_delete().await.is_err());
    assert_eq!(
        dashboard.state().admin_message.as_deref(),
        Some("El usuario tiene leads asignados")
    );
}

#[tokio::test]
async fn test_ceo_cannot_touch_ceo_accounts() {
    let server = MockServer::start().await;
    mount_users(&server, json!([user_json(1, "ceo", Some(4)), user_json(2, "ceo", Some(4))])).await;

    Mock::given(method("DELETE"))
        .and(path("/api/usuarios/2"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let dashboard = admin_dashboard(&server, user_json(1, "ceo", Some(4))).await;

    assert!(matches!(
        dashboard.open_edit_user(&Id::Num(2)),
        Err(Error::Permission(_))
    ));
    assert!(matches!(
        dashboard.request_delete_user(&Id::Num(2)),
        Err(Error::Permission(_))
    ));
    assert!(!dashboard.view(|state| state.can_manage(&state.users[1])));
}

#[tokio::test]
async fn test_late_save_leaves_newer_form_open() {
    let server = MockServer::start().await;
    mount_users(
        &server,
        json!([
            user_json(1, "ceo", Some(4)),
            user_json(5, "directivo", Some(4)),
            user_json(6, "comercial", Some(4))
        ]),
    )
    .await;

    Mock::given(method("PUT"))
        .and(path("/api/usuarios/5"))
        .respond_with(ok(json!({})).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = admin_dashboard(&server, user_json(1, "ceo", Some(4))).await;
    dashboard.open_edit_user(&Id::Num(5)).unwrap();

    let (saved, opened) = tokio::join!(dashboard.submit_user_form(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        dashboard.open_edit_user(&Id::Num(6))
    });
    saved.unwrap();
    opened.unwrap();

    let state = dashboard.state();
    assert!(state.user_modal.is_for(Some(&Id::Num(6))));
    assert_eq!(state.user_modal.form().unwrap().name, "User 6");
    assert!(state.user_modal.form().unwrap().message.is_none());
}
