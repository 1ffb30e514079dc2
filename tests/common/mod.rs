#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crm_client::auth::{MemoryTokenStore, Session, TokenStore};
use crm_client::config::ClientOptions;
use crm_client::CrmClient;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test_token";

pub fn options(server: &MockServer) -> ClientOptions {
    ClientOptions::default()
        .with_api_url(&format!("{}/api", server.uri()))
        .with_search_debounce(Duration::ZERO)
}

/// Client with an in-memory store the test can inspect
pub fn client_with_store(options: ClientOptions) -> (CrmClient, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::new());
    let client = CrmClient::new_with_options(options, store.clone() as Arc<dyn TokenStore>)
        .expect("client");
    (client, store)
}

/// Client that already holds a session token
pub fn logged_in_client(options: ClientOptions) -> CrmClient {
    let (client, _) = client_with_store(options);
    client.session.set(Session::new(TOKEN.to_string(), None));
    client
}

pub fn user_json(id: i64, role: &str, company: Option<i64>) -> Value {
    json!({
        "id": id,
        "nombre": format!("User {}", id),
        "email": format!("user{}@empresa-a.com", id),
        "role": role,
        "empresa_id": company,
        "activo": 1
    })
}

pub fn lead_json(id: i64, name: &str, estado: &str) -> Value {
    json!({
        "id": id,
        "nombre": name,
        "apellidos": "López",
        "email": format!("{}@example.com", name.to_lowercase()),
        "telefono": "600123123",
        "mensaje": format!("Mensaje de {}", name),
        "origen": "formulario_web",
        "estado": estado,
        "empresa_id": 1,
        "created_at": "2024-05-02T09:30:00.000Z"
    })
}

pub fn ok(body: Value) -> ResponseTemplate {
    let mut body = body;
    body["success"] = json!(true);
    ResponseTemplate::new(200).set_body_json(body)
}

pub fn fail(status: u16, error: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({"success": false, "error": error}))
}

/// Mocks identity and statistics, the two fetches every mount makes
pub async fn mount_session(server: &MockServer, user: Value) {
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("Authorization", "Bearer test_token"))
        .respond_with(ok(json!({"usuario": user})))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/stats"))
        .respond_with(ok(json!({
            "stats": {
                "totalLeads": 3,
                "porEstado": [
                    {"estado": "recibido", "cantidad": 2},
                    {"estado": "contestado", "cantidad": 1}
                ]
            }
        })))
        .mount(server)
        .await;
}

pub async fn mount_leads(server: &MockServer, leads: Value) {
    Mock::given(method("GET"))
        .and(path("/api/dashboard/leads"))
        .respond_with(ok(json!({"leads": leads})))
        .mount(server)
        .await;
}
