//! Payloads of the `/usuarios` endpoints

use serde::{Deserialize, Serialize};

use crate::access::Role;
use crate::models::{Id, User};

/// Body of `POST /usuarios` and `PUT /usuarios/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPayload {
    #[serde(rename = "nombre")]
    pub name: String,

    pub email: String,

    /// Always present on create; absent on edit means "keep the current one"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    pub role: Role,

    #[serde(rename = "empresa_id", skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Id>,

    #[serde(rename = "activo")]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsersResponse {
    #[serde(rename = "usuarios", alias = "users", default)]
    pub users: Vec<User>,
}
