//! Request and response bodies of the auth endpoints

use serde::{Deserialize, Serialize};

use crate::models::User;

/// Login form payload
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Payload of a successful `POST /auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// The bearer token
    pub token: String,

    /// The signed-in user
    #[serde(rename = "usuario")]
    pub user: User,
}

/// Payload of `GET /auth/me`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MeResponse {
    #[serde(rename = "usuario")]
    pub user: User,
}
