//! Login form state

use log::warn;

use crate::auth::{Auth, Session};
use crate::error::Error;

/// Credential form shown before the dashboard.
///
/// Fields start empty. Nothing is validated locally; the API decides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Banner text of the last failed attempt
    pub error: Option<String>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue one login request. On failure the banner is set and the form
    /// stays usable for another attempt.
    pub async fn submit(&mut self, auth: &Auth) -> Result<Session, Error> {
        self.error = None;

        match auth.login(&self.email, &self.password).await {
            Ok(session) => Ok(session),
            Err(e) => {
                warn!("Login failed: {}", e);
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Back to the initial, empty form
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
