//! Authentication against the CRM API

mod session;
mod store;
mod types;

use log::info;
use reqwest::Client;
use std::sync::Arc;

use crate::config::ClientOptions;
use crate::error::Error;
use crate::fetch::Fetch;
use crate::models::User;

pub use session::*;
pub use store::*;
pub use types::*;

/// Client for the `/auth` endpoints
#[derive(Clone)]
pub struct Auth {
    /// The API base URL
    url: String,

    /// HTTP client used for requests
    client: Client,

    /// The current session
    session: SessionContext,

    /// Where the token is persisted
    store: Arc<dyn TokenStore>,

    /// Client options
    options: ClientOptions,
}

impl Auth {
    /// Create a new Auth client
    pub(crate) fn new(
        client: Client,
        session: SessionContext,
        store: Arc<dyn TokenStore>,
        options: ClientOptions,
    ) -> Self {
        Self {
            url: options.api_url.clone(),
            client,
            session,
            store,
            options,
        }
    }

    fn get_auth_url(&self, path: &str) -> String {
        format!("{}/auth{}", self.url, path)
    }

    /// Sign in with email and password.
    ///
    /// Fields are not checked locally; the API decides what is valid. On
    /// success the token is kept in the session and persisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, Error> {
        let url = self.get_auth_url("/login");

        let body = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };

        let result = Fetch::post(&self.client, &url)
            .json(&body)?
            .execute::<LoginResponse>()
            .await?;

        let session = Session::new(result.token, Some(result.user));
        self.session.set(session.clone());
        self.store.save(&self.options.token_key, &session.token)?;
        info!("Logged in as {}", email);

        Ok(session)
    }

    /// Resolve the user the current token belongs to
    pub async fn me(&self) -> Result<User, Error> {
        let url = self.get_auth_url("/me");
        let token = self.session.token()?;

        let result = Fetch::get(&self.client, &url)
            .bearer_auth(&token)
            .execute::<MeResponse>()
            .await?;

        self.session.set_user(result.user.clone());
        Ok(result.user)
    }

    /// Forget the session and the persisted token
    pub fn logout(&self) -> Result<(), Error> {
        self.session.clear();
        self.store.remove(&self.options.token_key)?;
        info!("Logged out");
        Ok(())
    }

    /// Load a persisted token into the session. Returns whether one was found.
    pub fn restore(&self) -> Result<bool, Error> {
        match self.store.load(&self.options.token_key)? {
            Some(token) if !token.is_empty() => {
                self.session.set(Session::new(token, None));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Get the current session
    pub fn get_session(&self) -> Option<Session> {
        self.session.get()
    }

    pub fn session_context(&self) -> &SessionContext {
        &self.session
    }
}
