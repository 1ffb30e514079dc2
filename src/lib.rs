//! CRM Rust Client Library
//!
//! A client for the multi-company lead CRM: typed access to its REST API,
//! the role model that decides what each user sees, and a headless dashboard
//! view-model that front ends render.

pub mod access;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod models;
pub mod users;
pub mod view;

use reqwest::Client;
use std::sync::Arc;

use crate::auth::{Auth, MemoryTokenStore, SessionContext, TokenStore};
use crate::config::ClientOptions;
use crate::dashboard::DashboardClient;
use crate::error::Error;
use crate::users::UsersClient;

/// The main entry point for the CRM client
#[derive(Clone)]
pub struct CrmClient {
    /// The API base URL
    pub url: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Auth client for login and identity
    pub auth: Auth,
    /// The session shared by every sub-client
    pub session: SessionContext,
    /// Client options
    pub options: ClientOptions,
}

impl CrmClient {
    /// Create a new client keeping the token in memory only
    ///
    /// # Example
    ///
    /// ```
    /// use crm_client::CrmClient;
    ///
    /// let crm = CrmClient::new("http://localhost:3000/api").unwrap();
    /// ```
    pub fn new(api_url: &str) -> Result<Self, Error> {
        Self::new_with_options(
            ClientOptions::default().with_api_url(api_url),
            Arc::new(MemoryTokenStore::new()),
        )
    }

    /// Create a new client with custom options and token store
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use crm_client::{CrmClient, auth::MemoryTokenStore, config::ClientOptions};
    ///
    /// let options = ClientOptions::default().with_message_preview_len(80);
    /// let crm = CrmClient::new_with_options(options, Arc::new(MemoryTokenStore::new())).unwrap();
    /// ```
    pub fn new_with_options(
        options: ClientOptions,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let session = SessionContext::new();
        let auth = Auth::new(http_client.clone(), session.clone(), store, options.clone());

        Ok(Self {
            url: options.api_url.clone(),
            http_client,
            auth,
            session,
            options,
        })
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Client for statistics, leads and companies
    pub fn dashboard(&self) -> DashboardClient {
        DashboardClient::new(&self.url, self.http_client.clone(), self.session.clone())
    }

    /// Client for user administration
    pub fn users(&self) -> UsersClient {
        UsersClient::new(&self.url, self.http_client.clone(), self.session.clone())
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::access::{assignable_roles, capabilities, Capabilities, Role, Tab};
    pub use crate::config::ClientOptions;
    pub use crate::error::{Error, ErrorKind};
    pub use crate::view::Dashboard;
    pub use crate::CrmClient;
}
