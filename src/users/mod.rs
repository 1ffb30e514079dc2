//! User administration

mod types;

use log::info;
use reqwest::Client;

use crate::auth::SessionContext;
use crate::error::Error;
use crate::fetch::Fetch;
use crate::models::{Id, User};

pub use types::*;

/// Client for the `/usuarios` endpoints
#[derive(Clone)]
pub struct UsersClient {
    /// The API base URL
    url: String,

    /// HTTP client used for requests
    client: Client,

    session: SessionContext,
}

impl UsersClient {
    pub(crate) fn new(url: &str, client: Client, session: SessionContext) -> Self {
        Self {
            url: url.to_string(),
            client,
            session,
        }
    }

    fn get_url(&self, path: &str) -> String {
        format!("{}/usuarios{}", self.url, path)
    }

    /// Users the current account may see
    pub async fn list(&self) -> Result<Vec<User>, Error> {
        let token = self.session.token()?;
        let result = Fetch::get(&self.client, &self.get_url(""))
            .bearer_auth(&token)
            .execute::<UsersResponse>()
            .await?;
        Ok(result.users)
    }

    pub async fn create(&self, payload: &UserPayload) -> Result<(), Error> {
        let token = self.session.token()?;
        Fetch::post(&self.client, &self.get_url(""))
            .bearer_auth(&token)
            .json(payload)?
            .execute_empty()
            .await?;
        info!("Created user {} ({})", payload.email, payload.role);
        Ok(())
    }

    pub async fn update(&self, user_id: &Id, payload: &UserPayload) -> Result<(), Error> {
        let token = self.session.token()?;
        Fetch::put(&self.client, &self.get_url(&format!("/{}", user_id)))
            .bearer_auth(&token)
            .json(payload)?
            .execute_empty()
            .await?;
        info!("Updated user {}", user_id);
        Ok(())
    }

    pub async fn delete(&self, user_id: &Id) -> Result<(), Error> {
        let token = self.session.token()?;
        Fetch::delete(&self.client, &self.get_url(&format!("/{}", user_id)))
            .bearer_auth(&token)
            .execute_empty()
            .await?;
        info!("Deleted user {}", user_id);
        Ok(())
    }
}
