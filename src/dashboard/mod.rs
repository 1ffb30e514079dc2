//! Statistics, leads and companies

mod types;

use reqwest::Client;

use crate::auth::SessionContext;
use crate::error::Error;
use crate::fetch::Fetch;
use crate::models::{Company, Id, Lead, Stats};

pub use types::*;

/// Client for the `/dashboard` endpoints
#[derive(Clone)]
pub struct DashboardClient {
    /// The API base URL
    url: String,

    /// HTTP client used for requests
    client: Client,

    session: SessionContext,
}

impl DashboardClient {
    pub(crate) fn new(url: &str, client: Client, session: SessionContext) -> Self {
        Self {
            url: url.to_string(),
            client,
            session,
        }
    }

    fn get_url(&self, path: &str) -> String {
        format!("{}/dashboard{}", self.url, path)
    }

    /// Aggregate statistics visible to the current user
    pub async fn stats(&self) -> Result<Stats, Error> {
        let token = self.session.token()?;
        let result = Fetch::get(&self.client, &self.get_url("/stats"))
            .bearer_auth(&token)
            .execute::<StatsResponse>()
            .await?;
        Ok(result.stats)
    }

    /// One page of leads matching `query`
    pub async fn leads(&self, query: &LeadQuery) -> Result<Vec<Lead>, Error> {
        let token = self.session.token()?;
        let result = Fetch::get(&self.client, &self.get_url("/leads"))
            .bearer_auth(&token)
            .query("pagina", query.page)
            .query_opt("estado", query.status.map(|s| s.as_str()))
            .query_opt("origen", query.origin.map(|o| o.as_str()))
            .query_opt("empresa_id", query.company_id.as_ref())
            .execute::<LeadsResponse>()
            .await?;
        Ok(result.leads)
    }

    /// Free-text search over leads
    pub async fn search(&self, term: &str) -> Result<Vec<Lead>, Error> {
        let token = self.session.token()?;
        let result = Fetch::get(&self.client, &self.get_url("/search"))
            .bearer_auth(&token)
            .query("q", term)
            .execute::<LeadsResponse>()
            .await?;
        Ok(result.leads)
    }

    /// Change a lead's status, optionally recording the reply sent
    pub async fn update_lead_status(&self, lead_id: &Id, update: &StatusUpdate) -> Result<(), Error> {
        let token = self.session.token()?;
        let url = self.get_url(&format!("/leads/{}/estado", lead_id));
        Fetch::put(&self.client, &url)
            .bearer_auth(&token)
            .json(update)?
            .execute_empty()
            .await
    }

    /// All companies; only answered for cross-company roles
    pub async fn companies(&self) -> Result<Vec<Company>, Error> {
        let token = self.session.token()?;
        let result = Fetch::get(&self.client, &self.get_url("/empresas"))
            .bearer_auth(&token)
            .execute::<CompaniesResponse>()
            .await?;
        Ok(result.companies)
    }
}
