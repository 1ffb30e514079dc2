//! Query and payload types for the `/dashboard` endpoints

use serde::{Deserialize, Serialize};

use crate::models::{Company, Id, Lead, LeadOrigin, LeadStatus, Stats};

/// Filters for `GET /dashboard/leads`
#[derive(Debug, Clone, PartialEq)]
pub struct LeadQuery {
    /// 1-based page
    pub page: u32,
    pub status: Option<LeadStatus>,
    pub origin: Option<LeadOrigin>,
    /// Only honoured by the API for cross-company roles
    pub company_id: Option<Id>,
}

impl Default for LeadQuery {
    fn default() -> Self {
        Self {
            page: 1,
            status: None,
            origin: None,
            company_id: None,
        }
    }
}

impl LeadQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_status(mut self, status: Option<LeadStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn with_origin(mut self, origin: Option<LeadOrigin>) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_company(mut self, company_id: Option<Id>) -> Self {
        self.company_id = company_id;
        self
    }
}

/// Body of `PUT /dashboard/leads/{id}/estado`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    #[serde(rename = "estado")]
    pub status: LeadStatus,

    /// Omitted when no reply was written
    #[serde(rename = "respuesta_mensaje", skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}

impl StatusUpdate {
    /// Mark answered; a blank reply is dropped from the payload
    pub fn answered(reply: Option<&str>) -> Self {
        Self {
            status: LeadStatus::Answered,
            reply: reply
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatsResponse {
    pub stats: Stats,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeadsResponse {
    #[serde(default)]
    pub leads: Vec<Lead>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompaniesResponse {
    #[serde(rename = "empresas", alias = "companies", default)]
    pub companies: Vec<Company>,
}
