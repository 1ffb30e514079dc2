//! Records exchanged with the CRM API
//!
//! Field names on the wire are the API's (Spanish) ones; the Rust side uses
//! English names through `serde(rename)`.

use chrono::{DateTime, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::access::Role;
use crate::error::Error;

/// Record identifier. The API sends numbers, but string keys are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Num(i64),
    Text(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Num(n) => write!(f, "{}", n),
            Id::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Id::Num(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        match value.parse::<i64>() {
            Ok(n) => Id::Num(n),
            Err(_) => Id::Text(value.to_string()),
        }
    }
}

impl FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Id::from(s))
    }
}

/// A user account as returned by `/auth/me` and `/usuarios`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,

    #[serde(rename = "nombre")]
    pub name: String,

    pub email: String,

    pub role: Role,

    #[serde(rename = "empresa_id", default)]
    pub company_id: Option<Id>,

    #[serde(rename = "activo", default = "default_true", deserialize_with = "lenient_bool")]
    pub active: bool,

    /// Display name of the company, when the API joins it in
    #[serde(rename = "empresa_nombre", default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

/// A tenant company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: Id,

    #[serde(rename = "nombre")]
    pub name: String,
}

/// Lead status. The only transition the client offers is pending to answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStatus {
    #[serde(rename = "recibido")]
    Pending,
    #[serde(rename = "contestado")]
    Answered,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Pending => "recibido",
            LeadStatus::Answered => "contestado",
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, LeadStatus::Answered)
    }

    /// Badge text
    pub fn label(&self) -> &'static str {
        match self {
            LeadStatus::Pending => "Pending",
            LeadStatus::Answered => "Answered",
        }
    }
}

impl FromStr for LeadStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recibido" | "pending" => Ok(LeadStatus::Pending),
            "contestado" | "answered" => Ok(LeadStatus::Answered),
            other => Err(Error::validation(format!("Unknown lead status: {}", other))),
        }
    }
}

/// Origin tags offered as list filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadOrigin {
    WebForm,
    LeadsForm,
    Manual,
}

impl LeadOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadOrigin::WebForm => "formulario_web",
            LeadOrigin::LeadsForm => "formulario_leads",
            LeadOrigin::Manual => "manual",
        }
    }
}

impl FromStr for LeadOrigin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "formulario_web" | "web" => Ok(LeadOrigin::WebForm),
            "formulario_leads" | "leads" => Ok(LeadOrigin::LeadsForm),
            "manual" => Ok(LeadOrigin::Manual),
            other => Err(Error::validation(format!("Unknown lead origin: {}", other))),
        }
    }
}

/// A customer inquiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Id,

    #[serde(rename = "nombre", default)]
    pub name: String,

    #[serde(rename = "apellidos", default)]
    pub surname: String,

    #[serde(default)]
    pub email: String,

    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,

    #[serde(rename = "mensaje", default)]
    pub message: Option<String>,

    /// Free-form origin tag, usually one of [`LeadOrigin`]
    #[serde(rename = "origen", default)]
    pub origin: String,

    #[serde(rename = "estado")]
    pub status: LeadStatus,

    #[serde(rename = "empresa_id", default)]
    pub company_id: Option<Id>,

    #[serde(default)]
    pub created_at: String,

    /// Reply recorded when the lead was answered
    #[serde(rename = "respuesta_mensaje", default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}

impl Lead {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname).trim().to_string()
    }

    /// `created_at` as `dd/mm/yyyy`, or verbatim when it cannot be parsed
    pub fn created_date(&self) -> String {
        format_date(&self.created_at)
    }
}

/// Formats an API timestamp as a day/month/year date
pub fn format_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%d/%m/%Y").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format("%d/%m/%Y").to_string();
    }
    raw.to_string()
}

/// One entry of the per-status breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    #[serde(rename = "estado")]
    pub status: String,

    #[serde(rename = "cantidad", deserialize_with = "lenient_count")]
    pub count: u64,
}

/// Aggregate statistics, computed by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(rename = "totalLeads", alias = "total", default, deserialize_with = "lenient_opt")]
    pub total: Option<u64>,

    #[serde(rename = "pendientes", default, deserialize_with = "lenient_opt")]
    pub pending: Option<u64>,

    #[serde(rename = "contestados", default, deserialize_with = "lenient_opt")]
    pub answered: Option<u64>,

    #[serde(rename = "porcentajeContestados", default, deserialize_with = "lenient_opt")]
    pub answered_percentage: Option<f64>,

    #[serde(rename = "porEstado", default)]
    pub by_status: Vec<StatusCount>,
}

impl Stats {
    fn breakdown(&self, status: LeadStatus) -> u64 {
        self.by_status
            .iter()
            .filter(|entry| entry.status == status.as_str())
            .map(|entry| entry.count)
            .sum()
    }

    pub fn total_leads(&self) -> u64 {
        self.total
            .unwrap_or_else(|| self.by_status.iter().map(|entry| entry.count).sum())
    }

    pub fn pending_leads(&self) -> u64 {
        self.pending
            .unwrap_or_else(|| self.breakdown(LeadStatus::Pending))
    }

    pub fn answered_leads(&self) -> u64 {
        self.answered
            .unwrap_or_else(|| self.breakdown(LeadStatus::Answered))
    }

    /// Share of answered leads in percent; 0 when there are no leads
    pub fn answered_percent(&self) -> f64 {
        if let Some(pct) = self.answered_percentage {
            return pct;
        }
        let total = self.total_leads();
        if total == 0 {
            0.0
        } else {
            self.answered_leads() as f64 * 100.0 / total as f64
        }
    }
}

fn default_true() -> bool {
    true
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_i64().map(|n| n != 0).unwrap_or(false)),
        Value::String(s) => Ok(matches!(s.as_str(), "1" | "true")),
        Value::Null => Ok(true),
        other => Err(de::Error::custom(format!("expected a boolean, got {}", other))),
    }
}

// MySQL aggregates often come back as strings.
fn lenient_opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .to_string()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("number out of range: {}", n))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("not a number: {}", s))),
        Some(other) => Err(de::Error::custom(format!("expected a number, got {}", other))),
    }
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    lenient_opt(deserializer).map(|count| count.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lead_from_api() {
        let lead: Lead = serde_json::from_value(json!({
            "id": 7,
            "nombre": "Ana",
            "apellidos": "García",
            "email": "ana@example.com",
            "telefono": "600000000",
            "mensaje": null,
            "origen": "formulario_web",
            "estado": "recibido",
            "empresa_id": 1,
            "created_at": "2024-03-05T10:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(lead.id, Id::Num(7));
        assert_eq!(lead.full_name(), "Ana García");
        assert_eq!(lead.status, LeadStatus::Pending);
        assert_eq!(lead.message, None);
        assert_eq!(lead.created_date(), "05/03/2024");
    }

    #[test]
    fn test_user_active_flag_as_number() {
        let user: User = serde_json::from_value(json!({
            "id": "u-1",
            "nombre": "Carla",
            "email": "carla@empresa-a.com",
            "role": "ceo",
            "empresa_id": 2,
            "activo": 0
        }))
        .unwrap();

        assert_eq!(user.id, Id::Text("u-1".to_string()));
        assert_eq!(user.role, Role::Ceo);
        assert!(!user.active);
    }

    #[test]
    fn test_stats_derived_from_breakdown() {
        let stats: Stats = serde_json::from_value(json!({
            "totalLeads": "4",
            "porEstado": [
                {"estado": "recibido", "cantidad": "3"},
                {"estado": "contestado", "cantidad": 1}
            ]
        }))
        .unwrap();

        assert_eq!(stats.total_leads(), 4);
        assert_eq!(stats.pending_leads(), 3);
        assert_eq!(stats.answered_leads(), 1);
        assert!((stats.answered_percent() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_stats_percentage_is_zero() {
        assert_eq!(Stats::default().answered_percent(), 0.0);
    }

    #[test]
    fn test_format_date_fallbacks() {
        assert_eq!(format_date("2024-01-31 08:15:00"), "31/01/2024");
        assert_eq!(format_date("yesterday"), "yesterday");
    }
}
