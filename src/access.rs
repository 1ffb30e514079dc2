//! Role-scoped view gating
//!
//! The API enforces every permission again on its side. Everything here only
//! decides what the client shows and which requests it bothers to make.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Ceo,
    Directivo,
    Comercial,
}

impl Role {
    /// Every role, most privileged first
    pub const ALL: [Role; 4] = [Role::Superadmin, Role::Ceo, Role::Directivo, Role::Comercial];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Ceo => "ceo",
            Role::Directivo => "directivo",
            Role::Comercial => "comercial",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "superadmin" => Ok(Role::Superadmin),
            "ceo" => Ok(Role::Ceo),
            "directivo" => Ok(Role::Directivo),
            "comercial" => Ok(Role::Comercial),
            other => Err(Error::validation(format!("Unknown role: {}", other))),
        }
    }
}

/// Top-level dashboard region
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tab {
    Leads,
    Users,
    Companies,
}

impl Tab {
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Leads => "Leads",
            Tab::Users => "Users",
            Tab::Companies => "Companies",
        }
    }
}

/// Which companies a role sees and filters by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyScope {
    /// Every company; free company filter
    All,
    /// Only the user's own company, shown as a fixed value
    OwnFixed,
    /// No company column or filter at all
    None,
}

/// What a role may see and do in the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub role: Role,
    pub tabs: Vec<Tab>,
    pub company_scope: CompanyScope,
    pub assignable_roles: BTreeSet<Role>,
}

impl Capabilities {
    pub fn can_view(&self, tab: Tab) -> bool {
        self.tabs.contains(&tab)
    }

    /// Create, edit and delete on the users tab
    pub fn can_manage_users(&self) -> bool {
        !self.assignable_roles.is_empty()
    }

    /// Whether a user holding `target` may be created, edited or deleted
    pub fn can_manage(&self, target: Role) -> bool {
        self.assignable_roles.contains(&target)
    }

    /// Company filter selectable on the leads tab
    pub fn can_filter_by_company(&self) -> bool {
        self.company_scope == CompanyScope::All
    }

    /// Company shown at all (as a filter or as a fixed value)
    pub fn sees_company(&self) -> bool {
        self.company_scope != CompanyScope::None
    }

    /// Fails with a permission error when the tab is hidden for this role
    pub fn require_tab(&self, tab: Tab) -> Result<(), Error> {
        if self.can_view(tab) {
            Ok(())
        } else {
            Err(Error::permission(format!(
                "The {} tab is not available for role {}",
                tab.label(),
                self.role
            )))
        }
    }
}

/// Roles `actor` may hand out when creating or editing a user.
///
/// Shared by the create and edit paths.
pub fn assignable_roles(actor: Role) -> BTreeSet<Role> {
    match actor {
        Role::Superadmin => Role::ALL.into_iter().collect(),
        Role::Ceo => [Role::Directivo, Role::Comercial].into_iter().collect(),
        Role::Directivo | Role::Comercial => BTreeSet::new(),
    }
}

/// Tabs shown for `role`, in tab-bar order
pub fn visible_tabs(role: Role) -> Vec<Tab> {
    match role {
        Role::Superadmin => vec![Tab::Leads, Tab::Users, Tab::Companies],
        Role::Ceo => vec![Tab::Leads, Tab::Users],
        Role::Directivo | Role::Comercial => vec![Tab::Leads],
    }
}

pub fn company_scope(role: Role) -> CompanyScope {
    match role {
        Role::Superadmin => CompanyScope::All,
        Role::Ceo => CompanyScope::OwnFixed,
        Role::Directivo | Role::Comercial => CompanyScope::None,
    }
}

pub fn capabilities(role: Role) -> Capabilities {
    Capabilities {
        role,
        tabs: visible_tabs(role),
        company_scope: company_scope(role),
        assignable_roles: assignable_roles(role),
    }
}
