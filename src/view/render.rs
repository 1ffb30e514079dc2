//! Plain-text rendering of the view-model

use std::fmt::Write;

use crate::access::{Role, Tab};
use crate::models::{Company, Stats, User};
use crate::view::leads::{LeadDetail, LeadRow};
use crate::view::user_form::{CompanyField, UserForm};

/// `[Leads] | Users`, active tab in brackets
pub fn tab_bar(tabs: &[Tab], active: Tab) -> String {
    tabs.iter()
        .map(|tab| {
            if *tab == active {
                format!("[{}]", tab.label())
            } else {
                tab.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn stats(stats: &Stats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total leads: {}", stats.total_leads());
    let _ = writeln!(out, "Pending:     {}", stats.pending_leads());
    let _ = writeln!(out, "Answered:    {}", stats.answered_leads());
    let _ = writeln!(out, "Answered %:  {:.1}", stats.answered_percent());
    for entry in &stats.by_status {
        let _ = writeln!(out, "  {:<12} {}", entry.status, entry.count);
    }
    out
}

pub fn lead_table(rows: &[LeadRow]) -> String {
    if rows.is_empty() {
        return "No leads to show\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6} {:<24} {:<28} {:<14} {:<54} {:<10} {:<16} {:<10} {}",
        "ID", "Name", "Email", "Phone", "Message", "Status", "Origin", "Date", "Action"
    );
    for row in rows {
        let action = if row.can_reply { "Reply" } else { "Answered" };
        let _ = writeln!(
            out,
            "{:<6} {:<24} {:<28} {:<14} {:<54} {:<10} {:<16} {:<10} {}",
            row.id.to_string(),
            row.name,
            row.email,
            row.phone,
            row.preview,
            row.status.label(),
            row.origin,
            row.date,
            action
        );
    }
    out
}

pub fn lead_detail(detail: &LeadDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Lead {}", detail.id);
    let _ = writeln!(out, "Name:    {}", detail.name);
    let _ = writeln!(out, "Email:   {}", detail.email);
    let _ = writeln!(out, "Phone:   {}", detail.phone);
    let _ = writeln!(out, "Date:    {}", detail.date);
    let _ = writeln!(out, "Status:  {}", detail.status.label());
    let _ = writeln!(out, "Origin:  {}", detail.origin);
    let _ = writeln!(out, "Message:\n{}", detail.message);
    if let Some(reply) = &detail.reply {
        let _ = writeln!(out, "Reply:\n{}", reply);
    }
    out
}

pub fn user_table(users: &[User], manageable: impl Fn(&User) -> bool) -> String {
    if users.is_empty() {
        return "No users to show\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6} {:<24} {:<30} {:<11} {:<16} {:<7} {}",
        "ID", "Name", "Email", "Role", "Company", "Active", "Manage"
    );
    for user in users {
        let company = user
            .company_name
            .clone()
            .or_else(|| user.company_id.as_ref().map(ToString::to_string))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<6} {:<24} {:<30} {:<11} {:<16} {:<7} {}",
            user.id.to_string(),
            user.name,
            user.email,
            user.role.as_str(),
            company,
            if user.active { "yes" } else { "no" },
            if manageable(user) { "edit/delete" } else { "-" }
        );
    }
    out
}

pub fn company_table(companies: &[Company]) -> String {
    if companies.is_empty() {
        return "No companies to show\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "{:<6} {}", "ID", "Name");
    for company in companies {
        let _ = writeln!(out, "{:<6} {}", company.id.to_string(), company.name);
    }
    out
}

/// The create/edit form with its role options and company field
pub fn user_form(form: &UserForm, companies: &[Company]) -> String {
    let mut out = String::new();
    let roles = form
        .role_options
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "Name:     {}", form.name);
    let _ = writeln!(out, "Email:    {}", form.email);
    let _ = writeln!(out, "Role:     {} (options: {})", form.role, roles);

    let company_name = |id: Option<&crate::models::Id>| match id {
        Some(id) => companies
            .iter()
            .find(|c| &c.id == id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string()),
        None => "-".to_string(),
    };
    match &form.company {
        CompanyField::Selectable(id) => {
            let _ = writeln!(out, "Company:  {} (selectable)", company_name(id.as_ref()));
        }
        CompanyField::Fixed(id) => {
            let _ = writeln!(out, "Company:  {} (fixed)", company_name(id.as_ref()));
        }
    }
    let _ = writeln!(out, "Active:   {}", if form.active { "yes" } else { "no" });
    if let Some(message) = &form.message {
        let _ = writeln!(out, "! {}", message);
    }
    out
}
