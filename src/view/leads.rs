//! Lead table, detail view and reply draft

use std::collections::HashSet;

use crate::error::Error;
use crate::models::{Id, Lead, LeadStatus};

/// Preview shown for a lead without message
pub const EMPTY_PREVIEW: &str = "-";

/// Detail text for a lead without message
pub const EMPTY_MESSAGE: &str = "No message";

pub const ELLIPSIS: &str = "...";

/// Cut `message` to at most `max` characters for the table.
///
/// Absent or empty messages give [`EMPTY_PREVIEW`]; longer ones get
/// [`ELLIPSIS`] appended after the first `max` characters.
pub fn truncate_message(message: Option<&str>, max: usize) -> String {
    let message = match message {
        Some(m) if !m.is_empty() => m,
        _ => return EMPTY_PREVIEW.to_string(),
    };

    match message.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{}", &message[..cut], ELLIPSIS),
        None => message.to_string(),
    }
}

/// One line of the lead table
#[derive(Debug, Clone, PartialEq)]
pub struct LeadRow {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub preview: String,
    pub status: LeadStatus,
    pub origin: String,
    pub date: String,
    pub can_reply: bool,
}

/// Everything the detail view shows
#[derive(Debug, Clone, PartialEq)]
pub struct LeadDetail {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub message: String,
    pub status: LeadStatus,
    pub origin: String,
    pub reply: Option<String>,
    pub can_reply: bool,
}

/// Reply being written for one lead
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyDraft {
    pub lead_id: Id,
    pub text: String,
}

/// The loaded lead list plus the per-list interaction state
#[derive(Debug, Clone, Default)]
pub struct LeadList {
    leads: Vec<Lead>,
    /// Leads answered while this list was shown; they never become repliable again
    answered: HashSet<Id>,
    selected: Option<Id>,
    draft: Option<ReplyDraft>,
}

impl LeadList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    pub fn get(&self, id: &Id) -> Option<&Lead> {
        self.leads.iter().find(|lead| &lead.id == id)
    }

    /// Swap in a freshly fetched list.
    ///
    /// `same_query` keeps the answered set: a refetch of the same list must not
    /// bring back the reply action for a lead answered in the meantime.
    pub fn replace(&mut self, leads: Vec<Lead>, same_query: bool) {
        if !same_query {
            self.answered.clear();
        }
        self.answered.extend(
            leads
                .iter()
                .filter(|lead| lead.status.is_answered())
                .map(|lead| lead.id.clone()),
        );
        self.leads = leads;

        let selection_gone = self
            .selected
            .as_ref()
            .map_or(false, |id| self.get(id).is_none());
        if selection_gone {
            self.selected = None;
        }
        let draft_stale = self
            .draft
            .as_ref()
            .map_or(false, |draft| !self.can_reply(&draft.lead_id));
        if draft_stale {
            self.draft = None;
        }
    }

    pub fn can_reply(&self, id: &Id) -> bool {
        match self.get(id) {
            Some(lead) => !lead.status.is_answered() && !self.answered.contains(id),
            None => false,
        }
    }

    pub fn rows(&self, preview_len: usize) -> Vec<LeadRow> {
        self.leads
            .iter()
            .map(|lead| LeadRow {
                id: lead.id.clone(),
                name: lead.full_name(),
                email: lead.email.clone(),
                phone: lead.phone.clone().unwrap_or_default(),
                preview: truncate_message(lead.message.as_deref(), preview_len),
                status: lead.status,
                origin: lead.origin.clone(),
                date: lead.created_date(),
                can_reply: self.can_reply(&lead.id),
            })
            .collect()
    }

    /// Open the detail view of a row
    pub fn select(&mut self, id: &Id) -> Result<(), Error> {
        if self.get(id).is_none() {
            return Err(Error::validation(format!("Lead {} is not in the list", id)));
        }
        self.selected = Some(id.clone());
        Ok(())
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    pub fn detail(&self) -> Option<LeadDetail> {
        let lead = self.get(self.selected.as_ref()?)?;
        Some(LeadDetail {
            id: lead.id.clone(),
            name: lead.full_name(),
            email: lead.email.clone(),
            phone: lead.phone.clone().unwrap_or_default(),
            date: lead.created_date(),
            message: lead
                .message
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| EMPTY_MESSAGE.to_string()),
            status: lead.status,
            origin: lead.origin.clone(),
            reply: lead.reply.clone(),
            can_reply: self.can_reply(&lead.id),
        })
    }

    /// Start writing a reply; only one draft is open at a time
    pub fn open_reply(&mut self, id: &Id) -> Result<(), Error> {
        if self.get(id).is_none() {
            return Err(Error::validation(format!("Lead {} is not in the list", id)));
        }
        if !self.can_reply(id) {
            return Err(Error::validation(format!("Lead {} is already answered", id)));
        }
        self.draft = Some(ReplyDraft {
            lead_id: id.clone(),
            text: String::new(),
        });
        Ok(())
    }

    pub fn set_reply_text(&mut self, text: &str) -> Result<(), Error> {
        match self.draft.as_mut() {
            Some(draft) => {
                draft.text = text.to_string();
                Ok(())
            }
            None => Err(Error::validation("No reply is being written")),
        }
    }

    pub fn cancel_reply(&mut self) {
        self.draft = None;
    }

    pub fn draft(&self) -> Option<&ReplyDraft> {
        self.draft.as_ref()
    }

    pub(crate) fn take_draft(&mut self) -> Option<ReplyDraft> {
        self.draft.take()
    }

    pub(crate) fn restore_draft(&mut self, draft: ReplyDraft) {
        if self.can_reply(&draft.lead_id) {
            self.draft = Some(draft);
        }
    }

    /// Record a confirmed answer before the refetch lands
    pub(crate) fn mark_answered(&mut self, id: &Id) {
        self.answered.insert(id.clone());
        if let Some(lead) = self.leads.iter_mut().find(|lead| &lead.id == id) {
            lead.status = LeadStatus::Answered;
        }
        if self.draft.as_ref().map(|d| &d.lead_id) == Some(id) {
            self.draft = None;
        }
    }
}
