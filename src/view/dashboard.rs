//! Role-scoped dashboard
//!
//! [`DashboardState`] is plain data plus the synchronous transitions;
//! [`Dashboard`] drives it from async fetches. The state lock is never held
//! across an `.await`, so several operations may be in flight at once and
//! their responses are matched against the request guards on arrival.

use log::{info, warn};
use std::sync::{Mutex, MutexGuard};

use crate::access::{capabilities, Capabilities, CompanyScope, Tab};
use crate::dashboard::{LeadQuery, StatusUpdate};
use crate::error::Error;
use crate::models::{Company, Id, Lead, LeadOrigin, LeadStatus, Stats, User};
use crate::view::debounce::Debouncer;
use crate::view::guard::{RequestGuard, Ticket};
use crate::view::leads::{LeadDetail, LeadList, LeadRow};
use crate::view::user_form::{DeleteConfirmation, UserForm, UserModal};
use crate::CrmClient;

/// What a lead fetch asked for
#[derive(Debug, Clone, PartialEq)]
pub enum LeadsRequest {
    List(LeadQuery),
    Search(String),
}

/// Everything the dashboard renders
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub user: Option<User>,
    pub capabilities: Option<Capabilities>,
    pub active_tab: Tab,
    pub stats: Option<Stats>,
    pub companies: Vec<Company>,
    pub users: Vec<User>,
    pub leads: LeadList,
    pub query: LeadQuery,
    pub search_term: String,
    /// Inline error banner of the list views
    pub banner: Option<String>,
    pub user_modal: UserModal,
    pub pending_delete: Option<DeleteConfirmation>,
    /// Error dialog of the user administration
    pub admin_message: Option<String>,
    session_guard: RequestGuard,
    leads_guard: RequestGuard,
    users_guard: RequestGuard,
    leads_source: Option<LeadsRequest>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            user: None,
            capabilities: None,
            active_tab: Tab::Leads,
            stats: None,
            companies: Vec::new(),
            users: Vec::new(),
            leads: LeadList::new(),
            query: LeadQuery::default(),
            search_term: String::new(),
            banner: None,
            user_modal: UserModal::Closed,
            pending_delete: None,
            admin_message: None,
            session_guard: RequestGuard::new(),
            leads_guard: RequestGuard::new(),
            users_guard: RequestGuard::new(),
            leads_source: None,
        }
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear everything shown. The request guards carry over so responses
    /// still in flight from before the reset stay stale.
    pub fn reset(&mut self) {
        let session_guard = self.session_guard.clone();
        let mut leads_guard = self.leads_guard.clone();
        let mut users_guard = self.users_guard.clone();
        leads_guard.invalidate();
        users_guard.invalidate();
        *self = Self {
            session_guard,
            leads_guard,
            users_guard,
            ..Self::default()
        };
    }

    /// Reset and make any mount still in flight stale
    pub fn end_session(&mut self) {
        self.reset();
        self.session_guard.invalidate();
    }

    /// Start resolving a session; any earlier mount and every list fetch
    /// in flight become stale
    pub fn begin_session(&mut self) -> Ticket {
        self.leads_guard.invalidate();
        self.users_guard.invalidate();
        self.session_guard.issue()
    }

    pub fn is_current_session(&self, ticket: Ticket) -> bool {
        self.session_guard.is_current(ticket)
    }

    /// Install the resolved identity; resets the view to the leads tab
    pub fn set_identity(&mut self, user: User) {
        self.capabilities = Some(capabilities(user.role));
        self.user = Some(user);
        self.active_tab = Tab::Leads;
    }

    /// Tab bar contents; empty until identity is resolved
    pub fn tabs(&self) -> Vec<Tab> {
        self.capabilities
            .as_ref()
            .map(|caps| caps.tabs.clone())
            .unwrap_or_default()
    }

    fn caps(&self) -> Result<&Capabilities, Error> {
        self.capabilities
            .as_ref()
            .ok_or_else(|| Error::auth("Current user not resolved"))
    }

    fn actor(&self) -> Result<&User, Error> {
        self.user
            .as_ref()
            .ok_or_else(|| Error::auth("Current user not resolved"))
    }

    /// Switch tabs. Hidden tabs are refused and the current tab is kept.
    pub fn select_tab(&mut self, tab: Tab) -> Result<(), Error> {
        self.caps()?.require_tab(tab)?;
        self.active_tab = tab;
        self.banner = None;
        self.leads_guard.invalidate();
        self.users_guard.invalidate();
        Ok(())
    }

    /// Search term when non-blank, otherwise the filtered list
    pub fn current_leads_request(&self) -> LeadsRequest {
        let term = self.search_term.trim();
        if term.is_empty() {
            LeadsRequest::List(self.query.clone())
        } else {
            LeadsRequest::Search(term.to_string())
        }
    }

    pub fn begin_leads(&mut self) -> (Ticket, LeadsRequest) {
        (self.leads_guard.issue(), self.current_leads_request())
    }

    /// Apply a lead response.
    ///
    /// `Ok(false)` when a newer request made it stale; errors of stale
    /// responses are dropped too.
    pub fn apply_leads(
        &mut self,
        ticket: Ticket,
        request: LeadsRequest,
        result: Result<Vec<Lead>, Error>,
    ) -> Result<bool, Error> {
        if !self.leads_guard.is_current(ticket) {
            warn!("Dropping stale lead response for {:?}", request);
            return Ok(false);
        }
        match result {
            Ok(leads) => {
                let same_query = self.leads_source.as_ref() == Some(&request);
                self.leads.replace(leads, same_query);
                self.leads_source = Some(request);
                self.banner = None;
                Ok(true)
            }
            Err(e) => {
                self.banner = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub fn begin_users(&mut self) -> Ticket {
        self.users_guard.issue()
    }

    /// Apply a user list response; `Ok(false)` when stale
    pub fn apply_users(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<User>, Error>,
    ) -> Result<bool, Error> {
        if !self.users_guard.is_current(ticket) {
            warn!("Dropping stale user list response");
            return Ok(false);
        }
        match result {
            Ok(users) => {
                self.users = users;
                self.banner = None;
                Ok(true)
            }
            Err(e) => {
                self.banner = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub fn lead_rows(&self, preview_len: usize) -> Vec<LeadRow> {
        self.leads.rows(preview_len)
    }

    /// Users the actor may edit or delete
    pub fn can_manage(&self, user: &User) -> bool {
        self.capabilities
            .as_ref()
            .map_or(false, |caps| caps.can_manage(user.role))
    }

    fn find_user(&self, id: &Id) -> Result<&User, Error> {
        self.users
            .iter()
            .find(|user| &user.id == id)
            .ok_or_else(|| Error::validation(format!("User {} is not in the list", id)))
    }

    fn require_user_admin(&self) -> Result<(), Error> {
        let caps = self.caps()?;
        caps.require_tab(Tab::Users)?;
        if !caps.can_manage_users() {
            return Err(Error::permission(format!("Role {} cannot manage users", caps.role)));
        }
        Ok(())
    }

    pub fn open_create_user(&mut self) -> Result<(), Error> {
        self.require_user_admin()?;
        let actor = self.actor()?.clone();
        self.pending_delete = None;
        self.user_modal.open_create(&actor)
    }

    pub fn open_edit_user(&mut self, id: &Id) -> Result<(), Error> {
        self.require_user_admin()?;
        let actor = self.actor()?.clone();
        let target = self.find_user(id)?.clone();
        self.pending_delete = None;
        self.user_modal.open_edit(&actor, &target)
    }

    /// First step of a delete; nothing is sent until confirmed
    pub fn request_delete_user(&mut self, id: &Id) -> Result<(), Error> {
        self.require_user_admin()?;
        let target = self.find_user(id)?.clone();
        if !self.can_manage(&target) {
            return Err(Error::permission(format!(
                "Role {} cannot delete a {} account",
                self.caps()?.role,
                target.role
            )));
        }
        self.pending_delete = Some(DeleteConfirmation {
            user_id: target.id,
            name: target.name,
        });
        self.user_modal.close();
        Ok(())
    }
}

/// Dashboard controller bound to one [`CrmClient`]
pub struct Dashboard {
    client: CrmClient,
    state: Mutex<DashboardState>,
    debouncer: Debouncer,
}

impl Dashboard {
    pub fn new(client: CrmClient) -> Self {
        let debouncer = Debouncer::new(client.options.search_debounce);
        Self {
            client,
            state: Mutex::new(DashboardState::new()),
            debouncer,
        }
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the current state for rendering
    pub fn state(&self) -> DashboardState {
        self.lock().clone()
    }

    /// Read the state without copying it
    pub fn view<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&self.lock())
    }

    pub fn client(&self) -> &CrmClient {
        &self.client
    }

    pub fn lead_rows(&self) -> Vec<LeadRow> {
        self.lock().lead_rows(self.client.options.message_preview_len)
    }

    /// Resolve identity, load statistics and, for cross-company roles, the
    /// company list; then load the default tab.
    ///
    /// A mount overtaken by a newer mount or a logout stops applying results
    /// and returns `Ok(())`.
    pub async fn mount(&self) -> Result<(), Error> {
        let session = self.lock().begin_session();

        let user = self.client.auth().me().await;
        let user = {
            let mut state = self.lock();
            if !state.is_current_session(session) {
                warn!("Dropping identity of a superseded mount");
                return Ok(());
            }
            match user {
                Ok(user) => {
                    state.reset();
                    state.set_identity(user.clone());
                    user
                }
                Err(e) => {
                    state.banner = Some(e.user_message());
                    return Err(e);
                }
            }
        };
        info!("Dashboard mounted for {} ({})", user.email, user.role);

        let stats = self.client.dashboard().stats().await;
        {
            let mut state = self.lock();
            if !state.is_current_session(session) {
                return Ok(());
            }
            match stats {
                Ok(stats) => state.stats = Some(stats),
                Err(e) => state.banner = Some(e.user_message()),
            }
        }

        if capabilities(user.role).company_scope == CompanyScope::All {
            let companies = self.client.dashboard().companies().await;
            let mut state = self.lock();
            if !state.is_current_session(session) {
                return Ok(());
            }
            match companies {
                Ok(companies) => state.companies = companies,
                Err(e) => state.banner = Some(e.user_message()),
            }
        }

        let (ticket, request) = {
            let mut state = self.lock();
            if !state.is_current_session(session) || state.active_tab != Tab::Leads {
                return Ok(());
            }
            state.begin_leads()
        };
        self.fetch_leads(ticket, request).await.map(|_| ())
    }

    /// Refetch whatever the active tab lists
    pub async fn reload_active_tab(&self) -> Result<(), Error> {
        let tab = self.lock().active_tab;
        match tab {
            Tab::Leads => self.refresh_leads().await.map(|_| ()),
            Tab::Users => self.refresh_users().await.map(|_| ()),
            Tab::Companies => Ok(()),
        }
    }

    pub async fn select_tab(&self, tab: Tab) -> Result<(), Error> {
        self.lock().select_tab(tab)?;
        self.reload_active_tab().await
    }

    /// Fetch the leads for the current search term or filters.
    ///
    /// Returns whether the response was applied.
    pub async fn refresh_leads(&self) -> Result<bool, Error> {
        let (ticket, request) = self.lock().begin_leads();
        self.fetch_leads(ticket, request).await
    }

    async fn fetch_leads(&self, ticket: Ticket, request: LeadsRequest) -> Result<bool, Error> {
        let dashboard = self.client.dashboard();
        let result = match &request {
            LeadsRequest::List(query) => dashboard.leads(query).await,
            LeadsRequest::Search(term) => dashboard.search(term).await,
        };
        self.lock().apply_leads(ticket, request, result)
    }

    /// Returns whether the response was applied
    pub async fn refresh_users(&self) -> Result<bool, Error> {
        let ticket = self.lock().begin_users();
        let result = self.client.users().list().await;
        self.lock().apply_users(ticket, result)
    }

    /// Live search. The term is recorded at once; the request only goes out
    /// if no newer term arrives within the debounce window.
    ///
    /// Returns whether a response was applied.
    pub async fn search(&self, term: &str) -> Result<bool, Error> {
        {
            let mut state = self.lock();
            state.search_term = term.to_string();
            state.query.page = 1;
        }
        if !self.debouncer.settle().await {
            return Ok(false);
        }
        self.refresh_leads().await
    }

    pub async fn set_status_filter(&self, status: Option<LeadStatus>) -> Result<bool, Error> {
        {
            let mut state = self.lock();
            state.query.status = status;
            state.query.page = 1;
        }
        self.refresh_leads().await
    }

    pub async fn set_origin_filter(&self, origin: Option<LeadOrigin>) -> Result<bool, Error> {
        {
            let mut state = self.lock();
            state.query.origin = origin;
            state.query.page = 1;
        }
        self.refresh_leads().await
    }

    /// Superadmin only; other roles see their own company or none
    pub async fn set_company_filter(&self, company_id: Option<Id>) -> Result<bool, Error> {
        {
            let mut state = self.lock();
            let allowed = state
                .capabilities
                .as_ref()
                .map_or(false, |caps| caps.can_filter_by_company());
            if !allowed {
                return Err(Error::permission("Filtering by company is not available"));
            }
            state.query.company_id = company_id;
            state.query.page = 1;
        }
        self.refresh_leads().await
    }

    pub async fn set_page(&self, page: u32) -> Result<bool, Error> {
        self.lock().query.page = page.max(1);
        self.refresh_leads().await
    }

    pub fn select_lead(&self, id: &Id) -> Result<(), Error> {
        self.lock().leads.select(id)
    }

    pub fn close_lead_detail(&self) {
        self.lock().leads.close_detail();
    }

    pub fn lead_detail(&self) -> Option<LeadDetail> {
        self.lock().leads.detail()
    }

    pub fn open_reply(&self, id: &Id) -> Result<(), Error> {
        self.lock().leads.open_reply(id)
    }

    pub fn set_reply_text(&self, text: &str) -> Result<(), Error> {
        self.lock().leads.set_reply_text(text)
    }

    pub fn cancel_reply(&self) {
        self.lock().leads.cancel_reply();
    }

    /// Send the open reply draft and mark its lead answered, then refetch
    pub async fn submit_reply(&self) -> Result<(), Error> {
        let draft = self
            .lock()
            .leads
            .take_draft()
            .ok_or_else(|| Error::validation("No reply is being written"))?;

        let update = StatusUpdate::answered(Some(&draft.text));
        let result = self
            .client
            .dashboard()
            .update_lead_status(&draft.lead_id, &update)
            .await;

        match result {
            Ok(()) => {
                info!("Lead {} marked answered", draft.lead_id);
                self.lock().leads.mark_answered(&draft.lead_id);
                self.refresh_leads().await.map(|_| ())
            }
            Err(e) => {
                let mut state = self.lock();
                state.banner = Some(e.user_message());
                state.leads.restore_draft(draft);
                Err(e)
            }
        }
    }

    /// Shorthand for open reply, write text, submit
    pub async fn mark_answered(&self, id: &Id, reply: Option<&str>) -> Result<(), Error> {
        {
            let mut state = self.lock();
            state.leads.open_reply(id)?;
            state.leads.set_reply_text(reply.unwrap_or_default())?;
        }
        self.submit_reply().await
    }

    pub fn open_create_user(&self) -> Result<(), Error> {
        self.lock().open_create_user()
    }

    pub fn open_edit_user(&self, id: &Id) -> Result<(), Error> {
        self.lock().open_edit_user(id)
    }

    pub fn cancel_user_form(&self) {
        self.lock().user_modal.close();
    }

    /// Edit the open form; `None` when no form is open
    pub fn with_user_form<R>(&self, f: impl FnOnce(&mut UserForm) -> R) -> Option<R> {
        self.lock().user_modal.form_mut().map(f)
    }

    /// Validate and send the open form. On success the modal closes and the
    /// user list is refetched; on failure the modal stays open with the message.
    pub async fn submit_user_form(&self) -> Result<(), Error> {
        let (editing, payload) = {
            let mut state = self.lock();
            let built = match &state.user_modal {
                UserModal::Closed => return Err(Error::validation("No user form is open")),
                UserModal::Creating(form) => form.to_payload(true).map(|p| (None, p)),
                UserModal::Editing { user_id, form } => {
                    form.to_payload(false).map(|p| (Some(user_id.clone()), p))
                }
            };
            match built {
                Ok(built) => built,
                Err(e) => {
                    state.user_modal.set_message(e.user_message());
                    return Err(e);
                }
            }
        };

        let users = self.client.users();
        let result = match &editing {
            Some(id) => users.update(id, &payload).await,
            None => users.create(&payload).await,
        };

        // another form may have been opened while the request was out
        match result {
            Ok(()) => {
                {
                    let mut state = self.lock();
                    if state.user_modal.is_for(editing.as_ref()) {
                        state.user_modal.close();
                    }
                }
                self.refresh_users().await.map(|_| ())
            }
            Err(e) => {
                let mut state = self.lock();
                if state.user_modal.is_for(editing.as_ref()) {
                    state.user_modal.set_message(e.user_message());
                }
                Err(e)
            }
        }
    }

    pub fn request_delete_user(&self, id: &Id) -> Result<(), Error> {
        self.lock().request_delete_user(id)
    }

    pub fn cancel_delete(&self) {
        self.lock().pending_delete = None;
    }

    /// Second step of a delete
    pub async fn confirm_delete(&self) -> Result<(), Error> {
        let pending = {
            let mut state = self.lock();
            state.admin_message = None;
            state
                .pending_delete
                .take()
                .ok_or_else(|| Error::validation("No deletion to confirm"))?
        };

        match self.client.users().delete(&pending.user_id).await {
            Ok(()) => self.refresh_users().await.map(|_| ()),
            Err(e) => {
                self.lock().admin_message = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// End the session and reset the view
    pub fn logout(&self) -> Result<(), Error> {
        self.lock().end_session();
        self.client.auth().logout()
    }
}
