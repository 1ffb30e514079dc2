//! Session management for authentication

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Error;
use crate::models::User;

/// Session data
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// The opaque bearer token
    pub token: String,

    /// The user the token belongs to, once resolved
    pub user: Option<User>,
}

impl Session {
    /// Create a new session
    pub fn new(token: String, user: Option<User>) -> Self {
        Self { token, user }
    }
}

/// Shared handle to the current session.
///
/// Cloning yields another handle to the same session; every client created
/// from one [`crate::CrmClient`] sees the same login state.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    // poisoning is recovered; writes always land
    fn read(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get the current session
    pub fn get(&self) -> Option<Session> {
        self.read().clone()
    }

    /// Set the session
    pub fn set(&self, session: Session) {
        *self.write() = Some(session);
    }

    /// Replace the resolved user of the current session
    pub fn set_user(&self, user: User) {
        if let Some(session) = self.write().as_mut() {
            session.user = Some(user);
        }
    }

    pub fn clear(&self) {
        *self.write() = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }

    /// The bearer token, or an auth error when nobody is logged in
    pub fn token(&self) -> Result<String, Error> {
        self.get()
            .map(|session| session.token)
            .ok_or_else(|| Error::auth("Not logged in"))
    }

    /// The resolved user, or an auth error
    pub fn user(&self) -> Result<User, Error> {
        self.get()
            .and_then(|session| session.user)
            .ok_or_else(|| Error::auth("Current user not resolved"))
    }
}
