//! Session lookup contract.
//!
//! Credential issuance and validation live outside this crate. The guard
//! only needs to turn whatever the transport carries into a [`Principal`],
//! or learn that there is none.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use portcullis_types::Principal;

use crate::error::SessionError;

/// Maps request credentials to a principal.
pub trait SessionResolver {
    /// What the transport hands over: a bearer token, a cookie value, a
    /// request header map.
    type Credentials: ?Sized;

    /// Returns the principal for `credentials`, or `Ok(None)` when there is
    /// no valid session. `Err` is reserved for infrastructure failures.
    fn get_session(
        &self,
        credentials: &Self::Credentials,
    ) -> Result<Option<Principal>, SessionError>;
}

impl<T: SessionResolver + ?Sized> SessionResolver for &T {
    type Credentials = T::Credentials;

    fn get_session(
        &self,
        credentials: &Self::Credentials,
    ) -> Result<Option<Principal>, SessionError> {
        (**self).get_session(credentials)
    }
}

impl<T: SessionResolver + ?Sized> SessionResolver for Arc<T> {
    type Credentials = T::Credentials;

    fn get_session(
        &self,
        credentials: &Self::Credentials,
    ) -> Result<Option<Principal>, SessionError> {
        (**self).get_session(credentials)
    }
}

/// In-memory token → principal table.
///
/// Useful for tests and for embedding behind a transport that has already
/// validated its tokens.
#[derive(Debug, Default)]
pub struct StaticSessions {
    sessions: RwLock<HashMap<String, Principal>>,
}

impl StaticSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session token.
    pub fn insert(
        &self,
        token: impl Into<String>,
        principal: Principal,
    ) -> Result<(), SessionError> {
        self.sessions
            .write()
            .map_err(|_| SessionError::Unavailable("session table lock poisoned".to_string()))?
            .insert(token.into(), principal);
        Ok(())
    }

    /// Ends a session. Returns the principal it belonged to, if any.
    pub fn revoke(&self, token: &str) -> Result<Option<Principal>, SessionError> {
        Ok(self
            .sessions
            .write()
            .map_err(|_| SessionError::Unavailable("session table lock poisoned".to_string()))?
            .remove(token))
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_session(mut self, token: impl Into<String>, principal: Principal) -> Self {
        if let Ok(sessions) = self.sessions.get_mut() {
            sessions.insert(token.into(), principal);
        }
        self
    }
}

impl SessionResolver for StaticSessions {
    type Credentials = str;

    fn get_session(&self, token: &str) -> Result<Option<Principal>, SessionError> {
        if token.is_empty() {
            return Ok(None);
        }

        let sessions = self
            .sessions
            .read()
            .map_err(|_| SessionError::Unavailable("session table lock poisoned".to_string()))?;
        Ok(sessions.get(token).cloned())
    }
}
