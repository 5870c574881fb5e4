//! Signed-in identity shared by every remote operation.

use crate::error::{CloudError, CloudResult};
use std::fmt;
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct SessionState {
    owner_id: Option<String>,
    access_token: Option<String>,
}

/// Owner identity and bearer token, shared across clones.
///
/// Remote operations resolve the owner from here; with no owner they fail
/// with [`CloudError::NotAuthenticated`] before any network I/O.
#[derive(Clone, Default)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(owner_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        let session = Self::new();
        session.sign_in(owner_id, access_token);
        session
    }

    pub fn sign_in(&self, owner_id: impl Into<String>, access_token: impl Into<String>) {
        let mut state = self.state.write().unwrap_or_else(|p| p.into_inner());
        state.owner_id = Some(owner_id.into());
        state.access_token = Some(access_token.into());
    }

    pub fn sign_out(&self) {
        let mut state = self.state.write().unwrap_or_else(|p| p.into_inner());
        state.owner_id = None;
        state.access_token = None;
    }

    pub fn owner_id(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .owner_id
            .clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .access_token
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.owner_id().is_some()
    }

    /// The current owner id, or `NotAuthenticated`.
    pub fn require_owner(&self) -> CloudResult<String> {
        self.owner_id()
            .filter(|id| !id.is_empty())
            .ok_or(CloudError::NotAuthenticated)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("owner_id", &self.owner_id())
            .field("access_token", &self.access_token().map(|_| "<redacted>"))
            .finish()
    }
}
