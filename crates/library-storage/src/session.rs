//! Session identity used to namespace persisted data.

use crate::StorageKeys;

/// Exposes the active library owner's identity, if any.
///
/// `None` means nobody is signed in; callers skip persistence entirely.
pub trait SessionProvider: Send + Sync {
    /// The current session id.
    fn current_session_id(&self) -> Option<String>;

    /// Namespaced storage key for the current session, or `None` without a session.
    fn scoped_key(&self, key: &str) -> Option<String> {
        self.current_session_id()
            .map(|session| StorageKeys::namespaced(key, &session))
    }
}

/// A fixed session identity resolved once at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticSession(Option<String>);

impl StaticSession {
    /// A signed-in session.
    pub fn signed_in(session_id: impl Into<String>) -> Self {
        Self(Some(session_id.into()))
    }

    /// No session: persistence is skipped.
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl SessionProvider for StaticSession {
    fn current_session_id(&self) -> Option<String> {
        self.0
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}
