//! Session store
//!
//! The single source the pages consult for "who is signed in". It caches the
//! signed-in email under [`USER_EMAIL_KEY`] and, when the identity provider is
//! configured, the provider session under [`IDENTITY_SESSION_KEY`].

mod storage;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::broadcast;
use yic_portal_identity::Session;

use crate::error::Result;

/// Key holding the signed-in email
pub const USER_EMAIL_KEY: &str = "user_email";

/// Legacy token key; never written, always cleared with the email
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Key holding the persisted identity-provider session (JSON)
pub const IDENTITY_SESSION_KEY: &str = "identity_session";

const CHANNEL_CAPACITY: usize = 16;

/// Cloneable handle to the session store
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    changes: broadcast::Sender<Option<String>>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { storage, changes }
    }

    /// A store backed by [`MemoryStorage`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// The signed-in email, if any
    pub fn get(&self) -> Option<String> {
        self.storage
            .get(USER_EMAIL_KEY)
            .filter(|email| !email.is_empty())
    }

    /// Record `email` as the signed-in user
    pub fn set(&self, email: &str) -> Result<()> {
        self.storage.set(USER_EMAIL_KEY, email)?;
        debug!("Session store now holds {}", email);
        self.notify(Some(email.to_string()));
        Ok(())
    }

    /// Forget the signed-in user, including the legacy token key.
    ///
    /// Both keys are removed even if the first removal fails; the first
    /// error is returned afterwards.
    pub fn clear(&self) -> Result<()> {
        let email = self.storage.remove(USER_EMAIL_KEY);
        let token = self.storage.remove(ACCESS_TOKEN_KEY);
        debug!("Session store cleared");
        self.notify(None);
        email.and(token)
    }

    /// Receive every subsequent `set`/`clear`
    pub fn subscribe(&self) -> broadcast::Receiver<Option<String>> {
        self.changes.subscribe()
    }

    /// The persisted identity-provider session, if it can be read
    pub fn identity_session(&self) -> Option<Session> {
        let raw = self.storage.get(IDENTITY_SESSION_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Ignoring unreadable identity session: {}", e);
                None
            }
        }
    }

    /// Persist or remove the identity-provider session
    pub fn save_identity_session(&self, session: Option<&Session>) -> Result<()> {
        match session {
            Some(session) => {
                let raw = serde_json::to_string(session)?;
                self.storage.set(IDENTITY_SESSION_KEY, &raw)
            }
            None => self.storage.remove(IDENTITY_SESSION_KEY),
        }
    }

    /// Read a raw key; mostly useful to inspect the legacy keys
    pub fn raw(&self, key: &str) -> Option<String> {
        self.storage.get(key)
    }

    fn notify(&self, email: Option<String>) {
        // no receivers is fine
        let _ = self.changes.send(email);
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("email", &self.get())
            .finish()
    }
}
