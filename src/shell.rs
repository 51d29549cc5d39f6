//! Application shell
//!
//! Bootstraps the session store from the identity provider on mount and keeps
//! the two in step for as long as the shell lives.

use log::{debug, info, warn};
use yic_portal_identity::{AuthChangeEvent, IdentityProvider, Session, Subscription};

use crate::session::SessionStore;

pub struct AppShell {
    identity: IdentityProvider,
    store: SessionStore,
    subscription: Option<Subscription>,
}

impl AppShell {
    pub fn new(identity: IdentityProvider, store: SessionStore) -> Self {
        Self {
            identity,
            store,
            subscription: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Mount the shell; later calls on the same instance do nothing.
    ///
    /// Returns the email the session store holds afterwards. A failure to
    /// reach the identity provider is logged and does not prevent mounting.
    pub async fn mount(&mut self) -> Option<String> {
        if self.is_mounted() {
            return self.store.get();
        }

        // Listen before the bootstrap query so a stale session dropped
        // during verification still clears the store.
        let store = self.store.clone();
        self.subscription = Some(
            self.identity
                .subscribe(move |event, session| mirror(&store, event, session)),
        );

        match self.identity.get_current_session().await {
            Ok(Some(session)) => {
                if let Err(e) = self.store.save_identity_session(Some(&session)) {
                    warn!("Could not persist identity session: {}", e);
                }
                if let Some(email) = session.email() {
                    info!("Restored session for {}", email);
                    if let Err(e) = self.store.set(email) {
                        warn!("Could not record session email: {}", e);
                    }
                }
            }
            Ok(None) => debug!("No identity provider session at startup"),
            Err(e) => warn!("Identity provider session check failed: {}", e),
        }

        self.store.get()
    }

    /// Stop mirroring provider changes
    pub fn unmount(&mut self) {
        if self.subscription.take().is_some() {
            debug!("Application shell unmounted");
        }
    }
}

fn mirror(store: &SessionStore, event: AuthChangeEvent, session: Option<&Session>) {
    debug!("Shell received {:?}", event);

    if let Err(e) = store.save_identity_session(session) {
        warn!("Could not persist identity session: {}", e);
    }

    let result = match (event, session.and_then(Session::email)) {
        (_, Some(email)) => store.set(email),
        (AuthChangeEvent::SignedOut, None) => store.clear(),
        _ => Ok(()),
    };
    if let Err(e) = result {
        warn!("Could not update session store after {:?}: {}", event, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;
    use yic_portal_identity::AuthOptions;

    #[test]
    fn unconfigured_shell_leaves_store_alone() {
        tokio_test::block_on(async {
            let store = SessionStore::in_memory();
            store.set("a@uon.ac.ke").unwrap();
            let identity = IdentityProvider::new(None, Client::new(), AuthOptions::default());
            let mut shell = AppShell::new(identity, store.clone());

            assert_eq!(shell.mount().await.as_deref(), Some("a@uon.ac.ke"));
            assert!(shell.is_mounted());
            shell.unmount();
            assert!(!shell.is_mounted());
        });
    }
}
