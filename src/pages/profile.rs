use log::{debug, warn};
use yic_portal_identity::IdentityProvider;

use super::{inline_message, BusyFlag};
use crate::api::{ApiClient, User};
use crate::routes::{Navigation, Route};
use crate::session::SessionStore;

const PROFILE_FALLBACK: &str = "Failed to load profile";

/// Member profile; hydrated from the backend for the signed-in email
pub struct ProfilePage {
    api: ApiClient,
    identity: IdentityProvider,
    store: SessionStore,
    loading: BusyFlag,
    error: Option<String>,
    member: Option<User>,
}

impl ProfilePage {
    pub fn new(api: ApiClient, identity: IdentityProvider, store: SessionStore) -> Self {
        Self {
            api,
            identity,
            store,
            loading: BusyFlag::new(true),
            error: None,
            member: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    /// Handle that reports whether the profile is still loading
    pub fn loading(&self) -> BusyFlag {
        self.loading.clone()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn member(&self) -> Option<&User> {
        self.member.as_ref()
    }

    /// Resolve the signed-in email and fetch the profile.
    ///
    /// Returns a redirect when there is nobody signed in (login) or when the
    /// backend does not know the identity (complete profile).
    pub async fn load(&mut self) -> Option<Navigation> {
        self.error = None;
        let _busy = self.loading.raise();

        let email = match self.store.get() {
            Some(email) => email,
            None => match self.identity.get_current_session().await {
                Ok(Some(session)) => match session.email() {
                    Some(email) => {
                        debug!("Profile email taken from identity session");
                        if let Err(e) = self.store.set(email) {
                            warn!("Could not record session email: {}", e);
                        }
                        email.to_string()
                    }
                    None => return Some(Navigation::to(Route::Login)),
                },
                Ok(None) => return Some(Navigation::to(Route::Login)),
                Err(e) => {
                    warn!("Identity provider session check failed: {}", e);
                    return Some(Navigation::to(Route::Login));
                }
            },
        };

        match self.api.get_current_user(&email).await {
            Ok(user) => {
                self.member = Some(user);
                None
            }
            Err(e) if e.is_not_found() => {
                debug!("{} has no backend profile yet", email);
                Some(Navigation::to(Route::complete_profile(&email)))
            }
            Err(e) => {
                self.error = Some(inline_message(&e, PROFILE_FALLBACK));
                None
            }
        }
    }

    /// Forget the local session and go home
    pub fn sign_out(&mut self) -> Navigation {
        if let Err(e) = self.store.clear() {
            warn!("Could not clear session store: {}", e);
        }
        self.member = None;
        Navigation::to(Route::Home)
    }
}
