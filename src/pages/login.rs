use log::info;
use yic_portal_identity::{IdentityProvider, OAuthProvider, Redirect};

use super::{inline_message, BusyFlag};
use crate::api::{ApiClient, UserLogin};
use crate::routes::{Navigation, Route};
use crate::session::SessionStore;

const LOGIN_FALLBACK: &str = "Login failed. Please check your credentials.";

/// Email/password login, plus the Google button
pub struct LoginPage {
    api: ApiClient,
    identity: IdentityProvider,
    store: SessionStore,
    pub email: String,
    pub password: String,
    submitting: BusyFlag,
    error: Option<String>,
}

impl LoginPage {
    pub fn new(api: ApiClient, identity: IdentityProvider, store: SessionStore) -> Self {
        Self {
            api,
            identity,
            store,
            email: String::new(),
            password: String::new(),
            submitting: BusyFlag::new(false),
            error: None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.get()
    }

    /// Handle that reports whether a login request is pending
    pub fn submitting(&self) -> BusyFlag {
        self.submitting.clone()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Log in; on success the email is stored and the profile page is next
    pub async fn submit(&mut self) -> Option<Navigation> {
        self.error = None;
        let credentials = UserLogin {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        };

        let busy = self.submitting.raise();
        let result = self.api.login(&credentials).await;
        drop(busy);

        match result {
            Ok(user) => {
                if let Err(e) = self.store.set(&user.email) {
                    self.error = Some(inline_message(&e, LOGIN_FALLBACK));
                    return None;
                }
                info!("{} signed in", user.email);
                Some(Navigation::to(Route::Profile))
            }
            Err(e) => {
                self.error = Some(inline_message(&e, LOGIN_FALLBACK));
                None
            }
        }
    }

    /// Start Google sign-in; an unconfigured provider shows its error inline
    pub fn sign_in_with_google(&mut self) -> Option<Redirect> {
        self.error = None;
        match self.identity.sign_in_with_third_party(OAuthProvider::Google) {
            Ok(redirect) => Some(redirect),
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }
}
