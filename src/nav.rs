//! Navigation bar state

use std::sync::{Arc, RwLock};

use log::{debug, warn};
use yic_portal_identity::{IdentityProvider, Session, Subscription};

use crate::routes::{Navigation, Route};
use crate::session::SessionStore;

/// A top-level navigation link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub route: Route,
}

/// The auth-aware controls at the end of the bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavControls {
    Guest { login: Route, register: Route },
    Member { email: String, profile: Route },
}

/// The links shown in every navigation bar
pub fn links() -> Vec<NavLink> {
    vec![
        NavLink { label: "Home", route: Route::Home },
        NavLink { label: "About", route: Route::About },
        NavLink { label: "Blog", route: Route::Blog },
        NavLink { label: "Activities", route: Route::Activities },
        NavLink { label: "Mentors", route: Route::Mentors },
        NavLink { label: "Contact", route: Route::Contact },
    ]
}

pub struct NavBar {
    identity: IdentityProvider,
    store: SessionStore,
    current: Route,
    email: Arc<RwLock<Option<String>>>,
    subscription: Option<Subscription>,
}

impl NavBar {
    /// Mount the bar: show the cached email right away, then follow the provider
    pub fn mount(identity: IdentityProvider, store: SessionStore, current: Route) -> Self {
        let email = Arc::new(RwLock::new(store.get()));

        let displayed = email.clone();
        let subscription = identity.subscribe(move |event, session| {
            debug!("Navigation bar received {:?}", event);
            *displayed.write().unwrap_or_else(|e| e.into_inner()) =
                session.and_then(Session::email).map(str::to_string);
        });

        Self {
            identity,
            store,
            current,
            email,
            subscription: Some(subscription),
        }
    }

    /// The email currently displayed, if any
    pub fn email(&self) -> Option<String> {
        self.email.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn controls(&self) -> NavControls {
        match self.email() {
            Some(email) => NavControls::Member {
                email,
                profile: Route::Profile,
            },
            None => NavControls::Guest {
                login: Route::Login,
                register: Route::register(),
            },
        }
    }

    pub fn set_current(&mut self, route: Route) {
        self.current = route;
    }

    /// Whether `route` is the link for the current page (detail pages count)
    pub fn is_active(&self, route: &Route) -> bool {
        if *route == self.current {
            return true;
        }
        let link = route.to_path();
        link != "/" && self.current.to_path().starts_with(&format!("{}/", link))
    }

    /// Sign out everywhere and return to the login page with a full reload.
    ///
    /// Provider sign-out is best effort; the local session is always cleared.
    pub async fn sign_out(&mut self) -> Navigation {
        if let Err(e) = self.identity.sign_out().await {
            warn!("Identity provider sign-out failed: {}", e);
        }
        if let Err(e) = self.store.clear() {
            warn!("Could not clear session store: {}", e);
        }
        *self.email.write().unwrap_or_else(|e| e.into_inner()) = None;

        Navigation::reload(Route::Login)
    }

    pub fn unmount(&mut self) {
        self.subscription = None;
    }
}
