//! Young Innovators Club portal client
//!
//! The session and authentication core of the club portal: a backend API
//! client, an optional third-party identity provider, the session store the
//! pages share, and the page controllers that drive them.

pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod nav;
pub mod pages;
pub mod routes;
pub mod session;
pub mod shell;
pub mod validation;

use std::sync::Arc;

use log::{debug, info};
use reqwest::Client;
use yic_portal_identity::{AuthOptions, IdentityProvider};

use crate::api::ApiClient;
use crate::config::PortalConfig;
use crate::error::Result;
use crate::nav::NavBar;
use crate::pages::{LoginPage, MentorDirectory, ProfilePage, RegisterPage};
use crate::routes::Route;
use crate::session::{FileStorage, KeyValueStorage, MemoryStorage, SessionStore};
use crate::shell::AppShell;

pub use yic_portal_identity as identity;

/// The main entry point: one shared HTTP client, API client, identity
/// provider and session store
pub struct Portal {
    /// Resolved configuration
    pub config: PortalConfig,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Backend API client
    pub api: ApiClient,
    /// Third-party identity provider, possibly unconfigured
    pub identity: IdentityProvider,
    /// Session store shared by every page
    pub session: SessionStore,
}

impl Portal {
    /// Create a portal client, keeping session keys where `config` says
    ///
    /// # Example
    ///
    /// ```
    /// use yic_portal::{Portal, config::PortalConfig};
    ///
    /// let portal = Portal::new(PortalConfig::default().with_api_url("http://localhost:8000")).unwrap();
    /// assert_eq!(portal.api.base_url(), "http://localhost:8000/api/v1");
    /// assert!(!portal.identity.is_configured());
    /// ```
    pub fn new(config: PortalConfig) -> Result<Self> {
        let storage: Arc<dyn KeyValueStorage> = match &config.session_file {
            Some(path) => Arc::new(FileStorage::open(path)?),
            None => Arc::new(MemoryStorage::new()),
        };
        Self::with_storage(config, storage)
    }

    /// Create a portal client from the environment
    pub fn from_env() -> Result<Self> {
        Self::new(PortalConfig::from_env()?)
    }

    /// Create a portal client over an explicit storage backend
    pub fn with_storage(config: PortalConfig, storage: Arc<dyn KeyValueStorage>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let api = ApiClient::new(&config.api_url, http_client.clone());
        let identity = IdentityProvider::new(
            config.identity.clone(),
            http_client.clone(),
            AuthOptions::default().with_redirect_to(config.oauth_redirect_url()),
        );
        let session = SessionStore::new(storage);

        if identity.is_configured() {
            if let Some(restored) = session.identity_session() {
                debug!("Restoring persisted identity session");
                identity.set_session(restored);
            }
        }
        info!("Portal client using API at {}", api.base_url());

        Ok(Self {
            config,
            http_client,
            api,
            identity,
            session,
        })
    }

    pub fn shell(&self) -> AppShell {
        AppShell::new(self.identity.clone(), self.session.clone())
    }

    pub fn nav(&self, current: Route) -> NavBar {
        NavBar::mount(self.identity.clone(), self.session.clone(), current)
    }

    pub fn login_page(&self) -> LoginPage {
        LoginPage::new(self.api.clone(), self.identity.clone(), self.session.clone())
    }

    pub fn register_page(&self, route: &Route) -> RegisterPage {
        RegisterPage::new(self.api.clone(), self.session.clone(), route)
    }

    pub fn profile_page(&self) -> ProfilePage {
        ProfilePage::new(self.api.clone(), self.identity.clone(), self.session.clone())
    }

    pub fn mentor_directory(&self) -> MentorDirectory {
        MentorDirectory::new(self.api.clone())
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::api::{Role, User};
    pub use crate::config::PortalConfig;
    pub use crate::error::{Error, Result};
    pub use crate::routes::{Navigation, Route};
    pub use crate::session::SessionStore;
    pub use crate::Portal;
}
