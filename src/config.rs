//! Configuration options for the portal client

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use log::debug;
use yic_portal_identity::IdentityConfig;

use crate::error::{Error, Result};

/// Backend origin used when `API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Site origin used when `SITE_URL` is not set
pub const DEFAULT_SITE_URL: &str = "http://localhost:5173";

/// Path the identity provider returns to after third-party sign-in
pub const OAUTH_RETURN_PATH: &str = "/profile";

/// Normalize a backend origin so it always ends in `/api/v1`.
///
/// ```
/// use yic_portal::config::normalize_api_base;
///
/// assert_eq!(normalize_api_base("http://localhost:8000"), "http://localhost:8000/api/v1");
/// assert_eq!(normalize_api_base("https://api.example.com/api"), "https://api.example.com/api/v1");
/// ```
pub fn normalize_api_base(raw: &str) -> String {
    let base = raw.trim().trim_end_matches('/');
    if base.ends_with("/v1") {
        base.to_string()
    } else if base.ends_with("/api") {
        format!("{}/v1", base)
    } else {
        format!("{}/api/v1", base)
    }
}

/// Configuration options for the portal client
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Normalized backend base URL, always ending in `/api/v1`
    pub api_url: String,

    /// Origin the portal is served from
    pub site_url: String,

    /// Identity provider settings; `None` disables third-party sign-in
    pub identity: Option<IdentityConfig>,

    /// The request timeout; unbounded when `None`
    pub request_timeout: Option<Duration>,

    /// Where durable session keys are kept; in memory when `None`
    pub session_file: Option<PathBuf>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_url: normalize_api_base(DEFAULT_API_URL),
            site_url: DEFAULT_SITE_URL.to_string(),
            identity: None,
            request_timeout: None,
            session_file: None,
        }
    }
}

impl PortalConfig {
    /// Load settings from the environment (and a `.env` file if present).
    ///
    /// The `VITE_`-prefixed names of the web build are accepted as fallbacks.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        let mut config = Self::default();

        if let Some(api_url) = read_var("API_URL") {
            config = config.with_api_url(&api_url);
        }
        if let Some(site_url) = read_var("SITE_URL") {
            config = config.with_site_url(&site_url);
        }
        config.identity = IdentityConfig::from_env().ok();

        if let Some(path) = read_var("YIC_SESSION_FILE") {
            config.session_file = Some(PathBuf::from(path));
        }
        if let Some(secs) = read_var("API_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| Error::config(format!("API_TIMEOUT_SECS is not a number: {}", secs)))?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Set the backend origin; it is normalized to end in `/api/v1`
    pub fn with_api_url(mut self, value: &str) -> Self {
        self.api_url = normalize_api_base(value);
        self
    }

    /// Set the site origin
    pub fn with_site_url(mut self, value: &str) -> Self {
        self.site_url = value.trim().trim_end_matches('/').to_string();
        self
    }

    /// Set the identity provider settings
    pub fn with_identity(mut self, value: Option<IdentityConfig>) -> Self {
        self.identity = value;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the session file
    pub fn with_session_file(mut self, value: Option<PathBuf>) -> Self {
        self.session_file = value;
        self
    }

    /// Absolute URL the identity provider redirects back to
    pub fn oauth_redirect_url(&self) -> String {
        format!("{}{}", self.site_url, OAUTH_RETURN_PATH)
    }
}

fn read_var(name: &str) -> Option<String> {
    env::var(name)
        .or_else(|_| env::var(format!("VITE_{}", name)))
        .ok()
        .filter(|value| !value.trim().is_empty())
}
