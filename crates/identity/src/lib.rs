//! Identity provider client for the Young Innovators Club portal
//!
//! Wraps the hosted auth service (Supabase GoTrue) that backs third-party
//! sign-in. The service is optional: [`IdentityProvider::Unconfigured`] turns
//! every operation into a well-defined no-op or a [`AuthError::Configuration`]
//! error instead of a missing client.

mod events;
mod session;

use std::sync::{Arc, RwLock};

use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use thiserror::Error;

pub use events::{AuthChangeEvent, Subscription};
pub use session::{AuthUser, Session};

use events::Listeners;

/// Message reported when third-party sign-in is attempted without configuration
pub const CONFIGURATION_MESSAGE: &str =
    "Google sign-in is not configured. Set SUPABASE_URL and SUPABASE_ANON_KEY to enable it.";

/// Error type
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Configuration(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing session")]
    MissingSession,

    #[error("Sign out failed: {0}")]
    SignOutError(String),

    #[error("Invalid sign-in redirect: {0}")]
    RedirectError(String),
}

impl AuthError {
    /// The fixed "not configured" error
    pub fn not_configured() -> Self {
        Self::Configuration(CONFIGURATION_MESSAGE.to_string())
    }
}

/// Connection settings for the hosted identity service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub url: String,
    pub anon_key: String,
}

impl IdentityConfig {
    /// Creates a new configuration; blank values count as unconfigured.
    pub fn new(url: &str, anon_key: &str) -> Result<Self, AuthError> {
        let url = url.trim().trim_end_matches('/');
        let anon_key = anon_key.trim();
        if url.is_empty() || anon_key.is_empty() {
            return Err(AuthError::not_configured());
        }
        Ok(Self {
            url: url.to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    /// Reads `SUPABASE_URL` / `SUPABASE_ANON_KEY`, falling back to the
    /// `VITE_`-prefixed names the web build used.
    pub fn from_env() -> Result<Self, AuthError> {
        let read = |name: &str| {
            std::env::var(name)
                .or_else(|_| std::env::var(format!("VITE_{}", name)))
                .unwrap_or_default()
        };
        Self::new(&read("SUPABASE_URL"), &read("SUPABASE_ANON_KEY"))
    }
}

/// Client options
#[derive(Debug, Clone, Default)]
pub struct AuthOptions {
    /// Where the provider sends the browser after third-party sign-in
    pub redirect_to: Option<String>,
}

impl AuthOptions {
    pub fn with_redirect_to(mut self, redirect_to: impl Into<String>) -> Self {
        self.redirect_to = Some(redirect_to.into());
        self
    }
}

/// Third-party OAuth provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Github,
    Microsoft,
}

impl OAuthProvider {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Github => "github",
            Self::Microsoft => "azure",
        }
    }
}

/// A provider sign-in the caller must complete by visiting `url`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub provider: OAuthProvider,
    pub url: String,
}

/// Tokens carried in the fragment of an implicit-flow return URL
#[derive(Debug, Clone, PartialEq, Eq)]
struct RedirectTokens {
    access_token: String,
    refresh_token: String,
    token_type: Option<String>,
    expires_in: i64,
    expires_at: Option<i64>,
}

impl RedirectTokens {
    fn parse(return_url: &str) -> Result<Self, AuthError> {
        let return_url = return_url.trim();
        let fragment = match url::Url::parse(return_url) {
            Ok(url) => url.fragment().map(str::to_string).unwrap_or_default(),
            Err(_) => return_url.trim_start_matches('#').to_string(),
        };

        let mut access_token = None;
        let mut refresh_token = None;
        let mut token_type = None;
        let mut expires_in: i64 = 0;
        let mut expires_at = None;
        let mut error = None;
        let mut error_description = None;

        for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
            match key.as_ref() {
                "access_token" => access_token = Some(value.into_owned()),
                "refresh_token" => refresh_token = Some(value.into_owned()),
                "token_type" => token_type = Some(value.into_owned()),
                "expires_in" => expires_in = value.parse().unwrap_or_default(),
                "expires_at" => expires_at = value.parse().ok(),
                "error" => error = Some(value.into_owned()),
                "error_description" => error_description = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(error) = error_description.or(error) {
            return Err(AuthError::ApiError(error));
        }

        match (access_token, refresh_token) {
            (Some(access_token), Some(refresh_token))
                if !access_token.is_empty() && !refresh_token.is_empty() =>
            {
                Ok(Self {
                    access_token,
                    refresh_token,
                    token_type,
                    expires_in,
                    expires_at,
                })
            }
            _ => Err(AuthError::RedirectError(
                "the return URL carries no session tokens".to_string(),
            )),
        }
    }
}

/// Auth client for a configured identity service
#[derive(Clone)]
pub struct AuthClient {
    url: String,
    key: String,
    http_client: Client,
    options: AuthOptions,
    current_session: Arc<RwLock<Option<Session>>>,
    listeners: Listeners,
}

impl AuthClient {
    /// Create a new auth client
    pub fn new(config: IdentityConfig, http_client: Client, options: AuthOptions) -> Self {
        Self {
            url: config.url,
            key: config.anon_key,
            http_client,
            options,
            current_session: Arc::new(RwLock::new(None)),
            listeners: Listeners::default(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    /// Build the authorize URL for a third-party provider
    pub fn get_oauth_sign_in_url(&self, provider: OAuthProvider) -> String {
        let mut url = format!("{}?provider={}", self.auth_url("/authorize"), provider.as_str());

        if let Some(redirect_to) = &self.options.redirect_to {
            url.push_str(&format!("&redirect_to={}", urlencoding::encode(redirect_to)));
        }

        url
    }

    /// Start a redirect-based third-party sign-in
    pub fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Redirect {
        let url = self.get_oauth_sign_in_url(provider);
        info!("Starting {} sign-in", provider.as_str());
        Redirect { provider, url }
    }

    /// Finish a third-party sign-in from the URL the provider redirected back to.
    ///
    /// The provider appends the tokens to the fragment
    /// (`#access_token=…&refresh_token=…&expires_in=…`); the user is then
    /// looked up with the new access token. Accepts the full URL or just
    /// the fragment.
    pub async fn session_from_redirect(&self, return_url: &str) -> Result<Session, AuthError> {
        let tokens = RedirectTokens::parse(return_url)?;

        let response = self.user_response(&tokens.access_token).await?;
        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AuthError::ApiError(error_text));
        }
        let user: AuthUser = response.json().await?;

        let mut session = Session::new(
            tokens.access_token,
            tokens.refresh_token,
            user,
            tokens.expires_in,
        );
        if let Some(token_type) = tokens.token_type {
            session.token_type = token_type;
        }
        if tokens.expires_at.is_some() {
            session.expires_at = tokens.expires_at;
        }

        self.replace_session(Some(session.clone()));
        self.listeners.emit(AuthChangeEvent::SignedIn, Some(&session));

        Ok(session)
    }

    /// Refresh the held session
    pub async fn refresh_session(&self) -> Result<Session, AuthError> {
        let session = self.session().ok_or(AuthError::MissingSession)?;

        let url = self.auth_url("/token?grant_type=refresh_token");

        let payload = serde_json::json!({
            "refresh_token": session.refresh_token,
        });

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AuthError::ApiError(error_text));
        }

        let new_session = response.json::<Session>().await?.with_expiry();
        self.replace_session(Some(new_session.clone()));
        self.listeners
            .emit(AuthChangeEvent::TokenRefreshed, Some(&new_session));

        Ok(new_session)
    }

    /// Return the current session, verified against the provider.
    ///
    /// "No session" is `Ok(None)`; only transport failures and unexpected
    /// statuses are errors.
    pub async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(mut session) = self.session() else {
            return Ok(None);
        };

        if session.is_expired() {
            debug!("Held session expired, refreshing");
            session = match self.refresh_session().await {
                Ok(session) => session,
                Err(AuthError::ApiError(e)) => {
                    warn!("Session refresh rejected: {}", e);
                    self.drop_session();
                    return Ok(None);
                }
                Err(e) => return Err(e),
            };
        }

        let response = self.user_response(&session.access_token).await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                info!("Provider rejected the held session");
                self.drop_session();
                return Ok(None);
            }
            status if !status.is_success() => {
                let error_text = response.text().await?;
                return Err(AuthError::ApiError(error_text));
            }
            _ => {}
        }

        let user: AuthUser = response.json().await?;
        if user.email != session.user.email {
            session.user = user;
            self.replace_session(Some(session.clone()));
            self.listeners
                .emit(AuthChangeEvent::UserUpdated, Some(&session));
        }

        Ok(Some(session))
    }

    /// The held session, without contacting the provider
    pub fn session(&self) -> Option<Session> {
        self.current_session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Restore a previously persisted session without emitting an event
    pub fn set_session(&self, session: Session) {
        self.replace_session(Some(session));
    }

    /// Sign out.
    ///
    /// The held session is dropped and `SignedOut` is emitted even when the
    /// provider request fails; the failure is still reported to the caller.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.session() else {
            self.drop_session();
            return Ok(());
        };

        let result = self
            .http_client
            .post(self.auth_url("/logout"))
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .send()
            .await;

        self.drop_session();

        let response = result.map_err(|e| AuthError::SignOutError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuthError::SignOutError(format!("{}: {}", status, error_text)));
        }

        Ok(())
    }

    /// Register a callback for every session transition
    pub fn on_auth_state_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(AuthChangeEvent, Option<&Session>) + Send + Sync + 'static,
    {
        self.listeners.add(callback)
    }

    async fn user_response(&self, access_token: &str) -> Result<reqwest::Response, AuthError> {
        let response = self
            .http_client
            .get(self.auth_url("/user"))
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;
        Ok(response)
    }

    fn replace_session(&self, session: Option<Session>) {
        let mut write_guard = self
            .current_session
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *write_guard = session;
    }

    fn drop_session(&self) {
        self.replace_session(None);
        self.listeners.emit(AuthChangeEvent::SignedOut, None);
    }
}

/// The identity provider as seen by the portal: present or not
#[derive(Clone)]
pub enum IdentityProvider {
    Configured(AuthClient),
    Unconfigured,
}

impl IdentityProvider {
    /// Build a provider from optional settings
    pub fn new(config: Option<IdentityConfig>, http_client: Client, options: AuthOptions) -> Self {
        match config {
            Some(config) => Self::Configured(AuthClient::new(config, http_client, options)),
            None => {
                info!("Identity provider not configured; third-party sign-in disabled");
                Self::Unconfigured
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }

    pub fn client(&self) -> Option<&AuthClient> {
        match self {
            Self::Configured(client) => Some(client),
            Self::Unconfigured => None,
        }
    }

    /// Start third-party sign-in; fails without touching the network when unconfigured
    pub fn sign_in_with_third_party(&self, provider: OAuthProvider) -> Result<Redirect, AuthError> {
        match self {
            Self::Configured(client) => Ok(client.sign_in_with_oauth(provider)),
            Self::Unconfigured => Err(AuthError::not_configured()),
        }
    }

    /// Finish a third-party sign-in from the URL the provider redirected back to
    pub async fn complete_redirect(&self, return_url: &str) -> Result<Session, AuthError> {
        match self {
            Self::Configured(client) => client.session_from_redirect(return_url).await,
            Self::Unconfigured => Err(AuthError::not_configured()),
        }
    }

    /// The provider's current session; `None` when unconfigured
    pub async fn get_current_session(&self) -> Result<Option<Session>, AuthError> {
        match self {
            Self::Configured(client) => client.get_session().await,
            Self::Unconfigured => Ok(None),
        }
    }

    /// Request provider sign-out; a no-op when unconfigured
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        match self {
            Self::Configured(client) => client.sign_out().await,
            Self::Unconfigured => Ok(()),
        }
    }

    /// Subscribe to session transitions; inert when unconfigured
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(AuthChangeEvent, Option<&Session>) + Send + Sync + 'static,
    {
        match self {
            Self::Configured(client) => client.on_auth_state_change(callback),
            Self::Unconfigured => Subscription::inert(),
        }
    }

    /// The held session without a network round trip
    pub fn session(&self) -> Option<Session> {
        self.client().and_then(AuthClient::session)
    }

    /// Restore a persisted session; ignored when unconfigured
    pub fn set_session(&self, session: Session) {
        if let Self::Configured(client) = self {
            client.set_session(session);
        }
    }
}
