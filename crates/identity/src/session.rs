//! Session data issued by the identity provider

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The provider's view of the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    /// The provider user ID
    pub id: String,

    /// The user's email address, absent for phone-only identities
    #[serde(default)]
    pub email: Option<String>,

    /// The provider role (usually `authenticated`)
    #[serde(default)]
    pub role: Option<String>,
}

/// Session data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The access token
    pub access_token: String,

    /// The refresh token
    pub refresh_token: String,

    /// The token type
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// The expiry time in seconds
    pub expires_in: i64,

    /// The expiry timestamp (unix seconds)
    #[serde(default)]
    pub expires_at: Option<i64>,

    /// The signed-in user
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Create a new session expiring `expires_in` seconds from now
    pub fn new(access_token: String, refresh_token: String, user: AuthUser, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: default_token_type(),
            expires_in,
            expires_at: None,
            user,
        }
        .with_expiry()
    }

    /// Fill in `expires_at` from `expires_in` when the provider omitted it
    pub(crate) fn with_expiry(mut self) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = Some(Utc::now().timestamp() + self.expires_in);
        }
        self
    }

    /// The email of the signed-in user, if the provider supplied one
    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref().filter(|email| !email.is_empty())
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now().timestamp() >= expires_at,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: Option<&str>) -> AuthUser {
        AuthUser {
            id: "user-1".to_string(),
            email: email.map(str::to_string),
            role: Some("authenticated".to_string()),
        }
    }

    #[test]
    fn new_session_computes_expiry() {
        let session = Session::new("a".into(), "r".into(), user(Some("a@uon.ac.ke")), 3600);
        assert!(session.expires_at.is_some());
        assert!(!session.is_expired());
    }

    #[test]
    fn session_with_past_expiry_is_expired() {
        let mut session = Session::new("a".into(), "r".into(), user(None), 3600);
        session.expires_at = Some(Utc::now().timestamp() - 10);
        assert!(session.is_expired());
    }

    #[test]
    fn blank_email_reads_as_absent() {
        let session = Session::new("a".into(), "r".into(), user(Some("")), 60);
        assert_eq!(session.email(), None);
    }

    #[test]
    fn deserializes_provider_token_response() {
        let session: Session = serde_json::from_value(serde_json::json!({
            "access_token": "token",
            "refresh_token": "refresh",
            "expires_in": 3600,
            "user": { "id": "u1", "email": "mentor@gmail.com" }
        }))
        .unwrap();
        assert_eq!(session.token_type, "bearer");
        assert_eq!(session.email(), Some("mentor@gmail.com"));
        assert_eq!(session.expires_at, None);
    }
}
