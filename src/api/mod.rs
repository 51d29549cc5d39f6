//! Backend API client
//!
//! Every call is a single round trip with no retry. Non-success responses are
//! normalized into one message and returned as the error variant matching the
//! operation, with the HTTP status preserved.

mod types;

pub use types::{Role, User, UserCreate, UserLogin};

use log::info;
use reqwest::Client;

use crate::error::{Operation, Result};
use crate::fetch::FetchBuilder;

/// Client for the club's REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http_client: Client,
}

impl ApiClient {
    /// Create a new API client; `base_url` should already end in `/api/v1`
    pub fn new(base_url: &str, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register a new member
    pub async fn register(&self, payload: &UserCreate) -> Result<User> {
        let user: User = FetchBuilder::post(&self.http_client, &self.endpoint("/users/register"))
            .json(payload)?
            .execute(Operation::Register)
            .await?;
        info!("Registered {}", user.email);
        Ok(user)
    }

    /// Log in with email and password
    pub async fn login(&self, credentials: &UserLogin) -> Result<User> {
        let user: User = FetchBuilder::post(&self.http_client, &self.endpoint("/users/login"))
            .json(credentials)?
            .execute(Operation::Login)
            .await?;
        info!("Logged in as {}", user.email);
        Ok(user)
    }

    /// Fetch the profile for `email`
    pub async fn get_current_user(&self, email: &str) -> Result<User> {
        FetchBuilder::get(&self.http_client, &self.endpoint("/users/me"))
            .query("email", email)
            .execute(Operation::CurrentUser)
            .await
    }

    /// List mentors and staff
    pub async fn list_mentors(&self) -> Result<Vec<User>> {
        FetchBuilder::get(&self.http_client, &self.endpoint("/users/mentors"))
            .execute(Operation::ListMentors)
            .await
    }
}
