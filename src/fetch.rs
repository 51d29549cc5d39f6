//! HTTP request helper for the backend API

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Operation, Result};

/// Helper for building and executing HTTP requests
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    query_params: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl<'a> FetchBuilder<'a> {
    /// Create a new FetchBuilder
    pub fn new(client: &'a Client, url: &str, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            client,
            url: url.to_string(),
            method,
            headers,
            query_params: Vec::new(),
            body: None,
        }
    }

    /// Create a GET request
    pub fn get(client: &'a Client, url: &str) -> Self {
        Self::new(client, url, Method::GET)
    }

    /// Create a POST request
    pub fn post(client: &'a Client, url: &str) -> Self {
        Self::new(client, url, Method::POST)
    }

    /// Add a query parameter; the value is percent-encoded when the URL is built
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    fn build(&self) -> Result<RequestBuilder> {
        let mut url = Url::parse(&self.url)?;

        if !self.query_params.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                query_pairs.append_pair(key, value);
            }
        }

        let mut req = self.client.request(self.method.clone(), url.as_str());
        req = req.headers(self.headers.clone());

        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }

        Ok(req)
    }

    /// Execute the request and parse a success response as JSON.
    ///
    /// A non-success status becomes the error variant for `operation`, with
    /// the backend's `detail` flattened into one message.
    pub async fn execute<T: DeserializeOwned>(&self, operation: Operation) -> Result<T> {
        let req = self.build()?;
        debug!("{} {}", self.method, self.url);
        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(&text, operation.fallback_message());
            warn!("{:?} failed with status {}: {}", operation, status, message);
            return Err(operation.rejection(status, message));
        }

        Ok(response.json::<T>().await?)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Detail>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Items(Vec<DetailItem>),
    Other(serde_json::Value),
}

#[derive(Deserialize)]
struct DetailItem {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Flatten an error body of the shape `{ "detail": string | [{ msg | message }] }`
/// into a single message, falling back to `fallback`.
pub fn error_message(body: &str, fallback: &str) -> String {
    let detail = match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: Some(detail),
        }) => detail,
        _ => return fallback.to_string(),
    };

    match detail {
        Detail::Message(message) if !message.is_empty() => message,
        Detail::Items(items) => {
            let joined = items
                .into_iter()
                .filter_map(|item| item.msg.or(item.message))
                .collect::<Vec<_>>()
                .join(", ");
            if joined.is_empty() {
                fallback.to_string()
            } else {
                joined
            }
        }
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail_is_used_verbatim() {
        assert_eq!(
            error_message(r#"{"detail":"Email already registered"}"#, "Registration failed"),
            "Email already registered"
        );
    }

    #[test]
    fn list_detail_is_joined() {
        let body = r#"{"detail":[
            {"loc":["body","email"],"msg":"value is not a valid email address","type":"value_error"},
            {"message":"password too short"}
        ]}"#;
        assert_eq!(
            error_message(body, "Registration failed"),
            "value is not a valid email address, password too short"
        );
    }

    #[test]
    fn unusable_bodies_fall_back() {
        assert_eq!(error_message("<html>502</html>", "Login failed"), "Login failed");
        assert_eq!(error_message("{}", "Login failed"), "Login failed");
        assert_eq!(error_message(r#"{"detail":42}"#, "Login failed"), "Login failed");
        assert_eq!(error_message(r#"{"detail":""}"#, "Login failed"), "Login failed");
        assert_eq!(error_message(r#"{"detail":[{"loc":[]}]}"#, "Login failed"), "Login failed");
    }

    #[test]
    fn query_values_are_encoded() {
        let client = Client::new();
        let request = FetchBuilder::get(&client, "http://localhost:8000/api/v1/users/me")
            .query("email", "a+b@uon.ac.ke")
            .build()
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8000/api/v1/users/me?email=a%2Bb%40uon.ac.ke"
        );
    }
}
