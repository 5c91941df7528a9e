//! Remote data gateway - authenticated HTTP calls against the backend.
//!
//! Every operation is a single call: it succeeds or it fails, and a failed
//! write is surfaced to the user immediately rather than retried. There is no
//! batching and no transactional grouping of multi-record operations. The
//! gateway carries the bearer token adopted at login or session restore;
//! operations other than `authenticate`/`register` refuse to run without one.

use crate::errors::{Error, Result};
use crate::models::{Meter, Reading, User};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Successful response from `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// The authenticated user record
    pub user: User,
    /// Bearer token for subsequent authenticated calls
    pub token: String,
}

/// Error body the backend returns on 4xx/5xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

trait WithAuth {
    fn with_auth(self, token: &str) -> Self;
}

impl WithAuth for reqwest::RequestBuilder {
    fn with_auth(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }
}

/// Performs authenticated read/write calls for meters and readings.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: reqwest::Client,
    api_url: String,
    project_id: String,
    api_key: Option<String>,
    token: Option<String>,
}

impl Gateway {
    /// Creates a gateway for the given backend. No token is held yet;
    /// call [`Gateway::set_token`] after login or session restore.
    #[must_use]
    pub fn new(api_url: &str, project_id: &str, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            api_key,
            token: None,
        }
    }

    /// Adopts a bearer token for subsequent authenticated calls.
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Drops the held token. Used on logout.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    /// Base request with project and API-key headers applied.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .request(method, self.url(path))
            .header("X-Volttrack-Project", &self.project_id);
        if let Some(key) = &self.api_key {
            req = req.header("X-Api-Key", key);
        }
        req
    }

    /// Like [`Gateway::request`], but requires a held bearer token.
    fn authed(&self, method: reqwest::Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let Some(token) = &self.token else {
            return Err(Error::Authentication {
                message: "Authentication required".to_string(),
            });
        };
        Ok(self.request(method, path).with_auth(token))
    }

    /// Extracts the backend's human-readable message from a failed response,
    /// falling back to the HTTP status line.
    async fn failure_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(ErrorBody {
                message: Some(message),
            }) => message,
            _ => format!("Request failed with status {status}"),
        }
    }

    /// Authenticates against `POST /api/auth/login`.
    ///
    /// # Errors
    /// Returns [`Error::Authentication`] carrying the backend's message, or a
    /// generic network-failure message if the call could not complete.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let response = self
            .request(reqwest::Method::POST, "/api/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| {
                debug!("Login transport failure: {e}");
                Error::Authentication {
                    message: "Could not reach the authentication service".to_string(),
                }
            })?;

        if !response.status().is_success() {
            return Err(Error::Authentication {
                message: Self::failure_message(response).await,
            });
        }

        response.json().await.map_err(|e| Error::Authentication {
            message: format!("Unexpected login response: {e}"),
        })
    }

    /// Creates a user account via `POST /api/auth/register`.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<User> {
        let response = self
            .request(reqwest::Method::POST, "/api/auth/register")
            .json(&json!({ "email": email, "password": password, "name": name }))
            .send()
            .await
            .map_err(|e| {
                debug!("Register transport failure: {e}");
                Error::Authentication {
                    message: "Could not reach the authentication service".to_string(),
                }
            })?;

        if !response.status().is_success() {
            return Err(Error::Authentication {
                message: Self::failure_message(response).await,
            });
        }

        response.json().await.map_err(|e| Error::Authentication {
            message: format!("Unexpected register response: {e}"),
        })
    }

    /// Fetches the full meter collection for the current user.
    ///
    /// # Errors
    /// Returns [`Error::Fetch`]; callers treat that as "empty collection,
    /// show error", not as fatal.
    pub async fn fetch_meters(&self) -> Result<Vec<Meter>> {
        self.fetch("/api/meters").await
    }

    /// Fetches the full reading collection for the current user.
    pub async fn fetch_readings(&self) -> Result<Vec<Reading>> {
        self.fetch("/api/readings").await
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .authed(reqwest::Method::GET, path)?
            .send()
            .await
            .map_err(|e| Error::Fetch {
                message: format!("Failed to load {path}: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(Error::Fetch {
                message: Self::failure_message(response).await,
            });
        }

        response.json().await.map_err(|e| Error::Fetch {
            message: format!("Unexpected response from {path}: {e}"),
        })
    }

    /// Uploads a new meter. The backend rejects a duplicate home + name pair
    /// for the same user; that rejection surfaces here as a network error.
    pub async fn create_meter(&self, meter: &Meter) -> Result<()> {
        self.write(self.authed(reqwest::Method::POST, "/api/meters")?.json(meter))
            .await
    }

    /// Pushes a mutated meter record.
    pub async fn update_meter(&self, meter: &Meter) -> Result<()> {
        let path = format!("/api/meters/{}", meter.id);
        self.write(self.authed(reqwest::Method::PATCH, &path)?.json(meter))
            .await
    }

    /// Deletes a meter on the backend. Readings are deleted by separate
    /// calls; there is no server-side cascade.
    pub async fn delete_meter(&self, meter_id: &str) -> Result<()> {
        let path = format!("/api/meters/{meter_id}");
        self.write(self.authed(reqwest::Method::DELETE, &path)?)
            .await
    }

    /// Uploads a new reading.
    pub async fn create_reading(&self, reading: &Reading) -> Result<()> {
        self.write(
            self.authed(reqwest::Method::POST, "/api/readings")?
                .json(reading),
        )
        .await
    }

    /// Deletes a reading on the backend.
    pub async fn delete_reading(&self, reading_id: &str) -> Result<()> {
        let path = format!("/api/readings/{reading_id}");
        self.write(self.authed(reqwest::Method::DELETE, &path)?)
            .await
    }

    async fn write(&self, request: reqwest::RequestBuilder) -> Result<()> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Error::Network {
                message: Self::failure_message(response).await,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    // Nothing listens on port 1, so calls fail fast with a transport error.
    const UNREACHABLE: &str = "http://127.0.0.1:1";

    #[test]
    fn test_url_joins_without_double_slash() {
        let gateway = Gateway::new("http://localhost:5000/", "proj", None);
        assert_eq!(
            gateway.url("/api/meters"),
            "http://localhost:5000/api/meters"
        );
    }

    #[test]
    fn test_login_response_parses() {
        let body = r#"{
            "user": {"id": "u1", "email": "a@b.c", "name": "A"},
            "token": "tok-123"
        }"#;
        let parsed: LoginResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.user.id, "u1");
        assert_eq!(parsed.token, "tok-123");
    }

    #[test]
    fn test_error_body_tolerates_missing_message() {
        let parsed: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(parsed.message.is_none());

        let parsed: ErrorBody = serde_json::from_str(r#"{"message": "nope"}"#).unwrap();
        assert_eq!(parsed.message.as_deref(), Some("nope"));
    }

    #[test]
    fn test_authed_without_token_fails() {
        let gateway = Gateway::new(UNREACHABLE, "proj", None);
        let result = gateway.authed(reqwest::Method::GET, "/api/meters");
        assert!(matches!(
            result.map(|_| ()).unwrap_err(),
            Error::Authentication { message: _ }
        ));
    }

    #[tokio::test]
    async fn test_authenticate_unreachable_reports_generic_message() {
        let gateway = Gateway::new(UNREACHABLE, "proj", None);
        let result = gateway.authenticate("a@b.c", "pw").await;
        match result.map(|_| ()).unwrap_err() {
            Error::Authentication { message } => {
                assert!(message.contains("Could not reach"));
            }
            other => panic!("expected authentication error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_unreachable_reports_generic_message() {
        let gateway = Gateway::new(UNREACHABLE, "proj", None);
        let result = gateway.register("a@b.c", "pw", "A").await;
        assert!(matches!(
            result.map(|_| ()).unwrap_err(),
            Error::Authentication { message: _ }
        ));
    }

    #[tokio::test]
    async fn test_fetch_meters_unreachable_is_fetch_error() {
        let mut gateway = Gateway::new(UNREACHABLE, "proj", None);
        gateway.set_token("tok".to_string());
        let result = gateway.fetch_meters().await;
        assert!(matches!(
            result.map(|_| ()).unwrap_err(),
            Error::Fetch { message: _ }
        ));
    }
}
