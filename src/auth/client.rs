//! Login and registration client
//!
//! Thin wrapper over `POST /auth` and `POST /user`. A non-success response surfaces the
//! body's `message` verbatim, or a generic text when there is none.

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::AuthError;
use super::registration::UserRegistration;

const LOGIN_FALLBACK: &str = "Error al iniciar sesión";
const REGISTER_FALLBACK: &str = "Error desconocido al registrar usuario";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Successful login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// Whatever else the server returned
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    /// Create a client for the API at `base_url` (e.g. "http://localhost:3000")
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let url = format!("{}/auth", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(AuthError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(rejection(response, LOGIN_FALLBACK).await);
        }

        let login = response.json().await.map_err(AuthError::from_reqwest)?;
        tracing::info!("Logged in");
        Ok(login)
    }

    /// Validate the form locally, then submit it
    pub async fn register(
        &self,
        registration: &UserRegistration,
    ) -> Result<serde_json::Value, AuthError> {
        let payload = registration.to_payload()?;
        let url = format!("{}/user", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(AuthError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(rejection(response, REGISTER_FALLBACK).await);
        }

        let created = response.json().await.map_err(AuthError::from_reqwest)?;
        tracing::info!(role = %payload.role, "User registered");
        Ok(created)
    }
}

async fn rejection(response: Response, fallback: &str) -> AuthError {
    let status = response.status().as_u16();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());

    tracing::debug!(status, message = %message, "Auth request rejected");
    AuthError::Rejected { status, message }
}
