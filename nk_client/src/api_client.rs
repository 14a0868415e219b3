//! HTTP API client for the notekeeper server.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// API client for communicating with the notekeeper server
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    access_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendOtpRequest<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct SignupRequest<'a> {
    name: Option<&'a str>,
    dob: Option<&'a str>,
    email: &'a str,
    otp: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    otp: &'a str,
}

#[derive(Debug, Serialize)]
struct GoogleRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateNoteRequest<'a> {
    title: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct SuccessBody {
    success: bool,
}

/// User record returned by the sign-in endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            access_token: None,
        }
    }

    /// Use a previously issued session token
    pub fn set_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Ask the server to mail a passcode
    pub async fn send_otp(&self, email: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/api/auth/send-otp", self.base_url))
            .json(&SendOtpRequest { email })
            .send()
            .await
            .context("Failed to send OTP request")?;

        let body: SuccessBody = Self::parse(response, "OTP").await?;
        if !body.success {
            anyhow::bail!("Server did not accept the OTP request");
        }

        Ok(())
    }

    /// Verify a passcode and sign up
    pub async fn signup(
        &mut self,
        name: Option<&str>,
        dob: Option<&str>,
        email: &str,
        otp: &str,
    ) -> Result<AuthResponse> {
        let response = self
            .client
            .post(format!("{}/api/auth/verify-otp-signup", self.base_url))
            .json(&SignupRequest {
                name,
                dob,
                email,
                otp,
            })
            .send()
            .await
            .context("Failed to send signup request")?;

        self.store_session(response, "signup").await
    }

    /// Verify a passcode for an existing account
    pub async fn login(&mut self, email: &str, otp: &str) -> Result<AuthResponse> {
        let response = self
            .client
            .post(format!("{}/api/auth/verify-otp-login", self.base_url))
            .json(&LoginRequest { email, otp })
            .send()
            .await
            .context("Failed to send login request")?;

        self.store_session(response, "login").await
    }

    /// Sign in with a Google ID token
    pub async fn google_login(&mut self, id_token: &str) -> Result<AuthResponse> {
        let response = self
            .client
            .post(format!("{}/api/auth/google-login", self.base_url))
            .json(&GoogleRequest { id_token })
            .send()
            .await
            .context("Failed to send Google login request")?;

        self.store_session(response, "Google login").await
    }

    /// Sign up with a Google ID token
    pub async fn google_signup(&mut self, id_token: &str) -> Result<AuthResponse> {
        let response = self
            .client
            .post(format!("{}/api/auth/google-signup", self.base_url))
            .json(&GoogleRequest { id_token })
            .send()
            .await
            .context("Failed to send Google signup request")?;

        self.store_session(response, "Google signup").await
    }

    /// Fetch the signed-in user's profile
    pub async fn me(&self) -> Result<Profile> {
        let response = self
            .authorized(self.client.get(format!("{}/api/user/me", self.base_url)))?
            .send()
            .await
            .context("Failed to send profile request")?;

        Self::parse(response, "profile").await
    }

    /// List the signed-in user's notes, newest first
    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        let response = self
            .authorized(self.client.get(format!("{}/api/notes", self.base_url)))?
            .send()
            .await
            .context("Failed to send notes request")?;

        Self::parse(response, "notes").await
    }

    /// Create a note; blank titles are rejected without a round trip
    pub async fn create_note(&self, title: &str) -> Result<Note> {
        let title = title.trim();
        if title.is_empty() {
            anyhow::bail!("Title is required");
        }

        let response = self
            .authorized(self.client.post(format!("{}/api/notes", self.base_url)))?
            .json(&CreateNoteRequest { title })
            .send()
            .await
            .context("Failed to send create note request")?;

        Self::parse(response, "note").await
    }

    /// Delete one of the signed-in user's notes
    pub async fn delete_note(&self, note_id: &str) -> Result<()> {
        let response = self
            .authorized(
                self.client
                    .delete(format!("{}/api/notes/{}", self.base_url, note_id)),
            )?
            .send()
            .await
            .context("Failed to send delete note request")?;

        let _: SuccessBody = Self::parse(response, "delete").await?;
        Ok(())
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        let token = self
            .access_token
            .as_ref()
            .context("Not signed in; run login or signup first")?;

        Ok(request.bearer_auth(token))
    }

    async fn store_session(
        &mut self,
        response: reqwest::Response,
        what: &str,
    ) -> Result<AuthResponse> {
        let auth: AuthResponse = Self::parse(response, what).await?;
        self.access_token = Some(auth.token.clone());
        Ok(auth)
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            anyhow::bail!("{} failed ({}): {}", what, status.as_u16(), message);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {what} response"))
    }
}
