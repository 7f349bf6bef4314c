//! HTTP client for a running cadastro server.
//!
//! Used by the `cadastro` CLI subcommands and by anything else that needs to submit intake forms
//! programmatically. The base URL comes from `CADASTRO_API_URL` and falls back to
//! [`DEFAULT_API_URL`]. After [`ApiClient::login`] the session token is kept in a
//! [`TokenStore`] and sent as `Authorization: Bearer` on every later call.
//!
//! ```no_run
//! use cadastro::client::{ApiClient, IntakeForm, MemoryTokenStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), cadastro::client::ClientError> {
//! let client = ApiClient::from_env(Arc::new(MemoryTokenStore::new()))?;
//! let form = IntakeForm::new()
//!     .text("nome", "Ana Lima")
//!     .text("cpf", "123.456.789-00")
//!     .file_from_path("laudo.pdf")
//!     .await?;
//!
//! let response = client.submit_intake(form).await?;
//! println!("{:?}", response.arquivos);
//! # Ok(())
//! # }
//! ```

pub mod commands;
mod error;
mod form;
mod token;

pub use error::{ClientError, Result};
pub use form::{DEFAULT_FILE_FIELD, FormEntry, IntakeForm};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, instrument};
use url::Url;

use crate::{
    api::models::{
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        intake::IntakeResponse,
        patients::EchoResponse,
        users::UserResponse,
    },
    db::models::patients::Patient,
    errors::ErrorResponse,
};

pub const DEFAULT_API_URL: &str = "http://localhost:3001";
pub const API_URL_ENV: &str = "CADASTRO_API_URL";

/// Connection options shared by the client subcommands
#[derive(clap::Args, Debug, Clone)]
pub struct ClientArgs {
    /// Base URL of the cadastro server
    #[arg(long, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Where the session token is kept (defaults to the user config directory)
    #[arg(long, env = "CADASTRO_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,
}

impl ClientArgs {
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        match self.token_file.clone().or_else(FileTokenStore::default_location) {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => Arc::new(MemoryTokenStore::new()),
        }
    }

    pub fn client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.api_url, self.token_store())
    }
}

/// Resolve the base URL from an optional override; blank counts as unset.
pub fn resolve_base_url(configured: Option<&str>) -> &str {
    match configured.map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => DEFAULT_API_URL,
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("base_url", &self.base_url.as_str()).finish()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|source| ClientError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            tokens,
        })
    }

    /// Client for `CADASTRO_API_URL`, or the local default when it is unset
    pub fn from_env(tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let configured = std::env::var(API_URL_ENV).ok();
        Self::new(resolve_base_url(configured.as_deref()), tokens)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|source| ClientError::InvalidUrl { url: joined, source })
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match self.tokens.load()? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    /// Turn a non-success response into [`ClientError::Http`], keeping the server's message
    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or_else(|_| match status.canonical_reason() {
                Some(reason) if body.trim().is_empty() => reason.to_string(),
                _ => body,
            });
        debug!(%status, %message, "Request rejected");
        Err(ClientError::Http { status, message })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.authorized(self.http.get(self.url(path)?))?;
        Self::parse(request.send().await?).await
    }

    #[instrument(skip(self, password))]
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthResponse> {
        let body = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.http.post(self.url("/authentication/register")?).json(&body).send().await?;
        let auth: AuthResponse = Self::parse(response).await?;
        self.tokens.save(&auth.token)?;
        Ok(auth)
    }

    /// Log in and keep the returned session token
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.http.post(self.url("/authentication/login")?).json(&body).send().await?;
        let auth: AuthResponse = Self::parse(response).await?;
        self.tokens.save(&auth.token)?;
        Ok(auth)
    }

    /// Forget the stored session token. Tokens are stateless, so there is no server call.
    pub fn logout(&self) -> Result<()> {
        self.tokens.clear()
    }

    pub async fn me(&self) -> Result<UserResponse> {
        if self.tokens.load()?.is_none() {
            return Err(ClientError::NotAuthenticated);
        }
        self.get("/authentication/me").await
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>> {
        self.get("/api/pacientes").await
    }

    pub async fn get_patient(&self, id: &str) -> Result<Patient> {
        let mut url = self.url("/api/pacientes")?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl {
                url: self.base_url.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .push(id);
        let request = self.authorized(self.http.get(url))?;
        Self::parse(request.send().await?).await
    }

    #[instrument(skip_all, fields(entries = form.entries().len()))]
    pub async fn submit_intake(&self, form: IntakeForm) -> Result<IntakeResponse> {
        let request = self.authorized(self.http.post(self.url("/api/pacientes")?))?;
        Self::parse(request.multipart(form.into_multipart()?).send().await?).await
    }

    pub async fn echo_patient(&self, payload: &Value) -> Result<EchoResponse> {
        let request = self.authorized(self.http.post(self.url("/api/paciente")?))?;
        Self::parse(request.json(payload).send().await?).await
    }
}
