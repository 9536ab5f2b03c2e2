use bugzilla::Credentials;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Page size cannot be 0")]
    InvalidPageSize,

    #[error("Path prefix must start with '/' and must not end with '/': {0}")]
    InvalidPathPrefix(String),

    #[error("Base URI must be http or https: {0}")]
    InvalidBaseUri(String),

    #[error("Credentials need either api_key or both login and password")]
    InvalidCredentials,
}

/// OSLC change management service configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Main listener for OSLC requests
    pub listener: Listener,
    /// Admin listener for health and readiness probes
    pub admin_listener: Listener,
    /// Public base URI all resource URIs are built from
    /// (e.g. "http://localhost:8080/bugz")
    pub base_uri: Url,
    /// Path under which the service is mounted. Empty means the root.
    #[serde(default)]
    pub path_prefix: String,
    /// Whether browsers asking for text/html get a rendered page
    #[serde(default = "default_provide_html")]
    pub provide_html: bool,
    /// Number of change requests per collection page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub bugzilla: BugzillaConfig,
}

fn default_provide_html() -> bool {
    true
}

fn default_page_size() -> u32 {
    20
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if self.page_size == 0 {
            return Err(ValidationError::InvalidPageSize);
        }

        if !self.path_prefix.is_empty()
            && (!self.path_prefix.starts_with('/') || self.path_prefix.ends_with('/'))
        {
            return Err(ValidationError::InvalidPathPrefix(self.path_prefix.clone()));
        }

        if !matches!(self.base_uri.scheme(), "http" | "https") {
            return Err(ValidationError::InvalidBaseUri(self.base_uri.to_string()));
        }

        if let Some(credentials) = &self.bugzilla.credentials {
            credentials.to_credentials()?;
        }

        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Where and how to reach Bugzilla
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BugzillaConfig {
    /// Bugzilla installation root, the JSON-RPC endpoint lives below it
    pub url: Url,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Identity used when a request carries no credentials of its own
    pub credentials: Option<CredentialsConfig>,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Clone, Deserialize, PartialEq)]
pub struct CredentialsConfig {
    pub api_key: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

impl CredentialsConfig {
    pub fn to_credentials(&self) -> Result<Credentials, ValidationError> {
        match (&self.api_key, &self.login, &self.password) {
            (Some(key), None, None) => Ok(Credentials::ApiKey(key.clone())),
            (None, Some(login), Some(password)) => Ok(Credentials::Login {
                login: login.clone(),
                password: password.clone(),
            }),
            _ => Err(ValidationError::InvalidCredentials),
        }
    }
}
