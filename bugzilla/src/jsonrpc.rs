use crate::connector::BugzillaConnector;
use crate::errors::BugzillaError;
use crate::metrics_defs::{RPC_DURATION, RPC_FAILURES};
use crate::types::{Bug, BugId, BugSearch, NewBug, Product, ProductId};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue, json};
use shared::{counter, histogram};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use url::Url;

const ENDPOINT: &str = "jsonrpc.cgi";

/// How a connector authenticates against Bugzilla.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    ApiKey(String),
    Login { login: String, password: String },
}

impl Credentials {
    fn apply(&self, params: &mut Map<String, JsonValue>) {
        match self {
            Credentials::ApiKey(key) => {
                params.insert("Bugzilla_api_key".into(), key.clone().into());
            }
            Credentials::Login { login, password } => {
                params.insert("Bugzilla_login".into(), login.clone().into());
                params.insert("Bugzilla_password".into(), password.clone().into());
            }
        }
    }
}

// Never print secrets in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ApiKey(_) => f.write_str("ApiKey(..)"),
            Credentials::Login { login, .. } => write!(f, "Login({login})"),
        }
    }
}

#[derive(Deserialize)]
struct RpcEnvelope<R> {
    result: Option<R>,
    error: Option<RpcFault>,
}

#[derive(Deserialize)]
struct RpcFault {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct CreatedBug {
    id: BugId,
}

#[derive(Deserialize)]
struct SearchResult {
    bugs: Vec<Bug>,
}

#[derive(Deserialize)]
struct ProductsResult {
    products: Vec<Product>,
}

/// [`BugzillaConnector`] talking to `<bugzilla>/jsonrpc.cgi`.
///
/// Cheap to clone; clones share the underlying HTTP connection pool.
#[derive(Clone, Debug)]
pub struct JsonRpcConnector {
    client: reqwest::Client,
    endpoint: Url,
    credentials: Option<Credentials>,
    next_id: std::sync::Arc<AtomicU64>,
}

impl JsonRpcConnector {
    pub fn new(
        bugzilla_url: &Url,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self, BugzillaError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, bugzilla_url, credentials)
    }

    /// Builds a connector reusing an existing HTTP client.
    pub fn with_client(
        client: reqwest::Client,
        bugzilla_url: &Url,
        credentials: Option<Credentials>,
    ) -> Result<Self, BugzillaError> {
        let mut base = bugzilla_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(JsonRpcConnector {
            client,
            endpoint: base.join(ENDPOINT)?,
            credentials,
            next_id: Default::default(),
        })
    }

    /// Same server and pool, different identity.
    pub fn with_credentials(&self, credentials: Option<Credentials>) -> Self {
        JsonRpcConnector {
            credentials,
            ..self.clone()
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn call<P, R>(&self, method: &'static str, params: P) -> Result<R, BugzillaError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let start = Instant::now();
        let result = self.send(method, params).await;
        histogram!(RPC_DURATION, "method" => method).record(start.elapsed().as_secs_f64());

        if let Err(e) = &result {
            counter!(RPC_FAILURES, "method" => method).increment(1);
            tracing::warn!(method, error = %e, "Bugzilla call failed");
        }
        result
    }

    async fn send<P, R>(&self, method: &'static str, params: P) -> Result<R, BugzillaError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let mut params = serde_json::to_value(params)?;
        if let (Some(credentials), JsonValue::Object(map)) = (&self.credentials, &mut params) {
            credentials.apply(map);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "method": method,
            "params": [params],
            "id": id,
        });

        tracing::debug!(method, id, "calling Bugzilla");
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        // Bugzilla reports faults inside a JSON envelope, sometimes with a non-2xx status.
        let envelope: RpcEnvelope<R> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(BugzillaError::UnexpectedStatus(status.as_u16()));
            }
            Err(e) => return Err(e.into()),
        };

        match envelope {
            RpcEnvelope {
                error: Some(fault), ..
            } => Err(BugzillaError::Fault {
                code: fault.code,
                message: fault.message,
            }),
            RpcEnvelope {
                result: Some(result),
                ..
            } => Ok(result),
            RpcEnvelope { .. } => Err(BugzillaError::InvalidResponse(format!(
                "{method} returned neither result nor error"
            ))),
        }
    }
}

#[async_trait]
impl BugzillaConnector for JsonRpcConnector {
    async fn report_bug(&self, bug: &NewBug) -> Result<BugId, BugzillaError> {
        bug.validate()?;
        let created: CreatedBug = self.call("Bug.create", bug).await?;
        tracing::info!(bug_id = created.id, product = %bug.product, "filed bug");
        Ok(created.id)
    }

    async fn search_bugs(&self, search: &BugSearch) -> Result<Vec<Bug>, BugzillaError> {
        let found: SearchResult = self.call("Bug.search", search).await?;
        Ok(found.bugs)
    }

    async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, BugzillaError> {
        let found: ProductsResult = self.call("Product.get", json!({ "ids": ids })).await?;
        Ok(found.products)
    }
}
