use crate::collection::CollectionHandler;
use crate::config::Config;
use crate::connector_factory::{ConfiguredConnectorFactory, ConnectorFactory};
use crate::errors::{CmError, Result};
use crate::metrics_defs::{REQUEST_DURATION, REQUESTS_INFLIGHT};
use bugzilla::JsonRpcConnector;
use http::header::{ALLOW, HeaderValue};
use http_body_util::BodyExt;
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use shared::admin_service::AdminService;
use shared::http::{full_body, make_boxed_error_response, run_http_service};
use shared::{gauge, histogram};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Serves the change request collection at `<path_prefix>/changerequests`.
#[derive(Clone)]
pub struct CmService {
    collection: Arc<CollectionHandler>,
    collection_path: Arc<str>,
}

impl CmService {
    pub fn new(config: &Config, connectors: Arc<dyn ConnectorFactory>) -> Self {
        CmService {
            collection: Arc::new(CollectionHandler::new(config, connectors)),
            collection_path: format!("{}/changerequests", config.path_prefix).into(),
        }
    }

    /// Routes a request whose body was already read. Never fails: errors become
    /// status responses here.
    pub async fn dispatch(&self, request: Request<Bytes>) -> Response<BoxBody<Bytes, CmError>> {
        let result = if request.uri().path() != &*self.collection_path {
            Err(CmError::NotFound(request.uri().path().to_owned()))
        } else {
            match *request.method() {
                Method::GET => self.collection.get(&request).await,
                // Same headers as GET, no body
                Method::HEAD => self
                    .collection
                    .get(&request)
                    .await
                    .map(|response| response.map(|_| Bytes::new())),
                Method::POST => self.collection.post(&request).await,
                _ => Err(CmError::MethodNotAllowed),
            }
        };

        match result {
            Ok(response) => response.map(|body| full_body(body)),
            Err(e) => error_response(request.method(), e),
        }
    }
}

fn error_response(method: &Method, e: CmError) -> Response<BoxBody<Bytes, CmError>> {
    let status = e.status();
    if status.is_server_error() {
        tracing::error!(error = %e, %method, "request failed");
    } else {
        tracing::debug!(error = %e, %method, status = status.as_u16(), "request rejected");
    }

    let mut response = make_boxed_error_response(status);
    if status == StatusCode::METHOD_NOT_ALLOWED {
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static("GET, HEAD, POST"));
    }
    response
}

impl Service<Request<Incoming>> for CmService {
    type Response = Response<BoxBody<Bytes, Self::Error>>;
    type Error = CmError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let service = self.clone();

        Box::pin(async move {
            let start = Instant::now();
            let method = req.method().clone();
            gauge!(REQUESTS_INFLIGHT).increment(1.0);

            let (parts, body) = req.into_parts();
            let response = match body.collect().await {
                Ok(collected) => {
                    service
                        .dispatch(Request::from_parts(parts, collected.to_bytes()))
                        .await
                }
                Err(e) => error_response(&method, CmError::RequestBody(e.to_string())),
            };

            gauge!(REQUESTS_INFLIGHT).decrement(1.0);
            histogram!(REQUEST_DURATION,
                "method" => method.to_string(),
                "status" => response.status().as_str().to_owned()
            )
            .record(start.elapsed().as_secs_f64());

            Ok(response)
        })
    }
}

/// Runs the change request service and the admin probes until either listener fails.
pub async fn run(config: Config) -> Result<()> {
    config.validate()?;

    let credentials = config
        .bugzilla
        .credentials
        .as_ref()
        .map(|credentials| credentials.to_credentials())
        .transpose()?;
    let connector = JsonRpcConnector::new(
        &config.bugzilla.url,
        credentials,
        Duration::from_secs(config.bugzilla.timeout_secs),
    )?;
    tracing::info!(bugzilla = %connector.endpoint(), base_uri = %config.base_uri, "starting OSLC change management service");

    let service = CmService::new(&config, Arc::new(ConfiguredConnectorFactory::new(connector)));
    let admin = AdminService::<_, CmError>::new(|| true);

    let cm_task = run_http_service(&config.listener.host, config.listener.port, service);
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        admin,
    );

    tokio::try_join!(cm_task, admin_task)?;
    Ok(())
}
