//! The change request collection resource.
//!
//! `GET` lists the change requests of one Bugzilla product, one page at a time.
//! `POST` files every change request found in an RDF payload as a new bug.
//!
//! # Paging
//!
//! Bugzilla can't cheaply count search results, so a page asks for one record
//! more than it shows. If the extra record arrives there is a next page.
//!
//! ```text
//! GET ?productId=7&page=1      (page size 20)
//!   Product.get  {ids: [7]}
//!   Bug.search   {product: "Widgets", offset: 20, limit: 21}
//!   21 bugs back → render 20, nextPage = ...&oslc.paging=true&page=2
//! ```
//!
//! # Creation
//!
//! Change requests are filed one after another in document order. The first
//! failure aborts the request with a server error; bugs filed before it stay in
//! Bugzilla and are only reported in the logs.

use crate::config::Config;
use crate::connector_factory::ConnectorFactory;
use crate::errors::{CmError, Result};
use crate::metrics_defs::CHANGE_REQUESTS_CREATED;
use crate::negotiate::{RdfSyntax, select_collection_format};
use crate::rdf::read_change_requests;
use crate::resources::ChangeRequest;
use crate::urls::UrlStrategy;
use crate::views::{ChangeRequestView, CollectionView, render_collection};
use bugzilla::{BugId, BugSearch, BugzillaConnector, BugzillaError, Product, ProductId};
use http::header::{CONTENT_TYPE, HeaderName, LOCATION};
use http::{Request, Response, StatusCode};
use hyper::body::Bytes;
use shared::counter;
use std::sync::Arc;

pub const OSLC_CORE_VERSION: HeaderName = HeaderName::from_static("oslc-core-version");
pub const OSLC_VERSION: &str = "2.0";

pub struct CollectionHandler {
    connectors: Arc<dyn ConnectorFactory>,
    urls: UrlStrategy,
    bugzilla_uri: String,
    provide_html: bool,
    page_size: u32,
}

/// Query parameters of a collection `GET`.
#[derive(Debug, PartialEq)]
struct CollectionParams {
    product_id: ProductId,
    page: u32,
}

impl CollectionParams {
    fn parse(query: Option<&str>) -> Result<Self> {
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.unwrap_or("").as_bytes())
            .into_owned()
            .collect();
        // First occurrence wins for repeated parameters
        let param = |name: &str| pairs.iter().find(|(key, _)| key == name).map(|(_, v)| v.as_str());

        let product_id = param("productId")
            .ok_or_else(|| CmError::NotFound("missing productId".into()))?
            .trim()
            .parse()
            .map_err(|_| CmError::NotFound("invalid productId".into()))?;

        let page = match param("page") {
            Some(page) => page
                .trim()
                .parse()
                .map_err(|_| CmError::NotFound("invalid page".into()))?,
            None => 0,
        };

        Ok(CollectionParams { product_id, page })
    }
}

impl CollectionHandler {
    pub fn new(config: &Config, connectors: Arc<dyn ConnectorFactory>) -> Self {
        CollectionHandler {
            connectors,
            urls: UrlStrategy::new(&config.base_uri),
            bugzilla_uri: config.bugzilla.url.to_string(),
            provide_html: config.provide_html,
            page_size: config.page_size,
        }
    }

    pub async fn get(&self, request: &Request<Bytes>) -> Result<Response<Bytes>> {
        let (connector, product, page, offset) =
            self.resolve_product(request).await.map_err(|e| {
                tracing::debug!(error = %e, query = ?request.uri().query(), "product lookup failed");
                match e {
                    CmError::NotFound(_) => e,
                    other => CmError::NotFound(other.to_string()),
                }
            })?;

        let format = select_collection_format(request.headers(), self.provide_html)
            .ok_or(CmError::UnsupportedMediaType)?;

        let search = BugSearch {
            product: product.name.clone(),
            limit: self.page_size.saturating_add(1),
            offset,
        };
        let mut bugs = connector.search_bugs(&search).await?;

        let page_size = self.page_size as usize;
        let next_page_uri = if bugs.len() > page_size {
            bugs.truncate(page_size);
            Some(self.urls.next_page_url(product.id, page.saturating_add(1)))
        } else {
            None
        };

        let results = bugs
            .into_iter()
            .map(|bug| ChangeRequestView {
                uri: self.urls.change_request_url(bug.id),
                bug,
            })
            .collect();

        let view = CollectionView {
            bugzilla_uri: self.bugzilla_uri.clone(),
            collection_uri: self.urls.change_request_collection_url(product.id),
            query_uri: self.urls.query_url(product.id),
            next_page_uri,
            results,
            product,
        };

        tracing::debug!(
            product = %view.product.name,
            page,
            count = view.results.len(),
            has_next = view.next_page_uri.is_some(),
            "listing change requests"
        );

        let body = render_collection(format, &view)?;

        Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, format.content_type())
            .header(OSLC_CORE_VERSION, OSLC_VERSION)
            .body(Bytes::from(body))
            .map_err(|e| CmError::Internal(format!("Failed to build response: {e}")))
    }

    /// Everything a `GET` must settle before it can be answered with anything but 404.
    async fn resolve_product(
        &self,
        request: &Request<Bytes>,
    ) -> Result<(Arc<dyn BugzillaConnector>, Product, u32, u32)> {
        let connector = self.connectors.connector(request.headers())?;
        let params = CollectionParams::parse(request.uri().query())?;
        let offset = params
            .page
            .checked_mul(self.page_size)
            .ok_or_else(|| CmError::NotFound("page out of range".into()))?;

        let product = connector
            .get_products(&[params.product_id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CmError::NotFound(format!("no product {}", params.product_id)))?;

        Ok((connector, product, params.page, offset))
    }

    pub async fn post(&self, request: &Request<Bytes>) -> Result<Response<Bytes>> {
        let syntax = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(RdfSyntax::from_content_type)
            .ok_or(CmError::UnsupportedMediaType)?;

        let change_requests =
            read_change_requests(request.body(), syntax, &self.urls.change_request_base())?;
        if change_requests.is_empty() {
            return Err(CmError::BadRequest("no change request in payload".into()));
        }

        let connector = self.connectors.connector(request.headers())?;

        let mut locations = Vec::with_capacity(change_requests.len());
        for change_request in &change_requests {
            match file_change_request(connector.as_ref(), change_request).await {
                Ok(bug_id) => {
                    counter!(CHANGE_REQUESTS_CREATED).increment(1);
                    locations.push(self.urls.change_request_url(bug_id));
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        about = ?change_request.about,
                        created = ?locations,
                        "failed to file change request, already filed ones are kept"
                    );
                    return Err(e.into());
                }
            }
        }

        let mut response = Response::builder()
            .status(StatusCode::CREATED)
            .header(OSLC_CORE_VERSION, OSLC_VERSION);
        for location in &locations {
            response = response.header(LOCATION, location.as_str());
        }

        response
            .body(Bytes::new())
            .map_err(|e| CmError::Internal(format!("Failed to build response: {e}")))
    }
}

async fn file_change_request(
    connector: &dyn BugzillaConnector,
    change_request: &ChangeRequest,
) -> std::result::Result<BugId, BugzillaError> {
    let bug = change_request.to_new_bug()?;
    connector.report_bug(&bug).await
}
