use crate::errors::BugzillaError;
use crate::types::{Bug, BugId, BugSearch, NewBug, Product, ProductId};
use async_trait::async_trait;

/// A session against one Bugzilla server.
///
/// Implementations own authentication and transport; every call is independent
/// and may be issued concurrently from different requests.
#[async_trait]
pub trait BugzillaConnector: Send + Sync {
    /// Files a new bug and returns its id.
    async fn report_bug(&self, bug: &NewBug) -> Result<BugId, BugzillaError>;

    /// Returns at most `search.limit` bugs of `search.product`, skipping `search.offset`.
    async fn search_bugs(&self, search: &BugSearch) -> Result<Vec<Bug>, BugzillaError>;

    async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, BugzillaError>;
}
