//! Client side of the Bugzilla remote procedure interface.
//!
//! The service only needs three procedures: filing a bug, searching bugs and
//! fetching products. They are exposed through the [`BugzillaConnector`] trait so
//! callers can swap the JSON-RPC transport for an in-memory one.

pub mod connector;
pub mod errors;
pub mod jsonrpc;
pub mod metrics_defs;
pub mod types;

pub use connector::BugzillaConnector;
pub use errors::BugzillaError;
pub use jsonrpc::{Credentials, JsonRpcConnector};
pub use types::{Bug, BugId, BugSearch, NewBug, Product, ProductId};
