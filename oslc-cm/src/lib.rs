//! OSLC change management provider backed by Bugzilla.
//!
//! Publishes each Bugzilla product as a change request collection: `GET` pages
//! through its bugs as HTML or RDF/XML, `POST` files the change requests of an
//! RDF/XML or Turtle payload as new bugs.

pub mod collection;
pub mod config;
pub mod connector_factory;
pub mod errors;
pub mod metrics_defs;
pub mod negotiate;
pub mod rdf;
pub mod resources;
pub mod service;
pub mod urls;
pub mod views;

#[cfg(test)]
mod testutils;

pub use errors::CmError;
pub use service::{CmService, run};
