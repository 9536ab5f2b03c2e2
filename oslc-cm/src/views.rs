//! View models and templates for the change request collection.

use crate::negotiate::CollectionFormat;
use askama::Template;
use bugzilla::{Bug, Product};

/// A fetched bug paired with the URI it is published under.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeRequestView {
    pub uri: String,
    pub bug: Bug,
}

impl ChangeRequestView {
    pub fn status(&self) -> &str {
        self.bug.status.as_deref().unwrap_or_default()
    }

    pub fn resolution(&self) -> &str {
        self.bug.resolution.as_deref().unwrap_or_default()
    }

    pub fn priority(&self) -> &str {
        self.bug.priority.as_deref().unwrap_or_default()
    }

    pub fn severity(&self) -> &str {
        self.bug.severity.as_deref().unwrap_or_default()
    }

    pub fn component(&self) -> &str {
        self.bug.component.as_deref().unwrap_or_default()
    }

    pub fn version(&self) -> &str {
        self.bug.version.as_deref().unwrap_or_default()
    }

    pub fn platform(&self) -> &str {
        self.bug.platform.as_deref().unwrap_or_default()
    }

    pub fn op_sys(&self) -> &str {
        self.bug.op_sys.as_deref().unwrap_or_default()
    }

    pub fn creator(&self) -> &str {
        self.bug.creator.as_deref().unwrap_or_default()
    }

    pub fn created(&self) -> &str {
        self.bug.creation_time.as_deref().unwrap_or_default()
    }

    pub fn modified(&self) -> &str {
        self.bug.last_change_time.as_deref().unwrap_or_default()
    }
}

/// One page of a product's change requests.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionView {
    pub product: Product,
    pub bugzilla_uri: String,
    pub collection_uri: String,
    pub query_uri: String,
    pub next_page_uri: Option<String>,
    pub results: Vec<ChangeRequestView>,
}

#[derive(Template)]
#[template(path = "changerequest_collection.html")]
struct HtmlCollection<'a> {
    view: &'a CollectionView,
}

#[derive(Template)]
#[template(path = "changerequest_collection.rdf", escape = "html")]
struct RdfXmlCollection<'a> {
    view: &'a CollectionView,
}

pub fn render_collection(
    format: CollectionFormat,
    view: &CollectionView,
) -> Result<String, askama::Error> {
    match format {
        CollectionFormat::Html => HtmlCollection { view }.render(),
        CollectionFormat::RdfXml => RdfXmlCollection { view }.render(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(next_page_uri: Option<String>) -> CollectionView {
        CollectionView {
            product: Product {
                id: 7,
                name: "Widgets & Gadgets".into(),
                description: None,
            },
            bugzilla_uri: "https://bugs.example.org/".into(),
            collection_uri: "http://localhost/changerequests?productId=7".into(),
            query_uri: "http://localhost/changerequests?productId=7&oslc.paging=true".into(),
            next_page_uri,
            results: vec![ChangeRequestView {
                uri: "http://localhost/changerequest?id=1".into(),
                bug: Bug {
                    id: 1,
                    summary: "Crash <on> save".into(),
                    status: Some("NEW".into()),
                    ..Default::default()
                },
            }],
        }
    }

    #[test]
    fn test_rdfxml_is_escaped() {
        let body = render_collection(CollectionFormat::RdfXml, &view(None)).unwrap();

        assert!(body.starts_with("<?xml"));
        assert!(body.contains("Crash &lt;on&gt; save"));
        assert!(body.contains("productId=7&amp;oslc.paging=true"));
        assert!(body.contains("<oslc_cm:status>NEW</oslc_cm:status>"));
        assert!(!body.contains("oslc:nextPage"));
    }

    #[test]
    fn test_rdfxml_next_page() {
        let next = "http://localhost/changerequests?productId=7&oslc.paging=true&page=1";
        let body = render_collection(CollectionFormat::RdfXml, &view(Some(next.into()))).unwrap();
        assert!(body.contains(
            "<oslc:nextPage rdf:resource=\"http://localhost/changerequests?productId=7&amp;oslc.paging=true&amp;page=1\"/>"
        ));
    }

    #[test]
    fn test_html() {
        let body = render_collection(CollectionFormat::Html, &view(None)).unwrap();
        assert!(body.contains("Widgets &amp; Gadgets"));
        assert!(body.contains("href=\"http://localhost/changerequest?id=1\""));
        assert!(!body.contains("Next page"));
    }
}
