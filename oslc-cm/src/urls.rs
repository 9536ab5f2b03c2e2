use bugzilla::{BugId, ProductId};
use url::Url;

/// Maps Bugzilla identifiers to the canonical URIs this service publishes.
#[derive(Clone, Debug)]
pub struct UrlStrategy {
    base: String,
}

impl UrlStrategy {
    pub fn new(base_uri: &Url) -> Self {
        UrlStrategy {
            base: base_uri.as_str().trim_end_matches('/').to_string(),
        }
    }

    /// Base IRI used to resolve relative references in posted payloads.
    pub fn change_request_base(&self) -> String {
        format!("{}/changerequest", self.base)
    }

    pub fn change_request_url(&self, bug_id: BugId) -> String {
        format!("{}/changerequest?id={bug_id}", self.base)
    }

    pub fn change_request_collection_url(&self, product_id: ProductId) -> String {
        format!("{}/changerequests?productId={product_id}", self.base)
    }

    pub fn query_url(&self, product_id: ProductId) -> String {
        format!(
            "{}&oslc.paging=true",
            self.change_request_collection_url(product_id)
        )
    }

    pub fn next_page_url(&self, product_id: ProductId, page: u32) -> String {
        format!("{}&page={page}", self.query_url(product_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let urls = UrlStrategy::new(&Url::parse("http://localhost:8080/bugz/").unwrap());

        assert_eq!(
            urls.change_request_base(),
            "http://localhost:8080/bugz/changerequest"
        );
        assert_eq!(
            urls.change_request_url(42),
            "http://localhost:8080/bugz/changerequest?id=42"
        );
        assert_eq!(
            urls.change_request_collection_url(7),
            "http://localhost:8080/bugz/changerequests?productId=7"
        );
        assert_eq!(
            urls.query_url(7),
            "http://localhost:8080/bugz/changerequests?productId=7&oslc.paging=true"
        );
        assert_eq!(
            urls.next_page_url(7, 2),
            "http://localhost:8080/bugz/changerequests?productId=7&oslc.paging=true&page=2"
        );
    }

    #[test]
    fn test_host_only_base() {
        // Url normalizes an empty path to "/"
        let urls = UrlStrategy::new(&Url::parse("http://bugs.example.org").unwrap());
        assert_eq!(
            urls.change_request_url(1),
            "http://bugs.example.org/changerequest?id=1"
        );
    }
}
