use crate::config::{BugzillaConfig, Config, Listener};
use crate::connector_factory::ConnectorFactory;
use crate::errors::Result;
use async_trait::async_trait;
use bugzilla::{
    Bug, BugId, BugSearch, BugzillaConnector, BugzillaError, NewBug, Product, ProductId,
};
use http::HeaderMap;
use std::sync::{Arc, Mutex};
use url::Url;

pub const BASE_IRI: &str = "http://localhost:8080/bugz/changerequest";

/// Two change requests: a named one with a reporter, then a blank node without.
pub const TWO_CHANGE_REQUESTS_RDFXML: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF
    xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
    xmlns:dcterms="http://purl.org/dc/terms/"
    xmlns:foaf="http://xmlns.com/foaf/0.1/"
    xmlns:oslc_cm="http://open-services.net/ns/cm#"
    xmlns:bugz="http://www.bugzilla.org/rdf#">
  <oslc_cm:ChangeRequest rdf:about="#first">
    <dcterms:title>First problem</dcterms:title>
    <dcterms:description>Crashes on save</dcterms:description>
    <bugz:product>Widgets</bugz:product>
    <bugz:component>Editor</bugz:component>
    <bugz:version>1.0</bugz:version>
    <bugz:opsys>Linux</bugz:opsys>
    <dcterms:creator>
      <foaf:Person>
        <foaf:name>Jo Doe</foaf:name>
        <foaf:mbox rdf:resource="mailto:jo@example.org"/>
      </foaf:Person>
    </dcterms:creator>
  </oslc_cm:ChangeRequest>
  <oslc_cm:ChangeRequest>
    <dcterms:title>Second problem</dcterms:title>
    <bugz:product>Widgets</bugz:product>
    <bugz:component>Core</bugz:component>
    <bugz:version>unspecified</bugz:version>
  </oslc_cm:ChangeRequest>
</rdf:RDF>
"##;

pub fn test_config() -> Config {
    Config {
        listener: Listener {
            host: "127.0.0.1".into(),
            port: 8080,
        },
        admin_listener: Listener {
            host: "127.0.0.1".into(),
            port: 8081,
        },
        base_uri: Url::parse("http://localhost:8080/bugz").unwrap(),
        path_prefix: "/bugz".into(),
        provide_html: true,
        page_size: 20,
        bugzilla: BugzillaConfig {
            url: Url::parse("https://bugs.example.org/").unwrap(),
            timeout_secs: 30,
            credentials: None,
        },
    }
}

/// Bugs numbered from 1, all `NEW`.
pub fn make_bugs(count: u64) -> Vec<Bug> {
    (1..=count)
        .map(|id| Bug {
            id,
            summary: format!("Bug {id}"),
            status: Some("NEW".into()),
            product: Some("Widgets".into()),
            ..Default::default()
        })
        .collect()
}

/// In-memory Bugzilla that knows one product (7, "Widgets") and records every call.
pub struct MockBugzilla {
    pub products: Vec<Product>,
    /// Every product's bugs; searches page through them by offset and limit
    pub bugs: Vec<Bug>,
    pub fail_products: bool,
    pub fail_search: bool,
    /// Filing fails once this many bugs were filed
    pub fail_report_after: Option<usize>,
    reported: Mutex<Vec<NewBug>>,
    searches: Mutex<Vec<BugSearch>>,
}

impl Default for MockBugzilla {
    fn default() -> Self {
        MockBugzilla {
            products: vec![Product {
                id: 7,
                name: "Widgets".into(),
                description: None,
            }],
            bugs: Vec::new(),
            fail_products: false,
            fail_search: false,
            fail_report_after: None,
            reported: Mutex::new(Vec::new()),
            searches: Mutex::new(Vec::new()),
        }
    }
}

impl MockBugzilla {
    pub fn with_bugs(bugs: Vec<Bug>) -> Self {
        MockBugzilla {
            bugs,
            ..Default::default()
        }
    }

    pub fn reported(&self) -> Vec<NewBug> {
        self.reported.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<BugSearch> {
        self.searches.lock().unwrap().clone()
    }

    fn fault() -> BugzillaError {
        BugzillaError::Fault {
            code: 51,
            message: "mock failure".into(),
        }
    }
}

#[async_trait]
impl BugzillaConnector for MockBugzilla {
    async fn report_bug(&self, bug: &NewBug) -> std::result::Result<BugId, BugzillaError> {
        bug.validate()?;
        let mut reported = self.reported.lock().unwrap();
        if self.fail_report_after.is_some_and(|n| reported.len() >= n) {
            return Err(Self::fault());
        }
        reported.push(bug.clone());
        Ok(999 + reported.len() as BugId)
    }

    async fn search_bugs(&self, search: &BugSearch) -> std::result::Result<Vec<Bug>, BugzillaError> {
        self.searches.lock().unwrap().push(search.clone());
        if self.fail_search {
            return Err(Self::fault());
        }
        Ok(self
            .bugs
            .iter()
            .skip(search.offset as usize)
            .take(search.limit as usize)
            .cloned()
            .collect())
    }

    async fn get_products(
        &self,
        ids: &[ProductId],
    ) -> std::result::Result<Vec<Product>, BugzillaError> {
        if self.fail_products {
            return Err(Self::fault());
        }
        Ok(self
            .products
            .iter()
            .filter(|product| ids.contains(&product.id))
            .cloned()
            .collect())
    }
}

/// Hands out the same mock regardless of the request.
pub struct StaticConnectorFactory(pub Arc<MockBugzilla>);

impl ConnectorFactory for StaticConnectorFactory {
    fn connector(&self, _headers: &HeaderMap) -> Result<Arc<dyn BugzillaConnector>> {
        let connector: Arc<dyn BugzillaConnector> = self.0.clone();
        Ok(connector)
    }
}
