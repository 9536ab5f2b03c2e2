use crate::errors::{CmError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bugzilla::{BugzillaConnector, Credentials, JsonRpcConnector};
use http::HeaderMap;
use http::header::AUTHORIZATION;
use std::sync::Arc;

/// Hands out the Bugzilla session a request should use.
pub trait ConnectorFactory: Send + Sync {
    fn connector(&self, headers: &HeaderMap) -> Result<Arc<dyn BugzillaConnector>>;
}

/// Uses the caller's HTTP Basic credentials when present, the configured
/// identity otherwise.
pub struct ConfiguredConnectorFactory {
    base: JsonRpcConnector,
}

impl ConfiguredConnectorFactory {
    pub fn new(base: JsonRpcConnector) -> Self {
        Self { base }
    }
}

impl ConnectorFactory for ConfiguredConnectorFactory {
    fn connector(&self, headers: &HeaderMap) -> Result<Arc<dyn BugzillaConnector>> {
        match basic_credentials(headers)? {
            Some(credentials) => Ok(Arc::new(self.base.with_credentials(Some(credentials)))),
            None => Ok(Arc::new(self.base.clone())),
        }
    }
}

/// Decodes `Authorization: Basic ...`. Other schemes are left alone.
fn basic_credentials(headers: &HeaderMap) -> Result<Option<Credentials>> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let malformed = || CmError::BadRequest("malformed Authorization header".into());

    let value = value.to_str().map_err(|_| malformed())?;
    let Some((scheme, encoded)) = value.trim().split_once(' ') else {
        return Err(malformed());
    };
    if !scheme.eq_ignore_ascii_case("basic") {
        return Ok(None);
    }

    let decoded = STANDARD.decode(encoded.trim()).map_err(|_| malformed())?;
    let decoded = String::from_utf8(decoded).map_err(|_| malformed())?;
    let (login, password) = decoded.split_once(':').ok_or_else(malformed)?;

    Ok(Some(Credentials::Login {
        login: login.to_string(),
        password: password.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn with_auth(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_basic_credentials() {
        // "admin@example.org:pa:ss"
        let headers = with_auth("Basic YWRtaW5AZXhhbXBsZS5vcmc6cGE6c3M=");
        assert_eq!(
            basic_credentials(&headers).unwrap(),
            Some(Credentials::Login {
                login: "admin@example.org".into(),
                password: "pa:ss".into(),
            })
        );
    }

    #[test]
    fn test_no_or_other_credentials() {
        assert_eq!(basic_credentials(&HeaderMap::new()).unwrap(), None);
        assert_eq!(
            basic_credentials(&with_auth("Bearer abc.def")).unwrap(),
            None
        );
    }

    #[test]
    fn test_malformed_credentials() {
        assert!(matches!(
            basic_credentials(&with_auth("Basic !!!")),
            Err(CmError::BadRequest(_))
        ));
        // "nocolon"
        assert!(matches!(
            basic_credentials(&with_auth("Basic bm9jb2xvbg==")),
            Err(CmError::BadRequest(_))
        ));
    }
}
