use crate::errors::BugzillaError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

pub type BugId = u64;
pub type ProductId = u32;

/// Platform and operating system used when a new bug doesn't name one.
pub const DEFAULT_HARDWARE: &str = "All";

/// A bug as returned by `Bug.search`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Bug {
    pub id: BugId,
    #[serde(default)]
    pub summary: String,
    pub status: Option<String>,
    pub resolution: Option<String>,
    pub priority: Option<String>,
    pub severity: Option<String>,
    pub product: Option<String>,
    pub component: Option<String>,
    pub version: Option<String>,
    pub platform: Option<String>,
    pub op_sys: Option<String>,
    pub creator: Option<String>,
    pub assigned_to: Option<String>,
    pub creation_time: Option<String>,
    pub last_change_time: Option<String>,
    /// Every other field Bugzilla sent back, untouched.
    #[serde(flatten)]
    pub extra: HashMap<String, JsonValue>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Search criteria for `Bug.search`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct BugSearch {
    pub product: String,
    pub limit: u32,
    pub offset: u32,
}

/// Parameters of `Bug.create`.
///
/// Build it field by field and call [`NewBug::validate`] before filing; Bugzilla
/// rejects bugs without product, component, summary or version.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewBug {
    pub product: String,
    pub component: String,
    pub summary: String,
    pub version: String,
    pub op_sys: String,
    pub platform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
}

impl Default for NewBug {
    fn default() -> Self {
        NewBug {
            product: String::new(),
            component: String::new(),
            summary: String::new(),
            version: String::new(),
            op_sys: DEFAULT_HARDWARE.into(),
            platform: DEFAULT_HARDWARE.into(),
            description: None,
            priority: None,
            severity: None,
            cc: Vec::new(),
        }
    }
}

impl NewBug {
    pub fn validate(&self) -> Result<(), BugzillaError> {
        let required = [
            ("product", &self.product),
            ("component", &self.component),
            ("summary", &self.summary),
            ("version", &self.version),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(BugzillaError::InvalidDescription(format!(
                    "missing {field}"
                )));
            }
        }
        Ok(())
    }
}
