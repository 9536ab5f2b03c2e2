//! Resources bound from posted RDF payloads.

use bugzilla::{BugzillaError, NewBug};

/// A person referenced from a change request, usually its reporter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Person {
    pub name: Option<String>,
    /// Mail address without the `mailto:` scheme
    pub mbox: Option<String>,
}

/// An OSLC change request waiting to be filed as a Bugzilla bug.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangeRequest {
    /// Subject URI in the payload; blank nodes have none
    pub about: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub product: Option<String>,
    pub component: Option<String>,
    pub version: Option<String>,
    pub platform: Option<String>,
    pub operating_system: Option<String>,
    pub priority: Option<String>,
    pub severity: Option<String>,
    pub reporter: Option<Person>,
}

impl ChangeRequest {
    /// Converts into `Bug.create` parameters, failing when a required field is missing.
    ///
    /// The reporter can't be set through the remote interface (Bugzilla files the
    /// bug as the authenticated user), so their address goes on the CC list.
    pub fn to_new_bug(&self) -> Result<NewBug, BugzillaError> {
        let mut bug = NewBug {
            product: self.product.clone().unwrap_or_default(),
            component: self.component.clone().unwrap_or_default(),
            summary: self.title.clone().unwrap_or_default(),
            version: self.version.clone().unwrap_or_default(),
            description: self.description.clone(),
            priority: self.priority.clone(),
            severity: self.severity.clone(),
            ..Default::default()
        };

        if let Some(platform) = &self.platform {
            bug.platform = platform.clone();
        }
        if let Some(os) = &self.operating_system {
            bug.op_sys = os.clone();
        }
        if let Some(mbox) = self.reporter.as_ref().and_then(|p| p.mbox.clone()) {
            bug.cc.push(mbox);
        }

        bug.validate()?;
        Ok(bug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change_request() -> ChangeRequest {
        ChangeRequest {
            title: Some("Crash when saving".into()),
            description: Some("Steps: open, save".into()),
            product: Some("Widgets".into()),
            component: Some("Editor".into()),
            version: Some("2.0".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_to_new_bug() {
        let mut cr = change_request();
        cr.operating_system = Some("Linux".into());
        cr.reporter = Some(Person {
            name: Some("Jo".into()),
            mbox: Some("jo@example.org".into()),
        });

        let bug = cr.to_new_bug().unwrap();
        assert_eq!(bug.summary, "Crash when saving");
        assert_eq!(bug.description.as_deref(), Some("Steps: open, save"));
        assert_eq!(bug.op_sys, "Linux");
        assert_eq!(bug.platform, "All");
        assert_eq!(bug.cc, vec!["jo@example.org".to_string()]);
    }

    #[test]
    fn test_missing_title_is_rejected() {
        let mut cr = change_request();
        cr.title = None;
        assert!(matches!(
            cr.to_new_bug(),
            Err(BugzillaError::InvalidDescription(_))
        ));
    }
}
