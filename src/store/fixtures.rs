//! Seed data for the in-memory store
//!
//! A fixture file holds live and archived opportunities, live and archived
//! interests, and named sessions. JSON and TOML are accepted, chosen by file extension.
//!
//! ```json
//! {
//!   "opportunities": [{"_id": "o0", "requestor": "p1", "offerOrg": "org0"}],
//!   "interests": [{"_id": "i0", "person": "p2", "opportunity": "o0", "status": "interested"}],
//!   "sessions": {"p2": {"identity": "p2", "roles": ["volunteer"]}}
//! }
//! ```

use crate::ability::Session;
use crate::error::ConfigError;
use crate::model::{Interest, Opportunity};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Fixtures {
    pub opportunities: Vec<Opportunity>,
    pub archived_opportunities: Vec<Opportunity>,
    pub interests: Vec<Interest>,
    pub archived_interests: Vec<Interest>,
    pub sessions: HashMap<String, Session>,
}

impl Fixtures {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(|e| ConfigError::Load(format!("fixtures: {}", e)))
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Load(format!("fixtures: {}", e)))
    }

    /// Load fixtures, picking the format from the extension (`.toml`, else JSON)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// Look up a named session. `anonymous` always resolves.
    pub fn session(&self, name: &str) -> Option<Session> {
        match self.sessions.get(name) {
            Some(session) => Some(session.clone()),
            None if name == "anonymous" => Some(Session::anonymous()),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::Role;
    use std::io::Write;

    const JSON: &str = r#"{
        "opportunities": [{"_id": "o0", "requestor": "p1", "offerOrg": "org0"}],
        "interests": [{"_id": "i0", "person": "p2", "opportunity": "o0", "status": "invited"}],
        "sessions": {
            "admin": {"identity": "p0", "roles": ["administrator"]},
            "orgadmin": {"identity": "p4", "roles": ["organisation-admin"], "orgAdminFor": ["org0"]}
        }
    }"#;

    #[test]
    fn test_from_json() {
        let fixtures = Fixtures::from_json_str(JSON).unwrap();
        assert_eq!(fixtures.opportunities[0].offer_org.as_deref(), Some("org0"));
        assert_eq!(fixtures.interests[0].status.as_str(), "invited");
        assert!(fixtures.archived_opportunities.is_empty());
        assert!(fixtures.archived_interests.is_empty());

        let org_admin = fixtures.session("orgadmin").unwrap();
        assert!(org_admin.holds(Role::OrganisationAdmin));
        assert_eq!(org_admin.org_admin_for, vec!["org0"]);
    }

    #[test]
    fn test_anonymous_session_always_resolves() {
        let fixtures = Fixtures::default();
        assert_eq!(fixtures.session("anonymous"), Some(Session::anonymous()));
        assert_eq!(fixtures.session("nobody"), None);
    }

    #[test]
    fn test_load_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[[opportunities]]
_id = "o1"
requestor = "p1"

[sessions.p1]
identity = "p1"
roles = ["opportunity-provider"]
"#
        )
        .unwrap();

        let fixtures = Fixtures::load(file.path()).unwrap();
        assert_eq!(fixtures.opportunities[0].id, "o1");
        assert!(fixtures.session("p1").unwrap().holds(Role::OpportunityProvider));
    }

    #[test]
    fn test_malformed_fixtures() {
        assert!(matches!(
            Fixtures::from_json_str("{\"interests\": 3}"),
            Err(ConfigError::Load(_))
        ));
    }
}
