//! Opportunity records, used for ownership lookups

use serde::{Deserialize, Serialize};

/// An opportunity requested by a person on behalf of an organisation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    #[serde(rename = "_id")]
    pub id: String,
    /// Person who requested (owns) the opportunity
    pub requestor: String,
    /// Organisation offering the opportunity
    #[serde(default)]
    pub offer_org: Option<String>,
}

impl Opportunity {
    pub fn new(id: impl Into<String>, requestor: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            requestor: requestor.into(),
            offer_org: None,
        }
    }

    pub fn offered_by(mut self, org: impl Into<String>) -> Self {
        self.offer_org = Some(org.into());
        self
    }
}
