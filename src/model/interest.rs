//! Interest records
//!
//! An interest links a person to an opportunity and carries a status plus a
//! message thread.

use crate::ability::{ResourceType, Subject};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Interest lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestStatus {
    #[default]
    Interested,
    Invited,
    Committed,
    Declined,
    Completed,
    Cancelled,
}

impl InterestStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            InterestStatus::Interested => "interested",
            InterestStatus::Invited => "invited",
            InterestStatus::Committed => "committed",
            InterestStatus::Declined => "declined",
            InterestStatus::Completed => "completed",
            InterestStatus::Cancelled => "cancelled",
        }
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "interested" => Some(InterestStatus::Interested),
            "invited" => Some(InterestStatus::Invited),
            "committed" => Some(InterestStatus::Committed),
            "declined" => Some(InterestStatus::Declined),
            "completed" => Some(InterestStatus::Completed),
            "cancelled" => Some(InterestStatus::Cancelled),
            _ => None,
        }
    }

    /// Parse a status supplied by a caller
    pub fn parse_requested(s: &str) -> Result<Self, ValidationError> {
        Self::try_parse(s).ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}

impl fmt::Display for InterestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Entry in an interest's message thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub body: String,
    pub author: String,
}

impl Message {
    pub fn new(body: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            author: author.into(),
        }
    }
}

/// Stored interest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interest {
    #[serde(rename = "_id")]
    pub id: String,
    pub person: String,
    pub opportunity: String,
    #[serde(default)]
    pub status: InterestStatus,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub date_added: u64,
}

impl Subject for Interest {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Interest
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "_id" => Some(Value::from(self.id.as_str())),
            "person" => Some(Value::from(self.person.as_str())),
            "opportunity" => Some(Value::from(self.opportunity.as_str())),
            "status" => Some(Value::from(self.status.as_str())),
            "dateAdded" => Some(Value::from(self.date_added)),
            _ => None,
        }
    }
}

/// Caller-supplied data for a new interest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInterest {
    /// Defaults to the session identity
    #[serde(default)]
    pub person: Option<String>,
    #[serde(default)]
    pub opportunity: Option<String>,
    /// Defaults to `interested`
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Kind of update, used to pick the published event topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind {
    #[default]
    Accept,
    Reject,
    Invite,
    Message,
}

/// Caller-supplied changes to an existing interest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestUpdate {
    #[serde(default)]
    pub status: Option<String>,
    /// Appended to the thread
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(rename = "type", default)]
    pub kind: UpdateKind,
}
