//! Record access for condition evaluation
//!
//! Conditions are interpreted against field maps, so any record the engine
//! evaluates only has to expose its resource type and its fields by name.

use crate::ability::types::ResourceType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Trait for records that can be checked against rule conditions
pub trait Subject {
    /// Resource type this record is an instance of
    fn resource_type(&self) -> ResourceType;

    /// Value of a field, or `None` if the field is unset
    fn field(&self, name: &str) -> Option<Value>;
}

impl<T: Subject + ?Sized> Subject for &T {
    fn resource_type(&self) -> ResourceType {
        (**self).resource_type()
    }

    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}

/// Generic record backed by a JSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub subject: ResourceType,
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(subject: ResourceType) -> Self {
        Self {
            subject,
            fields: Map::new(),
        }
    }

    /// Build a record from a JSON object value
    pub fn from_value(subject: ResourceType, value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { subject, fields }),
            _ => None,
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }
}

impl Subject for Record {
    fn resource_type(&self) -> ResourceType {
        self.subject
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).filter(|v| !v.is_null()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_fields() {
        let record = Record::new(ResourceType::Interest)
            .with("person", "p1")
            .with("status", "interested");

        assert_eq!(record.field("person"), Some(json!("p1")));
        assert_eq!(record.field("opportunity"), None);
    }

    #[test]
    fn test_null_is_unset() {
        let record = Record::from_value(ResourceType::Interest, json!({"person": null})).unwrap();
        assert_eq!(record.field("person"), None);
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Record::from_value(ResourceType::Interest, json!([1, 2])).is_none());
    }
}
