//! Rule data model
//!
//! Rules are tagged data records (subject × action × conditions × inverted),
//! never closures, so that a single generic evaluator can interpret them.

use crate::ability::subject::Subject;
use crate::ability::types::{Action, ResourceType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Predicate on a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Matcher {
    /// `field ∈ values`
    In {
        #[serde(rename = "$in")]
        values: Vec<Value>,
    },
    /// `field == value`
    Eq(Value),
}

impl Matcher {
    pub fn matches(&self, actual: &Value) -> bool {
        match self {
            Matcher::Eq(expected) => expected == actual,
            Matcher::In { values } => values.contains(actual),
        }
    }

    /// True when no value can ever satisfy this matcher (`∈ ∅`)
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, Matcher::In { values } if values.is_empty())
    }
}

/// Conjunction of field predicates. All must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Condition(BTreeMap<String, Matcher>);

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `field == value`
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), Matcher::Eq(value.into()));
        self
    }

    /// Add `field ∈ values`
    pub fn is_in<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.0.insert(field.into(), Matcher::In { values });
        self
    }

    /// Field names referenced by this condition
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Matcher)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_unsatisfiable(&self) -> bool {
        self.0.values().any(Matcher::is_unsatisfiable)
    }

    /// Evaluate against a concrete record. Unset fields never match.
    pub fn matches(&self, subject: &dyn Subject) -> bool {
        self.0.iter().all(|(field, matcher)| {
            subject
                .field(field)
                .is_some_and(|actual| matcher.matches(&actual))
        })
    }
}

/// A grant, or a denial when `inverted`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub subject: ResourceType,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Condition>,
    #[serde(default)]
    pub inverted: bool,
}

impl Rule {
    /// Unconditional grant
    pub fn grant(subject: ResourceType, action: Action) -> Self {
        Self {
            subject,
            action,
            conditions: None,
            inverted: false,
        }
    }

    /// Unconditional denial
    pub fn deny(subject: ResourceType, action: Action) -> Self {
        Self {
            inverted: true,
            ..Self::grant(subject, action)
        }
    }

    /// Attach conditions to this rule
    pub fn when(mut self, conditions: Condition) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// No conditions, or an empty conjunction. Either matches every record.
    pub fn is_unconditional(&self) -> bool {
        self.conditions.as_ref().is_none_or(Condition::is_empty)
    }

    /// Whether this rule applies to the given subject and action
    pub fn applies_to(&self, subject: ResourceType, action: Action) -> bool {
        self.subject == subject && self.action == action
    }

    /// Whether the rule's conditions hold for the instance.
    ///
    /// A rule with no conditions matches every instance of its subject.
    pub fn matches(&self, instance: &dyn Subject) -> bool {
        self.conditions
            .as_ref()
            .is_none_or(|conditions| conditions.matches(instance))
    }
}

/// Ordered rules produced for one role and one resource type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    subject: ResourceType,
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(subject: ResourceType) -> Self {
        Self {
            subject,
            rules: Vec::new(),
        }
    }

    /// Empty set, for roles that contribute nothing
    pub fn empty(subject: ResourceType) -> Self {
        Self::new(subject)
    }

    pub fn subject(&self) -> ResourceType {
        self.subject
    }

    /// Append an arbitrary rule
    pub fn push(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Unconditional grant of `action`
    pub fn grant(self, action: Action) -> Self {
        let rule = Rule::grant(self.subject, action);
        self.push(rule)
    }

    /// Grant of `action` restricted to `conditions`
    pub fn grant_when(self, action: Action, conditions: Condition) -> Self {
        let rule = Rule::grant(self.subject, action).when(conditions);
        self.push(rule)
    }

    /// Unconditional denial of `action`
    pub fn deny(self, action: Action) -> Self {
        let rule = Rule::deny(self.subject, action);
        self.push(rule)
    }

    /// Unconditional denial of every action
    pub fn deny_all(self) -> Self {
        Action::ALL
            .into_iter()
            .fold(self, |set, action| set.deny(action))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::subject::Record;
    use serde_json::json;

    fn interest(person: &str, opportunity: &str) -> Record {
        Record::new(ResourceType::Interest)
            .with("person", person)
            .with("opportunity", opportunity)
    }

    #[test]
    fn test_equality_condition() {
        let cond = Condition::new().eq("person", "p1");
        assert!(cond.matches(&interest("p1", "o1")));
        assert!(!cond.matches(&interest("p2", "o1")));
    }

    #[test]
    fn test_membership_condition() {
        let cond = Condition::new().is_in("opportunity", ["o1", "o2"]);
        assert!(cond.matches(&interest("p1", "o2")));
        assert!(!cond.matches(&interest("p1", "o3")));
    }

    #[test]
    fn test_conditions_are_conjunctive() {
        let cond = Condition::new()
            .eq("person", "p1")
            .is_in("opportunity", ["o1"]);
        assert!(cond.matches(&interest("p1", "o1")));
        assert!(!cond.matches(&interest("p1", "o2")));
        assert!(!cond.matches(&interest("p2", "o1")));
    }

    #[test]
    fn test_unset_field_never_matches() {
        let cond = Condition::new().eq("status", "interested");
        assert!(!cond.matches(&interest("p1", "o1")));
    }

    #[test]
    fn test_empty_membership_is_unsatisfiable() {
        let cond = Condition::new().is_in("opportunity", Vec::<String>::new());
        assert!(cond.is_unsatisfiable());
        assert!(!cond.matches(&interest("p1", "o1")));
    }

    #[test]
    fn test_unconditional_rule_matches_everything() {
        let rule = Rule::grant(ResourceType::Interest, Action::Read);
        assert!(rule.matches(&interest("anyone", "anything")));
    }

    #[test]
    fn test_deny_all_covers_every_action() {
        let set = RuleSet::new(ResourceType::Interest).deny_all();
        assert_eq!(set.len(), 5);
        assert!(set.rules().iter().all(|r| r.inverted && r.is_unconditional()));
    }

    #[test]
    fn test_condition_serializes_like_a_query() {
        let cond = Condition::new()
            .eq("person", "p1")
            .is_in("opportunity", ["o1"]);
        let value = serde_json::to_value(&cond).unwrap();
        assert_eq!(
            value,
            json!({"opportunity": {"$in": ["o1"]}, "person": "p1"})
        );

        let back: Condition = serde_json::from_value(value).unwrap();
        assert_eq!(back, cond);
    }
}
