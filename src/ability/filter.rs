//! Query filters compiled from an ability
//!
//! A [`Filter`] is handed to the persistence collaborator so that records the
//! session cannot see are never fetched. The combinators simplify eagerly:
//! `Nothing` and `Everything` are absorbed, and a condition that can never
//! hold (`field ∈ ∅`) collapses to `Nothing`.

use crate::ability::rule::{Condition, Matcher};
use crate::ability::subject::Subject;
use serde_json::{Map, Value, json};

/// Query predicate over records of one resource type
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches no record
    Nothing,
    /// Matches every record
    Everything,
    /// Conjunctive field predicates
    Where(Condition),
    /// Negation of a filter
    Not(Box<Filter>),
    /// All filters must match
    And(Vec<Filter>),
    /// At least one filter must match
    Or(Vec<Filter>),
}

impl Filter {
    /// Filter for a rule condition, collapsing trivial cases
    pub fn from_condition(condition: &Condition) -> Self {
        if condition.is_unsatisfiable() {
            Filter::Nothing
        } else if condition.is_empty() {
            Filter::Everything
        } else {
            Filter::Where(condition.clone())
        }
    }

    /// Filter selecting a single record by id
    pub fn by_id(id: impl Into<Value>) -> Self {
        Filter::Where(Condition::new().eq("_id", id))
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Filter::Nothing)
    }

    pub fn is_everything(&self) -> bool {
        matches!(self, Filter::Everything)
    }

    /// Disjunction of `self` and `other`
    pub fn or(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::Everything, _) | (_, Filter::Everything) => Filter::Everything,
            (Filter::Nothing, f) | (f, Filter::Nothing) => f,
            (Filter::Or(mut left), Filter::Or(right)) => {
                left.extend(right);
                Filter::Or(left)
            }
            (Filter::Or(mut left), f) => {
                left.push(f);
                Filter::Or(left)
            }
            (f, Filter::Or(mut right)) => {
                right.insert(0, f);
                Filter::Or(right)
            }
            (left, right) => Filter::Or(vec![left, right]),
        }
    }

    /// Conjunction of `self` and `other`
    pub fn and(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::Nothing, _) | (_, Filter::Nothing) => Filter::Nothing,
            (Filter::Everything, f) | (f, Filter::Everything) => f,
            (Filter::And(mut left), Filter::And(right)) => {
                left.extend(right);
                Filter::And(left)
            }
            (Filter::And(mut left), f) => {
                left.push(f);
                Filter::And(left)
            }
            (f, Filter::And(mut right)) => {
                right.insert(0, f);
                Filter::And(right)
            }
            (left, right) => Filter::And(vec![left, right]),
        }
    }

    /// Negation of `self`
    pub fn negate(self) -> Filter {
        match self {
            Filter::Nothing => Filter::Everything,
            Filter::Everything => Filter::Nothing,
            Filter::Not(inner) => *inner,
            f => Filter::Not(Box::new(f)),
        }
    }

    /// Evaluate the filter against a record in memory
    pub fn matches(&self, subject: &dyn Subject) -> bool {
        match self {
            Filter::Nothing => false,
            Filter::Everything => true,
            Filter::Where(condition) => condition.matches(subject),
            Filter::Not(inner) => !inner.matches(subject),
            Filter::And(filters) => filters.iter().all(|f| f.matches(subject)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(subject)),
        }
    }

    /// Render the filter in the persistence collaborator's native
    /// (Mongo-style) query form
    pub fn to_query(&self) -> Value {
        match self {
            Filter::Nothing => json!({ "$expr": false }),
            Filter::Everything => json!({}),
            Filter::Where(condition) => condition_query(condition),
            Filter::Not(inner) => json!({ "$nor": [inner.to_query()] }),
            Filter::And(filters) => {
                json!({ "$and": filters.iter().map(Filter::to_query).collect::<Vec<_>>() })
            }
            Filter::Or(filters) => {
                json!({ "$or": filters.iter().map(Filter::to_query).collect::<Vec<_>>() })
            }
        }
    }
}

fn condition_query(condition: &Condition) -> Value {
    let mut query = Map::new();
    for (field, matcher) in condition.iter() {
        let value = match matcher {
            Matcher::Eq(value) => value.clone(),
            Matcher::In { values } => json!({ "$in": values }),
        };
        query.insert(field.to_string(), value);
    }
    Value::Object(query)
}
