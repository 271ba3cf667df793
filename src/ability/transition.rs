//! Status transition guard
//!
//! A narrow, per-resource state machine restricting which status changes a
//! specific actor role may make. It judges a (current, requested) pair, not
//! an instance, so it does not go through the rule machinery.
//!
//! Roles the table does not govern bypass the guard entirely; their updates
//! are judged by the ability's `update` rules alone.

use crate::ability::types::{ResourceType, Role};
use crate::config::TransitionTableConfig;
use crate::error::{ConfigError, InvalidTransition};
use crate::model::InterestStatus;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use tracing::trace;

/// Allowed status transitions for one resource type and one actor role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    subject: ResourceType,
    actor: Role,
    field: String,
    allowed: HashMap<String, HashSet<String>>,
}

impl TransitionTable {
    pub fn new(subject: ResourceType, actor: Role, field: impl Into<String>) -> Self {
        Self {
            subject,
            actor,
            field: field.into(),
            allowed: HashMap::new(),
        }
    }

    /// Allow `from -> to`
    pub fn allow(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.allowed.entry(from.into()).or_default().insert(to.into());
        self
    }

    /// Built-in table: volunteers may go `invited -> committed` and
    /// `committed -> interested` on their own interests, nothing else.
    pub fn interest() -> Self {
        Self::new(ResourceType::Interest, Role::Volunteer, "status")
            .allow(
                InterestStatus::Invited.as_str(),
                InterestStatus::Committed.as_str(),
            )
            .allow(
                InterestStatus::Committed.as_str(),
                InterestStatus::Interested.as_str(),
            )
    }

    /// Build from configuration
    pub fn from_config(
        subject: ResourceType,
        config: &TransitionTableConfig,
    ) -> Result<Self, ConfigError> {
        if !subject.has_field(&config.field) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "transitions.{}.field '{}' is not a field of {}",
                    subject, config.field, subject
                ),
            });
        }

        let mut table = Self::new(subject, config.actor, config.field.clone());
        for (from, targets) in &config.allowed {
            for to in targets {
                if from.is_empty() || to.is_empty() {
                    return Err(ConfigError::Invalid {
                        message: format!("transitions.{}: empty state name", subject),
                    });
                }
                table = table.allow(from.clone(), to.clone());
            }
        }
        Ok(table)
    }

    pub fn subject(&self) -> ResourceType {
        self.subject
    }

    /// Role this restriction applies to
    pub fn actor(&self) -> Role {
        self.actor
    }

    /// Status-bearing field the table guards
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Whether `from -> to` is in the table. No-ops are not implied.
    pub fn permits(&self, from: &str, to: &str) -> bool {
        self.allowed
            .get(from)
            .is_some_and(|targets| targets.contains(to))
    }
}

/// Process-wide set of transition tables, immutable after construction
#[derive(Debug, Clone, Default)]
pub struct TransitionGuard {
    tables: HashMap<ResourceType, TransitionTable>,
}

static STANDARD: LazyLock<TransitionGuard> =
    LazyLock::new(|| TransitionGuard::new([TransitionTable::interest()]));

impl TransitionGuard {
    pub fn new(tables: impl IntoIterator<Item = TransitionTable>) -> Self {
        Self {
            tables: tables.into_iter().map(|t| (t.subject, t)).collect(),
        }
    }

    /// The built-in guard
    pub fn standard() -> &'static TransitionGuard {
        &STANDARD
    }

    /// Built-in tables overridden by the configured ones
    pub fn from_config(
        config: &HashMap<String, TransitionTableConfig>,
    ) -> Result<Self, ConfigError> {
        let mut guard = Self::standard().clone();
        for (name, table_config) in config {
            let subject = ResourceType::try_parse(name).ok_or_else(|| ConfigError::Invalid {
                message: format!("Unknown resource in transitions: {}", name),
            })?;
            guard
                .tables
                .insert(subject, TransitionTable::from_config(subject, table_config)?);
        }
        Ok(guard)
    }

    pub fn table(&self, subject: ResourceType) -> Option<&TransitionTable> {
        self.tables.get(&subject)
    }

    /// Whether the guard must be consulted for `actor` on `subject`
    pub fn applies_to(&self, subject: ResourceType, actor: Role) -> bool {
        self.table(subject).is_some_and(|t| t.actor == actor)
    }

    /// May `actor` move a `subject` record from `from` to `to`?
    ///
    /// Always true for roles the guard does not govern.
    pub fn allowed_transition(
        &self,
        subject: ResourceType,
        from: &str,
        to: &str,
        actor: Role,
    ) -> bool {
        let allowed = match self.table(subject) {
            Some(table) if table.actor == actor => table.permits(from, to),
            _ => true,
        };
        trace!(subject = %subject, from, to, actor = %actor, allowed, "Checked transition");
        allowed
    }

    /// [`TransitionGuard::allowed_transition`] as a `Result`
    pub fn check(
        &self,
        subject: ResourceType,
        from: &str,
        to: &str,
        actor: Role,
    ) -> Result<(), InvalidTransition> {
        if self.allowed_transition(subject, from, to, actor) {
            Ok(())
        } else {
            Err(InvalidTransition {
                subject,
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }
}
