//! Ability compilation
//!
//! Concatenates the rule sets of every role a session holds, in the fixed
//! role-priority order, into one request-scoped [`Ability`].

use crate::ability::evaluator;
use crate::ability::filter::Filter;
use crate::ability::rule::{Rule, RuleSet};
use crate::ability::subject::Subject;
use crate::ability::types::{Action, ResourceType, Role, Session};
use crate::builders::RuleBuilder;
use crate::config::EngineConfig;
use crate::error::RuleBuildError;
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Compiled, session-scoped, ordered rule list for one resource type.
///
/// Built fresh per request and immutable once returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Ability {
    subject: ResourceType,
    rules: Vec<Rule>,
}

impl Ability {
    pub fn new(subject: ResourceType, rules: Vec<Rule>) -> Self {
        Self { subject, rules }
    }

    pub fn subject(&self) -> ResourceType {
        self.subject
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// See [`evaluator::can`]
    pub fn can(&self, action: Action, instance: &dyn Subject) -> bool {
        evaluator::can(self, action, instance)
    }

    /// See [`evaluator::filter_for`]
    pub fn filter_for(&self, action: Action) -> Filter {
        evaluator::filter_for(self, action)
    }

    /// See [`evaluator::has_grant`]
    pub fn has_grant(&self, action: Action) -> bool {
        evaluator::has_grant(self, action)
    }
}

/// Builds abilities from sessions using the registered rule builders
pub struct AbilityCompiler {
    builders: HashMap<ResourceType, Arc<dyn RuleBuilder>>,
    concurrent: bool,
}

impl AbilityCompiler {
    /// Create a compiler with no builders registered
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            builders: HashMap::new(),
            concurrent: config.concurrent_builders,
        }
    }

    /// Register the rule builder for its resource type, replacing any previous one
    pub fn register(&mut self, builder: Arc<dyn RuleBuilder>) {
        self.builders.insert(builder.subject(), builder);
    }

    /// Builder-style variant of [`AbilityCompiler::register`]
    pub fn with_builder(mut self, builder: Arc<dyn RuleBuilder>) -> Self {
        self.register(builder);
        self
    }

    /// Resource types this compiler can build abilities for
    pub fn subjects(&self) -> impl Iterator<Item = ResourceType> + '_ {
        self.builders.keys().copied()
    }

    /// Build the ability of `session` for `subject`.
    ///
    /// Role builders are independent and may run concurrently; any failure
    /// fails the whole compilation and no partial ability is returned.
    #[instrument(skip(self, session), fields(roles = %session.roles))]
    pub async fn compile(
        &self,
        session: &Session,
        subject: ResourceType,
    ) -> Result<Ability, RuleBuildError> {
        let builder = self
            .builders
            .get(&subject)
            .ok_or(RuleBuildError::NoBuilder { subject })?;

        // Roles the resource defines no rules for contribute nothing
        let roles: Vec<Role> = session
            .roles
            .in_priority_order()
            .filter(|role| builder.roles().contains(role))
            .collect();

        let sets = if self.concurrent {
            try_join_all(roles.iter().map(|role| builder.build(session, *role))).await?
        } else {
            let mut sets = Vec::with_capacity(roles.len());
            for role in &roles {
                sets.push(builder.build(session, *role).await?);
            }
            sets
        };

        let mut rules = Vec::new();
        for (role, set) in roles.iter().zip(sets) {
            validate(subject, &set)?;
            trace!(role = %role, rules = set.len(), "Appending role rules");
            rules.extend(set.into_rules());
        }

        debug!(subject = %subject, rules = rules.len(), "Compiled ability");
        Ok(Ability::new(subject, rules))
    }
}

/// Check that every rule targets `subject` and only references its fields
fn validate(subject: ResourceType, set: &RuleSet) -> Result<(), RuleBuildError> {
    for rule in set.rules() {
        if rule.subject != subject {
            return Err(RuleBuildError::SubjectMismatch {
                expected: subject,
                found: rule.subject,
            });
        }

        if let Some(conditions) = &rule.conditions
            && let Some(field) = conditions.fields().find(|f| !subject.has_field(f))
        {
            return Err(RuleBuildError::UnknownField {
                subject,
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::rule::Condition;
    use crate::ability::types::RoleSet;
    use crate::error::LookupError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Builder that tags each rule with the role that produced it
    struct TaggingBuilder {
        calls: AtomicUsize,
        fail_for: Option<Role>,
        bad_field: bool,
    }

    impl TaggingBuilder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_for: None,
                bad_field: false,
            }
        }
    }

    #[async_trait]
    impl RuleBuilder for TaggingBuilder {
        fn subject(&self) -> ResourceType {
            ResourceType::Interest
        }

        fn roles(&self) -> &'static [Role] {
            &[Role::Volunteer, Role::OpportunityProvider, Role::Administrator]
        }

        async fn build(&self, _session: &Session, role: Role) -> Result<RuleSet, RuleBuildError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_for == Some(role) {
                return Err(RuleBuildError::Lookup {
                    role,
                    source: LookupError::new("opportunities", "unavailable"),
                });
            }
            let field = if self.bad_field { "requestor" } else { "status" };
            Ok(RuleSet::new(ResourceType::Interest)
                .grant_when(Action::Read, Condition::new().eq(field, role.as_str())))
        }
    }

    fn compiler(builder: TaggingBuilder) -> (AbilityCompiler, Arc<TaggingBuilder>) {
        let builder = Arc::new(builder);
        let compiler =
            AbilityCompiler::new(&EngineConfig::default()).with_builder(builder.clone());
        (compiler, builder)
    }

    fn tags(ability: &Ability) -> Vec<String> {
        ability
            .rules()
            .iter()
            .filter_map(|r| r.conditions.as_ref())
            .flat_map(|c| {
                c.iter()
                    .map(|(_, m)| serde_json::to_string(m).unwrap())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_concatenates_in_priority_order() {
        let (compiler, _) = compiler(TaggingBuilder::new());
        let session = Session::new(
            "p1",
            RoleSet::from([Role::Administrator, Role::Volunteer]),
        );

        let ability = compiler
            .compile(&session, ResourceType::Interest)
            .await
            .unwrap();
        assert_eq!(
            tags(&ability),
            vec!["\"volunteer\"".to_string(), "\"administrator\"".to_string()]
        );
    }

    #[tokio::test]
    async fn test_skips_roles_without_rules() {
        let (compiler, builder) = compiler(TaggingBuilder::new());
        let session = Session::new("p1", [Role::OrganisationAdmin]);

        let ability = compiler
            .compile(&session, ResourceType::Interest)
            .await
            .unwrap();
        assert!(ability.rules().is_empty());
        assert_eq!(builder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_any_builder_failure_fails_compilation() {
        let (compiler, _) = compiler(TaggingBuilder {
            fail_for: Some(Role::OpportunityProvider),
            ..TaggingBuilder::new()
        });
        let session = Session::new("p1", [Role::Volunteer, Role::OpportunityProvider]);

        let err = compiler
            .compile(&session, ResourceType::Interest)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RuleBuildError::Lookup {
                role: Role::OpportunityProvider,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_rejects_unknown_fields() {
        let (compiler, _) = compiler(TaggingBuilder {
            bad_field: true,
            ..TaggingBuilder::new()
        });
        let session = Session::new("p1", [Role::Volunteer]);

        let err = compiler
            .compile(&session, ResourceType::Interest)
            .await
            .unwrap_err();
        assert!(matches!(err, RuleBuildError::UnknownField { .. }));
    }

    #[tokio::test]
    async fn test_missing_builder() {
        let compiler = AbilityCompiler::new(&EngineConfig::default());
        let err = compiler
            .compile(&Session::anonymous(), ResourceType::InterestArchive)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RuleBuildError::NoBuilder {
                subject: ResourceType::InterestArchive
            }
        );
    }

    #[tokio::test]
    async fn test_sequential_mode_matches_concurrent() {
        let session = Session::new(
            "p1",
            [Role::Volunteer, Role::OpportunityProvider, Role::Administrator],
        );
        let (concurrent, _) = compiler(TaggingBuilder::new());
        let sequential = AbilityCompiler::new(&EngineConfig {
            concurrent_builders: false,
        })
        .with_builder(Arc::new(TaggingBuilder::new()));

        let a = concurrent
            .compile(&session, ResourceType::Interest)
            .await
            .unwrap();
        let b = sequential
            .compile(&session, ResourceType::Interest)
            .await
            .unwrap();
        assert_eq!(a, b);
    }
}
