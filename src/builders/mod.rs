//! Rule builders
//!
//! One builder per protected resource type. Given a session and one of its
//! roles, a builder produces that role's ordered [`RuleSet`], consulting the
//! injected [`OwnershipLookup`] to materialise ownership sets such as
//! "opportunities I requested".

pub mod interest;
pub mod interest_archive;

pub use interest::InterestRules;
pub use interest_archive::InterestArchiveRules;

use crate::ability::{AbilityCompiler, ResourceType, Role, RuleSet, Session};
use crate::config::EngineConfig;
use crate::error::{LookupError, RuleBuildError};
// async_trait required for dyn-compatibility with Arc<dyn RuleBuilder>
use async_trait::async_trait;
use std::sync::Arc;

/// Produces the rules one role contributes for one resource type
#[async_trait]
pub trait RuleBuilder: Send + Sync {
    /// Resource type the produced rules apply to
    fn subject(&self) -> ResourceType;

    /// Roles this resource defines rules for. Other roles are skipped.
    fn roles(&self) -> &'static [Role];

    /// Build the rule set `role` contributes for `session`.
    ///
    /// A lookup failure is a build failure, never a permission decision.
    async fn build(&self, session: &Session, role: Role) -> Result<RuleSet, RuleBuildError>;
}

/// Which opportunity collection an ownership lookup reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpportunityScope {
    Active,
    Archived,
}

impl OpportunityScope {
    pub const fn collection(&self) -> &'static str {
        match self {
            OpportunityScope::Active => "opportunities",
            OpportunityScope::Archived => "archived_opportunities",
        }
    }
}

/// Read-only ownership lookups against related collections
#[async_trait]
pub trait OwnershipLookup: Send + Sync {
    /// Ids of opportunities whose requestor is `person`
    async fn opportunities_requested_by(
        &self,
        scope: OpportunityScope,
        person: &str,
    ) -> Result<Vec<String>, LookupError>;

    /// Ids of opportunities offered by any of `organisations`
    async fn opportunities_offered_by(
        &self,
        scope: OpportunityScope,
        organisations: &[String],
    ) -> Result<Vec<String>, LookupError>;
}

/// Shared handle to an ownership lookup
pub type SharedLookup = Arc<dyn OwnershipLookup>;

/// Compiler with every built-in resource builder registered
pub fn standard_compiler(config: &EngineConfig, lookup: SharedLookup) -> AbilityCompiler {
    AbilityCompiler::new(config)
        .with_builder(Arc::new(InterestRules::new(lookup.clone())))
        .with_builder(Arc::new(InterestArchiveRules::new(lookup)))
}

/// Ownership ids for the opportunity-provider or organisation-admin role.
///
/// Returns `None` when the session has no identity.
pub(crate) async fn owned_opportunities(
    lookup: &dyn OwnershipLookup,
    scope: OpportunityScope,
    session: &Session,
    role: Role,
) -> Result<Option<Vec<String>>, RuleBuildError> {
    let Some(identity) = session.identity() else {
        return Ok(None);
    };

    let ids = match role {
        Role::OrganisationAdmin => {
            lookup
                .opportunities_offered_by(scope, &session.org_admin_for)
                .await
        }
        _ => lookup.opportunities_requested_by(scope, identity).await,
    }
    .map_err(|source| RuleBuildError::Lookup { role, source })?;

    Ok(Some(ids))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixed ownership sets for builder tests

    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    pub struct FixedLookup {
        pub requested: HashMap<String, Vec<String>>,
        pub offered: HashMap<String, Vec<String>>,
        pub archived_requested: HashMap<String, Vec<String>>,
        pub fail: bool,
    }

    #[async_trait]
    impl OwnershipLookup for FixedLookup {
        async fn opportunities_requested_by(
            &self,
            scope: OpportunityScope,
            person: &str,
        ) -> Result<Vec<String>, LookupError> {
            if self.fail {
                return Err(LookupError::new(scope.collection(), "unavailable"));
            }
            let source = match scope {
                OpportunityScope::Active => &self.requested,
                OpportunityScope::Archived => &self.archived_requested,
            };
            Ok(source.get(person).cloned().unwrap_or_default())
        }

        async fn opportunities_offered_by(
            &self,
            scope: OpportunityScope,
            organisations: &[String],
        ) -> Result<Vec<String>, LookupError> {
            if self.fail {
                return Err(LookupError::new(scope.collection(), "unavailable"));
            }
            Ok(organisations
                .iter()
                .filter_map(|org| self.offered.get(org))
                .flatten()
                .cloned()
                .collect())
        }
    }
}
