//! Rules for archived interests
//!
//! Archived interests are read-mostly: nobody creates or deletes them through
//! the API, administrators included. Ownership is resolved against the
//! archived opportunity collection.

use crate::ability::{Action, Condition, ResourceType, Role, RuleSet, Session};
use crate::builders::{OpportunityScope, RuleBuilder, SharedLookup, owned_opportunities};
use crate::error::RuleBuildError;
use async_trait::async_trait;

const SUBJECT: ResourceType = ResourceType::InterestArchive;

/// Rule builder for [`ResourceType::InterestArchive`]
pub struct InterestArchiveRules {
    lookup: SharedLookup,
}

impl InterestArchiveRules {
    pub fn new(lookup: SharedLookup) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl RuleBuilder for InterestArchiveRules {
    fn subject(&self) -> ResourceType {
        SUBJECT
    }

    fn roles(&self) -> &'static [Role] {
        &Role::PRIORITY
    }

    async fn build(&self, session: &Session, role: Role) -> Result<RuleSet, RuleBuildError> {
        let rules = match role {
            Role::Anonymous => RuleSet::new(SUBJECT).deny_all(),
            Role::Volunteer => match session.identity() {
                Some(me) => RuleSet::new(SUBJECT)
                    .grant_when(Action::List, Condition::new().eq("person", me))
                    .grant_when(Action::Read, Condition::new().eq("person", me))
                    .deny(Action::Create)
                    .deny(Action::Update)
                    .deny(Action::Delete),
                None => RuleSet::empty(SUBJECT),
            },
            Role::OpportunityProvider | Role::OrganisationAdmin => {
                let owned = owned_opportunities(
                    self.lookup.as_ref(),
                    OpportunityScope::Archived,
                    session,
                    role,
                )
                .await?;

                match owned {
                    Some(ids) => {
                        let owned = Condition::new().is_in("opportunity", ids);
                        RuleSet::new(SUBJECT)
                            .grant_when(Action::List, owned.clone())
                            .grant_when(Action::Read, owned.clone())
                            .deny(Action::Create)
                            .grant_when(Action::Update, owned)
                            .deny(Action::Delete)
                    }
                    None => RuleSet::empty(SUBJECT),
                }
            }
            Role::Administrator => RuleSet::new(SUBJECT)
                .grant(Action::Read)
                .grant(Action::List)
                .grant(Action::Update)
                .deny(Action::Delete)
                .deny(Action::Create),
        };
        Ok(rules)
    }
}
