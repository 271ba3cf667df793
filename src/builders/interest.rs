//! Rules for the Interest resource
//!
//! | role                 | list / read           | create                        | update                | delete            |
//! |----------------------|-----------------------|-------------------------------|-----------------------|-------------------|
//! | anonymous            | denied                | denied                        | denied                | denied            |
//! | volunteer            | own (`person`)        | own, status `interested`      | own (+ status guard)  | own               |
//! | opportunity-provider | requested opportunity | denied                        | requested opportunity | denied            |
//! | organisation-admin   | org's opportunity     | denied                        | org's opportunity     | denied            |
//! | administrator        | all                   | all                           | all                   | all               |

use crate::ability::{Action, Condition, ResourceType, Role, RuleSet, Session};
use crate::builders::{OpportunityScope, RuleBuilder, SharedLookup, owned_opportunities};
use crate::error::RuleBuildError;
use crate::model::InterestStatus;
use async_trait::async_trait;
use tracing::debug;

const SUBJECT: ResourceType = ResourceType::Interest;

/// Rule builder for [`ResourceType::Interest`]
pub struct InterestRules {
    lookup: SharedLookup,
}

impl InterestRules {
    pub fn new(lookup: SharedLookup) -> Self {
        Self { lookup }
    }

    fn volunteer(session: &Session) -> RuleSet {
        let Some(me) = session.identity() else {
            return RuleSet::empty(SUBJECT);
        };
        let own = || Condition::new().eq("person", me);

        RuleSet::new(SUBJECT)
            .grant_when(Action::List, own())
            .grant_when(Action::Read, own())
            .grant_when(
                Action::Create,
                own().eq("status", InterestStatus::Interested.as_str()),
            )
            .grant_when(Action::Update, own())
            .grant_when(Action::Delete, own())
    }

    fn opportunity_owner(opportunity_ids: Vec<String>) -> RuleSet {
        let owned = || Condition::new().is_in("opportunity", opportunity_ids.iter().cloned());

        RuleSet::new(SUBJECT)
            .grant_when(Action::List, owned())
            .grant_when(Action::Read, owned())
            .deny(Action::Create)
            .grant_when(Action::Update, owned())
            .deny(Action::Delete)
    }

    fn administrator() -> RuleSet {
        Action::ALL
            .into_iter()
            .fold(RuleSet::new(SUBJECT), |set, action| set.grant(action))
    }
}

#[async_trait]
impl RuleBuilder for InterestRules {
    fn subject(&self) -> ResourceType {
        SUBJECT
    }

    fn roles(&self) -> &'static [Role] {
        &Role::PRIORITY
    }

    async fn build(&self, session: &Session, role: Role) -> Result<RuleSet, RuleBuildError> {
        let rules = match role {
            Role::Anonymous => RuleSet::new(SUBJECT).deny_all(),
            Role::Volunteer => Self::volunteer(session),
            Role::OpportunityProvider | Role::OrganisationAdmin => {
                match owned_opportunities(
                    self.lookup.as_ref(),
                    OpportunityScope::Active,
                    session,
                    role,
                )
                .await?
                {
                    Some(ids) => {
                        debug!(role = %role, owned = ids.len(), "Resolved owned opportunities");
                        Self::opportunity_owner(ids)
                    }
                    None => RuleSet::empty(SUBJECT),
                }
            }
            Role::Administrator => Self::administrator(),
        };
        Ok(rules)
    }
}
