//! In-memory store
//!
//! Backs both [`InterestStore`] and [`OwnershipLookup`] with plain
//! collections. Filters are evaluated with [`Filter::matches`].

use crate::ability::{Filter, ResourceType};
use crate::builders::{OpportunityScope, OwnershipLookup};
use crate::error::{LookupError, StoreError};
use crate::model::{Interest, Opportunity};
use crate::store::{Fixtures, InterestStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::trace;

/// Collections held in memory
#[derive(Default)]
pub struct MemoryStore {
    interests: RwLock<BTreeMap<String, Interest>>,
    archived_interests: RwLock<BTreeMap<String, Interest>>,
    opportunities: RwLock<Vec<Opportunity>>,
    archived_opportunities: RwLock<Vec<Opportunity>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from fixtures
    pub fn from_fixtures(fixtures: &Fixtures) -> Self {
        let by_id = |interests: &[Interest]| {
            interests
                .iter()
                .map(|i| (i.id.clone(), i.clone()))
                .collect::<BTreeMap<_, _>>()
        };

        Self {
            interests: RwLock::new(by_id(&fixtures.interests)),
            archived_interests: RwLock::new(by_id(&fixtures.archived_interests)),
            opportunities: RwLock::new(fixtures.opportunities.clone()),
            archived_opportunities: RwLock::new(fixtures.archived_opportunities.clone()),
            next_id: AtomicU64::new(0),
        }
    }

    pub async fn add_opportunity(&self, scope: OpportunityScope, opportunity: Opportunity) {
        self.collection(scope).write().await.push(opportunity);
    }

    /// Interest by id from the collection backing `resource`. Archived
    /// interests are read-only here.
    pub async fn find_by_id(&self, resource: ResourceType, id: &str) -> Option<Interest> {
        let collection = match resource {
            ResourceType::Interest => &self.interests,
            ResourceType::InterestArchive => &self.archived_interests,
        };
        collection.read().await.get(id).cloned()
    }

    pub async fn interest_count(&self) -> usize {
        self.interests.read().await.len()
    }

    fn collection(&self, scope: OpportunityScope) -> &RwLock<Vec<Opportunity>> {
        match scope {
            OpportunityScope::Active => &self.opportunities,
            OpportunityScope::Archived => &self.archived_opportunities,
        }
    }

    fn fresh_id(&self) -> String {
        format!("interest-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[async_trait]
impl InterestStore for MemoryStore {
    async fn query(&self, filter: &Filter) -> Result<Vec<Interest>, StoreError> {
        let interests = self.interests.read().await;
        let mut found: Vec<Interest> = interests
            .values()
            .filter(|i| filter.matches(*i))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.date_added.cmp(&b.date_added).then_with(|| a.id.cmp(&b.id)));

        trace!(matched = found.len(), "Queried interests");
        Ok(found)
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Interest>, StoreError> {
        let interests = self.interests.read().await;
        Ok(interests.values().find(|i| filter.matches(*i)).cloned())
    }

    async fn save(&self, mut interest: Interest) -> Result<Interest, StoreError> {
        if interest.id.is_empty() {
            interest.id = self.fresh_id();
        }
        self.interests
            .write()
            .await
            .insert(interest.id.clone(), interest.clone());
        Ok(interest)
    }

    async fn delete_one(&self, filter: &Filter) -> Result<u64, StoreError> {
        let mut interests = self.interests.write().await;
        let id = interests
            .values()
            .find(|i| filter.matches(*i))
            .map(|i| i.id.clone());

        Ok(match id {
            Some(id) => {
                interests.remove(&id);
                1
            }
            None => 0,
        })
    }
}

#[async_trait]
impl OwnershipLookup for MemoryStore {
    async fn opportunities_requested_by(
        &self,
        scope: OpportunityScope,
        person: &str,
    ) -> Result<Vec<String>, LookupError> {
        let opportunities = self.collection(scope).read().await;
        Ok(opportunities
            .iter()
            .filter(|o| o.requestor == person)
            .map(|o| o.id.clone())
            .collect())
    }

    async fn opportunities_offered_by(
        &self,
        scope: OpportunityScope,
        organisations: &[String],
    ) -> Result<Vec<String>, LookupError> {
        let opportunities = self.collection(scope).read().await;
        Ok(opportunities
            .iter()
            .filter(|o| {
                o.offer_org
                    .as_ref()
                    .is_some_and(|org| organisations.contains(org))
            })
            .map(|o| o.id.clone())
            .collect())
    }
}
