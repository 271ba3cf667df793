//! Shared fixture world for integration tests
//!
//! People: p0 administrator, p1 opportunity provider (requested o0, o1, a0),
//! p2 and p3 volunteers, p4 admin of org0, p6 volunteer and provider owning
//! nothing, p7 volunteer with no interests.

#![allow(dead_code)]

use std::sync::Arc;
use vly_ability::ability::{AbilityCompiler, Session, TransitionGuard};
use vly_ability::builders::standard_compiler;
use vly_ability::config::EngineConfig;
use vly_ability::events::EventBus;
use vly_ability::service::InterestService;
use vly_ability::store::{Fixtures, MemoryStore};

pub const FIXTURES: &str = r#"{
    "opportunities": [
        {"_id": "o0", "requestor": "p1", "offerOrg": "org0"},
        {"_id": "o1", "requestor": "p1", "offerOrg": "org0"},
        {"_id": "o2", "requestor": "p5", "offerOrg": "org1"}
    ],
    "archivedOpportunities": [
        {"_id": "a0", "requestor": "p1", "offerOrg": "org0"}
    ],
    "interests": [
        {"_id": "i0", "person": "p2", "opportunity": "o0", "status": "interested", "dateAdded": 1},
        {"_id": "i1", "person": "p3", "opportunity": "o0", "status": "interested", "dateAdded": 2},
        {"_id": "i2", "person": "p3", "opportunity": "o2", "status": "interested", "dateAdded": 3},
        {"_id": "i3", "person": "p6", "opportunity": "o2", "status": "interested", "dateAdded": 4},
        {"_id": "i5", "person": "p2", "opportunity": "o1", "status": "invited", "dateAdded": 5},
        {"_id": "i6", "person": "p2", "opportunity": "o1", "status": "committed", "dateAdded": 6}
    ],
    "sessions": {
        "admin": {"identity": "p0", "roles": ["administrator"]},
        "provider": {"identity": "p1", "roles": ["opportunity-provider"]},
        "p2": {"identity": "p2", "roles": ["volunteer"]},
        "p3": {"identity": "p3", "roles": ["volunteer"]},
        "orgadmin": {"identity": "p4", "roles": ["organisation-admin"], "orgAdminFor": ["org0"]},
        "p6": {"identity": "p6", "roles": ["volunteer", "opportunity-provider"]},
        "p7": {"identity": "p7", "roles": ["volunteer"]}
    }
}"#;

pub fn fixtures() -> Fixtures {
    Fixtures::from_json_str(FIXTURES).unwrap()
}

pub fn session(name: &str) -> Session {
    fixtures()
        .session(name)
        .unwrap_or_else(|| panic!("no fixture session {name}"))
}

pub fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::from_fixtures(&fixtures()))
}

pub fn compiler(store: Arc<MemoryStore>) -> AbilityCompiler {
    standard_compiler(&EngineConfig::default(), store)
}

/// Service over a fresh store, returned alongside the store for inspection
pub fn service() -> (InterestService, Arc<MemoryStore>) {
    service_with_guard(TransitionGuard::standard().clone())
}

pub fn service_with_guard(guard: TransitionGuard) -> (InterestService, Arc<MemoryStore>) {
    let store = store();
    let service = InterestService::new(
        Arc::new(compiler(store.clone())),
        store.clone(),
        guard,
        EventBus::default(),
    );
    (service, store)
}

pub fn ids<T: AsRef<str>>(items: impl IntoIterator<Item = T>) -> Vec<String> {
    items.into_iter().map(|s| s.as_ref().to_string()).collect()
}
