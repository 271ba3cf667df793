//! Transition guard tests

use std::collections::HashMap;
use vly_ability::ability::{ResourceType, Role, TransitionGuard, TransitionTable};
use vly_ability::config::{TransitionTableConfig, load_config_from_str};
use vly_ability::model::InterestStatus;

const STATUSES: [InterestStatus; 6] = [
    InterestStatus::Interested,
    InterestStatus::Invited,
    InterestStatus::Committed,
    InterestStatus::Declined,
    InterestStatus::Completed,
    InterestStatus::Cancelled,
];

// =============================================================================
// Built-in Interest table
// =============================================================================

#[test]
fn test_volunteer_transition_matrix() {
    let guard = TransitionGuard::standard();
    let allowed = [
        (InterestStatus::Invited, InterestStatus::Committed),
        (InterestStatus::Committed, InterestStatus::Interested),
    ];

    for from in STATUSES {
        for to in STATUSES {
            let expected = allowed.contains(&(from, to));
            assert_eq!(
                guard.allowed_transition(
                    ResourceType::Interest,
                    from.as_str(),
                    to.as_str(),
                    Role::Volunteer
                ),
                expected,
                "{from} -> {to}"
            );
        }
    }
}

#[test]
fn test_other_roles_bypass_the_guard() {
    let guard = TransitionGuard::standard();

    for role in [
        Role::Anonymous,
        Role::OpportunityProvider,
        Role::OrganisationAdmin,
        Role::Administrator,
    ] {
        assert!(!guard.applies_to(ResourceType::Interest, role));
        for from in STATUSES {
            for to in STATUSES {
                assert!(guard.allowed_transition(
                    ResourceType::Interest,
                    from.as_str(),
                    to.as_str(),
                    role
                ));
            }
        }
    }
}

#[test]
fn test_guard_is_shared_and_immutable() {
    let a = TransitionGuard::standard();
    let b = TransitionGuard::standard();
    assert!(std::ptr::eq(a, b));
    assert_eq!(
        a.table(ResourceType::Interest),
        Some(&TransitionTable::interest())
    );
}

#[tokio::test]
async fn test_guard_is_safe_to_share_across_tasks() {
    let handles: Vec<_> = (0..8)
        .map(|_| {
            tokio::spawn(async {
                TransitionGuard::standard().allowed_transition(
                    ResourceType::Interest,
                    "invited",
                    "committed",
                    Role::Volunteer,
                )
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap());
    }
}

// =============================================================================
// Configured tables
// =============================================================================

#[test]
fn test_custom_table() {
    let table = TransitionTable::new(ResourceType::Interest, Role::OpportunityProvider, "status")
        .allow("interested", "invited")
        .allow("interested", "declined");
    let guard = TransitionGuard::new([table]);

    assert!(guard.allowed_transition(
        ResourceType::Interest,
        "interested",
        "declined",
        Role::OpportunityProvider
    ));
    assert!(!guard.allowed_transition(
        ResourceType::Interest,
        "invited",
        "committed",
        Role::OpportunityProvider
    ));
    // Volunteers are no longer governed by this guard
    assert!(guard.allowed_transition(
        ResourceType::Interest,
        "interested",
        "completed",
        Role::Volunteer
    ));
}

#[test]
fn test_table_from_loaded_config() {
    let config = load_config_from_str(
        r#"
[transitions.interest_archive]
actor = "administrator"
allowed = { completed = ["cancelled"] }
"#,
    )
    .unwrap();
    let guard = TransitionGuard::from_config(&config.transitions).unwrap();

    // Built-in interest table is kept alongside the configured one
    assert!(guard.applies_to(ResourceType::Interest, Role::Volunteer));
    assert!(guard.allowed_transition(
        ResourceType::InterestArchive,
        "completed",
        "cancelled",
        Role::Administrator
    ));
    assert!(!guard.allowed_transition(
        ResourceType::InterestArchive,
        "cancelled",
        "completed",
        Role::Administrator
    ));
}

#[test]
fn test_empty_config_is_the_standard_guard() {
    let guard = TransitionGuard::from_config(&HashMap::new()).unwrap();
    assert_eq!(
        guard.table(ResourceType::Interest),
        TransitionGuard::standard().table(ResourceType::Interest)
    );
}

#[test]
fn test_unknown_field_rejected() {
    let config = HashMap::from([(
        "interest".to_string(),
        TransitionTableConfig {
            field: "colour".to_string(),
            ..Default::default()
        },
    )]);
    assert!(TransitionGuard::from_config(&config).is_err());
}
