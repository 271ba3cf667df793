//! Ability types
//!
//! Core types used by the ability engine: roles, actions, resource types and
//! the per-request session.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Capability class a session may hold. Sessions may hold several.
///
/// The declaration order is the role-priority order used when concatenating
/// rule sets: later roles are appended later and therefore win `can` checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Anonymous,
    Volunteer,
    OpportunityProvider,
    OrganisationAdmin,
    Administrator,
}

impl Role {
    /// Fixed role-priority order for rule concatenation
    pub const PRIORITY: [Role; 5] = [
        Role::Anonymous,
        Role::Volunteer,
        Role::OpportunityProvider,
        Role::OrganisationAdmin,
        Role::Administrator,
    ];

    /// Get the role name as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Anonymous => "anonymous",
            Role::Volunteer => "volunteer",
            Role::OpportunityProvider => "opportunity-provider",
            Role::OrganisationAdmin => "organisation-admin",
            Role::Administrator => "administrator",
        }
    }

    /// Try to parse a role from a string
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "anonymous" | "anon" => Some(Role::Anonymous),
            "volunteer" => Some(Role::Volunteer),
            "opportunity-provider" | "opportunity_provider" => Some(Role::OpportunityProvider),
            "organisation-admin" | "organisation_admin" | "org-admin" => {
                Some(Role::OrganisationAdmin)
            }
            "administrator" | "admin" => Some(Role::Administrator),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Explicit finite set of roles held by a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Held roles, in role-priority order
    pub fn in_priority_order(&self) -> impl Iterator<Item = Role> + '_ {
        Role::PRIORITY.into_iter().filter(|role| self.contains(*role))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self {
        roles.into_iter().collect()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.in_priority_order().map(|r| r.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Operation requested on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    List,
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::List,
        Action::Read,
        Action::Create,
        Action::Update,
        Action::Delete,
    ];

    /// Get the action name as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// Try to parse an action from a string
    pub fn try_parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "list" => Some(Action::List),
            "read" => Some(Action::Read),
            "create" => Some(Action::Create),
            "update" => Some(Action::Update),
            "delete" => Some(Action::Delete),
            _ => None,
        }
    }

    /// Check if this action modifies data
    pub const fn is_mutating(&self) -> bool {
        matches!(self, Action::Create | Action::Update | Action::Delete)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Protected resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Interest,
    InterestArchive,
}

impl ResourceType {
    /// Get the resource name as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Interest => "interest",
            ResourceType::InterestArchive => "interest_archive",
        }
    }

    /// Try to parse a resource type from a string
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "interest" => Some(ResourceType::Interest),
            "interest_archive" | "interest-archive" => Some(ResourceType::InterestArchive),
            _ => None,
        }
    }

    /// Fields that exist on instances of this resource type.
    ///
    /// Rule conditions may only reference these.
    pub const fn fields(&self) -> &'static [&'static str] {
        match self {
            ResourceType::Interest | ResourceType::InterestArchive => {
                &["_id", "person", "opportunity", "status", "dateAdded"]
            }
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields().contains(&field)
    }

    /// Get all resource types
    pub fn all() -> &'static [ResourceType] {
        &[ResourceType::Interest, ResourceType::InterestArchive]
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-request security context: identity, held roles and role-scoped attributes.
///
/// Constructed by the identity collaborator before the engine runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Person id of the authenticated actor, absent for anonymous requests
    #[serde(default)]
    pub identity: Option<String>,
    /// Held roles
    #[serde(default)]
    pub roles: RoleSet,
    /// Organisations this actor administers
    #[serde(default)]
    pub org_admin_for: Vec<String>,
}

impl Session {
    /// Anonymous session holding only the anonymous role
    pub fn anonymous() -> Self {
        Self {
            identity: None,
            roles: RoleSet::from([Role::Anonymous]),
            org_admin_for: Vec::new(),
        }
    }

    /// Authenticated session with the given roles
    pub fn new(identity: impl Into<String>, roles: impl Into<RoleSet>) -> Self {
        Self {
            identity: Some(identity.into()),
            roles: roles.into(),
            org_admin_for: Vec::new(),
        }
    }

    /// Set the organisations this session administers
    pub fn with_org_admin_for<I, S>(mut self, orgs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.org_admin_for = orgs.into_iter().map(Into::into).collect();
        self
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn holds(&self, role: Role) -> bool {
        self.roles.contains(role)
    }
}
