//! Error types for vly-ability
//!
//! This module defines the error hierarchy used throughout the engine.
//! We use `thiserror` for library-style errors that are part of the API.
//! Permission denials and transition rejections are policy decisions and are
//! kept apart from service-level failures (rule build, store, config), which
//! must never be coerced into a grant or a deny.

use crate::ability::{Action, ResourceType, Role};
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rule build error: {0}")]
    RuleBuild(#[from] RuleBuildError),

    #[error("Permission denied: {0}")]
    PermissionDenied(#[from] PermissionDenied),

    #[error("Invalid transition: {0}")]
    InvalidTransition(#[from] InvalidTransition),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    /// HTTP-style status code for this error.
    ///
    /// `InvalidTransition` maps to 403 like a forbidden update does today;
    /// the two stay distinguishable through [`AppError::reason`].
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::PermissionDenied(denied) => match denied.presentation {
                Denial::Forbidden => 403,
                Denial::NotFound => 404,
            },
            AppError::InvalidTransition(_) => 403,
            AppError::Validation(_) => 422,
            AppError::Config(_) | AppError::RuleBuild(_) | AppError::Store(_) => 500,
        }
    }

    /// Short machine-friendly reason for the external presentation
    pub fn reason(&self) -> &'static str {
        match self {
            AppError::PermissionDenied(denied) => denied.presentation.as_str(),
            AppError::InvalidTransition(_) => "invalid status transition",
            AppError::Validation(_) => "validation failed",
            AppError::Config(_) => "configuration error",
            AppError::RuleBuild(_) => "ability unavailable",
            AppError::Store(_) => "store unavailable",
        }
    }

    /// Whether this error is a policy decision rather than a service failure
    pub fn is_policy_decision(&self) -> bool {
        matches!(
            self,
            AppError::PermissionDenied(_) | AppError::InvalidTransition(_)
        )
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A read-only ownership lookup failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{collection} lookup failed: {reason}")]
pub struct LookupError {
    pub collection: String,
    pub reason: String,
}

impl LookupError {
    pub fn new(collection: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            reason: reason.into(),
        }
    }
}

/// Failure to produce an Ability. Always a service error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleBuildError {
    #[error("ownership lookup for role '{role}' failed: {source}")]
    Lookup {
        role: Role,
        #[source]
        source: LookupError,
    },

    #[error("rule for '{subject}' references unknown field '{field}'")]
    UnknownField {
        subject: ResourceType,
        field: String,
    },

    #[error("builder for '{expected}' produced a rule for '{found}'")]
    SubjectMismatch {
        expected: ResourceType,
        found: ResourceType,
    },

    #[error("no rule builder registered for '{subject}'")]
    NoBuilder { subject: ResourceType },
}

/// How a permission denial is presented to the outside world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// The action is categorically unavailable to the session's roles
    Forbidden,
    /// The target lies outside the visible set; hide its existence
    NotFound,
}

impl Denial {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Denial::Forbidden => "forbidden",
            Denial::NotFound => "not found",
        }
    }
}

/// The ability excluded the action or instance
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{action} on '{subject}' is {}: {reason}", .presentation.as_str())]
pub struct PermissionDenied {
    pub action: Action,
    pub subject: ResourceType,
    pub presentation: Denial,
    pub reason: String,
}

impl PermissionDenied {
    pub fn forbidden(action: Action, subject: ResourceType) -> Self {
        Self {
            action,
            subject,
            presentation: Denial::Forbidden,
            reason: format!("no role held by the session may {} {}", action, subject),
        }
    }

    pub fn not_found(action: Action, subject: ResourceType) -> Self {
        Self {
            action,
            subject,
            presentation: Denial::NotFound,
            reason: "record is not visible to this session".into(),
        }
    }

    /// Forbidden with a custom reason (e.g. the instance failed an update check)
    pub fn forbidden_because(
        action: Action,
        subject: ResourceType,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            action,
            subject,
            presentation: Denial::Forbidden,
            reason: reason.into(),
        }
    }
}

/// Transition guard rejection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid status transition '{from}' -> '{to}' on '{subject}'")]
pub struct InvalidTransition {
    pub subject: ResourceType,
    pub from: String,
    pub to: String,
}

/// Record-level field constraint violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("unknown status value: {0}")]
    UnknownStatus(String),

    #[error("message body must not be empty")]
    EmptyMessage,
}

/// Persistence collaborator failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("store operation '{operation}' failed: {reason}")]
pub struct StoreError {
    pub operation: String,
    pub reason: String,
}

impl StoreError {
    pub fn new(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;
