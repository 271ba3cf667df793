//! Volunteer interest ability engine
//!
//! Role-based, attribute-conditioned authorization for a volunteering
//! platform. A session's roles are compiled into an ordered rule list
//! (an [`Ability`]) that answers two questions: may this session act on this
//! record, and which records may it see.
//!
//! ## Features
//!
//! - **Declarative rules** with equality and set-membership conditions
//! - **Query filters** compiled from rules so hidden records are never fetched
//! - **Transition guard** restricting status changes for volunteers
//! - **Flexible configuration** via TOML files and environment variables
//!
//! ## Evaluation Model
//!
//! ```text
//! anonymous → volunteer → opportunity-provider → organisation-admin → administrator
//! ```
//!
//! Rule sets are concatenated in that order and the last matching rule wins.
//!
//! ## Example Configuration
//!
//! ```toml
//! [engine]
//! concurrent_builders = true
//!
//! [transitions.interest]
//! actor = "volunteer"
//! allowed = { invited = ["committed"], committed = ["interested"] }
//! ```

pub mod ability;
pub mod builders;
pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod service;
pub mod store;

// Re-export main types
pub use ability::{Ability, AbilityCompiler, Action, Filter, ResourceType, Role, Session};
pub use config::{AppConfig, load_config};
pub use error::{AppError, Result};
pub use service::InterestService;
