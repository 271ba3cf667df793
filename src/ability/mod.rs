//! Ability engine
//!
//! Turns a session (identity + held roles) into a composable set of
//! permission rules and evaluates them in two ways: instance checks and
//! query-filter compilation.
//!
//! ## Model
//!
//! ```text
//! Session → RuleBuilder (per role) → AbilityCompiler → Ability → can / filter_for
//! ```
//!
//! Rule sets are concatenated in a fixed role-priority order:
//!
//! 1. anonymous
//! 2. volunteer
//! 3. opportunity-provider
//! 4. organisation-admin
//! 5. administrator
//!
//! Later rules win instance checks ("last matching rule wins"). An ability
//! with no rule for an action denies it.
//!
//! Status mutations are additionally gated by the [`TransitionGuard`] for the
//! role it governs.

pub mod compiler;
pub mod evaluator;
pub mod filter;
pub mod rule;
pub mod subject;
pub mod transition;
pub mod types;

pub use compiler::{Ability, AbilityCompiler};
pub use evaluator::{can, filter_for, has_grant};
pub use filter::Filter;
pub use rule::{Condition, Matcher, Rule, RuleSet};
pub use subject::{Record, Subject};
pub use transition::{TransitionGuard, TransitionTable};
pub use types::{Action, ResourceType, Role, RoleSet, Session};
