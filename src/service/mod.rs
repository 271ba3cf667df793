//! Controller-level operations
//!
//! Services compile the session's ability, push it into store queries,
//! enforce instance checks and the transition guard, and publish events
//! after successful mutations.

pub mod interest;

pub use interest::{InterestService, ListQuery};
