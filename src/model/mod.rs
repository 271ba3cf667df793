//! Domain records
//!
//! Plain data the engine evaluates. Field names follow the stored document
//! shape (`_id`, camelCase), which is also what rule conditions reference.

pub mod interest;
pub mod opportunity;

pub use interest::{Interest, InterestStatus, InterestUpdate, Message, NewInterest, UpdateKind};
pub use opportunity::Opportunity;
