//! Persistence collaborator
//!
//! The engine only needs query-by-filter plus find/save/delete. Filters are
//! the ones produced by [`crate::ability::filter_for`], optionally ANDed with
//! caller narrowing such as an id.

pub mod fixtures;
pub mod memory;

pub use fixtures::Fixtures;
pub use memory::MemoryStore;

use crate::ability::Filter;
use crate::error::StoreError;
use crate::model::Interest;
// async_trait required for dyn-compatibility with Arc<dyn InterestStore>
use async_trait::async_trait;

/// Interest persistence
#[async_trait]
pub trait InterestStore: Send + Sync {
    /// All interests matching `filter`, oldest first
    async fn query(&self, filter: &Filter) -> Result<Vec<Interest>, StoreError>;

    /// First interest matching `filter`
    async fn find_one(&self, filter: &Filter) -> Result<Option<Interest>, StoreError>;

    /// Insert or replace by id. An empty id is assigned a fresh one.
    async fn save(&self, interest: Interest) -> Result<Interest, StoreError>;

    /// Delete the first interest matching `filter`, returning the deleted count
    async fn delete_one(&self, filter: &Filter) -> Result<u64, StoreError>;
}
