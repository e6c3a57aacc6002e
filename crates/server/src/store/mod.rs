//! Persistence contract for the workout aggregate.

use async_trait::async_trait;
use shared::model::Workout;

mod error;
pub use error::*;

mod sqlite;
pub use sqlite::*;

mod memory;
pub use memory::*;

/// Create/read/update/delete over a workout and its entries as one unit.
///
/// Writes spanning several rows are all-or-nothing: a failed call leaves the
/// store exactly as it was before the call.
#[async_trait]
pub trait WorkoutStore: Send + Sync + 'static {
    /// Stores the workout and its entries, returning it with generated ids
    /// filled in. Ids on the input are ignored
    async fn create(&self, workout: Workout) -> Result<Workout, StoreError>;

    /// The workout with its entries sorted by order_index
    async fn get_by_id(&self, id: i64) -> Result<Workout, StoreError>;

    /// Modifies the existing workout and the listed entries in place.
    ///
    /// Entries are matched by id and must already belong to the workout. New
    /// entries aren't inserted and entries missing from the input aren't
    /// removed.
    async fn update(&self, workout: Workout) -> Result<(), StoreError>;

    /// Removes the workout along with all of its entries
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}
