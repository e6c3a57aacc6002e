use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Workout {0} not found")]
    WorkoutNotFound(i64),
    #[error("Workout entry {entry_id} not found in workout {workout_id}")]
    EntryNotFound { workout_id: i64, entry_id: i64 },
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("Query builder error: {0}")]
    Query(#[from] sea_query::error::Error),
    #[error("Deadpool pool error: {0}")]
    DeadpoolPool(#[from] deadpool_sqlite::PoolError),
    #[error("Deadpool interact error: {0}")]
    DeadpoolInteract(String),
}

impl StoreError {
    /// Missing workout, or an entry that doesn't exist under the workout
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::WorkoutNotFound(_) | Self::EntryNotFound { .. })
    }
}

impl From<deadpool_sqlite::InteractError> for StoreError {
    fn from(err: deadpool_sqlite::InteractError) -> Self {
        Self::DeadpoolInteract(err.to_string())
    }
}
