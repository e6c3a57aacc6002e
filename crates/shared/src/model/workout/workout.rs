use serde::{Deserialize, Serialize};

use super::WorkoutEntry;

/// Aggregate root. Owns its entries exclusively, they are only ever written
/// together with the workout and removed along with it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Assigned by the store on create. Ignored on input
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration_minutes: i64,
    #[serde(default)]
    pub calories_burned: i64,
    #[serde(default)]
    pub entries: Vec<WorkoutEntry>,
}

impl Workout {
    pub fn new<T: Into<String>>(title: T) -> Self {
        Self {
            id: 0,
            title: title.into(),
            description: String::new(),
            duration_minutes: 0,
            calories_burned: 0,
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, entry: WorkoutEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Sorts entries into display order. The sort is stable so entries sharing
    /// an order_index keep their relative position
    pub fn sort_entries(&mut self) {
        self.entries.sort_by_key(|e| e.order_index);
    }
}
