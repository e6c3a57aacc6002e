use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutEntry {
    /// Assigned by the store on create. Identifies the row to modify on update
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub exercise_name: String,
    #[serde(default)]
    pub sets: i64,
    /// Absent for duration based exercises
    #[serde(default)]
    pub reps: Option<i64>,
    /// Absent for rep based exercises
    #[serde(default)]
    pub duration_seconds: Option<i64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub order_index: i64,
}

impl WorkoutEntry {
    pub fn new<T: Into<String>>(exercise_name: T, sets: i64, order_index: i64) -> Self {
        Self {
            id: 0,
            exercise_name: exercise_name.into(),
            sets,
            reps: None,
            duration_seconds: None,
            weight: None,
            notes: String::new(),
            order_index,
        }
    }

    pub fn with_reps(mut self, reps: i64) -> Self {
        self.reps = Some(reps);
        self
    }

    pub fn with_duration_seconds(mut self, duration_seconds: i64) -> Self {
        self.duration_seconds = Some(duration_seconds);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_notes<T: Into<String>>(mut self, notes: T) -> Self {
        self.notes = notes.into();
        self
    }
}
