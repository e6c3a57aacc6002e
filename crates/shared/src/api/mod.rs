use const_format::concatcp;
pub mod error;

pub const API_BASE_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Object {
    Workout,
    WorkoutId,
    Health,
}

impl Object {
    pub const fn path(&self) -> &str {
        use Object::*;
        match self {
            Workout => concatcp!(API_BASE_PATH, "workout"),
            WorkoutId => concatcp!(API_BASE_PATH, "workout/:id"),
            Health => concatcp!(API_BASE_PATH, "health"),
        }
    }

    /// Path with the `:id` segment filled in
    pub fn path_with_id<T: ToString>(&self, id: T) -> String {
        self.path().replace(":id", &id.to_string())
    }
}
