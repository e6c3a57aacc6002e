mod store;
pub use store::*;

use std::sync::Arc;

use axum::extract::FromRef;

use crate::store::WorkoutStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn WorkoutStore>,
}

impl AppState {
    pub fn new<S: WorkoutStore>(store: S) -> Self {
        Self { store: Arc::new(store) }
    }
}

impl FromRef<AppState> for Arc<dyn WorkoutStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}
