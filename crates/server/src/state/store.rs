use std::{convert::Infallible, ops::Deref, sync::Arc};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::store::WorkoutStore;

/// Extracts the workout store from the app state
pub struct Store(pub Arc<dyn WorkoutStore>);

impl From<Arc<dyn WorkoutStore>> for Store {
    fn from(store: Arc<dyn WorkoutStore>) -> Self {
        Store(store)
    }
}

impl Deref for Store {
    type Target = Arc<dyn WorkoutStore>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Store
where
    S: Send + Sync,
    Arc<dyn WorkoutStore>: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(<Arc<dyn WorkoutStore>>::from_ref(state).into())
    }
}
