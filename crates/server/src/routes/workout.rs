use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use shared::model::Workout;
use tracing::{debug, instrument};

use crate::{AppError, Store};

/// Workout id taken from the request path. Anything that isn't an integer is
/// rejected before the store is touched
#[derive(Debug, Clone, Copy)]
pub struct WorkoutId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for WorkoutId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state).await?;
        Ok(WorkoutId(id))
    }
}

/// Workout decoded from a json body. Decode failures of any kind are a 400
#[derive(Debug)]
pub struct WorkoutBody(pub Workout);

#[async_trait]
impl<S> FromRequest<S> for WorkoutBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(workout) = Json::<Workout>::from_request(req, state).await?;
        Ok(WorkoutBody(workout))
    }
}

#[instrument(skip(store))]
pub async fn fetch_workout(
    store: Store,
    WorkoutId(id): WorkoutId,
) -> Result<Json<Workout>, AppError> {
    let workout = store.get_by_id(id).await?;
    Ok(Json(workout))
}

#[instrument(skip(store, workout))]
pub async fn create_workout(
    store: Store,
    WorkoutBody(workout): WorkoutBody,
) -> Result<(StatusCode, Json<Workout>), AppError> {
    let created = store.create(workout).await?;
    debug!(id = created.id, "Created workout");
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(store, workout))]
pub async fn update_workout(
    store: Store,
    WorkoutId(id): WorkoutId,
    WorkoutBody(mut workout): WorkoutBody,
) -> Result<Json<Workout>, AppError> {
    // The path decides which workout is updated
    workout.id = id;
    store.update(workout).await?;

    let updated = store.get_by_id(id).await?;
    Ok(Json(updated))
}

#[instrument(skip(store))]
pub async fn delete_workout(
    store: Store,
    WorkoutId(id): WorkoutId,
) -> Result<StatusCode, AppError> {
    store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
