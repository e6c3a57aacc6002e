use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use shared::api::Object;
use tower_http::{
    timeout::{RequestBodyTimeoutLayer, TimeoutLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::AppState;

mod health;
pub use health::*;

mod workout;
pub use workout::*;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(Object::Health.path(), get(health))
        .route(Object::Workout.path(), post(create_workout))
        .route(
            Object::WorkoutId.path(),
            get(fetch_workout).put(update_workout).delete(delete_workout),
        )
}

/// Full application with tracing and the read/write deadlines applied.
///
/// `read_timeout` bounds how long reading a request body may take,
/// `write_timeout` bounds producing the whole response. A request that runs
/// past `write_timeout` is answered with 408, but the store call it started
/// is not cancelled. Sqlite work runs on a blocking thread and a create or
/// update may still commit after the 408 was sent.
pub fn app(state: AppState, read_timeout: Duration, write_timeout: Duration) -> Router {
    router()
        .layer(RequestBodyTimeoutLayer::new(read_timeout))
        .layer(TimeoutLayer::new(write_timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
