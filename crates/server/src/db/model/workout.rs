//! SQL for the workout aggregate. A workout row and its entry rows are only
//! ever written together inside a single transaction.

use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use sea_query::{Expr, Iden, Order, Query, SqliteQueryBuilder};
use sea_query_rusqlite::RusqliteBinder;
use shared::model::{Workout, WorkoutEntry};
use tracing::{debug, instrument};

use crate::store::StoreError;

#[derive(Iden)]
pub enum Workouts {
    Table,
    Id,
    Title,
    Description,
    DurationMinutes,
    CaloriesBurned,
}

#[derive(Iden)]
pub enum WorkoutEntries {
    Table,
    Id,
    WorkoutId,
    ExerciseName,
    Sets,
    Reps,
    DurationSeconds,
    Weight,
    Notes,
    OrderIndex,
}

const WORKOUT_STAR: [Workouts; 5] = [
    Workouts::Id,
    Workouts::Title,
    Workouts::Description,
    Workouts::DurationMinutes,
    Workouts::CaloriesBurned,
];

const WORKOUT_ENTRY_STAR: [WorkoutEntries; 8] = [
    WorkoutEntries::Id,
    WorkoutEntries::ExerciseName,
    WorkoutEntries::Sets,
    WorkoutEntries::Reps,
    WorkoutEntries::DurationSeconds,
    WorkoutEntries::Weight,
    WorkoutEntries::Notes,
    WorkoutEntries::OrderIndex,
];

fn workout_from_row(row: &Row) -> rusqlite::Result<Workout> {
    Ok(Workout {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        duration_minutes: row.get(3)?,
        calories_burned: row.get(4)?,
        entries: Vec::new(),
    })
}

fn entry_from_row(row: &Row) -> rusqlite::Result<WorkoutEntry> {
    Ok(WorkoutEntry {
        id: row.get(0)?,
        exercise_name: row.get(1)?,
        sets: row.get(2)?,
        reps: row.get(3)?,
        duration_seconds: row.get(4)?,
        weight: row.get(5)?,
        notes: row.get(6)?,
        order_index: row.get(7)?,
    })
}

/// Write transactions take the lock up front so a concurrent writer waits on
/// the busy timeout instead of failing with SQLITE_BUSY halfway through
fn write_transaction(conn: &mut Connection) -> Result<Transaction<'_>, rusqlite::Error> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
}

fn insert_entry(
    tx: &Transaction,
    workout_id: i64,
    entry: &WorkoutEntry,
) -> Result<i64, StoreError> {
    let (sql, values) = Query::insert()
        .into_table(WorkoutEntries::Table)
        .columns([
            WorkoutEntries::WorkoutId,
            WorkoutEntries::ExerciseName,
            WorkoutEntries::Sets,
            WorkoutEntries::Reps,
            WorkoutEntries::DurationSeconds,
            WorkoutEntries::Weight,
            WorkoutEntries::Notes,
            WorkoutEntries::OrderIndex,
        ])
        .values([
            workout_id.into(),
            entry.exercise_name.clone().into(),
            entry.sets.into(),
            entry.reps.into(),
            entry.duration_seconds.into(),
            entry.weight.into(),
            entry.notes.clone().into(),
            entry.order_index.into(),
        ])?
        .build_rusqlite(SqliteQueryBuilder);

    let mut stmt = tx.prepare_cached(&sql)?;
    stmt.execute(&*values.as_params())?;
    Ok(tx.last_insert_rowid())
}

/// Inserts the workout and all of its entries in one transaction. Any ids on
/// the input are ignored and replaced with the generated ones
#[instrument(skip(conn, workout), fields(title = %workout.title, entries = workout.entries.len()))]
pub fn create(conn: &mut Connection, mut workout: Workout) -> Result<Workout, StoreError> {
    let tx = write_transaction(conn)?;

    let (sql, values) = Query::insert()
        .into_table(Workouts::Table)
        .columns([
            Workouts::Title,
            Workouts::Description,
            Workouts::DurationMinutes,
            Workouts::CaloriesBurned,
        ])
        .values([
            workout.title.clone().into(),
            workout.description.clone().into(),
            workout.duration_minutes.into(),
            workout.calories_burned.into(),
        ])?
        .build_rusqlite(SqliteQueryBuilder);

    {
        let mut stmt = tx.prepare_cached(&sql)?;
        stmt.execute(&*values.as_params())?;
    }
    workout.id = tx.last_insert_rowid();

    for entry in workout.entries.iter_mut() {
        entry.id = insert_entry(&tx, workout.id, entry)?;
    }

    tx.commit()?;
    debug!(id = workout.id, "Created workout");

    Ok(workout)
}

/// Entries for a workout in display order. Ties on order_index fall back to
/// insertion order
pub fn fetch_entries(conn: &Connection, workout_id: i64) -> Result<Vec<WorkoutEntry>, StoreError> {
    let (sql, values) = Query::select()
        .columns(WORKOUT_ENTRY_STAR)
        .from(WorkoutEntries::Table)
        .and_where(Expr::col(WorkoutEntries::WorkoutId).eq(workout_id))
        .order_by(WorkoutEntries::OrderIndex, Order::Asc)
        .order_by(WorkoutEntries::Id, Order::Asc)
        .build_rusqlite(SqliteQueryBuilder);

    let mut stmt = conn.prepare_cached(&sql)?;
    let entries = stmt
        .query_map(&*values.as_params(), entry_from_row)?
        .collect::<Result<_, _>>()?;
    Ok(entries)
}

#[instrument(skip(conn))]
pub fn fetch_by_id(conn: &Connection, id: i64) -> Result<Workout, StoreError> {
    let (sql, values) = Query::select()
        .columns(WORKOUT_STAR)
        .from(Workouts::Table)
        .and_where(Expr::col(Workouts::Id).eq(id))
        .limit(1)
        .build_rusqlite(SqliteQueryBuilder);

    let mut workout = {
        let mut stmt = conn.prepare_cached(&sql)?;
        stmt.query_row(&*values.as_params(), workout_from_row)
            .optional()?
            .ok_or(StoreError::WorkoutNotFound(id))?
    };

    workout.entries = fetch_entries(conn, id)?;
    Ok(workout)
}

fn update_entry(tx: &Transaction, workout_id: i64, entry: &WorkoutEntry) -> Result<(), StoreError> {
    let (sql, values) = Query::update()
        .table(WorkoutEntries::Table)
        .values([
            (WorkoutEntries::ExerciseName, entry.exercise_name.clone().into()),
            (WorkoutEntries::Sets, entry.sets.into()),
            (WorkoutEntries::Reps, entry.reps.into()),
            (WorkoutEntries::DurationSeconds, entry.duration_seconds.into()),
            (WorkoutEntries::Weight, entry.weight.into()),
            (WorkoutEntries::Notes, entry.notes.clone().into()),
            (WorkoutEntries::OrderIndex, entry.order_index.into()),
        ])
        .and_where(Expr::col(WorkoutEntries::Id).eq(entry.id))
        // Entries belonging to another workout are treated as missing
        .and_where(Expr::col(WorkoutEntries::WorkoutId).eq(workout_id))
        .build_rusqlite(SqliteQueryBuilder);

    let mut stmt = tx.prepare_cached(&sql)?;
    match stmt.execute(&*values.as_params())? {
        0 => Err(StoreError::EntryNotFound {
            workout_id,
            entry_id: entry.id,
        }),
        _ => Ok(()),
    }
}

/// Updates the workout row and each listed entry row in place. Entries are
/// never added or removed; an entry id that doesn't exist under this workout
/// fails the whole update
#[instrument(skip(conn, workout), fields(id = workout.id, entries = workout.entries.len()))]
pub fn update(conn: &mut Connection, workout: &Workout) -> Result<(), StoreError> {
    let tx = write_transaction(conn)?;

    let (sql, values) = Query::update()
        .table(Workouts::Table)
        .values([
            (Workouts::Title, workout.title.clone().into()),
            (Workouts::Description, workout.description.clone().into()),
            (Workouts::DurationMinutes, workout.duration_minutes.into()),
            (Workouts::CaloriesBurned, workout.calories_burned.into()),
        ])
        .and_where(Expr::col(Workouts::Id).eq(workout.id))
        .build_rusqlite(SqliteQueryBuilder);

    let updated = {
        let mut stmt = tx.prepare_cached(&sql)?;
        stmt.execute(&*values.as_params())?
    };
    if updated == 0 {
        return Err(StoreError::WorkoutNotFound(workout.id));
    }

    for entry in &workout.entries {
        update_entry(&tx, workout.id, entry)?;
    }

    tx.commit()?;
    debug!("Updated workout");

    Ok(())
}

/// Deletes the workout row. Entry rows go with it through the foreign key
/// cascade
#[instrument(skip(conn))]
pub fn delete(conn: &Connection, id: i64) -> Result<(), StoreError> {
    let (sql, values) = Query::delete()
        .from_table(Workouts::Table)
        .and_where(Expr::col(Workouts::Id).eq(id))
        .build_rusqlite(SqliteQueryBuilder);

    let mut stmt = conn.prepare_cached(&sql)?;
    match stmt.execute(&*values.as_params())? {
        0 => Err(StoreError::WorkoutNotFound(id)),
        _ => Ok(()),
    }
}
