use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use shared::model::Workout;

use super::{StoreError, WorkoutStore};

#[derive(Debug, Default)]
struct Tables {
    last_workout_id: i64,
    last_entry_id: i64,
    workouts: BTreeMap<i64, Workout>,
}

/// Store kept entirely in process memory. Follows the same contract as the
/// sqlite store, including ids that are never reused after a delete
#[derive(Debug, Default)]
pub struct MemoryWorkoutStore {
    tables: Mutex<Tables>,
}

impl MemoryWorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // Updates validate everything before writing, the data behind a
        // poisoned lock is still consistent
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl WorkoutStore for MemoryWorkoutStore {
    async fn create(&self, mut workout: Workout) -> Result<Workout, StoreError> {
        let mut tables = self.tables();

        tables.last_workout_id += 1;
        workout.id = tables.last_workout_id;
        for entry in workout.entries.iter_mut() {
            tables.last_entry_id += 1;
            entry.id = tables.last_entry_id;
        }

        tables.workouts.insert(workout.id, workout.clone());
        Ok(workout)
    }

    async fn get_by_id(&self, id: i64) -> Result<Workout, StoreError> {
        let mut workout = self
            .tables()
            .workouts
            .get(&id)
            .cloned()
            .ok_or(StoreError::WorkoutNotFound(id))?;

        // Stored in insertion order so the stable sort matches the sqlite tie break
        workout.sort_entries();
        Ok(workout)
    }

    async fn update(&self, changed: Workout) -> Result<(), StoreError> {
        let mut tables = self.tables();
        let stored = tables
            .workouts
            .get_mut(&changed.id)
            .ok_or(StoreError::WorkoutNotFound(changed.id))?;

        let mut positions = Vec::with_capacity(changed.entries.len());
        for entry in &changed.entries {
            let position = stored
                .entries
                .iter()
                .position(|e| e.id == entry.id)
                .ok_or(StoreError::EntryNotFound {
                    workout_id: changed.id,
                    entry_id: entry.id,
                })?;
            positions.push(position);
        }

        stored.title = changed.title;
        stored.description = changed.description;
        stored.duration_minutes = changed.duration_minutes;
        stored.calories_burned = changed.calories_burned;
        for (position, entry) in positions.into_iter().zip(changed.entries) {
            stored.entries[position] = entry;
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.tables()
            .workouts
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::WorkoutNotFound(id))
    }
}

#[cfg(test)]
mod test {
    use shared::model::WorkoutEntry;

    use super::*;

    fn leg_day() -> Workout {
        Workout::new("Leg Day")
            .with_entry(WorkoutEntry::new("Squat", 3, 1).with_reps(10))
            .with_entry(WorkoutEntry::new("Lunge", 3, 0).with_reps(12))
    }

    #[tokio::test]
    async fn test_create_and_fetch_sorted() {
        let store = MemoryWorkoutStore::new();
        let created = store.create(leg_day()).await.unwrap();
        assert_eq!(created.id, 1);
        // Returned in submitted order, fetched in display order
        assert_eq!(created.entries[0].exercise_name, "Squat");

        let fetched = store.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.entries[0].exercise_name, "Lunge");
        assert_eq!(fetched.entries[1].exercise_name, "Squat");
    }

    #[tokio::test]
    async fn test_ids_not_reused() {
        let store = MemoryWorkoutStore::new();
        let first = store.create(leg_day()).await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.create(leg_day()).await.unwrap();

        assert!(second.id > first.id);
        assert!(second.entries[0].id > first.entries[1].id);
    }

    #[tokio::test]
    async fn test_update_unknown_entry_changes_nothing() {
        let store = MemoryWorkoutStore::new();
        let original = store.create(leg_day()).await.unwrap();

        let mut changed = original.clone();
        changed.title = "Changed".into();
        changed.entries[0].sets = 9;
        changed.entries[1].id = 99;

        let err = store.update(changed).await.unwrap_err();
        assert!(matches!(err, StoreError::EntryNotFound { entry_id: 99, .. }));

        let fetched = store.get_by_id(original.id).await.unwrap();
        assert_eq!(fetched.title, "Leg Day");
        assert!(fetched.entries.iter().all(|e| e.sets == 3));
    }

    #[tokio::test]
    async fn test_update_missing_workout() {
        let store = MemoryWorkoutStore::new();
        let err = store.update(leg_day()).await.unwrap_err();
        assert!(matches!(err, StoreError::WorkoutNotFound(0)));
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let store = MemoryWorkoutStore::new();
        assert!(store.delete(1).await.unwrap_err().is_not_found());
    }
}
