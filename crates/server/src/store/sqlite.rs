use async_trait::async_trait;
use deadpool_sqlite::{Object, Pool};
use shared::model::Workout;

use super::{StoreError, WorkoutStore};
use crate::db::model::workout;

/// Store backed by the sqlite pool. Every call checks out its own connection
#[derive(Debug, Clone)]
pub struct SqliteWorkoutStore {
    pool: Pool,
}

impl SqliteWorkoutStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<Object, StoreError> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl WorkoutStore for SqliteWorkoutStore {
    async fn create(&self, new_workout: Workout) -> Result<Workout, StoreError> {
        self.conn()
            .await?
            .interact(move |conn| workout::create(conn, new_workout))
            .await?
    }

    async fn get_by_id(&self, id: i64) -> Result<Workout, StoreError> {
        self.conn()
            .await?
            .interact(move |conn| workout::fetch_by_id(conn, id))
            .await?
    }

    async fn update(&self, changed: Workout) -> Result<(), StoreError> {
        self.conn()
            .await?
            .interact(move |conn| workout::update(conn, &changed))
            .await?
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.conn()
            .await?
            .interact(move |conn| workout::delete(conn, id))
            .await?
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use shared::model::WorkoutEntry;
    use tempfile::TempDir;

    use super::*;
    use crate::db;

    fn store() -> (TempDir, SqliteWorkoutStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.sqlite");
        let path = path.to_str().unwrap();

        db::run_migrations(path).unwrap();
        let pool = db::create_pool(path, 4, Duration::from_secs(5)).unwrap();
        (dir, SqliteWorkoutStore::new(pool))
    }

    fn leg_day() -> Workout {
        Workout::new("Leg Day")
            .with_entry(WorkoutEntry::new("Squat", 3, 0).with_reps(10))
            .with_entry(WorkoutEntry::new("Lunge", 3, 1).with_reps(12))
    }

    #[tokio::test]
    async fn test_crud() {
        let (_dir, store) = store();

        let created = store.create(leg_day()).await.unwrap();
        assert!(created.id > 0);
        assert!(created.entries.iter().all(|e| e.id > 0));
        assert_eq!(store.get_by_id(created.id).await.unwrap(), created);

        let mut changed = created.clone();
        changed.title = "Leg Day II".into();
        changed.entries[1].reps = Some(15);
        store.update(changed.clone()).await.unwrap();
        assert_eq!(store.get_by_id(created.id).await.unwrap(), changed);

        store.delete(created.id).await.unwrap();
        assert!(store.get_by_id(created.id).await.unwrap_err().is_not_found());
        assert!(store.delete(created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_cascade_through_pool() {
        let (dir, store) = store();
        let created = store.create(leg_day()).await.unwrap();
        store.delete(created.id).await.unwrap();

        // Look at the table directly on a separate connection
        let conn = db::open_connection(dir.path().join("store.sqlite").to_str().unwrap()).unwrap();
        let remaining: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM workout_entries WHERE workout_id = ?1",
                [created.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_last_commit_wins() {
        let (_dir, store) = store();
        let created = store.create(leg_day()).await.unwrap();

        let mut a = created.clone();
        a.title = "A".into();
        a.entries.iter_mut().for_each(|e| e.notes = "a".into());

        let mut b = created.clone();
        b.title = "B".into();
        b.entries.iter_mut().for_each(|e| e.notes = "b".into());

        for _ in 0..10 {
            let (ra, rb) = tokio::join!(store.update(a.clone()), store.update(b.clone()));
            ra.unwrap();
            rb.unwrap();

            // Whichever committed last wins as a whole, never a mix of both
            let fetched = store.get_by_id(created.id).await.unwrap();
            assert!(fetched == a || fetched == b, "interleaved update: {fetched:?}");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_ids() {
        let (_dir, store) = store();

        let results = create_many(&store, 8).await;
        let mut ids: Vec<i64> = results.iter().map(|w| w.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);

        for created in results {
            assert_eq!(store.get_by_id(created.id).await.unwrap(), created);
        }
    }

    async fn create_many(store: &SqliteWorkoutStore, n: usize) -> Vec<Workout> {
        let mut handles = Vec::with_capacity(n);
        for i in 0..n {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create(Workout::new(format!("Workout {i}"))).await
            }));
        }

        let mut results = Vec::with_capacity(n);
        for handle in handles {
            results.push(handle.await.unwrap().unwrap());
        }
        results
    }
}
