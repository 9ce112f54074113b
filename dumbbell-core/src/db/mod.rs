pub mod models;
pub mod operations;
pub mod schema;

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sql_types::Integer;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{debug, info};

use crate::config::StoreConfig;
use crate::domain::{
    Exercise, ExerciseFilter, ExerciseId, ExerciseSet, Workout, WorkoutExercise, WorkoutFilter,
    WorkoutId, WriteMode,
};
use crate::error::{Result, StoreError};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type PooledConn = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// `PRAGMA user_version` after every embedded migration has run.
pub const SCHEMA_VERSION: i32 = 2;

#[derive(Debug)]
struct ConnectionOptions {
    busy_timeout: Duration,
    wal: bool,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        let mut pragmas = format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        );
        if self.wal {
            pragmas.push_str(" PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;");
        }
        conn.batch_execute(&pragmas)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

#[derive(QueryableByName)]
struct UserVersion {
    #[diesel(sql_type = Integer)]
    user_version: i32,
}

/// Handle to the SQLite entity store. Cloning shares the connection pool.
///
/// Every operation runs in its own transaction; multi-row mutations take the
/// write lock up front (`BEGIN IMMEDIATE`) so a cascade or reindex is either
/// fully visible or not at all.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
}

impl Store {
    /// Opens (creating if missing) the database and applies pending migrations.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        debug!(
            "Opening store at {} with {} connections",
            config.database_url, config.pool_size
        );
        let manager = ConnectionManager::<SqliteConnection>::new(&config.database_url);
        // r2d2 panics on a zero connection timeout.
        let connect_timeout = config.connect_timeout.max(Duration::from_millis(1));
        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(connect_timeout)
            .connection_customizer(Box::new(ConnectionOptions {
                busy_timeout: config.busy_timeout,
                wal: true,
            }))
            .build(manager)?;

        let store = Self { pool };
        store.migrate()?;
        Ok(store)
    }

    /// A private database living as long as the store. Backed by a single
    /// connection since each SQLite memory connection is its own database.
    pub fn open_in_memory() -> Result<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(":memory:");
        let pool = Pool::builder()
            .max_size(1)
            .max_lifetime(None)
            .idle_timeout(None)
            .connection_customizer(Box::new(ConnectionOptions {
                busy_timeout: Duration::from_millis(5000),
                wal: false,
            }))
            .build(manager)?;

        let store = Self { pool };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let mut pooled = self.conn()?;
        let conn: &mut SqliteConnection = &mut pooled;
        let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            StoreError::StorageUnavailable(format!("failed to apply migrations: {e}"))
        })?;

        if applied.is_empty() {
            debug!("Schema is up to date");
        }
        for version in applied {
            info!("Applied migration {version}");
        }
        Ok(())
    }

    pub(crate) fn conn(&self) -> Result<PooledConn> {
        self.pool.get().map_err(StoreError::from)
    }

    /// Runs `f` inside a deferred transaction, for consistent multi-query reads.
    pub(crate) fn read<T>(
        &self,
        f: impl FnOnce(&mut SqliteConnection) -> Result<T>,
    ) -> Result<T> {
        let mut pooled = self.conn()?;
        let conn: &mut SqliteConnection = &mut pooled;
        conn.transaction(f)
    }

    /// Runs `f` inside an immediate transaction; nothing is committed if it fails.
    pub(crate) fn write<T>(
        &self,
        f: impl FnOnce(&mut SqliteConnection) -> Result<T>,
    ) -> Result<T> {
        let mut pooled = self.conn()?;
        let conn: &mut SqliteConnection = &mut pooled;
        conn.immediate_transaction(f)
    }

    pub fn schema_version(&self) -> Result<i32> {
        let mut pooled = self.conn()?;
        let conn: &mut SqliteConnection = &mut pooled;
        let version = diesel::sql_query("PRAGMA user_version").get_result::<UserVersion>(conn)?;
        Ok(version.user_version)
    }

    // Exercises

    pub fn put_exercise(&self, exercise: &Exercise, mode: WriteMode) -> Result<()> {
        self.write(|conn| operations::put_exercise(conn, exercise, mode))
    }

    pub fn get_exercise(&self, id: &ExerciseId) -> Result<Exercise> {
        self.read(|conn| operations::get_exercise(conn, id))
    }

    /// Exercises matching `filter`, ordered by name.
    pub fn list_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>> {
        self.read(|conn| operations::list_exercises(conn, filter))
    }

    pub fn delete_exercise(&self, id: &ExerciseId) -> Result<()> {
        self.write(|conn| operations::delete_exercise(conn, id))
    }

    // Workouts

    pub fn put_workout(&self, workout: &Workout, mode: WriteMode) -> Result<Workout> {
        self.write(|conn| operations::put_workout(conn, workout, mode))
    }

    pub fn get_workout(&self, id: &WorkoutId) -> Result<Workout> {
        self.read(|conn| operations::get_workout(conn, id))
    }

    /// Workouts matching `filter`, ordered by day of week then name.
    pub fn list_workouts(&self, filter: &WorkoutFilter) -> Result<Vec<Workout>> {
        self.read(|conn| operations::list_workouts(conn, filter))
    }

    /// Deletes the workout together with its exercise entries and their logged sets.
    pub fn delete_workout(&self, id: &WorkoutId) -> Result<()> {
        self.write(|conn| operations::delete_workout(conn, id))
    }

    // Workout composition

    pub fn add_exercise_to_workout(
        &self,
        workout_id: &WorkoutId,
        exercise_id: &ExerciseId,
        position: u32,
    ) -> Result<WorkoutExercise> {
        self.write(|conn| {
            operations::add_exercise_to_workout(conn, workout_id, exercise_id, position)
        })
    }

    /// Rewrites positions so that `new_order[i]` sits at position `i`.
    pub fn reorder_workout_exercises(&self, workout_id: &WorkoutId, new_order: &[i64]) -> Result<()> {
        self.write(|conn| operations::reorder_workout_exercises(conn, workout_id, new_order))
    }

    pub fn remove_exercise_from_workout(&self, association_id: i64) -> Result<()> {
        self.write(|conn| operations::remove_exercise_from_workout(conn, association_id))
    }

    pub fn workout_exercises(&self, workout_id: &WorkoutId) -> Result<Vec<WorkoutExercise>> {
        self.read(|conn| operations::workout_exercises(conn, workout_id))
    }

    pub fn next_free_position(&self, workout_id: &WorkoutId) -> Result<u32> {
        self.read(|conn| operations::next_free_position(conn, workout_id))
    }

    // Logged sets

    pub fn log_set(
        &self,
        association_id: i64,
        weight_kg: f64,
        reps: u32,
        completed: bool,
    ) -> Result<ExerciseSet> {
        self.write(|conn| operations::log_set(conn, association_id, weight_kg, reps, completed))
    }

    pub fn list_sets(&self, association_id: i64) -> Result<Vec<ExerciseSet>> {
        self.read(|conn| operations::list_sets(conn, association_id))
    }

    pub fn update_set(
        &self,
        set_id: i64,
        weight_kg: f64,
        reps: u32,
        completed: bool,
    ) -> Result<ExerciseSet> {
        self.write(|conn| operations::update_set(conn, set_id, weight_kg, reps, completed))
    }

    pub fn delete_set(&self, set_id: i64) -> Result<()> {
        self.write(|conn| operations::delete_set(conn, set_id))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(QueryableByName)]
    struct ForeignKeys {
        #[diesel(sql_type = Integer)]
        foreign_keys: i32,
    }

    #[test]
    fn test_in_memory_store_is_migrated() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_foreign_keys_enabled_on_acquire() {
        let store = Store::open_in_memory().unwrap();
        let mut pooled = store.conn().unwrap();
        let conn: &mut SqliteConnection = &mut pooled;
        let pragma = diesel::sql_query("PRAGMA foreign_keys")
            .get_result::<ForeignKeys>(conn)
            .unwrap();
        assert_eq!(pragma.foreign_keys, 1);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let store = Store::open_in_memory().unwrap();
        let result: Result<()> = store.write(|conn| {
            conn.batch_execute(
                "INSERT INTO workouts (id, name, day_of_week, created_at, updated_at) \
                 VALUES ('w1', 'Legs', 0, 0, 0)",
            )?;
            Err(StoreError::InvalidArgument("abort".into()))
        });

        assert!(result.is_err());
        assert!(matches!(
            store.get_workout(&WorkoutId::new("w1").unwrap()),
            Err(StoreError::NotFound(_))
        ));
    }
}
