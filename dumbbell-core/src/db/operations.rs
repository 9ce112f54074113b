use std::collections::{HashMap, HashSet};

use diesel::dsl::{exists, max};
use diesel::prelude::*;
use log::debug;

use crate::db::models::{
    ExerciseRow, ExerciseSetRow, NewExerciseSet, NewWorkoutExercise, WorkoutExerciseRow,
    WorkoutRow, to_db_int,
};
use crate::db::schema::{exercise_sets, exercises, workout_exercises, workouts};
use crate::domain::{
    Exercise, ExerciseFilter, ExerciseId, ExerciseSet, Workout, WorkoutExercise, WorkoutFilter,
    WorkoutId, WriteMode, bump,
};
use crate::error::{Result, StoreError};

// Exercises
pub fn exercise_exists(conn: &mut SqliteConnection, id: &ExerciseId) -> Result<bool> {
    diesel::select(exists(exercises::table.find(id.as_str())))
        .get_result::<bool>(conn)
        .map_err(Into::into)
}

pub fn put_exercise(
    conn: &mut SqliteConnection,
    exercise: &Exercise,
    mode: WriteMode,
) -> Result<()> {
    exercise.validate()?;
    let row = ExerciseRow::from_domain(exercise)?;

    match (mode, exercise_exists(conn, &exercise.id)?) {
        (WriteMode::CreateOnly, true) => Err(StoreError::ConstraintViolation(format!(
            "exercise {} already exists",
            exercise.id
        ))),
        (WriteMode::UpdateOnly, false) => Err(StoreError::not_found("exercise", &exercise.id)),
        (_, false) => {
            diesel::insert_into(exercises::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        }
        (WriteMode::Overwrite | WriteMode::UpdateOnly, true) => {
            diesel::update(exercises::table.find(exercise.id.as_str()))
                .set(&row)
                .execute(conn)?;
            Ok(())
        }
    }
}

pub fn get_exercise(conn: &mut SqliteConnection, id: &ExerciseId) -> Result<Exercise> {
    exercises::table
        .find(id.as_str())
        .select(ExerciseRow::as_select())
        .first::<ExerciseRow>(conn)
        .optional()?
        .ok_or_else(|| StoreError::not_found("exercise", id))?
        .try_into()
}

pub fn list_exercises(
    conn: &mut SqliteConnection,
    filter: &ExerciseFilter,
) -> Result<Vec<Exercise>> {
    let rows = exercises::table
        .select(ExerciseRow::as_select())
        .order((exercises::name.asc(), exercises::id.asc()))
        .load::<ExerciseRow>(conn)?;

    let mut matching = Vec::with_capacity(rows.len());
    for row in rows {
        let exercise = Exercise::try_from(row)?;
        if filter.matches(&exercise) {
            matching.push(exercise);
        }
    }
    Ok(matching)
}

/// Loads the given exercises keyed by id; ids without a row are left out.
pub fn exercises_by_id(
    conn: &mut SqliteConnection,
    ids: Vec<&str>,
) -> Result<HashMap<String, Exercise>> {
    exercises::table
        .filter(exercises::id.eq_any(ids))
        .select(ExerciseRow::as_select())
        .load::<ExerciseRow>(conn)?
        .into_iter()
        .map(|row| Ok((row.id.clone(), Exercise::try_from(row)?)))
        .collect()
}

pub fn delete_exercise(conn: &mut SqliteConnection, id: &ExerciseId) -> Result<()> {
    if !exercise_exists(conn, id)? {
        return Err(StoreError::not_found("exercise", id));
    }

    let references: i64 = workout_exercises::table
        .filter(workout_exercises::exercise_id.eq(id.as_str()))
        .count()
        .get_result(conn)?;
    if references > 0 {
        return Err(StoreError::ConstraintViolation(format!(
            "exercise {id} is used by {references} workout entries"
        )));
    }

    diesel::delete(exercises::table.find(id.as_str())).execute(conn)?;
    Ok(())
}

// Workouts
fn find_workout_row(conn: &mut SqliteConnection, id: &WorkoutId) -> Result<Option<WorkoutRow>> {
    workouts::table
        .find(id.as_str())
        .select(WorkoutRow::as_select())
        .first::<WorkoutRow>(conn)
        .optional()
        .map_err(Into::into)
}

pub fn workout_exists(conn: &mut SqliteConnection, id: &WorkoutId) -> Result<bool> {
    diesel::select(exists(workouts::table.find(id.as_str())))
        .get_result::<bool>(conn)
        .map_err(Into::into)
}

/// Stores `workout`. Replacing an existing row keeps the stored `created_at`
/// and bumps `updated_at`.
pub fn put_workout(
    conn: &mut SqliteConnection,
    workout: &Workout,
    mode: WriteMode,
) -> Result<Workout> {
    workout.validate()?;
    let mut row = WorkoutRow::from_domain(workout)?;

    match (mode, find_workout_row(conn, &workout.id)?) {
        (WriteMode::CreateOnly, Some(_)) => {
            return Err(StoreError::ConstraintViolation(format!(
                "workout {} already exists",
                workout.id
            )));
        }
        (WriteMode::UpdateOnly, None) => {
            return Err(StoreError::not_found("workout", &workout.id));
        }
        (_, None) => {
            diesel::insert_into(workouts::table)
                .values(&row)
                .execute(conn)?;
        }
        (WriteMode::Overwrite | WriteMode::UpdateOnly, Some(existing)) => {
            let existing = Workout::try_from(existing)?;
            row.created_at = existing.created_at.timestamp_millis();
            row.updated_at = bump(existing.updated_at).timestamp_millis();
            diesel::update(workouts::table.find(workout.id.as_str()))
                .set(&row)
                .execute(conn)?;
        }
    }

    Workout::try_from(row)
}

pub fn get_workout(conn: &mut SqliteConnection, id: &WorkoutId) -> Result<Workout> {
    find_workout_row(conn, id)?
        .ok_or_else(|| StoreError::not_found("workout", id))?
        .try_into()
}

pub fn list_workouts(conn: &mut SqliteConnection, filter: &WorkoutFilter) -> Result<Vec<Workout>> {
    let rows = workouts::table
        .select(WorkoutRow::as_select())
        .order((
            workouts::day_of_week.asc(),
            workouts::name.asc(),
            workouts::id.asc(),
        ))
        .load::<WorkoutRow>(conn)?;

    let mut matching = Vec::with_capacity(rows.len());
    for row in rows {
        let workout = Workout::try_from(row)?;
        if filter.matches(&workout) {
            matching.push(workout);
        }
    }
    Ok(matching)
}

pub fn delete_workout(conn: &mut SqliteConnection, id: &WorkoutId) -> Result<()> {
    if !workout_exists(conn, id)? {
        return Err(StoreError::not_found("workout", id));
    }

    let owned = workout_exercises::table
        .filter(workout_exercises::workout_id.eq(id.as_str()))
        .select(workout_exercises::id);
    let sets = diesel::delete(
        exercise_sets::table.filter(exercise_sets::workout_exercise_id.eq_any(owned)),
    )
    .execute(conn)?;
    let entries = diesel::delete(
        workout_exercises::table.filter(workout_exercises::workout_id.eq(id.as_str())),
    )
    .execute(conn)?;
    diesel::delete(workouts::table.find(id.as_str())).execute(conn)?;

    debug!("Deleted workout {id} with {entries} exercise entries and {sets} sets");
    Ok(())
}

/// Bumps `updated_at` after a change to the workout's exercise list.
fn touch_workout(conn: &mut SqliteConnection, id: &WorkoutId) -> Result<()> {
    let workout = get_workout(conn, id)?;
    diesel::update(workouts::table.find(id.as_str()))
        .set(workouts::updated_at.eq(bump(workout.updated_at).timestamp_millis()))
        .execute(conn)?;
    Ok(())
}

// Workout exercises
pub fn workout_exercises(
    conn: &mut SqliteConnection,
    workout_id: &WorkoutId,
) -> Result<Vec<WorkoutExercise>> {
    if !workout_exists(conn, workout_id)? {
        return Err(StoreError::not_found("workout", workout_id));
    }

    workout_exercises::table
        .filter(workout_exercises::workout_id.eq(workout_id.as_str()))
        .select(WorkoutExerciseRow::as_select())
        .order(workout_exercises::position.asc())
        .load::<WorkoutExerciseRow>(conn)?
        .into_iter()
        .map(WorkoutExercise::try_from)
        .collect()
}

pub fn next_free_position(conn: &mut SqliteConnection, workout_id: &WorkoutId) -> Result<u32> {
    if !workout_exists(conn, workout_id)? {
        return Err(StoreError::not_found("workout", workout_id));
    }

    let highest: Option<i32> = workout_exercises::table
        .filter(workout_exercises::workout_id.eq(workout_id.as_str()))
        .select(max(workout_exercises::position))
        .get_result(conn)?;

    match highest {
        None => Ok(0),
        Some(position) => u32::try_from(position)
            .ok()
            .and_then(|p| p.checked_add(1))
            .ok_or_else(|| {
                StoreError::corrupt("workout exercise", format!("position {position}"))
            }),
    }
}

pub fn add_exercise_to_workout(
    conn: &mut SqliteConnection,
    workout_id: &WorkoutId,
    exercise_id: &ExerciseId,
    position: u32,
) -> Result<WorkoutExercise> {
    if !workout_exists(conn, workout_id)? {
        return Err(StoreError::ConstraintViolation(format!(
            "workout {workout_id} does not exist"
        )));
    }
    if !exercise_exists(conn, exercise_id)? {
        return Err(StoreError::ConstraintViolation(format!(
            "exercise {exercise_id} does not exist"
        )));
    }

    let db_position = to_db_int(position, "position")?;
    let occupied: bool = diesel::select(exists(
        workout_exercises::table
            .filter(workout_exercises::workout_id.eq(workout_id.as_str()))
            .filter(workout_exercises::position.eq(db_position)),
    ))
    .get_result(conn)?;
    if occupied {
        return Err(StoreError::ConstraintViolation(format!(
            "position {position} is already used in workout {workout_id}"
        )));
    }

    let row = diesel::insert_into(workout_exercises::table)
        .values(&NewWorkoutExercise {
            workout_id: workout_id.as_str(),
            exercise_id: exercise_id.as_str(),
            position: db_position,
        })
        .returning(WorkoutExerciseRow::as_returning())
        .get_result::<WorkoutExerciseRow>(conn)?;

    touch_workout(conn, workout_id)?;
    WorkoutExercise::try_from(row)
}

pub fn reorder_workout_exercises(
    conn: &mut SqliteConnection,
    workout_id: &WorkoutId,
    new_order: &[i64],
) -> Result<()> {
    let current = workout_exercises(conn, workout_id)?;

    let current_ids: HashSet<i64> = current.iter().map(|entry| entry.id).collect();
    let requested_ids: HashSet<i64> = new_order.iter().copied().collect();
    if requested_ids.len() != new_order.len() {
        return Err(StoreError::InvalidArgument(format!(
            "new order for workout {workout_id} contains duplicate entries"
        )));
    }
    if requested_ids != current_ids {
        return Err(StoreError::InvalidArgument(format!(
            "new order for workout {workout_id} does not match its {} exercise entries",
            current.len()
        )));
    }

    // Park every entry on a distinct negative position first so the
    // (workout_id, position) uniqueness holds after each single update.
    for (index, id) in new_order.iter().enumerate() {
        let parked = -1 - to_db_int(index, "position")?;
        diesel::update(workout_exercises::table.find(*id))
            .set(workout_exercises::position.eq(parked))
            .execute(conn)?;
    }
    for (index, id) in new_order.iter().enumerate() {
        diesel::update(workout_exercises::table.find(*id))
            .set(workout_exercises::position.eq(to_db_int(index, "position")?))
            .execute(conn)?;
    }

    touch_workout(conn, workout_id)
}

pub fn remove_exercise_from_workout(conn: &mut SqliteConnection, association_id: i64) -> Result<()> {
    let row = workout_exercises::table
        .find(association_id)
        .select(WorkoutExerciseRow::as_select())
        .first::<WorkoutExerciseRow>(conn)
        .optional()?
        .ok_or_else(|| StoreError::not_found("workout exercise", association_id))?;
    let entry = WorkoutExercise::try_from(row)?;

    diesel::delete(
        exercise_sets::table.filter(exercise_sets::workout_exercise_id.eq(association_id)),
    )
    .execute(conn)?;
    diesel::delete(workout_exercises::table.find(association_id)).execute(conn)?;

    touch_workout(conn, &entry.workout_id)
}

// Sets
fn validate_set(weight_kg: f64, reps: u32) -> Result<i32> {
    if !weight_kg.is_finite() || weight_kg < 0.0 {
        return Err(StoreError::InvalidArgument(format!(
            "weight {weight_kg} must be a non-negative number"
        )));
    }
    to_db_int(reps, "rep count")
}

pub fn log_set(
    conn: &mut SqliteConnection,
    association_id: i64,
    weight_kg: f64,
    reps: u32,
    completed: bool,
) -> Result<ExerciseSet> {
    let reps = validate_set(weight_kg, reps)?;

    let entry_exists: bool =
        diesel::select(exists(workout_exercises::table.find(association_id))).get_result(conn)?;
    if !entry_exists {
        return Err(StoreError::ConstraintViolation(format!(
            "workout exercise {association_id} does not exist"
        )));
    }

    let highest: Option<i32> = exercise_sets::table
        .filter(exercise_sets::workout_exercise_id.eq(association_id))
        .select(max(exercise_sets::set_index))
        .get_result(conn)?;

    let row = diesel::insert_into(exercise_sets::table)
        .values(&NewExerciseSet {
            workout_exercise_id: association_id,
            set_index: highest.map(|n| n + 1).unwrap_or(1),
            weight_kg,
            reps,
            completed,
        })
        .returning(ExerciseSetRow::as_returning())
        .get_result::<ExerciseSetRow>(conn)?;

    ExerciseSet::try_from(row)
}

pub fn list_sets(conn: &mut SqliteConnection, association_id: i64) -> Result<Vec<ExerciseSet>> {
    exercise_sets::table
        .filter(exercise_sets::workout_exercise_id.eq(association_id))
        .select(ExerciseSetRow::as_select())
        .order(exercise_sets::set_index.asc())
        .load::<ExerciseSetRow>(conn)?
        .into_iter()
        .map(ExerciseSet::try_from)
        .collect()
}

/// All sets logged against the workout's entries, keyed by entry id and ordered by set index.
pub fn sets_for_workout(
    conn: &mut SqliteConnection,
    workout_id: &WorkoutId,
) -> Result<HashMap<i64, Vec<ExerciseSet>>> {
    let rows = exercise_sets::table
        .inner_join(workout_exercises::table)
        .filter(workout_exercises::workout_id.eq(workout_id.as_str()))
        .select(ExerciseSetRow::as_select())
        .order((
            exercise_sets::workout_exercise_id.asc(),
            exercise_sets::set_index.asc(),
        ))
        .load::<ExerciseSetRow>(conn)?;

    let mut sets: HashMap<i64, Vec<ExerciseSet>> = HashMap::new();
    for row in rows {
        let set = ExerciseSet::try_from(row)?;
        sets.entry(set.workout_exercise_id).or_default().push(set);
    }
    Ok(sets)
}

pub fn update_set(
    conn: &mut SqliteConnection,
    set_id: i64,
    weight_kg: f64,
    reps: u32,
    completed: bool,
) -> Result<ExerciseSet> {
    let reps = validate_set(weight_kg, reps)?;

    diesel::update(exercise_sets::table.find(set_id))
        .set((
            exercise_sets::weight_kg.eq(weight_kg),
            exercise_sets::reps.eq(reps),
            exercise_sets::completed.eq(completed),
        ))
        .returning(ExerciseSetRow::as_returning())
        .get_result::<ExerciseSetRow>(conn)
        .optional()?
        .ok_or_else(|| StoreError::not_found("exercise set", set_id))?
        .try_into()
}

pub fn delete_set(conn: &mut SqliteConnection, set_id: i64) -> Result<()> {
    match diesel::delete(exercise_sets::table.find(set_id)).execute(conn)? {
        0 => Err(StoreError::not_found("exercise set", set_id)),
        _ => Ok(()),
    }
}
