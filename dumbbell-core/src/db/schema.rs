// Kept in sync with the SQL under `migrations/`.

diesel::table! {
    exercises (id) {
        id -> Text,
        name -> Text,
        description -> Text,
        target_muscles -> Text,
        equipment -> Text,
        default_sets -> Integer,
        default_reps -> Integer,
        default_rest_ms -> BigInt,
        thumbnail_url -> Nullable<Text>,
        difficulty -> Text,
    }
}

diesel::table! {
    workouts (id) {
        id -> Text,
        name -> Text,
        day_of_week -> Integer,
        target_muscle_groups -> Text,
        created_at -> BigInt,
        updated_at -> BigInt,
    }
}

diesel::table! {
    workout_exercises (id) {
        id -> BigInt,
        workout_id -> Text,
        exercise_id -> Text,
        position -> Integer,
    }
}

diesel::table! {
    exercise_sets (id) {
        id -> BigInt,
        workout_exercise_id -> BigInt,
        set_index -> Integer,
        weight_kg -> Double,
        reps -> Integer,
        completed -> Bool,
    }
}

diesel::joinable!(workout_exercises -> workouts (workout_id));
diesel::joinable!(workout_exercises -> exercises (exercise_id));
diesel::joinable!(exercise_sets -> workout_exercises (workout_exercise_id));

diesel::allow_tables_to_appear_in_same_query!(
    exercise_sets,
    exercises,
    workout_exercises,
    workouts,
);
