use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Weekday;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use log::{LevelFilter, debug};

use dumbbell::domain::{
    Difficulty, Exercise, ExerciseFilter, ExerciseId, Name, Workout, WorkoutFilter, WorkoutId,
};
use dumbbell::recommendation::RecommendationEngine;
use dumbbell::{
    ExerciseRepository, Repository, Store, StoreConfig, WorkoutRepository, WorkoutWithExercises,
};

#[derive(Parser, Debug)]
#[command(version, about = "Dumbbell - Workout Planner CLI", long_about = None)]
struct Args {
    /// SQLite database path, overrides DATABASE_URL
    #[arg(long, global = true)]
    database: Option<String>,

    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the database and apply migrations
    Init,
    /// Insert the bundled exercise catalog, keeping existing entries
    Seed,
    /// Manage the exercise catalog
    #[command(subcommand)]
    Exercise(ExerciseCommand),
    /// Manage workouts and their exercises
    #[command(subcommand)]
    Workout(WorkoutCommand),
}

#[derive(Subcommand, Debug)]
enum ExerciseCommand {
    Add(NewExercise),
    List {
        #[arg(short, long)]
        muscle: Option<String>,
        #[arg(short, long)]
        equipment: Option<String>,
        #[arg(long, value_enum)]
        difficulty: Option<DifficultyArg>,
    },
    Show {
        id: String,
    },
    Delete {
        id: String,
    },
}

#[derive(ClapArgs, Debug)]
struct NewExercise {
    id: String,
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Target muscle, repeatable
    #[arg(short, long = "muscle")]
    muscles: Vec<String>,
    /// Required equipment, repeatable
    #[arg(short, long)]
    equipment: Vec<String>,
    #[arg(long, default_value_t = 3)]
    sets: u32,
    #[arg(long, default_value_t = 10)]
    reps: u32,
    /// Rest between sets in seconds
    #[arg(long, default_value_t = 60)]
    rest: u64,
    #[arg(long)]
    thumbnail: Option<String>,
    #[arg(long, value_enum, default_value_t = DifficultyArg::Beginner)]
    difficulty: DifficultyArg,
}

#[derive(Subcommand, Debug)]
enum WorkoutCommand {
    Create {
        name: String,
        #[arg(short, long, value_enum)]
        day: DayArg,
        /// Id to use instead of a generated one
        #[arg(long)]
        id: Option<String>,
        /// Target muscle group, repeatable
        #[arg(short, long)]
        target: Vec<String>,
    },
    List {
        #[arg(short, long, value_enum)]
        day: Option<DayArg>,
    },
    Show {
        id: String,
    },
    Delete {
        id: String,
    },
    /// Append an exercise, or place it at a free position
    Add {
        workout: String,
        exercise: String,
        #[arg(short, long)]
        position: Option<u32>,
    },
    /// Remove an exercise entry by its entry id
    Remove {
        entry: i64,
    },
    /// Give the workout's entry ids in their new order
    Reorder {
        workout: String,
        #[arg(num_args = 0..)]
        entries: Vec<i64>,
    },
    LogSet {
        entry: i64,
        weight: f64,
        reps: u32,
        #[arg(long)]
        incomplete: bool,
    },
    /// Suggest catalog exercises for the workout's muscle groups
    Suggest {
        workout: String,
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DifficultyArg {
    Beginner,
    Intermediate,
    Advanced,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Beginner => Difficulty::Beginner,
            DifficultyArg::Intermediate => Difficulty::Intermediate,
            DifficultyArg::Advanced => Difficulty::Advanced,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DayArg {
    #[value(alias = "mon")]
    Monday,
    #[value(alias = "tue")]
    Tuesday,
    #[value(alias = "wed")]
    Wednesday,
    #[value(alias = "thu")]
    Thursday,
    #[value(alias = "fri")]
    Friday,
    #[value(alias = "sat")]
    Saturday,
    #[value(alias = "sun")]
    Sunday,
}

impl From<DayArg> for Weekday {
    fn from(value: DayArg) -> Self {
        match value {
            DayArg::Monday => Weekday::Mon,
            DayArg::Tuesday => Weekday::Tue,
            DayArg::Wednesday => Weekday::Wed,
            DayArg::Thursday => Weekday::Thu,
            DayArg::Friday => Weekday::Fri,
            DayArg::Saturday => Weekday::Sat,
            DayArg::Sunday => Weekday::Sun,
        }
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn open_store(database: Option<String>) -> Result<Store> {
    let config = match database {
        Some(url) => StoreConfig::new(url),
        None => StoreConfig::from_env()?,
    };
    Store::open(&config).with_context(|| format!("opening database {}", config.database_url))
}

fn exercise_id(id: &str) -> Result<ExerciseId> {
    ExerciseId::new(id).with_context(|| format!("invalid exercise id {id:?}"))
}

fn workout_id(id: &str) -> Result<WorkoutId> {
    WorkoutId::new(id).with_context(|| format!("invalid workout id {id:?}"))
}

fn print_exercise_line(exercise: &Exercise) {
    println!(
        "{}, {} [{}] {}",
        exercise.id,
        exercise.name,
        exercise.difficulty,
        exercise.target_muscles.join(", ")
    );
}

fn print_workout_line(workout: &Workout) {
    println!(
        "{}, {} ({})",
        workout.id, workout.name, workout.day_of_week
    );
}

fn print_workout(view: &WorkoutWithExercises) {
    let workout = &view.workout;
    print_workout_line(workout);
    if !workout.target_muscle_groups.is_empty() {
        println!("targets: {}", workout.target_muscle_groups.join(", "));
    }
    println!("updated: {}", workout.updated_at.to_rfc3339());
    for entry in &view.exercises {
        println!(
            "\t#{} [{}] {} ({}x{})",
            entry.association.id,
            entry.association.position,
            entry.exercise.name,
            entry.exercise.default_sets,
            entry.exercise.default_reps
        );
        for set in &entry.sets {
            println!(
                "\t\tset {}: {} kg x {}{}",
                set.set_index,
                set.weight_kg,
                set.reps,
                if set.completed { "" } else { " (incomplete)" }
            );
        }
    }
    for warning in &view.warnings {
        println!("\twarning: {warning}");
    }
}

fn run_exercise(repository: &Repository, command: ExerciseCommand) -> Result<()> {
    match command {
        ExerciseCommand::Add(new) => {
            let mut exercise = Exercise::new(
                exercise_id(&new.id)?,
                Name::new(&new.name)?,
                new.difficulty.into(),
            )
            .with_target_muscles(new.muscles)
            .with_equipment(new.equipment);
            exercise.description = new.description;
            exercise.default_sets = new.sets;
            exercise.default_reps = new.reps;
            exercise.default_rest = Duration::from_secs(new.rest);
            exercise.thumbnail_url = new.thumbnail;

            let exercise = repository.create_exercise(exercise)?;
            println!("Created exercise {}", exercise.id);
        }
        ExerciseCommand::List {
            muscle,
            equipment,
            difficulty,
        } => {
            let filter = ExerciseFilter {
                muscle,
                equipment,
                difficulty: difficulty.map(Difficulty::from),
            };
            for exercise in repository.list_exercises(&filter)? {
                print_exercise_line(&exercise);
            }
        }
        ExerciseCommand::Show { id } => {
            let exercise = repository.get_exercise(&exercise_id(&id)?)?;
            print_exercise_line(&exercise);
            if !exercise.description.is_empty() {
                println!("{}", exercise.description);
            }
            println!("equipment: {}", exercise.equipment.join(", "));
            println!(
                "default: {} x {}, rest {}s",
                exercise.default_sets,
                exercise.default_reps,
                exercise.default_rest.as_secs_f64()
            );
        }
        ExerciseCommand::Delete { id } => {
            repository.delete_exercise(&exercise_id(&id)?)?;
            println!("Deleted exercise {id}");
        }
    }
    Ok(())
}

fn run_workout(repository: &Repository, command: WorkoutCommand) -> Result<()> {
    match command {
        WorkoutCommand::Create {
            name,
            day,
            id,
            target,
        } => {
            let id = match id {
                Some(id) => workout_id(&id)?,
                None => WorkoutId::generate(),
            };
            let workout = Workout::new(id, Name::new(&name)?, day.into())
                .with_target_muscle_groups(target);
            let workout = repository.create_workout(workout)?;
            println!("Created workout {}", workout.id);
        }
        WorkoutCommand::List { day } => {
            let filter = WorkoutFilter {
                day_of_week: day.map(Weekday::from),
            };
            for workout in repository.list_workouts(&filter)? {
                print_workout_line(&workout);
            }
        }
        WorkoutCommand::Show { id } => {
            let view = repository.get_with_exercises(&workout_id(&id)?)?;
            print_workout(&view);
        }
        WorkoutCommand::Delete { id } => {
            repository.delete_workout(&workout_id(&id)?)?;
            println!("Deleted workout {id}");
        }
        WorkoutCommand::Add {
            workout,
            exercise,
            position,
        } => {
            let workout = workout_id(&workout)?;
            let position = match position {
                Some(position) => position,
                None => repository.next_position(&workout)?,
            };
            let entry = repository.add_exercise(&workout, &exercise_id(&exercise)?, position)?;
            println!(
                "Added {} to {} as entry #{} at position {}",
                entry.exercise_id, entry.workout_id, entry.id, entry.position
            );
        }
        WorkoutCommand::Remove { entry } => {
            repository.remove_exercise(entry)?;
            println!("Removed entry #{entry}");
        }
        WorkoutCommand::Reorder { workout, entries } => {
            let workout = workout_id(&workout)?;
            repository.reorder(&workout, &entries)?;
            print_workout(&repository.get_with_exercises(&workout)?);
        }
        WorkoutCommand::LogSet {
            entry,
            weight,
            reps,
            incomplete,
        } => {
            let set = repository.log_set(entry, weight, reps, !incomplete)?;
            println!(
                "Logged set {} for entry #{}: {} kg x {}",
                set.set_index, entry, set.weight_kg, set.reps
            );
        }
        WorkoutCommand::Suggest { workout, limit } => {
            let engine = RecommendationEngine::new(repository.clone());
            let suggestions = engine.recommend_exercises(&workout_id(&workout)?, limit)?;
            if suggestions.is_empty() {
                println!("No suggestions, set target muscle groups on the workout first");
            }
            for suggestion in suggestions {
                println!(
                    "{}, {} (matches {})",
                    suggestion.exercise.id,
                    suggestion.exercise.name,
                    suggestion.matched_muscles.join(", ")
                );
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();
    init_logger(args.verbose);

    let store = open_store(args.database)?;
    debug!("Schema version {}", store.schema_version()?);

    match args.command {
        Commands::Init => {
            println!("Database ready at schema version {}", store.schema_version()?);
            Ok(())
        }
        Commands::Seed => {
            let inserted = dumbbell::seed::seed_catalog(&store)?;
            println!("Added {inserted} catalog exercises");
            Ok(())
        }
        Commands::Exercise(command) => run_exercise(&Repository::new(store), command),
        Commands::Workout(command) => run_workout(&Repository::new(store), command),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_workout_add_without_position() {
        let args = Args::try_parse_from(["dumbbell", "workout", "add", "w1", "squat"]).unwrap();
        match args.command {
            Commands::Workout(WorkoutCommand::Add { position, .. }) => assert_eq!(position, None),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_reorder_accepts_empty_workout() {
        let args = Args::try_parse_from(["dumbbell", "workout", "reorder", "w1"]).unwrap();
        match args.command {
            Commands::Workout(WorkoutCommand::Reorder { workout, entries }) => {
                assert_eq!(workout, "w1");
                assert!(entries.is_empty());
            }
            other => panic!("unexpected command {other:?}"),
        }

        let args = Args::try_parse_from(["dumbbell", "workout", "reorder", "w1", "3", "1", "2"])
            .unwrap();
        match args.command {
            Commands::Workout(WorkoutCommand::Reorder { entries, .. }) => {
                assert_eq!(entries, vec![3, 1, 2])
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
