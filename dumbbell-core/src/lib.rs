pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod read_model;
pub mod recommendation;
pub mod repository;
pub mod seed;

pub use config::StoreConfig;
pub use db::Store;
pub use error::StoreError;
pub use read_model::{ConsistencyWarning, ExerciseWithSets, WorkoutWithExercises};
pub use repository::{ExerciseRepository, Repository, WorkoutRepository};

#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();
#[cfg(feature = "uniffi")]
mod runtime;
#[cfg(feature = "uniffi")]
pub mod uniffi_interface;
