pub mod config;
pub mod engine;
pub mod leaders;
pub mod matrix;
pub mod summary;
pub mod validation;

pub use config::*;
pub use engine::{
    calculate_score, filter_by_min_appointments, next_min_appointments, rank_reps,
    FactorContribution, RankedRep, ScoreBreakdown, ScoreResult, DEFAULT_MIN_APPOINTMENTS,
    MIN_APPOINTMENT_PRESETS,
};
pub use leaders::{bucket_score, category_leaders, category_rankings, BucketEntry};
pub use matrix::{matrix_cell, matrix_rows, MatrixRow};
pub use summary::{summary, Summary, TopPerformer};
pub use validation::validate_scoring;
