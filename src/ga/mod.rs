//! GA-based timetable search.
//!
//! # Encoding
//!
//! A chromosome holds one [`ScheduleGene`] per student group. A gene is a
//! permutation of the group's week positions: position `p` of the gene
//! names the lesson (an offset into the group's slice of the
//! [`LessonPool`](crate::models::LessonPool)) taught at week slot `p`.
//!
//! # Fitness
//!
//! Penalty points accrue for every lesson taught by an unavailable teacher
//! and for every extra group a teacher is booked into at the same slot.
//! Fitness is `1 - penalty / max_penalty`, so `1.0` means conflict-free.
//!
//! # Submodules
//!
//! - [`operators`]: Runtime-selectable selection and mutation strategies,
//!   plus the gene-swap crossover

mod chromosome;
mod config;
mod gene;
pub mod operators;
mod problem;
mod runner;

pub use chromosome::TimetableChromosome;
pub use config::GaConfig;
pub use gene::ScheduleGene;
pub use operators::{GeneticOperators, MutationReport, MutationType, Selection};
pub use problem::{PenaltyWeights, TimetableProblem};
pub use runner::{GaResult, GaRunner, Outcome};
