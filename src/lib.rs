//! Weekly class timetabling.
//!
//! Turns a teaching demand (student groups, the subjects and weekly hours
//! each group needs, teachers and their unavailable slots) into a weekly
//! timetable per group using a generational genetic algorithm.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Demand`, `StudentGroup`, `Teacher`,
//!   `WeekLayout`, `Lesson`, `LessonPool`, `Timetable`
//! - **`ga`**: Genes, chromosomes, fitness, operators and the search runner
//! - **`input`**: Sectioned text format reader
//! - **`validation`**: Demand integrity checks (capacity, references, slot ranges)
//! - **`error`**: Crate error type
//!
//! # Example
//!
//! ```
//! use u_timetable::ga::{GaConfig, GaRunner, TimetableProblem};
//! use u_timetable::models::{Demand, StudentGroup, Teacher, WeekLayout};
//!
//! let mut demand = Demand::new(WeekLayout::new(2, 2))
//!     .with_group(StudentGroup::new("A").with_subject("Math", 2))
//!     .with_teacher(Teacher::new("Ada", "Math"));
//! demand.assign_teachers();
//!
//! let problem = TimetableProblem::new(demand).unwrap();
//! let config = GaConfig::default().with_population_size(10).with_seed(1);
//! let result = GaRunner::new(&problem, config).run().unwrap();
//! assert!(result.is_solved());
//! ```
//!
//! # References
//!
//! - Colorni, Dorigo & Maniezzo (1998), "Metaheuristics for High School Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod error;
pub mod ga;
pub mod input;
pub mod models;
pub mod validation;

pub use error::TimetableError;
