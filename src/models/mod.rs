//! Timetabling domain models.
//!
//! Provides the data types describing what must be taught (demand), the
//! atomic lesson units derived from it (lesson pool), and the decoded
//! weekly result (timetable).
//!
//! # Domain Mappings
//!
//! | u-timetable | School | University | Training Center |
//! |-------------|--------|------------|-----------------|
//! | StudentGroup | Class | Section | Cohort |
//! | Teacher | Teacher | Lecturer | Instructor |
//! | Lesson | Period | Lecture Hour | Session |
//! | Timetable | Class Timetable | Course Schedule | Session Plan |

mod demand;
mod lesson;
mod timetable;

pub use demand::{is_lab_subject, Demand, StudentGroup, SubjectRequirement, Teacher, WeekLayout};
pub use lesson::{Lesson, LessonPool};
pub use timetable::{Conflict, ConflictKind, GroupTimetable, Timetable};
