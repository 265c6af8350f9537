//! Lesson pool.
//!
//! Expands a [`Demand`] into the flat arena of atomic lesson units that
//! every gene indexes into. Group `g` owns the contiguous sub-range
//! `[g * T, (g + 1) * T)`: its required subjects in declared order, each
//! repeated once per lesson unit, followed by free periods.
//!
//! The pool is built once per run and only read afterwards.

use serde::{Deserialize, Serialize};

use super::Demand;
use crate::error::TimetableError;
use crate::validation::validate_demand;

/// One atomic hour of the week for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lesson {
    /// Free period.
    Free,
    /// A taught hour.
    Class {
        /// Owning group index.
        group: usize,
        /// Teacher index.
        teacher: usize,
        /// Subject name.
        subject: String,
    },
}

impl Lesson {
    /// Whether this is a free period.
    pub fn is_free(&self) -> bool {
        matches!(self, Lesson::Free)
    }

    /// Subject name, `None` for free periods.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Lesson::Free => None,
            Lesson::Class { subject, .. } => Some(subject),
        }
    }

    /// Teacher index, `None` for free periods.
    pub fn teacher(&self) -> Option<usize> {
        match self {
            Lesson::Free => None,
            Lesson::Class { teacher, .. } => Some(*teacher),
        }
    }
}

/// Immutable arena of lessons for all groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPool {
    lessons: Vec<Lesson>,
    groups: usize,
    slots_per_week: usize,
}

impl LessonPool {
    /// Builds the pool from a validated demand.
    ///
    /// # Errors
    /// [`TimetableError::InvalidDemand`] if the demand fails validation;
    /// the pool is never built from a partial demand.
    pub fn build(demand: &Demand) -> Result<Self, TimetableError> {
        validate_demand(demand).map_err(TimetableError::InvalidDemand)?;

        let slots_per_week = demand.layout.slots_per_week();
        let mut lessons = Vec::with_capacity(demand.groups.len() * slots_per_week);

        for (group_idx, group) in demand.groups.iter().enumerate() {
            let start = lessons.len();
            for req in &group.subjects {
                // validated above: every requirement has a teacher
                let Some(teacher) = req.teacher else { continue };
                for _ in 0..req.lesson_units() {
                    lessons.push(Lesson::Class {
                        group: group_idx,
                        teacher,
                        subject: req.subject.clone(),
                    });
                }
            }
            lessons.resize(start + slots_per_week, Lesson::Free);
        }

        Ok(Self {
            lessons,
            groups: demand.groups.len(),
            slots_per_week,
        })
    }

    /// Number of groups.
    pub fn groups(&self) -> usize {
        self.groups
    }

    /// Positions per group (`T`).
    pub fn slots_per_week(&self) -> usize {
        self.slots_per_week
    }

    /// Total number of lessons (`groups * T`).
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Lesson at a global pool index.
    pub fn get(&self, index: usize) -> Option<&Lesson> {
        self.lessons.get(index)
    }

    /// Lesson at a group-local offset.
    pub fn lesson(&self, group: usize, offset: usize) -> Option<&Lesson> {
        if group >= self.groups || offset >= self.slots_per_week {
            return None;
        }
        self.lessons.get(group * self.slots_per_week + offset)
    }

    /// A group's sub-range of the pool.
    pub fn group_lessons(&self, group: usize) -> &[Lesson] {
        if group >= self.groups {
            return &[];
        }
        let start = group * self.slots_per_week;
        &self.lessons[start..start + self.slots_per_week]
    }
}
