//! Timetable (solution) model.
//!
//! The decoded, caller-facing form of a chromosome: for each group, the
//! subject taught at every week position, plus any constraint conflicts
//! left in a best-effort result.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A complete weekly timetable for all groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timetable {
    /// Per-group schedules, in group order.
    pub groups: Vec<GroupTimetable>,
    /// Fitness of the chromosome this was decoded from.
    pub fitness: f64,
    /// Conflicts remaining (empty for a perfect timetable).
    pub conflicts: Vec<Conflict>,
}

/// One group's week.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTimetable {
    /// Group name.
    pub name: String,
    /// Subject at each week position; `None` is a free period.
    pub slots: Vec<Option<String>>,
    /// Subject → week positions it occupies (ascending).
    pub subject_positions: BTreeMap<String, Vec<usize>>,
}

impl GroupTimetable {
    /// Builds a group timetable from its per-position subjects.
    pub fn new(name: impl Into<String>, slots: Vec<Option<String>>) -> Self {
        let mut subject_positions: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (pos, subject) in slots.iter().enumerate() {
            if let Some(subject) = subject {
                subject_positions.entry(subject.clone()).or_default().push(pos);
            }
        }
        Self {
            name: name.into(),
            slots,
            subject_positions,
        }
    }

    /// Number of taught (non-free) positions.
    pub fn taught_hours(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

impl Timetable {
    /// Whether no conflicts remain.
    pub fn is_conflict_free(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Looks up a group by name.
    pub fn group(&self, name: &str) -> Option<&GroupTimetable> {
        self.groups.iter().find(|g| g.name == name)
    }
}

/// A hard-constraint violation at one week position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Type of violation.
    pub kind: ConflictKind,
    /// Week position.
    pub position: usize,
    /// Teacher name.
    pub teacher: String,
    /// Groups involved.
    pub groups: Vec<String>,
}

/// Classification of timetable conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    /// Teacher is scheduled while declared unavailable.
    TeacherUnavailable,
    /// Teacher is scheduled for more than one group at once.
    DoubleBooked,
}
