//! Demand model.
//!
//! Describes what has to be taught in one week: student groups with their
//! required subjects and hours, the teachers available for each subject,
//! and the slots each teacher cannot work. The search treats a `Demand` as
//! immutable once teacher assignment has run.
//!
//! # Time Representation
//! A week position is an index in `[0, days_per_week * hours_per_day)`,
//! laid out day-major: position `p` is hour `p % hours_per_day` of day
//! `p / hours_per_day`.

use serde::{Deserialize, Serialize};

/// Shape of the teaching week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekLayout {
    /// Teaching days per week (default: 5).
    pub days_per_week: usize,
    /// Teaching hours per day (default: 7).
    pub hours_per_day: usize,
    /// First hour of the day after the lunch break (default: 4).
    ///
    /// A multi-hour block starting before this hour must end at or before it.
    pub lunch_hour: usize,
}

impl Default for WeekLayout {
    fn default() -> Self {
        Self {
            days_per_week: 5,
            hours_per_day: 7,
            lunch_hour: 4,
        }
    }
}

impl WeekLayout {
    /// Creates a layout with the default lunch hour.
    pub fn new(days_per_week: usize, hours_per_day: usize) -> Self {
        Self {
            days_per_week,
            hours_per_day,
            ..Self::default()
        }
    }

    /// Sets the lunch hour.
    pub fn with_lunch_hour(mut self, lunch_hour: usize) -> Self {
        self.lunch_hour = lunch_hour;
        self
    }

    /// Number of week positions per group (`T`).
    pub fn slots_per_week(&self) -> usize {
        self.days_per_week * self.hours_per_day
    }
}

/// One subject a group must be taught.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRequirement {
    /// Subject name. Names ending in `_lab` are taught as contiguous blocks.
    pub subject: String,
    /// Required hours per week as declared.
    pub hours: usize,
    /// Index into [`Demand::teachers`]. `None` until assignment runs.
    pub teacher: Option<usize>,
}

impl SubjectRequirement {
    /// Creates an unassigned requirement.
    pub fn new(subject: impl Into<String>, hours: usize) -> Self {
        Self {
            subject: subject.into(),
            hours,
            teacher: None,
        }
    }

    /// Assigns a teacher explicitly.
    pub fn with_teacher(mut self, teacher: usize) -> Self {
        self.teacher = Some(teacher);
        self
    }

    /// Whether this subject is a lab.
    pub fn is_lab(&self) -> bool {
        is_lab_subject(&self.subject)
    }

    /// Number of lesson units this requirement occupies in the pool.
    ///
    /// A one-hour lab still needs a double period.
    pub fn lesson_units(&self) -> usize {
        if self.is_lab() && self.hours == 1 {
            2
        } else {
            self.hours
        }
    }
}

/// Returns `true` for subject names following the lab naming convention.
pub fn is_lab_subject(name: &str) -> bool {
    name.to_lowercase().ends_with("_lab")
}

/// A class of students sharing one weekly timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentGroup {
    /// Group name (e.g. "CSE-A").
    pub name: String,
    /// Required subjects in declared order.
    pub subjects: Vec<SubjectRequirement>,
}

impl StudentGroup {
    /// Creates a group with no subjects.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subjects: Vec::new(),
        }
    }

    /// Adds a subject requirement.
    pub fn with_subject(mut self, subject: impl Into<String>, hours: usize) -> Self {
        self.subjects.push(SubjectRequirement::new(subject, hours));
        self
    }

    /// Adds a prebuilt requirement.
    pub fn with_requirement(mut self, requirement: SubjectRequirement) -> Self {
        self.subjects.push(requirement);
        self
    }

    /// Total lesson units the group needs per week.
    pub fn lesson_units(&self) -> usize {
        self.subjects.iter().map(SubjectRequirement::lesson_units).sum()
    }
}

/// A teacher and the slots they cannot teach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Teacher name.
    pub name: String,
    /// Subject this teacher teaches.
    pub subject: String,
    /// Number of group subjects assigned so far.
    pub assigned: usize,
    /// Week positions (`[0, T)`) the teacher is off duty.
    pub unavailable_slots: Vec<usize>,
}

impl Teacher {
    /// Creates a teacher with no unavailability.
    pub fn new(name: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subject: subject.into(),
            assigned: 0,
            unavailable_slots: Vec::new(),
        }
    }

    /// Marks week positions as unavailable.
    pub fn with_unavailable(mut self, slots: impl IntoIterator<Item = usize>) -> Self {
        self.unavailable_slots.extend(slots);
        self
    }

    /// Whether the teacher is off duty at a week position.
    pub fn is_unavailable_at(&self, position: usize) -> bool {
        self.unavailable_slots.contains(&position)
    }
}

/// Complete weekly demand consumed by the search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demand {
    /// Week shape.
    pub layout: WeekLayout,
    /// Student groups; a group's index is its id.
    pub groups: Vec<StudentGroup>,
    /// Teachers; a teacher's index is its id.
    pub teachers: Vec<Teacher>,
}

impl Demand {
    /// Creates an empty demand for a week layout.
    pub fn new(layout: WeekLayout) -> Self {
        Self {
            layout,
            groups: Vec::new(),
            teachers: Vec::new(),
        }
    }

    /// Adds a student group.
    pub fn with_group(mut self, group: StudentGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher: Teacher) -> Self {
        self.teachers.push(teacher);
        self
    }

    /// Looks up a teacher index by name (case-insensitive).
    pub fn teacher_index(&self, name: &str) -> Option<usize> {
        let name = name.to_lowercase();
        self.teachers
            .iter()
            .position(|t| t.name.to_lowercase() == name)
    }

    /// Assigns a teacher to every unassigned group subject.
    ///
    /// For each requirement, in group order then subject order, picks the
    /// teacher of that subject (case-insensitive) with the fewest prior
    /// assignments; ties go to the teacher declared first. Requirements
    /// nobody teaches stay unassigned.
    ///
    /// Returns the number of requirements left unassigned.
    pub fn assign_teachers(&mut self) -> usize {
        let mut unassigned = 0;
        for group in &mut self.groups {
            for requirement in &mut group.subjects {
                if requirement.teacher.is_some() {
                    continue;
                }
                let subject = requirement.subject.to_lowercase();
                let chosen = self
                    .teachers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.subject.to_lowercase() == subject)
                    .min_by_key(|(idx, t)| (t.assigned, *idx))
                    .map(|(idx, _)| idx);

                match chosen {
                    Some(idx) => {
                        self.teachers[idx].assigned += 1;
                        requirement.teacher = Some(idx);
                    }
                    None => unassigned += 1,
                }
            }
        }
        unassigned
    }
}
