//! Input validation for timetabling demand.
//!
//! Checks structural integrity of the demand before the lesson pool is
//! built. Detects:
//! - Empty inputs (no groups, no teachers, zero-length week)
//! - Duplicate group or teacher names
//! - Subjects with no teacher, or with a teacher index that doesn't exist
//! - Groups needing more lesson units than the week has positions
//! - Unavailability indices outside the week

use crate::models::Demand;
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The demand has no student groups.
    NoGroups,
    /// The demand has no teachers.
    NoTeachers,
    /// Days per week or hours per day is zero.
    EmptyWeek,
    /// Two groups or two teachers share a name.
    DuplicateName,
    /// A required subject has no teacher assigned.
    UnassignedSubject,
    /// A requirement references a teacher that doesn't exist.
    InvalidTeacherReference,
    /// A group needs more lesson units than fit in one week.
    CapacityExceeded,
    /// An unavailability index lies outside the week.
    SlotOutOfRange,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a demand model.
///
/// Checks:
/// 1. At least one group and one teacher
/// 2. A non-empty week
/// 3. No duplicate group names, no duplicate teacher names
/// 4. Every requirement has a teacher, and that teacher exists
/// 5. Every group fits in the week
/// 6. Every unavailability index lies in `[0, T)`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_demand(demand: &Demand) -> ValidationResult {
    let mut errors = Vec::new();
    let slots = demand.layout.slots_per_week();

    if demand.groups.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoGroups,
            "Demand has no student groups",
        ));
    }
    if demand.teachers.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoTeachers,
            "Demand has no teachers",
        ));
    }
    if slots == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyWeek,
            format!(
                "Week has no positions ({} days x {} hours)",
                demand.layout.days_per_week, demand.layout.hours_per_day
            ),
        ));
    }

    let mut group_names = HashSet::new();
    for group in &demand.groups {
        if !group_names.insert(group.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate group name: {}", group.name),
            ));
        }
    }

    let mut teacher_names = HashSet::new();
    for teacher in &demand.teachers {
        if !teacher_names.insert(teacher.name.to_lowercase()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate teacher name: {}", teacher.name),
            ));
        }
        for &slot in &teacher.unavailable_slots {
            if slot >= slots {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SlotOutOfRange,
                    format!(
                        "Teacher '{}' unavailable at slot {slot}, week has {slots} positions",
                        teacher.name
                    ),
                ));
            }
        }
    }

    for group in &demand.groups {
        for req in &group.subjects {
            match req.teacher {
                None => errors.push(ValidationError::new(
                    ValidationErrorKind::UnassignedSubject,
                    format!(
                        "Group '{}' requires '{}' but no teacher teaches it",
                        group.name, req.subject
                    ),
                )),
                Some(t) if t >= demand.teachers.len() => errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTeacherReference,
                    format!(
                        "Group '{}' subject '{}' references unknown teacher #{t}",
                        group.name, req.subject
                    ),
                )),
                Some(_) => {}
            }
        }

        let units = group.lesson_units();
        if slots > 0 && units > slots {
            errors.push(ValidationError::new(
                ValidationErrorKind::CapacityExceeded,
                format!(
                    "Group '{}' needs {units} lesson units but the week has {slots} positions",
                    group.name
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
