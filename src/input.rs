//! Demand file reader.
//!
//! Parses the sectioned plain-text format produced by the web front end:
//!
//! ```text
//! studentgroups
//! CSE-A Math 4 Physics 3 Physics_Lab 1
//! end
//! teachers
//! Ada Math
//! Cy Physics
//! Cy2 Physics_Lab
//! end
//! teacherunavailability
//! Ada 0 1 2
//! end
//! ```
//!
//! Section headers are case-insensitive and blank lines are ignored.
//! Unavailability rows for unknown teachers are skipped. After parsing,
//! teachers are assigned to group subjects (see [`Demand::assign_teachers`]).

use std::path::Path;

use tracing::{debug, warn};

use crate::error::TimetableError;
use crate::models::{Demand, StudentGroup, Teacher, WeekLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Groups,
    Teachers,
    Unavailability,
}

/// Reads and parses a demand file.
pub fn read_demand(path: impl AsRef<Path>, layout: WeekLayout) -> Result<Demand, TimetableError> {
    let text = std::fs::read_to_string(path)?;
    parse_demand(&text, layout)
}

/// Parses demand text for a given week layout.
///
/// # Errors
/// [`TimetableError::Parse`] for rows outside a section, malformed hour
/// counts, malformed slot indices, or teacher rows missing a subject.
pub fn parse_demand(text: &str, layout: WeekLayout) -> Result<Demand, TimetableError> {
    let mut demand = Demand::new(layout);
    let mut unavailability: Vec<(usize, String, Vec<usize>)> = Vec::new();
    let mut section = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        match line.to_lowercase().as_str() {
            "studentgroups" => {
                section = Some(Section::Groups);
                continue;
            }
            "teachers" => {
                section = Some(Section::Teachers);
                continue;
            }
            "teacherunavailability" => {
                section = Some(Section::Unavailability);
                continue;
            }
            "end" => {
                section = None;
                continue;
            }
            _ => {}
        }

        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else { continue };
        let rest: Vec<&str> = parts.collect();

        match section {
            None => {
                return Err(parse_error(line_no, format!("row outside any section: '{line}'")));
            }
            Some(Section::Groups) => {
                if rest.len() % 2 != 0 {
                    return Err(parse_error(
                        line_no,
                        format!("group '{head}' has a subject without an hour count"),
                    ));
                }
                let mut group = StudentGroup::new(head);
                for pair in rest.chunks(2) {
                    let hours = pair[1].parse::<usize>().map_err(|_| {
                        parse_error(
                            line_no,
                            format!("invalid hours '{}' for subject '{}'", pair[1], pair[0]),
                        )
                    })?;
                    group = group.with_subject(pair[0], hours);
                }
                demand.groups.push(group);
            }
            Some(Section::Teachers) => {
                let Some(subject) = rest.first() else {
                    return Err(parse_error(line_no, format!("teacher '{head}' has no subject")));
                };
                demand.teachers.push(Teacher::new(head, *subject));
            }
            Some(Section::Unavailability) => {
                let slots = rest
                    .iter()
                    .map(|s| {
                        s.parse::<usize>().map_err(|_| {
                            parse_error(line_no, format!("invalid slot '{s}' for teacher '{head}'"))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                unavailability.push((line_no, head.to_string(), slots));
            }
        }
    }

    for (line_no, name, slots) in unavailability {
        match demand.teacher_index(&name) {
            Some(idx) => demand.teachers[idx].unavailable_slots.extend(slots),
            None => warn!(line = line_no, teacher = %name, "unavailability for unknown teacher ignored"),
        }
    }

    let unassigned = demand.assign_teachers();
    debug!(
        groups = demand.groups.len(),
        teachers = demand.teachers.len(),
        unassigned,
        "parsed demand"
    );
    Ok(demand)
}

fn parse_error(line: usize, message: String) -> TimetableError {
    TimetableError::Parse { line, message }
}
