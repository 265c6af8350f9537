//! Timetabling GA problem definition.
//!
//! Owns the run context shared by every chromosome: the demand, the lesson
//! pool built from it, and a teacher × position unavailability matrix.
//! Evaluates fitness and decodes chromosomes into [`Timetable`]s.
//!
//! # Fitness
//!
//! For each week position, walk the groups and look up the lesson each
//! group's gene schedules there:
//! - teacher declared unavailable at that position: `+unavailable` points
//! - teacher already teaching another group at that position: `+clash` points
//!
//! `fitness = max(0, 1 - points / worst)` where
//! `worst = max(1, (groups - 1) * T * clash + teachers * T * unavailable)`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{ScheduleGene, TimetableChromosome};
use crate::error::TimetableError;
use crate::models::{
    Conflict, ConflictKind, Demand, GroupTimetable, Lesson, LessonPool, Timetable, WeekLayout,
};

/// Penalty points per violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyWeights {
    /// Teacher scheduled while off duty (default: 1000).
    pub unavailable: u64,
    /// Teacher double-booked (default: 500).
    pub clash: u64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            unavailable: 1000,
            clash: 500,
        }
    }
}

/// Run context for timetable search.
///
/// # Example
/// ```
/// use u_timetable::ga::{GaConfig, GaRunner, TimetableProblem};
/// use u_timetable::models::{Demand, StudentGroup, Teacher, WeekLayout};
///
/// let mut demand = Demand::new(WeekLayout::new(2, 2))
///     .with_group(StudentGroup::new("A").with_subject("Math", 2))
///     .with_group(StudentGroup::new("B").with_subject("Math", 2))
///     .with_teacher(Teacher::new("Ada", "Math"));
/// demand.assign_teachers();
///
/// let problem = TimetableProblem::new(demand).unwrap();
/// let config = GaConfig::default()
///     .with_population_size(20)
///     .with_max_generations(50)
///     .with_seed(42);
/// let result = GaRunner::new(&problem, config).run().unwrap();
/// assert!(result.best.fitness <= 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct TimetableProblem {
    demand: Demand,
    pool: LessonPool,
    /// `unavailable[teacher][position]`.
    unavailable: Vec<Vec<bool>>,
    penalties: PenaltyWeights,
}

impl TimetableProblem {
    /// Validates the demand and builds the lesson pool.
    pub fn new(demand: Demand) -> Result<Self, TimetableError> {
        let pool = LessonPool::build(&demand)?;
        let slots = pool.slots_per_week();
        let unavailable = demand
            .teachers
            .iter()
            .map(|t| {
                let mut row = vec![false; slots];
                for &s in &t.unavailable_slots {
                    if let Some(cell) = row.get_mut(s) {
                        *cell = true;
                    }
                }
                row
            })
            .collect();

        Ok(Self {
            demand,
            pool,
            unavailable,
            penalties: PenaltyWeights::default(),
        })
    }

    /// Sets the penalty weights.
    pub fn with_penalties(mut self, penalties: PenaltyWeights) -> Self {
        self.penalties = penalties;
        self
    }

    /// The demand this problem was built from.
    pub fn demand(&self) -> &Demand {
        &self.demand
    }

    /// The lesson pool.
    pub fn pool(&self) -> &LessonPool {
        &self.pool
    }

    /// Week layout.
    pub fn layout(&self) -> &WeekLayout {
        &self.demand.layout
    }

    /// Penalty weights in use.
    pub fn penalties(&self) -> PenaltyWeights {
        self.penalties
    }

    /// Number of groups.
    pub fn groups(&self) -> usize {
        self.pool.groups()
    }

    /// Week positions per group.
    pub fn slots_per_week(&self) -> usize {
        self.pool.slots_per_week()
    }

    /// Builds a fresh random gene for a group.
    pub fn create_gene<R: Rng>(&self, group: usize, rng: &mut R) -> ScheduleGene {
        ScheduleGene::random(&self.pool, &self.demand.layout, group, rng)
    }

    /// Worst possible penalty, used as the normalisation denominator.
    pub fn max_penalty(&self) -> f64 {
        let slots = self.slots_per_week() as f64;
        let groups = self.groups() as f64;
        let teachers = self.demand.teachers.len() as f64;
        let worst = (groups - 1.0).max(0.0) * slots * self.penalties.clash as f64
            + teachers * slots * self.penalties.unavailable as f64;
        worst.max(1.0)
    }

    /// Total penalty points for a set of genes.
    pub fn penalty_of(&self, genes: &[ScheduleGene]) -> u64 {
        let mut points = 0;
        self.scan(genes, |kind, _, _, _| {
            points += match kind {
                ConflictKind::TeacherUnavailable => self.penalties.unavailable,
                ConflictKind::DoubleBooked => self.penalties.clash,
            };
        });
        points
    }

    /// Normalised fitness for a set of genes.
    pub fn fitness_of(&self, genes: &[ScheduleGene]) -> f64 {
        self.normalise(self.penalty_of(genes))
    }

    /// Recomputes and caches a chromosome's penalty and fitness.
    pub fn evaluate(&self, chromosome: &mut TimetableChromosome) -> f64 {
        chromosome.penalty = self.penalty_of(&chromosome.genes);
        chromosome.fitness = self.normalise(chromosome.penalty);
        chromosome.fitness
    }

    /// Lists every conflict in a chromosome.
    pub fn conflicts(&self, chromosome: &TimetableChromosome) -> Vec<Conflict> {
        let mut conflicts: Vec<Conflict> = Vec::new();
        self.scan(&chromosome.genes, |kind, position, teacher, groups| {
            conflicts.push(Conflict {
                kind,
                position,
                teacher: self.demand.teachers[teacher].name.clone(),
                groups: groups
                    .iter()
                    .map(|&g| self.demand.groups[g].name.clone())
                    .collect(),
            });
        });
        conflicts
    }

    /// Decodes a chromosome into a caller-facing timetable.
    pub fn decode(&self, chromosome: &TimetableChromosome) -> Timetable {
        let groups = chromosome
            .genes
            .iter()
            .map(|gene| {
                let slots = gene
                    .offsets()
                    .iter()
                    .map(|&offset| {
                        self.pool
                            .lesson(gene.group(), offset)
                            .and_then(Lesson::subject)
                            .map(str::to_string)
                    })
                    .collect();
                let name = self
                    .demand
                    .groups
                    .get(gene.group())
                    .map(|g| g.name.clone())
                    .unwrap_or_default();
                GroupTimetable::new(name, slots)
            })
            .collect();

        Timetable {
            groups,
            fitness: chromosome.fitness,
            conflicts: self.conflicts(chromosome),
        }
    }

    fn normalise(&self, points: u64) -> f64 {
        (1.0 - points as f64 / self.max_penalty()).max(0.0)
    }

    /// Walks every (position, group) cell and reports violations as
    /// `(kind, position, teacher, groups involved)`.
    fn scan<F>(&self, genes: &[ScheduleGene], mut report: F)
    where
        F: FnMut(ConflictKind, usize, usize, &[usize]),
    {
        let teachers = self.demand.teachers.len();
        // (teacher, first group seen) at the current position
        let mut seen: Vec<(usize, usize)> = Vec::with_capacity(genes.len());

        for position in 0..self.slots_per_week() {
            seen.clear();
            for gene in genes {
                let Some(offset) = gene.offset_at(position) else {
                    continue;
                };
                let Some(teacher) = self
                    .pool
                    .lesson(gene.group(), offset)
                    .and_then(Lesson::teacher)
                else {
                    continue;
                };
                if teacher >= teachers {
                    continue;
                }

                if self.unavailable[teacher][position] {
                    report(ConflictKind::TeacherUnavailable, position, teacher, &[gene.group()]);
                }

                match seen.iter().find(|(t, _)| *t == teacher) {
                    Some(&(_, first)) => report(
                        ConflictKind::DoubleBooked,
                        position,
                        teacher,
                        &[first, gene.group()],
                    ),
                    None => seen.push((teacher, gene.group())),
                }
            }
        }
    }
}
