//! Generational search driver.
//!
//! # Algorithm
//!
//! 1. Build `population_size` random chromosomes and sort by descending
//!    fitness.
//! 2. Each generation: carry the elite over unchanged, then breed children
//!    (select two parents, crossover with `crossover_rate`, mutate) until
//!    the generation is full.
//! 3. The first child reaching `acceptance_threshold` ends the search as
//!    [`Outcome::Solved`]; the partial generation is discarded.
//! 4. Otherwise sort the new generation and repeat, up to
//!    `max_generations` ([`Outcome::Exhausted`]).
//!
//! Cancellation and the time limit are checked between generations and end
//! the search as [`Outcome::Interrupted`].
//!
//! # Determinism
//!
//! Every chromosome is built from its own RNG, seeded from the master RNG
//! before any work starts. A seeded run therefore produces the same result
//! with `parallel` on or off.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use super::{GaConfig, TimetableChromosome, TimetableProblem};
use crate::error::TimetableError;
use crate::models::Timetable;

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A chromosome reached the acceptance threshold.
    Solved,
    /// The generation budget ran out; `best` is a best-effort result.
    Exhausted,
    /// Cancelled or out of time; `best` is a best-effort result.
    Interrupted,
}

/// Result of a search.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// Accepted chromosome, or the fittest one seen.
    pub best: TimetableChromosome,
    /// Terminal state.
    pub outcome: Outcome,
    /// Generations entered (a solving generation counts).
    pub generations: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
    /// Best fitness after initialisation and after each generation.
    pub history: Vec<f64>,
}

impl GaResult {
    /// Whether the search found an acceptable timetable.
    pub fn is_solved(&self) -> bool {
        self.outcome == Outcome::Solved
    }

    /// Decodes the best chromosome.
    pub fn timetable(&self, problem: &TimetableProblem) -> Timetable {
        problem.decode(&self.best)
    }
}

/// Genetic algorithm runner for timetables.
pub struct GaRunner<'a> {
    problem: &'a TimetableProblem,
    config: GaConfig,
    cancelled: Arc<AtomicBool>,
}

impl<'a> GaRunner<'a> {
    /// Creates a new runner.
    pub fn new(problem: &'a TimetableProblem, config: GaConfig) -> Self {
        Self {
            problem,
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns a handle to cancel the search at the next generation boundary.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// The configuration in use.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Runs the search, seeding from `config.seed` or the thread RNG.
    pub fn run(&self) -> Result<GaResult, TimetableError> {
        let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = SmallRng::seed_from_u64(seed);
        self.run_with_rng(&mut rng)
    }

    /// Runs the search with a specific master RNG.
    ///
    /// # Errors
    /// [`TimetableError::InvalidConfig`] if the configuration is invalid.
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> Result<GaResult, TimetableError> {
        self.config
            .validate()
            .map_err(TimetableError::InvalidConfig)?;

        let start = Instant::now();
        let config = &self.config;
        let elite_count = config.elite_count();

        info!(
            groups = self.problem.groups(),
            slots_per_week = self.problem.slots_per_week(),
            population = config.population_size,
            max_generations = config.max_generations,
            parallel = config.parallel,
            "timetable search started"
        );

        let mut population = self.initialize_population(rng);
        sort_descending(&mut population);
        let mut history = vec![population[0].fitness];
        let mut generation = 0;

        let outcome = loop {
            if generation >= config.max_generations {
                break Outcome::Exhausted;
            }
            if self.cancelled.load(Ordering::Relaxed) {
                break Outcome::Interrupted;
            }
            if config.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                break Outcome::Interrupted;
            }
            generation += 1;

            let mut children = self.breed(&population, elite_count, rng);
            if let Some(idx) = children
                .iter()
                .position(|c| c.is_acceptable(config.acceptance_threshold))
            {
                let solved = children.swap_remove(idx);
                history.push(solved.fitness);
                info!(
                    generation,
                    fitness = solved.fitness,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "timetable solved"
                );
                return Ok(GaResult {
                    best: solved,
                    outcome: Outcome::Solved,
                    generations: generation,
                    elapsed: start.elapsed(),
                    history,
                });
            }

            let mut next = Vec::with_capacity(config.population_size);
            next.extend_from_slice(&population[..elite_count]);
            next.extend(children);
            sort_descending(&mut next);
            population = next;

            let best = population[0].fitness;
            history.push(best);
            debug!(
                generation,
                best,
                mean = mean_fitness(&population),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "generation complete"
            );
        };

        let best = population
            .into_iter()
            .next()
            .ok_or_else(|| TimetableError::InvalidConfig("empty population".into()))?;
        info!(
            ?outcome,
            generations = generation,
            fitness = best.fitness,
            "timetable search stopped without an accepted solution"
        );

        Ok(GaResult {
            best,
            outcome,
            generations: generation,
            elapsed: start.elapsed(),
            history,
        })
    }

    fn initialize_population<R: Rng>(&self, rng: &mut R) -> Vec<TimetableChromosome> {
        let seeds: Vec<u64> = (0..self.config.population_size)
            .map(|_| rng.random())
            .collect();
        let build = |seed: &u64| {
            let mut local = SmallRng::seed_from_u64(*seed);
            TimetableChromosome::random(self.problem, &mut local)
        };

        if self.config.parallel {
            seeds.par_iter().map(build).collect()
        } else {
            seeds.iter().map(build).collect()
        }
    }

    /// Breeds the non-elite part of the next generation.
    ///
    /// The sequential path stops right after the first acceptable child;
    /// the parallel path builds every child. Either way the first
    /// acceptable child sits at the same index.
    fn breed<R: Rng>(
        &self,
        population: &[TimetableChromosome],
        elite_count: usize,
        rng: &mut R,
    ) -> Vec<TimetableChromosome> {
        let count = self.config.population_size - elite_count;
        let seeds: Vec<u64> = (0..count).map(|_| rng.random()).collect();
        let breed_one = |seed: &u64| {
            let mut local = SmallRng::seed_from_u64(*seed);
            self.breed_child(population, elite_count, &mut local)
        };

        if self.config.parallel {
            return seeds.par_iter().map(breed_one).collect();
        }

        let mut children = Vec::with_capacity(count);
        for seed in &seeds {
            let child = breed_one(seed);
            let accepted = child.is_acceptable(self.config.acceptance_threshold);
            children.push(child);
            if accepted {
                break;
            }
        }
        children
    }

    fn breed_child<R: Rng>(
        &self,
        population: &[TimetableChromosome],
        elite_count: usize,
        rng: &mut R,
    ) -> TimetableChromosome {
        let config = &self.config;
        let ops = &config.operators;

        let father = ops.select(population, elite_count, rng);
        let mother = ops.select(population, elite_count, rng);

        let mut child = if rng.random::<f64>() < config.crossover_rate {
            super::operators::gene_swap_crossover(father, mother, self.problem, rng)
        } else {
            father
        };

        ops.mutate(
            &mut child,
            self.problem,
            config.mutation_rate,
            config.mutation_attempt_cap,
            rng,
        );
        child
    }
}

fn sort_descending(population: &mut [TimetableChromosome]) {
    population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
}

fn mean_fitness(population: &[TimetableChromosome]) -> f64 {
    population.iter().map(|c| c.fitness).sum::<f64>() / population.len().max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::{MutationType, Selection};
    use crate::models::{Demand, Lesson, StudentGroup, Teacher, WeekLayout};

    fn one_teacher_two_groups() -> TimetableProblem {
        // 2 groups, T = 4, Math twice each, one teacher, no unavailability.
        let mut demand = Demand::new(WeekLayout::new(2, 2))
            .with_group(StudentGroup::new("A").with_subject("Math", 2))
            .with_group(StudentGroup::new("B").with_subject("Math", 2))
            .with_teacher(Teacher::new("Ada", "Math"));
        demand.assign_teachers();
        TimetableProblem::new(demand).unwrap()
    }

    fn always_unavailable() -> TimetableProblem {
        let mut demand = Demand::new(WeekLayout::new(2, 2))
            .with_group(StudentGroup::new("A").with_subject("Math", 2))
            .with_teacher(Teacher::new("Ada", "Math").with_unavailable(0..4));
        demand.assign_teachers();
        TimetableProblem::new(demand).unwrap()
    }

    fn mixed_problem() -> TimetableProblem {
        let mut demand = Demand::new(WeekLayout::new(3, 5).with_lunch_hour(3))
            .with_group(
                StudentGroup::new("A")
                    .with_subject("Math", 4)
                    .with_subject("Art", 3)
                    .with_subject("Chem_Lab", 1),
            )
            .with_group(
                StudentGroup::new("B")
                    .with_subject("Math", 5)
                    .with_subject("Art", 2),
            )
            .with_group(StudentGroup::new("C").with_subject("Art", 4).with_subject("Chem_Lab", 2))
            .with_teacher(Teacher::new("Ada", "Math").with_unavailable([0, 5, 10]))
            .with_teacher(Teacher::new("Di", "Art"))
            .with_teacher(Teacher::new("Cy", "Chem_Lab").with_unavailable([14]));
        demand.assign_teachers();
        TimetableProblem::new(demand).unwrap()
    }

    fn small_config() -> GaConfig {
        GaConfig::default()
            .with_population_size(20)
            .with_max_generations(50)
            .with_mutation_attempt_cap(1_000)
            .with_seed(42)
    }

    fn math_positions(problem: &TimetableProblem, ch: &TimetableChromosome, group: usize) -> Vec<usize> {
        let gene = &ch.genes[group];
        (0..gene.len())
            .filter(|&p| {
                matches!(problem.pool().lesson(group, gene.offsets()[p]), Some(Lesson::Class { .. }))
            })
            .collect()
    }

    #[test]
    fn test_shared_teacher_is_solved() {
        let problem = one_teacher_two_groups();
        let result = GaRunner::new(&problem, small_config()).run().unwrap();

        assert_eq!(result.outcome, Outcome::Solved);
        assert!(result.is_solved());
        assert_eq!(result.best.fitness, 1.0);
        assert!(result.generations >= 1 && result.generations <= 50);

        let a = math_positions(&problem, &result.best, 0);
        let b = math_positions(&problem, &result.best, 1);
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
        assert!(a.iter().all(|p| !b.contains(p)));

        let table = result.timetable(&problem);
        assert!(table.is_conflict_free());
    }

    #[test]
    fn test_unavailable_teacher_exhausts() {
        let problem = always_unavailable();
        let config = small_config().with_population_size(10).with_max_generations(3);
        let result = GaRunner::new(&problem, config).run().unwrap();

        assert_eq!(result.outcome, Outcome::Exhausted);
        assert_eq!(result.generations, 3);
        assert!(result.best.fitness < 1.0);
        assert_eq!(result.history.len(), 4);
        assert!(!result.timetable(&problem).is_conflict_free());
    }

    #[test]
    fn test_history_is_monotonic() {
        let problem = mixed_problem();
        let config = small_config()
            .with_max_generations(5)
            .with_acceptance_threshold(1.0);
        let result = GaRunner::new(&problem, config).run().unwrap();

        assert!(result.history.windows(2).all(|w| w[1] >= w[0]));
        assert!(result.best.is_valid(&problem));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let problem = mixed_problem();
        let config = small_config().with_max_generations(4);

        let par = GaRunner::new(&problem, config.clone().with_parallel(true))
            .run()
            .unwrap();
        let seq = GaRunner::new(&problem, config.with_parallel(false))
            .run()
            .unwrap();

        assert_eq!(par.outcome, seq.outcome);
        assert_eq!(par.generations, seq.generations);
        assert_eq!(par.history, seq.history);
        assert_eq!(par.best.genes, seq.best.genes);
    }

    #[test]
    fn test_invariants_hold_after_search() {
        let problem = mixed_problem();
        let config = small_config()
            .with_max_generations(3)
            .with_selection(Selection::TopRandom(5))
            .with_mutation(MutationType::Swap)
            .with_mutation_rate(1.0);
        let result = GaRunner::new(&problem, config).run().unwrap();

        assert!(result.best.is_valid(&problem));
        for (group, gene) in result.best.genes.iter().enumerate() {
            let mut got: Vec<Option<&str>> = gene
                .offsets()
                .iter()
                .map(|&o| problem.pool().lesson(group, o).and_then(Lesson::subject))
                .collect();
            let mut expected: Vec<Option<&str>> = problem
                .pool()
                .group_lessons(group)
                .iter()
                .map(Lesson::subject)
                .collect();
            got.sort();
            expected.sort();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_cancelled_before_start() {
        let problem = mixed_problem();
        let runner = GaRunner::new(&problem, small_config());
        runner.cancel_handle().store(true, Ordering::Relaxed);

        let result = runner.run().unwrap();
        assert_eq!(result.outcome, Outcome::Interrupted);
        assert_eq!(result.generations, 0);
        assert_eq!(result.history.len(), 1);
    }

    #[test]
    fn test_time_limit() {
        let problem = mixed_problem();
        let config = small_config().with_time_limit(Duration::ZERO);
        let result = GaRunner::new(&problem, config).run().unwrap();
        assert_eq!(result.outcome, Outcome::Interrupted);
    }

    #[test]
    fn test_relaxed_threshold() {
        let problem = always_unavailable();
        let config = small_config().with_acceptance_threshold(0.5);
        let result = GaRunner::new(&problem, config).run().unwrap();

        // every placement costs 2 * 1000 of 4000 points
        assert_eq!(result.outcome, Outcome::Solved);
        assert_eq!(result.generations, 1);
        assert!((result.best.fitness - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_invalid_config() {
        let problem = one_teacher_two_groups();
        let config = GaConfig::default().with_population_size(1);
        let err = GaRunner::new(&problem, config).run().unwrap_err();
        assert!(matches!(err, TimetableError::InvalidConfig(_)));
    }
}
