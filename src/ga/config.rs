//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

use std::time::Duration;

use super::operators::{GeneticOperators, MutationType, Selection};

/// Configuration for the timetable search.
///
/// # Defaults
///
/// ```
/// use u_timetable::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 1000);
/// assert_eq!(config.max_generations, 100);
/// assert_eq!(config.elite_count(), 100);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_timetable::ga::{GaConfig, Selection};
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_selection(Selection::TopRandom(50))
///     .with_crossover_rate(0.8)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct GaConfig {
    /// Number of chromosomes per generation.
    pub population_size: usize,

    /// Maximum number of generations before reporting exhaustion.
    pub max_generations: usize,

    /// Fraction of the population carried over unchanged and used as the
    /// selection pool (0.0–1.0).
    pub elite_ratio: f64,

    /// Probability of gene-swap crossover for a pair of parents (0.0–1.0).
    ///
    /// When crossover is not applied the first parent is used as the child.
    pub crossover_rate: f64,

    /// Probability of applying the swap/rotate mutations (0.0–1.0).
    ///
    /// Greedy mutation ignores this and runs on every child.
    pub mutation_rate: f64,

    /// Maximum gene redraws per greedy mutation.
    pub mutation_attempt_cap: usize,

    /// Fitness at which a child ends the search (`1.0` = conflict-free only).
    pub acceptance_threshold: f64,

    /// Selection and mutation strategies.
    pub operators: GeneticOperators,

    /// Whether to build chromosomes in parallel using rayon.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Wall-clock budget, checked between generations.
    pub time_limit: Option<Duration>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 1000,
            max_generations: 100,
            elite_ratio: 0.1,
            crossover_rate: 1.0,
            mutation_rate: 0.1,
            mutation_attempt_cap: 500_000,
            acceptance_threshold: 1.0,
            operators: GeneticOperators::default(),
            parallel: true,
            seed: None,
            time_limit: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the elite ratio.
    pub fn with_elite_ratio(mut self, ratio: f64) -> Self {
        self.elite_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the greedy mutation attempt cap.
    pub fn with_mutation_attempt_cap(mut self, cap: usize) -> Self {
        self.mutation_attempt_cap = cap;
        self
    }

    /// Sets the acceptance threshold.
    pub fn with_acceptance_threshold(mut self, threshold: f64) -> Self {
        self.acceptance_threshold = threshold;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.operators.selection = selection;
        self
    }

    /// Sets the mutation strategy.
    pub fn with_mutation(mut self, mutation: MutationType) -> Self {
        self.operators.mutation = mutation;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Number of elite chromosomes (at least one).
    pub fn elite_count(&self) -> usize {
        ((self.population_size as f64 * self.elite_ratio) as usize).max(1)
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err("population_size must be at least 2".into());
        }
        if self.max_generations == 0 {
            return Err("max_generations must be at least 1".into());
        }
        if self.elite_count() >= self.population_size {
            return Err("elite_ratio too high: elites fill entire population".into());
        }
        if self.mutation_attempt_cap == 0 {
            return Err("mutation_attempt_cap must be at least 1".into());
        }
        if !(self.acceptance_threshold > 0.0 && self.acceptance_threshold <= 1.0) {
            return Err("acceptance_threshold must be in (0, 1]".into());
        }
        if self.operators.selection == Selection::TopRandom(0) {
            return Err("TopRandom selection needs a pool of at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GaConfig::default();
        assert_eq!(config.population_size, 1000);
        assert_eq!(config.max_generations, 100);
        assert!((config.elite_ratio - 0.1).abs() < 1e-10);
        assert!((config.crossover_rate - 1.0).abs() < 1e-10);
        assert!((config.mutation_rate - 0.1).abs() < 1e-10);
        assert_eq!(config.mutation_attempt_cap, 500_000);
        assert_eq!(config.acceptance_threshold, 1.0);
        assert_eq!(config.operators.selection, Selection::EliteRoulette);
        assert_eq!(config.operators.mutation, MutationType::Greedy);
        assert!(config.parallel);
        assert!(config.seed.is_none());
        assert!(config.time_limit.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GaConfig::default()
            .with_population_size(200)
            .with_max_generations(10)
            .with_elite_ratio(0.2)
            .with_crossover_rate(0.8)
            .with_mutation_rate(0.05)
            .with_mutation_attempt_cap(100)
            .with_acceptance_threshold(0.95)
            .with_selection(Selection::TopRandom(20))
            .with_mutation(MutationType::Swap)
            .with_parallel(false)
            .with_seed(42)
            .with_time_limit(Duration::from_secs(5));

        assert_eq!(config.population_size, 200);
        assert_eq!(config.max_generations, 10);
        assert_eq!(config.elite_count(), 40);
        assert!((config.crossover_rate - 0.8).abs() < 1e-10);
        assert!((config.mutation_rate - 0.05).abs() < 1e-10);
        assert_eq!(config.mutation_attempt_cap, 100);
        assert_eq!(config.operators.selection, Selection::TopRandom(20));
        assert_eq!(config.operators.mutation, MutationType::Swap);
        assert!(!config.parallel);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.time_limit, Some(Duration::from_secs(5)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_small_population_keeps_one_elite() {
        let config = GaConfig::default().with_population_size(5);
        assert_eq!(config.elite_count(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_errors() {
        assert!(GaConfig::default().with_population_size(1).validate().is_err());
        assert!(GaConfig::default().with_max_generations(0).validate().is_err());
        assert!(GaConfig::default()
            .with_population_size(10)
            .with_elite_ratio(1.0)
            .validate()
            .is_err());
        assert!(GaConfig::default().with_mutation_attempt_cap(0).validate().is_err());
        assert!(GaConfig::default().with_acceptance_threshold(0.0).validate().is_err());
        assert!(GaConfig::default().with_acceptance_threshold(1.5).validate().is_err());
        assert!(GaConfig::default()
            .with_selection(Selection::TopRandom(0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_clamp_rates() {
        let config = GaConfig::default()
            .with_elite_ratio(1.5)
            .with_crossover_rate(-0.5)
            .with_mutation_rate(2.0);

        assert!((config.elite_ratio - 1.0).abs() < 1e-10);
        assert!((config.crossover_rate - 0.0).abs() < 1e-10);
        assert!((config.mutation_rate - 1.0).abs() < 1e-10);
    }
}
