//! Timetable chromosome: one gene per student group.
//!
//! Higher fitness = better timetable (`1.0` means conflict-free).
//! Fitness is cached and must be refreshed through
//! [`TimetableProblem::evaluate`](super::TimetableProblem::evaluate)
//! whenever a gene changes; the mutating helpers here do that themselves.

use rand::Rng;

use super::{ScheduleGene, TimetableProblem};

/// A complete candidate timetable.
#[derive(Debug, Clone, PartialEq)]
pub struct TimetableChromosome {
    /// One gene per group, indexed by group.
    pub genes: Vec<ScheduleGene>,
    /// Raw penalty points from the last evaluation.
    pub penalty: u64,
    /// Normalised fitness in `[0, 1]`.
    pub fitness: f64,
}

impl TimetableChromosome {
    /// Creates a chromosome with a fresh random gene per group, evaluated.
    pub fn random<R: Rng>(problem: &TimetableProblem, rng: &mut R) -> Self {
        let genes = (0..problem.groups())
            .map(|group| problem.create_gene(group, rng))
            .collect();
        Self::from_genes(problem, genes)
    }

    /// Creates an evaluated chromosome from explicit genes.
    pub fn from_genes(problem: &TimetableProblem, genes: Vec<ScheduleGene>) -> Self {
        let mut chromosome = Self {
            genes,
            penalty: 0,
            fitness: 0.0,
        };
        problem.evaluate(&mut chromosome);
        chromosome
    }

    /// Replaces one group's gene and re-evaluates. Returns the new fitness.
    pub fn replace_gene(
        &mut self,
        group: usize,
        gene: ScheduleGene,
        problem: &TimetableProblem,
    ) -> f64 {
        if let Some(slot) = self.genes.get_mut(group) {
            *slot = gene;
        }
        problem.evaluate(self)
    }

    /// Whether the fitness meets an acceptance threshold.
    pub fn is_acceptable(&self, threshold: f64) -> bool {
        self.fitness >= threshold
    }

    /// Checks structural validity against the problem.
    ///
    /// One gene per group, each owned by its group, each a permutation of
    /// the group's week positions.
    pub fn is_valid(&self, problem: &TimetableProblem) -> bool {
        self.genes.len() == problem.groups()
            && self.genes.iter().enumerate().all(|(idx, gene)| {
                gene.group() == idx
                    && gene.len() == problem.slots_per_week()
                    && gene.is_permutation()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Demand, StudentGroup, Teacher, WeekLayout};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sample_problem() -> TimetableProblem {
        let mut demand = Demand::new(WeekLayout::new(5, 7))
            .with_group(StudentGroup::new("A").with_subject("Math", 4).with_subject("Art", 2))
            .with_group(StudentGroup::new("B").with_subject("Math", 4).with_subject("CS_Lab", 1))
            .with_teacher(Teacher::new("Ada", "Math").with_unavailable([0, 1, 2]))
            .with_teacher(Teacher::new("Di", "Art"))
            .with_teacher(Teacher::new("Cy", "CS_Lab"));
        demand.assign_teachers();
        TimetableProblem::new(demand).unwrap()
    }

    #[test]
    fn test_random_chromosome() {
        let problem = sample_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let ch = TimetableChromosome::random(&problem, &mut rng);

        assert_eq!(ch.genes.len(), 2);
        assert!(ch.is_valid(&problem));
        assert!((0.0..=1.0).contains(&ch.fitness));
    }

    #[test]
    fn test_replace_gene_reevaluates() {
        let problem = sample_problem();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut ch = TimetableChromosome::random(&problem, &mut rng);

        let gene = ScheduleGene::identity(1, problem.slots_per_week());
        let fitness = ch.replace_gene(1, gene.clone(), &problem);
        assert_eq!(ch.genes[1], gene);
        assert_eq!(fitness, ch.fitness);
        assert_eq!(fitness, problem.fitness_of(&ch.genes));
    }

    #[test]
    fn test_clone_is_independent() {
        let problem = sample_problem();
        let mut rng = SmallRng::seed_from_u64(3);
        let original = TimetableChromosome::random(&problem, &mut rng);
        let mut copy = original.clone();

        copy.genes[0].rotate_left();
        assert_ne!(copy.genes[0], original.genes[0]);
        assert!(original.is_valid(&problem));
    }

    #[test]
    fn test_invalid_chromosome() {
        let problem = sample_problem();
        let ch = TimetableChromosome {
            genes: vec![ScheduleGene::identity(0, problem.slots_per_week())],
            penalty: 0,
            fitness: 1.0,
        };
        assert!(!ch.is_valid(&problem));

        let swapped = TimetableChromosome {
            genes: vec![
                ScheduleGene::identity(1, problem.slots_per_week()),
                ScheduleGene::identity(0, problem.slots_per_week()),
            ],
            penalty: 0,
            fitness: 1.0,
        };
        assert!(!swapped.is_valid(&problem));
    }

    #[test]
    fn test_acceptance() {
        let ch = TimetableChromosome {
            genes: Vec::new(),
            penalty: 0,
            fitness: 0.999,
        };
        assert!(!ch.is_acceptable(1.0));
        assert!(ch.is_acceptable(0.99));
    }
}
