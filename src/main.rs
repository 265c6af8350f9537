//! Timetable CLI.
//!
//! Reads a demand file, runs the GA search and prints the weekly timetable
//! as JSON.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use u_timetable::ga::{GaConfig, GaRunner, MutationType, Selection, TimetableProblem};
use u_timetable::input::read_demand;
use u_timetable::models::WeekLayout;

#[derive(Parser)]
#[command(name = "u-timetable")]
#[command(about = "Weekly class timetabling with a genetic algorithm")]
struct Cli {
    /// Demand file (studentgroups / teachers / teacherunavailability sections)
    input: PathBuf,

    /// Teaching days per week
    #[arg(long, default_value = "5")]
    days: usize,

    /// Teaching hours per day
    #[arg(long, default_value = "7")]
    hours: usize,

    /// First hour after the lunch break
    #[arg(long, default_value = "4")]
    lunch_hour: usize,

    /// Chromosomes per generation
    #[arg(short, long, default_value = "1000")]
    population: usize,

    /// Generation budget
    #[arg(short, long, default_value = "100")]
    generations: usize,

    /// Fraction of the population kept as elite
    #[arg(long, default_value = "0.1")]
    elite_ratio: f64,

    /// Crossover probability
    #[arg(long, default_value = "1.0")]
    crossover_rate: f64,

    /// Probability of swap/rotate mutation
    #[arg(long, default_value = "0.1")]
    mutation_rate: f64,

    /// Gene redraws per greedy mutation
    #[arg(long, default_value = "500000")]
    mutation_cap: usize,

    /// Fitness that ends the search
    #[arg(long, default_value = "1.0")]
    threshold: f64,

    /// Selection: roulette, top:<n>
    #[arg(long, default_value = "roulette")]
    selection: String,

    /// Mutation: greedy, swap, rotate
    #[arg(long, default_value = "greedy")]
    mutation: String,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Wall-clock budget in seconds
    #[arg(long)]
    time_limit_secs: Option<u64>,

    /// Disable rayon parallelism
    #[arg(long)]
    sequential: bool,

    /// Output file for the timetable (JSON)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

fn parse_selection(s: &str) -> Option<Selection> {
    let s = s.to_lowercase();
    match s.as_str() {
        "roulette" | "elite_roulette" => Some(Selection::EliteRoulette),
        _ => s
            .strip_prefix("top:")
            .and_then(|n| n.parse().ok())
            .map(Selection::TopRandom),
    }
}

fn parse_mutation(s: &str) -> Option<MutationType> {
    match s.to_lowercase().as_str() {
        "greedy" => Some(MutationType::Greedy),
        "swap" => Some(MutationType::Swap),
        "rotate" => Some(MutationType::Rotate),
        _ => None,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let selection = parse_selection(&cli.selection).unwrap_or_else(|| {
        warn!(selection = %cli.selection, "unknown selection, using roulette");
        Selection::EliteRoulette
    });
    let mutation = parse_mutation(&cli.mutation).unwrap_or_else(|| {
        warn!(mutation = %cli.mutation, "unknown mutation, using greedy");
        MutationType::Greedy
    });

    let layout = WeekLayout::new(cli.days, cli.hours).with_lunch_hour(cli.lunch_hour);
    let demand = read_demand(&cli.input, layout)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let problem = TimetableProblem::new(demand)?;

    let mut config = GaConfig::default()
        .with_population_size(cli.population)
        .with_max_generations(cli.generations)
        .with_elite_ratio(cli.elite_ratio)
        .with_crossover_rate(cli.crossover_rate)
        .with_mutation_rate(cli.mutation_rate)
        .with_mutation_attempt_cap(cli.mutation_cap)
        .with_acceptance_threshold(cli.threshold)
        .with_selection(selection)
        .with_mutation(mutation)
        .with_parallel(!cli.sequential);
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(secs) = cli.time_limit_secs {
        config = config.with_time_limit(Duration::from_secs(secs));
    }

    let result = GaRunner::new(&problem, config).run()?;
    let timetable = result.timetable(&problem);

    info!(
        outcome = ?result.outcome,
        generations = result.generations,
        fitness = result.best.fitness,
        conflicts = timetable.conflicts.len(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "search finished"
    );

    let json = serde_json::to_string_pretty(&timetable)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "timetable written");
        }
        None => println!("{json}"),
    }

    if !result.is_solved() {
        std::process::exit(2);
    }
    Ok(())
}
