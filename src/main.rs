use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};

mod capsule;
mod datatypes;
mod document;
mod error;
mod mesher;
mod pipeline;
mod post_processor;
mod registry;
mod solver;
mod sweep;

use capsule::CapsuleDocument;
use error::VesselError;
use mesher::BuiltinMesher;
use pipeline::AnalysisPipeline;
use post_processor::CsvSink;
use registry::ParameterRegistry;
use solver::BuiltinSolver;
use sweep::SweepRunner;

/// Parametric structural analysis of capsule pressure-vessel models
#[derive(Parser)]
#[command(name = "vessel", version)]
struct Cli {
    /// Path to the parametric vessel model (json)
    model: String,

    /// Run a randomized design-of-experiments sweep with this many
    /// samples instead of a single analysis
    #[arg(long, value_name = "COUNT")]
    sweep: Option<usize>,

    /// Output csv for sweep results
    #[arg(long, default_value = "sweep.csv")]
    output: String,

    /// Seed for the sweep's random sampling
    #[arg(long)]
    seed: Option<u64>,
}

fn run(cli: &Cli) -> Result<(), VesselError> {
    let mut doc = CapsuleDocument::open(&cli.model)?;
    let mut pipeline = AnalysisPipeline::new(BuiltinMesher::new(), BuiltinSolver::new());

    match cli.sweep {
        Some(count) => {
            let registry = ParameterRegistry::discover(&doc);
            let mut sink = CsvSink::create(&cli.output)?;
            let mut runner = SweepRunner::new(registry, pipeline);

            let mut rng = match cli.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };

            let summary = runner.run(&mut doc, &mut sink, count, &mut rng)?;
            println!(
                "info: completed {} of {} samples, wrote {}",
                summary.completed, summary.requested, cli.output
            );
        }
        None => {
            pipeline.run(&mut doc)?;
            post_processor::print_info(&doc);
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
