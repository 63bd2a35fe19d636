use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;

use crosswalk_sim::simulation::{PseudoRandom, SimConfig, SimWorld, TraceStream, UniformSource};

#[derive(Parser)]
#[command(name = "crosswalk_sim")]
#[command(about = "Discrete-event simulation of a signalized crosswalk")]
struct Cli {
    /// Number of cars and of pedestrians to generate (each)
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    count: u64,

    /// Trace file feeding the auto stream (arrival gaps and speeds)
    #[arg(long, value_name = "FILE")]
    auto_trace: Option<PathBuf>,

    /// Trace file feeding the pedestrian stream (arrival gaps and speeds)
    #[arg(long, value_name = "FILE")]
    ped_trace: Option<PathBuf>,

    /// Trace file feeding the button press draws
    #[arg(long, value_name = "FILE")]
    button_trace: Option<PathBuf>,

    /// Seed for the pseudo-random streams; ignored by traced streams
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let auto = make_source(&cli.auto_trace, cli.seed)?;
    let ped = make_source(&cli.ped_trace, cli.seed.map(|s| s.wrapping_add(1)))?;
    let button = make_source(&cli.button_trace, cli.seed.map(|s| s.wrapping_add(2)))?;

    let mut world = SimWorld::new_with_sources(cli.count, SimConfig::new(), auto, ped, button);
    world.run();

    let report = world.report();
    println!("OUTPUT {}", report.car_delay_mean);
    println!("OUTPUT {}", report.car_delay_variance);
    println!("OUTPUT {}", report.ped_delay_mean);
    Ok(())
}

/// Build one uniform stream: a trace file when given, a PRNG otherwise
fn make_source(trace: &Option<PathBuf>, seed: Option<u64>) -> Result<Box<dyn UniformSource>> {
    match trace {
        Some(path) => Ok(Box::new(TraceStream::open(path)?)),
        None => match seed {
            Some(seed) => Ok(Box::new(PseudoRandom::seeded(seed))),
            None => Ok(Box::new(PseudoRandom::new())),
        },
    }
}
