use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use clap::{error::ErrorKind, Parser};
use color_eyre::eyre::WrapErr;
use env_logger::Env;
use galsim::{
    csv::TrajectoryWriter, read_bodies, write_bodies, Bodies, DirectSummation, Simulation,
    SimulationConfig, Solver,
};
use log::{info, warn};

/// Simulate the evolution of a galaxy with the Barnes-Hut method.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Number of stars to read from the input file
    n: usize,
    /// Binary input file with 6 doubles per star
    filename: PathBuf,
    /// Number of time steps
    n_steps: usize,
    delta_t: f64,
    /// Opening threshold of the quadtree, 0 for exact summation
    theta_max: f64,
    /// Ignored, rendering is not supported
    graphics: i32,
    n_threads: usize,

    #[arg(short, long, default_value = "result.gal")]
    output: PathBuf,
    /// Exact pairwise summation instead of the quadtree
    #[arg(long)]
    brute_force: bool,
    /// Use the Rayon thread pool instead of one thread per range of stars
    #[arg(long)]
    rayon: bool,
    /// Write all positions after every step to this CSV file
    #[arg(long)]
    trajectory: Option<PathBuf>,
    /// Depth bound of the quadtree
    #[arg(long)]
    max_depth: Option<usize>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            std::process::exit(-1);
        }
    };

    let mut config = SimulationConfig::new(
        cli.n,
        cli.n_steps,
        cli.delta_t,
        cli.theta_max,
        cli.n_threads,
    );
    if let Some(max_depth) = cli.max_depth {
        config = config.max_depth(max_depth);
    }
    config.validate().wrap_err("invalid arguments")?;

    if cli.graphics != 0 {
        warn!("graphics are not supported, running without");
    }
    if cfg!(not(feature = "rayon")) && cli.rayon {
        warn!("built without rayon, ignoring --rayon");
    }

    let bodies = read_bodies(&cli.filename, config.n_bodies)
        .wrap_err("failed to load the initial state")?;
    info!(
        "simulating {} stars for {} steps ({} threads)",
        bodies.len(),
        config.n_steps,
        config.n_threads
    );

    let trajectory = cli.trajectory.as_deref();
    let start = Instant::now();
    let bodies = if cli.brute_force {
        let mut solver = DirectSummation::new();
        if config.n_threads > 1 {
            solver = solver.multithreaded(config.n_threads);
        }
        #[cfg(feature = "rayon")]
        if cli.rayon {
            solver = solver.rayon_iter();
        }
        run(bodies, solver, &config, trajectory).wrap_err("simulation failed")?
    } else {
        let mut solver = config.barnes_hut();
        #[cfg(feature = "rayon")]
        if cli.rayon {
            solver = solver.rayon_iter();
        }
        run(bodies, solver, &config, trajectory).wrap_err("simulation failed")?
    };
    info!("simulation took {:.6} s", start.elapsed().as_secs_f64());

    write_bodies(&cli.output, &bodies).wrap_err("failed to store the result")?;
    info!("wrote {}", cli.output.display());

    Ok(())
}

fn run<S: Solver>(
    bodies: Bodies,
    solver: S,
    config: &SimulationConfig,
    trajectory: Option<&Path>,
) -> galsim::Result<Bodies> {
    let mut sim = Simulation::with_gravity(bodies, solver, config.gravity());

    match trajectory {
        Some(path) => {
            let mut writer = TrajectoryWriter::create(path, sim.bodies().len())?;
            sim.simulate(config.time_step, config.n_steps, |t, bodies| {
                writer.write_step(t, bodies)
            })?;
            writer.finish()?;
        }
        None => sim.simulate(config.time_step, config.n_steps, |_, _| Ok(()))?,
    }

    Ok(sim.into_bodies())
}
