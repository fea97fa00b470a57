use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use galsim::{max_position_difference, read_bodies};

/// Print the largest position difference between two galaxy files.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Number of stars to compare
    n: usize,
    file1: PathBuf,
    file2: PathBuf,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let bodies1 = read_bodies(&cli.file1, cli.n).wrap_err("failed to load the first file")?;
    let bodies2 = read_bodies(&cli.file2, cli.n).wrap_err("failed to load the second file")?;

    let pos_maxdiff = max_position_difference(&bodies1, &bodies2)?;
    println!("pos_maxdiff = {pos_maxdiff:.16e}");

    Ok(())
}
