//! Tensa CLI: scene relaxation, live ticking, validation, and snapshots.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tensa")]
#[command(version, about = "Tensa: goal-based particle relaxation engine")]
struct Cli {
    /// Log solver events at info level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Relax a scene to convergence or the iteration cap.
    Relax {
        /// Path to scene file (TOML or JSON).
        #[arg(short, long)]
        scene: String,

        /// Write the relaxation output document (JSON) here.
        #[arg(short, long)]
        output: Option<String>,

        /// Write a binary state snapshot here.
        #[arg(long)]
        snapshot: Option<String>,

        /// Override the scene's iteration cap.
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Override the scene's convergence threshold.
        #[arg(long)]
        threshold: Option<f64>,

        /// Evaluate goals in parallel.
        #[arg(long)]
        parallel: bool,
    },

    /// Drive a scene through a number of live ticks.
    Live {
        /// Path to scene file (TOML or JSON).
        #[arg(short, long)]
        scene: String,

        /// Number of ticks to run.
        #[arg(short, long, default_value_t = 10)]
        ticks: u32,

        /// Override the scene's steps per tick.
        #[arg(long)]
        substeps: Option<u32>,
    },

    /// Validate a scene file.
    Validate {
        /// Path to scene file.
        path: String,
    },

    /// Inspect a state snapshot file.
    Inspect {
        /// Path to snapshot file.
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Relax {
            scene,
            output,
            snapshot,
            max_iterations,
            threshold,
            parallel,
        } => commands::relax(
            &scene,
            commands::RelaxOverrides {
                max_iterations,
                threshold,
                parallel,
            },
            output.as_deref(),
            snapshot.as_deref(),
        ),
        Commands::Live {
            scene,
            ticks,
            substeps,
        } => commands::live(&scene, ticks, substeps),
        Commands::Validate { path } => commands::validate(&path),
        Commands::Inspect { path } => commands::inspect(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
