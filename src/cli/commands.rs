use clap::{Parser, Subcommand};

/// `artificer` - autonomous planning agent for a turn-based game world.
#[derive(Parser, Debug)]
#[command(name = "artificer")]
#[command(version = "0.1.0")]
#[command(about = "Plan-execute-replan agent for a turn-based game world.", long_about = None)]
pub struct Cli {
    /// Enable debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the planning agent against an objective
    Run {
        /// Natural-language objective, e.g. "Fight a chicken"
        objective: String,

        /// Character to control (overrides config)
        #[arg(short, long)]
        character: Option<String>,

        /// Bound on plan-execute-replan transitions (overrides config)
        #[arg(long)]
        max_iterations: Option<u32>,
    },

    /// Run the scripted move-fight-rest routine
    Routine {
        /// Number of cycles to run
        #[arg(long)]
        cycles: Option<u32>,

        /// X coordinate of the target tile
        #[arg(short)]
        x: Option<i64>,

        /// Y coordinate of the target tile
        #[arg(short)]
        y: Option<i64>,
    },

    /// Show the configured character's current state
    Status,
}
