//! CLI frontend for the Roll the Bones dice pool engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use rtb_core::Operation;

#[derive(Parser)]
#[command(
    name = "rtb",
    about = "Roll the Bones: build, save and roll pools of dice",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory holding custom dice and saved pools (default: the platform data directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log more detail to stderr (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage die types
    Dice {
        #[command(subcommand)]
        command: DiceCommand,
    },
    /// Manage and roll saved pools
    Pool {
        #[command(subcommand)]
        command: PoolCommand,
    },
    /// The pool shown at startup
    Startup {
        #[command(subcommand)]
        command: StartupCommand,
    },
}

#[derive(Subcommand)]
enum DiceCommand {
    /// List built-in and custom die types
    List,
    /// Show the range and faces of a die type
    Show {
        /// Die type name
        name: String,
    },
    /// Create or replace a custom die type
    Save {
        /// Die type name
        name: String,
        /// Lowest result
        #[arg(long, allow_hyphen_values = true)]
        min: i32,
        /// Highest result
        #[arg(long, allow_hyphen_values = true)]
        max: i32,
        /// Face image for a result, as VALUE=REF (repeatable)
        #[arg(long = "face", value_name = "VALUE=REF")]
        faces: Vec<String>,
    },
    /// Delete custom die types
    Delete {
        /// Names to delete
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Subcommand)]
enum PoolCommand {
    /// List saved pools
    List,
    /// Show a saved pool's terms and preview
    Show {
        /// Pool name
        name: String,
    },
    /// Save a new, empty pool
    New {
        /// Pool name
        name: String,
    },
    /// Add dice or a number to a saved pool
    Add {
        /// Pool name
        name: String,
        /// Die type to add
        #[arg(long, conflicts_with = "number", required_unless_present = "number")]
        die: Option<String>,
        /// Number of dice
        #[arg(long, default_value = "1")]
        count: u32,
        /// Fixed number to add
        #[arg(long, allow_hyphen_values = true)]
        number: Option<i32>,
        /// Operator joining the new term to its neighbor (+, -, *)
        #[arg(long, allow_hyphen_values = true)]
        op: Option<Operation>,
        /// Index of the neighboring term (default: the last one)
        #[arg(long)]
        at: Option<usize>,
        /// Place the new term before its neighbor instead of after
        #[arg(long)]
        before: bool,
    },
    /// Remove a term from a saved pool
    Remove {
        /// Pool name
        name: String,
        /// Index of the term to remove
        index: usize,
    },
    /// Roll a saved pool
    Roll {
        /// Pool name
        name: String,
        /// Random seed for a reproducible roll
        #[arg(short, long)]
        seed: Option<u64>,
        /// Replacement for a missing die type, as OLD=NEW (repeatable)
        #[arg(long = "replace", value_name = "OLD=NEW")]
        replacements: Vec<String>,
    },
    /// Delete saved pools
    Delete {
        /// Names to delete
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Subcommand)]
enum StartupCommand {
    /// Show the startup pool
    Show,
    /// Use a saved pool as the startup pool
    Set {
        /// Saved pool name
        pool: String,
    },
    /// Roll the startup pool
    Roll {
        /// Random seed for a reproducible roll
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();
    commands::init_logging(cli.verbose);

    let result = commands::open_registry(cli.data_dir.as_deref()).and_then(|mut registry| {
        let registry = &mut registry;
        match cli.command {
            Commands::Dice { command } => match command {
                DiceCommand::List => commands::dice::list(registry),
                DiceCommand::Show { name } => commands::dice::show(registry, &name),
                DiceCommand::Save {
                    name,
                    min,
                    max,
                    faces,
                } => commands::dice::save(registry, &name, min, max, &faces),
                DiceCommand::Delete { names } => commands::dice::delete(registry, &names),
            },
            Commands::Pool { command } => match command {
                PoolCommand::List => commands::pool::list(registry),
                PoolCommand::Show { name } => commands::pool::show(registry, &name),
                PoolCommand::New { name } => commands::pool::new(registry, &name),
                PoolCommand::Add {
                    name,
                    die,
                    count,
                    number,
                    op,
                    at,
                    before,
                } => {
                    let term = match (die, number) {
                        (Some(die), _) => commands::pool::Term::Dice(die, count),
                        (None, Some(number)) => commands::pool::Term::Number(number),
                        (None, None) => return Err("either --die or --number is required".into()),
                    };
                    commands::pool::add(registry, &name, term, op, at, before)
                }
                PoolCommand::Remove { name, index } => {
                    commands::pool::remove(registry, &name, index)
                }
                PoolCommand::Roll {
                    name,
                    seed,
                    replacements,
                } => commands::pool::roll(registry, &name, seed, &replacements),
                PoolCommand::Delete { names } => commands::pool::delete(registry, &names),
            },
            Commands::Startup { command } => match command {
                StartupCommand::Show => commands::startup::show(registry),
                StartupCommand::Set { pool } => commands::startup::set(registry, &pool),
                StartupCommand::Roll { seed } => commands::startup::roll(registry, seed),
            },
        }
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
