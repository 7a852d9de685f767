mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use crate::commands::{MatchMode, PreferenceArgs, cmd_filter, cmd_list, cmd_recommend};
use crate::config::Config;
use platter_core::filter::{DEFAULT_CALORIES_THRESHOLD, StepFilter};
use platter_core::models::parse_tokens;
use platter_core::service::PlatterService;

#[derive(Parser)]
#[command(
    name = "platter",
    version,
    about = "Recommend foods from a table by ingredients, user type, taste, and calorie target"
)]
struct Cli {
    /// Food table (CSV, or an .xlsx/.ods workbook). Defaults to foods.csv in the platter data directory
    #[arg(long, global = true, value_name = "PATH")]
    table: Option<PathBuf>,
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Log level or filter directive (e.g. "info", "platter_core=trace")
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank foods by weighted preferences
    Recommend {
        #[command(flatten)]
        prefs: PreferenceArgs,
        /// How preference words are matched against the table
        #[arg(long, value_enum, default_value_t = MatchMode::Substring)]
        matching: MatchMode,
        /// Seed for the tie-break shuffle (same seed, same order)
        #[arg(long)]
        seed: Option<u64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Step-by-step filtering: calorie floor, ingredients, avoided user types
    Filter {
        /// Keep foods above this many calories per serving
        #[arg(long, default_value_t = DEFAULT_CALORIES_THRESHOLD)]
        threshold: f64,
        /// Ingredient entry to keep (exact match, repeatable)
        #[arg(long = "ingredient", value_name = "INGREDIENTS")]
        ingredients: Vec<String>,
        /// User types to avoid, comma separated
        #[arg(long)]
        avoid_user_types: Option<String>,
        /// Keep only the first taste group
        #[arg(long)]
        same_taste: bool,
        /// Desired calories; adds a serving size to each result
        #[arg(long)]
        calories: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the loaded food table and any skipped rows
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(cli.verbose, cli.log_level.as_deref()) {
        eprintln!("Warning: logging disabled: {e:#}");
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.table)?;
    let svc = PlatterService::open(&config.table_path)?;

    match cli.command {
        Commands::Recommend {
            prefs,
            matching,
            seed,
            json,
        } => {
            let spec = prefs.into_spec()?;
            cmd_recommend(&svc, &spec, matching, seed, json)
        }
        Commands::Filter {
            threshold,
            ingredients,
            avoid_user_types,
            same_taste,
            calories,
            json,
        } => {
            let step = StepFilter {
                calories_threshold: threshold,
                ingredients,
                avoid_user_types: avoid_user_types.as_deref().map(parse_tokens).unwrap_or_default(),
                same_taste,
                desired_calories: calories,
            };
            cmd_filter(&svc, &step, json)
        }
        Commands::List { json } => cmd_list(&svc, json),
    }
}
