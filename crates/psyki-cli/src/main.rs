//! CLI for psyki: signal detection reports over exported participant data.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "psyki")]
#[command(about = "psyki: signal detection analysis for human + AI decision experiments")]
#[command(version = psyki_core::VERSION)]
struct Cli {
    /// Analysis config JSON (missing keys take defaults)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-participant SDT table with means, d′ distributions and the
    /// reference comparison.
    Summary {
        /// Export JSON file or directory of participant_<code>.json files
        data: String,

        /// Minimum human d′ for a participant to enter the table
        #[arg(long)]
        min_d_prime: Option<f64>,

        /// Stimulus convention: percent (color >= 50) or signed (color >= 0)
        #[arg(long, value_parser = ["percent", "signed"])]
        stimulus: Option<String>,

        /// Write the full report as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Optimal-weighting analysis of one participant.
    Participant {
        /// Export JSON file or directory of participant_<code>.json files
        data: String,

        /// Participant id (as listed by `summary`)
        id: String,

        /// Evidence source for the aid's guesses
        #[arg(long, default_value = "stored", value_parser = ["stored", "simulated", "fixed"])]
        aid: String,

        /// Seed for the simulated aid
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Print every trial's combined evidence
        #[arg(long)]
        trials: bool,

        /// Write the analysis as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Cross-participant comparisons: slider vs button, accuracy by phase,
    /// slider vs aid.
    Compare {
        /// Export JSON file or directory of participant_<code>.json files
        data: String,

        /// Which comparison to run
        #[arg(long, default_value = "agreement", value_parser = ["agreement", "accuracy", "ai-agreement", "ai-difference"])]
        view: String,

        /// Show per-participant rows (and per-trial rows with --trials)
        #[arg(long)]
        detailed: bool,

        /// Include every compared trial in the detail
        #[arg(long)]
        trials: bool,

        /// Override the slider threshold
        #[arg(long)]
        threshold: Option<f64>,

        /// Write the comparison as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Time on task between two trial indices.
    Timing {
        /// Export JSON file or directory of participant_<code>.json files
        data: String,

        /// First trial index (default from config: 0)
        #[arg(long)]
        start: Option<u32>,

        /// Last trial index (default from config: 199)
        #[arg(long)]
        end: Option<u32>,

        /// Write the timing summary as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Mean and median of a numeric trial field.
    Field {
        /// Export JSON file or directory of participant_<code>.json files
        data: String,

        /// Field name, e.g. dPrimeTeam or sliderValue
        #[arg(long, default_value = "dPrimeTeam")]
        name: String,

        /// Trial index (default from config: 199)
        #[arg(long)]
        index: Option<u32>,

        /// Use every trial instead of one index
        #[arg(long, conflicts_with = "index")]
        all: bool,

        /// Write the statistic as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Serve reports over HTTP (read-only JSON API).
    Server {
        /// Export JSON file or directory of participant_<code>.json files
        data: String,

        #[arg(long, default_value = "8043")]
        port: u16,

        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Summary {
            data,
            min_d_prime,
            stimulus,
            output,
        } => commands::summary::run(commands::summary::SummaryCommandConfig {
            data: &data,
            config_path,
            min_d_prime,
            stimulus: stimulus.as_deref(),
            output_path: output.as_deref(),
        }),
        Commands::Participant {
            data,
            id,
            aid,
            seed,
            trials,
            output,
        } => commands::participant::run(commands::participant::ParticipantCommandConfig {
            data: &data,
            config_path,
            id: &id,
            aid: &aid,
            seed,
            show_trials: trials,
            output_path: output.as_deref(),
        }),
        Commands::Compare {
            data,
            view,
            detailed,
            trials,
            threshold,
            output,
        } => commands::compare::run(commands::compare::CompareCommandConfig {
            data: &data,
            config_path,
            view: &view,
            detail: commands::detail_level(detailed, trials),
            threshold,
            output_path: output.as_deref(),
        }),
        Commands::Timing {
            data,
            start,
            end,
            output,
        } => commands::timing::run(&data, config_path, start, end, output.as_deref()),
        Commands::Field {
            data,
            name,
            index,
            all,
            output,
        } => commands::field::run(&data, config_path, &name, index, all, output.as_deref()),
        Commands::Server { data, port, host } => {
            commands::server::run(&data, config_path, &host, port)
        }
    }
}
