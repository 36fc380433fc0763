pub mod compare;
pub mod field;
pub mod participant;
pub mod server;
pub mod summary;
pub mod timing;

use std::path::Path;

use psyki_core::{AgreementDetail, AnalysisConfig, ParticipantDataset, StimulusPolicy, dataset};
use serde::Serialize;

/// Load the dataset or exit with the loader's message.
pub fn load_dataset(path: &str) -> ParticipantDataset {
    match dataset::load(Path::new(path)) {
        Ok(data) => {
            if data.is_empty() {
                eprintln!("Warning: no participants found in {path}");
            }
            data
        }
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            std::process::exit(1);
        }
    }
}

/// Load the analysis config, or the defaults when no path is given.
pub fn load_config(path: Option<&str>) -> AnalysisConfig {
    let Some(path) = path else {
        return AnalysisConfig::default();
    };
    match AnalysisConfig::load(Path::new(path)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config {path}: {e}");
            std::process::exit(1);
        }
    }
}

/// Parse a stimulus convention name.
pub fn parse_stimulus(s: &str) -> Option<StimulusPolicy> {
    match s {
        "percent" | "pct" => Some(StimulusPolicy::PERCENT_SCALE),
        "signed" => Some(StimulusPolicy::SIGNED_SCALE),
        _ => None,
    }
}

/// Map `--detailed` / `--trials` onto a detail level.
pub fn detail_level(detailed: bool, trials: bool) -> AgreementDetail {
    match (detailed, trials) {
        (_, true) => AgreementDetail::PerTrial,
        (true, false) => AgreementDetail::PerParticipant,
        (false, false) => AgreementDetail::Overall,
    }
}

/// Write a report as pretty JSON, reporting the outcome on the terminal.
pub fn write_json<T: Serialize>(path: &str, value: &T) {
    let json = match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("\nFailed to serialize report: {e}");
            return;
        }
    };
    match std::fs::write(path, json) {
        Ok(()) => println!("\nResults written to {path}"),
        Err(e) => eprintln!("\nFailed to write {path}: {e}"),
    }
}
