//! Loading participant datasets from the experiment's storage formats.
//!
//! Two layouts are supported:
//! - an export document `{"participant_<code>.json": [trial, ...], ...}` as
//!   produced by the data download endpoint;
//! - a directory of `participant_<code>.json` files, each a JSON array of
//!   trials, as written by the save endpoint.
//!
//! Structural problems (a document that is not an object, a participant entry
//! that is not an array) are errors. Individual trials are parsed leniently.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::trial::{Participant, ParticipantDataset, Trial};

/// File name prefix used by the save endpoint.
pub const PARTICIPANT_FILE_PREFIX: &str = "participant_";

/// Structural errors in dataset input.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("dataset must be a JSON object keyed by participant, found {found}")]
    NotAnObject { found: &'static str },

    #[error("participant {participant}: expected an array of trials, found {found}")]
    NotAnArray {
        participant: String,
        found: &'static str,
    },

    #[error("participant {participant}, entry {position}: expected a trial object, found {found}")]
    NotATrial {
        participant: String,
        position: usize,
        found: &'static str,
    },
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse one participant's trial array.
pub fn parse_trials(participant: &str, value: Value) -> Result<Vec<Trial>, DatasetError> {
    let Value::Array(items) = value else {
        return Err(DatasetError::NotAnArray {
            participant: participant.to_string(),
            found: json_kind(&value),
        });
    };
    items
        .into_iter()
        .enumerate()
        .map(|(position, item)| {
            if !item.is_object() {
                return Err(DatasetError::NotATrial {
                    participant: participant.to_string(),
                    position,
                    found: json_kind(&item),
                });
            }
            serde_json::from_value(item).map_err(|source| DatasetError::Json {
                origin: format!("participant {participant}, entry {position}"),
                source,
            })
        })
        .collect()
}

/// Build a dataset from an export document (object of trial arrays).
pub fn from_value(value: Value) -> Result<ParticipantDataset, DatasetError> {
    let Value::Object(map) = value else {
        return Err(DatasetError::NotAnObject {
            found: json_kind(&value),
        });
    };
    let participants = map
        .into_iter()
        .map(|(id, trials)| {
            let trials = parse_trials(&id, trials)?;
            Ok(Participant::new(id, trials))
        })
        .collect::<Result<Vec<_>, DatasetError>>()?;
    Ok(ParticipantDataset::new(participants))
}

/// Parse an export document from a string.
pub fn from_json_str(raw: &str) -> Result<ParticipantDataset, DatasetError> {
    let value: Value = serde_json::from_str(raw).map_err(|source| DatasetError::Json {
        origin: "input".to_string(),
        source,
    })?;
    from_value(value)
}

fn read_json(path: &Path) -> Result<Value, DatasetError> {
    let raw = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| DatasetError::Json {
        origin: path.display().to_string(),
        source,
    })
}

/// Load an export document from disk.
pub fn load_export(path: &Path) -> Result<ParticipantDataset, DatasetError> {
    let dataset = from_value(read_json(path)?)?;
    log::info!(
        "loaded {} participants ({} trials) from {}",
        dataset.len(),
        dataset.total_trials(),
        path.display()
    );
    Ok(dataset)
}

/// Load every `participant_<code>.json` file in a directory, sorted by file
/// name. Participant ids are the file names, matching the export layout.
pub fn load_participant_dir(dir: &Path) -> Result<ParticipantDataset, DatasetError> {
    let entries = fs::read_dir(dir).map_err(|source| DatasetError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension().is_some_and(|ext| ext == "json")
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(PARTICIPANT_FILE_PREFIX))
        })
        .collect();
    files.sort();

    let mut participants = Vec::with_capacity(files.len());
    for path in files {
        let id = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let trials = parse_trials(&id, read_json(&path)?)?;
        participants.push(Participant::new(id, trials));
    }

    let dataset = ParticipantDataset::new(participants);
    log::info!(
        "loaded {} participant files ({} trials) from {}",
        dataset.len(),
        dataset.total_trials(),
        dir.display()
    );
    Ok(dataset)
}

/// Load either layout: a directory of participant files or an export file.
pub fn load(path: &Path) -> Result<ParticipantDataset, DatasetError> {
    if path.is_dir() {
        load_participant_dir(path)
    } else {
        load_export(path)
    }
}
