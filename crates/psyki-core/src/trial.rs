//! Trial records and the participant dataset.
//!
//! Trials arrive as loosely-typed JSON written by the experiment UI. Every
//! field is optional here: a missing or malformed value deserializes to `None`
//! and the computations that need it skip the trial instead of failing.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Discrete post-assistance choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Blue,
    Orange,
}

impl Choice {
    /// Parse a recorded button label (case-insensitive).
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "blue" => Some(Self::Blue),
            "orange" => Some(Self::Orange),
            _ => None,
        }
    }

    /// Choice implied by a binary "signal present" decision.
    pub fn from_signal(signal: bool) -> Self {
        if signal { Self::Blue } else { Self::Orange }
    }

    pub fn is_signal(self) -> bool {
        self == Self::Blue
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blue => write!(f, "blue"),
            Self::Orange => write!(f, "orange"),
        }
    }
}

/// One recorded response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trial {
    #[serde(default, deserialize_with = "lenient_index")]
    pub index: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub color: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub slider_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_choice")]
    pub button_pressed: Option<Choice>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub ai_guess_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    /// Any other fields the UI recorded (e.g. `dPrimeTeam`, `aiAccuracy`).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Trial {
    /// Numeric value of a field by its recorded (camelCase) name.
    pub fn numeric_field(&self, name: &str) -> Option<f64> {
        match name {
            "index" => self.index.map(f64::from),
            "color" => self.color,
            "sliderValue" => self.slider_value,
            "aiGuessValue" => self.ai_guess_value,
            _ => self
                .extra
                .get(name)
                .and_then(Value::as_f64)
                .filter(|v| v.is_finite()),
        }
    }

    /// Parsed timestamp, if present and ISO-8601.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_deref().and_then(parse_timestamp)
    }

    /// True for main-phase (assisted) trials, which carry a button choice.
    pub fn is_assisted(&self) -> bool {
        self.button_pressed.is_some()
    }
}

/// Parse an ISO-8601 timestamp. Offsets are honoured; naive values are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// A participant's ordered session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Participant {
    pub id: String,
    pub trials: Vec<Trial>,
}

impl Participant {
    pub fn new(id: impl Into<String>, trials: Vec<Trial>) -> Self {
        Self {
            id: id.into(),
            trials,
        }
    }

    /// First trial recorded with the given index.
    pub fn trial_at(&self, index: u32) -> Option<&Trial> {
        self.trials.iter().find(|t| t.index == Some(index))
    }
}

/// Participants in file order. Order drives the `tN` labels in reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParticipantDataset {
    pub participants: Vec<Participant>,
}

impl ParticipantDataset {
    pub fn new(participants: Vec<Participant>) -> Self {
        Self { participants }
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    pub fn total_trials(&self) -> usize {
        self.participants.iter().map(|p| p.trials.len()).sum()
    }
}

impl FromIterator<Participant> for ParticipantDataset {
    fn from_iter<I: IntoIterator<Item = Participant>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Positional label used in per-participant reports (`tN1`, `tN2`, ...).
pub fn participant_label(position: usize) -> String {
    format!("tN{}", position + 1)
}

// ---------------------------------------------------------------------------
// Lenient field parsing
// ---------------------------------------------------------------------------

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value.as_f64().filter(|v| v.is_finite()))
}

fn lenient_index<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value.as_u64().and_then(|v| u32::try_from(v).ok()))
}

fn lenient_choice<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Choice>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value.as_str().and_then(Choice::parse))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value.as_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> Trial {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn full_trial_parses() {
        let t = parse(json!({
            "index": 3,
            "color": 52,
            "sliderValue": -12.5,
            "buttonPressed": "Blue",
            "aiGuessValue": 1.4,
            "timestamp": "2024-01-01T00:00:00Z",
            "dPrimeTeam": 3.1
        }));
        assert_eq!(t.index, Some(3));
        assert_eq!(t.color, Some(52.0));
        assert_eq!(t.slider_value, Some(-12.5));
        assert_eq!(t.button_pressed, Some(Choice::Blue));
        assert_eq!(t.ai_guess_value, Some(1.4));
        assert_eq!(t.numeric_field("dPrimeTeam"), Some(3.1));
        assert!(t.parsed_timestamp().is_some());
    }

    #[test]
    fn malformed_fields_become_absent() {
        let t = parse(json!({
            "index": -1,
            "color": "blue-ish",
            "sliderValue": null,
            "buttonPressed": "green",
            "aiGuessValue": "1.2",
            "timestamp": 12345
        }));
        assert_eq!(t, Trial::default());
    }

    #[test]
    fn missing_fields_are_absent() {
        let t = parse(json!({}));
        assert!(t.index.is_none());
        assert!(!t.is_assisted());
    }

    #[test]
    fn timestamps_with_and_without_offset() {
        let utc = parse_timestamp("2024-01-01T00:10:00Z").unwrap();
        let naive = parse_timestamp("2024-01-01T00:10:00.000").unwrap();
        let offset = parse_timestamp("2024-01-01T01:10:00+01:00").unwrap();
        assert_eq!(utc, naive);
        assert_eq!(utc, offset);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn trial_at_finds_first_match() {
        let p = Participant::new(
            "p1",
            vec![
                parse(json!({"index": 0, "color": 10})),
                parse(json!({"index": 1, "color": 20})),
                parse(json!({"index": 1, "color": 30})),
            ],
        );
        assert_eq!(p.trial_at(1).and_then(|t| t.color), Some(20.0));
        assert!(p.trial_at(5).is_none());
    }

    #[test]
    fn labels_are_one_based() {
        assert_eq!(participant_label(0), "tN1");
        assert_eq!(participant_label(9), "tN10");
    }
}
