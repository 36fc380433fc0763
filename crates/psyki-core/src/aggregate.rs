//! Cross-participant reducers.
//!
//! Every function here is a pure scan over a [`ParticipantDataset`]. A trial
//! lacking a field a statistic needs is left out of that statistic only, and
//! empty denominators produce 0 rather than NaN.

use serde::Serialize;

use crate::classify::StimulusPolicy;
use crate::probit::{mean, median, percentage};
use crate::trial::{Choice, ParticipantDataset, Trial, participant_label};

// ---------------------------------------------------------------------------
// Field statistics
// ---------------------------------------------------------------------------

/// Mean and median of one numeric field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldStatistic {
    pub field: String,
    /// Trial index the values were taken from; `None` for all trials.
    pub index: Option<u32>,
    /// Number of values that entered the statistic.
    pub count: usize,
    pub mean: f64,
    pub median: f64,
}

impl FieldStatistic {
    fn from_values(field: &str, index: Option<u32>, values: &[f64]) -> Self {
        Self {
            field: field.to_string(),
            index,
            count: values.len(),
            mean: mean(values),
            median: median(values),
        }
    }
}

/// Values of `field` on each participant's trial at `index`.
pub fn field_at_index(dataset: &ParticipantDataset, field: &str, index: u32) -> Vec<f64> {
    dataset
        .iter()
        .filter_map(|p| p.trial_at(index))
        .filter_map(|t| t.numeric_field(field))
        .collect()
}

pub fn mean_at_index(dataset: &ParticipantDataset, field: &str, index: u32) -> f64 {
    mean(&field_at_index(dataset, field, index))
}

pub fn median_at_index(dataset: &ParticipantDataset, field: &str, index: u32) -> f64 {
    median(&field_at_index(dataset, field, index))
}

/// Mean/median of `field` at one trial index across participants.
pub fn field_statistic_at_index(
    dataset: &ParticipantDataset,
    field: &str,
    index: u32,
) -> FieldStatistic {
    let values = field_at_index(dataset, field, index);
    FieldStatistic::from_values(field, Some(index), &values)
}

/// Mean/median of `field` over every trial that carries it.
pub fn field_statistic_all(dataset: &ParticipantDataset, field: &str) -> FieldStatistic {
    let values: Vec<f64> = dataset
        .iter()
        .flat_map(|p| p.trials.iter())
        .filter_map(|t| t.numeric_field(field))
        .collect();
    FieldStatistic::from_values(field, None, &values)
}

// ---------------------------------------------------------------------------
// Time on task
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantTiming {
    pub participant: String,
    /// Milliseconds between the two endpoint trials; `None` if either is
    /// missing or has no parseable timestamp.
    pub elapsed_ms: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingSummary {
    pub start_index: u32,
    pub end_index: u32,
    pub per_participant: Vec<ParticipantTiming>,
    /// Participants with a defined elapsed time.
    pub measured: usize,
    pub mean_ms: f64,
    pub median_ms: f64,
}

/// Elapsed time between the trials at `start` and `end` for each participant.
pub fn time_on_task(dataset: &ParticipantDataset, start: u32, end: u32) -> TimingSummary {
    let per_participant: Vec<ParticipantTiming> = dataset
        .iter()
        .map(|p| {
            let first = p.trial_at(start).and_then(Trial::parsed_timestamp);
            let last = p.trial_at(end).and_then(Trial::parsed_timestamp);
            let elapsed_ms = match (first, last) {
                (Some(a), Some(b)) => Some((b - a).num_milliseconds()),
                _ => {
                    log::debug!("{}: no elapsed time between trials {start} and {end}", p.id);
                    None
                }
            };
            ParticipantTiming {
                participant: p.id.clone(),
                elapsed_ms,
            }
        })
        .collect();

    let values: Vec<f64> = per_participant
        .iter()
        .filter_map(|t| t.elapsed_ms)
        .map(|ms| ms as f64)
        .collect();

    TimingSummary {
        start_index: start,
        end_index: end,
        measured: values.len(),
        mean_ms: mean(&values),
        median_ms: median(&values),
        per_participant,
    }
}

// ---------------------------------------------------------------------------
// Side agreement (slider vs button, slider vs aid)
// ---------------------------------------------------------------------------

/// How much of an agreement report to materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgreementDetail {
    /// Overall counts only.
    #[default]
    Overall,
    /// Overall plus one row per participant.
    PerParticipant,
    /// Per-participant rows including every compared trial.
    PerTrial,
}

/// What the slider's side is compared against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Counterpart {
    /// The recorded button choice.
    Button,
    /// The aid's guess, blue when `aiGuessValue > boundary`.
    AidGuess { boundary: f64 },
}

impl Counterpart {
    fn read(&self, trial: &Trial) -> Option<(Choice, Option<f64>)> {
        match *self {
            Self::Button => trial.button_pressed.map(|c| (c, None)),
            Self::AidGuess { boundary } => trial
                .ai_guess_value
                .map(|v| (Choice::from_signal(v > boundary), Some(v))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementCounts {
    pub comparisons: usize,
    pub matches: usize,
    pub mismatches: usize,
}

impl AgreementCounts {
    fn record(&mut self, is_match: bool) {
        self.comparisons += 1;
        if is_match {
            self.matches += 1;
        } else {
            self.mismatches += 1;
        }
    }

    fn merge(&mut self, other: &Self) {
        self.comparisons += other.comparisons;
        self.matches += other.matches;
        self.mismatches += other.mismatches;
    }

    /// Match percentage rounded to two decimals, 0 when nothing was compared.
    pub fn match_percentage(&self) -> f64 {
        percentage(self.matches, self.comparisons)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideComparison {
    pub index: Option<u32>,
    pub slider_value: f64,
    pub slider_side: Choice,
    /// Aid guess value; absent for button comparisons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_value: Option<f64>,
    pub other_side: Choice,
    pub is_match: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantAgreement {
    pub participant: String,
    pub label: String,
    pub counts: AgreementCounts,
    pub match_percentage: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comparisons: Vec<SideComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementReport {
    pub overall: AgreementCounts,
    pub match_percentage: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub per_participant: Vec<ParticipantAgreement>,
}

/// Compare the slider's side with a counterpart on every trial that has both.
pub fn side_agreement(
    dataset: &ParticipantDataset,
    slider_threshold: f64,
    counterpart: Counterpart,
    detail: AgreementDetail,
) -> AgreementReport {
    let mut overall = AgreementCounts::default();
    let mut per_participant = Vec::new();

    for (position, p) in dataset.iter().enumerate() {
        let mut counts = AgreementCounts::default();
        let mut comparisons = Vec::new();

        for trial in &p.trials {
            let (Some(slider), Some((other_side, other_value))) =
                (trial.slider_value, counterpart.read(trial))
            else {
                continue;
            };
            let slider_side = Choice::from_signal(slider > slider_threshold);
            let is_match = slider_side == other_side;
            counts.record(is_match);
            if detail == AgreementDetail::PerTrial {
                comparisons.push(SideComparison {
                    index: trial.index,
                    slider_value: slider,
                    slider_side,
                    other_value,
                    other_side,
                    is_match,
                });
            }
        }

        overall.merge(&counts);
        if detail != AgreementDetail::Overall {
            per_participant.push(ParticipantAgreement {
                participant: p.id.clone(),
                label: participant_label(position),
                match_percentage: counts.match_percentage(),
                counts,
                comparisons,
            });
        }
    }

    AgreementReport {
        match_percentage: overall.match_percentage(),
        overall,
        per_participant,
    }
}

/// Expected button from the slider's side vs the button actually pressed.
pub fn slider_button_agreement(
    dataset: &ParticipantDataset,
    slider_threshold: f64,
    detail: AgreementDetail,
) -> AgreementReport {
    side_agreement(dataset, slider_threshold, Counterpart::Button, detail)
}

/// Slider side vs the side the aid's guess falls on.
pub fn ai_slider_agreement(
    dataset: &ParticipantDataset,
    slider_threshold: f64,
    aid_boundary: f64,
    detail: AgreementDetail,
) -> AgreementReport {
    side_agreement(
        dataset,
        slider_threshold,
        Counterpart::AidGuess {
            boundary: aid_boundary,
        },
        detail,
    )
}

// ---------------------------------------------------------------------------
// Aid guess vs slider differences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessDifference {
    pub index: Option<u32>,
    pub slider_value: f64,
    pub ai_guess_value: f64,
    /// `sliderValue − aiGuessValue`.
    pub difference: f64,
    pub abs_difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDifferences {
    pub participant: String,
    pub label: String,
    pub comparisons: Vec<GuessDifference>,
    pub mean_difference: f64,
    pub mean_abs_difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifferenceReport {
    pub per_participant: Vec<ParticipantDifferences>,
    pub comparisons: usize,
    pub mean_difference: f64,
    pub mean_abs_difference: f64,
}

/// Raw numeric distance between slider and aid guess per trial.
pub fn ai_slider_differences(dataset: &ParticipantDataset) -> DifferenceReport {
    let mut all_diffs = Vec::new();
    let mut all_abs = Vec::new();

    let per_participant = dataset
        .iter()
        .enumerate()
        .map(|(position, p)| {
            let comparisons: Vec<GuessDifference> = p
                .trials
                .iter()
                .filter_map(|t| {
                    let (slider, guess) = (t.slider_value?, t.ai_guess_value?);
                    let difference = slider - guess;
                    Some(GuessDifference {
                        index: t.index,
                        slider_value: slider,
                        ai_guess_value: guess,
                        difference,
                        abs_difference: difference.abs(),
                    })
                })
                .collect();
            let diffs: Vec<f64> = comparisons.iter().map(|c| c.difference).collect();
            let abs: Vec<f64> = comparisons.iter().map(|c| c.abs_difference).collect();
            all_diffs.extend_from_slice(&diffs);
            all_abs.extend_from_slice(&abs);
            ParticipantDifferences {
                participant: p.id.clone(),
                label: participant_label(position),
                mean_difference: mean(&diffs),
                mean_abs_difference: mean(&abs),
                comparisons,
            }
        })
        .collect();

    DifferenceReport {
        per_participant,
        comparisons: all_diffs.len(),
        mean_difference: mean(&all_diffs),
        mean_abs_difference: mean(&all_abs),
    }
}

// ---------------------------------------------------------------------------
// Accuracy by phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyTally {
    pub correct: usize,
    pub incorrect: usize,
    pub total: usize,
    /// Rounded to two decimals, 0 when `total` is zero.
    pub accuracy_percentage: f64,
}

impl AccuracyTally {
    fn record(&mut self, correct: bool) {
        if correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
        self.total += 1;
        self.accuracy_percentage = percentage(self.correct, self.total);
    }
}

/// Three independent accuracy tallies for one participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantAccuracy {
    pub participant: String,
    pub label: String,
    /// Button choice vs true category.
    pub button_comparison: AccuracyTally,
    /// Slider side vs true category on trials that also have a button.
    pub slider_when_button_exists: AccuracyTally,
    /// Slider side vs true category on trials without a button.
    pub slider_only_trials: AccuracyTally,
}

/// Accuracy of button and slider responses, split by assisted/unassisted.
pub fn stratified_accuracy(
    dataset: &ParticipantDataset,
    stimulus: StimulusPolicy,
    slider_threshold: f64,
) -> Vec<ParticipantAccuracy> {
    dataset
        .iter()
        .enumerate()
        .map(|(position, p)| {
            let mut row = ParticipantAccuracy {
                participant: p.id.clone(),
                label: participant_label(position),
                button_comparison: AccuracyTally::default(),
                slider_when_button_exists: AccuracyTally::default(),
                slider_only_trials: AccuracyTally::default(),
            };
            for trial in &p.trials {
                let Some(truth) = stimulus.truth(trial) else {
                    continue;
                };
                let slider_side = trial
                    .slider_value
                    .map(|v| Choice::from_signal(v > slider_threshold));
                match (trial.button_pressed, slider_side) {
                    (Some(button), slider) => {
                        row.button_comparison.record(button == truth);
                        if let Some(side) = slider {
                            row.slider_when_button_exists.record(side == truth);
                        }
                    }
                    (None, Some(side)) => row.slider_only_trials.record(side == truth),
                    (None, None) => {}
                }
            }
            row
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Rolling feedback
// ---------------------------------------------------------------------------

/// Average response deviation over a trailing window of trials.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub diffs: Vec<f64>,
    pub avg_diff: f64,
    /// `100 − avg_diff`.
    pub avg_accuracy: f64,
}

/// Deviation `|slider − color·scale|` over the last `window` trials ending at
/// position `current`. `None` when no trial in the window has both fields.
pub fn rolling_feedback(
    trials: &[Trial],
    current: usize,
    window: usize,
    stimulus_scale: f64,
) -> Option<Feedback> {
    if trials.is_empty() || window == 0 {
        return None;
    }
    let end = current.min(trials.len() - 1) + 1;
    let start = end.saturating_sub(window);
    let diffs: Vec<f64> = trials[start..end]
        .iter()
        .filter_map(|t| Some((t.slider_value? - t.color? * stimulus_scale).abs()))
        .collect();
    if diffs.is_empty() {
        return None;
    }
    let avg_diff = mean(&diffs);
    Some(Feedback {
        avg_accuracy: 100.0 - avg_diff,
        avg_diff,
        diffs,
    })
}
