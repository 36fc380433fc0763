//! Trial classification: Hit / Miss / False Alarm / Correct Rejection.
//!
//! Both the stimulus convention and the response modality are explicit
//! inputs. The recorded data mixes a 0–100 colour scale (threshold 50) with a
//! signed scale (threshold 0), and contains slider responses in every phase
//! but button responses only in the assisted main phase.

use serde::{Deserialize, Serialize};

use crate::trial::{Choice, Trial};

/// How a stimulus value is compared against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Comparison {
    /// `value >= threshold` is a signal trial.
    AtLeast,
    /// `value > threshold` is a signal trial.
    Above,
}

/// Decides whether a trial's stimulus is a signal (blue-dominant) trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StimulusPolicy {
    pub threshold: f64,
    pub comparison: Comparison,
}

impl StimulusPolicy {
    /// 0–100 colour scale: blue when `color >= 50`.
    pub const PERCENT_SCALE: Self = Self {
        threshold: 50.0,
        comparison: Comparison::AtLeast,
    };

    /// Signed colour scale: blue when `color >= 0`.
    pub const SIGNED_SCALE: Self = Self {
        threshold: 0.0,
        comparison: Comparison::AtLeast,
    };

    pub fn is_signal(&self, stimulus: f64) -> bool {
        match self.comparison {
            Comparison::AtLeast => stimulus >= self.threshold,
            Comparison::Above => stimulus > self.threshold,
        }
    }

    /// True category of a trial, `None` when the stimulus is missing.
    pub fn truth(&self, trial: &Trial) -> Option<Choice> {
        trial.color.map(|c| Choice::from_signal(self.is_signal(c)))
    }
}

impl Default for StimulusPolicy {
    fn default() -> Self {
        Self::PERCENT_SCALE
    }
}

/// Where the observer's binary response is read from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ResponsePolicy {
    /// Continuous slider: "blue" when `sliderValue > threshold`.
    Slider { threshold: f64 },
    /// Discrete button: "blue" when the blue button was pressed.
    Button,
}

impl ResponsePolicy {
    pub const SLIDER: Self = Self::Slider { threshold: 0.0 };

    /// The response as a choice, `None` when the needed field is absent.
    pub fn response(&self, trial: &Trial) -> Option<Choice> {
        match *self {
            Self::Slider { threshold } => trial
                .slider_value
                .map(|v| Choice::from_signal(v > threshold)),
            Self::Button => trial.button_pressed,
        }
    }
}

/// Which phase's trials are eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PhaseScope {
    #[default]
    All,
    /// Main-phase trials (a button choice was recorded).
    Assisted,
    /// Calibration trials (no button choice).
    Unassisted,
}

impl PhaseScope {
    pub fn admits(&self, trial: &Trial) -> bool {
        match self {
            Self::All => true,
            Self::Assisted => trial.is_assisted(),
            Self::Unassisted => !trial.is_assisted(),
        }
    }
}

/// One of the four SDT outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Hit,
    Miss,
    FalseAlarm,
    CorrectRejection,
}

impl Outcome {
    pub fn from_decision(signal: bool, responded_signal: bool) -> Self {
        match (signal, responded_signal) {
            (true, true) => Self::Hit,
            (true, false) => Self::Miss,
            (false, true) => Self::FalseAlarm,
            (false, false) => Self::CorrectRejection,
        }
    }

    pub fn is_correct(self) -> bool {
        matches!(self, Self::Hit | Self::CorrectRejection)
    }
}

/// A complete classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classifier {
    pub stimulus: StimulusPolicy,
    pub response: ResponsePolicy,
    #[serde(default)]
    pub scope: PhaseScope,
}

impl Classifier {
    pub fn slider(stimulus: StimulusPolicy, threshold: f64) -> Self {
        Self {
            stimulus,
            response: ResponsePolicy::Slider { threshold },
            scope: PhaseScope::All,
        }
    }

    pub fn button(stimulus: StimulusPolicy) -> Self {
        Self {
            stimulus,
            response: ResponsePolicy::Button,
            scope: PhaseScope::All,
        }
    }

    pub fn with_scope(mut self, scope: PhaseScope) -> Self {
        self.scope = scope;
        self
    }

    /// Classify one trial; `None` when it is ineligible.
    pub fn classify(&self, trial: &Trial) -> Option<Outcome> {
        if !self.scope.admits(trial) {
            return None;
        }
        let truth = self.stimulus.truth(trial)?;
        let response = self.response.response(trial)?;
        Some(Outcome::from_decision(truth.is_signal(), response.is_signal()))
    }
}

/// Outcome tallies for a set of trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationCounts {
    pub hits: usize,
    pub misses: usize,
    pub false_alarms: usize,
    pub correct_rejections: usize,
}

impl ClassificationCounts {
    /// Fold a trial sequence through a classifier.
    pub fn tally<'a, I>(trials: I, classifier: &Classifier) -> Self
    where
        I: IntoIterator<Item = &'a Trial>,
    {
        trials
            .into_iter()
            .filter_map(|t| classifier.classify(t))
            .fold(Self::default(), |mut counts, outcome| {
                counts.record(outcome);
                counts
            })
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Hit => self.hits += 1,
            Outcome::Miss => self.misses += 1,
            Outcome::FalseAlarm => self.false_alarms += 1,
            Outcome::CorrectRejection => self.correct_rejections += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.hits + self.misses + self.false_alarms + self.correct_rejections
    }

    pub fn correct(&self) -> usize {
        self.hits + self.correct_rejections
    }

    /// Percentage of correct outcomes, 0.0 when empty.
    pub fn accuracy(&self) -> f64 {
        crate::probit::percentage(self.correct(), self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(color: f64, slider: Option<f64>, button: Option<Choice>) -> Trial {
        Trial {
            color: Some(color),
            slider_value: slider,
            button_pressed: button,
            ..Trial::default()
        }
    }

    #[test]
    fn stimulus_presets() {
        assert!(StimulusPolicy::PERCENT_SCALE.is_signal(50.0));
        assert!(!StimulusPolicy::PERCENT_SCALE.is_signal(48.0));
        assert!(StimulusPolicy::SIGNED_SCALE.is_signal(0.0));
        assert!(!StimulusPolicy::SIGNED_SCALE.is_signal(-0.1));
        let above = StimulusPolicy {
            threshold: 50.0,
            comparison: Comparison::Above,
        };
        assert!(!above.is_signal(50.0));
    }

    #[test]
    fn four_outcomes_from_button() {
        let c = Classifier::button(StimulusPolicy::PERCENT_SCALE);
        assert_eq!(
            c.classify(&trial(70.0, None, Some(Choice::Blue))),
            Some(Outcome::Hit)
        );
        assert_eq!(
            c.classify(&trial(70.0, None, Some(Choice::Orange))),
            Some(Outcome::Miss)
        );
        assert_eq!(
            c.classify(&trial(20.0, None, Some(Choice::Blue))),
            Some(Outcome::FalseAlarm)
        );
        assert_eq!(
            c.classify(&trial(20.0, None, Some(Choice::Orange))),
            Some(Outcome::CorrectRejection)
        );
    }

    #[test]
    fn slider_zero_is_orange() {
        let c = Classifier::slider(StimulusPolicy::PERCENT_SCALE, 0.0);
        assert_eq!(c.classify(&trial(70.0, Some(0.0), None)), Some(Outcome::Miss));
        assert_eq!(c.classify(&trial(70.0, Some(0.1), None)), Some(Outcome::Hit));
    }

    #[test]
    fn missing_fields_are_ineligible() {
        let button = Classifier::button(StimulusPolicy::PERCENT_SCALE);
        let slider = Classifier::slider(StimulusPolicy::PERCENT_SCALE, 0.0);
        assert_eq!(button.classify(&trial(70.0, Some(5.0), None)), None);
        assert_eq!(slider.classify(&trial(70.0, None, Some(Choice::Blue))), None);
        let no_color = Trial {
            slider_value: Some(3.0),
            ..Trial::default()
        };
        assert_eq!(slider.classify(&no_color), None);
    }

    #[test]
    fn scope_restricts_phase() {
        let assisted = Classifier::slider(StimulusPolicy::PERCENT_SCALE, 0.0)
            .with_scope(PhaseScope::Assisted);
        let unassisted = Classifier::slider(StimulusPolicy::PERCENT_SCALE, 0.0)
            .with_scope(PhaseScope::Unassisted);
        let calibration = trial(70.0, Some(5.0), None);
        let main = trial(70.0, Some(5.0), Some(Choice::Orange));
        assert_eq!(assisted.classify(&calibration), None);
        assert_eq!(assisted.classify(&main), Some(Outcome::Hit));
        assert_eq!(unassisted.classify(&calibration), Some(Outcome::Hit));
        assert_eq!(unassisted.classify(&main), None);
    }

    #[test]
    fn tally_counts_only_eligible() {
        let trials = vec![
            trial(70.0, None, Some(Choice::Blue)),
            trial(70.0, None, Some(Choice::Orange)),
            trial(20.0, None, Some(Choice::Orange)),
            trial(20.0, Some(4.0), None),
        ];
        let counts =
            ClassificationCounts::tally(&trials, &Classifier::button(StimulusPolicy::PERCENT_SCALE));
        assert_eq!(counts.hits, 1);
        assert_eq!(counts.misses, 1);
        assert_eq!(counts.false_alarms, 0);
        assert_eq!(counts.correct_rejections, 1);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.accuracy(), 66.67);
    }

    #[test]
    fn response_policy_deserializes_tagged() {
        let p: ResponsePolicy =
            serde_json::from_str(r#"{"kind": "slider", "threshold": 0.5}"#).unwrap();
        assert_eq!(p, ResponsePolicy::Slider { threshold: 0.5 });
        let b: ResponsePolicy = serde_json::from_str(r#"{"kind": "button"}"#).unwrap();
        assert_eq!(b, ResponsePolicy::Button);
    }
}
