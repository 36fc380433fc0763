//! Rates and sensitivity (d′) from classification counts.
//!
//! The aid is modelled as a fixed-reliability source: its d′ comes from a
//! configured hit/false-alarm pair, never from per-trial data. Team
//! sensitivity assumes independent evidence: `sqrt(d_human² + d_ai²)`.

use serde::{Deserialize, Serialize};

use crate::classify::{ClassificationCounts, Classifier, PhaseScope, StimulusPolicy};
use crate::probit::{DEFAULT_EPSILON, probit};
use crate::trial::Trial;
use crate::weighting::DecisionWeights;

/// Hit rate and false-alarm rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatePair {
    pub hit_rate: f64,
    pub false_alarm_rate: f64,
}

impl RatePair {
    /// Reliability of the simulated aid: 93% hits, 7% false alarms.
    pub const DEFAULT_AID: Self = Self {
        hit_rate: 0.93,
        false_alarm_rate: 0.07,
    };

    pub fn from_counts(counts: &ClassificationCounts) -> Self {
        Self {
            hit_rate: ratio(counts.hits, counts.hits + counts.misses),
            false_alarm_rate: ratio(
                counts.false_alarms,
                counts.false_alarms + counts.correct_rejections,
            ),
        }
    }

    pub fn d_prime(&self, epsilon: f64) -> f64 {
        d_prime(self.hit_rate, self.false_alarm_rate, epsilon)
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// `Φ⁻¹(hr) − Φ⁻¹(far)` with both rates clamped to `[ε, 1−ε]`.
pub fn d_prime(hit_rate: f64, false_alarm_rate: f64, epsilon: f64) -> f64 {
    probit(hit_rate, epsilon) - probit(false_alarm_rate, epsilon)
}

/// Combined sensitivity of two independent sources.
pub fn team_d_prime(d_human: f64, d_ai: f64) -> f64 {
    d_human.hypot(d_ai)
}

/// Parameters shared by every sensitivity computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityModel {
    pub epsilon: f64,
    pub aid_reliability: RatePair,
}

impl Default for SensitivityModel {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            aid_reliability: RatePair::DEFAULT_AID,
        }
    }
}

impl SensitivityModel {
    pub fn aid_d_prime(&self) -> f64 {
        self.aid_reliability.d_prime(self.epsilon)
    }
}

/// Which classifiers feed a report.
///
/// `primary` produces the reported counts, rates and `teamSimple`; `human`
/// produces the human d′ that enters the team and weight computations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSpec {
    pub primary: Classifier,
    pub human: Classifier,
}

impl ReportSpec {
    /// Slider responses on assisted trials, for both counts and human d′.
    pub fn slider(stimulus: StimulusPolicy, slider_threshold: f64) -> Self {
        let slider = Classifier::slider(stimulus, slider_threshold).with_scope(PhaseScope::Assisted);
        Self {
            primary: slider,
            human: slider,
        }
    }

    /// Button choices for counts; the slider on the same trials for human d′.
    pub fn button(stimulus: StimulusPolicy, slider_threshold: f64) -> Self {
        Self {
            primary: Classifier::button(stimulus).with_scope(PhaseScope::Assisted),
            human: Classifier::slider(stimulus, slider_threshold).with_scope(PhaseScope::Assisted),
        }
    }
}

/// d′ values of one report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DPrimes {
    pub human: f64,
    pub ai: f64,
    pub team: f64,
    /// d′ of the primary responses' own rate pair.
    pub team_simple: f64,
}

/// SDT summary of one participant's trials.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdtReport {
    pub counts: ClassificationCounts,
    pub rates: RatePair,
    pub human_counts: ClassificationCounts,
    pub human_rates: RatePair,
    pub d_primes: DPrimes,
    pub decision_weights: DecisionWeights,
}

impl SdtReport {
    pub fn compute(trials: &[Trial], spec: &ReportSpec, model: &SensitivityModel) -> Self {
        let counts = ClassificationCounts::tally(trials, &spec.primary);
        let human_counts = if spec.human == spec.primary {
            counts
        } else {
            ClassificationCounts::tally(trials, &spec.human)
        };
        let rates = RatePair::from_counts(&counts);
        let human_rates = RatePair::from_counts(&human_counts);

        let human = human_rates.d_prime(model.epsilon);
        let ai = model.aid_d_prime();
        Self {
            counts,
            rates,
            human_counts,
            human_rates,
            d_primes: DPrimes {
                human,
                ai,
                team: team_d_prime(human, ai),
                team_simple: rates.d_prime(model.epsilon),
            },
            decision_weights: DecisionWeights::from_d_primes(human, ai),
        }
    }
}
