//! Per-participant optimal-weighting analysis.
//!
//! Classifies button choices, derives the participant's d′ and weights, then
//! combines the slider with the aid's guess trial by trial.

use serde::Serialize;

use crate::classify::{ClassificationCounts, Classifier, Outcome};
use crate::evidence::EvidenceSource;
use crate::sdt::{RatePair, SensitivityModel, team_d_prime};
use crate::trial::Trial;
use crate::weighting::{CombinedEvidence, Combiner, CombinerSettings, DecisionWeights};

/// Aggregate figures for one participant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
    /// Eligible (classified) trials.
    pub total: usize,
    pub counts: ClassificationCounts,
    /// Percentage of correct outcomes.
    pub accuracy: f64,
    pub rates: RatePair,
    pub d_prime_human: f64,
    pub d_prime_aid: f64,
    pub d_prime_team: f64,
    pub weights: DecisionWeights,
}

/// One trial with its classification and combined evidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialEvidence {
    pub index: Option<u32>,
    pub classification: Option<Outcome>,
    /// `None` when the slider or the aid's guess is missing.
    pub evidence: Option<CombinedEvidence>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantAnalysis {
    pub summary: ParticipantSummary,
    pub trials: Vec<TrialEvidence>,
}

impl ParticipantAnalysis {
    /// Trials where the team decision agrees with the primary response.
    pub fn team_agreement(&self) -> (usize, usize) {
        let mut agree = 0;
        let mut total = 0;
        for t in &self.trials {
            if let (Some(outcome), Some(ev)) = (t.classification, t.evidence) {
                total += 1;
                let responded_blue = matches!(outcome, Outcome::Hit | Outcome::FalseAlarm);
                if responded_blue == ev.decision.is_signal() {
                    agree += 1;
                }
            }
        }
        (agree, total)
    }
}

/// Analyze one participant's session.
///
/// `classifier` supplies the outcome for every trial (normally button
/// choices); the aid's d′ comes from its own reliability pair.
pub fn analyze_participant(
    trials: &[Trial],
    classifier: &Classifier,
    model: &SensitivityModel,
    aid: &dyn EvidenceSource,
    settings: CombinerSettings,
) -> ParticipantAnalysis {
    let outcomes: Vec<Option<Outcome>> = trials.iter().map(|t| classifier.classify(t)).collect();
    let counts = outcomes
        .iter()
        .flatten()
        .fold(ClassificationCounts::default(), |mut c, &o| {
            c.record(o);
            c
        });

    let rates = RatePair::from_counts(&counts);
    let d_prime_human = rates.d_prime(model.epsilon);
    let d_prime_aid = aid.reliability().d_prime(model.epsilon);
    let weights = DecisionWeights::from_d_primes(d_prime_human, d_prime_aid);
    let combiner = Combiner::new(weights, settings);

    let per_trial = trials
        .iter()
        .zip(outcomes)
        .map(|(trial, classification)| {
            let evidence = match (trial.slider_value, aid.guess(trial)) {
                (Some(slider), Some(guess)) => Some(combiner.evaluate(slider, guess)),
                _ => None,
            };
            TrialEvidence {
                index: trial.index,
                classification,
                evidence,
            }
        })
        .collect();

    ParticipantAnalysis {
        summary: ParticipantSummary {
            total: counts.total(),
            counts,
            accuracy: counts.accuracy(),
            rates,
            d_prime_human,
            d_prime_aid,
            d_prime_team: team_d_prime(d_prime_human, d_prime_aid),
            weights,
        },
        trials: per_trial,
    }
}
