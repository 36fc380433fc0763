//! Optimal-weighting combination of human and aid evidence.
//!
//! Each source is weighted by its share of the summed d′; the combined
//! evidence `Z = aHuman·XHuman + aAid·XAid` is compared against a decision
//! boundary on the aid's signed scale.

use serde::{Deserialize, Serialize};

use crate::trial::Choice;

/// Normalized source weights. `a_human + a_aid == 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionWeights {
    pub a_human: f64,
    pub a_aid: f64,
}

impl DecisionWeights {
    /// Equal weighting, used when the d′ sum is zero or not finite.
    pub const EQUAL: Self = Self {
        a_human: 0.5,
        a_aid: 0.5,
    };

    pub fn from_d_primes(d_human: f64, d_aid: f64) -> Self {
        let total = d_human + d_aid;
        if total == 0.0 || !total.is_finite() {
            return Self::EQUAL;
        }
        Self {
            a_human: d_human / total,
            a_aid: d_aid / total,
        }
    }

    pub fn combine(&self, x_human: f64, x_aid: f64) -> f64 {
        self.a_human * x_human + self.a_aid * x_aid
    }
}

/// Scaling and decision settings for per-trial combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinerSettings {
    /// Multiplier taking the slider onto the aid's scale (±100 → ±3).
    pub human_scale: f64,
    /// `Z > boundary` decides blue.
    pub boundary: f64,
}

impl Default for CombinerSettings {
    fn default() -> Self {
        Self {
            human_scale: 3.0 / 100.0,
            boundary: 0.0,
        }
    }
}

/// Weights plus settings: turns a slider value and an aid guess into a team
/// decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combiner {
    pub weights: DecisionWeights,
    pub settings: CombinerSettings,
}

/// Combined evidence for one trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedEvidence {
    pub x_human: f64,
    pub x_aid: f64,
    pub z: f64,
    pub decision: Choice,
}

impl Combiner {
    pub fn new(weights: DecisionWeights, settings: CombinerSettings) -> Self {
        Self { weights, settings }
    }

    pub fn decide(&self, z: f64) -> Choice {
        Choice::from_signal(z > self.settings.boundary)
    }

    pub fn evaluate(&self, slider_value: f64, aid_guess: f64) -> CombinedEvidence {
        let x_human = slider_value * self.settings.human_scale;
        let z = self.weights.combine(x_human, aid_guess);
        CombinedEvidence {
            x_human,
            x_aid: aid_guess,
            z,
            decision: self.decide(z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        let w = DecisionWeights::from_d_primes(1.2, 2.95);
        assert!((w.a_human + w.a_aid - 1.0).abs() < 1e-12);
        assert!(w.a_aid > w.a_human);
    }

    #[test]
    fn zero_sum_falls_back_to_equal() {
        assert_eq!(DecisionWeights::from_d_primes(0.0, 0.0), DecisionWeights::EQUAL);
        assert_eq!(DecisionWeights::from_d_primes(-1.0, 1.0), DecisionWeights::EQUAL);
        assert_eq!(
            DecisionWeights::from_d_primes(f64::NAN, 1.0),
            DecisionWeights::EQUAL
        );
    }

    #[test]
    fn combiner_scales_slider_and_decides() {
        let c = Combiner::new(DecisionWeights::EQUAL, CombinerSettings::default());
        let e = c.evaluate(100.0, -1.0);
        assert!((e.x_human - 3.0).abs() < 1e-12);
        assert!((e.z - 1.0).abs() < 1e-12);
        assert_eq!(e.decision, Choice::Blue);

        let e = c.evaluate(-20.0, 0.5);
        // 0.5 * -0.6 + 0.5 * 0.5 = -0.05
        assert!(e.z < 0.0);
        assert_eq!(e.decision, Choice::Orange);
    }

    #[test]
    fn boundary_is_exclusive() {
        let c = Combiner::new(
            DecisionWeights::EQUAL,
            CombinerSettings {
                human_scale: 1.0,
                boundary: 0.0,
            },
        );
        assert_eq!(c.decide(0.0), Choice::Orange);
        let shifted = Combiner::new(
            DecisionWeights::EQUAL,
            CombinerSettings {
                human_scale: 1.0,
                boundary: 50.0,
            },
        );
        assert_eq!(shifted.decide(49.0), Choice::Orange);
        assert_eq!(shifted.decide(51.0), Choice::Blue);
    }
}
