//! Evidence sources for the automated aid.
//!
//! Every aid implements [`EvidenceSource`]: a continuous guess per trial on a
//! signed scale (positive = blue) and a fixed reliability pair that determines
//! its d′. Analysis normally reads the guesses stored with each trial;
//! [`SimulatedAid`] reproduces the experiment's noisy recommendation with a
//! seeded RNG and [`FixedAid`] gives deterministic guesses for tests.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::classify::StimulusPolicy;
use crate::sdt::RatePair;
use crate::trial::{Choice, Trial};

/// Trait that every aid must implement.
pub trait EvidenceSource: Send + Sync {
    /// Short identifier (e.g. `"stored"`).
    fn name(&self) -> &'static str;

    /// Hit/false-alarm pair the aid is modelled with.
    fn reliability(&self) -> RatePair;

    /// Continuous guess for a trial, `None` when the aid has nothing to say.
    fn guess(&self, trial: &Trial) -> Option<f64>;
}

/// Reads the `aiGuessValue` recorded with each trial.
#[derive(Debug, Clone, Copy)]
pub struct StoredGuess {
    pub reliability: RatePair,
}

impl Default for StoredGuess {
    fn default() -> Self {
        Self {
            reliability: RatePair::DEFAULT_AID,
        }
    }
}

impl EvidenceSource for StoredGuess {
    fn name(&self) -> &'static str {
        "stored"
    }

    fn reliability(&self) -> RatePair {
        self.reliability
    }

    fn guess(&self, trial: &Trial) -> Option<f64> {
        trial.ai_guess_value
    }
}

/// Parameters of the simulated recommendation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    /// Stimulus convention used to find the true side.
    pub stimulus: StimulusPolicy,
    /// Distance of the guess distribution's mean from zero.
    pub mean: f64,
    pub std_dev: f64,
    /// Guesses are clamped to `[-bound, bound]`.
    pub bound: f64,
    /// Trials whose recorded `aiAccuracy` falls below this point the aid to
    /// the wrong side.
    pub misleading_below: f64,
    pub reliability: RatePair,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            stimulus: StimulusPolicy::SIGNED_SCALE,
            mean: 1.5,
            std_dev: 0.3,
            bound: 3.0,
            misleading_below: 0.5,
            reliability: RatePair::DEFAULT_AID,
        }
    }
}

/// Gaussian guess centred on ±`mean` around the true side.
pub struct SimulatedAid {
    params: SimulationParams,
    rng: Mutex<StdRng>,
}

impl SimulatedAid {
    pub fn new(params: SimulationParams, seed: u64) -> Self {
        Self {
            params,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Side the aid argues for on this trial.
    fn target_side(&self, trial: &Trial) -> Option<Choice> {
        let truth = self.params.stimulus.truth(trial)?;
        let misleading = trial
            .numeric_field("aiAccuracy")
            .is_some_and(|acc| acc < self.params.misleading_below);
        Some(if misleading { opposite(truth) } else { truth })
    }

    fn standard_normal(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        // Box–Muller; u must be non-zero for the log.
        let mut u: f64 = 0.0;
        while u == 0.0 {
            u = rng.random();
        }
        let v: f64 = rng.random();
        (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos()
    }
}

fn opposite(choice: Choice) -> Choice {
    match choice {
        Choice::Blue => Choice::Orange,
        Choice::Orange => Choice::Blue,
    }
}

impl EvidenceSource for SimulatedAid {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn reliability(&self) -> RatePair {
        self.params.reliability
    }

    fn guess(&self, trial: &Trial) -> Option<f64> {
        let side = self.target_side(trial)?;
        let centre = if side.is_signal() {
            self.params.mean
        } else {
            -self.params.mean
        };
        let raw = centre + self.standard_normal() * self.params.std_dev;
        Some(raw.clamp(-self.params.bound, self.params.bound))
    }
}

/// Always guesses `magnitude` toward the true side.
#[derive(Debug, Clone, Copy)]
pub struct FixedAid {
    pub stimulus: StimulusPolicy,
    pub magnitude: f64,
    pub reliability: RatePair,
}

impl EvidenceSource for FixedAid {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn reliability(&self) -> RatePair {
        self.reliability
    }

    fn guess(&self, trial: &Trial) -> Option<f64> {
        let truth = self.stimulus.truth(trial)?;
        Some(if truth.is_signal() {
            self.magnitude
        } else {
            -self.magnitude
        })
    }
}

/// Parse an aid name as accepted on the command line.
pub fn aid_by_name(name: &str, seed: u64, params: SimulationParams) -> Option<Box<dyn EvidenceSource>> {
    match name {
        "stored" => Some(Box::new(StoredGuess {
            reliability: params.reliability,
        })),
        "simulated" | "sim" => Some(Box::new(SimulatedAid::new(params, seed))),
        "fixed" => Some(Box::new(FixedAid {
            stimulus: params.stimulus,
            magnitude: params.mean,
            reliability: params.reliability,
        })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signed_trial(color: f64) -> Trial {
        Trial {
            color: Some(color),
            ..Trial::default()
        }
    }

    #[test]
    fn stored_reads_recorded_guess() {
        let aid = StoredGuess::default();
        let mut t = signed_trial(1.0);
        assert_eq!(aid.guess(&t), None);
        t.ai_guess_value = Some(-1.7);
        assert_eq!(aid.guess(&t), Some(-1.7));
        assert_eq!(aid.reliability(), RatePair::DEFAULT_AID);
    }

    #[test]
    fn simulated_is_seeded_and_bounded() {
        let a = SimulatedAid::new(SimulationParams::default(), 42);
        let b = SimulatedAid::new(SimulationParams::default(), 42);
        for color in [-20.0, 20.0, -3.0, 3.0, 0.0] {
            let t = signed_trial(color);
            let ga = a.guess(&t).unwrap();
            let gb = b.guess(&t).unwrap();
            assert_eq!(ga, gb);
            assert!(ga.abs() <= 3.0);
        }
    }

    #[test]
    fn simulated_points_to_true_side_on_average() {
        let aid = SimulatedAid::new(SimulationParams::default(), 7);
        let blue = signed_trial(10.0);
        let orange = signed_trial(-10.0);
        let n = 500;
        let blue_mean: f64 = (0..n).map(|_| aid.guess(&blue).unwrap()).sum::<f64>() / n as f64;
        let orange_mean: f64 = (0..n).map(|_| aid.guess(&orange).unwrap()).sum::<f64>() / n as f64;
        assert!((blue_mean - 1.5).abs() < 0.1, "blue mean {blue_mean}");
        assert!((orange_mean + 1.5).abs() < 0.1, "orange mean {orange_mean}");
    }

    #[test]
    fn low_accuracy_trials_mislead() {
        let aid = SimulatedAid::new(SimulationParams::default(), 3);
        let t: Trial = serde_json::from_value(json!({"color": 10, "aiAccuracy": 0.4})).unwrap();
        let n = 200;
        let mean: f64 = (0..n).map(|_| aid.guess(&t).unwrap()).sum::<f64>() / n as f64;
        assert!(mean < -1.0, "mean {mean}");
    }

    #[test]
    fn no_stimulus_no_guess() {
        let aid = SimulatedAid::new(SimulationParams::default(), 1);
        assert_eq!(aid.guess(&Trial::default()), None);
    }

    #[test]
    fn fixed_aid_is_deterministic() {
        let aid = FixedAid {
            stimulus: StimulusPolicy::PERCENT_SCALE,
            magnitude: 2.0,
            reliability: RatePair::DEFAULT_AID,
        };
        assert_eq!(aid.guess(&signed_trial(80.0)), Some(2.0));
        assert_eq!(aid.guess(&signed_trial(30.0)), Some(-2.0));
    }

    #[test]
    fn aid_names() {
        let params = SimulationParams::default();
        assert_eq!(aid_by_name("stored", 0, params).unwrap().name(), "stored");
        assert_eq!(aid_by_name("sim", 0, params).unwrap().name(), "simulated");
        assert_eq!(aid_by_name("fixed", 0, params).unwrap().name(), "fixed");
        assert!(aid_by_name("oracle", 0, params).is_none());
    }
}
