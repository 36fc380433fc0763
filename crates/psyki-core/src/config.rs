//! Analysis configuration.
//!
//! Every field has a default matching the deployed experiment, so an empty
//! JSON object (or no file at all) is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::{Classifier, StimulusPolicy};
use crate::evidence::SimulationParams;
use crate::probit::DEFAULT_EPSILON;
use crate::sdt::{RatePair, ReportSpec, SensitivityModel};
use crate::weighting::CombinerSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    /// Stimulus convention for analysis of recorded trials.
    pub stimulus: StimulusPolicy,
    /// Stimulus convention the simulated aid reads.
    pub simulation_stimulus: StimulusPolicy,
    pub slider_threshold: f64,
    pub aid_reliability: RatePair,
    pub epsilon: f64,
    pub first_index: u32,
    pub final_index: u32,
    pub human_scale: f64,
    pub boundary: f64,
    /// Participants below this human d′ are left out of the summary table.
    pub min_human_d_prime: f64,
    pub reference_team_d_prime: f64,
    /// Field holding the team d′ recorded by the experiment client.
    pub team_field: String,
    pub aid_mean: f64,
    pub aid_std_dev: f64,
    pub aid_bound: f64,
    pub feedback_window: usize,
    pub feedback_scale: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let sim = SimulationParams::default();
        let combiner = CombinerSettings::default();
        Self {
            stimulus: StimulusPolicy::PERCENT_SCALE,
            simulation_stimulus: sim.stimulus,
            slider_threshold: 0.0,
            aid_reliability: RatePair::DEFAULT_AID,
            epsilon: DEFAULT_EPSILON,
            first_index: 0,
            final_index: 199,
            human_scale: combiner.human_scale,
            boundary: combiner.boundary,
            min_human_d_prime: 1.0,
            reference_team_d_prime: 3.8,
            team_field: "dPrimeTeam".to_string(),
            aid_mean: sim.mean,
            aid_std_dev: sim.std_dev,
            aid_bound: sim.bound,
            feedback_window: 6,
            feedback_scale: 100.0,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file. Missing keys take defaults.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> std::io::Result<Self> {
        serde_json::from_str::<Self>(raw).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("failed to parse analysis config JSON: {e}"),
            )
        })
    }

    pub fn sensitivity_model(&self) -> SensitivityModel {
        SensitivityModel {
            epsilon: self.epsilon,
            aid_reliability: self.aid_reliability,
        }
    }

    pub fn slider_report(&self) -> ReportSpec {
        ReportSpec::slider(self.stimulus, self.slider_threshold)
    }

    pub fn button_report(&self) -> ReportSpec {
        ReportSpec::button(self.stimulus, self.slider_threshold)
    }

    /// Button classifier over every trial, used by participant analysis.
    pub fn button_classifier(&self) -> Classifier {
        Classifier::button(self.stimulus)
    }

    pub fn combiner_settings(&self) -> CombinerSettings {
        CombinerSettings {
            human_scale: self.human_scale,
            boundary: self.boundary,
        }
    }

    pub fn simulation_params(&self) -> SimulationParams {
        SimulationParams {
            stimulus: self.simulation_stimulus,
            mean: self.aid_mean,
            std_dev: self.aid_std_dev,
            bound: self.aid_bound,
            reliability: self.aid_reliability,
            ..SimulationParams::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_is_default() {
        let cfg = AnalysisConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, AnalysisConfig::default());
        assert_eq!(cfg.final_index, 199);
        assert_eq!(cfg.min_human_d_prime, 1.0);
        assert_eq!(cfg.reference_team_d_prime, 3.8);
    }

    #[test]
    fn partial_override() {
        let cfg = AnalysisConfig::from_json_str(
            r#"{"sliderThreshold": 5, "finalIndex": 99,
                "stimulus": {"threshold": 0, "comparison": "atLeast"},
                "aidReliability": {"hitRate": 0.8, "falseAlarmRate": 0.2}}"#,
        )
        .unwrap();
        assert_eq!(cfg.slider_threshold, 5.0);
        assert_eq!(cfg.final_index, 99);
        assert_eq!(cfg.stimulus, StimulusPolicy::SIGNED_SCALE);
        assert_eq!(cfg.sensitivity_model().aid_reliability.hit_rate, 0.8);
        assert_eq!(cfg.simulation_params().reliability.false_alarm_rate, 0.2);
        assert_eq!(cfg.epsilon, DEFAULT_EPSILON);
    }

    #[test]
    fn invalid_json_is_invalid_data() {
        let err = AnalysisConfig::from_json_str("{\"epsilon\": \"tiny\"}").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"boundary\": 0.25, \"humanScale\": 0.05}}").unwrap();
        let cfg = AnalysisConfig::load(file.path()).unwrap();
        let settings = cfg.combiner_settings();
        assert_eq!(settings.boundary, 0.25);
        assert_eq!(settings.human_scale, 0.05);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = AnalysisConfig::load(Path::new("/nonexistent/psyki.json")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
