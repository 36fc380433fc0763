//! # psyki-core
//!
//! **Signal detection analysis for human + AI decision experiments.**
//!
//! `psyki-core` turns exported trial data from a colour-judgement study into
//! Signal Detection Theory measures: hit/false-alarm counts, d′ for the human,
//! the automated aid and the ideal team, optimal evidence weights, and the
//! cross-participant aggregates used in the study write-up.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use psyki_core::{AnalysisConfig, SdtReport, dataset};
//!
//! let data = dataset::load(Path::new("participant_data.json")).unwrap();
//! let config = AnalysisConfig::default();
//!
//! for p in data.iter() {
//!     let report = SdtReport::compute(&p.trials, &config.button_report(), &config.sensitivity_model());
//!     println!("{}: d' human {:.2}, team {:.2}", p.id, report.d_primes.human, report.d_primes.team);
//! }
//! ```
//!
//! ## Architecture
//!
//! Dataset → Classifier → Counts → Rates → d′ → Weights → Reports
//!
//! - [`Classifier`] maps one trial to an [`Outcome`] under an explicit
//!   stimulus convention, response modality and phase scope.
//! - [`SdtReport`] derives rates and d′ values; the aid's d′ is fixed by its
//!   reliability pair.
//! - [`Combiner`] applies optimal weights to a slider value and an aid guess.
//! - [`aggregate`] and [`summary`] reduce a whole [`ParticipantDataset`].
//!
//! Every aid implements the [`EvidenceSource`] trait. All analysis functions
//! are pure; the seeded [`SimulatedAid`] is deterministic for a given seed.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod dataset;
pub mod evidence;
pub mod participant;
pub mod probit;
pub mod sdt;
pub mod summary;
pub mod trial;
pub mod weighting;

pub use aggregate::{
    AccuracyTally, AgreementCounts, AgreementDetail, AgreementReport, DifferenceReport, Feedback,
    FieldStatistic, ParticipantAccuracy, TimingSummary, ai_slider_agreement,
    ai_slider_differences, field_statistic_all, field_statistic_at_index, rolling_feedback,
    slider_button_agreement, stratified_accuracy, time_on_task,
};
pub use classify::{
    ClassificationCounts, Classifier, Comparison, Outcome, PhaseScope, ResponsePolicy,
    StimulusPolicy,
};
pub use config::AnalysisConfig;
pub use dataset::DatasetError;
pub use evidence::{
    EvidenceSource, FixedAid, SimulatedAid, SimulationParams, StoredGuess, aid_by_name,
};
pub use participant::{ParticipantAnalysis, ParticipantSummary, analyze_participant};
pub use probit::BoxStats;
pub use sdt::{DPrimes, RatePair, ReportSpec, SdtReport, SensitivityModel, d_prime, team_d_prime};
pub use summary::{
    DPrimeDistributions, ReferenceComparison, SummaryTable, mean_team_simple,
    median_team_sensitivity, median_team_simple,
};
pub use trial::{Choice, Participant, ParticipantDataset, Trial};
pub use weighting::{CombinedEvidence, Combiner, CombinerSettings, DecisionWeights};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
