//! Study-level summaries built from per-participant reports.

use serde::Serialize;

use crate::aggregate::field_at_index;
use crate::config::AnalysisConfig;
use crate::evidence::EvidenceSource;
use crate::participant::analyze_participant;
use crate::probit::{BoxStats, mean, median};
use crate::sdt::SdtReport;
use crate::trial::{ParticipantDataset, participant_label};

// ---------------------------------------------------------------------------
// Summary table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    /// 1-based position in the dataset, kept after filtering.
    pub position: usize,
    pub participant: String,
    pub label: String,
    pub report: SdtReport,
}

/// Column means over the included rows; all zero when no row is included.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMeans {
    pub hits: f64,
    pub misses: f64,
    pub false_alarms: f64,
    pub correct_rejections: f64,
    pub hit_rate: f64,
    pub false_alarm_rate: f64,
    pub human: f64,
    pub ai: f64,
    pub team: f64,
    pub team_simple: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTable {
    pub min_human_d_prime: f64,
    pub rows: Vec<SummaryRow>,
    /// Participants left out by the human d′ filter.
    pub excluded: Vec<String>,
    pub means: SummaryMeans,
}

impl SummaryTable {
    /// Button report per participant, keeping those whose human d′ reaches
    /// `config.min_human_d_prime`.
    pub fn build(dataset: &ParticipantDataset, config: &AnalysisConfig) -> Self {
        let spec = config.button_report();
        let model = config.sensitivity_model();

        let mut rows = Vec::new();
        let mut excluded = Vec::new();
        for (position, p) in dataset.iter().enumerate() {
            let report = SdtReport::compute(&p.trials, &spec, &model);
            if report.d_primes.human >= config.min_human_d_prime {
                rows.push(SummaryRow {
                    position: position + 1,
                    participant: p.id.clone(),
                    label: participant_label(position),
                    report,
                });
            } else {
                log::debug!(
                    "{}: human d′ {:.2} below {:.2}, excluded from summary",
                    p.id,
                    report.d_primes.human,
                    config.min_human_d_prime
                );
                excluded.push(p.id.clone());
            }
        }

        let means = column_means(&rows);
        Self {
            min_human_d_prime: config.min_human_d_prime,
            rows,
            excluded,
            means,
        }
    }
}

fn column_means(rows: &[SummaryRow]) -> SummaryMeans {
    let col = |f: fn(&SdtReport) -> f64| -> f64 {
        let values: Vec<f64> = rows.iter().map(|r| f(&r.report)).collect();
        mean(&values)
    };
    SummaryMeans {
        hits: col(|r| r.counts.hits as f64),
        misses: col(|r| r.counts.misses as f64),
        false_alarms: col(|r| r.counts.false_alarms as f64),
        correct_rejections: col(|r| r.counts.correct_rejections as f64),
        hit_rate: col(|r| r.rates.hit_rate),
        false_alarm_rate: col(|r| r.rates.false_alarm_rate),
        human: col(|r| r.d_primes.human),
        ai: col(|r| r.d_primes.ai),
        team: col(|r| r.d_primes.team),
        team_simple: col(|r| r.d_primes.team_simple),
    }
}

// ---------------------------------------------------------------------------
// d′ distributions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub values: Vec<f64>,
    pub stats: BoxStats,
}

impl Distribution {
    fn new(values: Vec<f64>) -> Self {
        let stats = BoxStats::from_values(&values);
        Self { values, stats }
    }
}

/// d′ values across all participants, one entry per participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DPrimeDistributions {
    pub human: Distribution,
    /// Constant across participants.
    pub ai: Distribution,
    pub team: Distribution,
    pub team_simple: Distribution,
}

impl DPrimeDistributions {
    pub fn build(dataset: &ParticipantDataset, config: &AnalysisConfig) -> Self {
        let reports = button_reports(dataset, config);
        let pick = |f: fn(&SdtReport) -> f64| reports.iter().map(f).collect::<Vec<_>>();
        Self {
            human: Distribution::new(pick(|r| r.d_primes.human)),
            ai: Distribution::new(pick(|r| r.d_primes.ai)),
            team: Distribution::new(pick(|r| r.d_primes.team)),
            team_simple: Distribution::new(pick(|r| r.d_primes.team_simple)),
        }
    }
}

fn button_reports(dataset: &ParticipantDataset, config: &AnalysisConfig) -> Vec<SdtReport> {
    let spec = config.button_report();
    let model = config.sensitivity_model();
    dataset
        .iter()
        .map(|p| SdtReport::compute(&p.trials, &spec, &model))
        .collect()
}

/// Mean `teamSimple` d′ over every participant's button report.
pub fn mean_team_simple(dataset: &ParticipantDataset, config: &AnalysisConfig) -> f64 {
    let values: Vec<f64> = button_reports(dataset, config)
        .iter()
        .map(|r| r.d_primes.team_simple)
        .collect();
    mean(&values)
}

pub fn median_team_simple(dataset: &ParticipantDataset, config: &AnalysisConfig) -> f64 {
    let values: Vec<f64> = button_reports(dataset, config)
        .iter()
        .map(|r| r.d_primes.team_simple)
        .collect();
    median(&values)
}

/// Median team d′ from each participant's optimal-weighting analysis.
pub fn median_team_sensitivity(
    dataset: &ParticipantDataset,
    config: &AnalysisConfig,
    aid: &dyn EvidenceSource,
) -> f64 {
    let classifier = config.button_classifier();
    let model = config.sensitivity_model();
    let settings = config.combiner_settings();
    let values: Vec<f64> = dataset
        .iter()
        .map(|p| {
            analyze_participant(&p.trials, &classifier, &model, aid, settings)
                .summary
                .d_prime_team
        })
        .collect();
    median(&values)
}

// ---------------------------------------------------------------------------
// Reference comparison
// ---------------------------------------------------------------------------

/// Median team d′ recorded at the final trial against a published value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceComparison {
    pub field: String,
    pub index: u32,
    pub participants: usize,
    pub median: f64,
    pub reference: f64,
    /// `median − reference`.
    pub difference: f64,
    pub exceeds_reference: bool,
}

impl ReferenceComparison {
    pub fn build(dataset: &ParticipantDataset, config: &AnalysisConfig) -> Self {
        let values = field_at_index(dataset, &config.team_field, config.final_index);
        let median = median(&values);
        Self {
            field: config.team_field.clone(),
            index: config.final_index,
            participants: values.len(),
            median,
            reference: config.reference_team_d_prime,
            difference: median - config.reference_team_d_prime,
            exceeds_reference: median > config.reference_team_d_prime,
        }
    }
}
