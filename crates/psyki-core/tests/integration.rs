//! Integration tests for psyki-core.
//!
//! These tests run the full pipeline:
//! export JSON → dataset → classification → rates → d′ → aggregates.

use psyki_core::{
    AgreementDetail, AnalysisConfig, Choice, ClassificationCounts, Classifier, DecisionWeights,
    FixedAid, RatePair, SdtReport, SensitivityModel, StimulusPolicy, StoredGuess, SummaryTable,
    analyze_participant, dataset, slider_button_agreement, time_on_task,
};
use serde_json::json;

fn scenario_a() -> psyki_core::ParticipantDataset {
    dataset::from_value(json!({
        "p1": [
            {"index": 0, "color": 70, "sliderValue": 40, "buttonPressed": "blue",
             "timestamp": "2024-01-01T00:00:00Z"},
            {"index": 1, "color": 20, "sliderValue": -30, "buttonPressed": "orange",
             "timestamp": "2024-01-01T00:01:00Z"}
        ]
    }))
    .unwrap()
}

#[test]
fn hit_and_correct_rejection() {
    let data = scenario_a();
    let p = data.get("p1").unwrap();
    let counts =
        ClassificationCounts::tally(&p.trials, &Classifier::button(StimulusPolicy::PERCENT_SCALE));
    assert_eq!(counts.hits, 1);
    assert_eq!(counts.correct_rejections, 1);
    assert_eq!(counts.total(), 2);

    let rates = RatePair::from_counts(&counts);
    assert_eq!(rates.hit_rate, 1.0);
    assert_eq!(rates.false_alarm_rate, 0.0);

    // Slider agrees with the button on both trials.
    let report = SdtReport::compute(
        &p.trials,
        &AnalysisConfig::default().slider_report(),
        &SensitivityModel::default(),
    );
    assert_eq!(report.counts, counts);
}

#[test]
fn no_signal_trials_give_zero_hit_rate() {
    let data = dataset::from_value(json!({
        "p1": [
            {"color": 10, "sliderValue": -50, "buttonPressed": "orange"},
            {"color": 30, "sliderValue": 20, "buttonPressed": "blue"}
        ]
    }))
    .unwrap();
    let trials = &data.get("p1").unwrap().trials;
    let report = SdtReport::compute(
        trials,
        &AnalysisConfig::default().button_report(),
        &SensitivityModel::default(),
    );
    assert_eq!(report.counts.hits + report.counts.misses, 0);
    assert_eq!(report.rates.hit_rate, 0.0);
    assert_eq!(report.rates.false_alarm_rate, 0.5);
    assert!(report.d_primes.team_simple.is_finite());
}

#[test]
fn zero_sensitivity_falls_back_to_equal_weights() {
    let w = DecisionWeights::from_d_primes(0.0, 0.0);
    assert_eq!(w.a_human, 0.5);
    assert_eq!(w.a_aid, 0.5);

    // An aid with no reliability and a chance-level participant.
    let aid = FixedAid {
        stimulus: StimulusPolicy::PERCENT_SCALE,
        magnitude: 1.0,
        reliability: RatePair {
            hit_rate: 0.5,
            false_alarm_rate: 0.5,
        },
    };
    let data = dataset::from_value(json!({
        "p1": [
            {"color": 70, "sliderValue": 40, "buttonPressed": "blue"},
            {"color": 70, "sliderValue": 40, "buttonPressed": "orange"},
            {"color": 20, "sliderValue": 40, "buttonPressed": "blue"},
            {"color": 20, "sliderValue": 40, "buttonPressed": "orange"}
        ]
    }))
    .unwrap();
    let a = analyze_participant(
        &data.get("p1").unwrap().trials,
        &Classifier::button(StimulusPolicy::PERCENT_SCALE),
        &SensitivityModel::default(),
        &aid,
        Default::default(),
    );
    assert_eq!(a.summary.weights, DecisionWeights::EQUAL);
    assert!(a.trials.iter().all(|t| t.evidence.unwrap().z.is_finite()));
}

#[test]
fn slider_button_agreement_half() {
    let data = dataset::from_value(json!({
        "p1": [
            {"sliderValue": 10, "buttonPressed": "blue"},
            {"sliderValue": -5, "buttonPressed": "blue"}
        ]
    }))
    .unwrap();
    let report = slider_button_agreement(&data, 0.0, AgreementDetail::PerParticipant);
    assert_eq!(report.overall.matches, 1);
    assert_eq!(report.overall.mismatches, 1);
    assert_eq!(report.match_percentage, 50.0);
    assert_eq!(report.per_participant[0].label, "tN1");
    assert_eq!(format!("{:.2}", report.match_percentage), "50.00");
}

#[test]
fn time_on_task_ten_minutes() {
    let data = dataset::from_value(json!({
        "p1": [
            {"index": 0, "timestamp": "2024-01-01T10:00:00Z"},
            {"index": 199, "timestamp": "2024-01-01T10:10:00Z"}
        ],
        "p2": [
            {"index": 0, "timestamp": "2024-01-01T11:00:00Z"}
        ]
    }))
    .unwrap();
    let timing = time_on_task(&data, 0, 199);
    assert_eq!(timing.per_participant[0].elapsed_ms, Some(600_000));
    assert_eq!(timing.per_participant[1].elapsed_ms, None);
    assert_eq!(timing.measured, 1);
    assert_eq!(timing.mean_ms, 600_000.0);
    assert_eq!(timing.median_ms, 600_000.0);
}

#[test]
fn participant_directory_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let trials = json!([
        {"index": 0, "color": 80, "sliderValue": 60, "buttonPressed": "blue", "aiGuessValue": 1.4},
        {"index": 1, "color": 10, "sliderValue": -60, "buttonPressed": "orange", "aiGuessValue": -1.5},
        {"index": 2, "color": 90, "sliderValue": 20}
    ]);
    for code in ["B2", "A1"] {
        std::fs::write(
            dir.path().join(format!("participant_{code}.json")),
            trials.to_string(),
        )
        .unwrap();
    }
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let data = dataset::load(dir.path()).unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data.participants[0].id, "participant_A1.json");

    let config = AnalysisConfig::default();
    let table = SummaryTable::build(&data, &config);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].report.counts.total(), 2);

    let analysis = analyze_participant(
        &data.participants[0].trials,
        &config.button_classifier(),
        &config.sensitivity_model(),
        &StoredGuess::default(),
        config.combiner_settings(),
    );
    assert_eq!(analysis.summary.total, 2);
    assert_eq!(analysis.summary.accuracy, 100.0);
    let ev = analysis.trials[1].evidence.unwrap();
    assert_eq!(ev.decision, Choice::Orange);
    assert!(analysis.trials[2].evidence.is_none());
}

#[test]
fn malformed_export_is_rejected() {
    assert!(dataset::from_json_str("[1, 2, 3]").is_err());
    assert!(dataset::from_json_str(r#"{"p1": {"index": 0}}"#).is_err());
    let ok = dataset::from_json_str(r#"{"p1": [{"color": "n/a"}]}"#).unwrap();
    assert_eq!(ok.total_trials(), 1);
}
