//! Read-only HTTP server for psyki reports.
//!
//! Loads a participant dataset once at startup and serves the signal detection
//! reports as JSON. Nothing is written back; every request recomputes from the
//! shared dataset.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};

use psyki_core::trial::participant_label;
use psyki_core::{
    AgreementDetail, AnalysisConfig, DPrimeDistributions, ParticipantDataset, ReferenceComparison,
    SdtReport, SummaryTable, ai_slider_agreement, ai_slider_differences, aid_by_name,
    analyze_participant, field_statistic_all, field_statistic_at_index, mean_team_simple,
    median_team_simple, rolling_feedback, slider_button_agreement, stratified_accuracy,
    time_on_task,
};

/// Shared server state.
struct AppState {
    dataset: ParticipantDataset,
    config: AnalysisConfig,
}

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

#[derive(Deserialize, Default)]
struct AgreementParams {
    /// overall (default), participant, trial
    detail: Option<String>,
    threshold: Option<f64>,
    boundary: Option<f64>,
}

#[derive(Deserialize, Default)]
struct ParticipantParams {
    /// stored (default), simulated, fixed
    aid: Option<String>,
    seed: Option<u64>,
    /// Include per-trial evidence.
    trials: Option<bool>,
}

#[derive(Deserialize, Default)]
struct TimingParams {
    start: Option<u32>,
    end: Option<u32>,
}

#[derive(Deserialize, Default)]
struct FieldParams {
    name: Option<String>,
    index: Option<u32>,
    /// Use every trial instead of one index.
    all: Option<bool>,
}

fn parse_detail(raw: Option<&str>) -> Result<AgreementDetail, (StatusCode, Json<Value>)> {
    match raw.unwrap_or("overall") {
        "overall" => Ok(AgreementDetail::Overall),
        "participant" | "per-participant" => Ok(AgreementDetail::PerParticipant),
        "trial" | "per-trial" => Ok(AgreementDetail::PerTrial),
        other => Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("Unknown detail level: {other}. Use overall, participant or trial."),
        )),
    }
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "name": "psyki analysis server",
        "version": psyki_core::VERSION,
        "participants": state.dataset.len(),
        "endpoints": {
            "/": "This API index",
            "/health": "Health check",
            "/participants": "Participants in dataset order with their tN labels",
            "/api/v1/summary": "Summary table, d′ distributions and reference comparison",
            "/api/v1/participants/{id}": {
                "method": "GET",
                "description": "Optimal-weighting analysis and SDT reports for one participant",
                "params": {
                    "aid": "Evidence source: stored (default), simulated, fixed",
                    "seed": "Seed for the simulated aid (default: 0)",
                    "trials": "Include per-trial evidence (default: false)",
                }
            },
            "/api/v1/agreement": {
                "method": "GET",
                "description": "Slider side vs button choice",
                "params": {
                    "detail": "overall (default), participant, trial",
                    "threshold": "Slider threshold (default from config)",
                }
            },
            "/api/v1/accuracy": "Button and slider accuracy split by phase",
            "/api/v1/ai-agreement": {
                "method": "GET",
                "description": "Slider side vs aid guess side, plus raw differences",
                "params": {
                    "detail": "overall (default), participant, trial",
                    "threshold": "Slider threshold (default from config)",
                    "boundary": "Aid decision boundary (default from config)",
                }
            },
            "/api/v1/timing": {
                "method": "GET",
                "description": "Time on task between two trial indices",
                "params": { "start": "First index (default: 0)", "end": "Last index (default: 199)" }
            },
            "/api/v1/field": {
                "method": "GET",
                "description": "Mean and median of a numeric trial field",
                "params": {
                    "name": "Field name (required), e.g. dPrimeTeam",
                    "index": "Trial index (default: final index)",
                    "all": "Use every trial instead of one index",
                }
            },
        },
        "examples": {
            "summary": "/api/v1/summary",
            "agreement": "/api/v1/agreement?detail=participant",
            "field": "/api/v1/field?name=dPrimeTeam&index=199",
        }
    }))
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": if state.dataset.is_empty() { "empty" } else { "ok" },
        "participants": state.dataset.len(),
        "trials": state.dataset.total_trials(),
    }))
}

async fn handle_participants(State(state): State<Arc<AppState>>) -> Json<Value> {
    let participants: Vec<Value> = state
        .dataset
        .iter()
        .enumerate()
        .map(|(i, p)| {
            json!({
                "id": p.id,
                "label": participant_label(i),
                "trials": p.trials.len(),
            })
        })
        .collect();
    let total = participants.len();
    Json(json!({ "participants": participants, "total": total }))
}

async fn handle_summary(State(state): State<Arc<AppState>>) -> Json<Value> {
    log::debug!("summary over {} participants", state.dataset.len());
    let (ds, cfg) = (&state.dataset, &state.config);
    Json(json!({
        "table": SummaryTable::build(ds, cfg),
        "distributions": DPrimeDistributions::build(ds, cfg),
        "teamSimple": {
            "mean": mean_team_simple(ds, cfg),
            "median": median_team_simple(ds, cfg),
        },
        "reference": ReferenceComparison::build(ds, cfg),
    }))
}

async fn handle_participant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ParticipantParams>,
) -> ApiResult {
    let cfg = &state.config;
    let Some(participant) = state.dataset.get(&id) else {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Unknown participant: {id}. Use /participants to list them."),
        ));
    };
    let aid_name = params.aid.as_deref().unwrap_or("stored");
    let Some(aid) = aid_by_name(aid_name, params.seed.unwrap_or(0), cfg.simulation_params())
    else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("Unknown aid: {aid_name}. Use stored, simulated or fixed."),
        ));
    };
    log::debug!("participant {id} with {} aid", aid.name());

    let trials = &participant.trials;
    let model = cfg.sensitivity_model();
    let analysis = analyze_participant(
        trials,
        &cfg.button_classifier(),
        &model,
        aid.as_ref(),
        cfg.combiner_settings(),
    );
    let (agree, compared) = analysis.team_agreement();
    let feedback = trials.len().checked_sub(1).and_then(|last| {
        rolling_feedback(trials, last, cfg.feedback_window, cfg.feedback_scale)
    });

    let mut body = json!({
        "id": participant.id,
        "aid": aid.name(),
        "summary": analysis.summary,
        "teamAgreement": { "agree": agree, "compared": compared },
        "buttonReport": SdtReport::compute(trials, &cfg.button_report(), &model),
        "sliderReport": SdtReport::compute(trials, &cfg.slider_report(), &model),
        "feedback": feedback,
    });
    if params.trials.unwrap_or(false) {
        body["trials"] = json!(analysis.trials);
    }
    Ok(Json(body))
}

async fn handle_agreement(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AgreementParams>,
) -> ApiResult {
    let detail = parse_detail(params.detail.as_deref())?;
    let threshold = params.threshold.unwrap_or(state.config.slider_threshold);
    Ok(Json(json!(slider_button_agreement(
        &state.dataset,
        threshold,
        detail
    ))))
}

async fn handle_accuracy(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AgreementParams>,
) -> Json<Value> {
    let threshold = params.threshold.unwrap_or(state.config.slider_threshold);
    let rows = stratified_accuracy(&state.dataset, state.config.stimulus, threshold);
    Json(json!({ "participants": rows }))
}

async fn handle_ai_agreement(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AgreementParams>,
) -> ApiResult {
    let detail = parse_detail(params.detail.as_deref())?;
    let threshold = params.threshold.unwrap_or(state.config.slider_threshold);
    let boundary = params.boundary.unwrap_or(state.config.boundary);
    let mut differences = json!(ai_slider_differences(&state.dataset));
    if detail == AgreementDetail::Overall {
        if let Some(obj) = differences.as_object_mut() {
            obj.remove("perParticipant");
        }
    }
    Ok(Json(json!({
        "agreement": ai_slider_agreement(&state.dataset, threshold, boundary, detail),
        "differences": differences,
    })))
}

async fn handle_timing(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimingParams>,
) -> Json<Value> {
    let start = params.start.unwrap_or(state.config.first_index);
    let end = params.end.unwrap_or(state.config.final_index);
    Json(json!(time_on_task(&state.dataset, start, end)))
}

async fn handle_field(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FieldParams>,
) -> ApiResult {
    let Some(name) = params.name.as_deref().filter(|n| !n.is_empty()) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Missing field name. Example: /api/v1/field?name=dPrimeTeam&index=199",
        ));
    };
    let stat = if params.all.unwrap_or(false) {
        field_statistic_all(&state.dataset, name)
    } else {
        let index = params.index.unwrap_or(state.config.final_index);
        field_statistic_at_index(&state.dataset, name, index)
    };
    Ok(Json(json!(stat)))
}

/// Build the axum router.
fn build_router(dataset: ParticipantDataset, config: AnalysisConfig) -> Router {
    let state = Arc::new(AppState { dataset, config });

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/participants", get(handle_participants))
        .route("/api/v1/summary", get(handle_summary))
        .route("/api/v1/participants/{id}", get(handle_participant))
        .route("/api/v1/agreement", get(handle_agreement))
        .route("/api/v1/accuracy", get(handle_accuracy))
        .route("/api/v1/ai-agreement", get(handle_ai_agreement))
        .route("/api/v1/timing", get(handle_timing))
        .route("/api/v1/field", get(handle_field))
        .with_state(state)
}

/// Run the HTTP analysis server until the listener fails.
pub async fn run_server(
    dataset: ParticipantDataset,
    config: AnalysisConfig,
    host: &str,
    port: u16,
) -> std::io::Result<()> {
    log::info!(
        "serving {} participants ({} trials) on {host}:{port}",
        dataset.len(),
        dataset.total_trials()
    );
    let app = build_router(dataset, config);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use psyki_core::dataset;

    fn state() -> Arc<AppState> {
        let dataset = dataset::from_value(json!({
            "participant_A.json": [
                {"index": 0, "color": 80, "sliderValue": 60, "buttonPressed": "blue",
                 "aiGuessValue": 1.4, "timestamp": "2024-01-01T00:00:00Z"},
                {"index": 199, "color": 10, "sliderValue": -60, "buttonPressed": "orange",
                 "aiGuessValue": -1.5, "timestamp": "2024-01-01T00:10:00Z", "dPrimeTeam": 4.0}
            ],
            "participant_B.json": [
                {"index": 0, "color": 80, "sliderValue": -5, "buttonPressed": "blue"}
            ]
        }))
        .unwrap();
        Arc::new(AppState {
            dataset,
            config: AnalysisConfig::default(),
        })
    }

    #[tokio::test]
    async fn health_counts_dataset() {
        let Json(body) = handle_health(State(state())).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["participants"], 2);
        assert_eq!(body["trials"], 3);
    }

    #[tokio::test]
    async fn participants_are_labelled() {
        let Json(body) = handle_participants(State(state())).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["participants"][1]["label"], "tN2");
    }

    #[tokio::test]
    async fn unknown_participant_is_404() {
        let err = handle_participant(
            State(state()),
            Path("nobody".to_string()),
            Query(ParticipantParams::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn participant_report_uses_camel_case() {
        let Json(body) = handle_participant(
            State(state()),
            Path("participant_A.json".to_string()),
            Query(ParticipantParams {
                trials: Some(true),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(body["summary"]["counts"]["hits"], 1);
        assert_eq!(body["summary"]["counts"]["correctRejections"], 1);
        assert!(body["buttonReport"]["dPrimes"]["teamSimple"].is_number());
        assert_eq!(body["trials"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn agreement_rejects_unknown_detail() {
        let err = handle_agreement(
            State(state()),
            Query(AgreementParams {
                detail: Some("everything".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn agreement_per_participant() {
        let Json(body) = handle_agreement(
            State(state()),
            Query(AgreementParams {
                detail: Some("participant".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(body["overall"]["comparisons"], 3);
        assert_eq!(body["perParticipant"][1]["matchPercentage"], 0.0);
    }

    #[tokio::test]
    async fn timing_defaults_to_configured_indices() {
        let Json(body) = handle_timing(State(state()), Query(TimingParams::default())).await;
        assert_eq!(body["perParticipant"][0]["elapsedMs"], 600_000);
        assert!(body["perParticipant"][1]["elapsedMs"].is_null());
        assert_eq!(body["measured"], 1);
    }

    #[tokio::test]
    async fn field_requires_name() {
        let err = handle_field(State(state()), Query(FieldParams::default()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);

        let Json(body) = handle_field(
            State(state()),
            Query(FieldParams {
                name: Some("dPrimeTeam".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(body["count"], 1);
        assert_eq!(body["median"], 4.0);
    }

    #[test]
    fn router_builds() {
        let _ = build_router(ParticipantDataset::default(), AnalysisConfig::default());
    }
}
