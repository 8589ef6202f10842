use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{ConfigError, DeploymentConfig};
use crate::core::{CalculatorInputs, CalculatorSession, InputRanges, ProjectionResult};
use crate::leads::{ContactDetails, LeadError, LeadRecord, LeadSink, LoggingLeadSink};

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("{name} must be a finite amount >= 0")]
    InvalidAmount { name: &'static str },
    #[error("years must be one of {allowed:?}, got {years}")]
    UnsupportedYears { years: u32, allowed: Vec<u32> },
}

#[derive(Debug, Error, PartialEq)]
enum LeadSubmissionError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Lead(#[from] LeadError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "rentvsbuy",
    about = "Rent vs. buy wealth-gap calculator with catalog-scaled inputs"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Deployment config JSON; defaults to $RENTVSBUY_CONFIG or the built-in catalog"
    )]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print the rent and deposit slider ranges derived from the catalog
    Ranges,
    /// Print a projection; omitted inputs start at the range defaults
    Project {
        #[arg(long, help = "Current monthly rent")]
        rent: Option<f64>,
        #[arg(long, help = "Available deposit")]
        deposit: Option<f64>,
        #[arg(long, help = "Horizon in years, one of the deployment's allowed horizons")]
        years: Option<u32>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    rent: Option<f64>,
    deposit: Option<f64>,
    years: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LeadPayload {
    #[serde(flatten)]
    contact: ContactDetails,
    #[serde(flatten)]
    inputs: ProjectPayload,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputsResponse {
    rent: f64,
    deposit: f64,
    years: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    inputs: InputsResponse,
    ranges: InputRanges,
    result: ProjectionResult,
    monthly_difference: f64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

struct AppState {
    config: DeploymentConfig,
    session: CalculatorSession,
    sink: Arc<dyn LeadSink>,
}

impl AppState {
    fn new(config: DeploymentConfig, sink: Arc<dyn LeadSink>) -> Self {
        let session = config.session();
        Self {
            config,
            session,
            sink,
        }
    }
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    let config = DeploymentConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Serve { port } => run_http_server(config, port).await?,
        Command::Ranges => {
            let session = config.session();
            print_json(session.ranges())?;
        }
        Command::Project {
            rent,
            deposit,
            years,
        } => {
            let session = config.session();
            let payload = ProjectPayload {
                rent,
                deposit,
                years,
            };
            let inputs = resolve_inputs(&config, &session, &payload)?;
            print_json(&build_project_response(&session, inputs))?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run_http_server(config: DeploymentConfig, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let state = Arc::new(AppState::new(config, Arc::new(LoggingLeadSink)));
    let ranges = *state.session.ranges();
    info!(
        developer = %state.config.developer_name,
        listings = state.session.catalog().len(),
        rent_min = ranges.rent.min,
        rent_max = ranges.rent.max,
        deposit_min = ranges.deposit.min,
        deposit_max = ranges.deposit.max,
        "calculator session ready"
    );

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "rent vs. buy API listening");
    info!("local access: http://127.0.0.1:{port}/api/health");

    axum::serve(listener, router(state)).await
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/config", get(config_handler))
        .route("/api/ranges", get(ranges_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/leads", post(lead_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn config_handler(State(state): State<Arc<AppState>>) -> Response {
    json_response(StatusCode::OK, &state.config)
}

async fn ranges_handler(State(state): State<Arc<AppState>>) -> Response {
    json_response(StatusCode::OK, state.session.ranges())
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(
    State(state): State<Arc<AppState>>,
    Query(payload): Query<ProjectPayload>,
) -> Response {
    project_handler_impl(&state, &payload)
}

async fn project_post_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProjectPayload>,
) -> Response {
    project_handler_impl(&state, &payload)
}

fn project_handler_impl(state: &AppState, payload: &ProjectPayload) -> Response {
    match resolve_inputs(&state.config, &state.session, payload) {
        Ok(inputs) => json_response(
            StatusCode::OK,
            build_project_response(&state.session, inputs),
        ),
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

async fn lead_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LeadPayload>,
) -> Response {
    lead_handler_impl(&state, payload)
}

fn lead_handler_impl(state: &AppState, payload: LeadPayload) -> Response {
    match capture_lead(state, payload) {
        Ok(lead) => {
            state.sink.accept(&lead);
            json_response(StatusCode::CREATED, lead)
        }
        Err(err) => {
            warn!(error = %err, "rejected lead submission");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

fn capture_lead(
    state: &AppState,
    payload: LeadPayload,
) -> Result<LeadRecord, LeadSubmissionError> {
    let inputs = resolve_inputs(&state.config, &state.session, &payload.inputs)?;
    let projection = state.session.project(&inputs);
    Ok(LeadRecord::build(payload.contact, &inputs, &projection)?)
}

fn resolve_inputs(
    config: &DeploymentConfig,
    session: &CalculatorSession,
    payload: &ProjectPayload,
) -> Result<CalculatorInputs, InputError> {
    let years = payload.years.unwrap_or(config.default_years);
    if !config.allowed_years.contains(&years) {
        return Err(InputError::UnsupportedYears {
            years,
            allowed: config.allowed_years.clone(),
        });
    }

    let mut inputs = session.default_inputs(years);
    if let Some(rent) = payload.rent {
        inputs.rent = rent;
    }
    if let Some(deposit) = payload.deposit {
        inputs.deposit = deposit;
    }

    for (name, value) in [("rent", inputs.rent), ("deposit", inputs.deposit)] {
        if !value.is_finite() || value < 0.0 {
            return Err(InputError::InvalidAmount { name });
        }
    }
    Ok(inputs)
}

fn build_project_response(session: &CalculatorSession, inputs: CalculatorInputs) -> ProjectResponse {
    let result = session.project(&inputs);
    ProjectResponse {
        inputs: InputsResponse {
            rent: inputs.rent,
            deposit: inputs.deposit,
            years: inputs.years,
        },
        ranges: *session.ranges(),
        monthly_difference: result.monthly_difference(inputs.rent),
        result,
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::sync::Mutex;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[derive(Default)]
    struct CollectingSink(Mutex<Vec<LeadRecord>>);

    impl LeadSink for CollectingSink {
        fn accept(&self, lead: &LeadRecord) {
            self.0.lock().expect("sink lock").push(lead.clone());
        }
    }

    fn sample_state(sink: Arc<dyn LeadSink>) -> AppState {
        AppState::new(DeploymentConfig::default(), sink)
    }

    fn payload_from_json(json: &str) -> ProjectPayload {
        serde_json::from_str(json).expect("valid payload")
    }

    #[test]
    fn resolve_inputs_defaults_to_range_defaults_and_ten_years() {
        let state = sample_state(Arc::new(LoggingLeadSink));
        let inputs =
            resolve_inputs(&state.config, &state.session, &ProjectPayload::default()).expect("ok");
        let ranges = state.session.ranges();
        assert_approx(inputs.rent, ranges.rent.default);
        assert_approx(inputs.deposit, ranges.deposit.default);
        assert_eq!(inputs.years, 10);
    }

    #[test]
    fn resolve_inputs_parses_camel_case_payload() {
        let state = sample_state(Arc::new(LoggingLeadSink));
        let payload = payload_from_json(r#"{"rent": 15000, "deposit": 900000, "years": 5}"#);
        let inputs = resolve_inputs(&state.config, &state.session, &payload).expect("ok");
        assert_approx(inputs.rent, 15_000.0);
        assert_approx(inputs.deposit, 900_000.0);
        assert_eq!(inputs.years, 5);
    }

    #[test]
    fn resolve_inputs_rejects_unsupported_years() {
        let state = sample_state(Arc::new(LoggingLeadSink));
        let payload = payload_from_json(r#"{"years": 7}"#);
        let err = resolve_inputs(&state.config, &state.session, &payload).expect_err("reject");
        assert_eq!(
            err,
            InputError::UnsupportedYears {
                years: 7,
                allowed: vec![5, 10]
            }
        );
    }

    #[test]
    fn resolve_inputs_rejects_negative_amounts() {
        let state = sample_state(Arc::new(LoggingLeadSink));
        let payload = payload_from_json(r#"{"deposit": -1}"#);
        let err = resolve_inputs(&state.config, &state.session, &payload).expect_err("reject");
        assert_eq!(err, InputError::InvalidAmount { name: "deposit" });
    }

    #[test]
    fn project_response_serialization_contains_expected_fields() {
        let state = sample_state(Arc::new(LoggingLeadSink));
        let inputs =
            resolve_inputs(&state.config, &state.session, &ProjectPayload::default()).expect("ok");
        let response = build_project_response(&state.session, inputs);
        let json = serde_json::to_value(&response).expect("serialize");

        for key in ["inputs", "ranges", "result", "monthlyDifference"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        let result = &json["result"];
        for key in [
            "totalRentPaid",
            "equityGain",
            "wealthGap",
            "matchedProperty",
            "monthlyOwnershipCost",
        ] {
            assert!(result.get(key).is_some(), "missing result.{key}");
        }
        assert!(json["ranges"]["rent"].get("default").is_some());
        assert_approx(
            response.monthly_difference,
            response.result.monthly_ownership_cost - response.inputs.rent,
        );
    }

    #[test]
    fn project_handler_maps_invalid_input_to_bad_request() {
        let state = sample_state(Arc::new(LoggingLeadSink));
        let response = project_handler_impl(&state, &payload_from_json(r#"{"years": 3}"#));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = project_handler_impl(&state, &ProjectPayload::default());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
    }

    #[test]
    fn lead_handler_builds_record_from_server_side_projection() {
        let sink = Arc::new(CollectingSink::default());
        let state = sample_state(sink.clone());
        let payload: LeadPayload = serde_json::from_str(
            r#"{"name": "Ahmed", "email": "ahmed@example.com", "rent": 40000, "deposit": 5000000, "years": 5}"#,
        )
        .expect("valid payload");

        let response = lead_handler_impl(&state, payload);
        assert_eq!(response.status(), StatusCode::CREATED);

        let captured = sink.0.lock().expect("sink lock");
        assert_eq!(captured.len(), 1);
        let lead = &captured[0];
        let expected = state.session.project(&CalculatorInputs {
            rent: 40_000.0,
            deposit: 5_000_000.0,
            years: 5,
        });
        assert_eq!(lead.property_id, expected.matched_property.id);
        assert_eq!(lead.wealth_gap, expected.wealth_gap.round() as i64);
        assert_eq!(lead.current_rent, 40_000);
        assert_eq!(lead.years_selected, 5);
        assert_eq!(lead.phone, None);
    }

    #[test]
    fn lead_handler_rejects_invalid_contact_without_reaching_sink() {
        let sink = Arc::new(CollectingSink::default());
        let state = sample_state(sink.clone());
        let payload: LeadPayload =
            serde_json::from_str(r#"{"name": "Ahmed", "email": "not-an-email"}"#)
                .expect("valid payload");

        let response = lead_handler_impl(&state, payload);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(sink.0.lock().expect("sink lock").is_empty());
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        serde_json::from_slice(&bytes).expect("JSON body")
    }

    fn assert_no_store(response: &Response) {
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
    }

    #[tokio::test]
    async fn not_found_handler_returns_json_error() {
        let response = not_found_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_no_store(&response);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Not found");
    }

    #[tokio::test]
    async fn config_handler_returns_deployment() {
        let state = Arc::new(sample_state(Arc::new(LoggingLeadSink)));
        let response = config_handler(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_no_store(&response);

        let json = body_json(response).await;
        assert_eq!(json["developerName"], state.config.developer_name.as_str());
        assert_eq!(
            json["catalog"].as_array().map(Vec::len),
            Some(state.config.catalog.len())
        );
        assert_eq!(json["allowedYears"], serde_json::json!([5, 10]));
        assert_eq!(json["assumptions"]["mortgageTermYears"], 25);
    }

    #[tokio::test]
    async fn ranges_handler_returns_cached_ranges() {
        let state = Arc::new(sample_state(Arc::new(LoggingLeadSink)));
        let response = ranges_handler(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_no_store(&response);

        let json = body_json(response).await;
        let ranges = state.session.ranges();
        assert_eq!(json["rent"]["min"].as_f64(), Some(ranges.rent.min));
        assert_eq!(json["rent"]["max"].as_f64(), Some(ranges.rent.max));
        assert_eq!(json["deposit"]["step"].as_f64(), Some(ranges.deposit.step));
        assert_eq!(json["deposit"]["default"].as_f64(), Some(ranges.deposit.default));
    }

    #[test]
    fn capture_lead_keeps_error_kinds_typed() {
        let state = sample_state(Arc::new(LoggingLeadSink));
        let bad_years: LeadPayload =
            serde_json::from_str(r#"{"name": "Sara", "email": "sara@example.com", "years": 7}"#)
                .expect("valid payload");
        assert!(matches!(
            capture_lead(&state, bad_years),
            Err(LeadSubmissionError::Input(InputError::UnsupportedYears { years: 7, .. }))
        ));

        let no_name: LeadPayload =
            serde_json::from_str(r#"{"email": "sara@example.com"}"#).expect("valid payload");
        assert_eq!(
            capture_lead(&state, no_name),
            Err(LeadSubmissionError::Lead(LeadError::MissingName))
        );
    }

    #[test]
    fn cli_parses_project_subcommand() {
        let cli = Cli::try_parse_from([
            "rentvsbuy", "project", "--rent", "12000", "--years", "5",
        ])
        .expect("valid args");
        match cli.command {
            Command::Project {
                rent,
                deposit,
                years,
            } => {
                assert_eq!(rent, Some(12_000.0));
                assert_eq!(deposit, None);
                assert_eq!(years, Some(5));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(cli.config.is_none());
    }

    #[test]
    fn cli_serve_defaults_port() {
        let cli = Cli::try_parse_from(["rentvsbuy", "serve", "--config", "deploy.json"])
            .expect("valid args");
        assert!(matches!(cli.command, Command::Serve { port: 8080 }));
        assert_eq!(cli.config, Some(PathBuf::from("deploy.json")));
    }
}
