mod cli;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::info;

pub use cli::{Cli, Command, ServeArgs};

use crate::core::{
    AllocationOutcome, FinalReport, GameError, GameState, GameStore, IterationSummary,
    LocationCosts, RoundView, Stage,
};
use crate::services::{AdviceRequest, Collaborators};

const FALLBACK_COSTS_NOTICE: &str = "We couldn't estimate costs for this location, so typical \
defaults were filled in. Adjust them if needed.";

#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<GameStore>>,
    services: Collaborators,
}

impl AppState {
    pub fn new(services: Collaborators) -> Self {
        Self {
            store: Arc::new(Mutex::new(GameStore::new())),
            services,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SalaryPayload {
    gross_monthly_salary: f64,
}

#[derive(Debug, Deserialize)]
struct LocationPayload {
    location: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CostsPayload {
    housing_cost: f64,
    utility_cost: f64,
    tax_rate: f64,
}

impl From<CostsPayload> for LocationCosts {
    fn from(value: CostsPayload) -> Self {
        LocationCosts {
            housing_cost: value.housing_cost,
            utility_cost: value.utility_cost,
            tax_rate: value.tax_rate,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AllocatePayload {
    amount: f64,
}

#[derive(Debug, Serialize)]
struct SnapshotResponse {
    state: GameState,
    round: Option<RoundView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LocationResponse {
    used_fallback: bool,
    notice: Option<&'static str>,
    #[serde(flatten)]
    snapshot: SnapshotResponse,
}

#[derive(Debug, Serialize)]
struct AllocateResponse {
    outcome: AllocationOutcome,
    #[serde(flatten)]
    snapshot: SnapshotResponse,
}

#[derive(Debug, Serialize)]
struct SettleResponse {
    summary: IterationSummary,
    #[serde(flatten)]
    snapshot: SnapshotResponse,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct HttpApiError {
    status: StatusCode,
    message: String,
}

impl From<GameError> for HttpApiError {
    fn from(value: GameError) -> Self {
        let status = if value.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::CONFLICT
        };
        Self {
            status,
            message: value.to_string(),
        }
    }
}

impl IntoResponse for HttpApiError {
    fn into_response(self) -> Response {
        error_response(self.status, &self.message)
    }
}

pub fn router(app: AppState) -> Router {
    Router::new()
        .route("/api/state", get(state_handler))
        .route("/api/salary", post(salary_handler))
        .route("/api/location", post(location_handler))
        .route("/api/costs", post(costs_handler))
        .route("/api/confirm", post(confirm_handler))
        .route("/api/allocate", post(allocate_handler))
        .route("/api/settle", post(settle_handler))
        .route("/api/report", get(report_handler))
        .route("/api/reset", post(reset_handler))
        .fallback(not_found_handler)
        .with_state(app)
}

pub async fn run_http_server(port: u16, services: Collaborators) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let config = services.config();
    info!(
        cost_estimate_url = config.cost_estimate_url.as_deref().unwrap_or("<fallback>"),
        advice_url = config.advice_url.as_deref().unwrap_or("<fallback>"),
        timeout = ?config.timeout,
        "collaborators configured"
    );
    let app = router(AppState::new(services));

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "budget simulator API listening");
    info!("Local access: http://127.0.0.1:{port}/api/state");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn state_handler(State(app): State<AppState>) -> Response {
    let store = app.store.lock().await;
    json_response(StatusCode::OK, snapshot(&store))
}

async fn salary_handler(
    State(app): State<AppState>,
    Json(payload): Json<SalaryPayload>,
) -> Result<Response, HttpApiError> {
    let mut store = app.store.lock().await;
    store.submit_salary(payload.gross_monthly_salary)?;
    Ok(json_response(StatusCode::OK, snapshot(&store)))
}

async fn location_handler(
    State(app): State<AppState>,
    Json(payload): Json<LocationPayload>,
) -> Result<Response, HttpApiError> {
    let location = payload.location.trim().to_string();
    {
        let store = app.store.lock().await;
        store.require_stage(Stage::Location)?;
    }
    if location.is_empty() {
        return Err(GameError::EmptyLocation.into());
    }

    // The lock is not held across the collaborator call.
    let estimate = app.services.location_costs(&location).await;

    let mut store = app.store.lock().await;
    store.set_location(&location, estimate.value)?;
    Ok(json_response(
        StatusCode::OK,
        LocationResponse {
            used_fallback: estimate.used_fallback,
            notice: estimate.used_fallback.then_some(FALLBACK_COSTS_NOTICE),
            snapshot: snapshot(&store),
        },
    ))
}

async fn costs_handler(
    State(app): State<AppState>,
    Json(payload): Json<CostsPayload>,
) -> Result<Response, HttpApiError> {
    let mut store = app.store.lock().await;
    store.edit_costs(payload.into())?;
    Ok(json_response(StatusCode::OK, snapshot(&store)))
}

async fn confirm_handler(State(app): State<AppState>) -> Result<Response, HttpApiError> {
    let mut store = app.store.lock().await;
    store.confirm_location()?;
    Ok(json_response(StatusCode::OK, snapshot(&store)))
}

async fn allocate_handler(
    State(app): State<AppState>,
    Json(payload): Json<AllocatePayload>,
) -> Result<Response, HttpApiError> {
    let (outcome, closed_round) = {
        let mut store = app.store.lock().await;
        let outcome = store.allocate(payload.amount)?;
        let closed_round = outcome.round_complete.then(|| store.state().clone());
        (outcome, closed_round)
    };

    if let Some(state) = closed_round {
        attach_advice(&app, &state).await;
    }

    let store = app.store.lock().await;
    Ok(json_response(
        StatusCode::OK,
        AllocateResponse {
            outcome,
            snapshot: snapshot(&store),
        },
    ))
}

async fn settle_handler(State(app): State<AppState>) -> Result<Response, HttpApiError> {
    let (summary, finished) = {
        let mut store = app.store.lock().await;
        let summary = store.settle()?;
        let finished = (store.stage() == Stage::GameOver).then(|| store.state().clone());
        (summary, finished)
    };

    if let Some(state) = finished {
        attach_advice(&app, &state).await;
    }

    let store = app.store.lock().await;
    Ok(json_response(
        StatusCode::OK,
        SettleResponse {
            summary,
            snapshot: snapshot(&store),
        },
    ))
}

async fn report_handler(State(app): State<AppState>) -> Result<Response, HttpApiError> {
    let store = app.store.lock().await;
    let report: FinalReport = store.final_report()?;
    Ok(json_response(StatusCode::OK, report))
}

async fn reset_handler(State(app): State<AppState>) -> Response {
    let mut store = app.store.lock().await;
    store.reset();
    json_response(StatusCode::OK, snapshot(&store))
}

/// Fetches advice for `state` and stores it, unless the game moved on while
/// the request was in flight.
async fn attach_advice(app: &AppState, state: &GameState) {
    let advice = app.services.advice(&AdviceRequest::from_state(state)).await;

    let mut store = app.store.lock().await;
    let current = store.state();
    if current.stage == state.stage && current.iteration == state.iteration {
        store.set_advice(advice.value);
    }
}

fn snapshot(store: &GameStore) -> SnapshotResponse {
    SnapshotResponse {
        state: store.state().clone(),
        round: store.round_view(),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
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
    use crate::core::CATEGORY_COUNT;
    use crate::services::{FALLBACK_ADVICE, FALLBACK_LOCATION_COSTS};
    use serde_json::Value;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn test_app() -> AppState {
        AppState::new(Collaborators::offline().expect("client"))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    async fn expect_ok(response: Result<Response, HttpApiError>) -> Value {
        let response = response.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
        body_json(response).await
    }

    async fn start_game(app: &AppState) {
        expect_ok(
            salary_handler(
                State(app.clone()),
                Json(SalaryPayload {
                    gross_monthly_salary: 5000.0,
                }),
            )
            .await,
        )
        .await;
        expect_ok(
            location_handler(
                State(app.clone()),
                Json(LocationPayload {
                    location: "Austin".to_string(),
                }),
            )
            .await,
        )
        .await;
        expect_ok(confirm_handler(State(app.clone())).await).await;
    }

    #[test]
    fn payloads_parse_camel_case_keys() {
        let salary: SalaryPayload =
            serde_json::from_str(r#"{"grossMonthlySalary": 5200.5}"#).expect("salary");
        assert_approx(salary.gross_monthly_salary, 5200.5);

        let costs: CostsPayload =
            serde_json::from_str(r#"{"housingCost": 900, "utilityCost": 150, "taxRate": 22}"#)
                .expect("costs");
        let costs = LocationCosts::from(costs);
        assert_approx(costs.housing_cost, 900.0);
        assert_approx(costs.tax_rate, 22.0);

        assert!(serde_json::from_str::<CostsPayload>(r#"{"housingCost": 900}"#).is_err());
    }

    #[tokio::test]
    async fn location_uses_fallback_costs_offline() {
        let app = test_app();
        expect_ok(
            salary_handler(
                State(app.clone()),
                Json(SalaryPayload {
                    gross_monthly_salary: 5000.0,
                }),
            )
            .await,
        )
        .await;

        let body = expect_ok(
            location_handler(
                State(app.clone()),
                Json(LocationPayload {
                    location: "  Austin ".to_string(),
                }),
            )
            .await,
        )
        .await;
        assert_eq!(body["usedFallback"], true);
        assert!(body["notice"].is_string());
        assert_eq!(body["state"]["location"], "Austin");
        assert_eq!(body["state"]["stage"], "location");
        assert_approx(
            body["state"]["housingCost"].as_f64().expect("housing"),
            FALLBACK_LOCATION_COSTS.housing_cost,
        );
    }

    #[tokio::test]
    async fn validation_and_stage_errors_map_to_status_codes() {
        let app = test_app();
        let response = salary_handler(
            State(app.clone()),
            Json(SalaryPayload {
                gross_monthly_salary: -10.0,
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().expect("message").contains("salary"));

        let response = settle_handler(State(app.clone())).await.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = report_handler(State(app.clone())).await.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = not_found_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_location_is_rejected_before_estimating() {
        let app = test_app();
        start_game(&app).await;
        let response = location_handler(
            State(app.clone()),
            Json(LocationPayload {
                location: "Paris".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let app = test_app();
        app.store
            .lock()
            .await
            .submit_salary(3000.0)
            .expect("salary");
        let response = location_handler(
            State(app.clone()),
            Json(LocationPayload {
                location: " ".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn full_round_reaches_summary_with_advice_then_settles() {
        let app = test_app();
        start_game(&app).await;

        let body = body_json(state_handler(State(app.clone())).await).await;
        assert_eq!(body["state"]["stage"], "budget_allocation");
        assert_eq!(body["round"]["category"], "groceries");
        assert_eq!(body["round"]["mode"]["mode"], "normal");
        assert_approx(
            body["round"]["discretionaryIncome"].as_f64().expect("income"),
            1175.0,
        );

        let body = expect_ok(
            allocate_handler(State(app.clone()), Json(AllocatePayload { amount: 1175.0 })).await,
        )
        .await;
        assert_eq!(body["round"]["mode"]["mode"], "debt");
        assert_approx(
            body["round"]["capacity"].as_f64().expect("capacity"),
            937.5,
        );

        let mut last = Value::Null;
        for _ in 1..CATEGORY_COUNT {
            last = expect_ok(
                allocate_handler(State(app.clone()), Json(AllocatePayload { amount: 0.0 }))
                    .await,
            )
            .await;
        }
        assert_eq!(last["outcome"]["roundComplete"], true);
        assert_eq!(last["state"]["stage"], "summary");
        assert_eq!(last["state"]["advice"], FALLBACK_ADVICE);
        assert!(last["round"].is_null());

        let body = expect_ok(settle_handler(State(app.clone())).await).await;
        assert_eq!(body["summary"]["iteration"], 1);
        assert_eq!(body["state"]["iteration"], 2);
        assert_eq!(body["state"]["stage"], "budget_allocation");
        assert!(body["state"]["advice"].is_null());
    }

    #[tokio::test]
    async fn report_is_available_after_the_last_round() {
        let app = test_app();
        start_game(&app).await;
        for _ in 0..12 {
            for _ in 0..CATEGORY_COUNT {
                expect_ok(
                    allocate_handler(State(app.clone()), Json(AllocatePayload { amount: 20.0 }))
                        .await,
                )
                .await;
            }
            expect_ok(settle_handler(State(app.clone())).await).await;
        }

        let body = body_json(state_handler(State(app.clone())).await).await;
        assert_eq!(body["state"]["stage"], "game_over");
        assert_eq!(body["state"]["advice"], FALLBACK_ADVICE);

        let report = expect_ok(report_handler(State(app.clone())).await).await;
        assert_eq!(report["rounds"], 12);

        let body = body_json(reset_handler(State(app.clone())).await).await;
        assert_eq!(body["state"]["stage"], "salary");
        assert_eq!(body["state"]["iteration"], 1);
    }
}
