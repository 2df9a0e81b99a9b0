use axum::{
    Router,
    extract::{Json, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::core::{
    Allocation, DataSeries, MonthlyRecord, Rebalancing, Results, RunCounter, SimulationParams,
    simulate,
};

const ALLOCATION_SUM_TOLERANCE: f64 = 0.01;

#[derive(Args, Debug, Clone, PartialEq)]
pub struct SimulationArgs {
    #[arg(long, default_value_t = 30, help = "Length of every retirement window in years")]
    pub years: u32,
    #[arg(
        long,
        default_value_t = 4.0,
        help = "Annual withdrawal in percent of the starting value, e.g. 4"
    )]
    pub withdrawal_rate: f64,
    #[arg(long, default_value_t = 1871, help = "First year a window may start in")]
    pub start_year: u32,
    #[arg(long, default_value_t = 2023, help = "Last year a window may run through")]
    pub end_year: u32,
    #[arg(
        long,
        default_value_t = false,
        help = "Withdraw a twelfth every month instead of the full amount at each year end"
    )]
    pub monthly_withdrawal: bool,
    #[arg(
        long,
        default_value_t = Rebalancing::None,
        help = "Rebalancing policy: none, monthly, yearly or threshold"
    )]
    pub rebalance: Rebalancing,
    #[arg(
        long,
        default_value_t = 0.05,
        help = "Drift that triggers threshold rebalancing as a fraction, not a percent (0.05 = 5 points)"
    )]
    pub threshold: f64,
}

impl Default for SimulationArgs {
    fn default() -> Self {
        Self {
            years: 30,
            withdrawal_rate: 4.0,
            start_year: 1871,
            end_year: 2023,
            monthly_withdrawal: false,
            rebalance: Rebalancing::None,
            threshold: 0.05,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    portfolio: Vec<Allocation>,
    asset_data: Vec<Vec<MonthlyRecord>>,
    inflation_data: Vec<MonthlyRecord>,

    years: Option<u32>,
    withdrawal_rate: Option<f64>,
    start_year: Option<u32>,
    end_year: Option<u32>,
    monthly_withdrawal: Option<bool>,
    rebalance: Option<String>,
    threshold: Option<f64>,
}

#[derive(Debug)]
struct ApiRequest {
    portfolio: Vec<Allocation>,
    assets: Vec<DataSeries>,
    inflation: DataSeries,
    params: SimulationParams,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    portfolio: Vec<Allocation>,
    rebalance: String,
    years: u32,
    withdrawal_rate: f64,
    start_year: u32,
    end_year: u32,
    monthly_withdrawal: bool,
    threshold: f64,
    results: Results,
    simulations_ran: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    simulations_ran: u64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Clone)]
struct AppState {
    defaults: Arc<SimulationArgs>,
    counter: Arc<RunCounter>,
}

pub fn build_params(args: &SimulationArgs) -> Result<SimulationParams, String> {
    if args.years == 0 {
        return Err("--years must be > 0".to_string());
    }

    if args.end_year < args.start_year.saturating_add(args.years) {
        return Err(format!(
            "--end-year must be >= --start-year + --years ({} + {})",
            args.start_year, args.years
        ));
    }

    if !args.withdrawal_rate.is_finite() || args.withdrawal_rate < 0.0 {
        return Err("--withdrawal-rate must be >= 0".to_string());
    }

    if !(0.0..=1.0).contains(&args.threshold) {
        return Err("--threshold must be a fraction between 0 and 1".to_string());
    }

    Ok(SimulationParams {
        years: args.years,
        withdrawal_rate: args.withdrawal_rate,
        start_year: args.start_year,
        end_year: args.end_year,
        monthly_withdrawal: args.monthly_withdrawal,
        rebalance: args.rebalance,
        threshold: args.threshold,
    })
}

fn validate_portfolio(portfolio: &[Allocation]) -> Result<(), String> {
    if portfolio.is_empty() {
        return Err("portfolio must contain at least one asset".to_string());
    }

    for asset in portfolio {
        if !(0.0..=100.0).contains(&asset.allocation) {
            return Err(format!(
                "allocation for '{}' must be between 0 and 100, got {}",
                asset.name, asset.allocation
            ));
        }
    }

    let total = portfolio.iter().map(|asset| asset.allocation).sum::<f64>();
    if (total - 100.0).abs() > ALLOCATION_SUM_TOLERANCE {
        return Err(format!("portfolio allocations must sum to 100, got {total}"));
    }

    Ok(())
}

pub async fn run_http_server(port: u16, defaults: SimulationArgs) -> io::Result<()> {
    build_params(&defaults).map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    let state = AppState {
        defaults: Arc::new(defaults),
        counter: Arc::new(RunCounter::new()),
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/simulate", post(simulate_handler))
        .route("/api/stats", get(stats_handler))
        .fallback(not_found_handler)
        .with_state(state);

    let listener = TcpListener::bind(addr).await?;
    log::info!("SWR HTTP API listening on http://{addr}");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn stats_handler(State(state): State<AppState>) -> Response {
    json_response(
        StatusCode::OK,
        StatsResponse {
            simulations_ran: state.counter.simulations_ran(),
        },
    )
}

async fn simulate_handler(
    State(state): State<AppState>,
    Json(payload): Json<SimulatePayload>,
) -> Response {
    match run_simulation(&state, payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => {
            log::warn!("rejected simulation request: {msg}");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn run_simulation(state: &AppState, payload: SimulatePayload) -> Result<SimulateResponse, String> {
    let request = api_request_from_payload(payload, &state.defaults)?;
    let results = simulate(
        &request.portfolio,
        &request.inflation,
        &request.assets,
        &request.params,
        &state.counter,
    )
    .map_err(|e| e.to_string())?;

    Ok(build_simulate_response(
        request,
        results,
        state.counter.simulations_ran(),
    ))
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
fn api_request_from_json(json: &str, defaults: &SimulationArgs) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload, defaults)
}

fn api_request_from_payload(
    payload: SimulatePayload,
    defaults: &SimulationArgs,
) -> Result<ApiRequest, String> {
    let mut args = defaults.clone();

    if let Some(v) = payload.years {
        args.years = v;
    }
    if let Some(v) = payload.withdrawal_rate {
        args.withdrawal_rate = v;
    }
    if let Some(v) = payload.start_year {
        args.start_year = v;
    }
    if let Some(v) = payload.end_year {
        args.end_year = v;
    }
    if let Some(v) = payload.monthly_withdrawal {
        args.monthly_withdrawal = v;
    }
    if let Some(v) = payload.rebalance.as_deref() {
        // Older clients send free text; anything unknown means threshold.
        args.rebalance = Rebalancing::parse(v);
    }
    if let Some(v) = payload.threshold {
        args.threshold = v;
    }

    let params = build_params(&args)?;
    validate_portfolio(&payload.portfolio)?;

    if payload.asset_data.len() != payload.portfolio.len() {
        return Err(format!(
            "assetData must hold one series per portfolio asset: {} assets, {} series",
            payload.portfolio.len(),
            payload.asset_data.len()
        ));
    }

    let assets = payload
        .asset_data
        .into_iter()
        .zip(&payload.portfolio)
        .map(|(records, asset)| {
            DataSeries::new(records).map_err(|e| format!("assetData for '{}': {e}", asset.name))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let inflation =
        DataSeries::new(payload.inflation_data).map_err(|e| format!("inflationData: {e}"))?;

    Ok(ApiRequest {
        portfolio: payload.portfolio,
        assets,
        inflation,
        params,
    })
}

fn build_simulate_response(
    request: ApiRequest,
    results: Results,
    simulations_ran: u64,
) -> SimulateResponse {
    let params = request.params;
    SimulateResponse {
        portfolio: request.portfolio,
        rebalance: params.rebalance.to_string(),
        years: params.years,
        withdrawal_rate: params.withdrawal_rate,
        start_year: params.start_year,
        end_year: params.end_year,
        monthly_withdrawal: params.monthly_withdrawal,
        threshold: params.threshold,
        results,
        simulations_ran,
    }
}
