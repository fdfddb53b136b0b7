//! AWS Lambda handler for schedules, comparisons and refinance checks
//!
//! Accepts a JSON request tagged by `action` and returns the calculation
//! results. Invalid inputs come back as a response with `error` set rather
//! than as a failed invocation.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use loan_projection::amortization::{try_generate_schedule, PeriodRecord, ScheduleTotals, YearSummary};
use loan_projection::comparison::{analyze_refinance, ComparisonResult, RefinanceAnalysis, RefinanceInputs};
use loan_projection::scenario::{ComparisonScenario, ScenarioRunner, SensitivityPoint};
use loan_projection::{CalcResult, LoanTerms};

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LoanRequest {
    Schedule(ScheduleRequest),
    Compare(CompareRequest),
    Refinance(RefinanceInputs),
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub loan: LoanTerms,
    /// Return every period, not just the yearly roll-up (default: false)
    #[serde(default)]
    pub include_periods: bool,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub scenario: ComparisonScenario,
    /// Investment returns to sweep for break-even sensitivity
    #[serde(default)]
    pub returns: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub totals: ScheduleTotals,
    pub years: Vec<YearSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub periods: Vec<PeriodRecord>,
}

/// Output of any action; exactly one result field is set unless `error` is
#[derive(Debug, Default, Serialize)]
pub struct LoanResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sensitivity: Vec<SensitivityPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refinance: Option<RefinanceAnalysis>,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn schedule(request: ScheduleRequest) -> CalcResult<LoanResponse> {
    let schedule = try_generate_schedule(&request.loan)?;
    let periods = if request.include_periods {
        schedule.periods.iter().map(PeriodRecord::rounded).collect()
    } else {
        Vec::new()
    };

    Ok(LoanResponse {
        schedule: Some(ScheduleResponse {
            totals: schedule.totals,
            years: schedule.years,
            periods,
        }),
        ..Default::default()
    })
}

fn compare(request: CompareRequest) -> CalcResult<LoanResponse> {
    let comparison = request.scenario.run()?;

    let sensitivity = if request.returns.is_empty() {
        Vec::new()
    } else {
        let (ownership, rental) = request.scenario.build_models()?;
        ScenarioRunner::new(request.scenario.projection.clone()).return_sensitivity(&ownership, &rental, &request.returns)
    };

    Ok(LoanResponse {
        comparison: Some(comparison),
        sensitivity,
        ..Default::default()
    })
}

fn respond(request: LoanRequest) -> LoanResponse {
    let start = std::time::Instant::now();

    let result = match request {
        LoanRequest::Schedule(r) => schedule(r),
        LoanRequest::Compare(r) => compare(r),
        LoanRequest::Refinance(inputs) => analyze_refinance(&inputs).map(|analysis| LoanResponse {
            refinance: Some(analysis),
            ..Default::default()
        }),
    };

    let mut response = result.unwrap_or_else(|e| {
        warn!("Request rejected: {}", e);
        LoanResponse {
            error: Some(e.to_string()),
            ..Default::default()
        }
    });
    response.execution_time_ms = start.elapsed().as_millis() as u64;
    response
}

/// Lambda handler function
async fn handler(event: LambdaEvent<LoanRequest>) -> Result<LoanResponse, Error> {
    info!("Request {}", event.context.request_id);
    Ok(respond(event.payload))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
