//! Year-by-year projection of two competing strategies

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::cost_model::CostModel;
use super::result::{ComparisonResult, ProjectionYear, Strategy};
use crate::error::{CalcError, CalcResult};
use crate::rates::MAX_HORIZON_YEARS;

fn default_horizon_years() -> u32 {
    30
}

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Number of years to simulate
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,

    /// Annual return on capital not tied up in a strategy, as a decimal
    #[serde(default)]
    pub investment_return: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizon_years: default_horizon_years(),
            investment_return: 0.0,
        }
    }
}

impl ProjectionConfig {
    pub fn new(horizon_years: u32, investment_return: f64) -> Self {
        Self {
            horizon_years,
            investment_return,
        }
    }

    fn validate(&self) -> CalcResult<()> {
        if self.horizon_years == 0 {
            return Err(CalcError::DegenerateProjection("horizon must be at least one year".into()));
        }
        if self.horizon_years > MAX_HORIZON_YEARS {
            return Err(CalcError::invalid(
                "horizon_years",
                format!("must be at most {}, got {}", MAX_HORIZON_YEARS, self.horizon_years),
            ));
        }
        if !self.investment_return.is_finite() || self.investment_return <= -1.0 {
            return Err(CalcError::invalid(
                "investment_return",
                format!("must be above -100%, got {}", self.investment_return),
            ));
        }
        Ok(())
    }
}

/// Running totals carried from one simulated year to the next
#[derive(Debug, Clone, Default)]
struct RunningTotals {
    cumulative_a: f64,
    cumulative_b: f64,
    opportunity_cost: f64,
}

/// Compares two cost models over a fixed horizon
#[derive(Debug, Clone, Default)]
pub struct ComparativeProjector {
    config: ProjectionConfig,
}

impl ComparativeProjector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run the projection, declining degenerate inputs with an error
    pub fn try_project(&self, a: &dyn CostModel, b: &dyn CostModel) -> CalcResult<ComparisonResult> {
        self.config.validate()?;
        a.validate()?;
        b.validate()?;

        // Capital one side commits upfront and the other keeps invested
        let capital_gap = a.upfront_capital() - b.upfront_capital();
        let (charged_to, idle_capital) = if capital_gap > 0.0 {
            (Some(Strategy::A), capital_gap)
        } else if capital_gap < 0.0 {
            (Some(Strategy::B), -capital_gap)
        } else {
            (None, 0.0)
        };

        let mut totals = RunningTotals::default();
        let mut years = Vec::with_capacity(self.config.horizon_years as usize);

        for year in 1..=self.config.horizon_years {
            let row = self.calculate_year(a, b, year, charged_to, idle_capital, &mut totals);
            years.push(row);
        }

        let result = ComparisonResult::new(a.label().to_string(), b.label().to_string(), years);

        debug!(
            "Projected {} vs {} over {} years: break-even {:?}",
            result.label_a, result.label_b, self.config.horizon_years, result.break_even_year,
        );

        Ok(result)
    }

    /// Run the projection; degenerate inputs yield None
    pub fn project(&self, a: &dyn CostModel, b: &dyn CostModel) -> Option<ComparisonResult> {
        match self.try_project(a, b) {
            Ok(result) => Some(result),
            Err(err) => {
                warn!("Declining projection: {}", err);
                None
            }
        }
    }

    fn calculate_year(
        &self,
        a: &dyn CostModel,
        b: &dyn CostModel,
        year: u32,
        charged_to: Option<Strategy>,
        idle_capital: f64,
        totals: &mut RunningTotals,
    ) -> ProjectionYear {
        let r = self.config.investment_return;

        // Return forgone during this year on the idle capital compounded so far
        let opportunity_delta = idle_capital * (1.0 + r).powi(year as i32 - 1) * r;
        totals.opportunity_cost += opportunity_delta;

        let mut annual_cost_a = a.annual_cost(year);
        let mut annual_cost_b = b.annual_cost(year);

        if year == 1 {
            annual_cost_a += a.upfront_capital();
            annual_cost_b += b.upfront_capital();
        }

        match charged_to {
            Some(Strategy::A) => annual_cost_a += opportunity_delta,
            Some(Strategy::B) => annual_cost_b += opportunity_delta,
            None => {}
        }

        totals.cumulative_a += annual_cost_a;
        totals.cumulative_b += annual_cost_b;

        let equity_a = a.equity(year);
        let equity_b = b.equity(year);

        ProjectionYear {
            year,
            annual_cost_a,
            annual_cost_b,
            cumulative_cost_a: totals.cumulative_a,
            cumulative_cost_b: totals.cumulative_b,
            equity_a,
            equity_b,
            opportunity_cost: totals.opportunity_cost,
            opportunity_charged_to: charged_to,
            net_position_a: totals.cumulative_a - equity_a,
            net_position_b: totals.cumulative_b - equity_b,
        }
    }
}

/// Project two strategies over `years` with no investment return on idle capital
pub fn project(a: &dyn CostModel, b: &dyn CostModel, years: u32) -> Option<ComparisonResult> {
    ComparativeProjector::new(ProjectionConfig::new(years, 0.0)).project(a, b)
}
