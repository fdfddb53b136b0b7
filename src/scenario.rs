//! Scenario runner for batch schedules and projection sweeps
//!
//! Every run is independent, so batches fan out across threads with rayon.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::amortization::{generate_schedule, Schedule};
use crate::comparison::{
    ComparativeProjector, ComparisonResult, CostModel, OwnershipInputs, OwnershipModel, ProjectionConfig,
    RentalInputs, RentalModel,
};
use crate::error::CalcResult;
use crate::loan::NamedLoan;

/// Buy-vs-rent scenario as read from a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonScenario {
    pub ownership: OwnershipInputs,
    pub rental: RentalInputs,
    #[serde(default)]
    pub projection: ProjectionConfig,
}

impl ComparisonScenario {
    pub fn from_json_str(json: &str) -> CalcResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_path<P: AsRef<Path>>(path: P) -> CalcResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn build_models(&self) -> CalcResult<(OwnershipModel, RentalModel)> {
        let ownership = OwnershipModel::new(self.ownership.clone())?;
        let rental = RentalModel::new(self.rental.clone())?;
        Ok((ownership, rental))
    }

    /// Project ownership (A) against renting (B)
    pub fn run(&self) -> CalcResult<ComparisonResult> {
        let (ownership, rental) = self.build_models()?;
        ComparativeProjector::new(self.projection.clone()).try_project(&ownership, &rental)
    }
}

/// One line of a batch schedule report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub name: String,
    /// False when the loan's terms were rejected and no schedule was produced
    pub valid: bool,
    pub periodic_payment: f64,
    pub num_periods: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    pub payoff_date: Option<NaiveDate>,
}

impl LoanSummary {
    pub fn from_schedule(name: &str, schedule: &Schedule) -> Self {
        Self {
            name: name.to_string(),
            valid: !schedule.is_empty(),
            periodic_payment: schedule.totals.periodic_payment,
            num_periods: schedule.totals.num_periods,
            total_interest: schedule.totals.total_interest,
            total_paid: schedule.totals.total_paid,
            payoff_date: schedule.totals.payoff_date,
        }
    }
}

/// Break-even outcome for one investment return assumption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub investment_return: f64,
    pub break_even_year: Option<u32>,
    /// Net advantage of strategy A over B in the final year
    pub final_advantage_a: Option<f64>,
}

/// Runs many independent calculations with a shared projection config
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    config: ProjectionConfig,
}

impl ScenarioRunner {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Schedules for every loan, in input order; invalid loans get an empty schedule
    pub fn run_batch(&self, loans: &[NamedLoan]) -> Vec<Schedule> {
        loans.par_iter().map(|loan| generate_schedule(&loan.terms)).collect()
    }

    /// One summary line per loan, in input order
    pub fn summarize_batch(&self, loans: &[NamedLoan]) -> Vec<LoanSummary> {
        loans
            .par_iter()
            .map(|loan| LoanSummary::from_schedule(&loan.name, &generate_schedule(&loan.terms)))
            .collect()
    }

    /// Compare two strategies with the runner's config
    pub fn run(&self, a: &dyn CostModel, b: &dyn CostModel) -> Option<ComparisonResult> {
        ComparativeProjector::new(self.config.clone()).project(a, b)
    }

    /// Re-run the comparison for each investment return assumption
    pub fn return_sensitivity(&self, a: &dyn CostModel, b: &dyn CostModel, returns: &[f64]) -> Vec<SensitivityPoint> {
        returns
            .par_iter()
            .map(|&investment_return| {
                let config = ProjectionConfig {
                    investment_return,
                    ..self.config.clone()
                };
                let result = ComparativeProjector::new(config).project(a, b);
                SensitivityPoint {
                    investment_return,
                    break_even_year: result.as_ref().and_then(|r| r.break_even_year),
                    final_advantage_a: result.as_ref().and_then(|r| r.final_year()).map(|y| y.advantage_a()),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::RecurringCost;
    use crate::loan::{ExtraFrequency, LoanTerms};

    const SCENARIO: &str = r#"{
        "ownership": {
            "home_price": 350000,
            "down_payment": 70000,
            "closing_costs": 9000,
            "mortgage_rate_pct": 6.0,
            "mortgage_years": 30,
            "property_tax": { "annual_amount": 4200, "escalation": 0.02 },
            "insurance": { "annual_amount": 1400 },
            "maintenance": { "annual_amount": 3500, "escalation": 0.03 },
            "appreciation_rate": 0.035
        },
        "rental": {
            "monthly_rent": 2100,
            "rent_increase": 0.04
        },
        "projection": { "investment_return": 0.05 }
    }"#;

    #[test]
    fn test_scenario_from_json() {
        let scenario = ComparisonScenario::from_json_str(SCENARIO).unwrap();

        assert_eq!(scenario.projection.horizon_years, 30);
        assert_eq!(scenario.ownership.insurance, RecurringCost::new(1400.0, 0.0));
        assert_eq!(scenario.ownership.hoa, RecurringCost::default());

        let result = scenario.run().unwrap();
        assert_eq!(result.comparison.len(), 30);
        assert_eq!(result.label_a, "Buy");
        assert_eq!(result.label_b, "Rent");
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(ComparisonScenario::from_json_str("{ \"ownership\": 1 }").is_err());
    }

    #[test]
    fn test_batch_preserves_order() {
        let loans = vec![
            NamedLoan { name: "a".into(), terms: LoanTerms::new(10_000.0, 5.0, 24) },
            NamedLoan { name: "bad".into(), terms: LoanTerms::new(-1.0, 5.0, 24) },
            NamedLoan {
                name: "c".into(),
                terms: LoanTerms::new(10_000.0, 5.0, 24).with_extra(500.0, ExtraFrequency::Monthly),
            },
        ];

        let runner = ScenarioRunner::default();
        let summaries = runner.summarize_batch(&loans);

        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].name, "a");
        assert_eq!(summaries[0].num_periods, 24);
        assert!(!summaries[1].valid);
        assert!(summaries[2].num_periods < 24);

        let schedules = runner.run_batch(&loans);
        assert!(schedules[1].is_empty());
    }

    #[test]
    fn test_higher_return_delays_ownership_break_even() {
        let scenario = ComparisonScenario::from_json_str(SCENARIO).unwrap();
        let (ownership, rental) = scenario.build_models().unwrap();
        let runner = ScenarioRunner::new(scenario.projection.clone());

        let points = runner.return_sensitivity(&ownership, &rental, &[0.0, 0.08]);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].investment_return, 0.0);
        let low = points[0].final_advantage_a.unwrap();
        let high = points[1].final_advantage_a.unwrap();
        // Forgone return on the down payment counts against buying
        assert!(high < low);
    }

    #[test]
    fn test_oversized_mortgage_term_is_rejected() {
        let json = SCENARIO.replace("\"mortgage_years\": 30", "\"mortgage_years\": 400000000");
        let scenario = ComparisonScenario::from_json_str(&json).unwrap();

        assert!(scenario.build_models().is_err());
        assert!(scenario.run().is_err());
    }
}
