//! Cost models for the strategies the projector compares

use serde::{Deserialize, Serialize};

use crate::amortization::{try_generate_schedule, Schedule};
use crate::error::{ensure_non_negative, ensure_positive, CalcError, CalcResult};
use crate::loan::LoanTerms;
use crate::rates::{compound, escalate, MAX_TERM_PERIODS, PERIODS_PER_YEAR};

/// One strategy's cost stream over time
///
/// Years are 1-indexed. Implementations must be pure: the same year always
/// returns the same value.
pub trait CostModel: Send + Sync {
    /// Display name of the strategy
    fn label(&self) -> &str;

    /// Capital committed at the start (down payment, closing costs, ...)
    fn upfront_capital(&self) -> f64;

    /// Recurring cost paid during `year`
    fn annual_cost(&self, year: u32) -> f64;

    /// Equity held at the end of `year`
    fn equity(&self, _year: u32) -> f64 {
        0.0
    }

    /// Reject inputs the projector cannot use
    fn validate(&self) -> CalcResult<()>;
}

/// A recurring annual amount escalating at a compounding rate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RecurringCost {
    /// Amount paid in year 1
    pub annual_amount: f64,
    /// Yearly escalation as a decimal (0.03 == 3%)
    #[serde(default)]
    pub escalation: f64,
}

impl RecurringCost {
    pub fn new(annual_amount: f64, escalation: f64) -> Self {
        Self {
            annual_amount,
            escalation,
        }
    }

    /// Amount paid in a 1-indexed year: base * (1 + escalation)^(year - 1)
    pub fn in_year(&self, year: u32) -> f64 {
        escalate(self.annual_amount, self.escalation, year)
    }

    pub fn validate(&self, field: &str) -> CalcResult<()> {
        ensure_non_negative(field, self.annual_amount)?;
        ensure_growth_rate(field, self.escalation)
    }
}

fn ensure_growth_rate(field: &str, rate: f64) -> CalcResult<()> {
    if !rate.is_finite() || rate <= -1.0 {
        return Err(CalcError::invalid(field, format!("growth rate must be above -100%, got {}", rate)));
    }
    Ok(())
}

/// Inputs describing the purchase of a home with a mortgage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipInputs {
    pub home_price: f64,
    pub down_payment: f64,
    #[serde(default)]
    pub closing_costs: f64,
    /// Nominal annual mortgage rate in percent
    pub mortgage_rate_pct: f64,
    pub mortgage_years: u32,
    #[serde(default)]
    pub property_tax: RecurringCost,
    #[serde(default)]
    pub insurance: RecurringCost,
    #[serde(default)]
    pub maintenance: RecurringCost,
    #[serde(default)]
    pub hoa: RecurringCost,
    /// Yearly home value appreciation as a decimal
    #[serde(default)]
    pub appreciation_rate: f64,
}

impl OwnershipInputs {
    pub fn loan_amount(&self) -> f64 {
        self.home_price - self.down_payment
    }

    fn validate(&self) -> CalcResult<()> {
        ensure_positive("home_price", self.home_price)?;
        ensure_non_negative("down_payment", self.down_payment)?;
        if self.down_payment > self.home_price {
            return Err(CalcError::invalid("down_payment", "cannot exceed the home price"));
        }
        ensure_non_negative("closing_costs", self.closing_costs)?;
        if self.loan_amount() > 0.0 {
            let periods = self.mortgage_years.checked_mul(PERIODS_PER_YEAR);
            if !periods.is_some_and(|p| p <= MAX_TERM_PERIODS) {
                return Err(CalcError::invalid(
                    "mortgage_years",
                    format!("must be at most {}, got {}", MAX_TERM_PERIODS / PERIODS_PER_YEAR, self.mortgage_years),
                ));
            }
        }
        self.property_tax.validate("property_tax")?;
        self.insurance.validate("insurance")?;
        self.maintenance.validate("maintenance")?;
        self.hoa.validate("hoa")?;
        ensure_growth_rate("appreciation_rate", self.appreciation_rate)
    }
}

/// Buying: mortgage service plus ownership costs, building equity
#[derive(Debug, Clone)]
pub struct OwnershipModel {
    label: String,
    inputs: OwnershipInputs,
    /// None when the home is bought outright
    mortgage: Option<Schedule>,
}

impl OwnershipModel {
    /// Validate the inputs and amortize the mortgage once
    pub fn new(inputs: OwnershipInputs) -> CalcResult<Self> {
        inputs.validate()?;

        let mortgage = if inputs.loan_amount() > 0.0 {
            let terms = LoanTerms::from_years(inputs.loan_amount(), inputs.mortgage_rate_pct, inputs.mortgage_years);
            Some(try_generate_schedule(&terms)?)
        } else {
            None
        };

        Ok(Self {
            label: "Buy".to_string(),
            inputs,
            mortgage,
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn inputs(&self) -> &OwnershipInputs {
        &self.inputs
    }

    pub fn mortgage(&self) -> Option<&Schedule> {
        self.mortgage.as_ref()
    }

    /// Mortgage cash paid during `year`, zero once the loan is gone
    pub fn mortgage_service(&self, year: u32) -> f64 {
        self.mortgage
            .as_ref()
            .and_then(|s| s.year(year))
            .map(|y| y.total_paid)
            .unwrap_or(0.0)
    }

    /// Loan balance at the end of `year`
    pub fn loan_balance(&self, year: u32) -> f64 {
        match &self.mortgage {
            Some(schedule) => {
                schedule.balance_after(year.saturating_mul(PERIODS_PER_YEAR), self.inputs.loan_amount())
            }
            None => 0.0,
        }
    }

    /// Appreciated market value at the end of `year`
    pub fn market_value(&self, year: u32) -> f64 {
        compound(self.inputs.home_price, self.inputs.appreciation_rate, year)
    }

    fn ownership_costs(&self, year: u32) -> f64 {
        self.inputs.property_tax.in_year(year)
            + self.inputs.insurance.in_year(year)
            + self.inputs.maintenance.in_year(year)
            + self.inputs.hoa.in_year(year)
    }
}

impl CostModel for OwnershipModel {
    fn label(&self) -> &str {
        &self.label
    }

    fn upfront_capital(&self) -> f64 {
        self.inputs.down_payment + self.inputs.closing_costs
    }

    fn annual_cost(&self, year: u32) -> f64 {
        self.mortgage_service(year) + self.ownership_costs(year)
    }

    fn equity(&self, year: u32) -> f64 {
        self.market_value(year) - self.loan_balance(year)
    }

    fn validate(&self) -> CalcResult<()> {
        self.inputs.validate()
    }
}

/// Inputs describing renting a comparable home
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalInputs {
    pub monthly_rent: f64,
    /// Yearly rent increase as a decimal
    #[serde(default)]
    pub rent_increase: f64,
    #[serde(default)]
    pub renters_insurance: RecurringCost,
    /// Non-refundable move-in costs (broker fee, moving)
    #[serde(default)]
    pub upfront_costs: f64,
}

/// Renting: escalating rent, no equity
#[derive(Debug, Clone)]
pub struct RentalModel {
    label: String,
    inputs: RentalInputs,
}

impl RentalModel {
    pub fn new(inputs: RentalInputs) -> CalcResult<Self> {
        let model = Self {
            label: "Rent".to_string(),
            inputs,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Rent paid during `year`
    pub fn rent(&self, year: u32) -> f64 {
        escalate(self.inputs.monthly_rent * PERIODS_PER_YEAR as f64, self.inputs.rent_increase, year)
    }
}

impl CostModel for RentalModel {
    fn label(&self) -> &str {
        &self.label
    }

    fn upfront_capital(&self) -> f64 {
        self.inputs.upfront_costs
    }

    fn annual_cost(&self, year: u32) -> f64 {
        self.rent(year) + self.inputs.renters_insurance.in_year(year)
    }

    fn validate(&self) -> CalcResult<()> {
        ensure_positive("monthly_rent", self.inputs.monthly_rent)?;
        ensure_growth_rate("rent_increase", self.inputs.rent_increase)?;
        self.inputs.renters_insurance.validate("renters_insurance")?;
        ensure_non_negative("upfront_costs", self.inputs.upfront_costs)
    }
}

/// Explicit per-year cost and equity streams
///
/// Years past the end of `annual_costs` cost nothing; years past the end of
/// `equity` keep the last equity value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostCurve {
    pub label: String,
    #[serde(default)]
    pub upfront: f64,
    pub annual_costs: Vec<f64>,
    #[serde(default)]
    pub equity: Vec<f64>,
}

impl CostCurve {
    pub fn new(label: impl Into<String>, annual_costs: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            upfront: 0.0,
            annual_costs,
            equity: Vec::new(),
        }
    }

    pub fn with_upfront(mut self, upfront: f64) -> Self {
        self.upfront = upfront;
        self
    }

    pub fn with_equity(mut self, equity: Vec<f64>) -> Self {
        self.equity = equity;
        self
    }
}

impl CostModel for CostCurve {
    fn label(&self) -> &str {
        &self.label
    }

    fn upfront_capital(&self) -> f64 {
        self.upfront
    }

    fn annual_cost(&self, year: u32) -> f64 {
        let idx = (year as usize).saturating_sub(1);
        self.annual_costs.get(idx).copied().unwrap_or(0.0)
    }

    fn equity(&self, year: u32) -> f64 {
        let idx = (year as usize).saturating_sub(1);
        self.equity
            .get(idx)
            .or_else(|| self.equity.last())
            .copied()
            .unwrap_or(0.0)
    }

    fn validate(&self) -> CalcResult<()> {
        if self.annual_costs.is_empty() {
            return Err(CalcError::invalid("annual_costs", "cost curve has no years"));
        }
        ensure_non_negative("upfront", self.upfront)?;
        for &cost in &self.annual_costs {
            ensure_non_negative("annual_costs", cost)?;
        }
        if self.equity.iter().any(|e| !e.is_finite()) {
            return Err(CalcError::invalid("equity", "must be finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample_ownership() -> OwnershipInputs {
        OwnershipInputs {
            home_price: 400_000.0,
            down_payment: 80_000.0,
            closing_costs: 12_000.0,
            mortgage_rate_pct: 6.5,
            mortgage_years: 30,
            property_tax: RecurringCost::new(4_800.0, 0.02),
            insurance: RecurringCost::new(1_500.0, 0.03),
            maintenance: RecurringCost::new(4_000.0, 0.03),
            hoa: RecurringCost::default(),
            appreciation_rate: 0.03,
        }
    }

    #[test]
    fn test_recurring_cost_escalates() {
        let cost = RecurringCost::new(1_000.0, 0.05);
        assert_eq!(cost.in_year(1), 1_000.0);
        assert_abs_diff_eq!(cost.in_year(3), 1_102.5, epsilon = 1e-9);
    }

    #[test]
    fn test_ownership_costs_and_equity() {
        let model = OwnershipModel::new(sample_ownership()).unwrap();
        let mortgage = model.mortgage().unwrap();

        assert_eq!(mortgage.periods.len(), 360);
        assert_abs_diff_eq!(model.upfront_capital(), 92_000.0);

        let year1 = model.annual_cost(1);
        let expected = mortgage.years[0].total_paid + 4_800.0 + 1_500.0 + 4_000.0;
        assert_abs_diff_eq!(year1, expected, epsilon = 1e-6);

        // Equity at year 1: appreciated value less balance after 12 payments
        let equity = model.equity(1);
        assert_abs_diff_eq!(equity, 412_000.0 - mortgage.periods[11].ending_balance, epsilon = 1e-6);

        // Loan is gone after the term, only ownership costs remain
        assert_eq!(model.mortgage_service(31), 0.0);
        assert_eq!(model.loan_balance(31), 0.0);
        assert_abs_diff_eq!(model.equity(31), model.market_value(31), epsilon = 1e-6);
    }

    #[test]
    fn test_cash_purchase_has_no_mortgage() {
        let inputs = OwnershipInputs {
            down_payment: 400_000.0,
            ..sample_ownership()
        };
        let model = OwnershipModel::new(inputs).unwrap();

        assert!(model.mortgage().is_none());
        assert_eq!(model.mortgage_service(1), 0.0);
        assert_abs_diff_eq!(model.equity(1), 412_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_ownership_rejects_bad_inputs() {
        let zero_price = OwnershipInputs {
            home_price: 0.0,
            down_payment: 0.0,
            ..sample_ownership()
        };
        assert!(OwnershipModel::new(zero_price).is_err());

        let too_much_down = OwnershipInputs {
            down_payment: 500_000.0,
            ..sample_ownership()
        };
        assert!(OwnershipModel::new(too_much_down).is_err());

        let no_term = OwnershipInputs {
            mortgage_years: 0,
            ..sample_ownership()
        };
        assert!(OwnershipModel::new(no_term).is_err());
    }

    #[test]
    fn test_ownership_rejects_unbounded_mortgage_term() {
        let century = OwnershipInputs {
            mortgage_years: 100,
            ..sample_ownership()
        };
        assert!(OwnershipModel::new(century).is_ok());

        for mortgage_years in [101, 400_000_000, u32::MAX] {
            let inputs = OwnershipInputs {
                mortgage_years,
                ..sample_ownership()
            };
            let err = OwnershipModel::new(inputs).unwrap_err();
            assert!(err.to_string().contains("mortgage_years"));
        }

        // Term is irrelevant without a mortgage
        let cash = OwnershipInputs {
            down_payment: 400_000.0,
            mortgage_years: u32::MAX,
            ..sample_ownership()
        };
        assert!(OwnershipModel::new(cash).is_ok());
    }

    #[test]
    fn test_rental_costs() {
        let model = RentalModel::new(RentalInputs {
            monthly_rent: 2_000.0,
            rent_increase: 0.04,
            renters_insurance: RecurringCost::new(200.0, 0.0),
            upfront_costs: 0.0,
        })
        .unwrap();

        assert_abs_diff_eq!(model.annual_cost(1), 24_200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(model.annual_cost(2), 24_960.0 + 200.0, epsilon = 1e-9);
        assert_eq!(model.equity(10), 0.0);

        let zero_rent = RentalInputs {
            monthly_rent: 0.0,
            rent_increase: 0.0,
            renters_insurance: RecurringCost::default(),
            upfront_costs: 0.0,
        };
        assert!(RentalModel::new(zero_rent).is_err());
    }

    #[test]
    fn test_cost_curve_lookup() {
        let curve = CostCurve::new("A", vec![10.0, 20.0]).with_equity(vec![1.0, 2.0]);
        assert_eq!(curve.annual_cost(1), 10.0);
        assert_eq!(curve.annual_cost(3), 0.0);
        assert_eq!(curve.equity(2), 2.0);
        assert_eq!(curve.equity(5), 2.0);
        assert!(CostCurve::new("empty", vec![]).validate().is_err());
    }
}
