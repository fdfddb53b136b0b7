//! Refinance analysis: keep the current loan or replace its remaining balance

use log::debug;
use serde::{Deserialize, Serialize};

use crate::amortization::try_generate_schedule;
use crate::error::{ensure_non_negative, CalcError, CalcResult};
use crate::loan::LoanTerms;

/// Current loan, how far into it the borrower is, and the offered new loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinanceInputs {
    pub current: LoanTerms,
    /// Payments already made on the current loan
    pub periods_elapsed: u32,
    /// Nominal annual rate of the new loan in percent
    pub new_rate_pct: f64,
    pub new_term_periods: u32,
    #[serde(default)]
    pub closing_costs: f64,
    /// Finance the closing costs instead of paying them upfront
    #[serde(default)]
    pub roll_costs_into_loan: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinanceAnalysis {
    pub remaining_balance: f64,
    pub new_principal: f64,
    pub current_payment: f64,
    pub new_payment: f64,
    /// Current payment less new payment (negative when the new loan costs more)
    pub periodic_savings: f64,
    /// Interest still due on the current loan
    pub remaining_interest_current: f64,
    pub total_interest_new: f64,
    /// Remaining current interest less new interest plus upfront costs
    pub lifetime_savings: f64,
    /// Payments until the savings recover upfront closing costs
    pub break_even_period: Option<u32>,
}

pub fn analyze_refinance(inputs: &RefinanceInputs) -> CalcResult<RefinanceAnalysis> {
    ensure_non_negative("closing_costs", inputs.closing_costs)?;

    // Contractual path only, extras are the borrower's choice on either loan
    let current_terms = inputs.current.without_extras();
    let current = try_generate_schedule(&current_terms)?;

    if inputs.periods_elapsed >= current.totals.num_periods {
        return Err(CalcError::invalid("periods_elapsed", "current loan is already paid off"));
    }

    let remaining_balance = current.balance_after(inputs.periods_elapsed, current_terms.principal);
    let remaining_interest_current: f64 = current
        .periods
        .iter()
        .skip(inputs.periods_elapsed as usize)
        .map(|r| r.interest)
        .sum();

    let (new_principal, upfront_costs) = if inputs.roll_costs_into_loan {
        (remaining_balance + inputs.closing_costs, 0.0)
    } else {
        (remaining_balance, inputs.closing_costs)
    };

    let new_terms = LoanTerms::new(new_principal, inputs.new_rate_pct, inputs.new_term_periods);
    let replacement = try_generate_schedule(&new_terms)?;

    let current_payment = current.totals.periodic_payment;
    let new_payment = replacement.totals.periodic_payment;
    let periodic_savings = current_payment - new_payment;
    let total_interest_new = replacement.totals.total_interest;

    let break_even_period = if periodic_savings > 0.0 {
        Some((upfront_costs / periodic_savings).ceil() as u32)
    } else {
        None
    };

    debug!(
        "Refinance of {:.2}: payment {:.2} -> {:.2}, break-even {:?}",
        remaining_balance, current_payment, new_payment, break_even_period,
    );

    Ok(RefinanceAnalysis {
        remaining_balance,
        new_principal,
        current_payment,
        new_payment,
        periodic_savings,
        remaining_interest_current,
        total_interest_new,
        lifetime_savings: remaining_interest_current - total_interest_new - upfront_costs,
        break_even_period,
    })
}
