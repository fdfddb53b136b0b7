//! Core amortization engine: annuity payment and period-by-period schedule

use log::{debug, warn};

use super::schedule::{summarize_years, PeriodRecord, PrepaymentSavings, Schedule, ScheduleTotals};
use super::state::AmortizationState;
use crate::error::{ensure_non_negative, ensure_positive, CalcError, CalcResult};
use crate::loan::LoanTerms;
use crate::rates::BALANCE_EPSILON;

/// Level payment that amortizes `principal` over `num_periods` at `periodic_rate`.
///
/// `periodic_rate` is a decimal per-period rate (6% annual, monthly = 0.005).
/// Falls back to straight-line `principal / n` at a zero rate.
pub fn compute_periodic_payment(principal: f64, periodic_rate: f64, num_periods: u32) -> CalcResult<f64> {
    ensure_positive("principal", principal)?;
    ensure_non_negative("periodic_rate", periodic_rate)?;
    if num_periods == 0 {
        return Err(CalcError::invalid("num_periods", "must be at least 1"));
    }

    let n = num_periods as f64;
    if periodic_rate == 0.0 {
        return Ok(principal / n);
    }

    let growth = (1.0 + periodic_rate).powi(num_periods as i32);
    let payment = if !growth.is_finite() {
        // (1+r)^n overflowed: the payment converges to interest-only
        principal * periodic_rate
    } else if growth - 1.0 <= 0.0 {
        // Rate too small to register in f64
        principal / n
    } else {
        principal * periodic_rate * growth / (growth - 1.0)
    };

    if !payment.is_finite() || payment <= 0.0 {
        return Err(CalcError::invalid("periodic_rate", "payment is not representable"));
    }
    Ok(payment)
}

/// Amortization engine bound to one set of validated loan terms
pub struct AmortizationEngine<'a> {
    terms: &'a LoanTerms,
    periodic_rate: f64,
    payment: f64,
}

impl<'a> AmortizationEngine<'a> {
    /// Validate the terms and compute the level payment
    pub fn new(terms: &'a LoanTerms) -> CalcResult<Self> {
        terms.validate()?;
        let periodic_rate = terms.periodic_rate();
        let payment = compute_periodic_payment(terms.principal, periodic_rate, terms.term_periods)?;
        Ok(Self {
            terms,
            periodic_rate,
            payment,
        })
    }

    /// Level payment before extras
    pub fn payment(&self) -> f64 {
        self.payment
    }

    /// Walk the loan until the term ends or the balance reaches zero
    pub fn run(&self) -> Schedule {
        let mut periods = Vec::with_capacity(self.terms.term_periods as usize);
        let mut state = AmortizationState::from_terms(self.terms);

        for _period in 1..=self.terms.term_periods {
            state.advance_period();

            let record = self.calculate_period(&mut state);
            periods.push(record);

            if state.is_paid_off() {
                break;
            }
        }

        let years = summarize_years(&periods, self.terms.principal);
        let totals = self.totals(&periods, &state);

        debug!(
            "Amortized {:.2} at {}% over {} periods: payment {:.2}, paid off after {} periods",
            self.terms.principal,
            self.terms.annual_rate_pct,
            self.terms.term_periods,
            self.payment,
            totals.num_periods,
        );

        Schedule {
            periods,
            years,
            totals,
        }
    }

    /// Split one payment into interest, scheduled principal and extra
    fn calculate_period(&self, state: &mut AmortizationState) -> PeriodRecord {
        let balance = state.balance;
        let interest = balance * self.periodic_rate;
        let due_principal = (self.payment - interest).max(0.0);

        // Scheduled principal first, extra can only retire what is left
        let mut scheduled_principal = due_principal.min(balance);
        let extra = self
            .terms
            .extra_for_period(state.period)
            .min(balance - scheduled_principal);

        let residue = balance - scheduled_principal - extra;
        let paid_off = state.period == self.terms.term_periods || residue <= BALANCE_EPSILON;

        let (ending_balance, total_paid) = if paid_off {
            // Final payment clears the balance exactly, absorbing float residue
            scheduled_principal = balance - extra;
            (0.0, balance + interest)
        } else {
            (residue, interest + scheduled_principal + extra)
        };

        state.apply_payment(interest, scheduled_principal + extra, ending_balance);

        PeriodRecord {
            period: state.period,
            year: state.year,
            date: self.terms.period_date(state.period),
            interest,
            scheduled_principal,
            extra,
            total_paid,
            ending_balance,
        }
    }

    fn totals(&self, periods: &[PeriodRecord], state: &AmortizationState) -> ScheduleTotals {
        let total_scheduled_principal: f64 = periods.iter().map(|r| r.scheduled_principal).sum();
        let total_extra: f64 = periods.iter().map(|r| r.extra).sum();
        let total_paid: f64 = periods.iter().map(|r| r.total_paid).sum();

        let payoff_date = if state.is_paid_off() {
            periods.last().and_then(|r| r.date)
        } else {
            None
        };

        ScheduleTotals {
            periodic_payment: self.payment,
            num_periods: periods.len() as u32,
            total_interest: state.cumulative_interest,
            total_scheduled_principal,
            total_extra,
            total_paid,
            payoff_date,
        }
    }
}

/// Generate the schedule, surfacing invalid terms as an error
pub fn try_generate_schedule(terms: &LoanTerms) -> CalcResult<Schedule> {
    Ok(AmortizationEngine::new(terms)?.run())
}

/// Generate the schedule; invalid terms yield an empty schedule
pub fn generate_schedule(terms: &LoanTerms) -> Schedule {
    match try_generate_schedule(terms) {
        Ok(schedule) => schedule,
        Err(err) => {
            warn!("Returning empty schedule: {}", err);
            Schedule::empty()
        }
    }
}

/// Interest and time saved by the extra payments in `terms`
pub fn prepayment_savings(terms: &LoanTerms) -> CalcResult<PrepaymentSavings> {
    let accelerated = try_generate_schedule(terms)?;
    let baseline = try_generate_schedule(&terms.without_extras())?;

    let baseline_periods = baseline.totals.num_periods;
    let accelerated_periods = accelerated.totals.num_periods;
    let baseline_interest = baseline.totals.total_interest;
    let accelerated_interest = accelerated.totals.total_interest;

    Ok(PrepaymentSavings {
        baseline_periods,
        accelerated_periods,
        periods_saved: baseline_periods.saturating_sub(accelerated_periods),
        baseline_interest,
        accelerated_interest,
        interest_saved: baseline_interest - accelerated_interest,
    })
}

/// Outstanding balance after `periods` payments
pub fn remaining_balance_after(terms: &LoanTerms, periods: u32) -> CalcResult<f64> {
    let schedule = try_generate_schedule(terms)?;
    Ok(schedule.balance_after(periods, terms.principal))
}
