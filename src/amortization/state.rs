//! Running state of a loan while its schedule is generated

use crate::loan::LoanTerms;
use crate::rates::{year_of_period, BALANCE_EPSILON};

/// State of the loan at a point in the schedule
#[derive(Debug, Clone)]
pub struct AmortizationState {
    /// Current period (1-indexed, 0 before the first payment)
    pub period: u32,

    /// Year bucket of the current period (1-indexed)
    pub year: u32,

    /// Outstanding balance at the start of the current period
    pub balance: f64,

    /// Interest paid through the previous period
    pub cumulative_interest: f64,

    /// Scheduled principal plus extra paid through the previous period
    pub cumulative_principal: f64,
}

impl AmortizationState {
    /// State before the first payment
    pub fn from_terms(terms: &LoanTerms) -> Self {
        Self {
            period: 0,
            year: 1,
            balance: terms.principal,
            cumulative_interest: 0.0,
            cumulative_principal: 0.0,
        }
    }

    /// Advance to the next period
    pub fn advance_period(&mut self) {
        self.period += 1;
        self.year = year_of_period(self.period);
    }

    /// Record a payment and carry the ending balance forward
    pub fn apply_payment(&mut self, interest: f64, principal: f64, ending_balance: f64) {
        self.cumulative_interest += interest;
        self.cumulative_principal += principal;
        self.balance = ending_balance;
    }

    pub fn is_paid_off(&self) -> bool {
        self.balance <= BALANCE_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_tracks_year_bucket() {
        let terms = LoanTerms::new(1000.0, 5.0, 24);
        let mut state = AmortizationState::from_terms(&terms);

        for _ in 0..13 {
            state.advance_period();
        }

        assert_eq!(state.period, 13);
        assert_eq!(state.year, 2);
        assert_eq!(state.balance, 1000.0);
    }

    #[test]
    fn test_apply_payment() {
        let terms = LoanTerms::new(1000.0, 5.0, 24);
        let mut state = AmortizationState::from_terms(&terms);
        state.advance_period();
        state.apply_payment(4.17, 39.70, 960.30);

        assert_eq!(state.balance, 960.30);
        assert!(!state.is_paid_off());

        state.apply_payment(0.0, 960.30, 0.0);
        assert!(state.is_paid_off());
    }
}
