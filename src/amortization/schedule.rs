//! Schedule output structures: per-period ledger, yearly roll-up and totals

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::rates::round_currency;

/// One row of the schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// 1-indexed period
    pub period: u32,
    /// Year bucket (ceil(period / 12))
    pub year: u32,
    /// Payment date, when the loan has a start date
    pub date: Option<NaiveDate>,
    pub interest: f64,
    pub scheduled_principal: f64,
    pub extra: f64,
    /// interest + scheduled_principal + extra
    pub total_paid: f64,
    pub ending_balance: f64,
}

impl PeriodRecord {
    /// Principal retired this period, scheduled plus extra
    pub fn principal_paid(&self) -> f64 {
        self.scheduled_principal + self.extra
    }

    /// Copy with every money field rounded to cents, for display
    pub fn rounded(&self) -> Self {
        Self {
            interest: round_currency(self.interest),
            scheduled_principal: round_currency(self.scheduled_principal),
            extra: round_currency(self.extra),
            total_paid: round_currency(self.total_paid),
            ending_balance: round_currency(self.ending_balance),
            ..self.clone()
        }
    }
}

/// Aggregate of the periods falling in one 12-period bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    /// 1-indexed year bucket
    pub year: u32,
    pub interest: f64,
    pub scheduled_principal: f64,
    pub extra: f64,
    pub total_paid: f64,
    /// Ending balance of the last period in the bucket
    pub ending_balance: f64,
    /// Cumulative principal retired as a percentage of the original principal
    pub loan_paid_to_date: f64,
}

impl YearSummary {
    fn empty(year: u32) -> Self {
        Self {
            year,
            interest: 0.0,
            scheduled_principal: 0.0,
            extra: 0.0,
            total_paid: 0.0,
            ending_balance: 0.0,
            loan_paid_to_date: 0.0,
        }
    }
}

/// Roll period records up into year buckets.
/// Records must be in period order.
pub fn summarize_years(periods: &[PeriodRecord], original_principal: f64) -> Vec<YearSummary> {
    let mut years: Vec<YearSummary> = Vec::new();

    for record in periods {
        if years.last().map(|y| y.year) != Some(record.year) {
            years.push(YearSummary::empty(record.year));
        }
        if let Some(summary) = years.last_mut() {
            summary.interest += record.interest;
            summary.scheduled_principal += record.scheduled_principal;
            summary.extra += record.extra;
            summary.total_paid += record.total_paid;
            summary.ending_balance = record.ending_balance;
            // Derived from the balance so full payoff lands on exactly 100
            summary.loan_paid_to_date =
                (original_principal - record.ending_balance) / original_principal * 100.0;
        }
    }

    years
}

/// Whole-schedule totals
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScheduleTotals {
    /// Level annuity payment before any extra
    pub periodic_payment: f64,
    /// Periods actually elapsed (shorter than the term on early payoff)
    pub num_periods: u32,
    pub total_interest: f64,
    pub total_scheduled_principal: f64,
    pub total_extra: f64,
    pub total_paid: f64,
    pub payoff_date: Option<NaiveDate>,
}

/// Complete amortization result
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schedule {
    pub periods: Vec<PeriodRecord>,
    pub years: Vec<YearSummary>,
    pub totals: ScheduleTotals,
}

impl Schedule {
    /// The "no result" schedule returned for invalid input
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Period on which the balance reached zero
    pub fn payoff_period(&self) -> Option<u32> {
        self.periods
            .last()
            .filter(|r| r.ending_balance == 0.0)
            .map(|r| r.period)
    }

    /// Outstanding balance after `periods` payments (0 = original principal)
    pub fn balance_after(&self, periods: u32, original_principal: f64) -> f64 {
        if periods == 0 {
            return original_principal;
        }
        match self.periods.get(periods as usize - 1) {
            Some(record) => record.ending_balance,
            None => self.periods.last().map(|r| r.ending_balance).unwrap_or(original_principal),
        }
    }

    /// Summary for a 1-indexed year bucket, None once the loan is gone
    pub fn year(&self, year: u32) -> Option<&YearSummary> {
        self.years.iter().find(|y| y.year == year)
    }
}

/// Effect of extra payments versus the same loan without them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentSavings {
    pub baseline_periods: u32,
    pub accelerated_periods: u32,
    pub periods_saved: u32,
    pub baseline_interest: f64,
    pub accelerated_interest: f64,
    pub interest_saved: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(period: u32, interest: f64, principal: f64, ending_balance: f64) -> PeriodRecord {
        PeriodRecord {
            period,
            year: crate::rates::year_of_period(period),
            date: None,
            interest,
            scheduled_principal: principal,
            extra: 0.0,
            total_paid: interest + principal,
            ending_balance,
        }
    }

    #[test]
    fn test_summarize_years_buckets_by_twelve() {
        let mut balance = 1300.0;
        let periods: Vec<_> = (1..=13)
            .map(|p| {
                balance -= 100.0;
                record(p, 1.0, 100.0, balance)
            })
            .collect();

        let years = summarize_years(&periods, 1300.0);

        assert_eq!(years.len(), 2);
        assert_eq!(years[0].year, 1);
        assert!((years[0].interest - 12.0).abs() < 1e-9);
        assert!((years[0].scheduled_principal - 1200.0).abs() < 1e-9);
        assert!((years[0].ending_balance - 100.0).abs() < 1e-9);
        assert!((years[1].total_paid - 101.0).abs() < 1e-9);
        assert_eq!(years[1].loan_paid_to_date, 100.0);
    }

    #[test]
    fn test_empty_schedule() {
        let schedule = Schedule::empty();
        assert!(schedule.is_empty());
        assert_eq!(schedule.payoff_period(), None);
        assert_eq!(schedule.balance_after(5, 1000.0), 1000.0);
        assert!(schedule.year(1).is_none());
    }

    #[test]
    fn test_rounded_record() {
        let r = record(1, 4.16666, 39.7012, 960.2988).rounded();
        assert_eq!(r.interest, 4.17);
        assert_eq!(r.scheduled_principal, 39.70);
        assert_eq!(r.ending_balance, 960.30);
    }
}
