//! Loan term structures consumed by the amortization engine

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ensure_non_negative, ensure_positive, CalcError, CalcResult};
use crate::rates::{periodic_rate, MAX_TERM_PERIODS, PERIODS_PER_YEAR};

/// How often the recurring extra payment is made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraFrequency {
    /// No recurring extra payment
    #[default]
    None,
    /// Every period
    Monthly,
    /// Every 3rd period
    Quarterly,
    /// Every 12th period
    Yearly,
}

impl ExtraFrequency {
    /// Number of periods between extra payments, None when disabled
    pub fn interval(&self) -> Option<u32> {
        match self {
            ExtraFrequency::None => None,
            ExtraFrequency::Monthly => Some(1),
            ExtraFrequency::Quarterly => Some(3),
            ExtraFrequency::Yearly => Some(PERIODS_PER_YEAR),
        }
    }

    /// Whether the extra payment falls on this 1-indexed period
    pub fn applies_to(&self, period: u32) -> bool {
        match self.interval() {
            Some(interval) => period % interval == 0,
            None => false,
        }
    }
}

impl FromStr for ExtraFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(ExtraFrequency::None),
            "monthly" => Ok(ExtraFrequency::Monthly),
            "quarterly" => Ok(ExtraFrequency::Quarterly),
            "yearly" | "annual" | "annually" => Ok(ExtraFrequency::Yearly),
            other => Err(format!("Unknown extra payment frequency: {}", other)),
        }
    }
}

impl fmt::Display for ExtraFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExtraFrequency::None => "none",
            ExtraFrequency::Monthly => "monthly",
            ExtraFrequency::Quarterly => "quarterly",
            ExtraFrequency::Yearly => "yearly",
        };
        f.write_str(name)
    }
}

/// One-time prepayment made on a specific period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LumpSum {
    /// 1-indexed period the prepayment is made on
    pub period: u32,
    pub amount: f64,
}

/// Immutable loan inputs for a single calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed
    pub principal: f64,

    /// Nominal annual interest rate in percent (6.0 == 6%)
    pub annual_rate_pct: f64,

    /// Term length in monthly periods
    pub term_periods: u32,

    /// Recurring extra principal payment
    #[serde(default)]
    pub extra_payment: f64,

    #[serde(default)]
    pub extra_frequency: ExtraFrequency,

    /// One-time prepayments on top of the recurring extra
    #[serde(default)]
    pub lump_sums: Vec<LumpSum>,

    /// Loan start date; period p is dated p months after this
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

impl LoanTerms {
    /// Plain annuity loan with no extra payments
    pub fn new(principal: f64, annual_rate_pct: f64, term_periods: u32) -> Self {
        Self {
            principal,
            annual_rate_pct,
            term_periods,
            extra_payment: 0.0,
            extra_frequency: ExtraFrequency::None,
            lump_sums: Vec::new(),
            start_date: None,
        }
    }

    /// Loan with the term given in years
    ///
    /// Terms too long to count in periods saturate and are rejected by `validate`.
    pub fn from_years(principal: f64, annual_rate_pct: f64, years: u32) -> Self {
        Self::new(principal, annual_rate_pct, years.saturating_mul(PERIODS_PER_YEAR))
    }

    /// Add a recurring extra payment
    pub fn with_extra(mut self, amount: f64, frequency: ExtraFrequency) -> Self {
        self.extra_payment = amount;
        self.extra_frequency = frequency;
        self
    }

    /// Add a one-time prepayment
    pub fn with_lump_sum(mut self, period: u32, amount: f64) -> Self {
        self.lump_sums.push(LumpSum { period, amount });
        self
    }

    /// Set the start date used to date each period
    pub fn starting(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Same loan with every extra and lump-sum payment removed
    pub fn without_extras(&self) -> Self {
        Self {
            extra_payment: 0.0,
            extra_frequency: ExtraFrequency::None,
            lump_sums: Vec::new(),
            ..self.clone()
        }
    }

    /// Periodic (monthly) decimal rate
    pub fn periodic_rate(&self) -> f64 {
        periodic_rate(self.annual_rate_pct)
    }

    /// Whether any extra principal is configured
    pub fn has_extras(&self) -> bool {
        (self.extra_payment > 0.0 && self.extra_frequency != ExtraFrequency::None)
            || self.lump_sums.iter().any(|l| l.amount > 0.0)
    }

    /// Configured extra principal for a 1-indexed period, before clamping
    pub fn extra_for_period(&self, period: u32) -> f64 {
        let recurring = if self.extra_frequency.applies_to(period) {
            self.extra_payment
        } else {
            0.0
        };
        let lump: f64 = self
            .lump_sums
            .iter()
            .filter(|l| l.period == period)
            .map(|l| l.amount)
            .sum();
        recurring + lump
    }

    /// Calendar date of a 1-indexed period, if a start date was given
    pub fn period_date(&self, period: u32) -> Option<NaiveDate> {
        self.start_date
            .and_then(|start| start.checked_add_months(Months::new(period)))
    }

    /// Check the terms the engine relies on
    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("principal", self.principal)?;
        ensure_non_negative("annual_rate_pct", self.annual_rate_pct)?;
        if self.term_periods == 0 {
            return Err(CalcError::invalid("term_periods", "must be at least 1"));
        }
        if self.term_periods > MAX_TERM_PERIODS {
            return Err(CalcError::invalid(
                "term_periods",
                format!("must be at most {}, got {}", MAX_TERM_PERIODS, self.term_periods),
            ));
        }
        ensure_non_negative("extra_payment", self.extra_payment)?;
        for lump in &self.lump_sums {
            ensure_non_negative("lump_sums.amount", lump.amount)?;
            if lump.period == 0 {
                return Err(CalcError::invalid("lump_sums.period", "periods are 1-indexed"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_rule() {
        assert!(ExtraFrequency::Monthly.applies_to(1));
        assert!(!ExtraFrequency::Quarterly.applies_to(2));
        assert!(ExtraFrequency::Quarterly.applies_to(3));
        assert!(ExtraFrequency::Quarterly.applies_to(6));
        assert!(!ExtraFrequency::Yearly.applies_to(11));
        assert!(ExtraFrequency::Yearly.applies_to(24));
        assert!(!ExtraFrequency::None.applies_to(12));
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!("Quarterly".parse::<ExtraFrequency>(), Ok(ExtraFrequency::Quarterly));
        assert_eq!("".parse::<ExtraFrequency>(), Ok(ExtraFrequency::None));
        assert!("fortnightly".parse::<ExtraFrequency>().is_err());
    }

    #[test]
    fn test_extra_for_period_combines_lump_sums() {
        let terms = LoanTerms::new(10_000.0, 5.0, 24)
            .with_extra(50.0, ExtraFrequency::Quarterly)
            .with_lump_sum(6, 1_000.0);

        assert_eq!(terms.extra_for_period(1), 0.0);
        assert_eq!(terms.extra_for_period(3), 50.0);
        assert_eq!(terms.extra_for_period(6), 1_050.0);
        assert!(terms.has_extras());
        assert!(!terms.without_extras().has_extras());
    }

    #[test]
    fn test_validate_rejects_bad_terms() {
        assert!(LoanTerms::new(0.0, 5.0, 12).validate().is_err());
        assert!(LoanTerms::new(1000.0, -1.0, 12).validate().is_err());
        assert!(LoanTerms::new(1000.0, 5.0, 0).validate().is_err());
        assert!(LoanTerms::new(f64::NAN, 5.0, 12).validate().is_err());
        assert!(LoanTerms::new(1000.0, 5.0, 12).with_lump_sum(0, 10.0).validate().is_err());
        assert!(LoanTerms::new(1000.0, 0.0, 12).validate().is_ok());
    }

    #[test]
    fn test_validate_bounds_term_length() {
        assert!(LoanTerms::new(1000.0, 5.0, 1200).validate().is_ok());
        assert!(LoanTerms::new(1000.0, 5.0, 1201).validate().is_err());
        assert!(LoanTerms::new(1000.0, 5.0, u32::MAX).validate().is_err());

        // Year counts that overflow saturate instead of wrapping
        let huge = LoanTerms::from_years(1000.0, 5.0, 400_000_000);
        assert_eq!(huge.term_periods, u32::MAX);
        assert!(huge.validate().is_err());
    }

    #[test]
    fn test_period_date() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let terms = LoanTerms::new(1000.0, 5.0, 12).starting(start);

        // Month arithmetic clamps to the last day of shorter months
        assert_eq!(terms.period_date(1), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(terms.period_date(12), NaiveDate::from_ymd_opt(2025, 1, 31));
        assert_eq!(LoanTerms::new(1000.0, 5.0, 12).period_date(1), None);
    }
}
