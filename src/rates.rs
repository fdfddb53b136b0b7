//! Rate conversion, compounding and rounding helpers
//!
//! Rates coming from loan terms are nominal annual percentages (6.0 == 6%).
//! Growth rates used by the cost models are decimals (0.03 == 3%).

/// Periods per year for monthly schedules
pub const PERIODS_PER_YEAR: u32 = 12;

/// Balances below this are treated as fully paid
pub const BALANCE_EPSILON: f64 = 1e-9;

/// Longest loan term accepted, in periods (100 years)
pub const MAX_TERM_PERIODS: u32 = 1200;

/// Longest projection horizon accepted, in years
pub const MAX_HORIZON_YEARS: u32 = 100;

/// Convert a nominal annual percentage into a periodic decimal rate
pub fn periodic_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / PERIODS_PER_YEAR as f64 / 100.0
}

/// Convert a percentage (6.0) into a decimal (0.06)
pub fn pct_to_decimal(pct: f64) -> f64 {
    pct / 100.0
}

/// Effective annual rate implied by monthly compounding of a nominal percentage
pub fn effective_annual_rate(annual_rate_pct: f64) -> f64 {
    (1.0 + periodic_rate(annual_rate_pct)).powi(PERIODS_PER_YEAR as i32) - 1.0
}

/// Value of a recurring amount in 1-indexed `year` under compounding escalation.
/// Year 1 is the base amount.
pub fn escalate(base: f64, escalation: f64, year: u32) -> f64 {
    if year <= 1 {
        return base;
    }
    base * (1.0 + escalation).powi(year as i32 - 1)
}

/// Value after `years` of compounding growth
pub fn compound(value: f64, rate: f64, years: u32) -> f64 {
    value * (1.0 + rate).powi(years as i32)
}

/// Present value factor of an ordinary annuity: (1 - (1+r)^-n) / r
pub fn annuity_factor(periodic_rate: f64, num_periods: u32) -> f64 {
    if periodic_rate.abs() < 1e-12 {
        return num_periods as f64;
    }
    (1.0 - (1.0 + periodic_rate).powi(-(num_periods as i32))) / periodic_rate
}

/// Round to currency precision (cents)
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 1-indexed year bucket for a 1-indexed period
pub fn year_of_period(period: u32) -> u32 {
    period.div_ceil(PERIODS_PER_YEAR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_periodic_rate() {
        assert_abs_diff_eq!(periodic_rate(6.0), 0.005, epsilon = 1e-15);
        assert_eq!(periodic_rate(0.0), 0.0);
    }

    #[test]
    fn test_effective_annual_rate() {
        // 12% nominal compounded monthly
        assert_abs_diff_eq!(effective_annual_rate(12.0), 0.126825, epsilon = 1e-6);
    }

    #[test]
    fn test_escalate_first_year_is_base() {
        assert_eq!(escalate(1200.0, 0.05, 1), 1200.0);
        assert_abs_diff_eq!(escalate(1000.0, 0.10, 3), 1210.0, epsilon = 1e-9);
    }

    #[test]
    fn test_annuity_factor() {
        // 100/month for 12 months at 6% annual, ordinary annuity ~ 1161.89
        let pv = 100.0 * annuity_factor(0.005, 12);
        assert_abs_diff_eq!(pv, 1161.89, epsilon = 0.01);
        assert_eq!(annuity_factor(0.0, 12), 12.0);
    }

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(8606.6429), 8606.64);
        assert_eq!(round_currency(0.005), 0.01);
    }

    #[test]
    fn test_year_of_period() {
        assert_eq!(year_of_period(1), 1);
        assert_eq!(year_of_period(12), 1);
        assert_eq!(year_of_period(13), 2);
        assert_eq!(year_of_period(360), 30);
    }
}
