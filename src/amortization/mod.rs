//! Amortization engine: payment calculation, schedules and yearly summaries

mod state;
mod engine;
mod schedule;

pub use state::AmortizationState;
pub use engine::{
    compute_periodic_payment, generate_schedule, prepayment_savings, remaining_balance_after,
    try_generate_schedule, AmortizationEngine,
};
pub use schedule::{summarize_years, PeriodRecord, PrepaymentSavings, Schedule, ScheduleTotals, YearSummary};
