//! Loan Projection - amortization schedules and long-horizon strategy comparisons
//!
//! This library provides:
//! - Annuity payment calculation and period-by-period amortization schedules
//! - Extra and one-time prepayments with early-payoff detection
//! - Yearly roll-ups of the schedule
//! - Buy-vs-rent style projections with opportunity cost and break-even detection
//! - Refinance analysis and batch scenario runs
//!
//! Every calculation is a pure function of its inputs.

pub mod error;
pub mod rates;
pub mod loan;
pub mod amortization;
pub mod comparison;
pub mod scenario;

// Re-export commonly used types
pub use error::{CalcError, CalcResult};
pub use loan::{ExtraFrequency, LoanTerms};
pub use amortization::{compute_periodic_payment, generate_schedule, PeriodRecord, Schedule, YearSummary};
pub use comparison::{ComparativeProjector, ComparisonResult, CostModel, ProjectionConfig, ProjectionYear};
pub use scenario::{ComparisonScenario, ScenarioRunner};
