//! Loan inputs: terms, extra payment rules and CSV batch loading

mod terms;
pub mod loader;

pub use terms::{ExtraFrequency, LoanTerms, LumpSum};
pub use loader::{load_loans, load_loans_from_reader, NamedLoan};
