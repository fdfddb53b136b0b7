//! Long-horizon comparison of two financial strategies (buy vs. rent, refinance)

mod cost_model;
mod projector;
mod result;
mod refinance;

pub use cost_model::{CostCurve, CostModel, OwnershipInputs, OwnershipModel, RecurringCost, RentalInputs, RentalModel};
pub use projector::{project, ComparativeProjector, ProjectionConfig};
pub use result::{find_crossings, ComparisonResult, Crossing, ProjectionYear, Strategy};
pub use refinance::{analyze_refinance, RefinanceAnalysis, RefinanceInputs};
