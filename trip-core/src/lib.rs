pub mod calculations;
pub mod models;

pub use calculations::{BudgetError, BudgetEstimator};
pub use models::*;
