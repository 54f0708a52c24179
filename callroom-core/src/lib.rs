pub mod billing;
pub mod model;
pub mod utils;

pub use billing::{BillingSnapshot, Meter, cost_for};
pub use model::*;
