//! Gas Module
//!
//! Everything needed before a state-changing transaction may be sent:
//! - RetryPolicy: bounded retries for gas estimation
//! - GasEstimator: fee data + estimate + safety multiplier
//! - preflight: refuses to proceed when the account cannot cover the fee

mod estimator;
mod preflight;
mod retry;

pub use estimator::GasEstimator;
pub use preflight::{check_funds, preflight};
pub use retry::RetryPolicy;
