//! Contract Interaction Module
//!
//! Calls the allow-listed functions of a deployed contract. Every call runs
//! through the same phases:
//!
//! `MenuDisplayed -> Estimating -> Submitting -> Confirming -> Reporting`
//!
//! and always ends back at the menu. Failures here are recoverable: they are
//! classified and reported, never propagated as fatal errors.

mod caller;


pub use caller::{CallFailure, CallOutcome, CallPhase, FunctionCaller};
