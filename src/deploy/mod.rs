//! Deployment Module
//!
//! Builds the contract-creation transaction, estimates it, submits it and
//! waits (bounded) for the network to confirm it.

mod deployer;

pub use deployer::{Deployer, creation_request};
