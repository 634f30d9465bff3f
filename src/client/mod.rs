//! Chain Client Module
//!
//! This module wraps the JSON-RPC endpoint behind a small trait:
//! - `ChainClient`: the handful of RPC operations the workflow consumes
//! - `EthersClient`: the production implementation over ethers-rs
//! - `with_timeout`: bounds how long any single call is waited on

mod bounded;
mod provider;

#[cfg(test)]
pub(crate) mod mock;

pub use bounded::with_timeout;
pub use provider::{ChainClient, EthersClient};
