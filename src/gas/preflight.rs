use crate::client::{ChainClient, with_timeout};
use crate::types::{DeployerError, FeeEstimate};
use ethers::types::{Address, U256};
use std::time::Duration;
use tracing::{info, warn};

/// Compare `balance` against the worst-case cost of `estimate`.
///
/// A balance exactly equal to the required cost is sufficient. On success
/// the required cost is returned for display.
pub fn check_funds(balance: U256, estimate: &FeeEstimate) -> Result<U256, DeployerError> {
    let required = estimate.required_cost();
    if balance < required {
        warn!(
            "Insufficient funds: balance {} wei, required {} wei",
            balance, required
        );
        return Err(DeployerError::InsufficientFunds { balance, required });
    }
    Ok(required)
}

/// Fetch the current balance of `account` and run `check_funds` on it.
pub async fn preflight<C: ChainClient + ?Sized>(
    client: &C,
    account: Address,
    estimate: &FeeEstimate,
    bound: Duration,
) -> Result<U256, DeployerError> {
    let balance = with_timeout("balance", bound, client.get_balance(account)).await?;
    let required = check_funds(balance, estimate)?;
    info!("Preflight passed: balance {} wei covers {} wei", balance, required);
    Ok(required)
}
