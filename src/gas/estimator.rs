use super::RetryPolicy;
use crate::client::{ChainClient, with_timeout};
use crate::config::Config;
use crate::types::{DeployerError, FeeEstimate};
use ethers::types::{U256, transaction::eip2718::TypedTransaction};
use std::time::Duration;
use tracing::debug;

/// Produces a fresh `FeeEstimate` for a pending transaction.
///
/// Fee caps come straight from the node; the gas limit is the node's
/// estimate scaled by `limit_multiplier_percent`.
pub struct GasEstimator<'a, C: ?Sized> {
    client: &'a C,
    policy: RetryPolicy,
    multiplier_percent: u64,
    fee_timeout: Duration,
    estimate_timeout: Duration,
}

impl<'a, C: ChainClient + ?Sized> GasEstimator<'a, C> {
    pub fn new(client: &'a C, config: &Config) -> Self {
        Self {
            client,
            policy: RetryPolicy::from_config(&config.gas),
            multiplier_percent: config.gas.limit_multiplier_percent,
            fee_timeout: config.timeouts.fee_data(),
            estimate_timeout: config.timeouts.estimate(),
        }
    }

    /// Gas limit to send with: `estimated * multiplier / 100`
    pub fn apply_multiplier(&self, estimated: U256) -> U256 {
        estimated.saturating_mul(U256::from(self.multiplier_percent)) / U256::from(100u64)
    }

    /// Query fee data, then estimate gas for `tx` under the retry policy.
    ///
    /// `target` names the operation in retry warnings and the final error.
    pub async fn estimate(
        &self,
        target: &str,
        tx: &TypedTransaction,
    ) -> Result<FeeEstimate, DeployerError> {
        let fees = with_timeout("fee data", self.fee_timeout, self.client.get_fee_data()).await?;

        let estimated = self
            .policy
            .run(target, || {
                with_timeout("gas estimate", self.estimate_timeout, self.client.estimate_gas(tx))
            })
            .await?;

        let estimate = FeeEstimate {
            max_fee_per_gas: fees.max_fee_per_gas,
            max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
            gas_limit: self.apply_multiplier(estimated),
        };
        debug!(
            "Estimated {} gas for {} (limit {})",
            estimated, target, estimate.gas_limit
        );
        Ok(estimate)
    }
}
