use crate::client::{ChainClient, with_timeout};
use crate::config::Config;
use crate::contract::ContractArtifact;
use crate::gas::GasEstimator;
use crate::types::{DeployerError, DeploymentReceipt, FeeEstimate};
use ethers::types::{Address, Eip1559TransactionRequest, transaction::eip2718::TypedTransaction};
use std::time::Duration;
use tracing::debug;

/// Contract-creation transaction for `artifact`, sent from `from`.
///
/// Without `fees` the request carries only sender and bytecode, which is
/// what the node needs for gas estimation.
pub fn creation_request(
    from: Address,
    artifact: &ContractArtifact,
    fees: Option<&FeeEstimate>,
) -> TypedTransaction {
    let mut request = Eip1559TransactionRequest::new()
        .from(from)
        .data(artifact.bytecode().clone());
    if let Some(fees) = fees {
        request = request
            .gas(fees.gas_limit)
            .max_fee_per_gas(fees.max_fee_per_gas)
            .max_priority_fee_per_gas(fees.max_priority_fee_per_gas);
    }
    request.into()
}

/// Deployment action
pub struct Deployer<'a, C: ?Sized> {
    client: &'a C,
    artifact: &'a ContractArtifact,
    config: &'a Config,
}

impl<'a, C: ChainClient + ?Sized> Deployer<'a, C> {
    pub fn new(client: &'a C, artifact: &'a ContractArtifact, config: &'a Config) -> Self {
        Self {
            client,
            artifact,
            config,
        }
    }

    /// Fresh fee estimate for the creation transaction
    pub async fn estimate(&self) -> Result<FeeEstimate, DeployerError> {
        let request = creation_request(self.client.address(), self.artifact, None);
        GasEstimator::new(self.client, self.config)
            .estimate("deployment", &request)
            .await
    }

    /// Submit the creation transaction with `fees` and wait for confirmation.
    pub async fn deploy(&self, fees: &FeeEstimate) -> Result<DeploymentReceipt, DeployerError> {
        let request = creation_request(self.client.address(), self.artifact, Some(fees));
        let tx_hash = self.client.send_transaction(request).await?;
        debug!("Deployment transaction {:?} submitted", tx_hash);

        self.confirm(tx_hash, self.config.timeouts.receipt()).await
    }

    async fn confirm(
        &self,
        tx_hash: ethers::types::TxHash,
        bound: Duration,
    ) -> Result<DeploymentReceipt, DeployerError> {
        let receipt = with_timeout(
            "deployment confirmation",
            bound,
            self.client.wait_for_receipt(tx_hash),
        )
        .await?;

        if !receipt.success {
            return Err(DeployerError::Reverted { tx_hash });
        }
        let contract_address = receipt.contract_address.ok_or_else(|| {
            DeployerError::Deployment(format!("receipt for {tx_hash:?} has no contract address"))
        })?;

        debug!("Contract deployed at {:?}", contract_address);
        Ok(DeploymentReceipt {
            contract_address,
            tx_hash,
        })
    }
}
