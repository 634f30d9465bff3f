use crate::types::{DeployerError, FeeData, Receipt};
use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, PendingTransaction, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, BlockNumber, TxHash, U256, transaction::eip2718::TypedTransaction},
};
use std::fmt::Display;
use std::time::Duration;
use tracing::debug;

/// The RPC operations the deployment workflow consumes.
///
/// Wire encoding, signing and transport are left to the implementation;
/// callers only decide which calls to make and in what order.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the signing identity
    fn address(&self) -> Address;

    async fn get_balance(&self, address: Address) -> Result<U256, DeployerError>;

    /// Current EIP-1559 fee caps suggested by the node
    async fn get_fee_data(&self) -> Result<FeeData, DeployerError>;

    async fn estimate_gas(&self, tx: &TypedTransaction) -> Result<U256, DeployerError>;

    /// Transaction count of `address` including pending transactions
    async fn get_pending_nonce(&self, address: Address) -> Result<U256, DeployerError>;

    /// Sign and broadcast `tx`, returning as soon as the node accepted it
    async fn send_transaction(&self, tx: TypedTransaction) -> Result<TxHash, DeployerError>;

    /// Poll until `tx_hash` is included. Unbounded; wrap in `with_timeout`.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Receipt, DeployerError>;
}

/// `ChainClient` backed by an ethers HTTP provider and a local wallet
pub struct EthersClient {
    inner: SignerMiddleware<Provider<Http>, LocalWallet>,
}

impl EthersClient {
    /// Build the provider and signer. Performs no network I/O.
    pub fn connect(
        rpc_url: &str,
        chain_id: u64,
        poll_interval: Duration,
        private_key: &str,
    ) -> Result<Self, DeployerError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| DeployerError::Config(format!("invalid RPC URL {rpc_url}: {e}")))?
            .interval(poll_interval);

        let wallet = private_key
            .parse::<LocalWallet>()
            .map_err(|e| DeployerError::Wallet(e.to_string()))?
            .with_chain_id(chain_id);

        debug!("Connected signer {:?} to {}", wallet.address(), rpc_url);
        Ok(Self {
            inner: SignerMiddleware::new(provider, wallet),
        })
    }
}

fn rpc(e: impl Display) -> DeployerError {
    DeployerError::Rpc(e.to_string())
}

#[async_trait]
impl ChainClient for EthersClient {
    fn address(&self) -> Address {
        self.inner.address()
    }

    async fn get_balance(&self, address: Address) -> Result<U256, DeployerError> {
        self.inner.get_balance(address, None).await.map_err(rpc)
    }

    async fn get_fee_data(&self) -> Result<FeeData, DeployerError> {
        let (max_fee_per_gas, max_priority_fee_per_gas) =
            self.inner.estimate_eip1559_fees(None).await.map_err(rpc)?;
        Ok(FeeData {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        })
    }

    async fn estimate_gas(&self, tx: &TypedTransaction) -> Result<U256, DeployerError> {
        self.inner.estimate_gas(tx, None).await.map_err(rpc)
    }

    async fn get_pending_nonce(&self, address: Address) -> Result<U256, DeployerError> {
        self.inner
            .get_transaction_count(address, Some(BlockNumber::Pending.into()))
            .await
            .map_err(rpc)
    }

    async fn send_transaction(&self, tx: TypedTransaction) -> Result<TxHash, DeployerError> {
        let pending = self.inner.send_transaction(tx, None).await.map_err(rpc)?;
        Ok(pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Receipt, DeployerError> {
        let receipt = PendingTransaction::new(tx_hash, self.inner.provider())
            .await
            .map_err(rpc)?
            .ok_or_else(|| {
                DeployerError::Rpc(format!("transaction {tx_hash:?} was dropped from the mempool"))
            })?;

        Ok(Receipt {
            tx_hash: receipt.transaction_hash,
            contract_address: receipt.contract_address,
            success: receipt.status.is_none_or(|status| status.as_u64() == 1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development key (first account of the default test mnemonic)
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn connect_derives_signer_address() {
        let client =
            EthersClient::connect("http://127.0.0.1:8545", 31337, Duration::from_millis(100), DEV_KEY)
                .unwrap();
        assert_eq!(
            client.address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse::<Address>().unwrap()
        );
    }

    #[test]
    fn connect_rejects_malformed_key() {
        let result = EthersClient::connect(
            "http://127.0.0.1:8545",
            1,
            Duration::from_millis(100),
            "YOUR_PRIVATE_KEY",
        );
        assert!(matches!(result, Err(DeployerError::Wallet(_))));
    }

    #[test]
    fn connect_rejects_malformed_url() {
        let result = EthersClient::connect("not a url", 1, Duration::from_millis(100), DEV_KEY);
        assert!(matches!(result, Err(DeployerError::Config(_))));
    }
}
