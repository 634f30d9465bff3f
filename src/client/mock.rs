//! Scripted in-memory `ChainClient` for tests.

use super::ChainClient;
use crate::types::{DeployerError, FeeData, Receipt};
use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256, transaction::eip2718::TypedTransaction};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const GWEI: u64 = 1_000_000_000;

pub struct MockClient {
    pub address: Address,
    pub deployed_address: Address,
    pub balances: Mutex<HashMap<Address, U256>>,
    pub fee_data: FeeData,
    /// Consumed front to back; once empty every estimate returns `default_gas`
    pub estimates: Mutex<VecDeque<Result<U256, String>>>,
    pub default_gas: U256,
    pub pending_nonce: U256,
    pub send_error: Mutex<Option<String>>,
    /// Sends before this index succeed even when `send_error` is set
    pub send_error_from: usize,
    pub receipt_delay: Duration,
    pub receipt_success: bool,
    pub sent: Mutex<Vec<TypedTransaction>>,
    pub estimate_calls: AtomicUsize,
    pub balance_calls: AtomicUsize,
    pub nonce_calls: AtomicUsize,
}

impl Default for MockClient {
    fn default() -> Self {
        let address = Address::from_low_u64_be(0xdead);
        let mut balances = HashMap::new();
        balances.insert(address, U256::exp10(18));
        Self {
            address,
            deployed_address: Address::from_low_u64_be(0xc0de),
            balances: Mutex::new(balances),
            fee_data: FeeData {
                max_fee_per_gas: U256::from(20 * GWEI),
                max_priority_fee_per_gas: U256::from(2 * GWEI),
            },
            estimates: Mutex::new(VecDeque::new()),
            default_gas: U256::from(50_000u64),
            pending_nonce: U256::from(7u64),
            send_error: Mutex::new(None),
            send_error_from: 0,
            receipt_delay: Duration::from_millis(10),
            receipt_success: true,
            sent: Mutex::new(Vec::new()),
            estimate_calls: AtomicUsize::new(0),
            balance_calls: AtomicUsize::new(0),
            nonce_calls: AtomicUsize::new(0),
        }
    }
}

impl MockClient {
    pub fn set_balance(&self, address: Address, wei: U256) {
        self.balances.lock().unwrap().insert(address, wei);
    }

    pub fn script_estimates(&self, script: Vec<Result<u64, &str>>) {
        let mut estimates = self.estimates.lock().unwrap();
        estimates.clear();
        estimates.extend(
            script
                .into_iter()
                .map(|r| r.map(U256::from).map_err(str::to_string)),
        );
    }

    pub fn sent(&self) -> Vec<TypedTransaction> {
        self.sent.lock().unwrap().clone()
    }

    fn hash_for(index: usize) -> TxHash {
        TxHash::from_low_u64_be(index as u64 + 1)
    }
}

#[async_trait]
impl ChainClient for MockClient {
    fn address(&self) -> Address {
        self.address
    }

    async fn get_balance(&self, address: Address) -> Result<U256, DeployerError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or_default())
    }

    async fn get_fee_data(&self) -> Result<FeeData, DeployerError> {
        Ok(self.fee_data)
    }

    async fn estimate_gas(&self, _tx: &TypedTransaction) -> Result<U256, DeployerError> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        match self.estimates.lock().unwrap().pop_front() {
            Some(Ok(gas)) => Ok(gas),
            Some(Err(message)) => Err(DeployerError::Rpc(message)),
            None => Ok(self.default_gas),
        }
    }

    async fn get_pending_nonce(&self, _address: Address) -> Result<U256, DeployerError> {
        self.nonce_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pending_nonce)
    }

    async fn send_transaction(&self, tx: TypedTransaction) -> Result<TxHash, DeployerError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(tx);
        if sent.len() > self.send_error_from {
            if let Some(message) = self.send_error.lock().unwrap().clone() {
                return Err(DeployerError::Rpc(message));
            }
        }
        Ok(Self::hash_for(sent.len() - 1))
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Receipt, DeployerError> {
        tokio::time::sleep(self.receipt_delay).await;
        let index = tx_hash.to_low_u64_be() as usize - 1;
        let is_creation = self
            .sent
            .lock()
            .unwrap()
            .get(index)
            .is_some_and(|tx| tx.to().is_none());
        Ok(Receipt {
            tx_hash,
            contract_address: is_creation.then_some(self.deployed_address),
            success: self.receipt_success,
        })
    }
}
