use ethers::types::{Address, TxHash, U256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fee parameters for a single state-changing transaction.
///
/// Recomputed before every deployment or function call and never cached,
/// since the fee market moves between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeEstimate {
    /// Maximum total fee per unit of gas (base fee cap)
    pub max_fee_per_gas: U256,
    /// Maximum tip per unit of gas
    pub max_priority_fee_per_gas: U256,
    /// Gas limit after the safety multiplier has been applied
    pub gas_limit: U256,
}

impl FeeEstimate {
    /// Worst-case cost of the transaction: `max_fee_per_gas * gas_limit`
    pub fn required_cost(&self) -> U256 {
        self.max_fee_per_gas.saturating_mul(self.gas_limit)
    }
}

/// Raw fee parameters reported by the node, before any gas estimate exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeData {
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
}

/// What the network reported once a transaction was included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    /// Set only for contract-creation transactions
    pub contract_address: Option<Address>,
    /// `false` when the transaction was included but reverted
    pub success: bool,
}

/// Result of a confirmed contract deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReceipt {
    pub contract_address: Address,
    pub tx_hash: TxHash,
}

/// Result of a confirmed function call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallReceipt {
    pub function: ContractFunction,
    pub tx_hash: TxHash,
    pub nonce: u64,
}

/// The fixed allow-list of callable contract functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractFunction {
    Start,
    Stop,
    Withdraw,
}

impl ContractFunction {
    pub const ALL: [ContractFunction; 3] = [Self::Start, Self::Stop, Self::Withdraw];

    /// Name of the function in the contract ABI
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Withdraw => "withdraw",
        }
    }
}

impl fmt::Display for ContractFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContractFunction {
    type Err = DeployerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| DeployerError::Abi(format!("function `{s}` is not in the allow-list")))
    }
}

/// Everything that can go wrong while deploying or calling the contract.
#[derive(Debug, Error)]
pub enum DeployerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("{0}")]
    Rpc(String),

    #[error("Timeout: no response from provider while waiting for {operation} after {after_ms} ms")]
    Timeout { operation: &'static str, after_ms: u64 },

    #[error("Failed to estimate gas for {target} after {attempts} attempts: {reason}")]
    EstimationFailed {
        target: String,
        attempts: u32,
        reason: String,
    },

    #[error("insufficient funds for gas: balance {balance} wei, required {required} wei")]
    InsufficientFunds { balance: U256, required: U256 },

    #[error("contract artifact error: {0}")]
    Abi(String),

    #[error("deployment error: {0}")]
    Deployment(String),

    #[error("transaction {tx_hash:?} reverted")]
    Reverted { tx_hash: TxHash },

    #[error("prompt error: {0}")]
    Prompt(#[from] std::io::Error),
}

impl DeployerError {
    /// Hash of the transaction the error relates to, when one was broadcast
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Reverted { tx_hash } => Some(*tx_hash),
            _ => None,
        }
    }
}

/// Coarse classification of a failed function call, used to pick the
/// guidance shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InsufficientFunds,
    ZeroContractBalance,
    Other,
}

impl FailureKind {
    /// Classify by substring over the error text. Node error messages are not
    /// structured, so this is the only signal available.
    pub fn classify(message: &str) -> Self {
        if message.contains("insufficient funds") {
            Self::InsufficientFunds
        } else if message.contains("Balance is 0") {
            Self::ZeroContractBalance
        } else {
            Self::Other
        }
    }
}
