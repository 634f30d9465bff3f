//! Session Module
//!
//! A session is created once at startup and never changes: the network
//! handle, the signing identity and the account address derived from it.
//! The locally tracked sequence counter lives alongside it.

mod nonce;

pub use nonce::SequenceCounter;

use crate::client::{ChainClient, EthersClient};
use crate::config::NetworkConfig;
use crate::types::DeployerError;
use ethers::types::Address;
use std::time::Duration;

pub struct Session<C> {
    client: C,
    address: Address,
    masked_key: String,
}

impl Session<EthersClient> {
    /// Build the provider and wallet from configuration and the signing key
    pub fn connect(network: &NetworkConfig, private_key: &str) -> Result<Self, DeployerError> {
        let client = EthersClient::connect(
            &network.rpc_url,
            network.chain_id,
            Duration::from_millis(network.poll_interval_ms),
            private_key,
        )?;
        Ok(Self::new(client, mask_key(private_key)))
    }
}

impl<C: ChainClient> Session<C> {
    pub fn new(client: C, masked_key: String) -> Self {
        let address = client.address();
        Self {
            client,
            address,
            masked_key,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Signing key reduced to its first and last four characters
    pub fn masked_key(&self) -> &str {
        &self.masked_key
    }
}

/// Keep the first and last four characters of `key`, hiding the rest.
/// Keys of eight characters or fewer are fully hidden.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
