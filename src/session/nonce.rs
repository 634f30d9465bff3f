use crate::types::DeployerError;
use ethers::types::U256;
use tracing::debug;

/// Locally tracked next transaction ordinal of the session account.
///
/// Read once from the network, then advanced by exactly one for every
/// submission attempt so calls can be sent back to back without re-querying.
/// A transaction dropped or replaced outside this process makes the counter
/// drift from the network's view; `drift_from` reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceCounter {
    next: u64,
}

impl SequenceCounter {
    /// Start from the network's pending count. Fails if it does not fit in 64 bits.
    pub fn new(start: U256) -> Result<Self, DeployerError> {
        if start > U256::from(u64::MAX) {
            return Err(DeployerError::Rpc(format!(
                "pending nonce {start} does not fit in 64 bits"
            )));
        }
        Ok(Self {
            next: start.as_u64(),
        })
    }

    /// The nonce the next submission will use
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Take the current nonce for a submission and advance the counter.
    /// Not rolled back if the submission later fails.
    pub fn consume(&mut self) -> u64 {
        let nonce = self.next;
        self.next += 1;
        debug!("Consumed nonce {}, next is {}", nonce, self.next);
        nonce
    }

    /// `Some(network)` when the network's pending count disagrees with the counter
    pub fn drift_from(&self, network_pending: U256) -> Option<U256> {
        (network_pending != U256::from(self.next)).then_some(network_pending)
    }
}
