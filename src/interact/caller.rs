use crate::client::{ChainClient, with_timeout};
use crate::config::Config;
use crate::contract::ContractArtifact;
use crate::gas::GasEstimator;
use crate::session::SequenceCounter;
use crate::types::{CallReceipt, ContractFunction, DeployerError, FailureKind};
use ethers::types::{
    Address, Eip1559TransactionRequest, TxHash, transaction::eip2718::TypedTransaction,
};
use tracing::{debug, warn};

/// Where a function call currently is. The menu itself is owned by the
/// caller of `FunctionCaller::call`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Estimating,
    Submitting,
    Confirming,
    Reporting,
}

/// A failed call, classified for operator guidance
#[derive(Debug)]
pub struct CallFailure {
    pub kind: FailureKind,
    pub error: DeployerError,
    /// Set when the transaction had already been broadcast
    pub tx_hash: Option<TxHash>,
}

impl CallFailure {
    fn with_tx(mut self, tx_hash: TxHash) -> Self {
        self.tx_hash = Some(tx_hash);
        self
    }
}

impl From<DeployerError> for CallFailure {
    fn from(error: DeployerError) -> Self {
        Self {
            kind: FailureKind::classify(&error.to_string()),
            tx_hash: error.tx_hash(),
            error,
        }
    }
}

#[derive(Debug)]
pub enum CallOutcome {
    Confirmed(CallReceipt),
    /// `withdraw` on a contract holding no ETH; nothing was sent
    SkippedZeroBalance,
    Failed(CallFailure),
}

/// Function-call action against one deployed contract
pub struct FunctionCaller<'a, C: ?Sized> {
    client: &'a C,
    artifact: &'a ContractArtifact,
    config: &'a Config,
    contract: Address,
}

impl<'a, C: ChainClient + ?Sized> FunctionCaller<'a, C> {
    pub fn new(
        client: &'a C,
        artifact: &'a ContractArtifact,
        config: &'a Config,
        contract: Address,
    ) -> Self {
        Self {
            client,
            artifact,
            config,
            contract,
        }
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Run `function` to completion. `on_phase` is told about each phase
    /// transition so the caller can keep the operator informed.
    pub async fn call<F>(
        &self,
        counter: &mut SequenceCounter,
        function: ContractFunction,
        mut on_phase: F,
    ) -> CallOutcome
    where
        F: FnMut(CallPhase),
    {
        let outcome = match self.try_call(counter, function, &mut on_phase).await {
            Ok(Some(receipt)) => CallOutcome::Confirmed(receipt),
            Ok(None) => CallOutcome::SkippedZeroBalance,
            Err(failure) => {
                warn!("Call to {} failed: {}", function, failure.error);
                CallOutcome::Failed(failure)
            }
        };
        on_phase(CallPhase::Reporting);
        outcome
    }

    async fn try_call<F>(
        &self,
        counter: &mut SequenceCounter,
        function: ContractFunction,
        on_phase: &mut F,
    ) -> Result<Option<CallReceipt>, CallFailure>
    where
        F: FnMut(CallPhase),
    {
        let timeouts = &self.config.timeouts;

        if function == ContractFunction::Withdraw {
            let balance = with_timeout(
                "contract balance",
                timeouts.balance(),
                self.client.get_balance(self.contract),
            )
            .await?;
            if balance.is_zero() {
                debug!("Contract balance is 0, skipping withdraw");
                return Ok(None);
            }
            debug!("Contract balance {} wei, executing withdraw", balance);
        }

        on_phase(CallPhase::Estimating);
        let request = Eip1559TransactionRequest::new()
            .from(self.client.address())
            .to(self.contract)
            .data(self.artifact.encode_call(function)?);
        let unsigned: TypedTransaction = request.clone().into();
        let fees = GasEstimator::new(self.client, self.config)
            .estimate(function.name(), &unsigned)
            .await?;

        on_phase(CallPhase::Submitting);
        let nonce = counter.consume();
        let request = request
            .nonce(nonce)
            .gas(fees.gas_limit)
            .max_fee_per_gas(fees.max_fee_per_gas)
            .max_priority_fee_per_gas(fees.max_priority_fee_per_gas);
        let tx_hash = self.client.send_transaction(request.into()).await?;
        debug!("{} submitted as {:?} (nonce {})", function, tx_hash, nonce);

        on_phase(CallPhase::Confirming);
        let receipt = with_timeout(
            "transaction confirmation",
            timeouts.receipt(),
            self.client.wait_for_receipt(tx_hash),
        )
        .await
        .map_err(|e| CallFailure::from(e).with_tx(tx_hash))?;

        if !receipt.success {
            return Err(DeployerError::Reverted { tx_hash }.into());
        }
        Ok(Some(CallReceipt {
            function,
            tx_hash: receipt.tx_hash,
            nonce,
        }))
    }
}
