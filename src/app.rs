//! Workflow Module
//!
//! Drives the operator through the whole sequence:
//! 1. Top-level menu (Deploy / Instructions)
//! 2. Balance check, gas estimation and preflight
//! 3. Cost confirmation
//! 4. Deployment and bounded wait for confirmation
//! 5. Interaction loop over the allow-listed functions until Exit
//!
//! Steps 2-4 are fatal on failure: the error is reported here and returned
//! so the process can exit with status 1. Failures inside step 5 are
//! reported and the menu is shown again.

use crate::{
    client::{ChainClient, with_timeout},
    config::{Config, NetworkConfig},
    console::{self, Prompter, Status, failure_line, highlight},
    contract::ContractArtifact,
    deploy::Deployer,
    gas::preflight,
    interact::{CallFailure, CallOutcome, CallPhase, FunctionCaller},
    session::{SequenceCounter, Session},
    types::{ContractFunction, DeployerError, DeploymentReceipt, FailureKind, FeeEstimate},
};
use colored::Colorize;
use ethers::types::{Address, TxHash, U256};
use ethers::utils::{format_ether, format_units, to_checksum};
use tracing::{error, info};

/// Process exit status for a finished workflow
pub fn exit_code(result: &Result<(), DeployerError>) -> i32 {
    if result.is_ok() { 0 } else { 1 }
}

pub struct App<C, P> {
    session: Session<C>,
    artifact: ContractArtifact,
    config: Config,
    prompter: P,
}

impl<C: ChainClient, P: Prompter> App<C, P> {
    pub fn new(session: Session<C>, artifact: ContractArtifact, config: Config, prompter: P) -> Self {
        Self {
            session,
            artifact,
            config,
            prompter,
        }
    }

    /// Run until the operator exits or a fatal step fails.
    pub async fn run(&mut self) -> Result<(), DeployerError> {
        let result = self.run_menus().await;
        match &result {
            // prompt failures are the only errors not already reported by a step
            Err(e @ DeployerError::Prompt(_)) => {
                println!("{}", failure_line("Critical error:", e));
            }
            Err(e) => error!("Workflow halted: {}", e),
            Ok(()) => info!("Workflow finished"),
        }
        result
    }

    async fn run_menus(&mut self) -> Result<(), DeployerError> {
        let choices = ["1. Deploy".to_string(), "2. Instructions".to_string()];
        loop {
            match self.prompter.select("Select an action:", &choices)? {
                0 => {
                    if let Some(deployment) = self.deploy().await? {
                        return self.interact(deployment).await;
                    }
                }
                _ => console::show_instructions(&mut self.prompter)?,
            }
        }
    }

    /// Steps 2-4. `Ok(None)` when the operator declined the cost.
    async fn deploy(&mut self) -> Result<Option<DeploymentReceipt>, DeployerError> {
        let client = self.session.client();
        let address = self.session.address();
        let timeouts = &self.config.timeouts;

        println!("Starting smart contract deployment");
        println!("Private key: {}", self.session.masked_key());
        println!("Deployer address: {}", to_checksum(&address, None));
        println!("{}", network_line(&self.config.network));

        let status = Status::start("Checking balance...");
        match with_timeout("balance", timeouts.balance(), client.get_balance(address)).await {
            Ok(balance) => status.succeed(format!("Balance: {} ETH", format_ether(balance))),
            Err(e) => return Err(fatal(status, "Error retrieving balance:", None, e)),
        }

        let status = Status::start("Retrieving current gas price and estimating gas...");
        let deployer = Deployer::new(client, &self.artifact, &self.config);
        let fees = match deployer.estimate().await {
            Ok(fees) => fees,
            Err(e) => {
                return Err(fatal(
                    status,
                    "Error retrieving gas price or estimating gas:",
                    Some("Check RPC provider or contract logic."),
                    e,
                ));
            }
        };
        let required = match preflight(client, address, &fees, timeouts.balance()).await {
            Ok(required) => required,
            Err(DeployerError::InsufficientFunds { balance, required }) => {
                status.fail("Error: Insufficient ETH for gas fees".red().to_string());
                println!("Balance: {} ETH", format_ether(balance));
                println!("Required gas cost: {} ETH", format_ether(required));
                print_funding_hint(address);
                return Err(DeployerError::InsufficientFunds { balance, required });
            }
            Err(e) => {
                return Err(fatal(
                    status,
                    "Error retrieving gas price or estimating gas:",
                    Some("Check RPC provider or contract logic."),
                    e,
                ));
            }
        };
        status.succeed(format!("Gas parameters: {}", describe_fees(&fees)));

        println!(
            "Estimated deployment cost: {}",
            highlight(format!("{} ETH", format_ether(required)))
        );
        let confirm = ["OK".to_string(), "Cancel".to_string()];
        if self.prompter.select("Press OK to confirm deployment:", &confirm)? != 0 {
            println!("Deployment cancelled");
            return Ok(None);
        }

        let status = Status::start("Deploying contract...");
        match deployer.deploy(&fees).await {
            Ok(receipt) => {
                status.succeed(format!(
                    "Contract deployed: Address: {}, Transaction hash: {:?}",
                    self.address_link(receipt.contract_address),
                    receipt.tx_hash
                ));
                if self.artifact.accepts_ether() {
                    println!(
                        "Fund the contract by sending ETH to {}",
                        highlight(to_checksum(&receipt.contract_address, None))
                    );
                }
                Ok(Some(receipt))
            }
            Err(e) => Err(fatal(
                status,
                "Deployment error:",
                Some("Check bytecode, ABI, or ensure sufficient ETH for gas."),
                e,
            )),
        }
    }

    /// Step 5
    async fn interact(&mut self, deployment: DeploymentReceipt) -> Result<(), DeployerError> {
        let client = self.session.client();
        let address = self.session.address();
        let status = Status::start("Reading account nonce...");
        let counter = with_timeout(
            "pending nonce",
            self.config.timeouts.nonce(),
            client.get_pending_nonce(address),
        )
        .await
        .and_then(SequenceCounter::new);
        let mut counter = match counter {
            Ok(counter) => counter,
            Err(e) => return Err(fatal(status, "Error reading account nonce:", None, e)),
        };
        status.stop();
        info!("Sequence counter starts at {}", counter.peek());

        let caller = FunctionCaller::new(
            client,
            &self.artifact,
            &self.config,
            deployment.contract_address,
        );
        let functions = self.artifact.callable_functions();
        let mut choices: Vec<String> = functions
            .iter()
            .enumerate()
            .map(|(i, f)| format!("{}. {}", i + 1, f))
            .collect();
        choices.push("Exit".to_string());

        loop {
            let index = self.prompter.select("Select a function to call:", &choices)?;
            let Some(&function) = functions.get(index) else {
                println!("Program terminated");
                return Ok(());
            };

            let status = Status::start(format!("Calling function {function}..."));
            let outcome = caller
                .call(&mut counter, function, |phase| {
                    if let Some(message) = phase_message(function, phase) {
                        status.update(message);
                    }
                })
                .await;

            match outcome {
                CallOutcome::Confirmed(receipt) => {
                    status.succeed(format!("Transaction confirmed: {:?}", receipt.tx_hash));
                }
                CallOutcome::SkippedZeroBalance => {
                    status.fail(
                        "Contract balance is 0, withdraw function will not be executed"
                            .red()
                            .to_string(),
                    );
                }
                CallOutcome::Failed(failure) => {
                    self.report_failure(status, &failure, caller.contract());
                    self.report_drift(&counter).await;
                }
            }
        }
    }

    fn report_failure(&self, status: Status, failure: &CallFailure, contract: Address) {
        match failure.kind {
            FailureKind::InsufficientFunds => {
                status.fail("Error: Insufficient ETH for gas fees".red().to_string());
                print_funding_hint(self.session.address());
            }
            FailureKind::ZeroContractBalance => {
                status.fail("Error: Contract balance is 0".red().to_string());
                println!(
                    "Send ETH to contract address {} to execute start or withdraw.",
                    to_checksum(&contract, None)
                );
            }
            FailureKind::Other => {
                status.fail(failure_line("Function call error:", &failure.error));
                if let Some(tx_hash) = failure.tx_hash {
                    println!("Check transaction logs on {}", self.tx_link(tx_hash));
                }
                println!("Possible causes:");
                println!("- Error in contract logic.");
                println!("- Insufficient gas for function execution.");
            }
        }
    }

    /// Show the local counter next to the network's view when they disagree
    async fn report_drift(&self, counter: &SequenceCounter) {
        let pending = with_timeout(
            "pending nonce",
            self.config.timeouts.nonce(),
            self.session.client().get_pending_nonce(self.session.address()),
        )
        .await;
        if let Some(note) = pending.ok().and_then(|pending| drift_note(counter, pending)) {
            println!("{}", note.yellow());
        }
    }

    fn explorer(&self) -> &str {
        self.config.network.explorer_url.trim_end_matches('/')
    }

    fn address_link(&self, address: Address) -> String {
        format!("{}/address/{}", self.explorer(), to_checksum(&address, None))
    }

    fn tx_link(&self, tx_hash: TxHash) -> String {
        format!("{}/tx/{:?}", self.explorer(), tx_hash)
    }
}

/// Report a fatal step failure and hand the error back for propagation
fn fatal(
    status: Status,
    label: &str,
    guidance: Option<&str>,
    error: DeployerError,
) -> DeployerError {
    status.fail(failure_line(label, &error));
    if let Some(guidance) = guidance {
        println!("{guidance}");
    }
    error
}

fn network_line(network: &NetworkConfig) -> String {
    format!("Network: {} (chain {})", network.rpc_url, network.chain_id)
}

fn drift_note(counter: &SequenceCounter, network_pending: U256) -> Option<String> {
    counter.drift_from(network_pending).map(|network| {
        format!(
            "Note: next local nonce is {}, network reports {} pending",
            counter.peek(),
            network
        )
    })
}

fn print_funding_hint(address: Address) {
    println!(
        "Fund your wallet with ETH for address {} via exchanges or other sources.",
        to_checksum(&address, None)
    );
}

fn gwei(value: U256) -> String {
    format_units(value, "gwei").unwrap_or_else(|_| format!("{value} wei"))
}

fn describe_fees(fees: &FeeEstimate) -> String {
    format!(
        "maxFeePerGas: {} Gwei, maxPriorityFeePerGas: {} Gwei, gasLimit: {}",
        gwei(fees.max_fee_per_gas),
        gwei(fees.max_priority_fee_per_gas),
        fees.gas_limit
    )
}

fn phase_message(function: ContractFunction, phase: CallPhase) -> Option<String> {
    match phase {
        CallPhase::Estimating => Some(format!("Estimating gas for {function}...")),
        CallPhase::Submitting => Some(format!("Submitting {function}...")),
        CallPhase::Confirming => Some("Waiting for transaction confirmation...".to_string()),
        CallPhase::Reporting => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{GWEI, MockClient};
    use crate::console::ScriptedPrompter;
    use crate::contract::tests::test_artifact;
    use crate::session::mask_key;
    use crate::types::FeeData;
    use ethers::utils::parse_ether;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    const FUNCTION_MENU: &str = "Select a function to call:";

    fn app(client: MockClient, config: Config, answers: &[&str]) -> App<MockClient, ScriptedPrompter> {
        let session = Session::new(client, mask_key("0x0123456789abcdef0123"));
        App::new(session, test_artifact(), config, ScriptedPrompter::new(answers))
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.gas.retry_delay_ms = 0;
        config
    }

    fn menus_shown(app: &App<MockClient, ScriptedPrompter>, message: &str) -> usize {
        app.prompter.shown.iter().filter(|m| *m == message).count()
    }

    #[tokio::test(start_paused = true)]
    async fn deploy_then_call_then_exit() {
        let mut app = app(MockClient::default(), config(), &["Deploy", "OK", "start", "stop", "Exit"]);

        let result = app.run().await;

        assert!(result.is_ok());
        assert_eq!(exit_code(&result), 0);
        let sent = app.session.client().sent();
        assert_eq!(sent.len(), 3);
        assert!(sent[0].to().is_none());
        assert_eq!(sent[1].nonce(), Some(&U256::from(7u64)));
        assert_eq!(sent[2].nonce(), Some(&U256::from(8u64)));
        assert_eq!(menus_shown(&app, FUNCTION_MENU), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn insufficient_balance_halts_before_confirmation() {
        let client = MockClient {
            fee_data: FeeData {
                max_fee_per_gas: U256::from(10 * GWEI),
                max_priority_fee_per_gas: U256::from(GWEI),
            },
            ..MockClient::default()
        };
        client.set_balance(client.address, parse_ether("0.001").unwrap());
        client.script_estimates(vec![Ok(100_000)]);
        let mut config = config();
        config.gas.limit_multiplier_percent = 200;
        let mut app = app(client, config, &["Deploy"]);

        let result = app.run().await;

        match &result {
            Err(DeployerError::InsufficientFunds { balance, required }) => {
                assert_eq!(*balance, parse_ether("0.001").unwrap());
                assert_eq!(*required, parse_ether("0.002").unwrap());
            }
            other => panic!("expected insufficient funds, got {other:?}"),
        }
        assert_eq!(exit_code(&result), 1);
        assert!(app.session.client().sent().is_empty());
        assert_eq!(menus_shown(&app, "Press OK to confirm deployment:"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn deployment_timeout_is_fatal_and_skips_function_menu() {
        let client = MockClient {
            receipt_delay: Duration::from_secs(120),
            ..MockClient::default()
        };
        let mut app = app(client, config(), &["Deploy", "OK", "start"]);

        let result = app.run().await;

        assert!(matches!(
            result,
            Err(DeployerError::Timeout { operation: "deployment confirmation", after_ms: 60_000 })
        ));
        assert_eq!(exit_code(&result), 1);
        assert_eq!(menus_shown(&app, FUNCTION_MENU), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn withdraw_on_empty_contract_returns_to_menu() {
        let mut app = app(MockClient::default(), config(), &["Deploy", "OK", "withdraw", "Exit"]);

        let result = app.run().await;

        assert!(result.is_ok());
        // only the deployment went out
        assert_eq!(app.session.client().sent().len(), 1);
        assert_eq!(menus_shown(&app, FUNCTION_MENU), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn call_failure_is_recoverable() {
        let client = MockClient::default();
        // deployment estimate succeeds, all three estimates for `start` fail
        client.script_estimates(vec![Ok(90_000), Err("boom"), Err("boom"), Err("boom")]);
        let mut app = app(client, config(), &["Deploy", "OK", "start", "stop", "Exit"]);

        let result = app.run().await;

        assert!(result.is_ok());
        let sent = app.session.client().sent();
        assert_eq!(sent.len(), 2);
        // the failed `start` never reached submission, so `stop` gets nonce 7
        assert_eq!(sent[1].nonce(), Some(&U256::from(7u64)));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_submission_reports_nonce_drift() {
        let client = MockClient {
            send_error_from: 1,
            ..MockClient::default()
        };
        *client.send_error.lock().unwrap() = Some("nonce too low".to_string());
        let mut app = app(client, config(), &["Deploy", "OK", "start", "Exit"]);

        let result = app.run().await;

        assert!(result.is_ok());
        let client = app.session.client();
        let sent = client.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].nonce(), Some(&U256::from(7u64)));
        // once to seed the counter, once more after the failed call
        assert_eq!(client.nonce_calls.load(Ordering::SeqCst), 2);
        assert_eq!(menus_shown(&app, FUNCTION_MENU), 2);

        let mut counter = SequenceCounter::new(client.pending_nonce).unwrap();
        counter.consume();
        assert_eq!(
            drift_note(&counter, client.pending_nonce).as_deref(),
            Some("Note: next local nonce is 8, network reports 7 pending")
        );
        assert_eq!(drift_note(&counter, U256::from(8u64)), None);
    }

    #[test]
    fn network_is_shown_before_confirmation() {
        let mut network = NetworkConfig::default();
        network.rpc_url = "https://sepolia.example".to_string();
        network.chain_id = 11_155_111;
        assert_eq!(
            network_line(&network),
            "Network: https://sepolia.example (chain 11155111)"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn instructions_and_cancel_return_to_top_menu() {
        let mut app = app(
            MockClient::default(),
            config(),
            &["Instructions", "Back", "Deploy", "Cancel", "Deploy", "OK", "Exit"],
        );

        let result = app.run().await;

        assert!(result.is_ok());
        assert_eq!(menus_shown(&app, "Select an action:"), 3);
        assert_eq!(menus_shown(&app, "Return to the main menu?"), 1);
        assert_eq!(app.session.client().sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_is_a_critical_error() {
        let mut app = app(MockClient::default(), config(), &[]);
        let result = app.run().await;
        assert!(matches!(result, Err(DeployerError::Prompt(_))));
    }

    #[test]
    fn fee_summary_is_in_gwei() {
        let fees = FeeEstimate {
            max_fee_per_gas: U256::from(25 * GWEI),
            max_priority_fee_per_gas: U256::from(GWEI),
            gas_limit: U256::from(63_000u64),
        };
        let text = describe_fees(&fees);
        assert!(text.contains("maxFeePerGas: 25.000000000 Gwei"));
        assert!(text.contains("gasLimit: 63000"));
    }
}
