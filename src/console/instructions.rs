use super::Prompter;
use crate::types::DeployerError;
use colored::Colorize;

const INSTRUCTIONS: &str = r#"
  Overview

  This tool deploys the configured contract artifact from your own key and
  then lets you call its start, stop and withdraw functions. Everything runs
  locally; the key never leaves this process and is only used to sign.

  Before you start

  - Set DEPLOYER_PRIVATE_KEY (or put it in .env). Never commit it.
  - Point network.rpc_url at a node you trust, and check network.chain_id.
  - Review the contract source and make sure the artifact was compiled from
    it. Whoever controls the bytecode controls where withdrawn funds go.

  Functions

  - start     enables the contract
  - stop      disables the contract until start is called again
  - withdraw  sends the contract's ETH balance to the owner; skipped when the
              contract holds nothing

  Gas

  Fee caps come from the node's current fee data. The gas limit is the node's
  estimate multiplied by gas.limit_multiplier_percent. Deployment shows its
  worst-case cost and asks for confirmation first; function calls are sent
  as soon as they are selected.

  Troubleshooting

  - "Insufficient ETH for gas fees": fund the deployer address.
  - "Contract balance is 0": send ETH to the contract address first.
  - Timeouts: the transaction may still be mined; check the explorer link
    before retrying, since the nonce has already been used.
"#;

/// Print the usage screen and wait for the operator to go back
pub fn show_instructions<P: Prompter + ?Sized>(prompter: &mut P) -> Result<(), DeployerError> {
    println!("\n{}", "Usage Instructions".bold().cyan());
    println!("{}", "=".repeat(72).cyan());
    println!("{INSTRUCTIONS}");
    println!("{}", "=".repeat(72).cyan());
    prompter.select("Return to the main menu?", &["Back".to_string()])?;
    Ok(())
}
