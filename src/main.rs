use anyhow::Context;
use clap::Parser;
use deployer::{
    App, Config,
    app::exit_code,
    client::EthersClient,
    config::resolve_private_key,
    console::{Status, StdinPrompter, failure_line},
    contract::ContractArtifact,
    session::Session,
};
use std::io::StdinLock;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Spinners share stderr with the log output, so routine progress stays at
/// `debug` unless RUST_LOG asks for it.
const DEFAULT_LOG_FILTER: &str = "warn";

/// Deploy the configured contract and manage it interactively.
///
/// The signing key is read from DEPLOYER_PRIVATE_KEY (a .env file in the
/// working directory is honoured).
#[derive(Parser, Debug)]
#[command(name = "contract-deployer", version, about)]
struct Cli {
    /// Path to the TOML configuration file [default: config/default.toml]
    #[arg(long, env = "DEPLOYER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Diagnostics go to stderr so they never interleave with the menus.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut app = match bootstrap(&cli) {
        Ok(app) => app,
        Err(e) => {
            println!("{}", failure_line("Critical error:", format!("{e:#}")));
            std::process::exit(1);
        }
    };

    let result = app.run().await;
    std::process::exit(exit_code(&result));
}

/// Resolve configuration, the contract artifact and the signing session.
fn bootstrap(cli: &Cli) -> anyhow::Result<App<EthersClient, StdinPrompter<StdinLock<'static>>>> {
    let mut config = Config::resolve(cli.config.as_deref())?;
    config.apply_overrides(|key| std::env::var(key).ok())?;
    info!("Deployer starting with config: {:?}", config);

    let artifact = ContractArtifact::load(&config.contract.artifact_path)
        .context("Check that the contract artifact holds a valid ABI and bytecode")?;
    let private_key = resolve_private_key(|key| std::env::var(key).ok())?;

    let status = Status::start("Initializing provider and wallet...");
    let session = match Session::connect(&config.network, &private_key) {
        Ok(session) => session,
        Err(e) => {
            status.stop();
            return Err(e).context("Error initializing provider or wallet");
        }
    };
    status.succeed("Provider and wallet initialized");

    Ok(App::new(session, artifact, config, StdinPrompter::stdin()))
}
