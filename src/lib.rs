//! Interactive deployer for a single pre-compiled contract.
//!
//! Deploys the configured contract artifact from a local key, then lets the
//! operator call its `start`, `stop` and `withdraw` functions with fresh gas
//! estimates, explicit cost confirmation and bounded waits on every RPC call.

pub mod types; // Domain types and the error enum shared by all modules.
pub mod config; // TOML configuration and environment overrides.
pub mod client; // RPC client trait, ethers implementation and bounded waits.
pub mod gas; // Retry policy, fee estimation and preflight checks.
pub mod contract; // Contract artifact loading and call encoding.
pub mod session; // Signing session and the local sequence counter.
pub mod deploy; // Contract-creation action.
pub mod interact; // Function-call action and failure classification.
pub mod console; // Menus, spinners and operator-facing text.
pub mod app; // The end-to-end interactive workflow.

// Re-export commonly used types for easier access.
pub use app::App;
pub use config::Config;
pub use types::*;
