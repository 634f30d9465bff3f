//! Contract Artifact Module
//!
//! Loads the compiled contract (ABI + creation bytecode) the deployer works
//! with and exposes only the allow-listed functions of it.
//!
//! # Artifact format
//! ```json
//! { "abi": [ ... ], "bytecode": "0x6080..." }
//! ```

use crate::types::{ContractFunction, DeployerError};
use ethers::abi::Abi;
use ethers::types::Bytes;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
struct RawArtifact {
    abi: Abi,
    bytecode: String,
}

/// Parsed, validated contract artifact
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    abi: Abi,
    bytecode: Bytes,
}

impl ContractArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DeployerError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| DeployerError::Abi(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, DeployerError> {
        let raw: RawArtifact =
            serde_json::from_str(json).map_err(|e| DeployerError::Abi(e.to_string()))?;

        let bytecode: Bytes = raw
            .bytecode
            .parse()
            .map_err(|e| DeployerError::Abi(format!("invalid bytecode: {e}")))?;
        if bytecode.is_empty() {
            return Err(DeployerError::Abi(
                "artifact contains no creation bytecode; compile the contract first".to_string(),
            ));
        }

        let artifact = Self { abi: raw.abi, bytecode };
        if artifact.callable_functions().is_empty() {
            return Err(DeployerError::Abi(
                "ABI exposes none of start, stop or withdraw".to_string(),
            ));
        }
        Ok(artifact)
    }

    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// Whether the contract accepts plain ETH transfers
    pub fn accepts_ether(&self) -> bool {
        self.abi.receive
    }

    /// Allow-listed functions present in the ABI, in ABI order
    pub fn callable_functions(&self) -> Vec<ContractFunction> {
        self.abi
            .functions()
            .filter_map(|f| f.name.parse::<ContractFunction>().ok())
            .collect()
    }

    /// ABI-encode a call to `function` (all allow-listed functions take no arguments)
    pub fn encode_call(&self, function: ContractFunction) -> Result<Bytes, DeployerError> {
        let encoded = self
            .abi
            .function(function.name())
            .and_then(|f| f.encode_input(&[]))
            .map_err(|e| DeployerError::Abi(format!("cannot encode {function}: {e}")))?;
        Ok(encoded.into())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub const TEST_ABI: &str = r#"[
        {"inputs":[],"name":"start","outputs":[],"stateMutability":"nonpayable","type":"function"},
        {"inputs":[],"name":"stop","outputs":[],"stateMutability":"nonpayable","type":"function"},
        {"inputs":[],"name":"withdraw","outputs":[],"stateMutability":"nonpayable","type":"function"},
        {"inputs":[],"name":"owner","outputs":[{"internalType":"address","name":"","type":"address"}],"stateMutability":"view","type":"function"},
        {"stateMutability":"payable","type":"receive"}
    ]"#;

    pub fn test_artifact() -> ContractArtifact {
        let json = format!(r#"{{"abi": {TEST_ABI}, "bytecode": "0x6080604052348015600e575f80fd5b50"}}"#);
        ContractArtifact::from_json(&json).unwrap()
    }

    #[test]
    fn only_allow_listed_functions_are_callable() {
        let artifact = test_artifact();
        assert_eq!(
            artifact.callable_functions(),
            vec![
                ContractFunction::Start,
                ContractFunction::Stop,
                ContractFunction::Withdraw
            ]
        );
        assert!(artifact.accepts_ether());
    }

    #[test]
    fn encodes_selectors() {
        let artifact = test_artifact();
        // keccak256("start()")[..4]
        assert_eq!(
            artifact.encode_call(ContractFunction::Start).unwrap().to_vec(),
            vec![0xbe, 0x9a, 0x65, 0x55]
        );
        // keccak256("withdraw()")[..4]
        assert_eq!(
            artifact.encode_call(ContractFunction::Withdraw).unwrap().to_vec(),
            vec![0x3c, 0xcf, 0xd6, 0x0b]
        );
    }

    #[test]
    fn empty_bytecode_is_rejected() {
        let json = format!(r#"{{"abi": {TEST_ABI}, "bytecode": "0x"}}"#);
        assert!(matches!(
            ContractArtifact::from_json(&json),
            Err(DeployerError::Abi(_))
        ));
    }

    #[test]
    fn abi_without_allow_listed_functions_is_rejected() {
        let json = r#"{"abi": [{"inputs":[],"name":"ping","outputs":[],"stateMutability":"nonpayable","type":"function"}], "bytecode": "0x6080"}"#;
        assert!(ContractArtifact::from_json(json).is_err());
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(ContractArtifact::from_json("{not json").is_err());
    }
}
