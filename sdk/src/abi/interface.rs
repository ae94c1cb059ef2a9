//! Contract interface descriptions and call encoding.
//!
//! Interface descriptions arrive as parsed JSON records — an external
//! collaborator handles transport and parsing; this module only consumes
//! the records, resolves their type strings, and builds call data:
//! a 4-byte Keccak-256 selector over the canonical signature followed by
//! the ABI-encoded arguments.

use serde::Deserialize;

use crate::abi::codec::{self, AbiValue};
use crate::abi::types::{AbiError, AbiType};
use crate::crypto::hash::keccak256;

// ---------------------------------------------------------------------------
// Interface description records
// ---------------------------------------------------------------------------

/// One named, typed parameter of an interface entry.
#[derive(Debug, Clone, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// One entry of a contract interface description.
#[derive(Debug, Clone, Deserialize)]
pub struct AbiEntry {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub entry_type: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
}

// ---------------------------------------------------------------------------
// AbiFunction
// ---------------------------------------------------------------------------

/// A resolved callable function: name plus concrete input/output types.
#[derive(Debug, Clone)]
pub struct AbiFunction {
    name: String,
    inputs: Vec<AbiType>,
    outputs: Vec<AbiType>,
}

impl AbiFunction {
    /// Resolves an interface entry into a callable function. Only entries
    /// of type `"function"` qualify; every type string must resolve.
    pub fn from_entry(entry: &AbiEntry) -> Result<Self, AbiError> {
        if entry.entry_type != "function" {
            return Err(AbiError::NotAFunction(entry.name.clone()));
        }
        let resolve_all = |params: &[AbiParam]| {
            params
                .iter()
                .map(|param| AbiType::resolve(&param.type_name))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(Self {
            name: entry.name.clone(),
            inputs: resolve_all(&entry.inputs)?,
            outputs: resolve_all(&entry.outputs)?,
        })
    }

    /// Direct construction from a name and pre-resolved types.
    pub fn new(name: impl Into<String>, inputs: Vec<AbiType>, outputs: Vec<AbiType>) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[AbiType] {
        &self.inputs
    }

    /// The canonical signature the selector is hashed over, e.g.
    /// `baz(uint32,bool)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.inputs.iter().map(AbiType::canonical_name).collect();
        format!("{}({})", self.name, params.join(","))
    }

    /// First four bytes of the Keccak-256 of the signature.
    pub fn selector(&self) -> [u8; 4] {
        let digest = keccak256(self.signature().as_bytes());
        [digest[0], digest[1], digest[2], digest[3]]
    }

    /// Builds the full call data: selector followed by encoded arguments.
    pub fn encode_call(&self, args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
        let mut out = self.selector().to_vec();
        out.extend(codec::encode_arguments(&self.inputs, args)?);
        Ok(out)
    }

    /// Decodes a return-data blob against the declared output types.
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        codec::decode_arguments(&self.outputs, data)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn function(name: &str, inputs: &[&str]) -> AbiFunction {
        AbiFunction::new(
            name,
            inputs.iter().map(|n| AbiType::resolve(n).unwrap()).collect(),
            vec![],
        )
    }

    // -- Selectors from the Solidity ABI docs' worked examples --------------

    #[test]
    fn known_selectors() {
        assert_eq!(
            function("baz", &["uint32", "bool"]).selector(),
            [0xcd, 0xcd, 0x77, 0xc0]
        );
        assert_eq!(
            function("bar", &["bytes3[2]"]).selector(),
            [0xfc, 0xe3, 0x53, 0xf6]
        );
        assert_eq!(
            function("sam", &["bytes", "bool", "uint256[]"]).selector(),
            [0xa5, 0x64, 0x3b, 0xf2]
        );
        assert_eq!(
            function("f", &["uint256", "uint32[]", "bytes10", "bytes"]).selector(),
            [0x8b, 0xe6, 0x52, 0x46]
        );
    }

    #[test]
    fn signature_uses_canonical_names() {
        // "uint" must canonicalize to uint256 in the signature.
        assert_eq!(
            function("transfer", &["address", "uint"]).signature(),
            "transfer(address,uint256)"
        );
    }

    #[test]
    fn encode_call_prefixes_the_selector() {
        let f = function("baz", &["uint32", "bool"]);
        let data = f
            .encode_call(&[AbiValue::uint(69), AbiValue::Bool(true)])
            .unwrap();
        assert_eq!(
            hex::encode(&data),
            concat!(
                "cdcd77c0",
                "0000000000000000000000000000000000000000000000000000000000000045",
                "0000000000000000000000000000000000000000000000000000000000000001",
            )
        );
    }

    #[test]
    fn encode_call_checks_arity() {
        let f = function("baz", &["uint32", "bool"]);
        assert!(matches!(
            f.encode_call(&[AbiValue::uint(69)]).unwrap_err(),
            AbiError::ArityMismatch {
                expected: 2,
                got: 1
            }
        ));
    }

    // -- Interface description records --------------------------------------

    #[test]
    fn resolves_a_parsed_interface_entry() {
        let json = r#"{
            "type": "function",
            "name": "transfer",
            "inputs": [
                {"name": "recipient", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ],
            "outputs": [{"name": "", "type": "bool"}]
        }"#;
        let entry: AbiEntry = serde_json::from_str(json).unwrap();
        let f = AbiFunction::from_entry(&entry).unwrap();

        assert_eq!(f.signature(), "transfer(address,uint256)");
        // The canonical ERC-20 transfer selector.
        assert_eq!(f.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn non_function_entries_are_rejected() {
        let json = r#"{"type": "event", "name": "Transfer", "inputs": []}"#;
        let entry: AbiEntry = serde_json::from_str(json).unwrap();
        assert!(matches!(
            AbiFunction::from_entry(&entry).unwrap_err(),
            AbiError::NotAFunction(_)
        ));
    }

    #[test]
    fn unresolvable_parameter_type_fails_closed() {
        let json = r#"{
            "type": "function",
            "name": "bad",
            "inputs": [{"name": "x", "type": "uint7"}]
        }"#;
        let entry: AbiEntry = serde_json::from_str(json).unwrap();
        assert!(matches!(
            AbiFunction::from_entry(&entry).unwrap_err(),
            AbiError::UnsupportedType(_)
        ));
    }

    #[test]
    fn decode_output_uses_declared_types() {
        let f = AbiFunction::new(
            "balanceOf",
            vec![AbiType::Address],
            vec![AbiType::Uint(256)],
        );
        let mut word = [0u8; 32];
        word[31] = 42;
        assert_eq!(
            f.decode_output(&word).unwrap(),
            vec![AbiValue::uint(42)]
        );
    }
}
