//! Support for the legacy artifact shape

use crate::{
    abi::Abi,
    artifact_output::{BytecodeObject, CompilerInfo, ContractArtifact},
    config::ConflictPolicy,
    error::{Result, SolcError},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An artifact in the legacy shape, keyed by its contract name in [`shim_contracts`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyContractArtifact {
    #[serde(rename = "contract_name")]
    pub contract_name: String,
    pub source_path: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub source_map: Option<String>,
    #[serde(default)]
    pub deployed_source_map: Option<String>,
    #[serde(default, rename = "legacyAST")]
    pub legacy_ast: Option<serde_json::Value>,
    #[serde(default)]
    pub ast: Option<serde_json::Value>,
    #[serde(default)]
    pub abi: Abi,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    /// `0x` prefixed bytecode
    pub bytecode: String,
    /// `0x` prefixed deployed bytecode
    pub deployed_bytecode: String,
    /// Same as `bytecode`
    #[serde(rename = "unlinked_binary")]
    pub unlinked_binary: String,
    pub compiler: CompilerInfo,
    #[serde(default)]
    pub devdoc: serde_json::Value,
    #[serde(default)]
    pub userdoc: serde_json::Value,
}

impl TryFrom<ContractArtifact> for LegacyContractArtifact {
    type Error = SolcError;

    fn try_from(artifact: ContractArtifact) -> Result<Self> {
        let ContractArtifact {
            contract_name,
            abi,
            metadata,
            devdoc,
            userdoc,
            source_path,
            source,
            source_map,
            deployed_source_map,
            ast,
            legacy_ast,
            bytecode,
            deployed_bytecode,
            compiler,
        } = artifact;
        let bytecode = bytecode.resolve()?;
        Ok(LegacyContractArtifact {
            contract_name,
            source_path,
            source,
            source_map,
            deployed_source_map,
            legacy_ast,
            ast,
            abi,
            metadata,
            unlinked_binary: bytecode.clone(),
            bytecode,
            deployed_bytecode: deployed_bytecode.resolve()?,
            compiler,
            devdoc,
            userdoc,
        })
    }
}

/// Either artifact shape
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Artifact {
    Legacy(LegacyContractArtifact),
    Current(ContractArtifact),
}

impl Artifact {
    /// The name of the contract
    pub fn name(&self) -> &str {
        match self {
            Artifact::Legacy(artifact) => &artifact.contract_name,
            Artifact::Current(artifact) => &artifact.contract_name,
        }
    }

    /// Converts the artifact into the legacy shape.
    ///
    /// Bytecode that still carries link references gets its placeholders written, this fails if
    /// a reference points past the end of the bytecode.
    pub fn into_legacy(self) -> Result<LegacyContractArtifact> {
        match self {
            Artifact::Legacy(artifact) => Ok(artifact),
            Artifact::Current(artifact) => artifact.try_into(),
        }
    }
}

impl From<ContractArtifact> for Artifact {
    fn from(artifact: ContractArtifact) -> Self {
        Artifact::Current(artifact)
    }
}

impl From<LegacyContractArtifact> for Artifact {
    fn from(artifact: LegacyContractArtifact) -> Self {
        Artifact::Legacy(artifact)
    }
}

/// Converts all artifacts into the legacy shape, keyed by contract name.
///
/// If two artifacts share a name the `policy` decides whether the later one replaces the earlier.
pub fn shim_contracts<I, A>(
    artifacts: I,
    policy: ConflictPolicy,
) -> Result<BTreeMap<String, LegacyContractArtifact>>
where
    I: IntoIterator<Item = A>,
    A: Into<Artifact>,
{
    let mut contracts = BTreeMap::new();
    for artifact in artifacts {
        let artifact = artifact.into().into_legacy()?;
        if contracts.contains_key(&artifact.contract_name) {
            policy.on_conflict("contract", &artifact.contract_name, SolcError::DuplicateContract)?;
        }
        contracts.insert(artifact.contract_name.clone(), artifact);
    }
    Ok(contracts)
}

/// Shims a single bytecode, see [`BytecodeObject::resolve`]
pub fn shim_bytecode(bytecode: &BytecodeObject) -> Result<String> {
    bytecode.resolve()
}
