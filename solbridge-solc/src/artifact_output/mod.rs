//! Output artifact handling

use crate::{
    abi::{order_abi, Abi},
    artifacts::{
        bytecode::{link_placeholders, LinkReference},
        CompilerOutput, SourceFile,
    },
    error::Result,
    paths::NormalizedSources,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod legacy;
pub use legacy::{shim_contracts, Artifact, LegacyContractArtifact};

/// The name every artifact is stamped with
pub const COMPILER_NAME: &str = "solc";

/// Identity of the compiler that produced an artifact
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerInfo {
    pub name: String,
    pub version: String,
}

impl CompilerInfo {
    pub fn solc(version: impl Into<String>) -> Self {
        Self { name: COMPILER_NAME.to_string(), version: version.into() }
    }
}

/// The bytecode of an artifact.
///
/// Assembled artifacts always carry the resolved `0x` prefixed string. Artifacts that were
/// produced elsewhere may carry the bytes together with their link references instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BytecodeObject {
    /// `0x` prefixed hex, library slots hold placeholders
    Resolved(String),
    /// Hex bytes and the library slots that still need a placeholder
    Unlinked(UnlinkedBytecode),
}

impl BytecodeObject {
    /// Returns the resolved string, if this is already resolved
    pub fn as_resolved(&self) -> Option<&str> {
        match self {
            BytecodeObject::Resolved(s) => Some(s.as_str()),
            BytecodeObject::Unlinked(_) => None,
        }
    }

    /// Returns the `0x` prefixed bytecode with placeholders in all library slots.
    ///
    /// Resolved bytecode is returned as is.
    pub fn resolve(&self) -> Result<String> {
        match self {
            BytecodeObject::Resolved(s) => Ok(s.clone()),
            BytecodeObject::Unlinked(unlinked) => unlinked.resolve(),
        }
    }
}

impl Default for BytecodeObject {
    fn default() -> Self {
        BytecodeObject::Resolved("0x".to_string())
    }
}

impl From<String> for BytecodeObject {
    fn from(s: String) -> Self {
        BytecodeObject::Resolved(s)
    }
}

/// Bytecode as `{ bytes, linkReferences: [{ offsets, name, length }] }`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlinkedBytecode {
    pub bytes: String,
    #[serde(default, deserialize_with = "crate::artifacts::serde_helpers::default_for_null")]
    pub link_references: Vec<UnlinkedReference>,
}

/// All slots of a single library, `offsets` and `length` are in bytes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlinkedReference {
    #[serde(default)]
    pub offsets: Vec<usize>,
    #[serde(default)]
    pub name: Option<String>,
    pub length: usize,
}

impl UnlinkedBytecode {
    pub fn resolve(&self) -> Result<String> {
        let slots = self.link_references.iter().flat_map(|reference| {
            reference.offsets.iter().map(move |offset| LinkReference {
                library: reference.name.as_deref().unwrap_or_default(),
                offset: *offset,
                length: reference.length,
            })
        });
        link_placeholders(&self.bytes, slots)
    }
}

/// A compiled contract
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    #[serde(default)]
    pub abi: Abi,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(default)]
    pub devdoc: serde_json::Value,
    #[serde(default)]
    pub userdoc: serde_json::Value,
    /// The path of the source as it was handed to the compiler pipeline
    pub source_path: String,
    /// The content of the source
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub source_map: Option<String>,
    #[serde(default)]
    pub deployed_source_map: Option<String>,
    /// The AST of the source exactly as solc emitted it
    #[serde(default)]
    pub ast: Option<serde_json::Value>,
    #[serde(default, rename = "legacyAST")]
    pub legacy_ast: Option<serde_json::Value>,
    #[serde(default)]
    pub bytecode: BytecodeObject,
    #[serde(default)]
    pub deployed_bytecode: BytecodeObject,
    pub compiler: CompilerInfo,
}

/// Turns the compiler output into one artifact per contract with EVM output.
///
/// Contracts without EVM output, like interfaces, are skipped. Bytecode is resolved with
/// [`crate::artifacts::Bytecode::resolve`], the ABI is ordered with [`order_abi`] and the source
/// path is mapped back to the path it was given with.
pub fn assemble(
    output: CompilerOutput,
    sources: &NormalizedSources,
    compiler_version: &str,
) -> Result<Vec<ContractArtifact>> {
    let CompilerOutput { sources: files, contracts, .. } = output;
    let mut artifacts = Vec::new();

    for (path, contracts) in contracts {
        let file = files.get(&path);
        for (name, contract) in contracts {
            if !contract.has_evm_output() {
                tracing::debug!(
                    contract = %name,
                    file = %path,
                    "skipping contract without evm output"
                );
                continue
            }
            let evm = contract.evm.unwrap_or_default();
            let bytecode = evm.bytecode.unwrap_or_default();
            let deployed_bytecode = evm.deployed_bytecode.unwrap_or_default();
            let abi = match file.map(SourceFile::parse_ast).transpose()?.flatten() {
                Some(ast) => order_abi(contract.abi, &name, &ast),
                None => contract.abi,
            };

            artifacts.push(ContractArtifact {
                abi,
                metadata: contract.metadata,
                devdoc: contract.devdoc,
                userdoc: contract.userdoc,
                source_path: sources.original_path(&path).to_string(),
                source: sources.content(&path).unwrap_or_default().to_string(),
                source_map: bytecode.source_map.clone(),
                deployed_source_map: deployed_bytecode.source_map.clone(),
                ast: file.and_then(|file| file.ast.clone()),
                legacy_ast: file.and_then(|file| file.legacy_ast.clone()),
                bytecode: bytecode.resolve()?.into(),
                deployed_bytecode: deployed_bytecode.resolve()?.into(),
                compiler: CompilerInfo::solc(compiler_version),
                contract_name: name,
            });
        }
    }

    tracing::trace!(artifacts = artifacts.len(), "assembled artifacts");
    Ok(artifacts)
}

/// Returns the original path of every source at the position of its compiler assigned id.
///
/// Ids the compiler did not assign are filled with empty strings. solc numbers the sources of
/// its output from zero, so ids at or past the number of sources are skipped.
pub fn source_indexes(
    files: &BTreeMap<String, SourceFile>,
    sources: &NormalizedSources,
) -> Vec<String> {
    let len = files
        .values()
        .map(|file| file.id as usize + 1)
        .filter(|len| *len <= files.len())
        .max()
        .unwrap_or_default();
    let mut indexes = vec![String::new(); len];
    for (path, file) in files {
        match indexes.get_mut(file.id as usize) {
            Some(index) => *index = sources.original_path(path).to_string(),
            None => tracing::warn!(file = %path, id = file.id, "skipping out of range source id"),
        }
    }
    indexes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConflictPolicy;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sources() -> NormalizedSources {
        NormalizedSources::new(
            vec![
                (r"C:\project\Token.sol", "contract Token { function b() {} function a() {} }"),
                (r"C:\project\IToken.sol", "interface IToken {}"),
            ],
            &[r"C:\project\Token.sol"],
            ConflictPolicy::default(),
        )
        .unwrap()
    }

    fn output() -> CompilerOutput {
        serde_json::from_value(json!({
            "contracts": {
                "/C/project/Token.sol": {
                    "Token": {
                        "abi": [
                            {"type": "function", "name": "a"},
                            {"type": "function", "name": "b"}
                        ],
                        "metadata": "{}",
                        "devdoc": {"methods": {}},
                        "userdoc": {"methods": {}},
                        "evm": {
                            "bytecode": {
                                "object": "00".repeat(30),
                                "sourceMap": "0:10:0",
                                "linkReferences": {
                                    "/C/project/Math.sol": {"Math": [{"start": 5, "length": 20}]}
                                }
                            },
                            "deployedBytecode": {"object": "6080", "sourceMap": "0:5:0"}
                        }
                    }
                },
                "/C/project/IToken.sol": {
                    "IToken": {"abi": [], "evm": {}}
                }
            },
            "sources": {
                "/C/project/IToken.sol": {"id": 0, "ast": {}},
                "/C/project/Token.sol": {
                    "id": 1,
                    "ast": token_ast(),
                    "legacyAST": {"name": "SourceUnit"}
                }
            }
        }))
        .unwrap()
    }

    fn token_ast() -> serde_json::Value {
        let function = |id: usize, name: &str, src: &str| {
            json!({"id": id, "name": name, "nodeType": "FunctionDefinition", "src": src})
        };
        json!({
            "absolutePath": "/C/project/Token.sol",
            "id": 10,
            "nodeType": "SourceUnit",
            "src": "0:50:1",
            "nodes": [
                {
                    "id": 11,
                    "name": "Token",
                    "nodeType": "ContractDefinition",
                    "contractKind": "contract",
                    "src": "0:50:1",
                    "nodes": [function(12, "b", "17:16:1"), function(13, "a", "34:16:1")]
                },
                {
                    "id": 14,
                    "name": "IMath",
                    "nodeType": "ContractDefinition",
                    "contractKind": "interface",
                    "baseContracts": [],
                    "src": "51:20:1",
                    "nodes": []
                }
            ]
        })
    }

    #[test]
    fn can_assemble_artifacts() {
        let artifacts = assemble(output(), &sources(), "0.5.0+commit.1d4f565a").unwrap();
        assert_eq!(artifacts.len(), 1);

        let token = &artifacts[0];
        assert_eq!(token.contract_name, "Token");
        assert_eq!(token.source_path, r"C:\project\Token.sol");
        assert_eq!(token.source, "contract Token { function b() {} function a() {} }");
        assert_eq!(token.source_map.as_deref(), Some("0:10:0"));
        assert_eq!(token.deployed_source_map.as_deref(), Some("0:5:0"));
        assert_eq!(token.compiler, CompilerInfo::solc("0.5.0+commit.1d4f565a"));
        assert_eq!(token.legacy_ast, Some(json!({"name": "SourceUnit"})));
        assert_eq!(
            token.abi.iter().map(|e| e.name.as_deref().unwrap()).collect::<Vec<_>>(),
            vec!["b", "a"]
        );

        let bytecode = token.bytecode.as_resolved().unwrap();
        assert_eq!(bytecode.len(), 62);
        assert_eq!(&bytecode[12..52], format!("__Math{}", "_".repeat(34)));
        assert_eq!(token.deployed_bytecode.as_resolved(), Some("0x6080"));
    }

    #[test]
    fn keeps_ast_as_emitted() {
        let output = output();
        let emitted = output.sources["/C/project/Token.sol"].ast.clone();
        let artifacts = assemble(output, &sources(), "0.5.0").unwrap();

        assert_eq!(artifacts[0].ast, emitted);
        let value = serde_json::to_value(&artifacts[0]).unwrap();
        assert_eq!(value["ast"], token_ast());
        assert_eq!(value["ast"]["nodes"][1]["nodes"], json!([]));
        assert!(value["ast"].get("exportedSymbols").is_none());
    }

    #[test]
    fn can_serialize_artifact() {
        let artifacts = assemble(output(), &sources(), "0.5.0").unwrap();
        let value = serde_json::to_value(&artifacts[0]).unwrap();
        assert_eq!(value["contractName"], "Token");
        assert_eq!(value["sourcePath"], r"C:\project\Token.sol");
        assert_eq!(value["compiler"], json!({"name": "solc", "version": "0.5.0"}));
        assert_eq!(value["deployedBytecode"], "0x6080");
        assert!(value["legacyAST"].is_object());
        assert!(value["ast"].is_object());

        let artifact: ContractArtifact = serde_json::from_value(value).unwrap();
        assert_eq!(artifact, artifacts[0]);
    }

    #[test]
    fn can_index_sources() {
        let output = output();
        let indexes = source_indexes(&output.sources, &sources());
        assert_eq!(indexes, vec![r"C:\project\IToken.sol", r"C:\project\Token.sol"]);
        assert!(source_indexes(&BTreeMap::new(), &sources()).is_empty());
    }

    #[test]
    fn fills_unassigned_ids() {
        let files: BTreeMap<String, SourceFile> = serde_json::from_value(json!({
            "/C/project/IToken.sol": {"id": 0},
            "/C/project/Math.sol": {"id": 7},
            "/C/project/Token.sol": {"id": 2},
        }))
        .unwrap();
        let indexes = source_indexes(&files, &sources());
        assert_eq!(indexes, vec![r"C:\project\IToken.sol", "", r"C:\project\Token.sol"]);
    }

    #[test]
    fn skips_out_of_range_ids() {
        let files: BTreeMap<String, SourceFile> = serde_json::from_value(json!({
            "/C/project/IToken.sol": {"id": 0},
            "/C/project/Token.sol": {"id": 4_000_000_000u32},
        }))
        .unwrap();
        let indexes = source_indexes(&files, &sources());
        assert_eq!(indexes, vec![r"C:\project\IToken.sol"]);
    }

    #[test]
    fn can_resolve_unlinked_bytecode() {
        let bytecode: BytecodeObject = serde_json::from_value(json!({
            "bytes": "00".repeat(40),
            "linkReferences": [{"offsets": [0, 20], "name": "Lib", "length": 20}]
        }))
        .unwrap();
        assert!(bytecode.as_resolved().is_none());
        let resolved = bytecode.resolve().unwrap();
        let placeholder = format!("__Lib{}", "_".repeat(35));
        assert_eq!(resolved, format!("0x{}{}", placeholder, placeholder));

        let bytecode: BytecodeObject = serde_json::from_value(json!("0xdead")).unwrap();
        assert_eq!(bytecode.resolve().unwrap(), "0xdead");
    }
}
