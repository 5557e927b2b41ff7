//! Canonical ordering of a contract's ABI

use crate::artifacts::ast::Ast;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A single entry of a contract's ABI.
///
/// Only `type` and `name` are interpreted, the remaining fields are carried along unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEntry {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

/// A contract's ABI as emitted by solc
pub type Abi = Vec<AbiEntry>;

/// Reorders the ABI so that entries of functions follow the order in which the functions are
/// declared in the source.
///
/// The contract's `ContractDefinition` is looked up in the `ast`. All entries whose name is not a
/// declared function keep their relative order and come first, followed by the entries whose
/// name is a declared function, sorted by the position of the declaration with that name.
/// If the contract is not part of the AST or has no members, the ABI is returned unchanged.
///
/// Overloaded functions share a name and take the position of their last declaration, their
/// relative order is kept.
pub fn order_abi(abi: Abi, contract_name: &str, ast: &Ast) -> Abi {
    let contract = match ast.find_contract_definition(contract_name) {
        Some(contract) if !contract.nodes.is_empty() => contract,
        _ => return abi,
    };

    let mut function_index: HashMap<&str, usize> = HashMap::new();
    for (idx, name) in contract.function_names().enumerate() {
        function_index.insert(name, idx);
    }

    let (mut functions, mut ordered): (Vec<_>, Vec<_>) = abi
        .into_iter()
        .map(|entry| {
            let idx = entry.name.as_deref().and_then(|name| function_index.get(name).copied());
            (idx, entry)
        })
        .partition(|(idx, _)| idx.is_some());

    // stable, entries of overloaded functions stay in ABI order
    functions.sort_by_key(|(idx, _)| *idx);

    ordered.extend(functions);
    ordered.into_iter().map(|(_, entry)| entry).collect()
}
