//! Bindings for solc's `ast` output field

use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// A read only view of the AST field in the solc output.
///
/// Only the parts needed to navigate the tree are parsed. Artifacts carry the AST exactly as solc
/// emitted it, see [`crate::artifacts::SourceFile::parse_ast`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ast {
    #[serde(default, rename = "absolutePath")]
    pub absolute_path: Option<String>,
    #[serde(default)]
    pub id: Option<usize>,
    #[serde(rename = "nodeType")]
    pub node_type: NodeType,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Ast {
    /// Returns the top level `ContractDefinition` with the given name
    pub fn find_contract_definition(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| {
            node.node_type == NodeType::ContractDefinition && node.name.as_deref() == Some(name)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: Option<usize>,
    #[serde(rename = "nodeType")]
    pub node_type: NodeType,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Node {
    /// Names of all direct `FunctionDefinition` children, in declaration order.
    ///
    /// Constructors, fallback and receive functions are `FunctionDefinition`s with an empty
    /// name, those are included as `""`.
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(|node| node.node_type == NodeType::FunctionDefinition)
            .map(|node| node.name.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeType {
    SourceUnit,
    PragmaDirective,
    ImportDirective,
    ContractDefinition,
    FunctionDefinition,
    EventDefinition,
    ErrorDefinition,
    ModifierDefinition,
    VariableDeclaration,
    Other(String),
}

impl FromStr for NodeType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "SourceUnit" => NodeType::SourceUnit,
            "PragmaDirective" => NodeType::PragmaDirective,
            "ImportDirective" => NodeType::ImportDirective,
            "ContractDefinition" => NodeType::ContractDefinition,
            "FunctionDefinition" => NodeType::FunctionDefinition,
            "EventDefinition" => NodeType::EventDefinition,
            "ErrorDefinition" => NodeType::ErrorDefinition,
            "ModifierDefinition" => NodeType::ModifierDefinition,
            "VariableDeclaration" => NodeType::VariableDeclaration,
            s => NodeType::Other(s.to_string()),
        })
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or(NodeType::Other(s)))
    }
}
