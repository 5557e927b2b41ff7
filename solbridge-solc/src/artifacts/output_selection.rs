//! bindings for standard json output selection

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Output selection key that addresses every file, or every contract of a file
pub const WILDCARD: &str = "*";

/// Output selection key for file level outputs like the AST
pub const FILE_LEVEL: &str = "";

/// Represents the selected output of files and contracts
/// The first level key is the file name and the second level key is the
/// contract name. An empty contract name is used for outputs that are
/// not tied to a contract but to the whole source file like the AST.
/// A star as contract name refers to all contracts in the file.
/// Similarly, a star as a file name matches all files.
///
/// ```json
///  {
///    "*": {
///      "": ["legacyAST", "ast"],
///      "*": ["abi", "evm.bytecode.object"]
///    }
///  }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputSelection(pub BTreeMap<String, FileOutputSelection>);

/// `contract name -> selected outputs` for a single file key
pub type FileOutputSelection = BTreeMap<String, Vec<String>>;

impl OutputSelection {
    /// The selection for a request without dedicated compilation targets: everything is
    /// requested for every file
    ///
    /// ```
    /// use solbridge_solc::artifacts::output_selection::OutputSelection;
    /// let selection = OutputSelection::all();
    /// assert_eq!(selection.as_ref().len(), 1);
    /// ```
    pub fn all() -> Self {
        BTreeMap::from([(WILDCARD.to_string(), Self::default_file_output_selection())]).into()
    }

    /// Builds the selection for the given compilation targets.
    ///
    /// The AST is requested for every file, while ABI, bytecode and docs are only requested for
    /// the targets. If `targets` is empty, this is the same as [`OutputSelection::all()`].
    pub fn for_targets<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut targets = targets.into_iter().peekable();
        if targets.peek().is_none() {
            return Self::all()
        }
        let ast_only = BTreeMap::from([(FILE_LEVEL.to_string(), Self::ast_output_selection())]);
        std::iter::once((WILDCARD.to_string(), ast_only))
            .chain(targets.map(|target| (target.into(), Self::default_file_output_selection())))
            .collect::<BTreeMap<_, _>>()
            .into()
    }

    /// The file level selection: `["legacyAST", "ast"]`
    pub fn ast_output_selection() -> Vec<String> {
        vec![FileLevelSelection::LegacyAst.to_string(), FileLevelSelection::Ast.to_string()]
    }

    /// The selection applied to every file in scope
    ///
    /// ```json
    /// {
    ///   "": ["legacyAST", "ast"],
    ///   "*": [
    ///     "abi",
    ///     "metadata",
    ///     "evm.bytecode.object",
    ///     "evm.bytecode.sourceMap",
    ///     "evm.deployedBytecode.object",
    ///     "evm.deployedBytecode.sourceMap",
    ///     "userdoc",
    ///     "devdoc"
    ///   ]
    /// }
    /// ```
    pub fn default_file_output_selection() -> FileOutputSelection {
        BTreeMap::from([
            (FILE_LEVEL.to_string(), Self::ast_output_selection()),
            (
                WILDCARD.to_string(),
                ContractOutputSelection::artifact().into_iter().map(|s| s.to_string()).collect(),
            ),
        ])
    }
}

impl AsRef<BTreeMap<String, FileOutputSelection>> for OutputSelection {
    fn as_ref(&self) -> &BTreeMap<String, FileOutputSelection> {
        &self.0
    }
}

impl From<BTreeMap<String, FileOutputSelection>> for OutputSelection {
    fn from(s: BTreeMap<String, FileOutputSelection>) -> Self {
        OutputSelection(s)
    }
}

/// File level output selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileLevelSelection {
    Ast,
    LegacyAst,
}

impl fmt::Display for FileLevelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileLevelSelection::Ast => f.write_str("ast"),
            FileLevelSelection::LegacyAst => f.write_str("legacyAST"),
        }
    }
}

impl FromStr for FileLevelSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ast" => Ok(FileLevelSelection::Ast),
            "legacyAST" => Ok(FileLevelSelection::LegacyAst),
            s => Err(format!("Invalid file level selection: {}", s)),
        }
    }
}

/// Contract level output selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContractOutputSelection {
    Abi,
    DevDoc,
    UserDoc,
    Metadata,
    ByteCode(BytecodeOutputSelection),
    DeployedByteCode(BytecodeOutputSelection),
}

impl ContractOutputSelection {
    /// Returns the set of contract level settings an artifact is assembled from, in the order
    /// they're requested:
    ///    - "abi"
    ///    - "metadata"
    ///    - "evm.bytecode.object"
    ///    - "evm.bytecode.sourceMap"
    ///    - "evm.deployedBytecode.object"
    ///    - "evm.deployedBytecode.sourceMap"
    ///    - "userdoc"
    ///    - "devdoc"
    pub fn artifact() -> Vec<ContractOutputSelection> {
        vec![
            ContractOutputSelection::Abi,
            ContractOutputSelection::Metadata,
            ContractOutputSelection::ByteCode(BytecodeOutputSelection::Object),
            ContractOutputSelection::ByteCode(BytecodeOutputSelection::SourceMap),
            ContractOutputSelection::DeployedByteCode(BytecodeOutputSelection::Object),
            ContractOutputSelection::DeployedByteCode(BytecodeOutputSelection::SourceMap),
            ContractOutputSelection::UserDoc,
            ContractOutputSelection::DevDoc,
        ]
    }
}

impl Serialize for ContractOutputSelection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContractOutputSelection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for ContractOutputSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractOutputSelection::Abi => f.write_str("abi"),
            ContractOutputSelection::DevDoc => f.write_str("devdoc"),
            ContractOutputSelection::UserDoc => f.write_str("userdoc"),
            ContractOutputSelection::Metadata => f.write_str("metadata"),
            ContractOutputSelection::ByteCode(b) => write!(f, "evm.bytecode.{}", b),
            ContractOutputSelection::DeployedByteCode(b) => {
                write!(f, "evm.deployedBytecode.{}", b)
            }
        }
    }
}

impl FromStr for ContractOutputSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abi" => Ok(ContractOutputSelection::Abi),
            "devdoc" => Ok(ContractOutputSelection::DevDoc),
            "userdoc" => Ok(ContractOutputSelection::UserDoc),
            "metadata" => Ok(ContractOutputSelection::Metadata),
            s => {
                if let Some(field) = s.strip_prefix("evm.bytecode.") {
                    field.parse().map(ContractOutputSelection::ByteCode)
                } else if let Some(field) = s.strip_prefix("evm.deployedBytecode.") {
                    field.parse().map(ContractOutputSelection::DeployedByteCode)
                } else {
                    Err(format!("Invalid contract output selection: {}", s))
                }
            }
        }
    }
}

/// Field level output selection for `evm.bytecode` and `evm.deployedBytecode`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BytecodeOutputSelection {
    Object,
    SourceMap,
}

impl fmt::Display for BytecodeOutputSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BytecodeOutputSelection::Object => f.write_str("object"),
            BytecodeOutputSelection::SourceMap => f.write_str("sourceMap"),
        }
    }
}

impl FromStr for BytecodeOutputSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "object" => Ok(BytecodeOutputSelection::Object),
            "sourceMap" => Ok(BytecodeOutputSelection::SourceMap),
            s => Err(format!("Invalid bytecode selection: {}", s)),
        }
    }
}
