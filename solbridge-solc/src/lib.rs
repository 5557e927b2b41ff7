#![doc = include_str!("../README.md")]

pub mod abi;

pub mod artifacts;
pub use artifacts::{CompilerInput, CompilerOutput, EvmVersion, Optimizer, Settings};

pub mod artifact_output;
pub use artifact_output::{
    shim_contracts, Artifact, BytecodeObject, CompilerInfo, ContractArtifact,
    LegacyContractArtifact,
};

pub mod compile;
pub use compile::{
    diagnostics::Diagnostics,
    project::{ProjectCompileOutput, ProjectCompiler},
    CompilerInvoker, Solc,
};

mod config;
pub use config::{ConflictPolicy, SolcConfig, SolcConfigBuilder};

pub mod error;
pub use error::{Result, SolcError};

pub mod paths;
pub use paths::NormalizedSources;

pub mod utils;
