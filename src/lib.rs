#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # solbridge
//!
//! > Drive the Solidity compiler through its standard JSON interface and turn its output into
//! > contract artifacts.
//!
//! # Quickstart
//!
//! ```no_run
//! use solbridge::prelude::*;
//!
//! let config = SolcConfig::builder().strict(true).build();
//! let compiler = ProjectCompiler::new(Solc::default(), config);
//! let output = compiler
//!     .compile(
//!         vec![(r"C:\project\contracts\Token.sol", "pragma solidity ^0.5.0; contract Token {}")],
//!         &[r"C:\project\contracts\Token.sol"],
//!     )
//!     .unwrap();
//! for artifact in &output.artifacts {
//!     println!("{} from {}", artifact.contract_name, artifact.source_path);
//! }
//! ```

/// # Solc
///
/// Invokes the compiler, classifies its diagnostics and assembles the artifacts in the current
/// and the legacy shape.
pub mod solc {
    pub use solbridge_solc::*;
}

/// Easy import of frequently used type definitions and traits
pub mod prelude {
    pub use solbridge_solc::{
        Artifact, CompilerInvoker, ConflictPolicy, ContractArtifact, EvmVersion,
        LegacyContractArtifact, ProjectCompileOutput, ProjectCompiler, Solc, SolcConfig,
        SolcError,
    };
}
