//! Manages compiling a set of sources
//!
//! The compilation is performed in several steps.
//!
//! First all source paths are normalized into the form solc expects, regardless of the platform
//! they were produced on, see [`crate::utils::normalize_path`]. The normalized sources and
//! compilation targets make up the [`CompilerInput`]: the AST is requested for every file, full
//! output only for the targets.
//!
//! The input is then handed to the [`CompilerInvoker`] via the standard JSON format. The
//! diagnostics of the output are split into blocking errors and warnings, see [`Diagnostics`].
//! Any blocking error aborts the compilation.
//!
//! Finally every contract that produced EVM output is assembled into a [`ContractArtifact`] that
//! refers to its source by the path it was originally given with.

use crate::{
    artifact_output::{self, shim_contracts, ContractArtifact, LegacyContractArtifact},
    artifacts::{CompilerInput, Error},
    compile::{
        diagnostics::{join_formatted, Diagnostics},
        CompilerInvoker,
    },
    config::{ConflictPolicy, SolcConfig},
    error::Result,
    paths::NormalizedSources,
};
use std::collections::BTreeMap;

/// Compiles sources with a [`CompilerInvoker`]
#[derive(Debug, Clone)]
pub struct ProjectCompiler<C> {
    compiler: C,
    config: SolcConfig,
}

impl<C: CompilerInvoker> ProjectCompiler<C> {
    /// Create a new `ProjectCompiler` that compiles with the given compiler and config
    ///
    /// # Example
    ///
    /// ```no_run
    /// use solbridge_solc::{ProjectCompiler, Solc, SolcConfig};
    ///
    /// let compiler = ProjectCompiler::new(Solc::default(), SolcConfig::default());
    /// let output = compiler
    ///     .compile(vec![(r"C:\contracts\A.sol", "contract A {}")], &[r"C:\contracts\A.sol"])
    ///     .unwrap();
    /// ```
    pub fn new(compiler: C, config: SolcConfig) -> Self {
        Self { compiler, config }
    }

    pub fn config(&self) -> &SolcConfig {
        &self.config
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Compiles all `sources`, a list of `(path, content)` pairs.
    ///
    /// Full output is produced for the `targets` only, or for all sources if there are no
    /// targets. Without any sources the compiler is not invoked and the output is empty.
    #[tracing::instrument(skip_all, name = "compile")]
    pub fn compile<I, P, S, T>(&self, sources: I, targets: &[T]) -> Result<ProjectCompileOutput>
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<String>,
        S: Into<String>,
        T: AsRef<str>,
    {
        let sources = NormalizedSources::new(sources, targets, self.config.conflict_policy)?;
        if sources.is_empty() {
            tracing::trace!("no sources to compile");
            return Ok(ProjectCompileOutput::default())
        }

        let input = CompilerInput::new(sources.sources.clone(), sources.targets.iter().cloned())
            .settings(self.config.settings.clone());
        let mut output = self.compiler.compile(&input)?;
        let version = self.compiler.version()?;
        tracing::trace!(version = %version, "compiled sources");

        let diagnostics =
            Diagnostics::classify(std::mem::take(&mut output.errors), self.config.strict);
        if let Some(err) = diagnostics.to_error(self.config.version.as_deref(), &version) {
            return Err(err)
        }
        for warning in &diagnostics.warnings {
            tracing::warn!("{}", warning);
        }

        let source_indexes = artifact_output::source_indexes(&output.sources, &sources);
        let artifacts = artifact_output::assemble(output, &sources, &version)?;

        Ok(ProjectCompileOutput {
            artifacts,
            source_indexes,
            warnings: diagnostics.warnings,
            compiler_version: Some(version),
        })
    }

    /// Compiles the sources, see [`Self::compile`], and converts the artifacts into the legacy
    /// shape using the configured [`ConflictPolicy`].
    pub fn compile_legacy<I, P, S, T>(
        &self,
        sources: I,
        targets: &[T],
    ) -> Result<BTreeMap<String, LegacyContractArtifact>>
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<String>,
        S: Into<String>,
        T: AsRef<str>,
    {
        self.compile(sources, targets)?.into_legacy(self.config.conflict_policy)
    }
}

/// The result of a successful compilation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectCompileOutput {
    /// One artifact for every contract with EVM output
    pub artifacts: Vec<ContractArtifact>,
    /// The original path of every source at the position of its compiler assigned id
    pub source_indexes: Vec<String>,
    /// Diagnostics that did not abort the compilation
    pub warnings: Vec<Error>,
    /// The version the compiler reported, `None` if the compiler was not invoked
    pub compiler_version: Option<String>,
}

impl ProjectCompileOutput {
    /// Whether nothing was compiled
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// The formatted messages of all warnings
    pub fn warning_message(&self) -> String {
        join_formatted(&self.warnings)
    }

    /// Finds the first artifact with the given contract name
    pub fn find(&self, contract_name: &str) -> Option<&ContractArtifact> {
        self.artifacts.iter().find(|artifact| artifact.contract_name == contract_name)
    }

    /// Converts all artifacts into the legacy shape, keyed by contract name
    pub fn into_legacy(
        self,
        policy: ConflictPolicy,
    ) -> Result<BTreeMap<String, LegacyContractArtifact>> {
        shim_contracts(self.artifacts, policy)
    }
}
