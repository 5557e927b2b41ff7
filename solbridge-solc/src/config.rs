use crate::{
    artifacts::{EvmVersion, Optimizer, Settings},
    error::{Result, SolcError},
};
use serde::{Deserialize, Serialize};

/// How solc invocation should be configured.
///
/// Deserializes from the `compilers.solc` section of a project config:
///
/// ```json
/// {
///   "version": "0.5.0",
///   "strict": false,
///   "settings": { "optimizer": { "enabled": true, "runs": 200 }, "evmVersion": "byzantium" }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolcConfig {
    /// How the compiler should be configured, the output selection is always computed from the
    /// compilation targets.
    #[serde(default)]
    pub settings: Settings,
    /// Whether warnings should abort the compilation
    #[serde(default)]
    pub strict: bool,
    /// The compiler version the project is configured for, used to explain pragma mismatches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// What to do if two sources or two contracts end up with the same key
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
}

impl SolcConfig {
    /// Creates a new [`SolcConfig`] builder instance
    pub fn builder() -> SolcConfigBuilder {
        SolcConfigBuilder::default()
    }
}

/// What to do when two entries of an output collection share a key, like two source paths that
/// normalize to the same path or two contracts with the same name in the legacy map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictPolicy {
    /// The later entry replaces the earlier one and a warning is logged
    #[default]
    LastWins,
    /// Fail with an error
    Reject,
}

impl ConflictPolicy {
    /// Applies the policy to a key that is already taken.
    ///
    /// Returns an error under [`ConflictPolicy::Reject`], otherwise logs the replacement.
    pub(crate) fn on_conflict(
        &self,
        kind: &str,
        key: &str,
        err: impl FnOnce(String) -> SolcError,
    ) -> Result<()> {
        match self {
            ConflictPolicy::LastWins => {
                tracing::warn!("duplicate {} \"{}\", the last one is used", kind, key);
                Ok(())
            }
            ConflictPolicy::Reject => Err(err(key.to_string())),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SolcConfigBuilder {
    settings: Option<Settings>,
    evm_version: Option<EvmVersion>,
    optimizer: Option<Optimizer>,
    strict: bool,
    version: Option<String>,
    conflict_policy: ConflictPolicy,
}

impl SolcConfigBuilder {
    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    #[must_use]
    pub fn evm_version(mut self, evm_version: EvmVersion) -> Self {
        self.evm_version = Some(evm_version);
        self
    }

    #[must_use]
    pub fn optimizer(mut self, optimizer: Optimizer) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    /// Treat warnings as errors
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// Creates the solc config
    pub fn build(self) -> SolcConfig {
        let SolcConfigBuilder {
            settings,
            evm_version,
            optimizer,
            strict,
            version,
            conflict_policy,
        } = self;
        let mut settings = settings.unwrap_or_default();
        if let Some(evm_version) = evm_version {
            settings.evm_version = Some(evm_version);
        }
        if let Some(optimizer) = optimizer {
            settings.optimizer = optimizer;
        }
        SolcConfig { settings, strict, version, conflict_policy }
    }
}
