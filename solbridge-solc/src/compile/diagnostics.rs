//! Classification of compiler diagnostics into blocking errors and warnings

use crate::{
    artifacts::{Error, Severity},
    compile::parse_version,
    error::SolcError,
    utils,
};

/// The text solc reports when a source's version pragma does not match the compiler
pub const VERSION_MISMATCH: &str = "requires different compiler version";

/// Separator between the formatted messages of a bucket
const SEPARATOR: &str = ",";

/// The diagnostics of a compiler run split into blocking errors and warnings
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Diagnostics that abort the compilation
    pub errors: Vec<Error>,
    /// Diagnostics that are reported but do not affect the outcome
    pub warnings: Vec<Error>,
}

impl Diagnostics {
    /// Splits the diagnostics.
    ///
    /// Every severity other than [`Severity::Warning`] is an error, warnings are errors too if
    /// `strict` is set.
    pub fn classify(diagnostics: impl IntoIterator<Item = Error>, strict: bool) -> Self {
        let (warnings, errors) = diagnostics
            .into_iter()
            .partition(|diagnostic| !strict && diagnostic.severity.is_warning());
        Self { errors, warnings }
    }

    /// Whether the compilation has to be aborted
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// The formatted messages of all errors
    pub fn error_message(&self) -> String {
        join_formatted(&self.errors)
    }

    /// The formatted messages of all warnings
    pub fn warning_message(&self) -> String {
        join_formatted(&self.warnings)
    }

    /// Returns the [`SolcError::Compilation`] to abort with, if there are any errors.
    ///
    /// If the errors indicate a version pragma the compiler does not satisfy, a note naming the
    /// `configured_version` (or the `compiler_version` if none is configured) is appended.
    pub fn to_error(
        &self,
        configured_version: Option<&str>,
        compiler_version: &str,
    ) -> Option<SolcError> {
        if !self.has_errors() {
            return None
        }
        let mut message = self.error_message();
        if let Some(hint) = version_mismatch_hint(&message, configured_version, compiler_version) {
            message.push_str(&hint);
        }
        Some(SolcError::Compilation(message))
    }
}

/// Joins the formatted messages of the diagnostics
pub fn join_formatted(diagnostics: &[Error]) -> String {
    diagnostics.iter().map(Error::formatted).collect::<Vec<_>>().join(SEPARATOR)
}

/// Returns a remediation note if `errors` contains a version mismatch.
pub fn version_mismatch_hint(
    errors: &str,
    configured_version: Option<&str>,
    compiler_version: &str,
) -> Option<String> {
    if !errors.contains(VERSION_MISMATCH) {
        return None
    }
    let current = match configured_version {
        Some(version) => version.to_string(),
        None => parse_version(compiler_version)
            .map(|version| format!("{}.{}.{}", version.major, version.minor, version.patch))
            .unwrap_or_else(|_| compiler_version.to_string()),
    };
    let required = match utils::find_pragma_statement(errors) {
        Some(pragma) => format!("\"{}\"", pragma),
        None => "a different compiler version".to_string(),
    };
    Some(format!(
        "\nError: solc {} is in use, but one or more of your contracts specify {}.\n\
         Please update the configured compiler version or the pragma statement(s).\n",
        current, required
    ))
}
