use crate::{
    artifacts::{CompilerInput, CompilerOutput},
    error::{Result, SolcError},
};
use semver::Version;
use std::{
    fmt,
    io::{BufRead, Write},
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
    str::FromStr,
};

pub mod diagnostics;
pub mod project;

/// The name of the `solc` binary on the system
pub const SOLC: &str = "solc";

/// A loaded compiler that accepts solc's standard JSON.
///
/// The pipeline only depends on this interface, how the compiler is found, downloaded or cached
/// is up to the implementer.
pub trait CompilerInvoker {
    /// Returns the version the compiler reports, e.g. `0.5.0+commit.1d4f565a.Linux.g++`
    fn version(&self) -> Result<String>;

    /// Compiles the standard JSON `input` and returns the compiler's raw JSON output
    fn compile_json(&self, input: &str) -> Result<String>;

    /// Serializes the input, runs the compiler and parses its output.
    ///
    /// Output that is not valid standard JSON output is an error.
    fn compile(&self, input: &CompilerInput) -> Result<CompilerOutput> {
        let input = serde_json::to_string(input)?;
        tracing::trace!(bytes = input.len(), "invoking compiler");
        let output = self.compile_json(&input)?;
        Ok(serde_json::from_str(&output)?)
    }
}

impl<T: CompilerInvoker + ?Sized> CompilerInvoker for &T {
    fn version(&self) -> Result<String> {
        (**self).version()
    }

    fn compile_json(&self, input: &str) -> Result<String> {
        (**self).compile_json(input)
    }
}

/// Parses the version string of a compiler into semver.
///
/// solc's native builds report `g++` in their build metadata, which is not valid semver.
pub fn parse_version(version: &str) -> Result<Version> {
    let version = version.trim().trim_start_matches("Version: ").replace(".g++", ".gcc");
    Ok(Version::from_str(&version)?)
}

/// Abstraction over the `solc` command line utility
///
/// By default the solc path is configured as follows, with descending priority:
///   1. `SOLC_PATH` environment variable
///   2. `solc` otherwise
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Solc {
    /// Path to the `solc` executable
    pub solc: PathBuf,
    /// Additional arguments passed to the `solc` executable
    pub args: Vec<String>,
}

impl Default for Solc {
    fn default() -> Self {
        if let Ok(solc) = std::env::var("SOLC_PATH") {
            return Solc::new(solc)
        }
        Solc::new(SOLC)
    }
}

impl fmt::Display for Solc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.solc.display())?;
        if !self.args.is_empty() {
            write!(f, " {}", self.args.join(" "))?;
        }
        Ok(())
    }
}

impl Solc {
    /// A new instance which points to `solc`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Solc { solc: path.into(), args: Vec::new() }
    }

    /// Adds an argument to pass to the `solc` command.
    #[must_use]
    pub fn arg<T: Into<String>>(mut self, arg: T) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments to pass to the `solc`.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Returns the semver version of the configured `solc`
    pub fn semver(&self) -> Result<Version> {
        parse_version(&CompilerInvoker::version(self)?)
    }
}

impl CompilerInvoker for Solc {
    /// Returns the version from the last line of `solc --version`
    fn version(&self) -> Result<String> {
        version_from_output(
            Command::new(&self.solc)
                .arg("--version")
                .stdin(Stdio::piped())
                .stderr(Stdio::piped())
                .stdout(Stdio::piped())
                .output()
                .map_err(|err| SolcError::io(err, &self.solc))?,
        )
    }

    /// Runs `solc --standard-json` with the input on stdin
    #[tracing::instrument(skip_all, name = "solc")]
    fn compile_json(&self, input: &str) -> Result<String> {
        let mut child = Command::new(&self.solc)
            .args(&self.args)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stderr(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|err| SolcError::io(err, &self.solc))?;
        {
            let mut stdin =
                child.stdin.take().ok_or_else(|| SolcError::solc("failed to open solc stdin"))?;
            stdin.write_all(input.as_bytes()).map_err(|err| SolcError::io(err, &self.solc))?;
        }
        compile_output(child.wait_with_output().map_err(|err| SolcError::io(err, &self.solc))?)
    }
}

fn compile_output(output: Output) -> Result<String> {
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(SolcError::solc(String::from_utf8_lossy(&output.stderr).to_string()))
    }
}

fn version_from_output(output: Output) -> Result<String> {
    if output.status.success() {
        let version = output
            .stdout
            .lines()
            .map_while(std::result::Result::ok)
            .filter(|l| !l.trim().is_empty())
            .last()
            .ok_or_else(|| SolcError::solc("version not found in solc output"))?;
        Ok(version.trim().trim_start_matches("Version: ").to_string())
    } else {
        Err(SolcError::solc(String::from_utf8_lossy(&output.stderr).to_string()))
    }
}

impl AsRef<Path> for Solc {
    fn as_ref(&self) -> &Path {
        &self.solc
    }
}

impl<T: Into<PathBuf>> From<T> for Solc {
    fn from(solc: T) -> Self {
        Solc::new(solc.into())
    }
}
