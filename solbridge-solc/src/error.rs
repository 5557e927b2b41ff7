use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SolcError>;

/// Various error types
#[derive(Debug, Error)]
pub enum SolcError {
    /// Internal solc error, the compiler could not be invoked or exited unsuccessfully
    #[error("Solc Error: {0}")]
    Solc(String),
    /// The compiler reported blocking diagnostics, contains the joined formatted messages
    #[error("{0}")]
    Compilation(String),
    #[error(
        "Link reference for `{library}` at byte offset {offset} (length {length}) is out of \
         bounds for bytecode of {bytecode_len} hex characters"
    )]
    InvalidLinkReference { library: String, offset: usize, length: usize, bytecode_len: usize },
    #[error("Multiple source files normalize to \"{0}\"")]
    DuplicateSource(String),
    #[error("Multiple contracts are named \"{0}\"")]
    DuplicateContract(String),
    #[error(transparent)]
    SemverError(#[from] semver::Error),
    /// Deserialization error
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    /// Filesystem IO error
    #[error(transparent)]
    Io(#[from] SolcIoError),
}

impl SolcError {
    pub(crate) fn io(err: io::Error, path: impl Into<PathBuf>) -> Self {
        SolcIoError::new(err, path).into()
    }
    pub(crate) fn solc(msg: impl Into<String>) -> Self {
        SolcError::Solc(msg.into())
    }

    /// Whether this error carries compiler diagnostics
    pub fn is_compilation(&self) -> bool {
        matches!(self, SolcError::Compilation(_))
    }
}

#[derive(Debug, Error)]
#[error("\"{}\": {io}", self.path.display())]
pub struct SolcIoError {
    io: io::Error,
    path: PathBuf,
}

impl SolcIoError {
    pub fn new(io: io::Error, path: impl Into<PathBuf>) -> Self {
        Self { io, path: path.into() }
    }

    /// The path at which the error occurred
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl From<SolcIoError> for io::Error {
    fn from(err: SolcIoError) -> Self {
        err.io
    }
}
