//! OS independent source paths

use crate::{
    artifacts::{Source, Sources},
    config::ConflictPolicy,
    error::{Result, SolcError},
    utils,
};
use std::collections::{BTreeMap, HashSet};

/// A set of sources keyed by their normalized path, see [`utils::normalize_path`], together with
/// the normalized compilation targets and the way back to the paths the sources were given with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizedSources {
    /// `normalized path -> source`
    pub sources: Sources,
    /// Normalized paths of all sources that are compilation targets
    pub targets: Vec<String>,
    /// `normalized path -> original path`
    pub original_paths: BTreeMap<String, String>,
}

impl NormalizedSources {
    /// Normalizes the paths of all `sources`.
    ///
    /// `targets` are original paths, only those that belong to one of the `sources` are kept. If
    /// two paths normalize to the same path the `policy` decides whether the later one wins.
    pub fn new<I, P, C, T>(sources: I, targets: &[T], policy: ConflictPolicy) -> Result<Self>
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
        T: AsRef<str>,
    {
        let targets: HashSet<&str> = targets.iter().map(AsRef::as_ref).collect();
        let mut normalized = NormalizedSources::default();

        for (original, content) in sources {
            let original = original.into();
            let path = utils::normalize_path(&original);
            if normalized.original_paths.contains_key(&path) {
                policy.on_conflict("source path", &path, SolcError::DuplicateSource)?;
                normalized.targets.retain(|target| target != &path);
            }
            if targets.contains(original.as_str()) {
                normalized.targets.push(path.clone());
            }
            normalized.sources.insert(path.clone(), Source::new(content));
            normalized.original_paths.insert(path, original);
        }

        tracing::trace!(
            sources = normalized.sources.len(),
            targets = normalized.targets.len(),
            "normalized source paths"
        );
        Ok(normalized)
    }

    /// Whether there are no sources
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Returns the path the source was originally given with.
    ///
    /// Paths that are not part of this set, for example files solc resolved on its own, are
    /// returned as is.
    pub fn original_path<'a>(&'a self, normalized: &'a str) -> &'a str {
        self.original_paths.get(normalized).map(String::as_str).unwrap_or(normalized)
    }

    /// Returns the content of the source at the normalized path
    pub fn content(&self, normalized: &str) -> Option<&str> {
        self.sources.get(normalized).map(|source| source.content.as_str())
    }
}
