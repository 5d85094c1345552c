//! Module resolution aliases.
//!
//! Targets are stored normalized: `/` separators, lexically cleaned, and a
//! lower-case Windows drive letter. Lookups and prefix tests compare these
//! normalized forms so a plan built on Windows matches the same files as one
//! built elsewhere.

use std::path::Path;

use indexmap::IndexMap;
use path_clean::PathClean;
use serde::Serialize;

use crate::error::{ConfigurationError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AliasTable {
    entries: IndexMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alias. Re-registering the same target is a no-op, a different
    /// target is an [`ConfigurationError::AliasCollision`].
    pub fn insert(&mut self, alias: impl Into<String>, target: impl AsRef<Path>) -> Result<()> {
        let alias = alias.into();
        let normalized = normalize_path(target.as_ref());

        if let Some(existing) = self.entries.get(&alias) {
            if *existing == normalized {
                return Ok(());
            }
            return Err(ConfigurationError::AliasCollision {
                alias,
                existing: existing.into(),
                requested: normalized.into(),
            });
        }

        tracing::trace!(%alias, target = %normalized, "registered alias");
        self.entries.insert(alias, normalized);
        Ok(())
    }

    pub fn get(&self, alias: &str) -> Option<&str> {
        self.entries.get(alias).map(String::as_str)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve an import specifier through the table.
    ///
    /// Aliases ending in `$` only match the exact specifier; other aliases also
    /// match `alias/rest`. Returns `None` when no alias applies.
    pub fn resolve(&self, specifier: &str) -> Option<String> {
        let specifier = specifier.replace('\\', "/");
        for (alias, target) in &self.entries {
            if let Some(exact) = alias.strip_suffix('$') {
                if specifier == exact {
                    return Some(target.clone());
                }
                continue;
            }
            if specifier == *alias {
                return Some(target.clone());
            }
            if let Some(rest) = specifier
                .strip_prefix(alias.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
            {
                return Some(normalize_path(Path::new(&format!("{target}/{rest}"))));
            }
        }
        None
    }
}

/// Separator- and case-normalized form of a path.
pub fn normalize_path(path: &Path) -> String {
    let unified = path.to_string_lossy().replace('\\', "/");
    let cleaned = Path::new(&unified).clean();
    let mut normalized = cleaned.to_string_lossy().into_owned();

    let bytes = normalized.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        let drive = normalized[..1].to_ascii_lowercase();
        normalized.replace_range(..1, &drive);
    }
    normalized
}

/// Literal path-prefix test on normalized paths, respecting component boundaries.
pub fn is_under(path: &str, root: &str) -> bool {
    match path.strip_prefix(root) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || root.ends_with('/'),
        None => false,
    }
}
