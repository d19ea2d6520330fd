//! Model path resolution across configured search roots.
//!
//! A logical model name is located by walking an ordered list of candidate
//! roots and taking the first existing file. The registry maps logical
//! categories (checkpoints, loras, vae) to their root lists; the category
//! assignment itself comes from an external path registry, this module only
//! consumes it.

use crate::error::{ModelIdError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Locate `name` under the given roots, in caller-supplied order.
///
/// The name is trimmed of surrounding whitespace first. The first root
/// containing an existing regular file wins and its path is returned
/// absolute and lexically normalized. No match is the distinct
/// [`ModelIdError::ModelNotFound`] outcome — an expected result, never
/// conflated with an I/O failure.
pub fn resolve(roots: &[PathBuf], name: &str) -> Result<PathBuf> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ModelIdError::ModelNotFound {
            name: name.to_string(),
        });
    }

    for root in roots {
        let candidate = root.join(name);
        if candidate.is_file() {
            return absolutize(&candidate);
        }
    }

    Err(ModelIdError::ModelNotFound {
        name: name.to_string(),
    })
}

/// Anchor a candidate at the current directory if its root was relative,
/// then collapse dot segments. Digest cache entries are keyed by resolved
/// path, so the same file must not get two keys depending on how its root
/// was spelled.
fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize(path));
    }
    let cwd = std::env::current_dir()?;
    Ok(normalize(&cwd.join(path)))
}

/// Collapse `.` segments and fold `..` into the preceding component.
///
/// Purely lexical: nothing is touched on disk and symlinks are not
/// followed, so this is not a security boundary against traversal outside
/// the roots.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Logical category → ordered search roots.
///
/// Serialized form is a plain JSON object, e.g.
/// `{"checkpoints": ["/models/checkpoints"], "loras": ["/models/loras"]}`.
/// Categories iterate in name order so a scan across all of them is
/// deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathRegistry {
    categories: BTreeMap<String, Vec<PathBuf>>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the roots for a category, replacing any previous list.
    pub fn insert(&mut self, category: impl Into<String>, roots: Vec<PathBuf>) {
        self.categories.insert(category.into(), roots);
    }

    pub fn roots_for(&self, category: &str) -> Option<&[PathBuf]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Load a registry from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ModelIdError::io_with_path(e, path))?;
        serde_json::from_str(&content).map_err(|e| ModelIdError::Config {
            message: format!("Invalid path registry {}: {}", path.display(), e),
        })
    }

    /// Conventional single-root layout: `<root>/checkpoints`, `<root>/loras`,
    /// `<root>/vae`.
    pub fn standard_layout(models_root: &Path) -> Self {
        let mut registry = Self::new();
        for category in ["checkpoints", "loras", "vae"] {
            registry.insert(category, vec![models_root.join(category)]);
        }
        registry
    }

    /// Resolve a name within one category's roots.
    pub fn resolve_in(&self, category: &str, name: &str) -> Result<PathBuf> {
        let roots = self
            .roots_for(category)
            .ok_or_else(|| ModelIdError::UnknownCategory {
                category: category.to_string(),
            })?;
        resolve(roots, name)
    }

    /// Resolve a name by scanning every category, first hit wins.
    ///
    /// Used by the request-serving flow, where the caller supplies only a
    /// name and no category.
    pub fn resolve_any(&self, name: &str) -> Result<PathBuf> {
        for category in self.categories() {
            match self.resolve_in(category, name) {
                Ok(path) => return Ok(path),
                Err(err) if err.is_not_found() => continue,
                Err(err) => return Err(err),
            }
        }
        Err(ModelIdError::ModelNotFound {
            name: name.trim().to_string(),
        })
    }
}
