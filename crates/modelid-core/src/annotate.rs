//! Node graph annotation with model content digests.
//!
//! Walks a prompt node graph looking for inputs that reference model files
//! by well-known parameter names (`ckpt_name`, `lora_name`, `vae_name`),
//! resolves each reference through the path registry, and writes the
//! file's digest back onto the node under the matching `*_hash` key.
//!
//! Annotation is best effort by contract: a reference that fails to
//! resolve or hash is logged and skipped, and every other parameter and
//! node is still processed. The caller always gets its graph back.

use crate::cache::DigestCache;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::hashing;
use crate::resolver::PathRegistry;
use serde_json::{Map, Value};

/// Recognized model-reference parameters and their logical categories.
const MODEL_PARAMETERS: [(&str, &str); 3] = [
    ("ckpt_name", "checkpoints"),
    ("lora_name", "loras"),
    ("vae_name", "vae"),
];

fn category_for(parameter: &str) -> Option<&'static str> {
    MODEL_PARAMETERS
        .iter()
        .find(|(name, _)| *name == parameter)
        .map(|(_, category)| *category)
}

/// Derive the annotation key: a trailing `_name` becomes `_hash`.
fn hash_key_for(parameter: &str) -> String {
    match parameter.strip_suffix("_name") {
        Some(stem) => format!("{stem}_hash"),
        None => format!("{parameter}_hash"),
    }
}

/// Adds digest fields to model-referencing nodes of a prompt graph.
///
/// Owns its own bounded digest cache, independent of the request-serving
/// flow's. Annotation runs synchronously inside one pipeline invocation,
/// so the cache needs no locking.
pub struct GraphAnnotator {
    registry: PathRegistry,
    cache: DigestCache,
}

impl GraphAnnotator {
    pub fn new(registry: PathRegistry) -> Self {
        Self::with_cache_capacity(registry, CacheConfig::ANNOTATOR_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(registry: PathRegistry, capacity: usize) -> Self {
        Self {
            registry,
            cache: DigestCache::new(capacity),
        }
    }

    /// Annotate every node in place. Nodes are never added or removed and
    /// `inputs` maps are left untouched; only new `*_hash` fields appear.
    pub fn annotate<'a>(&mut self, graph: &'a mut Map<String, Value>) -> &'a mut Map<String, Value> {
        for (node_id, node) in graph.iter_mut() {
            let Some(node) = node.as_object_mut() else {
                continue;
            };
            self.visit_node(node_id, node);
        }
        graph
    }

    fn visit_node(&mut self, node_id: &str, node: &mut Map<String, Value>) {
        // Nodes without a proper "inputs" object are skipped, not errors.
        let Some(inputs) = node.get("inputs").and_then(Value::as_object) else {
            return;
        };

        let mut annotations: Vec<(String, String)> = Vec::new();
        for (parameter, value) in inputs {
            let Some(category) = category_for(parameter) else {
                continue;
            };
            let Some(name) = value.as_str() else {
                continue;
            };

            // Best-effort contract: the error variant is discarded here on
            // purpose so one bad reference cannot block its siblings.
            match self.digest_for(category, name) {
                Ok(digest) => {
                    tracing::debug!(
                        node = %node_id,
                        parameter = %parameter,
                        digest = %digest,
                        "annotated model reference"
                    );
                    annotations.push((hash_key_for(parameter), digest));
                }
                Err(err) => {
                    tracing::debug!(
                        node = %node_id,
                        parameter = %parameter,
                        error = %err,
                        "skipping unresolvable model reference"
                    );
                }
            }
        }

        for (key, digest) in annotations {
            node.insert(key, Value::String(digest));
        }
    }

    fn digest_for(&mut self, category: &str, name: &str) -> Result<String> {
        let path = self.registry.resolve_in(category, name)?;
        if let Some(digest) = self.cache.get(&path) {
            return Ok(digest.to_string());
        }
        let digest = hashing::compute_digest(&path)?;
        self.cache.put(path, digest.clone());
        Ok(digest)
    }
}
