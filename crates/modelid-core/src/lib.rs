//! Modelid Core - Headless library for model file identity.
//!
//! Resolves a local model file from a logical name, computes a truncated
//! content digest for it (cached with bounded LRU memory), and looks the
//! digest up against a remote metadata service. The HTTP serving layer
//! lives in the `modelid-rpc` crate; this crate can be used
//! programmatically without it.
//!
//! # Example
//!
//! ```rust,ignore
//! use modelid_core::{CivitaiClient, PathRegistry, SharedDigestCache};
//!
//! #[tokio::main]
//! async fn main() -> modelid_core::Result<()> {
//!     let registry = PathRegistry::standard_layout("/data/models".as_ref());
//!     let cache = SharedDigestCache::new(20);
//!     let client = CivitaiClient::new()?;
//!
//!     let path = registry.resolve_any("model.safetensors")?;
//!     let digest = cache.get_or_compute(&path).await?;
//!     let info = client.lookup_by_hash(&digest).await?;
//!     println!("{info}");
//!     Ok(())
//! }
//! ```

pub mod annotate;
pub mod cache;
pub mod config;
pub mod error;
pub mod hashing;
pub mod lookup;
pub mod resolver;

// Re-export commonly used types
pub use annotate::GraphAnnotator;
pub use cache::{DigestCache, SharedDigestCache};
pub use config::{CacheConfig, HashConfig, NetworkConfig};
pub use error::{ModelIdError, Result};
pub use lookup::CivitaiClient;
pub use resolver::PathRegistry;
