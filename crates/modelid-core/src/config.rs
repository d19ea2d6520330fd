//! Centralized configuration constants.
//!
//! Timeouts, cache capacities, and hashing parameters live here so none of
//! them end up as inline magic numbers in the call sites.

use std::time::Duration;

/// Digest computation parameters.
pub struct HashConfig;

impl HashConfig {
    /// Number of hex characters kept from the full SHA-256 digest.
    ///
    /// A 10-character prefix (40 bits) trades collision resistance for
    /// compactness: it is the identity the metadata service indexes by and
    /// the key length callers compare on, so changing it breaks existing
    /// lookups. Collisions are ~2^-20 at a million known files, which is
    /// acceptable for a lookup key but would not be for integrity checking.
    pub const DIGEST_HEX_LEN: usize = 10;

    /// Chunk size for streaming file reads (8MB, optimal for SSDs).
    pub const CHUNK_SIZE: usize = 8 * 1024 * 1024;
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    /// Bound on the remote metadata lookup. The upstream behavior had no
    /// timeout at all; a slow endpoint must not stall a serving request.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Base URL of the model metadata service.
    pub const CIVITAI_API_BASE: &'static str = "https://civitai.com/api/v1";

    pub const USER_AGENT: &'static str =
        concat!("modelid/", env!("CARGO_PKG_VERSION"));
}

/// Digest cache capacities.
///
/// The graph annotator and the request-serving flow each own an independent
/// cache instance; they share no state.
pub struct CacheConfig;

impl CacheConfig {
    /// Capacity of the annotator's digest cache.
    pub const ANNOTATOR_CACHE_CAPACITY: usize = 10;

    /// Capacity of the request-serving flow's digest cache.
    pub const LOOKUP_CACHE_CAPACITY: usize = 20;
}
