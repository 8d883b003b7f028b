// # Endpoint Source Trait
//
// Defines the interface for collaborators that produce the desired
// endpoint list.
//
// ## Implementations
//
// Sources live outside this crate: cluster-resource watchers,
// legacy-annotation adapters, hostname-template renderers. The crate ships
// only [`StaticSource`], a fixed-list source for tests and embedding.
//
// ## Usage
//
// ```rust,ignore
// use dns_sync_core::Source;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* Source implementation */;
//
//     let desired = source.endpoints().await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::endpoint::Endpoint;
use crate::error::Result;

/// Trait for desired-endpoint sources
///
/// A source yields the full desired endpoint list for one reconciliation
/// cycle. Alias-target endpoints must be emitted alongside the regular
/// endpoints that resolve against them, since the plan's alias index is
/// built from a single `endpoints()` snapshot.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait Source: Send + Sync {
    /// Return all desired endpoints for this cycle
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Endpoint>)`: The desired endpoint list
    /// - `Err(Error)`: If the underlying resource query failed
    async fn endpoints(&self) -> Result<Vec<Endpoint>>;
}

/// A source backed by a fixed endpoint list.
///
/// Useful for embedding and tests; returns a clone of the same list on
/// every call.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    endpoints: Vec<Endpoint>,
}

impl StaticSource {
    /// Create a source that always yields `endpoints`.
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self { endpoints }
    }
}

#[async_trait]
impl Source for StaticSource {
    async fn endpoints(&self) -> Result<Vec<Endpoint>> {
        Ok(self.endpoints.clone())
    }
}
