// # DNS Provider Trait
//
// Defines the interface for querying and mutating records in a DNS
// backend.
//
// ## Implementations
//
// - In-memory (tests, demos, dry runs): `dns-sync-provider-inmemory` crate
// - Real backends (Route53, Azure, Google Cloud DNS, ...) live outside
//   this repository and implement the same two methods.
//
// ## Usage
//
// ```rust,ignore
// use dns_sync_core::{Plan, Policy, Provider};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* Provider implementation */;
//
//     let current = provider.records().await?;
//     let plan = Plan::new(current, desired, vec![Policy::Sync]).calculate();
//     provider.apply_changes(&plan.changes).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::plan::Changes;

/// Trait for DNS provider implementations
///
/// A provider owns the authoritative view of one or more zones: it reports
/// the current records as endpoints and executes a computed change set
/// against its backend.
///
/// # Ownership labels
///
/// `records()` must populate [`crate::endpoint::OWNER_LABEL_KEY`] on every
/// endpoint whose backing record carries an ownership marker; the registry
/// layer relies on that label to protect foreign records.
///
/// # Idempotency
///
/// The core performs no retries. `apply_changes` is delivered at least
/// once by the enclosing control loop, so applying the same change set
/// twice must be safe for the backend.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Return all records currently held by the backend, as endpoints
    ///
    /// Multi-target records are flattened into one endpoint per target,
    /// all sharing the record's name, type and labels.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Endpoint>)`: The current state snapshot
    /// - `Err(Error)`: If the backend query failed
    async fn records(&self) -> Result<Vec<Endpoint>>;

    /// Execute a change set against the backend
    ///
    /// The caller guarantees the four lists partition cleanly: a record
    /// key appears in at most one of create/delete and at most one
    /// positionally-paired (update_old, update_new) entry.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: All changes were applied
    /// - `Err(Error)`: If any change failed; partial application is the
    ///   provider's own concern and is not rolled back by the core
    async fn apply_changes(&self, changes: &Changes) -> Result<()>;

    /// Get the provider name (for logging/debugging)
    ///
    /// # Returns
    ///
    /// A static string identifying the provider (e.g., "inmemory", "route53")
    fn provider_name(&self) -> &'static str;
}
