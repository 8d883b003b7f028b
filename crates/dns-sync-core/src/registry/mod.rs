//! Ownership-aware registry layer
//!
//! A [`Registry`] sits between the control loop and a [`Provider`] and
//! enforces the ownership concept on shared zones: every record created by
//! this system carries an owner label ([`OWNER_LABEL_KEY`]), and a registry
//! refuses to delete or rewrite records whose owner label belongs to a
//! different instance.
//!
//! Ownership gates only the entries that carry current-state labels —
//! deletes and update pre-images. Creates and update post-images originate
//! from desired state and have no prior ownership marker: a
//! never-before-seen name is implicitly ownable by whichever instance
//! creates it first.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dns_sync_core::registry::{LabelRegistry, Registry};
//!
//! let registry = LabelRegistry::new(provider, "instance-1");
//!
//! let current = registry.records().await?;
//! let plan = Plan::new(current, desired, vec![Policy::Sync]).calculate();
//! registry.apply_changes(&plan.changes).await?;
//! ```

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::debug;

use crate::endpoint::{Endpoint, EndpointSet, OWNER_LABEL_KEY};
use crate::error::Result;
use crate::plan::Changes;
use crate::traits::Provider;

/// Interface between the control loop and a provider, with ownership
/// semantics interposed.
///
/// `records` returns all records registered with the DNS provider, each
/// entry carrying its owner information in the labels. `apply_changes`
/// propagates the changes to the provider, restricted to records this
/// instance owns.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Current backend state, with ownership labels populated.
    async fn records(&self) -> Result<Vec<Endpoint>>;

    /// Execute a change set, subject to the registry's ownership rules.
    async fn apply_changes(&self, changes: &Changes) -> Result<()>;
}

/// Check one endpoint set against the owner id, noting at most one
/// diagnostic per distinct DNS name.
fn is_owned(owner_id: &str, set: &EndpointSet, noted: &mut HashSet<String>) -> bool {
    if set.owner() == owner_id {
        return true;
    }
    if noted.insert(set.dns_name.clone()) {
        debug!(
            "Skipping {} because owner id does not match, found: \"{}\", required: \"{}\"",
            set,
            set.owner(),
            owner_id
        );
    }
    false
}

/// Retain only the endpoint sets owned by `owner_id`.
///
/// An absent owner label reads as the empty string, so an empty `owner_id`
/// matches exactly the unlabeled sets — equal-string match, not a
/// wildcard. Dropped sets are noted at debug level, at most once per
/// distinct DNS name; this is not an error condition.
pub fn filter_owned_records(owner_id: &str, sets: Vec<EndpointSet>) -> Vec<EndpointSet> {
    let mut noted = HashSet::new();
    sets.into_iter()
        .filter(|set| is_owned(owner_id, set, &mut noted))
        .collect()
}

/// Apply the ownership rule to a whole change set, preserving the
/// update_old/update_new pairing invariant.
///
/// Creates pass through untouched (no prior ownership marker to check);
/// deletes are filtered directly; update pairs are retained or dropped
/// together based on the pre-image's owner.
pub fn filter_owned_changes(owner_id: &str, changes: &Changes) -> Changes {
    let mut noted = HashSet::new();

    let mut update_old = Vec::new();
    let mut update_new = Vec::new();
    for (old, new) in changes.update_old.iter().zip(&changes.update_new) {
        if is_owned(owner_id, old, &mut noted) {
            update_old.push(old.clone());
            update_new.push(new.clone());
        }
    }

    Changes {
        create: changes.create.clone(),
        update_old,
        update_new,
        delete: changes
            .delete
            .iter()
            .filter(|set| is_owned(owner_id, set, &mut noted))
            .cloned()
            .collect(),
    }
}

/// Registry without ownership semantics: passes records and changes
/// straight through to the wrapped provider.
///
/// For zones with a single writer, where ownership filtering is
/// unnecessary overhead.
pub struct NoopRegistry<P> {
    provider: P,
}

impl<P> NoopRegistry<P> {
    /// Wrap a provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: Provider> Registry for NoopRegistry<P> {
    async fn records(&self) -> Result<Vec<Endpoint>> {
        self.provider.records().await
    }

    async fn apply_changes(&self, changes: &Changes) -> Result<()> {
        self.provider.apply_changes(changes).await
    }
}

/// Registry that enforces ownership through record labels.
///
/// `records` passes the provider's state through unchanged (the provider
/// populates owner labels from whatever marker its backend stores).
/// `apply_changes` drops destructive entries owned by other instances,
/// then stamps this instance's owner label onto creates and update
/// post-images so the marker persists into the backend and comes back on
/// the next `records` call.
pub struct LabelRegistry<P> {
    provider: P,
    owner_id: String,
}

impl<P> LabelRegistry<P> {
    /// Wrap a provider, claiming records for `owner_id`.
    pub fn new(provider: P, owner_id: impl Into<String>) -> Self {
        Self {
            provider,
            owner_id: owner_id.into(),
        }
    }

    /// The owner id this registry filters for.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

#[async_trait]
impl<P: Provider> Registry for LabelRegistry<P> {
    async fn records(&self) -> Result<Vec<Endpoint>> {
        self.provider.records().await
    }

    async fn apply_changes(&self, changes: &Changes) -> Result<()> {
        let mut filtered = filter_owned_changes(&self.owner_id, changes);

        // Stamp the marker onto the sets this apply will write, so
        // ownership survives in the backend.
        for set in filtered.create.iter_mut().chain(&mut filtered.update_new) {
            set.labels
                .insert(OWNER_LABEL_KEY.to_string(), self.owner_id.clone());
        }

        self.provider.apply_changes(&filtered).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Labels, RecordType};
    use std::sync::{Arc, Mutex};

    fn owned_set(name: &str, owner: &str) -> EndpointSet {
        EndpointSet::new(name, RecordType::A, vec!["1.2.3.4".to_string()]).with_labels(
            Labels::from([(OWNER_LABEL_KEY.to_string(), owner.to_string())]),
        )
    }

    fn unlabeled_set(name: &str) -> EndpointSet {
        EndpointSet::new(name, RecordType::A, vec!["1.2.3.4".to_string()])
    }

    /// Provider double that records every applied change set; clones share
    /// the same recording.
    #[derive(Clone)]
    struct RecordingProvider {
        records: Vec<Endpoint>,
        applied: Arc<Mutex<Vec<Changes>>>,
    }

    impl RecordingProvider {
        fn new(records: Vec<Endpoint>) -> Self {
            Self {
                records,
                applied: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn applied(&self) -> Vec<Changes> {
            self.applied.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        async fn records(&self) -> Result<Vec<Endpoint>> {
            Ok(self.records.clone())
        }

        async fn apply_changes(&self, changes: &Changes) -> Result<()> {
            self.applied.lock().unwrap().push(changes.clone());
            Ok(())
        }

        fn provider_name(&self) -> &'static str {
            "recording"
        }
    }

    #[test]
    fn filter_keeps_matching_and_drops_mismatching_owners() {
        let sets = vec![
            owned_set("mine.example.com", "instance-1"),
            owned_set("theirs.example.com", "instance-2"),
        ];

        let filtered = filter_owned_records("instance-1", sets);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].dns_name, "mine.example.com");
    }

    #[test]
    fn empty_owner_id_matches_unlabeled_sets_exactly() {
        let sets = vec![
            unlabeled_set("bare.example.com"),
            owned_set("labeled.example.com", "instance-1"),
        ];

        // Equal-string match, not a wildcard: "" keeps only unlabeled sets
        let filtered = filter_owned_records("", sets);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].dns_name, "bare.example.com");
    }

    #[test]
    fn unlabeled_sets_do_not_match_a_real_owner_id() {
        let filtered = filter_owned_records("instance-1", vec![unlabeled_set("bare.example.com")]);
        assert!(filtered.is_empty());
    }

    #[test]
    fn change_filter_keeps_update_pairs_together() {
        let changes = Changes {
            create: vec![unlabeled_set("new.example.com")],
            update_old: vec![
                owned_set("mine.example.com", "instance-1"),
                owned_set("theirs.example.com", "instance-2"),
            ],
            update_new: vec![
                unlabeled_set("mine.example.com"),
                unlabeled_set("theirs.example.com"),
            ],
            delete: vec![
                owned_set("mine-gone.example.com", "instance-1"),
                owned_set("theirs-gone.example.com", "instance-2"),
            ],
        };

        let filtered = filter_owned_changes("instance-1", &changes);

        // creates are never gated on ownership
        assert_eq!(filtered.create.len(), 1);
        assert_eq!(filtered.update_old.len(), filtered.update_new.len());
        assert_eq!(filtered.update_old.len(), 1);
        assert_eq!(filtered.update_old[0].dns_name, "mine.example.com");
        assert_eq!(filtered.update_new[0].dns_name, "mine.example.com");
        assert_eq!(filtered.delete.len(), 1);
        assert_eq!(filtered.delete[0].dns_name, "mine-gone.example.com");
    }

    #[tokio::test]
    async fn noop_registry_passes_changes_through() {
        let provider = RecordingProvider::new(Vec::new());
        let changes = Changes {
            delete: vec![owned_set("theirs.example.com", "someone-else")],
            ..Changes::default()
        };

        let registry = NoopRegistry::new(provider.clone());
        registry.apply_changes(&changes).await.unwrap();

        let applied = provider.applied();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0], changes);
    }

    #[tokio::test]
    async fn label_registry_protects_foreign_records_and_stamps_its_own() {
        let provider = RecordingProvider::new(Vec::new());
        let registry = LabelRegistry::new(provider.clone(), "instance-1");

        let changes = Changes {
            create: vec![unlabeled_set("new.example.com")],
            update_old: vec![owned_set("theirs.example.com", "instance-2")],
            update_new: vec![unlabeled_set("theirs.example.com")],
            delete: vec![owned_set("theirs-gone.example.com", "instance-2")],
        };

        registry.apply_changes(&changes).await.unwrap();

        let applied = provider.applied();
        assert_eq!(applied.len(), 1);
        let applied = &applied[0];

        // foreign update pair and delete were dropped
        assert!(applied.update_old.is_empty());
        assert!(applied.update_new.is_empty());
        assert!(applied.delete.is_empty());

        // the create went through, stamped with our owner label
        assert_eq!(applied.create.len(), 1);
        assert_eq!(applied.create[0].owner(), "instance-1");
    }
}
