//! Plan computation
//!
//! A [`Plan`] converts a desired and a current endpoint snapshot into the
//! series of create, update and delete actions that converge the backend
//! toward the desired state.
//!
//! ## Data Flow
//!
//! ```text
//! ┌──────────┐  desired   ┌──────────────┐  Changes   ┌──────────┐
//! │  Source  │───────────▶│     Plan     │───────────▶│  Policy  │
//! └──────────┘            │  (calculate) │            │  chain   │
//! ┌──────────┐  current   └──────────────┘            └────┬─────┘
//! │ Provider │───────────▶                                 │
//! └──────────┘◀───────────────────────────────────────────┘
//!                apply_changes (via the registry layer)
//! ```
//!
//! ## Lifecycle
//!
//! A plan is built fresh for every reconciliation cycle, computed once via
//! [`Plan::calculate`], and discarded. It owns no cross-cycle state; in
//! particular the alias index lives inside the plan, never at module level.
//!
//! ## Alias resolution
//!
//! Desired endpoints flagged as alias targets are collected into an index
//! keyed by their DNS name. A regular desired endpoint with record type
//! [`RecordType::InternalAlias`] then resolves through that index: each
//! registered alias contributes its concrete target under the alias's own
//! record type, bucketed at the regular endpoint's DNS name. An
//! `InternalAlias` endpoint whose target has no index entry contributes
//! nothing this cycle and is dropped from the plan without diagnostics.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::endpoint::{targets_match, Endpoint, EndpointSet, Labels, RecordType};
use crate::policy::Policy;

/// Identity of an aggregation bucket: one (record type, DNS name) pair.
///
/// `Ord` is derived so tests and callers can sort change lists into a
/// deterministic order; bucket iteration order is otherwise unspecified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    /// Record type of the bucket.
    pub record_type: RecordType,
    /// DNS name of the bucket (case-sensitive).
    pub dns_name: String,
}

impl RecordKey {
    /// Create a record key.
    pub fn new(record_type: RecordType, dns_name: impl Into<String>) -> Self {
        Self {
            record_type,
            dns_name: dns_name.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.record_type, self.dns_name)
    }
}

/// Lists of actions to be executed by a DNS provider.
///
/// Every record key appears in at most one of `create`/`delete` and at most
/// one matched (`update_old`, `update_new`) pair. The two update lists
/// always have equal length and are positionally paired by identical record
/// key: `update_old[i]` is the pre-image of `update_new[i]`, both carrying
/// the current-state labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    /// Records that need to be created
    pub create: Vec<EndpointSet>,
    /// Records that need to be updated (current data)
    pub update_old: Vec<EndpointSet>,
    /// Records that need to be updated (desired data)
    pub update_new: Vec<EndpointSet>,
    /// Records that need to be deleted
    pub delete: Vec<EndpointSet>,
}

impl Changes {
    /// True when all four lists are empty.
    pub fn is_empty(&self) -> bool {
        self.create.is_empty()
            && self.update_old.is_empty()
            && self.update_new.is_empty()
            && self.delete.is_empty()
    }
}

/// Aggregation state for one reconciliation pass.
///
/// Built from the two endpoint snapshots by [`Plan::new`], computed once by
/// [`Plan::calculate`]. The bucket maps stay accessible for inspection and
/// tests; downstream execution consumes only [`Plan::changes`].
pub struct Plan {
    /// Alias index: DNS name → alias-target endpoints registered under it.
    pub aliases: HashMap<String, Vec<Endpoint>>,

    /// Labels snapshot from current state, per record key.
    ///
    /// When several current endpoints share a key, the last one processed
    /// wins. Ownership labels are expected to be uniform per record, so
    /// this approximation is accepted rather than reconciled.
    pub labels: HashMap<RecordKey, Labels>,

    /// Current-state target buckets.
    pub current_targets: HashMap<RecordKey, Vec<String>>,

    /// Desired-state target buckets, after alias expansion.
    pub desired_targets: HashMap<RecordKey, Vec<String>>,

    /// Policies under which the desired changes are calculated, applied in
    /// order.
    pub policies: Vec<Policy>,

    /// The changes necessary to move toward desired state.
    ///
    /// Empty until [`Plan::calculate`] has run.
    pub changes: Changes,
}

impl Plan {
    /// Aggregate two endpoint snapshots into a plan.
    ///
    /// Desired endpoints flagged `alias_target` go into the alias index;
    /// the remaining desired endpoints are bucketed per record key, with
    /// `InternalAlias` endpoints resolved through the index (an endpoint
    /// whose target has no index entry is dropped silently). Current
    /// endpoints are bucketed by their own key, recording their labels.
    pub fn new(current: Vec<Endpoint>, desired: Vec<Endpoint>, policies: Vec<Policy>) -> Self {
        // collect aliases
        let mut aliases: HashMap<String, Vec<Endpoint>> = HashMap::new();
        let mut records = Vec::new();
        for ep in desired {
            if ep.alias_target {
                aliases.entry(ep.dns_name.clone()).or_default().push(ep);
            } else {
                records.push(ep);
            }
        }

        // aggregate desired endpoint target values
        let mut desired_targets: HashMap<RecordKey, Vec<String>> = HashMap::new();
        for ep in records {
            if ep.record_type == RecordType::InternalAlias {
                // expand aliases
                if let Some(found) = aliases.get(&ep.target) {
                    for alias in found {
                        let key = RecordKey::new(alias.record_type.clone(), ep.dns_name.clone());
                        desired_targets
                            .entry(key)
                            .or_default()
                            .push(alias.target.clone());
                    }
                }
            } else {
                let key = RecordKey::new(ep.record_type, ep.dns_name);
                desired_targets.entry(key).or_default().push(ep.target);
            }
        }

        // aggregate current endpoint target values
        let mut current_targets: HashMap<RecordKey, Vec<String>> = HashMap::new();
        let mut labels: HashMap<RecordKey, Labels> = HashMap::new();
        for ep in current {
            let Endpoint {
                dns_name,
                target,
                record_type,
                labels: ep_labels,
                ..
            } = ep;
            let key = RecordKey::new(record_type, dns_name);
            labels.insert(key.clone(), ep_labels);
            current_targets.entry(key).or_default().push(target);
        }

        Self {
            aliases,
            labels,
            current_targets,
            desired_targets,
            policies,
            changes: Changes::default(),
        }
    }

    /// Compute the actions needed to move current state towards desired
    /// state, then pass them through the configured policies in order.
    ///
    /// Returns a new plan carrying the same buckets with
    /// [`Plan::changes`] populated. Pure over the aggregated buckets: no
    /// I/O, no failure mode.
    pub fn calculate(self) -> Plan {
        let mut changes = Changes::default();

        for (key, desired) in &self.desired_targets {
            match self.current_targets.get(key) {
                None => {
                    changes.create.push(EndpointSet::new(
                        key.dns_name.clone(),
                        key.record_type.clone(),
                        desired.clone(),
                    ));
                }
                Some(current) if targets_match(current, desired) => {
                    debug!(
                        "Skipping {} -> ({:?}) because targets have not changed",
                        key, desired
                    );
                }
                Some(current) => {
                    let labels = self.labels.get(key).cloned().unwrap_or_default();
                    changes.update_old.push(
                        EndpointSet::new(
                            key.dns_name.clone(),
                            key.record_type.clone(),
                            current.clone(),
                        )
                        .with_labels(labels.clone()),
                    );
                    changes.update_new.push(
                        EndpointSet::new(
                            key.dns_name.clone(),
                            key.record_type.clone(),
                            desired.clone(),
                        )
                        .with_labels(labels),
                    );
                }
            }
        }

        for (key, current) in &self.current_targets {
            if !self.desired_targets.contains_key(key) {
                let labels = self.labels.get(key).cloned().unwrap_or_default();
                changes.delete.push(
                    EndpointSet::new(
                        key.dns_name.clone(),
                        key.record_type.clone(),
                        current.clone(),
                    )
                    .with_labels(labels),
                );
            }
        }

        for policy in &self.policies {
            changes = policy.apply(changes);
        }

        Plan { changes, ..self }
    }
}
