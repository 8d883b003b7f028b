// # In-Memory DNS Provider
//
// This crate provides an in-memory Provider implementation for the
// dns-sync system.
//
// ## Purpose
//
// A backend that holds its zones entirely in process memory, for tests,
// demos and dry-run validation of reconciliation behavior. It implements
// the same strict apply semantics a real backend would enforce, so code
// exercised against it fails the same way it would in production:
//
// - creating a record that already exists is an error
// - updating or deleting a record that does not exist is an error
// - a record name that matches no hosted zone is an error
// - record types other than A, CNAME and TXT are rejected
//
// A change batch is validated in full before any of it is applied; a bad
// batch leaves the zones untouched.
//
// ## Dry-Run Mode
//
// When constructed with `new_dry_run`, the provider validates incoming
// batches and logs the intended mutations without applying them.
//
// ## Ownership
//
// The provider stores endpoint-set labels verbatim and returns them from
// `records()`, so owner labels stamped by the registry layer round-trip
// through it like through a labeled backend record.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use dns_sync_core::endpoint::{Endpoint, EndpointSet, RecordType};
use dns_sync_core::plan::{Changes, RecordKey};
use dns_sync_core::traits::Provider;
use dns_sync_core::{Error, Result};

/// Records of one hosted zone, keyed by record identity.
type Zone = HashMap<RecordKey, EndpointSet>;

/// In-memory DNS provider
///
/// Holds a fixed set of hosted zones; record names are matched to zones
/// by DNS suffix, longest suffix winning.
///
/// # Example
///
/// ```rust,no_run
/// use dns_sync_provider_inmemory::InMemoryProvider;
///
/// let provider = InMemoryProvider::new(vec!["example.com".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryProvider {
    zones: Arc<RwLock<HashMap<String, Zone>>>,
    dry_run: bool,
}

impl InMemoryProvider {
    /// Create a provider hosting the given zones, all empty.
    pub fn new(zones: Vec<String>) -> Self {
        Self {
            zones: Arc::new(RwLock::new(
                zones.into_iter().map(|name| (name, Zone::new())).collect(),
            )),
            dry_run: false,
        }
    }

    /// Create a provider that validates and logs batches without applying
    /// them.
    pub fn new_dry_run(zones: Vec<String>) -> Self {
        Self {
            dry_run: true,
            ..Self::new(zones)
        }
    }

    /// Add a hosted zone
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Zone added
    /// - `Err(Error::AlreadyExists)`: The zone is already hosted
    pub async fn create_zone(&self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        let mut zones = self.zones.write().await;
        if zones.contains_key(&name) {
            return Err(Error::already_exists(format!("zone: {}", name)));
        }
        zones.insert(name, Zone::new());
        Ok(())
    }

    /// Number of records across all zones
    pub async fn len(&self) -> usize {
        self.zones.read().await.values().map(HashMap::len).sum()
    }

    /// Check if the provider holds no records
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// The hosted zone a record name belongs to, longest suffix winning.
    fn zone_for<'a>(zones: &'a HashMap<String, Zone>, dns_name: &str) -> Option<&'a str> {
        zones
            .keys()
            .filter(|zone| {
                dns_name == zone.as_str() || dns_name.ends_with(&format!(".{}", zone))
            })
            .max_by_key(|zone| zone.len())
            .map(String::as_str)
    }

    fn supported(record_type: &RecordType) -> bool {
        matches!(
            record_type,
            RecordType::A | RecordType::Cname | RecordType::Txt
        )
    }

    /// Check a whole batch against the current zones without mutating
    /// them. Keeps a failed apply from landing halfway.
    fn validate_batch(zones: &HashMap<String, Zone>, changes: &Changes) -> Result<()> {
        for set in changes.create.iter().chain(&changes.update_new).chain(&changes.delete) {
            if !Self::supported(&set.record_type) {
                return Err(Error::invalid_input(format!(
                    "unsupported record type: {}",
                    set.record_type
                )));
            }
        }

        for set in &changes.create {
            let zone = Self::zone_for(zones, &set.dns_name)
                .ok_or_else(|| Error::not_found(format!("zone for: {}", set.dns_name)))?;
            let key = RecordKey::new(set.record_type.clone(), set.dns_name.clone());
            if zones[zone].contains_key(&key) {
                return Err(Error::already_exists(format!("record: {}", key)));
            }
        }

        for set in changes.update_new.iter().chain(&changes.delete) {
            let zone = Self::zone_for(zones, &set.dns_name)
                .ok_or_else(|| Error::not_found(format!("zone for: {}", set.dns_name)))?;
            let key = RecordKey::new(set.record_type.clone(), set.dns_name.clone());
            if !zones[zone].contains_key(&key) {
                return Err(Error::not_found(format!("record: {}", key)));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Provider for InMemoryProvider {
    async fn records(&self) -> Result<Vec<Endpoint>> {
        let zones = self.zones.read().await;

        let mut records = Vec::new();
        for zone in zones.values() {
            for set in zone.values() {
                for target in &set.targets {
                    records.push(
                        Endpoint::new(
                            set.dns_name.clone(),
                            target.clone(),
                            set.record_type.clone(),
                        )
                        .with_labels(set.labels.clone()),
                    );
                }
            }
        }

        Ok(records)
    }

    async fn apply_changes(&self, changes: &Changes) -> Result<()> {
        let mut zones = self.zones.write().await;

        Self::validate_batch(&zones, changes)?;

        if self.dry_run {
            for set in &changes.create {
                info!("[dry-run] Would create record: {}", set);
            }
            for set in &changes.update_new {
                info!("[dry-run] Would update record: {}", set);
            }
            for set in &changes.delete {
                info!("[dry-run] Would delete record: {}", set);
            }
            return Ok(());
        }

        for set in &changes.create {
            let zone = Self::zone_for(&zones, &set.dns_name)
                .expect("validated above")
                .to_string();
            let key = RecordKey::new(set.record_type.clone(), set.dns_name.clone());
            info!("Creating record: {}", set);
            zones.get_mut(&zone).expect("validated above").insert(key, set.clone());
        }

        for set in &changes.update_new {
            let zone = Self::zone_for(&zones, &set.dns_name)
                .expect("validated above")
                .to_string();
            let key = RecordKey::new(set.record_type.clone(), set.dns_name.clone());
            info!("Updating record: {}", set);
            zones.get_mut(&zone).expect("validated above").insert(key, set.clone());
        }

        for set in &changes.delete {
            let zone = Self::zone_for(&zones, &set.dns_name)
                .expect("validated above")
                .to_string();
            let key = RecordKey::new(set.record_type.clone(), set.dns_name.clone());
            info!("Deleting record: {}", set);
            zones.get_mut(&zone).expect("validated above").remove(&key);
        }

        debug!(
            "Applied {} creates, {} updates, {} deletes",
            changes.create.len(),
            changes.update_new.len(),
            changes.delete.len()
        );

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "inmemory"
    }
}
