//! Test doubles and common utilities for reconciliation contract tests
//!
//! This module provides minimal Source and Provider doubles that let the
//! contract tests drive full reconciliation cycles without a real backend.

#![allow(dead_code)]

use dns_sync_core::endpoint::{Endpoint, RecordType};
use dns_sync_core::error::Result;
use dns_sync_core::plan::{Changes, RecordKey};
use dns_sync_core::traits::{Provider, Source};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A source whose desired endpoints can be swapped between cycles.
#[derive(Clone)]
pub struct MockSource {
    endpoints: Arc<Mutex<Vec<Endpoint>>>,
    call_count: Arc<AtomicUsize>,
}

impl MockSource {
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self {
            endpoints: Arc::new(Mutex::new(endpoints)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the desired endpoint list for the next cycle
    pub fn set_endpoints(&self, endpoints: Vec<Endpoint>) {
        *self.endpoints.lock().unwrap() = endpoints;
    }

    /// Get the number of times endpoints() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Source for MockSource {
    async fn endpoints(&self) -> Result<Vec<Endpoint>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.endpoints.lock().unwrap().clone())
    }
}

/// A provider double holding records in memory; applying a change set
/// mutates the stored state so the next cycle observes it. Clones share
/// the same state and counters.
#[derive(Clone)]
pub struct MockProvider {
    records: Arc<Mutex<Vec<Endpoint>>>,
    applied: Arc<Mutex<Vec<Changes>>>,
    apply_call_count: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn new(records: Vec<Endpoint>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            applied: Arc::new(Mutex::new(Vec::new())),
            apply_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times apply_changes() was called
    pub fn apply_call_count(&self) -> usize {
        self.apply_call_count.load(Ordering::SeqCst)
    }

    /// All change sets applied so far, in order
    pub fn applied(&self) -> Vec<Changes> {
        self.applied.lock().unwrap().clone()
    }

    /// Current stored records
    pub fn stored(&self) -> Vec<Endpoint> {
        self.records.lock().unwrap().clone()
    }

    fn remove_key(records: &mut Vec<Endpoint>, key: &RecordKey) {
        records.retain(|ep| ep.record_type != key.record_type || ep.dns_name != key.dns_name);
    }
}

#[async_trait::async_trait]
impl Provider for MockProvider {
    async fn records(&self) -> Result<Vec<Endpoint>> {
        Ok(self.records.lock().unwrap().clone())
    }

    async fn apply_changes(&self, changes: &Changes) -> Result<()> {
        self.apply_call_count.fetch_add(1, Ordering::SeqCst);
        self.applied.lock().unwrap().push(changes.clone());

        let mut records = self.records.lock().unwrap();
        for set in changes.create.iter().chain(&changes.update_new) {
            let key = RecordKey::new(set.record_type.clone(), set.dns_name.clone());
            Self::remove_key(&mut records, &key);
            for target in &set.targets {
                records.push(
                    Endpoint::new(set.dns_name.clone(), target.clone(), set.record_type.clone())
                        .with_labels(set.labels.clone()),
                );
            }
        }
        for set in &changes.delete {
            let key = RecordKey::new(set.record_type.clone(), set.dns_name.clone());
            Self::remove_key(&mut records, &key);
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Drive one reconciliation cycle: source → plan → policy → registry.
///
/// Returns the computed changes; empty change sets are not applied, the
/// way an enclosing control loop would skip a no-op cycle.
pub async fn reconcile<R: dns_sync_core::Registry>(
    source: &MockSource,
    registry: &R,
    policy: dns_sync_core::Policy,
) -> Changes {
    let desired = source.endpoints().await.expect("source yields endpoints");
    let current = registry.records().await.expect("registry yields records");

    let plan = dns_sync_core::Plan::new(current, desired, vec![policy]).calculate();
    if !plan.changes.is_empty() {
        registry
            .apply_changes(&plan.changes)
            .await
            .expect("apply succeeds");
    }
    plan.changes
}

/// Helper to build a labeled A-record endpoint
pub fn a_record(name: &str, target: &str) -> Endpoint {
    Endpoint::new(name, target, RecordType::A)
}

/// Sort endpoint sets by record key for deterministic assertions
pub fn sort_sets(sets: &mut [dns_sync_core::endpoint::EndpointSet]) {
    sets.sort_by_key(|set| RecordKey::new(set.record_type.clone(), set.dns_name.clone()));
}
