//! Minimal embedding example for dns-sync-core
//!
//! This example demonstrates using dns-sync-core as a library in a custom
//! application: a static source, an in-memory provider and an
//! ownership-aware registry, driven through reconciliation cycles by a
//! control loop the application owns.

use anyhow::Result;
use dns_sync_core::{
    Changes, Endpoint, LabelRegistry, NoopRegistry, Plan, Policy, Provider, RecordType, Registry,
    RegistryConfig, Source, StaticSource, SyncConfig,
};
use dns_sync_provider_inmemory::InMemoryProvider;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// One reconciliation cycle: source → plan → policy → registry.
async fn run_cycle(
    source: &dyn Source,
    registry: &dyn Registry,
    policy: Policy,
) -> Result<Changes> {
    let desired = source.endpoints().await?;
    let current = registry.records().await?;

    let plan = Plan::new(current, desired, vec![policy]).calculate();
    if plan.changes.is_empty() {
        info!("Backend is converged, nothing to apply");
    } else {
        registry.apply_changes(&plan.changes).await?;
    }

    Ok(plan.changes)
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = SyncConfig {
        registry: RegistryConfig::Label {
            owner_id: "demo-instance".to_string(),
        },
        ..SyncConfig::new()
    };
    config.validate()?;

    let provider = InMemoryProvider::new(vec!["example.com".to_string()]);
    let registry: Box<dyn Registry> = match &config.registry {
        RegistryConfig::Noop => Box::new(NoopRegistry::new(provider.clone())),
        RegistryConfig::Label { owner_id } => {
            Box::new(LabelRegistry::new(provider.clone(), owner_id.clone()))
        }
    };

    // The desired state: a concrete record reached through an internal
    // alias, plus a CNAME riding on top of it.
    let source = StaticSource::new(vec![
        Endpoint::new_alias_target("lb", "203.0.113.10", RecordType::A),
        Endpoint::new("app.example.com", "lb", RecordType::InternalAlias),
        Endpoint::new("www.example.com", "app.example.com", RecordType::Cname),
    ]);

    let policy = config.policy.to_policy();

    // First cycle: the zone is empty, everything gets created
    let changes = run_cycle(&source, registry.as_ref(), policy.clone()).await?;
    println!(
        "cycle 1: created {} record set(s)",
        changes.create.len()
    );
    for record in provider.records().await? {
        println!("  stored: {}", record);
    }

    // Second cycle: the backend reflects desired state, nothing happens
    let changes = run_cycle(&source, registry.as_ref(), policy).await?;
    println!(
        "cycle 2: {} changes, backend holds {} record(s)",
        if changes.is_empty() { "no" } else { "unexpected" },
        provider.len().await
    );

    Ok(())
}
