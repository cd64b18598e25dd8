//! A gateway in front of a simulated record store.
//!
//! Loads the gateway from TOML, sends product reads, alert writes and a burst
//! against a failing scraper, then prints the snapshot and the health report.
//!
//! Run with: RUST_LOG=debug cargo run --example price_gateway

use pricewatch_core::CallError;
use pricewatch_gateway::{
    probe_reachability, GatewayConfig, GatewayLayer, GatewayRequest, RecordPage, RecordQuery,
    ResilienceGateway, ResilienceGatewayBuilder,
};
use pricewatch_health::{check_memory, component, Components};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::{service_fn, Layer, ServiceExt};
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"
name = "provider-api"
default_dependency = "record_store"

[cache]
capacity = 200
eviction_batch = 20

[rate_limit]
window_ms = 60000
default_limit = 100

[circuit_breaker]
failure_threshold = 3
cooldown_ms = 30000

[retry]
timeout_ms = 2000
max_retries = 3
base_delay_ms = 100
max_jitter_ms = 50

[operations.list_products]
rate_limit = 300
cache_ttl_ms = 60000

[operations.list_alerts]
rate_limit = 300
cache_ttl_ms = 15000

[operations.create_alert]
rate_limit = 20
invalidates = ["list_alerts"]

[operations.scrape_store]
rate_limit = 10
dependency = "scraper"
"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Price Gateway Example");
    println!("=====================\n");

    let config = GatewayConfig::from_toml_str(CONFIG)?;
    let gateway: ResilienceGateway<RecordPage> =
        ResilienceGatewayBuilder::from_config(&config).build();

    // Every third call to the record store fails with a 503
    let store_calls = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&store_calls);
    let record_store = service_fn(move |query: RecordQuery| {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if n % 3 == 2 {
                return Err(CallError::status(503, "record store overloaded"));
            }
            let mut row = BTreeMap::new();
            row.insert("operation".to_string(), query.operation);
            row.insert("sku".to_string(), format!("sku-{n}"));
            Ok(RecordPage::new(vec![row], 1))
        }
    });
    let service = GatewayLayer::new(gateway.clone()).layer(record_store);

    println!("1. Product reads (cached for 60 s):");
    for client in ["dashboard", "dashboard", "mobile"] {
        let request = GatewayRequest::new("list_products", client).param("store", "42");
        let page = service.clone().oneshot(request).await?;
        println!("   {client}: {:?}", page.rows[0].get("sku"));
    }

    println!("\n2. Alert write invalidates cached alert reads:");
    let alerts = GatewayRequest::new("list_alerts", "dashboard");
    service.clone().oneshot(alerts.clone()).await?;
    service
        .clone()
        .oneshot(GatewayRequest::new("create_alert", "dashboard").param("sku", "sku-1"))
        .await?;
    println!("   cached entries after write: {}", gateway.cache().len());
    service.clone().oneshot(alerts).await?;

    println!("\n3. Scraper failing until its circuit opens:");
    for attempt in 1..=3 {
        let result = gateway
            .call(
                &GatewayRequest::new("scrape_store", "scheduler"),
                || async { Err::<RecordPage, _>(CallError::transport("connection refused")) },
            )
            .await;
        if let Err(err) = result {
            println!("   call {attempt}: {err} (status {})", err.status_code());
        }
    }

    println!("\n4. Snapshot:");
    let snapshot = gateway.snapshot();
    println!("   requests: {}", snapshot.metrics.total);
    println!("   errors: {}", snapshot.metrics.error);
    println!("   cache hit rate: {:.2}", snapshot.metrics.cache_hit_rate());
    println!(
        "   average latency: {:.1} ms",
        snapshot.metrics.average_response_time_ms
    );
    for circuit in &snapshot.circuits {
        println!("   circuit {}: {}", circuit.dependency, circuit.state);
    }
    println!(
        "   record store calls: {}",
        store_calls.load(Ordering::SeqCst)
    );

    println!("\n5. Health:");
    let database = || async { true };
    let mut probed = Components::new();
    probed.insert(
        component::DATABASE.to_string(),
        probe_reachability(&database, Duration::from_secs(2)).await,
    );
    probed.insert(
        component::MEMORY.to_string(),
        check_memory(512 * 1024 * 1024, 2 * 1024 * 1024 * 1024),
    );

    let report = gateway.health(probed);
    println!("   score: {} ({})", report.score, report.status.as_str());
    for (name, health) in &report.components {
        println!(
            "   {name}: {} {}{}",
            health.status.as_str(),
            health.score,
            health
                .message
                .as_deref()
                .map(|m| format!(" ({m})"))
                .unwrap_or_default()
        );
    }

    Ok(())
}
