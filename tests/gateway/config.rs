//! Building a gateway from a TOML file.

use pricewatch_core::CallError;
use pricewatch_gateway::{ConfigError, GatewayConfig, GatewayRequest, ResilienceGatewayBuilder};
use std::path::PathBuf;
use std::time::Duration;

const CONFIG: &str = r#"
name = "provider-api"
default_dependency = "data_platform"

[cache]
capacity = 500
eviction_batch = 50

[rate_limit]
window_ms = 60000
default_limit = 100

[circuit_breaker]
failure_threshold = 3
cooldown_ms = 30000

[retry]
timeout_ms = 10000
max_retries = 3
base_delay_ms = 1000

[operations.list_products]
rate_limit = 300
cache_ttl_ms = 60000

[operations.sync_prices]
rate_limit = 10
invalidates = ["list_products"]

[operations.scrape_stats]
rate_limit = 100
cache_ttl_ms = 600000
dependency = "scraper"
"#;

fn write_config(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("pricewatch-{}-{name}.toml", std::process::id()));
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test(start_paused = true)]
async fn loads_and_applies_a_config_file() {
    let path = write_config("valid", CONFIG);
    let config = GatewayConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let gateway = ResilienceGatewayBuilder::from_config(&config).build();

    assert_eq!(gateway.name(), "provider-api");
    assert_eq!(gateway.limits().limit_for("list_products"), 300);
    assert_eq!(gateway.limits().limit_for("sync_prices"), 10);
    assert_eq!(gateway.limits().limit_for("unlisted"), 100);
    assert_eq!(
        gateway.profile("list_products").unwrap().cache_ttl(),
        Some(Duration::from_secs(60))
    );

    gateway
        .call(&GatewayRequest::new("scrape_stats", "c1"), || async {
            Ok::<_, CallError>(42u64)
        })
        .await
        .unwrap();
    gateway
        .call(&GatewayRequest::new("list_products", "c1"), || async {
            Ok::<_, CallError>(7u64)
        })
        .await
        .unwrap();

    let snapshot = gateway.snapshot();
    let dependencies: Vec<&str> = snapshot
        .circuits
        .iter()
        .map(|c| c.dependency.as_str())
        .collect();
    assert_eq!(dependencies, vec!["data_platform", "scraper"]);
    assert_eq!(snapshot.cache_size, 2);
}

#[test]
fn invalid_file_reports_every_problem() {
    let path = write_config(
        "invalid",
        r#"
        default_dependency = ""

        [circuit_breaker]
        failure_threshold = 0

        [operations.list_products]
        cache_ttl_ms = 0
        "#,
    );
    let err = GatewayConfig::load(&path).unwrap_err();
    std::fs::remove_file(&path).unwrap();

    let ConfigError::Validation(errors) = &err else {
        panic!("expected validation error, got {err}");
    };
    assert_eq!(errors.len(), 3);
    assert!(err.to_string().contains("circuit_breaker.failure_threshold"));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let path = write_config("malformed", "[cache\ncapacity = 1");
    let err = GatewayConfig::load(&path).unwrap_err();
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(err, ConfigError::Parse(_)));
}
