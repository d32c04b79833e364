//! Offline tests for asinkit-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::path::PathBuf;

use asinkit_core::{AppConfig, Environment};
use asinkit_db::{connect_pool_from_config, DbError, FamilyRunRow, PoolConfig};

fn app_config(database_url: Option<&str>) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        log_level: "info".to_string(),
        bind_addr: "127.0.0.1:3000".parse().expect("valid socket address"),
        // Database maintenance runs without a product API key.
        api_key: None,
        api_base_url: "https://api.rainforestapi.com/request".to_string(),
        amazon_domain: "amazon.com".to_string(),
        output_dir: PathBuf::from("."),
        request_timeout_secs: 30,
        user_agent: "ua".to_string(),
        inter_request_delay_ms: 250,
        database_url: database_url.map(str::to_string),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config(Some("postgres://example")));
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[tokio::test]
async fn connecting_without_database_url_fails_fast() {
    let err = connect_pool_from_config(&app_config(None))
        .await
        .expect_err("no database configured");
    assert!(matches!(err, DbError::MissingDatabaseUrl));
    assert_eq!(err.to_string(), "DATABASE_URL is not set");
}

/// Compile-time smoke test: confirm that [`FamilyRunRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn family_run_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = FamilyRunRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        seed_asin: "B001".to_string(),
        parent_asin: "B000".to_string(),
        attribute_names: serde_json::json!(["Color", "Size"]),
        parent_title_normalized: "widget".to_string(),
        parent_title_excluding_variant_normalized: String::new(),
        member_count: 3_i32,
        unavailable_count: 1_i32,
        created_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.seed_asin, "B001");
    assert_eq!(row.attribute_names[1], "Size");
    assert_eq!(row.member_count, 3);
    assert_eq!(row.unavailable_count, 1);
}
