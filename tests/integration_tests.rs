//! Integration tests using mock HTTP server
//!
//! Drives the public `Provider` surface end to end: JSON plan in, API calls
//! against a mock Streamkap server, JSON state out.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use streamkap_provider::{ErrorKind, Provider, ProviderConfig};
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const POSTGRES: &str = "streamkap_source_postgresql";
const SNOWFLAKE: &str = "streamkap_destination_snowflake";

async fn setup() -> (MockServer, Provider) {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/access-token"))
        .and(body_json(json!({"clientId": "client-id", "secret": "client-secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-1",
            "refreshToken": "refresh-1",
            "expiresIn": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ProviderConfig::new("client-id", "client-secret")
        .with_host(server.uri())
        .resolve()
        .unwrap();
    let provider = Provider::new(&config).unwrap();
    (server, provider)
}

fn paged(items: Value) -> Value {
    let total = items.as_array().map_or(0, Vec::len);
    json!({"result": items, "total": total, "page": 1, "page_size": 100})
}

fn postgres_plan() -> Value {
    json!({
        "name": "orders-db",
        "database_hostname": "db.example.com",
        "database_user": "streamkap",
        "database_password": "hunter2",
        "database_dbname": "shop",
        "schema_include_list": "public",
        "table_include_list": "public.orders"
    })
}

fn postgres_record() -> Value {
    json!({
        "id": "abc",
        "name": "orders-db",
        "connector": "postgresql",
        "config": {
            "database.hostname.user.defined": "db.example.com",
            "database.port.user.defined": "5432",
            "database.user": "streamkap",
            "database.password": "hunter2",
            "database.dbname": "shop",
            "schema.include.list": "public",
            "table.include.list.user.defined": "public.orders",
            "slot.name": "streamkap_pgoutput_slot",
            "publication.name": "streamkap_pub"
        }
    })
}

// ============================================================================
// Sources and destinations
// ============================================================================

#[tokio::test]
async fn test_postgres_source_create_read_import() {
    let (server, provider) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/sources"))
        .and(header("Authorization", "Bearer access-1"))
        .and(body_partial_json(json!({
            "name": "orders-db",
            "connector": "postgresql",
            "config": {"database.hostname.user.defined": "db.example.com"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(postgres_record()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sources/abc"))
        .and(query_param("secret_returned", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paged(json!([postgres_record()]))))
        .mount(&server)
        .await;

    let created = provider.create(POSTGRES, &postgres_plan()).await.unwrap();
    assert_eq!(created["id"], json!("abc"));
    assert_eq!(created["connector"], json!("postgresql"));
    assert_eq!(created["database_port"], json!("5432"));
    assert_eq!(created["ssh_enabled"], json!(false));

    let read = provider.read(POSTGRES, &created).await.unwrap().unwrap();
    assert_eq!(read, created);

    let imported = provider.import(POSTGRES, "abc").await.unwrap().unwrap();
    assert_eq!(imported, created);
}

#[tokio::test]
async fn test_snowflake_private_key_survives_redaction() {
    let (server, provider) = setup().await;

    let record = json!({
        "id": "dst-1",
        "name": "warehouse",
        "connector": "snowflake",
        "config": {
            "snowflake.url.name": "https://xy12345.snowflakecomputing.com",
            "snowflake.user.name": "STREAMKAP",
            "snowflake.private.key": "***",
            "snowflake.database.name": "RAW",
            "snowflake.schema.name": "CDC"
        }
    });
    Mock::given(method("POST"))
        .and(path("/api/destinations"))
        .and(body_partial_json(json!({"config": {"snowflake.private.key": "PRIV"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(record.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/destinations"))
        .and(query_param("id", "dst-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paged(json!([record]))))
        .mount(&server)
        .await;

    let plan = json!({
        "name": "warehouse",
        "snowflake_url_name": "https://xy12345.snowflakecomputing.com",
        "snowflake_user_name": "STREAMKAP",
        "snowflake_private_key": "PRIV",
        "snowflake_database_name": "RAW",
        "snowflake_schema_name": "CDC"
    });
    let created = provider.create(SNOWFLAKE, &plan).await.unwrap();
    assert_eq!(created["snowflake_private_key"], json!("PRIV"));

    let read = provider.read(SNOWFLAKE, &created).await.unwrap().unwrap();
    assert_eq!(read["snowflake_private_key"], json!("PRIV"));
    assert_eq!(read["ingestion_mode"], json!("append"));
}

#[tokio::test]
async fn test_externally_deleted_source_leaves_state() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/sources/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paged(json!([]))))
        .mount(&server)
        .await;

    let state = json!({"id": "abc", "name": "orders-db"});
    assert!(provider.read(POSTGRES, &state).await.unwrap().is_none());
}

#[tokio::test]
async fn test_validation_error_surfaces_server_body() {
    let (server, provider) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/sources"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string("{\"detail\":\"cannot reach database\"}"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = provider.create(POSTGRES, &postgres_plan()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("cannot reach database"));
    assert!(!err.to_string().contains("hunter2"));
}

// ============================================================================
// Topics
// ============================================================================

#[tokio::test]
async fn test_topic_partition_count_changes() {
    let (server, provider) = setup().await;

    for count in [10, 20] {
        Mock::given(method("PUT"))
            .and(path("/api/topics/s1.public.orders"))
            .and(body_json(json!({"partition_count": count})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"partition_count": count})),
            )
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("PUT"))
        .and(path("/api/topics/s1.public.orders"))
        .and(body_json(json!({"partition_count": 5})))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string("{\"detail\":\"partition count cannot be decreased\"}"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let plan = |count: i64| json!({"topic_id": "s1.public.orders", "partition_count": count});

    let created = provider.create("streamkap_topic", &plan(10)).await.unwrap();
    assert_eq!(created["partition_count"], json!(10));

    let grown = provider
        .update("streamkap_topic", &created, &plan(20))
        .await
        .unwrap();
    assert_eq!(grown["partition_count"], json!(20));

    let err = provider
        .update("streamkap_topic", &grown, &plan(5))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("cannot be decreased"));
}

// ============================================================================
// Pipelines
// ============================================================================

#[tokio::test]
async fn test_pipeline_delete_is_idempotent() {
    let (server, provider) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/pipelines/pl-1"))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/pipelines/pl-1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/pipelines/pl-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paged(json!([]))))
        .mount(&server)
        .await;

    let state = json!({
        "id": "pl-1",
        "name": "orders-to-warehouse",
        "source": {"id": "src-1", "topics": ["public.orders"]},
        "destination": {"id": "dst-1"}
    });
    provider.delete("streamkap_pipeline", &state).await.unwrap();
    provider.delete("streamkap_pipeline", &state).await.unwrap();
    assert!(provider
        .read("streamkap_pipeline", &state)
        .await
        .unwrap()
        .is_none());
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_token_is_fetched_once_and_reused() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tags/t1"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paged(json!([
            {"id": "t1", "name": "prod", "type": ["sources"]}
        ]))))
        .expect(2)
        .mount(&server)
        .await;

    provider.import("streamkap_tag", "t1").await.unwrap().unwrap();
    provider.import("streamkap_tag", "t1").await.unwrap().unwrap();
}
