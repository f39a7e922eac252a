//! Tests for the Streamkap API client

use super::*;
use crate::error::ErrorKind;
use crate::test_support::{mock_client, paged};
use crate::types::ConnectorFamily;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn postgres_config() -> serde_json::Map<String, serde_json::Value> {
    json!({
        "database.hostname.user.defined": "db.example.com",
        "database.port.user.defined": "5432"
    })
    .as_object()
    .cloned()
    .unwrap_or_default()
}

// ============================================================================
// Wire types
// ============================================================================

#[test]
fn test_paged_response_accepts_pascal_case() {
    let page: PagedResponse<Tag> = serde_json::from_value(json!({
        "Result": [{"id": "t1", "name": "prod"}],
        "Total": 1,
        "Page": 1,
        "PageSize": 10
    }))
    .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.page_size, 10);
    assert_eq!(page.into_first().unwrap().name, "prod");
}

#[test]
fn test_pipeline_transforms_accept_ids_and_objects() {
    let pipeline: Pipeline = serde_json::from_value(json!({
        "id": "p1",
        "name": "orders",
        "source": {"id": "s1", "topics": null},
        "destination": {"id": "d1"},
        "transforms": ["t1", {"id": "t2", "name": "mask"}]
    }))
    .unwrap();

    assert_eq!(pipeline.transforms, vec!["t1", "t2"]);
    assert!(pipeline.source.topics.is_empty());
    assert!(pipeline.snapshot_new_tables);
}

#[test]
fn test_pipeline_null_transforms_is_empty() {
    let pipeline: Pipeline = serde_json::from_value(json!({
        "name": "orders",
        "source": {"id": "s1"},
        "destination": {"id": "d1"},
        "transforms": null
    }))
    .unwrap();
    assert!(pipeline.transforms.is_empty());
}

#[test]
fn test_new_entities_serialize_without_id() {
    let tag = Tag {
        id: String::new(),
        name: "prod".to_string(),
        description: None,
        tag_type: vec!["sources".to_string()],
        system: false,
        custom: true,
    };
    let value = serde_json::to_value(&tag).unwrap();
    assert!(value.get("id").is_none());
    assert_eq!(value["type"], json!(["sources"]));
}

#[test]
fn test_transform_accepts_transform_key() {
    let transform: Transform =
        serde_json::from_value(json!({"id": "t1", "name": "mask", "transform": "map_filter"}))
            .unwrap();
    assert_eq!(transform.transform_type, "map_filter");
    let record = ConnectorRecord::from(transform);
    assert_eq!(record.family, ConnectorFamily::Transform);
    assert_eq!(record.kind, "map_filter");
}

#[test]
fn test_encode_segment() {
    assert_eq!(encode_segment("abc-123"), "abc-123");
    assert_eq!(encode_segment("source_1.public.users"), "source_1.public.users");
    assert_eq!(encode_segment("a/b c"), "a%2Fb%20c");
}

// ============================================================================
// Sources
// ============================================================================

#[tokio::test]
async fn test_get_source_requests_secrets() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/sources/src-1"))
        .and(query_param("secret_returned", "true"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paged(json!([{
            "id": "src-1",
            "name": "orders-db",
            "connector": "postgresql",
            "config": {"database.password": "hunter2"}
        }]))))
        .expect(1)
        .mount(&server)
        .await;

    let source = client.get_source("src-1").await.unwrap().unwrap();
    assert_eq!(source.name, "orders-db");
    assert_eq!(source.connector, "postgresql");
    assert_eq!(source.config["database.password"], json!("hunter2"));
}

#[tokio::test]
async fn test_get_source_empty_result_is_none() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/sources/gone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paged(json!([]))))
        .mount(&server)
        .await;

    assert!(client.get_source("gone").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_source_404_is_none() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/sources/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(client.get_source("gone").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_source_posts_full_body() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/sources"))
        .and(body_json(json!({
            "name": "orders-db",
            "connector": "postgresql",
            "config": {
                "database.hostname.user.defined": "db.example.com",
                "database.port.user.defined": "5432"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "src-9",
            "name": "orders-db",
            "connector": "postgresql",
            "config": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ConnectorRequest {
        name: "orders-db".to_string(),
        connector: "postgresql".to_string(),
        config: postgres_config(),
    };
    let source = client.create_source(&request).await.unwrap();
    assert_eq!(source.id, "src-9");
}

#[tokio::test]
async fn test_create_accepts_enveloped_response() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/sources"))
        .respond_with(ResponseTemplate::new(201).set_body_json(paged(json!([{
            "id": "src-10",
            "name": "orders-db",
            "connector": "postgresql"
        }]))))
        .mount(&server)
        .await;

    let record = client
        .create_connector(
            ConnectorFamily::Source,
            "orders-db",
            "postgresql",
            postgres_config(),
        )
        .await
        .unwrap();
    assert_eq!(record.id, "src-10");
    assert_eq!(record.family, ConnectorFamily::Source);
}

#[tokio::test]
async fn test_create_validation_error_not_retried() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/sources"))
        .respond_with(ResponseTemplate::new(422).set_body_string("slot_name is required"))
        .expect(1)
        .mount(&server)
        .await;

    let request = ConnectorRequest {
        name: "orders-db".to_string(),
        connector: "postgresql".to_string(),
        config: postgres_config(),
    };
    let err = client.create_source(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("slot_name is required"));
}

#[tokio::test]
async fn test_update_source_puts_to_id_path() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("PUT"))
        .and(path("/api/sources/src-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "src-1",
            "name": "renamed",
            "connector": "postgresql"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ConnectorRequest {
        name: "renamed".to_string(),
        connector: "postgresql".to_string(),
        config: postgres_config(),
    };
    let source = client.update_source("src-1", &request).await.unwrap();
    assert_eq!(source.name, "renamed");
}

#[tokio::test]
async fn test_delete_not_found_is_success() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("DELETE"))
        .and(path("/api/sources/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_source("gone").await.unwrap();
}

#[tokio::test]
async fn test_delete_forbidden_is_error() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("DELETE"))
        .and(path("/api/sources/locked"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client.delete_source("locked").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

// ============================================================================
// Destinations and transforms
// ============================================================================

#[tokio::test]
async fn test_get_destination_filters_by_id_param() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/destinations"))
        .and(query_param("id", "dst-1"))
        .and(query_param("secret_returned", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paged(json!([{
            "id": "dst-1",
            "name": "warehouse",
            "connector": "snowflake"
        }]))))
        .expect(1)
        .mount(&server)
        .await;

    let record = client
        .get_connector(ConnectorFamily::Destination, "dst-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.kind, "snowflake");
    assert_eq!(record.family, ConnectorFamily::Destination);
}

#[tokio::test]
async fn test_get_destination_ignores_other_ids_in_page() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/destinations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paged(json!([
            {"id": "dst-1", "name": "warehouse", "connector": "snowflake"},
            {"id": "dst-2", "name": "lake", "connector": "s3"}
        ]))))
        .mount(&server)
        .await;

    let found = client.get_destination("dst-2").await.unwrap().unwrap();
    assert_eq!(found.id, "dst-2");
    assert_eq!(found.name, "lake");

    assert!(client.get_destination("dst-3").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_transform_disables_topic_unwinding() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/transforms/tr-1"))
        .and(query_param("unwind_topics", "false"))
        .and(query_param("secret_returned", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paged(json!([{
            "id": "tr-1",
            "name": "mask-emails",
            "transform_type": "map_filter"
        }]))))
        .expect(1)
        .mount(&server)
        .await;

    let transform = client.get_transform("tr-1").await.unwrap().unwrap();
    assert_eq!(transform.transform_type, "map_filter");
}

#[tokio::test]
async fn test_create_transform_uses_transform_key() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/transforms"))
        .and(body_json(json!({
            "name": "mask-emails",
            "transform": "map_filter",
            "config": {}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "tr-2",
            "name": "mask-emails",
            "transform_type": "map_filter"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = client
        .create_connector(
            ConnectorFamily::Transform,
            "mask-emails",
            "map_filter",
            serde_json::Map::new(),
        )
        .await
        .unwrap();
    assert_eq!(record.id, "tr-2");
}

// ============================================================================
// Pipelines, topics and tags
// ============================================================================

#[tokio::test]
async fn test_pipeline_roundtrip_through_server() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    let body = json!({
        "name": "orders",
        "snapshot_new_tables": true,
        "source": {"id": "s1", "name": "pg", "connector": "postgresql", "topics": ["s1.public.orders"]},
        "destination": {"id": "d1", "name": "sf", "connector": "snowflake"},
        "transforms": []
    });

    Mock::given(method("POST"))
        .and(path("/api/pipelines"))
        .and(body_json(body.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json({
            let mut created = body.clone();
            created["id"] = json!("p1");
            created
        }))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline: Pipeline = serde_json::from_value(body).unwrap();
    let created = client.create_pipeline(&pipeline).await.unwrap();
    assert_eq!(created.id, "p1");
    assert_eq!(created.source.topics, vec!["s1.public.orders"]);
}

#[tokio::test]
async fn test_get_topic_fills_missing_id() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/topics/s1.public.orders"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(paged(json!([{"partition_count": 6}]))),
        )
        .mount(&server)
        .await;

    let topic = client.get_topic("s1.public.orders").await.unwrap().unwrap();
    assert_eq!(topic.topic_id, "s1.public.orders");
    assert_eq!(topic.partition_count, 6);
}

#[tokio::test]
async fn test_update_topic_with_empty_response() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("PUT"))
        .and(path("/api/topics/s1.public.orders"))
        .and(body_json(json!({"partition_count": 12})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let topic = client.update_topic("s1.public.orders", 12).await.unwrap();
    assert_eq!(topic.partition_count, 12);
    assert_eq!(topic.topic_id, "s1.public.orders");
}

#[tokio::test]
async fn test_tag_create_body() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/tags"))
        .and(body_json(json!({"name": "prod", "type": ["sources", "pipelines"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "tag-1",
            "name": "prod",
            "type": ["sources", "pipelines"],
            "custom": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tag = client
        .create_tag(&TagRequest {
            name: "prod".to_string(),
            description: None,
            tag_type: vec!["sources".to_string(), "pipelines".to_string()],
        })
        .await
        .unwrap();
    assert_eq!(tag.id, "tag-1");
    assert!(tag.custom);
    assert!(!tag.system);
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_walks_pages_until_total() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    let first: Vec<_> = (0..DEFAULT_PAGE_SIZE)
        .map(|i| json!({"id": format!("tag-{i}"), "name": format!("t{i}")}))
        .collect();

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": first,
            "total": DEFAULT_PAGE_SIZE + 1,
            "page": 1,
            "page_size": DEFAULT_PAGE_SIZE
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{"id": "tag-last", "name": "last"}],
            "total": DEFAULT_PAGE_SIZE + 1,
            "page": 2,
            "page_size": DEFAULT_PAGE_SIZE
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tags = client.list_tags().await.unwrap();
    assert_eq!(tags.len(), DEFAULT_PAGE_SIZE as usize + 1);
    assert_eq!(tags.last().unwrap().id, "tag-last");
}

// ============================================================================
// Construction
// ============================================================================

#[tokio::test]
async fn test_stalled_token_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/access-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "late", "expiresIn": 3600}))
                .set_delay(std::time::Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let mut config = crate::config::ProviderConfig::new("client", "secret").with_host(server.uri());
    config.http.timeout_secs = 1;
    config.http.max_retries = 0;
    let client = StreamkapClient::new(&config.resolve().unwrap());

    let outcome =
        tokio::time::timeout(std::time::Duration::from_secs(10), client.get_tag("t1")).await;
    let err = outcome.expect("token request should time out").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transient);
}
