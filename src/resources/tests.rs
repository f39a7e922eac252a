//! Tests for the pipeline, topic and tag resources

use super::*;
use crate::api::{Pipeline, Tag, Topic};
use crate::error::ErrorKind;
use crate::test_support::{mock_client, paged};
use crate::value::{AttrValue, ResourceData};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pipeline_plan() -> ResourceData {
    pipeline_schema()
        .decode(&json!({
            "name": "orders-to-warehouse",
            "source": {"id": "src-1", "topics": ["public.orders"]},
            "destination": {"id": "dst-1"}
        }))
        .unwrap()
}

fn pipeline_response(transforms: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "pl-1",
        "name": "orders-to-warehouse",
        "snapshot_new_tables": true,
        "source": {
            "id": "src-1",
            "name": "orders-db",
            "connector": "postgresql",
            "topics": ["public.orders"]
        },
        "destination": {"id": "dst-1", "name": "warehouse", "connector": "snowflake"},
        "transforms": transforms
    })
}

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn test_pipeline_from_plan_applies_defaults() {
    let pipeline = Pipeline::from_data(&pipeline_plan()).unwrap();
    assert!(pipeline.snapshot_new_tables);
    assert!(pipeline.transforms.is_empty());
    assert_eq!(pipeline.source.topics, vec!["public.orders"]);
    assert_eq!(pipeline.destination.id, "dst-1");
}

#[test]
fn test_pipeline_missing_source_id_names_path() {
    let plan = pipeline_schema()
        .decode(&json!({
            "name": "p",
            "source": {"topics": ["t"]},
            "destination": {"id": "d"}
        }))
        .unwrap();
    let err = Pipeline::from_data(&plan).unwrap_err();
    assert_eq!(err.to_string(), "Attribute 'source.id': is required");

    let err = pipeline_schema().validate(&plan).unwrap_err();
    assert_eq!(err.to_string(), "Attribute 'source.id': is required");
}

#[tokio::test]
async fn test_pipeline_create_and_read() {
    let server = MockServer::start().await;
    let resource = PipelineResource::new(Arc::new(mock_client(&server).await));

    Mock::given(method("POST"))
        .and(path("/api/pipelines"))
        .and(body_partial_json(json!({
            "name": "orders-to-warehouse",
            "snapshot_new_tables": true,
            "source": {"id": "src-1", "topics": ["public.orders"]},
            "destination": {"id": "dst-1"},
            "transforms": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(pipeline_response(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    // Server omits transforms on read
    let mut read_body = pipeline_response(json!(null));
    read_body
        .as_object_mut()
        .unwrap()
        .remove("transforms");
    Mock::given(method("GET"))
        .and(path("/api/pipelines/pl-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paged(json!([read_body]))))
        .mount(&server)
        .await;

    let plan = pipeline_plan();
    let created = resource.create(&plan).await.unwrap();
    assert_eq!(created.id().as_deref(), Some("pl-1"));
    assert_eq!(created.get("transforms"), &AttrValue::List(Vec::new()));

    let read = resource.read(&created).await.unwrap().unwrap();
    assert_eq!(read, created);
    assert!(crate::drift::detect_drift(resource.schema(), &plan, &read).is_empty());
}

#[tokio::test]
async fn test_pipeline_update_passes_references_through() {
    let server = MockServer::start().await;
    let resource = PipelineResource::new(Arc::new(mock_client(&server).await));

    Mock::given(method("PUT"))
        .and(path("/api/pipelines/pl-1"))
        .respond_with(
            ResponseTemplate::new(422).set_body_string("{\"detail\":\"destination dst-9 not found\"}"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let prior = pipeline_plan().with("id", "pl-1");
    let planned = pipeline_schema()
        .decode(&json!({
            "name": "orders-to-warehouse",
            "source": {"id": "src-1", "topics": ["public.orders"]},
            "destination": {"id": "dst-9"}
        }))
        .unwrap();

    let err = resource.update(&prior, &planned).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("destination dst-9 not found"));
}

#[tokio::test]
async fn test_pipeline_delete_already_gone() {
    let server = MockServer::start().await;
    let resource = PipelineResource::new(Arc::new(mock_client(&server).await));

    Mock::given(method("DELETE"))
        .and(path("/api/pipelines/pl-1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let state = pipeline_plan().with("id", "pl-1");
    resource.delete(&state).await.unwrap();
}

#[tokio::test]
async fn test_pipeline_read_recovers_by_name() {
    let server = MockServer::start().await;
    let resource = PipelineResource::new(Arc::new(mock_client(&server).await));

    Mock::given(method("GET"))
        .and(path("/api/pipelines"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(paged(json!([pipeline_response(json!(["tr-1"]))]))),
        )
        .mount(&server)
        .await;

    let read = resource.read(&pipeline_plan()).await.unwrap().unwrap();
    assert_eq!(read.id().as_deref(), Some("pl-1"));
    assert_eq!(read.get("transforms"), &AttrValue::string_list(["tr-1"]));
}

// ============================================================================
// Topic
// ============================================================================

#[test]
fn test_topic_model_uses_topic_id_as_id() {
    let topic = Topic {
        topic_id: "s1.public.orders".to_string(),
        partition_count: 4,
    };
    let data = topic.to_data();
    assert_eq!(data.id().as_deref(), Some("s1.public.orders"));
    assert_eq!(Topic::from_data(&data).unwrap(), topic);
}

#[test]
fn test_topic_rejects_zero_partitions() {
    let plan = topic_schema()
        .decode(&json!({"topic_id": "t", "partition_count": 0}))
        .unwrap();
    let err = topic_schema().validate(&plan).unwrap_err();
    assert_eq!(err.to_string(), "Attribute 'partition_count': must be at least 1");
}

#[tokio::test]
async fn test_topic_create_is_put() {
    let server = MockServer::start().await;
    let resource = TopicResource::new(Arc::new(mock_client(&server).await));

    Mock::given(method("PUT"))
        .and(path("/api/topics/s1.public.orders"))
        .and(body_json(json!({"partition_count": 10})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "partition_count": 10
        })))
        .expect(1)
        .mount(&server)
        .await;

    let plan = topic_schema()
        .decode(&json!({"topic_id": "s1.public.orders", "partition_count": 10}))
        .unwrap();
    let state = resource.create(&plan).await.unwrap();
    assert_eq!(state.get("partition_count"), &AttrValue::Int(10));
    assert_eq!(state.id().as_deref(), Some("s1.public.orders"));
}

#[tokio::test]
async fn test_topic_delete_makes_no_call() {
    let server = MockServer::start().await;
    let resource = TopicResource::new(Arc::new(mock_client(&server).await));

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let state = topic_schema()
        .new_model()
        .with("topic_id", "t")
        .with("partition_count", 3);
    resource.delete(&state).await.unwrap();
}

#[tokio::test]
async fn test_topic_import_reads_partition_count() {
    let server = MockServer::start().await;
    let resource = TopicResource::new(Arc::new(mock_client(&server).await));

    Mock::given(method("GET"))
        .and(path("/api/topics/s1.public.orders"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(paged(json!([{"partition_count": 6}]))),
        )
        .mount(&server)
        .await;

    let state = resource.import("s1.public.orders").await.unwrap().unwrap();
    assert_eq!(state.get("topic_id"), &AttrValue::from("s1.public.orders"));
    assert_eq!(state.get("partition_count"), &AttrValue::Int(6));
}

// ============================================================================
// Tag
// ============================================================================

#[tokio::test]
async fn test_tag_lifecycle() {
    let server = MockServer::start().await;
    let resource = TagResource::new(Arc::new(mock_client(&server).await));

    let returned = json!({
        "id": "tag-1",
        "name": "prod",
        "description": "Production",
        "type": ["sources", "destinations"],
        "system": false,
        "custom": true
    });
    Mock::given(method("POST"))
        .and(path("/api/tags"))
        .and(body_json(json!({
            "name": "prod",
            "description": "Production",
            "type": ["sources", "destinations"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(returned.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tags/tag-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paged(json!([returned]))))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/tags/tag-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let plan = tag_schema()
        .decode(&json!({
            "name": "prod",
            "description": "Production",
            "type": ["sources", "destinations"]
        }))
        .unwrap();
    let created = resource.create(&plan).await.unwrap();
    assert_eq!(created.get("custom"), &AttrValue::Bool(true));

    let read = resource.read(&created).await.unwrap().unwrap();
    assert_eq!(read, created);

    let tag = Tag::from_data(&read).unwrap();
    assert_eq!(tag.tag_type, vec!["sources", "destinations"]);

    resource.delete(&read).await.unwrap();
}

#[tokio::test]
async fn test_tag_requires_type() {
    let server = MockServer::start().await;
    let resource = TagResource::new(Arc::new(mock_client(&server).await));

    let plan = tag_schema().decode(&json!({"name": "prod", "type": []})).unwrap();
    let err = resource.create(&plan).await.unwrap_err();
    assert_eq!(err.to_string(), "Attribute 'type': must not be empty");
}
