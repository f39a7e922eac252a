//! Typed Streamkap API client
//!
//! Wraps the shared [`HttpClient`] with one method per resource operation.
//! Every GET asks the server to echo secrets back, deletes treat a missing
//! resource as already gone, and topics expose only get and update.

use super::pagination::PageCursor;
use super::types::{
    ConnectorRecord, ConnectorRequest, Destination, EntityResponse, PagedResponse, Pipeline,
    Source, Tag, TagRequest, Topic, TopicUpdate, Transform, TransformRequest,
};
use crate::auth::{Credentials, TokenStore};
use crate::config::ResolvedConfig;
use crate::error::{Error, Result};
use crate::http::{ApiRequest, HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::types::{ConnectorFamily, JsonObject};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Collection paths
const SOURCES: &str = "/api/sources";
const DESTINATIONS: &str = "/api/destinations";
const TRANSFORMS: &str = "/api/transforms";
const PIPELINES: &str = "/api/pipelines";
const TOPICS: &str = "/api/topics";
const TAGS: &str = "/api/tags";

/// Client for the Streamkap management API
#[derive(Debug, Clone)]
pub struct StreamkapClient {
    http: HttpClient,
}

impl StreamkapClient {
    /// Build a client from resolved provider settings
    pub fn new(config: &ResolvedConfig) -> Self {
        let http_config = HttpClientConfig::builder()
            .base_url(&config.host)
            .timeout(config.http.timeout())
            .max_retries(config.http.max_retries)
            .rate_limit(RateLimiterConfig::per_second(config.http.requests_per_second))
            .build();
        let http = HttpClient::with_config(http_config);

        // Token requests share the connection pool and the request timeout
        let store = TokenStore::with_client(
            Credentials::new(&config.host, &config.client_id, &config.secret),
            http.inner().clone(),
        )
        .with_timeout(config.http.timeout());

        Self::with_http(http.with_token_store(Arc::new(store)))
    }

    /// Wrap an already configured transport
    pub fn with_http(http: HttpClient) -> Self {
        Self { http }
    }

    /// Underlying transport
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    // ========================================================================
    // Sources
    // ========================================================================

    /// Fetch a source, `None` when it no longer exists
    pub async fn get_source(&self, id: &str) -> Result<Option<Source>> {
        let path = format!("{SOURCES}/{}", encode_segment(id));
        self.fetch_one("source", with_secrets(&path)).await
    }

    /// Create a source
    pub async fn create_source(&self, request: &ConnectorRequest) -> Result<Source> {
        self.mutate("source", Method::POST, SOURCES, request).await
    }

    /// Replace a source
    pub async fn update_source(&self, id: &str, request: &ConnectorRequest) -> Result<Source> {
        let path = format!("{SOURCES}/{}", encode_segment(id));
        self.mutate("source", Method::PUT, &path, request).await
    }

    /// Delete a source
    pub async fn delete_source(&self, id: &str) -> Result<()> {
        self.remove("source", &format!("{SOURCES}/{}", encode_segment(id)))
            .await
    }

    /// List every source
    pub async fn list_sources(&self) -> Result<Vec<Source>> {
        self.list_all(SOURCES).await
    }

    // ========================================================================
    // Destinations
    // ========================================================================

    /// Fetch a destination, `None` when it no longer exists
    ///
    /// The destinations collection filters by a singular `id` parameter
    /// instead of taking the id as a path segment. Only an entry carrying
    /// the requested id is accepted.
    pub async fn get_destination(&self, id: &str) -> Result<Option<Destination>> {
        let request = ApiRequest::get(DESTINATIONS)
            .query("id", id)
            .query("secret_returned", "true");
        let page: Vec<Destination> = self.fetch_page("destination", request).await?;
        Ok(page.into_iter().find(|d| d.id == id))
    }

    /// Create a destination
    pub async fn create_destination(&self, request: &ConnectorRequest) -> Result<Destination> {
        self.mutate("destination", Method::POST, DESTINATIONS, request)
            .await
    }

    /// Replace a destination
    pub async fn update_destination(
        &self,
        id: &str,
        request: &ConnectorRequest,
    ) -> Result<Destination> {
        let path = format!("{DESTINATIONS}/{}", encode_segment(id));
        self.mutate("destination", Method::PUT, &path, request).await
    }

    /// Delete a destination
    pub async fn delete_destination(&self, id: &str) -> Result<()> {
        self.remove(
            "destination",
            &format!("{DESTINATIONS}/{}", encode_segment(id)),
        )
        .await
    }

    /// List every destination
    pub async fn list_destinations(&self) -> Result<Vec<Destination>> {
        self.list_all(DESTINATIONS).await
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    /// Fetch a transform, `None` when it no longer exists
    pub async fn get_transform(&self, id: &str) -> Result<Option<Transform>> {
        let path = format!("{TRANSFORMS}/{}", encode_segment(id));
        let request = with_secrets(&path).query("unwind_topics", "false");
        self.fetch_one("transform", request).await
    }

    /// Create a transform
    pub async fn create_transform(&self, request: &TransformRequest) -> Result<Transform> {
        self.mutate("transform", Method::POST, TRANSFORMS, request)
            .await
    }

    /// Replace a transform
    pub async fn update_transform(
        &self,
        id: &str,
        request: &TransformRequest,
    ) -> Result<Transform> {
        let path = format!("{TRANSFORMS}/{}", encode_segment(id));
        self.mutate("transform", Method::PUT, &path, request).await
    }

    /// Delete a transform
    pub async fn delete_transform(&self, id: &str) -> Result<()> {
        self.remove("transform", &format!("{TRANSFORMS}/{}", encode_segment(id)))
            .await
    }

    /// List every transform
    pub async fn list_transforms(&self) -> Result<Vec<Transform>> {
        self.list_all(TRANSFORMS).await
    }

    // ========================================================================
    // Family dispatch
    // ========================================================================

    /// Fetch a source, destination or transform
    pub async fn get_connector(
        &self,
        family: ConnectorFamily,
        id: &str,
    ) -> Result<Option<ConnectorRecord>> {
        Ok(match family {
            ConnectorFamily::Source => self.get_source(id).await?.map(Into::into),
            ConnectorFamily::Destination => self.get_destination(id).await?.map(Into::into),
            ConnectorFamily::Transform => self.get_transform(id).await?.map(Into::into),
        })
    }

    /// Create a source, destination or transform
    pub async fn create_connector(
        &self,
        family: ConnectorFamily,
        name: &str,
        kind: &str,
        config: JsonObject,
    ) -> Result<ConnectorRecord> {
        Ok(match family {
            ConnectorFamily::Source => self
                .create_source(&connector_request(name, kind, config))
                .await?
                .into(),
            ConnectorFamily::Destination => self
                .create_destination(&connector_request(name, kind, config))
                .await?
                .into(),
            ConnectorFamily::Transform => self
                .create_transform(&transform_request(name, kind, config))
                .await?
                .into(),
        })
    }

    /// Replace a source, destination or transform
    pub async fn update_connector(
        &self,
        family: ConnectorFamily,
        id: &str,
        name: &str,
        kind: &str,
        config: JsonObject,
    ) -> Result<ConnectorRecord> {
        Ok(match family {
            ConnectorFamily::Source => self
                .update_source(id, &connector_request(name, kind, config))
                .await?
                .into(),
            ConnectorFamily::Destination => self
                .update_destination(id, &connector_request(name, kind, config))
                .await?
                .into(),
            ConnectorFamily::Transform => self
                .update_transform(id, &transform_request(name, kind, config))
                .await?
                .into(),
        })
    }

    /// Delete a source, destination or transform
    pub async fn delete_connector(&self, family: ConnectorFamily, id: &str) -> Result<()> {
        match family {
            ConnectorFamily::Source => self.delete_source(id).await,
            ConnectorFamily::Destination => self.delete_destination(id).await,
            ConnectorFamily::Transform => self.delete_transform(id).await,
        }
    }

    /// List every record in a family
    pub async fn list_connectors(&self, family: ConnectorFamily) -> Result<Vec<ConnectorRecord>> {
        Ok(match family {
            ConnectorFamily::Source => into_records(self.list_sources().await?),
            ConnectorFamily::Destination => into_records(self.list_destinations().await?),
            ConnectorFamily::Transform => into_records(self.list_transforms().await?),
        })
    }

    // ========================================================================
    // Pipelines
    // ========================================================================

    /// Fetch a pipeline, `None` when it no longer exists
    pub async fn get_pipeline(&self, id: &str) -> Result<Option<Pipeline>> {
        let path = format!("{PIPELINES}/{}", encode_segment(id));
        self.fetch_one("pipeline", with_secrets(&path)).await
    }

    /// Create a pipeline
    pub async fn create_pipeline(&self, pipeline: &Pipeline) -> Result<Pipeline> {
        self.mutate("pipeline", Method::POST, PIPELINES, pipeline)
            .await
    }

    /// Replace a pipeline
    pub async fn update_pipeline(&self, id: &str, pipeline: &Pipeline) -> Result<Pipeline> {
        let path = format!("{PIPELINES}/{}", encode_segment(id));
        self.mutate("pipeline", Method::PUT, &path, pipeline).await
    }

    /// Delete a pipeline
    pub async fn delete_pipeline(&self, id: &str) -> Result<()> {
        self.remove("pipeline", &format!("{PIPELINES}/{}", encode_segment(id)))
            .await
    }

    /// List every pipeline
    pub async fn list_pipelines(&self) -> Result<Vec<Pipeline>> {
        self.list_all(PIPELINES).await
    }

    // ========================================================================
    // Topics
    // ========================================================================

    /// Fetch a topic's partition count, `None` when the topic is unknown
    pub async fn get_topic(&self, topic_id: &str) -> Result<Option<Topic>> {
        let path = format!("{TOPICS}/{}", encode_segment(topic_id));
        let topic: Option<Topic> = self.fetch_one("topic", with_secrets(&path)).await?;
        Ok(topic.map(|mut t| {
            if t.topic_id.is_empty() {
                t.topic_id = topic_id.to_string();
            }
            t
        }))
    }

    /// Set a topic's partition count
    ///
    /// Topics cannot be created or deleted through the API; this is the only
    /// mutation the collection accepts.
    pub async fn update_topic(&self, topic_id: &str, partition_count: i64) -> Result<Topic> {
        let path = format!("{TOPICS}/{}", encode_segment(topic_id));
        let body = serde_json::to_value(TopicUpdate { partition_count })?;
        let response: Option<EntityResponse<Topic>> = self
            .http
            .send_json(&ApiRequest::put(path, body))
            .await?;

        let mut topic = response
            .and_then(EntityResponse::into_entity)
            .unwrap_or(Topic {
                topic_id: String::new(),
                partition_count,
            });
        if topic.topic_id.is_empty() {
            topic.topic_id = topic_id.to_string();
        }
        Ok(topic)
    }

    // ========================================================================
    // Tags
    // ========================================================================

    /// Fetch a tag, `None` when it no longer exists
    pub async fn get_tag(&self, id: &str) -> Result<Option<Tag>> {
        let path = format!("{TAGS}/{}", encode_segment(id));
        self.fetch_one("tag", with_secrets(&path)).await
    }

    /// Create a tag
    pub async fn create_tag(&self, request: &TagRequest) -> Result<Tag> {
        self.mutate("tag", Method::POST, TAGS, request).await
    }

    /// Replace a tag
    pub async fn update_tag(&self, id: &str, request: &TagRequest) -> Result<Tag> {
        let path = format!("{TAGS}/{}", encode_segment(id));
        self.mutate("tag", Method::PUT, &path, request).await
    }

    /// Delete a tag
    pub async fn delete_tag(&self, id: &str) -> Result<()> {
        self.remove("tag", &format!("{TAGS}/{}", encode_segment(id)))
            .await
    }

    /// List every tag
    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.list_all(TAGS).await
    }

    // ========================================================================
    // Shared plumbing
    // ========================================================================

    /// GET a single entity out of the paged envelope
    async fn fetch_one<T: DeserializeOwned>(
        &self,
        resource: &str,
        request: ApiRequest,
    ) -> Result<Option<T>> {
        Ok(self.fetch_page(resource, request).await?.into_iter().next())
    }

    /// GET one page of entities; a 404 reads as an empty page
    #[instrument(level = "debug", skip(self, request), fields(path = %request.path))]
    async fn fetch_page<T: DeserializeOwned>(
        &self,
        resource: &str,
        request: ApiRequest,
    ) -> Result<Vec<T>> {
        match self.http.send_json::<PagedResponse<T>>(&request).await {
            Ok(page) => {
                if page.is_empty() {
                    debug!(resource, "Empty result, treating as gone");
                }
                Ok(page.result)
            }
            Err(e) if e.is_not_found() => {
                debug!(resource, "Not found, treating as gone");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// POST or PUT a body and decode the returned entity
    #[instrument(level = "debug", skip(self, body))]
    async fn mutate<B, T>(&self, resource: &str, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let response: Option<EntityResponse<T>> = self
            .http
            .send_json(&ApiRequest::new(method.clone(), path).json(body))
            .await?;

        response
            .and_then(EntityResponse::into_entity)
            .ok_or_else(|| Error::Other(format!("{method} {path} returned no {resource}")))
    }

    /// DELETE, treating not-found as success
    #[instrument(level = "debug", skip(self))]
    async fn remove(&self, resource: &str, path: &str) -> Result<()> {
        match self.http.send(&ApiRequest::delete(path)).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!(resource, "Already deleted");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Walk every page of a collection
    async fn list_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut cursor = PageCursor::default();
        let mut items = Vec::new();

        while !cursor.done {
            let request = cursor
                .params()
                .into_iter()
                .fold(ApiRequest::get(path), |request, (key, value)| request.query(key, value));
            let page: PagedResponse<T> = self.http.send_json(&request).await?;
            cursor.advance(&page);
            items.extend(page.result);
        }

        debug!(path, count = items.len(), "Listed collection");
        Ok(items)
    }
}

/// GET that asks the server to echo secret config values
fn with_secrets(path: &str) -> ApiRequest {
    ApiRequest::get(path).query("secret_returned", "true")
}

fn connector_request(name: &str, kind: &str, config: JsonObject) -> ConnectorRequest {
    ConnectorRequest {
        name: name.to_string(),
        connector: kind.to_string(),
        config,
    }
}

fn transform_request(name: &str, kind: &str, config: JsonObject) -> TransformRequest {
    TransformRequest {
        name: name.to_string(),
        transform: kind.to_string(),
        config,
    }
}

fn into_records<T: Into<ConnectorRecord>>(items: Vec<T>) -> Vec<ConnectorRecord> {
    items.into_iter().map(Into::into).collect()
}

/// Percent-encode an id for use as a single path segment
pub(crate) fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
