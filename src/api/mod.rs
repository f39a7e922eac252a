//! Streamkap API
//!
//! Typed wire models and the client that issues one request per resource
//! operation over the shared HTTP transport.

mod client;
pub mod pagination;
pub mod types;

pub use client::StreamkapClient;
pub(crate) use client::encode_segment;
pub use pagination::{PageCursor, DEFAULT_PAGE_SIZE};
pub use types::{
    ConnectorRecord, ConnectorRequest, Destination, PagedResponse, Pipeline, PipelineDestination,
    PipelineSource, Source, Tag, TagRequest, Topic, TopicUpdate, Transform, TransformRequest,
};

#[cfg(test)]
mod tests;
