//! Resource lifecycle handlers
//!
//! Connector variants share [`crate::connector::ConnectorResource`]; the
//! resources here have their own wire shapes and typed models.

mod pipeline;
mod tag;
mod timeouts;
mod topic;
mod traits;

pub use pipeline::{pipeline_schema, PipelineResource, PIPELINE_RESOURCE};
pub use tag::{tag_schema, TagResource, TAG_RESOURCE};
pub use timeouts::{
    parse_duration, timeouts_attribute, with_timeout, Timeouts, DEFAULT_CREATE_TIMEOUT,
    DEFAULT_DELETE_TIMEOUT, DEFAULT_UPDATE_TIMEOUT, TIMEOUTS_ATTRIBUTE,
};
pub use topic::{topic_schema, TopicResource, TOPIC_RESOURCE};
pub use traits::{Operation, Resource, ResourceModel};

#[cfg(test)]
mod tests;
