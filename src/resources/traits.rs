//! Resource lifecycle trait

use crate::error::Result;
use crate::schema::ResourceSchema;
use crate::value::ResourceData;
use async_trait::async_trait;
use std::fmt;

/// Lifecycle operation, used for timeouts and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl Operation {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Import => "import",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource kind the engine can manage
///
/// Implementations hold no per-instance state: every call receives the plan
/// or state it works on and returns the new state. `read` and `import`
/// return `None` when the resource no longer exists server-side.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Engine-facing type name (`streamkap_source_postgresql`)
    fn type_name(&self) -> &str;

    /// Typed attribute schema
    fn schema(&self) -> &ResourceSchema;

    /// Create from a plan and return the new state
    async fn create(&self, planned: &ResourceData) -> Result<ResourceData>;

    /// Refresh state, `None` if the resource was deleted
    async fn read(&self, state: &ResourceData) -> Result<Option<ResourceData>>;

    /// Apply a plan to an existing resource
    async fn update(&self, prior: &ResourceData, planned: &ResourceData) -> Result<ResourceData>;

    /// Delete; a resource that is already gone counts as deleted
    async fn delete(&self, state: &ResourceData) -> Result<()>;

    /// Adopt an existing resource by id
    async fn import(&self, id: &str) -> Result<Option<ResourceData>> {
        let state = self.schema().new_model().with("id", id);
        self.read(&state).await
    }
}

/// Typed model with explicit conversions to and from the attribute tree
///
/// Used by resources whose wire shape is not a flat config map.
pub trait ResourceModel: Sized {
    /// Build the typed model from a plan or state
    fn from_data(data: &ResourceData) -> Result<Self>;

    /// Render the typed model as an attribute tree
    fn to_data(&self) -> ResourceData;
}
