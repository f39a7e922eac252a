//! CLI module
//!
//! Operator commands against the Streamkap API.
//!
//! # Commands
//!
//! - `types` - List resource types
//! - `schema` - Print the schema of one type
//! - `snapshot` - Print flag snapshots of every schema
//! - `validate` - Check a configuration without calling the API
//! - `import` - Fetch an existing resource by id as state
//! - `read` - Refresh a state document
//! - `delete` - Delete the resource a state document points to

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
