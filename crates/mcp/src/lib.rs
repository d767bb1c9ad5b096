//! Remote tool service client
//!
//! Discovers and invokes automation tools exposed over JSON-RPC, and
//! classifies the ways those calls fail.

use async_trait::async_trait;
use serde_json::{Map, Value};

pub mod client;
pub mod error;
pub mod types;

pub use client::McpHttpClient;
pub use error::{classify_message, FailureClass, McpError};
pub use types::{empty_object_schema, ToolDescriptor};

pub type Result<T> = std::result::Result<T, McpError>;

/// Discovery and invocation of remote tools
#[async_trait]
pub trait ToolClient: Send + Sync {
    /// Fetch the advertised tools and remember them
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>>;

    /// Invoke a tool; `Ok(None)` when the service sent neither result nor error
    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<Option<Value>>;

    /// Tools from the last successful `list_tools`
    fn cached_tools(&self) -> Vec<ToolDescriptor>;

    /// Release the connection; later calls fail with `McpError::Closed`
    async fn close(&self);
}
