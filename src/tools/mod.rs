//! Tools exposed through `tools/list` and `tools/call`.
//!
//! A tool never fails at the protocol level: invalid arguments and upstream
//! failures come back as a [`ToolCallResult`] with `isError: true`.

pub mod x_search;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::mcp::types::{ToolCallResult, ToolDefinition};

pub use x_search::{format_citations, XSearchTool, X_SEARCH_TOOL_NAME};

/// A callable MCP tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The descriptor advertised in `tools/list`.
    fn definition(&self) -> ToolDefinition;

    /// Runs the tool. Must not fail; errors are reported in the result.
    async fn execute(&self, arguments: &Map<String, Value>) -> ToolCallResult;
}

/// Ordered set of tools, looked up by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tool. Registration order is the `tools/list` order.
    #[must_use]
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    /// Returns every descriptor, in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    /// Finds a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|tool| tool.definition().name == name)
            .map(|tool| &**tool)
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.tools.iter().map(|tool| tool.definition().name))
            .finish()
    }
}
