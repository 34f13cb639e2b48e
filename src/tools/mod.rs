//! Tools the assistant can call mid-run.

pub mod arguments;
pub mod invoker;
pub mod tool;
pub mod types;
pub mod web_search;

pub use arguments::ToolArguments;
pub use invoker::ToolInvoker;
pub use tool::{FnTool, Tool};
pub use types::{ToolParameters, ToolPayload};
pub use web_search::{WebSearchTool, NOT_CONFIGURED_ERROR, UNEXPECTED_ERROR, WEB_SEARCH_TOOL};
