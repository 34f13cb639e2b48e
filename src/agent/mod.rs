//! Session agents: assistant identity, thread, and active replies per channel.

pub mod registry;
pub mod session;

pub use registry::AgentRegistry;
pub use session::{AssistantSession, InboundEvent, ReplyHandle};
