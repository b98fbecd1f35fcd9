//! Endpoint groups exposed by [`BullpenClient`](crate::BullpenClient).

mod agent;
mod chat;
mod health;

pub use agent::{AgentApi, SkillList, SkillSummary};
pub use chat::{ChatApi, ChatReply, ChatStream, StreamEvent};
pub use health::{HealthApi, HealthCheck, McpStatus};
