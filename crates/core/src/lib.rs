// Core domain for the Bullpen MLB transfer agent

pub mod agent;
pub mod card;
pub mod error;
pub mod llm;
pub mod memory;
pub mod prompts;
pub mod router;
pub mod sse;
pub mod tools;
pub mod types;

pub use agent::{AgentSettings, TransferAgent};
pub use card::{AgentCapabilities, AgentCard, AgentInfo, AgentSkill};
pub use error::{AgentError, AgentResult};
pub use types::*;
