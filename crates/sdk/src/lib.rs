//! # Bullpen SDK
//!
//! Rust client for the Bullpen MLB transfer agent server.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bullpen_sdk::{BullpenClient, BullpenResult};
//!
//! #[tokio::main]
//! async fn main() -> BullpenResult<()> {
//!     let client = BullpenClient::builder()
//!         .base_url("http://localhost:8000")
//!         .build()?;
//!
//!     let health = client.health().check().await?;
//!     println!("Server status: {}", health.status);
//!
//!     let reply = client.chat().send("Should we trade for a closer?").await?;
//!     println!("[{}] {}", reply.prompt, reply.response);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming
//!
//! ```rust,no_run
//! use bullpen_sdk::{BullpenClient, StreamEvent};
//! use futures::StreamExt;
//!
//! # async fn example() -> bullpen_sdk::BullpenResult<()> {
//! let client = BullpenClient::builder()
//!     .base_url("http://localhost:8000")
//!     .build()?;
//!
//! let mut stream = client.chat().stream("Why was he traded?").await?;
//! while let Some(event) = stream.next().await {
//!     match event? {
//!         StreamEvent::Chunk(word) => print!("{} ", word),
//!         StreamEvent::Complete => println!(),
//!         StreamEvent::Error(message) => eprintln!("error: {}", message),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use api::{
    AgentApi, ChatApi, ChatReply, ChatStream, HealthApi, HealthCheck, McpStatus, SkillList,
    SkillSummary, StreamEvent,
};
pub use client::{BullpenClient, BullpenClientBuilder};
pub use config::ClientConfig;
pub use error::{BullpenError, BullpenResult};

// Re-export core types for convenience
pub use bullpen_core::{AgentCapabilities, AgentCard, AgentInfo, AgentSkill};
