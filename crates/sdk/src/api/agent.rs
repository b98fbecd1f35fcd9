//! Agent description endpoints.

use crate::client::BullpenClient;
use crate::error::BullpenResult;
use bullpen_core::{AgentCard, AgentInfo};
use serde::{Deserialize, Serialize};

/// Agent API for reading the agent's self-description.
pub struct AgentApi<'a> {
    client: &'a BullpenClient,
}

impl<'a> AgentApi<'a> {
    pub(crate) fn new(client: &'a BullpenClient) -> Self {
        Self { client }
    }

    /// Short summary served at the root path.
    pub async fn info(&self) -> BullpenResult<AgentInfo> {
        self.client.http.get("/").await
    }

    /// Full A2A agent card.
    pub async fn card(&self) -> BullpenResult<AgentCard> {
        self.client.http.get("/.well-known/agent.json").await
    }

    /// Skills listed on the card.
    pub async fn skills(&self) -> BullpenResult<Vec<SkillSummary>> {
        let list: SkillList = self.client.http.get("/api/agent/skills").await?;
        Ok(list.skills)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillList {
    pub skills: Vec<SkillSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}
