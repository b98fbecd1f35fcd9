// A2A agent card published at /.well-known/agent.json

use serde::{Deserialize, Serialize};

/// A capability advertised on the agent card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub examples: Vec<String>,
    pub input_modes: Vec<String>,
    pub output_modes: Vec<String>,
}

impl AgentSkill {
    fn text(id: &str, name: &str, description: &str, tags: &[&str], examples: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            examples: examples.iter().map(|s| s.to_string()).collect(),
            input_modes: vec!["text".to_string()],
            output_modes: vec!["text".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    pub streaming: bool,
}

/// Static self-description of the agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub url: String,
    pub version: String,
    pub default_input_modes: Vec<String>,
    pub default_output_modes: Vec<String>,
    pub capabilities: AgentCapabilities,
    pub skills: Vec<AgentSkill>,
    pub supports_authenticated_extended_card: bool,
}

/// Short summary served at `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: String,
    pub description: String,
    pub version: String,
    pub skills: Vec<String>,
    pub status: String,
}

impl AgentCard {
    /// Card for the MLB transfer agent served from `url`
    pub fn mlb_transfer(url: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: "MLB Transfer Agent".to_string(),
            description: "An AI agent specialised in MLB player transfers, the free-agent market \
                          and team strategy. It tailors analysis to club officials, players and \
                          fans, and grounds value assessments in current data and sabermetrics."
                .to_string(),
            url: url.into(),
            version: version.into(),
            default_input_modes: vec!["text".to_string()],
            default_output_modes: vec!["text".to_string()],
            capabilities: AgentCapabilities { streaming: true },
            skills: vec![
                AgentSkill::text(
                    "mlb_transfer_analysis",
                    "MLB Transfer Analysis",
                    "Acquisition proposals, roster weakness analysis and payroll review for club officials",
                    &["mlb", "transfer", "baseball", "analysis", "club_official"],
                    &[
                        "Which pitchers should the Yankees add to the staff?",
                        "How can the Dodgers strengthen their lineup?",
                        "Free-agent acquisition strategy for this winter",
                    ],
                ),
                AgentSkill::text(
                    "career_consulting",
                    "Player Career Consulting",
                    "Explains whether a move makes sense, finds fitting teams and makes the case for a transfer",
                    &["mlb", "career", "player", "consulting", "transfer"],
                    &[
                        "Should I move teams to keep developing?",
                        "Exploring a new challenge",
                        "Best candidate teams for my next contract",
                    ],
                ),
                AgentSkill::text(
                    "fan_communication",
                    "Fan Communication",
                    "Empathises with fans, explains the reasoning behind a transfer and the player's outlook with the new team",
                    &["mlb", "fan", "communication", "explanation", "vision"],
                    &[
                        "Why is our ace leaving?",
                        "What can we expect from him on his new team?",
                        "Keeping fans behind the club after a trade",
                    ],
                ),
                AgentSkill::text(
                    "current_value_assessment",
                    "Current Value Assessment",
                    "Objective present-day player value from recent performance trends and sabermetrics",
                    &["mlb", "value", "assessment", "sabermetrics", "current"],
                    &[
                        "What is Ohtani worth right now?",
                        "Value assessment based on this season's numbers",
                        "Sabermetric breakdown of a trade target",
                    ],
                ),
            ],
            supports_authenticated_extended_card: false,
        }
    }

    pub fn summary(&self) -> AgentInfo {
        AgentInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            version: self.version.clone(),
            skills: self.skills.iter().map(|s| s.name.clone()).collect(),
            status: "running".to_string(),
        }
    }
}
