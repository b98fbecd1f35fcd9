// Static prompt templates loaded from the prompts directory

use crate::types::PromptKind;
use std::path::Path;

pub const SYSTEM_PROMPT_FILE: &str = "system_prompt.txt";
pub const CLUB_OFFICIAL_PROMPT_FILE: &str = "club_official_prompt.txt";
pub const PLAYER_PROMPT_FILE: &str = "player_prompt.txt";
pub const FAN_PROMPT_FILE: &str = "fan_prompt.txt";

/// The system prompt plus one prompt per role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    pub system: String,
    pub club_official: String,
    pub player: String,
    pub fan: String,
}

impl PromptSet {
    /// One-line prompts used when the prompt files are unavailable
    pub fn builtin() -> Self {
        Self {
            system: "You are an MLB transfer specialist.".to_string(),
            club_official: "Provide player acquisition proposals for club officials.".to_string(),
            player: "Provide career development counseling for players.".to_string(),
            fan: "Explain the reasons behind a transfer to fans.".to_string(),
        }
    }

    /// Load all four prompt files from `dir`.
    ///
    /// The set is all-or-nothing: if any file cannot be read the built-in
    /// prompts are returned and a warning is logged.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        match Self::read_dir(dir) {
            Ok(prompts) => {
                tracing::info!("Loaded prompt files from {}", dir.display());
                prompts
            }
            Err(e) => {
                tracing::warn!(
                    "Prompt files unavailable in {} ({}), using built-in prompts",
                    dir.display(),
                    e
                );
                Self::builtin()
            }
        }
    }

    fn read_dir(dir: &Path) -> std::io::Result<Self> {
        let read = |name: &str| std::fs::read_to_string(dir.join(name));
        Ok(Self {
            system: read(SYSTEM_PROMPT_FILE)?,
            club_official: read(CLUB_OFFICIAL_PROMPT_FILE)?,
            player: read(PLAYER_PROMPT_FILE)?,
            fan: read(FAN_PROMPT_FILE)?,
        })
    }

    /// Role prompt for `kind`; `None` for the default flow
    pub fn role_prompt(&self, kind: PromptKind) -> Option<&str> {
        match kind {
            PromptKind::ClubOfficial => Some(&self.club_official),
            PromptKind::Player => Some(&self.player),
            PromptKind::Fan => Some(&self.fan),
            PromptKind::Default => None,
        }
    }
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::builtin()
    }
}
