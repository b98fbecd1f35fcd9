// Keyword router that picks a conversation flow for a user message

use crate::prompts::PromptSet;
use crate::types::PromptKind;
use serde::{Deserialize, Serialize};

/// Keywords that select one flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRule {
    pub kind: PromptKind,
    pub keywords: Vec<String>,
}

impl RoutingRule {
    pub fn new(kind: PromptKind, keywords: &[&str]) -> Self {
        Self {
            kind,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && contains_keyword(lowered, &k.to_lowercase()))
    }
}

/// Substring match where a keyword starting with an ASCII letter or digit
/// must also start a word. Hangul keywords match anywhere, since particles
/// attach directly to the stem.
fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    let needs_boundary = keyword
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric());

    haystack.match_indices(keyword).any(|(start, _)| {
        !needs_boundary
            || haystack[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric())
    })
}

/// Result of routing: the chosen flow and the message sent to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedPrompt {
    pub kind: PromptKind,
    pub text: String,
}

/// Maps a user message to a [`PromptKind`].
///
/// Rules are checked in declaration order and the first rule with any
/// keyword contained in the lower-cased message wins. A message matching no
/// rule routes to [`PromptKind::Default`].
#[derive(Debug, Clone)]
pub struct PromptRouter {
    rules: Vec<RoutingRule>,
}

impl PromptRouter {
    pub fn new(rules: Vec<RoutingRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }

    pub fn route(&self, message: &str) -> PromptKind {
        let lowered = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.kind)
            .unwrap_or(PromptKind::Default)
    }

    /// Route `message` and wrap it with the system and role prompts
    pub fn compose(&self, prompts: &PromptSet, message: &str) -> RoutedPrompt {
        let kind = self.route(message);
        let mut text = format!("{}\n\n", prompts.system);

        match prompts.role_prompt(kind) {
            Some(role_prompt) => {
                text.push_str(&format!("{}\n\n", role_prompt));
                text.push_str(&format!("User question: {}\n\n", message));
                text.push_str(&format!(
                    "Respond following the {} flow described above.",
                    flow_label(kind)
                ));
            }
            None => {
                text.push_str(&format!("User question: {}", message));
            }
        }

        tracing::debug!(prompt = %kind, "Routed user message");
        RoutedPrompt { kind, text }
    }
}

impl Default for PromptRouter {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

fn flow_label(kind: PromptKind) -> &'static str {
    match kind {
        PromptKind::ClubOfficial => "club official",
        PromptKind::Player => "player",
        PromptKind::Fan => "fan",
        PromptKind::Default => "default",
    }
}

/// Built-in keyword lists, Korean first then English
pub fn default_rules() -> Vec<RoutingRule> {
    vec![
        RoutingRule::new(
            PromptKind::ClubOfficial,
            &[
                "영입", "보강", "계약", "투수진", "타선",
                "acquire", "acquisition", "reinforce", "contract", "pitching staff",
                "rotation", "lineup", "payroll",
            ],
        ),
        RoutingRule::new(
            PromptKind::Player,
            &[
                "커리어", "발전", "새로운 도전", "이적 고려",
                "my career", "career", "new challenge", "considering a move",
                "considering a transfer",
            ],
        ),
        RoutingRule::new(
            PromptKind::Fan,
            &[
                "떠난다", "떠나는", "이유", "아쉽", "이해",
                "leaving", "why did", "why is", "disappointed", "sad", "understand",
            ],
        ),
    ]
}
