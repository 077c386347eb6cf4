/// The four recovery roles and the agent handle bound to each.
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::media::ImageInput;
use crate::model::{ModelBackend, ModelError, ModelReply, ModelRequest};

const MARKDOWN_INSTRUCTION: &str = "Use markdown to format your answers.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Therapist,
    Closure,
    RoutinePlanner,
    BrutalHonesty,
}

impl Role {
    /// Execution and rendering order.
    pub const ALL: [Role; 4] = [
        Role::Therapist,
        Role::Closure,
        Role::RoutinePlanner,
        Role::BrutalHonesty,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Role::Therapist => "therapist",
            Role::Closure => "closure",
            Role::RoutinePlanner => "routine_planner",
            Role::BrutalHonesty => "brutal_honesty",
        }
    }

    pub fn agent_name(self) -> &'static str {
        match self {
            Role::Therapist => "Therapist Agent",
            Role::Closure => "Closure Agent",
            Role::RoutinePlanner => "Routine Planner Agent",
            Role::BrutalHonesty => "Brutal Honesty Agent",
        }
    }

    /// Name used in the per-role failure banner.
    pub fn failure_label(self) -> &'static str {
        match self {
            Role::Therapist => "Therapist Agent",
            Role::Closure => "Closure Agent",
            Role::RoutinePlanner => "Routine Agent",
            Role::BrutalHonesty => "Honesty Agent",
        }
    }

    pub fn instructions(self) -> &'static [&'static str] {
        match self {
            Role::Therapist => &[
                "You are an empathetic therapist.",
                "Listen with empathy, validate feelings, and offer comforting words.",
                "Analyze text and images for emotional context.",
            ],
            Role::Closure => &[
                "You are a closure specialist.",
                "Draft emotional messages for unsent feelings.",
                "Focus on emotional release.",
            ],
            Role::RoutinePlanner => &[
                "You are a recovery routine planner.",
                "Design a 7-day recovery challenge.",
                "Suggest fun activities and self-care.",
            ],
            Role::BrutalHonesty => &[
                "You are a direct feedback specialist.",
                "Give raw, objective, and blunt feedback about the breakup.",
                "Provide factual reasons to move forward.",
            ],
        }
    }

    pub fn section_title(self) -> &'static str {
        match self {
            Role::Therapist => "🤗 Emotional Support",
            Role::Closure => "✍️ Finding Closure",
            Role::RoutinePlanner => "📅 Your Recovery Plan",
            Role::BrutalHonesty => "💪 Honest Perspective",
        }
    }

    pub fn progress_message(self) -> &'static str {
        match self {
            Role::Therapist => "🤗 Getting empathetic support...",
            Role::Closure => "✍️ Crafting closure messages...",
            Role::RoutinePlanner => "📅 Creating your routine...",
            Role::BrutalHonesty => "💪 Getting real with you...",
        }
    }

    pub fn prompt_prefix(self) -> &'static str {
        match self {
            Role::Therapist => "Analyze the emotional state",
            Role::Closure => "Draft closure messages for",
            Role::RoutinePlanner => "Design a 7-day recovery plan for",
            Role::BrutalHonesty => "Give brutal honest feedback",
        }
    }

    pub fn build_prompt(self, narrative: &str) -> String {
        format!("{}: {}", self.prompt_prefix(), narrative)
    }

    /// Only the honesty role may search the web.
    pub fn uses_web_search(self) -> bool {
        matches!(self, Role::BrutalHonesty)
    }
}

pub struct RoleAgent {
    role: Role,
    model: Arc<dyn ModelBackend>,
    instructions: Vec<String>,
    web_search: bool,
}

impl RoleAgent {
    pub fn new(role: Role, model: Arc<dyn ModelBackend>, web_search_enabled: bool) -> Self {
        let mut instructions = role
            .instructions()
            .iter()
            .map(|line| line.to_string())
            .collect::<Vec<String>>();
        instructions.push(MARKDOWN_INSTRUCTION.to_string());

        Self {
            role,
            model,
            instructions,
            web_search: web_search_enabled && role.uses_web_search(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    pub fn has_web_search(&self) -> bool {
        self.web_search
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub async fn run(&self, prompt: &str, images: &[ImageInput]) -> Result<ModelReply, ModelError> {
        self.model
            .generate(ModelRequest {
                instructions: &self.instructions,
                prompt,
                images,
                web_search: self.web_search,
            })
            .await
    }
}

impl std::fmt::Debug for RoleAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleAgent")
            .field("role", &self.role)
            .field("model", &self.model.name())
            .field("web_search", &self.web_search)
            .finish()
    }
}
