use serde::{Deserialize, Serialize};

use super::LlmError;
use crate::models::Urgency;

/// Triage advice for a free-text symptom description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageResult {
    pub recommended_specialization: String,
    pub urgency: Urgency,
    pub explanation: String,
    /// Questions the patient should be ready to answer at the visit.
    #[serde(alias = "possibleQuestions")]
    pub preparation_questions: Vec<String>,
}

/// Plain-language explanation of a medicine or prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineInfo {
    pub name: String,
    pub what_is_it: String,
    pub instructions: Vec<String>,
    pub side_effects: Vec<String>,
    pub precautions: String,
}

/// Who spoke a turn of the assistant conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    #[serde(alias = "model")]
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: &str) -> Self {
        Self {
            role: TurnRole::User,
            text: text.to_string(),
        }
    }

    pub fn assistant(text: &str) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.to_string(),
        }
    }
}

/// Text-generation backend abstraction (allows mocking).
pub trait LlmClient {
    /// Single-shot generation. `schema` asks the backend to answer with a
    /// JSON object of that shape.
    fn generate(
        &self,
        system: &str,
        prompt: &str,
        schema: Option<&serde_json::Value>,
    ) -> Result<String, LlmError>;

    /// Multi-turn conversation; the last turn is the one to answer.
    fn chat(&self, system: &str, turns: &[ChatTurn], temperature: f32)
        -> Result<String, LlmError>;
}
