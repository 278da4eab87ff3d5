use serde_json::{json, Value};

pub const TRIAGE_SYSTEM_PROMPT: &str = "You are a professional medical triage assistant. \
You help patients identify the correct doctor specialization based on symptoms. \
Be helpful but always remind them you are an AI and they should consult a professional \
in emergencies. Return data in JSON format.";

pub const MEDICINE_SYSTEM_PROMPT: &str = "You are a medical pharmacology assistant. \
Explain medicines simply to patients. Include what it is, how to use it, common side \
effects, and important precautions. Be accurate but always add a disclaimer. \
Return in JSON format.";

const NO_HISTORY: &str = "No previous records found.";

/// Temperature for the conversational assistant.
pub const ASSISTANT_TEMPERATURE: f32 = 0.7;

pub fn build_triage_prompt(symptoms: &str) -> String {
    format!("Analyze these symptoms and provide medical triage advice: \"{symptoms}\"")
}

pub fn build_medicine_prompt(name: &str) -> String {
    format!("Explain this medicine or prescription in simple terms: \"{name}\"")
}

/// System prompt for the health assistant, grounded on the patient's
/// appointment history summary.
pub fn build_assistant_system_prompt(history_summary: &str) -> String {
    let history = if history_summary.trim().is_empty() {
        NO_HISTORY
    } else {
        history_summary
    };

    format!(
        "You are the MediQ Health Assistant. Your goal is to help patients understand \
their medical journey by answering questions about their history.

Patient Medical History:
{history}

Rules:
1. Use the provided history to answer specific questions.
2. Be empathetic and professional.
3. If asked about something not in the history, answer generally but prioritize the patient's context.
4. Always remind them that you are an AI and to consult their actual doctor for changes in treatment.
5. Keep responses concise and formatted with markdown if needed."
    )
}

/// JSON schema requested for triage replies.
pub fn triage_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "recommendedSpecialization": { "type": "string" },
            "urgency": { "type": "string", "enum": ["Low", "Medium", "High"] },
            "explanation": { "type": "string" },
            "preparationQuestions": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["recommendedSpecialization", "urgency", "explanation", "preparationQuestions"]
    })
}

/// JSON schema requested for medicine lookups.
pub fn medicine_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "whatIsIt": { "type": "string" },
            "instructions": { "type": "array", "items": { "type": "string" } },
            "sideEffects": { "type": "array", "items": { "type": "string" } },
            "precautions": { "type": "string" }
        },
        "required": ["name", "whatIsIt", "instructions", "sideEffects", "precautions"]
    })
}
