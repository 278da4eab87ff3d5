use super::parser::{parse_structured_reply, parse_text_reply};
use super::prompt::{
    build_assistant_system_prompt, build_medicine_prompt, build_triage_prompt, medicine_schema,
    triage_schema, ASSISTANT_TEMPERATURE, MEDICINE_SYSTEM_PROMPT, TRIAGE_SYSTEM_PROMPT,
};
use super::types::{ChatTurn, LlmClient, MedicineInfo, TriageResult};
use super::{GatewayError, LlmError};

/// Minimum symptom description length (characters) before triage runs.
pub const MIN_SYMPTOM_LENGTH: usize = 10;

const TRIAGE_UNAVAILABLE: &str = "AI Triage is currently unavailable.";
const MEDICINE_UNAVAILABLE: &str = "Unable to fetch medicine details at this time.";
const ASSISTANT_UNAVAILABLE: &str = "AI Assistant is currently resting. Please try again later.";

/// Request/response wrapper around the text-generation service.
///
/// One remote call per operation: no retries, no caching. Every failure
/// surfaces as `GatewayError::ServiceUnavailable` and nothing partial is
/// returned.
pub struct AssistantGateway {
    llm: Box<dyn LlmClient + Send + Sync>,
}

impl AssistantGateway {
    pub fn new(llm: Box<dyn LlmClient + Send + Sync>) -> Self {
        Self { llm }
    }

    pub fn triage(&self, symptoms: &str) -> Result<TriageResult, GatewayError> {
        let symptoms = symptoms.trim();
        if symptoms.chars().count() < MIN_SYMPTOM_LENGTH {
            return Err(GatewayError::InvalidInput(format!(
                "Describe symptoms in at least {MIN_SYMPTOM_LENGTH} characters"
            )));
        }

        let schema = triage_schema();
        self.llm
            .generate(TRIAGE_SYSTEM_PROMPT, &build_triage_prompt(symptoms), Some(&schema))
            .and_then(|reply| parse_structured_reply(&reply))
            .map_err(|e| unavailable("triage", TRIAGE_UNAVAILABLE, e))
    }

    pub fn medicine_lookup(&self, name: &str) -> Result<MedicineInfo, GatewayError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GatewayError::InvalidInput("Medicine name is required".into()));
        }

        let schema = medicine_schema();
        self.llm
            .generate(MEDICINE_SYSTEM_PROMPT, &build_medicine_prompt(name), Some(&schema))
            .and_then(|reply| parse_structured_reply(&reply))
            .map_err(|e| unavailable("medicine_lookup", MEDICINE_UNAVAILABLE, e))
    }

    /// Answer `message` in the context of the patient's history summary and
    /// the earlier turns of this conversation.
    pub fn converse(
        &self,
        message: &str,
        history_summary: &str,
        prior_turns: &[ChatTurn],
    ) -> Result<String, GatewayError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(GatewayError::InvalidInput("Message cannot be empty".into()));
        }

        let mut turns = prior_turns.to_vec();
        turns.push(ChatTurn::user(message));

        self.llm
            .chat(
                &build_assistant_system_prompt(history_summary),
                &turns,
                ASSISTANT_TEMPERATURE,
            )
            .and_then(|reply| parse_text_reply(&reply))
            .map_err(|e| unavailable("converse", ASSISTANT_UNAVAILABLE, e))
    }
}

fn unavailable(operation: &str, message: &'static str, cause: LlmError) -> GatewayError {
    tracing::error!(operation, error = %cause, "AI gateway call failed");
    GatewayError::ServiceUnavailable { message, cause }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ollama::MockLlmClient;
    use crate::gateway::types::TurnRole;
    use crate::models::Urgency;
    use std::sync::Arc;

    /// Lets a test keep a handle on the mock after handing it to the gateway.
    struct Shared(Arc<MockLlmClient>);

    impl LlmClient for Shared {
        fn generate(
            &self,
            system: &str,
            prompt: &str,
            schema: Option<&serde_json::Value>,
        ) -> Result<String, LlmError> {
            self.0.generate(system, prompt, schema)
        }

        fn chat(&self, system: &str, turns: &[ChatTurn], temperature: f32) -> Result<String, LlmError> {
            self.0.chat(system, turns, temperature)
        }
    }

    fn gateway_with(response: &str) -> (AssistantGateway, Arc<MockLlmClient>) {
        let mock = Arc::new(MockLlmClient::new(response));
        (
            AssistantGateway::new(Box::new(Shared(Arc::clone(&mock)))),
            mock,
        )
    }

    #[test]
    fn triage_parses_structured_reply() {
        let (gateway, mock) = gateway_with(
            r#"{"recommendedSpecialization":"Cardiologist","urgency":"Medium",
                "explanation":"Palpitations should be checked.","preparationQuestions":["How long?"]}"#,
        );
        let result = gateway.triage("heart racing after coffee").unwrap();
        assert_eq!(result.recommended_specialization, "Cardiologist");
        assert_eq!(result.urgency, Urgency::Medium);

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].has_schema);
        assert!(calls[0].prompt.contains("\"heart racing after coffee\""));
        assert_eq!(calls[0].system, TRIAGE_SYSTEM_PROMPT);
    }

    #[test]
    fn triage_rejects_short_input_without_calling_service() {
        let (gateway, mock) = gateway_with("{}");
        let err = gateway.triage("  cough   ").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidInput(_)));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn triage_empty_reply_is_service_unavailable() {
        let (gateway, _mock) = gateway_with("");
        let err = gateway.triage("persistent headache for days").unwrap_err();
        assert!(err.is_service_unavailable());
        assert_eq!(err.to_string(), "AI Triage is currently unavailable.");
    }

    #[test]
    fn triage_unreachable_service_is_service_unavailable() {
        let gateway = AssistantGateway::new(Box::new(MockLlmClient::unreachable()));
        let err = gateway.triage("persistent headache for days").unwrap_err();
        match err {
            GatewayError::ServiceUnavailable { cause, .. } => {
                assert!(matches!(cause, LlmError::Connection(_)))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn medicine_lookup_parses_reply() {
        let (gateway, mock) = gateway_with(
            "```json\n{\"name\":\"Paracetamol\",\"whatIsIt\":\"A pain reliever\",\
             \"instructions\":[\"Take with water\"],\"sideEffects\":[\"Rare rash\"],\
             \"precautions\":\"Do not exceed 4g a day\"}\n```",
        );
        let info = gateway.medicine_lookup(" Paracetamol ").unwrap();
        assert_eq!(info.name, "Paracetamol");
        assert_eq!(info.side_effects, vec!["Rare rash"]);
        assert!(mock.calls()[0].prompt.contains("\"Paracetamol\""));
    }

    #[test]
    fn medicine_lookup_malformed_reply_fails() {
        let (gateway, _mock) = gateway_with("{\"name\": \"Paracetamol\"}");
        let err = gateway.medicine_lookup("Paracetamol").unwrap_err();
        assert!(err.is_service_unavailable());
        assert_eq!(err.to_string(), MEDICINE_UNAVAILABLE);
    }

    #[test]
    fn medicine_lookup_requires_name() {
        let (gateway, _mock) = gateway_with("{}");
        assert!(matches!(
            gateway.medicine_lookup("   "),
            Err(GatewayError::InvalidInput(_))
        ));
    }

    #[test]
    fn converse_injects_history_and_turns() {
        let (gateway, mock) = gateway_with("  Your last visit noted rest and fluids.  ");
        let prior = vec![ChatTurn::user("Hi"), ChatTurn::assistant("Hello! How can I help?")];
        let reply = gateway
            .converse(
                "What did my doctor say?",
                "- Date: 2024-06-01, Doctor: Dr. Sarah Mitchell, Problem: cough, Notes: Rest and fluids, Status: Good",
                &prior,
            )
            .unwrap();
        assert_eq!(reply, "Your last visit noted rest and fluids.");

        let call = &mock.calls()[0];
        assert!(call.system.contains("Notes: Rest and fluids"));
        assert_eq!(call.turns.len(), 3);
        assert_eq!(call.turns[2].role, TurnRole::User);
        assert_eq!(call.turns[2].text, "What did my doctor say?");
    }

    #[test]
    fn converse_empty_reply_is_service_unavailable() {
        let (gateway, _mock) = gateway_with("   ");
        let err = gateway.converse("hello", "", &[]).unwrap_err();
        assert!(err.is_service_unavailable());
        assert_eq!(err.to_string(), ASSISTANT_UNAVAILABLE);
    }
}
