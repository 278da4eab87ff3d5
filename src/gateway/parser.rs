use serde::de::DeserializeOwned;

use super::LlmError;

/// Parse a structured reply into `T`.
///
/// Accepts a bare JSON object or one wrapped in a ```json fence. Anything
/// else (empty text, prose, missing fields) is an error; no partially
/// filled value is ever produced.
pub fn parse_structured_reply<T: DeserializeOwned>(reply: &str) -> Result<T, LlmError> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    let json_str = extract_fenced_json(trimmed).unwrap_or(trimmed);
    serde_json::from_str(json_str).map_err(|e| LlmError::MalformedResponse(e.to_string()))
}

/// Free-text reply, rejected when blank.
pub fn parse_text_reply(reply: &str) -> Result<String, LlmError> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(trimmed.to_string())
}

/// Body of the first ```json (or bare ```) fenced block, if any.
fn extract_fenced_json(response: &str) -> Option<&str> {
    let (start, marker_len) = match response.find("```json") {
        Some(pos) => (pos, 7),
        None => (response.find("```")?, 3),
    };
    let content_start = start + marker_len;
    let end = response[content_start..].find("```")?;
    Some(response[content_start..content_start + end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::types::{MedicineInfo, TriageResult};
    use crate::models::Urgency;

    const TRIAGE_JSON: &str = r#"{
        "recommendedSpecialization": "Cardiologist",
        "urgency": "High",
        "explanation": "Chest pain with shortness of breath needs prompt review.",
        "preparationQuestions": ["When did it start?", "Does it spread to your arm?"]
    }"#;

    #[test]
    fn parses_bare_object() {
        let result: TriageResult = parse_structured_reply(TRIAGE_JSON).unwrap();
        assert_eq!(result.recommended_specialization, "Cardiologist");
        assert_eq!(result.urgency, Urgency::High);
        assert_eq!(result.preparation_questions.len(), 2);
    }

    #[test]
    fn parses_fenced_object() {
        let reply = format!("Here you go:\n```json\n{TRIAGE_JSON}\n```\nStay safe.");
        let result: TriageResult = parse_structured_reply(&reply).unwrap();
        assert_eq!(result.urgency, Urgency::High);
    }

    #[test]
    fn accepts_legacy_question_field_name() {
        let reply = r#"{"recommendedSpecialization":"Neurologist","urgency":"Low",
            "explanation":"Tension headache","possibleQuestions":["How often?"]}"#;
        let result: TriageResult = parse_structured_reply(reply).unwrap();
        assert_eq!(result.preparation_questions, vec!["How often?"]);
    }

    #[test]
    fn empty_reply_is_error() {
        assert!(matches!(
            parse_structured_reply::<TriageResult>("   \n"),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(parse_text_reply(""), Err(LlmError::EmptyResponse)));
    }

    #[test]
    fn missing_field_is_error() {
        let reply = r#"{"name":"Ibuprofen","whatIsIt":"An NSAID"}"#;
        assert!(matches!(
            parse_structured_reply::<MedicineInfo>(reply),
            Err(LlmError::MalformedResponse(_))
        ));
    }

    #[test]
    fn unknown_urgency_is_error() {
        let reply = TRIAGE_JSON.replace("\"High\"", "\"Extreme\"");
        assert!(parse_structured_reply::<TriageResult>(&reply).is_err());
    }

    #[test]
    fn prose_is_error() {
        assert!(parse_structured_reply::<MedicineInfo>("I cannot help with that.").is_err());
    }

    #[test]
    fn text_reply_is_trimmed() {
        assert_eq!(parse_text_reply("  Hello there.\n").unwrap(), "Hello there.");
    }
}
