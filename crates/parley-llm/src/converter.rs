use serde::Deserialize;
use serde_json::{json, Value};

use parley_core::errors::InferenceError;
use parley_core::provider::{InferenceRequest, InferenceResponse, TokenUsage};

/// Convert an InferenceRequest into the Converse API request body.
///
/// Turns already serialize in the wire shape (`{role, content: [{text}]}`),
/// so messages pass through unchanged.
pub fn build_request_body(request: &InferenceRequest) -> Value {
    let mut body = json!({
        "messages": request.messages,
        "inferenceConfig": {
            "maxTokens": request.options.max_tokens,
            "temperature": request.options.temperature,
        },
    });

    if !request.system.is_empty() {
        let system: Vec<Value> = request.system.iter().map(|s| json!({ "text": s })).collect();
        body["system"] = json!(system);
    }

    body
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConverseResponse {
    output: ConverseOutput,
    stop_reason: Option<String>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct ConverseOutput {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    content: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUsage {
    input_tokens: u64,
    output_tokens: u64,
    total_tokens: u64,
}

/// Extract `output.message.content[0].text` from a Converse response body.
pub fn parse_response(body: &str) -> Result<InferenceResponse, InferenceError> {
    let parsed: ConverseResponse = serde_json::from_str(body)
        .map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;

    let first = parsed
        .output
        .message
        .content
        .first()
        .ok_or_else(|| InferenceError::MalformedResponse("output.message.content is empty".into()))?;

    let text = first
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            InferenceError::MalformedResponse("output.message.content[0].text missing or not a string".into())
        })?;

    Ok(InferenceResponse {
        text: text.to_string(),
        stop_reason: parsed.stop_reason,
        usage: parsed.usage.map(|u| TokenUsage {
            input_tokens: u.input_tokens,
            output_tokens: u.output_tokens,
            total_tokens: u.total_tokens,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::messages::Turn;
    use parley_core::provider::GenerationOptions;

    fn request(messages: Vec<Turn>) -> InferenceRequest {
        InferenceRequest {
            system: vec!["You are an interviewer.".into()],
            messages,
            options: GenerationOptions::default(),
        }
    }

    #[test]
    fn request_body_shape() {
        let body = build_request_body(&request(vec![
            Turn::user("hi"),
            Turn::assistant("hello"),
            Turn::user("ask me something"),
        ]));
        assert_eq!(body["system"], json!([{"text": "You are an interviewer."}]));
        assert_eq!(body["messages"].as_array().unwrap().len(), 3);
        assert_eq!(body["messages"][0], json!({"role": "user", "content": [{"text": "hi"}]}));
        assert_eq!(body["messages"][1]["role"], "assistant");
        assert_eq!(body["inferenceConfig"]["maxTokens"], 300);
        assert_eq!(body["inferenceConfig"]["temperature"], 0.5);
    }

    #[test]
    fn empty_system_omitted() {
        let mut req = request(vec![Turn::user("hi")]);
        req.system.clear();
        let body = build_request_body(&req);
        assert!(body.get("system").is_none());
    }

    #[test]
    fn parses_reply_and_usage() {
        let body = r#"{
            "output": {"message": {"role": "assistant", "content": [{"text": "Tell me about yourself."}]}},
            "stopReason": "end_turn",
            "usage": {"inputTokens": 42, "outputTokens": 7, "totalTokens": 49},
            "metrics": {"latencyMs": 310}
        }"#;
        let resp = parse_response(body).unwrap();
        assert_eq!(resp.text, "Tell me about yourself.");
        assert_eq!(resp.stop_reason.as_deref(), Some("end_turn"));
        assert_eq!(resp.usage.unwrap().total_tokens, 49);
    }

    #[test]
    fn usage_is_optional() {
        let body = r#"{"output": {"message": {"content": [{"text": "ok"}]}}}"#;
        let resp = parse_response(body).unwrap();
        assert_eq!(resp.text, "ok");
        assert!(resp.usage.is_none());
        assert!(resp.stop_reason.is_none());
    }

    #[test]
    fn missing_output_is_malformed() {
        let err = parse_response(r#"{"message": "Internal"}"#).unwrap_err();
        assert!(matches!(err, InferenceError::MalformedResponse(ref m) if m.contains("output")));
    }

    #[test]
    fn empty_content_is_malformed() {
        let err = parse_response(r#"{"output": {"message": {"content": []}}}"#).unwrap_err();
        assert!(matches!(err, InferenceError::MalformedResponse(_)));
    }

    #[test]
    fn non_text_first_block_is_malformed() {
        let body = r#"{"output": {"message": {"content": [{"toolUse": {"name": "x"}}]}}}"#;
        let err = parse_response(body).unwrap_err();
        assert!(matches!(err, InferenceError::MalformedResponse(ref m) if m.contains("content[0].text")));
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(
            parse_response("<html>502</html>"),
            Err(InferenceError::MalformedResponse(_))
        ));
    }
}
