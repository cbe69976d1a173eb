use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// A hung backend call stalls its whole batch, so every request carries a
/// deadline; hitting it counts as a batch failure like any other.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// One entry of a batch request, keyed by the stringified line index. `len`
/// is the source character count, passed to the model as a length budget.
#[derive(Clone, Debug, Serialize)]
pub struct RequestItem {
    pub text: String,
    pub context: String,
    pub len: usize,
}

pub type BatchRequest = HashMap<String, RequestItem>;

/// id -> translated text. May be a strict subset of the request; lines with no
/// entry keep their original text.
pub type BatchResult = HashMap<String, String>;

/// Boundary to the translation service. The pipeline is generic over this so
/// tests drive it with a scripted backend instead of a live endpoint.
pub trait TranslationBackend {
    fn translate_batch(
        &self,
        items: &BatchRequest,
        lang: &str,
    ) -> impl Future<Output = anyhow::Result<BatchResult>> + Send;
}

/// OpenAI-compatible chat-completions client using strict structured output.
pub struct OpenAiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    system_instruction: String,
}

impl OpenAiBackend {
    pub fn new(
        api_key: String,
        model: String,
        system_instruction: String,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build http client")?;
        let base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .map(|s| s.trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self {
            client,
            base_url,
            api_key,
            model,
            system_instruction,
        })
    }
}

impl TranslationBackend for OpenAiBackend {
    fn translate_batch(
        &self,
        items: &BatchRequest,
        lang: &str,
    ) -> impl Future<Output = anyhow::Result<BatchResult>> + Send {
        async move {
            if items.is_empty() {
                return Ok(BatchResult::new());
            }

            let user_content = format!(
                "Translate these items to {lang}: {}",
                serde_json::to_string(items).context("serialize batch request")?
            );
            let body = ChatRequest {
                model: &self.model,
                messages: vec![
                    Message {
                        role: "system",
                        content: &self.system_instruction,
                    },
                    Message {
                        role: "user",
                        content: &user_content,
                    },
                ],
                response_format: response_schema(),
            };

            let response = self
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .context("send translation request")?
                .error_for_status()
                .context("translation request rejected")?
                .json::<ChatResponse>()
                .await
                .context("decode chat completion")?;

            let content = response
                .choices
                .first()
                .map(|c| c.message.content.as_str())
                .context("backend returned no choices")?;
            parse_translation_content(content)
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    response_format: serde_json::Value,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct TranslationResponse {
    items: Vec<TranslationItem>,
}

#[derive(Deserialize)]
struct TranslationItem {
    id: String,
    translated_text: String,
}

/// Parse the model's structured reply. Anything that does not conform to the
/// schema is a batch failure; the response is never partially trusted.
fn parse_translation_content(content: &str) -> anyhow::Result<BatchResult> {
    let parsed: TranslationResponse =
        serde_json::from_str(content).context("backend response does not match translation schema")?;
    Ok(parsed
        .items
        .into_iter()
        .map(|item| (item.id, item.translated_text))
        .collect())
}

/// Strict-mode JSON schema the backend must reply in: an array of
/// {id, translated_text} objects.
fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "json_schema",
        "json_schema": {
            "name": "translation_response",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "items": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "id": {"type": "string", "description": "The input ID."},
                                "translated_text": {"type": "string", "description": "The translated content."}
                            },
                            "required": ["id", "translated_text"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["items"],
                "additionalProperties": false
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_conforming_reply() {
        let content = r#"{"items":[{"id":"0","translated_text":"Mela"},{"id":"3","translated_text":"Ferro"}]}"#;
        let map = parse_translation_content(content).unwrap();
        assert_eq!(map.get("0").map(String::as_str), Some("Mela"));
        assert_eq!(map.get("3").map(String::as_str), Some("Ferro"));
    }

    #[test]
    fn rejects_non_conforming_reply() {
        assert!(parse_translation_content("not json").is_err());
        assert!(parse_translation_content(r#"{"results":[]}"#).is_err());
        assert!(parse_translation_content(r#"{"items":[{"id":"0"}]}"#).is_err());
    }

    #[test]
    fn schema_requires_both_fields() {
        let schema = response_schema();
        let required = &schema["json_schema"]["schema"]["properties"]["items"]["items"]["required"];
        assert_eq!(
            required,
            &serde_json::json!(["id", "translated_text"])
        );
    }
}
