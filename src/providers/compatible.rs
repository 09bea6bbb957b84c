use super::response::{ContentBlock, MessageRole, ProviderMessage, ProviderResponse, StopReason};
use super::traits::Provider;
use crate::tools::ToolSpec;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provider for any OpenAI-compatible chat completions endpoint.
pub struct CompatibleProvider {
    endpoint: String,
    /// Pre-computed `"Bearer <key>"` header value.
    cached_auth_header: Option<String>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Clone, Serialize)]
struct WireTool {
    r#type: &'static str,
    function: WireToolDefinition,
}

#[derive(Debug, Clone, Serialize)]
struct WireToolDefinition {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    r#type: String,
    function: WireToolCallFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireToolCallFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

impl CompatibleProvider {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        Self::with_client(base_url, api_key, super::build_provider_client())
    }

    pub fn with_client(base_url: &str, api_key: Option<&str>, client: Client) -> Self {
        Self {
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            cached_auth_header: api_key.map(|key| format!("Bearer {key}")),
            client,
        }
    }

    fn text_message(role: &'static str, content: String) -> Message {
        Message {
            role,
            content: Some(content),
            tool_call_id: None,
            tool_calls: None,
        }
    }

    fn map_provider_message(provider_message: &ProviderMessage) -> Vec<Message> {
        let mut text_parts = Vec::new();
        let mut assistant_tool_calls = Vec::new();
        let mut tool_messages = Vec::new();

        for block in &provider_message.content {
            match block {
                ContentBlock::Text { text } => text_parts.push(text.clone()),
                ContentBlock::ToolUse { id, name, input } => {
                    assistant_tool_calls.push(WireToolCall {
                        id: id.clone(),
                        r#type: "function".to_string(),
                        function: WireToolCallFunction {
                            name: name.clone(),
                            arguments: input.to_string(),
                        },
                    });
                }
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    is_error: _,
                } => {
                    tool_messages.push(Message {
                        role: "tool",
                        content: Some(content.clone()),
                        tool_call_id: Some(tool_use_id.clone()),
                        tool_calls: None,
                    });
                }
            }
        }

        let text_content = if text_parts.is_empty() {
            None
        } else {
            Some(text_parts.join("\n"))
        };

        let mut messages = Vec::new();
        match provider_message.role {
            MessageRole::Assistant => {
                if text_content.is_some() || !assistant_tool_calls.is_empty() {
                    messages.push(Message {
                        role: "assistant",
                        content: text_content,
                        tool_call_id: None,
                        tool_calls: if assistant_tool_calls.is_empty() {
                            None
                        } else {
                            Some(assistant_tool_calls)
                        },
                    });
                }
            }
            MessageRole::User => {
                if let Some(content) = text_content {
                    messages.push(Self::text_message("user", content));
                }
            }
            MessageRole::System => {
                if let Some(content) = text_content {
                    messages.push(Self::text_message("system", content));
                }
            }
        }

        messages.extend(tool_messages);
        messages
    }

    fn wire_tools(tools: &[ToolSpec]) -> Option<Vec<WireTool>> {
        if tools.is_empty() {
            return None;
        }
        Some(
            tools
                .iter()
                .map(|tool| WireTool {
                    r#type: "function",
                    function: WireToolDefinition {
                        name: tool.name.clone(),
                        description: tool.description.clone(),
                        parameters: tool.parameters.clone(),
                    },
                })
                .collect(),
        )
    }

    fn map_finish_reason(finish_reason: Option<&str>) -> StopReason {
        match finish_reason {
            Some("stop") => StopReason::EndTurn,
            Some("tool_calls") => StopReason::ToolUse,
            Some("length") => StopReason::MaxTokens,
            Some(_) | None => StopReason::Error,
        }
    }

    fn parse_tool_calls(tool_calls: Option<Vec<WireToolCall>>) -> anyhow::Result<Vec<ContentBlock>> {
        tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tool_call| {
                let input: Value = serde_json::from_str(&tool_call.function.arguments)
                    .with_context(|| {
                        format!(
                            "tool call arguments were not valid JSON for {}",
                            tool_call.function.name
                        )
                    })?;
                Ok(ContentBlock::ToolUse {
                    id: tool_call.id,
                    name: tool_call.function.name,
                    input,
                })
            })
            .collect()
    }

    async fn call_api(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(auth_header) = &self.cached_auth_header {
            builder = builder.header("Authorization", auth_header);
        }

        let response = builder.send().await.context("chat request failed")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            anyhow::bail!("chat API error ({status}): {body}");
        }

        response
            .json()
            .await
            .context("chat response JSON decode failed")
    }
}

#[async_trait]
impl Provider for CompatibleProvider {
    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(sys) = system_prompt {
            messages.push(Self::text_message("system", sys.to_string()));
        }
        messages.push(Self::text_message("user", message.to_string()));

        let request = ChatRequest {
            model: model.to_string(),
            messages,
            temperature,
            tools: None,
        };
        let chat_response = self.call_api(&request).await?;
        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("empty chat completion"))
    }

    async fn chat_with_tools(
        &self,
        system_prompt: Option<&str>,
        messages: &[ProviderMessage],
        tools: &[ToolSpec],
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<ProviderResponse> {
        let mut wire_messages = Vec::new();
        if let Some(sys) = system_prompt {
            wire_messages.push(Self::text_message("system", sys.to_string()));
        }
        for provider_message in messages {
            wire_messages.extend(Self::map_provider_message(provider_message));
        }

        let request = ChatRequest {
            model: model.to_string(),
            messages: wire_messages,
            temperature,
            tools: Self::wire_tools(tools),
        };
        let chat_response = self.call_api(&request).await?;
        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("empty chat completion"))?;

        let text = choice.message.content.unwrap_or_default();
        let mut content_blocks = Self::parse_tool_calls(choice.message.tool_calls)?;
        if !text.is_empty() {
            content_blocks.insert(0, ContentBlock::Text { text: text.clone() });
        }

        Ok(ProviderResponse {
            text,
            content_blocks,
            stop_reason: Some(Self::map_finish_reason(choice.finish_reason.as_deref())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn chat_with_system_returns_first_choice_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer key-123"))
            .and(body_partial_json(serde_json::json!({"model": "gpt-4o"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": { "content": "plan ready" },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let provider = CompatibleProvider::new(&server.uri(), Some("key-123"));
        let text = provider
            .chat_with_system(Some("you plan"), "objective", "gpt-4o", 0.0)
            .await
            .unwrap();
        assert_eq!(text, "plan ready");
    }

    #[tokio::test]
    async fn chat_with_tools_parses_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": { "name": "move", "arguments": "{\"x\":0,\"y\":1}" }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            })))
            .mount(&server)
            .await;

        let provider = CompatibleProvider::new(&server.uri(), None);
        let response = provider
            .chat_with_tools(None, &[ProviderMessage::user("go")], &[], "gpt-4o", 0.0)
            .await
            .unwrap();
        assert!(response.has_tool_use());
        assert_eq!(response.stop_reason, Some(StopReason::ToolUse));
        match &response.content_blocks[0] {
            ContentBlock::ToolUse { name, input, .. } => {
                assert_eq!(name, "move");
                assert_eq!(input["y"], 1);
            }
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let provider = CompatibleProvider::new(&server.uri(), None);
        let result = provider
            .chat_with_system(None, "objective", "gpt-4o", 0.0)
            .await;
        assert!(result.unwrap_err().to_string().contains("chat API error"));
    }

    #[test]
    fn finish_reason_mapping() {
        assert_eq!(
            CompatibleProvider::map_finish_reason(Some("stop")),
            StopReason::EndTurn
        );
        assert_eq!(
            CompatibleProvider::map_finish_reason(Some("length")),
            StopReason::MaxTokens
        );
        assert_eq!(
            CompatibleProvider::map_finish_reason(None),
            StopReason::Error
        );
    }

    #[test]
    fn invalid_tool_arguments_fail_parsing() {
        let calls = vec![WireToolCall {
            id: "call_1".into(),
            r#type: "function".into(),
            function: WireToolCallFunction {
                name: "move".into(),
                arguments: "not json".into(),
            },
        }];
        assert!(CompatibleProvider::parse_tool_calls(Some(calls)).is_err());
    }
}
