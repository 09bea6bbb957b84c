use crate::error::{ArtificerError, OracleError, Result};
use crate::oracle::HistoryEntry;
use crate::providers::{ContentBlock, Provider, ProviderMessage};
use crate::tools::ToolRegistry;
use async_trait::async_trait;
use std::sync::Arc;

/// Absolute upper bound on tool-use turns within a single step.
pub(crate) const STEP_LOOP_HARD_CAP: u32 = 10;

const EXECUTOR_PROMPT: &str = "You are a game character controller. Carry out the given step by \
calling the available tools. When the step is done, reply with a short summary of what happened.";

/// Executes one natural-language step against the tool catalog.
#[async_trait]
pub trait StepRunner: Send + Sync {
    async fn run_step(&self, step: &str, snapshot: &str) -> Result<HistoryEntry>;
}

/// Step runner driving a chat provider through a bounded tool-use loop.
pub struct StepExecutor {
    provider: Arc<dyn Provider>,
    registry: Arc<ToolRegistry>,
    model: String,
    temperature: f64,
    max_iterations: u32,
}

impl StepExecutor {
    pub fn new(
        provider: Arc<dyn Provider>,
        registry: Arc<ToolRegistry>,
        model: impl Into<String>,
        temperature: f64,
        max_iterations: u32,
    ) -> Self {
        Self {
            provider,
            registry,
            model: model.into(),
            temperature,
            max_iterations: max_iterations.min(STEP_LOOP_HARD_CAP),
        }
    }
}

#[async_trait]
impl StepRunner for StepExecutor {
    /// Send the step to the provider, execute requested tool calls, and
    /// repeat until the model stops requesting tools or the turn limit is
    /// reached. Fatal tool errors unwind immediately.
    async fn run_step(&self, step: &str, snapshot: &str) -> Result<HistoryEntry> {
        let tools = self.registry.specs();
        let system_prompt = format!("{EXECUTOR_PROMPT}\n\n{snapshot}");
        let mut messages = vec![ProviderMessage::user(step)];

        for iteration in 0..self.max_iterations {
            let response = self
                .provider
                .chat_with_tools(
                    Some(&system_prompt),
                    &messages,
                    &tools,
                    &self.model,
                    self.temperature,
                )
                .await
                .map_err(|err| OracleError::Request {
                    role: "executor",
                    message: err.to_string(),
                })?;

            messages.push(response.to_assistant_message());

            if !response.has_tool_use() {
                return Ok(HistoryEntry {
                    step: step.to_string(),
                    result: response.text,
                });
            }

            for block in response.tool_use_blocks() {
                let ContentBlock::ToolUse { id, name, input } = block else {
                    continue;
                };
                tracing::debug!(tool = %name, iteration, "executing tool call");
                // Restore the typed error if the tool raised one, so a fatal
                // game error keeps its classification on the way up.
                let result = self
                    .registry
                    .execute(name, input.clone())
                    .await
                    .map_err(|err| match err.downcast::<ArtificerError>() {
                        Ok(typed) => typed,
                        Err(other) => ArtificerError::Other(other),
                    })?;
                let content = if result.success {
                    result.output.clone()
                } else {
                    result
                        .error
                        .clone()
                        .unwrap_or_else(|| "tool call failed".to_string())
                };
                messages.push(ProviderMessage::tool_result(
                    id.clone(),
                    content,
                    !result.success,
                ));
            }
        }

        tracing::warn!(step, "step hit the tool-use turn limit");
        Ok(HistoryEntry {
            step: step.to_string(),
            result: extract_last_text(&messages),
        })
    }
}

/// Pull the most recent assistant text out of the transcript.
fn extract_last_text(messages: &[ProviderMessage]) -> String {
    messages
        .iter()
        .rev()
        .find_map(|message| {
            message.content.iter().find_map(|block| match block {
                ContentBlock::Text { text } if !text.is_empty() => Some(text.clone()),
                _ => None,
            })
        })
        .unwrap_or_default()
}
