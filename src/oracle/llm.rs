use super::prompts::{planner_prompt, replanner_prompt};
use super::{HistoryEntry, Plan, Planner, Replanner, RevisedOutcome};
use crate::error::OracleError;
use crate::providers::Provider;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct PlanOutput {
    steps: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplanOutput {
    Response { response: String },
    Steps { steps: Vec<String> },
}

/// Strip a markdown code fence if the model wrapped its JSON in one.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn parse_json<T: for<'de> Deserialize<'de>>(
    role: &'static str,
    text: &str,
) -> Result<T, OracleError> {
    serde_json::from_str(strip_fences(text)).map_err(|err| OracleError::Malformed {
        role,
        message: format!("{err} in {text:?}"),
    })
}

/// Planner backed by a chat provider, expecting `{"steps": [...]}` output.
pub struct LlmPlanner {
    provider: Arc<dyn Provider>,
    catalog: String,
    model: String,
    temperature: f64,
}

impl LlmPlanner {
    pub fn new(
        provider: Arc<dyn Provider>,
        catalog: String,
        model: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            provider,
            catalog,
            model: model.into(),
            temperature,
        }
    }
}

#[async_trait]
impl Planner for LlmPlanner {
    async fn plan(&self, objective: &str, snapshot: &str) -> Result<Plan, OracleError> {
        let prompt = planner_prompt(objective, &self.catalog, snapshot);
        let text = self
            .provider
            .chat_with_system(None, &prompt, &self.model, self.temperature)
            .await
            .map_err(|err| OracleError::Request {
                role: "planner",
                message: err.to_string(),
            })?;
        let output: PlanOutput = parse_json("planner", &text)?;
        tracing::info!(steps = output.steps.len(), "planner produced a plan");
        Ok(Plan::from_steps(output.steps))
    }
}

/// Replanner backed by a chat provider, expecting either `{"response": ...}`
/// or `{"steps": [...]}`.
pub struct LlmReplanner {
    provider: Arc<dyn Provider>,
    catalog: String,
    model: String,
    temperature: f64,
}

impl LlmReplanner {
    pub fn new(
        provider: Arc<dyn Provider>,
        catalog: String,
        model: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            provider,
            catalog,
            model: model.into(),
            temperature,
        }
    }
}

#[async_trait]
impl Replanner for LlmReplanner {
    async fn replan(
        &self,
        objective: &str,
        plan: &Plan,
        history: &[HistoryEntry],
        snapshot: &str,
    ) -> Result<RevisedOutcome, OracleError> {
        let prompt = replanner_prompt(objective, plan, history, &self.catalog, snapshot);
        let text = self
            .provider
            .chat_with_system(None, &prompt, &self.model, self.temperature)
            .await
            .map_err(|err| OracleError::Request {
                role: "replanner",
                message: err.to_string(),
            })?;
        match parse_json("replanner", &text)? {
            ReplanOutput::Response { response } => {
                tracing::info!("replanner finalized the run");
                Ok(RevisedOutcome::Finalize(response))
            }
            ReplanOutput::Steps { steps } => {
                tracing::info!(steps = steps.len(), "replanner revised the plan");
                Ok(RevisedOutcome::Revise(Plan::from_steps(steps)))
            }
        }
    }
}
