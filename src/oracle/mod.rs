pub mod llm;
pub mod prompts;

pub use llm::{LlmPlanner, LlmReplanner};

use crate::error::OracleError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Ordered queue of natural-language steps awaiting execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan(VecDeque<String>);

impl Plan {
    pub fn from_steps(steps: impl IntoIterator<Item = String>) -> Self {
        Self(steps.into_iter().collect())
    }

    /// Remove and return the next step in order.
    pub fn pop_next(&mut self) -> Option<String> {
        self.0.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Render remaining steps one per line for the replanner prompt.
    pub fn joined(&self) -> String {
        self.0.iter().cloned().collect::<Vec<_>>().join("\n")
    }
}

/// One completed step with the executor's result summary.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub step: String,
    pub result: String,
}

impl HistoryEntry {
    pub fn rendered(&self) -> String {
        format!("{}: {}", self.step, self.result)
    }
}

/// The replanner either finalizes with an answer for the user or hands
/// back a revised queue of remaining steps.
#[derive(Debug, Clone, PartialEq)]
pub enum RevisedOutcome {
    Finalize(String),
    Revise(Plan),
}

#[async_trait]
pub trait Planner: Send + Sync {
    /// Produce the initial plan for an objective given the rendered world
    /// snapshot.
    async fn plan(&self, objective: &str, snapshot: &str) -> Result<Plan, OracleError>;
}

#[async_trait]
pub trait Replanner: Send + Sync {
    /// Revise the remaining plan after a completed step, or finalize.
    async fn replan(
        &self,
        objective: &str,
        plan: &Plan,
        history: &[HistoryEntry],
        snapshot: &str,
    ) -> Result<RevisedOutcome, OracleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_pops_in_order() {
        let mut plan = Plan::from_steps(["first".to_string(), "second".to_string()]);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.pop_next().as_deref(), Some("first"));
        assert_eq!(plan.pop_next().as_deref(), Some("second"));
        assert!(plan.pop_next().is_none());
        assert!(plan.is_empty());
    }

    #[test]
    fn joined_renders_one_step_per_line() {
        let plan = Plan::from_steps(["move to 0,1".to_string(), "fight".to_string()]);
        assert_eq!(plan.joined(), "move to 0,1\nfight");
    }

    #[test]
    fn history_entry_renders_step_and_result() {
        let entry = HistoryEntry {
            step: "fight".into(),
            result: "fight completed: won".into(),
        };
        assert_eq!(entry.rendered(), "fight: fight completed: won");
    }
}
