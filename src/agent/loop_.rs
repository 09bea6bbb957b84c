use super::executor::StepRunner;
use crate::error::Result;
use crate::oracle::{HistoryEntry, Plan, Planner, Replanner, RevisedOutcome};
use crate::world::WorldSnapshot;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Default bound on plan-execute-replan transitions per run.
pub const DEFAULT_MAX_ITERATIONS: u32 = 50;

/// Response returned when the planner produces no steps at all, meaning
/// the objective required nothing to be done.
pub const EMPTY_OBJECTIVE_RESPONSE: &str =
    "Nothing to do: the objective required no steps.";

/// Why a run stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopOutcome {
    /// The replanner produced a final answer for the user.
    Final(String),
    /// The plan ran out of steps without the replanner finalizing.
    PlanExhausted,
    /// The transition bound was hit before the objective resolved.
    BoundExceeded,
}

/// Final report of a run: outcome, executed steps, transitions consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopReport {
    pub outcome: LoopOutcome,
    pub history: Vec<HistoryEntry>,
    pub iterations: u32,
}

/// Plan-execute-replan driver.
///
/// A run plans once, then alternates executing the front step and consulting
/// the replanner. Every execute and every replan consumes one iteration
/// against the bound. Fatal errors from the runner or the oracles abort the
/// run as `Err` without any further consultation.
pub struct ControlLoop {
    planner: Arc<dyn Planner>,
    replanner: Arc<dyn Replanner>,
    runner: Arc<dyn StepRunner>,
    world: Arc<RwLock<WorldSnapshot>>,
    max_iterations: u32,
}

impl ControlLoop {
    pub fn new(
        planner: Arc<dyn Planner>,
        replanner: Arc<dyn Replanner>,
        runner: Arc<dyn StepRunner>,
        world: Arc<RwLock<WorldSnapshot>>,
        max_iterations: u32,
    ) -> Self {
        Self {
            planner,
            replanner,
            runner,
            world,
            max_iterations,
        }
    }

    async fn snapshot(&self) -> String {
        self.world.read().await.render_for_prompt()
    }

    pub async fn run(&self, objective: &str) -> Result<LoopReport> {
        let snapshot = self.snapshot().await;
        let mut plan = self.planner.plan(objective, &snapshot).await?;
        tracing::info!(steps = plan.len(), objective, "starting run");

        // An empty initial plan terminates right away with a response,
        // unlike an exhausted plan mid-run which has no response to give.
        if plan.is_empty() {
            return Ok(report(
                LoopOutcome::Final(EMPTY_OBJECTIVE_RESPONSE.to_string()),
                Vec::new(),
                0,
            ));
        }

        let mut history: Vec<HistoryEntry> = Vec::new();
        let mut iterations: u32 = 0;

        loop {
            // Executing transition.
            iterations += 1;
            if iterations > self.max_iterations {
                return Ok(report(LoopOutcome::BoundExceeded, history, iterations - 1));
            }
            let Some(step) = plan.pop_next() else {
                return Ok(report(LoopOutcome::PlanExhausted, history, iterations - 1));
            };
            tracing::info!(step, iteration = iterations, "executing step");
            let snapshot = self.snapshot().await;
            let entry = self.runner.run_step(&step, &snapshot).await?;
            history.push(entry);

            // Replanning transition.
            iterations += 1;
            if iterations > self.max_iterations {
                return Ok(report(LoopOutcome::BoundExceeded, history, iterations - 1));
            }
            let snapshot = self.snapshot().await;
            match self
                .replanner
                .replan(objective, &plan, &history, &snapshot)
                .await?
            {
                RevisedOutcome::Finalize(response) => {
                    tracing::info!(iterations, "run finalized");
                    return Ok(report(LoopOutcome::Final(response), history, iterations));
                }
                RevisedOutcome::Revise(revised) => {
                    if revised.is_empty() {
                        return Ok(report(LoopOutcome::PlanExhausted, history, iterations));
                    }
                    plan = revised;
                }
            }
        }
    }
}

fn report(outcome: LoopOutcome, history: Vec<HistoryEntry>, iterations: u32) -> LoopReport {
    LoopReport {
        outcome,
        history,
        iterations,
    }
}
