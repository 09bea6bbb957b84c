use crate::agent::{
    run_fight_routine, ControlLoop, LoopOutcome, RoutineParams, StepExecutor,
};
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::cooldown::CooldownScheduler;
use crate::error::Result;
use crate::gateway::{DefaultErrorPolicy, HttpGateway};
use crate::oracle::{LlmPlanner, LlmReplanner};
use crate::providers::CompatibleProvider;
use crate::tools::{self, catalog_lines, ActionContext, ToolRegistry};
use crate::world;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Dispatch a parsed command against the loaded config.
pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Run {
            objective,
            character,
            max_iterations,
        } => {
            run_objective(
                &config,
                &objective,
                character.as_deref().unwrap_or(&config.character),
                max_iterations.unwrap_or(config.agent.max_iterations),
            )
            .await
        }
        Commands::Routine { cycles, x, y } => {
            let gateway = build_gateway(&config);
            let scheduler = CooldownScheduler::tokio();
            let params = RoutineParams {
                x: x.unwrap_or(config.agent.routine_x),
                y: y.unwrap_or(config.agent.routine_y),
                cycles: cycles.unwrap_or(config.agent.routine_cycles),
            };
            let completed = run_fight_routine(
                &gateway,
                &scheduler,
                &DefaultErrorPolicy,
                &config.character,
                &params,
            )
            .await?;
            println!("routine finished after {completed} cycles");
            Ok(())
        }
        Commands::Status => {
            let gateway = build_gateway(&config);
            let snapshot = world::bootstrap(&gateway, &config.character).await?;
            println!("{}", snapshot.render_for_prompt());
            Ok(())
        }
    }
}

fn build_gateway(config: &Config) -> HttpGateway {
    HttpGateway::new(&config.api.base_url, config.api.token.as_deref())
}

async fn run_objective(
    config: &Config,
    objective: &str,
    character: &str,
    max_iterations: u32,
) -> Result<()> {
    let gateway: Arc<HttpGateway> = Arc::new(build_gateway(config));
    let snapshot = world::bootstrap(gateway.as_ref(), character).await?;
    let world = Arc::new(RwLock::new(snapshot));

    let scheduler = CooldownScheduler::tokio();
    let ctx = Arc::new(ActionContext {
        gateway: gateway.clone(),
        scheduler,
        policy: Arc::new(DefaultErrorPolicy),
        character: character.to_string(),
        world: world.clone(),
    });
    let registry: Arc<ToolRegistry> = Arc::new(tools::build_registry(ctx));
    let catalog = catalog_lines(&registry.specs());

    let provider = Arc::new(CompatibleProvider::new(
        &config.provider.base_url,
        config.provider.api_key.as_deref(),
    ));
    let planner = Arc::new(LlmPlanner::new(
        provider.clone(),
        catalog.clone(),
        config.provider.model.clone(),
        config.provider.temperature,
    ));
    let replanner = Arc::new(LlmReplanner::new(
        provider.clone(),
        catalog,
        config.provider.model.clone(),
        config.provider.temperature,
    ));
    let executor = Arc::new(StepExecutor::new(
        provider,
        registry,
        config.provider.model.clone(),
        config.provider.temperature,
        config.agent.step_iterations,
    ));

    let control_loop = ControlLoop::new(planner, replanner, executor, world, max_iterations);
    let report = control_loop.run(objective).await?;

    match report.outcome {
        LoopOutcome::Final(response) => println!("{response}"),
        LoopOutcome::PlanExhausted => {
            println!(
                "plan exhausted after {} steps without a final answer",
                report.history.len()
            );
        }
        LoopOutcome::BoundExceeded => {
            println!(
                "iteration bound of {max_iterations} reached after {} steps",
                report.history.len()
            );
        }
    }
    Ok(())
}
