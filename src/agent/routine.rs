use crate::cooldown::CooldownScheduler;
use crate::error::Result;
use crate::gateway::{perform_with_recovery, ActionGateway, ActionRequest, ErrorPolicy};

/// Parameters for the scripted grind loop.
pub struct RoutineParams {
    pub x: i64,
    pub y: i64,
    pub cycles: u32,
}

/// Scripted move-fight-rest loop against a fixed map tile.
///
/// Each cycle moves to the tile (a move that lands on the current position is
/// absorbed), fights the monster there, then rests back to full. Fatal action
/// errors abort the routine; the number of completed cycles is returned.
pub async fn run_fight_routine(
    gateway: &dyn ActionGateway,
    scheduler: &CooldownScheduler,
    policy: &dyn ErrorPolicy,
    character: &str,
    params: &RoutineParams,
) -> Result<u32> {
    tracing::info!(
        x = params.x,
        y = params.y,
        cycles = params.cycles,
        "starting fight routine"
    );

    for cycle in 0..params.cycles {
        tracing::info!(cycle, "routine cycle");
        for request in [
            ActionRequest::Move {
                x: params.x,
                y: params.y,
            },
            ActionRequest::Fight,
            ActionRequest::Rest,
        ] {
            perform_with_recovery(gateway, scheduler, policy, character, &request).await?;
        }
    }

    Ok(params.cycles)
}
