pub mod entities;
pub mod http;
pub mod types;

pub use entities::{CharacterState, Item, ItemFilter, MapContent, MapTile, Monster, TaskInfo};
pub use http::{build_api_client, HttpGateway};
pub use types::{
    describe_game_error, ActionOutcome, ActionPayload, ActionRequest, CooldownInfo,
    DefaultErrorPolicy, ErrorClass, ErrorPolicy, GameError, CODE_ALREADY_AT_DESTINATION,
    CODE_NO_MONSTER_HERE,
};

use crate::cooldown::CooldownScheduler;
use crate::error::{ActionError, ArtificerError, GatewayError};
use async_trait::async_trait;

/// Invokes named actions and read-only lookups against the game world.
///
/// Implementations must not retry internally; retry and recovery policy
/// belongs to the callers driving a step.
#[async_trait]
pub trait ActionGateway: Send + Sync {
    /// Perform one mutating action for `character`. A well-formed in-game
    /// failure is an `Ok(ActionOutcome::Failure(..))`, not an `Err`.
    async fn perform(
        &self,
        character: &str,
        request: &ActionRequest,
    ) -> Result<ActionOutcome, GatewayError>;

    async fn fetch_maps(
        &self,
        content_type: Option<&str>,
    ) -> Result<Vec<MapTile>, GatewayError>;

    async fn fetch_monsters(&self) -> Result<Vec<Monster>, GatewayError>;

    async fn fetch_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, GatewayError>;

    async fn fetch_character(&self, name: &str) -> Result<CharacterState, GatewayError>;

    async fn fetch_task(&self, code: &str) -> Result<TaskInfo, GatewayError>;
}

/// Result of dispatching one action through the recovery policy.
#[derive(Debug, Clone)]
pub enum ActionDispatch {
    /// The action (or its single post-compensation retry) succeeded.
    Completed(ActionPayload),
    /// A benign failure was absorbed; the message is the neutral summary.
    NoOp(String),
}

/// Dispatch an action, wait out its cooldown, and apply the recovery policy.
///
/// Success waits `cooldown.remaining_seconds` before returning, so the next
/// action for the same character can be dispatched immediately afterwards.
/// `RecoverableWithCompensation` performs the compensating action (with its
/// own cooldown wait) and retries the original exactly once.
pub async fn perform_with_recovery(
    gateway: &dyn ActionGateway,
    scheduler: &CooldownScheduler,
    policy: &dyn ErrorPolicy,
    character: &str,
    request: &ActionRequest,
) -> Result<ActionDispatch, ArtificerError> {
    match gateway.perform(character, request).await? {
        ActionOutcome::Success(payload) => {
            scheduler.wait(payload.cooldown.as_ref()).await;
            Ok(ActionDispatch::Completed(payload))
        }
        ActionOutcome::Failure(error) => match policy.classify(request, &error) {
            ErrorClass::RecoverableNoOp => {
                tracing::debug!(action = %request, code = error.code, "absorbed benign failure");
                Ok(ActionDispatch::NoOp(format!(
                    "{request} was not needed: {}",
                    error.message
                )))
            }
            ErrorClass::RecoverableWithCompensation(compensation) => {
                tracing::info!(
                    action = %request,
                    compensation = %compensation,
                    code = error.code,
                    "compensating before retry"
                );
                match gateway.perform(character, &compensation).await? {
                    ActionOutcome::Success(payload) => {
                        scheduler.wait(payload.cooldown.as_ref()).await;
                    }
                    ActionOutcome::Failure(comp_error) => {
                        // Compensation itself failed: surface the original.
                        let mut fatal_err = fatal(request, &error);
                        fatal_err.message = format!(
                            "{} (compensating {compensation} also failed: {})",
                            fatal_err.message, comp_error.message
                        );
                        return Err(fatal_err.into());
                    }
                }
                match gateway.perform(character, request).await? {
                    ActionOutcome::Success(payload) => {
                        scheduler.wait(payload.cooldown.as_ref()).await;
                        Ok(ActionDispatch::Completed(payload))
                    }
                    ActionOutcome::Failure(retry_error) => {
                        match policy.classify(request, &retry_error) {
                            ErrorClass::RecoverableNoOp => Ok(ActionDispatch::NoOp(format!(
                                "{request} was not needed: {}",
                                retry_error.message
                            ))),
                            // No second compensation round.
                            _ => Err(fatal(request, &retry_error).into()),
                        }
                    }
                }
            }
            ErrorClass::Fatal => Err(fatal(request, &error).into()),
        },
    }
}

fn fatal(request: &ActionRequest, error: &GameError) -> ActionError {
    ActionError {
        action: request.to_string(),
        code: error.code,
        message: describe_game_error(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooldown::{CooldownScheduler, RecordingSleeper};
    use std::sync::Arc;
    use std::sync::Mutex;

    /// Scripted gateway: pops one pre-programmed outcome per `perform` call.
    pub(crate) struct ScriptedGateway {
        outcomes: Mutex<Vec<ActionOutcome>>,
        pub performed: Mutex<Vec<ActionRequest>>,
    }

    impl ScriptedGateway {
        pub(crate) fn new(outcomes: Vec<ActionOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                performed: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ActionGateway for ScriptedGateway {
        async fn perform(
            &self,
            _character: &str,
            request: &ActionRequest,
        ) -> Result<ActionOutcome, GatewayError> {
            self.performed.lock().unwrap().push(request.clone());
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                return Err(GatewayError::Request {
                    endpoint: request.route().into(),
                    message: "script exhausted".into(),
                });
            }
            Ok(outcomes.remove(0))
        }

        async fn fetch_maps(
            &self,
            _content_type: Option<&str>,
        ) -> Result<Vec<MapTile>, GatewayError> {
            Ok(Vec::new())
        }

        async fn fetch_monsters(&self) -> Result<Vec<Monster>, GatewayError> {
            Ok(Vec::new())
        }

        async fn fetch_items(&self, _filter: &ItemFilter) -> Result<Vec<Item>, GatewayError> {
            Ok(Vec::new())
        }

        async fn fetch_character(&self, name: &str) -> Result<CharacterState, GatewayError> {
            Err(GatewayError::Request {
                endpoint: format!("/characters/{name}"),
                message: "not scripted".into(),
            })
        }

        async fn fetch_task(&self, code: &str) -> Result<TaskInfo, GatewayError> {
            Err(GatewayError::Request {
                endpoint: format!("/tasks/list/{code}"),
                message: "not scripted".into(),
            })
        }
    }

    fn success_with_cooldown(seconds: f64) -> ActionOutcome {
        ActionOutcome::Success(ActionPayload {
            cooldown: Some(CooldownInfo::of_seconds(seconds)),
            character: None,
            details: serde_json::Map::new(),
        })
    }

    fn failure(code: i32, message: &str) -> ActionOutcome {
        ActionOutcome::Failure(GameError {
            code,
            message: message.into(),
        })
    }

    fn recording_scheduler() -> (CooldownScheduler, Arc<RecordingSleeper>) {
        let sleeper = Arc::new(RecordingSleeper::default());
        (CooldownScheduler::new(sleeper.clone()), sleeper)
    }

    #[tokio::test]
    async fn success_waits_out_cooldown() {
        let gateway = ScriptedGateway::new(vec![success_with_cooldown(3.0)]);
        let (scheduler, sleeper) = recording_scheduler();
        let dispatch = perform_with_recovery(
            &gateway,
            &scheduler,
            &DefaultErrorPolicy,
            "Lukas",
            &ActionRequest::Fight,
        )
        .await
        .unwrap();
        assert!(matches!(dispatch, ActionDispatch::Completed(_)));
        assert_eq!(sleeper.waited(), vec![std::time::Duration::from_secs_f64(3.0)]);
    }

    #[tokio::test]
    async fn noop_move_skips_cooldown_wait() {
        let gateway = ScriptedGateway::new(vec![failure(
            types::CODE_ALREADY_AT_DESTINATION,
            "Character already at destination.",
        )]);
        let (scheduler, sleeper) = recording_scheduler();
        let dispatch = perform_with_recovery(
            &gateway,
            &scheduler,
            &DefaultErrorPolicy,
            "Lukas",
            &ActionRequest::Move { x: 0, y: 1 },
        )
        .await
        .unwrap();
        match dispatch {
            ActionDispatch::NoOp(summary) => assert!(summary.contains("already at destination")),
            ActionDispatch::Completed(_) => panic!("expected no-op"),
        }
        assert!(sleeper.waited().is_empty());
    }

    #[tokio::test]
    async fn fatal_failure_carries_relocation_hint() {
        let gateway =
            ScriptedGateway::new(vec![failure(types::CODE_NO_MONSTER_HERE, "Monster not found.")]);
        let (scheduler, _) = recording_scheduler();
        let err = perform_with_recovery(
            &gateway,
            &scheduler,
            &DefaultErrorPolicy,
            "Lukas",
            &ActionRequest::Fight,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("move to a map tile"));
    }

    /// Policy exercising the reserved compensation path: rest before
    /// retrying a fight that failed with an arbitrary marker code.
    struct RestBeforeFight;

    impl ErrorPolicy for RestBeforeFight {
        fn classify(&self, action: &ActionRequest, error: &GameError) -> ErrorClass {
            match (action, error.code) {
                (ActionRequest::Fight, 1000) => {
                    ErrorClass::RecoverableWithCompensation(ActionRequest::Rest)
                }
                _ => DefaultErrorPolicy.classify(action, error),
            }
        }
    }

    #[tokio::test]
    async fn compensation_retries_original_once() {
        let gateway = ScriptedGateway::new(vec![
            failure(1000, "too weak to fight"),
            success_with_cooldown(2.0), // rest
            success_with_cooldown(4.0), // retried fight
        ]);
        let (scheduler, sleeper) = recording_scheduler();
        let dispatch = perform_with_recovery(
            &gateway,
            &scheduler,
            &RestBeforeFight,
            "Lukas",
            &ActionRequest::Fight,
        )
        .await
        .unwrap();
        assert!(matches!(dispatch, ActionDispatch::Completed(_)));
        let performed = gateway.performed.lock().unwrap().clone();
        assert_eq!(
            performed,
            vec![ActionRequest::Fight, ActionRequest::Rest, ActionRequest::Fight]
        );
        assert_eq!(sleeper.waited().len(), 2);
    }

    #[tokio::test]
    async fn compensation_retry_failure_is_fatal_without_second_round() {
        let gateway = ScriptedGateway::new(vec![
            failure(1000, "too weak to fight"),
            success_with_cooldown(2.0), // rest
            failure(1000, "still too weak"),
        ]);
        let (scheduler, _) = recording_scheduler();
        let err = perform_with_recovery(
            &gateway,
            &scheduler,
            &RestBeforeFight,
            "Lukas",
            &ActionRequest::Fight,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("still too weak"));
        assert_eq!(gateway.performed.lock().unwrap().len(), 3);
    }
}
