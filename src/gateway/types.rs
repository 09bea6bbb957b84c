use super::entities::CharacterState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

// ─── Action requests ─────────────────────────────────────────────────────────

/// One named action the agent can perform against the game world.
///
/// Routes and body shapes mirror the remote `/my/{name}/action/...` API.
#[derive(Debug, Clone, PartialEq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRequest {
    Move { x: i64, y: i64 },
    Fight,
    Rest,
    Gather,
    Craft { code: String, quantity: u32 },
    Equip { code: String, slot: String, quantity: u32 },
    Unequip { slot: String, quantity: u32 },
    UseItem { code: String, quantity: u32 },
    AcceptTask,
    CompleteTask,
}

impl ActionRequest {
    /// Path segment under `/my/{name}/action/`.
    pub fn route(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Fight => "fight",
            Self::Rest => "rest",
            Self::Gather => "gathering",
            Self::Craft { .. } => "crafting",
            Self::Equip { .. } => "equip",
            Self::Unequip { .. } => "unequip",
            Self::UseItem { .. } => "use",
            Self::AcceptTask => "task/new",
            Self::CompleteTask => "task/complete",
        }
    }

    /// JSON request body, or `None` for body-less actions.
    pub fn body(&self) -> Option<serde_json::Value> {
        match self {
            Self::Move { x, y } => Some(serde_json::json!({ "x": x, "y": y })),
            Self::Craft { code, quantity } | Self::UseItem { code, quantity } => {
                Some(serde_json::json!({ "code": code, "quantity": quantity }))
            }
            Self::Equip {
                code,
                slot,
                quantity,
            } => Some(serde_json::json!({ "code": code, "slot": slot, "quantity": quantity })),
            Self::Unequip { slot, quantity } => {
                Some(serde_json::json!({ "slot": slot, "quantity": quantity }))
            }
            Self::Fight
            | Self::Rest
            | Self::Gather
            | Self::AcceptTask
            | Self::CompleteTask => None,
        }
    }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Server-imposed delay before the same character may act again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CooldownInfo {
    pub remaining_seconds: f64,
    #[serde(default)]
    pub total_seconds: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
    /// Absolute expiry, kept for logging only; `remaining_seconds` is the
    /// source of truth for the wait.
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
}

impl CooldownInfo {
    pub fn of_seconds(remaining_seconds: f64) -> Self {
        Self {
            remaining_seconds,
            total_seconds: None,
            reason: None,
            expiration: None,
        }
    }
}

/// Successful action response body (`data` envelope already unwrapped).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionPayload {
    #[serde(default)]
    pub cooldown: Option<CooldownInfo>,
    /// Updated character state the server returns alongside most actions.
    #[serde(default)]
    pub character: Option<CharacterState>,
    /// Action-specific details (fight report, gathered items, ...).
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl ActionPayload {
    /// Compact one-line summary for history entries and logs.
    pub fn summary(&self) -> String {
        if self.details.is_empty() {
            "ok".to_string()
        } else {
            serde_json::Value::Object(self.details.clone()).to_string()
        }
    }
}

/// Structured in-game failure (well-formed `error` envelope).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameError {
    pub code: i32,
    pub message: String,
}

/// Every gateway action call produces exactly one of these.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Success(ActionPayload),
    Failure(GameError),
}

// ─── Recovery classification ─────────────────────────────────────────────────

/// Character is already standing on the requested tile.
pub const CODE_ALREADY_AT_DESTINATION: i32 = 490;
/// No monster on the current tile to fight.
pub const CODE_NO_MONSTER_HERE: i32 = 598;

/// How the step executor should react to a [`GameError`].
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorClass {
    /// Benign condition; record a neutral result and continue.
    RecoverableNoOp,
    /// Perform the compensating action, then retry the original once.
    RecoverableWithCompensation(ActionRequest),
    /// Unwind the run immediately; the replanner is never consulted.
    Fatal,
}

/// Pluggable classification policy. The default maps only "already at
/// destination" to a no-op; everything else is fatal. Richer recovery
/// (e.g. auto-rest before retrying a fight) is an explicit extension point.
pub trait ErrorPolicy: Send + Sync {
    fn classify(&self, action: &ActionRequest, error: &GameError) -> ErrorClass;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrorPolicy;

impl ErrorPolicy for DefaultErrorPolicy {
    fn classify(&self, action: &ActionRequest, error: &GameError) -> ErrorClass {
        match (action, error.code) {
            (ActionRequest::Move { .. }, CODE_ALREADY_AT_DESTINATION) => {
                ErrorClass::RecoverableNoOp
            }
            _ => ErrorClass::Fatal,
        }
    }
}

/// Rephrase known codes into messages that tell the oracle what to do next.
pub fn describe_game_error(error: &GameError) -> String {
    match error.code {
        CODE_NO_MONSTER_HERE => {
            "there is no monster to fight here; move to a map tile that has one".to_string()
        }
        _ => error.message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_route_and_body() {
        let action = ActionRequest::Move { x: 0, y: 1 };
        assert_eq!(action.route(), "move");
        assert_eq!(action.body(), Some(serde_json::json!({"x": 0, "y": 1})));
    }

    #[test]
    fn fight_has_no_body() {
        assert_eq!(ActionRequest::Fight.route(), "fight");
        assert!(ActionRequest::Fight.body().is_none());
    }

    #[test]
    fn task_actions_use_nested_routes() {
        assert_eq!(ActionRequest::AcceptTask.route(), "task/new");
        assert_eq!(ActionRequest::CompleteTask.route(), "task/complete");
    }

    #[test]
    fn action_display_is_snake_case() {
        let action = ActionRequest::UseItem {
            code: "apple".into(),
            quantity: 1,
        };
        assert_eq!(action.to_string(), "use_item");
    }

    #[test]
    fn cooldown_decodes_with_missing_optionals() {
        let raw = serde_json::json!({ "remaining_seconds": 5.0 });
        let cooldown: CooldownInfo = serde_json::from_value(raw).unwrap();
        assert_eq!(cooldown.remaining_seconds, 5.0);
        assert!(cooldown.reason.is_none());
        assert!(cooldown.expiration.is_none());
    }

    #[test]
    fn payload_summary_includes_details() {
        let raw = serde_json::json!({
            "cooldown": { "remaining_seconds": 3.0 },
            "fight": { "result": "win", "xp": 24 }
        });
        let payload: ActionPayload = serde_json::from_value(raw).unwrap();
        assert!(payload.summary().contains("win"));
    }

    #[test]
    fn payload_summary_is_ok_when_empty() {
        let payload = ActionPayload::default();
        assert_eq!(payload.summary(), "ok");
    }

    #[test]
    fn default_policy_maps_noop_move() {
        let policy = DefaultErrorPolicy;
        let class = policy.classify(
            &ActionRequest::Move { x: 0, y: 1 },
            &GameError {
                code: CODE_ALREADY_AT_DESTINATION,
                message: "already there".into(),
            },
        );
        assert_eq!(class, ErrorClass::RecoverableNoOp);
    }

    #[test]
    fn default_policy_is_fatal_for_no_monster() {
        let policy = DefaultErrorPolicy;
        let class = policy.classify(
            &ActionRequest::Fight,
            &GameError {
                code: CODE_NO_MONSTER_HERE,
                message: "monster not found".into(),
            },
        );
        assert_eq!(class, ErrorClass::Fatal);
    }

    #[test]
    fn same_code_on_other_action_is_fatal() {
        // 490 carries no-op semantics for movement only.
        let policy = DefaultErrorPolicy;
        let class = policy.classify(
            &ActionRequest::Fight,
            &GameError {
                code: CODE_ALREADY_AT_DESTINATION,
                message: "weird".into(),
            },
        );
        assert_eq!(class, ErrorClass::Fatal);
    }

    #[test]
    fn no_monster_error_suggests_relocation() {
        let described = describe_game_error(&GameError {
            code: CODE_NO_MONSTER_HERE,
            message: "Monster not found on this map.".into(),
        });
        assert!(described.contains("move to a map tile"));
    }
}
