use super::traits::{Tool, ToolResult};
use crate::cooldown::CooldownScheduler;
use crate::gateway::{
    perform_with_recovery, ActionDispatch, ActionGateway, ActionRequest, ErrorPolicy,
};
use crate::world::WorldSnapshot;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared wiring for every tool that touches the game world.
pub struct ActionContext {
    pub gateway: Arc<dyn ActionGateway>,
    pub scheduler: CooldownScheduler,
    pub policy: Arc<dyn ErrorPolicy>,
    pub character: String,
    pub world: Arc<RwLock<WorldSnapshot>>,
}

impl ActionContext {
    /// Dispatch one action with recovery, merge the resulting character
    /// state back into the snapshot, and summarize for the history.
    async fn dispatch(&self, request: ActionRequest) -> anyhow::Result<ToolResult> {
        let dispatch = perform_with_recovery(
            self.gateway.as_ref(),
            &self.scheduler,
            self.policy.as_ref(),
            &self.character,
            &request,
        )
        .await
        .map_err(anyhow::Error::new)?;

        match dispatch {
            ActionDispatch::Completed(payload) => {
                self.world.write().await.merge_action_payload(&payload);
                Ok(ToolResult::ok(format!(
                    "{request} completed: {}",
                    payload.summary()
                )))
            }
            ActionDispatch::NoOp(summary) => Ok(ToolResult::ok(summary)),
        }
    }
}

fn quantity(args: &Value) -> u32 {
    args.get("quantity")
        .and_then(Value::as_u64)
        .and_then(|q| u32::try_from(q).ok())
        .unwrap_or(1)
}

const QUANTITY_PROPERTY: &str = "Item quantity";

// ─── Movement and combat ─────────────────────────────────────────────────────

pub struct MoveTool(pub Arc<ActionContext>);

#[async_trait]
impl Tool for MoveTool {
    fn name(&self) -> &str {
        "move"
    }

    fn description(&self) -> &str {
        "Moves the character on the map using the map's X and Y position"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "x": { "type": "integer", "description": "The x coordinate of the destination" },
                "y": { "type": "integer", "description": "The y coordinate of the destination" }
            },
            "required": ["x", "y"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let (Some(x), Some(y)) = (
            args.get("x").and_then(Value::as_i64),
            args.get("y").and_then(Value::as_i64),
        ) else {
            return Ok(ToolResult::failed("missing 'x' or 'y' parameter"));
        };
        self.0.dispatch(ActionRequest::Move { x, y }).await
    }
}

pub struct FightTool(pub Arc<ActionContext>);

#[async_trait]
impl Tool for FightTool {
    fn name(&self) -> &str {
        "fight"
    }

    fn description(&self) -> &str {
        "Start a fight against a monster on the character's map"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> anyhow::Result<ToolResult> {
        self.0.dispatch(ActionRequest::Fight).await
    }
}

pub struct RestTool(pub Arc<ActionContext>);

#[async_trait]
impl Tool for RestTool {
    fn name(&self) -> &str {
        "rest"
    }

    fn description(&self) -> &str {
        "Recovers hit points by resting (1 second per 5 HP, minimum 3 seconds)"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> anyhow::Result<ToolResult> {
        self.0.dispatch(ActionRequest::Rest).await
    }
}

pub struct GatherTool(pub Arc<ActionContext>);

#[async_trait]
impl Tool for GatherTool {
    fn name(&self) -> &str {
        "gather"
    }

    fn description(&self) -> &str {
        "Harvest a resource on the character's map"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> anyhow::Result<ToolResult> {
        self.0.dispatch(ActionRequest::Gather).await
    }
}

// ─── Items and crafting ──────────────────────────────────────────────────────

pub struct CraftTool(pub Arc<ActionContext>);

#[async_trait]
impl Tool for CraftTool {
    fn name(&self) -> &str {
        "crafting"
    }

    fn description(&self) -> &str {
        "Craft an item; the character must be on a map with the correct workshop and have the required ingredients"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "code": { "type": "string", "description": "Code of the item to craft" },
                "quantity": { "type": "integer", "description": QUANTITY_PROPERTY }
            },
            "required": ["code"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let Some(code) = args.get("code").and_then(Value::as_str) else {
            return Ok(ToolResult::failed("missing 'code' parameter"));
        };
        self.0
            .dispatch(ActionRequest::Craft {
                code: code.to_string(),
                quantity: quantity(&args),
            })
            .await
    }
}

pub struct UseItemTool(pub Arc<ActionContext>);

#[async_trait]
impl Tool for UseItemTool {
    fn name(&self) -> &str {
        "use_item"
    }

    fn description(&self) -> &str {
        "Use a consumable item"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "code": { "type": "string", "description": "Code of the item to use" },
                "quantity": { "type": "integer", "description": QUANTITY_PROPERTY }
            },
            "required": ["code"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let Some(code) = args.get("code").and_then(Value::as_str) else {
            return Ok(ToolResult::failed("missing 'code' parameter"));
        };
        self.0
            .dispatch(ActionRequest::UseItem {
                code: code.to_string(),
                quantity: quantity(&args),
            })
            .await
    }
}

pub struct EquipTool(pub Arc<ActionContext>);

#[async_trait]
impl Tool for EquipTool {
    fn name(&self) -> &str {
        "equip_item"
    }

    fn description(&self) -> &str {
        "Equip an item on the character"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "code": { "type": "string", "description": "Code of the item to equip" },
                "slot": { "type": "string", "description": "Equipment slot (weapon, shield, helmet, ...)" },
                "quantity": { "type": "integer", "description": QUANTITY_PROPERTY }
            },
            "required": ["code", "slot"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let (Some(code), Some(slot)) = (
            args.get("code").and_then(Value::as_str),
            args.get("slot").and_then(Value::as_str),
        ) else {
            return Ok(ToolResult::failed("missing 'code' or 'slot' parameter"));
        };
        self.0
            .dispatch(ActionRequest::Equip {
                code: code.to_string(),
                slot: slot.to_string(),
                quantity: quantity(&args),
            })
            .await
    }
}

pub struct UnequipTool(pub Arc<ActionContext>);

#[async_trait]
impl Tool for UnequipTool {
    fn name(&self) -> &str {
        "unequip_item"
    }

    fn description(&self) -> &str {
        "Unequip an item from the character"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "slot": { "type": "string", "description": "Slot of the item to unequip" },
                "quantity": { "type": "integer", "description": QUANTITY_PROPERTY }
            },
            "required": ["slot"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let Some(slot) = args.get("slot").and_then(Value::as_str) else {
            return Ok(ToolResult::failed("missing 'slot' parameter"));
        };
        self.0
            .dispatch(ActionRequest::Unequip {
                slot: slot.to_string(),
                quantity: quantity(&args),
            })
            .await
    }
}

// ─── Tasks ───────────────────────────────────────────────────────────────────

pub struct AcceptTaskTool(pub Arc<ActionContext>);

#[async_trait]
impl Tool for AcceptTaskTool {
    fn name(&self) -> &str {
        "accept_task"
    }

    fn description(&self) -> &str {
        "Accept a task, possible if the character is on the map with the task master"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> anyhow::Result<ToolResult> {
        self.0.dispatch(ActionRequest::AcceptTask).await
    }
}

pub struct CompleteTaskTool(pub Arc<ActionContext>);

#[async_trait]
impl Tool for CompleteTaskTool {
    fn name(&self) -> &str {
        "complete_task"
    }

    fn description(&self) -> &str {
        "Complete the current task at the task master once progress equals total"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> anyhow::Result<ToolResult> {
        self.0.dispatch(ActionRequest::CompleteTask).await
    }
}

// ─── Waiting ─────────────────────────────────────────────────────────────────

pub struct WaitTool(pub Arc<ActionContext>);

#[async_trait]
impl Tool for WaitTool {
    fn name(&self) -> &str {
        "wait"
    }

    fn description(&self) -> &str {
        "Wait for a specified time, can be used to handle cooldown periods"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "duration": { "type": "number", "description": "Waiting duration in seconds" }
            },
            "required": ["duration"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let Some(duration) = args.get("duration").and_then(Value::as_f64) else {
            return Ok(ToolResult::failed("missing 'duration' parameter"));
        };
        if !duration.is_finite() || duration < 0.0 {
            return Ok(ToolResult::failed(format!(
                "'duration' must be a non-negative number of seconds, got {duration}"
            )));
        }
        self.0.scheduler.wait_seconds(duration).await;
        Ok(ToolResult::ok("waiting finished"))
    }
}
