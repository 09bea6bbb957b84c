use super::actions::ActionContext;
use super::traits::{Tool, ToolResult};
use crate::gateway::ItemFilter;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

// Read-only lookups. Transport failures come back as failed tool results
// rather than errors so the step executor can retry or route around them.

fn render<T: Serialize>(label: &str, data: &T) -> ToolResult {
    match serde_json::to_string(data) {
        Ok(body) => ToolResult::ok(format!("{label}: {body}")),
        Err(err) => ToolResult::failed(format!("could not encode {label}: {err}")),
    }
}

pub struct GetMapsTool(pub Arc<ActionContext>);

#[async_trait]
impl Tool for GetMapsTool {
    fn name(&self) -> &str {
        "get_maps"
    }

    fn description(&self) -> &str {
        "Load map tiles, optionally filtered by content type (monster, resource, workshop, bank, tasks_master)"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content_type": {
                    "type": "string",
                    "description": "Only return tiles whose content has this type"
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let content_type = args.get("content_type").and_then(Value::as_str);
        match self.0.gateway.fetch_maps(content_type).await {
            Ok(tiles) => {
                let result = render("maps", &tiles);
                self.0.world.write().await.map_tiles = tiles;
                Ok(result)
            }
            Err(err) => Ok(ToolResult::failed(format!("maps lookup failed: {err}"))),
        }
    }
}

pub struct GetMonstersTool(pub Arc<ActionContext>);

#[async_trait]
impl Tool for GetMonstersTool {
    fn name(&self) -> &str {
        "get_monsters"
    }

    fn description(&self) -> &str {
        "Load the list of monsters with their codes and levels"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> anyhow::Result<ToolResult> {
        match self.0.gateway.fetch_monsters().await {
            Ok(monsters) => {
                let result = render("monsters", &monsters);
                self.0.world.write().await.monsters = monsters;
                Ok(result)
            }
            Err(err) => Ok(ToolResult::failed(format!("monsters lookup failed: {err}"))),
        }
    }
}

pub struct GetItemsTool(pub Arc<ActionContext>);

#[async_trait]
impl Tool for GetItemsTool {
    fn name(&self) -> &str {
        "get_items"
    }

    fn description(&self) -> &str {
        "Load items, filterable by type, craft skill, maximum level or name"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "type": { "type": "string", "description": "Item type (weapon, resource, consumable, ...)" },
                "craft_skill": { "type": "string", "description": "Skill required to craft the item" },
                "max_level": { "type": "integer", "description": "Maximum item level" },
                "name": { "type": "string", "description": "Item name to search for" }
            }
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let filter = ItemFilter {
            item_type: args
                .get("type")
                .and_then(Value::as_str)
                .map(str::to_string),
            craft_skill: args
                .get("craft_skill")
                .and_then(Value::as_str)
                .map(str::to_string),
            max_level: args
                .get("max_level")
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok()),
            name: args
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string),
        };
        match self.0.gateway.fetch_items(&filter).await {
            Ok(items) => {
                let result = render("items", &items);
                self.0.world.write().await.items = items;
                Ok(result)
            }
            Err(err) => Ok(ToolResult::failed(format!("items lookup failed: {err}"))),
        }
    }
}

pub struct GetCharacterTool(pub Arc<ActionContext>);

#[async_trait]
impl Tool for GetCharacterTool {
    fn name(&self) -> &str {
        "get_character"
    }

    fn description(&self) -> &str {
        "Load current character information: position, hit points, task progress"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Character name, defaults to the configured character" }
            }
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let name = args
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(&self.0.character);
        match self.0.gateway.fetch_character(name).await {
            Ok(character) => {
                let result = render("character", &character);
                self.0.world.write().await.character = Some(character);
                Ok(result)
            }
            Err(err) => Ok(ToolResult::failed(format!(
                "character lookup failed: {err}"
            ))),
        }
    }
}

pub struct GetTaskTool(pub Arc<ActionContext>);

#[async_trait]
impl Tool for GetTaskTool {
    fn name(&self) -> &str {
        "get_task"
    }

    fn description(&self) -> &str {
        "Load details of a task by its code"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "code": { "type": "string", "description": "Task code" }
            },
            "required": ["code"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let Some(code) = args.get("code").and_then(Value::as_str) else {
            return Ok(ToolResult::failed("missing 'code' parameter"));
        };
        match self.0.gateway.fetch_task(code).await {
            Ok(task) => {
                let result = render("task", &task);
                self.0.world.write().await.task = Some(task);
                Ok(result)
            }
            Err(err) => Ok(ToolResult::failed(format!("task lookup failed: {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooldown::{CooldownScheduler, RecordingSleeper};
    use crate::error::GatewayError;
    use crate::gateway::{
        ActionGateway, ActionOutcome, ActionRequest, CharacterState, DefaultErrorPolicy, Item,
        MapContent, MapTile, Monster, TaskInfo,
    };
    use crate::world::WorldSnapshot;
    use std::sync::Mutex;
    use tokio::sync::RwLock;

    struct LookupGateway {
        maps_filter: Mutex<Option<String>>,
        fail: bool,
    }

    #[async_trait]
    impl ActionGateway for LookupGateway {
        async fn perform(
            &self,
            _character: &str,
            _request: &ActionRequest,
        ) -> Result<ActionOutcome, GatewayError> {
            unimplemented!("lookups never perform actions")
        }

        async fn fetch_maps(
            &self,
            content_type: Option<&str>,
        ) -> Result<Vec<MapTile>, GatewayError> {
            if self.fail {
                return Err(GatewayError::Request {
                    endpoint: "maps".into(),
                    message: "connection refused".into(),
                });
            }
            *self.maps_filter.lock().unwrap() = content_type.map(str::to_string);
            Ok(vec![MapTile {
                name: "Forest".into(),
                x: 0,
                y: 1,
                content: Some(MapContent {
                    content_type: "monster".into(),
                    code: "chicken".into(),
                }),
            }])
        }

        async fn fetch_monsters(&self) -> Result<Vec<Monster>, GatewayError> {
            Ok(Vec::new())
        }

        async fn fetch_items(&self, _filter: &ItemFilter) -> Result<Vec<Item>, GatewayError> {
            Ok(Vec::new())
        }

        async fn fetch_character(&self, name: &str) -> Result<CharacterState, GatewayError> {
            Ok(CharacterState {
                name: name.to_string(),
                level: 4,
                hp: 100,
                max_hp: 120,
                x: 0,
                y: 0,
                task: None,
                task_type: None,
                task_progress: 0,
                task_total: 0,
            })
        }

        async fn fetch_task(&self, code: &str) -> Result<TaskInfo, GatewayError> {
            Ok(TaskInfo {
                code: code.to_string(),
                task_type: "monsters".into(),
                total: 50,
            })
        }
    }

    fn context(fail: bool) -> Arc<ActionContext> {
        Arc::new(ActionContext {
            gateway: Arc::new(LookupGateway {
                maps_filter: Mutex::new(None),
                fail,
            }),
            scheduler: CooldownScheduler::new(Arc::new(RecordingSleeper::default())),
            policy: Arc::new(DefaultErrorPolicy),
            character: "Lukas".into(),
            world: Arc::new(RwLock::new(WorldSnapshot::default())),
        })
    }

    #[tokio::test]
    async fn get_maps_populates_snapshot_and_passes_filter() {
        let ctx = context(false);
        let result = GetMapsTool(ctx.clone())
            .execute(json!({"content_type": "monster"}))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.contains("chicken"));
        assert_eq!(ctx.world.read().await.map_tiles.len(), 1);
    }

    #[tokio::test]
    async fn transport_failure_is_a_recoverable_result() {
        let ctx = context(true);
        let result = GetMapsTool(ctx).execute(json!({})).await.unwrap();
        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("maps lookup failed"));
    }

    #[tokio::test]
    async fn get_character_defaults_to_configured_name() {
        let ctx = context(false);
        let result = GetCharacterTool(ctx.clone())
            .execute(json!({}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(
            ctx.world.read().await.character.as_ref().unwrap().name,
            "Lukas"
        );
    }

    #[tokio::test]
    async fn get_task_requires_a_code() {
        let ctx = context(false);
        let result = GetTaskTool(ctx).execute(json!({})).await.unwrap();
        assert!(!result.success);
    }
}
