pub mod actions;
pub mod lookup;
pub mod registry;
pub mod traits;

pub use actions::ActionContext;
pub use registry::ToolRegistry;
pub use traits::{catalog_lines, Tool, ToolResult, ToolSpec};

use actions::{
    AcceptTaskTool, CompleteTaskTool, CraftTool, EquipTool, FightTool, GatherTool, MoveTool,
    RestTool, UnequipTool, UseItemTool, WaitTool,
};
use lookup::{GetCharacterTool, GetItemsTool, GetMapsTool, GetMonstersTool, GetTaskTool};
use std::sync::Arc;

/// Build a registry with the full game tool catalog over one context.
pub fn build_registry(ctx: Arc<ActionContext>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(MoveTool(ctx.clone())));
    registry.register(Box::new(FightTool(ctx.clone())));
    registry.register(Box::new(RestTool(ctx.clone())));
    registry.register(Box::new(GatherTool(ctx.clone())));
    registry.register(Box::new(CraftTool(ctx.clone())));
    registry.register(Box::new(UseItemTool(ctx.clone())));
    registry.register(Box::new(EquipTool(ctx.clone())));
    registry.register(Box::new(UnequipTool(ctx.clone())));
    registry.register(Box::new(AcceptTaskTool(ctx.clone())));
    registry.register(Box::new(CompleteTaskTool(ctx.clone())));
    registry.register(Box::new(WaitTool(ctx.clone())));
    registry.register(Box::new(GetMapsTool(ctx.clone())));
    registry.register(Box::new(GetMonstersTool(ctx.clone())));
    registry.register(Box::new(GetItemsTool(ctx.clone())));
    registry.register(Box::new(GetCharacterTool(ctx.clone())));
    registry.register(Box::new(GetTaskTool(ctx)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooldown::{CooldownScheduler, RecordingSleeper};
    use crate::gateway::{DefaultErrorPolicy, HttpGateway};
    use crate::world::WorldSnapshot;
    use tokio::sync::RwLock;

    #[test]
    fn catalog_holds_all_sixteen_tools() {
        let ctx = Arc::new(ActionContext {
            gateway: Arc::new(HttpGateway::new("https://example.invalid", None)),
            scheduler: CooldownScheduler::new(Arc::new(RecordingSleeper::default())),
            policy: Arc::new(DefaultErrorPolicy),
            character: "Lukas".into(),
            world: Arc::new(RwLock::new(WorldSnapshot::default())),
        });
        let registry = build_registry(ctx);
        let names = registry.tool_names();
        assert_eq!(names.len(), 16);
        assert!(names.contains(&"move"));
        assert!(names.contains(&"get_task"));
        assert!(names.contains(&"wait"));
    }
}
