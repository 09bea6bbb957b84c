use crate::error::GatewayError;
use crate::gateway::{ActionGateway, ActionPayload, CharacterState, Item, MapTile, Monster, TaskInfo};
use serde::Serialize;

/// Observable world state the planner and step executor consult.
///
/// The snapshot is never mutated by the oracles; updates arrive only through
/// lookup tools repopulating a section, or successful action payloads being
/// merged back via [`merge_action_payload`](Self::merge_action_payload).
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorldSnapshot {
    pub map_tiles: Vec<MapTile>,
    pub monsters: Vec<Monster>,
    pub items: Vec<Item>,
    pub task: Option<TaskInfo>,
    pub character: Option<CharacterState>,
}

impl WorldSnapshot {
    /// Fold the character state from a successful action back in.
    pub fn merge_action_payload(&mut self, payload: &ActionPayload) {
        if let Some(character) = &payload.character {
            self.character = Some(character.clone());
        }
    }

    /// Render the loaded state as a text block for oracle prompts. Sections
    /// that were never loaded are marked as such so the oracle knows to plan
    /// a lookup step first.
    pub fn render_for_prompt(&self) -> String {
        let mut sections = Vec::with_capacity(5);
        sections.push(render_section("map tiles", &self.map_tiles));
        sections.push(render_section("monsters", &self.monsters));
        sections.push(render_section("items", &self.items));
        sections.push(match &self.task {
            Some(task) => format!(
                "This task is currently loaded:\n{}",
                serde_json::to_string(task).unwrap_or_default()
            ),
            None => "No task details are loaded.".to_string(),
        });
        sections.push(match &self.character {
            Some(character) => format!(
                "This is the character information:\n{}",
                serde_json::to_string(character).unwrap_or_default()
            ),
            None => "No character information is loaded.".to_string(),
        });
        sections.join("\n\n")
    }
}

fn render_section<T: Serialize>(label: &str, entries: &[T]) -> String {
    if entries.is_empty() {
        format!("No {label} are loaded.")
    } else {
        format!(
            "These are the loaded {label}:\n{}",
            serde_json::to_string(entries).unwrap_or_default()
        )
    }
}

/// Fetch the initial snapshot: character state always, map tiles and
/// monsters best effort (a missing lookup just leaves the section empty for
/// the planner to schedule itself).
pub async fn bootstrap(
    gateway: &dyn ActionGateway,
    character: &str,
) -> Result<WorldSnapshot, GatewayError> {
    let mut snapshot = WorldSnapshot {
        character: Some(gateway.fetch_character(character).await?),
        ..WorldSnapshot::default()
    };
    match gateway.fetch_maps(None).await {
        Ok(tiles) => snapshot.map_tiles = tiles,
        Err(e) => tracing::warn!(error = %e, "map bootstrap failed, planner must look them up"),
    }
    match gateway.fetch_monsters().await {
        Ok(monsters) => snapshot.monsters = monsters,
        Err(e) => tracing::warn!(error = %e, "monster bootstrap failed"),
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::CooldownInfo;

    fn character(name: &str, hp: i64) -> CharacterState {
        CharacterState {
            name: name.into(),
            level: 3,
            hp,
            max_hp: 120,
            x: 0,
            y: 1,
            task: None,
            task_type: None,
            task_progress: 0,
            task_total: 0,
        }
    }

    #[test]
    fn merge_replaces_character_state() {
        let mut snapshot = WorldSnapshot {
            character: Some(character("Lukas", 120)),
            ..WorldSnapshot::default()
        };
        let payload = ActionPayload {
            cooldown: Some(CooldownInfo::of_seconds(3.0)),
            character: Some(character("Lukas", 90)),
            details: serde_json::Map::new(),
        };
        snapshot.merge_action_payload(&payload);
        assert_eq!(snapshot.character.unwrap().hp, 90);
    }

    #[test]
    fn merge_without_character_keeps_existing() {
        let mut snapshot = WorldSnapshot {
            character: Some(character("Lukas", 120)),
            ..WorldSnapshot::default()
        };
        snapshot.merge_action_payload(&ActionPayload::default());
        assert_eq!(snapshot.character.unwrap().hp, 120);
    }

    #[test]
    fn render_marks_unloaded_sections() {
        let rendered = WorldSnapshot::default().render_for_prompt();
        assert!(rendered.contains("No map tiles are loaded."));
        assert!(rendered.contains("No character information is loaded."));
    }

    #[test]
    fn render_includes_loaded_character() {
        let snapshot = WorldSnapshot {
            character: Some(character("Lukas", 115)),
            ..WorldSnapshot::default()
        };
        let rendered = snapshot.render_for_prompt();
        assert!(rendered.contains("character information"));
        assert!(rendered.contains("Lukas"));
    }
}
