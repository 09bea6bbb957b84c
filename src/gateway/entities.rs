use serde::{Deserialize, Serialize};

// World entity schemas returned by the read-only endpoints. Only the fields
// the agent reasons about are modeled; unknown fields are ignored on decode.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterState {
    pub name: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub hp: i64,
    #[serde(default)]
    pub max_hp: i64,
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub task_progress: u32,
    #[serde(default)]
    pub task_total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapTile {
    #[serde(default)]
    pub name: String,
    pub x: i64,
    pub y: i64,
    #[serde(default)]
    pub content: Option<MapContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub hp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub code: String,
    #[serde(rename = "type", default)]
    pub item_type: String,
    #[serde(default)]
    pub level: u32,
    /// Crafting recipe (skill, ingredients), opaque to the loop itself.
    #[serde(default)]
    pub craft: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub code: String,
    #[serde(rename = "type", default)]
    pub task_type: String,
    #[serde(default)]
    pub total: u32,
}

/// Query filters accepted by `GET /items`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ItemFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub craft_skill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
