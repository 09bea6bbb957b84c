use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
        }
    }
}

/// Description of a tool for the oracles' catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Core tool trait. Returning `Err` means a fatal condition that must unwind
/// the whole run; recoverable problems (bad arguments, failed lookups) are
/// reported as a failed [`ToolResult`] for the reasoning loop to react to.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (used in oracle function calling).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// JSON schema for parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with given arguments.
    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult>;

    /// Get the full spec for catalog registration.
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Render catalog entries the way the oracle prompts expect:
/// `{name}: {description} - input ({param}: {description}, ...)`.
pub fn catalog_lines(specs: &[ToolSpec]) -> String {
    specs
        .iter()
        .map(|spec| {
            let params = spec
                .parameters
                .get("properties")
                .and_then(|p| p.as_object())
                .map(|props| {
                    props
                        .iter()
                        .map(|(name, schema)| {
                            let description = schema
                                .get("description")
                                .and_then(|d| d.as_str())
                                .unwrap_or("");
                            format!("{name}: {description}")
                        })
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            format!("{}: {} - input ({params})", spec.name, spec.description)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_constructor_sets_success() {
        let result = ToolResult::ok("done");
        assert!(result.success);
        assert_eq!(result.output, "done");
        assert!(result.error.is_none());
    }

    #[test]
    fn failed_constructor_sets_error() {
        let result = ToolResult::failed("missing parameter");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("missing parameter"));
    }

    #[test]
    fn catalog_lines_renders_name_description_and_params() {
        let specs = vec![ToolSpec {
            name: "move".into(),
            description: "Moves the character on the map".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "x": { "type": "integer", "description": "The x coordinate" }
                },
                "required": ["x"]
            }),
        }];
        let lines = catalog_lines(&specs);
        assert_eq!(
            lines,
            "move: Moves the character on the map - input (x: The x coordinate)"
        );
    }

    #[test]
    fn catalog_lines_handles_empty_parameters() {
        let specs = vec![ToolSpec {
            name: "fight".into(),
            description: "Start a fight".into(),
            parameters: json!({ "type": "object", "properties": {} }),
        }];
        assert_eq!(catalog_lines(&specs), "fight: Start a fight - input ()");
    }
}
