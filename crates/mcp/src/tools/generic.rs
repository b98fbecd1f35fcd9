// Date and time tools

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_object, Tool};
use anyhow::Result;

/// Current local date as YYYY-MM-DD
pub struct CurrentDateTool;

#[async_trait::async_trait]
impl Tool for CurrentDateTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_current_date".to_string(),
            description: "Get the current date in YYYY-MM-DD format.".to_string(),
            input_schema: json_schema_object(serde_json::json!({}), vec![]),
        }
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<CallToolResult> {
        Ok(CallToolResult::text(
            chrono::Local::now().format("%Y-%m-%d").to_string(),
        ))
    }
}

/// Current local time as HH:MM:SS
pub struct CurrentTimeTool;

#[async_trait::async_trait]
impl Tool for CurrentTimeTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_current_time".to_string(),
            description: "Get the current time in HH:MM:SS format.".to_string(),
            input_schema: json_schema_object(serde_json::json!({}), vec![]),
        }
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<CallToolResult> {
        Ok(CallToolResult::text(
            chrono::Local::now().format("%H:%M:%S").to_string(),
        ))
    }
}
