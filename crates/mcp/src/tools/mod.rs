pub mod generic;
pub mod mlb;
pub mod stats_api;
pub mod teams;
mod registry;

pub use generic::{CurrentDateTool, CurrentTimeTool};
pub use mlb::{MlbEndpoint, MlbTool};
pub use registry::{
    json_schema_integer, json_schema_object, json_schema_string, Tool, ToolRegistry,
};
pub use stats_api::StatsApi;

use std::sync::Arc;

/// Registry with the MLB tools and the date/time tools
pub fn mlb_registry(api: &StatsApi) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    for tool in MlbTool::all(api) {
        registry.register(Arc::new(tool));
    }
    registry.register(Arc::new(CurrentDateTool));
    registry.register(Arc::new(CurrentTimeTool));

    registry
}
