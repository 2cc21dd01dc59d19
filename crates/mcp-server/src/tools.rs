//! Tool catalogue, generated from the operation table that drives validation.

use crate::protocol::Tool;
use core_types::{OPERATION_SPECS, OperationSpec, ParamKind, ParamSpec};
use serde_json::{Map, Value, json};

/// Every tool the server exposes, in catalogue order.
pub fn tool_catalogue() -> Vec<Tool> {
    OPERATION_SPECS.iter().map(tool_for).collect()
}

pub fn tool_for(spec: &OperationSpec) -> Tool {
    Tool {
        name: spec.name(),
        description: spec.description,
        input_schema: input_schema(spec),
    }
}

/// JSON Schema for an operation's arguments.
pub fn input_schema(spec: &OperationSpec) -> Value {
    let properties: Map<String, Value> = spec
        .params
        .iter()
        .map(|param| (param.name.to_string(), property_schema(param)))
        .collect();
    let required: Vec<&str> = spec.required_params().map(|p| p.name).collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn property_schema(param: &ParamSpec) -> Value {
    let mut schema = match param.kind {
        ParamKind::Date => json!({ "type": "string", "format": "date" }),
        ParamKind::Enum(values) => json!({ "type": "string", "enum": values }),
        ParamKind::Text | ParamKind::Timezone => json!({ "type": "string" }),
        ParamKind::List => json!({ "type": ["string", "array"], "items": { "type": "string" } }),
        ParamKind::Integer { min, max } => json!({ "type": "integer", "minimum": min, "maximum": max }),
    };
    if let Value::Object(map) = &mut schema {
        map.insert("description".into(), Value::from(param.description));
        if let Some(default) = param.default {
            map.insert("default".into(), Value::from(default));
        }
    }
    schema
}
