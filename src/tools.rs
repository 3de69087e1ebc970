//! Function declarations advertised to the reasoning service.

use serde_json::{Map, Value, json};

/// Schema types understood by the function-calling API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolParamType {
    Integer,
    String,
    Boolean,
    Object,
}

impl ToolParamType {
    fn as_str(self) -> &'static str {
        match self {
            ToolParamType::Integer => "INTEGER",
            ToolParamType::String => "STRING",
            ToolParamType::Boolean => "BOOLEAN",
            ToolParamType::Object => "OBJECT",
        }
    }
}

/// One function parameter definition.
#[derive(Debug, Clone)]
pub struct ToolParam {
    pub name: String,
    pub description: Option<String>,
    pub kind: ToolParamType,
    pub required: bool,
}

impl ToolParam {
    pub fn new(
        name: impl Into<String>,
        kind: ToolParamType,
        required: bool,
        description: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            kind,
            required,
        }
    }

    /// Shorthand for a required string parameter.
    pub fn required_string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ToolParamType::String, true, Some(description.into()))
    }
}

/// Callable function declaration.
#[derive(Debug, Clone)]
pub struct ToolFunction {
    pub name: String,
    pub description: String,
    pub params: Vec<ToolParam>,
}

impl ToolFunction {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: ToolParam) -> Self {
        self.params.push(param);
        self
    }

    fn to_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.params {
            let mut param_def = Map::new();
            param_def.insert("type".to_string(), json!(param.kind.as_str()));
            if let Some(description) = &param.description {
                param_def.insert("description".to_string(), json!(description));
            }
            properties.insert(param.name.clone(), Value::Object(param_def));
            if param.required {
                required.push(json!(param.name));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!(ToolParamType::Object.as_str()));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        Value::Object(schema)
    }

    /// Serializes the function to its declaration JSON.
    pub fn to_declaration(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "parameters": self.to_schema(),
        })
    }
}

/// Group of function declarations sent in the request `tools` array.
#[derive(Debug, Clone, Default)]
pub struct Tool {
    pub functions: Vec<ToolFunction>,
}

impl Tool {
    pub fn from_functions(functions: Vec<ToolFunction>) -> Self {
        Self { functions }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "functionDeclarations": self
                .functions
                .iter()
                .map(ToolFunction::to_declaration)
                .collect::<Vec<_>>(),
        })
    }
}
