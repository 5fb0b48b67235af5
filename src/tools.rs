//! Function-call descriptors shared across providers.
//!
//! A [`Tool`] is built once, immutable, and reusable across requests. Arguments can be
//! listed by hand or derived from a typed struct through [`arguments_of`].

use std::collections::BTreeMap;

use schemars::JsonSchema;
use schemars::schema::{InstanceType, Schema, SchemaObject, SingleOrVec};
use schemars::schema_for;
use serde::{Deserialize, Serialize};

/// Closed set of JSON Schema types accepted in tool parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    Object,
    String,
    Number,
    Integer,
    Array,
    Boolean,
    Null,
}

/// One named argument in a tool's parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolArgument {
    pub name: String,
    pub arg_type: JsonType,
    pub description: String,
    /// Closed set of accepted values; empty means unconstrained.
    pub enum_values: Vec<String>,
}

impl ToolArgument {
    /// Builds an argument without a value enumeration.
    pub fn new(name: impl Into<String>, arg_type: JsonType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arg_type,
            description: description.into(),
            enum_values: Vec::new(),
        }
    }

    /// Constrains the argument to a closed value set.
    pub fn with_enum(mut self, values: Vec<String>) -> Self {
        self.enum_values = values;
        self
    }
}

/// Canonical function-call descriptor.
///
/// Serializes to the `{"type":"function","function":{...}}` shape shared by
/// OpenAI-compatible endpoints.
///
/// # Examples
///
/// ```
/// use hanashi::tools::{JsonType, Tool, ToolArgument};
///
/// let tool = Tool::new(
///     "get_weather",
///     "Look up current weather for a location.",
///     vec![ToolArgument::new("location", JsonType::String, "City and state")],
///     vec!["location".to_string()],
/// );
/// assert_eq!(tool.function.name, "get_weather");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Always `function`.
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSpec,
}

/// The function half of a [`Tool`] descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<FunctionParameters>,
}

/// JSON-Schema-like parameter object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionParameters {
    /// Always `object`.
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: BTreeMap<String, FunctionArgument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

/// One property entry inside [`FunctionParameters`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionArgument {
    #[serde(rename = "type")]
    pub arg_type: JsonType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

impl Tool {
    /// Assembles a descriptor from a name, description, argument list, and the names
    /// of required arguments.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        args: Vec<ToolArgument>,
        required: Vec<String>,
    ) -> Self {
        let properties = args
            .into_iter()
            .map(|arg| {
                (
                    arg.name,
                    FunctionArgument {
                        arg_type: arg.arg_type,
                        description: arg.description,
                        enum_values: arg.enum_values,
                    },
                )
            })
            .collect();

        Self {
            kind: "function".to_string(),
            function: FunctionSpec {
                name: name.into(),
                description: description.into(),
                parameters: Some(FunctionParameters {
                    kind: "object".to_string(),
                    properties,
                    required,
                }),
            },
        }
    }
}

/// Derives a tool-argument list from a typed struct.
///
/// Field names become argument names (honoring serde renames), doc comments become
/// descriptions, and field types map onto the fixed [`JsonType`] set: booleans →
/// `boolean`, any integer kind → `integer`, floats → `number`, sequences → `array`,
/// strings → `string`, nested structs → `object`, anything else → `null`.
///
/// This is a convenience over [`Tool::new`]; hand-written argument lists remain the
/// primary path.
///
/// # Examples
///
/// ```
/// use hanashi::tools::{JsonType, Tool, arguments_of};
/// use schemars::JsonSchema;
///
/// #[derive(JsonSchema)]
/// struct WeatherArgs {
///     /// City and state, e.g. "Boston, MA".
///     location: String,
/// }
///
/// let args = arguments_of::<WeatherArgs>();
/// assert_eq!(args[0].arg_type, JsonType::String);
/// let tool = Tool::new("get_weather", "Look up weather.", args, vec!["location".into()]);
/// assert!(tool.function.parameters.is_some());
/// ```
pub fn arguments_of<T: JsonSchema>() -> Vec<ToolArgument> {
    let root = schema_for!(T);
    let Some(object) = root.schema.object else {
        return Vec::new();
    };

    object
        .properties
        .into_iter()
        .filter_map(|(name, schema)| {
            let Schema::Object(prop) = schema else {
                return None;
            };
            let description = prop
                .metadata
                .as_ref()
                .and_then(|meta| meta.description.clone())
                .unwrap_or_default();
            let enum_values = prop
                .enum_values
                .as_ref()
                .map(|values| {
                    values
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            Some(ToolArgument {
                arg_type: json_type_of(&prop),
                name,
                description,
                enum_values,
            })
        })
        .collect()
}

fn json_type_of(schema: &SchemaObject) -> JsonType {
    match &schema.instance_type {
        Some(SingleOrVec::Single(ty)) => map_instance_type(**ty),
        // Option<T> schemas carry [T, null]; the payload type wins.
        Some(SingleOrVec::Vec(types)) => types
            .iter()
            .copied()
            .find(|ty| *ty != InstanceType::Null)
            .map(map_instance_type)
            .unwrap_or(JsonType::Null),
        None if schema.reference.is_some() || schema.object.is_some() => JsonType::Object,
        None => JsonType::Null,
    }
}

fn map_instance_type(ty: InstanceType) -> JsonType {
    match ty {
        InstanceType::Boolean => JsonType::Boolean,
        InstanceType::Integer => JsonType::Integer,
        InstanceType::Number => JsonType::Number,
        InstanceType::Array => JsonType::Array,
        InstanceType::String => JsonType::String,
        InstanceType::Object => JsonType::Object,
        InstanceType::Null => JsonType::Null,
    }
}
