//! Structured output contracts
//!
//! A contract names the fields a completion must produce and their types.
//! The same contract drives three things: the instructions appended to JSON
//! mode prompts, the JSON schema sent to providers with native structured
//! output, and the local validation every reply goes through.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use thiserror::Error;

/// Primitive shape of a contract field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named field of a contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: FieldKind,

    /// Element kind for array fields (strings when omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<FieldKind>,

    /// Required fields must be present and non-null. Everything else is
    /// nullable and may be left out.
    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldSpec {
    /// A nullable field
    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            items: None,
            required: false,
            description: None,
        }
    }

    /// A field that must be present and non-null
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            required: true,
            ..Self::optional(name, kind)
        }
    }

    /// A nullable array field
    pub fn array(name: impl Into<String>, items: FieldKind) -> Self {
        Self {
            items: Some(items),
            ..Self::optional(name, FieldKind::Array)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn item_kind(&self) -> FieldKind {
        self.items.unwrap_or(FieldKind::String)
    }

    /// Objects and nested arrays are accepted as-is, without a shape
    fn is_free_form(&self) -> bool {
        match self.kind {
            FieldKind::Object => true,
            FieldKind::Array => matches!(self.item_kind(), FieldKind::Object | FieldKind::Array),
            _ => false,
        }
    }

    fn schema(&self) -> Value {
        let type_value = if self.required {
            json!(self.kind.as_str())
        } else {
            json!([self.kind.as_str(), "null"])
        };

        let mut schema = Map::new();
        schema.insert("type".to_string(), type_value);
        if self.kind == FieldKind::Array {
            schema.insert("items".to_string(), json!({ "type": self.item_kind().as_str() }));
        }
        if let Some(ref description) = self.description {
            schema.insert("description".to_string(), json!(description));
        }
        Value::Object(schema)
    }

    fn type_label(&self) -> String {
        match self.kind {
            FieldKind::Array => format!("array of {}", self.item_kind()),
            kind => kind.to_string(),
        }
    }
}

/// Caller-supplied description of the shape a completion must have
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputContract {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl OutputContract {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Name usable as a provider schema identifier (`[A-Za-z0-9_-]{1,64}`)
    pub fn schema_name(&self) -> String {
        let name: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .take(64)
            .collect();

        if name.is_empty() {
            "output".to_string()
        } else {
            name
        }
    }

    /// Strict schemas cannot describe free-form objects or arrays, whether
    /// top-level or as array items
    pub fn supports_strict_schema(&self) -> bool {
        !self.fields.iter().any(FieldSpec::is_free_form)
    }

    /// JSON schema for provider-native structured output.
    ///
    /// Every property is listed in `required`; optional fields are expressed
    /// as nullable types instead, which is what strict mode expects.
    pub fn json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.schema()))
            .collect();
        let required: Vec<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        });
        if let Some(ref description) = self.description {
            schema["description"] = json!(description);
        }
        schema
    }

    /// Plain-text field instructions for prompts in JSON object mode
    pub fn render_instructions(&self) -> String {
        let mut out = String::from("Respond with a single JSON object");
        if let Some(ref description) = self.description {
            out.push_str(&format!(" describing {}", description));
        }
        out.push_str(" with these fields:\n");

        for field in &self.fields {
            let requirement = if field.required { "required" } else { "or null" };
            out.push_str(&format!(
                "- \"{}\" ({}, {})",
                field.name,
                field.type_label(),
                requirement
            ));
            if let Some(ref description) = field.description {
                out.push_str(&format!(": {}", description));
            }
            out.push('\n');
        }

        out.push_str("Use null for any optional field you cannot determine. Output JSON only.");
        out
    }

    /// Parse raw JSON text and validate it against the contract
    pub fn parse_json(&self, text: &str) -> Result<StructuredOutput, ContractViolation> {
        let value: Value = serde_json::from_str(strip_code_fence(text))?;
        self.validate(value)
    }

    /// Validate an already-parsed value, coercing compatible scalars.
    ///
    /// Unknown keys are dropped; missing optional fields become null.
    pub fn validate(&self, value: Value) -> Result<StructuredOutput, ContractViolation> {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(ContractViolation::NotAnObject {
                    found: json_type_name(&other),
                })
            }
        };

        let mut fields = Map::new();
        for spec in &self.fields {
            let value = match object.remove(&spec.name) {
                None if spec.required => {
                    return Err(ContractViolation::MissingField(spec.name.clone()))
                }
                Some(Value::Null) if spec.required => {
                    return Err(ContractViolation::NullField(spec.name.clone()))
                }
                None | Some(Value::Null) => Value::Null,
                Some(value) => coerce(spec, value)?,
            };
            fields.insert(spec.name.clone(), value);
        }

        Ok(StructuredOutput { fields })
    }
}

/// A completion that passed contract validation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StructuredOutput {
    fields: Map<String, Value>,
}

impl StructuredOutput {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// True when every field came back null (or the contract has no fields)
    pub fn is_vacuous(&self) -> bool {
        self.fields.values().all(Value::is_null)
    }

    /// Decode into a caller-defined type
    pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(Value::Object(self.fields.clone()))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Why a provider reply does not satisfy a contract
#[derive(Debug, Error)]
pub enum ContractViolation {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("required field `{0}` is null")]
    NullField(String),

    #[error("field `{field}` expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: FieldKind,
        found: &'static str,
    },
}

fn coerce(spec: &FieldSpec, value: Value) -> Result<Value, ContractViolation> {
    match spec.kind {
        FieldKind::Array => match value {
            Value::Array(items) => {
                let kind = spec.item_kind();
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| coerce_scalar(&format!("{}[{}]", spec.name, i), kind, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            other => Err(mismatch(&spec.name, FieldKind::Array, &other)),
        },
        kind => coerce_scalar(&spec.name, kind, value),
    }
}

fn coerce_scalar(field: &str, kind: FieldKind, value: Value) -> Result<Value, ContractViolation> {
    let coerced = match (kind, &value) {
        (FieldKind::String, Value::String(_)) => Some(value.clone()),
        (FieldKind::Integer, Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15).map(|f| f as i64))
            .map(Value::from),
        (FieldKind::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
        (FieldKind::Number, Value::Number(_)) => Some(value.clone()),
        (FieldKind::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        (FieldKind::Boolean, Value::Bool(_)) => Some(value.clone()),
        (FieldKind::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        (FieldKind::Boolean, Value::Number(n)) => match n.as_i64() {
            Some(0) => Some(Value::Bool(false)),
            Some(1) => Some(Value::Bool(true)),
            _ => None,
        },
        (FieldKind::Object, Value::Object(_)) => Some(value.clone()),
        (FieldKind::Array, Value::Array(_)) => Some(value.clone()),
        _ => None,
    };

    coerced.ok_or_else(|| mismatch(field, kind, &value))
}

fn mismatch(field: &str, expected: FieldKind, found: &Value) -> ContractViolation {
    ContractViolation::TypeMismatch {
        field: field.to_string(),
        expected,
        found: json_type_name(found),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Drop a surrounding markdown code fence, if the model added one
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Skip the info string ("json") on the opening line
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> OutputContract {
        OutputContract::new("person")
            .field(FieldSpec::optional("name", FieldKind::String))
            .field(FieldSpec::optional("age", FieldKind::Integer))
    }

    #[test]
    fn test_parse_partial_object() {
        let output = person().parse_json(r#"{"name": "Ada", "age": null}"#).unwrap();
        assert_eq!(output.get("name"), Some(&json!("Ada")));
        assert_eq!(output.get("age"), Some(&Value::Null));
        assert!(!output.is_vacuous());
    }

    #[test]
    fn test_all_null_is_vacuous() {
        let output = person().parse_json(r#"{"name": null, "age": null}"#).unwrap();
        assert!(output.is_vacuous());

        let output = person().parse_json("{}").unwrap();
        assert!(output.is_vacuous());
    }

    #[test]
    fn test_invalid_json() {
        let err = person().parse_json("not json").unwrap_err();
        assert!(matches!(err, ContractViolation::InvalidJson(_)));
    }

    #[test]
    fn test_not_an_object() {
        let err = person().parse_json("[1, 2]").unwrap_err();
        assert!(matches!(err, ContractViolation::NotAnObject { found: "array" }));
    }

    #[test]
    fn test_required_fields() {
        let contract = OutputContract::new("answer")
            .field(FieldSpec::required("answer", FieldKind::String))
            .field(FieldSpec::optional("confidence", FieldKind::Number));

        let err = contract.parse_json(r#"{"confidence": 0.4}"#).unwrap_err();
        assert!(matches!(err, ContractViolation::MissingField(ref f) if f == "answer"));

        let err = contract.parse_json(r#"{"answer": null}"#).unwrap_err();
        assert!(matches!(err, ContractViolation::NullField(ref f) if f == "answer"));
    }

    #[test]
    fn test_type_mismatch() {
        let err = person().parse_json(r#"{"name": 42}"#).unwrap_err();
        match err {
            ContractViolation::TypeMismatch { field, expected, found } => {
                assert_eq!(field, "name");
                assert_eq!(expected, FieldKind::String);
                assert_eq!(found, "number");
            }
            other => panic!("unexpected violation: {other:?}"),
        }

        let err = person().parse_json(r#"{"age": "forty"}"#).unwrap_err();
        assert!(matches!(err, ContractViolation::TypeMismatch { .. }));
    }

    #[test]
    fn test_scalar_coercion() {
        let contract = OutputContract::new("coerce")
            .field(FieldSpec::optional("count", FieldKind::Integer))
            .field(FieldSpec::optional("whole", FieldKind::Integer))
            .field(FieldSpec::optional("ratio", FieldKind::Number))
            .field(FieldSpec::optional("flag", FieldKind::Boolean));

        let output = contract
            .parse_json(r#"{"count": "7", "whole": 3.0, "ratio": "0.5", "flag": "TRUE"}"#)
            .unwrap();
        assert_eq!(output.get("count"), Some(&json!(7)));
        assert_eq!(output.get("whole"), Some(&json!(3)));
        assert_eq!(output.get("ratio"), Some(&json!(0.5)));
        assert_eq!(output.get("flag"), Some(&json!(true)));

        let err = contract.parse_json(r#"{"whole": 3.5}"#).unwrap_err();
        assert!(matches!(err, ContractViolation::TypeMismatch { .. }));
    }

    #[test]
    fn test_array_items() {
        let contract = OutputContract::new("tags").field(FieldSpec::array("tags", FieldKind::Integer));

        let output = contract.parse_json(r#"{"tags": [1, "2", 3]}"#).unwrap();
        assert_eq!(output.get("tags"), Some(&json!([1, 2, 3])));

        let err = contract.parse_json(r#"{"tags": [1, "x"]}"#).unwrap_err();
        assert!(matches!(err, ContractViolation::TypeMismatch { ref field, .. } if field == "tags[1]"));
    }

    #[test]
    fn test_extra_keys_dropped() {
        let output = person()
            .parse_json(r#"{"name": "Ada", "age": 36, "title": "Countess"}"#)
            .unwrap();
        assert_eq!(output.fields().len(), 2);
        assert!(output.get("title").is_none());
    }

    #[test]
    fn test_code_fence_stripped() {
        let output = person()
            .parse_json("```json\n{\"name\": \"Ada\"}\n```")
            .unwrap();
        assert_eq!(output.get("name"), Some(&json!("Ada")));
    }

    #[test]
    fn test_decode_into_struct() {
        #[derive(Deserialize)]
        struct Person {
            name: Option<String>,
            age: Option<i64>,
        }

        let output = person().parse_json(r#"{"name": "Ada", "age": 36}"#).unwrap();
        let person: Person = output.decode().unwrap();
        assert_eq!(person.name.as_deref(), Some("Ada"));
        assert_eq!(person.age, Some(36));
    }

    #[test]
    fn test_json_schema_shape() {
        let contract = person()
            .with_description("a person")
            .field(FieldSpec::required("id", FieldKind::String).with_description("stable id"));
        let schema = contract.json_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["required"], json!(["name", "age", "id"]));
        assert_eq!(schema["properties"]["name"]["type"], json!(["string", "null"]));
        assert_eq!(schema["properties"]["id"]["type"], "string");
        assert_eq!(schema["properties"]["id"]["description"], "stable id");
        assert_eq!(schema["description"], "a person");
    }

    #[test]
    fn test_schema_name_sanitized() {
        assert_eq!(OutputContract::new("cell value").schema_name(), "cell_value");
        assert_eq!(OutputContract::new("").schema_name(), "output");
        assert_eq!(OutputContract::new("x".repeat(100)).schema_name().len(), 64);
    }

    #[test]
    fn test_strict_schema_support() {
        assert!(person().supports_strict_schema());
        assert!(person()
            .field(FieldSpec::array("tags", FieldKind::String))
            .supports_strict_schema());

        let loose = person().field(FieldSpec::optional("extra", FieldKind::Object));
        assert!(!loose.supports_strict_schema());
    }

    #[test]
    fn test_object_items_disable_strict_schema() {
        let contract = OutputContract::new("people").field(FieldSpec::array("people", FieldKind::Object));
        assert!(!contract.supports_strict_schema());
        assert_eq!(
            contract.json_schema()["properties"]["people"]["items"],
            json!({"type": "object"})
        );

        let nested = OutputContract::new("matrix").field(FieldSpec::array("m", FieldKind::Array));
        assert!(!nested.supports_strict_schema());
    }

    #[test]
    fn test_nested_array_items() {
        let yaml = "name: matrix\nfields:\n  - name: m\n    type: array\n    items: array\n";
        let contract: OutputContract = serde_yaml::from_str(yaml).unwrap();

        let output = contract.parse_json(r#"{"m": [[1, 2], [3]]}"#).unwrap();
        assert_eq!(output.get("m"), Some(&json!([[1, 2], [3]])));

        let err = contract.parse_json(r#"{"m": [[1], 2]}"#).unwrap_err();
        assert!(matches!(err, ContractViolation::TypeMismatch { ref field, .. } if field == "m[1]"));

        let text = contract.render_instructions();
        assert!(text.contains("\"m\" (array of array, or null)"));
    }

    #[test]
    fn test_instructions_mention_fields() {
        let text = person().render_instructions();
        assert!(text.contains("JSON"));
        assert!(text.contains("\"name\" (string, or null)"));
        assert!(text.contains("\"age\" (integer, or null)"));
    }

    #[test]
    fn test_contract_from_yaml() {
        let yaml = r#"
name: person
description: a person mentioned in the document
fields:
  - name: name
    type: string
  - name: age
    type: integer
    required: true
  - name: aliases
    type: array
    items: string
"#;
        let contract: OutputContract = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(contract.fields.len(), 3);
        assert!(!contract.fields[0].required);
        assert!(contract.fields[1].required);
        assert_eq!(contract.fields[2].items, Some(FieldKind::String));
    }
}
