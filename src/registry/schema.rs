//! Declarative tool input schemas.
//!
//! A schema is a static list of [`FieldSpec`]s. [`InputSchema::validate`] walks
//! the raw JSON arguments against it and either returns a normalized
//! [`ValidatedInput`] (declared fields only, defaults filled in) or the first
//! violation as `AppError::ValidationError` naming the field path and the
//! constraint. [`InputSchema::to_json_schema`] exports the same description as
//! JSON Schema for tool listings.

use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

/// Literal used as a default for an omitted field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Str(&'static str),
    Bool(bool),
}

impl Literal {
    fn to_value(self) -> Value {
        match self {
            Literal::Str(s) => Value::String(s.to_string()),
            Literal::Bool(b) => Value::Bool(b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Presence {
    Required,
    Optional,
    Default(Literal),
}

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text { non_empty: bool },
    Choice(&'static [&'static str]),
    Flag,
    List { item: ItemKind, min: usize, max: usize },
}

#[derive(Debug, Clone, Copy)]
pub enum ItemKind {
    Text { non_empty: bool },
    Record(&'static [FieldSpec]),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

impl FieldSpec {
    pub const fn required(name: &'static str, description: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            description,
            kind,
            presence: Presence::Required,
        }
    }

    pub const fn optional(name: &'static str, description: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            description,
            kind,
            presence: Presence::Optional,
        }
    }

    pub const fn with_default(
        name: &'static str,
        description: &'static str,
        kind: FieldKind,
        default: Literal,
    ) -> Self {
        Self {
            name,
            description,
            kind,
            presence: Presence::Default(default),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InputSchema {
    pub fields: &'static [FieldSpec],
}

/// Tool arguments that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput(Map<String, Value>);

impl ValidatedInput {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Deserialize into a handler's typed parameters.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| AppError::validation("arguments", e.to_string()))
    }
}

impl InputSchema {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    /// Validate raw arguments. `null` counts as an empty argument object.
    pub fn validate(&self, raw: &Value) -> Result<ValidatedInput> {
        let empty = Map::new();
        let map = match raw {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(AppError::validation(
                    "arguments",
                    format!("expected an object, got {}", type_name(other)),
                ))
            }
        };

        validate_record(self.fields, map, "").map(ValidatedInput)
    }

    pub fn to_json_schema(&self) -> Value {
        record_schema(self.fields)
    }
}

fn validate_record(fields: &[FieldSpec], map: &Map<String, Value>, prefix: &str) -> Result<Map<String, Value>> {
    let mut out = Map::new();

    for field in fields {
        let path = format!("{}{}", prefix, field.name);
        match map.get(field.name).filter(|v| !v.is_null()) {
            Some(value) => {
                out.insert(field.name.to_string(), validate_kind(&field.kind, value, &path)?);
            }
            None => match field.presence {
                Presence::Required => return Err(AppError::validation(path, "is required")),
                Presence::Optional => {}
                Presence::Default(literal) => {
                    out.insert(field.name.to_string(), literal.to_value());
                }
            },
        }
    }

    Ok(out)
}

fn validate_kind(kind: &FieldKind, value: &Value, path: &str) -> Result<Value> {
    match kind {
        FieldKind::Text { non_empty } => validate_text(*non_empty, value, path),
        FieldKind::Choice(options) => {
            let s = value
                .as_str()
                .ok_or_else(|| expected("a string", value, path))?;
            if options.contains(&s) {
                Ok(value.clone())
            } else {
                Err(AppError::validation(
                    path,
                    format!("must be one of: {} (got \"{}\")", options.join(", "), s),
                ))
            }
        }
        FieldKind::Flag => match value {
            Value::Bool(_) => Ok(value.clone()),
            other => Err(expected("a boolean", other, path)),
        },
        FieldKind::List { item, min, max } => {
            let items = value
                .as_array()
                .ok_or_else(|| expected("an array", value, path))?;
            if items.len() < *min {
                return Err(AppError::validation(
                    path,
                    format!("must contain at least {} item(s), got {}", min, items.len()),
                ));
            }
            if items.len() > *max {
                return Err(AppError::validation(
                    path,
                    format!("must contain at most {} items, got {}", max, items.len()),
                ));
            }

            items
                .iter()
                .enumerate()
                .map(|(i, v)| validate_item(item, v, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
    }
}

fn validate_item(item: &ItemKind, value: &Value, path: &str) -> Result<Value> {
    match item {
        ItemKind::Text { non_empty } => validate_text(*non_empty, value, path),
        ItemKind::Record(fields) => {
            let map = value
                .as_object()
                .ok_or_else(|| expected("an object", value, path))?;
            validate_record(fields, map, &format!("{}.", path)).map(Value::Object)
        }
    }
}

fn validate_text(non_empty: bool, value: &Value, path: &str) -> Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| expected("a string", value, path))?;
    if non_empty && s.trim().is_empty() {
        return Err(AppError::validation(path, "must not be empty"));
    }
    Ok(value.clone())
}

fn expected(what: &str, got: &Value, path: &str) -> AppError {
    AppError::validation(path, format!("expected {}, got {}", what, type_name(got)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn record_schema(fields: &[FieldSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in fields {
        let mut schema = kind_schema(&field.kind);
        if let Value::Object(obj) = &mut schema {
            obj.insert("description".into(), Value::String(field.description.into()));
            if let Presence::Default(literal) = field.presence {
                obj.insert("default".into(), literal.to_value());
            }
        }
        if field.presence == Presence::Required {
            required.push(Value::String(field.name.into()));
        }
        properties.insert(field.name.into(), schema);
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn kind_schema(kind: &FieldKind) -> Value {
    match kind {
        FieldKind::Text { non_empty } => text_schema(*non_empty),
        FieldKind::Choice(options) => json!({ "type": "string", "enum": options }),
        FieldKind::Flag => json!({ "type": "boolean" }),
        FieldKind::List { item, min, max } => {
            let items = match item {
                ItemKind::Text { non_empty } => text_schema(*non_empty),
                ItemKind::Record(fields) => record_schema(fields),
            };
            json!({ "type": "array", "items": items, "minItems": min, "maxItems": max })
        }
    }
}

fn text_schema(non_empty: bool) -> Value {
    if non_empty {
        json!({ "type": "string", "minLength": 1 })
    } else {
        json!({ "type": "string" })
    }
}
