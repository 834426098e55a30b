//! Transport records for errors.
//!
//! [`serialize`] flattens any [`Thrown`] into a [`SerializedError`]; [`deserialize`] rebuilds a
//! live value from one, given the variants the receiving side knows about. Unknown records are
//! never rejected: they come back as a [`GenericError`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config;
use crate::error::Result;
use crate::kind::{Kind, Tagged};
use crate::thrown::{AnyTagged, Thrown, opaque_text, short_type_name};

/// Tag used for values that are not errors at all.
pub const UNKNOWN_ERROR: &str = "UnknownError";

/// The on-wire shape: `{ tag, message, name, data?, stack? }`. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedError {
    pub tag: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl SerializedError {
    fn unknown(message: String) -> Self {
        Self {
            tag: UNKNOWN_ERROR.to_string(),
            message,
            name: UNKNOWN_ERROR.to_string(),
            data: None,
            stack: None,
        }
    }

    /// Read a record out of any parsed JSON. Missing or mistyped fields fall back instead of
    /// failing: the tag to the name, then to [`UNKNOWN_ERROR`]; text fields to empty strings.
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::unknown(match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        };
        let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
        let name = text("name").unwrap_or_default();
        let tag = text("tag")
            .or_else(|| (!name.is_empty()).then(|| name.clone()))
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        Self {
            tag,
            message: text("message").unwrap_or_default(),
            name,
            data: map.get("data").cloned().and_then(present),
            stack: text("stack"),
        }
    }

    pub fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Fallback for records no known variant accepts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{name}: {message}")]
pub struct GenericError {
    pub name: String,
    pub message: String,
    pub tag: Option<String>,
    pub data: Option<Value>,
    pub stack: Option<String>,
}

impl GenericError {
    fn from_record(record: &SerializedError) -> Self {
        Self {
            name: record.name.clone(),
            message: record.message.clone(),
            tag: Some(record.tag.clone()),
            data: record.data.clone(),
            stack: record.stack.clone(),
        }
    }
}

/// Something that can turn a matching record back into a live error.
pub trait Constructor: Send + Sync {
    fn tag(&self) -> &'static str;
    fn name(&self) -> &'static str;

    /// Tag match first, then the constructor's own name against the record's tag or name.
    fn accepts(&self, record: &SerializedError) -> bool {
        record.tag == self.tag() || record.tag == self.name() || record.name == self.name()
    }

    /// Build the instance. Fails when the record's payload does not fit this variant.
    fn construct(&self, record: &SerializedError) -> serde_json::Result<Thrown>;
}

impl<K: Kind> Constructor for K {
    fn tag(&self) -> &'static str {
        K::TAG
    }

    fn name(&self) -> &'static str {
        K::NAME
    }

    fn construct(&self, record: &SerializedError) -> serde_json::Result<Thrown> {
        let data = match &record.data {
            Some(value) => Some(serde_json::from_value::<K::Data>(value.clone())?),
            None => None,
        };
        let mut instance = Tagged::<K>::build(Some(record.message.clone()), data);
        if let Some(stack) = &record.stack {
            instance = instance.with_stack(stack.clone());
        }
        Ok(instance.into())
    }
}

/// Flatten `value` into a transport record. The stack is only included when asked for and
/// available.
pub fn serialize(value: &Thrown, include_stack: bool) -> SerializedError {
    let mut record = match value {
        Thrown::Tagged(t) => {
            let t: &dyn AnyTagged = &**t;
            SerializedError {
                tag: AnyTagged::tag(t).to_string(),
                message: t.message().to_string(),
                name: AnyTagged::name(t).to_string(),
                data: present(t.data_value()),
                stack: t.stack(),
            }
        }
        Thrown::Error(e) => match (**e).as_any().downcast_ref::<GenericError>() {
            Some(g) => SerializedError {
                tag: g.tag.clone().unwrap_or_else(|| g.name.clone()),
                message: g.message.clone(),
                name: g.name.clone(),
                data: g.data.clone().and_then(present),
                stack: g.stack.clone(),
            },
            None => {
                let name = short_type_name((**e).type_name()).to_string();
                SerializedError {
                    tag: name.clone(),
                    message: e.to_string(),
                    name,
                    data: None,
                    stack: None,
                }
            }
        },
        Thrown::Record(v) if value.is_error() => {
            let text = |key: &str| v.get(key).and_then(Value::as_str).map(str::to_string);
            let name = text("name").unwrap_or_default();
            SerializedError {
                tag: text("tag").unwrap_or_else(|| name.clone()),
                message: text("message").unwrap_or_default(),
                name,
                data: v.get("data").cloned().and_then(present),
                stack: text("stack"),
            }
        }
        Thrown::Record(v) => SerializedError::unknown(match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }),
        Thrown::Opaque(o) => SerializedError::unknown(
            opaque_text(&**o).unwrap_or_else(|| "[opaque value]".to_string()),
        ),
    };
    if !include_stack {
        record.stack = None;
    }
    record
}

/// Rebuild a live value. The first accepting constructor whose payload type fits wins; without
/// one the result is a [`GenericError`] carrying the record's fields.
pub fn deserialize(record: &SerializedError, constructors: &[&dyn Constructor]) -> Thrown {
    rebuild(record, constructors.iter().copied())
}

fn rebuild<'c, C>(record: &SerializedError, constructors: impl IntoIterator<Item = &'c C>) -> Thrown
where
    C: Constructor + ?Sized + 'c,
{
    for ctor in constructors {
        if !ctor.accepts(record) {
            continue;
        }
        match ctor.construct(record) {
            Ok(thrown) => return thrown,
            Err(error) => {
                tracing::warn!(
                    tag = %record.tag,
                    candidate = ctor.name(),
                    %error,
                    "payload does not fit candidate variant"
                );
            }
        }
    }
    tracing::debug!(
        tag = %record.tag,
        name = %record.name,
        "no known variant, using generic error"
    );
    GenericError::from_record(record).into()
}

pub fn to_json(value: &Thrown, include_stack: bool) -> Result<String> {
    Ok(serde_json::to_string(&serialize(value, include_stack))?)
}

/// [`to_json`] with the configured `include_stack` default.
pub fn to_json_default(value: &Thrown) -> Result<String> {
    to_json(value, config::current().include_stack)
}

/// Fails only on text that is not JSON. Any parsed value yields some [`Thrown`].
pub fn from_json(text: &str, constructors: &[&dyn Constructor]) -> Result<Thrown> {
    let record = parse_record(text)?;
    Ok(deserialize(&record, constructors))
}

fn parse_record(text: &str) -> Result<SerializedError> {
    let value: Value = serde_json::from_str(text)?;
    Ok(SerializedError::from_value(&value))
}

/// An owned list of constructors, for receivers that deserialize repeatedly.
#[derive(Default)]
pub struct Registry {
    constructors: Vec<Box<dyn Constructor>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C: Constructor + 'static>(mut self, constructor: C) -> Self {
        self.constructors.push(Box::new(constructor));
        self
    }

    pub fn tags(&self) -> Vec<&'static str> {
        self.constructors.iter().map(|c| c.tag()).collect()
    }

    pub fn deserialize(&self, record: &SerializedError) -> Thrown {
        rebuild(record, self.constructors.iter().map(Box::as_ref))
    }

    pub fn from_json(&self, text: &str) -> Result<Thrown> {
        let record = parse_record(text)?;
        Ok(self.deserialize(&record))
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("tags", &self.tags()).finish()
    }
}

/// `None` for payloads that carry nothing.
fn present(value: Value) -> Option<Value> {
    match &value {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        _ => Some(value),
    }
}
