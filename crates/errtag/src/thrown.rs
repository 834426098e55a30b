//! The value that travels through matchers, the wrapper and serialization.
//!
//! Rust has no common base for "anything that can be thrown", so [`Thrown`] plays that role:
//! tagged errors, other `std::error::Error` values, plain records crossing a transport boundary
//! and opaque payloads (e.g. from a panic) all fit in it without losing their concrete type.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

use serde_json::Value;

use crate::kind::{Kind, Tagged};
use crate::serialize::{GenericError, SerializedError};

/// Object-safe view of an error that still allows downcasting to its concrete type.
pub trait AnyError: StdError + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
    /// `std::any::type_name` of the concrete error.
    fn type_name(&self) -> &'static str;
}

impl<E: StdError + Send + Sync + 'static> AnyError for E {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<E>()
    }
}

/// Type-erased tagged error; implemented by every [`Tagged<K>`].
pub trait AnyTagged: AnyError {
    fn tag(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn message(&self) -> &str;
    /// Payload rendered as JSON. `Value::Null` for unit payloads.
    fn data_value(&self) -> Value;
    fn stack(&self) -> Option<String>;
}

/// Anything that can be raised and caught.
pub enum Thrown {
    Tagged(Box<dyn AnyTagged>),
    Error(Box<dyn AnyError>),
    /// A plain record, e.g. a serialized error that was never re-instantiated.
    Record(Value),
    Opaque(Box<dyn Any + Send>),
}

impl Thrown {
    pub fn error<E: StdError + Send + Sync + 'static>(error: E) -> Self {
        Thrown::Error(Box::new(error))
    }

    pub fn record(value: Value) -> Self {
        Thrown::Record(value)
    }

    pub fn opaque<T: Any + Send>(value: T) -> Self {
        Thrown::Opaque(Box::new(value))
    }

    /// Recover a value from a panic payload. A `Thrown` raised with [`raise`] comes back as-is;
    /// anything else is kept verbatim as an opaque payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        match payload.downcast::<Thrown>() {
            Ok(thrown) => *thrown,
            Err(other) => Thrown::Opaque(other),
        }
    }

    pub fn is<T: Any>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Thrown::Tagged(t) => (**t).as_any().downcast_ref(),
            Thrown::Error(e) => (**e).as_any().downcast_ref(),
            Thrown::Record(v) => (v as &dyn Any).downcast_ref(),
            Thrown::Opaque(o) => (**o).downcast_ref(),
        }
    }

    /// Take the concrete value out, or get the subject back untouched.
    pub fn downcast<T: Any>(self) -> Result<T, Thrown> {
        if !self.is::<T>() {
            return Err(self);
        }
        let boxed: Box<dyn Any + Send> = match self {
            Thrown::Tagged(t) => t.into_any(),
            Thrown::Error(e) => e.into_any(),
            Thrown::Record(v) => Box::new(v),
            Thrown::Opaque(o) => o,
        };
        boxed.downcast::<T>().map(|b| *b).map_err(Thrown::Opaque)
    }

    pub fn as_tagged(&self) -> Option<&dyn AnyTagged> {
        match self {
            Thrown::Tagged(t) => Some(&**t),
            _ => None,
        }
    }

    /// The discriminant carried by the value, if any: a tagged error's tag, a record's `tag`
    /// field, or the tag attached to a [`GenericError`].
    pub fn tag(&self) -> Option<&str> {
        match self {
            Thrown::Tagged(t) => Some(t.tag()),
            Thrown::Record(v) => v.get("tag").and_then(Value::as_str),
            Thrown::Error(e) => (**e)
                .as_any()
                .downcast_ref::<GenericError>()
                .and_then(|g| g.tag.as_deref()),
            Thrown::Opaque(_) => None,
        }
    }

    pub fn name(&self) -> Option<String> {
        match self {
            Thrown::Tagged(t) => Some(t.name().to_string()),
            Thrown::Error(e) => match (**e).as_any().downcast_ref::<GenericError>() {
                Some(g) => Some(g.name.clone()),
                None => Some(short_type_name((**e).type_name()).to_string()),
            },
            Thrown::Record(v) => v.get("name").and_then(Value::as_str).map(str::to_string),
            Thrown::Opaque(_) => None,
        }
    }

    pub fn message(&self) -> Option<String> {
        match self {
            Thrown::Tagged(t) => Some(t.message().to_string()),
            Thrown::Error(e) => match (**e).as_any().downcast_ref::<GenericError>() {
                Some(g) => Some(g.message.clone()),
                None => Some(e.to_string()),
            },
            Thrown::Record(v) => v.get("message").and_then(Value::as_str).map(str::to_string),
            Thrown::Opaque(o) => opaque_text(&**o),
        }
    }

    /// The `code` of a record, or the `code` field of a tagged error's payload.
    pub fn code(&self) -> Option<Value> {
        match self {
            Thrown::Tagged(t) => t.data_value().get("code").cloned(),
            Thrown::Record(v) => v.get("code").cloned(),
            Thrown::Error(_) | Thrown::Opaque(_) => None,
        }
    }

    /// Whether this is an error in the host sense: a real error value, or a record exposing
    /// both `name` and `message`.
    pub fn is_error(&self) -> bool {
        match self {
            Thrown::Tagged(_) | Thrown::Error(_) => true,
            Thrown::Record(v) => v.get("name").is_some() && v.get("message").is_some(),
            Thrown::Opaque(_) => false,
        }
    }
}

/// Throw `value` by unwinding. [`crate::wrap`] and friends turn it back into the same `Thrown`.
pub fn raise(value: impl Into<Thrown>) -> ! {
    std::panic::panic_any(value.into())
}

impl<K: Kind> From<Tagged<K>> for Thrown {
    fn from(value: Tagged<K>) -> Self {
        Thrown::Tagged(Box::new(value))
    }
}

impl From<Value> for Thrown {
    fn from(value: Value) -> Self {
        Thrown::Record(value)
    }
}

impl From<SerializedError> for Thrown {
    fn from(value: SerializedError) -> Self {
        Thrown::Record(value.into_value())
    }
}

impl From<GenericError> for Thrown {
    fn from(value: GenericError) -> Self {
        Thrown::error(value)
    }
}

impl From<std::io::Error> for Thrown {
    fn from(value: std::io::Error) -> Self {
        Thrown::error(value)
    }
}

/// Kept verbatim, so `downcast::<Box<dyn Error + Send + Sync>>()` gives it back.
impl From<Box<dyn StdError + Send + Sync>> for Thrown {
    fn from(value: Box<dyn StdError + Send + Sync>) -> Self {
        Thrown::opaque(value)
    }
}

impl From<String> for Thrown {
    fn from(value: String) -> Self {
        Thrown::opaque(value)
    }
}

impl From<&'static str> for Thrown {
    fn from(value: &'static str) -> Self {
        Thrown::opaque(value)
    }
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Thrown::Tagged(t) => write!(f, "{}: {}", t.tag(), t.message()),
            Thrown::Error(e) => write!(f, "{e}"),
            Thrown::Record(v) => write!(f, "{v}"),
            Thrown::Opaque(o) => match opaque_text(&**o) {
                Some(text) => f.write_str(&text),
                None => f.write_str("[opaque value]"),
            },
        }
    }
}

impl fmt::Debug for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Thrown::Tagged(t) => f.debug_tuple("Tagged").field(t).finish(),
            Thrown::Error(e) => f.debug_tuple("Error").field(e).finish(),
            Thrown::Record(v) => f.debug_tuple("Record").field(v).finish(),
            Thrown::Opaque(o) => f
                .debug_tuple("Opaque")
                .field(&opaque_text(&**o).unwrap_or_else(|| "..".to_string()))
                .finish(),
        }
    }
}

/// Best-effort text for payloads that commonly end up opaque (panic messages, scalars).
pub(crate) fn opaque_text(value: &(dyn Any + Send)) -> Option<String> {
    if let Some(s) = value.downcast_ref::<&'static str>() {
        return Some((*s).to_string());
    }
    if let Some(s) = value.downcast_ref::<String>() {
        return Some(s.clone());
    }
    if let Some(e) = value.downcast_ref::<Box<dyn StdError + Send + Sync>>() {
        return Some(e.to_string());
    }
    macro_rules! scalar {
        ($($t:ty),*) => {
            $(if let Some(v) = value.downcast_ref::<$t>() {
                return Some(v.to_string());
            })*
        };
    }
    scalar!(bool, i32, i64, u32, u64, usize, f32, f64);
    None
}

/// `my_crate::io::ReadError<T>` -> `ReadError`
pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
