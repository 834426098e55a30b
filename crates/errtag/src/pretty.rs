//! Structured, log-friendly views of errors.

use crate::config;
use crate::kind::{Kind, Tagged};
use crate::serialize::{SerializedError, serialize};
use crate::thrown::Thrown;

/// Provide a structured view of an error for logging.
///
/// The fields are the transport record, so what ends up in logs matches what goes over the
/// wire. Whether the stack is part of it follows the configured `include_stack`.
pub trait PrettyDebug {
    /// Return the structured fields, if available.
    fn fields(&self) -> Option<SerializedError>;

    /// Convert fields to a JSON value without pretty whitespace.
    fn to_value(&self) -> Option<serde_json::Value> {
        self.fields().and_then(|f| serde_json::to_value(&f).ok())
    }

    /// Convert fields to a pretty JSON string (for logs or UI).
    fn pretty_json(&self) -> Option<String> {
        self.fields()
            .and_then(|f| serde_json::to_string_pretty(&f).ok())
    }

    /// Emit a tracing event with both the Display string and structured fields when available.
    fn emit_tracing(&self, level: tracing::Level, message: &str)
    where
        Self: std::fmt::Display,
    {
        let this = self;
        let fields = self.fields();
        macro_rules! emit {
            ($lvl:expr) => {
                match &fields {
                    Some(f) => tracing::event!(
                        $lvl,
                        error = %this,
                        tag = %f.tag,
                        fields = ?f,
                        "{}",
                        message
                    ),
                    None => tracing::event!($lvl, error = %this, "{}", message),
                }
            };
        }
        if level == tracing::Level::ERROR {
            emit!(tracing::Level::ERROR)
        } else if level == tracing::Level::WARN {
            emit!(tracing::Level::WARN)
        } else if level == tracing::Level::INFO {
            emit!(tracing::Level::INFO)
        } else if level == tracing::Level::DEBUG {
            emit!(tracing::Level::DEBUG)
        } else {
            emit!(tracing::Level::TRACE)
        }
    }
}

impl PrettyDebug for Thrown {
    fn fields(&self) -> Option<SerializedError> {
        Some(serialize(self, config::current().include_stack))
    }
}

impl<K: Kind> PrettyDebug for Tagged<K> {
    fn fields(&self) -> Option<SerializedError> {
        Thrown::from(self.clone()).fields()
    }
}
