//! Tagged error variants.
//!
//! A variant is a zero-sized marker type implementing [`Kind`]; its instances are
//! [`Tagged<K>`]. Markers are declared with [`define_error!`](crate::define_error):
//!
//! ```rust
//! use errtag::{define_error, Kind, Tagged};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
//! pub struct NetworkData {
//!     pub status: u16,
//!     pub url: String,
//! }
//!
//! define_error! {
//!     /// The upstream service answered with a failure status.
//!     pub NetworkError(NetworkData);
//!     pub Timeout = "timeout";
//! }
//!
//! let err: Tagged<NetworkError> = NetworkError::new(
//!     "Request failed",
//!     NetworkData { status: 500, url: "/api".into() },
//! );
//! assert_eq!(err.tag(), "NetworkError");
//! assert_eq!(err.data().status, 500);
//!
//! let timeout = Timeout::empty();
//! assert_eq!(timeout.tag(), "timeout");
//! assert_eq!(timeout.message(), "timeout");
//! ```

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{self, StackCapture};
use crate::thrown::{AnyTagged, Thrown};

/// Bounds every variant payload satisfies.
pub trait Payload:
    Clone + fmt::Debug + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> Payload for T where
    T: Clone + fmt::Debug + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// A tagged error variant.
///
/// Implementors are markers; the marker value doubles as the variant's descriptor when
/// matching (`matcher.with(NetworkError, ..)`) or deserializing.
pub trait Kind: Copy + Send + Sync + 'static {
    /// Fixed discriminant shared by every instance of the variant.
    const TAG: &'static str;
    /// Rust name of the marker. Used as a secondary key when deserializing.
    const NAME: &'static str = Self::TAG;

    type Data: Payload;

    fn new(message: impl Into<String>, data: Self::Data) -> Tagged<Self> {
        Tagged::build(Some(message.into()), Some(data))
    }

    fn with_message(message: impl Into<String>) -> Tagged<Self> {
        Tagged::build(Some(message.into()), None)
    }

    fn with_data(data: Self::Data) -> Tagged<Self> {
        Tagged::build(None, Some(data))
    }

    /// An instance with the tag as message and the default payload.
    fn empty() -> Tagged<Self> {
        Tagged::build(None, None)
    }

    /// True for an instance of this variant, and for any value structurally carrying this
    /// variant's tag (a record that was never re-instantiated, a generic error with a `tag`).
    fn is(value: &Thrown) -> bool {
        value.is::<Tagged<Self>>() || value.tag() == Some(Self::TAG)
    }
}

#[derive(Clone)]
enum Stack {
    Missing,
    Captured(Arc<Backtrace>),
    Literal(Arc<str>),
}

impl Stack {
    fn capture(policy: StackCapture) -> Self {
        let bt = match policy {
            StackCapture::Never => return Stack::Missing,
            StackCapture::Env => Backtrace::capture(),
            StackCapture::Always => Backtrace::force_capture(),
        };
        match bt.status() {
            BacktraceStatus::Captured => Stack::Captured(Arc::new(bt)),
            _ => Stack::Missing,
        }
    }
}

/// One occurrence of a `K` failure.
///
/// The payload is shared and only ever handed out by reference; a modified copy means
/// building a new instance.
pub struct Tagged<K: Kind> {
    message: String,
    data: Arc<K::Data>,
    stack: Stack,
    _kind: PhantomData<K>,
}

impl<K: Kind> Tagged<K> {
    /// Normalizing constructor: a missing message becomes the tag, a missing payload becomes
    /// `K::Data::default()`.
    pub fn build(message: Option<String>, data: Option<K::Data>) -> Self {
        Self {
            message: message.unwrap_or_else(|| K::TAG.to_string()),
            data: Arc::new(data.unwrap_or_default()),
            stack: Stack::capture(config::current().capture_stack),
            _kind: PhantomData,
        }
    }

    pub fn tag(&self) -> &'static str {
        K::TAG
    }

    /// Mirrors the tag.
    pub fn name(&self) -> &'static str {
        K::TAG
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &K::Data {
        &self.data
    }

    /// One named payload field as JSON, `Value::Null` when absent.
    pub fn field(&self, key: &str) -> Value {
        self.data_value().get(key).cloned().unwrap_or(Value::Null)
    }

    pub fn stack(&self) -> Option<String> {
        match &self.stack {
            Stack::Missing => None,
            Stack::Captured(bt) => Some(bt.to_string()),
            Stack::Literal(s) => Some(s.to_string()),
        }
    }

    /// Replace the stack with a literal string, kept byte for byte.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Stack::Literal(Arc::from(stack.into()));
        self
    }

    pub fn data_value(&self) -> Value {
        serde_json::to_value(&*self.data).unwrap_or(Value::Null)
    }
}

impl<K: Kind> Clone for Tagged<K> {
    fn clone(&self) -> Self {
        Self {
            message: self.message.clone(),
            data: Arc::clone(&self.data),
            stack: self.stack.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: Kind> PartialEq for Tagged<K>
where
    K::Data: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message && self.data == other.data
    }
}

impl<K: Kind> fmt::Debug for Tagged<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::TAG)
            .field("message", &self.message)
            .field("data", &*self.data)
            .finish()
    }
}

impl<K: Kind> fmt::Display for Tagged<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl<K: Kind> std::error::Error for Tagged<K> {}

impl<K: Kind> AnyTagged for Tagged<K> {
    fn tag(&self) -> &'static str {
        K::TAG
    }

    fn name(&self) -> &'static str {
        K::TAG
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn data_value(&self) -> Value {
        Tagged::data_value(self)
    }

    fn stack(&self) -> Option<String> {
        Tagged::stack(self)
    }
}

/// Declare tagged error variants.
///
/// Each entry is `vis Name`, optionally followed by `(PayloadType)` and `= "tag"`. The payload
/// defaults to `()` and the tag to the identifier.
///
/// ```rust
/// errtag::define_error! {
///     pub Unauthorized;
///     pub RateLimited(u64) = "rate_limited";
/// }
/// ```
#[macro_export]
macro_rules! define_error {
    (@tag $name:ident) => {
        stringify!($name)
    };
    (@tag $name:ident, $tag:literal) => {
        $tag
    };
    (@data) => {
        ()
    };
    (@data $data:ty) => {
        $data
    };
    ($(
        $(#[$meta:meta])*
        $vis:vis $name:ident $(( $data:ty ))? $(= $tag:literal)?;
    )+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
            $vis struct $name;

            impl $crate::Kind for $name {
                const TAG: &'static str = $crate::define_error!(@tag $name $(, $tag)?);
                const NAME: &'static str = stringify!($name);
                type Data = $crate::define_error!(@data $($data)?);
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct NetData {
        status: u16,
        url: String,
    }

    crate::define_error! {
        Network(NetData);
        Renamed = "renamed.tag";
    }

    #[test]
    fn defaults_fill_missing_parts() {
        let err = Network::empty();
        assert_eq!(err.message(), "Network");
        assert_eq!(err.data(), &NetData::default());
        assert_eq!(err.name(), err.tag());
    }

    #[test]
    fn payload_is_kept_intact() {
        let data = NetData {
            status: 503,
            url: "/health".into(),
        };
        let err = Network::new("down", data.clone());
        assert_eq!(err.data(), &data);

        // clones share the payload; a modified copy is a new instance
        let copy = err.clone();
        let mut changed = copy.data().clone();
        changed.status = 200;
        let rebuilt = Network::new(copy.message(), changed);
        assert_eq!(err.data().status, 503);
        assert_eq!(rebuilt.data().status, 200);
    }

    #[test]
    fn custom_tag_and_name() {
        assert_eq!(Renamed::TAG, "renamed.tag");
        assert_eq!(Renamed::NAME, "Renamed");
        assert_eq!(Network::NAME, Network::TAG);
        assert_eq!(Renamed::empty().message(), "renamed.tag");
    }

    #[test]
    fn is_accepts_instances_and_tagged_records() {
        let instance = Thrown::from(Network::empty());
        assert!(Network::is(&instance));
        assert!(!Renamed::is(&instance));

        let record = Thrown::record(serde_json::json!({"tag": "Network", "message": "m"}));
        assert!(Network::is(&record));

        let other = Thrown::record(serde_json::json!({"tag": "Other"}));
        assert!(!Network::is(&other));
    }

    #[test]
    fn field_selects_payload_members() {
        let err = Network::new(
            "x",
            NetData {
                status: 404,
                url: "/nope".into(),
            },
        );
        assert_eq!(err.field("status"), serde_json::json!(404));
        assert_eq!(err.field("missing"), Value::Null);
    }

    #[test]
    fn literal_stack_survives() {
        let err = Network::empty().with_stack("at main.rs:1");
        assert_eq!(err.stack().as_deref(), Some("at main.rs:1"));
    }

    #[test]
    fn survives_unwinding_as_thrown() {
        let payload = std::panic::catch_unwind(|| {
            crate::raise(Network::with_message("thrown"));
        })
        .unwrap_err();
        let caught = Thrown::from_panic(payload);
        let err = caught.downcast::<Tagged<Network>>().expect("still a Network");
        assert_eq!(err.message(), "thrown");
        let as_error: &dyn std::error::Error = &err;
        assert_eq!(as_error.to_string(), "thrown");
    }
}
