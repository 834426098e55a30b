//! Tagged error variants with ordered, optionally exhaustive matching.
//!
//! - [`define_error!`] declares variants; their instances are [`Tagged<K>`].
//! - [`Thrown`] holds anything that can be raised: tagged errors, other errors, plain records
//!   and opaque panic payloads.
//! - [`match_error`] and friends dispatch over a [`Thrown`] with first-match-wins rules; the
//!   exhaustive flavors check at compile time that every declared variant is handled.
//! - [`wrap`] turns fallible and panicking calls into an [`Outcome`].
//! - [`serialize`]/[`deserialize`] move errors across process boundaries.
//!
//! ```rust
//! use errtag::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! pub struct NetworkData {
//!     pub status: u16,
//! }
//!
//! define_error! {
//!     pub NetworkError(NetworkData);
//!     pub Timeout;
//! }
//!
//! fn describe(err: impl Into<Thrown>) -> String {
//!     match_error_of(err, (NetworkError, Timeout))
//!         .select(NetworkError, "status", |status| format!("http {status}"))
//!         .with(Timeout, |_| "timed out".to_string())
//!         .exhaustive()
//!         .unwrap_or_else(|e| e.to_string())
//! }
//!
//! assert_eq!(describe(NetworkError::with_data(NetworkData { status: 502 })), "http 502");
//! assert_eq!(describe(Timeout::empty()), "timed out");
//! ```

pub mod config;
pub mod error;
pub mod guard;
pub mod kind;
pub mod matcher;
pub mod pattern;
pub mod pretty;
pub mod result_ext;
pub mod serialize;
pub mod thrown;
pub mod wrap;

// public exports
pub use error::{Error, Result};
pub use guard::{
    ErrorOf, HasCode, has_code, is_all_of, is_any_of, is_error, is_error_of, is_error_of_where,
};
pub use kind::{Kind, Payload, Tagged};
pub use matcher::{
    AsyncExhaustiveMatcher, AsyncMatcher, ExhaustiveMatcher, Matcher, match_error,
    match_error_async, match_error_of, match_error_of_async,
};
pub use pattern::{
    Cons, Guard, Here, Nil, Pattern, Predicate, There, VariantList, Without, WithoutAll, guard,
};
pub use pretty::PrettyDebug;
pub use result_ext::{IterResultExt, ResultExt};
pub use serialize::{
    Constructor, GenericError, Registry, SerializedError, UNKNOWN_ERROR, deserialize, from_json,
    serialize, to_json, to_json_default,
};
pub use thrown::{AnyError, AnyTagged, Thrown, raise};
pub use wrap::{Outcome, capture, capture_async, wrap, wrap_sync};

/// Everything needed to declare variants and match on them.
pub mod prelude {
    pub use crate::guard::{has_code, is_error, is_error_of, is_error_of_where};
    pub use crate::kind::{Kind, Tagged};
    pub use crate::matcher::{match_error, match_error_async, match_error_of, match_error_of_async};
    pub use crate::pattern::guard;
    pub use crate::result_ext::ResultExt;
    pub use crate::thrown::{Thrown, raise};
    pub use crate::wrap::{Outcome, wrap, wrap_sync};
    pub use crate::{define_error, variants};
}
