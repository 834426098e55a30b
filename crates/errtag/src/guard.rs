//! Pure checks over a [`Thrown`]. None of these panic; a value of the wrong shape is simply
//! rejected.

use serde_json::Value;

use crate::kind::{Kind, Tagged};
use crate::pattern::{Nil, Pattern, Predicate, VariantList};
use crate::thrown::Thrown;

/// True for real error values and for records exposing both `name` and `message`.
pub fn is_error(value: &Thrown) -> bool {
    value.is_error()
}

/// Recognizes values whose `code` equals `code` exactly (no coercion: `"42"` is not `42`).
pub fn has_code(code: impl Into<Value>) -> HasCode {
    HasCode { code: code.into() }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HasCode {
    code: Value,
}

impl Predicate for HasCode {
    fn test(&self, subject: &Thrown) -> bool {
        subject.code().as_ref() == Some(&self.code)
    }
}

impl Pattern for HasCode {
    type Output = Thrown;
    type Covers = Nil;

    fn narrow(&self, subject: Thrown) -> Result<Thrown, Thrown> {
        if self.test(&subject) {
            Ok(subject)
        } else {
            Err(subject)
        }
    }
}

/// Instance of `K`, with no further condition.
pub fn is_error_of<K: Kind>(kind: K) -> ErrorOf<K, fn(&Tagged<K>) -> bool> {
    ErrorOf {
        kind,
        predicate: |_| true,
    }
}

/// Instance of `K` for which `predicate` also holds. The predicate sees the narrowed value.
pub fn is_error_of_where<K, F>(kind: K, predicate: F) -> ErrorOf<K, F>
where
    K: Kind,
    F: Fn(&Tagged<K>) -> bool,
{
    ErrorOf { kind, predicate }
}

/// Guard built by [`is_error_of`] / [`is_error_of_where`]. As a pattern it narrows to
/// `Tagged<K>` but, being conditional, covers no variant of an exhaustive set.
#[derive(Clone, Copy)]
pub struct ErrorOf<K, F> {
    kind: K,
    predicate: F,
}

impl<K, F> ErrorOf<K, F>
where
    K: Kind,
    F: Fn(&Tagged<K>) -> bool,
{
    pub fn kind(&self) -> K {
        self.kind
    }
}

impl<K, F> Predicate for ErrorOf<K, F>
where
    K: Kind,
    F: Fn(&Tagged<K>) -> bool,
{
    fn test(&self, subject: &Thrown) -> bool {
        subject
            .downcast_ref::<Tagged<K>>()
            .is_some_and(|e| (self.predicate)(e))
    }
}

impl<K, F> Pattern for ErrorOf<K, F>
where
    K: Kind,
    F: Fn(&Tagged<K>) -> bool,
{
    type Output = Tagged<K>;
    type Covers = Nil;

    fn narrow(&self, subject: Thrown) -> Result<Tagged<K>, Thrown> {
        if self.test(&subject) {
            subject.downcast::<Tagged<K>>()
        } else {
            Err(subject)
        }
    }
}

/// Instance of at least one listed variant. `()` accepts nothing.
pub fn is_any_of<L: VariantList>(value: &Thrown, _variants: L) -> bool {
    L::contains(value)
}

/// Every guard accepts `value`. An empty slice accepts everything.
pub fn is_all_of(value: &Thrown, guards: &[&dyn Predicate]) -> bool {
    guards.iter().all(|g| g.test(value))
}
