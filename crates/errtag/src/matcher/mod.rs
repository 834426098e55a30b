//! Ordered rule matching over a single [`Thrown`] subject.
//!
//! A matcher is a list of rules, each a test plus a handler, built fluently and evaluated when
//! the terminal call runs. Rules are tried strictly in registration order and the first one that
//! accepts the subject wins; later rules are never looked at, even if they would also match.
//!
//! Two families exist, each in a synchronous and an asynchronous flavor:
//!
//! - free-form ([`match_error`], [`match_error_async`]) ends with `otherwise(fallback)`;
//! - exhaustive ([`match_error_of`], [`match_error_of_async`]) tracks the declared variants that
//!   are still unhandled and only offers `exhaustive()` once none remain.
//!
//! ```rust
//! use errtag::prelude::*;
//!
//! define_error! {
//!     pub NotFound;
//!     pub Conflict(u32);
//! }
//!
//! let status = match_error(Conflict::with_data(7))
//!     .with(NotFound, |_| 404)
//!     .with(Conflict, |e| 402 + *e.data() as u16)
//!     .otherwise(|_| 500);
//! assert_eq!(status, 409);
//!
//! let label = match_error_of(NotFound::empty(), (NotFound, Conflict))
//!     .with(Conflict, |_| "conflict")
//!     .with(NotFound, |_| "missing")
//!     .exhaustive()
//!     .unwrap();
//! assert_eq!(label, "missing");
//! ```
//!
//! Leaving a declared variant unhandled does not compile:
//!
//! ```compile_fail
//! use errtag::prelude::*;
//!
//! define_error! {
//!     pub NotFound;
//!     pub Conflict;
//! }
//!
//! let _ = match_error_of(NotFound::empty(), (NotFound, Conflict))
//!     .with(NotFound, |_| 1)
//!     .exhaustive();
//! ```
//!
//! `with_not` matches "everything else" and therefore removes nothing from the tracked set.
//! Registered early it absorbs subjects a later `with` was meant for; the tracking cannot see
//! that, so order such rules last.

mod async_matcher;
mod sync_matcher;

pub use async_matcher::{AsyncExhaustiveMatcher, AsyncMatcher};
pub use sync_matcher::{ExhaustiveMatcher, Matcher};

use crate::error::Error;
use crate::pattern::{Pattern, VariantList};
use crate::thrown::Thrown;

/// Free-form synchronous matcher.
pub fn match_error<'a, R>(value: impl Into<Thrown>) -> Matcher<'a, R> {
    Matcher::new(value.into())
}

/// Exhaustive synchronous matcher over the declared variants `L`, e.g. `(A, B, C)`.
pub fn match_error_of<'a, L, R>(
    value: impl Into<Thrown>,
    _variants: L,
) -> ExhaustiveMatcher<'a, L::Kinds, R>
where
    L: VariantList,
{
    ExhaustiveMatcher::new(value.into())
}

/// Free-form asynchronous matcher; handlers return futures.
pub fn match_error_async<'a, R>(value: impl Into<Thrown>) -> AsyncMatcher<'a, R> {
    AsyncMatcher::new(value.into())
}

/// Exhaustive asynchronous matcher over the declared variants `L`.
pub fn match_error_of_async<'a, L, R>(
    value: impl Into<Thrown>,
    _variants: L,
) -> AsyncExhaustiveMatcher<'a, L::Kinds, R>
where
    L: VariantList,
{
    AsyncExhaustiveMatcher::new(value.into())
}

/// One rule: hands back the subject when it does not apply.
type Arm<'a, O> = Box<dyn FnOnce(Thrown) -> Result<O, Thrown> + 'a>;

/// Subject plus ordered rules; shared by every matcher flavor. `O` is what a handler produces
/// (the result itself, or a boxed future of it).
pub(crate) struct Rules<'a, O> {
    subject: Thrown,
    arms: Vec<Arm<'a, O>>,
}

impl<'a, O> Rules<'a, O> {
    pub(crate) fn new(subject: Thrown) -> Self {
        Self {
            subject,
            arms: Vec::new(),
        }
    }

    pub(crate) fn pattern<P, F>(mut self, pattern: P, run: F) -> Self
    where
        P: Pattern + 'a,
        F: FnOnce(P::Output) -> O + 'a,
    {
        self.arms
            .push(Box::new(move |subject| pattern.narrow(subject).map(run)));
        self
    }

    pub(crate) fn test<T, F>(mut self, test: T, run: F) -> Self
    where
        T: Fn(&Thrown) -> bool + 'a,
        F: FnOnce(Thrown) -> O + 'a,
    {
        self.arms.push(Box::new(move |subject| {
            if test(&subject) {
                Ok(run(subject))
            } else {
                Err(subject)
            }
        }));
        self
    }

    pub(crate) fn any_of<L, F>(self, run: F) -> Self
    where
        L: VariantList + 'a,
        F: FnOnce(Thrown) -> O + 'a,
    {
        self.test(L::contains, run)
    }

    pub(crate) fn none_of<L, F>(self, run: F) -> Self
    where
        L: VariantList + 'a,
        F: FnOnce(Thrown) -> O + 'a,
    {
        self.test(|subject| !L::contains(subject), run)
    }

    /// Replace the subject. Every rule sees the final subject, since none runs before the
    /// terminal call.
    pub(crate) fn map<F>(self, transform: F) -> Self
    where
        F: FnOnce(Thrown) -> Thrown,
    {
        Self {
            subject: transform(self.subject),
            arms: self.arms,
        }
    }

    /// Linear first-match scan. `Err` carries the untouched subject when no rule applied.
    pub(crate) fn dispatch(self) -> Result<O, Thrown> {
        let Self { mut subject, arms } = self;
        let total = arms.len();
        for (index, arm) in arms.into_iter().enumerate() {
            match arm(subject) {
                Ok(out) => {
                    tracing::trace!(rule = index, rules = total, "matched");
                    return Ok(out);
                }
                Err(back) => subject = back,
            }
        }
        tracing::trace!(rules = total, tag = ?subject.tag(), "no rule matched");
        Err(subject)
    }
}

/// The fatal signal of an exhaustive matcher that ran out of rules.
pub(crate) fn non_exhaustive(subject: Thrown) -> Error {
    let err = Error::NonExhaustive {
        tag: subject.tag().map(str::to_string),
        subject: subject.to_string(),
    };
    tracing::error!(error = %err, "exhaustive matcher fell through every rule");
    err
}
