use std::any::Any;

use crate::kind::{Kind, Tagged};
use crate::matcher::{Matcher, match_error};
use crate::thrown::Thrown;
use crate::wrap::Outcome;

/// Extension trait bridging ordinary `Result`s into matching.
///
/// ```rust
/// use errtag::{define_error, Kind, ResultExt, Tagged};
///
/// define_error! {
///     pub Missing;
///     pub Locked;
/// }
///
/// let r: Result<u32, Tagged<Missing>> = Err(Missing::empty());
/// assert!(r.err_is::<Missing>());
/// let n = r.recover(|m| m.with(Missing, |_| 0).otherwise(|_| 1));
/// assert_eq!(n, 0);
/// ```
pub trait ResultExt<T>: Sized {
    /// Erase the error type.
    fn into_outcome(self) -> Outcome<T>;

    /// True when this is an error of variant `K`, or a [`Thrown`] structurally carrying its tag.
    fn err_is<K: Kind>(&self) -> bool;

    /// Resolve the error branch with a free-form matcher; a success passes through untouched.
    fn recover<'a, F>(self, handle: F) -> T
    where
        F: FnOnce(Matcher<'a, T>) -> T;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<Thrown> + 'static,
{
    fn into_outcome(self) -> Outcome<T> {
        self.map_err(Into::into)
    }

    fn err_is<K: Kind>(&self) -> bool {
        match self {
            Ok(_) => false,
            Err(e) => {
                let any = e as &dyn Any;
                match any.downcast_ref::<Thrown>() {
                    Some(thrown) => K::is(thrown),
                    None => any.is::<Tagged<K>>(),
                }
            }
        }
    }

    fn recover<'a, F>(self, handle: F) -> T
    where
        F: FnOnce(Matcher<'a, T>) -> T,
    {
        match self {
            Ok(value) => value,
            Err(e) => handle(match_error(e)),
        }
    }
}

/// Iterator helpers over `Result` to reduce boilerplate at boundaries.
///
/// - `collect_ok`: eagerly collects `Ok` items, returning the first failure
///   (equivalent to `collect::<Result<Vec<_>, _>>()` but clearer at call sites).
/// - `first_error`: scans and returns the first failure without allocation.
pub trait IterResultExt<T>: Sized {
    fn collect_ok(self) -> Outcome<Vec<T>>;
    fn first_error(self) -> Option<Thrown>;
}

impl<I, T, E> IterResultExt<T> for I
where
    I: IntoIterator<Item = Result<T, E>>,
    E: Into<Thrown>,
{
    fn collect_ok(self) -> Outcome<Vec<T>> {
        let mut out = Vec::new();
        for r in self {
            out.push(r.map_err(Into::into)?);
        }
        Ok(out)
    }

    fn first_error(self) -> Option<Thrown> {
        self.into_iter().find_map(|r| r.err()).map(Into::into)
    }
}
