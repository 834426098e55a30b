//! Turn fallible or panicking calls into an [`Outcome`] that never unwinds.
//!
//! A failure is anything the call produces instead of its value: an `Err`, a panic while
//! running it, or a panic while polling the future it returned. Whatever was raised comes back
//! unchanged in the `Err` branch; a value thrown with [`crate::raise`] is recovered as the same
//! [`Thrown`].
//!
//! ```rust
//! use errtag::{define_error, raise, wrap, Kind, Tagged};
//!
//! define_error! {
//!     pub Negative(i64);
//! }
//!
//! fn checked_sqrt(x: i64) -> Result<f64, Tagged<Negative>> {
//!     if x < 0 {
//!         raise(Negative::with_data(x));
//!     }
//!     Ok((x as f64).sqrt())
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let safe = wrap(|x: i64| async move { checked_sqrt(x) });
//! assert_eq!(safe(16).await.unwrap(), 4.0);
//! let err = safe(-1).await.unwrap_err();
//! assert!(Negative::is(&err));
//! # });
//! ```

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::future::{self, BoxFuture, FutureExt, Ready};

use crate::thrown::Thrown;

/// Success with a value, or failure with whatever was raised.
pub type Outcome<T> = Result<T, Thrown>;

/// Run `f` once, capturing both its `Err` and any panic.
pub fn capture<T, E, F>(f: F) -> Outcome<T>
where
    F: FnOnce() -> Result<T, E>,
    E: Into<Thrown>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(captured(error.into())),
        Err(payload) => Err(captured(Thrown::from_panic(payload))),
    }
}

/// Await `fut`, capturing both its `Err` and any panic raised while polling it.
pub async fn capture_async<T, E, Fut>(fut: Fut) -> Outcome<T>
where
    Fut: Future<Output = Result<T, E>>,
    E: Into<Thrown>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(captured(error.into())),
        Err(payload) => Err(captured(Thrown::from_panic(payload))),
    }
}

/// Wrap an async fallible function. Several parameters are passed as one tuple.
pub fn wrap<A, T, E, F, Fut>(f: F) -> impl Fn(A) -> BoxFuture<'static, Outcome<T>>
where
    F: Fn(A) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Into<Thrown> + Send + 'static,
{
    move |args| match panic::catch_unwind(AssertUnwindSafe(|| f(args))) {
        Ok(fut) => capture_async(fut).boxed(),
        Err(payload) => future::ready(Err(captured(Thrown::from_panic(payload)))).boxed(),
    }
}

/// Wrap a synchronous fallible function. The result is still awaited, like [`wrap`]'s.
pub fn wrap_sync<A, T, E, F>(f: F) -> impl Fn(A) -> Ready<Outcome<T>>
where
    F: Fn(A) -> Result<T, E>,
    E: Into<Thrown>,
{
    move |args| future::ready(capture(|| f(args)))
}

fn captured(thrown: Thrown) -> Thrown {
    tracing::debug!(error = %thrown, tag = ?thrown.tag(), "captured failure");
    thrown
}
