use std::future::Future;
use std::marker::PhantomData;

use futures::future::{self, BoxFuture, FutureExt};
use serde_json::Value;

use super::{Rules, non_exhaustive};
use crate::error::Error;
use crate::kind::{Kind, Tagged};
use crate::pattern::{Cons, Nil, Pattern, VariantList, WithoutAll};
use crate::thrown::Thrown;

/// Free-form asynchronous matcher. Handlers return futures; only the chosen one is awaited.
#[must_use = "a matcher does nothing until `otherwise` is called"]
pub struct AsyncMatcher<'a, R> {
    rules: Rules<'a, BoxFuture<'a, R>>,
}

impl<'a, R> AsyncMatcher<'a, R> {
    pub(crate) fn new(subject: Thrown) -> Self {
        Self {
            rules: Rules::new(subject),
        }
    }

    pub fn with<P, F, Fut>(self, pattern: P, handler: F) -> Self
    where
        P: Pattern + 'a,
        F: FnOnce(P::Output) -> Fut + 'a,
        Fut: Future<Output = R> + Send + 'a,
    {
        Self {
            rules: self.rules.pattern(pattern, move |v| handler(v).boxed()),
        }
    }

    pub fn with_any<L, F, Fut>(self, _variants: L, handler: F) -> Self
    where
        L: VariantList + 'a,
        F: FnOnce(Thrown) -> Fut + 'a,
        Fut: Future<Output = R> + Send + 'a,
    {
        Self {
            rules: self.rules.any_of::<L, _>(move |v| handler(v).boxed()),
        }
    }

    pub fn with_not<L, F, Fut>(self, _variants: L, handler: F) -> Self
    where
        L: VariantList + 'a,
        F: FnOnce(Thrown) -> Fut + 'a,
        Fut: Future<Output = R> + Send + 'a,
    {
        Self {
            rules: self.rules.none_of::<L, _>(move |v| handler(v).boxed()),
        }
    }

    pub fn select<K, F, Fut>(self, kind: K, key: &'a str, handler: F) -> Self
    where
        K: Kind,
        F: FnOnce(Value) -> Fut + 'a,
        Fut: Future<Output = R> + Send + 'a,
    {
        Self {
            rules: self
                .rules
                .pattern(kind, move |e: Tagged<K>| handler(e.field(key)).boxed()),
        }
    }

    pub fn when<T, F, Fut>(self, predicate: T, handler: F) -> Self
    where
        T: Fn(&Thrown) -> bool + 'a,
        F: FnOnce(Thrown) -> Fut + 'a,
        Fut: Future<Output = R> + Send + 'a,
    {
        Self {
            rules: self.rules.test(predicate, move |v| handler(v).boxed()),
        }
    }

    pub fn map<F>(self, transform: F) -> Self
    where
        F: FnOnce(Thrown) -> Thrown,
    {
        Self {
            rules: self.rules.map(transform),
        }
    }

    /// Pick the first matching rule (or `fallback`) now; the returned future runs its handler.
    pub fn otherwise<F, Fut>(self, fallback: F) -> BoxFuture<'a, R>
    where
        F: FnOnce(Thrown) -> Fut,
        Fut: Future<Output = R> + Send + 'a,
    {
        match self.rules.dispatch() {
            Ok(fut) => fut,
            Err(subject) => fallback(subject).boxed(),
        }
    }
}

/// Exhaustive asynchronous matcher; see [`super::ExhaustiveMatcher`] for the tracking rules.
#[must_use = "a matcher does nothing until `exhaustive` is called"]
pub struct AsyncExhaustiveMatcher<'a, Rem, R> {
    rules: Rules<'a, BoxFuture<'a, R>>,
    _remaining: PhantomData<Rem>,
}

impl<'a, Rem, R> AsyncExhaustiveMatcher<'a, Rem, R> {
    pub(crate) fn new(subject: Thrown) -> Self {
        Self::from_rules(Rules::new(subject))
    }

    fn from_rules(rules: Rules<'a, BoxFuture<'a, R>>) -> Self {
        Self {
            rules,
            _remaining: PhantomData,
        }
    }

    pub fn with<P, Is, F, Fut>(
        self,
        pattern: P,
        handler: F,
    ) -> AsyncExhaustiveMatcher<'a, <Rem as WithoutAll<P::Covers, Is>>::Rest, R>
    where
        P: Pattern + 'a,
        Rem: WithoutAll<P::Covers, Is>,
        F: FnOnce(P::Output) -> Fut + 'a,
        Fut: Future<Output = R> + Send + 'a,
    {
        AsyncExhaustiveMatcher::from_rules(
            self.rules.pattern(pattern, move |v| handler(v).boxed()),
        )
    }

    pub fn with_any<L, Is, F, Fut>(
        self,
        _variants: L,
        handler: F,
    ) -> AsyncExhaustiveMatcher<'a, <Rem as WithoutAll<L::Kinds, Is>>::Rest, R>
    where
        L: VariantList + 'a,
        Rem: WithoutAll<L::Kinds, Is>,
        F: FnOnce(Thrown) -> Fut + 'a,
        Fut: Future<Output = R> + Send + 'a,
    {
        AsyncExhaustiveMatcher::from_rules(
            self.rules.any_of::<L, _>(move |v| handler(v).boxed()),
        )
    }

    pub fn with_not<L, F, Fut>(self, _variants: L, handler: F) -> Self
    where
        L: VariantList + 'a,
        F: FnOnce(Thrown) -> Fut + 'a,
        Fut: Future<Output = R> + Send + 'a,
    {
        Self::from_rules(self.rules.none_of::<L, _>(move |v| handler(v).boxed()))
    }

    pub fn select<K, Is, F, Fut>(
        self,
        kind: K,
        key: &'a str,
        handler: F,
    ) -> AsyncExhaustiveMatcher<'a, <Rem as WithoutAll<Cons<K, Nil>, Is>>::Rest, R>
    where
        K: Kind,
        Rem: WithoutAll<Cons<K, Nil>, Is>,
        F: FnOnce(Value) -> Fut + 'a,
        Fut: Future<Output = R> + Send + 'a,
    {
        AsyncExhaustiveMatcher::from_rules(
            self.rules
                .pattern(kind, move |e: Tagged<K>| handler(e.field(key)).boxed()),
        )
    }

    pub fn when<T, F, Fut>(self, predicate: T, handler: F) -> Self
    where
        T: Fn(&Thrown) -> bool + 'a,
        F: FnOnce(Thrown) -> Fut + 'a,
        Fut: Future<Output = R> + Send + 'a,
    {
        Self::from_rules(self.rules.test(predicate, move |v| handler(v).boxed()))
    }

    pub fn map<F>(self, transform: F) -> Self
    where
        F: FnOnce(Thrown) -> Thrown,
    {
        Self::from_rules(self.rules.map(transform))
    }
}

impl<'a, R> AsyncExhaustiveMatcher<'a, Nil, R>
where
    R: Send + 'a,
{
    /// Resolves to [`Error::NonExhaustive`] when no rule accepts the subject.
    pub fn exhaustive(self) -> BoxFuture<'a, Result<R, Error>> {
        match self.rules.dispatch() {
            Ok(fut) => fut.map(Ok).boxed(),
            Err(subject) => future::ready(Err(non_exhaustive(subject))).boxed(),
        }
    }
}
