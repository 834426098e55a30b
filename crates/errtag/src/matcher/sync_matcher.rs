use std::marker::PhantomData;

use serde_json::Value;

use super::{Rules, non_exhaustive};
use crate::error::Error;
use crate::kind::{Kind, Tagged};
use crate::pattern::{Cons, Nil, Pattern, VariantList, WithoutAll};
use crate::thrown::Thrown;

/// Free-form matcher: any rules, terminated by [`Matcher::otherwise`].
#[must_use = "a matcher does nothing until `otherwise` is called"]
pub struct Matcher<'a, R> {
    rules: Rules<'a, R>,
}

impl<'a, R> Matcher<'a, R> {
    pub(crate) fn new(subject: Thrown) -> Self {
        Self {
            rules: Rules::new(subject),
        }
    }

    /// Variant rule (instance check) or guard rule, depending on `pattern`.
    pub fn with<P, F>(self, pattern: P, handler: F) -> Self
    where
        P: Pattern + 'a,
        F: FnOnce(P::Output) -> R + 'a,
    {
        Self {
            rules: self.rules.pattern(pattern, handler),
        }
    }

    /// Matches an instance of any listed variant.
    pub fn with_any<L, F>(self, _variants: L, handler: F) -> Self
    where
        L: VariantList + 'a,
        F: FnOnce(Thrown) -> R + 'a,
    {
        Self {
            rules: self.rules.any_of::<L, F>(handler),
        }
    }

    /// Matches anything that is not an instance of a listed variant.
    pub fn with_not<L, F>(self, _variants: L, handler: F) -> Self
    where
        L: VariantList + 'a,
        F: FnOnce(Thrown) -> R + 'a,
    {
        Self {
            rules: self.rules.none_of::<L, F>(handler),
        }
    }

    /// Matches an instance of `K` and hands only `data[key]` to the handler.
    pub fn select<K, F>(self, kind: K, key: &'a str, handler: F) -> Self
    where
        K: Kind,
        F: FnOnce(Value) -> R + 'a,
    {
        Self {
            rules: self
                .rules
                .pattern(kind, move |e: Tagged<K>| handler(e.field(key))),
        }
    }

    pub fn when<T, F>(self, predicate: T, handler: F) -> Self
    where
        T: Fn(&Thrown) -> bool + 'a,
        F: FnOnce(Thrown) -> R + 'a,
    {
        Self {
            rules: self.rules.test(predicate, handler),
        }
    }

    /// Replace the subject seen by every rule and by the fallback.
    pub fn map<F>(self, transform: F) -> Self
    where
        F: FnOnce(Thrown) -> Thrown,
    {
        Self {
            rules: self.rules.map(transform),
        }
    }

    /// Run the first matching rule, or `fallback` with the (possibly mapped) subject.
    pub fn otherwise<F>(self, fallback: F) -> R
    where
        F: FnOnce(Thrown) -> R,
    {
        self.rules.dispatch().unwrap_or_else(fallback)
    }
}

/// Exhaustive matcher. `Rem` is the type-level list of declared variants not yet handled;
/// [`ExhaustiveMatcher::exhaustive`] only exists once it is [`Nil`].
#[must_use = "a matcher does nothing until `exhaustive` is called"]
pub struct ExhaustiveMatcher<'a, Rem, R> {
    rules: Rules<'a, R>,
    _remaining: PhantomData<Rem>,
}

impl<'a, Rem, R> ExhaustiveMatcher<'a, Rem, R> {
    pub(crate) fn new(subject: Thrown) -> Self {
        Self::from_rules(Rules::new(subject))
    }

    fn from_rules(rules: Rules<'a, R>) -> Self {
        Self {
            rules,
            _remaining: PhantomData,
        }
    }

    /// Variant rules remove their variant from the remaining set; guard rules remove nothing.
    pub fn with<P, Is, F>(
        self,
        pattern: P,
        handler: F,
    ) -> ExhaustiveMatcher<'a, <Rem as WithoutAll<P::Covers, Is>>::Rest, R>
    where
        P: Pattern + 'a,
        Rem: WithoutAll<P::Covers, Is>,
        F: FnOnce(P::Output) -> R + 'a,
    {
        ExhaustiveMatcher::from_rules(self.rules.pattern(pattern, handler))
    }

    /// Removes every listed variant from the remaining set.
    pub fn with_any<L, Is, F>(
        self,
        _variants: L,
        handler: F,
    ) -> ExhaustiveMatcher<'a, <Rem as WithoutAll<L::Kinds, Is>>::Rest, R>
    where
        L: VariantList + 'a,
        Rem: WithoutAll<L::Kinds, Is>,
        F: FnOnce(Thrown) -> R + 'a,
    {
        ExhaustiveMatcher::from_rules(self.rules.any_of::<L, F>(handler))
    }

    /// Removes nothing: "everything but these" is not a fixed set of variants.
    pub fn with_not<L, F>(self, _variants: L, handler: F) -> Self
    where
        L: VariantList + 'a,
        F: FnOnce(Thrown) -> R + 'a,
    {
        Self::from_rules(self.rules.none_of::<L, F>(handler))
    }

    pub fn select<K, Is, F>(
        self,
        kind: K,
        key: &'a str,
        handler: F,
    ) -> ExhaustiveMatcher<'a, <Rem as WithoutAll<Cons<K, Nil>, Is>>::Rest, R>
    where
        K: Kind,
        Rem: WithoutAll<Cons<K, Nil>, Is>,
        F: FnOnce(Value) -> R + 'a,
    {
        ExhaustiveMatcher::from_rules(
            self.rules
                .pattern(kind, move |e: Tagged<K>| handler(e.field(key))),
        )
    }

    pub fn when<T, F>(self, predicate: T, handler: F) -> Self
    where
        T: Fn(&Thrown) -> bool + 'a,
        F: FnOnce(Thrown) -> R + 'a,
    {
        Self::from_rules(self.rules.test(predicate, handler))
    }

    pub fn map<F>(self, transform: F) -> Self
    where
        F: FnOnce(Thrown) -> Thrown,
    {
        Self::from_rules(self.rules.map(transform))
    }
}

impl<'a, R> ExhaustiveMatcher<'a, Nil, R> {
    /// Run the first matching rule. Reaching the end means a value outside the declared set
    /// arrived here, reported as [`Error::NonExhaustive`].
    pub fn exhaustive(self) -> Result<R, Error> {
        self.rules.dispatch().map_err(non_exhaustive)
    }
}
