//! What a matcher rule can test against, and the type-level bookkeeping behind exhaustive
//! matching.
//!
//! The variant set of an exhaustive matcher is a type-level list ([`Cons`]/[`Nil`]). Each
//! `with`/`select`/`with_any` removes the covered variants through [`WithoutAll`]; the index
//! parameters ([`Here`]/[`There`]) are inferred, so call sites never spell them out. A variant
//! that is not (or no longer) in the list has no `Without` impl, which turns "handled twice"
//! and "not declared" into compile errors.

use std::marker::PhantomData;

use crate::kind::{Kind, Tagged};
use crate::thrown::Thrown;

/// A boolean test over a subject. Object safe, so heterogeneous guards can share a slice.
pub trait Predicate {
    fn test(&self, subject: &Thrown) -> bool;
}

/// A rule head: tests the subject and narrows it into what the handler receives.
pub trait Pattern: Predicate {
    /// What the handler is called with.
    type Output;
    /// Variants removed from an exhaustive matcher's remaining set.
    type Covers;

    /// `Ok` when the pattern accepts the subject; otherwise the subject is handed back.
    fn narrow(&self, subject: Thrown) -> Result<Self::Output, Thrown>;
}

impl<K: Kind> Predicate for K {
    fn test(&self, subject: &Thrown) -> bool {
        subject.is::<Tagged<K>>()
    }
}

impl<K: Kind> Pattern for K {
    type Output = Tagged<K>;
    type Covers = Cons<K, Nil>;

    fn narrow(&self, subject: Thrown) -> Result<Tagged<K>, Thrown> {
        subject.downcast::<Tagged<K>>()
    }
}

/// An arbitrary boolean guard usable as a pattern. Covers no variants.
#[derive(Debug, Clone, Copy)]
pub struct Guard<F>(F);

pub fn guard<F>(test: F) -> Guard<F>
where
    F: Fn(&Thrown) -> bool,
{
    Guard(test)
}

impl<F> Predicate for Guard<F>
where
    F: Fn(&Thrown) -> bool,
{
    fn test(&self, subject: &Thrown) -> bool {
        (self.0)(subject)
    }
}

impl<F> Pattern for Guard<F>
where
    F: Fn(&Thrown) -> bool,
{
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

/// Empty type-level list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nil;

/// Type-level list node.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cons<H, T>(PhantomData<(H, T)>);

/// Index witness: the element is at the head.
pub struct Here;

/// Index witness: the element is somewhere in the tail.
pub struct There<I>(PhantomData<I>);

/// Remove `K` (found at index `I`) from a type-level list.
pub trait Without<K, I> {
    type Rest;
}

impl<K, T> Without<K, Here> for Cons<K, T> {
    type Rest = T;
}

impl<K, H, T, I> Without<K, There<I>> for Cons<H, T>
where
    T: Without<K, I>,
{
    type Rest = Cons<H, <T as Without<K, I>>::Rest>;
}

/// Remove every element of the list `L` (at indices `Is`).
pub trait WithoutAll<L, Is> {
    type Rest;
}

impl<S> WithoutAll<Nil, Nil> for S {
    type Rest = S;
}

impl<S, K, L, I, Is> WithoutAll<Cons<K, L>, Cons<I, Is>> for S
where
    S: Without<K, I>,
    <S as Without<K, I>>::Rest: WithoutAll<L, Is>,
{
    type Rest = <<S as Without<K, I>>::Rest as WithoutAll<L, Is>>::Rest;
}

/// Build a type-level variant list: `variants![A, B, C]`.
#[macro_export]
macro_rules! variants {
    () => { $crate::Nil };
    ($head:ty $(, $tail:ty)*) => {
        $crate::Cons<$head, $crate::variants!($($tail),*)>
    };
}

/// A fixed set of variants, written as a tuple of markers: `()`, `(A,)`, `(A, B)`, ...
pub trait VariantList {
    type Kinds;

    fn contains(subject: &Thrown) -> bool;
    fn tags() -> Vec<&'static str>;
}

impl VariantList for () {
    type Kinds = Nil;

    fn contains(_subject: &Thrown) -> bool {
        false
    }

    fn tags() -> Vec<&'static str> {
        Vec::new()
    }
}

macro_rules! impl_variant_list {
    ($($T:ident),+) => {
        impl<$($T: Kind),+> VariantList for ($($T,)+) {
            type Kinds = crate::variants!($($T),+);

            fn contains(subject: &Thrown) -> bool {
                $(subject.is::<Tagged<$T>>())||+
            }

            fn tags() -> Vec<&'static str> {
                vec![$($T::TAG),+]
            }
        }
    };
}

impl_variant_list!(A);
impl_variant_list!(A, B);
impl_variant_list!(A, B, C);
impl_variant_list!(A, B, C, D);
impl_variant_list!(A, B, C, D, E);
impl_variant_list!(A, B, C, D, E, F);
impl_variant_list!(A, B, C, D, E, F, G);
impl_variant_list!(A, B, C, D, E, F, G, H);
