//! Generic combinator for assembling store middleware.
//!
//! A layer wraps a store with extra behaviour and hands back a new store,
//! the same way tower layers wrap services. `chain` applies layers so that
//! the first-listed layer ends up outermost:
//! `chain(raw, (a, b))` builds `a(b(raw))`.

/// A decorator over some store type `S`.
pub trait StoreLayer<S> {
    type Output;

    fn layer(self, inner: S) -> Self::Output;
}

/// Wrap `base` with `layers`, first layer outermost.
pub fn chain<S, L: StoreLayer<S>>(base: S, layers: L) -> L::Output {
    layers.layer(base)
}

impl<S, A, B> StoreLayer<S> for (A, B)
where
    B: StoreLayer<S>,
    A: StoreLayer<B::Output>,
{
    type Output = A::Output;

    fn layer(self, inner: S) -> Self::Output {
        let (a, b) = self;
        a.layer(b.layer(inner))
    }
}

impl<S, A, B, C> StoreLayer<S> for (A, B, C)
where
    C: StoreLayer<S>,
    B: StoreLayer<C::Output>,
    A: StoreLayer<B::Output>,
{
    type Output = A::Output;

    fn layer(self, inner: S) -> Self::Output {
        let (a, b, c) = self;
        a.layer(b.layer(c.layer(inner)))
    }
}
