/// A named extraction step: returns `Some` when it recognises its input.
pub struct Strategy<I: ?Sized, O> {
    pub name: &'static str,
    pub run: fn(&I) -> Option<O>,
}

impl<I: ?Sized, O> Clone for Strategy<I, O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I: ?Sized, O> Copy for Strategy<I, O> {}

/// Run strategies in order; the first one that yields a value wins.
///
/// Returns the winning strategy's name alongside its output so callers can
/// report which fallback was taken.
pub fn first_success<I: ?Sized, O>(
    strategies: &[Strategy<I, O>],
    input: &I,
) -> Option<(&'static str, O)> {
    strategies
        .iter()
        .find_map(|strategy| (strategy.run)(input).map(|output| (strategy.name, output)))
}
