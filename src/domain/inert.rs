// ============================================================
// Domain — Inert Placeholder
// ============================================================
// Stands in for optional collaborators (loggers, trackers)
// that are not installed. Every use of it is a no-op.

use std::ops::Index;

/// A stand-in used where an optional collaborator is not installed.
///
/// Construction ignores its arguments; calling it, reading any named
/// attribute or indexing it all hand back the same instance, so chained
/// use such as `logger.attr("run").call(step)[0]` is a no-op.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Inert;

impl Inert {
    pub fn new<A>(_args: A) -> Self {
        Inert
    }

    pub fn call<A>(&self, _args: A) -> &Self {
        self
    }

    pub fn attr(&self, _name: &str) -> &Self {
        self
    }
}

impl<I> Index<I> for Inert {
    type Output = Inert;

    fn index(&self, _index: I) -> &Inert {
        self
    }
}
