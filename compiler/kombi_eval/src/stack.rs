//! Native stack growth for deep reductions.
//!
//! Reduction recurses into the function position of apply-nodes, into
//! forced arguments and into body results. Each of those steps goes
//! through [`ensure_sufficient_stack`], which moves execution onto a fresh
//! stack segment when the current one runs low.

/// Remaining stack below which a new segment is allocated.
#[cfg(not(target_arch = "wasm32"))]
const MIN_REMAINING: usize = 128 * 1024;

/// Size of each newly allocated segment.
#[cfg(not(target_arch = "wasm32"))]
const SEGMENT: usize = 2 * 1024 * 1024;

/// Run `f`, first switching to a new stack segment if fewer than
/// `MIN_REMAINING` bytes are left.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(MIN_REMAINING, SEGMENT, f)
}

/// wasm32 has no segmented stacks; run `f` in place.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
