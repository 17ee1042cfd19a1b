//! Stack growth for the recursive walks over the AST.
//!
//! The parser and the evaluator recurse once per nesting level, and a debug
//! build on a 2 MB thread runs out of stack after a few hundred levels.
//! Wrapping each recursive entry point keeps a red zone free and grows the
//! stack on the heap when it gets close.

/// Run `f`, growing the stack first if less than the red zone is left.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Minimum stack space to keep available (128 KiB).
    const RED_ZONE: usize = 128 * 1024;

    /// Size of each newly allocated stack segment (1 MiB).
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
