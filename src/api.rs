// api.rs - Configuration and sharing for matchers.
//
// MatcherBuilder configures a Matcher; MatcherPool hands matchers out to
// concurrent callers; `is_match` runs a one-off match on a fresh context.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};

use crate::error::MatchError;
use crate::rexexec::{default_stack_limit, Matcher};
use crate::rexint::{MatchOptions, Program};

/// Match `program` against `text` with a call-local [`Matcher`].
///
/// Convenient for one-off checks. Repeated matching should keep a
/// `Matcher` (or a [`MatcherPool`]) around so stack storage is reused.
///
/// ```
/// use rexmatch::prelude::*;
///
/// let prog = Program::new(vec![Op::str(b"ab"), Op::Accept], vec![]);
/// assert_eq!(is_match(&prog, b"xxabxx"), Ok(true));
/// ```
pub fn is_match(program: &Program, text: &[u8]) -> Result<bool, MatchError> {
    Matcher::new().is_match(program, text)
}

// === MatcherBuilder ===

/// Builder for a [`Matcher`] with custom limits and options.
///
/// # Examples
///
/// ```
/// use rexmatch::prelude::*;
///
/// let m = Matcher::builder()
///     .stack_limit(1000)
///     .literal_fast_path(false)
///     .build();
/// assert_eq!(m.stack_limit(), 1000);
/// assert!(m.options().contains(MatchOptions::NO_LITERAL_FAST_PATH));
/// ```
#[derive(Clone, Debug)]
pub struct MatcherBuilder {
    stack_limit: usize,
    options: MatchOptions,
}

impl Default for MatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MatcherBuilder {
    /// Start from the process-wide default stack limit and no options.
    pub fn new() -> Self {
        MatcherBuilder {
            stack_limit: default_stack_limit(),
            options: MatchOptions::empty(),
        }
    }

    /// Maximum number of continuation frames (0 = unlimited).
    pub fn stack_limit(mut self, n: usize) -> Self {
        self.stack_limit = n;
        self
    }

    /// Log each dispatched operation at `trace` level.
    pub fn trace(mut self, yes: bool) -> Self {
        self.options.set(MatchOptions::TRACE, yes);
        self
    }

    /// Answer `[literal, accept]` programs with a plain substring search
    /// (enabled by default).
    pub fn literal_fast_path(mut self, yes: bool) -> Self {
        self.options.set(MatchOptions::NO_LITERAL_FAST_PATH, !yes);
        self
    }

    /// Set raw option flags.
    pub fn option(mut self, flags: MatchOptions) -> Self {
        self.options |= flags;
        self
    }

    pub fn build(&self) -> Matcher {
        Matcher::with_config(self.stack_limit, self.options)
    }
}

// === MatcherPool ===

/// A set of idle matchers shared between threads.
///
/// Each [`MatcherPool::get`] takes an idle matcher (or builds one) and the
/// guard puts it back on drop, so stack storage is reused without any
/// matcher being used by two matches at once.
///
/// ```
/// use rexmatch::prelude::*;
///
/// let prog = Program::new(vec![Op::str(b"cd"), Op::Accept], vec![]);
/// let pool = MatcherPool::new();
/// std::thread::scope(|s| {
///     for text in [&b"abcd"[..], b"cdef", b"xyz"] {
///         let (pool, prog) = (&pool, &prog);
///         s.spawn(move || pool.is_match(prog, text));
///     }
/// });
/// assert!(pool.idle() >= 1);
/// ```
#[derive(Debug)]
pub struct MatcherPool {
    idle: Mutex<Vec<Matcher>>,
    template: MatcherBuilder,
}

impl Default for MatcherPool {
    fn default() -> Self {
        Self::new()
    }
}

impl MatcherPool {
    pub fn new() -> Self {
        Self::with_builder(MatcherBuilder::new())
    }

    /// Pool whose new matchers are built from `template`.
    pub fn with_builder(template: MatcherBuilder) -> Self {
        MatcherPool {
            idle: Mutex::new(Vec::new()),
            template,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Matcher>> {
        // a panic mid-match leaves no shared state half-updated
        self.idle.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Borrow a matcher until the guard is dropped.
    pub fn get(&self) -> PoolGuard<'_> {
        let matcher = self.lock().pop().unwrap_or_else(|| self.template.build());
        PoolGuard {
            pool: self,
            matcher,
        }
    }

    pub fn is_match(&self, program: &Program, text: &[u8]) -> Result<bool, MatchError> {
        self.get().is_match(program, text)
    }

    /// Matchers currently waiting in the pool.
    pub fn idle(&self) -> usize {
        self.lock().len()
    }
}

/// A matcher on loan from a [`MatcherPool`].
#[derive(Debug)]
pub struct PoolGuard<'a> {
    pool: &'a MatcherPool,
    matcher: Matcher,
}

impl Deref for PoolGuard<'_> {
    type Target = Matcher;

    fn deref(&self) -> &Matcher {
        &self.matcher
    }
}

impl DerefMut for PoolGuard<'_> {
    fn deref_mut(&mut self) -> &mut Matcher {
        &mut self.matcher
    }
}

impl Drop for PoolGuard<'_> {
    fn drop(&mut self) {
        let matcher = std::mem::take(&mut self.matcher);
        self.pool.lock().push(matcher);
    }
}
