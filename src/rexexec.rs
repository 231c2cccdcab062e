// rexexec.rs - Match engine driver.
//
// Runs a Program against an input with explicit backtracking. Each dispatch
// yields Next, Fail or Accept; every Fail goes through `refill`, which
// resumes the newest continuation frame or ends the attempt with no match.
// The attempt starts in unanchored mode, so the first token may match
// anywhere in the input.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, trace, warn};

use crate::error::MatchError;
use crate::rexint::*;
use crate::rexstack::{Advance, Frame, PosStack, RunStack};
use crate::strscan;

// ============================================================================
// Global defaults
// ============================================================================

static MATCH_STACK_LIMIT: AtomicUsize = AtomicUsize::new(DEFAULT_MATCH_STACK_LIMIT_SIZE);

/// Set the continuation-frame limit given to matchers built from now on
/// (0 = unlimited). Existing matchers keep their limit.
pub fn set_default_stack_limit(n: usize) {
    MATCH_STACK_LIMIT.store(n, Ordering::Relaxed);
}

pub fn default_stack_limit() -> usize {
    MATCH_STACK_LIMIT.load(Ordering::Relaxed)
}

// ============================================================================
// Matcher
// ============================================================================

/// Counters from the most recent match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchStats {
    /// Operations dispatched.
    pub steps: u64,
    /// Failures resolved by resuming a continuation frame.
    pub backtracks: u64,
    /// Peak continuation depth.
    pub max_frames: usize,
    /// The program was answered by the substring scanner alone.
    pub fast_path: bool,
}

/// Reusable match context owning the backtracking stacks.
///
/// The stacks are allocated on first use and kept between calls. Matching
/// takes `&mut self`, so a matcher serves one match at a time; use one per
/// thread, or a [`MatcherPool`](crate::api::MatcherPool).
///
/// ```
/// use rexmatch::prelude::*;
///
/// let prog = Program::new(vec![Op::str(b"ab"), Op::Accept], vec![]);
/// let mut m = Matcher::new();
/// assert!(m.is_match(&prog, b"xxabxx").unwrap());
/// assert!(!m.is_match(&prog, b"xxaxbxx").unwrap());
/// ```
#[derive(Debug)]
pub struct Matcher {
    run: RunStack,
    pos: PosStack,
    options: MatchOptions,
    stats: MatchStats,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Next,
    Fail,
    Accept,
}

/// Where the attempt currently is.
#[derive(Clone, Copy, Debug)]
struct Thread {
    pc: usize,
    s: usize,
    unanchored: bool,
}

impl Matcher {
    /// A matcher with the default stack limit and no options.
    pub fn new() -> Self {
        Self::with_config(default_stack_limit(), MatchOptions::empty())
    }

    pub(crate) fn with_config(stack_limit: usize, options: MatchOptions) -> Self {
        Matcher {
            run: RunStack::new(stack_limit),
            pos: PosStack::new(),
            options,
            stats: MatchStats::default(),
        }
    }

    /// Start configuring a matcher.
    pub fn builder() -> crate::api::MatcherBuilder {
        crate::api::MatcherBuilder::new()
    }

    pub fn options(&self) -> MatchOptions {
        self.options
    }

    pub fn stack_limit(&self) -> usize {
        self.run.frame_limit()
    }

    /// Counters from the last call to [`Matcher::is_match`].
    pub fn last_stats(&self) -> MatchStats {
        self.stats
    }

    /// Test whether `program` matches `text`.
    ///
    /// `Ok(false)` is an ordinary mismatch. Errors report a malformed
    /// program or exhausted stack space; the matcher stays usable either
    /// way.
    pub fn is_match(&mut self, program: &Program, text: &[u8]) -> Result<bool, MatchError> {
        self.stats = MatchStats::default();

        if !self.options.contains(MatchOptions::NO_LITERAL_FAST_PATH) {
            if let Some(lit) = program.literal_fast_path() {
                self.stats.fast_path = true;
                let found = strscan::find(text, lit).is_some();
                debug!(
                    "rexexec: literal fast path, {} bytes in {} -> {}",
                    lit.len(),
                    text.len(),
                    found
                );
                return Ok(found);
            }
        }

        let result = self.run_program(program, text);
        self.stats.max_frames = self.run.max_depth();
        match &result {
            Ok(found) => debug!(
                "rexexec: {} after {} steps, {} backtracks, {} frames",
                if *found { "match" } else { "no match" },
                self.stats.steps,
                self.stats.backtracks,
                self.stats.max_frames
            ),
            Err(e @ MatchError::CorruptProgram { .. }) => warn!("rexexec: {}", e),
            Err(e) => debug!("rexexec: aborted: {}", e),
        }
        result
    }

    fn run_program(&mut self, program: &Program, text: &[u8]) -> Result<bool, MatchError> {
        self.run.reset();
        self.pos.reset()?;

        let mut t = Thread {
            pc: 0,
            s: 0,
            unanchored: true,
        };
        loop {
            self.stats.steps += 1;
            match self.step(program, text, &mut t)? {
                Step::Next => {}
                Step::Accept => return Ok(true),
                Step::Fail => {
                    if !self.refill(&mut t) {
                        return Ok(false);
                    }
                }
            }
        }
    }

    /// Resume the newest continuation. `false` when none is left.
    fn refill(&mut self, t: &mut Thread) -> bool {
        let Some(frame) = self.run.pop() else {
            return false;
        };
        t.pc = frame.pc;
        t.s = frame.s;
        t.unanchored = frame.unanchored;
        self.pos.restore(frame.pos_top, frame.pos_link);
        self.stats.backtracks += 1;
        true
    }

    #[inline]
    fn push(&mut self, pc: usize, s: usize, unanchored: bool) -> Result<(), MatchError> {
        let (pos_top, pos_link) = self.pos.snapshot();
        self.run.push(Frame {
            pc,
            s,
            pos_top,
            pos_link,
            unanchored,
        })
    }

    /// Prefer the jump target, queueing the next op. An accept in the
    /// queued slot means the match already succeeded.
    fn take_jump(&mut self, program: &Program, t: &mut Thread, offset: i32) -> Result<Step, MatchError> {
        let target = program.jump_target(t.pc, offset)?;
        let next = t.pc + 1;
        match program.op(next) {
            Some(Op::Accept) => return Ok(Step::Accept),
            Some(_) => {}
            None => return Err(MatchError::corrupt(t.pc, "fallthrough past the end")),
        }
        self.push(next, t.s, t.unanchored)?;
        t.pc = target;
        Ok(Step::Next)
    }

    fn step(&mut self, program: &Program, text: &[u8], t: &mut Thread) -> Result<Step, MatchError> {
        let pc = t.pc;
        let op = program
            .op(pc)
            .ok_or_else(|| MatchError::corrupt(pc, "program position past the end"))?;
        if self.options.contains(MatchOptions::TRACE) {
            trace!(
                "rexexec: {:>4} s={:<4} u={} frames={} {}",
                pc,
                t.s,
                t.unanchored as u8,
                self.run.depth(),
                op
            );
        }
        let str_end = text.len();

        match (op, t.unanchored) {
            // ---- literal ----
            (Op::Str { lit, end: false }, false) => {
                if !text[t.s..].starts_with(lit) {
                    return Ok(Step::Fail);
                }
                t.s += lit.len();
                t.pc += 1;
            }
            (Op::Str { lit, end: true }, false) => {
                if text[t.s..] != lit[..] {
                    return Ok(Step::Fail);
                }
                t.s = str_end;
                t.pc += 1;
            }
            (Op::Str { lit, end: false }, true) => {
                let Some(at) = strscan::find_from(text, lit, t.s) else {
                    return Ok(Step::Fail);
                };
                // a later occurrence may still work if this one fails downstream
                self.push(pc, at + 1, true)?;
                t.s = at + lit.len();
                t.pc += 1;
                t.unanchored = false;
            }
            (Op::Str { lit, end: true }, true) => {
                if !text[t.s..].ends_with(lit) {
                    return Ok(Step::Fail);
                }
                t.s = str_end;
                t.pc += 1;
                t.unanchored = false;
            }

            // ---- char class ----
            (Op::Class { class, end }, unanchored) => {
                let set = program.class(*class).ok_or_else(|| {
                    MatchError::corrupt(pc, format!("class #{} out of range", class.0))
                })?;
                match (*end, unanchored) {
                    (false, false) => {
                        if t.s >= str_end || !set.contains(text[t.s]) {
                            return Ok(Step::Fail);
                        }
                        t.s += 1;
                    }
                    (true, false) => {
                        if t.s + 1 != str_end || !set.contains(text[t.s]) {
                            return Ok(Step::Fail);
                        }
                        t.s = str_end;
                    }
                    (false, true) => {
                        let Some(off) = text[t.s..].iter().position(|&b| set.contains(b)) else {
                            return Ok(Step::Fail);
                        };
                        let next = t.s + off + 1;
                        self.push(pc, next, true)?;
                        t.s = next;
                        t.unanchored = false;
                    }
                    (true, true) => {
                        if t.s >= str_end || !set.contains(text[str_end - 1]) {
                            return Ok(Step::Fail);
                        }
                        t.s = str_end;
                        t.unanchored = false;
                    }
                }
                t.pc += 1;
            }

            // ---- any byte ----
            (Op::Any { end: false }, false) => {
                if t.s >= str_end {
                    return Ok(Step::Fail);
                }
                t.s += 1;
                t.pc += 1;
            }
            (Op::Any { end: true }, false) => {
                if t.s + 1 != str_end {
                    return Ok(Step::Fail);
                }
                t.s = str_end;
                t.pc += 1;
            }
            (Op::Any { end: false }, true) => {
                if t.s >= str_end {
                    return Ok(Step::Fail);
                }
                t.s += 1;
                self.push(pc, t.s, true)?;
                t.pc += 1;
                t.unanchored = false;
            }
            (Op::Any { end: true }, true) => {
                if t.s >= str_end {
                    return Ok(Step::Fail);
                }
                t.s = str_end;
                t.pc += 1;
                t.unanchored = false;
            }

            // ---- anchors ----
            (Op::Start { end }, _) => {
                if t.s != 0 || (*end && str_end != 0) {
                    return Ok(Step::Fail);
                }
                t.pc += 1;
                t.unanchored = false;
            }
            (Op::End, false) => {
                if t.s < str_end {
                    return Ok(Step::Fail);
                }
                t.pc += 1;
            }
            (Op::End, true) => {
                // the skipped bytes are absorbed by unanchored mode
                t.s = str_end;
                t.pc += 1;
                t.unanchored = false;
            }

            // ---- control ----
            (Op::Unanchor, _) => {
                t.unanchored = true;
                t.pc += 1;
            }
            (Op::Jump(off), _) => {
                t.pc = program.jump_target(pc, *off)?;
            }
            (Op::SavePos, _) => {
                self.pos.push(t.s, self.run.depth())?;
                t.pc += 1;
            }
            (Op::BranchFirst(off), _) => {
                let target = program.jump_target(pc, *off)?;
                if program.op(target).is_some_and(Op::is_accept) {
                    return Ok(Step::Accept);
                }
                self.push(target, t.s, t.unanchored)?;
                t.pc += 1;
            }
            (Op::JumpIfAdvanced(off), _) => match self.pos.pop_if_same(t.s, self.run.depth()) {
                None => {
                    return Err(MatchError::corrupt(
                        pc,
                        "jump_if_advanced without a saved position",
                    ))
                }
                Some(Advance::Stalled) => t.pc += 1,
                Some(Advance::Progressed) => return self.take_jump(program, t, *off),
            },
            (Op::JumpFirst(off), _) => return self.take_jump(program, t, *off),
            (Op::Accept, _) => return Ok(Step::Accept),
        }
        Ok(Step::Next)
    }
}
