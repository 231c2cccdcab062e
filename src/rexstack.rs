// rexstack.rs - Backtracking storage.
//
// RunStack holds continuation frames (choice points). PosStack holds the
// cursor offsets recorded by SavePos so JumpIfAdvanced can tell whether a
// repetition consumed anything. Both grow STACK_GROWTH entries at a time and
// are addressed by index only, so growth never invalidates a snapshot held
// in a frame.

use log::debug;

use crate::error::MatchError;
use crate::rexint::STACK_GROWTH;

/// Make room for one more entry, growing by a fixed increment when full.
fn reserve_one<T>(v: &mut Vec<T>, what: &str) -> Result<(), MatchError> {
    if v.len() == v.capacity() {
        v.try_reserve_exact(STACK_GROWTH)
            .map_err(|_| MatchError::Memory)?;
        debug!("rexstack: {} stack grown to {} entries", what, v.capacity());
    }
    Ok(())
}

// ============================================================================
// Continuation stack
// ============================================================================

/// A choice point: where to resume after a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Program index to resume at.
    pub pc: usize,
    /// Input cursor to restore.
    pub s: usize,
    /// PosStack head at push time.
    pub pos_top: usize,
    /// The head's link at push time.
    pub pos_link: usize,
    /// Unanchored flag at push time.
    pub unanchored: bool,
}

#[derive(Debug, Default)]
pub struct RunStack {
    frames: Vec<Frame>,
    // capacity boundary, refreshed after every growth
    limit: usize,
    frame_limit: usize,
    max_depth: usize,
}

impl RunStack {
    /// An unallocated stack. Storage is reserved on the first push.
    pub fn new(frame_limit: usize) -> Self {
        RunStack {
            frames: Vec::new(),
            limit: 0,
            frame_limit,
            max_depth: 0,
        }
    }

    /// Drop all frames, keeping the storage for reuse.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.max_depth = 0;
    }

    pub fn set_frame_limit(&mut self, n: usize) {
        self.frame_limit = n;
    }

    pub fn frame_limit(&self) -> usize {
        self.frame_limit
    }

    /// Number of live frames.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Current storage size in frames.
    pub fn capacity(&self) -> usize {
        self.limit
    }

    /// Deepest the stack got since the last reset.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[inline]
    pub fn push(&mut self, frame: Frame) -> Result<(), MatchError> {
        if self.frame_limit != 0 && self.frames.len() >= self.frame_limit {
            return Err(MatchError::MatchStackLimitOver);
        }
        if self.frames.len() == self.limit {
            reserve_one(&mut self.frames, "run")?;
            self.limit = self.frames.capacity();
        }
        self.frames.push(frame);
        if self.frames.len() > self.max_depth {
            self.max_depth = self.frames.len();
        }
        Ok(())
    }

    /// The most recent frame, or `None` at the empty sentinel.
    #[inline]
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }
}

// ============================================================================
// Position-save stack
// ============================================================================

/// Outcome of popping a saved position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// The cursor is where it was saved: zero-width iteration.
    Stalled,
    /// The cursor moved since the save.
    Progressed,
}

const NO_OWNER: usize = usize::MAX;

#[derive(Clone, Copy, Debug)]
struct PosEntry {
    pos: Option<usize>,
    // RunStack depth when the position was saved
    owner: usize,
    // distance down to the previous live entry
    prev_offset: usize,
}

impl PosEntry {
    const HEAD: PosEntry = PosEntry {
        pos: None,
        owner: NO_OWNER,
        prev_offset: 1,
    };
}

/// Saved cursor offsets, chained LIFO.
///
/// Index 0 is a permanent sentinel. `top` is a free head slot whose
/// `prev_offset` links to the newest live entry. An entry that a live
/// continuation frame may still restore is unlinked rather than discarded,
/// so a frame's `(pos_top, pos_link)` snapshot brings the chain back in
/// O(1).
#[derive(Debug, Default)]
pub struct PosStack {
    entries: Vec<PosEntry>,
    top: usize,
}

impl PosStack {
    /// An unallocated stack. Storage is reserved by the first reset.
    pub fn new() -> Self {
        PosStack {
            entries: Vec::new(),
            top: 0,
        }
    }

    /// Empty the chain down to the sentinel.
    pub fn reset(&mut self) -> Result<(), MatchError> {
        self.entries.clear();
        reserve_one(&mut self.entries, "position")?;
        self.entries.push(PosEntry {
            pos: None,
            owner: NO_OWNER,
            prev_offset: 0,
        });
        reserve_one(&mut self.entries, "position")?;
        self.entries.push(PosEntry::HEAD);
        self.top = 1;
        Ok(())
    }

    /// `(head index, head link)` for a continuation frame.
    #[inline]
    pub fn snapshot(&self) -> (usize, usize) {
        (self.top, self.entries[self.top].prev_offset)
    }

    /// Reinstate a snapshot taken by [`PosStack::snapshot`].
    #[inline]
    pub fn restore(&mut self, top: usize, link: usize) {
        self.top = top;
        self.entries[top].prev_offset = link;
    }

    /// Save `pos`, owned by the continuation frame depth `owner`.
    pub fn push(&mut self, pos: usize, owner: usize) -> Result<(), MatchError> {
        let head = self.top;
        self.entries[head].pos = Some(pos);
        self.entries[head].owner = owner;
        let next = head + 1;
        if next == self.entries.len() {
            reserve_one(&mut self.entries, "position")?;
            self.entries.push(PosEntry::HEAD);
        } else {
            // slots above the head are not referenced by any live frame
            self.entries[next] = PosEntry::HEAD;
        }
        self.top = next;
        Ok(())
    }

    /// Pop the newest saved position and compare it with `cursor`.
    ///
    /// `owner` is the current continuation depth: an entry saved at that
    /// depth cannot be needed by any live frame and is discarded, otherwise
    /// it is only unlinked. Returns `None` when nothing is saved.
    pub fn pop_if_same(&mut self, cursor: usize, owner: usize) -> Option<Advance> {
        let head = self.top;
        let prev = head - self.entries[head].prev_offset;
        let entry = self.entries[prev];
        let saved = entry.pos?;
        if entry.owner == owner {
            self.top = prev;
        } else {
            self.entries[head].prev_offset += entry.prev_offset;
        }
        if saved == cursor {
            Some(Advance::Stalled)
        } else {
            Some(Advance::Progressed)
        }
    }

    /// Saved positions reachable from the head, newest first.
    pub fn live(&self) -> Vec<usize> {
        let mut out = Vec::new();
        if self.entries.is_empty() {
            return out;
        }
        let mut i = self.top - self.entries[self.top].prev_offset;
        while let Some(pos) = self.entries[i].pos {
            out.push(pos);
            i -= self.entries[i].prev_offset;
        }
        out
    }

    /// Storage size in entries, sentinel and head included.
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }
}
