// rexint.rs - Program model consumed by the matcher.
// Operations, 256-bit byte-class tables, match options, and a builder
// for assembling programs with relative jumps.

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::error::MatchError;

// === Config Constants ===
/// Entries added to a backtracking stack each time it fills up.
pub const STACK_GROWTH: usize = 16;
/// Default continuation-frame limit for new matchers (0 = unlimited).
pub const DEFAULT_MATCH_STACK_LIMIT_SIZE: usize = 0;

bitflags! {
    /// Per-matcher behavior switches.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MatchOptions: u32 {
        /// Log every dispatched operation at `trace` level.
        const TRACE = 1 << 0;
        /// Run `[literal, accept]` programs through the general dispatch
        /// loop instead of the substring scanner.
        const NO_LITERAL_FAST_PATH = 1 << 1;
    }
}

// === ByteClass (256 bits, one per byte value) ===
pub const BITS_IN_ROOM: usize = 32;
pub const CLASS_ROOMS: usize = 256 / BITS_IN_ROOM;

#[inline]
fn room(b: u8) -> usize {
    (b as usize) >> 5
}

#[inline]
fn bit(b: u8) -> u32 {
    1u32 << (b & 0x1f)
}

/// Membership table for a character class over single bytes.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ByteClass {
    bits: [u32; CLASS_ROOMS],
}

impl ByteClass {
    /// An empty class.
    pub const fn new() -> Self {
        ByteClass {
            bits: [0; CLASS_ROOMS],
        }
    }

    /// A class containing exactly `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut class = Self::new();
        for &b in bytes {
            class.insert(b);
        }
        class
    }

    /// A class containing the inclusive range `lo..=hi`.
    pub fn from_range(lo: u8, hi: u8) -> Self {
        let mut class = Self::new();
        class.insert_range(lo, hi);
        class
    }

    #[inline]
    pub fn insert(&mut self, b: u8) {
        self.bits[room(b)] |= bit(b);
    }

    /// Insert every byte in `lo..=hi`. Does nothing when `lo > hi`.
    pub fn insert_range(&mut self, lo: u8, hi: u8) {
        for b in lo..=hi {
            self.insert(b);
        }
    }

    #[inline]
    pub fn remove(&mut self, b: u8) {
        self.bits[room(b)] &= !bit(b);
    }

    /// Invert membership of every byte (`[^...]`).
    pub fn negate(&mut self) {
        for r in self.bits.iter_mut() {
            *r = !*r;
        }
    }

    pub fn negated(mut self) -> Self {
        self.negate();
        self
    }

    #[inline]
    pub fn contains(&self, b: u8) -> bool {
        (self.bits[room(b)] & bit(b)) != 0
    }

    pub fn count(&self) -> usize {
        self.bits.iter().map(|r| r.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&r| r == 0)
    }

    /// Iterate member bytes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=255u8).filter(move |&b| self.contains(b))
    }

    /// Member bytes collapsed into inclusive ranges, ascending.
    pub fn ranges(&self) -> Vec<(u8, u8)> {
        let mut out: Vec<(u8, u8)> = Vec::new();
        for b in self.iter() {
            if let Some((_, hi)) = out.last_mut() {
                if *hi as u16 + 1 == b as u16 {
                    *hi = b;
                    continue;
                }
            }
            out.push((b, b));
        }
        out
    }
}

/// Index of a [`ByteClass`] in [`Program::classes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

impl ClassId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Literal operand bytes. Short literals stay inline.
pub type Literal = SmallVec<[u8; 16]>;

/// One matcher operation.
///
/// `end` marks a token that must finish exactly at the end of the input.
/// Jump offsets are relative to the operation's own index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    /// Literal byte string.
    Str { lit: Literal, end: bool },
    /// One byte from a class table.
    Class { class: ClassId, end: bool },
    /// Any single byte.
    Any { end: bool },
    /// `^`. With `end`, the input must also be empty.
    Start { end: bool },
    /// `$`.
    End,
    /// Let the next token match at any later position.
    Unanchor,
    /// Unconditional jump.
    Jump(i32),
    /// Record the cursor for a later `JumpIfAdvanced`.
    SavePos,
    /// Continue at the next op; queue the jump target as fallback.
    BranchFirst(i32),
    /// Take the jump (like `JumpFirst`) only if the cursor moved since the
    /// matching `SavePos`; otherwise fall through.
    JumpIfAdvanced(i32),
    /// Take the jump; queue the next op as fallback.
    JumpFirst(i32),
    /// Overall success.
    Accept,
}

impl Op {
    /// Build a literal op from a byte slice.
    pub fn str(bytes: &[u8]) -> Op {
        Op::Str {
            lit: Literal::from_slice(bytes),
            end: false,
        }
    }

    /// Relative jump offset, for the jumping kinds.
    pub fn jump_offset(&self) -> Option<i32> {
        match *self {
            Op::Jump(off)
            | Op::BranchFirst(off)
            | Op::JumpIfAdvanced(off)
            | Op::JumpFirst(off) => Some(off),
            _ => None,
        }
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, Op::Accept)
    }
}

/// A compiled, immutable matcher program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    ops: Vec<Op>,
    classes: Vec<ByteClass>,
}

impl Program {
    /// Wrap compiler output as-is. Defects surface as
    /// [`MatchError::CorruptProgram`] when the bad op is reached; call
    /// [`Program::validate`] to check up front.
    pub fn new(ops: Vec<Op>, classes: Vec<ByteClass>) -> Self {
        Program { ops, classes }
    }

    pub fn builder() -> ProgramBuilder {
        ProgramBuilder::new()
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn classes(&self) -> &[ByteClass] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[inline]
    pub fn op(&self, pc: usize) -> Option<&Op> {
        self.ops.get(pc)
    }

    #[inline]
    pub fn class(&self, id: ClassId) -> Option<&ByteClass> {
        self.classes.get(id.index())
    }

    /// Resolve the jump at `pc` by `offset`, rejecting targets outside the
    /// program.
    #[inline]
    pub(crate) fn jump_target(&self, pc: usize, offset: i32) -> Result<usize, MatchError> {
        let target = pc as i64 + offset as i64;
        if target < 0 || target >= self.ops.len() as i64 {
            return Err(MatchError::corrupt(
                pc,
                format!("jump target {} out of range 0..{}", target, self.ops.len()),
            ));
        }
        Ok(target as usize)
    }

    /// The literal of a `[literal, accept]` program, if this is one.
    pub fn literal_fast_path(&self) -> Option<&[u8]> {
        match self.ops.as_slice() {
            [Op::Str { lit, end: false }, Op::Accept, ..] => Some(lit.as_slice()),
            _ => None,
        }
    }

    /// Check every jump target and class reference, and that control can
    /// never run past the last op.
    pub fn validate(&self) -> Result<(), MatchError> {
        if !self.ops.iter().any(Op::is_accept) {
            return Err(MatchError::corrupt(self.ops.len(), "program has no accept"));
        }
        for (pc, op) in self.ops.iter().enumerate() {
            if let Some(off) = op.jump_offset() {
                self.jump_target(pc, off)?;
            }
            if let Op::Class { class, .. } = op {
                if self.class(*class).is_none() {
                    return Err(MatchError::corrupt(
                        pc,
                        format!("class #{} out of range", class.0),
                    ));
                }
            }
        }
        let last = self.ops.len() - 1;
        match self.ops[last] {
            Op::Accept | Op::Jump(_) => Ok(()),
            _ => Err(MatchError::corrupt(last, "falls through past the end")),
        }
    }
}

// === ProgramBuilder ===

/// Assembles a [`Program`] op by op.
///
/// Jump offsets are relative; [`ProgramBuilder::len`] gives the index the
/// next op will get, and [`ProgramBuilder::patch`] fixes up forward jumps.
///
/// ```
/// use rexmatch::rexint::{ByteClass, Program};
///
/// // ^[0-9]+$
/// let mut b = Program::builder();
/// let digit = b.add_class(ByteClass::from_range(b'0', b'9'));
/// b.start();
/// let top = b.save_pos();
/// b.class(digit);
/// b.jump_if_advanced_to(top);
/// b.end();
/// b.accept();
/// let prog = b.build().unwrap();
/// assert_eq!(prog.len(), 6);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ProgramBuilder {
    ops: Vec<Op>,
    classes: Vec<ByteClass>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the next op to be pushed.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Append `op`, returning its index.
    pub fn push(&mut self, op: Op) -> usize {
        self.ops.push(op);
        self.ops.len() - 1
    }

    /// Register a class table, returning its id.
    pub fn add_class(&mut self, class: ByteClass) -> ClassId {
        self.classes.push(class);
        ClassId((self.classes.len() - 1) as u32)
    }

    pub fn literal(&mut self, bytes: &[u8]) -> usize {
        self.push(Op::str(bytes))
    }

    pub fn literal_end(&mut self, bytes: &[u8]) -> usize {
        self.push(Op::Str {
            lit: Literal::from_slice(bytes),
            end: true,
        })
    }

    pub fn class(&mut self, class: ClassId) -> usize {
        self.push(Op::Class { class, end: false })
    }

    pub fn class_end(&mut self, class: ClassId) -> usize {
        self.push(Op::Class { class, end: true })
    }

    pub fn any(&mut self) -> usize {
        self.push(Op::Any { end: false })
    }

    pub fn any_end(&mut self) -> usize {
        self.push(Op::Any { end: true })
    }

    pub fn start(&mut self) -> usize {
        self.push(Op::Start { end: false })
    }

    pub fn start_end(&mut self) -> usize {
        self.push(Op::Start { end: true })
    }

    pub fn end(&mut self) -> usize {
        self.push(Op::End)
    }

    pub fn unanchor(&mut self) -> usize {
        self.push(Op::Unanchor)
    }

    pub fn save_pos(&mut self) -> usize {
        self.push(Op::SavePos)
    }

    pub fn accept(&mut self) -> usize {
        self.push(Op::Accept)
    }

    pub fn jump(&mut self, offset: i32) -> usize {
        self.push(Op::Jump(offset))
    }

    pub fn branch_first(&mut self, offset: i32) -> usize {
        self.push(Op::BranchFirst(offset))
    }

    pub fn jump_first(&mut self, offset: i32) -> usize {
        self.push(Op::JumpFirst(offset))
    }

    pub fn jump_if_advanced(&mut self, offset: i32) -> usize {
        self.push(Op::JumpIfAdvanced(offset))
    }

    /// Backward `JumpIfAdvanced` to an already-pushed op.
    pub fn jump_if_advanced_to(&mut self, target: usize) -> usize {
        let pc = self.len();
        self.jump_if_advanced(target as i32 - pc as i32)
    }

    /// Point the jump at `pc` to `target`. Returns `false` if `pc` is not a
    /// jumping op.
    pub fn patch(&mut self, pc: usize, target: usize) -> bool {
        let offset = target as i32 - pc as i32;
        match self.ops.get_mut(pc) {
            Some(Op::Jump(off))
            | Some(Op::BranchFirst(off))
            | Some(Op::JumpIfAdvanced(off))
            | Some(Op::JumpFirst(off)) => {
                *off = offset;
                true
            }
            _ => false,
        }
    }

    /// Validate and return the program.
    pub fn build(self) -> Result<Program, MatchError> {
        let prog = self.build_unchecked();
        prog.validate()?;
        Ok(prog)
    }

    pub fn build_unchecked(self) -> Program {
        Program::new(self.ops, self.classes)
    }
}
