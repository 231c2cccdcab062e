// rexdump.rs - Human-readable program listings.
//
// Used by trace logging and by embedders that want to inspect compiler
// output. Literal bytes are quoted with backslash and double quote escaped,
// printable ASCII verbatim, everything else as three-digit octal.

use std::fmt::{self, Write};

use crate::rexint::{ByteClass, Op, Program};

/// Quote `bytes` for display.
///
/// ```
/// use rexmatch::rexdump::escape_literal;
///
/// assert_eq!(escape_literal(b"a\"b\n"), r#""a\"b\012""#);
/// ```
pub fn escape_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for &b in bytes {
        push_escaped(&mut out, b);
    }
    out.push('"');
    out
}

fn push_escaped(out: &mut String, b: u8) {
    match b {
        b'\\' => out.push_str("\\\\"),
        b'"' => out.push_str("\\\""),
        32..=126 => out.push(b as char),
        _ => {
            let _ = write!(out, "\\{:03o}", b);
        }
    }
}

fn class_byte(out: &mut String, b: u8) {
    match b {
        b']' | b'-' | b'^' => {
            out.push('\\');
            out.push(b as char);
        }
        _ => push_escaped(out, b),
    }
}

/// Bracket notation for a class, e.g. `[0-9_a-f]`.
pub fn class_to_string(class: &ByteClass) -> String {
    let mut out = String::from("[");
    for (lo, hi) in class.ranges() {
        class_byte(&mut out, lo);
        if hi > lo {
            if hi > lo + 1 {
                out.push('-');
            }
            class_byte(&mut out, hi);
        }
    }
    out.push(']');
    out
}

impl fmt::Debug for ByteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteClass({})", class_to_string(self))
    }
}

fn end(f: &mut fmt::Formatter<'_>, on: bool) -> fmt::Result {
    if on {
        f.write_str(" $")
    } else {
        Ok(())
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Str { lit, end: e } => {
                write!(f, "str {}", escape_literal(lit))?;
                end(f, *e)
            }
            Op::Class { class, end: e } => {
                write!(f, "class #{}", class.0)?;
                end(f, *e)
            }
            Op::Any { end: e } => {
                f.write_str("any")?;
                end(f, *e)
            }
            Op::Start { end: e } => {
                f.write_str("start")?;
                end(f, *e)
            }
            Op::End => f.write_str("end"),
            Op::Unanchor => f.write_str("unanchor"),
            Op::Jump(off) => write!(f, "jump {:+}", off),
            Op::SavePos => f.write_str("save_pos"),
            Op::BranchFirst(off) => write!(f, "branch_first {:+}", off),
            Op::JumpIfAdvanced(off) => write!(f, "jump_if_advanced {:+}", off),
            Op::JumpFirst(off) => write!(f, "jump_first {:+}", off),
            Op::Accept => f.write_str("accept"),
        }
    }
}

impl fmt::Display for Program {
    /// One op per line with resolved jump targets, then the class table.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pc, op) in self.ops().iter().enumerate() {
            write!(f, "{:>4}: {}", pc, op)?;
            if let Some(off) = op.jump_offset() {
                write!(f, "  (-> {})", pc as i64 + off as i64)?;
            }
            f.write_char('\n')?;
        }
        for (i, class) in self.classes().iter().enumerate() {
            writeln!(f, "  #{}: {}", i, class_to_string(class))?;
        }
        Ok(())
    }
}
