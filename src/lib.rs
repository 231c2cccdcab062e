//! # rexmatch
//!
//! Backtracking matcher for compiled regular-expression programs, with
//! SIMD-accelerated literal search via [`memchr`](https://crates.io/crates/memchr).
//!
//! A regex compiler (not part of this crate) lowers a pattern into a flat
//! [`Program`](rexint::Program) of operations: literals, byte classes,
//! anchors and relative jumps. The matcher answers one question, whether
//! the program matches anywhere in a byte string, using explicit
//! continuation stacks instead of recursion.
//!
//! ## Quick Start
//!
//! ```rust
//! use rexmatch::prelude::*;
//!
//! // ^[0-9]+$
//! let mut b = Program::builder();
//! let digit = b.add_class(ByteClass::from_range(b'0', b'9'));
//! b.start();
//! let top = b.save_pos();
//! b.class(digit);
//! b.jump_if_advanced_to(top);
//! b.end();
//! b.accept();
//! let prog = b.build().unwrap();
//!
//! let mut m = Matcher::new();
//! assert!(m.is_match(&prog, b"2026").unwrap());
//! assert!(!m.is_match(&prog, b"20x6").unwrap());
//! ```
//!
//! For fine-grained control, use [`MatcherBuilder`](api::MatcherBuilder):
//!
//! ```rust
//! use rexmatch::prelude::*;
//!
//! let mut m = Matcher::builder().stack_limit(10_000).trace(true).build();
//! let prog = Program::new(vec![Op::str(b"needle"), Op::Accept], vec![]);
//! assert!(m.is_match(&prog, b"haystack with a needle").unwrap());
//! assert!(m.last_stats().fast_path);
//! ```
//!
//! ## Module Structure
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`rexint`] | Operations, byte classes, options, program builder |
//! | [`rexexec`] | Match driver and `Matcher` context |
//! | [`rexstack`] | Continuation and position-save stacks |
//! | [`strscan`] | Exact substring search |
//! | [`rexdump`] | Program listings and literal escaping |
//! | [`api`] | `MatcherBuilder`, `MatcherPool`, `is_match` |
//! | [`error`] | `MatchError` |

pub mod api;
pub mod error;
pub mod prelude;
pub mod rexdump;
pub mod rexexec;
pub mod rexint;
pub mod rexstack;
pub mod strscan;
