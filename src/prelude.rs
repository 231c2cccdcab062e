// prelude.rs - Convenient re-exports for the idiomatic API.
//
//! # Prelude
//!
//! ```
//! use rexmatch::prelude::*;
//!
//! let mut b = Program::builder();
//! b.literal(b"ab");
//! b.end();
//! b.accept();
//! let prog = b.build().unwrap();
//! assert_eq!(is_match(&prog, b"xxab"), Ok(true));
//! ```

pub use crate::api::{is_match, MatcherBuilder, MatcherPool, PoolGuard};
pub use crate::error::MatchError;
pub use crate::rexexec::{MatchStats, Matcher};
pub use crate::rexint::{ByteClass, ClassId, MatchOptions, Op, Program, ProgramBuilder};
