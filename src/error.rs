// error.rs - Error type for the matcher.
//
// A failed match is not an error (`Ok(false)`). These variants cover the
// conditions that abort a match: allocation failure, the configurable
// stack limit and malformed programs. Each keeps a stable negative code for
// embedding runtimes that report C-style integers.

use std::fmt;

pub const REXERR_MEMORY: i32 = -5;
pub const REXERR_MATCH_STACK_LIMIT_OVER: i32 = -15;
pub const REXERR_CORRUPT_PROGRAM: i32 = -13;

/// Error type for match operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// Growing a backtracking stack failed to allocate.
    Memory,
    /// The continuation stack reached the configured frame limit.
    MatchStackLimitOver,
    /// The program has no defined transition at `pc` (compiler defect).
    CorruptProgram { pc: usize, message: String },
}

impl MatchError {
    pub(crate) fn corrupt(pc: usize, message: impl Into<String>) -> Self {
        MatchError::CorruptProgram {
            pc,
            message: message.into(),
        }
    }

    /// Returns the stable integer code for this error.
    pub fn code(&self) -> i32 {
        match self {
            MatchError::Memory => REXERR_MEMORY,
            MatchError::MatchStackLimitOver => REXERR_MATCH_STACK_LIMIT_OVER,
            MatchError::CorruptProgram { .. } => REXERR_CORRUPT_PROGRAM,
        }
    }

    /// Returns `true` for errors that indicate a malformed program rather
    /// than resource exhaustion.
    pub fn is_corrupt_program(&self) -> bool {
        matches!(self, MatchError::CorruptProgram { .. })
    }
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::Memory => write!(f, "out of memory for match stack"),
            MatchError::MatchStackLimitOver => write!(f, "match-stack limit over"),
            MatchError::CorruptProgram { pc, message } => {
                write!(f, "corrupt program at {}: {}", pc, message)
            }
        }
    }
}

impl std::error::Error for MatchError {}
