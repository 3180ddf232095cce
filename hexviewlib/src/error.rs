//! The `error` module defines the [`HexViewError`] enum that describes the errors
//! that can occur when navigating, editing, colorizing, or replaying edits via
//! [`HexView`](crate::HexView).
//!
//! All errors are local and recoverable: a rejected operation leaves the
//! selection, the colored ranges, and the edit log exactly as they were.

use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexViewError {
    /// Offset or length outside the valid bounds of the byte source
    OutOfRange { offset: u64, limit: u64 },
    /// Write attempted against a read-only byte source
    NotEditable,
    /// Undo log is empty or the edit can no longer be replayed
    CannotUndo,
    /// Redo log is empty or the edit can no longer be replayed
    CannotRedo,
    /// Colorization level outside the supported `0..=9` range
    InvalidLevel(usize),
}

impl fmt::Display for HexViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { offset, limit } => {
                write!(
                    f,
                    "Error: offset or length out of bounds - offset: 0x{offset:X}, limit: 0x{limit:X}",
                )
            }
            Self::NotEditable => {
                write!(f, "Error: byte source is not writable")
            }
            Self::CannotUndo => {
                write!(f, "Error: nothing to undo")
            }
            Self::CannotRedo => {
                write!(f, "Error: nothing to redo")
            }
            Self::InvalidLevel(level) => {
                write!(f, "Error: invalid colorization level: {level} (expected 0..=9)")
            }
        }
    }
}

impl Error for HexViewError {}
