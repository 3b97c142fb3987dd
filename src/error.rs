//! Error types shared by all containers.

use core::fmt;

/// Errors reported by the containers and by the binary layout decoders.
///
/// Every error is local to a single operation on a single container. None of them are transient:
/// they signal a broken caller contract or a malformed buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexError {
    /// The operation is not valid in the container's current state, e.g. mutating a packed
    /// vector or enumerating a bitset whose default bit is set.
    PreconditionViolation(&'static str),
    /// A bounds-checked accessor was called with an index past the end.
    OutOfRange {
        /// The requested index
        index: usize,
        /// Number of elements in the container
        len: usize,
    },
    /// A delta-encoded sequence decreases at `position`, so it cannot be delta compressed.
    InvariantViolation {
        /// Index of the first element that is smaller than its predecessor
        position: usize,
    },
    /// The byte buffer ends before the encoded container does.
    InsufficientBuffer {
        /// Number of bytes the encoding requires
        needed: usize,
        /// Number of bytes available
        available: usize,
    },
    /// The header of an encoded container is malformed or was written with another block width.
    InvalidHeader(&'static str),
}

impl fmt::Display for FlexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlexError::PreconditionViolation(msg) => write!(f, "precondition violated: {msg}"),
            FlexError::OutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            FlexError::InvariantViolation { position } => write!(
                f,
                "sequence is not non-decreasing: element {position} is smaller than its predecessor"
            ),
            FlexError::InsufficientBuffer { needed, available } => write!(
                f,
                "buffer too small: {needed} bytes needed, {available} available"
            ),
            FlexError::InvalidHeader(msg) => write!(f, "invalid header: {msg}"),
        }
    }
}

impl std::error::Error for FlexError {}

/// Result type for container operations
pub type Result<T> = core::result::Result<T, FlexError>;
