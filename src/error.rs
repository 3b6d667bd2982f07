//! Error taxonomy shared by `Chain` and `ChainedHashMap`.

use thiserror::Error;

/// Every fallible operation in the crate returns this error.
///
/// The variants collapse onto two legacy integer codes (see [`Error::code`]):
/// invalid-argument / not-found conditions and allocation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("no hash function was supplied to the builder")]
    MissingHasher,

    #[error("index {index} is out of range for a chain of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("key not found")]
    NotFound,

    #[error("allocation failed while growing the slot array")]
    OutOfMemory,
}

impl Error {
    pub const NIL: i32 = -1;
    pub const OOM: i32 = -2;

    /// Legacy integer code: `-1` for invalid argument or not found,
    /// `-2` for allocation failure. Success has no error and maps to `0`.
    pub fn code(&self) -> i32 {
        match self {
            Error::MissingHasher | Error::IndexOutOfRange { .. } | Error::NotFound => Self::NIL,
            Error::OutOfMemory => Self::OOM,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
