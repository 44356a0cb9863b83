//! Error taxonomy returned by [`crate::Inflater`].
//!
//! The variants mirror the return codes of a zlib-style `inflate()`: a
//! handful of terminal error kinds plus the knowledge that "needs more
//! input/output" is never one of them (see [`crate::InflateStatus`] instead).

use core::fmt;

/// A fatal error raised by the inflater.
///
/// Once returned, the stream that produced it is done: the spec mandates no
/// retries at this layer, only `end` (dropping the [`crate::Inflater`]).
#[derive(Debug, Clone)]
pub enum InflateError {
    /// The input is structurally malformed: bad gzip magic, an unsupported
    /// compression method, a reserved block type (`BTYPE == 0b11`), an
    /// over- or under-subscribed Huffman code, reserved header flag bits
    /// set, or a CRC-32/ISIZE mismatch against the gzip trailer.
    StreamError(String),
    /// The structure was fine but a decoded symbol is not valid: a
    /// literal/length symbol of 286 or 287, a distance code of 30 or 31, or
    /// a back-reference distance that exceeds the data produced so far.
    DataError(String),
    /// A dynamic Huffman table could not be allocated.
    MemError,
    /// The caller supplied neither more input nor more output room, and the
    /// stream is not finished. Transient: refill and call again.
    BufError,
    /// The caller asked for an `init()` configuration this crate does not
    /// support (e.g. a window size other than 32 KiB).
    VersionError(&'static str),
}

impl fmt::Display for InflateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InflateError::StreamError(msg) => write!(f, "stream error: {msg}"),
            InflateError::DataError(msg) => write!(f, "data error: {msg}"),
            InflateError::MemError => write!(f, "memory allocation failure"),
            InflateError::BufError => write!(f, "no progress possible: input and output both exhausted"),
            InflateError::VersionError(msg) => write!(f, "version error: {msg}"),
        }
    }
}

impl std::error::Error for InflateError {}

impl InflateError {
    pub(crate) fn stream(msg: impl Into<String>) -> Self {
        InflateError::StreamError(msg.into())
    }

    pub(crate) fn data(msg: impl Into<String>) -> Self {
        InflateError::DataError(msg.into())
    }
}
