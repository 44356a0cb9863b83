//! # streaming-inflate
//!
//! A resumable, pure-Rust gzip/DEFLATE decompressor (RFC 1951 + RFC 1952).
//!
//! The central type is [`Inflater`]: feed it successive chunks of gzip
//! input and buffers to receive decompressed output, and it suspends and
//! resumes cleanly at any input/output boundary rather than requiring the
//! whole compressed stream or the whole decompressed result to be
//! materialised in memory at once. This makes it suitable for decompressing
//! data arriving over a socket, from a pipe, or from any other source where
//! the entire payload isn't available up front.
//!
//! ```no_run
//! use streaming_inflate::{Inflater, InflateStatus};
//!
//! let mut inflater = Inflater::new();
//! let mut out = [0u8; 4096];
//! // Feed `chunk` (bytes read from wherever) and drain `out` in a loop,
//! // refilling `chunk` whenever `status` asks for more input.
//! # let chunk: &[u8] = &[];
//! let outcome = inflater.inflate(chunk, &mut out)?;
//! match outcome.status {
//!     InflateStatus::NeedsMoreInput => { /* read more into `chunk` */ }
//!     InflateStatus::NeedsMoreOutput => { /* drain `out[..outcome.bytes_written]` */ }
//!     InflateStatus::Done => { /* gzip member fully decoded */ }
//! }
//! # Ok::<(), streaming_inflate::InflateError>(())
//! ```
//!
//! Out of scope, deliberately: compression (there is no encoder here), the
//! zlib and raw-DEFLATE wrappers, multi-member gzip concatenation, preset
//! dictionaries, and parallel decompression. A single `Inflater` decodes one
//! gzip member at a time; call [`Inflater::reset`] to reuse it for the next.
//!
//! # Features
//!
//! - `log`: emit diagnostics via the [`log`] crate — `trace!` for header
//!   fields and per-symbol state transitions, `debug!` for dynamic table
//!   rebuilds and gzip member boundaries, `warn!` for recoverable-looking but
//!   ultimately fatal conditions (reserved header bits set, an
//!   out-of-window distance). Off by default; this crate never calls
//!   `log::` on its own initiative when the feature is disabled.

mod bitstream;
mod crc32;
mod decoder;
mod errors;
mod gzip;
mod huffman;
mod tables;
mod window;

pub use decoder::{DeflateOptions, InflateOutcome, InflateStatus, Inflater};
pub use errors::InflateError;

/// `log::trace!` when the `log` feature is enabled, a no-op otherwise —
/// keeps every call site in the decoder unconditional instead of wrapping
/// each one in `#[cfg(feature = "log")]`.
macro_rules! log_trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "log")]
        log::trace!($($arg)*);
    };
}
pub(crate) use log_trace;

/// `log::debug!` when the `log` feature is enabled, a no-op otherwise.
/// Used for coarser-grained events than `log_trace!`: a dynamic Huffman
/// table finished rebuilding, a gzip member's trailer validated.
macro_rules! log_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "log")]
        log::debug!($($arg)*);
    };
}
pub(crate) use log_debug;

/// `log::warn!` when the `log` feature is enabled, a no-op otherwise. Used
/// at the point a condition that looked like ordinary stream progress turns
/// out to be fatal (reserved flag bits, a back-reference past the window) —
/// the `Err` return already carries the same information, this just makes it
/// visible to a caller who isn't inspecting every `Result`.
macro_rules! log_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "log")]
        log::warn!($($arg)*);
    };
}
pub(crate) use log_warn;
