//! The bounded sliding-window output buffer (spec.md §4.4).
//!
//! The teacher decodes into an unbounded `Vec<u8>` and resolves
//! back-references by indexing straight into it (`repeat_with_overlap`),
//! which works for a one-shot in-memory decode but cannot bound memory or
//! validate distances against a real window capacity. This module is new,
//! grounded instead on the circular buffer in
//! `original_source/src/inflate.c` (`priv_stream_data`/`window_add`/
//! `stream_window`/`check_distance`), reworked into safe Rust: a `Vec<u8>`
//! of fixed power-of-two capacity addressed by a head index and mask.

use crate::errors::InflateError;

pub(crate) struct Window {
    buf: Vec<u8>,
    mask: usize,
    head: usize,
    /// Number of valid bytes written so far, saturating at capacity.
    /// Tracked separately from `head` so a distance can be validated
    /// against "how much history actually exists" rather than only against
    /// the buffer's capacity (spec.md §3: "distances can be validated before
    /// use").
    size: usize,
}

impl Window {
    /// `capacity` must be a power of two (32 KiB for gzip, per spec.md §6:
    /// only `window_bits == 15` is required).
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Window {
            buf: vec![0u8; capacity],
            mask: capacity - 1,
            head: 0,
            size: 0,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.head = 0;
        self.size = 0;
        // Contents need not be zeroed: `size` gates what is readable, and
        // every read is preceded by `validate_distance`.
    }

    pub(crate) fn capacity(&self) -> usize {
        self.mask + 1
    }

    #[inline]
    pub(crate) fn push(&mut self, byte: u8) {
        self.buf[self.head] = byte;
        self.head = (self.head + 1) & self.mask;
        if self.size < self.capacity() {
            self.size += 1;
        }
    }

    /// Reject a distance that would read bytes never written (`distance >
    /// size`) or that exceeds the window's capacity outright (`distance >
    /// capacity`), per spec.md §4.4.
    ///
    /// Design note (DESIGN.md resolves an apparent conflict between spec.md
    /// §7's prose, which files "distance beyond window" under
    /// `StreamError`, and §8 scenario 6, which classifies the same
    /// condition as `DataError`): this returns `DataError`, following the
    /// concrete test scenario.
    pub(crate) fn validate_distance(&self, distance: usize, length: usize) -> Result<(), InflateError> {
        if distance == 0 {
            return Err(InflateError::data("zero back-reference distance"));
        }
        if distance > self.capacity() {
            crate::log_warn!(
                "rejecting back-reference: distance {distance} exceeds window capacity {}",
                self.capacity()
            );
            return Err(InflateError::data(format!(
                "back-reference distance {distance} exceeds window capacity {}",
                self.capacity()
            )));
        }
        if distance > self.size {
            crate::log_warn!(
                "rejecting back-reference: distance {distance} exceeds {} bytes produced so far",
                self.size
            );
            return Err(InflateError::data(format!(
                "back-reference distance {distance} exceeds {} bytes produced so far",
                self.size
            )));
        }
        if length > 258 {
            return Err(InflateError::data(format!("back-reference length {length} exceeds 258")));
        }
        Ok(())
    }

    /// Read one byte of a `distance`/`length` back-reference copy, already
    /// validated by [`Window::validate_distance`], without committing it to
    /// the window. Split from the commit step (a separate call to
    /// [`Window::push`]) so the decoder can defer the commit until the byte
    /// has actually been handed to the caller — emitting it into the window
    /// before it is confirmed delivered would desynchronise the window from
    /// "output already returned" the moment a call suspends on a full output
    /// buffer (spec.md §4.4's window/output-in-lockstep invariant).
    ///
    /// Must be called one byte at a time rather than as a bulk copy, because
    /// `distance < length` is legal (the mechanism behind run-length
    /// expansion, spec.md §4.4/§8 invariant 5) and a bulk `memcpy`-style copy
    /// would read stale source bytes once the write end catches up to the
    /// read end.
    #[inline]
    pub(crate) fn peek_back(&self, distance: usize) -> u8 {
        let src = (self.head + self.capacity() - distance) & self.mask;
        self.buf[src]
    }

    /// Append a whole slice at once (spec.md §4.4's `push_slice`), used for
    /// stored blocks and other byte-aligned bulk writes. Splits the write
    /// across the wrap point into at most two contiguous `copy_from_slice`
    /// calls rather than looping byte-by-byte.
    pub(crate) fn push_slice(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.len() <= self.capacity());
        let first_len = (self.capacity() - self.head).min(bytes.len());
        self.buf[self.head..self.head + first_len].copy_from_slice(&bytes[..first_len]);
        let rest = &bytes[first_len..];
        if !rest.is_empty() {
            self.buf[..rest.len()].copy_from_slice(rest);
        }
        self.head = (self.head + bytes.len()) & self.mask;
        self.size = (self.size + bytes.len()).min(self.capacity());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_length_expansion_distance_one() {
        let mut w = Window::new(32);
        w.push(b'x');
        w.validate_distance(1, 5).unwrap();
        let mut out = Vec::new();
        for _ in 0..5 {
            let byte = w.peek_back(1);
            w.push(byte);
            out.push(byte);
        }
        assert_eq!(out, b"xxxxx");
    }

    #[test]
    fn distance_beyond_history_rejected() {
        let w = Window::new(32);
        assert!(w.validate_distance(1, 1).is_err());
    }

    #[test]
    fn distance_beyond_capacity_rejected() {
        let mut w = Window::new(32);
        for _ in 0..32 {
            w.push(b'a');
        }
        assert!(w.validate_distance(33, 1).is_err());
    }

    #[test]
    fn wraps_around_capacity() {
        let mut w = Window::new(4);
        for b in b"abcdef" {
            w.push(*b);
        }
        // Only the last 4 bytes ("cdef") should be retrievable.
        w.validate_distance(4, 1).unwrap();
        assert!(w.validate_distance(5, 1).is_err());
        let byte = w.peek_back(4);
        assert_eq!(byte, b'c');
    }

    #[test]
    fn push_slice_wraps_across_the_end() {
        let mut w = Window::new(4);
        w.push_slice(b"ab");
        w.push_slice(b"cdef");
        w.validate_distance(4, 1).unwrap();
        assert_eq!(w.peek_back(4), b'c');
        assert_eq!(w.peek_back(1), b'f');
    }
}
