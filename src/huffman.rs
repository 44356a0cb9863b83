//! Canonical Huffman table construction and O(1) decode (spec.md §4.2/§4.3).
//!
//! Grounded on the teacher's `HuffmanLookupTable` (`ZoukiLi-inflate-toy`'s
//! `src/huffman.rs`): the same three-pass canonical-code algorithm (count
//! lengths, compute `next_code`, assign and expand into a dense table
//! indexed by the bit-reversed code), but reworked from "assert and panic on
//! bad input" into "return a descriptive error", since this crate cannot
//! treat a malformed dynamic-block tree as a programmer bug — it is
//! attacker- or corruption-controlled input.

use crate::errors::InflateError;

/// Sentinel stored in a table slot that no valid code maps to.
const INVALID_SYMBOL: u16 = u16::MAX;

/// A dense canonical-Huffman decode table: `1 << max_bits` entries, each
/// either `(symbol, code_length)` or the sentinel meaning "not a valid
/// code of this length".
#[derive(Debug, Clone)]
pub(crate) struct HuffmanTable {
    /// Packed as `(symbol << 8) | length`; `symbol` is `INVALID_SYMBOL` when
    /// unused. Kept as a single `u32` vector rather than a tuple vector so a
    /// fully-built fixed table is cheap to clone into per-stream state.
    entries: Vec<u32>,
    max_bits: u8,
}

impl HuffmanTable {
    /// An empty table of the given width, all slots sentinel. Used as the
    /// initial/reset state of the two tables a decoder keeps around for its
    /// lifetime, so their backing `Vec` is allocated once and reused by
    /// [`HuffmanTable::build_into`] on every dynamic block rather than
    /// reallocated from scratch each time (spec.md §9's "avoid per-block
    /// allocation").
    pub(crate) fn empty(max_bits: u8) -> Self {
        HuffmanTable { entries: vec![(INVALID_SYMBOL as u32) << 8; 1usize << max_bits], max_bits }
    }

    /// Build a canonical Huffman table from a code-length vector.
    ///
    /// `lengths[i]` is the code length of symbol `i`, `0` meaning unused.
    /// `max_bits` bounds the table size (`1 << max_bits` entries) and must
    /// be at least the largest length present.
    ///
    /// `allow_incomplete` permits a tree whose Kraft sum is strictly less
    /// than one (used only for the distance tree, per a handful of valid
    /// single-distance streams) but never a Kraft sum greater than one.
    #[cfg(test)]
    pub(crate) fn build(
        lengths: &[u8], max_bits: u8, allow_incomplete: bool,
    ) -> Result<Self, InflateError> {
        let mut table = HuffmanTable::empty(max_bits);
        table.build_into(lengths, max_bits, allow_incomplete)?;
        Ok(table)
    }

    /// Same as [`HuffmanTable::build`], but rebuilds in place, reusing
    /// `self.entries`' allocation instead of allocating a fresh `Vec` —
    /// the form the decoder actually calls for every dynamic block.
    pub(crate) fn build_into(
        &mut self, lengths: &[u8], max_bits: u8, allow_incomplete: bool,
    ) -> Result<(), InflateError> {
        assert!(max_bits as u32 <= 15, "table would not fit spec's codeword limit");

        let mut bl_count = [0u32; 16];
        for &len in lengths {
            if len as usize >= bl_count.len() {
                return Err(InflateError::stream(format!(
                    "huffman code length {len} exceeds maximum of 15"
                )));
            }
            bl_count[len as usize] += 1;
        }
        bl_count[0] = 0;

        // Kraft-inequality check, the same `left` accounting zlib's inflate
        // uses: each length level doubles the remaining code space and
        // spends `bl_count[len]` of it. `left` going negative means more
        // codes were assigned at this length than the space allows — an
        // over-subscribed tree. `left` ending positive means the tree
        // doesn't cover the whole code space (under-subscribed); only the
        // distance tree may be under-subscribed, and only down to exactly
        // one used symbol (spec.md §4.2's "Error conditions").
        let mut left: i32 = 1;
        for len in 1..=15usize {
            left <<= 1;
            left -= bl_count[len] as i32;
            if left < 0 {
                return Err(InflateError::stream("over-subscribed huffman code"));
            }
        }
        if left > 0 && !allow_incomplete {
            return Err(InflateError::stream("incomplete huffman code"));
        }

        let mut next_code = [0u32; 16];
        let mut code: u32 = 0;
        for bits in 1..=15usize {
            code = (code + bl_count[bits - 1]) << 1;
            next_code[bits] = code;
        }

        let table_size = 1usize << max_bits;
        if self.entries.len() != table_size {
            self.entries.resize(table_size, (INVALID_SYMBOL as u32) << 8);
        } else {
            self.entries.fill((INVALID_SYMBOL as u32) << 8);
        }
        self.max_bits = max_bits;

        for (symbol, &len) in lengths.iter().enumerate() {
            if len == 0 {
                continue;
            }
            if len > max_bits {
                return Err(InflateError::stream(format!(
                    "huffman code length {len} exceeds table width {max_bits}"
                )));
            }
            let code = next_code[len as usize];
            next_code[len as usize] += 1;

            let shift = max_bits - len;
            let start = (code as usize) << shift;
            let end = start + (1usize << shift);

            for slot in start..end {
                let rev = (slot as u32).reverse_bits() >> (32 - max_bits as u32);
                self.entries[rev as usize] = ((symbol as u32) << 8) | len as u32;
            }
        }

        Ok(())
    }

    pub(crate) fn max_bits(&self) -> u8 {
        self.max_bits
    }

    /// Decode one symbol from the low `max_bits` bits of `peeked`. Returns
    /// `(symbol, code_length)`, or `None` if the bit pattern is not a valid
    /// code (the sentinel slot).
    #[inline]
    pub(crate) fn lookup(&self, peeked: u32) -> Option<(u16, u8)> {
        let mask = (1u32 << self.max_bits) - 1;
        let entry = self.entries[(peeked & mask) as usize];
        let len = (entry & 0xFF) as u8;
        let symbol = (entry >> 8) as u16;
        if symbol == INVALID_SYMBOL {
            None
        } else {
            Some((symbol, len))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{fixed_distance_lengths, fixed_litlen_lengths};

    #[test]
    fn fixed_literal_table_matches_rfc_1951() {
        let lens = fixed_litlen_lengths();
        let table = HuffmanTable::build(&lens, 9, false).unwrap();
        let (sym, len) = table.lookup(0b0_00001100).unwrap();
        assert_eq!((sym, len), (0, 8));
        let (sym, len) = table.lookup(0b1_10000000).unwrap();
        assert_eq!((sym, len), (256, 7));
    }

    #[test]
    fn fixed_distance_table_all_length_five() {
        let lens = fixed_distance_lengths();
        let table = HuffmanTable::build(&lens, 5, false).unwrap();
        for code in 0..30u32 {
            let (sym, len) = table.lookup(code).unwrap();
            assert_eq!(len, 5);
            assert!((sym as u32) < 30);
        }
    }

    #[test]
    fn over_subscribed_code_is_rejected() {
        // Four symbols all claiming a codespace only two 1-bit codes fill.
        let lens = [1u8, 1, 1, 1];
        assert!(HuffmanTable::build(&lens, 2, false).is_err());
    }

    #[test]
    fn incomplete_code_rejected_unless_allowed() {
        let lens = [0u8, 1];
        assert!(HuffmanTable::build(&lens, 1, false).is_err());
        let table = HuffmanTable::build(&lens, 1, true).unwrap();
        assert_eq!(table.lookup(0), Some((1, 1)));
        // The other 1-bit pattern is genuinely unused by this tree; a
        // stream that produces it is a data error, not a panic.
        assert_eq!(table.lookup(1), None);
    }
}
