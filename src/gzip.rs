//! RFC 1952 gzip header/trailer field layout (spec.md §4.6).
//!
//! New relative to the teacher, which only ever saw raw DEFLATE. Grounded
//! on `original_source/src/inflate.c`'s `gzip_header` struct and flag
//! constants (`FTEXT`/`FHCRC`/`FEXTRA`/`FNAME`/`FCOMMENT`) and
//! `src/pzlib.h`'s naming for the equivalent fields.

pub(crate) const ID1: u8 = 0x1F;
pub(crate) const ID2: u8 = 0x8B;
/// The only compression method this crate understands (spec.md §1: "gzip
/// with CM=8" is the only wrapping in scope).
pub(crate) const CM_DEFLATE: u8 = 8;

pub(crate) const FLAG_FTEXT: u8 = 1 << 0;
pub(crate) const FLAG_FHCRC: u8 = 1 << 1;
pub(crate) const FLAG_FEXTRA: u8 = 1 << 2;
pub(crate) const FLAG_FNAME: u8 = 1 << 3;
pub(crate) const FLAG_FCOMMENT: u8 = 1 << 4;
/// Bits 5-7 are reserved and must be zero (spec.md §4.6).
pub(crate) const FLAG_RESERVED: u8 = 0b1110_0000;
