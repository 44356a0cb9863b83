//! Shared gzip-member synthesis for the integration tests: wrap raw DEFLATE
//! bytes (as `miniz_oxide` produces, our compression oracle) with a hand
//! written RFC 1952 header/trailer, since this crate has no encoder of its
//! own to round-trip against.

use streaming_inflate::Inflater;

pub const ID1: u8 = 0x1F;
pub const ID2: u8 = 0x8B;
pub const CM_DEFLATE: u8 = 0x08;

pub const FLAG_FHCRC: u8 = 1 << 1;
pub const FLAG_FEXTRA: u8 = 1 << 2;
pub const FLAG_FNAME: u8 = 1 << 3;
pub const FLAG_FCOMMENT: u8 = 1 << 4;

/// Build a single gzip member around `deflate_body` (already-compressed
/// bytes), with the given header flags and optional field payloads.
#[allow(clippy::too_many_arguments)]
pub fn build_gzip_member(
    flg: u8, mtime: u32, fextra: Option<&[u8]>, fname: Option<&[u8]>, fcomment: Option<&[u8]>,
    deflate_body: &[u8], crc32: u32, isize_value: u32,
) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(ID1);
    out.push(ID2);
    out.push(CM_DEFLATE);
    out.push(flg);
    out.extend_from_slice(&mtime.to_le_bytes());
    out.push(0); // XFL
    out.push(0xFF); // OS: unknown

    if let Some(extra) = fextra {
        out.extend_from_slice(&(extra.len() as u16).to_le_bytes());
        out.extend_from_slice(extra);
    }
    if let Some(name) = fname {
        out.extend_from_slice(name);
        out.push(0);
    }
    if let Some(comment) = fcomment {
        out.extend_from_slice(comment);
        out.push(0);
    }
    if flg & FLAG_FHCRC != 0 {
        // A real encoder would CRC the header bytes written so far; any
        // 16-bit value round-trips fine here since this crate doesn't
        // validate FHCRC (RFC 1952 leaves that optional for the decoder).
        out.extend_from_slice(&[0x00, 0x00]);
    }

    out.extend_from_slice(deflate_body);
    out.extend_from_slice(&crc32.to_le_bytes());
    out.extend_from_slice(&isize_value.to_le_bytes());
    out
}

/// Compress `raw` with the oracle and wrap it as a plain gzip member (no
/// optional header fields).
pub fn gzip_compress(raw: &[u8]) -> Vec<u8> {
    let body = miniz_oxide::deflate::compress_to_vec(raw, 6);
    let crc = crc32_of(raw);
    build_gzip_member(0, 0, None, None, None, &body, crc, raw.len() as u32)
}

fn crc32_of(data: &[u8]) -> u32 {
    // A from-scratch reference CRC-32, independent of `crate::crc32`, so the
    // trailer these tests build isn't trivially "correct by construction"
    // against the same table this crate uses to check it.
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ POLY } else { crc >> 1 };
        }
    }
    crc ^ 0xFFFF_FFFF
}

/// Decode `data` by feeding it to `inflater` `chunk_size` bytes at a time
/// and draining an output buffer of `out_size` bytes on every call,
/// asserting the run reaches `Done` rather than stalling.
pub fn decode_in_chunks(inflater: &mut Inflater, data: &[u8], chunk_size: usize, out_size: usize) -> Vec<u8> {
    use streaming_inflate::InflateStatus;

    let mut produced = Vec::new();
    let mut offset = 0;
    let mut out = vec![0u8; out_size.max(1)];
    let mut stalls = 0;
    loop {
        let end = (offset + chunk_size.max(1)).min(data.len());
        let chunk = &data[offset..end];
        let outcome = inflater.inflate(chunk, &mut out).expect("decode should not error");
        offset += outcome.bytes_read;
        produced.extend_from_slice(&out[..outcome.bytes_written]);

        if outcome.status == InflateStatus::Done {
            break;
        }
        if outcome.bytes_read == 0 && outcome.bytes_written == 0 {
            stalls += 1;
            assert!(stalls < 4, "decoder made no progress across repeated calls");
        } else {
            stalls = 0;
        }
    }
    produced
}
