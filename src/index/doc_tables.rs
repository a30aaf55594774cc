//! Per-document variable-length tables: symbol sections and newline offsets.
//! Both are lazily loaded and delta-varint encoded the same way posting
//! lists are, since both are non-decreasing sequences of document-relative
//! byte offsets.

use crate::index::types::SymbolSection;
use crate::varint::{decode_varint, delta_decode, delta_encode, encode_varint};

/// Encode one document's symbol sections: delta-encoded `start` offsets,
/// interleaved with each section's length and symbol id (neither of which
/// is monotonic, so those are encoded as plain varints alongside the
/// delta-encoded starts).
pub fn encode_symbol_sections(sections: &[SymbolSection], out: &mut Vec<u8>) {
    let starts: Vec<u64> = sections.iter().map(|s| s.start as u64).collect();
    let mut start_buf = Vec::new();
    delta_encode(&starts, &mut start_buf);

    encode_varint(sections.len() as u64, out);
    encode_varint(start_buf.len() as u64, out);
    out.extend_from_slice(&start_buf);
    for s in sections {
        encode_varint((s.end - s.start) as u64, out);
        encode_varint(s.symbol_id as u64, out);
    }
}

pub fn decode_symbol_sections(buf: &[u8]) -> Option<Vec<SymbolSection>> {
    let mut pos = 0usize;
    let (count, consumed) = decode_varint(&buf[pos..])?;
    pos += consumed;
    let (start_buf_len, consumed) = decode_varint(&buf[pos..])?;
    pos += consumed;
    let start_buf = &buf[pos..pos + start_buf_len as usize];
    pos += start_buf_len as usize;
    let starts = delta_decode(start_buf);

    let mut sections = Vec::with_capacity(count as usize);
    for start in starts.into_iter().take(count as usize) {
        let (len, consumed) = decode_varint(&buf[pos..])?;
        pos += consumed;
        let (symbol_id, consumed) = decode_varint(&buf[pos..])?;
        pos += consumed;
        sections.push(SymbolSection {
            start: start as u32,
            end: (start + len) as u32,
            symbol_id: symbol_id as u32,
        });
    }
    Some(sections)
}

/// Encode one document's newline byte offsets (ascending, document
/// relative) as a plain delta-varint list.
pub fn encode_newlines(offsets: &[u32], out: &mut Vec<u8>) {
    let widened: Vec<u64> = offsets.iter().map(|&o| o as u64).collect();
    delta_encode(&widened, out);
}

pub fn decode_newlines(buf: &[u8]) -> Vec<u32> {
    delta_decode(buf).into_iter().map(|v| v as u32).collect()
}

/// Compute the newline offsets of a document's content directly (used by
/// the builder and by tests).
pub fn newlines_in(content: &[u8]) -> Vec<u32> {
    content
        .iter()
        .enumerate()
        .filter(|(_, &b)| b == b'\n')
        .map(|(i, _)| i as u32)
        .collect()
}
