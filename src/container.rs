//! Byte-exact GIF89a structural records.
//!
//! Every helper appends one fixed-layout record to a plain byte buffer, so
//! frame blocks can be produced independently and later concatenated.

use rgb::RGBA8;

/// 6-byte signature at the very start of the stream.
pub(crate) const SIGNATURE: &[u8; 6] = b"GIF89a";

pub(crate) const TRAILER: u8 = 0x3B;

/// Color tables are always written padded to 256 entries,
/// so the packed size field is fixed (2^(7+1) = 256)
const TABLE_SIZE_FIELD: u8 = 7;

/// LZW minimum code size matching the padded 256-entry tables.
pub(crate) const MIN_CODE_SIZE: u8 = 8;

pub(crate) fn write_header(out: &mut Vec<u8>) {
    out.extend_from_slice(SIGNATURE);
}

/// Written once, right after the header.
pub(crate) fn write_logical_screen_descriptor(out: &mut Vec<u8>, width: u16, height: u16) {
    push_u16_le(out, width);
    push_u16_le(out, height);
    out.push(0x80 | // global color table follows
        0x70 |      // color resolution = 7
        TABLE_SIZE_FIELD);
    out.push(0); // background color index
    out.push(0); // pixel aspect ratio, 1:1
}

/// R,G,B triples, zero-padded to the full 256 entries the size field declares.
pub(crate) fn write_palette(out: &mut Vec<u8>, pal: &[RGBA8]) {
    debug_assert!(pal.len() <= 256);
    for p in pal {
        out.push(p.r);
        out.push(p.g);
        out.push(p.b);
    }
    for _ in pal.len()..256 {
        out.extend_from_slice(&[0, 0, 0]);
    }
}

/// NETSCAPE2.0 application extension. `loop_count` of 0 repeats forever.
pub(crate) fn write_loop_extension(out: &mut Vec<u8>, loop_count: u16) {
    out.push(0x21); // extension introducer
    out.push(0xFF); // application extension label
    out.push(11);
    out.extend_from_slice(b"NETSCAPE2.0");
    out.push(3); // sub-block size
    out.push(1); // loop sub-block id
    push_u16_le(out, loop_count);
    out.push(0); // block terminator
}

pub(crate) fn write_graphic_control(out: &mut Vec<u8>, dispose: u8, delay: u16, transparent: Option<u8>) {
    out.push(0x21); // extension introducer
    out.push(0xF9); // graphic control label
    out.push(4);
    out.push((dispose & 7) << 2 | transparent.is_some() as u8);
    push_u16_le(out, delay);
    out.push(transparent.unwrap_or(0));
    out.push(0); // block terminator
}

pub(crate) fn write_image_descriptor(out: &mut Vec<u8>, left: u16, top: u16, width: u16, height: u16, local_palette: bool) {
    out.push(0x2C); // image separator
    push_u16_le(out, left);
    push_u16_le(out, top);
    push_u16_le(out, width);
    push_u16_le(out, height);
    // first frame has no local table, the global one covers it
    out.push(if local_palette { 0x80 | TABLE_SIZE_FIELD } else { 0 });
}

/// Length-prefixed sub-blocks of at most 255 bytes, plus the zero terminator.
pub(crate) fn write_data_sub_blocks(out: &mut Vec<u8>, data: &[u8]) {
    for chunk in data.chunks(255) {
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
    out.push(0);
}

pub(crate) fn write_trailer(out: &mut Vec<u8>) {
    out.push(TRAILER);
}

fn push_u16_le(out: &mut Vec<u8>, value: u16) {
    out.push((value & 0xFF) as u8);
    out.push((value >> 8) as u8);
}
