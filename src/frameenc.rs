//! Turns one decoded frame into one self-contained run of GIF records.
//!
//! Blocks produced here never reference each other, so they can be encoded
//! on any worker and later glued together by plain concatenation. Only the
//! block of the first retained frame carries the stream prologue (header,
//! logical screen descriptor, global color table, loop extension).

use crate::container;
use crate::error::CatResult;
use crate::lzw::Compressor;
use crate::quant::Quantizer;
use crate::Settings;
use imgref::ImgVec;
use rgb::*;

pub(crate) struct EncodedBlock {
    pub frame_index: usize,
    pub bytes: Vec<u8>,
    pub is_first: bool,
}

pub(crate) fn encode_frame(
    frame_index: usize,
    image: ImgVec<RGBA8>,
    delay: u16,
    is_first: bool,
    settings: &Settings,
    quantizer: &dyn Quantizer,
    compressor: &dyn Compressor,
) -> CatResult<EncodedBlock> {
    let image = resample_to_canvas(image, settings.width.into(), settings.height.into())?;
    let (image, importance_map) = apply_transparency_sentinel(image, settings.transparent);

    // The first frame's palette doubles as the global color table,
    // so it's quantized at full quality
    let quality = if is_first { 100 } else { settings.quality };
    let (pal, indexed) = quantizer.quantize(image.as_ref(), &importance_map, 256, quality)?;
    debug_assert!(pal.len() <= 256);
    debug_assert_eq!(indexed.len(), image.width() * image.height());

    let transparent = settings.transparent
        .map(|sentinel| transparent_index_for(&pal, &indexed, sentinel));

    let dispose = settings.dispose.map(|d| d as u8).unwrap_or(if settings.transparent.is_some() {
        gif::DisposalMethod::Background as u8
    } else {
        gif::DisposalMethod::Any as u8
    });

    let mut bytes = Vec::with_capacity(1024 + indexed.len() / 4);
    if is_first {
        container::write_header(&mut bytes);
        container::write_logical_screen_descriptor(&mut bytes, settings.width, settings.height);
        container::write_palette(&mut bytes, &pal);
        if let Some(loop_count) = settings.loop_count {
            container::write_loop_extension(&mut bytes, loop_count);
        }
    }
    container::write_graphic_control(&mut bytes, dispose, delay, transparent);
    container::write_image_descriptor(&mut bytes, 0, 0, settings.width, settings.height, !is_first);
    if !is_first {
        container::write_palette(&mut bytes, &pal);
    }
    bytes.extend_from_slice(&compressor.compress(&indexed, container::MIN_CODE_SIZE)?);

    Ok(EncodedBlock { frame_index, bytes, is_first })
}

/// Every block must cover the configured canvas, whatever the source size was.
fn resample_to_canvas(image: ImgVec<RGBA8>, width: usize, height: usize) -> CatResult<ImgVec<RGBA8>> {
    if image.width() == width && image.height() == height {
        return Ok(image);
    }
    let (buf, img_width, img_height) = image.into_contiguous_buf();
    let mut dst = vec![RGBA8::new(0, 0, 0, 0); width * height];
    let mut r = resize::new(img_width, img_height, width, height, resize::Pixel::RGBA8, resize::Type::Lanczos3)?;
    r.resize(&buf, &mut dst)?;
    Ok(ImgVec::new(dst, width, height))
}

/// Paints fully-transparent source pixels with the sentinel color (at
/// importance 0, so they can't win palette entries) and nudges genuine
/// content that happens to equal the sentinel to a neighboring color,
/// keeping the reserved color unambiguous.
fn apply_transparency_sentinel(image: ImgVec<RGBA8>, sentinel: Option<RGB8>) -> (ImgVec<RGBA8>, Vec<u8>) {
    // Frames may arrive with a stride wider than the row; the importance map
    // is row-major, so drop any padding first
    let (mut buf, width, height) = image.into_contiguous_buf();
    let mut importance_map = vec![255_u8; width * height];
    for (px, imp) in buf.iter_mut().zip(&mut importance_map) {
        if px.a == 0 {
            *imp = 0;
            if let Some(s) = sentinel {
                *px = RGBA8::new(s.r, s.g, s.b, 255);
            }
        } else if Some(px.rgb()) == sentinel {
            *px = perturb(*px);
        }
    }
    (ImgVec::new(buf, width, height), importance_map)
}

fn perturb(px: RGBA8) -> RGBA8 {
    let bump = |v: u8| if v == 255 { 254 } else { v + 1 };
    RGBA8::new(bump(px.r), bump(px.g), bump(px.b), px.a)
}

/// Strict equality only, and only among entries the index stream actually
/// references. A near-match is never treated as transparent; entry 0 is the
/// fallback when the sentinel didn't survive quantization.
fn transparent_index_for(pal: &[RGBA8], indexed: &[u8], sentinel: RGB8) -> u8 {
    let mut used_entry = [false; 256];
    for &i in indexed {
        used_entry[usize::from(i)] = true;
    }
    pal.iter().enumerate()
        .find(|&(i, p)| used_entry[i] && p.rgb() == sentinel)
        .map(|(i, _)| i as u8)
        .unwrap_or(0)
}
