//! Reads an existing GIF into the ordered frame list the encoder consumes.

use crate::error::CatResult;
use crate::Frame;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Decodes all frames of a GIF file, composing each one onto the canvas
/// according to its disposal method, so the encoder always sees full frames.
pub fn decode_frames(path: &Path) -> CatResult<Vec<Frame>> {
    decode(File::open(path)?)
}

pub fn decode<R: Read>(input: R) -> CatResult<Vec<Frame>> {
    let mut gif_opts = gif::DecodeOptions::new();
    // Important:
    gif_opts.set_color_output(gif::ColorOutput::Indexed);

    let mut decoder = gif_opts.read_info(input)?;
    let mut screen = gif_dispose::Screen::new_decoder(&decoder);

    let mut frames = Vec::new();
    while let Some(frame) = decoder.read_next_frame()? {
        screen.blit_frame(frame)?;
        frames.push(Frame {
            image: screen.pixels.clone(),
            delay: frame.delay,
        });
    }
    Ok(frames)
}

/// Sniffs the 6-byte signature. Accepts both `GIF87a` and `GIF89a`.
pub fn is_gif(data: &[u8]) -> bool {
    matches!(data.get(..6), Some(b"GIF87a") | Some(b"GIF89a"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_sniffing() {
        assert!(is_gif(b"GIF89a\x01\x02"));
        assert!(is_gif(b"GIF87a"));
        assert!(!is_gif(b"GIF88a"));
        assert!(!is_gif(b"GIF8"));
        assert!(!is_gif(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn garbage_input_is_a_decode_error() {
        assert!(decode(&b"not a gif at all"[..]).is_err());
    }
}
