use gifslim::progress::NoProgress;
use gifslim::{CatResult, Encoder, Error, Frame, LzwCompressor, Quantizer, Settings};
use imgref::{ImgRef, ImgVec};
use rgb::RGBA8;
use std::sync::Arc;

fn solid_frame(color: RGBA8, size: usize, delay: u16) -> Frame {
    Frame {
        image: ImgVec::new(vec![color; size * size], size, size),
        delay,
    }
}

fn ten_distinct_frames(size: usize, delay: u16) -> Vec<Frame> {
    (0..10)
        .map(|i| solid_frame(RGBA8::new(20 * i as u8, 255 - 20 * i as u8, 40, 255), size, delay))
        .collect()
}

fn decode_frames_of(bytes: &[u8]) -> (gif::Decoder<&[u8]>, Vec<gif::Frame<'static>>) {
    let mut opts = gif::DecodeOptions::new();
    opts.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = opts.read_info(bytes).expect("output must be a valid GIF");
    let mut frames = Vec::new();
    while let Some(frame) = decoder.read_next_frame().expect("frame must decode") {
        frames.push(frame.clone());
    }
    (decoder, frames)
}

fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

#[test]
fn end_to_end_sampling_and_structure() {
    let mut settings = Settings::new(8, 8);
    settings.sample_every = 2;

    let mut out = Vec::new();
    gifslim::encode(ten_distinct_frames(8, 5), settings, &mut out).unwrap();

    assert_eq!(&out[..6], b"GIF89a");
    assert_eq!(*out.last().unwrap(), 0x3B);
    assert_eq!(count_occurrences(&out, b"GIF89a"), 1);
    assert_eq!(count_occurrences(&out, b"NETSCAPE2.0"), 1);

    let (decoder, frames) = decode_frames_of(&out);
    assert_eq!(decoder.width(), 8);
    assert_eq!(decoder.height(), 8);
    assert!(decoder.global_palette().is_some());

    // 10 source frames at stride 2: 5 retained, each covering its dropped sibling's time
    assert_eq!(frames.len(), 5);
    for frame in &frames {
        assert_eq!(frame.delay, 10);
        assert_eq!((frame.width, frame.height), (8, 8));
    }
    // only the first frame leans on the global color table
    assert!(frames[0].palette.is_none());
    assert!(frames[1..].iter().all(|f| f.palette.is_some()));
}

#[test]
fn once_means_no_loop_extension() {
    let mut settings = Settings::new(8, 8);
    settings.loop_count = None;

    let mut out = Vec::new();
    gifslim::encode(ten_distinct_frames(8, 5), settings, &mut out).unwrap();
    assert_eq!(count_occurrences(&out, b"NETSCAPE"), 0);

    let (_, frames) = decode_frames_of(&out);
    assert_eq!(frames.len(), 5);
}

#[test]
fn sessions_are_independent() {
    let encoder = Encoder::new(Settings::new(8, 8)).unwrap();

    let mut first = Vec::new();
    encoder.encode(ten_distinct_frames(8, 5), &mut first, &mut NoProgress {}).unwrap();
    let mut second = Vec::new();
    encoder.encode(ten_distinct_frames(8, 7), &mut second, &mut NoProgress {}).unwrap();

    for out in [&first, &second] {
        assert_eq!(&out[..6], b"GIF89a");
        assert_eq!(count_occurrences(out, b"GIF89a"), 1);
        let (_, frames) = decode_frames_of(out);
        assert_eq!(frames.len(), 5);
    }
    let (_, frames) = decode_frames_of(&second);
    assert!(frames.iter().all(|f| f.delay == 14));
}

/// Keeps exact colors; fails on any frame painted with the poison color.
struct PoisonedQuantizer {
    poison: RGBA8,
}

impl Quantizer for PoisonedQuantizer {
    fn quantize(&self, image: ImgRef<'_, RGBA8>, _importance_map: &[u8], max_colors: u32, _quality: u8) -> CatResult<(Vec<RGBA8>, Vec<u8>)> {
        if image.buf()[0] == self.poison {
            return Err(Error::InvalidInput("simulated quantizer failure".into()));
        }
        let mut pal: Vec<RGBA8> = Vec::new();
        let mut indexed = Vec::with_capacity(image.width() * image.height());
        for px in image.pixels() {
            let i = pal.iter().position(|&p| p == px).unwrap_or_else(|| {
                pal.push(px);
                pal.len() - 1
            });
            assert!(pal.len() <= max_colors as usize);
            indexed.push(i as u8);
        }
        Ok((pal, indexed))
    }
}

#[test]
fn one_failing_frame_fails_the_session_but_not_the_stream() {
    let poison = RGBA8::new(66, 66, 66, 255);
    let mut settings = Settings::new(4, 4);
    settings.sample_every = 1;

    let frames = vec![
        solid_frame(RGBA8::new(10, 0, 0, 255), 4, 5),
        solid_frame(RGBA8::new(0, 10, 0, 255), 4, 5),
        solid_frame(poison, 4, 5),
        solid_frame(RGBA8::new(0, 0, 10, 255), 4, 5),
    ];

    let encoder = Encoder::with_strategies(
        settings,
        Arc::new(PoisonedQuantizer { poison }),
        Arc::new(LzwCompressor),
    ).unwrap();

    let mut out = Vec::new();
    let res = encoder.encode(frames, &mut out, &mut NoProgress {});
    match res {
        Err(Error::FrameEncode(frame_index, _)) => assert_eq!(frame_index, 2),
        other => panic!("expected a per-frame failure, got {:?}", other),
    }

    // the surviving frames were still assembled and flushed, trailer included
    assert_eq!(&out[..6], b"GIF89a");
    assert_eq!(*out.last().unwrap(), 0x3B);
    let (_, decoded) = decode_frames_of(&out);
    assert_eq!(decoded.len(), 3);
}
