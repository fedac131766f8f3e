/*
 gifslim parallel GIF re-encoder

 This program is free software: you can redistribute it and/or modify
 it under the terms of the GNU Affero General Public License as
 published by the Free Software Foundation, either version 3 of the
 License, or (at your option) any later version.

 This program is distributed in the hope that it will be useful,
 but WITHOUT ANY WARRANTY; without even the implied warranty of
 MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 GNU Affero General Public License for more details.

 You should have received a copy of the GNU Affero General Public License
 along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

#[macro_use] extern crate quick_error;

use imgref::*;
use rgb::*;

mod error;
pub use crate::error::*;
mod container;
mod frameenc;
mod ordparqueue;
pub mod progress;
use crate::progress::*;
mod quant;
pub use crate::quant::{LiqQuantizer, Quantizer};
mod lzw;
pub use crate::lzw::{Compressor, LzwCompressor};
pub mod source;

use std::convert::TryFrom;
use std::fs::File;
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

/// Frames are quantized and compressed on this many workers,
/// regardless of how many frames a session has.
const ENCODE_THREADS: usize = 5;

/// One decoded frame handed over for re-encoding. Produced by an upstream
/// decoder such as [`source::decode_frames`]; immutable once handed in.
pub struct Frame {
    pub image: ImgVec<RGBA8>,
    /// In 1/100ths of a second
    pub delay: u16,
}

/// Per-session configuration, shared read-only by all workers.
#[derive(Copy, Clone)]
pub struct Settings {
    /// Canvas width every frame is resampled to. Must be at least 1.
    pub width: u16,
    /// Canvas height. Must be at least 1.
    pub height: u16,
    /// `Some(0)` loops forever, `Some(n)` repeats n extra times,
    /// `None` writes no loop extension at all (plays once).
    pub loop_count: Option<u16>,
    /// 1-100
    pub quality: u8,
    /// Keep every Nth frame, dropping the rest. Retained frames take over
    /// the delay of the ones dropped, so playback timing is preserved.
    pub sample_every: usize,
    /// `None` picks a disposal automatically (background clear when a
    /// transparent color is set, none otherwise).
    pub dispose: Option<gif::DisposalMethod>,
    /// Color reserved to mean "transparent". Only a palette entry exactly
    /// equal to it is ever flagged transparent.
    pub transparent: Option<RGB8>,
    /// Lower quality, but faster encode
    pub fast: bool,
}

impl Settings {
    pub fn new(width: u16, height: u16) -> Self {
        Settings {
            width,
            height,
            loop_count: Some(0),
            quality: 100,
            sample_every: 2,
            dispose: None,
            transparent: None,
            fast: false,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::new(320, 240)
    }
}

/// Encodes frame lists into GIF streams. One instance can run any number of
/// independent sessions; it keeps no state between [`Encoder::encode`] calls.
pub struct Encoder {
    settings: Settings,
    quantizer: Arc<dyn Quantizer>,
    compressor: Arc<dyn Compressor>,
}

impl Encoder {
    pub fn new(settings: Settings) -> CatResult<Self> {
        Self::with_strategies(settings, Arc::new(LiqQuantizer { fast: settings.fast }), Arc::new(LzwCompressor))
    }

    /// Same as [`Encoder::new`], but with caller-supplied color reduction
    /// and entropy coding strategies.
    pub fn with_strategies(settings: Settings, quantizer: Arc<dyn Quantizer>, compressor: Arc<dyn Compressor>) -> CatResult<Self> {
        if settings.width < 1 || settings.height < 1 {
            return Err(Error::InvalidInput(format!("target canvas {}×{} is empty", settings.width, settings.height)));
        }
        if settings.sample_every < 1 {
            return Err(Error::InvalidInput("sample_every must be at least 1".into()));
        }
        Ok(Self { settings, quantizer, compressor })
    }

    /// Runs one encode session: samples `frames`, encodes the retained ones
    /// in parallel, and writes the assembled stream to `sink` in one go.
    ///
    /// A failing frame does not cancel its siblings; all jobs are awaited,
    /// whatever could be assembled is still flushed, and the first failure
    /// becomes the session result.
    ///
    /// `ProgressReporter.increase()` is called once per assembled frame.
    pub fn encode<W: Write>(&self, frames: Vec<Frame>, mut sink: W, reporter: &mut dyn ProgressReporter) -> CatResult<()> {
        if frames.is_empty() {
            return Err(Error::NoFrames);
        }
        let settings = self.settings;
        let stride = settings.sample_every;
        let (mut jobs, blocks) = ordparqueue::new(ENCODE_THREADS)?;
        for (i, frame) in frames.into_iter().enumerate() {
            if i % stride != 0 {
                continue;
            }
            let is_first = i == 0;
            let delay = frame.delay.saturating_mul(u16::try_from(stride).unwrap_or(u16::MAX));
            let quantizer = Arc::clone(&self.quantizer);
            let compressor = Arc::clone(&self.compressor);
            jobs.push(move || {
                frameenc::encode_frame(i, frame.image, delay, is_first, &settings, &*quantizer, &*compressor)
                    .map_err(|e| Error::FrameEncode(i, Box::new(e)))
            })?;
        }
        drop(jobs); // all jobs submitted, lets the pool drain and exit

        let mut out = Vec::new();
        let mut failed = None;
        for block in blocks {
            match block {
                Ok(block) => {
                    out.extend_from_slice(&block.bytes);
                    if !reporter.increase() {
                        return Err(Error::Aborted);
                    }
                },
                Err(e) => {
                    if failed.is_none() {
                        failed = Some(e);
                    }
                },
            }
        }
        container::write_trailer(&mut out);
        sink.write_all(&out)?;
        sink.flush()?;
        reporter.written_bytes(out.len() as u64);
        match failed {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// One-shot synchronous encode with the default strategies.
pub fn encode<W: Write>(frames: Vec<Frame>, settings: Settings, sink: W) -> CatResult<()> {
    Encoder::new(settings)?.encode(frames, sink, &mut NoProgress {})
}

/// Synchronous path-to-path session. A directory `dest` gets a
/// millisecond-timestamped `.gif` created inside it.
///
/// Returns the path actually written.
pub fn encode_file(src: &Path, mut dest: PathBuf, settings: Settings) -> CatResult<PathBuf> {
    if dest.is_dir() {
        let stamp = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
        dest.push(format!("{}.gif", stamp));
    }
    let frames = source::decode_frames(src)?;
    encode(frames, settings, File::create(&dest)?)?;
    Ok(dest)
}

/// Runs [`encode_file`] on a background thread and reports through exactly
/// one of the callbacks: `on_success` gets the written path, `on_failure`
/// the source path.
///
/// Input validation happens before the thread is spawned, so a missing or
/// non-file source fails immediately (still via `on_failure`).
pub fn encode_async<S, F>(src: PathBuf, dest: PathBuf, settings: Settings, on_success: S, on_failure: F) -> CatResult<()>
where
    S: FnOnce(PathBuf) + Send + 'static,
    F: FnOnce(PathBuf) + Send + 'static,
{
    if !src.is_file() {
        on_failure(src);
        return Ok(());
    }
    thread::Builder::new().name("gifslim-write".into()).spawn(move || {
        match encode_file(&src, dest, settings) {
            Ok(dest) => on_success(dest),
            Err(_) => on_failure(src),
        }
    })?;
    Ok(())
}
