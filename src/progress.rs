//! For tracking conversion progress and aborting early

pub use pbr::ProgressBar;

/// A trait that is used to report progress to some consumer.
pub trait ProgressReporter: Send {
    /// Called for each frame as its block lands in the output stream.
    ///
    /// This method may return `false` to abort processing.
    fn increase(&mut self) -> bool;

    /// Total size of the assembled stream
    fn written_bytes(&mut self, _current_file_size_in_bytes: u64) {}

    /// Writing is done when the encode call returns
    fn done(&mut self, _msg: &str) {}
}

/// No-op progress reporter
pub struct NoProgress {}

impl ProgressReporter for NoProgress {
    fn increase(&mut self) -> bool {
        true
    }
}

/// Implement the progress reporter trait for a progress bar,
/// to make it usable for frame processing reporting.
impl<T> ProgressReporter for ProgressBar<T> where T: std::io::Write + Send {
    fn increase(&mut self) -> bool {
        self.inc();
        true
    }

    fn done(&mut self, msg: &str) {
        self.finish_print(msg);
    }
}
