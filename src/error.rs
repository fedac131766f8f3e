use std::io;

quick_error! {
    #[derive(Debug)]
    pub enum Error {
        NoFrames {
            display("Found no usable frames to encode")
        }
        InvalidInput(msg: String) {
            display("Invalid input: {}", msg)
        }
        Aborted {
            display("aborted")
        }
        ThreadSend {
            display("Internal error related to thread communication")
        }
        /// A single worker's encode job failed. Sibling jobs still run;
        /// this is the aggregate session result.
        FrameEncode(frame_index: usize, err: Box<Error>) {
            display("Frame {} failed to encode: {}", frame_index, err)
        }
        Io(err: io::Error) {
            from()
            display("I/O error: {}", err)
        }
        GifDecode(err: gif::DecodingError) {
            from()
            display("Unable to decode the source GIF: {}", err)
        }
        Dispose(err: gif_dispose::Error) {
            from()
            display("Unable to compose the source GIF: {}", err)
        }
        Quant(liq: imagequant::liq_error) {
            from()
            display("pngquant error: {}", liq)
        }
        Lzw(err: weezl::LzwError) {
            from()
            display("LZW compression error: {}", err)
        }
        Resize(err: resize::Error) {
            from()
            display("Resizing error: {}", err)
        }
    }
}

pub type CatResult<T> = Result<T, Error>;
