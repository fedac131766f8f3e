use quick_error::quick_error;
use std::io;
use std::num;

quick_error! {
    #[derive(Debug)]
    pub enum BinError {
        GifSlim(err: gifslim::Error) {
            from()
            display("{}", err)
        }
        Io(err: io::Error) {
            from()
            display("{}", err)
        }
        Num(err: num::ParseIntError) {
            from()
            display("{}", err)
        }
        Msg(msg: String) {
            from()
            from(s: &'static str) -> (s.to_string())
            display("{}", msg)
        }
    }
}

pub type BinResult<T> = Result<T, BinError>;
