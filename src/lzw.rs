use crate::container;
use crate::error::CatResult;

/// Entropy coding strategy for the palette-index stream.
///
/// The output must be the complete image-data section a conformant GIF
/// reader expects: the minimum code size byte, the LZW code stream with
/// clear/end markers, chunked into length-prefixed sub-blocks of at most
/// 255 bytes and terminated by a zero-length block.
pub trait Compressor: Send + Sync {
    fn compress(&self, indices: &[u8], min_code_size: u8) -> CatResult<Vec<u8>>;
}

/// Default LZW compressor.
#[derive(Copy, Clone, Default)]
pub struct LzwCompressor;

impl Compressor for LzwCompressor {
    fn compress(&self, indices: &[u8], min_code_size: u8) -> CatResult<Vec<u8>> {
        let compressed = weezl::encode::Encoder::new(weezl::BitOrder::Lsb, min_code_size)
            .encode(indices)?;
        let mut out = Vec::with_capacity(2 + compressed.len() + compressed.len() / 255 + 1);
        out.push(min_code_size);
        container::write_data_sub_blocks(&mut out, &compressed);
        Ok(out)
    }
}
