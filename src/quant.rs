use crate::error::CatResult;
use imagequant::Attributes;
use imgref::ImgRef;
use rgb::RGBA8;

/// Color reduction strategy. The scheduler only relies on this contract;
/// the numerical method behind it is replaceable.
pub trait Quantizer: Send + Sync {
    /// Reduces the image to a palette of at most `max_colors` entries and
    /// one palette index per pixel. Every returned index must be a valid
    /// offset into the palette. Pixels with importance 0 don't contribute
    /// to palette construction.
    fn quantize(&self, image: ImgRef<'_, RGBA8>, importance_map: &[u8], max_colors: u32, quality: u8) -> CatResult<(Vec<RGBA8>, Vec<u8>)>;
}

/// Default quantizer backed by imagequant.
#[derive(Copy, Clone, Default)]
pub struct LiqQuantizer {
    /// Lower quality, but much faster
    pub fast: bool,
}

impl Quantizer for LiqQuantizer {
    fn quantize(&self, image: ImgRef<'_, RGBA8>, importance_map: &[u8], max_colors: u32, quality: u8) -> CatResult<(Vec<RGBA8>, Vec<u8>)> {
        let mut liq = Attributes::new();
        if self.fast {
            liq.set_speed(10);
        }
        liq.set_max_colors(max_colors as i32);
        liq.set_quality(0, quality.into());
        let mut img = liq.new_image_stride(image.buf(), image.width(), image.height(), image.stride(), 0.)?;
        img.set_importance_map(importance_map)?;
        let mut res = liq.quantize(&img)?;
        res.set_dithering_level(0.5);

        let (pal, pal_img) = res.remapped(&mut img)?;
        debug_assert_eq!(image.width() * image.height(), pal_img.len());
        Ok((pal, pal_img))
    }
}
