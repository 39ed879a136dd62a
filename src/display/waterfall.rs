use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use log::debug;
use crate::display::{ColorMapper, RangeState};
const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
/// Off-screen raster holding the most recent frames, newest in row 0.
pub struct WaterfallBuffer {
    raster: RgbImage,
    capacity: usize,
    filled: usize,
}
impl WaterfallBuffer {
    pub fn new(width: usize, capacity: usize) -> Self {
        Self {
            raster: RgbImage::from_pixel(width as u32, capacity as u32, BACKGROUND),
            capacity,
            filled: 0,
        }
    }
    pub fn width(&self) -> usize {
        self.raster.width() as usize
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    /// Rows written since the last reallocation, never more than the capacity.
    pub fn rows(&self) -> usize {
        self.filled
    }
    pub fn raster(&self) -> &RgbImage {
        &self.raster
    }
    /// RGB bytes of row `index`, or `None` past the retained history.
    pub fn row(&self, index: usize) -> Option<&[u8]> {
        if index >= self.filled {
            return None;
        }
        let stride = self.width() * 3;
        let start = index * stride;
        Some(&self.raster.as_raw()[start..start + stride])
    }
    /// Reallocates to `width` columns if needed, dropping all history.
    pub fn reconcile_width(&mut self, width: usize) {
        if width != self.width() {
            debug!("waterfall width {} -> {}, history cleared", self.width(), width);
            *self = Self::new(width, self.capacity);
        }
    }
    /// Scrolls the raster down one row and writes `frame` color-mapped into row 0.
    pub fn append(&mut self, frame: &[f32], range: &RangeState, colors: &ColorMapper) {
        self.reconcile_width(frame.len());
        if self.capacity == 0 {
            return;
        }
        let stride = self.width() * 3;
        let buf: &mut [u8] = &mut self.raster;
        let keep = (self.capacity - 1) * stride;
        buf.copy_within(0..keep, stride);
        for (pixel, &value) in buf[..stride].chunks_exact_mut(3).zip(frame) {
            pixel.copy_from_slice(&colors.color(range.squeeze(value, 0, 255)));
        }
        self.filled = (self.filled + 1).min(self.capacity);
    }
    /// Blits the whole raster scaled to `width x height` at row `top` of `surface`.
    pub fn composite_onto(&self, surface: &mut RgbImage, top: u32, width: u32, height: u32) {
        if self.raster.width() == 0 || self.raster.height() == 0 || width == 0 || height == 0 {
            return;
        }
        let scaled = imageops::resize(&self.raster, width, height, FilterType::Nearest);
        imageops::replace(surface, &scaled, 0, top as i64);
    }
}
