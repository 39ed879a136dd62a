use std::io::Cursor;
use std::rc::Rc;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use crate::display::error::DisplayError;
use crate::display::host::{self, Host};
use crate::display::plot::{FrequencyLabels, SpectrumPlotter};
use crate::display::{ColorMapper, Gradient, RangeState, WaterfallBuffer};
pub const DEFAULT_WF_ROWS: usize = 1024;
pub const DEFAULT_SPECTRUM_PERCENT: i32 = 25;
pub const SPECTRUM_PERCENT_STEP: i32 = 5;
/// Shift applied by `range_up` / `range_down`.
pub const RANGE_STEP_DB: f32 = 5.0;
const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
/// Construction options; zero means "use the default" for rows and percent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumOptions {
    pub wf_size: usize,
    pub wf_rows: usize,
    pub spectrum_percent: i32,
}
impl Default for SpectrumOptions {
    fn default() -> Self {
        Self {
            wf_size: 0,
            wf_rows: DEFAULT_WF_ROWS,
            spectrum_percent: DEFAULT_SPECTRUM_PERCENT,
        }
    }
}
impl SpectrumOptions {
    fn normalized(self) -> Self {
        let wf_rows = if self.wf_rows == 0 {
            DEFAULT_WF_ROWS
        } else {
            self.wf_rows
        };
        let spectrum_percent = match self.spectrum_percent {
            0 => DEFAULT_SPECTRUM_PERCENT,
            p if (0..=100).contains(&p) => p,
            p => {
                warn!("{}; using {DEFAULT_SPECTRUM_PERCENT}", DisplayError::PercentOutOfRange(p));
                DEFAULT_SPECTRUM_PERCENT
            }
        };
        Self {
            wf_size: self.wf_size,
            wf_rows,
            spectrum_percent,
        }
    }
}
/// Live spectrum + waterfall view bound to a host surface.
///
/// Owns every piece of display state; the methods below are the only way to
/// change it. Calls are expected strictly one at a time from the host's
/// event loop.
pub struct Spectrum<H: Host> {
    host: H,
    surface: RgbImage,
    waterfall: WaterfallBuffer,
    plotter: SpectrumPlotter,
    range: RangeState,
    colors: ColorMapper,
    gradient: Rc<Gradient>,
    spectrum_height: u32,
    spectrum_percent: i32,
    spectrum_percent_step: i32,
    paused: bool,
    fullscreen: bool,
    center_hz: Option<f64>,
    span_hz: Option<f64>,
    averaging: u32,
    // Exponential average of incoming frames; equals the last frame when averaging is off.
    line_bins: Vec<f32>,
}
impl<H: Host> Spectrum<H> {
    pub fn new(host: H, options: SpectrumOptions) -> Self {
        let options = options.normalized();
        let colors = ColorMapper::default();
        let (width, height) = host.client_size();
        let mut spectrum = Self {
            host,
            surface: RgbImage::from_pixel(width, height, BACKGROUND),
            waterfall: WaterfallBuffer::new(options.wf_size, options.wf_rows),
            plotter: SpectrumPlotter::default(),
            range: RangeState::default(),
            colors,
            gradient: Rc::new(Gradient::build(0, colors.colormap())),
            spectrum_height: 0,
            spectrum_percent: options.spectrum_percent,
            spectrum_percent_step: SPECTRUM_PERCENT_STEP,
            paused: false,
            fullscreen: false,
            center_hz: None,
            span_hz: None,
            averaging: 0,
            line_bins: Vec::new(),
        };
        spectrum.update_spectrum_ratio();
        spectrum.render();
        spectrum
    }
    /// Draws one frame: line plot on top, new waterfall row underneath.
    pub fn add_data(&mut self, frame: &[f32]) {
        if self.paused {
            return;
        }
        if frame.is_empty() {
            debug!("ignoring empty frame");
            return;
        }
        self.waterfall.reconcile_width(frame.len());
        self.update_line_bins(frame);
        let labels = self.frequency_labels();
        if let Err(e) = self.plotter.draw(
            &mut self.surface,
            &self.line_bins,
            self.spectrum_height,
            &self.range,
            &self.gradient,
            labels,
        ) {
            warn!("spectrum draw failed: {e}");
        }
        self.waterfall.append(frame, &self.range, &self.colors);
        self.render();
        let (width, height) = self.surface.dimensions();
        self.waterfall.composite_onto(
            &mut self.surface,
            self.spectrum_height,
            width,
            height.saturating_sub(self.spectrum_height),
        );
    }
    /// Follows the host's allocated size; a no-op while it is unchanged.
    pub fn render(&mut self) {
        let (width, height) = self.host.client_size();
        if self.surface.dimensions() != (width, height) {
            debug!(
                "surface {:?} -> {}x{}",
                self.surface.dimensions(),
                width,
                height
            );
            self.surface = RgbImage::from_pixel(width, height, BACKGROUND);
            self.update_spectrum_ratio();
        }
    }
    fn update_spectrum_ratio(&mut self) {
        let height = self.surface.height() as f64;
        self.spectrum_height = (height * self.spectrum_percent as f64 / 100.0).round() as u32;
        self.gradient = Rc::new(Gradient::build(self.spectrum_height, self.colors.colormap()));
    }
    fn update_line_bins(&mut self, frame: &[f32]) {
        if self.line_bins.len() != frame.len() {
            self.line_bins = frame.to_vec();
            return;
        }
        let alpha = if self.averaging == 0 {
            1.0
        } else {
            2.0 / (self.averaging as f32 + 1.0)
        };
        for (avg, &value) in self.line_bins.iter_mut().zip(frame) {
            *avg = *avg * (1.0 - alpha) + value * alpha;
        }
    }
    fn frequency_labels(&self) -> Option<FrequencyLabels> {
        match (self.center_hz, self.span_hz) {
            (Some(center_hz), Some(span_hz)) if span_hz > 0.0 => Some(FrequencyLabels { center_hz, span_hz }),
            _ => None,
        }
    }
    pub fn set_range(&mut self, min_db: f32, max_db: f32) {
        if let Err(e) = self.range.set(min_db, max_db) {
            warn!("set_range rejected: {e}");
        }
    }
    pub fn range_up(&mut self) {
        if let Err(e) = self.range.shift(-RANGE_STEP_DB) {
            warn!("range_up rejected: {e}");
        }
    }
    pub fn range_down(&mut self) {
        if let Err(e) = self.range.shift(RANGE_STEP_DB) {
            warn!("range_down rejected: {e}");
        }
    }
    // Only the lower bound scales; max_db stays where it is.
    pub fn range_double(&mut self) {
        if let Err(e) = self.range.scale_min(2.0) {
            warn!("range_double rejected: {e}");
        }
    }
    pub fn range_half(&mut self) {
        if let Err(e) = self.range.scale_min(0.5) {
            warn!("range_half rejected: {e}");
        }
    }
    pub fn set_spectrum_percent(&mut self, percent: i32) {
        if !(0..=100).contains(&percent) {
            debug!("{}", DisplayError::PercentOutOfRange(percent));
            return;
        }
        self.spectrum_percent = percent;
        self.update_spectrum_ratio();
    }
    pub fn increment_spectrum_percent(&mut self) {
        if self.spectrum_percent + self.spectrum_percent_step <= 100 {
            self.set_spectrum_percent(self.spectrum_percent + self.spectrum_percent_step);
        }
    }
    pub fn decrement_spectrum_percent(&mut self) {
        if self.spectrum_percent - self.spectrum_percent_step >= 0 {
            self.set_spectrum_percent(self.spectrum_percent - self.spectrum_percent_step);
        }
    }
    pub fn toggle_color(&mut self) {
        self.colors.toggle();
        self.update_spectrum_ratio();
    }
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
    pub fn toggle_paused(&mut self) {
        self.set_paused(!self.paused);
    }
    /// Enters or leaves fullscreen through the first primitive the host offers.
    ///
    /// The flag flips even when no primitive exists.
    pub fn toggle_fullscreen(&mut self) {
        let entering = !self.fullscreen;
        match host::first_available(self.host.fullscreen_entry_points()) {
            Some(entry) if entering => entry.request(),
            Some(entry) => entry.exit(),
            None => debug!("no fullscreen entry point available"),
        }
        self.fullscreen = entering;
    }
    pub fn set_center_hz(&mut self, center_hz: f64) {
        self.center_hz = Some(center_hz);
    }
    pub fn set_span_hz(&mut self, span_hz: f64) {
        self.span_hz = Some(span_hz);
    }
    pub fn set_averaging(&mut self, averaging: u32) {
        self.averaging = averaging;
    }
    pub fn increment_averaging(&mut self) {
        self.set_averaging(self.averaging.saturating_add(1));
    }
    pub fn decrement_averaging(&mut self) {
        self.set_averaging(self.averaging.saturating_sub(1));
    }
    /// PNG encoding of the visible surface.
    pub fn snapshot_png(&self) -> Result<Vec<u8>, DisplayError> {
        let mut output = Vec::new();
        DynamicImage::ImageRgb8(self.surface.clone())
            .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
        Ok(output)
    }
    pub fn host(&self) -> &H {
        &self.host
    }
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
    pub fn surface(&self) -> &RgbImage {
        &self.surface
    }
    pub fn waterfall(&self) -> &WaterfallBuffer {
        &self.waterfall
    }
    pub fn range(&self) -> RangeState {
        self.range
    }
    pub fn gradient(&self) -> Rc<Gradient> {
        Rc::clone(&self.gradient)
    }
    pub fn spectrum_height(&self) -> u32 {
        self.spectrum_height
    }
    pub fn spectrum_percent(&self) -> i32 {
        self.spectrum_percent
    }
    pub fn color_index(&self) -> usize {
        self.colors.index()
    }
    pub fn is_paused(&self) -> bool {
        self.paused
    }
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }
    pub fn averaging(&self) -> u32 {
        self.averaging
    }
    pub fn line_bins(&self) -> &[f32] {
        &self.line_bins
    }
    pub fn center_hz(&self) -> Option<f64> {
        self.center_hz
    }
    pub fn span_hz(&self) -> Option<f64> {
        self.span_hz
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{HeadlessHost, COLORMAPS};
    fn spectrum(width: u32, height: u32, options: SpectrumOptions) -> Spectrum<HeadlessHost> {
        Spectrum::new(HeadlessHost::new(width, height), options)
    }
    fn mapped_row(spectrum: &Spectrum<HeadlessHost>, frame: &[f32]) -> Vec<u8> {
        let colormap = &COLORMAPS[spectrum.color_index()];
        frame
            .iter()
            .flat_map(|&v| colormap.color(spectrum.range().squeeze(v, 0, 255) as usize))
            .collect()
    }
    #[test]
    fn construction_defaults() {
        let s = spectrum(200, 100, SpectrumOptions::default());
        assert_eq!(s.range(), RangeState::new(-100.0, 0.0).unwrap());
        assert_eq!(s.color_index(), 0);
        assert_eq!(s.spectrum_percent(), 25);
        assert_eq!(s.spectrum_height(), 25);
        assert_eq!(s.gradient().height(), 25);
        assert_eq!(s.surface().dimensions(), (200, 100));
        assert_eq!(s.waterfall().width(), 0);
        assert_eq!(s.waterfall().capacity(), DEFAULT_WF_ROWS);
        assert!(!s.is_paused());
        assert!(!s.is_fullscreen());
    }
    #[test]
    fn zero_options_fall_back_to_defaults() {
        let options = SpectrumOptions {
            wf_size: 16,
            wf_rows: 0,
            spectrum_percent: 0,
        };
        let s = spectrum(10, 10, options);
        assert_eq!(s.waterfall().capacity(), DEFAULT_WF_ROWS);
        assert_eq!(s.waterfall().width(), 16);
        assert_eq!(s.spectrum_percent(), DEFAULT_SPECTRUM_PERCENT);
        let too_big = SpectrumOptions {
            spectrum_percent: 150,
            ..SpectrumOptions::default()
        };
        assert_eq!(spectrum(10, 10, too_big).spectrum_percent(), DEFAULT_SPECTRUM_PERCENT);
    }
    #[test]
    fn render_is_idempotent_without_resize() {
        let mut s = spectrum(64, 48, SpectrumOptions::default());
        let gradient = s.gradient();
        let raster = s.surface().as_raw().as_ptr();
        s.render();
        s.render();
        assert!(Rc::ptr_eq(&gradient, &s.gradient()));
        assert_eq!(raster, s.surface().as_raw().as_ptr());
    }
    #[test]
    fn render_follows_host_resize() {
        let mut s = spectrum(64, 48, SpectrumOptions::default());
        let gradient = s.gradient();
        s.host_mut().set_size(128, 200);
        s.render();
        assert_eq!(s.surface().dimensions(), (128, 200));
        assert_eq!(s.spectrum_height(), 50);
        assert!(!Rc::ptr_eq(&gradient, &s.gradient()));
        assert_eq!(s.gradient().height(), 50);
    }
    #[test]
    fn resize_is_detected_on_add_data() {
        let mut s = spectrum(64, 48, SpectrumOptions::default());
        s.host_mut().set_size(32, 100);
        s.add_data(&[-50.0; 8]);
        assert_eq!(s.surface().dimensions(), (32, 100));
        assert_eq!(s.spectrum_height(), 25);
    }
    #[test]
    fn paused_frames_are_dropped() {
        let mut s = spectrum(64, 48, SpectrumOptions::default());
        s.add_data(&[-20.0; 16]);
        let before = s.surface().clone();
        let gradient = s.gradient();
        s.toggle_paused();
        assert!(s.is_paused());
        s.add_data(&[0.0; 32]);
        assert_eq!(s.surface(), &before);
        assert_eq!(s.waterfall().width(), 16);
        assert_eq!(s.waterfall().rows(), 1);
        assert!(Rc::ptr_eq(&gradient, &s.gradient()));
        s.set_paused(false);
        s.add_data(&[0.0; 32]);
        assert_eq!(s.waterfall().width(), 32);
    }
    #[test]
    fn empty_frame_is_ignored() {
        let mut s = spectrum(64, 48, SpectrumOptions::default());
        s.add_data(&[-20.0; 4]);
        s.add_data(&[]);
        assert_eq!(s.waterfall().width(), 4);
        assert_eq!(s.waterfall().rows(), 1);
    }
    #[test]
    fn spectrum_percent_bounds_are_rejected_not_clamped() {
        let mut s = spectrum(100, 100, SpectrumOptions::default());
        s.set_spectrum_percent(100);
        s.increment_spectrum_percent();
        assert_eq!(s.spectrum_percent(), 100);
        s.set_spectrum_percent(98);
        s.increment_spectrum_percent();
        assert_eq!(s.spectrum_percent(), 98);
        s.set_spectrum_percent(3);
        s.decrement_spectrum_percent();
        assert_eq!(s.spectrum_percent(), 3);
        s.set_spectrum_percent(101);
        s.set_spectrum_percent(-1);
        assert_eq!(s.spectrum_percent(), 3);
        s.set_spectrum_percent(40);
        s.decrement_spectrum_percent();
        assert_eq!(s.spectrum_percent(), 35);
        assert_eq!(s.spectrum_height(), 35);
        s.increment_spectrum_percent();
        assert_eq!(s.spectrum_percent(), 40);
    }
    #[test]
    fn range_controls() {
        let mut s = spectrum(10, 10, SpectrumOptions::default());
        s.range_up();
        assert_eq!(s.range(), RangeState::new(-105.0, -5.0).unwrap());
        s.range_down();
        s.range_down();
        assert_eq!(s.range(), RangeState::new(-95.0, 5.0).unwrap());
        s.set_range(-50.0, 0.0);
        s.range_double();
        assert_eq!(s.range(), RangeState::new(-100.0, 0.0).unwrap());
        s.range_half();
        assert_eq!(s.range(), RangeState::new(-50.0, 0.0).unwrap());
        s.set_range(10.0, -10.0);
        assert_eq!(s.range(), RangeState::new(-50.0, 0.0).unwrap());
        s.set_range(-100.0, -60.0);
        s.range_half();
        assert_eq!(s.range(), RangeState::new(-100.0, -60.0).unwrap());
    }
    #[test]
    fn repeated_range_double_keeps_drawing() {
        let mut s = spectrum(64, 80, SpectrumOptions::default());
        for _ in 0..300 {
            s.range_double();
        }
        assert!(s.range().min_db().is_finite());
        s.add_data(&[-50.0; 16]);
        s.add_data(&[-50.0; 16]);
        assert_eq!(s.waterfall().rows(), 2);
        s.set_range(-100.0, 0.0);
        assert_eq!(s.range(), RangeState::default());
    }
    #[test]
    fn toggle_color_rebuilds_gradient() {
        let mut s = spectrum(10, 100, SpectrumOptions::default());
        let gradient = s.gradient();
        s.toggle_color();
        assert_eq!(s.color_index(), 1);
        assert!(!Rc::ptr_eq(&gradient, &s.gradient()));
        for _ in 1..COLORMAPS.len() {
            s.toggle_color();
        }
        assert_eq!(s.color_index(), 0);
        assert_eq!(*s.gradient(), *gradient);
    }
    #[test]
    fn fullscreen_uses_host_entry_point() {
        let host = HeadlessHost::new(10, 10).with_fullscreen();
        let mut s = Spectrum::new(host, SpectrumOptions::default());
        s.toggle_fullscreen();
        assert!(s.is_fullscreen());
        s.toggle_fullscreen();
        assert!(!s.is_fullscreen());
        let entry = s.host().fullscreen().unwrap();
        assert_eq!((entry.requests, entry.exits), (1, 1));
    }
    #[test]
    fn fullscreen_without_capability_still_flips_flag() {
        let mut s = spectrum(10, 10, SpectrumOptions::default());
        s.toggle_fullscreen();
        assert!(s.is_fullscreen());
    }
    #[test]
    fn averaging_smooths_line_only() {
        let mut s = spectrum(16, 40, SpectrumOptions::default());
        s.set_averaging(3);
        s.add_data(&[-100.0; 4]);
        s.add_data(&[0.0; 4]);
        assert_eq!(s.line_bins(), &[-50.0; 4]);
        assert_eq!(s.waterfall().row(0).unwrap(), mapped_row(&s, &[0.0; 4]).as_slice());
        s.add_data(&[-20.0; 2]);
        assert_eq!(s.line_bins(), &[-20.0; 2]);
        s.decrement_averaging();
        s.decrement_averaging();
        s.decrement_averaging();
        s.decrement_averaging();
        assert_eq!(s.averaging(), 0);
        s.add_data(&[-70.0; 2]);
        assert_eq!(s.line_bins(), &[-70.0; 2]);
        s.increment_averaging();
        assert_eq!(s.averaging(), 1);
    }
    #[test]
    fn tuning_values_are_kept_for_labels() {
        let mut s = spectrum(200, 100, SpectrumOptions::default());
        assert!(s.frequency_labels().is_none());
        s.set_center_hz(100e6);
        assert!(s.frequency_labels().is_none());
        s.set_span_hz(2e6);
        assert_eq!(s.center_hz(), Some(100e6));
        assert_eq!(
            s.frequency_labels(),
            Some(FrequencyLabels {
                center_hz: 100e6,
                span_hz: 2e6
            })
        );
        let range = s.range();
        s.add_data(&[-40.0; 64]);
        assert_eq!(s.range(), range);
    }
    #[test]
    fn snapshot_is_png() {
        let mut s = spectrum(32, 32, SpectrumOptions::default());
        s.add_data(&[-30.0; 8]);
        let png = s.snapshot_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
    #[test]
    fn waterfall_scrolls_newest_first() {
        let options = SpectrumOptions {
            spectrum_percent: 20,
            wf_rows: 4,
            ..SpectrumOptions::default()
        };
        let mut s = spectrum(80, 50, options);
        assert_eq!(s.spectrum_height(), 10);
        let frame = |peak: f32| -> Vec<f32> { (0..8).map(|i| peak - 5.0 * i as f32).collect() };
        let peaks = [-10.0, -30.0, -50.0, -70.0];
        for &peak in &peaks {
            s.add_data(&frame(peak));
            assert_eq!(s.waterfall().row(0).unwrap(), mapped_row(&s, &frame(peak)).as_slice());
        }
        assert_eq!(s.waterfall().rows(), 4);
        assert_eq!(s.waterfall().row(3).unwrap(), mapped_row(&s, &frame(peaks[0])).as_slice());
        // Newest row is composited right under the line plot, 10x10 pixels per cell.
        let newest = mapped_row(&s, &frame(peaks[3]));
        assert_eq!(s.surface().get_pixel(0, 10).0.to_vec(), newest[..3].to_vec());
        assert_eq!(s.surface().get_pixel(79, 19).0.to_vec(), newest[21..].to_vec());
        let row2 = s.waterfall().row(2).unwrap().to_vec();
        s.add_data(&frame(-90.0));
        assert_eq!(s.waterfall().rows(), 4);
        assert_eq!(s.waterfall().row(3).unwrap(), row2.as_slice());
    }
}
