use image::{Rgb, RgbImage};
use plotters::prelude::*;
use crate::display::error::DisplayError;
use crate::display::glyphs::{self, GLYPH_HEIGHT};
use crate::display::{Gradient, RangeState};
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub background: Rgb<u8>,
    pub grid: RGBColor,
    pub grid_opacity: f64,
    /// Decibel spacing of guide lines and axis labels.
    pub grid_step_db: f32,
    /// Guide lines start here, leaving room for the labels.
    pub grid_left: i32,
    pub label_left: i32,
    pub label_color: Rgb<u8>,
    pub label_scale: u32,
    pub line: RGBColor,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            background: Rgb([0, 0, 0]),
            grid: RGBColor(200, 200, 200),
            grid_opacity: 0.10,
            grid_step_db: 10.0,
            grid_left: 20,
            label_left: 5,
            label_color: Rgb([255, 255, 255]),
            label_scale: 1,
            line: RGBColor(0xfe, 0xfe, 0xfe),
        }
    }
}
/// Tuning metadata shown under the line plot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrequencyLabels {
    pub center_hz: f64,
    pub span_hz: f64,
}
/// Draws the current frame as a filled line plot with a decibel grid.
#[derive(Clone, Debug, Default)]
pub struct SpectrumPlotter {
    style: PlotStyle,
}
impl SpectrumPlotter {
    /// Renders into rows `0..plot_height` of `surface`; rows below are untouched.
    pub fn draw(
        &self,
        surface: &mut RgbImage,
        frame: &[f32],
        plot_height: u32,
        range: &RangeState,
        gradient: &Gradient,
        labels: Option<FrequencyLabels>,
    ) -> Result<(), DisplayError> {
        let (width, height) = surface.dimensions();
        let plot_height = plot_height.min(height);
        if width == 0 || plot_height == 0 {
            return Ok(());
        }
        for y in 0..plot_height {
            for x in 0..width {
                surface.put_pixel(x, y, self.style.background);
            }
        }
        let grid = self.grid_levels(range, plot_height);
        {
            let buf: &mut [u8] = &mut *surface;
            let root = BitMapBackend::with_buffer(buf, (width, height)).into_drawing_area();
            let style = ShapeStyle {
                color: self.style.grid.mix(self.style.grid_opacity),
                filled: false,
                stroke_width: 1,
            };
            for &(_, y) in &grid {
                root.draw(&PathElement::new(
                    vec![(self.style.grid_left, y), (width as i32 - 1, y)],
                    style,
                ))?;
            }
            root.present()?;
        }
        let half_glyph = (GLYPH_HEIGHT * self.style.label_scale / 2) as i32;
        for &(db, y) in &grid {
            glyphs::draw_text(
                surface,
                &format!("{db}"),
                self.style.label_left,
                y - half_glyph,
                self.style.label_scale,
                self.style.label_color,
            );
        }
        if let Some(labels) = labels {
            self.draw_frequency_labels(surface, plot_height, labels);
        }
        if frame.is_empty() {
            return Ok(());
        }
        let bottom = plot_height as i32 - 1;
        let ys: Vec<i32> = frame
            .iter()
            .map(|&v| (bottom - range.squeeze(v, 0, plot_height as i32)).clamp(0, bottom))
            .collect();
        // Bin-index units, scaled uniformly to the surface width.
        let scale_x = width as f64 / frame.len() as f64;
        let to_px = |bin: f64| (bin * scale_x).round() as i32;
        let last = frame.len() - 1;
        let mut outline = Vec::with_capacity(frame.len() + 2);
        outline.push((to_px(-1.0), ys[0]));
        outline.extend(ys.iter().enumerate().map(|(i, &y)| (to_px(i as f64), y)));
        outline.push((to_px(last as f64 + 2.0), ys[last]));
        {
            let buf: &mut [u8] = &mut *surface;
            let root = BitMapBackend::with_buffer(buf, (width, height)).into_drawing_area();
            root.draw(&PathElement::new(outline, self.style.line.stroke_width(1)))?;
            root.present()?;
        }
        self.fill_under(surface, &ys, scale_x, plot_height, gradient);
        Ok(())
    }
    /// `(db, y)` for every guide line: min+step, min+2*step, ... while <= max-step.
    ///
    /// At most one line per plot row; lines squeezed onto the plot's bottom edge are dropped.
    fn grid_levels(&self, range: &RangeState, plot_height: u32) -> Vec<(f32, i32)> {
        let step = self.style.grid_step_db as f64;
        if !(step > 0.0) {
            return Vec::new();
        }
        let (min, max) = (range.min_db() as f64, range.max_db() as f64);
        let count = ((max - min) / step - 1.0).floor();
        if !(count >= 1.0) {
            return Vec::new();
        }
        let count = count.min(plot_height as f64) as u32;
        (1..=count)
            .map(|k| (min + k as f64 * step) as f32)
            .map(|db| (db, plot_height as i32 - range.squeeze(db, 0, plot_height as i32)))
            .filter(|&(_, y)| y < plot_height as i32)
            .collect()
    }
    fn fill_under(&self, surface: &mut RgbImage, ys: &[i32], scale_x: f64, plot_height: u32, gradient: &Gradient) {
        let alpha = gradient.alpha();
        let last = ys.len() - 1;
        let bottom = plot_height as f64 - 1.0;
        for px in 0..surface.width() {
            let bin = (px as f64 + 0.5) / scale_x;
            let y = if bin <= 0.0 {
                ys[0] as f64
            } else if bin >= last as f64 {
                ys[last] as f64
            } else {
                let i = bin.floor() as usize;
                let t = bin - i as f64;
                ys[i] as f64 + (ys[i + 1] - ys[i]) as f64 * t
            };
            let mut row = y.ceil();
            while row < bottom {
                let r = row as u32;
                if let Some(color) = gradient.color_at(r) {
                    let pixel = surface.get_pixel_mut(px, r);
                    for (dst, src) in pixel.0.iter_mut().zip(color) {
                        *dst = (src as f32 * alpha + *dst as f32 * (1.0 - alpha)).round() as u8;
                    }
                }
                row += 1.0;
            }
        }
    }
    fn draw_frequency_labels(&self, surface: &mut RgbImage, plot_height: u32, labels: FrequencyLabels) {
        let scale = self.style.label_scale;
        let y = plot_height as i32 - (GLYPH_HEIGHT * scale) as i32 - 2;
        let mhz = |hz: f64| format!("{:.3}", hz / 1e6);
        let half_span = labels.span_hz / 2.0;
        let left = mhz(labels.center_hz - half_span);
        let center = mhz(labels.center_hz);
        let right = mhz(labels.center_hz + half_span);
        let width = surface.width() as i32;
        let color = self.style.label_color;
        glyphs::draw_text(surface, &left, self.style.label_left, y, scale, color);
        let center_x = (width - glyphs::text_width(&center, scale) as i32) / 2;
        glyphs::draw_text(surface, &center, center_x, y, scale, color);
        let right_x = width - glyphs::text_width(&right, scale) as i32 - self.style.label_left;
        glyphs::draw_text(surface, &right, right_x, y, scale, color);
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::COLORMAPS;
    fn setup(width: u32, height: u32, plot_height: u32) -> (RgbImage, Gradient) {
        let surface = RgbImage::from_pixel(width, height, Rgb([9, 9, 9]));
        (surface, Gradient::build(plot_height, &COLORMAPS[0]))
    }
    #[test]
    fn grid_levels_skip_window_edges() {
        let plotter = SpectrumPlotter::default();
        let levels = plotter.grid_levels(&RangeState::default(), 100);
        let dbs: Vec<f32> = levels.iter().map(|&(db, _)| db).collect();
        assert_eq!(dbs, vec![-90.0, -80.0, -70.0, -60.0, -50.0, -40.0, -30.0, -20.0, -10.0]);
        assert_eq!(levels[0].1, 90);
        assert_eq!(levels[8].1, 10);
    }
    #[test]
    fn grid_levels_stay_bounded_for_huge_windows() {
        let plotter = SpectrumPlotter::default();
        let mut range = RangeState::default();
        for _ in 0..22 {
            range.scale_min(2.0).unwrap();
        }
        // Past 2^24 a 10 dB step no longer changes an f32.
        assert!(range.min_db() < -4e8);
        let levels = plotter.grid_levels(&range, 100);
        assert!(levels.len() <= 100);
        assert!(levels.iter().all(|&(_, y)| (0..100).contains(&y)));
        let widest = RangeState::new(f32::MIN, f32::MAX).unwrap();
        assert!(plotter.grid_levels(&widest, 100).len() <= 100);
    }
    #[test]
    fn grid_levels_empty_for_narrow_window() {
        let plotter = SpectrumPlotter::default();
        let narrow = RangeState::new(-15.0, 0.0).unwrap();
        assert!(plotter.grid_levels(&narrow, 100).is_empty());
        let exact = RangeState::new(-20.0, 0.0).unwrap();
        let dbs: Vec<f32> = plotter.grid_levels(&exact, 100).iter().map(|&(db, _)| db).collect();
        assert_eq!(dbs, vec![-10.0]);
    }
    #[test]
    fn stroke_clamps_to_plot_and_reaches_both_edges() {
        let plotter = SpectrumPlotter::default();
        let (mut surface, gradient) = setup(40, 60, 40);
        let mut frame = vec![-100.0f32; 8];
        frame[0] = 20.0;
        frame[7] = 20.0;
        plotter
            .draw(&mut surface, &frame, 40, &RangeState::default(), &gradient, None)
            .unwrap();
        // Values above max_db land on row 0, and the seam segments cover the outer columns.
        assert_eq!(surface.get_pixel(0, 0).0, [0xfe, 0xfe, 0xfe]);
        // The last bin's fill starts at row 0, so the right seam shows the stroke under the gradient.
        let top = gradient.color_at(0).unwrap();
        let alpha = gradient.alpha();
        let blended = top.map(|c| (c as f32 * alpha + 254.0 * (1.0 - alpha)).round() as u8);
        assert_eq!(surface.get_pixel(39, 0).0, blended);
        // Floor bins sit on the last plot row, not below it.
        assert_eq!(surface.get_pixel(27, 39).0, [0xfe, 0xfe, 0xfe]);
        assert_eq!(surface.get_pixel(27, 40).0, [9, 9, 9]);
    }
    #[test]
    fn fills_under_peak_and_leaves_waterfall_rows() {
        let plotter = SpectrumPlotter::default();
        let (mut surface, gradient) = setup(40, 60, 40);
        let mut frame = vec![-100.0f32; 40];
        frame[20] = 0.0;
        plotter
            .draw(&mut surface, &frame, 40, &RangeState::default(), &gradient, None)
            .unwrap();
        // Rows below the plot region belong to the waterfall.
        assert_eq!(surface.get_pixel(5, 50).0, [9, 9, 9]);
        // Far from the peak the line sits on the floor; above it is background.
        assert_eq!(surface.get_pixel(35, 2).0, [0, 0, 0]);
        // Directly under the peak the gradient fill is visible.
        assert_ne!(surface.get_pixel(20, 20).0, [0, 0, 0]);
    }
    #[test]
    fn grid_line_is_faint() {
        let plotter = SpectrumPlotter::default();
        let (mut surface, gradient) = setup(40, 100, 100);
        plotter
            .draw(&mut surface, &[], 100, &RangeState::default(), &gradient, None)
            .unwrap();
        let px = surface.get_pixel(30, 50).0;
        assert!(px[0] > 0 && px[0] < 60, "{px:?}");
        // Left of the guide lines and clear of labels stays black.
        assert_eq!(surface.get_pixel(2, 50).0, [0, 0, 0]);
    }
    #[test]
    fn zero_height_plot_is_a_noop() {
        let plotter = SpectrumPlotter::default();
        let (mut surface, gradient) = setup(8, 8, 0);
        plotter
            .draw(&mut surface, &[-10.0; 8], 0, &RangeState::default(), &gradient, None)
            .unwrap();
        assert!(surface.pixels().all(|p| p.0 == [9, 9, 9]));
    }
    #[test]
    fn frequency_labels_render_inside_plot() {
        let plotter = SpectrumPlotter::default();
        let (mut surface, gradient) = setup(200, 80, 60);
        let labels = FrequencyLabels {
            center_hz: 100e6,
            span_hz: 2e6,
        };
        plotter
            .draw(&mut surface, &[], 60, &RangeState::default(), &gradient, Some(labels))
            .unwrap();
        // Right-edge label sits clear of the decibel labels on the left.
        let white = (45..60).any(|y| (150..200).any(|x| surface.get_pixel(x, y).0 == [255, 255, 255]));
        assert!(white);
    }
}
