use once_cell::sync::Lazy;
pub const COLORMAP_SIZE: usize = 256;
/// Opacity of the spectrum fill.
pub const GRADIENT_ALPHA: f32 = 0.5;
/// 256-entry RGB palette indexed by quantized intensity.
#[derive(Clone, Debug)]
pub struct Colormap {
    pub name: &'static str,
    pub table: [[u8; 3]; COLORMAP_SIZE],
}
impl Colormap {
    /// Linear interpolation between `(position, color)` anchors spanning 0.0..=1.0.
    fn from_stops(name: &'static str, stops: &[(f32, [u8; 3])]) -> Self {
        let mut table = [[0u8; 3]; COLORMAP_SIZE];
        for (i, entry) in table.iter_mut().enumerate() {
            let t = i as f32 / (COLORMAP_SIZE - 1) as f32;
            let upper = stops
                .iter()
                .position(|(pos, _)| *pos >= t)
                .unwrap_or(stops.len() - 1);
            let lower = upper.saturating_sub(1);
            let (p0, c0) = stops[lower];
            let (p1, c1) = stops[upper];
            let frac = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };
            *entry = lerp_rgb(c0, c1, frac);
        }
        Self { name, table }
    }
    pub fn color(&self, index: usize) -> [u8; 3] {
        self.table[index.min(COLORMAP_SIZE - 1)]
    }
}
fn lerp_rgb(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}
/// Fixed palette list, built once on first use and read-only afterwards.
pub static COLORMAPS: Lazy<Vec<Colormap>> = Lazy::new(|| {
    vec![
        Colormap::from_stops(
            "turbo",
            &[
                (0.0, [48, 18, 59]),
                (0.1, [65, 69, 171]),
                (0.2, [70, 117, 237]),
                (0.3, [57, 162, 252]),
                (0.4, [27, 207, 212]),
                (0.5, [36, 236, 166]),
                (0.6, [97, 252, 108]),
                (0.7, [164, 252, 59]),
                (0.8, [225, 221, 55]),
                (0.9, [254, 163, 49]),
                (1.0, [122, 4, 3]),
            ],
        ),
        Colormap::from_stops(
            "fosphor",
            &[
                (0.0, [0, 0, 0]),
                (0.2, [0, 0, 160]),
                (0.4, [0, 150, 255]),
                (0.6, [0, 255, 120]),
                (0.8, [255, 255, 0]),
                (1.0, [255, 0, 0]),
            ],
        ),
        Colormap::from_stops(
            "viridis",
            &[
                (0.0, [68, 1, 84]),
                (0.25, [59, 82, 139]),
                (0.5, [33, 145, 140]),
                (0.75, [94, 201, 98]),
                (1.0, [253, 231, 37]),
            ],
        ),
        Colormap::from_stops(
            "inferno",
            &[
                (0.0, [0, 0, 4]),
                (0.25, [87, 16, 110]),
                (0.5, [188, 55, 84]),
                (0.75, [249, 142, 9]),
                (1.0, [252, 255, 164]),
            ],
        ),
        Colormap::from_stops(
            "magma",
            &[
                (0.0, [0, 0, 4]),
                (0.25, [81, 18, 124]),
                (0.5, [183, 55, 121]),
                (0.75, [252, 137, 97]),
                (1.0, [252, 253, 191]),
            ],
        ),
        Colormap::from_stops(
            "jet",
            &[
                (0.0, [0, 0, 128]),
                (0.125, [0, 0, 255]),
                (0.375, [0, 255, 255]),
                (0.625, [255, 255, 0]),
                (0.875, [255, 0, 0]),
                (1.0, [128, 0, 0]),
            ],
        ),
        Colormap::from_stops("binary", &[(0.0, [0, 0, 0]), (1.0, [255, 255, 255])]),
    ]
});
/// Active palette selection over [`COLORMAPS`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ColorMapper {
    index: usize,
}
impl ColorMapper {
    pub fn new(index: usize) -> Self {
        Self {
            index: index % COLORMAPS.len(),
        }
    }
    pub fn index(&self) -> usize {
        self.index
    }
    pub fn colormap(&self) -> &'static Colormap {
        &COLORMAPS[self.index]
    }
    /// Advances to the next palette, wrapping to the first.
    pub fn toggle(&mut self) {
        self.index = (self.index + 1) % COLORMAPS.len();
    }
    pub fn color(&self, intensity: i32) -> [u8; 3] {
        self.colormap().color(intensity.max(0) as usize)
    }
}
/// Vertical fill ramp for the spectrum plot, one color per pixel row.
///
/// Row 0 takes the last palette entry and the bottom row approaches the first.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    rows: Vec<[u8; 3]>,
    alpha: f32,
}
impl Gradient {
    pub fn build(height: u32, colormap: &Colormap) -> Self {
        let n = COLORMAP_SIZE as f32;
        let rows = (0..height)
            .map(|row| {
                // Stop i sits at i/256 with color table[255 - i]; sample at pixel centres.
                let pos = (row as f32 + 0.5) / height as f32 * n;
                let stop = pos.floor() as usize;
                if stop >= COLORMAP_SIZE - 1 {
                    return colormap.table[0];
                }
                let upper = colormap.table[COLORMAP_SIZE - 1 - stop];
                let lower = colormap.table[COLORMAP_SIZE - 2 - stop];
                lerp_rgb(upper, lower, pos - stop as f32)
            })
            .collect();
        Self {
            rows,
            alpha: GRADIENT_ALPHA,
        }
    }
    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }
    pub fn alpha(&self) -> f32 {
        self.alpha
    }
    pub fn color_at(&self, row: u32) -> Option<[u8; 3]> {
        self.rows.get(row as usize).copied()
    }
}
