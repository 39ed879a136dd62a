use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use log::{info, warn};
use crate::display::{Host, Spectrum};
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    TogglePaused,
    ToggleFullscreen,
    ToggleColor,
    RangeUp,
    RangeDown,
    RangeHalf,
    RangeDouble,
    IncrementSpectrumPercent,
    DecrementSpectrumPercent,
    IncrementAveraging,
    DecrementAveraging,
    Snapshot,
}
// Key names follow the browser `KeyboardEvent.key` convention.
const BINDINGS: &[(&str, Action)] = &[
    (" ", Action::TogglePaused),
    ("f", Action::ToggleFullscreen),
    ("c", Action::ToggleColor),
    ("ArrowUp", Action::RangeUp),
    ("ArrowDown", Action::RangeDown),
    ("ArrowLeft", Action::RangeHalf),
    ("ArrowRight", Action::RangeDouble),
    ("s", Action::IncrementSpectrumPercent),
    ("w", Action::DecrementSpectrumPercent),
];
const EXTENDED_BINDINGS: &[(&str, Action)] = &[
    ("+", Action::IncrementAveraging),
    ("-", Action::DecrementAveraging),
    ("p", Action::Snapshot),
];
#[derive(Clone, Copy, Debug)]
pub struct KeyMap {
    extended: bool,
}
impl KeyMap {
    pub fn new(extended: bool) -> Self {
        Self { extended }
    }
    pub fn action(&self, key: &str) -> Option<Action> {
        let extended: &[(&str, Action)] = if self.extended { EXTENDED_BINDINGS } else { &[] };
        BINDINGS
            .iter()
            .chain(extended)
            .find(|(name, _)| *name == key)
            .map(|&(_, action)| action)
    }
}
pub fn apply<H: Host>(spectrum: &mut Spectrum<H>, action: Action) {
    match action {
        Action::TogglePaused => spectrum.toggle_paused(),
        Action::ToggleFullscreen => spectrum.toggle_fullscreen(),
        Action::ToggleColor => spectrum.toggle_color(),
        Action::RangeUp => spectrum.range_up(),
        Action::RangeDown => spectrum.range_down(),
        Action::RangeHalf => spectrum.range_half(),
        Action::RangeDouble => spectrum.range_double(),
        Action::IncrementSpectrumPercent => spectrum.increment_spectrum_percent(),
        Action::DecrementSpectrumPercent => spectrum.decrement_spectrum_percent(),
        Action::IncrementAveraging => spectrum.increment_averaging(),
        Action::DecrementAveraging => spectrum.decrement_averaging(),
        Action::Snapshot => save_snapshot(spectrum),
    }
}
fn save_snapshot<H: Host>(spectrum: &Spectrum<H>) {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let path = PathBuf::from(format!("waterfall-{timestamp}.png"));
    match spectrum.snapshot_png() {
        Ok(png) => match std::fs::write(&path, png) {
            Ok(()) => info!("snapshot saved to {}", path.display()),
            Err(e) => warn!("snapshot {} failed: {e}", path.display()),
        },
        Err(e) => warn!("snapshot failed: {e}"),
    }
}
