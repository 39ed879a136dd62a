// src/display/mod.rs
pub mod colormap;
pub mod error;
pub mod glyphs;
pub mod host;
pub mod plot;
pub mod range;
pub mod spectrum;
pub mod waterfall;
pub use colormap::{ColorMapper, Gradient};
#[cfg(test)]
pub use colormap::COLORMAPS;
pub use error::DisplayError;
#[cfg(test)]
pub use host::HeadlessHost;
pub use host::{Fullscreen, Host};
pub use range::RangeState;
pub use spectrum::{Spectrum, SpectrumOptions};
pub use waterfall::WaterfallBuffer;
