/// Platform primitive that can put the visible surface into fullscreen.
pub trait Fullscreen {
    fn is_available(&self) -> bool;
    fn request(&mut self);
    fn exit(&mut self);
}
/// Window or page that owns the visible surface.
pub trait Host {
    /// Size the host currently allocates to the visible surface, in pixels.
    fn client_size(&self) -> (u32, u32);
    /// Fullscreen primitives in the order they should be tried.
    fn fullscreen_entry_points(&mut self) -> Vec<&mut dyn Fullscreen> {
        Vec::new()
    }
}
/// First entry point the platform actually offers, if any.
pub fn first_available<'a>(entries: Vec<&'a mut dyn Fullscreen>) -> Option<&'a mut dyn Fullscreen> {
    entries.into_iter().find(|entry| entry.is_available())
}
/// Fixed-size host without a window, used for tests and offline rendering.
#[derive(Clone, Debug, Default)]
pub struct HeadlessHost {
    size: (u32, u32),
    fullscreen: Option<RecordingFullscreen>,
}
impl HeadlessHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            fullscreen: None,
        }
    }
    /// Adds a fullscreen primitive that only records calls.
    pub fn with_fullscreen(mut self) -> Self {
        self.fullscreen = Some(RecordingFullscreen::default());
        self
    }
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }
    pub fn fullscreen(&self) -> Option<&RecordingFullscreen> {
        self.fullscreen.as_ref()
    }
}
impl Host for HeadlessHost {
    fn client_size(&self) -> (u32, u32) {
        self.size
    }
    fn fullscreen_entry_points(&mut self) -> Vec<&mut dyn Fullscreen> {
        match self.fullscreen.as_mut() {
            Some(entry) => vec![entry as &mut dyn Fullscreen],
            None => Vec::new(),
        }
    }
}
#[derive(Clone, Debug, Default)]
pub struct RecordingFullscreen {
    pub requests: usize,
    pub exits: usize,
}
impl Fullscreen for RecordingFullscreen {
    fn is_available(&self) -> bool {
        true
    }
    fn request(&mut self) {
        self.requests += 1;
    }
    fn exit(&mut self) {
        self.exits += 1;
    }
}
