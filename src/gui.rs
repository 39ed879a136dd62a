// src/gui.rs
use std::sync::mpsc::Receiver;
use std::time::Duration;
use eframe::egui;
use egui::{Color32, ColorImage, Key, Rect, TextureHandle, TextureOptions, ViewportCommand};
use crate::config::AppConfig;
use crate::display::{Fullscreen, Host, Spectrum};
use crate::feed;
use crate::keymap::{self, KeyMap};
use crate::types::FeedEvent;

// 视口全屏方式，按优先顺序尝试
#[derive(Clone, Copy, Debug, PartialEq)]
enum ViewportMode {
    Fullscreen,
    Maximized,
}

struct ViewportEntry {
    mode: ViewportMode,
    available: bool,
    queued: Vec<ViewportCommand>,
}

impl ViewportEntry {
    fn new(mode: ViewportMode, available: bool) -> Self {
        Self { mode, available, queued: Vec::new() }
    }

    fn command(&self, on: bool) -> ViewportCommand {
        match self.mode {
            ViewportMode::Fullscreen => ViewportCommand::Fullscreen(on),
            ViewportMode::Maximized => ViewportCommand::Maximized(on),
        }
    }
}

impl Fullscreen for ViewportEntry {
    fn is_available(&self) -> bool {
        self.available
    }

    fn request(&mut self) {
        let cmd = self.command(true);
        self.queued.push(cmd);
    }

    fn exit(&mut self) {
        let cmd = self.command(false);
        self.queued.push(cmd);
    }
}

/// eframe window hosting the visible surface.
pub struct WindowHost {
    client: (u32, u32),
    native: ViewportEntry,
    maximize: ViewportEntry,
}

impl WindowHost {
    fn new(allow_fullscreen: bool) -> Self {
        Self {
            client: (0, 0),
            native: ViewportEntry::new(ViewportMode::Fullscreen, allow_fullscreen),
            maximize: ViewportEntry::new(ViewportMode::Maximized, true),
        }
    }

    fn set_client_size(&mut self, width: u32, height: u32) {
        self.client = (width, height);
    }

    fn take_commands(&mut self) -> Vec<ViewportCommand> {
        let mut cmds = std::mem::take(&mut self.native.queued);
        cmds.append(&mut self.maximize.queued);
        cmds
    }
}

impl Host for WindowHost {
    fn client_size(&self) -> (u32, u32) {
        self.client
    }

    fn fullscreen_entry_points(&mut self) -> Vec<&mut dyn Fullscreen> {
        vec![&mut self.native as &mut dyn Fullscreen, &mut self.maximize as &mut dyn Fullscreen]
    }
}

// egui 键 -> 浏览器风格键名
fn key_name(key: Key) -> Option<&'static str> {
    let name = match key {
        Key::Space => " ",
        Key::F => "f",
        Key::C => "c",
        Key::S => "s",
        Key::W => "w",
        Key::P => "p",
        Key::ArrowUp => "ArrowUp",
        Key::ArrowDown => "ArrowDown",
        Key::ArrowLeft => "ArrowLeft",
        Key::ArrowRight => "ArrowRight",
        Key::PlusEquals => "+",
        Key::Minus => "-",
        _ => return None,
    };
    Some(name)
}

pub struct WaterfallApp {
    spectrum: Spectrum<WindowHost>,
    rx: Receiver<FeedEvent>,
    keymap: KeyMap,
    texture: Option<TextureHandle>,
    base_title: String,
    title: String,
    is_connected: bool,
}

impl WaterfallApp {
    pub fn new(config: &AppConfig, rx: Receiver<FeedEvent>) -> Self {
        let host = WindowHost::new(config.window.allow_fullscreen);
        let mut spectrum = Spectrum::new(host, config.display);
        spectrum.set_averaging(config.averaging);
        Self {
            spectrum,
            rx,
            keymap: KeyMap::new(config.extended_keys),
            texture: None,
            base_title: config.window.title.clone(),
            title: String::new(),
            is_connected: false,
        }
    }

    fn drain_feed(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                FeedEvent::Status(connected) => self.is_connected = connected,
                other => feed::apply(&mut self.spectrum, other),
            }
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let keys: Vec<Key> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Key { key, pressed: true, .. } => Some(*key),
                    _ => None,
                })
                .collect()
        });
        for key in keys {
            if let Some(action) = key_name(key).and_then(|name| self.keymap.action(name)) {
                keymap::apply(&mut self.spectrum, action);
            }
        }
    }

    fn upload_surface(&mut self, ctx: &egui::Context) -> Option<egui::TextureId> {
        let surface = self.spectrum.surface();
        let (w, h) = surface.dimensions();
        if w == 0 || h == 0 {
            return None;
        }
        let image = ColorImage::from_rgb([w as usize, h as usize], surface.as_raw());
        if let Some(tex) = self.texture.as_mut() {
            tex.set(image, TextureOptions::NEAREST);
        } else {
            self.texture = Some(ctx.load_texture("waterfall", image, TextureOptions::NEAREST));
        }
        self.texture.as_ref().map(|t| t.id())
    }

    fn update_title(&mut self, ctx: &egui::Context) {
        let mut title = format!(
            "{} ({})",
            self.base_title,
            if self.is_connected { "connected" } else { "disconnected" }
        );
        if self.spectrum.is_paused() {
            title.push_str(" - paused");
        }
        if title != self.title {
            ctx.send_viewport_cmd(ViewportCommand::Title(title.clone()));
            self.title = title;
        }
    }
}

impl eframe::App for WaterfallApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().frame(egui::Frame::none()).show(ctx, |ui| {
            // 1. 宿主分配的尺寸 (像素)，下一帧数据到达时生效
            let rect = ui.available_rect_before_wrap();
            let ppp = ctx.pixels_per_point();
            self.spectrum.host_mut().set_client_size(
                (rect.width() * ppp).round() as u32,
                (rect.height() * ppp).round() as u32,
            );

            // 2. 数据与按键
            self.drain_feed();
            self.handle_keys(ctx);
            for cmd in self.spectrum.host_mut().take_commands() {
                ctx.send_viewport_cmd(cmd);
            }

            // 3. 绘制
            if let Some(id) = self.upload_surface(ctx) {
                let uv = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                ui.painter().image(id, rect, uv, Color32::WHITE);
            }
        });
        self.update_title(ctx);
        ctx.request_repaint_after(Duration::from_millis(16));
    }
}
