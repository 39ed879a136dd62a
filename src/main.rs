// src/main.rs
mod config;
mod display;
mod feed;
mod gui;
mod keymap;
mod types;
use std::sync::mpsc::channel;
use anyhow::anyhow;
use eframe::egui;
use log::info;
use crate::config::AppConfig;
// 入口函数
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = AppConfig::load(config::config_path().as_deref())?;
    info!("feed: {}", if config.feed.simulate { "simulated" } else { config.feed.url.as_str() });
    // 启动后台数据源
    let (tx, rx) = channel();
    feed::spawn_thread(config.feed.clone(), tx);
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([config.window.width, config.window.height])
        .with_title(config.window.title.clone());
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "waterfall",
        options,
        Box::new(move |_cc| Box::new(gui::WaterfallApp::new(&config, rx))),
    )
    .map_err(|e| anyhow!("{e}"))
}
