use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;
use tungstenite::Message;
use crate::config::FeedConfig;
use crate::display::{Host, Spectrum};
use crate::types::FeedEvent;
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("malformed message: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),
    #[error("transport: {0}")]
    Transport(#[from] tungstenite::Error),
    #[error("receiver dropped")]
    ChannelClosed,
}
/// Wire shape: `{"s": [...]}` for a frame, otherwise optional `center` / `span`.
#[derive(Deserialize)]
struct WireMessage {
    s: Option<Vec<f32>>,
    center: Option<f64>,
    span: Option<f64>,
}
pub fn parse_message(text: &str) -> Result<FeedEvent, FeedError> {
    let message: WireMessage = serde_json::from_str(text)?;
    Ok(match message.s {
        Some(bins) => FeedEvent::Frame(bins),
        // A zero center or span is treated as absent.
        None => FeedEvent::Tuning {
            center_hz: message.center.filter(|&hz| hz != 0.0),
            span_hz: message.span.filter(|&hz| hz != 0.0),
        },
    })
}
/// Hands one event to the view. Status events are the GUI's business.
pub fn apply<H: Host>(spectrum: &mut Spectrum<H>, event: FeedEvent) {
    match event {
        FeedEvent::Frame(bins) => spectrum.add_data(&bins),
        FeedEvent::Tuning { center_hz, span_hz } => {
            if let Some(center_hz) = center_hz {
                spectrum.set_center_hz(center_hz);
            }
            if let Some(span_hz) = span_hz {
                spectrum.set_span_hz(span_hz);
            }
        }
        FeedEvent::Status(_) => {}
    }
}
/// Starts the background source; it runs until `tx`'s receiver is dropped.
pub fn spawn_thread(config: FeedConfig, tx: Sender<FeedEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        if config.simulate {
            run_simulation(&config, &tx);
        } else {
            run_websocket(&config, &tx);
        }
    })
}
fn run_websocket(config: &FeedConfig, tx: &Sender<FeedEvent>) {
    let delay = Duration::from_millis(config.reconnect_delay_ms);
    loop {
        match stream_session(&config.url, tx) {
            Ok(()) => info!("closed"),
            Err(FeedError::ChannelClosed) => return,
            Err(e) => warn!("error: {e}"),
        }
        if tx.send(FeedEvent::Status(false)).is_err() {
            return;
        }
        thread::sleep(delay);
    }
}
/// One connection lifetime; `Ok` on a clean close.
fn stream_session(url: &str, tx: &Sender<FeedEvent>) -> Result<(), FeedError> {
    let (mut socket, _) = tungstenite::connect(url)?;
    info!("connected!");
    tx.send(FeedEvent::Status(true))
        .map_err(|_| FeedError::ChannelClosed)?;
    loop {
        match socket.read()? {
            Message::Text(text) => forward(&text, tx)?,
            Message::Binary(bytes) => match std::str::from_utf8(&bytes) {
                Ok(text) => forward(text, tx)?,
                Err(e) => warn!("discarding message: {}", FeedError::from(e)),
            },
            Message::Close(_) => return Ok(()),
            _ => {}
        }
    }
}
/// Parses and sends; malformed messages are logged and dropped.
fn forward(text: &str, tx: &Sender<FeedEvent>) -> Result<(), FeedError> {
    match parse_message(text) {
        Ok(event) => tx.send(event).map_err(|_| FeedError::ChannelClosed),
        Err(e) => {
            warn!("discarding message: {e}");
            Ok(())
        }
    }
}
const SIM_CENTER_HZ: f64 = 100.0e6;
const SIM_SPAN_HZ: f64 = 2.4e6;
const SIM_NOISE_FLOOR_DB: f32 = -95.0;
const SIM_NOISE_DB: f32 = 4.0;
struct Carrier {
    bin: f32,
    drift: f32,
    level_db: f32,
    width_bins: f32,
}
impl Carrier {
    fn level_at(&self, bin: f32) -> f32 {
        let d = (bin - self.bin) / self.width_bins;
        self.level_db - 6.0 * d * d
    }
}
fn simulated_frame(rng: &mut StdRng, bins: usize, carriers: &mut [Carrier]) -> Vec<f32> {
    for carrier in carriers.iter_mut() {
        carrier.bin = (carrier.bin + carrier.drift).rem_euclid(bins.max(1) as f32);
    }
    (0..bins)
        .map(|i| {
            let noise = SIM_NOISE_FLOOR_DB + rng.gen_range(-SIM_NOISE_DB..SIM_NOISE_DB);
            carriers
                .iter()
                .map(|c| c.level_at(i as f32))
                .fold(noise, f32::max)
        })
        .collect()
}
fn run_simulation(config: &FeedConfig, tx: &Sender<FeedEvent>) {
    let mut rng = StdRng::from_entropy();
    let bins = config.simulated_bins;
    let mut carriers: Vec<Carrier> = (0..3)
        .map(|idx| Carrier {
            bin: rng.gen_range(0.0..bins.max(1) as f32),
            drift: 0.2 * (idx as f32 - 1.0),
            level_db: -30.0 - 12.0 * idx as f32,
            width_bins: 2.0 + 3.0 * idx as f32,
        })
        .collect();
    info!("simulated feed: {bins} bins");
    let tuning = FeedEvent::Tuning {
        center_hz: Some(SIM_CENTER_HZ),
        span_hz: Some(SIM_SPAN_HZ),
    };
    if tx.send(FeedEvent::Status(true)).is_err() || tx.send(tuning).is_err() {
        return;
    }
    let interval = Duration::from_millis(config.simulated_interval_ms);
    loop {
        let frame = simulated_frame(&mut rng, bins, &mut carriers);
        if tx.send(FeedEvent::Frame(frame)).is_err() {
            return;
        }
        thread::sleep(interval);
    }
}
