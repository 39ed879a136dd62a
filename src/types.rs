// src/types.rs

// 后台数据源发给 GUI 的消息
#[derive(Clone, Debug, PartialEq)]
pub enum FeedEvent {
    // 一帧频谱 (dB)
    Frame(Vec<f32>),
    // 调谐信息，字段各自可选
    Tuning {
        center_hz: Option<f64>,
        span_hz: Option<f64>,
    },
    // 连接状态
    Status(bool),
}
