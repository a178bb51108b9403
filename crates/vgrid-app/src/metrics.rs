// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Render metrics flow from the grid to whoever displays them through an
//! explicit [`MetricsSink`].

use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use crate::format::format_thousands;

pub const INITIAL_FPS: u32 = 60;
const FPS_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderMetrics {
    pub rendered_rows: usize,
    pub scroll_row: usize,
    pub total_rows: usize,
}

pub trait MetricsSink {
    fn publish(&mut self, metrics: RenderMetrics);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl MetricsSink for NullSink {
    fn publish(&mut self, _metrics: RenderMetrics) {}
}

impl MetricsSink for Vec<RenderMetrics> {
    fn publish(&mut self, metrics: RenderMetrics) {
        self.push(metrics);
    }
}

/// Forwards metrics over an mpsc channel. A dropped receiver is not an
/// error; publishing just stops having an effect.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<RenderMetrics>,
}

impl ChannelSink {
    pub fn new(tx: Sender<RenderMetrics>) -> Self {
        Self { tx }
    }
}

impl MetricsSink for ChannelSink {
    fn publish(&mut self, metrics: RenderMetrics) {
        let _ = self.tx.send(metrics);
    }
}

impl<S: MetricsSink + ?Sized> MetricsSink for Box<S> {
    fn publish(&mut self, metrics: RenderMetrics) {
        (**self).publish(metrics);
    }
}

/// Counts frames and reports a rate once per second.
#[derive(Debug, Clone)]
pub struct FrameRateSampler {
    window_start: Instant,
    frames: u32,
    fps: u32,
}

impl FrameRateSampler {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            fps: INITIAL_FPS,
        }
    }

    pub const fn fps(&self) -> u32 {
        self.fps
    }

    /// Counts one frame; returns the new reading when a window closes.
    pub fn record_frame(&mut self, now: Instant) -> Option<u32> {
        self.frames = self.frames.saturating_add(1);
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < FPS_WINDOW {
            return None;
        }
        let elapsed_ms = elapsed.as_millis() as f64;
        self.fps = (f64::from(self.frames) * 1000.0 / elapsed_ms).round() as u32;
        self.frames = 0;
        self.window_start = now;
        Some(self.fps)
    }
}

/// Observer-side copy of the latest metrics, ready for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsReadout {
    pub metrics: RenderMetrics,
    pub fps: u32,
}

impl Default for MetricsReadout {
    fn default() -> Self {
        Self {
            metrics: RenderMetrics::default(),
            fps: INITIAL_FPS,
        }
    }
}

impl MetricsReadout {
    pub fn apply(&mut self, metrics: RenderMetrics) {
        self.metrics = metrics;
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps;
    }

    pub fn scroll_position_label(&self) -> String {
        format!(
            "{} / {}",
            format_thousands(self.metrics.scroll_row),
            format_thousands(self.metrics.total_rows)
        )
    }

    pub fn rendered_rows_label(&self) -> String {
        format_thousands(self.metrics.rendered_rows)
    }

    pub fn fps_label(&self) -> String {
        self.fps.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ChannelSink, FrameRateSampler, MetricsReadout, MetricsSink, RenderMetrics,
    };
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    #[test]
    fn sampler_starts_at_sixty_and_reports_once_per_window() {
        let start = Instant::now();
        let mut sampler = FrameRateSampler::new(start);
        assert_eq!(sampler.fps(), 60);

        for frame in 1..30 {
            let now = start + Duration::from_millis(frame * 33);
            assert_eq!(sampler.record_frame(now), None);
        }
        // 30 frames in 1000 ms.
        assert_eq!(
            sampler.record_frame(start + Duration::from_millis(1000)),
            Some(30)
        );
        assert_eq!(sampler.fps(), 30);

        assert_eq!(
            sampler.record_frame(start + Duration::from_millis(1100)),
            None
        );
    }

    #[test]
    fn sampler_scales_by_actual_window_length() {
        let start = Instant::now();
        let mut sampler = FrameRateSampler::new(start);
        for _ in 0..59 {
            sampler.record_frame(start + Duration::from_millis(10));
        }
        // 60 frames over two seconds.
        assert_eq!(sampler.record_frame(start + Duration::from_secs(2)), Some(30));
    }

    #[test]
    fn channel_sink_delivers_and_tolerates_closed_receiver() {
        let (tx, rx) = mpsc::channel();
        let mut sink = ChannelSink::new(tx);
        let metrics = RenderMetrics {
            rendered_rows: 35,
            scroll_row: 0,
            total_rows: 1_000,
        };
        sink.publish(metrics);
        assert_eq!(rx.try_recv(), Ok(metrics));

        drop(rx);
        sink.publish(metrics);
    }

    #[test]
    fn readout_labels_use_thousands_separators() {
        let mut readout = MetricsReadout::default();
        assert_eq!(readout.fps_label(), "60");

        readout.apply(RenderMetrics {
            rendered_rows: 1_035,
            scroll_row: 12_345,
            total_rows: 1_000_000,
        });
        readout.set_fps(58);
        assert_eq!(readout.scroll_position_label(), "12,345 / 1,000,000");
        assert_eq!(readout.rendered_rows_label(), "1,035");
        assert_eq!(readout.fps_label(), "58");
    }
}
