// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Which slice of the derived sequence has to be materialized for a given
//! scroll position.

pub const DEFAULT_ROW_HEIGHT: f64 = 40.0;
pub const DEFAULT_BUFFER_SIZE: usize = 10;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 600.0;

/// Fixed row height plus the number of overscan rows kept on each side of
/// the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSpec {
    pub row_height: f64,
    pub buffer_size: usize,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl WindowSpec {
    /// `None` unless `row_height` is finite and positive.
    pub fn new(row_height: f64, buffer_size: usize) -> Option<Self> {
        (row_height.is_finite() && row_height > 0.0).then_some(Self {
            row_height,
            buffer_size,
        })
    }

    fn effective_row_height(&self) -> f64 {
        if self.row_height.is_finite() && self.row_height > 0.0 {
            self.row_height
        } else {
            DEFAULT_ROW_HEIGHT
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Window {
    pub start: usize,
    pub end: usize,
    pub visible_row_count: usize,
    pub render_offset: f64,
    pub total_track_height: f64,
}

impl Window {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

pub fn compute_window(
    spec: WindowSpec,
    scroll_offset: f64,
    viewport_height: f64,
    total_rows: usize,
) -> Window {
    let row_height = spec.effective_row_height();
    let scroll_offset = sanitize(scroll_offset);
    let viewport_height = sanitize(viewport_height);

    let visible_row_count = (viewport_height / row_height).ceil() as usize;
    let first = (scroll_offset / row_height).floor() as usize;
    let start = first.saturating_sub(spec.buffer_size).min(total_rows);
    let end = start
        .saturating_add(visible_row_count)
        .saturating_add(spec.buffer_size.saturating_mul(2))
        .min(total_rows);

    Window {
        start,
        end,
        visible_row_count,
        render_offset: start as f64 * row_height,
        total_track_height: total_rows as f64 * row_height,
    }
}

/// Index of the row at the top edge of the viewport.
pub fn first_visible_row(spec: WindowSpec, scroll_offset: f64) -> usize {
    (sanitize(scroll_offset) / spec.effective_row_height()).floor() as usize
}

/// Collapses bursts of scroll events into one update per frame.
#[derive(Debug, Clone, Default)]
pub struct ScrollCoalescer {
    latest: Option<f64>,
}

impl ScrollCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `offset`; returns `true` when no frame was pending yet.
    pub fn push(&mut self, offset: f64) -> bool {
        let request_frame = self.latest.is_none();
        self.latest = Some(offset);
        request_frame
    }

    pub fn take(&mut self) -> Option<f64> {
        self.latest.take()
    }

    pub fn is_pending(&self) -> bool {
        self.latest.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{ScrollCoalescer, WindowSpec, compute_window, first_visible_row};

    #[test]
    fn initial_window_covers_viewport_and_trailing_buffer() {
        let window = compute_window(WindowSpec::default(), 0.0, 600.0, 1_000_000);
        assert_eq!(window.start, 0);
        assert_eq!(window.visible_row_count, 15);
        assert_eq!(window.end, 35);
        assert_eq!(window.render_offset, 0.0);
        assert_eq!(window.total_track_height, 40_000_000.0);
    }

    #[test]
    fn window_in_the_middle_has_buffer_on_both_sides() {
        let window = compute_window(WindowSpec::default(), 4_020.0, 600.0, 1_000);
        // floor(4020 / 40) = 100
        assert_eq!(window.start, 90);
        assert_eq!(window.end, 125);
        assert_eq!(window.render_offset, 3_600.0);
    }

    #[test]
    fn window_near_end_is_clamped() {
        let window = compute_window(WindowSpec::default(), 39_800.0, 600.0, 1_000);
        assert_eq!(window.end, 1_000);
        assert!(window.start <= window.end);
    }

    #[test]
    fn scroll_past_the_end_yields_empty_window() {
        let window = compute_window(WindowSpec::default(), 1_000_000.0, 600.0, 10);
        assert_eq!(window.start, 10);
        assert_eq!(window.end, 10);
        assert!(window.is_empty());
    }

    #[test]
    fn empty_dataset_yields_empty_window() {
        let window = compute_window(WindowSpec::default(), 0.0, 600.0, 0);
        assert!(window.is_empty());
        assert_eq!(window.total_track_height, 0.0);
    }

    #[test]
    fn negative_and_non_finite_inputs_are_treated_as_zero() {
        let spec = WindowSpec::default();
        assert_eq!(
            compute_window(spec, -500.0, 600.0, 100),
            compute_window(spec, 0.0, 600.0, 100)
        );
        assert_eq!(
            compute_window(spec, f64::NAN, f64::INFINITY, 100),
            compute_window(spec, 0.0, 0.0, 100)
        );
        assert_eq!(first_visible_row(spec, -1.0), 0);
    }

    #[test]
    fn every_intersecting_row_lies_inside_the_window() {
        let heights = [1.0, 7.5, 40.0];
        let buffers = [1_usize, 3, 10];
        let totals = [0_usize, 1, 17, 250];
        for row_height in heights {
            for buffer_size in buffers {
                let spec = WindowSpec::new(row_height, buffer_size).expect("valid spec");
                for total_rows in totals {
                    let track = total_rows as f64 * row_height;
                    let mut offset = 0.0;
                    while offset <= track + row_height * 2.0 {
                        for viewport in [0.0, row_height * 0.5, 123.0, 600.0] {
                            let window = compute_window(spec, offset, viewport, total_rows);
                            assert!(window.start <= window.end);
                            assert!(window.end <= total_rows);
                            for row in 0..total_rows {
                                let top = row as f64 * row_height;
                                let bottom = top + row_height;
                                if top < offset + viewport && bottom > offset {
                                    assert!(
                                        window.contains(row),
                                        "row {row} missing at offset {offset} viewport {viewport} \
                                         height {row_height} buffer {buffer_size}: {window:?}"
                                    );
                                }
                            }
                        }
                        offset += row_height * 0.75 + 0.3;
                    }
                }
            }
        }
    }

    #[test]
    fn invalid_row_height_is_rejected() {
        assert!(WindowSpec::new(0.0, 10).is_none());
        assert!(WindowSpec::new(-4.0, 10).is_none());
        assert!(WindowSpec::new(f64::NAN, 10).is_none());
        assert!(WindowSpec::new(1.0, 0).is_some());
    }

    #[test]
    fn first_visible_row_floors_the_offset() {
        let spec = WindowSpec::default();
        assert_eq!(first_visible_row(spec, 0.0), 0);
        assert_eq!(first_visible_row(spec, 39.9), 0);
        assert_eq!(first_visible_row(spec, 80.0), 2);
    }

    #[test]
    fn coalescer_requests_one_frame_and_keeps_last_offset() {
        let mut coalescer = ScrollCoalescer::new();
        assert!(coalescer.push(10.0));
        assert!(!coalescer.push(20.0));
        assert!(!coalescer.push(30.0));
        assert!(coalescer.is_pending());

        assert_eq!(coalescer.take(), Some(30.0));
        assert!(!coalescer.is_pending());
        assert_eq!(coalescer.take(), None);

        assert!(coalescer.push(40.0), "next burst requests a new frame");
    }
}
