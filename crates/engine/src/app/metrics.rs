use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub worst_frame_ms: f32,
}

/// Frame timings gathered over one reporting window.
#[derive(Debug, Clone, Copy, Default)]
struct FrameWindow {
    count: u32,
    total: Duration,
    worst: Duration,
}

impl FrameWindow {
    fn snapshot(&self, elapsed: Duration) -> LoopMetricsSnapshot {
        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let mean = self.total.checked_div(self.count).unwrap_or_default();
        LoopMetricsSnapshot {
            fps: self.count as f32 / seconds,
            frame_time_ms: mean.as_secs_f32() * 1000.0,
            worst_frame_ms: self.worst.as_secs_f32() * 1000.0,
        }
    }
}

/// Rolls frame timings into one snapshot per `period`.
#[derive(Debug)]
pub(crate) struct LoopMetrics {
    period: Duration,
    opened: Instant,
    window: FrameWindow,
}

impl LoopMetrics {
    pub(crate) fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            opened: now,
            window: FrameWindow::default(),
        }
    }

    pub(crate) fn record(&mut self, frame: Duration) {
        let window = &mut self.window;
        window.count = window.count.saturating_add(1);
        window.total = window.total.saturating_add(frame);
        window.worst = window.worst.max(frame);
    }

    /// Closes the window once `period` has passed and starts an empty one.
    pub(crate) fn flush(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.opened);
        if elapsed < self.period {
            return None;
        }
        let closed = std::mem::take(&mut self.window);
        self.opened = now;
        Some(closed.snapshot(elapsed))
    }
}
