//! Monotonic progress aggregation for lazy recognition streams.
//!
//! The backend yields one segment at a time with an end timestamp; this
//! module converts that into a clamped, never-backwards progress signal
//! relative to the total audio duration. The underlying model occasionally
//! emits a timestamp earlier than one already reported, and displayed
//! progress must never move backwards because of it.

/// Per-file progress state.
///
/// Created fresh for each file and discarded when the file completes or
/// errors. `last_completed` is a monotonic floor; `total` is fixed the first
/// time a usable duration is observed.
#[derive(Debug, Default)]
pub struct ProgressAggregator {
    last_completed: f64,
    total: Option<f64>,
}

/// One emitted progress update. Deltas are always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub delta: f64,
    pub completed: f64,
    pub total: f64,
}

impl ProgressAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds of audio reported complete so far.
    pub fn last_completed(&self) -> f64 {
        self.last_completed
    }

    /// The fixed total, once known.
    pub fn total(&self) -> Option<f64> {
        self.total
    }

    /// Feed one segment's end timestamp.
    ///
    /// Returns `None` (no emission) when:
    /// - no usable total duration is known (missing, non-finite, or <= 0) —
    ///   progress cannot be computed and the caller must not render a bar;
    /// - the clamped delta since `last_completed` is not strictly positive.
    pub fn on_segment_end(&mut self, end_seconds: f64, total_seconds: Option<f64>) -> Option<ProgressUpdate> {
        if self.total.is_none() {
            self.total = total_seconds.filter(|t| t.is_finite() && *t > 0.0);
        }
        let total = self.total?;

        // Clamp below the monotonic floor; this also neutralizes NaN ends
        // because max() prefers the non-NaN operand.
        let current = end_seconds.max(self.last_completed);
        let delta = current - self.last_completed;
        if delta <= 0.0 || !delta.is_finite() {
            return None;
        }

        self.last_completed = current;
        Some(ProgressUpdate {
            delta,
            completed: current,
            total,
        })
    }
}
