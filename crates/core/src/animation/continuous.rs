use serde::Serialize;

use crate::{
    config::{Direction, DisplayConfig},
    looping::RenderBuffer,
    timeline::Millis,
    Easing,
};

/// Distance travelled for `progress` through one cycle, in percent of the
/// visible window. One cycle moves the strip by exactly one slide.
pub fn travel_percent(progress: f64, visible_count: usize) -> f64 {
    progress * (100.0 / visible_count.max(1) as f64)
}

/// Transform to apply for the current display refresh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameUpdate {
    /// Horizontal translation in percent of the window. Negative values move
    /// the strip to the left.
    pub offset_percent: f64,
    /// `false` on the frame that crosses a cycle boundary, where the strip
    /// snaps back to its baseline and must not animate the jump.
    pub transition_enabled: bool,
    pub cycle: u64,
    pub progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContinuousState {
    Running { anchor: Millis },
    Paused { frozen_elapsed: Millis },
}

/// Elapsed-time driven scroller for the looping strip.
///
/// Progress is always derived from the absolute elapsed time, never
/// accumulated, so the offset after a thousand cycles is bit-identical to the
/// offset after one.
#[derive(Debug, Clone)]
pub struct ContinuousAnimator {
    cycle_duration_ms: Millis,
    easing: Easing,
    direction: Direction,
    visible_count: usize,
    baseline_offset_percent: f64,
    state: ContinuousState,
    last_cycle: u64,
}

impl ContinuousAnimator {
    pub fn new(config: &DisplayConfig, buffer: &RenderBuffer) -> Self {
        Self {
            cycle_duration_ms: config.cycle_duration_ms.max(1),
            easing: config.easing,
            direction: config.direction,
            visible_count: buffer.visible_count(),
            baseline_offset_percent: buffer.baseline_offset_percent(),
            state: ContinuousState::Paused { frozen_elapsed: 0 },
            last_cycle: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, ContinuousState::Running { .. })
    }

    /// Adopts a rebuilt buffer and restarts the strip from its baseline.
    pub fn relayout(&mut self, buffer: &RenderBuffer, now: Millis) {
        self.visible_count = buffer.visible_count();
        self.baseline_offset_percent = buffer.baseline_offset_percent();
        self.last_cycle = 0;
        self.state = match self.state {
            ContinuousState::Running { .. } => ContinuousState::Running { anchor: now },
            ContinuousState::Paused { .. } => ContinuousState::Paused { frozen_elapsed: 0 },
        };
    }

    /// Resumes motion from where it was frozen. Returns `false` when already
    /// running.
    pub fn resume(&mut self, now: Millis) -> bool {
        match self.state {
            ContinuousState::Running { .. } => false,
            ContinuousState::Paused { frozen_elapsed } => {
                self.state = ContinuousState::Running {
                    anchor: now.saturating_sub(frozen_elapsed),
                };
                true
            }
        }
    }

    /// Freezes motion. Returns `false` when already paused.
    pub fn pause(&mut self, now: Millis) -> bool {
        match self.state {
            ContinuousState::Paused { .. } => false,
            ContinuousState::Running { anchor } => {
                self.state = ContinuousState::Paused {
                    frozen_elapsed: now.saturating_sub(anchor),
                };
                true
            }
        }
    }

    pub fn elapsed(&self, now: Millis) -> Millis {
        match self.state {
            ContinuousState::Running { anchor } => now.saturating_sub(anchor),
            ContinuousState::Paused { frozen_elapsed } => frozen_elapsed,
        }
    }

    /// Linear progress through the current cycle, in `[0, 1)`.
    pub fn progress(&self, now: Millis) -> f64 {
        let elapsed = self.elapsed(now);
        (elapsed % self.cycle_duration_ms) as f64 / self.cycle_duration_ms as f64
    }

    /// Offset for the given progress, including the padding baseline.
    pub fn offset_at(&self, progress: f64) -> f64 {
        let travel = travel_percent(self.easing.apply(progress), self.visible_count);
        match self.direction {
            Direction::Forward => -(self.baseline_offset_percent + travel),
            Direction::Backward => -(self.baseline_offset_percent - travel),
        }
    }

    /// Offset at rest, before any progress has been made.
    pub fn baseline_offset(&self) -> f64 {
        -self.baseline_offset_percent
    }

    /// Computes the frame for `now`. Paused animators produce nothing, so
    /// the transform stays exactly where it was frozen.
    pub fn tick(&mut self, now: Millis) -> Option<FrameUpdate> {
        if !self.is_running() {
            return None;
        }

        let elapsed = self.elapsed(now);
        let cycle = elapsed / self.cycle_duration_ms;
        let progress = self.progress(now);
        let wrapped = cycle > self.last_cycle;
        self.last_cycle = cycle;

        let offset_percent = if wrapped {
            tracing::trace!(cycle, "continuous strip wrapped to baseline");
            self.baseline_offset()
        } else {
            self.offset_at(progress)
        };

        Some(FrameUpdate {
            offset_percent,
            transition_enabled: !wrapped,
            cycle,
            progress,
        })
    }

    /// Parameters for the stylesheet-driven variant, where one keyframe
    /// iteration scrolls through a whole copy of the slide set.
    pub fn keyframe_plan(&self, buffer: &RenderBuffer) -> KeyframePlan {
        let source_len = buffer.source_len() as u64;
        let distance = travel_percent(buffer.source_len() as f64, buffer.visible_count());
        let move_distance_percent = match self.direction {
            Direction::Forward => -(self.baseline_offset_percent + distance),
            Direction::Backward => -(self.baseline_offset_percent - distance),
        };

        KeyframePlan {
            slide_width_percent: buffer.slide_width_percent(),
            start_offset_percent: self.baseline_offset(),
            move_distance_percent,
            duration_ms: self.cycle_duration_ms * source_len.max(1),
            easing: self.easing,
        }
    }
}

/// Custom property values consumed by the keyframe stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyframePlan {
    pub slide_width_percent: f64,
    pub start_offset_percent: f64,
    pub move_distance_percent: f64,
    pub duration_ms: Millis,
    pub easing: Easing,
}
