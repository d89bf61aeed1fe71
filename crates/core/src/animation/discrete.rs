use serde::Serialize;

use crate::{config::NavigationWrap, looping::RenderBuffer, timeline::Millis};

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationOutcome {
    Moved { index: usize },
    /// Already at the requested position; no transition started.
    Unchanged,
    /// Dropped because the previous transition has not settled.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiscreteState {
    Idle,
    Transitioning { until: Millis },
}

/// Index based stepper with a cooperative settle window.
#[derive(Debug, Clone)]
pub struct DiscreteAnimator {
    index: usize,
    max_index: usize,
    visible_count: usize,
    wrap: NavigationWrap,
    settle_delay_ms: Millis,
    state: DiscreteState,
}

impl DiscreteAnimator {
    pub fn new(buffer: &RenderBuffer, wrap: NavigationWrap, settle_delay_ms: Millis) -> Self {
        Self {
            index: 0,
            max_index: buffer.source_len().saturating_sub(buffer.visible_count()),
            visible_count: buffer.visible_count(),
            wrap,
            settle_delay_ms,
            state: DiscreteState::Idle,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn max_index(&self) -> usize {
        self.max_index
    }

    /// Adopts a rebuilt buffer, keeping the index when it is still valid.
    pub fn relayout(&mut self, buffer: &RenderBuffer) {
        self.max_index = buffer.source_len().saturating_sub(buffer.visible_count());
        self.visible_count = buffer.visible_count();
        self.index = self.index.min(self.max_index);
        self.state = DiscreteState::Idle;
    }

    pub fn is_transitioning(&self, now: Millis) -> bool {
        match self.state {
            DiscreteState::Idle => false,
            DiscreteState::Transitioning { until } => now < until,
        }
    }

    pub fn next(&mut self, now: Millis) -> NavigationOutcome {
        let target = match self.wrap {
            NavigationWrap::Clamp => (self.index + 1).min(self.max_index),
            NavigationWrap::Wrap => (self.index + 1) % (self.max_index + 1),
        };
        self.navigate(target, now)
    }

    pub fn previous(&mut self, now: Millis) -> NavigationOutcome {
        let target = match self.wrap {
            NavigationWrap::Clamp => self.index.saturating_sub(1),
            NavigationWrap::Wrap => (self.index + self.max_index) % (self.max_index + 1),
        };
        self.navigate(target, now)
    }

    /// Jumps to `index`, clamped to the last position that fills the window.
    pub fn go_to_slide(&mut self, index: usize, now: Millis) -> NavigationOutcome {
        self.navigate(index.min(self.max_index), now)
    }

    pub fn offset_percent(&self) -> f64 {
        -(self.index as f64 * 100.0 / self.visible_count.max(1) as f64)
    }

    pub fn counter_text(&self) -> String {
        format!("{} / {}", self.index + 1, self.max_index + 1)
    }

    pub fn prev_disabled(&self) -> bool {
        self.wrap == NavigationWrap::Clamp && self.index == 0
    }

    pub fn next_disabled(&self) -> bool {
        self.wrap == NavigationWrap::Clamp && self.index >= self.max_index
    }

    fn navigate(&mut self, target: usize, now: Millis) -> NavigationOutcome {
        if self.is_transitioning(now) {
            tracing::debug!(requested = target, now, "navigation dropped inside settle window");
            return NavigationOutcome::Rejected;
        }
        if target == self.index {
            self.state = DiscreteState::Idle;
            return NavigationOutcome::Unchanged;
        }

        self.index = target;
        self.state = DiscreteState::Transitioning {
            until: now.saturating_add(self.settle_delay_ms),
        };
        NavigationOutcome::Moved { index: target }
    }
}
