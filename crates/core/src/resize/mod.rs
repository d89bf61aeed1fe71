use crate::{
    config::Breakpoint,
    timeline::{DriverSlot, HandleId, Millis, Scheduler, TimerKind},
};

/// Collapses bursts of resize events into at most one breakpoint change.
#[derive(Debug)]
pub struct ResizeDebouncer {
    settle_ms: Millis,
    threshold_px: u32,
    breakpoint: Breakpoint,
    pending_width: Option<u32>,
    slot: DriverSlot,
}

impl ResizeDebouncer {
    pub fn new(settle_ms: Millis, threshold_px: u32, viewport_width: u32) -> Self {
        Self {
            settle_ms,
            threshold_px,
            breakpoint: Breakpoint::resolve(viewport_width, threshold_px),
            pending_width: None,
            slot: DriverSlot::default(),
        }
    }

    pub fn breakpoint(&self) -> Breakpoint {
        self.breakpoint
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_active()
    }

    /// Records the latest width and restarts the settle timer.
    pub fn on_resize(&mut self, viewport_width: u32, now: Millis, scheduler: &mut Scheduler) {
        self.pending_width = Some(viewport_width);
        let settle = self.settle_ms;
        self.slot.start(scheduler, |scheduler| {
            scheduler.schedule(now, settle, TimerKind::ResizeSettled)
        });
    }

    /// Handles the settle timer. Returns the new breakpoint only when the
    /// settled width resolves differently from the current one.
    pub fn on_settled(&mut self, id: HandleId) -> Option<Breakpoint> {
        if !self.slot.take_fired(id) {
            return None;
        }

        let width = self.pending_width.take()?;
        let resolved = Breakpoint::resolve(width, self.threshold_px);
        if resolved == self.breakpoint {
            tracing::trace!(width, "resize settled without breakpoint change");
            return None;
        }

        tracing::debug!(width, from = ?self.breakpoint, to = ?resolved, "breakpoint changed");
        self.breakpoint = resolved;
        Some(resolved)
    }

    pub fn cancel(&mut self, scheduler: &mut Scheduler) {
        self.slot.cancel(scheduler);
        self.pending_width = None;
    }
}
