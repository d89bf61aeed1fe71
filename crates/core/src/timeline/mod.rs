//! Virtual timer queue standing in for the host's frame and timeout APIs.
//!
//! A carousel never sleeps. It asks its [`Scheduler`] for callbacks and the
//! host advances the queue with monotonic timestamps, which keeps every
//! timing decision deterministic under test.

use serde::Serialize;

/// Milliseconds on the host's monotonic clock.
pub type Millis = u64;

/// Display refresh interval assumed when the host requests a frame.
pub const DEFAULT_FRAME_INTERVAL_MS: Millis = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HandleId(u64);

/// What a scheduled callback is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerKind {
    Frame,
    AutoplayStep,
    TouchResume,
    ResizeSettled,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduledEvent {
    pub id: HandleId,
    pub due: Millis,
    pub kind: TimerKind,
    /// Present for interval timers, which re-arm after firing.
    pub period: Option<Millis>,
}

#[derive(Debug)]
pub struct Scheduler {
    events: Vec<ScheduledEvent>,
    next_id: u64,
    frame_interval: Millis,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL_MS)
    }
}

impl Scheduler {
    pub fn new(frame_interval: Millis) -> Self {
        Self {
            events: Vec::new(),
            next_id: 1,
            frame_interval: frame_interval.max(1),
        }
    }

    pub fn frame_interval(&self) -> Millis {
        self.frame_interval
    }

    /// One-shot callback after `delay`.
    pub fn schedule(&mut self, now: Millis, delay: Millis, kind: TimerKind) -> HandleId {
        self.push(now.saturating_add(delay), kind, None)
    }

    /// Interval callback firing every `period` until cancelled.
    pub fn schedule_repeating(&mut self, now: Millis, period: Millis, kind: TimerKind) -> HandleId {
        let period = period.max(1);
        self.push(now.saturating_add(period), kind, Some(period))
    }

    /// Next display refresh.
    pub fn request_frame(&mut self, now: Millis) -> HandleId {
        self.schedule(now, self.frame_interval, TimerKind::Frame)
    }

    pub fn cancel(&mut self, id: HandleId) -> bool {
        let before = self.events.len();
        self.events.retain(|event| event.id != id);
        before != self.events.len()
    }

    pub fn cancel_all(&mut self) {
        self.events.clear();
    }

    pub fn is_pending(&self, id: HandleId) -> bool {
        self.events.iter().any(|event| event.id == id)
    }

    /// Number of callbacks still waiting to fire.
    pub fn outstanding(&self) -> usize {
        self.events.len()
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.events.iter().map(|event| event.due).min()
    }

    /// Removes and returns the earliest callback due at or before `now`.
    /// Interval timers are re-armed under the same handle.
    pub fn pop_due(&mut self, now: Millis) -> Option<ScheduledEvent> {
        let index = self
            .events
            .iter()
            .enumerate()
            .filter(|(_, event)| event.due <= now)
            .min_by_key(|(_, event)| (event.due, event.id))
            .map(|(index, _)| index)?;

        let fired = match self.events[index].period {
            Some(period) => {
                let event = self.events[index].clone();
                self.events[index].due = event.due.saturating_add(period);
                event
            }
            None => self.events.swap_remove(index),
        };

        tracing::trace!(id = ?fired.id, kind = ?fired.kind, due = fired.due, "timer fired");
        Some(fired)
    }

    fn push(&mut self, due: Millis, kind: TimerKind, period: Option<Millis>) -> HandleId {
        let id = HandleId(self.next_id);
        self.next_id += 1;
        self.events.push(ScheduledEvent {
            id,
            due,
            kind,
            period,
        });
        id
    }
}

/// Owner of at most one outstanding handle.
///
/// Starting a new driver always cancels the previous one first, so two
/// overlapping animation loops cannot exist for the same slot.
#[derive(Debug, Default)]
pub struct DriverSlot {
    handle: Option<HandleId>,
}

impl DriverSlot {
    pub fn start<F>(&mut self, scheduler: &mut Scheduler, schedule: F) -> HandleId
    where
        F: FnOnce(&mut Scheduler) -> HandleId,
    {
        self.cancel(scheduler);
        let handle = schedule(scheduler);
        self.handle = Some(handle);
        handle
    }

    /// Cancels the owned handle. Returns whether one was outstanding.
    pub fn cancel(&mut self, scheduler: &mut Scheduler) -> bool {
        match self.handle.take() {
            Some(handle) => scheduler.cancel(handle),
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn owns(&self, id: HandleId) -> bool {
        self.handle == Some(id)
    }

    /// Forgets a one-shot handle that has just fired. Returns `false` for a
    /// handle this slot does not own, which the caller treats as stale.
    pub fn take_fired(&mut self, id: HandleId) -> bool {
        if self.owns(id) {
            self.handle = None;
            true
        } else {
            false
        }
    }
}
