//! The slideshow component: owns the loop, the animator, the interaction
//! gate and every timer or listener it asks the host for.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::{
    animation::{ContinuousAnimator, DiscreteAnimator, NavigationOutcome},
    config::{Breakpoint, DisplayConfig, PlaybackMode, Technique},
    gate::{GateDecision, InteractionGate, Key, PauseSource, PressKind, Signal},
    listeners::{InstanceId, ListenerKind, ListenerRegistry},
    looping::{LoopBuilder, RenderBuffer, SlideRef},
    render::{Control, Controls, Effect, RenderSurface},
    resize::ResizeDebouncer,
    timeline::{DriverSlot, Millis, ScheduledEvent, Scheduler, TimerKind, DEFAULT_FRAME_INTERVAL_MS},
    SlideItem, SlideSet,
};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

pub const CLASS_INFINITE_SCROLL: &str = "infinite-scroll";
pub const CLASS_PAUSED: &str = "paused";

/// Features the host environment may or may not offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostCapabilities {
    pub intersection_observer: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            intersection_observer: true,
        }
    }
}

/// Host facts gathered at mount time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountOptions {
    pub viewport_width: u32,
    pub controls: Controls,
    pub capabilities: HostCapabilities,
    pub frame_interval_ms: Millis,
    pub now: Millis,
}

impl MountOptions {
    pub fn new(viewport_width: u32) -> Self {
        Self {
            viewport_width,
            controls: Controls::default(),
            capabilities: HostCapabilities::default(),
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            now: 0,
        }
    }

    pub fn with_controls(mut self, controls: Controls) -> Self {
        self.controls = controls;
        self
    }

    pub fn with_capabilities(mut self, capabilities: HostCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn at(mut self, now: Millis) -> Self {
        self.now = now;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackStatus {
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    /// Transform offset in percent of the window.
    Offset(f64),
    /// First fully visible slide.
    Index(usize),
}

/// Snapshot of the playback state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackState {
    pub mode: PlaybackMode,
    pub position: Position,
    pub status: PlaybackStatus,
    pub autoplay: bool,
    pub paused_by_user: bool,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Lifecycle {
    /// Mounted without slides; nothing was set up.
    Inert,
    Mounted,
    Destroyed,
}

#[derive(Debug)]
enum Animator {
    Continuous(ContinuousAnimator),
    Discrete(DiscreteAnimator),
}

/// A looping picture slideshow bound to one host container.
#[derive(Debug)]
pub struct Carousel<S: RenderSurface> {
    instance: InstanceId,
    slides: SlideSet,
    config: DisplayConfig,
    controls: Controls,
    surface: S,
    scheduler: Scheduler,
    builder: LoopBuilder,
    buffer: RenderBuffer,
    animator: Animator,
    gate: InteractionGate,
    driver: DriverSlot,
    touch_resume: DriverSlot,
    touch_started_at: Option<Millis>,
    resize: ResizeDebouncer,
    listeners: ListenerRegistry,
    lifecycle: Lifecycle,
    offset_percent: f64,
    transition_enabled: Option<bool>,
    paused_class: Option<bool>,
}

impl<S: RenderSurface> Carousel<S> {
    /// Mounts a carousel onto the host surface.
    ///
    /// An empty slide set yields an inert carousel: no effects, listeners or
    /// timers. The configuration is expected to be valid; see
    /// [`DisplayConfig::validate`].
    pub fn mount(slides: SlideSet, config: DisplayConfig, options: MountOptions, surface: S) -> Self {
        let instance = InstanceId(NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed));
        let resize = ResizeDebouncer::new(
            config.resize_debounce_ms,
            config.mobile_breakpoint_px,
            options.viewport_width,
        );
        let visible_count = config.visible_count(resize.breakpoint());
        let mut builder = LoopBuilder::new(config.padding);
        let buffer = builder.build(&slides, visible_count);
        let animator = match config.mode {
            PlaybackMode::Continuous => Animator::Continuous(ContinuousAnimator::new(&config, &buffer)),
            PlaybackMode::Discrete => Animator::Discrete(DiscreteAnimator::new(
                &buffer,
                config.wrap,
                config.settle_delay_ms,
            )),
        };

        let mut carousel = Self {
            instance,
            gate: InteractionGate::new(config.autoplay),
            slides,
            config,
            controls: options.controls,
            surface,
            scheduler: Scheduler::new(options.frame_interval_ms),
            builder,
            buffer,
            animator,
            driver: DriverSlot::default(),
            touch_resume: DriverSlot::default(),
            touch_started_at: None,
            resize,
            listeners: ListenerRegistry::new(instance),
            lifecycle: Lifecycle::Inert,
            offset_percent: 0.0,
            transition_enabled: None,
            paused_class: None,
        };

        if carousel.slides.is_empty() {
            tracing::debug!(instance = instance.0, "no slides found, skipping setup");
            return carousel;
        }

        carousel.lifecycle = Lifecycle::Mounted;
        carousel.attach_listeners(options.capabilities);
        carousel.present_layout();
        carousel.reconcile(options.now);

        tracing::info!(
            instance = instance.0,
            slides = carousel.slides.len(),
            visible_count,
            looping = carousel.buffer.is_looping(),
            mode = ?carousel.config.mode,
            "slideshow mounted"
        );
        carousel
    }

    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn render_buffer(&self) -> &RenderBuffer {
        &self.buffer
    }

    pub fn breakpoint(&self) -> Breakpoint {
        self.resize.breakpoint()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Number of timer or frame callbacks still scheduled.
    pub fn outstanding_handles(&self) -> usize {
        self.scheduler.outstanding()
    }

    pub fn attached_listeners(&self) -> usize {
        self.listeners.len()
    }

    /// Next time the host needs to call [`Carousel::advance_to`].
    pub fn next_wakeup(&self) -> Option<Millis> {
        self.scheduler.next_due()
    }

    pub fn slide_ref(&self, position: usize) -> Option<SlideRef> {
        self.buffer.slide_ref(position)
    }

    /// Resolves a mounted position. References taken before the latest
    /// rebuild resolve to `None`.
    pub fn resolve(&self, slide: SlideRef) -> Option<&SlideItem> {
        self.buffer.resolve(&self.slides, slide)
    }

    pub fn playback_state(&self) -> PlaybackState {
        let (mode, position) = match &self.animator {
            Animator::Continuous(_) => (PlaybackMode::Continuous, Position::Offset(self.offset_percent)),
            Animator::Discrete(animator) => (PlaybackMode::Discrete, Position::Index(animator.index())),
        };
        PlaybackState {
            mode,
            position,
            status: self.status(),
            autoplay: self.gate.autoplay(),
            paused_by_user: self.gate.paused_by_user(),
            visible: self.gate.visible(),
        }
    }

    /// Fires every callback due at or before `now`, each at its own due time.
    pub fn advance_to(&mut self, now: Millis) {
        if self.lifecycle != Lifecycle::Mounted {
            return;
        }
        while let Some(event) = self.scheduler.pop_due(now) {
            self.dispatch(event);
        }
    }

    /// Delivers a host signal. Signals without an attached listener are
    /// dropped, which covers missing controls and destroyed instances.
    pub fn handle(&mut self, signal: Signal, now: Millis) {
        if !self.listeners.is_attached(signal.listener()) {
            tracing::trace!(?signal, "signal without listener ignored");
            return;
        }

        match signal {
            Signal::PointerEnter => self.set_paused(PauseSource::Hover, true, now),
            Signal::PointerLeave => self.set_paused(PauseSource::Hover, false, now),
            Signal::TouchStart => {
                self.touch_started_at = Some(now);
                self.touch_resume.cancel(&mut self.scheduler);
                self.set_paused(PauseSource::Touch, true, now);
            }
            Signal::TouchEnd => {
                let press = self
                    .touch_started_at
                    .take()
                    .map_or(PressKind::Hold, |start| PressKind::classify(now.saturating_sub(start)));
                self.schedule_touch_resume(press, now);
            }
            Signal::TouchCancel => {
                self.touch_started_at = None;
                self.schedule_touch_resume(PressKind::Hold, now);
            }
            Signal::ClickToggle => {
                self.gate.toggle_manual();
                self.reconcile(now);
            }
            Signal::Key { key } => match key {
                Key::ArrowLeft => {
                    self.previous_slide(now);
                }
                Key::ArrowRight => {
                    self.next_slide(now);
                }
                Key::Space => self.toggle_autoplay(now),
                Key::Other => {}
            },
            Signal::Visibility { intersection_ratio } => {
                let visible = intersection_ratio > 0.0
                    && intersection_ratio >= self.config.visibility.threshold;
                self.gate.set_visible(visible);
                self.reconcile(now);
            }
            Signal::PrevPressed => {
                self.previous_slide(now);
            }
            Signal::NextPressed => {
                self.next_slide(now);
            }
            Signal::AutoplayTogglePressed => self.toggle_autoplay(now),
            Signal::Resize { viewport_width } => {
                self.resize
                    .on_resize(viewport_width, now, &mut self.scheduler);
            }
        }
    }

    pub fn next_slide(&mut self, now: Millis) -> NavigationOutcome {
        self.navigate(now, |animator, now| animator.next(now))
    }

    pub fn previous_slide(&mut self, now: Millis) -> NavigationOutcome {
        self.navigate(now, |animator, now| animator.previous(now))
    }

    pub fn go_to_slide(&mut self, index: usize, now: Millis) -> NavigationOutcome {
        self.navigate(now, |animator, now| animator.go_to_slide(index, now))
    }

    pub fn set_autoplay(&mut self, enabled: bool, now: Millis) {
        if self.lifecycle != Lifecycle::Mounted {
            return;
        }
        self.gate.set_autoplay(enabled);
        // Toggling restarts the discrete timer from a full period.
        if matches!(self.animator, Animator::Discrete(_)) {
            self.driver.cancel(&mut self.scheduler);
        }
        tracing::debug!(instance = self.instance.0, enabled, "autoplay toggled");
        self.reconcile(now);
    }

    pub fn toggle_autoplay(&mut self, now: Millis) {
        self.set_autoplay(!self.gate.autoplay(), now);
    }

    /// Releases every listener and cancels every callback. Safe to call
    /// more than once.
    pub fn destroy(&mut self) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }

        self.driver.cancel(&mut self.scheduler);
        self.touch_resume.cancel(&mut self.scheduler);
        self.resize.cancel(&mut self.scheduler);
        self.scheduler.cancel_all();

        for handle in self.listeners.detach_all() {
            self.surface.apply(Effect::DetachListener { handle });
        }

        self.lifecycle = Lifecycle::Destroyed;
        tracing::info!(instance = self.instance.0, "slideshow destroyed");
    }

    fn status(&self) -> PlaybackStatus {
        let running = match &self.animator {
            Animator::Continuous(animator) => animator.is_running(),
            Animator::Discrete(_) => self.driver.is_active(),
        };
        if running {
            PlaybackStatus::Running
        } else {
            PlaybackStatus::Paused
        }
    }

    fn attach_listeners(&mut self, capabilities: HostCapabilities) {
        let mut kinds = vec![
            ListenerKind::Resize,
            ListenerKind::Hover,
            ListenerKind::Touch,
            ListenerKind::Click,
            ListenerKind::Keyboard,
        ];
        if capabilities.intersection_observer {
            kinds.push(ListenerKind::Visibility);
        } else {
            tracing::debug!(instance = self.instance.0, "visibility observation unavailable");
        }
        if self.controls.prev {
            kinds.push(ListenerKind::PrevButton);
        }
        if self.controls.next {
            kinds.push(ListenerKind::NextButton);
        }
        if self.controls.autoplay_toggle {
            kinds.push(ListenerKind::AutoplayButton);
        }

        for kind in kinds {
            let handle = self.listeners.attach(kind);
            self.surface.apply(Effect::AttachListener { handle });
        }
    }

    /// Emits the mount and every layout-derived effect for the current
    /// buffer.
    fn present_layout(&mut self) {
        self.surface.apply(Effect::Mount {
            generation: self.buffer.generation(),
            source_indices: self.buffer.source_indices(),
        });
        self.surface.apply(Effect::CssProperty {
            name: "--slide-width",
            value: format_percent(self.buffer.slide_width_percent()),
        });

        let looping = self.buffer.is_looping();
        match &self.animator {
            Animator::Continuous(animator) => {
                let offset = animator.baseline_offset();
                if self.config.technique == Technique::CssKeyframes {
                    let plan = animator.keyframe_plan(&self.buffer);
                    self.surface.apply(Effect::CssProperty {
                        name: "--move-distance",
                        value: format_percent(plan.move_distance_percent),
                    });
                    self.surface.apply(Effect::CssProperty {
                        name: "--animation-duration",
                        value: format!("{}ms", plan.duration_ms),
                    });
                    self.surface.apply(Effect::CssProperty {
                        name: "--animation-easing",
                        value: plan.easing.css_token(),
                    });
                    self.surface.apply(Effect::ClassToggle {
                        class: CLASS_INFINITE_SCROLL,
                        on: looping,
                    });
                }
                self.set_transition(false);
                self.set_transform(offset);
            }
            Animator::Discrete(animator) => {
                let offset = animator.offset_percent();
                self.set_transition(false);
                self.set_transform(offset);
                self.sync_controls();
            }
        }
    }

    /// Brings the driver in line with the gate. Every stop cancels the
    /// outstanding handle before anything new is scheduled.
    fn reconcile(&mut self, now: Millis) {
        if self.lifecycle != Lifecycle::Mounted {
            return;
        }

        let should_run = self.gate.decision() == GateDecision::Run && self.buffer.is_looping();
        let before = self.status();
        let frame_driven = self.config.technique == Technique::FrameDriven;

        match &mut self.animator {
            Animator::Continuous(animator) => {
                if should_run {
                    if animator.resume(now) && frame_driven {
                        self.driver
                            .start(&mut self.scheduler, |scheduler| scheduler.request_frame(now));
                    }
                } else if animator.pause(now) {
                    self.driver.cancel(&mut self.scheduler);
                }
            }
            Animator::Discrete(_) => {
                if should_run {
                    if !self.driver.is_active() {
                        let period = self.config.step_interval_ms;
                        self.driver.start(&mut self.scheduler, |scheduler| {
                            scheduler.schedule_repeating(now, period, TimerKind::AutoplayStep)
                        });
                    }
                } else {
                    self.driver.cancel(&mut self.scheduler);
                }
            }
        }

        let after = self.status();
        if before != after {
            tracing::debug!(instance = self.instance.0, status = ?after, "playback status changed");
        }
        let paused = after == PlaybackStatus::Paused;
        if self.paused_class != Some(paused) {
            self.paused_class = Some(paused);
            self.surface.apply(Effect::ClassToggle {
                class: CLASS_PAUSED,
                on: paused,
            });
        }
    }

    fn dispatch(&mut self, event: ScheduledEvent) {
        let now = event.due;
        match event.kind {
            TimerKind::Frame => {
                if !self.driver.take_fired(event.id) {
                    return;
                }
                let frame = match &mut self.animator {
                    Animator::Continuous(animator) => animator.tick(now),
                    Animator::Discrete(_) => None,
                };
                if let Some(frame) = frame {
                    self.set_transition(frame.transition_enabled);
                    self.set_transform(frame.offset_percent);
                    self.driver
                        .start(&mut self.scheduler, |scheduler| scheduler.request_frame(now));
                }
            }
            TimerKind::AutoplayStep => {
                if !self.driver.owns(event.id) {
                    return;
                }
                // Clamped strips rewind once the last full window is shown.
                if self.next_slide(now) == NavigationOutcome::Unchanged {
                    self.go_to_slide(0, now);
                }
            }
            TimerKind::TouchResume => {
                if self.touch_resume.take_fired(event.id) {
                    self.set_paused(PauseSource::Touch, false, now);
                }
            }
            TimerKind::ResizeSettled => {
                if let Some(breakpoint) = self.resize.on_settled(event.id) {
                    self.rebuild(breakpoint, now);
                }
            }
        }
    }

    fn rebuild(&mut self, breakpoint: Breakpoint, now: Millis) {
        let visible_count = self.config.visible_count(breakpoint);
        self.buffer = self.builder.build(&self.slides, visible_count);

        match &mut self.animator {
            Animator::Continuous(animator) => animator.relayout(&self.buffer, now),
            Animator::Discrete(animator) => animator.relayout(&self.buffer),
        }

        tracing::info!(
            instance = self.instance.0,
            ?breakpoint,
            visible_count,
            looping = self.buffer.is_looping(),
            "rebuilt slideshow for breakpoint"
        );

        self.present_layout();
        self.reconcile(now);
    }

    fn navigate<F>(&mut self, now: Millis, step: F) -> NavigationOutcome
    where
        F: FnOnce(&mut DiscreteAnimator, Millis) -> NavigationOutcome,
    {
        if self.lifecycle != Lifecycle::Mounted {
            return NavigationOutcome::Unchanged;
        }
        let Animator::Discrete(animator) = &mut self.animator else {
            return NavigationOutcome::Unchanged;
        };

        let outcome = step(animator, now);
        if let NavigationOutcome::Moved { index } = outcome {
            let offset = animator.offset_percent();
            tracing::trace!(instance = self.instance.0, index, "moved to slide");
            self.set_transition(true);
            self.set_transform(offset);
            self.sync_controls();
        }
        outcome
    }

    fn sync_controls(&mut self) {
        let Animator::Discrete(animator) = &self.animator else {
            return;
        };
        let updates = [
            (Control::Prev, animator.prev_disabled()),
            (Control::Next, animator.next_disabled()),
        ];
        let counter = animator.counter_text();

        for (control, disabled) in updates {
            if self.controls.has(control) {
                self.surface
                    .apply(Effect::ButtonDisabled { control, disabled });
            }
        }
        if self.controls.has(Control::Counter) {
            self.surface.apply(Effect::CounterText { text: counter });
        }
    }

    fn set_paused(&mut self, source: PauseSource, paused: bool, now: Millis) {
        self.gate.set_paused(source, paused);
        self.reconcile(now);
    }

    fn schedule_touch_resume(&mut self, press: PressKind, now: Millis) {
        let delay = press.resume_delay();
        self.touch_resume.start(&mut self.scheduler, |scheduler| {
            scheduler.schedule(now, delay, TimerKind::TouchResume)
        });
    }

    fn set_transform(&mut self, offset_percent: f64) {
        self.offset_percent = offset_percent;
        self.surface.apply(Effect::Transform { offset_percent });
    }

    fn set_transition(&mut self, enabled: bool) {
        if self.transition_enabled != Some(enabled) {
            self.transition_enabled = Some(enabled);
            self.surface.apply(Effect::Transition { enabled });
        }
    }
}

impl<S: RenderSurface> Drop for Carousel<S> {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn format_percent(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    format!("{rounded}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Direction, NavigationWrap},
        looping::PaddingStrategy,
        render::RecordingSurface,
    };

    fn continuous_config() -> DisplayConfig {
        DisplayConfig {
            slides_to_show_desktop: 3,
            slides_to_show_mobile: 1,
            ..Default::default()
        }
    }

    fn continuous(count: usize) -> Carousel<RecordingSurface> {
        Carousel::mount(
            SlideSet::placeholders(count),
            continuous_config(),
            MountOptions::new(1_200),
            RecordingSurface::new(),
        )
    }

    fn discrete(autoplay: bool, wrap: NavigationWrap, controls: Controls) -> Carousel<RecordingSurface> {
        let config = DisplayConfig {
            mode: PlaybackMode::Discrete,
            slides_to_show_desktop: 2,
            autoplay,
            step_interval_ms: 2_000,
            wrap,
            ..Default::default()
        };
        Carousel::mount(
            SlideSet::placeholders(5),
            config,
            MountOptions::new(1_200).with_controls(controls),
            RecordingSurface::new(),
        )
    }

    fn count_effects(carousel: &Carousel<RecordingSurface>, wanted: &Effect) -> usize {
        carousel
            .surface()
            .effects()
            .iter()
            .filter(|effect| *effect == wanted)
            .count()
    }

    fn index_of(carousel: &Carousel<RecordingSurface>) -> usize {
        match carousel.playback_state().position {
            Position::Index(index) => index,
            Position::Offset(_) => panic!("expected a discrete carousel"),
        }
    }

    #[test]
    fn empty_slide_set_is_inert() {
        let mut carousel = Carousel::mount(
            SlideSet::default(),
            DisplayConfig::default(),
            MountOptions::new(1_200),
            RecordingSurface::new(),
        );

        assert_eq!(carousel.lifecycle(), Lifecycle::Inert);
        assert!(carousel.surface().effects().is_empty());
        assert_eq!(carousel.attached_listeners(), 0);

        carousel.handle(Signal::PointerEnter, 10);
        carousel.advance_to(10_000);
        assert!(carousel.surface().effects().is_empty());
        assert_eq!(carousel.outstanding_handles(), 0);
    }

    #[test]
    fn short_sets_never_animate() {
        let mut carousel = continuous(3);

        assert!(!carousel.render_buffer().is_looping());
        assert_eq!(carousel.render_buffer().source_indices(), vec![0, 1, 2]);
        assert_eq!(carousel.outstanding_handles(), 0);

        carousel.advance_to(10_000);
        assert_eq!(carousel.surface().last_transform(), Some(0.0));
        assert_eq!(carousel.playback_state().status, PlaybackStatus::Paused);
    }

    #[test]
    fn continuous_frames_follow_elapsed_time() {
        let mut carousel = continuous(6);
        assert_eq!(carousel.render_buffer().len(), 12);

        carousel.advance_to(1_500);
        let offset = carousel.surface().last_transform().unwrap();
        assert!(offset < -16.0 && offset > -17.0, "offset was {offset}");
        assert_eq!(carousel.outstanding_handles(), 1);
        assert_eq!(carousel.playback_state().status, PlaybackStatus::Running);
    }

    #[test]
    fn wrap_disables_transition_for_one_frame() {
        let mut carousel = continuous(6);
        carousel.advance_to(3_100);

        assert_eq!(count_effects(&carousel, &Effect::Transition { enabled: false }), 2);
        assert_eq!(count_effects(&carousel, &Effect::Transition { enabled: true }), 2);
    }

    #[test]
    fn hover_pause_freezes_and_resumes_without_jumping() {
        let mut carousel = continuous(6);
        carousel.advance_to(1_000);
        carousel.handle(Signal::PointerEnter, 1_000);
        let frozen = carousel.surface().last_transform().unwrap();
        assert_eq!(carousel.outstanding_handles(), 0);

        carousel.surface_mut().clear();
        carousel.advance_to(20_000);
        assert_eq!(carousel.surface().last_transform(), None);
        assert!(carousel.playback_state().paused_by_user);

        carousel.handle(Signal::PointerLeave, 20_000);
        carousel.advance_to(20_016);
        let resumed = carousel.surface().last_transform().unwrap();
        assert!(resumed <= frozen);
        assert!(frozen - resumed < 1.0);
    }

    #[test]
    fn tap_resumes_after_delay() {
        let mut carousel = continuous(6);
        carousel.advance_to(100);
        carousel.handle(Signal::TouchStart, 100);
        carousel.handle(Signal::TouchEnd, 200);

        carousel.advance_to(3_199);
        assert_eq!(carousel.playback_state().status, PlaybackStatus::Paused);
        carousel.advance_to(3_200);
        assert_eq!(carousel.playback_state().status, PlaybackStatus::Running);
    }

    #[test]
    fn hold_and_cancel_resume_after_the_short_delay() {
        let mut carousel = continuous(6);
        carousel.handle(Signal::TouchStart, 100);
        carousel.handle(Signal::TouchEnd, 900);
        carousel.advance_to(1_899);
        assert_eq!(carousel.playback_state().status, PlaybackStatus::Paused);
        carousel.advance_to(1_900);
        assert_eq!(carousel.playback_state().status, PlaybackStatus::Running);

        carousel.handle(Signal::TouchStart, 2_000);
        carousel.handle(Signal::TouchCancel, 2_100);
        carousel.advance_to(3_099);
        assert_eq!(carousel.playback_state().status, PlaybackStatus::Paused);
        carousel.advance_to(3_100);
        assert_eq!(carousel.playback_state().status, PlaybackStatus::Running);
    }

    #[test]
    fn visibility_gates_playback() {
        let mut carousel = continuous(6);
        carousel.handle(Signal::Visibility { intersection_ratio: 0.05 }, 50);
        let state = carousel.playback_state();
        assert!(!state.visible);
        assert_eq!(state.status, PlaybackStatus::Paused);

        carousel.handle(Signal::Visibility { intersection_ratio: 0.5 }, 80);
        assert_eq!(carousel.playback_state().status, PlaybackStatus::Running);
    }

    #[test]
    fn visibility_is_skipped_without_observer() {
        let mut carousel = Carousel::mount(
            SlideSet::placeholders(6),
            continuous_config(),
            MountOptions::new(1_200).with_capabilities(HostCapabilities {
                intersection_observer: false,
            }),
            RecordingSurface::new(),
        );

        carousel.handle(Signal::Visibility { intersection_ratio: 0.0 }, 50);
        assert_eq!(carousel.playback_state().status, PlaybackStatus::Running);
    }

    #[test]
    fn resize_burst_without_crossing_does_not_rebuild() {
        let mut carousel = continuous(6);
        for step in 0..10 {
            carousel.handle(
                Signal::Resize {
                    viewport_width: 1_200 - step * 10,
                },
                u64::from(step) * 5,
            );
        }

        carousel.advance_to(1_000);
        assert_eq!(carousel.surface().mount_count(), 1);
        assert_eq!(carousel.breakpoint(), Breakpoint::Desktop);
    }

    #[test]
    fn crossing_the_breakpoint_rebuilds_once() {
        let mut carousel = continuous(6);
        let before = carousel.slide_ref(4).unwrap();
        assert!(carousel.resolve(before).is_some());

        carousel.handle(Signal::Resize { viewport_width: 600 }, 0);
        carousel.advance_to(1_000);

        assert_eq!(carousel.surface().mount_count(), 2);
        assert_eq!(carousel.breakpoint(), Breakpoint::Mobile);
        assert_eq!(carousel.render_buffer().visible_count(), 1);
        assert!(carousel.resolve(before).is_none());
        assert_eq!(carousel.playback_state().status, PlaybackStatus::Running);
    }

    #[test]
    fn discrete_navigation_clamps_and_updates_controls() {
        let mut carousel = discrete(false, NavigationWrap::Clamp, Controls::all());
        let seen: Vec<_> = (0..4)
            .map(|step| {
                carousel.next_slide(step * 1_000);
                index_of(&carousel)
            })
            .collect();
        assert_eq!(seen, vec![1, 2, 3, 3]);

        assert_eq!(carousel.surface().last_transform(), Some(-150.0));
        let effects = carousel.surface().effects();
        assert!(effects.contains(&Effect::ButtonDisabled {
            control: Control::Next,
            disabled: true,
        }));
        assert_eq!(
            effects.last(),
            Some(&Effect::CounterText {
                text: "4 / 4".to_string()
            })
        );

        assert_eq!(carousel.go_to_slide(0, 4_000), NavigationOutcome::Moved { index: 0 });
        assert_eq!(carousel.next_slide(4_100), NavigationOutcome::Rejected);
    }

    #[test]
    fn discrete_autoplay_steps_and_rewinds() {
        let mut carousel = discrete(true, NavigationWrap::Clamp, Controls::default());
        let seen: Vec<_> = [2_000, 4_000, 6_000, 8_000]
            .into_iter()
            .map(|now| {
                carousel.advance_to(now);
                index_of(&carousel)
            })
            .collect();
        assert_eq!(seen, vec![1, 2, 3, 0]);
        assert_eq!(carousel.outstanding_handles(), 1);
    }

    #[test]
    fn space_toggles_autoplay_and_restarts_the_timer() {
        let mut carousel = discrete(true, NavigationWrap::Wrap, Controls::default());
        carousel.handle(Signal::Key { key: Key::Space }, 500);
        assert!(!carousel.playback_state().autoplay);
        assert_eq!(carousel.outstanding_handles(), 0);

        carousel.handle(Signal::Key { key: Key::Space }, 1_000);
        carousel.advance_to(2_500);
        assert_eq!(index_of(&carousel), 0);
        carousel.advance_to(3_000);
        assert_eq!(index_of(&carousel), 1);

        carousel.handle(Signal::Key { key: Key::ArrowLeft }, 4_000);
        assert_eq!(index_of(&carousel), 0);
    }

    #[test]
    fn resuming_restarts_the_step_timer_from_a_full_period() {
        let mut carousel = discrete(true, NavigationWrap::Wrap, Controls::default());
        carousel.handle(Signal::PointerEnter, 1_000);
        assert_eq!(carousel.outstanding_handles(), 0);
        carousel.advance_to(1_900);
        carousel.handle(Signal::PointerLeave, 1_900);

        carousel.advance_to(3_899);
        assert_eq!(index_of(&carousel), 0);
        carousel.advance_to(3_900);
        assert_eq!(index_of(&carousel), 1);

        carousel.handle(Signal::Visibility { intersection_ratio: 0.0 }, 4_500);
        carousel.advance_to(5_000);
        carousel.handle(Signal::Visibility { intersection_ratio: 1.0 }, 5_000);
        carousel.advance_to(6_999);
        assert_eq!(index_of(&carousel), 1);
        carousel.advance_to(7_000);
        assert_eq!(index_of(&carousel), 2);
    }

    #[test]
    fn missing_controls_are_skipped() {
        let mut carousel = discrete(false, NavigationWrap::Clamp, Controls::default());
        carousel.handle(Signal::NextPressed, 100);
        assert_eq!(index_of(&carousel), 0);

        carousel.next_slide(200);
        assert!(carousel.surface().effects().iter().all(|effect| !matches!(
            effect,
            Effect::ButtonDisabled { .. } | Effect::CounterText { .. }
        )));
    }

    #[test]
    fn destroy_releases_everything_once() {
        let mut carousel = continuous(6);
        carousel.advance_to(100);
        let attached = carousel.attached_listeners();
        assert_eq!(attached, 6);

        carousel.destroy();
        assert_eq!(carousel.outstanding_handles(), 0);
        assert_eq!(carousel.attached_listeners(), 0);
        let detached = carousel
            .surface()
            .effects()
            .iter()
            .filter(|effect| matches!(effect, Effect::DetachListener { .. }))
            .count();
        assert_eq!(detached, attached);

        carousel.surface_mut().clear();
        carousel.handle(Signal::PointerEnter, 200);
        carousel.handle(Signal::Resize { viewport_width: 400 }, 200);
        carousel.advance_to(10_000);
        carousel.destroy();
        assert!(carousel.surface().effects().is_empty());
        assert_eq!(carousel.lifecycle(), Lifecycle::Destroyed);
    }

    #[test]
    fn backward_strip_moves_right_from_the_middle_copy() {
        let config = DisplayConfig {
            direction: Direction::Backward,
            padding: PaddingStrategy::BackwardPadded,
            ..continuous_config()
        };
        let mut carousel = Carousel::mount(
            SlideSet::placeholders(6),
            config,
            MountOptions::new(1_200),
            RecordingSurface::new(),
        );
        assert_eq!(carousel.render_buffer().len(), 18);
        assert_eq!(carousel.surface().last_transform(), Some(-200.0));

        carousel.advance_to(1_500);
        let midway = carousel.surface().last_transform().unwrap();
        assert!(midway > -184.0 && midway < -183.0, "offset was {midway}");

        carousel.advance_to(2_990);
        let offsets: Vec<_> = carousel
            .surface()
            .effects()
            .iter()
            .filter_map(|effect| match effect {
                Effect::Transform { offset_percent } => Some(*offset_percent),
                _ => None,
            })
            .collect();
        assert!(offsets.windows(2).all(|pair| pair[1] >= pair[0]));
        assert!(offsets.iter().all(|offset| *offset >= -200.0 && *offset < -100.0 * 5.0 / 3.0 + 1e-9));
    }

    #[test]
    fn css_keyframes_publish_custom_properties() {
        let config = DisplayConfig {
            technique: Technique::CssKeyframes,
            ..continuous_config()
        };
        let mut carousel = Carousel::mount(
            SlideSet::placeholders(6),
            config,
            MountOptions::new(1_200),
            RecordingSurface::new(),
        );

        let surface = carousel.surface();
        assert_eq!(surface.css_property("--move-distance"), Some("-200%"));
        assert_eq!(surface.css_property("--animation-duration"), Some("18000ms"));
        assert_eq!(surface.css_property("--animation-easing"), Some("linear"));
        assert_eq!(surface.class_state(CLASS_INFINITE_SCROLL), Some(true));
        assert_eq!(surface.class_state(CLASS_PAUSED), Some(false));
        assert_eq!(carousel.outstanding_handles(), 0);

        carousel.handle(Signal::ClickToggle, 500);
        assert_eq!(carousel.surface().class_state(CLASS_PAUSED), Some(true));
    }
}
