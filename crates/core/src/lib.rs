//! Core library for the picture card slideshow.
//!
//! The crate is a headless engine: it decides what the slideshow looks like
//! at any moment and reports it as [`Effect`]s, while the host page owns the
//! markup, the real timers and the input events. Each module owns one
//! concern (loop construction, animation, input gating, resize handling,
//! timers) and [`Carousel`] wires them together for a single container.

pub mod animation;
pub mod carousel;
pub mod config;
pub mod error;
pub mod gate;
pub mod listeners;
pub mod looping;
pub mod render;
pub mod resize;
pub mod slides;
pub mod timeline;

pub use animation::{ContinuousAnimator, DiscreteAnimator, Easing, FrameUpdate, NavigationOutcome};
pub use carousel::{
    Carousel, HostCapabilities, Lifecycle, MountOptions, PlaybackState, PlaybackStatus, Position,
};
pub use config::{
    Breakpoint, Direction, DisplayConfig, NavigationWrap, PlaybackMode, Technique,
    VisibilityOptions, MOBILE_BREAKPOINT_PX,
};
pub use error::{Result, SlideshowError};
pub use gate::{GateDecision, InteractionGate, Key, PauseSource, PressKind, Signal};
pub use listeners::{InstanceId, ListenerHandle, ListenerKind, ListenerRegistry};
pub use looping::{LoopBuilder, PaddingStrategy, RenderBuffer, SlideRef};
pub use render::{Control, Controls, Effect, RecordingSurface, RenderSurface};
pub use resize::ResizeDebouncer;
pub use slides::{SlideItem, SlideSet};
pub use timeline::{DriverSlot, HandleId, Millis, ScheduledEvent, Scheduler, TimerKind};
