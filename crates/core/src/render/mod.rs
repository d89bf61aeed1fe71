use serde::Serialize;

use crate::listeners::ListenerHandle;

/// Optional control elements found in the host markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Control {
    Prev,
    Next,
    AutoplayToggle,
    Counter,
}

/// Which optional controls the host markup provides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub prev: bool,
    pub next: bool,
    pub autoplay_toggle: bool,
    pub counter: bool,
}

impl Controls {
    pub fn all() -> Self {
        Self {
            prev: true,
            next: true,
            autoplay_toggle: true,
            counter: true,
        }
    }

    pub fn has(&self, control: Control) -> bool {
        match control {
            Control::Prev => self.prev,
            Control::Next => self.next,
            Control::AutoplayToggle => self.autoplay_toggle,
            Control::Counter => self.counter,
        }
    }
}

/// Presentation change the host applies to its markup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "kebab-case")]
pub enum Effect {
    /// Replace every mounted slide node. Nodes from earlier mounts are gone.
    Mount {
        generation: u64,
        source_indices: Vec<usize>,
    },
    /// Horizontal transform of the slides wrapper, in percent.
    Transform { offset_percent: f64 },
    Transition { enabled: bool },
    CssProperty { name: &'static str, value: String },
    ClassToggle { class: &'static str, on: bool },
    ButtonDisabled { control: Control, disabled: bool },
    CounterText { text: String },
    AttachListener { handle: ListenerHandle },
    DetachListener { handle: ListenerHandle },
}

/// Sink for the effects a carousel emits.
pub trait RenderSurface {
    fn apply(&mut self, effect: Effect);
}

impl<T: RenderSurface + ?Sized> RenderSurface for &mut T {
    fn apply(&mut self, effect: Effect) {
        (**self).apply(effect);
    }
}

/// Surface that keeps every effect in order. Used by the simulator and as
/// a test double.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    effects: Vec<Effect>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Most recent transform offset, if any was emitted.
    pub fn last_transform(&self) -> Option<f64> {
        self.effects.iter().rev().find_map(|effect| match effect {
            Effect::Transform { offset_percent } => Some(*offset_percent),
            _ => None,
        })
    }

    pub fn mount_count(&self) -> usize {
        self.effects
            .iter()
            .filter(|effect| matches!(effect, Effect::Mount { .. }))
            .count()
    }

    pub fn css_property(&self, name: &str) -> Option<&str> {
        self.effects.iter().rev().find_map(|effect| match effect {
            Effect::CssProperty { name: key, value } if *key == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn class_state(&self, class: &str) -> Option<bool> {
        self.effects.iter().rev().find_map(|effect| match effect {
            Effect::ClassToggle { class: key, on } if *key == class => Some(*on),
            _ => None,
        })
    }
}

impl RenderSurface for RecordingSurface {
    fn apply(&mut self, effect: Effect) {
        self.effects.push(effect);
    }
}
