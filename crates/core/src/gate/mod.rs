use serde::{Deserialize, Serialize};

use crate::{listeners::ListenerKind, timeline::Millis};

/// Presses shorter than this are taps.
pub const TAP_THRESHOLD_MS: Millis = 500;
/// Resume delay after a tap.
pub const TAP_RESUME_DELAY_MS: Millis = 3_000;
/// Resume delay after a press-and-hold or a cancelled touch.
pub const HOLD_RESUME_DELAY_MS: Millis = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Space,
    Other,
}

/// Input reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "kebab-case")]
pub enum Signal {
    PointerEnter,
    PointerLeave,
    TouchStart,
    TouchEnd,
    TouchCancel,
    ClickToggle,
    Key { key: Key },
    Visibility { intersection_ratio: f32 },
    PrevPressed,
    NextPressed,
    AutoplayTogglePressed,
    Resize { viewport_width: u32 },
}

impl Signal {
    /// Listener that has to be installed for this signal to be delivered.
    pub fn listener(&self) -> ListenerKind {
        match self {
            Self::PointerEnter | Self::PointerLeave => ListenerKind::Hover,
            Self::TouchStart | Self::TouchEnd | Self::TouchCancel => ListenerKind::Touch,
            Self::ClickToggle => ListenerKind::Click,
            Self::Key { .. } => ListenerKind::Keyboard,
            Self::Visibility { .. } => ListenerKind::Visibility,
            Self::PrevPressed => ListenerKind::PrevButton,
            Self::NextPressed => ListenerKind::NextButton,
            Self::AutoplayTogglePressed => ListenerKind::AutoplayButton,
            Self::Resize { .. } => ListenerKind::Resize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PressKind {
    Tap,
    Hold,
}

impl PressKind {
    pub fn classify(duration: Millis) -> Self {
        if duration < TAP_THRESHOLD_MS {
            Self::Tap
        } else {
            Self::Hold
        }
    }

    pub fn resume_delay(self) -> Millis {
        match self {
            Self::Tap => TAP_RESUME_DELAY_MS,
            Self::Hold => HOLD_RESUME_DELAY_MS,
        }
    }
}

/// User intent that holds playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PauseSource {
    Hover,
    Touch,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GateDecision {
    Run,
    Pause,
}

/// Folds every pause signal into a single run or pause decision.
///
/// Each source owns its own flag, so a hover ending does not cancel a manual
/// pause and vice versa.
#[derive(Debug, Clone)]
pub struct InteractionGate {
    autoplay: bool,
    hover: bool,
    touch: bool,
    manual: bool,
    visible: bool,
}

impl InteractionGate {
    pub fn new(autoplay: bool) -> Self {
        Self {
            autoplay,
            hover: false,
            touch: false,
            manual: false,
            visible: true,
        }
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn paused_by_user(&self) -> bool {
        self.hover || self.touch || self.manual
    }

    pub fn decision(&self) -> GateDecision {
        if self.autoplay && !self.paused_by_user() && self.visible {
            GateDecision::Run
        } else {
            GateDecision::Pause
        }
    }

    pub fn set_autoplay(&mut self, enabled: bool) -> GateDecision {
        self.autoplay = enabled;
        self.decision()
    }

    pub fn set_visible(&mut self, visible: bool) -> GateDecision {
        self.visible = visible;
        self.decision()
    }

    pub fn set_paused(&mut self, source: PauseSource, paused: bool) -> GateDecision {
        match source {
            PauseSource::Hover => self.hover = paused,
            PauseSource::Touch => self.touch = paused,
            PauseSource::Manual => self.manual = paused,
        }
        self.decision()
    }

    pub fn toggle_manual(&mut self) -> GateDecision {
        self.set_paused(PauseSource::Manual, !self.manual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_only_when_every_condition_holds() {
        let mut gate = InteractionGate::new(true);
        assert_eq!(gate.decision(), GateDecision::Run);

        assert_eq!(gate.set_visible(false), GateDecision::Pause);
        assert_eq!(gate.set_visible(true), GateDecision::Run);
        assert_eq!(gate.set_autoplay(false), GateDecision::Pause);
        assert!(!gate.paused_by_user());
    }

    #[test]
    fn sources_are_independent() {
        let mut gate = InteractionGate::new(true);
        gate.set_paused(PauseSource::Hover, true);
        gate.toggle_manual();

        assert_eq!(gate.set_paused(PauseSource::Hover, false), GateDecision::Pause);
        assert_eq!(gate.toggle_manual(), GateDecision::Run);
    }

    #[test]
    fn classifies_presses() {
        assert_eq!(PressKind::classify(120), PressKind::Tap);
        assert_eq!(PressKind::classify(500), PressKind::Hold);
        assert!(PressKind::Tap.resume_delay() > PressKind::Hold.resume_delay());
    }

    #[test]
    fn signals_route_to_their_listener() {
        assert_eq!(Signal::TouchCancel.listener(), ListenerKind::Touch);
        assert_eq!(
            Signal::Resize { viewport_width: 320 }.listener(),
            ListenerKind::Resize
        );
        let parsed: Signal =
            serde_json::from_str(r#"{"signal": "key", "key": "arrow-right"}"#).unwrap();
        assert_eq!(parsed, Signal::Key { key: Key::ArrowRight });
    }
}
