use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{animation::Easing, looping::PaddingStrategy, Result, SlideshowError};

/// Viewport width below which the mobile slide count applies.
pub const MOBILE_BREAKPOINT_PX: u32 = 750;
/// Shortest settle window accepted for resize debouncing.
pub const MIN_RESIZE_DEBOUNCE_MS: u64 = 200;

/// Which animator drives the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackMode {
    /// Smooth scrolling recomputed from elapsed time on every frame.
    #[default]
    Continuous,
    /// Index based steps with a settle window between transitions.
    Discrete,
}

/// How continuous motion reaches the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Technique {
    /// The engine computes a transform on every display refresh.
    #[default]
    FrameDriven,
    /// The engine publishes custom properties and lets a CSS keyframe
    /// animation do the motion.
    CssKeyframes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// Behaviour of discrete navigation at either end of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationWrap {
    #[default]
    Clamp,
    Wrap,
}

/// Resolved display class of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Breakpoint {
    Mobile,
    Desktop,
}

impl Breakpoint {
    pub fn resolve(viewport_width: u32, threshold_px: u32) -> Self {
        if viewport_width < threshold_px {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }
}

/// Options forwarded to the host's intersection observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct VisibilityOptions {
    pub threshold: f32,
    pub root_margin_px: u32,
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin_px: 50,
        }
    }
}

/// Top-level configuration for a single slideshow instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DisplayConfig {
    pub slides_to_show_desktop: usize,
    pub slides_to_show_mobile: usize,
    pub mobile_breakpoint_px: u32,
    pub autoplay: bool,
    /// Period of the discrete autoplay timer.
    pub step_interval_ms: u64,
    /// Time the continuous strip needs to travel one slide width.
    pub cycle_duration_ms: u64,
    pub easing: Easing,
    pub mode: PlaybackMode,
    pub technique: Technique,
    pub padding: PaddingStrategy,
    pub direction: Direction,
    pub wrap: NavigationWrap,
    /// Matches the CSS transition duration of a discrete step.
    pub settle_delay_ms: u64,
    pub resize_debounce_ms: u64,
    pub visibility: VisibilityOptions,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            slides_to_show_desktop: 4,
            slides_to_show_mobile: 2,
            mobile_breakpoint_px: MOBILE_BREAKPOINT_PX,
            autoplay: true,
            step_interval_ms: 5_000,
            cycle_duration_ms: 3_000,
            easing: Easing::Linear,
            mode: PlaybackMode::Continuous,
            technique: Technique::FrameDriven,
            padding: PaddingStrategy::BufferAhead,
            direction: Direction::Forward,
            wrap: NavigationWrap::Clamp,
            settle_delay_ms: 500,
            resize_debounce_ms: 250,
            visibility: VisibilityOptions::default(),
        }
    }
}

impl DisplayConfig {
    /// Builds a configuration from the host element's data attributes.
    ///
    /// Keys may carry the `data-` prefix. Missing or unparsable values keep
    /// their defaults and are reported through `tracing` rather than
    /// returned, so a malformed section still renders.
    pub fn from_attributes<'a, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();

        for (key, value) in attributes {
            let key = key.strip_prefix("data-").unwrap_or(key);
            let value = value.trim();
            match key {
                "autoplay" => config.autoplay = value.eq_ignore_ascii_case("true"),
                "speed" => match parse_seconds(value) {
                    Some(ms) => config.step_interval_ms = ms,
                    None => tracing::warn!(value, "ignoring invalid slideshow speed"),
                },
                "cycle-duration" => match value.parse::<u64>() {
                    Ok(ms) if ms > 0 => config.cycle_duration_ms = ms,
                    _ => tracing::warn!(value, "ignoring invalid cycle duration"),
                },
                "slides-to-show" => match parse_count(value) {
                    Some(count) => config.slides_to_show_desktop = count,
                    None => tracing::warn!(value, "ignoring invalid desktop slide count"),
                },
                "slides-to-show-mobile" => match parse_count(value) {
                    Some(count) => config.slides_to_show_mobile = count,
                    None => tracing::warn!(value, "ignoring invalid mobile slide count"),
                },
                "animation-easing" => match value.parse::<Easing>() {
                    Ok(easing) => config.easing = easing,
                    Err(err) => tracing::warn!(%err, "falling back to linear easing"),
                },
                "mode" => match value {
                    "continuous" => config.mode = PlaybackMode::Continuous,
                    "discrete" => config.mode = PlaybackMode::Discrete,
                    _ => tracing::warn!(value, "ignoring unknown playback mode"),
                },
                "technique" => match value {
                    "frame-driven" => config.technique = Technique::FrameDriven,
                    "css-keyframes" => config.technique = Technique::CssKeyframes,
                    _ => tracing::warn!(value, "ignoring unknown animation technique"),
                },
                _ => tracing::trace!(key, "unrecognised slideshow attribute"),
            }
        }

        config
    }

    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.slides_to_show_desktop == 0 || self.slides_to_show_mobile == 0 {
            return Err(SlideshowError::InvalidConfig(
                "slides to show must be at least one",
            ));
        }
        if self.mobile_breakpoint_px == 0 {
            return Err(SlideshowError::InvalidConfig(
                "mobile breakpoint must be positive",
            ));
        }
        if self.cycle_duration_ms == 0 || self.step_interval_ms == 0 {
            return Err(SlideshowError::InvalidConfig(
                "animation durations must be positive",
            ));
        }
        if self.resize_debounce_ms < MIN_RESIZE_DEBOUNCE_MS {
            return Err(SlideshowError::InvalidConfig(
                "resize debounce must be at least 200ms",
            ));
        }
        if !(0.0..=1.0).contains(&self.visibility.threshold) {
            return Err(SlideshowError::InvalidConfig(
                "visibility threshold must lie in [0, 1]",
            ));
        }
        if self.direction == Direction::Backward
            && self.padding != PaddingStrategy::BackwardPadded
        {
            return Err(SlideshowError::InvalidConfig(
                "backward scrolling requires backward-padded looping",
            ));
        }
        Ok(())
    }

    pub fn breakpoint_for(&self, viewport_width: u32) -> Breakpoint {
        Breakpoint::resolve(viewport_width, self.mobile_breakpoint_px)
    }

    pub fn visible_count(&self, breakpoint: Breakpoint) -> usize {
        match breakpoint {
            Breakpoint::Mobile => self.slides_to_show_mobile,
            Breakpoint::Desktop => self.slides_to_show_desktop,
        }
    }
}

fn parse_seconds(value: &str) -> Option<u64> {
    let seconds = value.parse::<f64>().ok()?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return None;
    }
    Some((seconds * 1000.0).round() as u64).filter(|ms| *ms >= 1)
}

fn parse_count(value: &str) -> Option<usize> {
    value.parse::<usize>().ok().filter(|count| *count >= 1)
}
