use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Result, SlideshowError};

const NEWTON_ITERATIONS: usize = 8;
const BISECTION_ITERATIONS: usize = 32;
const SOLVE_EPSILON: f64 = 1e-7;

/// Timing curve applied to animation progress, named after the CSS easing
/// keywords so the same token can be forwarded to a stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    #[default]
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Arbitrary `cubic-bezier(x1, y1, x2, y2)` curve.
    CubicBezier(f64, f64, f64, f64),
}

impl Easing {
    /// Maps linear progress in `[0, 1]` onto the eased curve.
    ///
    /// The endpoints are fixed so that `apply(0.0) == 0.0` and
    /// `apply(1.0) == 1.0` for every curve, which keeps looped cycles
    /// continuous at their boundaries.
    pub fn apply(&self, progress: f64) -> f64 {
        let t = progress.clamp(0.0, 1.0);
        if t <= 0.0 || t >= 1.0 {
            return t;
        }

        match self.control_points() {
            None => t,
            Some((x1, y1, x2, y2)) => {
                let s = solve_parameter(t, x1, x2);
                bezier(s, y1, y2)
            }
        }
    }

    /// Returns the CSS token that reproduces this curve.
    pub fn css_token(&self) -> String {
        match self {
            Self::Linear => "linear".to_string(),
            Self::Ease => "ease".to_string(),
            Self::EaseIn => "ease-in".to_string(),
            Self::EaseOut => "ease-out".to_string(),
            Self::EaseInOut => "ease-in-out".to_string(),
            Self::CubicBezier(x1, y1, x2, y2) => {
                format!("cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
        }
    }

    fn control_points(&self) -> Option<(f64, f64, f64, f64)> {
        match *self {
            Self::Linear => None,
            Self::Ease => Some((0.25, 0.1, 0.25, 1.0)),
            Self::EaseIn => Some((0.42, 0.0, 1.0, 1.0)),
            Self::EaseOut => Some((0.0, 0.0, 0.58, 1.0)),
            Self::EaseInOut => Some((0.42, 0.0, 0.58, 1.0)),
            Self::CubicBezier(x1, y1, x2, y2) => Some((x1, y1, x2, y2)),
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css_token())
    }
}

impl FromStr for Easing {
    type Err = SlideshowError;

    fn from_str(token: &str) -> Result<Self> {
        let token = token.trim().to_ascii_lowercase();
        match token.as_str() {
            "linear" | "" => Ok(Self::Linear),
            "ease" => Ok(Self::Ease),
            "ease-in" => Ok(Self::EaseIn),
            "ease-out" => Ok(Self::EaseOut),
            "ease-in-out" => Ok(Self::EaseInOut),
            other => parse_cubic_bezier(other),
        }
    }
}

impl TryFrom<String> for Easing {
    type Error = SlideshowError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(value: Easing) -> Self {
        value.css_token()
    }
}

fn parse_cubic_bezier(token: &str) -> Result<Easing> {
    let inner = token
        .strip_prefix("cubic-bezier(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| SlideshowError::msg(format!("unknown easing token `{token}`")))?;

    let values = inner
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| SlideshowError::msg(format!("malformed easing curve `{token}`")))?;

    if values.iter().any(|value| !value.is_finite()) {
        return Err(SlideshowError::InvalidConfig(
            "cubic-bezier control points must be finite",
        ));
    }

    match values.as_slice() {
        [x1, y1, x2, y2] if (0.0..=1.0).contains(x1) && (0.0..=1.0).contains(x2) => {
            Ok(Easing::CubicBezier(*x1, *y1, *x2, *y2))
        }
        [_, _, _, _] => Err(SlideshowError::InvalidConfig(
            "cubic-bezier x coordinates must lie in [0, 1]",
        )),
        _ => Err(SlideshowError::msg(format!(
            "cubic-bezier expects four values, got `{token}`"
        ))),
    }
}

/// One axis of a cubic bezier anchored at 0 and 1.
fn bezier(s: f64, p1: f64, p2: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

fn bezier_slope(s: f64, p1: f64, p2: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Finds the curve parameter whose x coordinate equals `x`.
fn solve_parameter(x: f64, x1: f64, x2: f64) -> f64 {
    let mut s = x;
    for _ in 0..NEWTON_ITERATIONS {
        let error = bezier(s, x1, x2) - x;
        if error.abs() < SOLVE_EPSILON {
            return s;
        }
        let slope = bezier_slope(s, x1, x2);
        if slope.abs() < SOLVE_EPSILON {
            break;
        }
        s -= error / slope;
    }

    let (mut low, mut high) = (0.0, 1.0);
    s = x;
    for _ in 0..BISECTION_ITERATIONS {
        let value = bezier(s, x1, x2);
        if (value - x).abs() < SOLVE_EPSILON {
            break;
        }
        if value < x {
            low = s;
        } else {
            high = s;
        }
        s = (low + high) * 0.5;
    }
    s
}
