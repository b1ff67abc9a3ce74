//! CSS timing functions
//!
//! Easing values are handed to the host's animation backend as CSS strings
//! and can also be sampled directly by hosts that tick animations themselves.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{AnimationError, Result};

/// Where a step jump happens in a `steps()` function
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StepPosition {
    /// Jump at the start of each interval (`jump-start`)
    Start,
    /// Jump at the end of each interval (`jump-end`)
    #[default]
    End,
}

/// A CSS timing function
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub enum Easing {
    Linear,
    #[default]
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    CubicBezier(f32, f32, f32, f32),
    Steps(u32, StepPosition),
}

impl Easing {
    /// Cubic-bezier control points, for the named curves and custom beziers
    pub fn control_points(&self) -> Option<(f32, f32, f32, f32)> {
        match *self {
            Easing::Ease => Some((0.25, 0.1, 0.25, 1.0)),
            Easing::EaseIn => Some((0.42, 0.0, 1.0, 1.0)),
            Easing::EaseOut => Some((0.0, 0.0, 0.58, 1.0)),
            Easing::EaseInOut => Some((0.42, 0.0, 0.58, 1.0)),
            Easing::CubicBezier(x1, y1, x2, y2) => Some((x1, y1, x2, y2)),
            Easing::Linear | Easing::Steps(..) => None,
        }
    }

    /// Eased progress for linear progress `t` (clamped to [0, 1])
    pub fn sample(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::Steps(count, position) => {
                let count = count.max(1) as f32;
                let step = (t * count).floor();
                let step = match position {
                    StepPosition::Start => step + 1.0,
                    StepPosition::End => step,
                };
                step.min(count) / count
            }
            _ => match self.control_points() {
                Some((x1, y1, x2, y2)) => sample_bezier(t, x1, y1, x2, y2),
                None => t,
            },
        }
    }
}

fn bezier(t: f32, p1: f32, p2: f32) -> f32 {
    let inv = 1.0 - t;
    3.0 * inv * inv * t * p1 + 3.0 * inv * t * t * p2 + t * t * t
}

fn bezier_slope(t: f32, p1: f32, p2: f32) -> f32 {
    let inv = 1.0 - t;
    3.0 * inv * inv * p1 + 6.0 * inv * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

fn sample_bezier(x: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    const EPSILON: f32 = 1e-6;

    // Newton-Raphson first, bisection if the slope flattens out
    let mut t = x;
    for _ in 0..8 {
        let err = bezier(t, x1, x2) - x;
        if err.abs() < EPSILON {
            return bezier(t, y1, y2);
        }
        let slope = bezier_slope(t, x1, x2);
        if slope.abs() < EPSILON {
            break;
        }
        t -= err / slope;
    }

    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    t = x;
    for _ in 0..32 {
        let value = bezier(t, x1, x2);
        if (value - x).abs() < EPSILON {
            break;
        }
        if value < x {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) * 0.5;
    }
    bezier(t, y1, y2)
}

impl FromStr for Easing {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let easing = match trimmed {
            "linear" => Easing::Linear,
            "ease" => Easing::Ease,
            "ease-in" => Easing::EaseIn,
            "ease-out" => Easing::EaseOut,
            "ease-in-out" => Easing::EaseInOut,
            "step-start" => Easing::Steps(1, StepPosition::Start),
            "step-end" => Easing::Steps(1, StepPosition::End),
            _ => {
                if let Some(args) = function_args(trimmed, "cubic-bezier") {
                    parse_cubic_bezier(s, args)?
                } else if let Some(args) = function_args(trimmed, "steps") {
                    parse_steps(s, args)?
                } else {
                    return Err(AnimationError::InvalidEasing(s.to_string()));
                }
            }
        };
        Ok(easing)
    }
}

impl TryFrom<String> for Easing {
    type Error = AnimationError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_cubic_bezier(input: &str, args: &str) -> Result<Easing> {
    let values = args
        .split(',')
        .map(|v| v.trim().parse::<f32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| AnimationError::InvalidEasing(input.to_string()))?;

    let [x1, y1, x2, y2] = values[..] else {
        return Err(AnimationError::InvalidEasing(input.to_string()));
    };
    if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
        return Err(AnimationError::BezierOutOfRange(x1, x2));
    }
    Ok(Easing::CubicBezier(x1, y1, x2, y2))
}

fn parse_steps(input: &str, args: &str) -> Result<Easing> {
    let invalid = || AnimationError::InvalidEasing(input.to_string());
    let mut parts = args.split(',').map(str::trim);

    let count = parts
        .next()
        .and_then(|c| c.parse::<u32>().ok())
        .filter(|c| *c > 0)
        .ok_or_else(invalid)?;
    let position = match parts.next() {
        None | Some("end") | Some("jump-end") => StepPosition::End,
        Some("start") | Some("jump-start") => StepPosition::Start,
        Some(_) => return Err(invalid()),
    };
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(Easing::Steps(count, position))
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => f.write_str("linear"),
            Easing::Ease => f.write_str("ease"),
            Easing::EaseIn => f.write_str("ease-in"),
            Easing::EaseOut => f.write_str("ease-out"),
            Easing::EaseInOut => f.write_str("ease-in-out"),
            Easing::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "cubic-bezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
            Easing::Steps(count, StepPosition::End) => write!(f, "steps({}, jump-end)", count),
            Easing::Steps(count, StepPosition::Start) => write!(f, "steps({}, jump-start)", count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!("ease".parse::<Easing>().unwrap(), Easing::Ease);
        assert_eq!(" ease-in-out ".parse::<Easing>().unwrap(), Easing::EaseInOut);
        assert_eq!(
            "step-start".parse::<Easing>().unwrap(),
            Easing::Steps(1, StepPosition::Start)
        );
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!(
            "cubic-bezier(0.2, 0, 0.4, 1.5)".parse::<Easing>().unwrap(),
            Easing::CubicBezier(0.2, 0.0, 0.4, 1.5)
        );
        assert_eq!(
            "steps(4, start)".parse::<Easing>().unwrap(),
            Easing::Steps(4, StepPosition::Start)
        );
        assert_eq!(
            "steps(3)".parse::<Easing>().unwrap(),
            Easing::Steps(3, StepPosition::End)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "ease-sideways".parse::<Easing>(),
            Err(AnimationError::InvalidEasing(_))
        ));
        assert!(matches!(
            "cubic-bezier(1.5, 0, 0.5, 1)".parse::<Easing>(),
            Err(AnimationError::BezierOutOfRange(..))
        ));
        assert!("cubic-bezier(0.1, 0.2)".parse::<Easing>().is_err());
        assert!("steps(0)".parse::<Easing>().is_err());
        assert!("steps(2, middle)".parse::<Easing>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for easing in [
            Easing::Linear,
            Easing::EaseOut,
            Easing::CubicBezier(0.1, 0.7, 1.0, 0.1),
            Easing::Steps(5, StepPosition::Start),
        ] {
            assert_eq!(easing.to_string().parse::<Easing>().unwrap(), easing);
        }
    }

    #[test]
    fn test_sample_endpoints_and_shape() {
        for easing in [Easing::Ease, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            assert!(easing.sample(0.0).abs() < 1e-4);
            assert!((easing.sample(1.0) - 1.0).abs() < 1e-4);
        }
        // ease-in starts slow, ease-out starts fast
        assert!(Easing::EaseIn.sample(0.25) < 0.25);
        assert!(Easing::EaseOut.sample(0.25) > 0.25);
        assert_eq!(Easing::Linear.sample(0.3), 0.3);
    }

    #[test]
    fn test_sample_steps() {
        let end = Easing::Steps(4, StepPosition::End);
        assert_eq!(end.sample(0.0), 0.0);
        assert_eq!(end.sample(0.3), 0.25);
        assert_eq!(end.sample(1.0), 1.0);

        let start = Easing::Steps(4, StepPosition::Start);
        assert_eq!(start.sample(0.0), 0.25);
        assert_eq!(start.sample(0.3), 0.5);
        assert_eq!(start.sample(1.0), 1.0);
    }

    #[test]
    fn test_deserialize_from_string() {
        #[derive(Deserialize)]
        struct Wrapper {
            easing: Easing,
        }

        let parsed: Wrapper = serde_json::from_str(r#"{ "easing": "ease-out" }"#).unwrap();
        assert_eq!(parsed.easing, Easing::EaseOut);
        assert!(serde_json::from_str::<Wrapper>(r#"{ "easing": "bouncy" }"#).is_err());
    }
}
