//! Timing options for keyframe animations

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::easing::Easing;

/// Default animation duration for every preset
pub const DEFAULT_DURATION: Duration = Duration::from_millis(300);

/// How an animation applies its keyframes outside its active interval
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    #[default]
    None,
    Forwards,
    /// Show the first keyframe during the delay and right from the start
    Backwards,
    Both,
}

impl FillMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillMode::None => "none",
            FillMode::Forwards => "forwards",
            FillMode::Backwards => "backwards",
            FillMode::Both => "both",
        }
    }
}

/// Timing of a keyframe animation
///
/// Deserializes from `{ duration_ms, delay_ms, easing, fill, id }`; missing
/// fields keep the preset defaults (300ms, `ease`, fill `backwards`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationOptions {
    #[serde(rename = "duration_ms", deserialize_with = "millis")]
    pub duration: Duration,
    #[serde(rename = "delay_ms", deserialize_with = "millis")]
    pub delay: Duration,
    pub easing: Easing,
    pub fill: FillMode,
    /// Identifier hosts attach to the running animation, used to find it again
    pub id: Option<String>,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            delay: Duration::ZERO,
            easing: Easing::Ease,
            fill: FillMode::Backwards,
            id: None,
        }
    }
}

impl AnimationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn duration_ms(self, ms: u64) -> Self {
        self.duration(Duration::from_millis(ms))
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn fill(mut self, fill: FillMode) -> Self {
        self.fill = fill;
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Use `id` unless an id was already chosen
    pub(crate) fn with_default_id(mut self, id: &str) -> Self {
        if self.id.is_none() {
            self.id = Some(id.to_string());
        }
        self
    }

    /// Total time until the animation has finished
    pub fn end_time(&self) -> Duration {
        self.delay + self.duration
    }
}

fn millis<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}
