//! Keyframe descriptions handed to the animation backend

use std::collections::BTreeMap;

use segue_core::Delta;
use serde::Deserialize;

use crate::error::{AnimationError, Result};

/// How keyframe values combine with the element's underlying value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Composite {
    #[default]
    Replace,
    Add,
    Accumulate,
}

impl Composite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Composite::Replace => "replace",
            Composite::Add => "add",
            Composite::Accumulate => "accumulate",
        }
    }
}

/// One keyframe: an optional offset plus property values
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Keyframe {
    /// Position in [0, 1]; spaced evenly when absent
    #[serde(default)]
    pub offset: Option<f32>,
    /// CSS property name to value
    #[serde(flatten)]
    pub properties: BTreeMap<String, String>,
}

impl Keyframe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property value
    pub fn set(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(property.into(), value.into());
        self
    }

    /// Pin the keyframe to an offset
    pub fn at(mut self, offset: f32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }
}

/// An ordered keyframe list
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Keyframes {
    pub frames: Vec<Keyframe>,
    #[serde(default)]
    pub composite: Composite,
}

impl Keyframes {
    /// Build a validated keyframe list
    pub fn new(frames: Vec<Keyframe>) -> Result<Self> {
        let keyframes = Self {
            frames,
            composite: Composite::Replace,
        };
        keyframes.validate()?;
        Ok(keyframes)
    }

    /// One property stepping through `values`
    pub fn property(property: &str, values: &[&str]) -> Self {
        Self {
            frames: values
                .iter()
                .map(|value| Keyframe::new().set(property, *value))
                .collect(),
            composite: Composite::Replace,
        }
    }

    /// Opacity from `from` to `to`
    pub fn fade(from: f32, to: f32) -> Self {
        Self::property(
            "opacity",
            &[from.to_string().as_str(), to.to_string().as_str()],
        )
    }

    /// The FLIP play keyframes: from the inverted offset back to no transform
    ///
    /// Composited additively so any transform the element already carries is
    /// preserved.
    pub fn translate(delta: Delta) -> Self {
        Self::property(
            "transform",
            &[
                format!("translate({}px, {}px)", delta.dx, delta.dy).as_str(),
                "none",
            ],
        )
        .with_composite(Composite::Add)
    }

    pub fn with_composite(mut self, composite: Composite) -> Self {
        self.composite = composite;
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Check offsets lie in [0, 1] and never decrease
    pub fn validate(&self) -> Result<()> {
        if self.frames.is_empty() {
            return Err(AnimationError::Keyframes("no keyframes".into()));
        }
        let mut last = 0.0f32;
        for (index, frame) in self.frames.iter().enumerate() {
            if let Some(offset) = frame.offset {
                if !(0.0..=1.0).contains(&offset) || offset < last {
                    return Err(AnimationError::KeyframeOffset { index, offset });
                }
                last = offset;
            }
        }
        Ok(())
    }

    /// Offsets with gaps filled by even spacing, as the CSS keyframe model does
    pub fn computed_offsets(&self) -> Vec<f32> {
        let count = self.frames.len();
        let mut offsets: Vec<Option<f32>> = self.frames.iter().map(|f| f.offset).collect();
        if count == 0 {
            return Vec::new();
        }
        if count == 1 {
            return vec![offsets[0].unwrap_or(1.0)];
        }
        if offsets[0].is_none() {
            offsets[0] = Some(0.0);
        }
        if offsets[count - 1].is_none() {
            offsets[count - 1] = Some(1.0);
        }

        let mut start = 0;
        while start < count - 1 {
            let Some(end) = (start + 1..count).find(|&i| offsets[i].is_some()) else {
                break;
            };
            let from = offsets[start].unwrap_or(0.0);
            let to = offsets[end].unwrap_or(1.0);
            let span = (end - start) as f32;
            for (step, offset) in offsets[start + 1..end].iter_mut().enumerate() {
                *offset = Some(from + (to - from) * (step + 1) as f32 / span);
            }
            start = end;
        }

        offsets.into_iter().map(|o| o.unwrap_or(0.0)).collect()
    }
}
