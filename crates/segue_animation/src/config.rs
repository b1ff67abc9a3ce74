//! Declarative preset configuration
//!
//! Strategies can be described in TOML or JSON and built at runtime:
//!
//! ```toml
//! [enter]
//! kind = "css"
//! classes = { name = "fade" }
//! event = "transition"
//!
//! [exit]
//! kind = "animate"
//! detach = "absolute"
//! reverse_enter = true
//! options = { duration_ms = 200, easing = "ease-in" }
//!
//! [move]
//! kind = "animate"
//! anchor = "parent"
//! ```

use std::rc::Rc;
use std::time::Duration;

use segue_core::{Anchor, DetachMode, Enter, Exit, Move};
use serde::Deserialize;

use crate::backend::{Animate, ClassList, EndEventType};
use crate::classes::ClassNames;
use crate::error::Result;
use crate::keyframe::Keyframes;
use crate::options::AnimationOptions;
use crate::presets::{
    animate_enter, animate_exit, animate_move, css_enter, css_exit, css_move, persist_for,
    EnterAnimation, ExitAnimation, ExitBehavior, MoveAnimation,
};

/// Detach mode as written in config files
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetachSetting {
    Absolute,
    Fixed,
}

impl From<DetachSetting> for DetachMode {
    fn from(setting: DetachSetting) -> Self {
        match setting {
            DetachSetting::Absolute => DetachMode::Absolute,
            DetachSetting::Fixed => DetachMode::Fixed,
        }
    }
}

/// Sampling anchor as written in config files
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorSetting {
    #[default]
    Viewport,
    Parent,
}

impl From<AnchorSetting> for Anchor {
    fn from(setting: AnchorSetting) -> Self {
        match setting {
            AnchorSetting::Viewport => Anchor::Viewport,
            AnchorSetting::Parent => Anchor::Parent,
        }
    }
}

/// Enter preset description
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EnterPreset {
    Animate {
        #[serde(default)]
        keyframes: Option<Keyframes>,
        #[serde(default)]
        options: AnimationOptions,
        #[serde(default)]
        animate_initial: bool,
    },
    Css {
        #[serde(default)]
        classes: ClassNames,
        #[serde(default)]
        event: EndEventType,
        #[serde(default)]
        separate: bool,
    },
}

/// Exit preset description
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExitPreset {
    Animate {
        #[serde(default)]
        keyframes: Option<Keyframes>,
        #[serde(default)]
        options: AnimationOptions,
        #[serde(default)]
        detach: Option<DetachSetting>,
        #[serde(default)]
        reverse_enter: bool,
        #[serde(default)]
        separate: Option<bool>,
    },
    Css {
        #[serde(default)]
        classes: ClassNames,
        #[serde(default)]
        event: EndEventType,
        #[serde(default)]
        separate: bool,
        #[serde(default)]
        detach: Option<DetachSetting>,
    },
    Persist { duration_ms: u64 },
}

/// Move preset description
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MovePreset {
    Animate {
        #[serde(default)]
        options: AnimationOptions,
        #[serde(default)]
        anchor: AnchorSetting,
    },
    Css {
        #[serde(default)]
        classes: ClassNames,
        #[serde(default)]
        event: EndEventType,
        #[serde(default)]
        anchor: AnchorSetting,
    },
}

/// A full set of optional enter / exit / move presets
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PresetConfig {
    pub enter: Option<EnterPreset>,
    pub exit: Option<ExitPreset>,
    #[serde(rename = "move")]
    pub move_: Option<MovePreset>,
}

impl PresetConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config = toml::from_str(source)?;
        Ok(config)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let config = serde_json::from_str(source)?;
        Ok(config)
    }

    /// Check every keyframe list the config carries
    pub fn validate(&self) -> Result<()> {
        if let Some(EnterPreset::Animate {
            keyframes: Some(keyframes),
            ..
        }) = &self.enter
        {
            keyframes.validate()?;
        }
        if let Some(ExitPreset::Animate {
            keyframes: Some(keyframes),
            ..
        }) = &self.exit
        {
            keyframes.validate()?;
        }
        Ok(())
    }

    pub fn build_enter<E: Animate + ClassList>(&self) -> Option<Rc<dyn Enter<E>>> {
        let strategy: Rc<dyn Enter<E>> = match self.enter.as_ref()? {
            EnterPreset::Animate {
                keyframes,
                options,
                animate_initial,
            } => {
                let mut animation = EnterAnimation::new()
                    .options(options.clone())
                    .animate_initial(*animate_initial);
                if let Some(keyframes) = keyframes {
                    animation = animation.keyframes(keyframes.clone());
                }
                Rc::new(animate_enter(animation))
            }
            EnterPreset::Css {
                classes,
                event,
                separate,
            } => Rc::new(
                css_enter(classes.clone())
                    .event(*event)
                    .separate(*separate),
            ),
        };
        Some(strategy)
    }

    pub fn build_exit<E: Animate + ClassList>(&self) -> Option<Rc<dyn Exit<E>>> {
        let strategy: Rc<dyn Exit<E>> = match self.exit.as_ref()? {
            ExitPreset::Animate {
                keyframes,
                options,
                detach,
                reverse_enter,
                separate,
            } => {
                let mut animation = ExitAnimation::new().options(options.clone());
                if let Some(keyframes) = keyframes {
                    animation = animation.keyframes(keyframes.clone());
                }
                let behavior = ExitBehavior {
                    detach: detach.map(DetachMode::from),
                    reverse_enter: *reverse_enter,
                    separate: *separate,
                };
                Rc::new(animate_exit::<E>(animation, behavior))
            }
            ExitPreset::Css {
                classes,
                event,
                separate,
                detach,
            } => {
                let mut exit = css_exit::<E>(classes.clone())
                    .event(*event)
                    .separate(*separate);
                if let Some(mode) = detach {
                    exit = exit.detach((*mode).into());
                }
                Rc::new(exit)
            }
            ExitPreset::Persist { duration_ms } => {
                Rc::new(persist_for(Duration::from_millis(*duration_ms)))
            }
        };
        Some(strategy)
    }

    pub fn build_move<E: Animate + ClassList>(&self) -> Option<Rc<dyn Move<E>>> {
        let strategy: Rc<dyn Move<E>> = match self.move_.as_ref()? {
            MovePreset::Animate { options, anchor } => Rc::new(animate_move(
                MoveAnimation::new()
                    .options(options.clone())
                    .anchor((*anchor).into()),
            )),
            MovePreset::Css {
                classes,
                event,
                anchor,
            } => Rc::new(
                css_move::<E>(classes.clone())
                    .event(*event)
                    .anchor((*anchor).into()),
            ),
        };
        Some(strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::error::AnimationError;

    #[test]
    fn test_toml_config() {
        let config = PresetConfig::from_toml_str(
            r#"
            [enter]
            kind = "css"
            classes = { name = "fade" }
            event = "transition"

            [exit]
            kind = "animate"
            detach = "absolute"
            reverse_enter = true
            options = { duration_ms = 200, easing = "ease-in" }

            [move]
            kind = "animate"
            anchor = "parent"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.enter,
            Some(EnterPreset::Css {
                classes: ClassNames::named("fade"),
                event: EndEventType::Transition,
                separate: false,
            })
        );
        match config.exit {
            Some(ExitPreset::Animate {
                options,
                detach,
                reverse_enter,
                separate,
                ..
            }) => {
                assert_eq!(options.duration, Duration::from_millis(200));
                assert_eq!(options.easing, Easing::EaseIn);
                assert_eq!(detach, Some(DetachSetting::Absolute));
                assert!(reverse_enter);
                assert_eq!(separate, None);
            }
            other => panic!("unexpected exit preset: {:?}", other),
        }
        assert_eq!(
            config.move_,
            Some(MovePreset::Animate {
                options: AnimationOptions::default(),
                anchor: AnchorSetting::Parent,
            })
        );
    }

    #[test]
    fn test_json_persist() {
        let config =
            PresetConfig::from_json_str(r#"{ "exit": { "kind": "persist", "duration_ms": 500 } }"#)
                .unwrap();
        assert_eq!(config.exit, Some(ExitPreset::Persist { duration_ms: 500 }));
        assert!(config.enter.is_none());
        assert!(config.move_.is_none());
    }

    #[test]
    fn test_bad_easing_is_reported() {
        let result = PresetConfig::from_toml_str(
            r#"
            [enter]
            kind = "animate"
            options = { easing = "ease-sideways" }
            "#,
        );
        assert!(matches!(result, Err(AnimationError::Toml(_))));
    }

    #[test]
    fn test_validate_keyframes() {
        let config = PresetConfig::from_json_str(
            r#"{ "enter": { "kind": "animate", "keyframes": { "frames": [
                { "opacity": "0", "offset": 0.8 },
                { "opacity": "1", "offset": 0.2 }
            ] } } }"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(AnimationError::KeyframeOffset { index: 1, .. })
        ));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = PresetConfig::from_json_str(r#"{ "move": { "kind": "teleport" } }"#);
        assert!(matches!(result, Err(AnimationError::Json(_))));
    }
}
