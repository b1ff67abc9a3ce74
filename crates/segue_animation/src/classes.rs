//! Class lifecycle names
//!
//! A class-driven transition moves an element through three class sets:
//! `from` (initial state, applied for one frame), `active` (held for the
//! whole transition, usually carries the `transition` declaration) and `to`
//! (the final state). A `name` prefix expands into the conventional
//! `{name}-{kind}-{stage}` classes, placed before any explicit ones.

use std::fmt;

use serde::Deserialize;

/// Which lifecycle a class set is resolved for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    Enter,
    Exit,
    Move,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::Enter => "enter",
            TransitionKind::Exit => "exit",
            TransitionKind::Move => "move",
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class names for one lifecycle, as configured
///
/// `from`, `active` and `to` hold whitespace separated class lists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    pub name: Option<String>,
    pub from: Option<String>,
    pub active: Option<String>,
    pub to: Option<String>,
}

impl ClassNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conventional classes only: `fade` gives `fade-enter-from` and so on
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_from(mut self, classes: impl Into<String>) -> Self {
        self.from = Some(classes.into());
        self
    }

    pub fn with_active(mut self, classes: impl Into<String>) -> Self {
        self.active = Some(classes.into());
        self
    }

    pub fn with_to(mut self, classes: impl Into<String>) -> Self {
        self.to = Some(classes.into());
        self
    }

    /// Expand into concrete class lists for `kind`
    pub fn resolve(&self, kind: TransitionKind) -> ClassSet {
        let stage = |stage: &str, explicit: &Option<String>| {
            let mut classes = Vec::new();
            if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
                classes.push(format!("{}-{}-{}", name, kind, stage));
            }
            if let Some(explicit) = explicit {
                classes.extend(explicit.split_whitespace().map(str::to_string));
            }
            classes
        };

        ClassSet {
            from: stage("from", &self.from),
            active: stage("active", &self.active),
            to: stage("to", &self.to),
        }
    }
}

/// Resolved class lists of one lifecycle
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassSet {
    pub from: Vec<String>,
    pub active: Vec<String>,
    pub to: Vec<String>,
}

impl ClassSet {
    /// Every class the lifecycle may leave on an element
    pub fn all(&self) -> Vec<String> {
        self.from
            .iter()
            .chain(&self.active)
            .chain(&self.to)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_expansion() {
        let set = ClassNames::named("fade").resolve(TransitionKind::Enter);
        assert_eq!(set.from, vec!["fade-enter-from"]);
        assert_eq!(set.active, vec!["fade-enter-active"]);
        assert_eq!(set.to, vec!["fade-enter-to"]);

        let set = ClassNames::named("slide").resolve(TransitionKind::Exit);
        assert_eq!(set.active, vec!["slide-exit-active"]);
    }

    #[test]
    fn test_name_prefix_comes_first() {
        let set = ClassNames::named("fade")
            .with_active("transition-all  duration-300")
            .resolve(TransitionKind::Move);
        assert_eq!(
            set.active,
            vec!["fade-move-active", "transition-all", "duration-300"]
        );
        assert_eq!(set.to, vec!["fade-move-to"]);
    }

    #[test]
    fn test_explicit_only() {
        let set = ClassNames::new()
            .with_from("opacity-0")
            .resolve(TransitionKind::Enter);
        assert_eq!(set.from, vec!["opacity-0"]);
        assert!(set.active.is_empty());
        assert!(set.to.is_empty());
        assert_eq!(set.all(), vec!["opacity-0"]);
    }

    #[test]
    fn test_deserialize() {
        let names: ClassNames = toml::from_str("name = \"fade\"\nto = \"visible\"").unwrap();
        assert_eq!(names, ClassNames::named("fade").with_to("visible"));
    }
}
