//! Transition group configuration

use std::fmt;
use std::rc::Rc;

use segue_animation::{Animate, ClassList, PresetConfig};
use segue_core::{Enter, Exit, Move};

/// What to do with the group's first population
pub enum Initial<E> {
    /// Show the elements without animating
    Skip,
    /// Treat them as entering
    Enter,
    /// Let the enter strategy decide through [`Enter::initial`]
    Auto,
    /// Run a dedicated strategy
    Custom(Rc<dyn Enter<E>>),
}

impl<E> Default for Initial<E> {
    fn default() -> Self {
        Initial::Auto
    }
}

impl<E> Clone for Initial<E> {
    fn clone(&self) -> Self {
        match self {
            Initial::Skip => Initial::Skip,
            Initial::Enter => Initial::Enter,
            Initial::Auto => Initial::Auto,
            Initial::Custom(strategy) => Initial::Custom(Rc::clone(strategy)),
        }
    }
}

impl<E> fmt::Debug for Initial<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Initial::Skip => f.write_str("Skip"),
            Initial::Enter => f.write_str("Enter"),
            Initial::Auto => f.write_str("Auto"),
            Initial::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Strategies a group runs, each optional
pub struct TransitionOptions<E> {
    pub enter: Option<Rc<dyn Enter<E>>>,
    pub exit: Option<Rc<dyn Exit<E>>>,
    pub move_: Option<Rc<dyn Move<E>>>,
    pub initial: Initial<E>,
}

impl<E> Default for TransitionOptions<E> {
    fn default() -> Self {
        Self {
            enter: None,
            exit: None,
            move_: None,
            initial: Initial::Auto,
        }
    }
}

impl<E> Clone for TransitionOptions<E> {
    fn clone(&self) -> Self {
        Self {
            enter: self.enter.clone(),
            exit: self.exit.clone(),
            move_: self.move_.clone(),
            initial: self.initial.clone(),
        }
    }
}

impl<E: 'static> TransitionOptions<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(mut self, strategy: impl Enter<E> + 'static) -> Self {
        self.enter = Some(Rc::new(strategy));
        self
    }

    pub fn exit(mut self, strategy: impl Exit<E> + 'static) -> Self {
        self.exit = Some(Rc::new(strategy));
        self
    }

    pub fn move_(mut self, strategy: impl Move<E> + 'static) -> Self {
        self.move_ = Some(Rc::new(strategy));
        self
    }

    pub fn initial(mut self, initial: Initial<E>) -> Self {
        self.initial = initial;
        self
    }
}

impl<E: Animate + ClassList> TransitionOptions<E> {
    /// Build every strategy a preset config describes
    pub fn from_presets(config: &PresetConfig) -> Self {
        Self {
            enter: config.build_enter(),
            exit: config.build_exit(),
            move_: config.build_move(),
            initial: Initial::Auto,
        }
    }
}

impl<E> fmt::Debug for TransitionOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionOptions")
            .field("enter", &self.enter.is_some())
            .field("exit", &self.exit.is_some())
            .field("move", &self.move_.is_some())
            .field("initial", &self.initial)
            .finish()
    }
}
