//! Timed exit

use std::time::Duration;

use segue_core::{Exit, ExitDone, PhaseContext};

/// Exit strategy keeping elements visible for a fixed time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PersistFor {
    duration: Duration,
}

/// Keep exiting elements around for `duration`, then remove them
///
/// Suits exits animated by the elements themselves. Elements that re-enter
/// in the meantime are simply left out of the removal.
pub fn persist_for(duration: Duration) -> PersistFor {
    PersistFor { duration }
}

impl PersistFor {
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl<E: 'static> Exit<E> for PersistFor {
    fn exit(&self, elements: &[E], done: ExitDone<E>, phases: &PhaseContext) {
        tracing::trace!(
            "persist_for: holding {} element(s) for {:?}",
            elements.len(),
            self.duration
        );
        phases.set_timeout(self.duration, move || done.all());
    }
}
