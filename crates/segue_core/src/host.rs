//! Queue-driven render host
//!
//! [`QueueHost`] implements [`RenderHost`] by queueing every hook until the
//! embedding loop drains it. Immediate-mode and game-style loops call it once
//! per frame; tests use it to step through a pass phase by phase.
//!
//! ```ignore
//! loop {
//!     host.run_updates();   // after the tree picked up new state
//!     host.run_commits();   // after layout
//!     host.run_frame();     // once per displayed frame
//!     host.advance(dt);     // timers
//! }
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use crate::phase::{RenderHost, Task};

/// Upper bound on drain rounds in [`QueueHost::flush`]
const MAX_FLUSH_ROUNDS: usize = 1024;

struct Timer {
    due: Duration,
    seq: u64,
    task: Task,
}

/// A [`RenderHost`] whose hooks run when the owner drains them
#[derive(Default)]
pub struct QueueHost {
    updates: RefCell<VecDeque<Task>>,
    commits: RefCell<VecDeque<Task>>,
    frames: RefCell<VecDeque<Task>>,
    timers: RefCell<Vec<Timer>>,
    now: Cell<Duration>,
    timer_seq: Cell<u64>,
}

impl QueueHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed through [`advance`](Self::advance)
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Run update tasks until none are left, including ones queued meanwhile
    pub fn run_updates(&self) -> usize {
        drain(&self.updates)
    }

    /// Run commit tasks until none are left, including ones queued meanwhile
    pub fn run_commits(&self) -> usize {
        drain(&self.commits)
    }

    /// Run one animation frame
    ///
    /// Only tasks requested before the call run; tasks requested from inside
    /// a frame callback wait for the next frame, like `requestAnimationFrame`.
    pub fn run_frame(&self) -> usize {
        let tasks = std::mem::take(&mut *self.frames.borrow_mut());
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }

    /// Move virtual time forward and fire due timers in due order
    pub fn advance(&self, by: Duration) -> usize {
        self.now.set(self.now.get() + by);
        let mut fired = 0;
        while let Some(task) = self.pop_due_timer() {
            task();
            fired += 1;
        }
        fired
    }

    /// Drain updates, commits, frames and due timers until the host is idle
    ///
    /// Virtual time does not advance; timers that are not yet due stay queued.
    pub fn flush(&self) -> usize {
        let mut total = 0;
        for _ in 0..MAX_FLUSH_ROUNDS {
            let ran = self.run_updates()
                + self.run_commits()
                + self.run_frame()
                + self.advance(Duration::ZERO);
            if ran == 0 {
                return total;
            }
            total += ran;
        }
        tracing::warn!(
            "QueueHost::flush: still busy after {} rounds, giving up",
            MAX_FLUSH_ROUNDS
        );
        total
    }

    /// Whether nothing is queued (pending timers excluded)
    pub fn is_idle(&self) -> bool {
        self.updates.borrow().is_empty()
            && self.commits.borrow().is_empty()
            && self.frames.borrow().is_empty()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    fn pop_due_timer(&self) -> Option<Task> {
        let mut timers = self.timers.borrow_mut();
        let now = self.now.get();
        let index = timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= now)
            .min_by_key(|(_, timer)| (timer.due, timer.seq))
            .map(|(index, _)| index)?;
        Some(timers.swap_remove(index).task)
    }
}

fn drain(queue: &RefCell<VecDeque<Task>>) -> usize {
    let mut count = 0;
    loop {
        // Release the borrow before running so tasks can queue more work
        let next = queue.borrow_mut().pop_front();
        match next {
            Some(task) => {
                task();
                count += 1;
            }
            None => return count,
        }
    }
}

impl RenderHost for QueueHost {
    fn after_update(&self, task: Task) {
        self.updates.borrow_mut().push_back(task);
    }

    fn after_commit(&self, task: Task) {
        self.commits.borrow_mut().push_back(task);
    }

    fn request_frame(&self, task: Task) {
        self.frames.borrow_mut().push_back(task);
    }

    fn set_timeout(&self, delay: Duration, task: Task) {
        let seq = self.timer_seq.get();
        self.timer_seq.set(seq + 1);
        self.timers.borrow_mut().push(Timer {
            due: self.now.get() + delay,
            seq,
            task,
        });
    }
}

impl fmt::Debug for QueueHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueHost")
            .field("updates", &self.updates.borrow().len())
            .field("commits", &self.commits.borrow().len())
            .field("frames", &self.frames.borrow().len())
            .field("timers", &self.timers.borrow().len())
            .field("now", &self.now.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_frame_requests_from_a_frame_wait_for_the_next() {
        let host = Rc::new(QueueHost::new());
        let count = Rc::new(Cell::new(0));

        let inner_host = host.clone();
        let inner_count = count.clone();
        host.request_frame(Box::new(move || {
            inner_count.set(inner_count.get() + 1);
            let again = inner_count.clone();
            inner_host.request_frame(Box::new(move || again.set(again.get() + 1)));
        }));

        assert_eq!(host.run_frame(), 1);
        assert_eq!(count.get(), 1);
        assert_eq!(host.run_frame(), 1);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_timers_fire_in_due_order() {
        let host = QueueHost::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for (delay, name) in [(30, "late"), (10, "early"), (10, "early-second")] {
            let order = order.clone();
            host.set_timeout(
                Duration::from_millis(delay),
                Box::new(move || order.borrow_mut().push(name)),
            );
        }

        assert_eq!(host.advance(Duration::from_millis(5)), 0);
        assert_eq!(host.advance(Duration::from_millis(5)), 2);
        assert_eq!(*order.borrow(), vec!["early", "early-second"]);
        assert_eq!(host.pending_timers(), 1);

        host.advance(Duration::from_millis(20));
        assert_eq!(*order.borrow(), vec!["early", "early-second", "late"]);
        assert_eq!(host.now(), Duration::from_millis(30));
    }

    #[test]
    fn test_flush_drains_chained_work() {
        let host = Rc::new(QueueHost::new());
        let done = Rc::new(Cell::new(false));

        let h = host.clone();
        let d = done.clone();
        host.after_update(Box::new(move || {
            let h2 = h.clone();
            h.after_commit(Box::new(move || {
                h2.request_frame(Box::new(move || d.set(true)));
            }));
        }));

        host.flush();
        assert!(done.get());
        assert!(host.is_idle());
    }
}
