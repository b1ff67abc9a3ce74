//! Render-phase scheduling
//!
//! A reconciliation pass has two nested phases:
//!
//! - **update**: the host has applied the new element list to its tree, but
//!   nothing has been painted yet
//! - **commit**: the applied tree is committed and its final layout can be read
//!
//! Measuring or starting animations in the wrong phase yields stale geometry or
//! animations that start from the wrong point, so strategies register work
//! against a [`PhaseContext`] instead of running it immediately.
//!
//! Each pass owns its own context. There is no process-wide queue: two passes
//! in flight at once can never flush each other's callbacks.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// A deferred unit of work
pub type Task = Box<dyn FnOnce()>;

/// Ordering hooks a rendering host provides
///
/// Any host with a notion of "state applied" and "layout committed" can drive
/// Segue. A browser host would map these to a microtask after its reactive
/// flush and to the next animation frame; a retained-mode GPU host to the end
/// of its tree rebuild and the end of its layout pass.
pub trait RenderHost {
    /// Run `task` once pending reactive state has been applied to the tree
    fn after_update(&self, task: Task);

    /// Run `task` once the applied tree is committed and layout can be read
    fn after_commit(&self, task: Task);

    /// Run `task` on the next animation frame
    fn request_frame(&self, task: Task);

    /// Run `task` after `delay`
    fn set_timeout(&self, delay: Duration, task: Task);
}

// ============================================================================
// Phase Scheduler
// ============================================================================

/// Stack-scoped update/commit callback queues
///
/// `start_*` pushes a new queue frame, `apply_*` pops the innermost frame and
/// runs its callbacks in registration order. Callbacks registered while a
/// frame is being applied land in the enclosing frame.
#[derive(Default)]
pub struct PhaseScheduler {
    update: RefCell<Vec<Vec<Task>>>,
    commit: RefCell<Vec<Vec<Task>>>,
}

impl PhaseScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_update(&self) {
        self.update.borrow_mut().push(Vec::new());
    }

    /// Pop the innermost update frame and run it, returning the callback count
    pub fn apply_update(&self) -> usize {
        let frame = self.update.borrow_mut().pop();
        run_frame(frame)
    }

    pub fn start_commit(&self) {
        self.commit.borrow_mut().push(Vec::new());
    }

    /// Pop the innermost commit frame and run it, returning the callback count
    pub fn apply_commit(&self) -> usize {
        let frame = self.commit.borrow_mut().pop();
        run_frame(frame)
    }

    /// Queue `task` on the innermost update frame
    ///
    /// Hands the task back when no update frame is open.
    pub fn push_update(&self, task: Task) -> Result<(), Task> {
        push_to(&self.update, task)
    }

    /// Queue `task` on the innermost commit frame
    ///
    /// Hands the task back when no commit frame is open.
    pub fn push_commit(&self, task: Task) -> Result<(), Task> {
        push_to(&self.commit, task)
    }

    /// Queue a callback for the update phase; ignored when no frame is open
    pub fn on_update(&self, callback: impl FnOnce() + 'static) {
        let _ = self.push_update(Box::new(callback));
    }

    /// Queue a callback for the commit phase; ignored when no frame is open
    pub fn on_commit(&self, callback: impl FnOnce() + 'static) {
        let _ = self.push_commit(Box::new(callback));
    }

    pub fn update_depth(&self) -> usize {
        self.update.borrow().len()
    }

    pub fn commit_depth(&self) -> usize {
        self.commit.borrow().len()
    }
}

impl fmt::Debug for PhaseScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseScheduler")
            .field("update_depth", &self.update_depth())
            .field("commit_depth", &self.commit_depth())
            .finish()
    }
}

fn push_to(stack: &RefCell<Vec<Vec<Task>>>, task: Task) -> Result<(), Task> {
    match stack.borrow_mut().last_mut() {
        Some(frame) => {
            frame.push(task);
            Ok(())
        }
        None => Err(task),
    }
}

fn run_frame(frame: Option<Vec<Task>>) -> usize {
    let Some(tasks) = frame else {
        return 0;
    };
    let count = tasks.len();
    for task in tasks {
        task();
    }
    count
}

// ============================================================================
// Phase Context
// ============================================================================

struct PhaseContextInner {
    scheduler: PhaseScheduler,
    host: Rc<dyn RenderHost>,
}

/// The phase queues of one pass, plus the host driving it
///
/// Strategies receive this to defer work relative to the pass. Unlike the raw
/// [`PhaseScheduler`], registering after a phase has already been applied is
/// not lost: the work is handed to the host's matching hook instead.
#[derive(Clone)]
pub struct PhaseContext {
    inner: Rc<PhaseContextInner>,
}

impl PhaseContext {
    pub fn new(host: Rc<dyn RenderHost>) -> Self {
        Self {
            inner: Rc::new(PhaseContextInner {
                scheduler: PhaseScheduler::new(),
                host,
            }),
        }
    }

    pub fn scheduler(&self) -> &PhaseScheduler {
        &self.inner.scheduler
    }

    pub fn host(&self) -> &Rc<dyn RenderHost> {
        &self.inner.host
    }

    /// Run `callback` in this pass's update phase
    pub fn on_update(&self, callback: impl FnOnce() + 'static) {
        if let Err(task) = self.inner.scheduler.push_update(Box::new(callback)) {
            self.inner.host.after_update(task);
        }
    }

    /// Run `callback` in this pass's commit phase
    pub fn on_commit(&self, callback: impl FnOnce() + 'static) {
        if let Err(task) = self.inner.scheduler.push_commit(Box::new(callback)) {
            self.inner.host.after_commit(task);
        }
    }

    /// Run `callback` on the host's next animation frame
    pub fn request_frame(&self, callback: impl FnOnce() + 'static) {
        self.inner.host.request_frame(Box::new(callback));
    }

    /// Run `callback` after `delay` on the host's timer
    pub fn set_timeout(&self, delay: Duration, callback: impl FnOnce() + 'static) {
        self.inner.host.set_timeout(delay, Box::new(callback));
    }
}

impl fmt::Debug for PhaseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseContext")
            .field("scheduler", &self.inner.scheduler)
            .finish_non_exhaustive()
    }
}

/// Run one two-phase pass against `host`
///
/// 1. Opens an update and a commit frame on a fresh [`PhaseContext`]
/// 2. Runs `update` synchronously (sample first positions, publish state)
/// 3. On [`RenderHost::after_update`]: applies the update frame, then runs `commit`
/// 4. On [`RenderHost::after_commit`]: applies the commit frame
///
/// Returns the pass context so callers can register more work on it.
pub fn schedule<U, C>(host: &Rc<dyn RenderHost>, update: U, commit: C) -> PhaseContext
where
    U: FnOnce(&PhaseContext),
    C: FnOnce(&PhaseContext) + 'static,
{
    let phases = PhaseContext::new(Rc::clone(host));
    phases.scheduler().start_update();
    phases.scheduler().start_commit();

    update(&phases);

    let pass = phases.clone();
    host.after_update(Box::new(move || {
        let flushed = pass.scheduler().apply_update();
        tracing::trace!("update phase applied ({} callbacks)", flushed);

        commit(&pass);

        let committed = pass.clone();
        pass.host().after_commit(Box::new(move || {
            let flushed = committed.scheduler().apply_commit();
            tracing::trace!("commit phase applied ({} callbacks)", flushed);
        }));
    }));

    phases
}
