//! Transition group reconciliation
//!
//! A [`TransitionGroup`] remembers which elements it showed last time. Each
//! [`reconcile`](TransitionGroup::reconcile) pass diffs the newly resolved
//! elements against that set:
//!
//! - **entering**: present now, absent before
//! - **exiting**: present before, absent now; kept visible at their previous
//!   index until the exit strategy completes them
//! - **moving**: everything that was visible before, sampled by the move
//!   strategy ahead of the publish so it can measure the displacement
//!
//! ```text
//! reconcile ─► diff ─► Move samples First ─► publish visible list
//!                                                │
//!                       after_update ◄───────────┘
//!                       Enter / Exit run
//!                                                │
//!                       after_commit ◄───────────┘
//!                       Move reads Last and plays
//! ```

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use segue_core::{schedule, Element, Exit, ExitDone, PhaseContext, Removal, RenderHost};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::child::{resolve_elements, Child, FxIndexSet};
use crate::options::{Initial, TransitionOptions};
use crate::visible::VisibleList;

new_key_type! {
    struct ExitBatchKey;
}

/// Elements of one exit invocation still waiting for completion
struct ExitBatch<E> {
    pending: FxIndexSet<E>,
    /// The strategy that started the exit, told about re-entries
    strategy: Rc<dyn Exit<E>>,
}

struct GroupState<E> {
    options: TransitionOptions<E>,
    previous: FxIndexSet<E>,
    exits: SlotMap<ExitBatchKey, ExitBatch<E>>,
    /// Latest pass that queued an enter for each element
    entering: FxHashMap<E, u64>,
    passes: u64,
    initial: bool,
}

impl<E: Element> GroupState<E> {
    fn is_pending(&self, element: &E) -> bool {
        self.exits
            .values()
            .any(|batch| batch.pending.contains(element))
    }

    fn pending_count(&self) -> usize {
        self.exits.values().map(|batch| batch.pending.len()).sum()
    }

    /// Claim `elements` for an enter deferred to the update phase
    fn queue_enter(&mut self, elements: &[E]) -> u64 {
        self.passes += 1;
        for element in elements {
            self.entering.insert(element.clone(), self.passes);
        }
        self.passes
    }

    /// Queued elements of `pass` that are still present and not exiting
    ///
    /// A later pass that removed or re-queued an element voids its claim.
    fn take_entering(&mut self, pass: u64, elements: &[E]) -> Vec<E> {
        let mut live = Vec::with_capacity(elements.len());
        for element in elements {
            if self.entering.get(element) != Some(&pass) {
                continue;
            }
            self.entering.remove(element);
            if self.previous.contains(element) && !self.is_pending(element) {
                live.push(element.clone());
            }
        }
        live
    }

    /// Elements of `key`'s batch that were not re-added since it started
    fn take_exiting(&self, key: ExitBatchKey, elements: &[E]) -> Vec<E> {
        match self.exits.get(key) {
            Some(batch) => elements
                .iter()
                .filter(|el| batch.pending.contains(*el))
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }
}

struct Shared<E> {
    host: Rc<dyn RenderHost>,
    state: RefCell<GroupState<E>>,
    visible: VisibleList<E>,
}

/// Outcome of one reconciliation pass
#[derive(Clone, Debug, PartialEq)]
pub struct PassSummary<E> {
    /// Newly present elements, in display order
    pub entering: Vec<E>,
    /// Elements that left this pass, in their previous order
    pub exiting: Vec<E>,
    /// Entering elements whose pending exit was cancelled
    pub cancelled: Vec<E>,
    /// Whether this pass consumed the initial population
    pub initial: bool,
}

impl<E> PassSummary<E> {
    fn empty(initial: bool) -> Self {
        Self {
            entering: Vec::new(),
            exiting: Vec::new(),
            cancelled: Vec::new(),
            initial,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.entering.is_empty() && self.exiting.is_empty()
    }
}

/// Reconciles a changing element list and drives its transitions
///
/// Single-threaded: handles are `Rc`-based and no internal borrow is held
/// while strategies or visible-list subscribers run, so both may call back
/// into the group.
pub struct TransitionGroup<E: Element> {
    shared: Rc<Shared<E>>,
}

impl<E: Element> TransitionGroup<E> {
    pub fn new(host: Rc<dyn RenderHost>, options: TransitionOptions<E>) -> Self {
        Self {
            shared: Rc::new(Shared {
                host,
                state: RefCell::new(GroupState {
                    options,
                    previous: FxIndexSet::default(),
                    exits: SlotMap::with_key(),
                    entering: FxHashMap::default(),
                    passes: 0,
                    initial: true,
                }),
                visible: VisibleList::new(),
            }),
        }
    }

    /// Replace the configuration, returning the group for chaining
    pub fn with_options(self, options: TransitionOptions<E>) -> Self {
        self.set_options(options);
        self
    }

    /// Replace the configuration; applies from the next pass
    pub fn set_options(&self, options: TransitionOptions<E>) {
        self.shared.state.borrow_mut().options = options;
    }

    /// Edit the configuration in place; applies from the next pass
    pub fn update_options(&self, update: impl FnOnce(&mut TransitionOptions<E>)) {
        update(&mut self.shared.state.borrow_mut().options);
    }

    /// The list downstream rendering should show
    pub fn visible(&self) -> &VisibleList<E> {
        &self.shared.visible
    }

    pub fn elements(&self) -> Vec<E> {
        self.shared.visible.to_vec()
    }

    /// Number of elements still waiting for their exit to complete
    pub fn pending_exits(&self) -> usize {
        self.shared.state.borrow().pending_count()
    }

    /// Whether the first non-empty population is still to come
    pub fn is_initial(&self) -> bool {
        self.shared.state.borrow().initial
    }

    /// Run one reconciliation pass against freshly resolved children
    pub fn reconcile(&self, children: &[Child<E>]) -> PassSummary<E> {
        let resolved = resolve_elements(children);
        if resolved.duplicates > 0 {
            tracing::warn!(
                "transition group: {} duplicate element reference(s) ignored",
                resolved.duplicates
            );
        }

        let initial = self.shared.state.borrow().initial;
        if initial {
            if resolved.elements.is_empty() {
                return PassSummary::empty(false);
            }
            return self.initial_pass(resolved.elements);
        }
        self.pass(resolved.elements)
    }

    fn initial_pass(&self, current: FxIndexSet<E>) -> PassSummary<E> {
        let elements: Vec<E> = current.iter().cloned().collect();
        let (options, strategy) = {
            let mut state = self.shared.state.borrow_mut();
            state.initial = false;
            state.previous = current;
            let options = state.options.clone();
            let strategy = match &options.initial {
                Initial::Skip => None,
                Initial::Enter => options.enter.clone().map(|enter| (enter, false)),
                Initial::Auto => options.enter.clone().map(|enter| (enter, true)),
                Initial::Custom(strategy) => Some((Rc::clone(strategy), false)),
            };
            let strategy =
                strategy.map(|(enter, auto)| (enter, auto, state.queue_enter(&elements)));
            (options, strategy)
        };
        tracing::debug!(
            "transition group: initial population of {} element(s), {:?}",
            elements.len(),
            options.initial
        );

        let entering = elements.clone();
        let published = elements.clone();
        schedule(
            &self.shared.host,
            |phases| {
                self.shared.visible.publish(published);
                if let Some((strategy, auto, queued)) = strategy {
                    let shared = Rc::downgrade(&self.shared);
                    let pass = phases.clone();
                    phases.on_update(move || {
                        let Some(shared) = Weak::upgrade(&shared) else {
                            return;
                        };
                        let elements = shared.state.borrow_mut().take_entering(queued, &elements);
                        if elements.is_empty() {
                            return;
                        }
                        if auto {
                            strategy.initial(&elements, &pass);
                        } else {
                            strategy.enter(&elements, &pass);
                        }
                    });
                }
            },
            |_| tracing::trace!("transition group: initial pass applied"),
        );

        PassSummary {
            entering,
            exiting: Vec::new(),
            cancelled: Vec::new(),
            initial: true,
        }
    }

    fn pass(&self, current: FxIndexSet<E>) -> PassSummary<E> {
        let prior: Rc<[E]> = self.shared.visible.get();

        let mut state = self.shared.state.borrow_mut();
        let options = state.options.clone();

        let mut previous = mem::take(&mut state.previous);
        let entering: Vec<E> = current
            .iter()
            .filter(|el| !previous.contains(*el))
            .cloned()
            .collect();
        // What survives the in-place removal is exactly the exiting set
        previous.retain(|el| !current.contains(el));
        let exiting = previous;

        // Re-entering elements leave their pending batch
        let mut cancelled: Vec<E> = Vec::new();
        let mut cancellations: SmallVec<[(Rc<dyn Exit<E>>, Vec<E>); 2]> = SmallVec::new();
        for element in &entering {
            for batch in state.exits.values_mut() {
                if batch.pending.shift_remove(element) {
                    cancelled.push(element.clone());
                    match cancellations
                        .iter_mut()
                        .find(|(strategy, _)| Rc::ptr_eq(strategy, &batch.strategy))
                    {
                        Some((_, elements)) => elements.push(element.clone()),
                        None => {
                            cancellations.push((Rc::clone(&batch.strategy), vec![element.clone()]))
                        }
                    }
                    break;
                }
            }
        }
        state.exits.retain(|_, batch| !batch.pending.is_empty());

        let exit_strategy = options.exit.clone().filter(|_| !exiting.is_empty());
        let enter = options
            .enter
            .clone()
            .filter(|_| !entering.is_empty())
            .map(|strategy| (strategy, state.queue_enter(&entering)));

        let mut sequence: Vec<E> = current.iter().cloned().collect();
        for (index, element) in prior.iter().enumerate() {
            if current.contains(element) {
                continue;
            }
            let keep = state.is_pending(element)
                || (exit_strategy.is_some() && exiting.contains(element));
            if keep {
                let at = index.min(sequence.len());
                tracing::trace!("transition group: re-splicing exiting element at {}", at);
                sequence.insert(at, element.clone());
            }
        }

        let exiting_list: Vec<E> = exiting.iter().cloned().collect();
        let exit_batch = exit_strategy.map(|strategy| {
            let key = state.exits.insert(ExitBatch {
                pending: exiting,
                strategy: Rc::clone(&strategy),
            });
            (strategy, key)
        });

        state.previous = current;
        drop(state);

        tracing::debug!(
            entering = entering.len(),
            exiting = exiting_list.len(),
            cancelled = cancelled.len(),
            "transition group: reconcile pass"
        );

        let summary = PassSummary {
            entering: entering.clone(),
            exiting: exiting_list.clone(),
            cancelled,
            initial: false,
        };

        schedule(
            &self.shared.host,
            |phases| {
                if let Some(strategy) = &options.move_ {
                    if !prior.is_empty() {
                        strategy.moved(&prior, phases);
                    }
                }

                self.shared.visible.publish(sequence);

                for (strategy, elements) in cancellations {
                    strategy.cancel(&elements);
                }

                // Another pass may run before the update phase; both deferred
                // calls only see what is still entering or exiting by then
                if let Some((strategy, queued)) = enter {
                    let shared = Rc::downgrade(&self.shared);
                    let pass = phases.clone();
                    phases.on_update(move || {
                        let Some(shared) = Weak::upgrade(&shared) else {
                            return;
                        };
                        let live = shared.state.borrow_mut().take_entering(queued, &entering);
                        if live.len() < entering.len() {
                            tracing::trace!(
                                "transition group: {} stale enter(s) skipped",
                                entering.len() - live.len()
                            );
                        }
                        if !live.is_empty() {
                            strategy.enter(&live, &pass);
                        }
                    });
                }

                if let Some((strategy, key)) = exit_batch {
                    let done = self.exit_done(key);
                    let shared = Rc::downgrade(&self.shared);
                    let pass = phases.clone();
                    phases.on_update(move || {
                        let Some(shared) = Weak::upgrade(&shared) else {
                            return;
                        };
                        let live = shared.state.borrow().take_exiting(key, &exiting_list);
                        if live.len() < exiting_list.len() {
                            tracing::trace!(
                                "transition group: {} stale exit(s) skipped",
                                exiting_list.len() - live.len()
                            );
                        }
                        if !live.is_empty() {
                            strategy.exit(&live, done, &pass);
                        }
                    });
                }
            },
            |_| tracing::trace!("transition group: pass applied"),
        );

        summary
    }

    fn exit_done(&self, key: ExitBatchKey) -> ExitDone<E> {
        let shared = Rc::downgrade(&self.shared);
        ExitDone::new(move |removal: Removal<'_, E>| {
            if let Some(shared) = Weak::upgrade(&shared) {
                Shared::complete_exit(&shared, key, removal);
            }
        })
    }
}

impl<E: Element> Shared<E> {
    /// Drop completed exiting elements from the visible list
    ///
    /// Elements already completed, re-entered, or belonging to another batch
    /// are ignored.
    fn complete_exit(this: &Rc<Self>, key: ExitBatchKey, removal: Removal<'_, E>) {
        let (removed, move_strategy) = {
            let mut state = this.state.borrow_mut();
            let Some(batch) = state.exits.get_mut(key) else {
                return;
            };
            let removed: FxIndexSet<E> = match removal {
                Removal::All => batch.pending.drain(..).collect(),
                Removal::Only(elements) => elements
                    .iter()
                    .filter(|el| batch.pending.shift_remove(*el))
                    .cloned()
                    .collect(),
            };
            if batch.pending.is_empty() {
                state.exits.remove(key);
            }
            if removed.is_empty() {
                return;
            }
            (removed, state.options.move_.clone())
        };

        let survivors: Vec<E> = this
            .visible
            .get()
            .iter()
            .filter(|el| !removed.contains(*el))
            .cloned()
            .collect();
        tracing::debug!(
            "transition group: {} exit(s) completed, {} element(s) remain",
            removed.len(),
            survivors.len()
        );

        schedule(
            &this.host,
            |phases: &PhaseContext| {
                if let Some(strategy) = move_strategy {
                    strategy.moved(&survivors, phases);
                }
                this.visible.publish(survivors);
            },
            |_| tracing::trace!("transition group: exit completion applied"),
        );
    }
}

impl<E: Element + fmt::Debug> fmt::Debug for TransitionGroup<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("TransitionGroup")
            .field("visible", &self.shared.visible)
            .field("options", &state.options)
            .field("pending_exits", &state.pending_count())
            .field("initial", &state.initial)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segue_core::{filter_moved, Anchor, Enter, Move, Moved, QueueHost, Rect, StyleProp};
    use std::cell::Cell;
    use std::hash::{Hash, Hasher};

    struct NodeInner {
        name: &'static str,
        rect: Cell<Rect>,
    }

    #[derive(Clone)]
    struct Node(Rc<NodeInner>);

    impl Node {
        fn new(name: &'static str) -> Self {
            Node(Rc::new(NodeInner {
                name,
                rect: Cell::new(Rect::default()),
            }))
        }
    }

    impl PartialEq for Node {
        fn eq(&self, other: &Self) -> bool {
            Rc::ptr_eq(&self.0, &other.0)
        }
    }

    impl Eq for Node {}

    impl Hash for Node {
        fn hash<H: Hasher>(&self, state: &mut H) {
            (Rc::as_ptr(&self.0) as usize).hash(state);
        }
    }

    impl fmt::Debug for Node {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0.name)
        }
    }

    impl Element for Node {
        fn is_connected(&self) -> bool {
            true
        }

        fn bounding_rect(&self) -> Rect {
            self.0.rect.get()
        }

        fn set_style(&self, _prop: StyleProp, _value: &str) {}

        fn remove_style(&self, _prop: StyleProp) {}
    }

    fn children(nodes: &[&Node]) -> Vec<Child<Node>> {
        nodes.iter().map(|n| Child::element((*n).clone())).collect()
    }

    fn names(nodes: &[Node]) -> Vec<&'static str> {
        nodes.iter().map(|n| n.0.name).collect()
    }

    struct Fixture {
        host: Rc<QueueHost>,
        group: TransitionGroup<Node>,
    }

    fn fixture(options: TransitionOptions<Node>) -> Fixture {
        let host = Rc::new(QueueHost::new());
        let render_host: Rc<dyn RenderHost> = host.clone();
        let group = TransitionGroup::new(render_host, options);
        // Stack published elements vertically, 10px apart
        group.visible().subscribe(|elements: &[Node]| {
            for (i, el) in elements.iter().enumerate() {
                el.0.rect.set(Rect::new(0.0, i as f32 * 10.0, 100.0, 10.0));
            }
        });
        Fixture { host, group }
    }

    type Log = Rc<RefCell<Vec<(&'static str, Vec<&'static str>)>>>;

    type Exits = Rc<RefCell<Vec<ExitDone<Node>>>>;

    fn recording_options(log: &Log, exits: &Exits) -> TransitionOptions<Node> {
        let enter_log = log.clone();
        let exit_log = log.clone();
        let cancel_log = log.clone();
        let exits = exits.clone();

        struct RecordingExit {
            log: Log,
            cancel_log: Log,
            exits: Exits,
        }

        impl Exit<Node> for RecordingExit {
            fn exit(&self, elements: &[Node], done: ExitDone<Node>, _: &PhaseContext) {
                self.log.borrow_mut().push(("exit", names(elements)));
                self.exits.borrow_mut().push(done);
            }

            fn cancel(&self, elements: &[Node]) {
                self.cancel_log.borrow_mut().push(("cancel", names(elements)));
            }
        }

        TransitionOptions::new()
            .enter(move |els: &[Node], _: &PhaseContext| {
                enter_log.borrow_mut().push(("enter", names(els)))
            })
            .exit(RecordingExit {
                log: exit_log,
                cancel_log,
                exits,
            })
            .initial(Initial::Skip)
    }

    #[test]
    fn test_add_then_remove_scenario() {
        let (x, y, z) = (Node::new("x"), Node::new("y"), Node::new("z"));
        let log: Log = Rc::default();
        let exits = Rc::default();
        let f = fixture(recording_options(&log, &exits));

        let summary = f.group.reconcile(&children(&[&x, &y]));
        assert!(summary.initial);
        f.host.flush();
        assert!(log.borrow().is_empty());
        assert!(!f.group.is_initial());

        let summary = f.group.reconcile(&children(&[&x, &y, &z]));
        assert_eq!(names(&summary.entering), vec!["z"]);
        f.host.flush();
        assert_eq!(*log.borrow(), vec![("enter", vec!["z"])]);

        let summary = f.group.reconcile(&children(&[&y, &z]));
        assert_eq!(names(&summary.exiting), vec!["x"]);
        // Still visible while exiting
        assert_eq!(names(&f.group.elements()), vec!["x", "y", "z"]);
        f.host.flush();
        assert_eq!(log.borrow()[1], ("exit", vec!["x"]));
        assert_eq!(f.group.pending_exits(), 1);

        exits.borrow()[0].all();
        assert_eq!(names(&f.group.elements()), vec!["y", "z"]);
        assert_eq!(f.group.pending_exits(), 0);
    }

    #[test]
    fn test_set_partition() {
        let nodes: Vec<Node> = ["a", "b", "c", "d", "e"].into_iter().map(Node::new).collect();
        let log: Log = Rc::default();
        let exits = Rc::default();
        let f = fixture(recording_options(&log, &exits));

        f.group.reconcile(&children(&[&nodes[0], &nodes[1], &nodes[2]]));
        let summary = f
            .group
            .reconcile(&children(&[&nodes[2], &nodes[3], &nodes[1], &nodes[4]]));

        assert_eq!(names(&summary.entering), vec!["d", "e"]);
        assert_eq!(names(&summary.exiting), vec!["a"]);
        assert!(summary.cancelled.is_empty());
        assert!(!summary.is_unchanged());
    }

    #[test]
    fn test_exiting_elements_keep_their_index() {
        let nodes: Vec<Node> = ["a", "b", "c", "d", "e"].into_iter().map(Node::new).collect();
        let (a, b, c, d, e) = (&nodes[0], &nodes[1], &nodes[2], &nodes[3], &nodes[4]);
        let log: Log = Rc::default();
        let exits = Rc::default();
        let f = fixture(recording_options(&log, &exits));

        f.group.reconcile(&children(&[a, b, c, d]));
        f.group.reconcile(&children(&[a, c]));
        assert_eq!(names(&f.group.elements()), vec!["a", "b", "c", "d"]);

        f.group.reconcile(&children(&[a, c, e]));
        assert_eq!(names(&f.group.elements()), vec!["a", "b", "c", "d", "e"]);

        f.host.flush();
        exits.borrow()[0].element(b);
        assert_eq!(names(&f.group.elements()), vec!["a", "c", "d", "e"]);
    }

    #[test]
    fn test_completion_is_idempotent() {
        let (a, b, c) = (Node::new("a"), Node::new("b"), Node::new("c"));
        let log: Log = Rc::default();
        let exits = Rc::default();
        let f = fixture(recording_options(&log, &exits));

        f.group.reconcile(&children(&[&a, &b, &c]));
        f.group.reconcile(&children(&[&c]));
        f.host.flush();
        let done = exits.borrow()[0].clone();

        done.element(&a);
        let version = f.group.visible().version();
        assert_eq!(names(&f.group.elements()), vec!["b", "c"]);

        // Repeats and elements outside the batch change nothing
        done.element(&a);
        done.element(&c);
        assert_eq!(f.group.visible().version(), version);

        done.all();
        done.all();
        assert_eq!(names(&f.group.elements()), vec!["c"]);
        assert_eq!(f.group.visible().version(), version + 1);
    }

    #[test]
    fn test_readd_cancels_pending_exit() {
        let (a, b) = (Node::new("a"), Node::new("b"));
        let log: Log = Rc::default();
        let exits = Rc::default();
        let f = fixture(recording_options(&log, &exits));

        f.group.reconcile(&children(&[&a, &b]));
        f.group.reconcile(&children(&[&b]));
        f.host.flush();
        assert_eq!(f.group.pending_exits(), 1);

        let summary = f.group.reconcile(&children(&[&a, &b]));
        assert_eq!(names(&summary.entering), vec!["a"]);
        assert_eq!(names(&summary.cancelled), vec!["a"]);
        assert_eq!(f.group.pending_exits(), 0);
        f.host.flush();
        assert!(log.borrow().contains(&("cancel", vec!["a"])));
        assert!(log.borrow().contains(&("enter", vec!["a"])));

        // The stale completion must not remove the re-added element
        exits.borrow()[0].all();
        assert_eq!(names(&f.group.elements()), vec!["a", "b"]);
    }

    #[test]
    fn test_readd_before_flush_skips_queued_exit() {
        let (a, b) = (Node::new("a"), Node::new("b"));
        let log: Log = Rc::default();
        let exits: Exits = Rc::default();
        let f = fixture(recording_options(&log, &exits));

        f.group.reconcile(&children(&[&a, &b]));
        f.host.flush();

        f.group.reconcile(&children(&[&b]));
        let summary = f.group.reconcile(&children(&[&a, &b]));
        assert_eq!(names(&summary.cancelled), vec!["a"]);
        f.host.flush();

        // The first pass's exit never starts on the re-added element
        assert_eq!(
            *log.borrow(),
            vec![("cancel", vec!["a"]), ("enter", vec!["a"])]
        );
        assert!(exits.borrow().is_empty());
        assert_eq!(f.group.pending_exits(), 0);
        assert_eq!(names(&f.group.elements()), vec!["a", "b"]);
    }

    #[test]
    fn test_partial_readd_before_flush_exits_the_rest() {
        let (a, b, c) = (Node::new("a"), Node::new("b"), Node::new("c"));
        let log: Log = Rc::default();
        let exits: Exits = Rc::default();
        let f = fixture(recording_options(&log, &exits));

        f.group.reconcile(&children(&[&a, &b, &c]));
        f.group.reconcile(&children(&[&c]));
        f.group.reconcile(&children(&[&a, &c]));
        f.host.flush();

        assert_eq!(log.borrow()[1], ("exit", vec!["b"]));
        assert_eq!(f.group.pending_exits(), 1);
        exits.borrow()[0].all();
        assert_eq!(names(&f.group.elements()), vec!["a", "c"]);
    }

    #[test]
    fn test_remove_before_flush_skips_queued_enter() {
        let (a, b) = (Node::new("a"), Node::new("b"));
        let log: Log = Rc::default();
        let exits: Exits = Rc::default();
        let f = fixture(recording_options(&log, &exits));

        f.group.reconcile(&children(&[&a]));
        f.host.flush();

        f.group.reconcile(&children(&[&a, &b]));
        f.group.reconcile(&children(&[&a]));
        f.host.flush();

        assert_eq!(*log.borrow(), vec![("exit", vec!["b"])]);
        assert_eq!(f.group.pending_exits(), 1);
    }

    #[test]
    fn test_requeued_enter_runs_once() {
        let (a, b) = (Node::new("a"), Node::new("b"));
        let log: Log = Rc::default();
        let exits: Exits = Rc::default();
        let f = fixture(recording_options(&log, &exits));

        f.group.reconcile(&children(&[&a]));
        f.host.flush();

        // Added, removed and added again before the update phase
        f.group.reconcile(&children(&[&a, &b]));
        f.group.reconcile(&children(&[&a]));
        f.group.reconcile(&children(&[&a, &b]));
        f.host.flush();

        assert_eq!(
            *log.borrow(),
            vec![("cancel", vec!["b"]), ("enter", vec!["b"])]
        );
        assert!(exits.borrow().is_empty());
    }

    #[test]
    fn test_without_exit_strategy_elements_leave_immediately() {
        let (a, b) = (Node::new("a"), Node::new("b"));
        let f = fixture(TransitionOptions::new().initial(Initial::Skip));

        f.group.reconcile(&children(&[&a, &b]));
        let summary = f.group.reconcile(&children(&[&b]));
        assert_eq!(names(&summary.exiting), vec!["a"]);
        assert_eq!(names(&f.group.elements()), vec!["b"]);
        assert_eq!(f.group.pending_exits(), 0);
    }

    #[test]
    fn test_synchronous_exit_completion() {
        let (a, b) = (Node::new("a"), Node::new("b"));
        let f = fixture(
            TransitionOptions::new()
                .exit(|_: &[Node], done: ExitDone<Node>, _: &PhaseContext| done.all())
                .initial(Initial::Skip),
        );

        f.group.reconcile(&children(&[&a, &b]));
        f.group.reconcile(&children(&[&b]));
        assert_eq!(names(&f.group.elements()), vec!["a", "b"]);

        f.host.flush();
        assert_eq!(names(&f.group.elements()), vec!["b"]);
    }

    #[test]
    fn test_empty_resolutions_keep_initial_state() {
        let a = Node::new("a");
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let f = fixture(
            TransitionOptions::new()
                .enter(move |_: &[Node], _: &PhaseContext| c.set(c.get() + 1))
                .initial(Initial::Enter),
        );

        let summary = f.group.reconcile(&[Child::text("loading"), Child::Empty]);
        assert!(!summary.initial);
        assert!(f.group.is_initial());

        let summary = f.group.reconcile(&children(&[&a]));
        assert!(summary.initial);
        f.host.flush();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_initial_modes() {
        struct Counting {
            enters: Rc<Cell<u32>>,
            initials: Rc<Cell<u32>>,
        }

        impl Enter<Node> for Counting {
            fn enter(&self, _: &[Node], _: &PhaseContext) {
                self.enters.set(self.enters.get() + 1);
            }

            fn initial(&self, _: &[Node], _: &PhaseContext) {
                self.initials.set(self.initials.get() + 1);
            }
        }

        let run = |initial: Initial<Node>| {
            let enters = Rc::new(Cell::new(0));
            let initials = Rc::new(Cell::new(0));
            let f = fixture(
                TransitionOptions::new()
                    .enter(Counting {
                        enters: enters.clone(),
                        initials: initials.clone(),
                    })
                    .initial(initial),
            );
            f.group.reconcile(&children(&[&Node::new("a")]));
            f.host.flush();
            (enters.get(), initials.get())
        };

        assert_eq!(run(Initial::Skip), (0, 0));
        assert_eq!(run(Initial::Enter), (1, 0));
        assert_eq!(run(Initial::Auto), (0, 1));

        let custom = Rc::new(Cell::new(0));
        let c = custom.clone();
        let strategy: Rc<dyn Enter<Node>> =
            Rc::new(move |_: &[Node], _: &PhaseContext| c.set(c.get() + 1));
        assert_eq!(run(Initial::Custom(strategy)), (0, 0));
        assert_eq!(custom.get(), 1);
    }

    fn recording_move(moves: &Rc<RefCell<Vec<(&'static str, f32)>>>) -> impl Move<Node> {
        let moves = moves.clone();
        move |els: &[Node], phases: &PhaseContext| {
            let moves = moves.clone();
            filter_moved(els, Anchor::Viewport, phases, move |moved: Vec<Moved<Node>>| {
                for Moved { element, delta } in moved {
                    moves.borrow_mut().push((element.0.name, delta.dy));
                }
            });
        }
    }

    #[test]
    fn test_swap_moves_only_displaced_elements() {
        let (a, b, c) = (Node::new("a"), Node::new("b"), Node::new("c"));
        let moves = Rc::default();
        let f = fixture(
            TransitionOptions::new()
                .move_(recording_move(&moves))
                .initial(Initial::Skip),
        );

        f.group.reconcile(&children(&[&a, &b, &c]));
        f.host.flush();
        assert!(moves.borrow().is_empty());

        f.group.reconcile(&children(&[&b, &a, &c]));
        f.host.flush();
        let mut recorded = moves.borrow().clone();
        recorded.sort_by(|l, r| l.0.cmp(r.0));
        assert_eq!(recorded, vec![("a", -10.0), ("b", 10.0)]);
    }

    #[test]
    fn test_exit_completion_moves_survivors() {
        let (a, b, c) = (Node::new("a"), Node::new("b"), Node::new("c"));
        let moves = Rc::default();
        let exits: Exits = Rc::default();
        let stored = exits.clone();
        let f = fixture(
            TransitionOptions::new()
                .move_(recording_move(&moves))
                .exit(move |_: &[Node], done: ExitDone<Node>, _: &PhaseContext| {
                    stored.borrow_mut().push(done)
                })
                .initial(Initial::Skip),
        );

        f.group.reconcile(&children(&[&a, &b, &c]));
        f.group.reconcile(&children(&[&b, &c]));
        f.host.flush();
        // `a` stays in place while exiting, nothing moved yet
        assert!(moves.borrow().is_empty());

        exits.borrow()[0].all();
        f.host.flush();
        assert_eq!(*moves.borrow(), vec![("b", 10.0), ("c", 10.0)]);
    }

    #[test]
    fn test_options_apply_from_next_pass() {
        let (a, b) = (Node::new("a"), Node::new("b"));
        let f = fixture(TransitionOptions::new().initial(Initial::Skip));
        f.group.reconcile(&children(&[&a, &b]));

        let exits: Exits = Rc::default();
        let stored = exits.clone();
        f.group.update_options(move |options| {
            options.exit = Some(Rc::new(
                move |_: &[Node], done: ExitDone<Node>, _: &PhaseContext| {
                    stored.borrow_mut().push(done)
                },
            ));
        });

        f.group.reconcile(&children(&[&b]));
        f.host.flush();
        assert_eq!(exits.borrow().len(), 1);
        assert_eq!(names(&f.group.elements()), vec!["a", "b"]);
    }

    #[test]
    fn test_dropped_group_ignores_completion() {
        let (a, b) = (Node::new("a"), Node::new("b"));
        let exits: Exits = Rc::default();
        let stored = exits.clone();
        let f = fixture(
            TransitionOptions::new()
                .exit(move |_: &[Node], done: ExitDone<Node>, _: &PhaseContext| {
                    stored.borrow_mut().push(done)
                })
                .initial(Initial::Skip),
        );
        f.group.reconcile(&children(&[&a, &b]));
        f.group.reconcile(&children(&[&b]));
        f.host.flush();

        let Fixture { host, group } = f;
        drop(group);
        exits.borrow()[0].all();
        assert!(host.is_idle());
    }
}
