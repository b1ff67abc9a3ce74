//! Test harness for headless scenarios
//!
//! Provides:
//! - [`MockNode`]: an element with settable geometry, inline styles, classes,
//!   end-event listeners and recorded keyframe animations
//! - [`MockAnimation`]: a running animation the test finishes by hand
//! - [`TestHarness`]: a transition group on a [`QueueHost`] with a simple
//!   vertical stack layout applied on every publish

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::Once;
use std::time::Duration;

use rustc_hash::FxHashMap;
use segue_animation::{
    Animate, AnimationHandle, AnimationOptions, ClassList, EndEvent, Keyframes, ListenerId,
};
use segue_core::{Element, QueueHost, Rect, RenderHost, StyleProp};
use segue_group::{Child, PassSummary, TransitionGroup, TransitionOptions};
use slotmap::SlotMap;

/// Height of one row in the stack layout
pub const ROW_HEIGHT: f32 = 20.0;

/// Width of every row in the stack layout
pub const ROW_WIDTH: f32 = 200.0;

static TRACING: Once = Once::new();

/// Install a `RUST_LOG`-filtered fmt subscriber once per process
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    TRACING.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

// ============================================================================
// Mock animation
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayState {
    Running,
    Finished,
    Cancelled,
}

struct AnimationState {
    keyframes: Keyframes,
    options: AnimationOptions,
    play_state: Cell<PlayState>,
    reversed: Cell<bool>,
    on_finish: RefCell<Vec<Box<dyn FnOnce()>>>,
}

/// A recorded keyframe animation
#[derive(Clone)]
pub struct MockAnimation(Rc<AnimationState>);

impl MockAnimation {
    fn new(keyframes: &Keyframes, options: &AnimationOptions) -> Self {
        MockAnimation(Rc::new(AnimationState {
            keyframes: keyframes.clone(),
            options: options.clone(),
            play_state: Cell::new(PlayState::Running),
            reversed: Cell::new(false),
            on_finish: RefCell::new(Vec::new()),
        }))
    }

    pub fn keyframes(&self) -> &Keyframes {
        &self.0.keyframes
    }

    pub fn options(&self) -> &AnimationOptions {
        &self.0.options
    }

    pub fn id(&self) -> Option<&str> {
        self.0.options.id.as_deref()
    }

    pub fn play_state(&self) -> PlayState {
        self.0.play_state.get()
    }

    pub fn is_running(&self) -> bool {
        self.play_state() == PlayState::Running
    }

    pub fn is_reversed(&self) -> bool {
        self.0.reversed.get()
    }

    /// Play to the end and run finish callbacks; no-op unless running
    pub fn finish(&self) {
        if !self.is_running() {
            return;
        }
        self.0.play_state.set(PlayState::Finished);
        let callbacks = std::mem::take(&mut *self.0.on_finish.borrow_mut());
        for callback in callbacks {
            callback();
        }
    }
}

impl AnimationHandle for MockAnimation {
    fn on_finish(&self, callback: Box<dyn FnOnce()>) {
        match self.play_state() {
            PlayState::Running => self.0.on_finish.borrow_mut().push(callback),
            PlayState::Finished => callback(),
            PlayState::Cancelled => {}
        }
    }

    fn reverse(&self) {
        self.0.reversed.set(!self.0.reversed.get());
    }

    fn cancel(&self) {
        if self.is_running() {
            self.0.play_state.set(PlayState::Cancelled);
            self.0.on_finish.borrow_mut().clear();
        }
    }
}

impl fmt::Debug for MockAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockAnimation")
            .field("id", &self.id())
            .field("play_state", &self.play_state())
            .field("reversed", &self.is_reversed())
            .finish()
    }
}

// ============================================================================
// Mock node
// ============================================================================

struct NodeState {
    name: String,
    rect: Cell<Rect>,
    offset: Cell<Option<Rect>>,
    parent: Cell<Option<Rect>>,
    connected: Cell<bool>,
    styles: RefCell<FxHashMap<StyleProp, String>>,
    classes: RefCell<Vec<String>>,
    listeners: RefCell<SlotMap<ListenerId, (EndEvent, Rc<dyn Fn()>)>>,
    animations: RefCell<Vec<MockAnimation>>,
}

/// A headless element compared by identity
#[derive(Clone)]
pub struct MockNode(Rc<NodeState>);

impl MockNode {
    pub fn new(name: impl Into<String>) -> Self {
        MockNode(Rc::new(NodeState {
            name: name.into(),
            rect: Cell::new(Rect::default()),
            offset: Cell::new(Some(Rect::default())),
            parent: Cell::new(None),
            connected: Cell::new(true),
            styles: RefCell::new(FxHashMap::default()),
            classes: RefCell::new(Vec::new()),
            listeners: RefCell::new(SlotMap::with_key()),
            animations: RefCell::new(Vec::new()),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Place the node; its offset box follows unless it has none
    pub fn place(&self, rect: Rect) {
        self.0.rect.set(rect);
        if self.0.offset.get().is_some() {
            self.0.offset.set(Some(rect));
        }
    }

    pub fn move_to(&self, x: f32, y: f32) {
        let rect = self.0.rect.get();
        self.place(Rect::new(x, y, rect.width, rect.height));
    }

    pub fn rect(&self) -> Rect {
        self.0.rect.get()
    }

    /// Nodes without an offset box behave like SVG content
    pub fn without_offset_box(self) -> Self {
        self.0.offset.set(None);
        self
    }

    pub fn set_parent_rect(&self, parent: Option<Rect>) {
        self.0.parent.set(parent);
    }

    pub fn set_connected(&self, connected: bool) {
        self.0.connected.set(connected);
    }

    pub fn style(&self, prop: StyleProp) -> Option<String> {
        self.0.styles.borrow().get(&prop).cloned()
    }

    /// Whether the node is pinned out of the layout flow
    pub fn is_detached(&self) -> bool {
        matches!(self.style(StyleProp::Position).as_deref(), Some("absolute" | "fixed"))
    }

    pub fn classes(&self) -> Vec<String> {
        self.0.classes.borrow().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.0.listeners.borrow().len()
    }

    /// Dispatch `event` to this node's listeners, returning how many ran
    pub fn fire(&self, event: EndEvent) -> usize {
        let handlers: Vec<Rc<dyn Fn()>> = self
            .0
            .listeners
            .borrow()
            .values()
            .filter(|(listening, _)| *listening == event)
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in &handlers {
            handler();
        }
        handlers.len()
    }

    pub fn animations(&self) -> Vec<MockAnimation> {
        self.0.animations.borrow().clone()
    }

    pub fn last_animation(&self) -> Option<MockAnimation> {
        self.0.animations.borrow().last().cloned()
    }

    /// Finish every running animation on the node
    pub fn finish_animations(&self) {
        for animation in self.animations() {
            animation.finish();
        }
    }
}

impl PartialEq for MockNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MockNode {}

impl Hash for MockNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for MockNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MockNode({})", self.0.name)
    }
}

impl Element for MockNode {
    fn is_connected(&self) -> bool {
        self.0.connected.get()
    }

    fn bounding_rect(&self) -> Rect {
        self.0.rect.get()
    }

    fn offset_box(&self) -> Option<Rect> {
        self.0.offset.get()
    }

    fn parent_rect(&self) -> Option<Rect> {
        self.0.parent.get()
    }

    fn set_style(&self, prop: StyleProp, value: &str) {
        self.0.styles.borrow_mut().insert(prop, value.to_string());
    }

    fn remove_style(&self, prop: StyleProp) {
        self.0.styles.borrow_mut().remove(&prop);
    }
}

impl Animate for MockNode {
    type Animation = MockAnimation;

    fn animate(&self, keyframes: &Keyframes, options: &AnimationOptions) -> MockAnimation {
        let animation = MockAnimation::new(keyframes, options);
        self.0.animations.borrow_mut().push(animation.clone());
        animation
    }

    fn running_animation(&self, id: &str) -> Option<MockAnimation> {
        self.0
            .animations
            .borrow()
            .iter()
            .rev()
            .find(|animation| animation.is_running() && animation.id() == Some(id))
            .cloned()
    }
}

impl ClassList for MockNode {
    fn add_classes(&self, classes: &[String]) {
        let mut current = self.0.classes.borrow_mut();
        for class in classes {
            if !current.contains(class) {
                current.push(class.clone());
            }
        }
    }

    fn remove_classes(&self, classes: &[String]) {
        self.0
            .classes
            .borrow_mut()
            .retain(|class| !classes.contains(class));
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.classes.borrow().iter().any(|c| c == class)
    }

    fn add_end_listener(&self, event: EndEvent, callback: Rc<dyn Fn()>) -> ListenerId {
        self.0.listeners.borrow_mut().insert((event, callback))
    }

    fn remove_end_listener(&self, id: ListenerId) {
        self.0.listeners.borrow_mut().remove(id);
    }
}

// ============================================================================
// Harness
// ============================================================================

/// Lay out `elements` top to bottom, skipping detached ones
///
/// Detached nodes are out of flow and keep their pinned box.
pub fn stack_layout(elements: &[MockNode]) {
    let mut y = 0.0;
    for element in elements {
        if element.is_detached() {
            continue;
        }
        element.place(Rect::new(0.0, y, ROW_WIDTH, ROW_HEIGHT));
        y += ROW_HEIGHT;
    }
}

/// A transition group wired to a queue host and the stack layout
pub struct TestHarness {
    pub host: Rc<QueueHost>,
    pub group: TransitionGroup<MockNode>,
}

impl TestHarness {
    pub fn new(options: TransitionOptions<MockNode>) -> Self {
        init_tracing();
        let host = Rc::new(QueueHost::new());
        let render_host: Rc<dyn RenderHost> = host.clone();
        let group = TransitionGroup::new(render_host, options);
        group.visible().subscribe(stack_layout);
        Self { host, group }
    }

    /// Create nodes named after `names`
    pub fn nodes<const N: usize>(names: [&str; N]) -> [MockNode; N] {
        names.map(MockNode::new)
    }

    pub fn reconcile(&self, nodes: &[&MockNode]) -> PassSummary<MockNode> {
        let children: Vec<Child<MockNode>> =
            nodes.iter().map(|node| Child::element((*node).clone())).collect();
        self.group.reconcile(&children)
    }

    /// Run update and commit phases until the host is idle
    pub fn flush(&self) {
        self.host.flush();
    }

    /// Run one animation frame
    pub fn frame(&self) -> usize {
        self.host.run_frame()
    }

    pub fn advance(&self, by: Duration) -> usize {
        self.host.advance(by)
    }

    pub fn visible_names(&self) -> Vec<String> {
        names(&self.group.elements())
    }
}

pub fn names(nodes: &[MockNode]) -> Vec<String> {
    nodes.iter().map(|node| node.name().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_listeners_fire_once_removed() {
        let node = MockNode::new("a");
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let id = node.add_end_listener(EndEvent::TransitionEnd, Rc::new(move || h.set(h.get() + 1)));

        assert_eq!(node.fire(EndEvent::AnimationEnd), 0);
        assert_eq!(node.fire(EndEvent::TransitionEnd), 1);
        node.remove_end_listener(id);
        assert_eq!(node.fire(EndEvent::TransitionEnd), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_stack_layout_skips_detached() {
        let [a, b, c] = TestHarness::nodes(["a", "b", "c"]);
        b.set_style(StyleProp::Position, "absolute");
        stack_layout(&[a.clone(), b.clone(), c.clone()]);
        assert_eq!(a.rect().y, 0.0);
        assert_eq!(c.rect().y, ROW_HEIGHT);
    }

    #[test]
    fn test_cancelled_animation_never_finishes() {
        let node = MockNode::new("a");
        let animation = node.animate(&Keyframes::fade(0.0, 1.0), &AnimationOptions::default());
        let finished = Rc::new(Cell::new(false));
        let f = finished.clone();
        animation.on_finish(Box::new(move || f.set(true)));

        animation.cancel();
        animation.finish();
        assert!(!finished.get());
        assert_eq!(animation.play_state(), PlayState::Cancelled);
    }
}
