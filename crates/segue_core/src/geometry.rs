//! Geometry sampling (FLIP-style)
//!
//! The sampler implements the measuring half of FLIP:
//! - **F**irst: record element positions before a layout-affecting mutation
//! - **L**ast: re-read positions once the mutation has been committed
//! - **I**nvert: delta = first - last, the offset that visually restores the old position
//!
//! Playing the inverted offset back to zero is left to move strategies.
//!
//! Exit strategies use [`detach`] to pin an element's box before it leaves
//! the layout flow, so siblings reflowing around it do not make it jump.

use smallvec::SmallVec;

use crate::element::{Element, StyleProp};
use crate::phase::PhaseContext;

// ============================================================================
// Primitives
// ============================================================================

/// A 2D point in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned box in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Position of this box's origin relative to `other`'s origin
    pub fn relative_to(&self, other: &Rect) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// Inverted offset of a moved element (first - last)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Delta {
    pub dx: f32,
    pub dy: f32,
}

impl Delta {
    pub fn between(first: Point, last: Point) -> Self {
        Self {
            dx: first.x - last.x,
            dy: first.y - last.y,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

/// Coordinate space positions are sampled in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Anchor {
    /// Viewport coordinates (bounding rect)
    #[default]
    Viewport,
    /// Relative to the parent's bounding rect
    ///
    /// Scrolling or moving the whole container then does not count as a move.
    Parent,
}

impl Anchor {
    fn position<E: Element>(self, el: &E) -> Point {
        let rect = el.bounding_rect();
        match self {
            Anchor::Viewport => rect.origin(),
            Anchor::Parent => match el.parent_rect() {
                Some(parent) => rect.relative_to(&parent),
                None => rect.origin(),
            },
        }
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// An element whose position changed between two samples
#[derive(Clone, Debug, PartialEq)]
pub struct Moved<E> {
    pub element: E,
    pub delta: Delta,
}

/// First-positions of a set of elements, taken before a mutation
#[derive(Clone, Debug)]
pub struct GeometrySnapshot<E> {
    anchor: Anchor,
    samples: Vec<(E, Point)>,
}

impl<E: Element> GeometrySnapshot<E> {
    /// Record the position of every connected element
    ///
    /// Disconnected elements have no meaningful box and are skipped.
    pub fn capture(elements: &[E], anchor: Anchor) -> Self {
        let samples = elements
            .iter()
            .filter(|el| el.is_connected())
            .map(|el| (el.clone(), anchor.position(el)))
            .collect();
        Self { anchor, samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Re-read positions and keep the elements that actually moved
    ///
    /// Elements disconnected since the capture and elements with a zero delta
    /// are dropped, so strategies never animate a no-op.
    pub fn moved(self) -> Vec<Moved<E>> {
        let anchor = self.anchor;
        self.samples
            .into_iter()
            .filter(|(el, _)| el.is_connected())
            .filter_map(|(element, first)| {
                let delta = Delta::between(first, anchor.position(&element));
                (!delta.is_zero()).then_some(Moved { element, delta })
            })
            .collect()
    }
}

/// Sample `elements` now and report the moved ones after the commit phase
///
/// `on_moved` is only called when at least one element moved.
pub fn filter_moved<E, F>(elements: &[E], anchor: Anchor, phases: &PhaseContext, on_moved: F)
where
    E: Element,
    F: FnOnce(Vec<Moved<E>>) + 'static,
{
    let snapshot = GeometrySnapshot::capture(elements, anchor);
    if snapshot.is_empty() {
        return;
    }

    phases.on_commit(move || {
        let moved = snapshot.moved();
        tracing::trace!("filter_moved: {} element(s) moved", moved.len());
        if !moved.is_empty() {
            on_moved(moved);
        }
    });
}

// ============================================================================
// Detach
// ============================================================================

/// How an exiting element's box is pinned
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetachMode {
    /// `position: absolute` at its offset-parent relative box
    #[default]
    Absolute,
    /// `position: fixed` at its viewport box
    Fixed,
}

impl DetachMode {
    fn position_value(self) -> &'static str {
        match self {
            DetachMode::Absolute => "absolute",
            DetachMode::Fixed => "fixed",
        }
    }
}

/// Pin each element's current box so it can leave the layout flow
///
/// All boxes are read before any style is written, so pinning one element
/// cannot shift the measurement of the next. Returns the number of elements
/// that were pinned.
pub fn detach<E: Element>(elements: &[E], mode: DetachMode) -> usize {
    let boxes: SmallVec<[(&E, Rect); 8]> = elements
        .iter()
        .filter_map(|el| {
            let rect = match mode {
                DetachMode::Absolute => el.offset_box()?,
                DetachMode::Fixed => {
                    if !el.is_connected() {
                        return None;
                    }
                    el.bounding_rect()
                }
            };
            Some((el, rect))
        })
        .collect();

    for (el, rect) in &boxes {
        el.set_style(StyleProp::Position, mode.position_value());
        el.set_style(StyleProp::Margin, "0px");
        el.set_style(StyleProp::Left, &px(rect.x));
        el.set_style(StyleProp::Top, &px(rect.y));
        el.set_style(StyleProp::Width, &px(rect.width));
        el.set_style(StyleProp::Height, &px(rect.height));
    }

    boxes.len()
}

/// Clear the properties written by [`detach`], returning elements to the flow
pub fn undetach<E: Element>(elements: &[E]) {
    for el in elements {
        for prop in StyleProp::DETACHED {
            el.remove_style(prop);
        }
    }
}

fn px(value: f32) -> String {
    format!("{}px", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::hash::{Hash, Hasher};
    use std::rc::Rc;

    struct BoxInner {
        rect: Cell<Rect>,
        parent: Cell<Option<Rect>>,
        offset: Cell<Option<Rect>>,
        connected: Cell<bool>,
        styles: RefCell<HashMap<StyleProp, String>>,
    }

    #[derive(Clone)]
    struct TestBox(Rc<BoxInner>);

    impl TestBox {
        fn at(x: f32, y: f32) -> Self {
            TestBox(Rc::new(BoxInner {
                rect: Cell::new(Rect::new(x, y, 10.0, 10.0)),
                parent: Cell::new(None),
                offset: Cell::new(Some(Rect::new(x, y, 10.0, 10.0))),
                connected: Cell::new(true),
                styles: RefCell::new(HashMap::new()),
            }))
        }

        fn move_to(&self, x: f32, y: f32) {
            self.0.rect.set(Rect::new(x, y, 10.0, 10.0));
        }

        fn style(&self, prop: StyleProp) -> Option<String> {
            self.0.styles.borrow().get(&prop).cloned()
        }
    }

    impl PartialEq for TestBox {
        fn eq(&self, other: &Self) -> bool {
            Rc::ptr_eq(&self.0, &other.0)
        }
    }

    impl Eq for TestBox {}

    impl std::fmt::Debug for TestBox {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "TestBox({:?})", self.0.rect.get())
        }
    }

    impl Hash for TestBox {
        fn hash<H: Hasher>(&self, state: &mut H) {
            Rc::as_ptr(&self.0).hash(state);
        }
    }

    impl Element for TestBox {
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

    #[test]
    fn test_moved_reports_inverted_delta() {
        let a = TestBox::at(0.0, 0.0);
        let b = TestBox::at(0.0, 20.0);

        let snapshot = GeometrySnapshot::capture(&[a.clone(), b.clone()], Anchor::Viewport);
        a.move_to(0.0, 20.0);
        b.move_to(0.0, 0.0);

        let moved = snapshot.moved();
        assert_eq!(moved.len(), 2);
        assert_eq!(moved[0].element, a);
        assert_eq!(moved[0].delta, Delta { dx: 0.0, dy: -20.0 });
        assert_eq!(moved[1].delta, Delta { dx: 0.0, dy: 20.0 });
    }

    #[test]
    fn test_unmoved_elements_are_dropped() {
        let a = TestBox::at(0.0, 0.0);
        let c = TestBox::at(50.0, 50.0);

        let snapshot = GeometrySnapshot::capture(&[a.clone(), c.clone()], Anchor::Viewport);
        a.move_to(5.0, 0.0);

        let moved = snapshot.moved();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].element, a);
    }

    #[test]
    fn test_disconnected_elements_are_excluded() {
        let a = TestBox::at(0.0, 0.0);
        let b = TestBox::at(0.0, 10.0);
        b.0.connected.set(false);

        let snapshot = GeometrySnapshot::capture(&[a.clone(), b.clone()], Anchor::Viewport);
        assert_eq!(snapshot.len(), 1);

        // Disconnected between the two samples
        a.0.connected.set(false);
        a.move_to(0.0, 100.0);
        assert!(snapshot.moved().is_empty());
    }

    #[test]
    fn test_parent_anchor_ignores_container_motion() {
        let a = TestBox::at(10.0, 10.0);
        a.0.parent.set(Some(Rect::new(0.0, 0.0, 100.0, 100.0)));

        let snapshot = GeometrySnapshot::capture(&[a.clone()], Anchor::Parent);
        // Whole container scrolled by 30px
        a.move_to(10.0, 40.0);
        a.0.parent.set(Some(Rect::new(0.0, 30.0, 100.0, 100.0)));

        assert!(snapshot.moved().is_empty());
    }

    #[test]
    fn test_detach_pins_offset_box() {
        let a = TestBox::at(12.0, 24.5);

        assert_eq!(detach(&[a.clone()], DetachMode::Absolute), 1);
        assert_eq!(a.style(StyleProp::Position).as_deref(), Some("absolute"));
        assert_eq!(a.style(StyleProp::Margin).as_deref(), Some("0px"));
        assert_eq!(a.style(StyleProp::Left).as_deref(), Some("12px"));
        assert_eq!(a.style(StyleProp::Top).as_deref(), Some("24.5px"));
        assert_eq!(a.style(StyleProp::Width).as_deref(), Some("10px"));

        undetach(&[a.clone()]);
        assert!(a.0.styles.borrow().is_empty());
    }

    #[test]
    fn test_detach_skips_elements_without_offset_box() {
        let svg = TestBox::at(0.0, 0.0);
        svg.0.offset.set(None);

        assert_eq!(detach(&[svg.clone()], DetachMode::Absolute), 0);
        assert!(svg.style(StyleProp::Position).is_none());

        // Fixed mode measures the viewport box instead
        assert_eq!(detach(&[svg.clone()], DetachMode::Fixed), 1);
        assert_eq!(svg.style(StyleProp::Position).as_deref(), Some("fixed"));
    }
}
