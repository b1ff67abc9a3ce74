//! Element capabilities
//!
//! Segue never owns visual nodes. Hosts hand it cheap handles that compare by
//! node identity and expose just enough measurement and inline-style access
//! for FLIP sampling and exit detaching.

use std::fmt;
use std::hash::Hash;

use crate::geometry::Rect;

/// Inline style properties written by the geometry helpers and presets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleProp {
    Position,
    Margin,
    Left,
    Top,
    Width,
    Height,
    Transform,
}

impl StyleProp {
    /// Properties pinned by [`detach`](crate::geometry::detach)
    pub const DETACHED: [StyleProp; 6] = [
        StyleProp::Position,
        StyleProp::Margin,
        StyleProp::Left,
        StyleProp::Top,
        StyleProp::Width,
        StyleProp::Height,
    ];

    /// CSS property name
    pub fn css_name(self) -> &'static str {
        match self {
            StyleProp::Position => "position",
            StyleProp::Margin => "margin",
            StyleProp::Left => "left",
            StyleProp::Top => "top",
            StyleProp::Width => "width",
            StyleProp::Height => "height",
            StyleProp::Transform => "transform",
        }
    }
}

impl fmt::Display for StyleProp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}

/// A handle to a rendered visual node
///
/// Equality and hashing must follow node identity (reference equality), not
/// structural equality: two handles are equal exactly when they point at the
/// same node. The engine uses these handles as set members across passes.
///
/// Measurement methods are read at well-defined phases by the geometry
/// sampler; hosts should return the current layout, not a cached one.
pub trait Element: Clone + Eq + Hash + 'static {
    /// Whether the node is currently attached to the document
    fn is_connected(&self) -> bool;

    /// Border box in viewport coordinates
    fn bounding_rect(&self) -> Rect;

    /// Border box relative to the offset parent
    ///
    /// Returns `None` for nodes without an offset box (e.g. SVG content),
    /// which are then skipped by [`detach`](crate::geometry::detach).
    fn offset_box(&self) -> Option<Rect> {
        None
    }

    /// Viewport box of the parent node, if any
    fn parent_rect(&self) -> Option<Rect> {
        None
    }

    /// Set an inline style property
    fn set_style(&self, prop: StyleProp, value: &str);

    /// Clear an inline style property
    fn remove_style(&self, prop: StyleProp);
}
