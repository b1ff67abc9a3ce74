//! Resolved children
//!
//! Hosts hand the group whatever their render pass produced for the group's
//! slot: elements, text, nested fragments or nothing. Only elements take part
//! in transitions.

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use segue_core::Element;

/// Insertion-ordered set with the Fx hasher
pub type FxIndexSet<T> = IndexSet<T, FxBuildHasher>;

/// One resolved child of a transition group
#[derive(Clone, Debug, PartialEq)]
pub enum Child<E> {
    Element(E),
    /// Text content, not animatable
    Text(String),
    Fragment(Vec<Child<E>>),
    Empty,
}

impl<E> Child<E> {
    pub fn element(element: E) -> Self {
        Child::Element(element)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Child::Text(text.into())
    }

    pub fn fragment(children: impl IntoIterator<Item = Child<E>>) -> Self {
        Child::Fragment(children.into_iter().collect())
    }
}

impl<E> Default for Child<E> {
    fn default() -> Self {
        Child::Empty
    }
}

impl<E> FromIterator<Child<E>> for Child<E> {
    fn from_iter<I: IntoIterator<Item = Child<E>>>(iter: I) -> Self {
        Child::fragment(iter)
    }
}

/// Flattened elements of one resolution
#[derive(Clone, Debug)]
pub struct Resolved<E> {
    /// Elements in display order, each at its first occurrence
    pub elements: FxIndexSet<E>,
    /// Number of repeated references that were dropped
    pub duplicates: usize,
}

/// Flatten `children` depth-first, keeping elements only
pub fn resolve_elements<E: Element>(children: &[Child<E>]) -> Resolved<E> {
    let mut resolved = Resolved {
        elements: FxIndexSet::default(),
        duplicates: 0,
    };
    collect(children, &mut resolved);
    resolved
}

fn collect<E: Element>(children: &[Child<E>], resolved: &mut Resolved<E>) {
    for child in children {
        match child {
            Child::Element(element) => {
                if !resolved.elements.insert(element.clone()) {
                    resolved.duplicates += 1;
                }
            }
            Child::Fragment(nested) => collect(nested, resolved),
            Child::Text(_) | Child::Empty => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segue_core::{Rect, StyleProp};

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    struct Id(u32);

    impl Element for Id {
        fn is_connected(&self) -> bool {
            true
        }

        fn bounding_rect(&self) -> Rect {
            Rect::default()
        }

        fn set_style(&self, _prop: StyleProp, _value: &str) {}

        fn remove_style(&self, _prop: StyleProp) {}
    }

    fn ids(resolved: &Resolved<Id>) -> Vec<u32> {
        resolved.elements.iter().map(|id| id.0).collect()
    }

    #[test]
    fn test_flattens_in_display_order() {
        let children = vec![
            Child::element(Id(1)),
            Child::text("label"),
            Child::fragment([Child::element(Id(2)), Child::Empty, Child::element(Id(3))]),
            Child::fragment([Child::fragment([Child::element(Id(4))])]),
        ];

        let resolved = resolve_elements(&children);
        assert_eq!(ids(&resolved), vec![1, 2, 3, 4]);
        assert_eq!(resolved.duplicates, 0);
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let children: Vec<Child<Id>> = vec![
            Child::element(Id(1)),
            Child::element(Id(2)),
            Child::fragment([Child::element(Id(1))]),
        ];

        let resolved = resolve_elements(&children);
        assert_eq!(ids(&resolved), vec![1, 2]);
        assert_eq!(resolved.duplicates, 1);
    }

    #[test]
    fn test_nothing_to_resolve() {
        let children: Vec<Child<Id>> = vec![Child::text("only text"), Child::default()];
        assert!(resolve_elements(&children).elements.is_empty());
    }
}
