//! Checkbox selection state for list views.
//!
//! A `SelectionSet` is the in-memory set of record ids an admin has
//! checked for a bulk action. It preserves insertion order (label sheets
//! are partitioned in the order records were selected), is owned by
//! exactly one view, and is never persisted.

/// Insertion-ordered set of record identifiers.
///
/// Backed by a Vec; membership scans are fine at page-sized cardinalities.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    ids: Vec<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    /// Toggle one id; returns true if it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(pos) = self.ids.iter().position(|existing| existing == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    /// Select-all semantics from the list header checkbox: if every given
    /// id is already selected, clear; otherwise select exactly the given
    /// ids in their list order.
    pub fn toggle_all<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        let all_selected = {
            let mut any = false;
            let mut all = true;
            for id in ids.clone() {
                any = true;
                if !self.contains(id) {
                    all = false;
                    break;
                }
            }
            any && all
        };

        if all_selected {
            self.clear();
        } else {
            self.ids = ids.into_iter().map(|id| id.to_string()).collect();
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in insertion order
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_preserves_insertion_order() {
        let mut sel = SelectionSet::new();
        assert!(sel.toggle("c"));
        assert!(sel.toggle("a"));
        assert!(sel.toggle("b"));
        assert_eq!(sel.ids(), &["c", "a", "b"]);

        // Removing and re-adding moves the id to the end
        assert!(!sel.toggle("a"));
        assert!(sel.toggle("a"));
        assert_eq!(sel.ids(), &["c", "b", "a"]);
    }

    #[test]
    fn test_toggle_all_selects_then_clears() {
        let mut sel = SelectionSet::new();
        let page = ["x", "y", "z"];

        sel.toggle_all(page);
        assert_eq!(sel.len(), 3);
        assert!(sel.contains("y"));

        sel.toggle_all(page);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_toggle_all_with_partial_selection_selects_page() {
        let mut sel = SelectionSet::new();
        sel.toggle("x");
        sel.toggle_all(["x", "y"]);
        assert_eq!(sel.ids(), &["x", "y"]);
    }

    #[test]
    fn test_toggle_all_empty_page_is_noop() {
        let mut sel = SelectionSet::new();
        sel.toggle("x");
        sel.toggle_all(std::iter::empty::<&str>().collect::<Vec<_>>());
        assert_eq!(sel.len(), 1);
    }
}
