//! Multi-item selection with a click anchor

use app_fs::ItemId;
use std::collections::BTreeSet;

/// Modifier keys held during a click
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickModifiers {
    /// Ctrl on Windows/Linux, Cmd on macOS
    pub toggle: bool,
    pub range: bool,
}

impl ClickModifiers {
    pub const NONE: Self = Self { toggle: false, range: false };
    pub const TOGGLE: Self = Self { toggle: true, range: false };
    pub const RANGE: Self = Self { toggle: false, range: true };
}

/// Selected item ids plus the anchor for range selection
///
/// The anchor is the last id acted on by [`select_single`](Self::select_single)
/// or [`toggle`](Self::toggle). Range selection keeps it, so repeated
/// shift-clicks pivot on the same item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    selected: BTreeSet<ItemId>,
    anchor: Option<ItemId>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_single(&mut self, id: ItemId) {
        self.selected.clear();
        self.selected.insert(id);
        self.anchor = Some(id);
    }

    pub fn toggle(&mut self, id: ItemId) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
        self.anchor = Some(id);
    }

    /// Add the inclusive slice between `anchor` and `target` in `ordered`.
    /// Falls back to selecting `target` alone when the anchor is not listed.
    pub fn select_range(&mut self, anchor: ItemId, target: ItemId, ordered: &[ItemId]) {
        let Some(to) = ordered.iter().position(|id| *id == target) else {
            tracing::debug!("Range target {} is not displayed", target);
            return;
        };
        let Some(from) = ordered.iter().position(|id| *id == anchor) else {
            self.select_single(target);
            return;
        };

        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
        self.selected.extend(ordered[lo..=hi].iter().copied());
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
    }

    pub fn select_all(&mut self, ordered: &[ItemId]) {
        self.selected = ordered.iter().copied().collect();
    }

    /// Route a click to the matching primitive
    pub fn click(&mut self, id: ItemId, modifiers: ClickModifiers, ordered: &[ItemId]) {
        match (modifiers.range, self.anchor) {
            (true, Some(anchor)) => self.select_range(anchor, id, ordered),
            (true, None) => self.select_single(id),
            (false, _) if modifiers.toggle => self.toggle(id),
            (false, _) => self.select_single(id),
        }
    }

    /// Drop ids that are no longer displayed
    pub fn retain_visible(&mut self, ordered: &[ItemId]) {
        let visible: BTreeSet<ItemId> = ordered.iter().copied().collect();
        let before = self.selected.len();
        self.selected.retain(|id| visible.contains(id));
        if self.anchor.is_some_and(|a| !visible.contains(&a)) {
            self.anchor = None;
        }
        if self.selected.len() != before {
            tracing::debug!("Dropped {} hidden ids from selection", before - self.selected.len());
        }
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn anchor(&self) -> Option<ItemId> {
        self.anchor
    }

    /// Selected ids in ascending order
    pub fn ids(&self) -> Vec<ItemId> {
        self.selected.iter().copied().collect()
    }

    /// The only selected id, if exactly one is selected
    pub fn single(&self) -> Option<ItemId> {
        match self.selected.len() {
            1 => self.selected.iter().next().copied(),
            _ => None,
        }
    }
}
