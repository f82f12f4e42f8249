// Ordering helpers shared by tabs and quick links.
// Pure functions over slices, no knowledge of persistence.

use crate::state::Tab;

/// Moves the element at `from` to `to` the way two array splices compose:
/// remove at `from` first (later indices shift down by one), then insert at
/// `to`. A `to` past the end appends.
///
/// Returns true if the order changed.
pub fn splice_move<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() {
        return false;
    }

    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);

    from != to
}

/// Canonical indices of `tabs` in display order: default tabs first, then
/// pinned tabs, then everything else. Ties keep canonical order.
pub fn display_indices(tabs: &[Tab]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..tabs.len()).collect();
    // sort_by_key is stable, so canonical order breaks ties.
    indices.sort_by_key(|&i| display_rank(&tabs[i]));
    indices
}

fn display_rank(tab: &Tab) -> u8 {
    if tab.is_default {
        0
    } else if tab.pinned {
        1
    } else {
        2
    }
}
