//! Drag-and-drop reorder computation.

use crate::model::item::Item;

/// Moves the item at `from` to position `to` and renumbers `1..N`.
///
/// `to` is clamped to the last index. An out-of-range `from` leaves the
/// sequence as is (still renumbered).
pub fn move_item(items: &[Item], from: usize, to: usize) -> Vec<Item> {
    let mut moved = items.to_vec();
    if from < moved.len() {
        let item = moved.remove(from);
        let to = to.min(moved.len());
        moved.insert(to, item);
    }
    renumber(moved)
}

/// Assigns dense orders `1..N` following sequence position.
pub fn renumber(items: Vec<Item>) -> Vec<Item> {
    items
        .into_iter()
        .zip(1u32..)
        .map(|(mut item, order)| {
            item.order = order;
            item
        })
        .collect()
}
