/// Pure operations on a board value.
///
/// Every operation is total: invalid input (unknown column, unknown item,
/// out-of-range index, same-position move) returns an unchanged copy of the
/// board. Callers compare the result with the input to detect a no-op.
use crate::types::{Board, BoardItem};

impl<T: BoardItem + Clone> Board<T> {
    /// Remove `item_id` from `column_id`, returning the new board and the
    /// removed item. Fails (unchanged board, `None`) if the column is absent
    /// or does not contain the item.
    pub fn remove_item(&self, column_id: &str, item_id: &str) -> (Self, Option<T>) {
        let Some(index) = self.index_of_item(column_id, item_id) else {
            return (self.clone(), None);
        };
        let mut next = self.clone();
        let removed = next
            .columns
            .get_mut(column_id)
            .map(|col| col.items.remove(index));
        (next, removed)
    }

    /// Insert `item` into `column_id` at `index`, clamped to `[0, len]`.
    pub fn insert_item(&self, column_id: &str, index: usize, item: T) -> Self {
        let mut next = self.clone();
        match next.columns.get_mut(column_id) {
            Some(col) => {
                let index = index.min(col.items.len());
                col.items.insert(index, item);
                next
            }
            None => {
                log::debug!(
                    target: "taskboard.collection",
                    "insert into unknown column {} ignored",
                    column_id
                );
                next
            }
        }
    }

    /// Move the column at `from` to `to`, shifting the columns in between.
    pub fn move_column(&self, from: usize, to: usize) -> Self {
        let len = self.columns.len();
        let mut next = self.clone();
        if from != to && from < len && to < len {
            next.columns.move_index(from, to);
        }
        next
    }

    /// Move the item at `from` to `to` inside one column.
    pub fn reorder_within_column(&self, column_id: &str, from: usize, to: usize) -> Self {
        let mut next = self.clone();
        if from == to {
            return next;
        }
        if let Some(col) = next.columns.get_mut(column_id) {
            let len = col.items.len();
            if from < len && to < len {
                let item = col.items.remove(from);
                col.items.insert(to, item);
            }
        }
        next
    }

    /// Move `item_id` out of `from` and into `to` at `index` (clamped).
    ///
    /// Both columns must exist and `from` must hold the item; otherwise the
    /// board is returned unchanged, so an item is never dropped on the floor.
    pub fn move_item(&self, item_id: &str, from: &str, to: &str, index: usize) -> Self {
        if !self.columns.contains_key(to) {
            return self.clone();
        }
        match self.remove_item(from, item_id) {
            (removed_from, Some(item)) => removed_from.insert_item(to, index, item),
            (unchanged, None) => unchanged,
        }
    }
}
