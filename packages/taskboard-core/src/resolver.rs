/// Container resolution: which column currently owns an id.
///
/// Column ids resolve to themselves. Item ids are found by a linear scan in
/// column display order, then item order. Boards are small and the scan gives
/// a reproducible answer when an item id is (incorrectly) duplicated: the
/// first match wins and a warning is logged.
use crate::types::{Board, BoardItem};

impl<T> Board<T> {
    pub fn is_column(&self, id: &str) -> bool {
        self.columns.contains_key(id)
    }
}

impl<T: BoardItem> Board<T> {
    /// Column that contains `id`, or `None` when nothing matches.
    pub fn find_container(&self, id: &str) -> Option<&str> {
        if let Some((column_id, _)) = self.columns.get_key_value(id) {
            return Some(column_id.as_str());
        }

        let mut found: Option<&str> = None;
        for (column_id, column) in &self.columns {
            for item in &column.items {
                if item.item_value() != id {
                    continue;
                }
                match found {
                    None => found = Some(column_id.as_str()),
                    Some(first) => {
                        log::warn!(
                            target: "taskboard.resolver",
                            "Item id {} is present more than once (first in {}, again in {}); using {}",
                            id,
                            first,
                            column_id,
                            first
                        );
                        return found;
                    }
                }
            }
        }
        found
    }
}
