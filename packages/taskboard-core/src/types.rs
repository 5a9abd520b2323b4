use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column identifier. Unique within a board and stable for its lifetime.
pub type ColumnId = String;

/// Item identifier, unique across the whole board (not just one column).
pub type ItemId = String;

/// Identity extraction for values placed on a board.
///
/// Implementations must be pure and stable: the same item yields the same
/// id on every call. Container resolution and every move operation rely on it.
pub trait BoardItem {
    fn item_value(&self) -> &str;
}

impl BoardItem for String {
    fn item_value(&self) -> &str {
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column<T> {
    pub title: String,
    pub items: Vec<T>,
}

impl<T> Column<T> {
    pub fn new(title: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            title: title.into(),
            items,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("Duplicate column id: {0}")]
    DuplicateColumn(ColumnId),
}

/// Ordered mapping of column id to column. Insertion order is display order.
///
/// A board is a value: every engine operation returns a new board and never
/// mutates one that a caller still holds.
#[derive(Debug, Clone)]
pub struct Board<T> {
    pub(crate) columns: IndexMap<ColumnId, Column<T>>,
}

impl<T> Board<T> {
    pub fn empty() -> Self {
        Self {
            columns: IndexMap::new(),
        }
    }

    /// Build a board from `(id, column)` pairs, rejecting repeated column ids.
    pub fn new<I>(columns: I) -> Result<Self, BoardError>
    where
        I: IntoIterator<Item = (ColumnId, Column<T>)>,
    {
        let mut board = Self::empty();
        for (id, column) in columns {
            if board.columns.contains_key(&id) {
                return Err(BoardError::DuplicateColumn(id));
            }
            board.columns.insert(id, column);
        }
        Ok(board)
    }

    /// Append a column at the end of the display order.
    pub fn with_column(
        mut self,
        id: impl Into<ColumnId>,
        title: impl Into<String>,
        items: Vec<T>,
    ) -> Result<Self, BoardError> {
        let id = id.into();
        if self.columns.contains_key(&id) {
            return Err(BoardError::DuplicateColumn(id));
        }
        self.columns.insert(id, Column::new(title, items));
        Ok(self)
    }

    pub fn column(&self, id: &str) -> Option<&Column<T>> {
        self.columns.get(id)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column<T>)> {
        self.columns.iter().map(|(id, col)| (id.as_str(), col))
    }

    pub fn column_ids(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn position_of_column(&self, id: &str) -> Option<usize> {
        self.columns.get_index_of(id)
    }

    /// Total number of items across all columns.
    pub fn item_count(&self) -> usize {
        self.columns.values().map(|col| col.items.len()).sum()
    }

    pub fn into_columns(self) -> Vec<(ColumnId, Column<T>)> {
        self.columns.into_iter().collect()
    }
}

impl<T: BoardItem> Board<T> {
    /// Position of `item_id` inside the given column.
    pub fn index_of_item(&self, column_id: &str, item_id: &str) -> Option<usize> {
        self.columns
            .get(column_id)?
            .items
            .iter()
            .position(|item| item.item_value() == item_id)
    }

    /// First item with the given id, in column display order.
    pub fn item(&self, item_id: &str) -> Option<&T> {
        self.columns
            .values()
            .flat_map(|col| col.items.iter())
            .find(|item| item.item_value() == item_id)
    }

    /// Item ids that appear more than once anywhere on the board, in the
    /// order their first occurrence is displayed.
    pub fn duplicate_item_ids(&self) -> Vec<ItemId> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order = Vec::new();
        for item in self.columns.values().flat_map(|col| col.items.iter()) {
            let count = counts.entry(item.item_value()).or_insert(0);
            if *count == 0 {
                order.push(item.item_value());
            }
            *count += 1;
        }
        order
            .into_iter()
            .filter(|id| counts.get(id).copied().unwrap_or(0) > 1)
            .map(str::to_string)
            .collect()
    }
}

impl<T> Default for Board<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Structural equality: column order matters, as does item order.
impl<T: PartialEq> PartialEq for Board<T> {
    fn eq(&self, other: &Self) -> bool {
        self.columns.len() == other.columns.len() && self.columns.iter().eq(other.columns.iter())
    }
}
