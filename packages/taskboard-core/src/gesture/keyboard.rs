use crate::types::{Board, BoardItem};

/// Arrow-key direction for keyboard-driven reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Up,
    Down,
    Left,
    Right,
}

/// The id a keyboard step lands on, to be fed to `drag_over` / `drag_end`.
///
/// Items step to the neighbouring item in their column (`Up`/`Down`) or to
/// the adjacent column (`Left`/`Right`). Columns only step sideways.
pub fn keyboard_target<T: BoardItem>(
    board: &Board<T>,
    active_id: &str,
    direction: KeyDirection,
) -> Option<String> {
    if board.is_column(active_id) {
        let position = board.position_of_column(active_id)?;
        return match direction {
            KeyDirection::Left | KeyDirection::Right => adjacent_column(board, position, direction),
            KeyDirection::Up | KeyDirection::Down => None,
        };
    }

    let container = board.find_container(active_id)?;
    match direction {
        KeyDirection::Up | KeyDirection::Down => {
            let items = &board.column(container)?.items;
            let index = board.index_of_item(container, active_id)?;
            let target = match direction {
                KeyDirection::Up => index.checked_sub(1)?,
                _ => index + 1,
            };
            items.get(target).map(|item| item.item_value().to_string())
        }
        KeyDirection::Left | KeyDirection::Right => {
            let position = board.position_of_column(container)?;
            adjacent_column(board, position, direction)
        }
    }
}

fn adjacent_column<T>(board: &Board<T>, position: usize, direction: KeyDirection) -> Option<String> {
    let target = match direction {
        KeyDirection::Left => position.checked_sub(1)?,
        _ => position + 1,
    };
    board.column_ids().nth(target).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{DropOutcome, GestureTracker, MovePolicy};

    fn board() -> Board<String> {
        Board::empty()
            .with_column("todo", "Todo", vec!["T1".to_string(), "T2".to_string()])
            .and_then(|b| b.with_column("doing", "Doing", vec!["T3".to_string()]))
            .and_then(|b| b.with_column("done", "Done", vec![]))
            .unwrap()
    }

    #[test]
    fn test_item_vertical_steps() {
        let b = board();
        assert_eq!(keyboard_target(&b, "T1", KeyDirection::Down).as_deref(), Some("T2"));
        assert_eq!(keyboard_target(&b, "T2", KeyDirection::Up).as_deref(), Some("T1"));
        assert_eq!(keyboard_target(&b, "T1", KeyDirection::Up), None);
        assert_eq!(keyboard_target(&b, "T2", KeyDirection::Down), None);
    }

    #[test]
    fn test_item_horizontal_steps() {
        let b = board();
        assert_eq!(keyboard_target(&b, "T3", KeyDirection::Left).as_deref(), Some("todo"));
        assert_eq!(keyboard_target(&b, "T3", KeyDirection::Right).as_deref(), Some("done"));
        assert_eq!(keyboard_target(&b, "T1", KeyDirection::Left), None);
    }

    #[test]
    fn test_column_steps() {
        let b = board();
        assert_eq!(keyboard_target(&b, "doing", KeyDirection::Right).as_deref(), Some("done"));
        assert_eq!(keyboard_target(&b, "done", KeyDirection::Right), None);
        assert_eq!(keyboard_target(&b, "doing", KeyDirection::Up), None);
        assert_eq!(keyboard_target(&b, "missing", KeyDirection::Up), None);
    }

    #[test]
    fn test_keyboard_drives_reorder() {
        let b = board();
        let mut tracker = GestureTracker::new(MovePolicy::LocalOnly);
        tracker.drag_start(&b, "T1");
        let target = keyboard_target(&b, "T1", KeyDirection::Down).unwrap();
        match tracker.drag_end(&b, Some(&target)) {
            DropOutcome::Rearranged(next) => {
                assert_eq!(next.column("todo").unwrap().items, vec!["T2", "T1"])
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}
