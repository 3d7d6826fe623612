//! Square decoration classes, recomputed from state on every render.

use draughtsground_core::{Key, State};
use std::collections::BTreeMap;

fn add(classes: &mut BTreeMap<Key, String>, key: Key, class: &str) {
    let entry = classes.entry(key).or_default();
    if !entry.is_empty() {
        entry.push(' ');
    }
    entry.push_str(class);
}

fn dest_class(state: &State, key: Key, class: &str) -> String {
    if state.pieces.contains_key(&key) {
        format!("{class} oc")
    } else {
        class.to_string()
    }
}

/// Classes of every decorated square. Undecorated squares are absent.
pub fn square_classes(state: &State) -> BTreeMap<Key, String> {
    let mut classes = BTreeMap::new();

    if state.highlight.last_move {
        for key in state.last_move.iter().flatten() {
            add(&mut classes, *key, "last-move");
        }
    }

    if let Some(selected) = state.selected {
        add(&mut classes, selected, "selected");
        if state.movable.show_dests {
            let dests = state.movable.dests.as_ref().and_then(|d| d.get(&selected));
            for dest in dests.into_iter().flatten() {
                let class = dest_class(state, *dest, "move-dest");
                add(&mut classes, *dest, &class);
            }
        }
        if state.premovable.show_dests {
            for dest in state.premovable.dests.iter().flatten() {
                let class = dest_class(state, *dest, "premove-dest");
                add(&mut classes, *dest, &class);
            }
        }
    }

    if let Some((orig, dest)) = state.premovable.current {
        add(&mut classes, orig, "current-premove");
        add(&mut classes, dest, "current-premove");
    } else if let Some(drop) = state.predroppable.current {
        add(&mut classes, drop.key, "current-premove");
    }

    if state.highlight.ghosts {
        for (key, piece) in &state.pieces {
            if piece.role.is_ghost() {
                add(&mut classes, *key, "ghost");
            }
        }
    }

    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use draughtsground_core::board::{set_premove, set_selected};
    use draughtsground_core::{Color, MovableColor, fen};

    fn key(n: u8) -> Key {
        Key::new(n).unwrap()
    }

    fn state_from(position: &str) -> State {
        let mut state = State::new();
        state.pieces = fen::read(position, state.board_size);
        state
    }

    #[test]
    fn test_selection_and_dests() {
        let mut state = state_from("W:W32,27:B1");
        state.last_move = Some(vec![key(37), key(32)]);
        state.movable.dests = Some([(key(32), vec![key(27), key(28)])].into_iter().collect());
        set_selected(&mut state, key(32));
        let classes = square_classes(&state);
        assert_eq!(classes[&key(37)], "last-move");
        assert_eq!(classes[&key(32)], "last-move selected");
        assert_eq!(classes[&key(27)], "move-dest oc");
        assert_eq!(classes[&key(28)], "move-dest");
        assert!(!classes.contains_key(&key(1)));
    }

    #[test]
    fn test_premove_markers() {
        let mut state = state_from("B:W32:B1");
        state.turn_color = Color::Black;
        state.movable.color = Some(MovableColor::White);
        set_selected(&mut state, key(32));
        let classes = square_classes(&state);
        assert_eq!(classes[&key(28)], "premove-dest");

        set_premove(&mut state, key(32), key(28), false);
        let classes = square_classes(&state);
        assert!(classes[&key(28)].ends_with("current-premove"));
    }

    #[test]
    fn test_ghost_squares() {
        let mut state = state_from("W:W28:BG32");
        assert_eq!(square_classes(&state)[&key(32)], "ghost");
        state.highlight.ghosts = false;
        assert!(square_classes(&state).is_empty());
    }
}
