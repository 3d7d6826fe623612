//! Board configuration, applied at init and on every reconfiguration.
//!
//! Every field is optional: absent fields leave the state untouched. Fields
//! that can be cleared (`selected`, `lastMove`, `captLen`, `movable.color`,
//! `movable.dests`) distinguish an absent field from an explicit `null`.
//! Square identifiers arrive as strings; invalid ones are dropped with a
//! warning instead of failing the whole configuration.

use crate::board::{set_selected, unselect};
use crate::coords::CoordSystem;
use crate::fen;
use crate::state::{Dests, MovableColor, State};
use crate::types::{BoardSize, Color, Key};
use crate::variant::Variant;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Animations shorter than this are not worth playing.
pub const MIN_ANIMATION_DURATION: f64 = 100.0;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Absent → `None`, `null` → `Some(None)`, value → `Some(Some(value))`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoordinatesConfig {
    pub show: Option<bool>,
    pub system: Option<CoordSystem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HighlightConfig {
    pub last_move: Option<bool>,
    pub ghosts: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationConfig {
    pub enabled: Option<bool>,
    /// Milliseconds.
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovableConfig {
    pub free: Option<bool>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub color: Option<Option<MovableColor>>,
    /// Origin square → destination squares. Replaces, never merges.
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub dests: Option<Option<BTreeMap<String, Vec<String>>>>,
    pub show_dests: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PremovableConfig {
    pub enabled: Option<bool>,
    pub show_dests: Option<bool>,
    pub variant: Option<Variant>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PredroppableConfig {
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraggableConfig {
    pub enabled: Option<bool>,
    pub distance: Option<f64>,
    pub auto_distance: Option<bool>,
    pub magnified: Option<bool>,
    pub center_piece: Option<bool>,
    pub prevent_default: Option<bool>,
    pub show_ghost: Option<bool>,
    pub delete_on_drop_off: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectableConfig {
    pub enabled: Option<bool>,
}

/// Partial board configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Position string, or `"start"`.
    pub fen: Option<String>,
    pub board_size: Option<BoardSize>,
    pub variant: Option<Variant>,
    pub orientation: Option<Color>,
    pub turn_color: Option<Color>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub capt_len: Option<Option<u8>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub selected: Option<Option<String>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub last_move: Option<Option<Vec<String>>>,
    pub view_only: Option<bool>,
    pub fixed: Option<bool>,
    pub coordinates: Option<CoordinatesConfig>,
    pub highlight: Option<HighlightConfig>,
    pub animation: Option<AnimationConfig>,
    pub movable: Option<MovableConfig>,
    pub premovable: Option<PremovableConfig>,
    pub predroppable: Option<PredroppableConfig>,
    pub draggable: Option<DraggableConfig>,
    pub selectable: Option<SelectableConfig>,
}

impl Config {
    /// Parse a JSON configuration object.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn valid_board_size(bs: BoardSize) -> bool {
    bs.columns >= 2
        && bs.columns % 2 == 0
        && bs.rows >= 1
        && u16::from(bs.columns / 2) * u16::from(bs.rows) <= u16::from(u8::MAX)
}

fn parse_key(name: &str, bs: BoardSize) -> Option<Key> {
    let key = name.parse::<Key>().ok().filter(|k| bs.contains(*k));
    if key.is_none() {
        log::warn!("Dropping invalid square {name:?} for a {}x{} board", bs.columns, bs.rows);
    }
    key
}

fn parse_dests(raw: &BTreeMap<String, Vec<String>>, bs: BoardSize) -> Dests {
    raw.iter()
        .filter_map(|(orig, dests)| {
            let orig = parse_key(orig, bs)?;
            Some((orig, dests.iter().filter_map(|d| parse_key(d, bs)).collect()))
        })
        .collect()
}

macro_rules! merge {
    ($target:expr, $source:expr, [$($field:ident),* $(,)?]) => {
        $(
            if let Some(value) = $source.$field {
                $target.$field = value;
            }
        )*
    };
}

/// Apply a configuration to the state.
pub fn configure(state: &mut State, config: &Config) {
    if let Some(variant) = config.variant {
        state.variant = variant;
        if config.board_size.is_none() {
            state.board_size = variant.board_size();
        }
    }
    if let Some(bs) = config.board_size {
        if valid_board_size(bs) {
            state.board_size = bs;
        } else {
            log::warn!("Ignoring unusable board size {}x{}", bs.columns, bs.rows);
        }
    }
    let bs = state.board_size;

    if let Some(position) = config.fen.as_deref() {
        state.pieces = fen::read(position, bs);
        if let Some(turn) = fen::read_turn(position) {
            state.turn_color = turn;
        }
    }
    state.pieces.retain(|k, _| bs.contains(*k));

    if let Some(orientation) = config.orientation {
        state.orientation = orientation;
    }
    if let Some(turn) = config.turn_color {
        state.turn_color = turn;
    }
    if let Some(capt_len) = config.capt_len {
        state.movable.capt_len = capt_len;
    }
    if let Some(view_only) = config.view_only {
        state.view_only = view_only;
    }
    if let Some(fixed) = config.fixed {
        state.fixed = fixed;
    }
    if let Some(last_move) = &config.last_move {
        state.last_move = last_move
            .as_ref()
            .map(|keys| keys.iter().filter_map(|k| parse_key(k, bs)).collect::<Vec<_>>())
            .filter(|keys| !keys.is_empty());
    }

    if let Some(c) = &config.coordinates {
        merge!(state.coordinates, c, [show, system]);
    }
    if let Some(h) = &config.highlight {
        merge!(state.highlight, h, [last_move, ghosts]);
    }
    if let Some(a) = &config.animation {
        merge!(state.animation, a, [enabled, duration]);
    }
    if let Some(m) = &config.movable {
        merge!(state.movable, m, [free, show_dests]);
        if let Some(color) = m.color {
            state.movable.color = color;
        }
        if let Some(dests) = &m.dests {
            state.movable.dests = dests.as_ref().map(|d| parse_dests(d, bs));
        }
    }
    if let Some(p) = &config.premovable {
        merge!(state.premovable, p, [enabled, show_dests]);
        if p.variant.is_some() {
            state.premovable.variant = p.variant;
        }
    }
    if let Some(p) = &config.predroppable {
        merge!(state.predroppable, p, [enabled]);
    }
    if let Some(d) = &config.draggable {
        merge!(
            state.draggable,
            d,
            [
                enabled,
                distance,
                auto_distance,
                magnified,
                center_piece,
                prevent_default,
                show_ghost,
                delete_on_drop_off,
            ]
        );
    }
    if let Some(s) = &config.selectable {
        merge!(state.selectable, s, [enabled]);
    }

    if let Some(selected) = &config.selected {
        match selected.as_deref().and_then(|k| parse_key(k, bs)) {
            Some(key) => set_selected(state, key),
            None => unselect(state),
        }
    }

    if state.animation.duration < MIN_ANIMATION_DURATION {
        state.animation.enabled = false;
    }
    if state.fixed {
        state.animation.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn key(n: u8) -> Key {
        Key::new(n).unwrap()
    }

    #[test]
    fn test_from_json_camel_case() {
        let config = Config::from_json(
            r#"{
                "fen": "B:W31,32:BK5",
                "orientation": "black",
                "captLen": 2,
                "lastMove": ["31", "26"],
                "movable": { "free": false, "color": "white", "dests": { "32": ["27", "28"] } },
                "draggable": { "deleteOnDropOff": true },
                "coordinates": { "system": "algebraic" }
            }"#,
        )
        .unwrap();
        let mut state = State::new();
        configure(&mut state, &config);
        assert_eq!(state.turn_color, Color::Black);
        assert_eq!(state.orientation, Color::Black);
        assert_eq!(state.pieces[&key(5)].role, Role::King);
        assert_eq!(state.movable.capt_len, Some(2));
        assert_eq!(state.last_move, Some(vec![key(31), key(26)]));
        assert!(!state.movable.free);
        assert_eq!(state.movable.color, Some(MovableColor::White));
        assert_eq!(state.movable.dests.as_ref().unwrap()[&key(32)], vec![key(27), key(28)]);
        assert!(state.draggable.delete_on_drop_off);
        assert_eq!(state.coordinates.system, CoordSystem::Algebraic);
    }

    #[test]
    fn test_null_clears_and_absent_keeps() {
        let mut state = State::new();
        configure(&mut state, &Config::from_json(r#"{"captLen": 3, "selected": "32"}"#).unwrap());
        assert_eq!(state.movable.capt_len, Some(3));
        assert_eq!(state.selected, Some(key(32)));

        configure(&mut state, &Config::from_json(r#"{"orientation": "white"}"#).unwrap());
        assert_eq!(state.movable.capt_len, Some(3));

        configure(
            &mut state,
            &Config::from_json(r#"{"captLen": null, "selected": null, "movable": {"color": null}}"#).unwrap(),
        );
        assert_eq!(state.movable.capt_len, None);
        assert_eq!(state.selected, None);
        assert_eq!(state.movable.color, None);
    }

    #[test]
    fn test_invalid_keys_are_dropped() {
        let config = Config::from_json(
            r#"{"lastMove": ["x", "60", "12"], "movable": {"dests": {"zz": ["1"], "12": ["7", "99"]}}}"#,
        )
        .unwrap();
        let mut state = State::new();
        configure(&mut state, &config);
        assert_eq!(state.last_move, Some(vec![key(12)]));
        let dests = state.movable.dests.unwrap();
        assert_eq!(dests.len(), 1);
        assert_eq!(dests[&key(12)], vec![key(7)]);
    }

    #[test]
    fn test_short_duration_disables_animation() {
        let mut state = State::new();
        configure(&mut state, &Config::from_json(r#"{"animation": {"duration": 50}}"#).unwrap());
        assert!(!state.animation.enabled);
    }

    #[test]
    fn test_variant_sets_board_size() {
        let mut state = State::new();
        let config = Config {
            variant: Some(Variant::Russian),
            fen: Some(fen::START.to_string()),
            ..Default::default()
        };
        configure(&mut state, &config);
        assert_eq!(state.board_size, BoardSize::SMALL);
        assert_eq!(state.pieces.len(), 24);
    }

    #[test]
    fn test_unusable_board_size_is_ignored() {
        let mut state = State::new();
        let config = Config {
            board_size: Some(BoardSize::new(7, 10)),
            ..Default::default()
        };
        configure(&mut state, &config);
        assert_eq!(state.board_size, BoardSize::INTERNATIONAL);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(Config::from_json("{"), Err(ConfigError::Json(_))));
    }
}
