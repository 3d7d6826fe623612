//! Colours for backends that paint elements themselves.

use draughtsground_core::Color as Side;
use peniko::Color;

/// Board colour scheme.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub light_square: Color,
    pub dark_square: Color,
    pub last_move: Color,
    pub selected: Color,
    pub move_dest: Color,
    pub premove_dest: Color,
    pub current_premove: Color,
    pub ghost: Color,
    pub white_piece: Color,
    pub black_piece: Color,
    pub coord_text: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            light_square: Color::from_rgba8(240, 217, 181, 255),
            dark_square: Color::from_rgba8(181, 136, 99, 255),
            last_move: Color::from_rgba8(155, 199, 0, 105),
            selected: Color::from_rgba8(20, 85, 30, 128),
            move_dest: Color::from_rgba8(20, 85, 30, 80),
            premove_dest: Color::from_rgba8(20, 30, 85, 80),
            current_premove: Color::from_rgba8(20, 30, 85, 128),
            ghost: Color::from_rgba8(200, 40, 40, 90),
            white_piece: Color::from_rgba8(250, 250, 250, 255),
            black_piece: Color::from_rgba8(30, 30, 30, 255),
            coord_text: Color::from_rgba8(90, 70, 50, 255),
        }
    }
}

impl Theme {
    /// Fill of a decorated square. The strongest class wins.
    pub fn square_fill(&self, class: &str) -> Color {
        let has = |name: &str| class.split(' ').any(|c| c == name);
        if has("current-premove") {
            self.current_premove
        } else if has("selected") {
            self.selected
        } else if has("move-dest") {
            self.move_dest
        } else if has("premove-dest") {
            self.premove_dest
        } else if has("ghost") {
            self.ghost
        } else if has("last-move") {
            self.last_move
        } else {
            self.dark_square
        }
    }

    pub fn piece_fill(&self, side: Side) -> Color {
        match side {
            Side::White => self.white_piece,
            Side::Black => self.black_piece,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strongest_class_wins() {
        let theme = Theme::default();
        let rgba = |c: Color| c.to_rgba8();
        assert_eq!(rgba(theme.square_fill("last-move selected")), rgba(theme.selected));
        assert_eq!(rgba(theme.square_fill("move-dest oc")), rgba(theme.move_dest));
        assert_eq!(rgba(theme.square_fill("last-move")), rgba(theme.last_move));
        assert_eq!(rgba(theme.square_fill("")), rgba(theme.dark_square));
    }

    #[test]
    fn test_piece_fill_by_side() {
        let theme = Theme::default();
        assert_eq!(theme.piece_fill(Side::Black).to_rgba8(), theme.black_piece.to_rgba8());
    }
}
