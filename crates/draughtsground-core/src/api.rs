//! The board handle hosts talk to.

use crate::anim::{AnimStep, anim, step};
use crate::board;
use crate::config::{Config, configure};
use crate::drag::{self, DragEnd};
use crate::fen;
use crate::input::PointerEvent;
use crate::notify::Hooks;
use crate::state::{Predrop, State};
use crate::types::{Key, Piece, PiecesDiff};
use kurbo::{Point, Rect};

/// What one call to [`Draughtsground::frame`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStatus {
    pub animation: AnimStep,
    pub dragging: bool,
}

impl FrameStatus {
    /// Whether the host should schedule another frame.
    pub fn needs_frame(&self) -> bool {
        self.dragging || matches!(self.animation, AnimStep::Running | AnimStep::NextLeg)
    }
}

/// One board: its state plus the listeners notified after each operation.
///
/// Every mutating method queues notifications; call [`flush`](Self::flush)
/// once the host is ready to run listeners.
#[derive(Debug)]
pub struct Draughtsground {
    state: State,
    hooks: Hooks,
}

impl Draughtsground {
    pub fn new(config: &Config) -> Self {
        Self::with_hooks(config, Hooks::default())
    }

    pub fn with_hooks(config: &Config, hooks: Hooks) -> Self {
        let mut state = State::new();
        configure(&mut state, config);
        log::debug!(
            "Board created: {}x{} {:?}, {} piece(s)",
            state.board_size.columns,
            state.board_size.rows,
            state.variant,
            state.pieces.len()
        );
        Self { state, hooks }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Mutable access for renderers, which record what they drew.
    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    /// Reconfigure. A new position animates from the current one.
    pub fn set(&mut self, config: &Config, now: f64) {
        anim(&mut self.state, now, |s| configure(s, config));
    }

    /// Position string of the current pieces, without the side to move.
    pub fn get_fen(&self) -> String {
        fen::write(&self.state.pieces)
    }

    /// Position string including the side to move.
    pub fn get_fen_with_turn(&self) -> String {
        fen::write_with_turn(self.state.turn_color, &self.state.pieces)
    }

    pub fn toggle_orientation(&mut self) {
        board::toggle_orientation(&mut self.state);
    }

    pub fn set_pieces(&mut self, diff: PiecesDiff, now: f64) {
        anim(&mut self.state, now, |s| board::set_pieces(s, diff));
    }

    /// Select a square as if tapped, or clear the selection.
    pub fn select_square(&mut self, key: Option<Key>, force: bool, now: f64) {
        match key {
            Some(key) => anim(&mut self.state, now, |s| board::select_square(s, key, force)),
            None => board::unselect(&mut self.state),
        }
    }

    /// Move a piece without checking legality.
    pub fn move_piece(&mut self, orig: Key, dest: Key, now: f64) -> bool {
        anim(&mut self.state, now, |s| board::api_move(s, orig, dest))
    }

    /// Place a piece without checking legality.
    pub fn new_piece(&mut self, piece: Piece, key: Key, now: f64) -> bool {
        anim(&mut self.state, now, |s| board::api_new_piece(s, piece, key))
    }

    pub fn play_premove(&mut self, now: f64) -> bool {
        if self.state.premovable.current.is_none() {
            return false;
        }
        anim(&mut self.state, now, board::play_premove)
    }

    pub fn play_predrop(&mut self, validate: impl FnOnce(&Predrop) -> bool, now: f64) -> bool {
        if self.state.predroppable.current.is_none() {
            return false;
        }
        anim(&mut self.state, now, |s| board::play_predrop(s, validate))
    }

    pub fn cancel_premove(&mut self) {
        board::unset_premove(&mut self.state);
    }

    pub fn cancel_predrop(&mut self) {
        board::unset_predrop(&mut self.state);
    }

    pub fn cancel_move(&mut self) {
        board::cancel_move(&mut self.state);
    }

    pub fn stop(&mut self) {
        board::stop(&mut self.state);
    }

    pub fn reset(&mut self) {
        board::reset(&mut self.state);
    }

    /// Record the measured board rectangle. Required before pointer input.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.state.bounds = Some(bounds);
    }

    /// Feed one pointer event to the drag controller.
    ///
    /// # Panics
    ///
    /// Presses and releases panic if [`set_bounds`](Self::set_bounds) was
    /// never called.
    pub fn handle_pointer(&mut self, event: PointerEvent, now: f64) -> Option<DragEnd> {
        match event {
            PointerEvent::Down(pointer) => {
                drag::start(&mut self.state, &pointer, now);
                None
            }
            PointerEvent::Move { position } => {
                drag::pointer_move(&mut self.state, position);
                None
            }
            PointerEvent::Up {
                position,
                modifiers,
            } => Some(drag::end(&mut self.state, Some(position), modifiers)),
            PointerEvent::Cancel => Some(drag::cancel(&mut self.state)),
        }
    }

    /// Start dragging a piece from outside the board (e.g. a spare pieces tray).
    pub fn drag_new_piece(&mut self, piece: Piece, position: Point, force: bool) {
        drag::drag_new_piece(&mut self.state, piece, position, force);
    }

    /// Advance animation and drag by one frame.
    pub fn frame(&mut self, now: f64) -> FrameStatus {
        let animation = step(&mut self.state, now);
        let dragging = drag::process_frame(&mut self.state);
        FrameStatus {
            animation,
            dragging,
        }
    }

    /// Whether an animation or drag is waiting for frames.
    pub fn needs_frame(&self) -> bool {
        self.state.animation.current.is_some() || self.state.draggable.current.is_some()
    }

    /// Deliver queued notifications to the listeners, oldest first.
    ///
    /// Returns how many were delivered.
    pub fn flush(&mut self) -> usize {
        let pending = self.state.notifications.drain();
        for notification in &pending {
            self.hooks.dispatch(notification);
        }
        pending.len()
    }
}

impl Default for Draughtsground {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
