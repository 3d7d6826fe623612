//! Deferred notifications.
//!
//! Engine operations never call user code. They queue a [`Notification`] and
//! return; the host drains the queue once the operation has completed, so
//! every listener observes the fully applied mutation and cannot re-enter the
//! engine from inside it.

use crate::types::{Key, Piece, Role};
use std::collections::VecDeque;

/// Extra information attached to a completed user move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveMetadata {
    /// The move was played from a staged premove.
    pub premove: bool,
    /// Ctrl was held when the move was made.
    pub ctrl_key: bool,
    /// Piece removed (or ghosted) by this move.
    pub captured: Option<Piece>,
}

/// Something a listener may want to hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The board changed in any way.
    Change,
    /// A piece moved, by the user or through the API.
    Move {
        orig: Key,
        dest: Key,
        captured: Option<Piece>,
    },
    /// A piece was placed on the board.
    DropNewPiece { piece: Piece, key: Key },
    /// A square was selected or tapped.
    Select { key: Key },
    /// A user move was applied.
    After {
        orig: Key,
        dest: Key,
        meta: MoveMetadata,
    },
    /// A user drop was applied.
    AfterNewPiece { role: Role, key: Key, predrop: bool },
    PremoveSet { orig: Key, dest: Key, ctrl_key: bool },
    PremoveUnset,
    PredropSet { role: Role, key: Key },
    PredropUnset,
}

/// FIFO of notifications waiting for the host.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    pending: VecDeque<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) {
        self.pending.push_back(notification);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Take everything queued so far, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.pending.drain(..).collect()
    }
}

/// Listener callbacks, invoked only when the queue is flushed.
#[derive(Default)]
pub struct Hooks {
    pub change: Option<Box<dyn FnMut()>>,
    pub moved: Option<Box<dyn FnMut(Key, Key, Option<Piece>)>>,
    pub drop_new_piece: Option<Box<dyn FnMut(Piece, Key)>>,
    pub select: Option<Box<dyn FnMut(Key)>>,
    pub after: Option<Box<dyn FnMut(Key, Key, MoveMetadata)>>,
    pub after_new_piece: Option<Box<dyn FnMut(Role, Key, bool)>>,
    pub premove_set: Option<Box<dyn FnMut(Key, Key, bool)>>,
    pub premove_unset: Option<Box<dyn FnMut()>>,
    pub predrop_set: Option<Box<dyn FnMut(Role, Key)>>,
    pub predrop_unset: Option<Box<dyn FnMut()>>,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}

impl Hooks {
    /// Deliver one notification to its listener, if any.
    pub fn dispatch(&mut self, notification: &Notification) {
        match *notification {
            Notification::Change => {
                if let Some(f) = self.change.as_mut() {
                    f();
                }
            }
            Notification::Move {
                orig,
                dest,
                captured,
            } => {
                if let Some(f) = self.moved.as_mut() {
                    f(orig, dest, captured);
                }
            }
            Notification::DropNewPiece { piece, key } => {
                if let Some(f) = self.drop_new_piece.as_mut() {
                    f(piece, key);
                }
            }
            Notification::Select { key } => {
                if let Some(f) = self.select.as_mut() {
                    f(key);
                }
            }
            Notification::After { orig, dest, meta } => {
                if let Some(f) = self.after.as_mut() {
                    f(orig, dest, meta);
                }
            }
            Notification::AfterNewPiece { role, key, predrop } => {
                if let Some(f) = self.after_new_piece.as_mut() {
                    f(role, key, predrop);
                }
            }
            Notification::PremoveSet {
                orig,
                dest,
                ctrl_key,
            } => {
                if let Some(f) = self.premove_set.as_mut() {
                    f(orig, dest, ctrl_key);
                }
            }
            Notification::PremoveUnset => {
                if let Some(f) = self.premove_unset.as_mut() {
                    f();
                }
            }
            Notification::PredropSet { role, key } => {
                if let Some(f) = self.predrop_set.as_mut() {
                    f(role, key);
                }
            }
            Notification::PredropUnset => {
                if let Some(f) = self.predrop_unset.as_mut() {
                    f();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = NotificationQueue::new();
        let key = Key::new(1).unwrap();
        queue.push(Notification::Select { key });
        queue.push(Notification::Change);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain(), vec![Notification::Select { key }, Notification::Change]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dispatch_reaches_listener() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut hooks = Hooks {
            moved: Some(Box::new(move |orig, dest, _| sink.borrow_mut().push((orig, dest)))),
            ..Hooks::default()
        };
        let (a, b) = (Key::new(31).unwrap(), Key::new(26).unwrap());
        hooks.dispatch(&Notification::Change);
        hooks.dispatch(&Notification::Move {
            orig: a,
            dest: b,
            captured: None,
        });
        assert_eq!(*seen.borrow(), vec![(a, b)]);
    }
}
