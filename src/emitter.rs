/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{ColorSet, GameResult, Move, Nag, Piece, PieceKind, PositionChange, Square};

/// A notification sent by a [`crate::Game`] to its listeners.
///
/// Events are identified by their index in the game's history, see [`crate::Game::event`].
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Insert { square: Square, piece: Piece },
    Remove { square: Square, piece: Piece },
    Transfer { from: Square, to: Square, piece: Piece },
    Clear,
    /// The setup state was edited.
    Change,

    State(usize),
    Ply(usize),
    Move(Move),
    /// A promotion is pending; these are the kinds to choose from.
    Promotion(Vec<PieceKind>),
    Promote(Move),
    Play(usize),

    Event(usize),
    Seek(usize),
    SeekState(usize),
    SeekPly(usize),
    Transition(usize),

    DrawOffer(ColorSet),
    Nag(Nag),
    Comment(String),
    Capture(Move),
    Castling(Move),
    EnPassant(Move),
    DoublePawnMove(Move),

    GameOver(GameResult),
    Win(GameResult),
    Draw(GameResult),
    /// The specific result, e.g. `checkmate` or `draw-by-agreement`.
    Outcome(GameResult),

    FiftyMoves,
    ThreefoldRepetition,
}

impl Signal {
    /// The name listeners register for.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Remove { .. } => "remove",
            Self::Transfer { .. } => "transfer",
            Self::Clear => "clear",
            Self::Change => "change",
            Self::State(_) => "state",
            Self::Ply(_) => "ply",
            Self::Move(_) => "move",
            Self::Promotion(_) => "promotion",
            Self::Promote(_) => "promote",
            Self::Play(_) => "play",
            Self::Event(_) => "event",
            Self::Seek(_) => "seek",
            Self::SeekState(_) => "seek-state",
            Self::SeekPly(_) => "seek-ply",
            Self::Transition(_) => "transition",
            Self::DrawOffer(_) => "draw-offer",
            Self::Nag(_) => "nag",
            Self::Comment(_) => "comment",
            Self::Capture(_) => "capture",
            Self::Castling(_) => "castling",
            Self::EnPassant(_) => "en-passant",
            Self::DoublePawnMove(_) => "double-pawn-move",
            Self::GameOver(_) => "gameover",
            Self::Win(_) => "win",
            Self::Draw(_) => "draw",
            Self::Outcome(result) => result.signal_kind().unwrap_or("result"),
            Self::FiftyMoves => "50-moves",
            Self::ThreefoldRepetition => "3-repetition",
        }
    }

    /// The signals describing `mv` being played on the board.
    pub fn for_move(mv: &Move) -> Vec<Self> {
        use crate::{MoveKind, Promotion};

        let piece = mv.piece();
        let transfer = Self::Transfer {
            from: mv.from(),
            to: mv.to(),
            piece,
        };
        let promote = |to: Piece| {
            [
                Self::Remove {
                    square: mv.to(),
                    piece,
                },
                Self::Insert {
                    square: mv.to(),
                    piece: to,
                },
                Self::Promote(*mv),
            ]
        };

        // Finishing a pending promotion only swaps the pawn for its new piece
        if let Some(Promotion::Chosen(to)) = mv.promotion() {
            return promote(to).to_vec();
        }

        let mut signals = match mv.kind() {
            MoveKind::Quiet => vec![transfer],
            MoveKind::DoublePawn => vec![transfer, Self::DoublePawnMove(*mv)],
            MoveKind::Castling => {
                let mut signals = vec![transfer];
                if let (Some(castle), Some(rook)) = (mv.castle(), mv.rook()) {
                    signals.push(Self::Transfer {
                        from: castle.rook_from(),
                        to: castle.rook_to(),
                        piece: rook,
                    });
                }
                signals.push(Self::Castling(*mv));
                signals
            }
            MoveKind::Capture | MoveKind::EnPassant => {
                let mut signals = Vec::with_capacity(4);
                if let Some(capture) = mv.capture_info() {
                    signals.push(Self::Remove {
                        square: capture.square(),
                        piece: capture.piece(),
                    });
                }
                signals.push(transfer);
                signals.push(Self::Capture(*mv));
                if mv.kind() == MoveKind::EnPassant {
                    signals.push(Self::EnPassant(*mv));
                }
                signals
            }
        };

        if let Some(Promotion::Immediate(to)) = mv.promotion() {
            signals.extend(promote(to));
        }
        signals
    }
}

impl From<PositionChange> for Signal {
    fn from(change: PositionChange) -> Self {
        match change {
            PositionChange::Insert { square, piece } => Self::Insert { square, piece },
            PositionChange::Remove { square, piece } => Self::Remove { square, piece },
            PositionChange::Transfer { from, to, piece } => Self::Transfer { from, to, piece },
            PositionChange::Clear => Self::Clear,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert { square, piece } => write!(f, "insert {piece} {square}"),
            Self::Remove { square, piece } => write!(f, "remove {piece} {square}"),
            Self::Transfer { from, to, piece } => write!(f, "transfer {piece} {from} {to}"),
            Self::Move(mv)
            | Self::Promote(mv)
            | Self::Capture(mv)
            | Self::Castling(mv)
            | Self::EnPassant(mv)
            | Self::DoublePawnMove(mv) => write!(f, "{} {mv}", self.kind()),
            Self::State(id)
            | Self::Ply(id)
            | Self::Play(id)
            | Self::Event(id)
            | Self::Seek(id)
            | Self::SeekState(id)
            | Self::SeekPly(id)
            | Self::Transition(id) => write!(f, "{} #{id}", self.kind()),
            Self::Comment(text) => write!(f, "comment {{{text}}}"),
            Self::Nag(nag) => write!(f, "nag {nag}"),
            Self::GameOver(result) => write!(f, "gameover {result}"),
            _ => write!(f, "{}", self.kind()),
        }
    }
}

/// Handle returned by [`Emitter::on`] and friends, used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

struct Listener {
    id: ListenerId,
    /// `None` for subscribers, which receive every signal.
    kind: Option<String>,
    once: bool,
    callback: Box<dyn FnMut(&Signal)>,
}

/// Dispatches [`Signal`]s to callbacks registered by signal kind.
///
/// # Example
/// ```
/// # use std::{cell::RefCell, rc::Rc};
/// # use xchess::{Emitter, Signal};
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let mut emitter = Emitter::default();
///
/// let log = Rc::clone(&seen);
/// emitter.on("clear", move |signal| log.borrow_mut().push(signal.kind()));
///
/// emitter.emit(&Signal::Clear);
/// emitter.emit(&Signal::Change);
/// assert_eq!(*seen.borrow(), ["clear"]);
/// ```
#[derive(Default)]
pub struct Emitter {
    listeners: Vec<Listener>,
    next_id: usize,
}

impl Emitter {
    fn register(
        &mut self,
        kind: Option<&str>,
        once: bool,
        callback: Box<dyn FnMut(&Signal)>,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            kind: kind.map(String::from),
            once,
            callback,
        });
        id
    }

    /// Calls `callback` for every signal of `kind`.
    pub fn on(&mut self, kind: &str, callback: impl FnMut(&Signal) + 'static) -> ListenerId {
        self.register(Some(kind), false, Box::new(callback))
    }

    /// Calls `callback` for the next signal of `kind` only.
    pub fn once(&mut self, kind: &str, callback: impl FnMut(&Signal) + 'static) -> ListenerId {
        self.register(Some(kind), true, Box::new(callback))
    }

    /// Calls `callback` for every signal.
    pub fn subscribe(&mut self, callback: impl FnMut(&Signal) + 'static) -> ListenerId {
        self.register(None, false, Box::new(callback))
    }

    /// Removes a listener. Returns `false` if it was already gone.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.id != id);
        self.listeners.len() != before
    }

    /// Sends `signal` to every listener registered for its kind, then to every subscriber.
    pub fn emit(&mut self, signal: &Signal) {
        let kind = signal.kind();
        let mut fired = Vec::new();

        for listener in self
            .listeners
            .iter_mut()
            .filter(|listener| listener.kind.as_deref() == Some(kind))
        {
            (listener.callback)(signal);
            if listener.once {
                fired.push(listener.id);
            }
        }
        for listener in self.listeners.iter_mut().filter(|l| l.kind.is_none()) {
            (listener.callback)(signal);
        }

        if !fired.is_empty() {
            self.listeners.retain(|listener| !fired.contains(&listener.id));
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{Board, Capture};

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl FnMut(&Signal) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        (seen, move |signal: &Signal| {
            log.borrow_mut().push(signal.kind().to_string())
        })
    }

    #[test]
    fn test_once_and_off() {
        let mut emitter = Emitter::default();
        let (seen, callback) = recorder();
        emitter.once("clear", callback);
        let (all, callback) = recorder();
        let subscriber = emitter.subscribe(callback);

        emitter.emit(&Signal::Clear);
        emitter.emit(&Signal::Clear);
        assert_eq!(*seen.borrow(), ["clear"]);
        assert_eq!(*all.borrow(), ["clear", "clear"]);
        assert_eq!(emitter.len(), 1);

        assert!(emitter.off(subscriber));
        assert!(!emitter.off(subscriber));
        emitter.emit(&Signal::Change);
        assert_eq!(all.borrow().len(), 2);
    }

    #[test]
    fn test_move_signals() {
        let board = Board::default();
        let sq = |name| board.parse_square(name).unwrap();

        let kinds = |mv: Move| {
            Signal::for_move(&mv)
                .iter()
                .map(Signal::kind)
                .collect::<Vec<_>>()
        };

        let quiet = Move::quiet(Piece::WHITE_KNIGHT, sq("g1"), sq("f3"));
        assert_eq!(kinds(quiet), ["transfer"]);

        let capture = Move::capture(Piece::WHITE_KNIGHT, sq("f3"), sq("e5"), Piece::BLACK_PAWN);
        assert_eq!(kinds(capture), ["remove", "transfer", "capture"]);

        let ep = Move::en_passant_capture(
            Piece::WHITE_PAWN,
            sq("e5"),
            sq("d6"),
            Capture::new(Piece::BLACK_PAWN, sq("d5")),
        );
        assert_eq!(kinds(ep), ["remove", "transfer", "capture", "en-passant"]);

        let push = Move::quiet(Piece::WHITE_PAWN, sq("a7"), sq("a8"));
        let queen = push.with_promotion(Piece::WHITE_QUEEN);
        assert_eq!(kinds(queen), ["transfer", "remove", "insert", "promote"]);

        let chosen = push
            .pending_promotion()
            .promote(Piece::WHITE_KNIGHT, &PieceKind::CHESS[1..5])
            .unwrap();
        assert_eq!(kinds(chosen), ["remove", "insert", "promote"]);
    }
}
