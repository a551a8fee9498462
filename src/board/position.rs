/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    collections::{BTreeMap, VecDeque},
    fmt,
    ops::{Deref, Index},
    rc::Rc,
};

use crate::{
    piece_attacks, piece_moves, Bestiary, Board, ChessError, ChessResult, Color, File, Piece,
    Rank, Square, State,
};

/// A committed, shared, read-only position.
pub type FrozenPosition = Rc<Position>;

/// A single change made to a [`Position`] while editing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionChange {
    Insert { square: Square, piece: Piece },
    Remove { square: Square, piece: Piece },
    Transfer { from: Square, to: Square, piece: Piece },
    Clear,
}

/// Placement of pieces on a [`Board`].
///
/// Each square holds at most one piece; putting a piece on an occupied square evicts the previous
/// occupant.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Position {
    board: Board,
    squares: Vec<Option<Piece>>,
}

impl Position {
    /// An empty position on `board`.
    pub fn new(board: Board) -> Self {
        Self {
            board,
            squares: vec![None; board.size()],
        }
    }

    #[inline(always)]
    pub const fn board(&self) -> Board {
        self.board
    }

    /// Fetches the piece at `square`, if any.
    #[inline(always)]
    pub fn get(&self, square: Square) -> Option<Piece> {
        self.squares.get(square.id()).copied().flatten()
    }

    #[inline(always)]
    pub fn has(&self, square: Square) -> bool {
        self.get(square).is_some()
    }

    /// Number of pieces on the board.
    pub fn len(&self) -> usize {
        self.squares.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.squares.iter().all(Option::is_none)
    }

    /// Occupied squares and their pieces, in square order.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.board
            .squares()
            .filter_map(move |square| self.get(square).map(|piece| (square, piece)))
    }

    /// Occupied squares holding a piece of `color`.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.iter().filter(move |(_, piece)| piece.color() == color)
    }

    /// Squares holding exactly `piece`.
    pub fn find(&self, piece: Piece) -> impl Iterator<Item = Square> + '_ {
        self.iter()
            .filter(move |&(_, p)| p == piece)
            .map(|(square, _)| square)
    }

    /// Places `piece` on `square`, returning the piece it evicted.
    #[inline(always)]
    pub fn put(&mut self, square: Square, piece: Piece) -> Option<Piece> {
        self.squares[square.id()].replace(piece)
    }

    /// Removes and returns the piece on `square`.
    #[inline(always)]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.squares[square.id()].take()
    }

    /// Moves whatever stands on `from` to `to`, returning the piece captured on `to`.
    pub fn transfer(&mut self, from: Square, to: Square) -> ChessResult<Option<Piece>> {
        let piece = self
            .take(from)
            .ok_or_else(|| ChessError::EmptySquare(from.name()))?;
        Ok(self.put(to, piece))
    }

    /// Removes every piece.
    pub fn clear(&mut self) {
        self.squares.iter_mut().for_each(|square| *square = None);
    }

    /// Whether a piece that could capture `target` attacks `square`.
    ///
    /// `target` is the hypothetical occupant of `square`; it decides which pieces count as
    /// enemies, so empty squares can be tested too.
    pub fn attacks(&self, square: Square, target: Piece) -> bool {
        self.iter().any(|(from, attacker)| {
            target.is_capturable(attacker) && piece_attacks(self, from, square, attacker)
        })
    }

    /// Squares of `color`'s royal pieces that are under attack.
    pub fn checks(&self, color: Color) -> Vec<Square> {
        self.pieces(color)
            .filter(|(square, piece)| piece.kind().is_royal() && self.attacks(*square, *piece))
            .map(|(square, _)| square)
            .collect()
    }

    /// Whether any royal piece of `color` is under attack.
    pub fn is_check(&self, color: Color) -> bool {
        self.pieces(color)
            .any(|(square, piece)| piece.kind().is_royal() && self.attacks(square, piece))
    }

    /// Sum of the weights of every piece.
    pub fn weight(&self) -> i32 {
        self.iter().map(|(_, piece)| piece.weight()).sum()
    }

    /// Material balance from `color`'s point of view.
    pub fn advantage(&self, color: Color) -> i32 {
        self.iter().map(|(_, piece)| piece.advantage(color)).sum()
    }

    /// Fraction of squares that are occupied.
    pub fn density(&self) -> f64 {
        self.len() as f64 / self.board.size() as f64
    }

    /// Material statistics from `color`'s point of view.
    pub fn stats(&self, color: Color) -> PositionStats {
        let mut stats = PositionStats {
            density: self.density(),
            ..Default::default()
        };

        for (_, piece) in self.iter() {
            stats.all.add(piece);
            stats.advantage += piece.advantage(color);
            match piece.color() {
                Color::White => stats.white.add(piece),
                Color::Black => stats.black.add(piece),
            }
        }

        stats
    }

    /// Breadth-first distance map of the squares `piece` could reach from `square` in successive
    /// moves, if the rest of the position stood still.
    ///
    /// When `piece` is `None`, the piece standing on `square` is traced.
    pub fn trace_moves(
        state: &State,
        bestiary: &Bestiary,
        square: Square,
        piece: Option<Piece>,
    ) -> TraceMap {
        let position = state.position();
        let mut trace = TraceMap {
            board: position.board(),
            position: Rc::clone(position),
            distances: vec![None; position.board().size()],
        };

        let Some(piece) = piece.or_else(|| position.get(square)) else {
            return trace;
        };

        let promotes = bestiary.promotes();
        let mut queue = VecDeque::from([(square, 0)]);
        trace.distances[square.id()] = Some(0);

        let mut moves = Vec::new();
        while let Some((from, distance)) = queue.pop_front() {
            moves.clear();
            piece_moves(state, from, piece, &promotes, &mut moves);
            for mv in &moves {
                let to = mv.to();
                if trace.distances[to.id()].is_none() {
                    trace.distances[to.id()] = Some(distance + 1);
                    queue.push_back((to, distance + 1));
                }
            }
        }

        trace
    }

    /// Renders the position as a box-drawn grid of unicode piece signs.
    pub fn text(&self) -> String {
        self.text_with(|_, piece| piece.sign().to_string())
    }

    /// Renders the position, with `cell` choosing how to draw each occupied square.
    pub fn text_with<F>(&self, mut cell: F) -> String
    where
        F: FnMut(Square, Piece) -> String,
    {
        self.board
            .text(|square| self.get(square).map(|piece| cell(square, piece)))
    }
}

impl Index<Square> for Position {
    type Output = Option<Piece>;
    fn index(&self, index: Square) -> &Self::Output {
        &self.squares[index.id()]
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(Board::default())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text_with(|_, piece| piece.fen().to_string()))
    }
}

/// A [`Position`] open for editing, journaling every change made to it.
///
/// Editing never keeps two pieces on one square: placing onto an occupied square first removes
/// the occupant, and the journal records both halves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetupPosition {
    position: Position,
    changes: Vec<PositionChange>,
}

impl SetupPosition {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            changes: Vec::new(),
        }
    }

    /// Places `piece` on `square`.
    pub fn set(&mut self, square: Square, piece: Piece) {
        if self.position.get(square) == Some(piece) {
            return;
        }
        if let Some(evicted) = self.position.put(square, piece) {
            self.changes.push(PositionChange::Remove {
                square,
                piece: evicted,
            });
        }
        self.changes.push(PositionChange::Insert { square, piece });
    }

    /// Removes the piece on `square`, if any.
    pub fn delete(&mut self, square: Square) -> Option<Piece> {
        let piece = self.position.take(square)?;
        self.changes.push(PositionChange::Remove { square, piece });
        Some(piece)
    }

    /// Moves the piece on `from` to `to`, capturing anything already on `to`.
    pub fn move_piece(&mut self, from: Square, to: Square) -> ChessResult<()> {
        if from == to {
            return match self.position.get(from) {
                Some(_) => Ok(()),
                None => Err(ChessError::EmptySquare(from.name())),
            };
        }

        let piece = self
            .position
            .get(from)
            .ok_or_else(|| ChessError::EmptySquare(from.name()))?;
        if let Some(captured) = self.position.transfer(from, to)? {
            self.changes.push(PositionChange::Remove {
                square: to,
                piece: captured,
            });
        }
        self.changes
            .push(PositionChange::Transfer { from, to, piece });
        Ok(())
    }

    /// Removes every piece.
    pub fn clear(&mut self) {
        if !self.position.is_empty() {
            self.position.clear();
            self.changes.push(PositionChange::Clear);
        }
    }

    /// Replaces the whole position with `pieces`.
    pub fn set_all(&mut self, pieces: impl IntoIterator<Item = (Square, Piece)>) {
        self.clear();
        self.merge(pieces);
    }

    /// Places every one of `pieces`, keeping what is already on the board elsewhere.
    pub fn merge(&mut self, pieces: impl IntoIterator<Item = (Square, Piece)>) {
        for (square, piece) in pieces {
            self.set(square, piece);
        }
    }

    /// Fills every square with `piece`.
    pub fn fill(&mut self, piece: Piece) {
        let board = self.position.board();
        self.merge(board.squares().map(|square| (square, piece)));
    }

    /// Fills every square of `file` with `piece`.
    pub fn fill_file(&mut self, file: File, piece: Piece) {
        self.merge(file.squares().map(|square| (square, piece)));
    }

    /// Fills every square of `rank` with `piece`.
    pub fn fill_rank(&mut self, rank: Rank, piece: Piece) {
        self.merge(rank.squares().map(|square| (square, piece)));
    }

    /// Takes the changes recorded since the last call.
    pub fn drain_changes(&mut self) -> Vec<PositionChange> {
        std::mem::take(&mut self.changes)
    }

    /// A frozen snapshot of the current placement.
    pub fn freeze(&self) -> FrozenPosition {
        Rc::new(self.position.clone())
    }
}

impl Deref for SetupPosition {
    type Target = Position;
    fn deref(&self) -> &Self::Target {
        &self.position
    }
}

/// Piece counts for one side (or both).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialStats {
    pub count: usize,
    pub weight: i32,
    /// Number of pieces per kind id.
    pub pieces: BTreeMap<&'static str, usize>,
}

impl MaterialStats {
    fn add(&mut self, piece: Piece) {
        self.count += 1;
        self.weight += piece.weight();
        *self.pieces.entry(piece.kind().id()).or_default() += 1;
    }
}

/// Summary returned by [`Position::stats`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionStats {
    pub advantage: i32,
    pub density: f64,
    pub all: MaterialStats,
    pub white: MaterialStats,
    pub black: MaterialStats,
}

/// Result of [`Position::trace_moves`].
#[derive(Debug, Clone)]
pub struct TraceMap {
    board: Board,
    position: FrozenPosition,
    distances: Vec<Option<u32>>,
}

impl TraceMap {
    /// Number of moves needed to reach `square`, if it can be reached at all.
    pub fn get(&self, square: Square) -> Option<u32> {
        self.distances.get(square.id()).copied().flatten()
    }

    /// Number of reachable squares, including the starting one.
    pub fn len(&self) -> usize {
        self.distances.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders the distances up to `limit`, showing pieces on squares further away.
    pub fn text(&self, limit: u32) -> String {
        self.board.text(|square| match self.get(square) {
            Some(distance) if distance <= limit => Some(distance.to_string()),
            _ => self.position.get(square).map(|piece| piece.sign().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Board::default().parse_square(name).unwrap()
    }

    #[test]
    fn test_one_piece_per_square() {
        let mut position = Position::default();
        assert_eq!(position.put(sq("e4"), Piece::WHITE_KNIGHT), None);
        assert_eq!(
            position.put(sq("e4"), Piece::BLACK_BISHOP),
            Some(Piece::WHITE_KNIGHT)
        );
        assert_eq!(position.len(), 1);

        assert_eq!(position.transfer(sq("e4"), sq("e5")).unwrap(), None);
        assert!(!position.has(sq("e4")));
        assert_eq!(position[sq("e5")], Some(Piece::BLACK_BISHOP));

        assert_eq!(
            position.transfer(sq("a1"), sq("a2")),
            Err(ChessError::EmptySquare("a1".to_string()))
        );
    }

    #[test]
    fn test_setup_journal() {
        let mut setup = SetupPosition::default();
        setup.set(sq("e1"), Piece::WHITE_KING);
        setup.set(sq("e1"), Piece::WHITE_KING);
        setup.set(sq("d8"), Piece::BLACK_QUEEN);
        setup.move_piece(sq("d8"), sq("e1")).unwrap();

        let changes = setup.drain_changes();
        assert_eq!(
            changes,
            [
                PositionChange::Insert {
                    square: sq("e1"),
                    piece: Piece::WHITE_KING
                },
                PositionChange::Insert {
                    square: sq("d8"),
                    piece: Piece::BLACK_QUEEN
                },
                PositionChange::Remove {
                    square: sq("e1"),
                    piece: Piece::WHITE_KING
                },
                PositionChange::Transfer {
                    from: sq("d8"),
                    to: sq("e1"),
                    piece: Piece::BLACK_QUEEN
                },
            ]
        );
        assert!(setup.drain_changes().is_empty());
        assert_eq!(setup.len(), 1);

        setup.clear();
        setup.clear();
        assert_eq!(setup.drain_changes(), [PositionChange::Clear]);
    }

    #[test]
    fn test_fill() {
        let board = Board::default();
        let mut setup = SetupPosition::new(Position::new(board));
        setup.fill_rank(board.rank(1).unwrap(), Piece::BLACK_PAWN);
        setup.fill_file(board.file(0).unwrap(), Piece::WHITE_ROOK);
        assert_eq!(setup.len(), 15);
        assert_eq!(setup.get(sq("a7")), Some(Piece::WHITE_ROOK));

        setup.fill(Piece::WHITE_PAWN);
        assert_eq!(setup.len(), 64);
        assert!((setup.density() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_material() {
        let mut position = Position::default();
        position.put(sq("e1"), Piece::WHITE_KING);
        position.put(sq("d1"), Piece::WHITE_QUEEN);
        position.put(sq("e8"), Piece::BLACK_KING);
        position.put(sq("a8"), Piece::BLACK_ROOK);
        position.put(sq("h7"), Piece::BLACK_PAWN);

        assert_eq!(position.weight(), 15);
        assert_eq!(position.advantage(Color::White), 3);
        assert_eq!(position.advantage(Color::Black), -3);

        let stats = position.stats(Color::White);
        assert_eq!(stats.all.count, 5);
        assert_eq!(stats.white.weight, 9);
        assert_eq!(stats.black.pieces["pawn"], 1);
        assert_eq!(stats.advantage, 3);
    }

    #[test]
    fn test_attacks_and_checks() {
        let mut position = Position::default();
        position.put(sq("e1"), Piece::WHITE_KING);
        position.put(sq("e8"), Piece::BLACK_ROOK);
        position.put(sq("a8"), Piece::BLACK_KING);

        assert!(position.is_check(Color::White));
        assert_eq!(position.checks(Color::White), [sq("e1")]);
        assert!(!position.is_check(Color::Black));

        // A white piece between the rook and the king blocks the check
        position.put(sq("e4"), Piece::WHITE_PAWN);
        assert!(!position.is_check(Color::White));
        // The rook still hits the pawn, and an empty square it could reach
        assert!(position.attacks(sq("e4"), Piece::WHITE_PAWN));
        assert!(position.attacks(sq("h8"), Piece::WHITE_PAWN));
        assert!(!position.attacks(sq("h8"), Piece::BLACK_PAWN));
    }
}
