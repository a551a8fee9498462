/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{
    Capture, Color, Mode, Move, Movement, Piece, PieceKind, Position, Square, State, Step,
};

/// Rank of `square` counted from `piece`'s own side of the board, starting at `1`.
#[inline(always)]
pub const fn relative_rank(square: Square, piece: Piece) -> usize {
    match piece.color() {
        Color::White => square.board().height() - square.y(),
        Color::Black => square.y() + 1,
    }
}

/// Appends every pseudo-legal move of the side to move in `state` to `moves`.
///
/// Castling is not included; see [`crate::Castling::moves`].
pub fn pseudo_legal_moves(state: &State, promotes: &[PieceKind], moves: &mut Vec<Move>) {
    for (from, piece) in state.position().pieces(state.color()) {
        piece_moves(state, from, piece, promotes, moves);
    }
}

/// Appends the pseudo-legal moves of `piece` standing on `from` to `moves`.
///
/// Pawns reaching the last rank produce one pending promotion followed by one promotion per kind in
/// `promotes`.
pub fn piece_moves(
    state: &State,
    from: Square,
    piece: Piece,
    promotes: &[PieceKind],
    moves: &mut Vec<Move>,
) {
    match piece.kind().movement() {
        Movement::None => {}
        Movement::Pawn => pawn_moves(state, from, piece, promotes, moves),
        Movement::Steps(steps) => {
            for step in steps {
                step_moves(state.position(), from, piece, step, moves);
            }
        }
    }
}

fn step_moves(position: &Position, from: Square, piece: Piece, step: &Step, moves: &mut Vec<Move>) {
    for (dx, dy) in step.shape.offsets() {
        match step.mode {
            Mode::Leap => {
                if let Some(to) = from.to(dx, dy) {
                    target(position, from, to, piece, moves);
                }
            }
            Mode::Ride => {
                for to in from.ray(dx, dy) {
                    match position.get(to) {
                        None => moves.push(Move::quiet(piece, from, to)),
                        Some(occupant) => {
                            if occupant.is_capturable(piece) {
                                moves.push(Move::capture(piece, from, to, occupant));
                            }
                            if !occupant.is_passable(piece) {
                                break;
                            }
                        }
                    }
                }
            }
            Mode::Hop => {
                let landing = from
                    .ray(dx, dy)
                    .find(|&sq| position.has(sq))
                    .and_then(|hurdle| hurdle.to(dx, dy));
                if let Some(to) = landing {
                    target(position, from, to, piece, moves);
                }
            }
        }
    }
}

/// A quiet move onto an empty square, or a capture if the occupant can be taken.
#[inline(always)]
fn target(position: &Position, from: Square, to: Square, piece: Piece, moves: &mut Vec<Move>) {
    match position.get(to) {
        None => moves.push(Move::quiet(piece, from, to)),
        Some(occupant) if occupant.is_capturable(piece) => {
            moves.push(Move::capture(piece, from, to, occupant))
        }
        Some(_) => {}
    }
}

fn pawn_moves(
    state: &State,
    from: Square,
    piece: Piece,
    promotes: &[PieceKind],
    moves: &mut Vec<Move>,
) {
    let position = state.position();
    let dir = piece.color().move_dir();
    let start = moves.len();

    // Pushes
    if let Some(to) = from.dy(dir).filter(|&to| !position.has(to)) {
        moves.push(Move::quiet(piece, from, to));

        if relative_rank(from, piece) == 2 {
            if let Some(to) = from.dy(dir * 2).filter(|&to| !position.has(to)) {
                moves.push(Move::double_pawn(piece, from, to));
            }
        }
    }

    // Captures, left then right
    for dx in [-1, 1] {
        let Some(to) = from.to(dx, dir) else {
            continue;
        };

        match position.get(to) {
            Some(occupant) if occupant.is_capturable(piece) => {
                moves.push(Move::capture(piece, from, to, occupant));
            }
            Some(_) => {}
            None if state.en_passant() == Some(to) => {
                let captured = from
                    .dx(dx)
                    .and_then(|at| position.get(at).map(|p| Capture::new(p, at)));
                if let Some(captured) = captured.filter(|c| c.piece().is_capturable(piece)) {
                    moves.push(Move::en_passant_capture(piece, from, to, captured));
                }
            }
            None => {}
        }
    }

    // Expand moves onto the last rank into promotions
    let last_rank = |mv: &Move| relative_rank(mv.to(), piece) == mv.to().board().height();
    if !moves[start..].iter().any(last_rank) {
        return;
    }

    let generated: Vec<Move> = moves.drain(start..).collect();
    for mv in generated {
        if last_rank(&mv) {
            moves.push(mv.pending_promotion());
            moves.extend(
                promotes
                    .iter()
                    .map(|&kind| mv.with_promotion(Piece::new(kind, piece.color()))),
            );
        } else {
            moves.push(mv);
        }
    }
}

/// Whether `piece` standing on `from` attacks `to` in `position`.
///
/// Occupancy of `to` itself is ignored, so this also tells whether an empty square is covered.
pub fn piece_attacks(position: &Position, from: Square, to: Square, piece: Piece) -> bool {
    if from == to {
        return false;
    }

    match piece.kind().movement() {
        Movement::None => false,
        Movement::Pawn => from.to(-1, piece.color().move_dir()) == Some(to)
            || from.to(1, piece.color().move_dir()) == Some(to),
        Movement::Steps(steps) => steps
            .iter()
            .any(|step| step_attacks(position, from, to, piece, step)),
    }
}

fn step_attacks(position: &Position, from: Square, to: Square, piece: Piece, step: &Step) -> bool {
    let dx = to.x() as i32 - from.x() as i32;
    let dy = to.y() as i32 - from.y() as i32;

    step.shape.offsets().any(|(ox, oy)| match step.mode {
        Mode::Leap => (ox, oy) == (dx, dy),
        Mode::Ride => {
            let Some(n) = multiple_of(dx, dy, ox, oy) else {
                return false;
            };
            from.ray(ox, oy)
                .take(n - 1)
                .all(|sq| position.get(sq).map_or(true, |p| p.is_passable(piece)))
        }
        Mode::Hop => {
            if multiple_of(dx, dy, ox, oy).is_none() {
                return false;
            }
            for sq in from.ray(ox, oy) {
                if sq == to {
                    return false;
                }
                if position.has(sq) {
                    return sq.to(ox, oy) == Some(to);
                }
            }
            false
        }
    })
}

/// Returns `n > 0` such that `(dx, dy) == n * (ox, oy)`.
#[inline(always)]
fn multiple_of(dx: i32, dy: i32, ox: i32, oy: i32) -> Option<usize> {
    let n = if ox != 0 {
        if dx % ox != 0 {
            return None;
        }
        dx / ox
    } else {
        if dx != 0 || oy == 0 || dy % oy != 0 {
            return None;
        }
        dy / oy
    };

    (n > 0 && dx == n * ox && dy == n * oy).then_some(n as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, Castling, Color, MoveKind};

    fn sq(name: &str) -> Square {
        Board::default().parse_square(name).unwrap()
    }

    fn state_with(pieces: &[(&str, Piece)], color: Color) -> State {
        let mut position = Position::default();
        for &(name, piece) in pieces {
            position.put(sq(name), piece);
        }
        State::new(position, color, Castling::default(), None, 0, 1)
    }

    fn moves_of(state: &State, from: &str) -> Vec<Move> {
        let mut moves = Vec::new();
        let piece = state.position().get(sq(from)).unwrap();
        piece_moves(state, sq(from), piece, &PieceKind::CHESS[1..5], &mut moves);
        moves
    }

    #[test]
    fn test_multiple_of() {
        assert_eq!(multiple_of(3, 3, 1, 1), Some(3));
        assert_eq!(multiple_of(2, 4, 1, 2), Some(2));
        assert_eq!(multiple_of(0, -5, 0, -1), Some(5));
        assert_eq!(multiple_of(0, 5, 0, -1), None);
        assert_eq!(multiple_of(2, 3, 1, 1), None);
        assert_eq!(multiple_of(3, 0, 2, 0), None);
    }

    #[test]
    fn test_leaper_and_rider_moves() {
        let state = state_with(
            &[
                ("b1", Piece::WHITE_KNIGHT),
                ("d2", Piece::WHITE_PAWN),
                ("a1", Piece::WHITE_ROOK),
                ("a5", Piece::BLACK_PAWN),
            ],
            Color::White,
        );

        // Knight: a3 and c3, d2 is blocked by a friendly pawn
        assert_eq!(moves_of(&state, "b1").len(), 2);

        // Rook: a2..a4 quiet, a5 capture; nothing along the rank past b1
        let rook = moves_of(&state, "a1");
        assert_eq!(rook.len(), 4);
        assert_eq!(rook.iter().filter(|m| m.is_capture()).count(), 1);
    }

    #[test]
    fn test_grasshopper_moves() {
        let hopper = Piece::new(PieceKind::Grasshopper, Color::White);
        let state = state_with(
            &[
                ("d4", hopper),
                ("d6", Piece::BLACK_PAWN),
                ("f6", Piece::WHITE_PAWN),
                ("b4", Piece::BLACK_PAWN),
            ],
            Color::White,
        );

        let moves = moves_of(&state, "d4");
        let targets: Vec<String> = moves.iter().map(|m| m.to().name()).collect();
        assert_eq!(moves.len(), 3, "{targets:?}");
        assert!(targets.contains(&"d7".to_string()));
        assert!(targets.contains(&"g7".to_string()));
        assert!(targets.contains(&"a4".to_string()));

        let position = state.position();
        assert!(piece_attacks(position, sq("d4"), sq("d7"), hopper));
        assert!(!piece_attacks(position, sq("d4"), sq("d6"), hopper));
        assert!(!piece_attacks(position, sq("d4"), sq("d8"), hopper));
    }

    #[test]
    fn test_pawn_moves() {
        let state = State::new(
            {
                let mut position = Position::default();
                position.put(sq("e5"), Piece::WHITE_PAWN);
                position.put(sq("d5"), Piece::BLACK_PAWN);
                position.put(sq("f6"), Piece::BLACK_KNIGHT);
                position.put(sq("b2"), Piece::WHITE_PAWN);
                position
            },
            Color::White,
            Castling::default(),
            Some(sq("d6")),
            0,
            1,
        );

        let moves = moves_of(&state, "e5");
        assert_eq!(moves.len(), 3);
        assert!(moves.iter().any(|m| m.kind() == MoveKind::EnPassant
            && m.captured_at() == Some(sq("d5"))));

        let moves = moves_of(&state, "b2");
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[1].kind(), MoveKind::DoublePawn);
        assert_eq!(moves[1].en_passant(), Some(sq("b3")));
    }

    #[test]
    fn test_pawn_promotions() {
        let state = state_with(
            &[("g7", Piece::WHITE_PAWN), ("h8", Piece::BLACK_ROOK)],
            Color::White,
        );

        // Push and capture, each one pending plus four promotions
        let moves = moves_of(&state, "g7");
        assert_eq!(moves.len(), 10);
        assert_eq!(moves.iter().filter(|m| m.is_pending_promotion()).count(), 2);
        assert_eq!(
            moves.iter().filter(|m| m.promote_to().is_some()).count(),
            8
        );
    }

    #[test]
    fn test_attacks() {
        let mut position = Position::default();
        position.put(sq("a1"), Piece::WHITE_QUEEN);
        position.put(sq("c3"), Piece::BLACK_PAWN);
        position.put(sq("e4"), Piece::BLACK_PAWN);

        assert!(piece_attacks(&position, sq("a1"), sq("c3"), Piece::WHITE_QUEEN));
        assert!(!piece_attacks(&position, sq("a1"), sq("d4"), Piece::WHITE_QUEEN));
        assert!(piece_attacks(&position, sq("a1"), sq("a8"), Piece::WHITE_QUEEN));
        assert!(!piece_attacks(&position, sq("a1"), sq("b3"), Piece::WHITE_QUEEN));

        // Pawns attack diagonally forward only
        assert!(piece_attacks(&position, sq("e4"), sq("d3"), Piece::BLACK_PAWN));
        assert!(!piece_attacks(&position, sq("e4"), sq("e3"), Piece::BLACK_PAWN));
        assert!(!piece_attacks(&position, sq("e4"), sq("d5"), Piece::BLACK_PAWN));

        let nightrider = Piece::new(PieceKind::Nightrider, Color::White);
        assert!(piece_attacks(&position, sq("a1"), sq("e3"), nightrider));
    }
}
