/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{
    Bestiary, Board, ChessError, ChessResult, Color, Piece, PieceKind, Position, SetupPosition,
    XoShiRo,
};

/// Back rank of the standard setup, from the a-file to the h-file.
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

fn check_size(board: Board) -> ChessResult<()> {
    if board.width() != 8 || board.height() != 8 {
        return Err(ChessError::IncompatibleBoardSize);
    }
    Ok(())
}

/// Places `back_rank` for both sides, mirrored, with a rank of pawns in front of each.
fn place(position: &mut SetupPosition, back_rank: &[PieceKind; 8]) {
    let board = position.board();
    position.clear();

    for (x, &kind) in back_rank.iter().enumerate() {
        for (y, color) in [(0, Color::Black), (7, Color::White)] {
            if let Some(square) = board.at(x as i32, y) {
                position.set(square, Piece::new(kind, color));
            }
        }
    }

    for (y, color) in [(1, Color::Black), (6, Color::White)] {
        if let Some(rank) = board.rank(y) {
            position.fill_rank(rank, Piece::new(PieceKind::Pawn, color));
        }
    }
}

/// Replaces `position` with the standard chess setup.
///
/// # Example
/// ```
/// # use xchess::{setup, Board, Position, SetupPosition, ChessError};
/// let mut position = SetupPosition::new(Position::new(Board::default()));
/// setup::standard(&mut position).unwrap();
/// assert_eq!(position.len(), 32);
///
/// let mut wide = SetupPosition::new(Position::new(Board::new(10, 8).unwrap()));
/// assert_eq!(setup::standard(&mut wide), Err(ChessError::IncompatibleBoardSize));
/// ```
pub fn standard(position: &mut SetupPosition) -> ChessResult<()> {
    check_size(position.board())?;
    place(position, &BACK_RANK);
    Ok(())
}

/// The standard chess setup on an 8x8 board.
pub fn standard_position() -> Position {
    let mut position = SetupPosition::new(Position::new(Board::STANDARD));
    place(&mut position, &BACK_RANK);
    Position::clone(&position)
}

/// Replaces `position` with a Chess960 setup drawn from `prng`.
///
/// Bishops stand on squares of opposite colors and the king stands between the rooks, so every
/// one of the 960 starting positions can come up.
pub fn chess960(position: &mut SetupPosition, prng: &mut XoShiRo) -> ChessResult<()> {
    check_size(position.board())?;

    let mut rank = [None; 8];
    rank[prng.below(4) * 2] = Some(PieceKind::Bishop);
    rank[prng.below(4) * 2 + 1] = Some(PieceKind::Bishop);

    let mut take_free = |prng: &mut XoShiRo, kind: PieceKind| {
        let free: Vec<usize> = (0..8).filter(|&x| rank[x].is_none()).collect();
        rank[free[prng.below(free.len())]] = Some(kind);
    };
    take_free(prng, PieceKind::Queen);
    take_free(prng, PieceKind::Knight);
    take_free(prng, PieceKind::Knight);

    // The three squares left over take rook, king, rook in order
    let mut back_rank = [PieceKind::Rook; 8];
    let mut rest = [PieceKind::Rook, PieceKind::King, PieceKind::Rook].into_iter();
    for (x, slot) in rank.iter().enumerate() {
        back_rank[x] = match slot {
            Some(kind) => *kind,
            None => rest.next().unwrap_or(PieceKind::Rook),
        };
    }

    place(position, &back_rank);
    Ok(())
}

/// Puts a random piece of `bestiary` on each square of `position` with the given probability.
pub fn sample(
    position: &mut SetupPosition,
    bestiary: &Bestiary,
    prng: &mut XoShiRo,
    probability: f64,
) {
    let board = position.board();
    for square in board.squares() {
        let color = Color::from_bool(prng.chance(0.5));
        let Some(piece) = bestiary.rand(prng, color) else {
            return;
        };
        if prng.chance(probability) {
            position.set(square, piece);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    fn empty() -> SetupPosition {
        SetupPosition::new(Position::new(Board::default()))
    }

    #[test]
    fn test_standard_setup() {
        let mut position = empty();
        standard(&mut position).unwrap();
        let board = position.board();
        let sq = |name| board.parse_square(name).unwrap();

        assert_eq!(position.get(sq("e1")), Some(Piece::WHITE_KING));
        assert_eq!(position.get(sq("d8")), Some(Piece::BLACK_QUEEN));
        assert_eq!(position.get(sq("h2")), Some(Piece::WHITE_PAWN));
        assert_eq!(position.get(sq("a7")), Some(Piece::BLACK_PAWN));
        assert_eq!(position.get(sq("e4")), None);
        assert_eq!(standard_position(), Position::clone(&position));
    }

    #[test]
    fn test_chess960_invariants() {
        for seed in 0..50 {
            let mut position = empty();
            chess960(&mut position, &mut XoShiRo::from_seed(seed)).unwrap();
            let board = position.board();

            let row: Vec<PieceKind> = (0..8)
                .filter_map(|x| position.get(board.at(x, 7)?))
                .map(|piece| piece.kind())
                .collect();
            assert_eq!(row.len(), 8);

            let bishops: Vec<usize> = (0..8).filter(|&x| row[x] == PieceKind::Bishop).collect();
            assert_eq!(bishops.len(), 2);
            assert_ne!(bishops[0] % 2, bishops[1] % 2);

            let rooks: Vec<usize> = (0..8).filter(|&x| row[x] == PieceKind::Rook).collect();
            let king = (0..8).position(|x| row[x] == PieceKind::King).unwrap();
            assert!(rooks[0] < king && king < rooks[1]);

            // Black mirrors White
            for x in 0..8 {
                let black = position.get(board.at(x, 0).unwrap()).unwrap();
                assert_eq!(black.kind(), row[x as usize]);
                assert_eq!(black.color(), Color::Black);
            }
        }
    }

    #[test]
    fn test_sample() {
        let mut position = empty();
        let mut prng = XoShiRo::from_seed(7);
        sample(&mut position, &Bestiary::chess(), &mut prng, 1.0);
        assert_eq!(position.len(), 64);

        let mut position = empty();
        sample(&mut position, &Bestiary::new("empty"), &mut prng, 1.0);
        assert!(position.is_empty());
    }
}
