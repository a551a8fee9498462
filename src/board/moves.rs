/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{collections::HashMap, fmt};

use crate::{
    parse_move, Board, Castle, CastleFlag, ChessError, ChessResult, Color, File, Piece, PieceKind,
    Position, Rank, Square,
};

/// Represents the different kinds of moves that can be made during a chess game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// A move to an empty square.
    Quiet,

    /// A move onto an enemy piece, removing it.
    Capture,

    /// A pawn's first move, two squares forward. Sets the en passant square.
    DoublePawn,

    /// A pawn capturing the enemy pawn that just passed it.
    EnPassant,

    /// A castling actor and its partner moving together.
    Castling,
}

/// A captured piece and the square it was captured on.
///
/// The square differs from the destination only for en passant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capture {
    piece: Piece,
    square: Square,
}

impl Capture {
    #[inline(always)]
    pub const fn new(piece: Piece, square: Square) -> Self {
        Self { piece, square }
    }

    #[inline(always)]
    pub const fn piece(&self) -> Piece {
        self.piece
    }

    #[inline(always)]
    pub const fn square(&self) -> Square {
        self.square
    }
}

/// How a pawn reaching the last rank is promoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Promotion {
    /// The pawn reaches the last rank and the player still has to choose.
    Pending,

    /// The pawn reaches the last rank and becomes `Piece` in the same move.
    Immediate(Piece),

    /// The choice made after a [`Promotion::Pending`] move. The pawn already stands on the last
    /// rank.
    Chosen(Piece),
}

/// How much of the origin square a SAN string needs to tell apart moves with the same destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Disambiguation {
    #[default]
    None,
    File,
    Rank,
    Full,
}

/// A move of a piece, with everything needed to apply it and to describe it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    kind: MoveKind,
    piece: Piece,
    from: Square,
    to: Square,
    capture: Option<Capture>,
    promotion: Option<Promotion>,
    castle: Option<(Castle, Piece)>,
    hint: Disambiguation,
}

impl Move {
    #[inline(always)]
    const fn new(kind: MoveKind, piece: Piece, from: Square, to: Square) -> Self {
        Self {
            kind,
            piece,
            from,
            to,
            capture: None,
            promotion: None,
            castle: None,
            hint: Disambiguation::None,
        }
    }

    /// A move onto an empty square.
    #[inline(always)]
    pub const fn quiet(piece: Piece, from: Square, to: Square) -> Self {
        Self::new(MoveKind::Quiet, piece, from, to)
    }

    /// A move capturing `captured`, which stands on `to`.
    #[inline(always)]
    pub const fn capture(piece: Piece, from: Square, to: Square, captured: Piece) -> Self {
        let mut mv = Self::new(MoveKind::Capture, piece, from, to);
        mv.capture = Some(Capture::new(captured, to));
        mv
    }

    #[inline(always)]
    pub const fn double_pawn(piece: Piece, from: Square, to: Square) -> Self {
        Self::new(MoveKind::DoublePawn, piece, from, to)
    }

    #[inline(always)]
    pub const fn en_passant_capture(
        piece: Piece,
        from: Square,
        to: Square,
        captured: Capture,
    ) -> Self {
        let mut mv = Self::new(MoveKind::EnPassant, piece, from, to);
        mv.capture = Some(captured);
        mv
    }

    /// The move performing `castle`, with `king` as the actor and `rook` as the partner.
    #[inline(always)]
    pub const fn castling(king: Piece, castle: Castle, rook: Piece) -> Self {
        let mut mv = Self::new(MoveKind::Castling, king, castle.king_from(), castle.king_to());
        mv.castle = Some((castle, rook));
        mv
    }

    /// This move, stopping on the last rank until a promotion is chosen.
    #[inline(always)]
    pub const fn pending_promotion(mut self) -> Self {
        self.promotion = Some(Promotion::Pending);
        self
    }

    /// This move, promoting into `piece` on arrival.
    #[inline(always)]
    pub const fn with_promotion(mut self, piece: Piece) -> Self {
        self.promotion = Some(Promotion::Immediate(piece));
        self
    }

    /// Completes a pending promotion with `piece`, which must be one of `promotes`.
    ///
    /// # Example
    /// ```
    /// # use xchess::{Board, ChessError, Move, Piece, PieceKind};
    /// let board = Board::default();
    /// let (g7, g8) = (board.parse_square("g7").unwrap(), board.parse_square("g8").unwrap());
    /// let pending = Move::quiet(Piece::WHITE_PAWN, g7, g8).pending_promotion();
    /// let promotes = [PieceKind::Queen, PieceKind::Knight];
    ///
    /// let chosen = pending.promote(Piece::WHITE_KNIGHT, &promotes).unwrap();
    /// assert_eq!(chosen.to_string(), "g8=N");
    /// assert_eq!(
    ///     pending.promote(Piece::WHITE_ROOK, &promotes),
    ///     Err(ChessError::InvalidPromotionChoice)
    /// );
    /// ```
    pub fn promote(&self, piece: Piece, promotes: &[PieceKind]) -> ChessResult<Self> {
        if !self.is_pending_promotion() {
            return Err(ChessError::PromoteLocked);
        }
        if piece.color() != self.color() || !promotes.contains(&piece.kind()) {
            return Err(ChessError::InvalidPromotionChoice);
        }

        let mut mv = *self;
        mv.promotion = Some(Promotion::Chosen(piece));
        Ok(mv)
    }

    /// The same move with a different disambiguation hint.
    #[inline(always)]
    pub(crate) const fn with_hint(mut self, hint: Disambiguation) -> Self {
        self.hint = hint;
        self
    }

    #[inline(always)]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    /// The moving piece. For castling, the actor.
    #[inline(always)]
    pub const fn piece(&self) -> Piece {
        self.piece
    }

    #[inline(always)]
    pub const fn color(&self) -> Color {
        self.piece.color()
    }

    #[inline(always)]
    pub const fn from(&self) -> Square {
        self.from
    }

    #[inline(always)]
    pub const fn to(&self) -> Square {
        self.to
    }

    #[inline(always)]
    pub const fn capture_info(&self) -> Option<Capture> {
        self.capture
    }

    /// The captured piece, if any.
    #[inline(always)]
    pub fn captured(&self) -> Option<Piece> {
        self.capture.map(|c| c.piece())
    }

    /// Where the captured piece stood, if any.
    #[inline(always)]
    pub fn captured_at(&self) -> Option<Square> {
        self.capture.map(|c| c.square())
    }

    #[inline(always)]
    pub const fn promotion(&self) -> Option<Promotion> {
        self.promotion
    }

    /// The piece this move promotes into, once it is known.
    #[inline(always)]
    pub const fn promote_to(&self) -> Option<Piece> {
        match self.promotion {
            Some(Promotion::Immediate(piece) | Promotion::Chosen(piece)) => Some(piece),
            _ => None,
        }
    }

    #[inline(always)]
    pub const fn is_pending_promotion(&self) -> bool {
        matches!(self.promotion, Some(Promotion::Pending))
    }

    #[inline(always)]
    pub const fn castle(&self) -> Option<&Castle> {
        match &self.castle {
            Some((castle, _)) => Some(castle),
            None => None,
        }
    }

    /// The castling partner, if this is a castling move.
    #[inline(always)]
    pub const fn rook(&self) -> Option<Piece> {
        match self.castle {
            Some((_, rook)) => Some(rook),
            None => None,
        }
    }

    #[inline(always)]
    pub const fn hint(&self) -> Disambiguation {
        self.hint
    }

    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        self.capture.is_some()
    }

    #[inline(always)]
    pub const fn is_castling(&self) -> bool {
        self.castle.is_some()
    }

    #[inline(always)]
    pub const fn is_en_passant(&self) -> bool {
        matches!(self.kind, MoveKind::EnPassant)
    }

    /// Captures and moves by irreversible kinds can never be undone.
    #[inline(always)]
    pub const fn is_irreversible(&self) -> bool {
        self.is_capture() || self.piece.kind().is_irreversible()
    }

    /// Whether this castles with the `K`/`k` flag.
    pub fn is_king_castle(&self) -> bool {
        self.castle_flag().is_some_and(|f| f.is_king_side())
    }

    /// Whether this castles with the `Q`/`q` flag.
    pub fn is_queen_castle(&self) -> bool {
        self.castle_flag().is_some_and(|f| !f.is_king_side())
    }

    fn castle_flag(&self) -> Option<CastleFlag> {
        self.castle().and_then(Castle::flag)
    }

    /// En passant square created by this move.
    #[inline(always)]
    pub const fn en_passant(&self) -> Option<Square> {
        match self.kind {
            MoveKind::DoublePawn => self.from.dy(self.color().move_dir()),
            _ => None,
        }
    }

    /// Numeric code of this move: `from * size + to`.
    ///
    /// Promotions into different pieces share a code.
    #[inline(always)]
    pub const fn code(&self) -> usize {
        self.from.id() * self.from.board().size() + self.to.id()
    }

    /// Applies this move to `position`.
    pub fn mutate(&self, position: &mut Position) {
        if let Some((castle, rook)) = self.castle {
            position.take(castle.king_from());
            position.take(castle.rook_from());
            position.put(castle.king_to(), self.piece);
            position.put(castle.rook_to(), rook);
            return;
        }

        if let Some(Promotion::Chosen(piece)) = self.promotion {
            position.put(self.to, piece);
            return;
        }

        if let Some(at) = self.captured_at() {
            position.take(at);
        }
        position.take(self.from);
        position.put(self.to, self.promote_to().unwrap_or(self.piece));
    }

    /// Whether this move would leave its own side in check.
    pub fn is_check(&self, position: &Position) -> bool {
        let mut position = position.clone();
        self.mutate(&mut position);
        position.is_check(self.color())
    }

    /// Whether this move fits every constraint of `query`.
    pub fn matches(&self, query: &MoveQuery) -> bool {
        if query
            .piece
            .as_deref()
            .is_some_and(|letter| letter != self.piece.move_letter())
        {
            return false;
        }
        if query.from.is_some_and(|sq| sq != self.from)
            || query.to.is_some_and(|sq| sq != self.to)
            || query.from_file.is_some_and(|file| file != self.from.file())
            || query.from_rank.is_some_and(|rank| rank != self.from.rank())
        {
            return false;
        }

        match (&query.promote_to, self.promote_to()) {
            (Some(letter), Some(piece)) if letter != piece.move_letter() => return false,
            (Some(_), None) | (None, Some(_)) => return false,
            _ => {}
        }

        if query.king_castle && !self.is_king_castle() {
            return false;
        }
        !query.queen_castle || self.is_queen_castle()
    }

    /// Whether `other` describes the same move, ignoring disambiguation hints.
    pub fn same(&self, other: &Self) -> bool {
        self.with_hint(Disambiguation::None) == other.with_hint(Disambiguation::None)
    }

    fn from_hint(&self) -> String {
        if self.is_capture() && self.piece.kind().is_pawn() {
            return self.from.file().name();
        }
        match self.hint {
            Disambiguation::None => String::new(),
            Disambiguation::File => self.from.file().name(),
            Disambiguation::Rank => self.from.rank().name(),
            Disambiguation::Full => self.from.name(),
        }
    }

    fn capture_marker(&self) -> &'static str {
        if self.is_capture() {
            "x"
        } else if self.hint == Disambiguation::File && self.to.board().max_file_len() > 1 {
            "-"
        } else {
            ""
        }
    }

    /// Standard algebraic notation, without check markers.
    pub fn san(&self) -> String {
        if self.is_king_castle() {
            return String::from("O-O");
        }
        if self.is_queen_castle() {
            return String::from("O-O-O");
        }

        let promotion = self
            .promote_to()
            .map(|piece| format!("={}", piece.move_letter()))
            .unwrap_or_default();

        format!(
            "{}{}{}{}{promotion}",
            self.piece.move_letter(),
            self.from_hint(),
            self.capture_marker(),
            self.to
        )
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.san())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:?} {}{}{})",
            self.san(),
            self.kind,
            self.from,
            self.to,
            match self.promotion {
                Some(Promotion::Pending) => String::from(" pending"),
                _ => String::new(),
            }
        )
    }
}

/// A partial description of a move, as parsed from SAN or ICCF text.
///
/// Unset fields match anything, except `promote_to`: a query without one never matches a move
/// that promotes. The `capture`, `check`, `checkmate` and `en_passant` flags only record what the
/// text said and take no part in matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveQuery {
    /// Move letter of the piece; empty for pawns.
    pub piece: Option<String>,
    pub from: Option<Square>,
    pub to: Option<Square>,
    pub from_file: Option<File>,
    pub from_rank: Option<Rank>,
    /// Move letter of the promotion piece.
    pub promote_to: Option<String>,
    pub king_castle: bool,
    pub queen_castle: bool,
    pub capture: bool,
    pub check: bool,
    pub checkmate: bool,
    pub en_passant: bool,
}

/// Anything that can pick a move out of a [`MoveList`].
#[derive(Debug, Clone)]
pub enum MoveSelector<'a> {
    /// SAN, castling, or ICCF text.
    Text(&'a str),
    Query(MoveQuery),
    /// A [`Move::code`].
    Code(usize),
    Move(Move),
}

impl<'a> From<&'a str> for MoveSelector<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a String> for MoveSelector<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(value)
    }
}

impl From<MoveQuery> for MoveSelector<'_> {
    fn from(value: MoveQuery) -> Self {
        Self::Query(value)
    }
}

impl From<usize> for MoveSelector<'_> {
    fn from(value: usize) -> Self {
        Self::Code(value)
    }
}

impl From<Move> for MoveSelector<'_> {
    fn from(value: Move) -> Self {
        Self::Move(value)
    }
}

/// The legal moves of a state, with disambiguation hints assigned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveList {
    board: Board,
    moves: Vec<Move>,
}

impl MoveList {
    /// Wraps `moves`, computing how much of the origin square each one needs in SAN.
    ///
    /// Moves are grouped by piece letter, destination, and promotion letter. A move alone in its
    /// group needs no hint. Otherwise the file suffices when no other move of the group starts on
    /// the same file; failing that the rank, when no other starts on the same rank; failing both,
    /// the full square.
    pub fn new(board: Board, moves: Vec<Move>) -> Self {
        let key = |mv: &Move| {
            (
                mv.piece().move_letter(),
                mv.to(),
                mv.promote_to().map(|p| p.move_letter()),
            )
        };

        let mut groups: HashMap<_, Vec<usize>> = HashMap::new();
        for (i, mv) in moves.iter().enumerate() {
            groups.entry(key(mv)).or_default().push(i);
        }

        let mut hinted = moves;
        for indices in groups.values() {
            if indices.len() < 2 {
                continue;
            }

            let mut files: HashMap<usize, usize> = HashMap::new();
            let mut ranks: HashMap<usize, usize> = HashMap::new();
            for &i in indices {
                *files.entry(hinted[i].from().x()).or_default() += 1;
                *ranks.entry(hinted[i].from().y()).or_default() += 1;
            }

            for &i in indices {
                let from = hinted[i].from();
                let hint = if files[&from.x()] > 1 {
                    if ranks[&from.y()] > 1 {
                        Disambiguation::Full
                    } else {
                        Disambiguation::Rank
                    }
                } else {
                    Disambiguation::File
                };
                hinted[i] = hinted[i].with_hint(hint);
            }
        }

        Self {
            board,
            moves: hinted,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Move> {
        self.moves.iter()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    /// All moves picked by `selector`.
    pub fn search<'a>(&self, selector: impl Into<MoveSelector<'a>>) -> ChessResult<Vec<Move>> {
        let selected = match selector.into() {
            MoveSelector::Text(text) => {
                let query = parse_move(text, self.board)?;
                self.filter(|mv| mv.matches(&query))
            }
            MoveSelector::Query(query) => self.filter(|mv| mv.matches(&query)),
            MoveSelector::Code(code) => self.filter(|mv| mv.code() == code),
            MoveSelector::Move(other) => self.filter(|mv| mv.same(&other)),
        };
        Ok(selected)
    }

    fn filter(&self, mut predicate: impl FnMut(&Move) -> bool) -> Vec<Move> {
        self.moves.iter().filter(|mv| predicate(mv)).copied().collect()
    }

    /// The single move picked by `selector`.
    ///
    /// # Example
    /// ```
    /// # use xchess::{ChessError, Game};
    /// let mut game = Game::default();
    /// game.play().unwrap();
    /// let moves = game.moves();
    /// assert_eq!(moves.resolve("Nf3").unwrap().to_string(), "Nf3");
    /// assert_eq!(moves.resolve("e5"), Err(ChessError::MoveNotFound));
    /// let err = moves.resolve("e2-e9").unwrap_err();
    /// assert_eq!(err.to_string(), "Invalid move notation 'e2-e9'");
    /// ```
    pub fn resolve<'a>(&self, selector: impl Into<MoveSelector<'a>>) -> ChessResult<Move> {
        let mut found = self.search(selector)?;
        match found.len() {
            0 => Err(ChessError::MoveNotFound),
            1 => Ok(found.remove(0)),
            _ => Err(ChessError::AmbiguousMove),
        }
    }

    /// Whether `selector` picks at least one move. Malformed text picks nothing.
    pub fn has<'a>(&self, selector: impl Into<MoveSelector<'a>>) -> bool {
        self.search(selector).is_ok_and(|found| !found.is_empty())
    }

    /// Moves starting on `square`.
    pub fn of(&self, square: Square) -> Vec<Move> {
        self.filter(|mv| mv.from() == square)
    }

    /// Renders the board with the number of moves landing on each square.
    pub fn text(&self) -> String {
        let mut counts = vec![0usize; self.board.size()];
        for mv in &self.moves {
            counts[mv.to().id()] += 1;
        }
        self.board.text(|square| match counts[square.id()] {
            0 => None,
            n => Some(n.to_string()),
        })
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;
    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Board::default().parse_square(name).unwrap()
    }

    fn rook_pair(a: &str, b: &str, to: &str) -> MoveList {
        MoveList::new(
            Board::default(),
            vec![
                Move::quiet(Piece::WHITE_ROOK, sq(a), sq(to)),
                Move::quiet(Piece::WHITE_ROOK, sq(b), sq(to)),
            ],
        )
    }

    #[test]
    fn test_disambiguation() {
        let sans = |list: MoveList| list.iter().map(Move::san).collect::<Vec<_>>();

        assert_eq!(sans(rook_pair("a1", "h1", "d1")), ["Rad1", "Rhd1"]);
        assert_eq!(sans(rook_pair("a1", "a5", "a3")), ["R1a3", "R5a3"]);

        let list = MoveList::new(
            Board::default(),
            vec![
                Move::quiet(Piece::WHITE_QUEEN, sq("a1"), sq("b2")),
                Move::quiet(Piece::WHITE_QUEEN, sq("a3"), sq("b2")),
                Move::quiet(Piece::WHITE_QUEEN, sq("c1"), sq("b2")),
            ],
        );
        assert_eq!(sans(list), ["Qa1b2", "Q3b2", "Qcb2"]);

        // Pawn captures always carry their file
        let list = MoveList::new(
            Board::default(),
            vec![Move::capture(
                Piece::WHITE_PAWN,
                sq("e4"),
                sq("d5"),
                Piece::BLACK_PAWN,
            )],
        );
        assert_eq!(sans(list), ["exd5"]);
    }

    #[test]
    fn test_long_file_names_use_a_separator() {
        let board: Board = "30x8".parse().unwrap();
        let at = |name: &str| board.parse_square(name).unwrap();
        let list = MoveList::new(
            board,
            vec![
                Move::quiet(Piece::WHITE_ROOK, at("a1"), at("d1")),
                Move::quiet(Piece::WHITE_ROOK, at("aa1"), at("d1")),
            ],
        );
        let sans: Vec<_> = list.iter().map(Move::san).collect();
        assert_eq!(sans, ["Ra-d1", "Raa-d1"]);
    }

    #[test]
    fn test_mutate() {
        let mut position = Position::default();
        position.put(sq("e5"), Piece::WHITE_PAWN);
        position.put(sq("d5"), Piece::BLACK_PAWN);

        let ep = Move::en_passant_capture(
            Piece::WHITE_PAWN,
            sq("e5"),
            sq("d6"),
            Capture::new(Piece::BLACK_PAWN, sq("d5")),
        );
        ep.mutate(&mut position);
        assert_eq!(position.len(), 1);
        assert_eq!(position.get(sq("d6")), Some(Piece::WHITE_PAWN));
        assert_eq!(ep.san(), "exd6");
        assert!(ep.is_en_passant());
        assert!(ep.is_irreversible());
        assert_eq!(ep.en_passant(), None);
    }

    #[test]
    fn test_double_pawn_sets_en_passant() {
        let mv = Move::double_pawn(Piece::WHITE_PAWN, sq("e2"), sq("e4"));
        assert_eq!(mv.en_passant(), Some(sq("e3")));
        assert!(!mv.is_en_passant());

        let mv = Move::double_pawn(Piece::BLACK_PAWN, sq("d7"), sq("d5"));
        assert_eq!(mv.en_passant(), Some(sq("d6")));
    }

    #[test]
    fn test_castling_move() {
        let mut position = Position::default();
        position.put(sq("e1"), Piece::WHITE_KING);
        position.put(sq("h1"), Piece::WHITE_ROOK);

        let castle = Castle::new(sq("e1"), sq("g1"), sq("h1"), sq("f1")).unwrap();
        let mv = castle.to_move(&position).unwrap();
        // Explicit castles are written as plain king moves
        assert_eq!(mv.san(), "Kg1");
        assert!(!mv.is_irreversible());

        mv.mutate(&mut position);
        assert_eq!(position.get(sq("g1")), Some(Piece::WHITE_KING));
        assert_eq!(position.get(sq("f1")), Some(Piece::WHITE_ROOK));
        assert_eq!(position.len(), 2);
    }

    #[test]
    fn test_matches() {
        let mv = Move::quiet(Piece::WHITE_KNIGHT, sq("g1"), sq("f3"));
        let mut query = MoveQuery {
            piece: Some("N".into()),
            to: Some(sq("f3")),
            ..Default::default()
        };
        assert!(mv.matches(&query));

        query.from_file = Some(sq("g1").file());
        assert!(mv.matches(&query));

        query.from_rank = Some(sq("a2").rank());
        assert!(!mv.matches(&query));

        // A query without a promotion never selects a promoting move
        let push = Move::quiet(Piece::WHITE_PAWN, sq("a7"), sq("a8"));
        let query = MoveQuery {
            piece: Some(String::new()),
            to: Some(sq("a8")),
            ..Default::default()
        };
        assert!(push.pending_promotion().matches(&query));
        assert!(!push.with_promotion(Piece::WHITE_QUEEN).matches(&query));
    }

    #[test]
    fn test_code() {
        let mv = Move::quiet(Piece::WHITE_PAWN, sq("e2"), sq("e4"));
        let code: usize = 52 * 64 + 36;
        assert_eq!(mv.code(), code);
        let list = MoveList::new(Board::default(), vec![mv]);
        assert_eq!(list.resolve(code).unwrap(), mv);
        assert!(list.has(mv));
    }
}
