/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{Board, ChessError, ChessResult, MoveQuery};

/// Parses move text into a [`MoveQuery`].
///
/// Three notations are understood, tried in this order:
/// * castling, `O-O` / `O-O-O` (or with zeros), optionally followed by `+` or `#`
/// * SAN and long SAN, e.g. `Nf3`, `exd5`, `R1a3`, `Qa1xb2`, `e8=Q+`, `exd6 e.p.`; on boards with
///   multi-letter file names origin files may span several letters and should be separated from
///   the destination by `-` or `x`
/// * ICCF numeric notation, e.g. `52-54`
///
/// Anything else, including text naming squares that are not on `board`, is an
/// [`ChessError::InvalidMoveNotation`].
///
/// # Example
/// ```
/// # use xchess::{parse_move, Board};
/// let board = Board::default();
/// let query = parse_move("Nbxd7+", board).unwrap();
/// assert_eq!(query.piece.as_deref(), Some("N"));
/// assert_eq!(query.from_file.unwrap().name(), "b");
/// assert_eq!(query.to.unwrap().name(), "d7");
/// assert!(query.capture && query.check);
///
/// assert!(parse_move("O-O-O#", board).unwrap().queen_castle);
/// assert_eq!(parse_move("52-54", board).unwrap().from.unwrap().name(), "e2");
/// assert!(parse_move("Nz9", board).is_err());
/// ```
pub fn parse_move(text: &str, board: Board) -> ChessResult<MoveQuery> {
    let invalid = || ChessError::InvalidMoveNotation(text.to_string());

    if let Some(query) = parse_castling(text) {
        return Ok(query);
    }
    if let Some(query) = parse_san(text, board) {
        return query.map_err(|_| invalid());
    }
    if let Some(query) = parse_iccf(text, board) {
        return query.map_err(|_| invalid());
    }
    Err(invalid())
}

/// Splits a trailing `+` or `#` off `text`.
fn split_check(text: &str, query: &mut MoveQuery) -> usize {
    if text.ends_with('+') {
        query.check = true;
        text.len() - 1
    } else if text.ends_with('#') {
        query.checkmate = true;
        text.len() - 1
    } else {
        text.len()
    }
}

fn parse_castling(text: &str) -> Option<MoveQuery> {
    let mut query = MoveQuery::default();
    let end = split_check(text, &mut query);
    match &text[..end] {
        "O-O-O" | "0-0-0" => query.queen_castle = true,
        "O-O" | "0-0" => query.king_castle = true,
        _ => return None,
    }
    Some(query)
}

#[inline(always)]
fn is_file_char(c: char) -> bool {
    c.is_ascii_lowercase() && c != 'x'
}

/// Characters that can be part of a piece letter.
#[inline(always)]
fn is_letter_char(c: char) -> bool {
    !(c == '-' || c == '+' || c == '#' || c == '=' || c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// Length of the longest suffix of `s` made of characters matching `predicate`.
fn suffix_len(s: &str, predicate: impl Fn(char) -> bool) -> usize {
    s.chars()
        .rev()
        .take_while(|&c| predicate(c))
        .map(char::len_utf8)
        .sum()
}

/// Returns `None` if `text` does not have the shape of SAN, and an error if it does but names
/// squares that do not exist.
fn parse_san(text: &str, board: Board) -> Option<ChessResult<MoveQuery>> {
    let long = board.max_file_len() > 1;
    let mut query = MoveQuery::default();

    let mut rest = &text[..split_check(text, &mut query)];

    for marker in [" e.p.", "e.p."] {
        if let Some(stripped) = rest.strip_suffix(marker) {
            query.en_passant = true;
            rest = stripped;
            break;
        }
    }

    // Promotion: `=Q` or `/Q`
    let letter_len = suffix_len(rest, |c| is_letter_char(c) && c != '/');
    if letter_len > 0 {
        let (head, letter) = rest.split_at(rest.len() - letter_len);
        let head = head.strip_suffix('=').or_else(|| head.strip_suffix('/'))?;
        query.promote_to = Some(letter.to_string());
        rest = head;
    }

    // Piece letter
    let piece_len = rest.len() - rest.trim_start_matches(is_letter_char).len();
    let (piece, mut core) = rest.split_at(piece_len);
    query.piece = Some(piece.to_string());

    // Destination: file letters followed by a rank number
    let rank_len = suffix_len(core, |c| c.is_ascii_digit());
    let to_rank = &core[core.len() - rank_len..];
    if rank_len == 0 || to_rank.starts_with('0') {
        return None;
    }
    core = &core[..core.len() - rank_len];
    let file_len = match suffix_len(core, is_file_char) {
        0 => return None,
        n if long => n,
        _ => 1,
    };
    let to = &text[piece_len + core.len() - file_len..piece_len + core.len() + rank_len];
    core = &core[..core.len() - file_len];

    if let Some(head) = core.strip_suffix('x') {
        query.capture = true;
        core = head;
    } else if let Some(head) = core.strip_suffix('-') {
        core = head;
    }

    // Origin hints
    let from_rank_len = suffix_len(core, |c| c.is_ascii_digit());
    let (from_file, from_rank) = core.split_at(core.len() - from_rank_len);
    if from_rank.starts_with('0')
        || !from_file.chars().all(is_file_char)
        || (!long && from_file.len() > 1)
    {
        return None;
    }

    Some(fill_san(query, board, to, from_file, from_rank))
}

fn fill_san(
    mut query: MoveQuery,
    board: Board,
    to: &str,
    from_file: &str,
    from_rank: &str,
) -> ChessResult<MoveQuery> {
    query.to = Some(board.parse_square(to)?);
    match (from_file.is_empty(), from_rank.is_empty()) {
        (false, false) => {
            query.from = Some(board.parse_square(&format!("{from_file}{from_rank}"))?);
        }
        (false, true) => query.from_file = Some(board.parse_file(from_file)?),
        (true, false) => query.from_rank = Some(board.parse_rank(from_rank)?),
        (true, true) => {}
    }
    Ok(query)
}

fn parse_iccf(text: &str, board: Board) -> Option<ChessResult<MoveQuery>> {
    let (from, to) = text.split_once('-')?;
    let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !numeric(from) || !numeric(to) {
        return None;
    }

    let parse = || {
        Ok(MoveQuery {
            from: Some(board.parse_square(from)?),
            to: Some(board.parse_square(to)?),
            ..Default::default()
        })
    };
    Some(parse())
}
