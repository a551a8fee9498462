/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{Bestiary, Move, RuleEngine, State};

/// Legal moves of `state` as perft counts them: every promotion is counted once per piece it
/// promotes to, so the pending variant is skipped.
fn perft_moves(state: &State, rules: &dyn RuleEngine, bestiary: &Bestiary) -> Vec<Move> {
    let mut moves = rules.moves(state, bestiary);
    moves.retain(|mv| !mv.is_pending_promotion());
    moves
}

/// Perform a perft at the specified depth, collecting only data about the number of possible
/// positions (nodes).
///
/// This performs bulk counting, meaning that, at depth 1, it returns the number of available moves,
/// rather than making them, recursing again, and returning 1 for each terminal case.
/// If you do *not* want to use bulk counting, use [`perft_generic`].
///
/// # Example
/// ```
/// # use xchess::{perft, Bestiary, ChessRules, Game};
/// let mut game = Game::default();
/// game.play().unwrap();
/// let state = game.state().unwrap();
/// assert_eq!(perft(state, &ChessRules, &Bestiary::chess(), 2), 400);
/// ```
#[inline(always)]
pub fn perft(state: &State, rules: &dyn RuleEngine, bestiary: &Bestiary, depth: usize) -> u64 {
    perft_generic::<true, false>(state, rules, bestiary, depth)
}

/// Perform a splitperft at the specified depth, collecting only data about the number of possible
/// positions (nodes), and printing the number of nodes reachable after each move available at the
/// root node.
#[inline(always)]
pub fn splitperft(
    state: &State,
    rules: &dyn RuleEngine,
    bestiary: &Bestiary,
    depth: usize,
) -> u64 {
    perft_generic::<true, true>(state, rules, bestiary, depth)
}

/// Generic version of `perft` that allows you to specify whether to perform bulk counting and
/// splitperft.
///
/// If `BULK` is set to `true`, this will perform bulk counting.
/// If `SPLIT` is set to `true`, this will perform a splitperft.
pub fn perft_generic<const BULK: bool, const SPLIT: bool>(
    state: &State,
    rules: &dyn RuleEngine,
    bestiary: &Bestiary,
    depth: usize,
) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = perft_moves(state, rules, bestiary);
    if BULK && !SPLIT && depth == 1 {
        return moves.len() as u64;
    }

    moves.into_iter().fold(0, |nodes, mv| {
        let new_nodes =
            perft_generic::<BULK, false>(&state.play(&mv), rules, bestiary, depth - 1);

        if SPLIT {
            println!("{mv}\t{new_nodes}");
        }

        nodes + new_nodes
    })
}
