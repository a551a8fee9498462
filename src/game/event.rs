/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::SystemTime;

use crate::{ColorSet, GameResult, Move, MoveList, Nag, PlyRecord, Square, State, StateHash};

/// What happened in a [`GameEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventData {
    /// The game left setup. Always the first event, with ply id `0`.
    Start,

    /// A move was played and the turn passed.
    Move(Move),

    /// A pawn reached the last rank and waits for [`crate::Game::promote`].
    ///
    /// The pawn already stands on its destination; the side to move and the counters are those of
    /// the ply before.
    Promotion(Move),

    /// The game ended for a reason other than the position itself, or a draw was claimed.
    GameOver,

    /// A draw was offered.
    DrawOffer(ColorSet),

    Nag(Nag),

    Comment(String),
}

impl EventData {
    /// Short name of the event type.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Move(_) => "move",
            Self::Promotion(_) => "promotion",
            Self::GameOver => "gameover",
            Self::DrawOffer(_) => "draw-offer",
            Self::Nag(_) => "nag",
            Self::Comment(_) => "comment",
        }
    }
}

/// What the rules decided about a ply, stored alongside its state.
#[derive(Debug, Clone)]
pub(crate) struct PlyData {
    pub(crate) moves: MoveList,
    pub(crate) checks: Vec<Square>,
    pub(crate) hash: StateHash,
    pub(crate) repetitions: u32,
    pub(crate) dead_position: bool,
    pub(crate) irreversible: bool,
    /// The ply that was played from here most recently, if any.
    pub(crate) next: Option<usize>,
}

/// An entry in a game's history.
///
/// Events live in the game's arena and refer to each other by index. Every event has an event id,
/// one more than the event before it. Plies ([`EventData::Start`] and [`EventData::Move`]) also
/// advance the ply id; every other event shares the ply id of the ply it follows.
#[derive(Debug, Clone)]
pub struct GameEvent {
    pub(crate) index: usize,
    pub(crate) event_id: usize,
    pub(crate) ply_id: usize,
    pub(crate) time: SystemTime,
    pub(crate) data: EventData,
    pub(crate) result: GameResult,
    pub(crate) draw_offer: ColorSet,

    pub(crate) prev_event: Option<usize>,
    pub(crate) next_event: Option<usize>,

    /// The ply before this one. Only set on [`EventData::Move`] events.
    pub(crate) prev_ply: Option<usize>,
    /// The state event in force: the event itself for states, the state annotated for meta events.
    pub(crate) state_index: usize,
    /// The ply in force. A pending promotion belongs to the ply it was played from.
    pub(crate) ply_index: usize,

    pub(crate) state: Option<State>,
    pub(crate) ply: Option<PlyData>,
}

impl GameEvent {
    /// Position of this event in [`crate::Game::event`].
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[inline(always)]
    pub const fn event_id(&self) -> usize {
        self.event_id
    }

    #[inline(always)]
    pub const fn ply_id(&self) -> usize {
        self.ply_id
    }

    /// When the event was recorded.
    #[inline(always)]
    pub const fn time(&self) -> SystemTime {
        self.time
    }

    #[inline(always)]
    pub const fn data(&self) -> &EventData {
        &self.data
    }

    #[inline(always)]
    pub const fn kind(&self) -> &'static str {
        self.data.kind()
    }

    #[inline(always)]
    pub const fn result(&self) -> GameResult {
        self.result
    }

    /// Colors with a draw offer outstanding.
    #[inline(always)]
    pub const fn draw_offer(&self) -> ColorSet {
        self.draw_offer
    }

    #[inline(always)]
    pub const fn prev_event(&self) -> Option<usize> {
        self.prev_event
    }

    #[inline(always)]
    pub const fn next_event(&self) -> Option<usize> {
        self.next_event
    }

    /// The state this event carries. Meta events carry none.
    #[inline(always)]
    pub const fn state(&self) -> Option<&State> {
        self.state.as_ref()
    }

    /// The move of a [`EventData::Move`] or [`EventData::Promotion`] event.
    pub const fn last_move(&self) -> Option<&Move> {
        match &self.data {
            EventData::Move(mv) | EventData::Promotion(mv) => Some(mv),
            _ => None,
        }
    }

    pub const fn nag(&self) -> Option<Nag> {
        match &self.data {
            EventData::Nag(nag) => Some(*nag),
            _ => None,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match &self.data {
            EventData::Comment(text) => Some(text),
            _ => None,
        }
    }

    #[inline(always)]
    pub const fn is_state(&self) -> bool {
        self.state.is_some()
    }

    #[inline(always)]
    pub const fn is_ply(&self) -> bool {
        self.ply.is_some()
    }

    #[inline(always)]
    pub const fn is_promotion(&self) -> bool {
        matches!(self.data, EventData::Promotion(_))
    }

    #[inline(always)]
    pub const fn is_meta(&self) -> bool {
        !self.is_state()
    }

    /// Whether a move may be played from this event. Only a pending promotion blocks moves.
    #[inline(always)]
    pub const fn can_move(&self) -> bool {
        !self.is_promotion()
    }

    /// Whether a meta event may follow this event.
    #[inline(always)]
    pub const fn can_meta(&self) -> bool {
        !self.is_promotion()
    }

    /// Whether this ply cannot be repeated by any later one.
    pub fn is_irreversible(&self) -> bool {
        self.ply.as_ref().is_some_and(|ply| ply.irreversible)
    }

    #[inline(always)]
    pub fn is_game_over(&self) -> bool {
        self.result.is_game_over()
    }

    /// The ply played after this one, for plies.
    pub(crate) fn next_ply(&self) -> Option<usize> {
        self.ply.as_ref().and_then(|ply| ply.next)
    }

    pub(crate) fn ply_record(&self) -> Option<PlyRecord> {
        self.ply.as_ref().map(|ply| PlyRecord {
            hash: ply.hash,
            irreversible: ply.irreversible,
            repetitions: ply.repetitions,
        })
    }
}
