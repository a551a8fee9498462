/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{borrow::Cow, fmt, iter, rc::Rc, time::SystemTime};

use tracing::{debug, trace};

use crate::{
    parse_fen, perft, splitperft, Bestiary, Board, Castling, ChessError, ChessResult, Color,
    ColorSet, Emitter, Evaluation, GameResult, ListenerId, Move, MoveList, MoveSelector, Nag,
    Piece, Position, RuleEngine, SetupState, Signal, Square, State, StateHash, TagMap, TraceMap,
};

/// Game construction and configuration.
mod config;

/// Entries of the game history.
mod event;

pub use config::*;
pub use event::*;

/// A game of chess or of a chess variant, from its setup through every event played.
///
/// A game starts in setup, where the position and the other state fields can be edited freely.
/// [`Game::play`] freezes the setup into the first ply; from then on the game only grows by
/// appending events: moves, pending promotions, draw offers, NAGs, comments, and finally a game
/// over. Earlier events can be revisited with [`Game::undo`], [`Game::goto`] and friends; playing a
/// move from an earlier ply continues the game from there and the moves that followed it are no
/// longer reachable through [`Game::redo`].
///
/// Every change is announced as a [`Signal`] to the listeners registered with [`Game::on`].
///
/// # Example
/// ```
/// # use xchess::{Game, GameResult, Color};
/// let mut game = Game::default();
/// game.play().unwrap();
/// for san in ["f3", "e5", "g4", "Qh4#"] {
///     game.make_move(san).unwrap();
/// }
/// assert_eq!(game.result(), GameResult::Checkmate(Color::Black));
/// assert!(game.moves().is_empty());
///
/// game.undo();
/// assert_eq!(game.fen(), "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq g3 0 2");
/// ```
pub struct Game {
    board: Board,
    bestiary: Bestiary,
    rules: Rc<dyn RuleEngine>,
    tags: TagMap,
    setup: SetupState,
    events: Vec<GameEvent>,
    current: Option<usize>,
    last: Option<usize>,
    emitter: Emitter,
    /// Returned by [`Game::moves`] when no ply is current.
    no_moves: MoveList,
}

/// A snapshot of the current event, as returned by [`Game::stats`].
#[derive(Debug, Clone, PartialEq)]
pub struct GameStats {
    pub board: Board,
    pub bestiary: usize,
    pub tags: usize,
    pub time: Option<SystemTime>,
    pub event_id: usize,
    pub ply_id: Option<usize>,
    pub fen: String,
    pub color: Color,
    pub en_passant: Option<Square>,
    pub fullmove: u32,
    pub halfmove: u32,
    pub last_move: Option<Move>,
    pub moves: usize,
    pub check_squares: usize,
    pub is_check: bool,
    pub repetitions: u32,
    pub is_dead_position: bool,
    pub hash: Option<StateHash>,
    pub result: GameResult,
    pub is_setup: bool,
    pub is_promotion: bool,
    pub is_state: bool,
    pub is_ply: bool,
    pub can_move: bool,
    pub is_game_over: bool,
    pub is_irreversible: bool,
    pub winner: Option<Color>,
    pub loser: Option<Color>,
}

impl Game {
    /// Creates a game in setup from `config`.
    pub fn new(config: GameConfig) -> ChessResult<Self> {
        let setup = config.setup_state()?;
        Ok(Self::assemble(config, setup))
    }

    /// Creates a game in setup from a FEN string, on an 8x8 board with the chess bestiary.
    ///
    /// # Example
    /// ```
    /// # use xchess::Game;
    /// let game = Game::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
    /// assert!(game.is_setup());
    /// assert!(Game::from_fen("4k3/8/8 w").is_err());
    /// ```
    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        let config = GameConfig::default();
        let setup = parse_fen(fen, config.board, &config.bestiary)?;
        Ok(Self::assemble(config, setup))
    }

    /// Creates a game in setup, starting from where `game` currently stands.
    ///
    /// Board, bestiary, rules and tags are shared with `game`; listeners are not.
    pub fn from_game(game: &Self) -> Self {
        let setup = match game.state() {
            Some(state) => SetupState::from(state),
            None => game.setup.clone(),
        };
        Self::assemble(
            GameConfig {
                board: game.board,
                bestiary: game.bestiary.clone(),
                rules: Rc::clone(&game.rules),
                tags: game.tags.clone(),
                ..GameConfig::default()
            },
            setup,
        )
    }

    fn assemble(config: GameConfig, mut setup: SetupState) -> Self {
        setup.position_mut().drain_changes();
        Self {
            board: config.board,
            bestiary: config.bestiary,
            rules: config.rules,
            tags: config.tags,
            setup,
            events: Vec::new(),
            current: None,
            last: None,
            emitter: Emitter::default(),
            no_moves: MoveList::new(config.board, Vec::new()),
        }
    }

    /*----------------------------------------------------------------*/
    /* Configuration */

    #[inline(always)]
    pub const fn board(&self) -> Board {
        self.board
    }

    #[inline(always)]
    pub const fn bestiary(&self) -> &Bestiary {
        &self.bestiary
    }

    #[inline(always)]
    pub fn rules(&self) -> &dyn RuleEngine {
        &*self.rules
    }

    #[inline(always)]
    pub const fn tags(&self) -> &TagMap {
        &self.tags
    }

    #[inline(always)]
    pub fn tags_mut(&mut self) -> &mut TagMap {
        &mut self.tags
    }

    /*----------------------------------------------------------------*/
    /* Events */

    /// The event at `index` in the history arena.
    #[inline(always)]
    pub fn event(&self, index: usize) -> Option<&GameEvent> {
        self.events.get(index)
    }

    /// The current event, or `None` during setup.
    #[inline(always)]
    pub fn current(&self) -> Option<&GameEvent> {
        self.current.map(|i| &self.events[i])
    }

    /// The start event, or `None` during setup.
    #[inline(always)]
    pub fn first(&self) -> Option<&GameEvent> {
        self.events.first()
    }

    /// The most recently recorded event, or `None` during setup.
    #[inline(always)]
    pub fn last(&self) -> Option<&GameEvent> {
        self.last.map(|i| &self.events[i])
    }

    /// Event id of the current event; `0` during setup.
    pub fn event_id(&self) -> usize {
        self.current().map_or(0, GameEvent::event_id)
    }

    /// Ply id of the current event; `None` during setup.
    pub fn ply_id(&self) -> Option<usize> {
        self.current().map(GameEvent::ply_id)
    }

    /// When the current event was recorded.
    pub fn time(&self) -> Option<SystemTime> {
        self.current().map(GameEvent::time)
    }

    /// The state event in force.
    fn state_event(&self) -> Option<&GameEvent> {
        self.current().map(|event| &self.events[event.state_index])
    }

    fn ply_data(&self) -> Option<&PlyData> {
        self.state_event().and_then(|event| event.ply.as_ref())
    }

    /*----------------------------------------------------------------*/
    /* State */

    /// The editable setup. Only meaningful while [`Game::is_setup`].
    #[inline(always)]
    pub const fn setup(&self) -> &SetupState {
        &self.setup
    }

    /// The committed state in force, or `None` during setup.
    ///
    /// While a promotion is pending this is the staged state: the pawn stands on the last rank and
    /// the side to move has not changed yet.
    pub fn state(&self) -> Option<&State> {
        self.state_event().and_then(GameEvent::state)
    }

    /// The state in force, freezing the setup if the game has not started.
    fn current_state(&self) -> Cow<'_, State> {
        match self.state() {
            Some(state) => Cow::Borrowed(state),
            None => Cow::Owned(self.setup.freeze()),
        }
    }

    pub fn fen(&self) -> String {
        match self.state() {
            Some(state) => state.fen(),
            None => self.setup.fen(),
        }
    }

    pub fn position(&self) -> &Position {
        match self.state() {
            Some(state) => &**state.position(),
            None => &**self.setup.position(),
        }
    }

    /// The side to move.
    pub fn color(&self) -> Color {
        self.state().map_or(self.setup.color(), State::color)
    }

    /// Castles available. During setup, those the setup flags resolve to.
    pub fn castling(&self) -> Castling {
        match self.state() {
            Some(state) => state.castling().clone(),
            None => self.setup.prepare_castling(),
        }
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.state().map_or(self.setup.en_passant(), State::en_passant)
    }

    pub fn fullmove(&self) -> u32 {
        self.state().map_or(self.setup.fullmove(), State::fullmove)
    }

    pub fn halfmove(&self) -> u32 {
        self.state().map_or(self.setup.halfmove(), State::halfmove)
    }

    /// The move that led to the state in force.
    pub fn last_move(&self) -> Option<Move> {
        self.state_event().and_then(GameEvent::last_move).copied()
    }

    /// Legal moves of the current ply. Empty during setup and while a promotion is pending.
    pub fn moves(&self) -> &MoveList {
        self.ply_data().map_or(&self.no_moves, |ply| &ply.moves)
    }

    /// Squares of the side to move's royal pieces that are in check.
    pub fn check_squares(&self) -> &[Square] {
        self.ply_data().map_or(&[], |ply| &ply.checks)
    }

    pub fn is_check(&self) -> bool {
        !self.check_squares().is_empty()
    }

    /// How many times the current position has occurred since the last irreversible ply.
    pub fn repetition_count(&self) -> u32 {
        self.ply_data().map_or(1, |ply| ply.repetitions)
    }

    pub fn is_dead_position(&self) -> bool {
        self.ply_data().is_some_and(|ply| ply.dead_position)
    }

    pub fn hash(&self) -> Option<StateHash> {
        self.ply_data().map(|ply| ply.hash)
    }

    /// Colors with a draw offer outstanding.
    pub fn draw_offer(&self) -> ColorSet {
        self.current().map_or(ColorSet::EMPTY, GameEvent::draw_offer)
    }

    pub fn result(&self) -> GameResult {
        self.current().map_or(GameResult::NoResult, GameEvent::result)
    }

    /// Human-readable reason of the result.
    pub fn reason(&self) -> &'static str {
        self.result().reason()
    }

    #[inline(always)]
    pub fn is_setup(&self) -> bool {
        self.current.is_none()
    }

    pub fn is_promotion(&self) -> bool {
        self.current().is_some_and(GameEvent::is_promotion)
    }

    pub fn is_state(&self) -> bool {
        self.current().map_or(true, GameEvent::is_state)
    }

    pub fn is_meta(&self) -> bool {
        self.current().is_some_and(GameEvent::is_meta)
    }

    pub fn is_ply(&self) -> bool {
        self.current().is_some_and(GameEvent::is_ply)
    }

    pub fn can_move(&self) -> bool {
        self.current().is_some_and(GameEvent::can_move)
    }

    pub fn can_meta(&self) -> bool {
        self.current().is_some_and(GameEvent::can_meta)
    }

    pub fn is_irreversible(&self) -> bool {
        self.state_event().is_some_and(GameEvent::is_irreversible)
    }

    pub fn is_game_over(&self) -> bool {
        self.result().is_game_over()
    }

    pub fn is_win(&self) -> bool {
        self.result().is_win()
    }

    pub fn is_draw(&self) -> bool {
        self.result().is_draw()
    }

    pub fn is_checkmate(&self) -> bool {
        self.result().is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.result().is_stalemate()
    }

    pub fn winner(&self) -> Option<Color> {
        self.result().winner()
    }

    pub fn loser(&self) -> Option<Color> {
        self.result().loser()
    }

    /// A snapshot of everything known about the current event.
    pub fn stats(&self) -> GameStats {
        let result = self.result();
        GameStats {
            board: self.board,
            bestiary: self.bestiary.len(),
            tags: self.tags.len(),
            time: self.time(),
            event_id: self.event_id(),
            ply_id: self.ply_id(),
            fen: self.fen(),
            color: self.color(),
            en_passant: self.en_passant(),
            fullmove: self.fullmove(),
            halfmove: self.halfmove(),
            last_move: self.last_move(),
            moves: self.moves().len(),
            check_squares: self.check_squares().len(),
            is_check: self.is_check(),
            repetitions: self.repetition_count(),
            is_dead_position: self.is_dead_position(),
            hash: self.hash(),
            result,
            is_setup: self.is_setup(),
            is_promotion: self.is_promotion(),
            is_state: self.is_state(),
            is_ply: self.is_ply(),
            can_move: self.can_move(),
            is_game_over: result.is_game_over(),
            is_irreversible: self.is_irreversible(),
            winner: result.winner(),
            loser: result.loser(),
        }
    }

    /// Distances at which `piece` (by default the one on `square`) could reach every square from
    /// `square`, if nothing else moved.
    pub fn trace_moves(&self, square: Square, piece: Option<Piece>) -> TraceMap {
        Position::trace_moves(&self.current_state(), &self.bestiary, square, piece)
    }

    /// Number of leaf nodes of the legal move tree below the state in force, `depth` plies deep.
    pub fn perft(&self, depth: usize) -> u64 {
        perft(&self.current_state(), &*self.rules, &self.bestiary, depth)
    }

    /// Like [`Game::perft`], printing the count below each root move.
    pub fn splitperft(&self, depth: usize) -> u64 {
        splitperft(&self.current_state(), &*self.rules, &self.bestiary, depth)
    }

    /*----------------------------------------------------------------*/
    /* Signals */

    /// Calls `callback` for every signal of `kind`, such as `"move"` or `"gameover"`.
    pub fn on(&mut self, kind: &str, callback: impl FnMut(&Signal) + 'static) -> ListenerId {
        self.emitter.on(kind, callback)
    }

    /// Calls `callback` for the next signal of `kind` only.
    pub fn once(&mut self, kind: &str, callback: impl FnMut(&Signal) + 'static) -> ListenerId {
        self.emitter.once(kind, callback)
    }

    /// Calls `callback` for every signal.
    pub fn subscribe(&mut self, callback: impl FnMut(&Signal) + 'static) -> ListenerId {
        self.emitter.subscribe(callback)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.emitter.off(id)
    }

    fn emit(&mut self, signal: Signal) {
        trace!("signal: {signal}");
        self.emitter.emit(&signal);
    }

    /*----------------------------------------------------------------*/
    /* Setup */

    /// Edits the setup through `edit`, then announces the position changes it made and, if
    /// anything changed at all, a `change` signal.
    ///
    /// # Example
    /// ```
    /// # use xchess::{Color, Game, Piece};
    /// let mut game = Game::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").unwrap();
    /// let e1 = game.board().parse_square("e1").unwrap();
    /// game.edit(|setup| {
    ///     setup.position_mut().set(e1, Piece::WHITE_KING);
    ///     setup.set_color(Color::Black);
    /// })
    /// .unwrap();
    /// assert_eq!(game.fen(), "8/8/8/8/8/8/8/4K3 b - - 0 1");
    ///
    /// game.play().unwrap();
    /// assert!(game.edit(|setup| setup.set_halfmove(3)).is_err());
    /// ```
    pub fn edit<T>(&mut self, edit: impl FnOnce(&mut SetupState) -> T) -> ChessResult<T> {
        if !self.is_setup() {
            return Err(ChessError::EditLocked);
        }

        let before = self.setup.fen();
        let value = edit(&mut self.setup);
        let changes = self.setup.position_mut().drain_changes();

        for change in changes {
            self.emit(Signal::from(change));
        }
        let after = self.setup.fen();
        if after != before {
            debug!("setup: {after}");
            self.emit(Signal::Change);
        }
        Ok(value)
    }

    /// Replaces the whole setup with a FEN string.
    pub fn set_fen(&mut self, fen: &str) -> ChessResult<()> {
        if !self.is_setup() {
            return Err(ChessError::EditLocked);
        }
        let parsed = parse_fen(fen, self.board, &self.bestiary)?;
        self.edit(|setup| {
            setup.position_mut().set_all(parsed.position().iter());
            setup.set_color(parsed.color());
            setup.set_castling(parsed.castling().clone());
            setup.set_en_passant(parsed.en_passant());
            setup.set_halfmove(parsed.halfmove());
            setup.set_fullmove(parsed.fullmove())
        })?
        .map(drop)
    }

    /// Places `piece` on `square` in the setup.
    pub fn put(&mut self, square: Square, piece: Piece) -> ChessResult<()> {
        self.bestiary.check(piece, None)?;
        self.edit(|setup| setup.position_mut().set(square, piece))
    }

    /// Removes the piece on `square` from the setup.
    pub fn remove(&mut self, square: Square) -> ChessResult<Option<Piece>> {
        self.edit(|setup| setup.position_mut().delete(square))
    }

    /*----------------------------------------------------------------*/
    /* Play */

    /// Leaves setup and starts the game from the setup state.
    ///
    /// Castling flags that name no castle in the position and an en passant square no pawn could
    /// have passed are dropped. Fails with [`ChessError::EditLocked`] if the game already started.
    pub fn play(&mut self) -> ChessResult<()> {
        if !self.is_setup() {
            return Err(ChessError::EditLocked);
        }

        let state = self.setup.freeze();
        debug!("play: {}", state.fen());
        let event = self.new_ply(EventData::Start, None, state, true);
        self.events.push(event);
        self.current = Some(0);
        self.last = Some(0);
        self.trigger(0);
        Ok(())
    }

    /// Plays the legal move picked by `selector`: SAN or ICCF text, a [`crate::MoveQuery`], a move
    /// code, or a [`Move`].
    ///
    /// A move reaching the last rank without a promotion piece leaves the game waiting for
    /// [`Game::promote`].
    ///
    /// # Example
    /// ```
    /// # use xchess::{ChessError, Game};
    /// let mut game = Game::default();
    /// assert_eq!(game.make_move("e4"), Err(ChessError::MoveLocked));
    ///
    /// game.play().unwrap();
    /// let mv = game.make_move("Nf3").unwrap();
    /// assert_eq!(mv.to_string(), "Nf3");
    /// assert_eq!(game.make_move("Nf3"), Err(ChessError::MoveNotFound));
    /// ```
    pub fn make_move<'a>(&mut self, selector: impl Into<MoveSelector<'a>>) -> ChessResult<Move> {
        let Some(current) = self.current.filter(|_| self.can_move()) else {
            return Err(ChessError::MoveLocked);
        };
        if self.is_game_over() {
            return Err(ChessError::GameOver);
        }

        let mv = self.moves().resolve(selector)?;
        let from = self.events[current].ply_index;
        let Some(state) = self.events[from].state.as_ref() else {
            return Err(ChessError::MoveLocked);
        };

        if mv.is_pending_promotion() {
            let staged = state.stage(&mv);
            debug!("move: {mv} (promotion pending)");
            let event = self.new_event(current, EventData::Promotion(mv), Some(staged));
            self.push(event);
        } else {
            let next = state.play(&mv);
            let irreversible = Self::is_barrier(state, &next, &mv);
            debug!("move: {mv}");
            self.push_ply(from, mv, next, irreversible);
        }
        Ok(mv)
    }

    /// Finishes a pending promotion with the piece named by `piece`: an id, move letter or FEN
    /// letter of a kind the bestiary promotes to.
    ///
    /// # Example
    /// ```
    /// # use xchess::{ChessError, Game};
    /// let mut game = Game::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
    /// game.play().unwrap();
    /// assert_eq!(game.promote("Q"), Err(ChessError::PromoteLocked));
    ///
    /// game.make_move("a8").unwrap();
    /// assert!(game.is_promotion());
    /// assert_eq!(game.promote("K"), Err(ChessError::InvalidPromotionChoice));
    /// assert_eq!(game.promote("knight").unwrap().to_string(), "a8=N");
    /// assert_eq!(game.fen(), "N7/7k/8/8/8/8/8/K7 b - - 0 1");
    /// ```
    pub fn promote(&mut self, piece: &str) -> ChessResult<Move> {
        let Some(current) = self.current.filter(|_| self.is_promotion()) else {
            return Err(ChessError::PromoteLocked);
        };
        let event = &self.events[current];
        let (Some(pending), Some(staged)) = (event.last_move(), event.state.as_ref()) else {
            return Err(ChessError::PromoteLocked);
        };

        let piece = self.bestiary.piece(piece, Some(staged.color()))?;
        let mv = pending.promote(piece, &self.bestiary.promotes())?;

        let from = event.ply_index;
        let next = staged.play(&mv);
        let irreversible = match self.events[from].state.as_ref() {
            Some(state) => Self::is_barrier(state, &next, &mv),
            None => true,
        };
        debug!("promote: {mv}");
        self.push_ply(from, mv, next, irreversible);
        Ok(mv)
    }

    /// Ends the game with a win for `color`'s opponent.
    pub fn forfeit(&mut self, color: Color) -> ChessResult<()> {
        self.check_playing()?;
        self.game_over(GameResult::Forfeit(color.opponent()));
        Ok(())
    }

    /// `color` resigns. If the opponent has no material to mate with, the game is drawn instead.
    pub fn resign(&mut self, color: Color) -> ChessResult<()> {
        self.check_playing()?;
        let winner = color.opponent();
        let result = if self.rules.can_deliver_mate(self.position(), winner) {
            GameResult::Resignation(winner)
        } else {
            GameResult::DrawByResignation
        };
        self.game_over(result);
        Ok(())
    }

    /// The side to move ran out of time. If the opponent has no material to mate with, the game is
    /// drawn instead.
    pub fn flag_fall(&mut self) -> ChessResult<()> {
        self.check_playing()?;
        let winner = self.color().opponent();
        let result = if self.rules.can_deliver_mate(self.position(), winner) {
            GameResult::WinOnTime(winner)
        } else {
            GameResult::DrawOnTime
        };
        self.game_over(result);
        Ok(())
    }

    /// `color` offers or claims a draw.
    ///
    /// Accepting the opponent's outstanding offer draws by agreement. Otherwise a threefold
    /// repetition or fifty-move claim is granted if valid. Failing all of those the offer is
    /// recorded, unless one is already outstanding.
    ///
    /// # Example
    /// ```
    /// # use xchess::{Color, ColorSet, Game, GameResult};
    /// let mut game = Game::default();
    /// game.play().unwrap();
    /// game.draw(Color::White).unwrap();
    /// assert_eq!(game.draw_offer(), ColorSet::WHITE);
    ///
    /// game.draw(Color::Black).unwrap();
    /// assert_eq!(game.result(), GameResult::DrawByAgreement);
    /// ```
    pub fn draw(&mut self, color: Color) -> ChessResult<()> {
        self.check_playing()?;
        let offers = self.draw_offer();

        if offers.has_opponent_of(color) {
            self.game_over(GameResult::DrawByAgreement);
        } else if self.repetition_count() >= 3 {
            self.game_over(GameResult::ThreefoldRepetition);
        } else if self.halfmove() >= 100 {
            self.game_over(GameResult::FiftyMoves);
        } else if offers.is_empty() {
            let Some(current) = self.current.filter(|_| self.can_meta()) else {
                return Err(ChessError::MetaLocked);
            };
            debug!("draw offer: {color}");
            let offer = ColorSet::of(color);
            let mut event = self.new_event(current, EventData::DrawOffer(offer), None);
            event.draw_offer = offer;
            self.push(event);
        }
        Ok(())
    }

    /// Annotates the current event with `nag`.
    pub fn nag(&mut self, nag: Nag) -> ChessResult<()> {
        let current = self.meta_target()?;
        debug!("nag: {nag}");
        let event = self.new_event(current, EventData::Nag(nag), None);
        self.push(event);
        Ok(())
    }

    /// Annotates the current event with a comment.
    ///
    /// Comments may span lines but cannot contain `}`.
    pub fn comment(&mut self, text: impl Into<String>) -> ChessResult<()> {
        let text = text.into();
        if text.contains('}') {
            return Err(ChessError::InvalidComment);
        }
        let current = self.meta_target()?;
        debug!("comment: {text}");
        let event = self.new_event(current, EventData::Comment(text), None);
        self.push(event);
        Ok(())
    }

    fn check_playing(&self) -> ChessResult<()> {
        if self.is_setup() {
            return Err(ChessError::PlayLocked);
        }
        if self.is_game_over() {
            return Err(ChessError::GameOver);
        }
        Ok(())
    }

    fn meta_target(&self) -> ChessResult<usize> {
        self.current
            .filter(|_| self.can_meta())
            .ok_or(ChessError::MetaLocked)
    }

    fn game_over(&mut self, result: GameResult) {
        let Some(current) = self.current else {
            return;
        };
        debug!("game over: {result}");
        let mut event = self.new_event(current, EventData::GameOver, None);
        event.result = result;
        event.draw_offer = ColorSet::EMPTY;
        self.push(event);
    }

    /// Whether no later ply can repeat `next`: the move cannot be undone, or castling rights were
    /// lost with it.
    fn is_barrier(prev: &State, next: &State, mv: &Move) -> bool {
        mv.is_irreversible() || next.castling().len() < prev.castling().len()
    }

    /// A ply following `prev_ply`, evaluated by the rules.
    fn new_ply(
        &self,
        data: EventData,
        prev_ply: Option<usize>,
        state: State,
        irreversible: bool,
    ) -> GameEvent {
        let index = self.events.len();
        let prior = self.result();

        let mut history = iter::successors(prev_ply, |&i| self.events[i].prev_ply)
            .filter_map(|i| self.events[i].ply_record());
        let Evaluation {
            moves,
            checks,
            hash,
            repetitions,
            dead_position,
            result,
        } = self
            .rules
            .evaluate(&state, &self.bestiary, irreversible, &mut history, prior);

        GameEvent {
            index,
            event_id: self.event_id() + 1,
            ply_id: prev_ply.map_or(0, |i| self.events[i].ply_id + 1),
            time: SystemTime::now(),
            data,
            result,
            draw_offer: ColorSet::EMPTY,
            prev_event: self.current,
            next_event: None,
            prev_ply,
            state_index: index,
            ply_index: index,
            state: Some(state),
            ply: Some(PlyData {
                moves: MoveList::new(self.board, moves),
                checks,
                hash,
                repetitions,
                dead_position,
                irreversible,
                next: None,
            }),
        }
    }

    /// An event following `prev` that does not start a new ply.
    ///
    /// With a `state` the event is a state of its own (a pending promotion); without one it
    /// annotates the state of `prev` and inherits its result and draw offers.
    fn new_event(&self, prev: usize, data: EventData, state: Option<State>) -> GameEvent {
        let index = self.events.len();
        let before = &self.events[prev];
        let is_state = state.is_some();

        GameEvent {
            index,
            event_id: before.event_id + 1,
            ply_id: before.ply_id,
            time: SystemTime::now(),
            data,
            result: before.result,
            draw_offer: if is_state {
                ColorSet::EMPTY
            } else {
                before.draw_offer
            },
            prev_event: Some(prev),
            next_event: None,
            prev_ply: None,
            state_index: if is_state { index } else { before.state_index },
            ply_index: before.ply_index,
            state,
            ply: None,
        }
    }

    /// Records the ply reached by `mv` from the ply at `from`.
    fn push_ply(&mut self, from: usize, mv: Move, next: State, irreversible: bool) {
        let event = self.new_ply(EventData::Move(mv), Some(from), next, irreversible);
        let index = event.index;
        if let Some(ply) = self.events[from].ply.as_mut() {
            ply.next = Some(index);
        }
        self.push(event);
    }

    fn push(&mut self, event: GameEvent) {
        let index = event.index;
        if let Some(current) = self.current {
            self.events[current].next_event = Some(index);
        }
        self.events.push(event);
        self.current = Some(index);
        self.last = Some(index);

        self.emit(Signal::Transition(index));
        self.emit(Signal::Event(index));
        self.trigger(index);
    }

    /// Announces what the event at `index` did.
    fn trigger(&mut self, index: usize) {
        let event = &self.events[index];
        let mut signals = Vec::new();

        match &event.data {
            EventData::Start | EventData::Move(_) => {
                signals.push(Signal::State(index));
                signals.push(Signal::Ply(index));
                match &event.data {
                    EventData::Move(mv) => {
                        signals.push(Signal::Move(*mv));
                        signals.extend(Signal::for_move(mv));
                    }
                    _ => signals.push(Signal::Play(index)),
                }
                signals.extend(event.result.signals());

                if !event.is_game_over() {
                    let halfmove = event.state.as_ref().map_or(0, State::halfmove);
                    let repetitions = event.ply.as_ref().map_or(1, |ply| ply.repetitions);
                    let start = matches!(event.data, EventData::Start);
                    if (start && halfmove >= 100) || halfmove == 100 {
                        signals.push(Signal::FiftyMoves);
                    }
                    if (start && repetitions >= 3) || repetitions == 3 {
                        signals.push(Signal::ThreefoldRepetition);
                    }
                }
            }
            EventData::Promotion(mv) => {
                signals.push(Signal::State(index));
                signals.push(Signal::Promotion(self.bestiary.promotes()));
                signals.extend(Signal::for_move(mv));
            }
            EventData::GameOver => signals.extend(event.result.signals()),
            EventData::DrawOffer(offer) => signals.push(Signal::DrawOffer(*offer)),
            EventData::Nag(nag) => signals.push(Signal::Nag(*nag)),
            EventData::Comment(text) => signals.push(Signal::Comment(text.clone())),
        }

        for signal in signals {
            self.emit(signal);
        }
    }

    /*----------------------------------------------------------------*/
    /* Navigation */

    /// The ply [`Game::undo`] goes to from the event at `index`.
    fn prev_of(&self, index: usize) -> Option<usize> {
        let event = &self.events[index];
        if event.is_ply() {
            event.prev_ply
        } else if event.is_promotion() {
            Some(event.ply_index)
        } else {
            self.prev_of(event.state_index)
        }
    }

    /// The ply [`Game::redo`] goes to from the event at `index`.
    fn next_of(&self, index: usize) -> Option<usize> {
        let event = &self.events[index];
        if event.is_ply() {
            event.next_ply()
        } else if event.is_promotion() {
            self.events[event.ply_index].next_ply()
        } else {
            self.next_of(event.state_index)
        }
    }

    fn seek(&mut self, target: Option<usize>) -> bool {
        let (Some(target), Some(current)) = (target, self.current) else {
            return false;
        };
        if target == current {
            return false;
        }

        let (state, ply) = {
            let event = &self.events[current];
            (event.state_index, event.ply_index)
        };
        self.current = Some(target);
        let event = &self.events[target];
        let (state_changed, ply_changed) = (event.state_index != state, event.ply_index != ply);
        debug!("seek: event {} (ply {})", event.event_id, event.ply_id);

        self.emit(Signal::Transition(target));
        self.emit(Signal::Seek(target));
        if state_changed {
            self.emit(Signal::SeekState(target));
        }
        if ply_changed {
            self.emit(Signal::SeekPly(target));
        }
        true
    }

    fn search_ply(&self, ply_id: usize) -> Option<usize> {
        let (first, last, current) = (self.first()?, self.last()?, self.current()?);
        if ply_id <= first.ply_id {
            return Some(first.ply_index);
        }
        if ply_id >= last.ply_id {
            return Some(last.ply_index);
        }

        let mut cursor = current.ply_index;
        while self.events[cursor].ply_id > ply_id {
            match self.events[cursor].prev_ply {
                Some(prev) => cursor = prev,
                None => break,
            }
        }
        while self.events[cursor].ply_id < ply_id {
            match self.events[cursor].next_ply() {
                Some(next) => cursor = next,
                None => break,
            }
        }
        Some(cursor)
    }

    fn search_event(&self, event_id: usize) -> Option<usize> {
        let (first, last, current) = (self.first()?, self.last()?, self.current()?);
        if event_id <= first.event_id {
            return Some(first.index);
        }
        if event_id >= last.event_id {
            return Some(last.index);
        }

        let mut cursor = current.index;
        while self.events[cursor].event_id > event_id {
            match self.events[cursor].prev_event {
                Some(prev) => cursor = prev,
                None => break,
            }
        }
        while self.events[cursor].event_id < event_id {
            match self.events[cursor].next_event {
                Some(next) => cursor = next,
                None => break,
            }
        }
        Some(cursor)
    }

    /// Steps back to the previous ply. Returns `false` if there is none.
    pub fn undo(&mut self) -> bool {
        let target = self.current.and_then(|i| self.prev_of(i));
        self.seek(target)
    }

    /// Steps forward to the ply last played from the current one.
    pub fn redo(&mut self) -> bool {
        let target = self.current.and_then(|i| self.next_of(i));
        self.seek(target)
    }

    /// Moves `offset` plies away from the current one.
    pub fn go(&mut self, offset: isize) -> bool {
        match self.ply_id() {
            Some(ply_id) => self.goto(ply_id.saturating_add_signed(offset)),
            None => false,
        }
    }

    /// Goes to the ply with id `ply_id`, or the nearest end of the history.
    ///
    /// # Example
    /// ```
    /// # use xchess::Game;
    /// let mut game = Game::default();
    /// game.play().unwrap();
    /// for san in ["e4", "e5", "Nf3", "Nc6"] {
    ///     game.make_move(san).unwrap();
    /// }
    /// assert!(game.goto(2));
    /// assert_eq!(game.last_move().unwrap().to_string(), "e5");
    /// assert!(game.go(-5));
    /// assert_eq!(game.ply_id(), Some(0));
    /// assert!(game.end());
    /// assert_eq!(game.ply_id(), Some(4));
    /// ```
    pub fn goto(&mut self, ply_id: usize) -> bool {
        let target = self.search_ply(ply_id);
        self.seek(target)
    }

    /// Goes back to the start event.
    pub fn rewind(&mut self) -> bool {
        let target = self.first().map(GameEvent::index);
        self.seek(target)
    }

    /// Goes to the most recently recorded event.
    pub fn end(&mut self) -> bool {
        self.seek(self.last)
    }

    /// Steps back one event, meta events included.
    pub fn undo_event(&mut self) -> bool {
        let target = self.current().and_then(GameEvent::prev_event);
        self.seek(target)
    }

    /// Steps forward one event, meta events included.
    pub fn redo_event(&mut self) -> bool {
        let target = self.current().and_then(GameEvent::next_event);
        self.seek(target)
    }

    /// Moves `offset` events away from the current one.
    pub fn go_event(&mut self, offset: isize) -> bool {
        match self.current() {
            Some(event) => self.goto_event(event.event_id.saturating_add_signed(offset)),
            None => false,
        }
    }

    /// Goes to the event with id `event_id`, or the nearest end of the history.
    pub fn goto_event(&mut self, event_id: usize) -> bool {
        let target = self.search_event(event_id);
        self.seek(target)
    }

    /*----------------------------------------------------------------*/
    /* History */

    /// Every ply from the start, following the moves last played.
    pub fn log(&self) -> impl Iterator<Item = &GameEvent> + '_ {
        iter::successors(self.first(), move |event| {
            event.next_ply().map(|i| &self.events[i])
        })
    }

    /// Like [`Game::log`], without the start.
    pub fn move_log(&self) -> impl Iterator<Item = &GameEvent> + '_ {
        self.log().skip(1)
    }

    /// Every event from the start, following the events last recorded.
    pub fn events(&self) -> impl Iterator<Item = &GameEvent> + '_ {
        iter::successors(self.first(), move |event| {
            event.next_event.map(|i| &self.events[i])
        })
    }

    /// SAN of the move that led to the ply at `index`, with `+` or `#` when it checks or mates.
    pub fn san(&self, index: usize) -> Option<String> {
        let event = self.events.get(index)?;
        let EventData::Move(mv) = &event.data else {
            return None;
        };
        let suffix = if event.result.is_checkmate() {
            "#"
        } else if event.ply.as_ref().is_some_and(|ply| !ply.checks.is_empty()) {
            "+"
        } else {
            ""
        };
        Some(format!("{mv}{suffix}"))
    }
}

impl Default for Game {
    /// A game in setup with the standard chess starting position.
    fn default() -> Self {
        let config = GameConfig::standard();
        let setup = config
            .setup_state()
            .unwrap_or_else(|_| SetupState::new(config.board));
        Self::assemble(config, setup)
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.position())
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("fen", &self.fen())
            .field("event_id", &self.event_id())
            .field("ply_id", &self.ply_id())
            .field("result", &self.result())
            .field("events", &self.events.len())
            .finish()
    }
}
