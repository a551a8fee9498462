use std::{cell::RefCell, rc::Rc};

use xchess::{
    Bestiary, Board, ChessError, Color, Game, GameConfig, GameResult, Piece, FEN_STARTPOS,
};

fn started(fen: &str) -> Game {
    let mut game = Game::from_fen(fen).unwrap();
    game.play().unwrap();
    game
}

fn play_all(game: &mut Game, moves: &[&str]) {
    for mv in moves {
        game.make_move(*mv)
            .unwrap_or_else(|e| panic!("{mv} failed in {}: {e}", game.fen()));
    }
}

#[test]
fn test_scholars_mate() {
    let mut game = started(FEN_STARTPOS);
    play_all(&mut game, &["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7#"]);

    assert!(game.is_checkmate());
    assert_eq!(game.result(), GameResult::Checkmate(Color::White));
    assert_eq!(game.loser(), Some(Color::Black));
    assert_eq!(game.make_move("Ke7"), Err(ChessError::GameOver));
    assert_eq!(
        game.to_pgn().unwrap(),
        "1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7# 1-0"
    );

    // Stepping back reopens the game
    assert!(game.undo());
    assert!(!game.is_game_over());
    assert!(game.moves().has("Qxf7"));
}

#[test]
fn test_en_passant() {
    let mut game = started(FEN_STARTPOS);
    play_all(&mut game, &["e4", "a6", "e5", "d5"]);
    assert_eq!(
        game.fen(),
        "rnbqkbnr/1pp1pppp/p7/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3"
    );
    assert_eq!(game.en_passant().map(|sq| sq.name()).as_deref(), Some("d6"));

    play_all(&mut game, &["exd6"]);
    assert_eq!(
        game.fen(),
        "rnbqkbnr/1pp1pppp/p2P4/8/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 3"
    );
    assert!(game.last_move().unwrap().is_en_passant());
}

#[test]
fn test_fivefold_repetition_ends_the_game() {
    let mut game = started(FEN_STARTPOS);
    for _ in 0..3 {
        play_all(&mut game, &["Nc3", "Nc6", "Nb1", "Nb8"]);
    }
    assert_eq!(game.repetition_count(), 4);
    assert!(!game.is_game_over());

    play_all(&mut game, &["Nc3", "Nc6", "Nb1", "Nb8"]);
    assert_eq!(game.result(), GameResult::FivefoldRepetition);
    assert!(game.is_draw());
    assert_eq!(game.winner(), None);
}

#[test]
fn test_listeners() {
    let moves = Rc::new(RefCell::new(0));
    let overs = Rc::new(RefCell::new(0));
    let mut game = started(FEN_STARTPOS);

    let counter = Rc::clone(&moves);
    let id = game.on("move", move |_| *counter.borrow_mut() += 1);
    let counter = Rc::clone(&overs);
    game.once("gameover", move |_| *counter.borrow_mut() += 1);

    play_all(&mut game, &["f3", "e5"]);
    assert!(game.off(id));
    assert!(!game.off(id));
    play_all(&mut game, &["g4", "Qh4#"]);
    assert_eq!(*moves.borrow(), 2);
    assert_eq!(*overs.borrow(), 1);

    game.undo();
    play_all(&mut game, &["Qh4#"]);
    assert_eq!(*overs.borrow(), 1);
}

#[test]
fn test_fairy_pieces_on_a_wide_board() {
    let bestiary = Bestiary::compose(["chess", "amazon"]).unwrap();
    let config = GameConfig::default()
        .with_board(Board::new(10, 8).unwrap())
        .with_bestiary(bestiary);
    let mut game = Game::new(config).unwrap();
    game.set_fen("9k/10/10/10/4A5/10/K9/10 w - - 0 1").unwrap();
    game.play().unwrap();

    let e4 = game.board().parse_square("e4").unwrap();
    let from_e4 = game.moves().iter().filter(|mv| mv.from() == e4).count();
    // 9 along the rank, 7 along the file, 14 on the diagonals, and 8 leaps
    assert_eq!(from_e4, 38);

    let mv = game.make_move("Aj4+").unwrap();
    assert_eq!(mv.to().name(), "j4");
    assert!(game.is_check());
}

#[test]
fn test_trace_moves() {
    let game = Game::from_fen("8/8/8/8/8/8/8/N7 w - - 0 1").unwrap();
    let board = game.board();
    let sq = |name| board.parse_square(name).unwrap();

    let trace = game.trace_moves(sq("a1"), None);
    assert_eq!(trace.len(), 64);
    assert_eq!(trace.get(sq("a1")), Some(0));
    assert_eq!(trace.get(sq("b3")), Some(1));
    assert_eq!(trace.get(sq("b2")), Some(4));
    assert_eq!(trace.get(sq("h8")), Some(6));

    let trace = game.trace_moves(sq("a1"), Some(Piece::WHITE_ROOK));
    assert_eq!(trace.get(sq("h8")), Some(2));
}

#[test]
fn test_annotations_survive_navigation() {
    let mut game = started(FEN_STARTPOS);
    play_all(&mut game, &["d4", "Nf6"]);
    game.nag("?!".parse().unwrap()).unwrap();
    game.comment("Indian").unwrap();
    play_all(&mut game, &["c4"]);

    assert!(game.goto(0));
    assert!(game.end());
    assert_eq!(game.ply_id(), Some(3));
    assert_eq!(
        game.to_pgn().unwrap(),
        "1. d4 Nf6 $6 {Indian} 2. c4 *"
    );
}
