use xchess::{parse_pgn, write_pgn, ChessError, Color, Game, GameResult};

fn replay(source: &str) -> Game {
    let games = parse_pgn(source).unwrap();
    assert_eq!(games.len(), 1);
    Game::from_pgn(&games[0]).unwrap()
}

#[test]
fn test_seven_tag_roster_comes_first() {
    let game = replay("[Black \"B\"]\n[Opening \"King's pawn\"]\n[White \"W\"]\n\n1. e4 *");
    assert_eq!(
        game.to_pgn().unwrap(),
        "[White \"W\"]\n[Black \"B\"]\n[Opening \"King's pawn\"]\n\n1. e4 *"
    );
}

#[test]
fn test_setup_position() {
    let source = "[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/4P3/4K3 w - - 0 1\"]\n\n1. e4 Kd7 *";
    let game = replay(source);
    assert_eq!(game.fen(), "8/3k4/8/8/4P3/8/8/4K3 w - - 1 2");
    assert_eq!(game.to_pgn().unwrap(), source);
}

#[test]
fn test_variations_are_skipped() {
    let game = replay("1. e4 (1. d4 d5 (1... Nf6)) 1... e5 2. Nf3 {developing} *");
    assert_eq!(game.ply_id(), Some(3));
    assert_eq!(game.current().unwrap().comment(), Some("developing"));
    assert_eq!(game.to_pgn().unwrap(), "1. e4 e5 2. Nf3 {developing} *");
}

#[test]
fn test_suffixes_become_nags() {
    let game = replay("1. e4! e5? 2. Qh5?! Nc6 3. Bc4 Nf6?? 4. Qxf7# 1-0");
    assert_eq!(game.result(), GameResult::Checkmate(Color::White));
    assert_eq!(
        game.to_pgn().unwrap(),
        "1. e4 $1 e5 $2 2. Qh5 $6 Nc6 3. Bc4 Nf6 $4 4. Qxf7# 1-0"
    );
}

#[test]
fn test_many_games() {
    let source = "[Event \"Round 1\"]\n\n1. d4 d5 *\n\n[Event \"Round 2\"]\n\n1. c4 e5 *";
    let games = parse_pgn(source).unwrap();
    assert_eq!(write_pgn(&games).unwrap(), source);

    let replayed = games
        .iter()
        .map(|pgn| Game::from_pgn(pgn).and_then(|game| game.to_pgn()))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(replayed.join("\n\n"), source);
}

#[test]
fn test_bad_input() {
    let games = parse_pgn("1. e4 e5 2. Nf6 *").unwrap();
    assert_eq!(Game::from_pgn(&games[0]).unwrap_err(), ChessError::MoveNotFound);

    let games = parse_pgn("[FEN \"8/8/8\"]\n\n*").unwrap();
    assert!(Game::from_pgn(&games[0]).is_err());

    let source = "[White \"A\"]\n\n1. e4 {x";
    let Err(ChessError::PgnSyntax { line, column, .. }) = parse_pgn(source) else {
        panic!("expected a syntax error");
    };
    assert_eq!(line, 3);
    assert!(column > 1);
}
