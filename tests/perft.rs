use xchess::{Game, FEN_KIWIPETE, FEN_STARTPOS, PERFT_POSITIONS};

fn test_perft_fen_nodes(depth: usize, fen: &str, expected: u64) {
    let mut game = Game::from_fen(fen).unwrap();
    game.play().unwrap();
    let nodes = game.perft(depth);
    assert_eq!(nodes, expected, "Perft({depth}) failed on {fen}");
}

#[test]
fn test_known_positions() {
    for (fen, counts) in PERFT_POSITIONS {
        for (depth, expected) in counts.into_iter().enumerate().take(2) {
            test_perft_fen_nodes(depth + 1, fen, expected);
        }
    }
}

#[cfg(test)]
mod startpos_perft {
    use super::*;

    #[test]
    fn test_startpos_perft_1() {
        test_perft_fen_nodes(1, FEN_STARTPOS, 20);
    }

    #[test]
    fn test_startpos_perft_2() {
        test_perft_fen_nodes(2, FEN_STARTPOS, 400);
    }

    #[test]
    fn test_startpos_perft_3() {
        test_perft_fen_nodes(3, FEN_STARTPOS, 8902);
    }
}

#[cfg(test)]
mod kiwipete_perft {
    use super::*;

    #[test]
    fn test_kiwipete_perft_1() {
        test_perft_fen_nodes(1, FEN_KIWIPETE, 48);
    }

    #[test]
    fn test_kiwipete_perft_2() {
        test_perft_fen_nodes(2, FEN_KIWIPETE, 2039);
    }
}

#[cfg(test)]
mod promotion_perft {
    use crate::test_perft_fen_nodes;

    #[test]
    fn test_promotion_perft_1() {
        test_perft_fen_nodes(1, "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1", 24);
    }

    #[test]
    fn test_promotion_perft_2() {
        test_perft_fen_nodes(2, "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1", 496);
    }

    #[test]
    fn test_promotion_perft_3() {
        test_perft_fen_nodes(3, "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1", 9483);
    }
}

/// https://www.chessprogramming.net/perfect-perft/
#[cfg(test)]
mod special_perfts {
    use super::*;

    #[test]
    fn test_special_perft_promote_out_of_check() {
        test_perft_fen_nodes(1, "2K2r2/4P3/8/8/8/8/8/3k4 w - - 0 1", 11);
    }

    #[test]
    fn test_special_perft_self_stalemate() {
        test_perft_fen_nodes(1, "K1k5/8/P7/8/8/8/8/8 w - - 0 1", 2);
    }

    #[test]
    fn test_special_perft_promotion_next_to_king() {
        test_perft_fen_nodes(1, "8/k1P5/8/1K6/8/8/8/8 w - - 0 1", 10);
    }
}
