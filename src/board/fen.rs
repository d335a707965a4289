//! FEN parsing/formatting and coordinate move parsing.

use std::str::FromStr;

use super::error::{FenError, MoveParseError};
use super::state::Board;
use super::types::{CastlingRights, Color, Move, Piece, Square};

impl Board {
    /// Parse a FEN string. The halfmove clock and fullmove number are
    /// optional, as many sources omit them.
    pub fn try_from_fen(fen: &str) -> Result<Board, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        let mut board = Board::empty();

        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::WrongRankCount { found: ranks.len() });
        }
        // FEN lists rank 8 first.
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = (7 - i) as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as u8;
                } else {
                    let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                    let color = if c.is_ascii_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    if file >= 8 {
                        return Err(FenError::BadRankWidth {
                            rank: rank as usize,
                            files: file as usize + 1,
                        });
                    }
                    board.put_piece(color, piece, Square::new(rank, file));
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::BadRankWidth {
                    rank: rank as usize,
                    files: file as usize,
                });
            }
        }

        for color in Color::BOTH {
            let kings = board.piece_bb(color, Piece::King).popcount();
            if kings != 1 {
                return Err(FenError::BadKingCount {
                    color,
                    count: kings as usize,
                });
            }
        }

        board.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        let mut rights = CastlingRights::none();
        if parts[2] != "-" {
            for c in parts[2].chars() {
                match c {
                    'K' => rights.grant(Color::White, true),
                    'Q' => rights.grant(Color::White, false),
                    'k' => rights.grant(Color::Black, true),
                    'q' => rights.grant(Color::Black, false),
                    _ => return Err(FenError::InvalidCastling { char: c }),
                }
            }
        }
        board.castling_rights = rights;

        board.en_passant_target = match parts[3] {
            "-" => None,
            notation => Some(notation.parse().map_err(|_| FenError::InvalidEnPassant {
                found: notation.to_string(),
            })?),
        };

        board.halfmove_clock = parts.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);

        board.hash = board.calculate_hash();
        board.pawn_hash = board.calculate_pawn_hash();
        board.repetitions.increment(board.hash);
        Ok(board)
    }

    /// Format the position as FEN. The fullmove counter is not tracked and
    /// is emitted as 1.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                match self.piece_at(Square::new(rank, file)) {
                    Some((color, piece)) => {
                        if empty > 0 {
                            fen.push((b'0' + empty) as char);
                            empty = 0;
                        }
                        fen.push(piece.to_fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push((b'0' + empty) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(if self.side_to_move() == Color::White {
            'w'
        } else {
            'b'
        });

        fen.push(' ');
        let rights = self.castling_rights();
        if rights == CastlingRights::none() {
            fen.push('-');
        } else {
            for (color, kingside, c) in [
                (Color::White, true, 'K'),
                (Color::White, false, 'Q'),
                (Color::Black, true, 'k'),
                (Color::Black, false, 'q'),
            ] {
                if rights.has(color, kingside) {
                    fen.push(c);
                }
            }
        }

        fen.push(' ');
        match self.en_passant_target() {
            Some(sq) => fen.push_str(&sq.to_string()),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} 1", self.halfmove_clock()));
        fen
    }

    /// Parse a coordinate move like `e2e4` or `a7a8q` and match it against
    /// the legal moves of this position.
    pub fn parse_move(&mut self, notation: &str) -> Result<Move, MoveParseError> {
        if !(4..=5).contains(&notation.len()) {
            return Err(MoveParseError::InvalidLength {
                len: notation.len(),
            });
        }
        let from: Square = notation[0..2]
            .parse()
            .map_err(|_| MoveParseError::InvalidSquare {
                notation: notation.to_string(),
            })?;
        let to: Square = notation[2..4]
            .parse()
            .map_err(|_| MoveParseError::InvalidSquare {
                notation: notation.to_string(),
            })?;
        let promotion = match notation.as_bytes().get(4) {
            Some(&c) => {
                Some(Piece::from_char(c as char).ok_or(MoveParseError::InvalidPromotion {
                    char: c as char,
                })?)
            }
            None => None,
        };

        let legal = self.generate_moves();
        legal
            .iter()
            .copied()
            .find(|m| m.from() == from && m.to() == to && m.promotion_piece() == promotion)
            .ok_or(MoveParseError::IllegalMove {
                notation: notation.to_string(),
            })
    }
}

impl FromStr for Board {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::try_from_fen(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn start_position_round_trip() {
        let board: Board = STARTPOS.parse().unwrap();
        assert_eq!(board.hash(), Board::new().hash());
        assert_eq!(board.to_fen(), STARTPOS);
    }

    #[test]
    fn parses_side_castling_and_ep() {
        let board: Board = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
            .parse()
            .unwrap();
        assert_eq!(board.side_to_move(), Color::Black);
        assert_eq!(board.en_passant_target(), Some(Square::new(2, 4)));
        assert!(board.castling_rights().has(Color::Black, false));
    }

    #[test]
    fn parses_partial_rights_and_halfmove() {
        let board: Board = "r3k2r/8/8/8/8/8/8/R3K2R w Kq - 57 1".parse().unwrap();
        assert!(board.castling_rights().has(Color::White, true));
        assert!(!board.castling_rights().has(Color::White, false));
        assert!(board.castling_rights().has(Color::Black, false));
        assert_eq!(board.halfmove_clock(), 57);
    }

    #[test]
    fn rejects_malformed_fens() {
        assert!(matches!(
            Board::try_from_fen("8/8/8 w -"),
            Err(FenError::TooFewParts { .. })
        ));
        assert!(matches!(
            Board::try_from_fen("8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::WrongRankCount { .. })
        ));
        assert!(matches!(
            Board::try_from_fen("rnbqkbnr/ppzppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiece { .. })
        ));
        assert!(matches!(
            Board::try_from_fen("8/8/8/8/8/8/8/K7 w - - 0 1"),
            Err(FenError::BadKingCount { .. })
        ));
    }

    #[test]
    fn parse_move_accepts_legal_rejects_illegal() {
        let mut board = Board::new();
        let mv = board.parse_move("e2e4").unwrap();
        assert_eq!(mv.to_string(), "e2e4");
        assert!(board.parse_move("e2e5").is_err());
        assert!(board.parse_move("e2").is_err());
    }

    #[test]
    fn promotion_move_parsing() {
        let mut board: Board = "8/P7/8/8/8/8/8/K1k5 w - - 0 1".parse().unwrap();
        let mv = board.parse_move("a7a8q").unwrap();
        assert_eq!(mv.promotion_piece(), Some(Piece::Queen));
    }
}
