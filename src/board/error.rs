//! Error types for position and move text parsing.

use std::fmt;

/// FEN parsing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// Fewer than the four mandatory fields.
    TooFewParts { found: usize },
    /// Unknown piece letter in the placement field.
    InvalidPiece { char: char },
    /// Unknown castling letter.
    InvalidCastling { char: char },
    /// Side-to-move field was not 'w' or 'b'.
    InvalidSideToMove { found: String },
    /// Unparseable en-passant field.
    InvalidEnPassant { found: String },
    /// Placement field does not describe exactly eight ranks.
    WrongRankCount { found: usize },
    /// A rank describes more or fewer than eight files.
    BadRankWidth { rank: usize, files: usize },
    /// A side is missing a king or has more than one.
    BadKingCount { color: crate::board::Color, count: usize },
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::TooFewParts { found } => {
                write!(f, "FEN needs at least 4 fields, found {found}")
            }
            FenError::InvalidPiece { char } => {
                write!(f, "invalid piece character '{char}' in FEN")
            }
            FenError::InvalidCastling { char } => {
                write!(f, "invalid castling character '{char}' in FEN")
            }
            FenError::InvalidSideToMove { found } => {
                write!(f, "invalid side to move '{found}', expected 'w' or 'b'")
            }
            FenError::InvalidEnPassant { found } => {
                write!(f, "invalid en passant square '{found}'")
            }
            FenError::WrongRankCount { found } => {
                write!(f, "FEN placement has {found} ranks, expected 8")
            }
            FenError::BadRankWidth { rank, files } => {
                write!(f, "rank {rank} describes {files} files, expected 8")
            }
            FenError::BadKingCount { color, count } => {
                write!(f, "{color} has {count} kings, expected exactly 1")
            }
        }
    }
}

impl std::error::Error for FenError {}

/// Coordinate-move parsing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    /// Move text must be 4 or 5 characters.
    InvalidLength { len: usize },
    /// A square did not parse.
    InvalidSquare { notation: String },
    /// Unknown promotion letter.
    InvalidPromotion { char: char },
    /// The move does not match any legal move in the position.
    IllegalMove { notation: String },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::InvalidLength { len } => {
                write!(f, "move must be 4-5 characters, found {len}")
            }
            MoveParseError::InvalidSquare { notation } => {
                write!(f, "invalid square in '{notation}'")
            }
            MoveParseError::InvalidPromotion { char } => {
                write!(f, "invalid promotion piece '{char}'")
            }
            MoveParseError::IllegalMove { notation } => {
                write!(f, "move '{notation}' is not legal here")
            }
        }
    }
}

impl std::error::Error for MoveParseError {}

/// Square notation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SquareError {
    RankOutOfBounds { rank: usize },
    FileOutOfBounds { file: usize },
    InvalidNotation { notation: String },
}

impl fmt::Display for SquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquareError::RankOutOfBounds { rank } => {
                write!(f, "rank {rank} out of bounds (0-7)")
            }
            SquareError::FileOutOfBounds { file } => {
                write!(f, "file {file} out of bounds (0-7)")
            }
            SquareError::InvalidNotation { notation } => {
                write!(f, "invalid square notation '{notation}'")
            }
        }
    }
}

impl std::error::Error for SquareError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fen_error_messages_carry_context() {
        let err = FenError::TooFewParts { found: 2 };
        assert!(err.to_string().contains('2'));
        let err = FenError::InvalidPiece { char: 'z' };
        assert!(err.to_string().contains("'z'"));
        let err = FenError::BadRankWidth { rank: 3, files: 9 };
        assert!(err.to_string().contains('9'));
    }

    #[test]
    fn move_error_messages_carry_context() {
        let err = MoveParseError::InvalidLength { len: 3 };
        assert!(err.to_string().contains('3'));
        let err = MoveParseError::IllegalMove {
            notation: "e2e5".to_string(),
        };
        assert!(err.to_string().contains("e2e5"));
    }

    #[test]
    fn errors_are_comparable() {
        assert_eq!(
            SquareError::RankOutOfBounds { rank: 9 },
            SquareError::RankOutOfBounds { rank: 9 }
        );
    }
}
