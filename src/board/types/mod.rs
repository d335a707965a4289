//! Core value types: squares, pieces, bitboards, moves, castling rights.

mod bitboard;
mod castling;
mod moves;
mod piece;
mod square;

pub use bitboard::{Bitboard, BitboardIter};
pub use castling::CastlingRights;
pub use moves::{Move, MoveList, MAX_PLY};
pub use piece::{Color, Piece};
pub use square::Square;

pub(crate) use castling::{CASTLE_BLACK_K, CASTLE_BLACK_Q, CASTLE_WHITE_K, CASTLE_WHITE_Q};
pub(crate) use moves::{ScoredMove, ScoredMoveList, MAX_MOVES};
pub(crate) use piece::PROMOTION_PIECES;
