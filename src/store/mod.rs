//! Persistence for board records.

pub mod board;

pub use board::JsonlBoardStore;
