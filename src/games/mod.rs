//! Game implementations.

pub mod checkers;
pub mod chess;
pub mod stratego;
