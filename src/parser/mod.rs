//! Lexer and parser shared by placeholder expressions and host source

mod grammar;
pub mod lexer;
pub mod syntax;

pub use grammar::{parse_expression, parse_program};
