pub mod ast;
pub mod checker;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod program;
pub mod quickfix;
pub mod repl;
pub mod runner;
pub mod session;
