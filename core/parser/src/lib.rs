//! FILENAME: core/parser/src/lib.rs
//! PURPOSE: Library root for the takeoff formula parser.
//! CONTEXT: This module exposes the lexer, parser, and AST components
//! needed to convert derived-column formulas into evaluatable expression trees.
//!
//! PIPELINE: Formula String --> Lexer --> Tokens --> Parser --> AST --> Evaluator
//!
//! SUPPORTED FEATURES:
//! - Arithmetic: +, -, *, /
//! - Column references: [Area], [Costo Unitario]
//! - Percent literals: 15% (read as 15 / 100)
//! - Scientific notation: 1.5e3, 2E-2
//! - Parentheses for grouping
//! - Unary sign: -5, +[Area]
//!
//! Anything else (bare words, `;`, `=`, quotes) is rejected at parse time, so
//! a formula either parses into pure arithmetic or does not parse at all.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;


// Re-export commonly used types for convenience
pub use ast::{BinaryOperator, Expression, UnaryOperator};
pub use lexer::Lexer;
pub use parser::{parse, ParseError, ParseResult, Parser};
pub use token::Token;
