//! FILENAME: core/parser/src/parser.rs
//! PURPOSE: Recursive descent parser that converts a stream of Tokens into an AST.
//! CONTEXT: This is the second stage of the parsing pipeline. It takes tokens
//! from the Lexer and builds an Expression tree that can be evaluated.
//!
//! GRAMMAR:
//!   expression     --> additive
//!   additive       --> multiplicative ( ("+" | "-") multiplicative )*
//!   multiplicative --> unary ( ("*" | "/") unary )*
//!   unary          --> ("-" | "+") unary | percent
//!   percent        --> NUMBER "%" | primary
//!   primary        --> NUMBER | COLUMN | "(" expression ")"

use crate::ast::{BinaryOperator, Expression, UnaryOperator};
use crate::lexer::Lexer;
use crate::token::Token;

/// Parser errors with descriptive messages and the character offset
/// where the offending token starts.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error at {}: {}", self.position, self.message)
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// Deepest allowed nesting of parentheses and sign prefixes.
pub const MAX_NESTING: usize = 256;

/// Most binary operators a single formula may contain.
pub const MAX_OPERATORS: usize = 1024;

/// The Parser struct holds the lexer and current token state.
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    current_pos: usize,
    depth: usize,
    operators: usize,
}

impl Parser {
    /// Creates a new parser from an input string.
    /// Automatically advances to the first token.
    pub fn new(input: &str) -> Self {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token();
        let current_pos = lexer.token_start();
        Parser {
            lexer,
            current_token,
            current_pos,
            depth: 0,
            operators: 0,
        }
    }

    /// Parses the entire input and returns the AST.
    pub fn parse(&mut self) -> ParseResult<Expression> {
        if self.current_token == Token::EOF {
            return Err(self.error("Empty expression"));
        }

        let expr = self.parse_expression()?;

        // Ensure we consumed all tokens
        if self.current_token != Token::EOF {
            return Err(self.error(format!(
                "Unexpected token after expression: {}",
                self.current_token
            )));
        }

        Ok(expr)
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        self.current_token = self.lexer.next_token();
        self.current_pos = self.lexer.token_start();
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.current_pos)
    }

    fn enter_nested(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.error(format!(
                "Expression nested deeper than {} levels",
                MAX_NESTING
            )));
        }
        Ok(())
    }

    fn leave_nested(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn count_operator(&mut self) -> ParseResult<()> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(self.error(format!(
                "Expression has more than {} operators",
                MAX_OPERATORS
            )));
        }
        Ok(())
    }

    /// Checks if the current token matches the expected token.
    /// If it matches, advances and returns Ok. Otherwise returns an error.
    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.current_token == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!(
                "Expected {}, found {}",
                expected, self.current_token
            )))
        }
    }

    /// Entry point for expression parsing.
    fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_additive()
    }

    /// Parses additive expressions (+ and -).
    fn parse_additive(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match &self.current_token {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.count_operator()?;
            self.advance();
            let right = self.parse_multiplicative()?;

            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parses multiplicative expressions (* and /).
    fn parse_multiplicative(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match &self.current_token {
                Token::Asterisk => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.count_operator()?;
            self.advance();
            let right = self.parse_unary()?;

            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parses unary expressions (sign prefixes).
    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let op = match self.current_token {
            Token::Minus => UnaryOperator::Negate,
            Token::Plus => UnaryOperator::Plus,
            _ => return self.parse_primary(),
        };

        self.enter_nested()?;
        self.advance();
        let operand = self.parse_unary()?;
        self.leave_nested();
        Ok(Expression::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    /// Parses primary expressions (literals, column refs, parentheses).
    fn parse_primary(&mut self) -> ParseResult<Expression> {
        match self.current_token.clone() {
            Token::Number(n) => {
                self.advance();

                // 15% reads as (15 / 100)
                if self.current_token == Token::Percent {
                    self.advance();
                    return Ok(Expression::BinaryOp {
                        left: Box::new(Expression::Number(n)),
                        op: BinaryOperator::Divide,
                        right: Box::new(Expression::Number(100.0)),
                    });
                }

                Ok(Expression::Number(n))
            }

            Token::Column(name) => {
                if name.is_empty() {
                    return Err(self.error("Empty column reference"));
                }
                self.advance();
                Ok(Expression::Column(name))
            }

            Token::LParen => {
                self.enter_nested()?;
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                self.leave_nested();
                Ok(expr)
            }

            // Error cases
            Token::EOF => Err(self.error("Unexpected end of expression")),

            Token::UnterminatedColumn(name) => Err(self.error(format!(
                "Unterminated column reference: [{}",
                name
            ))),

            Token::Percent => Err(self.error("'%' must follow a number")),

            Token::Illegal(ch) => Err(self.error(format!("Illegal character: {}", ch))),

            token => Err(self.error(format!("Unexpected token: {}", token))),
        }
    }
}

/// Convenience function to parse a formula string directly.
pub fn parse(input: &str) -> ParseResult<Expression> {
    let mut parser = Parser::new(input);
    parser.parse()
}
