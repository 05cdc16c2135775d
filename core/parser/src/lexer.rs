//! FILENAME: core/parser/src/lexer.rs
//! PURPOSE: Scans a raw formula string and produces a stream of Tokens.
//! CONTEXT: This is the first stage of the parsing pipeline. It handles
//! whitespace skipping, number parsing (including exponents), bracketed
//! column references, and the percent suffix.
//!
//! SUPPORTED OPERATORS:
//! - Single char: + - * / % ( )
//! - Column references: [Column Name]

use crate::token::Token;

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    token_start: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            chars: input.chars().collect(),
            pos: 0,
            token_start: 0,
        }
    }

    /// Character offset where the most recently returned token starts.
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// Advances the lexer and returns the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        self.token_start = self.pos;

        let Some(ch) = self.bump() else {
            return Token::EOF;
        };

        match ch {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Asterisk,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => self.read_column(),

            // Numbers start with a digit or a dot followed by a digit
            c if c.is_ascii_digit() => self.read_number(c),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.read_number('.'),

            other => Token::Illegal(other),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.pos += 1;
        }
    }

    /// Reads everything up to the closing ']' verbatim. Column names may
    /// contain spaces and any non-bracket character.
    fn read_column(&mut self) -> Token {
        let mut name = String::new();
        while let Some(ch) = self.bump() {
            if ch == ']' {
                return Token::Column(name);
            }
            name.push(ch);
        }
        Token::UnterminatedColumn(name)
    }

    fn read_number(&mut self, first_char: char) -> Token {
        let mut number_str = String::from(first_char);
        let mut has_dot = first_char == '.';

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                number_str.push(ch);
                self.pos += 1;
            } else if ch == '.' && !has_dot {
                has_dot = true;
                number_str.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }

        // Exponent: e/E followed by digits, optionally signed. A bare 'e' is
        // left in the stream and will surface as an illegal character.
        if matches!(self.peek(), Some('e') | Some('E')) {
            let digits_at = match self.peek_at(1) {
                Some('+') | Some('-') => 2,
                _ => 1,
            };
            if self.peek_at(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digits_at {
                    if let Some(ch) = self.bump() {
                        number_str.push(ch);
                    }
                }
                while let Some(ch) = self.peek() {
                    if !ch.is_ascii_digit() {
                        break;
                    }
                    number_str.push(ch);
                    self.pos += 1;
                }
            }
        }

        match number_str.parse::<f64>() {
            Ok(n) => Token::Number(n),
            Err(_) => Token::Illegal(first_char),
        }
    }
}
