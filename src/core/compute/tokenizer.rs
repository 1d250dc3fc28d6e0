//! Formula tokenizer
//!
//! Converts formula strings like `@round(@div(price, 3), n=2)` into a sequence
//! of tokens that can be parsed into a call tree.

use std::iter::Peekable;
use std::str::Chars;

/// A token in a formula expression
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A numeric literal (e.g., 123, 45.67, -89, 1.5e10)
    Number(f64),
    /// A string literal (e.g., "hello" or 'world')
    Text(String),
    /// A column name, or a keyword label when followed by `=`
    Identifier(String),
    /// A function name introduced by `@`
    Function(String),
    OpenParen,
    CloseParen,
    Comma,
    /// Keyword argument separator (`lower=0`)
    Equals,
}

/// Error during tokenization
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizeError {
    pub message: String,
    pub position: usize,
}

impl TokenizeError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl std::fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tokenize error at position {}: {}",
            self.position, self.message
        )
    }
}

impl std::error::Error for TokenizeError {}

/// Tokenizer for formula expressions
pub struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(formula: &'a str) -> Self {
        Self {
            chars: formula.chars().peekable(),
            position: 0,
        }
    }

    /// Tokenize the entire formula into a vector of tokens
    pub fn tokenize(mut self) -> Result<Vec<Token>, TokenizeError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Get the next token, or None if at end of input
    fn next_token(&mut self) -> Result<Option<Token>, TokenizeError> {
        self.skip_whitespace();

        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let token = match c {
            '"' | '\'' => self.read_string(c)?,

            '(' => {
                self.advance();
                Token::OpenParen
            }
            ')' => {
                self.advance();
                Token::CloseParen
            }
            ',' => {
                self.advance();
                Token::Comma
            }
            '=' => {
                self.advance();
                Token::Equals
            }

            '@' => self.read_function_name()?,

            // Only a literal may carry a sign; there are no infix operators
            '-' => self.read_negative_number()?,

            c if c.is_ascii_digit() => self.read_number(String::new())?,

            c if c.is_alphabetic() || c == '_' => Token::Identifier(self.read_identifier()),

            '+' | '*' | '/' | '^' | '%' | '<' | '>' | '!' | '&' | '|' | '~' => {
                return Err(TokenizeError::new(
                    format!(
                        "Unsupported operator '{}': use @function calls instead",
                        c
                    ),
                    self.position,
                ));
            }

            c => {
                return Err(TokenizeError::new(
                    format!("Unexpected character: '{}'", c),
                    self.position,
                ));
            }
        };

        Ok(Some(token))
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Read a string literal; a doubled quote inside is an escaped quote
    fn read_string(&mut self, quote: char) -> Result<Token, TokenizeError> {
        let start_pos = self.position;
        self.advance();
        let mut value = String::new();

        loop {
            match self.advance() {
                None => {
                    return Err(TokenizeError::new("Unterminated string literal", start_pos));
                }
                Some(c) if c == quote => {
                    if self.peek() == Some(quote) {
                        value.push(quote);
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(c) => value.push(c),
            }
        }

        Ok(Token::Text(value))
    }

    fn read_function_name(&mut self) -> Result<Token, TokenizeError> {
        let at_pos = self.position;
        self.advance(); // consume '@'

        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if name.is_empty() {
            return Err(TokenizeError::new("Expected function name after '@'", at_pos));
        }
        Ok(Token::Function(name))
    }

    fn read_negative_number(&mut self) -> Result<Token, TokenizeError> {
        let minus_pos = self.position;
        self.advance(); // consume '-'

        match self.peek() {
            Some(c) if c.is_ascii_digit() => self.read_number("-".to_string()),
            _ => Err(TokenizeError::new(
                "Unsupported operator '-': use @sub or @neg instead",
                minus_pos,
            )),
        }
    }

    /// Read a number (integer, decimal, or scientific notation)
    fn read_number(&mut self, mut num_str: String) -> Result<Token, TokenizeError> {
        let start_pos = self.position;

        self.read_digits(&mut num_str);

        if self.peek() == Some('.') {
            num_str.push('.');
            self.advance();
            self.read_digits(&mut num_str);
        }

        // Exponent part (e.g., 1.5e10, 2E-5)
        if let Some(c @ ('e' | 'E')) = self.peek() {
            num_str.push(c);
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                num_str.push(sign);
                self.advance();
            }
            self.read_digits(&mut num_str);
        }

        // A digit run glued to letters is neither a number nor a column name
        if let Some(c) = self.peek() {
            if c.is_alphabetic() || c == '_' {
                return Err(TokenizeError::new(
                    format!("Invalid number: {}{}", num_str, c),
                    start_pos,
                ));
            }
        }

        num_str
            .parse::<f64>()
            .map(Token::Number)
            .map_err(|_| TokenizeError::new(format!("Invalid number: {}", num_str), start_pos))
    }

    fn read_digits(&mut self, out: &mut String) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                out.push(c);
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Read a column name, keeping `orders.total` and `items[0]` whole
    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();

        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '.' | '[' | ']') {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }

        ident
    }
}

/// Convenience function to tokenize a formula string
pub fn tokenize(formula: &str) -> Result<Vec<Token>, TokenizeError> {
    Tokenizer::new(formula).tokenize()
}
