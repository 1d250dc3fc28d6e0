//! Formula parser
//!
//! Converts a sequence of tokens into a call tree. The grammar is small:
//!
//! ```text
//! formula   := expr EOF
//! expr      := "@" NAME "(" arguments? ")" | NUMBER | STRING | IDENTIFIER
//! arguments := argument ( "," argument )*
//! argument  := IDENTIFIER "=" expr | expr
//! ```

use super::tokenizer::Token;

/// Abstract Syntax Tree node for formula expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Text(String),
    /// A column of the working dataset
    Column(String),
    /// Function call: @name(arg1, kw=arg2, ...)
    Call { name: String, args: Vec<Argument> },
}

/// One argument of a call, positional or `keyword=value`
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub keyword: Option<String>,
    pub value: Expr,
}

impl Argument {
    pub fn positional(value: Expr) -> Self {
        Self {
            keyword: None,
            value,
        }
    }

    pub fn keyword(name: impl Into<String>, value: Expr) -> Self {
        Self {
            keyword: Some(name.into()),
            value,
        }
    }
}

/// Error during parsing
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parse error at position {}: {}",
            self.position, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// Parser for formula tokens
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse the tokens into an AST
    pub fn parse(mut self) -> Result<Expr, ParseError> {
        if self.tokens.is_empty() {
            return Err(ParseError::new("Empty expression", 0));
        }
        let expr = self.expression()?;

        if !self.is_at_end() {
            return Err(ParseError::new(
                format!("Unexpected token after expression: {:?}", self.peek()),
                self.position,
            ));
        }

        Ok(expr)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.position + 1)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Check if current token matches and consume it
    fn match_token(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Text(s)) => Ok(Expr::Text(s)),
            Some(Token::Identifier(name)) => {
                if self.peek() == Some(&Token::OpenParen) {
                    return Err(ParseError::new(
                        format!("Function calls must start with '@': use @{}(...)", name),
                        self.position,
                    ));
                }
                Ok(Expr::Column(name))
            }
            Some(Token::Function(name)) => self.call(name),
            Some(token) => Err(ParseError::new(
                format!("Unexpected token: {:?}", token),
                self.position - 1,
            )),
            None => Err(ParseError::new(
                "Unexpected end of expression",
                self.position,
            )),
        }
    }

    fn call(&mut self, name: String) -> Result<Expr, ParseError> {
        if !self.match_token(&Token::OpenParen) {
            return Err(ParseError::new(
                format!("Expected '(' after @{}", name),
                self.position,
            ));
        }

        let args = self.arguments()?;
        if !self.match_token(&Token::CloseParen) {
            return Err(ParseError::new(
                format!("Expected ')' after arguments of @{}", name),
                self.position,
            ));
        }

        Ok(Expr::Call { name, args })
    }

    /// Arguments: ( argument ( "," argument )* )?
    fn arguments(&mut self) -> Result<Vec<Argument>, ParseError> {
        let mut args: Vec<Argument> = Vec::new();

        if let Some(Token::CloseParen) = self.peek() {
            return Ok(args);
        }

        loop {
            let arg = self.argument()?;

            match &arg.keyword {
                Some(keyword) => {
                    if args.iter().any(|a| a.keyword.as_ref() == Some(keyword)) {
                        return Err(ParseError::new(
                            format!("Keyword argument repeated: {}", keyword),
                            self.position,
                        ));
                    }
                }
                None => {
                    if args.iter().any(|a| a.keyword.is_some()) {
                        return Err(ParseError::new(
                            "Positional argument follows keyword argument",
                            self.position,
                        ));
                    }
                }
            }
            args.push(arg);

            if !self.match_token(&Token::Comma) {
                break;
            }
        }

        Ok(args)
    }

    fn argument(&mut self) -> Result<Argument, ParseError> {
        if let (Some(Token::Identifier(name)), Some(Token::Equals)) = (self.peek(), self.peek_next()) {
            let name = name.clone();
            self.position += 2;
            let value = self.expression()?;
            return Ok(Argument::keyword(name, value));
        }
        Ok(Argument::positional(self.expression()?))
    }
}

/// Convenience function to parse tokens into an AST
pub fn parse(tokens: Vec<Token>) -> Result<Expr, ParseError> {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compute::tokenizer::tokenize;

    fn parse_formula(formula: &str) -> Result<Expr, ParseError> {
        let tokens = tokenize(formula).map_err(|e| ParseError::new(e.message, e.position))?;
        parse(tokens)
    }

    fn col(name: &str) -> Expr {
        Expr::Column(name.to_string())
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_formula("42").unwrap(), Expr::Number(42.0));
        assert_eq!(parse_formula("-1.5").unwrap(), Expr::Number(-1.5));
    }

    #[test]
    fn test_parse_string() {
        assert_eq!(
            parse_formula("'pass'").unwrap(),
            Expr::Text("pass".to_string())
        );
    }

    #[test]
    fn test_parse_bare_column() {
        assert_eq!(parse_formula("raw_column").unwrap(), col("raw_column"));
    }

    #[test]
    fn test_parse_call_no_args() {
        assert_eq!(
            parse_formula("@tax_rate()").unwrap(),
            Expr::Call {
                name: "tax_rate".to_string(),
                args: vec![],
            }
        );
    }

    #[test]
    fn test_parse_nested_calls() {
        let expr = parse_formula("@add(@mul(a, 2), b)").unwrap();
        assert_eq!(
            expr,
            Expr::Call {
                name: "add".to_string(),
                args: vec![
                    Argument::positional(Expr::Call {
                        name: "mul".to_string(),
                        args: vec![
                            Argument::positional(col("a")),
                            Argument::positional(Expr::Number(2.0)),
                        ],
                    }),
                    Argument::positional(col("b")),
                ],
            }
        );
    }

    #[test]
    fn test_parse_keyword_argument() {
        let expr = parse_formula("@clip(score, lower=0, upper=100)").unwrap();
        assert_eq!(
            expr,
            Expr::Call {
                name: "clip".to_string(),
                args: vec![
                    Argument::positional(col("score")),
                    Argument::keyword("lower", Expr::Number(0.0)),
                    Argument::keyword("upper", Expr::Number(100.0)),
                ],
            }
        );
    }

    #[test]
    fn test_parse_error_empty() {
        assert!(parse_formula("").is_err());
    }

    #[test]
    fn test_parse_error_missing_close_paren() {
        let err = parse_formula("@add(a, b").unwrap_err();
        assert!(err.message.contains("')'"));
    }

    #[test]
    fn test_parse_error_call_without_at() {
        let err = parse_formula("add(a, b)").unwrap_err();
        assert!(err.message.contains("@add"));
    }

    #[test]
    fn test_parse_error_function_without_parens() {
        let err = parse_formula("@add").unwrap_err();
        assert!(err.message.contains("'('"));
    }

    #[test]
    fn test_parse_error_positional_after_keyword() {
        let err = parse_formula("@round(n=2, a)").unwrap_err();
        assert!(err.message.contains("Positional argument follows keyword"));
    }

    #[test]
    fn test_parse_error_repeated_keyword() {
        let err = parse_formula("@clip(a, lower=0, lower=1)").unwrap_err();
        assert!(err.message.contains("repeated"));
    }

    #[test]
    fn test_parse_error_trailing_tokens() {
        let err = parse_formula("a b").unwrap_err();
        assert!(err.message.contains("Unexpected token after expression"));
    }
}
