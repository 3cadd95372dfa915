use thiserror::Error;

use super::token::{Token, TokenKind, KEYWORDS, ONE_CHAR_TOKENS, TWO_CHAR_TOKENS};

#[derive(Clone, Debug, Error, PartialEq)]
#[error("Lexical error at line {line}, column {column}: {message}")]
pub struct LexicalError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Scans source text into a token stream.
///
/// Rules are tried in a fixed order at every position: comment, whitespace,
/// string literal, integer literal, identifier/keyword, two-character
/// operators, one-character operators/delimiters. The first match wins, so
/// `-` directly followed by a digit lexes as a negative integer literal
/// rather than a minus token. This interacts with unary minus and binary
/// subtraction: `a-3` produces `a` followed by the integer `-3`.
#[derive(Debug)]
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: vec![],
        }
    }

    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexicalError> {
        let mut lexer = Lexer::new(source);
        lexer.scan()?;
        Ok(lexer.tokens)
    }

    fn error(&self, message: String) -> LexicalError {
        LexicalError {
            line: self.line,
            column: self.column,
            message,
        }
    }

    fn peek(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    /// Advances `n` characters, keeping the 1-based line/column in sync.
    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if let Some(&c) = self.chars.get(self.pos) {
                if c == '\n' {
                    self.line += 1;
                    self.column = 1;
                } else {
                    self.column += 1;
                }
            }
            self.pos += 1;
        }
    }

    /// Pushes a token positioned at the current location, then consumes its
    /// text.
    fn push_token(&mut self, kind: TokenKind, value: String) {
        let len = value.chars().count();
        self.tokens.push(Token {
            kind,
            value,
            line: self.line,
            column: self.column,
        });
        self.advance(len);
    }

    fn scan(&mut self) -> Result<(), LexicalError> {
        while let Some(c) = self.peek(0) {
            if c == '/' && self.peek(1) == Some('/') {
                // Comment runs to end of line and produces no token
                let len = self.chars[self.pos..]
                    .iter()
                    .take_while(|&&c| c != '\n')
                    .count();
                self.advance(len);
            } else if c.is_whitespace() {
                self.advance(1);
            } else if c == '"' {
                self.scan_string()?;
            } else if c.is_ascii_digit()
                || (c == '-' && self.peek(1).is_some_and(|d| d.is_ascii_digit()))
            {
                self.scan_integer();
            } else if c.is_ascii_alphabetic() {
                self.scan_identifier();
            } else {
                let pair: String = self.chars[self.pos..].iter().take(2).collect();
                if let Some(&kind) = TWO_CHAR_TOKENS.get(pair.as_str()) {
                    self.push_token(kind, pair);
                } else if let Some(&kind) = ONE_CHAR_TOKENS.get(&c) {
                    self.push_token(kind, c.to_string());
                } else {
                    return Err(self.error(format!("Unexpected character: '{}'", c)));
                }
            }
        }

        self.tokens.push(Token {
            kind: TokenKind::Eof,
            value: String::new(),
            line: self.line,
            column: self.column,
        });
        Ok(())
    }

    /// String literals have no escape sequences; an unterminated quote is
    /// reported as an unexpected character, like any other failed match.
    fn scan_string(&mut self) -> Result<(), LexicalError> {
        let Some(len) = self.chars[self.pos + 1..].iter().position(|&c| c == '"') else {
            return Err(self.error("Unexpected character: '\"'".to_string()));
        };
        let value: String = self.chars[self.pos..self.pos + len + 2].iter().collect();
        self.push_token(TokenKind::Str, value);
        Ok(())
    }

    fn scan_integer(&mut self) {
        let mut len = usize::from(self.chars[self.pos] == '-');
        len += self.chars[self.pos + len..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count();
        let value: String = self.chars[self.pos..self.pos + len].iter().collect();
        self.push_token(TokenKind::Integer, value);
    }

    fn scan_identifier(&mut self) {
        let value: String = self.chars[self.pos..]
            .iter()
            .take_while(|&&c| c.is_ascii_alphanumeric() || c == '_')
            .collect();
        let kind = KEYWORDS
            .get(value.to_ascii_lowercase().as_str())
            .copied()
            .unwrap_or(TokenKind::Identifier);
        self.push_token(kind, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn declaration_tokens() {
        assert_eq!(
            kinds("var x = 42;"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Integer,
                TokenKind::SemiColon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(kinds("WHILE While while")[..3], [TokenKind::While; 3]);
        // but identifier text keeps its original casing
        let tokens = Lexer::tokenize("VAR X = 1;").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].value, "X");
    }

    #[test]
    fn two_char_operators_before_one_char() {
        assert_eq!(
            kinds("<= >= == != < > ="),
            vec![
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::Equal,
                TokenKind::NotEqual,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Assign,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn negative_integer_wins_over_minus() {
        let tokens = Lexer::tokenize("x = -3; y = x - 3;").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Integer);
        assert_eq!(tokens[2].value, "-3");
        // separated by whitespace, `-` stays a minus token
        assert_eq!(tokens[7].kind, TokenKind::Minus);
    }

    #[test]
    fn comments_and_whitespace_produce_no_tokens() {
        assert_eq!(
            kinds("// nothing here\nprint 1; // trailing"),
            vec![
                TokenKind::Print,
                TokenKind::Integer,
                TokenKind::SemiColon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn line_and_column_are_one_based() {
        let tokens = Lexer::tokenize("var x = 1;\nprint x;").unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 5));
        let print = tokens.iter().find(|t| t.kind == TokenKind::Print).unwrap();
        assert_eq!((print.line, print.column), (2, 1));
        let eof = tokens.last().unwrap();
        assert_eq!((eof.kind, eof.line, eof.column), (TokenKind::Eof, 2, 9));
    }

    #[test]
    fn string_literal_keeps_quotes_in_value() {
        let tokens = Lexer::tokenize("print \"hello world\";").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Str);
        assert_eq!(tokens[1].value, "\"hello world\"");
    }

    #[test]
    fn unexpected_character_reports_position() {
        let err = Lexer::tokenize("var x = 1;\nvar y = @;").unwrap_err();
        assert_eq!((err.line, err.column), (2, 9));
        assert_eq!(err.message, "Unexpected character: '@'");
    }

    #[test]
    fn unterminated_string_is_rejected() {
        let err = Lexer::tokenize("print \"oops;").unwrap_err();
        assert_eq!(err.message, "Unexpected character: '\"'");
    }
}
