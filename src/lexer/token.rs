use phf::phf_map;

/// Reserved words, matched case-insensitively against the lowercased
/// identifier text.
pub static KEYWORDS: phf::Map<&str, TokenKind> = phf_map! {
    "var" => TokenKind::Var,
    "print" => TokenKind::Print,
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "while" => TokenKind::While,
    "for" => TokenKind::For,
    "fibonacci" => TokenKind::Fibonacci,
    "factorial" => TokenKind::Factorial,
    "sequence" => TokenKind::Sequence,
    "end" => TokenKind::End,
};

/// Two-character operators, tried before their one-character prefixes.
pub static TWO_CHAR_TOKENS: phf::Map<&str, TokenKind> = phf_map! {
    "==" => TokenKind::Equal,
    "!=" => TokenKind::NotEqual,
    "<=" => TokenKind::LessEqual,
    ">=" => TokenKind::GreaterEqual,
};

pub static ONE_CHAR_TOKENS: phf::Map<char, TokenKind> = phf_map! {
    '=' => TokenKind::Assign,
    '+' => TokenKind::Plus,
    '-' => TokenKind::Minus,
    '*' => TokenKind::Star,
    '/' => TokenKind::Slash,
    '%' => TokenKind::Percent,
    '<' => TokenKind::Less,
    '>' => TokenKind::Greater,
    '(' => TokenKind::LeftParen,
    ')' => TokenKind::RightParen,
    '{' => TokenKind::LeftBrace,
    '}' => TokenKind::RightBrace,
    ',' => TokenKind::Comma,
    ';' => TokenKind::SemiColon,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Var,
    Print,
    If,
    Else,
    While,
    For,
    Fibonacci,
    Factorial,
    Sequence,
    End,

    // Identifiers and literals
    Identifier,
    Integer,
    Str,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    SemiColon,

    Eof,
}

/// A single lexeme with its literal text and 1-based source position.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: usize,
    pub column: usize,
}
