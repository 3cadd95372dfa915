use thiserror::Error;

use crate::lexer::{Token, TokenKind};

use super::{
    Assignment, BinOpKind, Declaration, Expr, ForStmt, IfStmt, PatternKind, PatternStmt,
    PrintStmt, Program, Span, Stmt, UnOpKind, WhileStmt,
};

#[derive(Clone, Debug, Error, PartialEq)]
#[error("Syntax error at line {line}, column {column}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Recursive descent parser over the lexer's token stream.
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    /// `tokens` must end with an `Eof` token, as produced by the lexer.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    fn current(&self) -> &Token {
        match self.tokens.get(self.index) {
            Some(t) => t,
            None => &self.tokens[self.tokens.len() - 1],
        }
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        self.index += 1;
        token
    }

    fn error(&self, message: String) -> SyntaxError {
        let token = self.current();
        SyntaxError {
            line: token.line,
            column: token.column,
            message,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        let token = self.current();
        if token.kind != kind {
            return Err(self.error(format!("Expected {:?}, got {:?}", kind, token.kind)));
        }
        Ok(self.advance())
    }

    fn expect_msg(&mut self, kind: TokenKind, message: &str) -> Result<Token, SyntaxError> {
        if self.current().kind != kind {
            return Err(self.error(message.to_string()));
        }
        Ok(self.advance())
    }

    /// program = statement* EOF
    pub fn parse(&mut self) -> Result<Program, SyntaxError> {
        let mut statements = vec![];
        while self.current().kind != TokenKind::Eof {
            match self.parse_statement()? {
                Some(stmt) => statements.push(stmt),
                // a stray `}` at top level has no block to close
                None => {
                    return Err(self.error(format!("Unexpected token: {:?}", TokenKind::RightBrace)))
                }
            }
        }
        Ok(Program { statements })
    }

    /// statement = declaration | assignment | print | if | while | for | pattern
    ///
    /// Returns `None` at a `}`, which block loops use as their termination
    /// condition without consuming the brace.
    fn parse_statement(&mut self) -> Result<Option<Stmt>, SyntaxError> {
        match self.current().kind {
            TokenKind::Var => Ok(Some(Stmt::Declaration(self.parse_declaration()?))),
            TokenKind::Print => Ok(Some(Stmt::Print(self.parse_print()?))),
            TokenKind::If => Ok(Some(Stmt::If(self.parse_if()?))),
            TokenKind::While => Ok(Some(Stmt::While(self.parse_while()?))),
            TokenKind::For => Ok(Some(Stmt::For(self.parse_for()?))),
            TokenKind::Fibonacci | TokenKind::Factorial | TokenKind::Sequence => {
                Ok(Some(Stmt::Pattern(self.parse_pattern()?)))
            }
            TokenKind::Identifier => Ok(Some(Stmt::Assignment(self.parse_assignment()?))),
            TokenKind::RightBrace => Ok(None),
            kind => Err(self.error(format!("Unexpected token: {:?}", kind))),
        }
    }

    /// statement* up to (but not consuming) the closing `}`
    fn parse_block(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let mut block = vec![];
        while self.current().kind != TokenKind::RightBrace {
            if let Some(stmt) = self.parse_statement()? {
                block.push(stmt);
            }
        }
        Ok(block)
    }

    /// declaration = "var" IDENT "=" expr ";"
    fn parse_declaration(&mut self) -> Result<Declaration, SyntaxError> {
        let var_token = self.expect(TokenKind::Var)?;
        let name = self.expect(TokenKind::Identifier)?.value;
        self.expect_msg(TokenKind::Assign, "Expected '=' after identifier")?;
        let value = self.parse_expression()?;
        self.expect_msg(TokenKind::SemiColon, "Expected ';' after declaration")?;
        Ok(Declaration {
            name,
            value,
            span: Span::of(&var_token),
        })
    }

    /// assignment = IDENT "=" expr ";"
    fn parse_assignment(&mut self) -> Result<Assignment, SyntaxError> {
        let id_token = self.expect(TokenKind::Identifier)?;
        self.expect_msg(TokenKind::Assign, "Expected '=' after identifier")?;
        let value = self.parse_expression()?;
        self.expect_msg(TokenKind::SemiColon, "Expected ';' after assignment")?;
        Ok(Assignment {
            name: id_token.value.clone(),
            value,
            span: Span::of(&id_token),
        })
    }

    /// print = "print" expr ";"
    fn parse_print(&mut self) -> Result<PrintStmt, SyntaxError> {
        let print_token = self.expect(TokenKind::Print)?;
        let value = self.parse_expression()?;
        self.expect_msg(TokenKind::SemiColon, "Expected ';' after print")?;
        Ok(PrintStmt {
            value,
            span: Span::of(&print_token),
        })
    }

    /// if = "if" "(" expr ")" "{" statement* "}" ("else" "{" statement* "}")?
    fn parse_if(&mut self) -> Result<IfStmt, SyntaxError> {
        let if_token = self.expect(TokenKind::If)?;
        self.expect_msg(TokenKind::LeftParen, "Expected '(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect_msg(TokenKind::RightParen, "Expected ')' after condition")?;
        self.expect_msg(TokenKind::LeftBrace, "Expected '{' after condition")?;
        let then_block = self.parse_block()?;
        self.expect(TokenKind::RightBrace)?;

        let else_block = if self.current().kind == TokenKind::Else {
            self.expect(TokenKind::Else)?;
            self.expect_msg(TokenKind::LeftBrace, "Expected '{' after 'else'")?;
            let block = self.parse_block()?;
            self.expect(TokenKind::RightBrace)?;
            Some(block)
        } else {
            None
        };

        Ok(IfStmt {
            condition,
            then_block,
            else_block,
            span: Span::of(&if_token),
        })
    }

    /// while = "while" "(" expr ")" "{" statement* "}"
    fn parse_while(&mut self) -> Result<WhileStmt, SyntaxError> {
        let while_token = self.expect(TokenKind::While)?;
        self.expect_msg(TokenKind::LeftParen, "Expected '(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect_msg(TokenKind::RightParen, "Expected ')' after condition")?;
        self.expect_msg(TokenKind::LeftBrace, "Expected '{' after condition")?;
        let block = self.parse_block()?;
        self.expect(TokenKind::RightBrace)?;

        Ok(WhileStmt {
            condition,
            block,
            span: Span::of(&while_token),
        })
    }

    /// for = "for" "(" IDENT "=" expr ";" expr ";" IDENT "=" expr ")"
    ///       "{" statement* "}"
    fn parse_for(&mut self) -> Result<ForStmt, SyntaxError> {
        let for_token = self.expect(TokenKind::For)?;
        self.expect_msg(TokenKind::LeftParen, "Expected '(' after 'for'")?;

        let init_id = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::Assign)?;
        let init_expr = self.parse_expression()?;
        let init = Assignment {
            name: init_id.value.clone(),
            value: init_expr,
            span: Span::of(&init_id),
        };
        self.expect(TokenKind::SemiColon)?;

        let condition = self.parse_expression()?;
        self.expect(TokenKind::SemiColon)?;

        let update_id = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::Assign)?;
        let update_expr = self.parse_expression()?;
        let update = Assignment {
            name: update_id.value.clone(),
            value: update_expr,
            span: Span::of(&update_id),
        };
        self.expect(TokenKind::RightParen)?;
        self.expect_msg(TokenKind::LeftBrace, "Expected '{' after for loop")?;

        let block = self.parse_block()?;
        self.expect(TokenKind::RightBrace)?;

        Ok(ForStmt {
            init,
            condition,
            update,
            block,
            span: Span::of(&for_token),
        })
    }

    /// pattern = ("fibonacci" | "factorial" | "sequence")
    ///           "(" IDENT "," expr ("," expr)* ")" ";"
    fn parse_pattern(&mut self) -> Result<PatternStmt, SyntaxError> {
        let token = self.current().clone();
        let kind = match token.kind {
            TokenKind::Fibonacci => PatternKind::Fibonacci,
            TokenKind::Factorial => PatternKind::Factorial,
            TokenKind::Sequence => PatternKind::Sequence,
            kind => return Err(self.error(format!("Unexpected token: {:?}", kind))),
        };
        self.advance();

        self.expect_msg(
            TokenKind::LeftParen,
            &format!("Expected '(' after '{}'", kind.name()),
        )?;
        let target = self.expect(TokenKind::Identifier)?.value;
        self.expect_msg(TokenKind::Comma, "Expected ',' after identifier")?;

        let mut args = vec![self.parse_expression()?];
        while self.current().kind == TokenKind::Comma {
            self.advance();
            args.push(self.parse_expression()?);
        }

        self.expect_msg(TokenKind::RightParen, "Expected ')' after arguments")?;
        self.expect_msg(TokenKind::SemiColon, "Expected ';' after pattern statement")?;

        Ok(PatternStmt {
            kind,
            target,
            args,
            span: Span::of(&token),
        })
    }

    /// expr = equality
    fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_equality()
    }

    /// equality = relational (("==" | "!=") relational)*
    fn parse_equality(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_relational()?;

        loop {
            let op = match self.current().kind {
                TokenKind::Equal => BinOpKind::Equal,
                TokenKind::NotEqual => BinOpKind::NotEqual,
                _ => break,
            };
            let op_token = self.advance();
            let right = self.parse_relational()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span: Span::of(&op_token),
            };
        }

        Ok(left)
    }

    /// relational = additive (("<" | ">" | "<=" | ">=") additive)*
    fn parse_relational(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current().kind {
                TokenKind::Less => BinOpKind::LessThan,
                TokenKind::Greater => BinOpKind::GreaterThan,
                TokenKind::LessEqual => BinOpKind::LessEqual,
                TokenKind::GreaterEqual => BinOpKind::GreaterEqual,
                _ => break,
            };
            let op_token = self.advance();
            let right = self.parse_additive()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span: Span::of(&op_token),
            };
        }

        Ok(left)
    }

    /// additive = multiplicative (("+" | "-") multiplicative)*
    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOpKind::Add,
                TokenKind::Minus => BinOpKind::Sub,
                _ => break,
            };
            let op_token = self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span: Span::of(&op_token),
            };
        }

        Ok(left)
    }

    /// multiplicative = unary (("*" | "/" | "%") unary)*
    fn parse_multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinOpKind::Mul,
                TokenKind::Slash => BinOpKind::Div,
                TokenKind::Percent => BinOpKind::Mod,
                _ => break,
            };
            let op_token = self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span: Span::of(&op_token),
            };
        }

        Ok(left)
    }

    /// unary = "-" unary | primary
    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        if self.current().kind == TokenKind::Minus {
            let op_token = self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnOpKind::Neg,
                operand: Box::new(operand),
                span: Span::of(&op_token),
            });
        }
        self.parse_primary()
    }

    /// primary = INTEGER | STRING | IDENT | "(" expr ")"
    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Integer => {
                self.advance();
                let value = token.value.parse::<i64>().map_err(|_| {
                    self.error(format!("Integer literal out of range: {}", token.value))
                })?;
                Ok(Expr::Integer {
                    value,
                    span: Span::of(&token),
                })
            }
            TokenKind::Str => {
                self.advance();
                // strip the surrounding quotes
                let value = token.value[1..token.value.len() - 1].to_string();
                Ok(Expr::Str {
                    value,
                    span: Span::of(&token),
                })
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::Identifier {
                    name: token.value.clone(),
                    span: Span::of(&token),
                })
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_msg(TokenKind::RightParen, "Expected ')' after expression")?;
                Ok(expr)
            }
            kind => Err(self.error(format!("Unexpected token in expression: {:?}", kind))),
        }
    }
}
