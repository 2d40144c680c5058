use crate::{
    ColumnDef, Value,
    common::error::{LexError, SyntaxError},
    sql::lexer::{Lexer, Symbol, Token},
};

pub use ast::*;
pub(crate) use keyword::Keyword;
pub(crate) use literal::Literal;
pub use operators::Operator;

pub(crate) mod ast;
pub(crate) mod keyword;
pub(crate) mod literal;
pub(crate) mod operators;

/// SQL parser that converts tokens into an AST.
///
/// Uses recursive descent over the token sequence of a single statement,
/// with one function per statement kind. A statement must consume every
/// token; anything left over is a syntax error.
pub struct SqlParser<'src> {
    tokens: Vec<Token<'src>>,
    position: usize,
}

impl<'src> SqlParser<'src> {
    /// Lexes `statement` and prepares a parser over its tokens.
    pub fn new(statement: &'src str) -> Result<Self, LexError> {
        Ok(Self::from_tokens(Lexer::tokenize(statement)?))
    }

    pub fn from_tokens(tokens: Vec<Token<'src>>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parses the tokens into exactly one [`Statement`].
    pub fn parse(&mut self) -> Result<Statement, SyntaxError> {
        let statement = match self.current() {
            Some(Token::Keyword(Keyword::Select)) => self.parse_select_statement()?,
            Some(Token::Keyword(Keyword::Insert)) => self.parse_insert_statement()?,
            Some(Token::Keyword(Keyword::Update)) => self.parse_update_statement()?,
            Some(Token::Keyword(Keyword::Delete)) => self.parse_delete_statement()?,
            Some(Token::Keyword(Keyword::Create)) => self.parse_create_statement()?,
            Some(Token::Keyword(Keyword::Drop)) => self.parse_drop_statement()?,
            Some(token) => {
                return Err(SyntaxError::UnexpectedToken {
                    expected: "SELECT, INSERT, UPDATE, DELETE, CREATE or DROP".into(),
                    found: token.to_string(),
                });
            }
            None => return Err(SyntaxError::EmptyStatement),
        };

        if let Some(token) = self.current() {
            return Err(SyntaxError::TrailingTokens {
                found: token.to_string(),
            });
        }

        Ok(statement)
    }

    fn parse_select_statement(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::Select)?;

        let fields = self.parse_fields()?;

        self.expect_keyword(Keyword::From)?;

        let table = self.expect_identifier()?;
        let conditions = self.parse_where()?;

        Ok(Statement::Select(SelectStatement {
            table,
            fields,
            conditions,
        }))
    }

    fn parse_insert_statement(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::Insert)?;
        self.expect_keyword(Keyword::Into)?;

        let table = self.expect_identifier()?;

        let fields = if self.consume_symbol(Symbol::LeftParen) {
            let names = self.parse_identifier_list()?;
            self.expect_symbol(Symbol::RightParen)?;
            Fields::Named(names)
        } else {
            Fields::Wildcard
        };

        self.expect_keyword(Keyword::Values)?;

        let mut values = Vec::new();
        loop {
            let tuple = self.parse_value_tuple()?;

            if let Fields::Named(names) = &fields
                && names.len() != tuple.len()
            {
                return Err(SyntaxError::ArityMismatch {
                    fields: names.len(),
                    values: tuple.len(),
                });
            }

            values.push(tuple);

            if !self.consume_symbol(Symbol::Comma) {
                break;
            }
        }

        let returning = self.parse_returning()?;

        Ok(Statement::Insert(InsertStatement {
            table,
            fields,
            values,
            returning,
        }))
    }

    fn parse_update_statement(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::Update)?;

        let table = self.expect_identifier()?;

        self.expect_keyword(Keyword::Set)?;

        let mut assignments = vec![self.parse_assignment()?];
        while self.consume_symbol(Symbol::Comma) {
            assignments.push(self.parse_assignment()?);
        }

        let conditions = self.parse_where()?;
        let returning = self.parse_returning()?;

        Ok(Statement::Update(UpdateStatement {
            table,
            assignments,
            conditions,
            returning,
        }))
    }

    fn parse_delete_statement(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::Delete)?;
        self.expect_keyword(Keyword::From)?;

        let table = self.expect_identifier()?;
        let conditions = self.parse_where()?;
        let returning = self.parse_returning()?;

        Ok(Statement::Delete(DeleteStatement {
            table,
            conditions,
            returning,
        }))
    }

    fn parse_create_statement(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::Create)?;
        self.expect_keyword(Keyword::Table)?;

        let if_not_exists = if self.consume_keyword(Keyword::If) {
            self.expect_keyword(Keyword::Not)?;
            self.expect_keyword(Keyword::Exists)?;
            true
        } else {
            false
        };

        let table = self.expect_identifier()?;

        self.expect_symbol(Symbol::LeftParen)?;

        let mut definitions = vec![self.parse_column_definition()?];
        while self.consume_symbol(Symbol::Comma) {
            definitions.push(self.parse_column_definition()?);
        }

        self.expect_symbol(Symbol::RightParen)?;

        Ok(Statement::Create(CreateStatement {
            table,
            if_not_exists,
            definitions,
        }))
    }

    fn parse_drop_statement(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::Drop)?;
        self.expect_keyword(Keyword::Table)?;

        let if_exists = if self.consume_keyword(Keyword::If) {
            self.expect_keyword(Keyword::Exists)?;
            true
        } else {
            false
        };

        let table = self.expect_identifier()?;

        Ok(Statement::Drop(DropStatement { table, if_exists }))
    }

    /// `* | ident (',' ident)*`
    fn parse_fields(&mut self) -> Result<Fields, SyntaxError> {
        if self.consume_if(&Token::Operator(Operator::Multiply)) {
            return Ok(Fields::Wildcard);
        }

        Ok(Fields::Named(self.parse_identifier_list()?))
    }

    fn parse_identifier_list(&mut self) -> Result<Vec<String>, SyntaxError> {
        let mut names = vec![self.expect_identifier()?];
        while self.consume_symbol(Symbol::Comma) {
            names.push(self.expect_identifier()?);
        }

        Ok(names)
    }

    /// `'(' literal (',' literal)* ')'`
    fn parse_value_tuple(&mut self) -> Result<Vec<Value>, SyntaxError> {
        self.expect_symbol(Symbol::LeftParen)?;

        let mut values = vec![self.expect_literal()?];
        while self.consume_symbol(Symbol::Comma) {
            values.push(self.expect_literal()?);
        }

        self.expect_symbol(Symbol::RightParen)?;

        Ok(values)
    }

    fn parse_assignment(&mut self) -> Result<Assignment, SyntaxError> {
        let field = self.expect_identifier()?;
        self.expect_token(&Token::Operator(Operator::Equal), "'='")?;
        let value = self.expect_literal()?;

        Ok(Assignment { field, value })
    }

    fn parse_column_definition(&mut self) -> Result<ColumnDef, SyntaxError> {
        let name = self.expect_identifier()?;

        let data_type = match self.next_token("a column type")? {
            Token::DataType(data_type) => data_type,
            other => return Err(Self::unexpected("a column type", &other)),
        };

        Ok(ColumnDef::new(&name, data_type))
    }

    fn parse_where(&mut self) -> Result<Conditions, SyntaxError> {
        if self.consume_keyword(Keyword::Where) {
            self.parse_conditions()
        } else {
            Ok(Vec::new())
        }
    }

    /// `condition ((AND | OR) condition)*`, folded so that AND binds
    /// tighter than OR.
    fn parse_conditions(&mut self) -> Result<Conditions, SyntaxError> {
        let mut groups = vec![vec![self.parse_condition()?]];

        loop {
            if self.consume_keyword(Keyword::And) {
                let condition = self.parse_condition()?;
                if let Some(group) = groups.last_mut() {
                    group.push(condition);
                }
            } else if self.consume_keyword(Keyword::Or) {
                groups.push(vec![self.parse_condition()?]);
            } else {
                break;
            }
        }

        Ok(groups)
    }

    fn parse_condition(&mut self) -> Result<Condition, SyntaxError> {
        let field = self.expect_identifier()?;

        let operator = match self.next_token("a comparison operator")? {
            Token::Operator(op) if op.is_comparison() => op,
            other => return Err(Self::unexpected("a comparison operator", &other)),
        };

        let value = self.expect_literal()?;

        Ok(Condition {
            field,
            operator,
            value,
        })
    }

    fn parse_returning(&mut self) -> Result<Fields, SyntaxError> {
        if self.consume_keyword(Keyword::Returning) {
            self.parse_fields()
        } else {
            Ok(Fields::default())
        }
    }

    fn current(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn is_exhausted(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn next_token(&mut self, expected: &str) -> Result<Token<'src>, SyntaxError> {
        if self.is_exhausted() {
            return Err(SyntaxError::UnexpectedEnd {
                expected: expected.to_owned(),
            });
        }

        let token = self.tokens[self.position].clone();
        self.advance();

        Ok(token)
    }

    fn unexpected(expected: &str, found: &Token) -> SyntaxError {
        SyntaxError::UnexpectedToken {
            expected: expected.to_owned(),
            found: found.to_string(),
        }
    }

    fn expect_token(&mut self, expected: &Token, description: &str) -> Result<(), SyntaxError> {
        let token = self.next_token(description)?;
        if token == *expected {
            Ok(())
        } else {
            Err(Self::unexpected(description, &token))
        }
    }

    fn consume_if(&mut self, expected: &Token) -> bool {
        if self.current() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume_keyword(&mut self, expected: Keyword) -> bool {
        self.consume_if(&Token::Keyword(expected))
    }

    fn consume_symbol(&mut self, expected: Symbol) -> bool {
        self.consume_if(&Token::Symbol(expected))
    }

    fn expect_keyword(&mut self, expected: Keyword) -> Result<(), SyntaxError> {
        self.expect_token(&Token::Keyword(expected), &format!("keyword {expected}"))
    }

    fn expect_symbol(&mut self, expected: Symbol) -> Result<(), SyntaxError> {
        self.expect_token(&Token::Symbol(expected), &format!("'{}'", expected.to_char()))
    }

    fn expect_identifier(&mut self) -> Result<String, SyntaxError> {
        match self.next_token("an identifier")? {
            Token::Identifier(ident) => Ok(ident.to_owned()),
            other => Err(Self::unexpected("an identifier", &other)),
        }
    }

    fn expect_literal(&mut self) -> Result<Value, SyntaxError> {
        match self.next_token("a literal value")? {
            Token::Literal(literal) => Ok(literal.into()),
            other => Err(Self::unexpected("a literal value", &other)),
        }
    }
}
