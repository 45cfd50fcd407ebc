use crate::parser::dialect::DIALECT_MYSQL;
use crate::parser::error::ParseErrorKind;
use crate::parser::ParseError;

use sqlparser::tokenizer::{Token, Tokenizer};
use std::fs;
use std::ops::Deref;
use std::path::Path;


fn is_trivia(token: &Token) -> bool {
    matches!(token, Token::Whitespace(_) | Token::EOF)
}


/// Executable SQL statements, in file order, each terminated with a semicolon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementCollection {
    inner: Vec<String>,
}

impl StatementCollection {
    pub fn new() -> Self {
        StatementCollection { inner: vec![] }
    }

    /// Split `sql` on top-level semicolons.
    /// Semicolons inside literals and comments are left alone by the tokenizer,
    /// and fragments made only of whitespace or comments are dropped.
    /// Literals keep their escapes as written.
    pub fn parse_sql(sql: &str) -> Result<Self, ParseError> {
        let tokens = Tokenizer::new(&DIALECT_MYSQL, sql)
            .with_unescape(false)
            .tokenize()?;

        let mut collection = StatementCollection::new();
        let mut current_tokens = vec![];

        for token in tokens {
            if token == Token::SemiColon {
                collection.push_tokens(&current_tokens);
                current_tokens.clear();
            } else {
                current_tokens.push(token);
            }
        }

        // The last statement may not end with a semicolon
        collection.push_tokens(&current_tokens);

        Ok(collection)
    }

    pub fn from_file(path: &Path) -> Result<Self, ParseError> {
        if !path.is_file() {
            return Err(ParseError { kind: ParseErrorKind::FileNotFound(path.to_path_buf()) });
        }

        let sql = fs::read_to_string(path)
            .map_err(|source| ParseError { kind: ParseErrorKind::Io { path: path.to_path_buf(), source } })?;

        Self::parse_sql(&sql)
    }

    fn push_tokens(&mut self, tokens: &[Token]) {
        let Some(start) = tokens.iter().position(|t| !is_trivia(t)) else {
            return;
        };
        let end = tokens.iter().rposition(|t| !is_trivia(t)).unwrap_or(start);

        let statement: String = tokens[start..=end]
            .iter()
            .map(Token::to_string)
            .collect();

        self.inner.push(format!("{statement};"));
    }
}

impl Deref for StatementCollection {
    type Target = Vec<String>;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
