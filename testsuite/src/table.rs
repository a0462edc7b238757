//! A small s-expression format for row list fixtures.
//!
//! ```text
//! (table
//!   (vars ?a ?b ?c)
//!   (row (?a 1) (?b 2))
//!   (row (?c 3))
//!   (row))
//! ```
//!
//! `(vars ...)` is optional and declares schema variables that no row binds. The schema always
//! contains every bound variable. `(row)` is the identity row.

use anyhow::{anyhow, bail, ensure, Context, Result};
use quack::common::{RowList, RowListBuilder};
use quack::model::{JoinKey, Row, RowBuilder, RowValue, Variable};
use std::fmt::Display;
use std::iter::Peekable;
use std::str::FromStr;
use std::vec::IntoIter;

/// Parses a table fixture into a materialized [RowList].
pub fn parse_table<X>(input: &str) -> Result<RowList<X>>
where
    X: RowValue + FromStr,
    X::Err: Display,
{
    let mut parser = TableParser {
        tokens: tokenize(input).into_iter().peekable(),
    };
    let table = parser.parse_table()?;
    ensure!(
        parser.tokens.next().is_none(),
        "Unexpected content after the table"
    );
    Ok(table)
}

/// Parses a join key such as `?b ?a`. The empty string is the empty key.
pub fn parse_key(input: &str) -> Result<JoinKey> {
    let variables = input
        .split_whitespace()
        .map(parse_variable)
        .collect::<Result<Vec<_>>>()?;
    Ok(JoinKey::try_from_variables(variables)?)
}

/// Parses a single variable such as `?a`.
pub fn parse_variable(token: &str) -> Result<Variable> {
    let name = token
        .strip_prefix('?')
        .ok_or_else(|| anyhow!("Variables must start with '?', found {token}"))?;
    Variable::new(name).with_context(|| format!("Invalid variable {token}"))
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'input> {
    Open,
    Close,
    Atom(&'input str),
}

fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut atom_start = None;
    for (idx, character) in input.char_indices() {
        if character == '(' || character == ')' || character.is_whitespace() {
            if let Some(start) = atom_start.take() {
                tokens.push(Token::Atom(&input[start..idx]));
            }
            match character {
                '(' => tokens.push(Token::Open),
                ')' => tokens.push(Token::Close),
                _ => {}
            }
        } else if atom_start.is_none() {
            atom_start = Some(idx);
        }
    }
    if let Some(start) = atom_start {
        tokens.push(Token::Atom(&input[start..]));
    }
    tokens
}

struct TableParser<'input> {
    tokens: Peekable<IntoIter<Token<'input>>>,
}

impl<'input> TableParser<'input> {
    fn parse_table<X>(&mut self) -> Result<RowList<X>>
    where
        X: RowValue + FromStr,
        X::Err: Display,
    {
        self.expect_open()?;
        self.expect_keyword("table")?;

        let mut builder = RowListBuilder::new();
        while self.tokens.next_if_eq(&Token::Close).is_none() {
            self.expect_open()?;
            match self.expect_atom()? {
                "vars" => {
                    let mut variables = Vec::new();
                    while let Some(Token::Atom(token)) = self.tokens.next_if(is_atom) {
                        variables.push(parse_variable(token)?);
                    }
                    self.expect_close()?;
                    builder = builder.with_variables(variables);
                }
                "row" => {
                    let row = self
                        .parse_row()
                        .with_context(|| format!("Invalid row {}", builder.len()))?;
                    builder.add_row(row);
                }
                other => bail!("Expected 'vars' or 'row', found '{other}'"),
            }
        }
        Ok(builder.build())
    }

    /// Parses the bindings of a row, after the `row` keyword.
    fn parse_row<X>(&mut self) -> Result<Row<X>>
    where
        X: RowValue + FromStr,
        X::Err: Display,
    {
        let mut builder = RowBuilder::new();
        while self.tokens.next_if_eq(&Token::Close).is_none() {
            self.expect_open()?;
            let variable = parse_variable(self.expect_atom()?)?;
            let token = self.expect_atom()?;
            let value = X::from_str(token)
                .map_err(|error| anyhow!("Invalid value {token} of {variable}: {error}"))?;
            self.expect_close()?;
            builder.add(variable, value)?;
        }
        Ok(builder.build())
    }

    fn expect_open(&mut self) -> Result<()> {
        match self.tokens.next() {
            Some(Token::Open) => Ok(()),
            token => bail!("Expected '(', found {token:?}"),
        }
    }

    fn expect_close(&mut self) -> Result<()> {
        match self.tokens.next() {
            Some(Token::Close) => Ok(()),
            token => bail!("Expected ')', found {token:?}"),
        }
    }

    fn expect_atom(&mut self) -> Result<&'input str> {
        match self.tokens.next() {
            Some(Token::Atom(atom)) => Ok(atom),
            token => bail!("Expected an atom, found {token:?}"),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        let atom = self.expect_atom()?;
        ensure!(atom == keyword, "Expected '{keyword}', found '{atom}'");
        Ok(())
    }
}

fn is_atom(token: &Token<'_>) -> bool {
    matches!(token, Token::Atom(_))
}
