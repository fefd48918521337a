use crate::tokens::{Lexer, Token};
use crate::types::{Expression, SpecialKind, NULL_SYM};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// An error token from the lexer, passed through verbatim.
    Lex(String),
    UnclosedList,
    BadNumber(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lex(msg) => write!(f, "{}", msg),
            Error::UnclosedList => write!(f, "read-syntax: expected a `)` to close `(`"),
            Error::BadNumber(lexeme) => write!(f, "read-syntax: bad number `{}`", lexeme),
        }
    }
}

pub type Result = std::result::Result<Expression, Error>;

/// A streaming parser: pulls tokens from the lexer one at a time and
/// produces exactly one top-level expression per `next_expression` call.
pub struct Reader<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a str) -> Self {
        Reader {
            lexer: Lexer::new(input),
        }
    }

    /// The next top-level expression, or `None` when the input is exhausted.
    pub fn next_expression(&mut self) -> Option<Result> {
        self.read(0)
    }

    fn read(&mut self, qlevel: u32) -> Option<Result> {
        let token = self.lexer.next_token()?;
        log::debug!("read token {}", token);
        match token {
            Token::Error(msg) => Some(Err(Error::Lex(msg))),
            Token::Eof => None,
            Token::Number(text) => match text.parse::<f64>() {
                Ok(val) => Some(Ok(Expression::Number { val, qlevel })),
                Err(_) => Some(Err(Error::BadNumber(text.to_string()))),
            },
            Token::Identifier(name) => Some(Ok(if qlevel == 0 {
                Expression::variable(name)
            } else {
                Expression::symbol(name, qlevel)
            })),
            Token::Str(text) => Some(Ok(Expression::symbol(text, qlevel))),
            Token::OpenParen => Some(self.read_list(qlevel)),
            Token::CloseParen => Some(Ok(Expression::Special(SpecialKind::CloseBracket))),
            Token::Quote => self.read(qlevel + 1),
            Token::Skip => self.read(qlevel),
        }
    }

    // children are read at the same qlevel as the opening paren
    fn read_list(&mut self, qlevel: u32) -> Result {
        let mut items = Vec::new();
        loop {
            match self.read(qlevel) {
                None => return Err(Error::UnclosedList),
                Some(Err(e)) => return Err(e),
                Some(Ok(Expression::Special(SpecialKind::CloseBracket))) => break,
                Some(Ok(expr)) => items.push(expr),
            }
        }

        // an empty quoted list is the null singleton itself
        if items.is_empty() && qlevel == 1 {
            return Ok(NULL_SYM());
        }

        if qlevel == 0 && items.len() == 1 {
            if let Expression::Variable(name) = &items[0] {
                if name.as_ref() == "exit" {
                    return Ok(Expression::Special(SpecialKind::Exit));
                }
            }
        }

        // quoted lists carry the proper-list terminator
        if qlevel > 0 {
            items.push(NULL_SYM());
        }

        Ok(Expression::list(items, qlevel))
    }
}

impl<'a> Iterator for Reader<'a> {
    type Item = Result;

    fn next(&mut self) -> Option<Result> {
        self.next_expression()
    }
}
