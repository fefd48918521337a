use crate::cmdline;
use crate::environment::Environment;
use crate::evaluator::{self, eval};
use crate::printer::pr_str;
use crate::reader::{self, Reader};
use crate::types::{Expression, SpecialKind};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    Ok,
    Exited,
    Error,
}

#[derive(Debug)]
pub enum Error {
    Read(reader::Error),
    Eval(evaluator::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Read(e) => write!(f, "{}", e),
            Error::Eval(e) => write!(f, "{}", e),
        }
    }
}

/// Parses and evaluates every top-level expression in `input` against `env`,
/// printing each result on its own line. Errors are printed and consumed so
/// the session survives them; `(exit)` ends it.
pub fn interpret(input: &str, env: &Rc<Environment>) -> Status {
    let styles = cmdline::styles();
    let mut reader = Reader::new(input);
    let mut status = Status::Ok;
    while let Some(item) = reader.next_expression() {
        match item {
            Err(e) => {
                println!("{}", styles.error.paint(Error::Read(e).to_string()));
                status = Status::Error;
            }
            Ok(Expression::Special(SpecialKind::Exit)) => return Status::Exited,
            // the lexer queues its own message right behind a stray `)`
            Ok(Expression::Special(SpecialKind::CloseBracket)) => continue,
            Ok(expr) => match eval(&expr, env) {
                Ok(value) => println!("{}", pr_str(&value, 0)),
                Err(e) => {
                    println!("{}", styles.error.paint(Error::Eval(e).to_string()));
                    status = Status::Error;
                }
            },
        }
    }
    status
}
