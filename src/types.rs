use crate::environment::Environment;
use crate::evaluator;
use derive_more::Deref;
use std::fmt;
use std::fmt::Formatter;
use std::ops::{RangeFrom, RangeInclusive};
use std::rc::Rc;

/// An identifier string: a variable or parameter name, and the key type of
/// environment frames.
#[derive(Deref, Debug, PartialEq, Eq, Hash, Clone)]
pub struct Ident(pub String);

impl Ident {
    pub fn new(name: &str) -> Self {
        Ident(name.to_string())
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for Ident {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An identifier carried as data: read under at least one quote.
#[derive(Debug, Clone, PartialEq)]
pub struct Sym {
    pub name: String,
    pub qlevel: u32,
}

/// An ordered sequence of expressions. With `qlevel == 0` it is a call;
/// with `qlevel >= 1` it is quoted data and its last element is the
/// `NULL_SYM` sentinel (unless it is a dotted pair).
#[derive(Debug, Clone, PartialEq)]
pub struct ExprList {
    pub items: Vec<Expression>,
    pub qlevel: u32,
}

impl ExprList {
    /// True for the empty list and for any list whose final element is the
    /// null sentinel.
    pub fn ends_with_null(&self) -> bool {
        match self.items.last() {
            None => true,
            Some(last) => last.is_null(),
        }
    }
}

/// A user-defined procedure together with the environment captured at its
/// creation, so free variables resolve in the defining scope.
#[derive(Clone)]
pub struct Lambda {
    pub name: Option<Ident>,
    pub params: Vec<Ident>,
    pub body: Vec<Expression>,
    pub env: Rc<Environment>,
}

impl fmt::Debug for Lambda {
    // Not derived: the captured environment may well contain this Lambda.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lambda{{name: {:?}, params: {:?}, body: {:?}}}",
            self.name, self.params, self.body
        )
    }
}

/// Non-language expressions the reader hands to its caller: `(exit)` and a
/// stray `)`. Neither survives into evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpecialKind {
    Exit,
    CloseBracket,
}

#[derive(Debug, Clone)]
pub enum Expression {
    Number { val: f64, qlevel: u32 },
    Variable(Ident),
    Symbol(Sym),
    List(Rc<ExprList>),
    Primitive(&'static PrimitiveFn),
    Lambda(Rc<Lambda>),
    Special(SpecialKind),
    Void,
}

/// The empty list `()`, also the proper-list terminator.
#[allow(non_snake_case)]
pub fn NULL_SYM() -> Expression {
    Expression::Symbol(Sym {
        name: "()".to_string(),
        qlevel: 1,
    })
}

/// The false value; the only falsy expression.
#[allow(non_snake_case)]
pub fn FALSE_SYM() -> Expression {
    Expression::Symbol(Sym {
        name: "#f".to_string(),
        qlevel: 1,
    })
}

/// The true value.
#[allow(non_snake_case)]
pub fn TRUE_SYM() -> Expression {
    Expression::Symbol(Sym {
        name: "#t".to_string(),
        qlevel: 1,
    })
}

impl Expression {
    pub fn number(val: f64) -> Self {
        Expression::Number { val, qlevel: 0 }
    }

    pub fn variable(name: &str) -> Self {
        Expression::Variable(Ident::new(name))
    }

    pub fn symbol(name: &str, qlevel: u32) -> Self {
        Expression::Symbol(Sym {
            name: name.to_string(),
            qlevel,
        })
    }

    pub fn list(items: Vec<Expression>, qlevel: u32) -> Self {
        Expression::List(Rc::new(ExprList { items, qlevel }))
    }

    pub fn boolean(value: bool) -> Self {
        if value {
            TRUE_SYM()
        } else {
            FALSE_SYM()
        }
    }

    /// Structural check for the `()` singleton; pointer identity is never
    /// relied upon.
    pub fn is_null(&self) -> bool {
        match self {
            Expression::Symbol(s) => s.name == "()" && s.qlevel == 1,
            _ => false,
        }
    }

    pub fn is_false(&self) -> bool {
        match self {
            Expression::Symbol(s) => s.name == "#f" && s.qlevel == 1,
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expression::Number { val, .. } => Some(*val),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Rc<ExprList>> {
        match self {
            Expression::List(list) => Some(list),
            _ => None,
        }
    }
}

/// Only `#f` is falsy; every other expression, `0`, `()` and `#<void>`
/// included, counts as true.
pub fn truthy(expr: &Expression) -> bool {
    !expr.is_false()
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        use Expression::*;
        match (self, other) {
            // the same numeric datum regardless of how deeply it was quoted
            (Number { val: x, .. }, Number { val: y, .. }) => x == y,
            (Variable(a), Variable(b)) => a == b,
            (Symbol(a), Symbol(b)) => a == b,
            (List(a), List(b)) => a.qlevel == b.qlevel && a.items == b.items,
            (Primitive(a), Primitive(b)) => a.name == b.name,
            (Lambda(a), Lambda(b)) => Rc::ptr_eq(a, b),
            (Special(a), Special(b)) => a == b,
            (Void, Void) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Arity {
    Between(RangeInclusive<usize>),
    AtLeast(RangeFrom<usize>),
}

impl Arity {
    pub(crate) const fn exactly(n: usize) -> Self {
        Self::Between(n..=n)
    }

    pub(crate) const fn at_least(n: usize) -> Self {
        Self::AtLeast(n..)
    }

    pub(crate) fn contains(&self, n: usize) -> bool {
        match self {
            Self::Between(range) => range.contains(&n),
            Self::AtLeast(range) => range.contains(&n),
        }
    }

    pub(crate) fn validate_for(&self, n: usize, name: &str) -> Result<(), evaluator::Error> {
        match self.contains(n) {
            true => Ok(()),
            false => Err(evaluator::Error::ArityMismatch {
                name: name.to_string(),
                expected: self.clone(),
                got: n,
            }),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Between(r) => {
                if r.start() == r.end() {
                    write!(f, "exactly {}", r.start())
                } else {
                    write!(f, "from {} to {}", r.start(), r.end())
                }
            }
            Arity::AtLeast(r) => write!(f, "at least {}", r.start),
        }
    }
}

/// A built-in procedure. Self-evaluating and not constructible from source.
pub struct PrimitiveFn {
    pub name: &'static str,
    pub arity: Arity,
    pub fn_ptr: fn(&[Expression]) -> evaluator::Result,
}

impl fmt::Debug for PrimitiveFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "primitive function #<{}>", self.name)
    }
}
