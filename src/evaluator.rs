use crate::environment::Environment;
use crate::special_forms;
use crate::types::{Arity, ExprList, Expression, Lambda};
use std::fmt;
use std::rc::Rc;

pub type Result<T = Expression> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    UnboundIdentifier(String),
    MissingProcedure,
    BadSyntax(&'static str),
    NotAProcedure,
    ArityMismatch {
        name: String,
        expected: Arity,
        got: usize,
    },
    ContractViolation {
        name: &'static str,
        expected: &'static str,
        given: String,
    },
    Load(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnboundIdentifier(name) => write!(f, "unbound identifier: {}", name),
            Error::MissingProcedure => write!(f, "#%app: missing procedure expression"),
            Error::BadSyntax(form) => write!(f, "{}: bad syntax", form),
            Error::NotAProcedure => write!(f, "application: not a procedure"),
            Error::ArityMismatch {
                name,
                expected,
                got,
            } => write!(
                f,
                "{}: arity mismatch\n expected: {}\n given: {}",
                name, expected, got
            ),
            Error::ContractViolation {
                name,
                expected,
                given,
            } => write!(
                f,
                "{}: contract violation\n expected: {}\n given: {}",
                name, expected, given
            ),
            Error::Load(path) => write!(f, "load: couldn't load file `{}`", path),
        }
    }
}

pub fn eval(expr: &Expression, env: &Rc<Environment>) -> Result {
    log::debug!("eval {:?}", expr);
    match expr {
        Expression::Number { .. }
        | Expression::Symbol(_)
        | Expression::Primitive(_)
        | Expression::Lambda(_)
        | Expression::Special(_)
        | Expression::Void => Ok(expr.clone()),
        Expression::Variable(name) => env
            .get(name)
            .ok_or_else(|| Error::UnboundIdentifier(name.to_string())),
        // quoted lists are data
        Expression::List(list) if list.qlevel > 0 => Ok(expr.clone()),
        Expression::List(list) => eval_call(list, env),
    }
}

fn eval_call(list: &ExprList, env: &Rc<Environment>) -> Result {
    let (head, args) = match list.items.split_first() {
        None => return Err(Error::MissingProcedure),
        Some(pair) => pair,
    };

    // special forms dispatch on the head name before any lookup, so user
    // bindings cannot shadow them
    if let Expression::Variable(name) = head {
        match name.as_ref() {
            "define" => return special_forms::apply_define(args, env),
            "if" => return special_forms::apply_if(args, env),
            "cond" => return special_forms::apply_cond(args, env),
            "lambda" => return special_forms::apply_lambda(args, env),
            "load" => return special_forms::apply_load(args, env),
            "and" => return special_forms::apply_and(args, env),
            "or" => return special_forms::apply_or(args, env),
            _ => {}
        }
    }

    let procedure = eval(head, env)?;
    let args = evaluate_sequence_elementwise(args, env)?;
    apply(&procedure, args)
}

pub fn apply(procedure: &Expression, args: Vec<Expression>) -> Result {
    log::debug!("apply {:?} to {} args", procedure, args.len());
    match procedure {
        Expression::Primitive(primitive) => {
            primitive.arity.validate_for(args.len(), primitive.name)?;
            (primitive.fn_ptr)(&args)
        }
        Expression::Lambda(lambda) => call_lambda(lambda, args),
        _ => Err(Error::NotAProcedure),
    }
}

fn call_lambda(lambda: &Rc<Lambda>, args: Vec<Expression>) -> Result {
    let name: &str = match &lambda.name {
        Some(name) => name.as_ref(),
        None => "#<lambda>",
    };
    Arity::exactly(lambda.params.len()).validate_for(args.len(), name)?;

    // the call frame chains to the environment captured when the lambda was
    // created, not the caller's
    let frame = Environment::extend(&lambda.env, &lambda.params, args);
    eval_body(&lambda.body, &frame)
}

/// Evaluates `body` in textual order; the last value is the result.
pub(crate) fn eval_body(body: &[Expression], env: &Rc<Environment>) -> Result {
    let mut result = Expression::Void;
    for expr in body {
        result = eval(expr, env)?;
    }
    Ok(result)
}

pub fn evaluate_sequence_elementwise(
    seq: &[Expression],
    env: &Rc<Environment>,
) -> Result<Vec<Expression>> {
    seq.iter().map(|expr| eval(expr, env)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Reader;
    use crate::types::{FALSE_SYM, NULL_SYM, TRUE_SYM};

    fn eval_str(input: &str, env: &Rc<Environment>) -> Result {
        let expr = Reader::new(input)
            .next_expression()
            .expect("no expression")
            .expect("read error");
        eval(&expr, env)
    }

    fn eval_all(inputs: &[&str], env: &Rc<Environment>) -> Result {
        let mut result = Ok(Expression::Void);
        for input in inputs {
            result = eval_str(input, env);
        }
        result
    }

    #[test]
    fn arithmetic() {
        let env = Environment::global();
        assert_eq!(eval_str("(+ 1 2 3)", &env).unwrap(), Expression::number(6.0));
    }

    #[test]
    fn define_and_call() {
        let env = Environment::global();
        let defined = eval_str("(define (sq x) (* x x))", &env).unwrap();
        assert!(matches!(defined, Expression::Lambda(_)));
        assert_eq!(
            eval_str("(sq 9)", &env).unwrap(),
            Expression::number(81.0)
        );
    }

    #[test]
    fn nested_conditionals() {
        let env = Environment::global();
        assert_eq!(
            eval_str("(if (< 3 2) 10 (if (= 2 2) 20 30))", &env).unwrap(),
            Expression::number(20.0)
        );
    }

    #[test]
    fn quoted_lists_self_evaluate() {
        let env = Environment::global();
        let value = eval_str("'(a b)", &env).unwrap();
        assert!(matches!(&value, Expression::List(list) if list.qlevel == 1));
    }

    #[test]
    fn boolean_literals_resolve_to_singletons() {
        let env = Environment::global();
        assert_eq!(eval_str("#t ", &env).unwrap(), TRUE_SYM());
        assert_eq!(eval_str("#f ", &env).unwrap(), FALSE_SYM());
    }

    #[test]
    fn unbound_identifier() {
        let env = Environment::global();
        let err = eval_str("nope ", &env).unwrap_err();
        assert_eq!(err.to_string(), "unbound identifier: nope");
    }

    #[test]
    fn empty_application() {
        let env = Environment::global();
        let err = eval_str("()", &env).unwrap_err();
        assert_eq!(err.to_string(), "#%app: missing procedure expression");
    }

    #[test]
    fn applying_a_number_fails() {
        let env = Environment::global();
        let err = eval_str("(5 1 2)", &env).unwrap_err();
        assert_eq!(err.to_string(), "application: not a procedure");
    }

    #[test]
    fn lambda_arity_is_exact() {
        let env = Environment::global();
        eval_str("(define (sq x) (* x x))", &env).unwrap();
        let err = eval_str("(sq 1 2)", &env).unwrap_err();
        assert_eq!(
            err.to_string(),
            "sq: arity mismatch\n expected: exactly 1\n given: 2"
        );
    }

    #[test]
    fn closures_capture_the_defining_environment() {
        let env = Environment::global();
        let result = eval_all(
            &[
                "(define (mk x) (lambda (y) (+ x y)))",
                "(define add10 (mk 10))",
                "(add10 5)",
            ],
            &env,
        );
        assert_eq!(result.unwrap(), Expression::number(15.0));
    }

    #[test]
    fn recursion() {
        let env = Environment::global();
        let result = eval_all(
            &[
                "(define (fact n) (if (= n 0) 1 (* n (fact (- n 1)))))",
                "(fact 6)",
            ],
            &env,
        );
        assert_eq!(result.unwrap(), Expression::number(720.0));
    }

    #[test]
    fn arguments_evaluate_left_to_right() {
        let env = Environment::global();
        let result = eval_all(
            &[
                "(define x 1)",
                "(+ (define x (* x 10)) (define x (+ x 2)))",
                "x ",
            ],
            &env,
        );
        // x is rebound to 10 by the first argument, then to 12 by the second
        assert_eq!(result.unwrap(), Expression::number(12.0));
    }

    #[test]
    fn special_forms_are_not_shadowable() {
        let env = Environment::global();
        eval_str("(define x 1)", &env).unwrap();
        // rebinding the name `if` does not change dispatch
        eval_str("(define if 5)", &env).unwrap();
        assert_eq!(
            eval_str("(if (= 1 1) 2 3)", &env).unwrap(),
            Expression::number(2.0)
        );
    }

    #[test]
    fn null_literal_evaluates_to_itself() {
        let env = Environment::global();
        assert_eq!(eval_str("'()", &env).unwrap(), NULL_SYM());
    }
}
