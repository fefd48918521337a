use crate::environment::Environment;
use crate::evaluator::{eval, eval_body, Error, Result};
use crate::interpreter;
use crate::types::{truthy, ExprList, Expression, Ident, Lambda, FALSE_SYM, TRUE_SYM};
use std::fs;
use std::rc::Rc;

/// `(define <name> <expr>)` binds the evaluated expression in the current
/// frame. `(define (<name> <params>…) <body>…)` is sugar for binding a named
/// lambda. Both return the bound value.
pub fn apply_define(args: &[Expression], env: &Rc<Environment>) -> Result {
    match args.split_first() {
        Some((Expression::Variable(name), rest)) => match rest {
            [value] => {
                let value = eval(value, env)?;
                env.set(name.clone(), value.clone());
                Ok(value)
            }
            _ => Err(Error::BadSyntax("define")),
        },
        Some((Expression::List(header), body)) if header.qlevel == 0 => {
            define_procedure(header, body, env)
        }
        _ => Err(Error::BadSyntax("define")),
    }
}

fn define_procedure(header: &ExprList, body: &[Expression], env: &Rc<Environment>) -> Result {
    if body.is_empty() {
        return Err(Error::BadSyntax("define"));
    }
    let (name, params) = match header.items.split_first() {
        Some((Expression::Variable(name), params)) => (name, params),
        _ => return Err(Error::BadSyntax("define")),
    };
    let params = extract_params(params, "define")?;
    let lambda = Expression::Lambda(Rc::new(Lambda {
        name: Some(name.clone()),
        params,
        body: body.to_vec(),
        env: env.clone(),
    }));
    env.set(name.clone(), lambda.clone());
    Ok(lambda)
}

pub fn apply_if(args: &[Expression], env: &Rc<Environment>) -> Result {
    if args.len() < 2 || args.len() > 3 {
        return Err(Error::BadSyntax("if"));
    }
    let condition = eval(&args[0], env)?;
    if condition.is_false() {
        if args.len() == 3 {
            eval(&args[2], env)
        } else {
            Ok(Expression::Void)
        }
    } else {
        eval(&args[1], env)
    }
}

/// Clauses are `(test body…)`; the literal `else` in test position always
/// matches. No matching clause yields `#<void>`.
pub fn apply_cond(args: &[Expression], env: &Rc<Environment>) -> Result {
    for clause in args {
        let clause = match clause.as_list() {
            Some(list) if list.qlevel == 0 && list.items.len() >= 2 => list,
            _ => return Err(Error::BadSyntax("cond")),
        };
        let test = &clause.items[0];
        let matched = match test {
            Expression::Variable(name) if name.as_ref() == "else" => true,
            _ => truthy(&eval(test, env)?),
        };
        if matched {
            return eval_body(&clause.items[1..], env);
        }
    }
    Ok(Expression::Void)
}

/// `(lambda (<params>…) <body>…)` captures the environment in effect now;
/// free variables in the body resolve against it for the lambda's lifetime.
pub fn apply_lambda(args: &[Expression], env: &Rc<Environment>) -> Result {
    let (params, body) = match args.split_first() {
        Some((Expression::List(params), body)) if params.qlevel == 0 && !body.is_empty() => {
            (params, body)
        }
        _ => return Err(Error::BadSyntax("lambda")),
    };
    let params = extract_params(&params.items, "lambda")?;
    Ok(Expression::Lambda(Rc::new(Lambda {
        name: None,
        params,
        body: body.to_vec(),
        env: env.clone(),
    })))
}

fn extract_params(params: &[Expression], form: &'static str) -> Result<Vec<Ident>> {
    params
        .iter()
        .map(|param| match param {
            Expression::Variable(name) => Ok(name.clone()),
            _ => Err(Error::BadSyntax(form)),
        })
        .collect()
}

/// `(load <filename>)` slurps the named file and runs its top-level forms in
/// the current environment, printing each result. Errors inside the file
/// print without aborting the session.
pub fn apply_load(args: &[Expression], env: &Rc<Environment>) -> Result {
    let name = match args {
        [Expression::Variable(name)] => name,
        _ => return Err(Error::BadSyntax("load")),
    };
    let contents =
        fs::read_to_string(name.as_ref()).map_err(|_| Error::Load(name.to_string()))?;
    interpreter::interpret(&contents, env);
    Ok(Expression::Void)
}

/// Short-circuit conjunction: the first `#f` wins, otherwise the last value;
/// `#t` on no arguments. Arguments past the deciding one are not evaluated.
pub fn apply_and(args: &[Expression], env: &Rc<Environment>) -> Result {
    let mut last = TRUE_SYM();
    for arg in args {
        let value = eval(arg, env)?;
        if value.is_false() {
            return Ok(value);
        }
        last = value;
    }
    Ok(last)
}

/// Short-circuit disjunction: the first truthy value wins; `#f` otherwise.
pub fn apply_or(args: &[Expression], env: &Rc<Environment>) -> Result {
    for arg in args {
        let value = eval(arg, env)?;
        if !value.is_false() {
            return Ok(value);
        }
    }
    Ok(FALSE_SYM())
}
