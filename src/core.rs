use crate::evaluator::{self, Error};
use crate::printer;
use crate::types::{Arity, ExprList, Expression, PrimitiveFn, NULL_SYM};
use std::collections::HashMap;
use std::rc::Rc;

fn contract_violation(
    name: &'static str,
    expected: &'static str,
    given: &Expression,
) -> Error {
    Error::ContractViolation {
        name,
        expected,
        given: printer::pr_str(given, 0),
    }
}

fn number_arg(name: &'static str, arg: &Expression) -> evaluator::Result<f64> {
    arg.as_number()
        .ok_or_else(|| contract_violation(name, "number?", arg))
}

fn grab_numbers(name: &'static str, args: &[Expression]) -> evaluator::Result<Vec<f64>> {
    args.iter().map(|arg| number_arg(name, arg)).collect()
}

// remainder and quotient work on numbers truncated through i64
fn integer_arg(name: &'static str, arg: &Expression) -> evaluator::Result<i64> {
    let val = number_arg(name, arg)?;
    if !val.is_finite() || val < i64::MIN as f64 || val >= i64::MAX as f64 + 1.0 {
        return Err(contract_violation(name, "integer?", arg));
    }
    Ok(val as i64)
}

fn sum_(args: &[Expression]) -> evaluator::Result {
    let value = grab_numbers("+", args)?.iter().sum();
    Ok(Expression::number(value))
}

fn mul_(args: &[Expression]) -> evaluator::Result {
    let value = grab_numbers("*", args)?.iter().product();
    Ok(Expression::number(value))
}

fn sub_(args: &[Expression]) -> evaluator::Result {
    let nums = grab_numbers("-", args)?;
    let value = match nums.split_first() {
        None => 0.0,
        Some((first, [])) => -first,
        Some((first, rest)) => rest.iter().fold(*first, |acc, x| acc - x),
    };
    Ok(Expression::number(value))
}

fn div_(args: &[Expression]) -> evaluator::Result {
    let nums = grab_numbers("/", args)?;
    let value = match nums.split_first() {
        None => 1.0,
        Some((first, [])) => 1.0 / first,
        Some((first, rest)) => rest.iter().fold(*first, |acc, x| acc / x),
    };
    Ok(Expression::number(value))
}

// comparisons chain pairwise left to right; zero or one argument is #t
fn chained_compare(
    name: &'static str,
    args: &[Expression],
    cmp: fn(f64, f64) -> bool,
) -> evaluator::Result {
    let nums = grab_numbers(name, args)?;
    let holds = nums.windows(2).all(|pair| cmp(pair[0], pair[1]));
    Ok(Expression::boolean(holds))
}

fn num_eq_(args: &[Expression]) -> evaluator::Result {
    chained_compare("=", args, |a, b| a == b)
}

fn lt_(args: &[Expression]) -> evaluator::Result {
    chained_compare("<", args, |a, b| a < b)
}

fn le_(args: &[Expression]) -> evaluator::Result {
    chained_compare("<=", args, |a, b| a <= b)
}

fn gt_(args: &[Expression]) -> evaluator::Result {
    chained_compare(">", args, |a, b| a > b)
}

fn ge_(args: &[Expression]) -> evaluator::Result {
    chained_compare(">=", args, |a, b| a >= b)
}

fn is_number_(args: &[Expression]) -> evaluator::Result {
    Ok(Expression::boolean(args[0].as_number().is_some()))
}

fn is_null_(args: &[Expression]) -> evaluator::Result {
    Ok(Expression::boolean(args[0].is_null()))
}

fn is_pair_(args: &[Expression]) -> evaluator::Result {
    let pair = matches!(args[0].as_list(), Some(list) if list.items.len() >= 2);
    Ok(Expression::boolean(pair))
}

fn is_list_(args: &[Expression]) -> evaluator::Result {
    let proper = args[0].is_null()
        || matches!(args[0].as_list(), Some(list) if list.ends_with_null());
    Ok(Expression::boolean(proper))
}

fn remainder_(args: &[Expression]) -> evaluator::Result {
    let a = integer_arg("remainder", &args[0])?;
    let b = integer_arg("remainder", &args[1])?;
    if b == 0 {
        return Err(contract_violation("remainder", "nonzero-integer?", &args[1]));
    }
    Ok(Expression::number(a.wrapping_rem(b) as f64))
}

fn quotient_(args: &[Expression]) -> evaluator::Result {
    let a = integer_arg("quotient", &args[0])?;
    let b = integer_arg("quotient", &args[1])?;
    if b == 0 {
        return Err(contract_violation("quotient", "nonzero-integer?", &args[1]));
    }
    Ok(Expression::number(a.wrapping_div(b) as f64))
}

fn expt_(args: &[Expression]) -> evaluator::Result {
    let base = number_arg("expt", &args[0])?;
    let exponent = number_arg("expt", &args[1])?;
    Ok(Expression::number(base.powf(exponent)))
}

fn min_(args: &[Expression]) -> evaluator::Result {
    let nums = grab_numbers("min", args)?;
    let first = nums[0];
    Ok(Expression::number(nums.into_iter().fold(first, f64::min)))
}

fn max_(args: &[Expression]) -> evaluator::Result {
    let nums = grab_numbers("max", args)?;
    let first = nums[0];
    Ok(Expression::number(nums.into_iter().fold(first, f64::max)))
}

fn list_(args: &[Expression]) -> evaluator::Result {
    if args.is_empty() {
        return Ok(NULL_SYM());
    }
    let mut items = args.to_vec();
    items.push(NULL_SYM());
    Ok(Expression::list(items, 1))
}

fn cons_(args: &[Expression]) -> evaluator::Result {
    let first = args[0].clone();
    let second = &args[1];
    match second.as_list() {
        // consing onto a proper list splices it in
        Some(list) if list.qlevel <= 1 => {
            let mut items = Vec::with_capacity(list.items.len() + 1);
            items.push(first);
            items.extend(list.items.iter().cloned());
            Ok(Expression::list(items, 1))
        }
        _ => Ok(Expression::list(vec![first, second.clone()], 1)),
    }
}

fn pair_arg<'a>(
    name: &'static str,
    arg: &'a Expression,
) -> evaluator::Result<&'a Rc<ExprList>> {
    match arg.as_list() {
        Some(list) if list.qlevel >= 1 && list.items.len() >= 2 => Ok(list),
        _ => Err(contract_violation(name, "pair?", arg)),
    }
}

fn car_(args: &[Expression]) -> evaluator::Result {
    let list = pair_arg("car", &args[0])?;
    Ok(list.items[0].clone())
}

fn cdr_(args: &[Expression]) -> evaluator::Result {
    let list = pair_arg("cdr", &args[0])?;
    // a two-element list is a dotted pair; its cdr is the element itself
    if list.items.len() == 2 {
        return Ok(list.items[1].clone());
    }
    Ok(Expression::list(list.items[1..].to_vec(), list.qlevel))
}

static SUM: PrimitiveFn = PrimitiveFn {
    name: "+",
    arity: Arity::at_least(0),
    fn_ptr: sum_,
};
static MUL: PrimitiveFn = PrimitiveFn {
    name: "*",
    arity: Arity::at_least(0),
    fn_ptr: mul_,
};
static SUB: PrimitiveFn = PrimitiveFn {
    name: "-",
    arity: Arity::at_least(0),
    fn_ptr: sub_,
};
static DIV: PrimitiveFn = PrimitiveFn {
    name: "/",
    arity: Arity::at_least(0),
    fn_ptr: div_,
};
static NUM_EQ: PrimitiveFn = PrimitiveFn {
    name: "=",
    arity: Arity::at_least(0),
    fn_ptr: num_eq_,
};
static LT: PrimitiveFn = PrimitiveFn {
    name: "<",
    arity: Arity::at_least(0),
    fn_ptr: lt_,
};
static LE: PrimitiveFn = PrimitiveFn {
    name: "<=",
    arity: Arity::at_least(0),
    fn_ptr: le_,
};
static GT: PrimitiveFn = PrimitiveFn {
    name: ">",
    arity: Arity::at_least(0),
    fn_ptr: gt_,
};
static GE: PrimitiveFn = PrimitiveFn {
    name: ">=",
    arity: Arity::at_least(0),
    fn_ptr: ge_,
};
static IS_NUMBER: PrimitiveFn = PrimitiveFn {
    name: "number?",
    arity: Arity::exactly(1),
    fn_ptr: is_number_,
};
static IS_NULL: PrimitiveFn = PrimitiveFn {
    name: "null?",
    arity: Arity::exactly(1),
    fn_ptr: is_null_,
};
static IS_PAIR: PrimitiveFn = PrimitiveFn {
    name: "pair?",
    arity: Arity::exactly(1),
    fn_ptr: is_pair_,
};
static IS_LIST: PrimitiveFn = PrimitiveFn {
    name: "list?",
    arity: Arity::exactly(1),
    fn_ptr: is_list_,
};
static REMAINDER: PrimitiveFn = PrimitiveFn {
    name: "remainder",
    arity: Arity::exactly(2),
    fn_ptr: remainder_,
};
static QUOTIENT: PrimitiveFn = PrimitiveFn {
    name: "quotient",
    arity: Arity::exactly(2),
    fn_ptr: quotient_,
};
static EXPT: PrimitiveFn = PrimitiveFn {
    name: "expt",
    arity: Arity::exactly(2),
    fn_ptr: expt_,
};
static MIN: PrimitiveFn = PrimitiveFn {
    name: "min",
    arity: Arity::at_least(1),
    fn_ptr: min_,
};
static MAX: PrimitiveFn = PrimitiveFn {
    name: "max",
    arity: Arity::at_least(1),
    fn_ptr: max_,
};
static LIST: PrimitiveFn = PrimitiveFn {
    name: "list",
    arity: Arity::at_least(0),
    fn_ptr: list_,
};
static CONS: PrimitiveFn = PrimitiveFn {
    name: "cons",
    arity: Arity::exactly(2),
    fn_ptr: cons_,
};
static CAR: PrimitiveFn = PrimitiveFn {
    name: "car",
    arity: Arity::exactly(1),
    fn_ptr: car_,
};
static CDR: PrimitiveFn = PrimitiveFn {
    name: "cdr",
    arity: Arity::exactly(1),
    fn_ptr: cdr_,
};

pub type Namespace = HashMap<&'static str, &'static PrimitiveFn>;

lazy_static! {
    pub static ref CORE: Namespace = {
        let mut map = Namespace::new();
        let funcs: [&'static PrimitiveFn; 22] = [
            &SUM, &MUL, &SUB, &DIV, &NUM_EQ, &LT, &LE, &GT, &GE, &IS_NUMBER, &IS_NULL,
            &IS_PAIR, &IS_LIST, &REMAINDER, &QUOTIENT, &EXPT, &MIN, &MAX, &LIST, &CONS,
            &CAR, &CDR,
        ];
        for func in funcs.iter() {
            map.insert(func.name, *func);
        }
        map
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::evaluator::eval;
    use crate::reader::Reader;

    fn eval_str(input: &str, env: &std::rc::Rc<Environment>) -> evaluator::Result {
        let expr = Reader::new(input)
            .next_expression()
            .expect("no expression")
            .expect("read error");
        eval(&expr, env)
    }

    fn num(input: &str) -> f64 {
        let env = Environment::global();
        eval_str(input, &env)
            .unwrap()
            .as_number()
            .expect("not a number")
    }

    fn printed(input: &str) -> String {
        let env = Environment::global();
        printer::pr_str(&eval_str(input, &env).unwrap(), 0)
    }

    fn errored(input: &str) -> String {
        let env = Environment::global();
        eval_str(input, &env).unwrap_err().to_string()
    }

    #[test]
    fn addition_and_multiplication_identities() {
        assert_eq!(num("(+)"), 0.0);
        assert_eq!(num("(*)"), 1.0);
        assert_eq!(num("(+ 1 2 3)"), 6.0);
        assert_eq!(num("(* 2 3 4)"), 24.0);
    }

    #[test]
    fn subtraction_and_division_shapes() {
        assert_eq!(num("(-)"), 0.0);
        assert_eq!(num("(- 5)"), -5.0);
        assert_eq!(num("(- 10 1 2)"), 7.0);
        assert_eq!(num("(/)"), 1.0);
        assert_eq!(num("(/ 4)"), 0.25);
        assert_eq!(num("(/ 24 2 3)"), 4.0);
    }

    #[test]
    fn chained_comparisons() {
        assert_eq!(printed("(< 1 2 3)"), "#t");
        assert_eq!(printed("(< 1 3 2)"), "#f");
        assert_eq!(printed("(<= 1 1 2)"), "#t");
        assert_eq!(printed("(= 2 2 2)"), "#t");
        assert_eq!(printed("(> 3 2 1)"), "#t");
        assert_eq!(printed("(>= 3 3 1)"), "#t");
        // zero and one argument are vacuously true
        assert_eq!(printed("(<)"), "#t");
        assert_eq!(printed("(< 7)"), "#t");
    }

    #[test]
    fn arithmetic_demands_numbers() {
        assert_eq!(
            errored("(+ 1 'a)"),
            "+: contract violation\n expected: number?\n given: 'a"
        );
    }

    #[test]
    fn predicates() {
        assert_eq!(printed("(number? 5)"), "#t");
        assert_eq!(printed("(number? 'a)"), "#f");
        assert_eq!(printed("(null? '())"), "#t");
        assert_eq!(printed("(null? '(1))"), "#f");
        assert_eq!(printed("(pair? '(1 2))"), "#t");
        assert_eq!(printed("(pair? '())"), "#f");
        assert_eq!(printed("(pair? 5)"), "#f");
        assert_eq!(printed("(list? '(1 2))"), "#t");
        assert_eq!(printed("(list? '())"), "#t");
        assert_eq!(printed("(list? (cons 1 2))"), "#f");
        assert_eq!(printed("(list? 5)"), "#f");
    }

    #[test]
    fn integer_division_ops() {
        assert_eq!(num("(remainder 7 3)"), 1.0);
        assert_eq!(num("(remainder -7 3)"), -1.0);
        assert_eq!(num("(quotient 7 3)"), 2.0);
        assert_eq!(num("(quotient -7 3)"), -2.0);
        // operands truncate through i64
        assert_eq!(num("(remainder 7.9 3)"), 1.0);
    }

    #[test]
    fn division_by_zero_is_a_contract_violation() {
        assert_eq!(
            errored("(remainder 7 0)"),
            "remainder: contract violation\n expected: nonzero-integer?\n given: 0"
        );
        assert_eq!(
            errored("(quotient 7 0)"),
            "quotient: contract violation\n expected: nonzero-integer?\n given: 0"
        );
    }

    #[test]
    fn out_of_range_integers_are_rejected() {
        assert_eq!(
            errored("(quotient 99999999999999999999 2)"),
            "quotient: contract violation\n expected: integer?\n given: 100000000000000000000"
        );
    }

    #[test]
    fn exponentiation() {
        assert_eq!(num("(expt 2 10)"), 1024.0);
        assert_eq!(num("(expt 4 0.5)"), 2.0);
    }

    #[test]
    fn extremes() {
        assert_eq!(num("(min 3 1 2)"), 1.0);
        assert_eq!(num("(max 3 1 2)"), 3.0);
        assert_eq!(num("(min 4)"), 4.0);
    }

    #[test]
    fn min_requires_an_argument() {
        assert_eq!(
            errored("(min)"),
            "min: arity mismatch\n expected: at least 1\n given: 0"
        );
    }

    #[test]
    fn list_builds_proper_lists() {
        assert_eq!(printed("(list)"), "()");
        assert_eq!(printed("(list 1 2 3)"), "'(1 2 3)");
        assert_eq!(printed("(list 'a 'b)"), "'(a b)");
    }

    #[test]
    fn cons_splices_proper_lists() {
        assert_eq!(printed("(cons 1 (list 2 3))"), "'(1 2 3)");
        assert_eq!(printed("(cons 1 '())"), "'(1)");
        assert_eq!(printed("(cons 1 2)"), "'(1 . 2)");
    }

    #[test]
    fn car_and_cdr() {
        assert_eq!(printed("(car '(a b))"), "'a");
        assert_eq!(printed("(cdr '(a b c))"), "'(b c)");
        assert_eq!(printed("(cdr (cons 1 (list 2 3)))"), "'(2 3)");
        // the cdr of a one-element proper list is the null sentinel
        assert_eq!(printed("(cdr '(a))"), "()");
        // dotted pair: the cdr is the second element itself
        assert_eq!(printed("(cdr (cons 1 2))"), "2");
    }

    #[test]
    fn car_contract_violation() {
        assert_eq!(
            errored("(car 5)"),
            "car: contract violation\n expected: pair?\n given: 5"
        );
        assert_eq!(
            errored("(car '())"),
            "car: contract violation\n expected: pair?\n given: ()"
        );
    }

    #[test]
    fn builtin_arity_is_enforced() {
        assert_eq!(
            errored("(cons 1)"),
            "cons: arity mismatch\n expected: exactly 2\n given: 1"
        );
    }

    #[test]
    fn the_namespace_is_complete() {
        for name in &[
            "+", "*", "-", "/", "=", "<", "<=", ">", ">=", "number?", "null?", "pair?",
            "list?", "remainder", "quotient", "expt", "min", "max", "list", "cons", "car",
            "cdr",
        ] {
            assert!(CORE.contains_key(name), "missing builtin {}", name);
        }
    }
}
