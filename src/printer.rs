use crate::types::{ExprList, Expression, SpecialKind};
use itertools::Itertools;

/// Renders an expression as seen from a context already under `qlevel`
/// quotes; only the levels beyond that are printed as `'` prefixes.
pub fn pr_str(expr: &Expression, qlevel: u32) -> String {
    match expr {
        // a number reads back identically with one quote fewer
        Expression::Number { val, qlevel: q } => {
            format!("{}{}", quotes(*q, qlevel + 1), val)
        }
        Expression::Variable(name) => name.to_string(),
        Expression::Symbol(s) => {
            let mut qs = s.qlevel;
            // lexemes starting with # or ( already look quoted
            if s.name.starts_with('#') || s.name.starts_with('(') {
                qs = qs.saturating_sub(1);
            }
            format!("{}{}", quotes(qs, qlevel), s.name)
        }
        Expression::List(list) => pr_list(list, qlevel),
        Expression::Primitive(_) => "#<procedure>".to_string(),
        Expression::Lambda(lambda) => match &lambda.name {
            Some(name) => format!("#<lambda {}>", name),
            None => "#<lambda>".to_string(),
        },
        Expression::Special(SpecialKind::Exit) => "#<exit>".to_string(),
        Expression::Special(SpecialKind::CloseBracket) => "Unexpected `)`".to_string(),
        Expression::Void => "#<void>".to_string(),
    }
}

fn pr_list(list: &ExprList, qlevel: u32) -> String {
    let mut out = quotes(list.qlevel, qlevel);

    if list.items.is_empty() {
        out.push_str("()");
        return out;
    }

    // a call list has no sentinel and no dotted tail
    if list.qlevel == 0 {
        out.push('(');
        out.push_str(
            &list
                .items
                .iter()
                .map(|item| pr_str(item, list.qlevel))
                .join(" "),
        );
        out.push(')');
        return out;
    }

    out.push('(');
    let len = list.items.len();
    out.push_str(
        &list.items[..len - 1]
            .iter()
            .map(|item| pr_str(item, list.qlevel))
            .join(" "),
    );

    // the null sentinel is elided; any other tail is a dotted pair
    let last = &list.items[len - 1];
    if !last.is_null() {
        out.push_str(" . ");
        out.push_str(&pr_str(last, list.qlevel));
    }

    out.push(')');
    out
}

fn quotes(expr_qlevel: u32, current_qlevel: u32) -> String {
    if expr_qlevel > current_qlevel {
        "'".repeat((expr_qlevel - current_qlevel) as usize)
    } else {
        String::new()
    }
}
