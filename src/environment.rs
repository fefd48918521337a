use crate::core::CORE;
use crate::types::{Expression, Ident, FALSE_SYM, TRUE_SYM};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One frame of lexical scope: a mutable name→expression map plus an
/// optional parent. Lookup walks outward; definition writes the local map
/// only.
pub struct Environment {
    data: RefCell<HashMap<Ident, Expression>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    pub fn empty() -> Rc<Self> {
        Rc::new(Environment {
            data: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// The session-wide root frame, pre-loaded with every builtin procedure
    /// and the boolean literals.
    pub fn global() -> Rc<Self> {
        let env = Self::empty();
        for (name, primitive) in CORE.iter() {
            env.set(Ident::new(name), Expression::Primitive(*primitive));
        }
        env.set(Ident::new("#t"), TRUE_SYM());
        env.set(Ident::new("#f"), FALSE_SYM());
        env
    }

    pub fn spawn_from(parent: &Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            data: RefCell::new(HashMap::new()),
            parent: Some(parent.clone()),
        })
    }

    /// A fresh call frame over `parent` with one binding per param/arg pair.
    /// Arity is enforced by the caller.
    pub fn extend(
        parent: &Rc<Environment>,
        params: &[Ident],
        args: Vec<Expression>,
    ) -> Rc<Environment> {
        let child = Self::spawn_from(parent);
        for (param, arg) in params.iter().zip(args) {
            child.set(param.clone(), arg);
        }
        child
    }

    pub fn set(&self, key: Ident, value: Expression) {
        self.data.borrow_mut().insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<Expression> {
        match self.data.borrow().get(key) {
            Some(value) => Some(value.clone()),
            None => self.parent.as_ref().and_then(|parent| parent.get(key)),
        }
    }
}
