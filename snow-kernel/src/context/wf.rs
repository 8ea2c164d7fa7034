use std::fmt::{self, Display, Formatter};

use bitflags::bitflags;

use super::*;
use crate::term::SnowType;

bitflags! {
    /// The kinds of variable a type mentions without them being in scope
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
    pub struct Escapes: u8 {
        /// A universal which is not bound in the context or by an enclosing binder
        const UNIVERSAL = 1 << 0;
        /// An existential which is not bound in the context
        const EXISTENTIAL = 1 << 1;
    }
}

impl Display for Escapes {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match (
            self.contains(Escapes::UNIVERSAL),
            self.contains(Escapes::EXISTENTIAL),
        ) {
            (true, true) => write!(fmt, "universals and existentials"),
            (true, false) => write!(fmt, "universals"),
            (false, true) => write!(fmt, "existentials"),
            (false, false) => write!(fmt, "nothing"),
        }
    }
}

impl Ctx {
    /// Check whether every variable `ty` mentions is in scope in this context
    ///
    /// Binding forms and lambdas bring their own variable into scope for their body, as if a
    /// universal for it were appended to the context.
    ///
    /// # Examples
    /// ```rust
    /// # use snow_kernel::*;
    /// let star = SnowType::star(ULevel::TYPE);
    /// let cx = Context::new().universal("a", star.clone());
    /// assert!(cx.is_well_formed(&SnowType::universal("a")));
    /// assert!(!cx.is_well_formed(&SnowType::universal("b")));
    /// let id = SnowType::forall("b", star, SnowType::pi("x", SnowType::universal("b"), SnowType::universal("b")));
    /// assert!(cx.is_well_formed(&id));
    /// ```
    pub fn is_well_formed(&self, ty: &SnowType) -> bool {
        self.escapes(ty).is_empty()
    }

    /// Check that `ty` is well-formed in this context, or fail with a scope-escape error
    pub fn ensure_well_formed(&self, ty: &SnowType) -> Result<(), Error> {
        let escapes = self.escapes(ty);
        if escapes.is_empty() {
            Ok(())
        } else {
            Err(Error::ScopeEscape {
                ty: ty.to_string(),
                context: self.to_string(),
                escapes,
            })
        }
    }

    /// Get the kinds of variable `ty` mentions which are not in scope in this context
    ///
    /// The result is empty if and only if `ty` is well-formed here.
    pub fn escapes(&self, ty: &SnowType) -> Escapes {
        let mut locals = Vec::new();
        self.escapes_under(&mut locals, ty)
    }

    fn escapes_under<'a>(&self, locals: &mut Vec<&'a str>, ty: &'a SnowType) -> Escapes {
        match ty {
            SnowType::Pi(b) | SnowType::Forall(b) | SnowType::Exists(b) => {
                let domain = self.escapes_under(locals, &b.domain);
                locals.push(&b.name);
                let codomain = self.escapes_under(locals, &b.codomain);
                locals.pop();
                domain | codomain
            }
            SnowType::Universal(name) => {
                if locals.contains(&name.as_str()) || self.has_universal(name) {
                    Escapes::empty()
                } else {
                    Escapes::UNIVERSAL
                }
            }
            SnowType::Unsolved(existential) => {
                if self.has_existential(existential) {
                    Escapes::empty()
                } else {
                    Escapes::EXISTENTIAL
                }
            }
            SnowType::Application([x, y])
            | SnowType::Annotation([x, y])
            | SnowType::Effectful([x, y]) => {
                self.escapes_under(locals, x) | self.escapes_under(locals, y)
            }
            SnowType::Lambda(argument, body) => {
                locals.push(argument);
                let result = self.escapes_under(locals, body);
                locals.pop();
                result
            }
            SnowType::Star(_) | SnowType::Unit | SnowType::ExprUnit => Escapes::empty(),
        }
    }
}
