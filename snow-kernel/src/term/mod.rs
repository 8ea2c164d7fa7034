use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use arrayvec::ArrayVec;
use fxhash::FxBuildHasher;
use indexmap::IndexSet;
use smol_str::SmolStr;

#[cfg(test)]
mod test;

/// A variable's display name
pub type Name = SmolStr;

/// A shared, immutable type or term
pub type Ty = Arc<SnowType>;

/// A set of existentials, in order of first occurrence
pub type ExistentialSet = IndexSet<Existential, FxBuildHasher>;

/// A type or term of the checked calculus
///
/// Types and terms share a single syntax: annotations and lambdas may appear wherever a type may,
/// and `Star` is itself a type.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum SnowType {
    // Binders
    /// A dependent function type
    Pi(Binder),
    /// A universal quantifier
    Forall(Binder),
    /// An existential quantifier
    Exists(Binder),

    // Variables
    /// A rigid variable bound by an enclosing binder or by the context
    Universal(Name),
    /// An existential variable, which may have been solved in some context
    Unsolved(Existential),

    // Compound forms
    /// An application of a function to an argument
    Application([Ty; 2]),
    /// An expression annotated with a type
    Annotation([Ty; 2]),
    /// A type annotated with an effect, stored as `[effect, ty]`
    Effectful([Ty; 2]),
    /// A lambda abstraction
    Lambda(Name, Ty),

    // Constants
    /// A typing universe
    Star(ULevel),
    /// The unit type
    Unit,
    /// The unit value
    ExprUnit,
}

/// The contents of a binding form
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Binder {
    /// The bound variable
    pub name: Name,
    /// The bound variable's type
    pub domain: Ty,
    /// The body, in which `name` is in scope
    pub codomain: Ty,
}

impl Binder {
    /// Construct a new binder
    pub fn new(name: impl Into<Name>, domain: Ty, codomain: Ty) -> Binder {
        Binder {
            name: name.into(),
            domain,
            codomain,
        }
    }

    /// Rebuild this binder with its domain and codomain replaced by `f`
    pub fn map(&self, mut f: impl FnMut(&Ty) -> Ty) -> Binder {
        Binder {
            name: self.name.clone(),
            domain: f(&self.domain),
            codomain: f(&self.codomain),
        }
    }
}

impl SnowType {
    /// Construct a dependent function type
    pub fn pi(name: impl Into<Name>, domain: Ty, codomain: Ty) -> Ty {
        Arc::new(SnowType::Pi(Binder::new(name, domain, codomain)))
    }

    /// Construct a universal quantifier
    pub fn forall(name: impl Into<Name>, domain: Ty, codomain: Ty) -> Ty {
        Arc::new(SnowType::Forall(Binder::new(name, domain, codomain)))
    }

    /// Construct an existential quantifier
    pub fn exists(name: impl Into<Name>, domain: Ty, codomain: Ty) -> Ty {
        Arc::new(SnowType::Exists(Binder::new(name, domain, codomain)))
    }

    /// Construct a reference to a universal
    pub fn universal(name: impl Into<Name>) -> Ty {
        Arc::new(SnowType::Universal(name.into()))
    }

    /// Construct a reference to an existential
    pub fn unsolved(existential: Existential) -> Ty {
        Arc::new(SnowType::Unsolved(existential))
    }

    /// Construct an application
    pub fn app(function: Ty, argument: Ty) -> Ty {
        Arc::new(SnowType::Application([function, argument]))
    }

    /// Construct an annotation
    pub fn annot(expr: Ty, annotation: Ty) -> Ty {
        Arc::new(SnowType::Annotation([expr, annotation]))
    }

    /// Construct an effectful type
    pub fn effectful(effect: Ty, ty: Ty) -> Ty {
        Arc::new(SnowType::Effectful([effect, ty]))
    }

    /// Construct a lambda abstraction
    pub fn lambda(argument: impl Into<Name>, body: Ty) -> Ty {
        Arc::new(SnowType::Lambda(argument.into(), body))
    }

    /// Construct a typing universe
    pub fn star(level: ULevel) -> Ty {
        Arc::new(SnowType::Star(level))
    }

    /// Construct the unit type
    pub fn unit() -> Ty {
        Arc::new(SnowType::Unit)
    }

    /// Construct the unit value
    pub fn expr_unit() -> Ty {
        Arc::new(SnowType::ExprUnit)
    }

    /// Get this node's binder, if it is a binding form
    pub fn binder(&self) -> Option<&Binder> {
        match self {
            SnowType::Pi(b) | SnowType::Forall(b) | SnowType::Exists(b) => Some(b),
            _ => None,
        }
    }

    /// Get this node's direct children, left to right
    pub fn children(&self) -> ArrayVec<&Ty, 2> {
        let mut result = ArrayVec::new();
        match self {
            SnowType::Pi(b) | SnowType::Forall(b) | SnowType::Exists(b) => {
                result.push(&b.domain);
                result.push(&b.codomain);
            }
            SnowType::Application([x, y])
            | SnowType::Annotation([x, y])
            | SnowType::Effectful([x, y]) => {
                result.push(x);
                result.push(y);
            }
            SnowType::Lambda(_, body) => result.push(body),
            SnowType::Universal(_)
            | SnowType::Unsolved(_)
            | SnowType::Star(_)
            | SnowType::Unit
            | SnowType::ExprUnit => {}
        }
        result
    }

    /// Rebuild this node with each child replaced by `f(child)`
    ///
    /// Leaves are returned unchanged, and bound names are preserved.
    pub fn map(&self, mut f: impl FnMut(&Ty) -> Ty) -> SnowType {
        match self {
            SnowType::Pi(b) => SnowType::Pi(b.map(&mut f)),
            SnowType::Forall(b) => SnowType::Forall(b.map(&mut f)),
            SnowType::Exists(b) => SnowType::Exists(b.map(&mut f)),
            SnowType::Application([x, y]) => SnowType::Application([f(x), f(y)]),
            SnowType::Annotation([x, y]) => SnowType::Annotation([f(x), f(y)]),
            SnowType::Effectful([x, y]) => SnowType::Effectful([f(x), f(y)]),
            SnowType::Lambda(argument, body) => SnowType::Lambda(argument.clone(), f(body)),
            SnowType::Universal(_)
            | SnowType::Unsolved(_)
            | SnowType::Star(_)
            | SnowType::Unit
            | SnowType::ExprUnit => self.clone(),
        }
    }

    /// Check whether this type mentions the given existential
    ///
    /// # Examples
    /// ```rust
    /// # use snow_kernel::term::*;
    /// let e = Existential::new("a", ExistentialId(0));
    /// let f = Existential::new("f", ExistentialId(1));
    /// let ty = SnowType::pi("x", SnowType::unsolved(e.clone()), SnowType::unit());
    /// assert!(ty.references(&e));
    /// assert!(!ty.references(&f));
    /// ```
    pub fn references(&self, existential: &Existential) -> bool {
        match self {
            SnowType::Unsolved(e) => e == existential,
            node => node.children().iter().any(|x| x.references(existential)),
        }
    }

    /// Get the existentials mentioned by this type, in order of first occurrence
    pub fn free_existentials(&self) -> ExistentialSet {
        let mut result = ExistentialSet::default();
        self.collect_existentials(&mut result);
        result
    }

    fn collect_existentials(&self, into: &mut ExistentialSet) {
        match self {
            SnowType::Unsolved(e) => {
                into.insert(e.clone());
            }
            node => {
                for child in node.children() {
                    child.collect_existentials(into);
                }
            }
        }
    }
}

/// The identity of an existential variable
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ExistentialId(pub u64);

/// An existential variable
///
/// Two existentials are the same variable if and only if their ids are equal: the name is carried
/// for display only and takes no part in comparison or hashing.
#[derive(Debug, Clone)]
pub struct Existential {
    /// The display name
    pub name: Name,
    /// The unique id
    pub id: ExistentialId,
}

impl Existential {
    /// Construct a new existential from a name and an id
    ///
    /// Fresh existentials should be obtained from [`make_existential`](crate::make_existential);
    /// this constructor is for rebuilding existing ones.
    pub fn new(name: impl Into<Name>, id: ExistentialId) -> Existential {
        Existential {
            name: name.into(),
            id,
        }
    }
}

impl PartialEq for Existential {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Existential {}

impl Hash for Existential {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl PartialOrd for Existential {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Existential {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

/// A typing universe level
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub struct ULevel {
    level: u32,
}

impl ULevel {
    /// The universe of ordinary types
    pub const TYPE: Self = Self { level: 0 };

    /// Construct a universe level
    pub const fn new(level: u32) -> Self {
        Self { level }
    }

    /// Get this level as a number
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// The successor of this universe level
    ///
    /// # Panics
    /// If incrementing this universe level would overflow
    pub fn succ(&self) -> Self {
        Self {
            level: self.level.checked_add(1).expect("universe level overflow"),
        }
    }

    /// Take the maximum of two universe levels
    pub fn max(&self, other: ULevel) -> Self {
        Self {
            level: self.level.max(other.level),
        }
    }
}
