use std::borrow::Borrow;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use ref_cast::RefCast;
use thiserror::Error;

use crate::term::{Existential, Name, Ty};

mod solve;
mod wf;

pub use wf::Escapes;


/// An entry in a typing context
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ContextElement {
    /// A rigid variable is in scope with the given type
    ///
    /// The domain is `None` while the variable's type has not been inferred yet, as for the
    /// parameter of a lambda whose well-formedness is being checked.
    CUniversal {
        /// The variable's name
        name: Name,
        /// The variable's type, if known
        domain: Option<Ty>,
    },
    /// An existential variable is in scope with the given type, and possibly a solution
    CExistential {
        /// The variable
        existential: Existential,
        /// The variable's type
        domain: Ty,
        /// The variable's solution, if it has been solved
        solution: Option<Ty>,
    },
    /// The start of a local scope opened for an existential
    CMarker(Existential),
}

impl ContextElement {
    /// Construct a universal entry with a known type
    pub fn universal(name: impl Into<Name>, domain: Ty) -> ContextElement {
        ContextElement::CUniversal {
            name: name.into(),
            domain: Some(domain),
        }
    }

    /// Construct a universal entry whose type is not yet known
    pub fn pending(name: impl Into<Name>) -> ContextElement {
        ContextElement::CUniversal {
            name: name.into(),
            domain: None,
        }
    }

    /// Construct an unsolved existential entry
    pub fn existential(existential: Existential, domain: Ty) -> ContextElement {
        ContextElement::CExistential {
            existential,
            domain,
            solution: None,
        }
    }

    /// Construct a solved existential entry
    pub fn solved(existential: Existential, domain: Ty, solution: Ty) -> ContextElement {
        ContextElement::CExistential {
            existential,
            domain,
            solution: Some(solution),
        }
    }

    /// Construct a scope marker
    pub fn marker(existential: Existential) -> ContextElement {
        ContextElement::CMarker(existential)
    }

    /// Whether this is a universal entry with the given name
    pub fn is_universal(&self, target: &str) -> bool {
        matches!(self, ContextElement::CUniversal { name, .. } if name == target)
    }

    /// Whether this is an existential entry for the given variable, solved or not
    pub fn is_existential(&self, target: &Existential) -> bool {
        matches!(self, ContextElement::CExistential { existential, .. } if existential == target)
    }

    /// Whether this is a marker for the given variable
    pub fn is_marker(&self, target: &Existential) -> bool {
        matches!(self, ContextElement::CMarker(existential) if existential == target)
    }
}

/// An owned typing context
///
/// Contexts are values: every operation which would change a context instead returns a new one,
/// so that a caller may keep an earlier snapshot around and backtrack to it.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct Context {
    elems: Vec<ContextElement>,
}

/// A borrowed typing context
///
/// This is to [`Context`] as `str` is to `String`. Prefixes of a context are `Ctx`s borrowed from
/// it, so scope queries and well-formedness checks against a prefix never copy.
#[derive(RefCast)]
#[repr(transparent)]
pub struct Ctx {
    elems: [ContextElement],
}

impl Context {
    /// Construct an empty context
    pub fn new() -> Context {
        Context::default()
    }

    /// Append an entry to the right of this context
    ///
    /// # Examples
    /// ```rust
    /// # use snow_kernel::*;
    /// let cx = Context::new().snoc(ContextElement::universal("a", SnowType::star(ULevel::TYPE)));
    /// assert_eq!(cx.len(), 1);
    /// assert!(cx.has_universal("a"));
    /// ```
    pub fn snoc(mut self, elem: ContextElement) -> Context {
        self.elems.push(elem);
        self
    }

    /// Append a universal with a known type
    pub fn universal(self, name: impl Into<Name>, domain: Ty) -> Context {
        self.snoc(ContextElement::universal(name, domain))
    }

    /// Append a universal whose type is not yet known
    pub fn pending(self, name: impl Into<Name>) -> Context {
        self.snoc(ContextElement::pending(name))
    }

    /// Append an unsolved existential
    pub fn existential(self, existential: Existential, domain: Ty) -> Context {
        self.snoc(ContextElement::existential(existential, domain))
    }

    /// Append a scope marker
    pub fn marker(self, existential: Existential) -> Context {
        self.snoc(ContextElement::marker(existential))
    }

    /// Borrow this context
    pub fn as_ctx(&self) -> &Ctx {
        Ctx::ref_cast(&self.elems[..])
    }

    /// Get mutable access to an entry, for in-place replacement
    fn elem_mut(&mut self, ix: usize) -> Option<&mut ContextElement> {
        self.elems.get_mut(ix)
    }
}

impl Ctx {
    /// Borrow a slice of entries as a context
    pub fn from_slice(elems: &[ContextElement]) -> &Ctx {
        Ctx::ref_cast(elems)
    }

    /// Get this context's entries, left to right
    pub fn elems(&self) -> &[ContextElement] {
        &self.elems
    }

    /// Iterate over this context's entries, left to right
    pub fn iter(&self) -> std::slice::Iter<'_, ContextElement> {
        self.elems.iter()
    }

    /// Get the number of entries in this context
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// Whether this context has no entries
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Get the first `len` entries of this context
    ///
    /// # Panics
    /// If `len` is greater than this context's length
    pub fn prefix(&self, len: usize) -> &Ctx {
        Ctx::from_slice(&self.elems[..len])
    }

    /// Get the longest prefix of this context whose entries all satisfy `keep`
    fn prefix_while(&self, mut keep: impl FnMut(&ContextElement) -> bool) -> &Ctx {
        let len = self.elems.iter().take_while(|elem| keep(elem)).count();
        self.prefix(len)
    }

    /// Whether a universal with the given name is in scope
    pub fn has_universal(&self, name: &str) -> bool {
        self.elems.iter().any(|elem| elem.is_universal(name))
    }

    /// Get the type of the first universal with the given name
    ///
    /// Returns `None` if there is no such universal, or if its type is not yet known.
    pub fn universal_domain(&self, name: &str) -> Option<&Ty> {
        self.elems.iter().find_map(|elem| match elem {
            ContextElement::CUniversal { name: n, domain } if n == name => Some(domain.as_ref()),
            _ => None,
        })?
    }

    /// Whether the given existential is in scope, solved or not
    pub fn has_existential(&self, existential: &Existential) -> bool {
        self.elems.iter().any(|elem| elem.is_existential(existential))
    }

    /// Get the type of the first entry for the given existential
    pub fn existential_domain(&self, target: &Existential) -> Option<&Ty> {
        self.elems.iter().find_map(|elem| match elem {
            ContextElement::CExistential {
                existential,
                domain,
                ..
            } if existential == target => Some(domain),
            _ => None,
        })
    }

    /// Iterate over the existentials of this context which have no solution, left to right
    pub fn unsolved(&self) -> impl Iterator<Item = &Existential> {
        self.elems.iter().filter_map(|elem| match elem {
            ContextElement::CExistential {
                existential,
                solution: None,
                ..
            } => Some(existential),
            _ => None,
        })
    }

    /// Check whether `second` was bound before `first`
    ///
    /// Compares the positions of the first existential entries for `first` and `second`. If
    /// either is missing the answer is `false`: callers must read that as "not established", not
    /// as "definitely not before". An existential is never bound before itself.
    ///
    /// # Examples
    /// ```rust
    /// # use snow_kernel::*;
    /// let mut supply = Counter::default();
    /// let a = make_existential(&mut supply, "a");
    /// let b = make_existential(&mut supply, "b");
    /// let c = make_existential(&mut supply, "c");
    /// let star = SnowType::star(ULevel::TYPE);
    /// let cx = Context::new().existential(a.clone(), star.clone()).existential(b.clone(), star);
    /// assert!(cx.bound_before(&b, &a));
    /// assert!(!cx.bound_before(&a, &b));
    /// assert!(!cx.bound_before(&a, &a));
    /// assert!(!cx.bound_before(&c, &a));
    /// ```
    pub fn bound_before(&self, first: &Existential, second: &Existential) -> bool {
        let position = |target: &Existential| {
            self.elems
                .iter()
                .position(|elem| elem.is_existential(target))
        };
        match (position(first), position(second)) {
            (Some(first), Some(second)) => second < first,
            _ => false,
        }
    }

    /// Get the leading run of universals named `name`
    ///
    /// The prefix ends at the first entry which is not a universal with exactly this name. Note
    /// that this is _not_ "everything before the universal `name`": see [`Ctx::before_element`]
    /// for that.
    pub fn before_universal(&self, name: &str) -> &Ctx {
        self.prefix_while(|elem| elem.is_universal(name))
    }

    /// Get the prefix of this context before the marker for `existential`
    ///
    /// Returns the whole context if there is no such marker.
    ///
    /// # Examples
    /// ```rust
    /// # use snow_kernel::*;
    /// let mut supply = Counter::default();
    /// let a = make_existential(&mut supply, "a");
    /// let star = SnowType::star(ULevel::TYPE);
    /// let cx = Context::new()
    ///     .universal("t", star.clone())
    ///     .marker(a.clone())
    ///     .existential(a.clone(), star);
    /// assert_eq!(cx.before_marker(&a).len(), 1);
    /// ```
    pub fn before_marker(&self, existential: &Existential) -> &Ctx {
        self.prefix_while(|elem| !elem.is_marker(existential))
    }

    /// Get the prefix of this context before the first entry equal to `target`
    ///
    /// Returns the whole context if there is no such entry.
    pub fn before_element(&self, target: &ContextElement) -> &Ctx {
        self.prefix_while(|elem| elem != target)
    }
}

impl PartialEq for Ctx {
    fn eq(&self, other: &Ctx) -> bool {
        self.elems == other.elems
    }
}

impl Eq for Ctx {}

impl Hash for Ctx {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.elems.hash(state)
    }
}

impl Debug for Ctx {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.debug_list().entries(self.elems.iter()).finish()
    }
}

impl Deref for Context {
    type Target = Ctx;

    fn deref(&self) -> &Ctx {
        self.as_ctx()
    }
}

impl AsRef<Ctx> for Context {
    fn as_ref(&self) -> &Ctx {
        self.as_ctx()
    }
}

impl Borrow<Ctx> for Context {
    fn borrow(&self) -> &Ctx {
        self.as_ctx()
    }
}

impl ToOwned for Ctx {
    type Owned = Context;

    fn to_owned(&self) -> Context {
        Context {
            elems: self.elems.to_vec(),
        }
    }
}

impl PartialEq<Ctx> for Context {
    fn eq(&self, other: &Ctx) -> bool {
        self.elems[..] == other.elems
    }
}

impl PartialEq<&Ctx> for Context {
    fn eq(&self, other: &&Ctx) -> bool {
        self.elems[..] == other.elems
    }
}

impl From<Vec<ContextElement>> for Context {
    fn from(elems: Vec<ContextElement>) -> Self {
        Context { elems }
    }
}

impl From<&Ctx> for Context {
    fn from(ctx: &Ctx) -> Self {
        ctx.to_owned()
    }
}

impl FromIterator<ContextElement> for Context {
    fn from_iter<I: IntoIterator<Item = ContextElement>>(iter: I) -> Self {
        Context {
            elems: iter.into_iter().collect(),
        }
    }
}

impl Extend<ContextElement> for Context {
    fn extend<I: IntoIterator<Item = ContextElement>>(&mut self, iter: I) {
        self.elems.extend(iter)
    }
}

impl IntoIterator for Context {
    type Item = ContextElement;
    type IntoIter = std::vec::IntoIter<ContextElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elems.into_iter()
    }
}

impl<'a> IntoIterator for &'a Ctx {
    type Item = &'a ContextElement;
    type IntoIter = std::slice::Iter<'a, ContextElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elems.iter()
    }
}

impl<'a> IntoIterator for &'a Context {
    type Item = &'a ContextElement;
    type IntoIter = std::slice::Iter<'a, ContextElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elems.iter()
    }
}

/// A context error
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// A type mentions variables which are not in scope
    #[error("type\n    {ty}\nis not well-formed in context\n    {context}\n(out of scope: {escapes})")]
    ScopeEscape {
        /// The offending type, rendered
        ty: String,
        /// The context it was checked against, rendered
        context: String,
        /// Which kinds of variable were out of scope
        escapes: Escapes,
    },
    /// An existential expected in the context is missing
    #[error("unknown existential: {0}")]
    UnknownExistential(Existential),
    /// An existential expected to be unsolved already has a solution
    #[error("existential already solved: {0}")]
    AlreadySolved(Existential),
}
