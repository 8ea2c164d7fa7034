use std::sync::Arc;

use tracing::trace;

use super::*;
use crate::log::{CheckLog, CheckLogDetails, CheckLogger};
use crate::term::SnowType;

impl Ctx {
    /// Get the solution of the first entry for `target`, if it has one
    ///
    /// Solutions are returned as stored: existentials mentioned by the solution are not resolved.
    /// Use [`Ctx::apply`] for that.
    pub fn get_solution(&self, target: &Existential) -> Option<&Ty> {
        self.solution_position(target).map(|(_, solution)| solution)
    }

    /// Get the solution of the first entry for `target` along with that entry's index
    fn solution_position(&self, target: &Existential) -> Option<(usize, &Ty)> {
        self.elems
            .iter()
            .enumerate()
            .find_map(|(ix, elem)| match elem {
                ContextElement::CExistential {
                    existential,
                    solution,
                    ..
                } if existential == target => Some(solution.as_ref().map(|solution| (ix, solution))),
                _ => None,
            })?
    }

    /// Get the index of the first unsolved entry for `target`
    fn unsolved_position(&self, target: &Existential) -> Option<usize> {
        self.elems.iter().position(|elem| {
            matches!(
                elem,
                ContextElement::CExistential { existential, solution: None, .. }
                    if existential == target
            )
        })
    }

    /// Substitute every solved existential in `ty` with its solution, recursively
    ///
    /// Solutions may themselves mention existentials solved in this context; these are resolved
    /// as well, each in the prefix to the left of its own entry. Unsolved existentials are left in
    /// place. Every step of resolution looks at a strictly shorter prefix, so it terminates even
    /// for a hand-built context whose solution mentions its own existential or one to its right;
    /// such a reference is left unresolved.
    ///
    /// # Examples
    /// ```rust
    /// # use snow_kernel::*;
    /// let mut supply = Counter::default();
    /// let a = make_existential(&mut supply, "a");
    /// let b = make_existential(&mut supply, "b");
    /// let star = SnowType::star(ULevel::TYPE);
    /// let cx = Context::from(vec![
    ///     ContextElement::solved(a.clone(), star.clone(), SnowType::unit()),
    ///     ContextElement::solved(b.clone(), star, SnowType::unsolved(a.clone())),
    /// ]);
    /// let ty = SnowType::pi("x", SnowType::unsolved(b), SnowType::universal("x"));
    /// assert_eq!(
    ///     cx.apply(&ty),
    ///     SnowType::pi("x", SnowType::unit(), SnowType::universal("x"))
    /// );
    /// ```
    pub fn apply(&self, ty: &Ty) -> Ty {
        match &**ty {
            SnowType::Unsolved(existential) => match self.solution_position(existential) {
                Some((ix, solution)) => self.prefix(ix).apply(solution),
                None => ty.clone(),
            },
            SnowType::Universal(_) | SnowType::Star(_) | SnowType::Unit | SnowType::ExprUnit => {
                ty.clone()
            }
            node => Arc::new(node.map(|child| self.apply(child))),
        }
    }

    /// Solve `target` to `solution`, returning the new context
    ///
    /// The first entry for `target` which is still unsolved receives the solution; every other
    /// entry is left as is. The solution must be well-formed in the prefix of the context to the
    /// left of that entry, and a [`CheckLogDetails::Solved`] event is logged against this
    /// (pre-solve) context.
    ///
    /// If there is no unsolved entry for `target`, the context is returned unchanged, without
    /// error and without logging. Use [`Ctx::solve_strict`] to treat that as an error instead.
    ///
    /// # Examples
    /// ```rust
    /// # use snow_kernel::*;
    /// let mut supply = Counter::default();
    /// let e = make_existential(&mut supply, "e");
    /// let star = SnowType::star(ULevel::TYPE);
    /// let cx = Context::new().existential(e.clone(), star.clone());
    /// let mut logs: Vec<CheckLog> = Vec::new();
    /// let solved = cx.solve(&e, SnowType::unit(), &mut logs).unwrap();
    /// assert_eq!(solved, Context::from(vec![ContextElement::solved(e.clone(), star, SnowType::unit())]));
    /// assert_eq!(logs.len(), 1);
    /// let again = solved.solve(&e, SnowType::expr_unit(), &mut logs).unwrap();
    /// assert_eq!(again, solved);
    /// assert_eq!(logs.len(), 1);
    /// ```
    pub fn solve(
        &self,
        target: &Existential,
        solution: Ty,
        logger: &mut impl CheckLogger,
    ) -> Result<Context, Error> {
        let Some(ix) = self.unsolved_position(target) else {
            trace!(existential = %target, "no unsolved entry to solve");
            return Ok(self.to_owned());
        };
        self.solve_at(ix, target, solution, logger)
    }

    /// Solve `target` to `solution`, failing if it has no unsolved entry
    ///
    /// Behaves as [`Ctx::solve`], except that an existential which is missing from this context
    /// fails with [`Error::UnknownExistential`], and one whose entries are all solved fails with
    /// [`Error::AlreadySolved`].
    pub fn solve_strict(
        &self,
        target: &Existential,
        solution: Ty,
        logger: &mut impl CheckLogger,
    ) -> Result<Context, Error> {
        match self.unsolved_position(target) {
            Some(ix) => self.solve_at(ix, target, solution, logger),
            None if self.has_existential(target) => Err(Error::AlreadySolved(target.clone())),
            None => Err(Error::UnknownExistential(target.clone())),
        }
    }

    fn solve_at(
        &self,
        ix: usize,
        target: &Existential,
        solution: Ty,
        logger: &mut impl CheckLogger,
    ) -> Result<Context, Error> {
        if let Err(err) = self.prefix(ix).ensure_well_formed(&solution) {
            trace!(existential = %target, position = ix, "solution escapes its scope");
            return Err(err);
        }
        let original = self.to_owned();
        let mut result = original.clone();
        if let Some(ContextElement::CExistential { solution: slot, .. }) = result.elem_mut(ix) {
            *slot = Some(solution.clone());
        }
        trace!(existential = %target, solution = %solution, "solved existential");
        logger.log(CheckLog::new(
            original,
            CheckLogDetails::Solved {
                existential: target.clone(),
                solution,
            },
        ));
        Ok(result)
    }
}
