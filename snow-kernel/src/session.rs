use crate::context::{Context, Ctx, Error};
use crate::fresh::{Counter, FreshSupply, make_existential};
use crate::log::{CheckLog, CheckLogDetails, CheckLogger};
use crate::term::{Existential, Name, Ty};

/// The capabilities of a single checking run
///
/// A session owns the run's fresh-id supply and its logger. Contexts are not part of the session:
/// they are values threaded through the checking algorithm, so that it may hold several at once.
#[derive(Debug, Default)]
pub struct Session<L, F = Counter> {
    logger: L,
    supply: F,
}

impl<L: CheckLogger> Session<L> {
    /// Construct a session with a fresh counter
    pub fn new(logger: L) -> Session<L> {
        Session {
            logger,
            supply: Counter::default(),
        }
    }
}

impl<L: CheckLogger, F: FreshSupply> Session<L, F> {
    /// Construct a session with a given supply of ids
    pub fn with_supply(logger: L, supply: F) -> Session<L, F> {
        Session { logger, supply }
    }

    /// Create a new existential with a fresh id
    pub fn existential(&mut self, name: impl Into<Name>) -> Existential {
        make_existential(&mut self.supply, name)
    }

    /// Record an event of the checking algorithm
    pub fn log(&mut self, context: &Ctx, details: CheckLogDetails) {
        self.logger.log(CheckLog::new(context.to_owned(), details))
    }

    /// Solve an existential in a context, logging the solution
    ///
    /// See [`Ctx::solve`].
    ///
    /// # Examples
    /// ```rust
    /// # use snow_kernel::*;
    /// let mut session = Session::new(Vec::<CheckLog>::new());
    /// let e = session.existential("e");
    /// let cx = Context::new().existential(e.clone(), SnowType::star(ULevel::TYPE));
    /// let cx = session.solve(&cx, &e, SnowType::unit()).unwrap();
    /// assert_eq!(cx.get_solution(&e), Some(&SnowType::unit()));
    /// assert!(matches!(
    ///     session.logger()[0].details,
    ///     CheckLogDetails::Solved { .. }
    /// ));
    /// ```
    pub fn solve(
        &mut self,
        context: &Ctx,
        target: &Existential,
        solution: Ty,
    ) -> Result<Context, Error> {
        context.solve(target, solution, &mut self.logger)
    }

    /// Get this session's logger
    pub fn logger(&self) -> &L {
        &self.logger
    }

    /// Get this session's supply of ids
    pub fn supply(&self) -> &F {
        &self.supply
    }

    /// Finish this session, returning its logger
    pub fn into_logger(self) -> L {
        self.logger
    }
}
