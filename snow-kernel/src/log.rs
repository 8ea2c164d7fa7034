/*!
Check logs: a trace of the decisions made while checking, each paired with the context it was
made in
*/

use std::fmt::{self, Display, Formatter};

use tracing::debug;

use crate::context::Context;
use crate::term::{Existential, Ty};

/// The direction in which an existential is being instantiated
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum InstantiationRule {
    /// The existential is instantiated to a subtype of the target
    Less,
    /// The existential is instantiated to a supertype of the target
    More,
}

impl InstantiationRule {
    /// Describe the relation between the existential and its target
    pub fn relation(&self) -> &'static str {
        match self {
            InstantiationRule::Less => "subtype",
            InstantiationRule::More => "supertype",
        }
    }
}

impl Display for InstantiationRule {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            InstantiationRule::Less => write!(fmt, "less"),
            InstantiationRule::More => write!(fmt, "more"),
        }
    }
}

/// A checking event
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CheckLogDetails {
    /// Started checking an expression against a type
    Checking {
        /// The expression
        expr: Ty,
        /// The expected type
        ty: Ty,
    },
    /// Started inferring an expression's type
    Inferring {
        /// The expression
        expr: Ty,
    },
    /// Inferred an expression's type
    Inferred {
        /// The expression
        expr: Ty,
        /// The inferred type
        ty: Ty,
    },
    /// Started inferring the result of a call
    InferringCall {
        /// The function's type
        function: Ty,
        /// The argument
        argument: Ty,
    },
    /// Inferred the result of a call
    InferredCall {
        /// The function's type
        function: Ty,
        /// The argument
        argument: Ty,
        /// The result type
        result: Ty,
    },
    /// Started instantiating an existential
    Instantiating {
        /// The existential being instantiated
        existential: Existential,
        /// The direction of instantiation
        rule: InstantiationRule,
        /// The target type
        ty: Ty,
    },
    /// Started checking that one type is a subtype of another
    Subtyping {
        /// The expected subtype
        sub: Ty,
        /// The expected supertype
        sup: Ty,
    },
    /// Solved an existential
    Solved {
        /// The existential
        existential: Existential,
        /// Its solution
        solution: Ty,
    },
}

/// A checking event, together with the context it happened in
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CheckLog {
    /// The context at the time of the event
    pub context: Context,
    /// The event
    pub details: CheckLogDetails,
}

impl CheckLog {
    /// Construct a new log entry
    pub fn new(context: Context, details: CheckLogDetails) -> CheckLog {
        CheckLog { context, details }
    }
}

/// A destination for check logs
///
/// Logging is fire-and-forget: a logger must accept every entry, in the order given.
pub trait CheckLogger {
    /// Record a log entry
    fn log(&mut self, entry: CheckLog);
}

impl CheckLogger for Vec<CheckLog> {
    fn log(&mut self, entry: CheckLog) {
        self.push(entry)
    }
}

impl<L: CheckLogger + ?Sized> CheckLogger for &mut L {
    fn log(&mut self, entry: CheckLog) {
        (**self).log(entry)
    }
}

/// A logger which drops every entry
#[derive(Debug, Copy, Clone, Default)]
pub struct Discard;

impl CheckLogger for Discard {
    fn log(&mut self, _entry: CheckLog) {}
}

/// A logger which forwards every entry to `tracing`, rendered, at `DEBUG` level
#[derive(Debug, Copy, Clone, Default)]
pub struct TracingLogger;

impl CheckLogger for TracingLogger {
    fn log(&mut self, entry: CheckLog) {
        debug!(target: "snow::check", "{entry}");
    }
}

#[cfg(test)]
mod test {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::term::{SnowType, ULevel};

    fn entry(n: u32) -> CheckLog {
        CheckLog::new(
            Context::new(),
            CheckLogDetails::Inferring {
                expr: SnowType::star(ULevel::new(n)),
            },
        )
    }

    fn emit(logger: &mut impl CheckLogger) {
        for n in 0..3 {
            logger.log(entry(n))
        }
    }

    #[test]
    fn vec_keeps_order() {
        let mut logs: Vec<CheckLog> = Vec::new();
        emit(&mut &mut logs);
        assert_eq!(logs, [entry(0), entry(1), entry(2)]);
    }

    /// A writer collecting formatted events into a shared buffer
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        captured.contents()
    }

    #[test]
    fn discard_drops_everything() {
        assert_eq!(capture(|| emit(&mut Discard)), "");
    }

    #[test]
    fn tracing_logger_renders_at_debug() {
        let output = capture(|| emit(&mut TracingLogger));
        let events: Vec<&str> = output
            .lines()
            .filter(|line| line.contains("snow::check"))
            .collect();
        assert_eq!(events.len(), 3);
        for (n, event) in events.iter().enumerate() {
            let rendered = entry(n as u32).to_string();
            let first = rendered.lines().next().unwrap();
            assert!(event.trim_start().starts_with("DEBUG"), "{event}");
            assert!(event.ends_with(&format!("snow::check: {first}")), "{event}");
        }
        assert!(output.contains(&entry(2).to_string()));
    }

    #[test]
    fn rule_wording() {
        assert_eq!(InstantiationRule::Less.to_string(), "less");
        assert_eq!(InstantiationRule::More.relation(), "supertype");
    }
}
