/*!
Human-readable rendering of types, contexts and check logs
*/

use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};

use pretty::RcDoc;

use crate::context::{Context, ContextElement, Ctx};
use crate::log::{CheckLog, CheckLogDetails};
use crate::term::{Existential, SnowType};

/// The line width used by `Display` implementations
pub const WIDTH: usize = 80;

/// The indentation of operands in check logs
pub const INDENT: isize = 4;

impl SnowType {
    /// Pretty-print a type with the given precedence level
    pub fn to_doc(&self, precedence: usize) -> RcDoc<()> {
        let result = match self {
            SnowType::Pi(b) => binder_doc("Π", &b.name, &b.domain, &b.codomain),
            SnowType::Forall(b) => binder_doc("∀", &b.name, &b.domain, &b.codomain),
            SnowType::Exists(b) => binder_doc("∃", &b.name, &b.domain, &b.codomain),
            SnowType::Universal(name) => RcDoc::text(name.as_str()),
            SnowType::Unsolved(e) => e.to_doc(),
            SnowType::Application([f, x]) => f
                .to_doc(SnowType::APP_LEVEL)
                .append(RcDoc::line())
                .append(x.to_doc(SnowType::ATOM_LEVEL))
                .nest(2)
                .group(),
            SnowType::Annotation([e, t]) => RcDoc::text("(")
                .append(e.to_doc(SnowType::ABS_LEVEL))
                .append(RcDoc::space())
                .append(RcDoc::text(":"))
                .append(RcDoc::line())
                .append(t.to_doc(SnowType::ABS_LEVEL))
                .append(RcDoc::text(")"))
                .nest(1)
                .group(),
            SnowType::Effectful([effect, ty]) => RcDoc::text("⟨")
                .append(effect.to_doc(SnowType::ABS_LEVEL))
                .append(RcDoc::text("⟩"))
                .append(RcDoc::line())
                .append(ty.to_doc(SnowType::EFFECT_LEVEL))
                .nest(2)
                .group(),
            SnowType::Lambda(argument, body) => RcDoc::text("λ")
                .append(RcDoc::text(argument.as_str()))
                .append(RcDoc::text("."))
                .append(RcDoc::line())
                .append(body.to_doc(SnowType::ABS_LEVEL))
                .nest(2)
                .group(),
            SnowType::Star(level) if level.level() == 0 => RcDoc::text("*"),
            SnowType::Star(level) => RcDoc::text("*").append(RcDoc::as_string(level.level())),
            SnowType::Unit => RcDoc::text("Unit"),
            SnowType::ExprUnit => RcDoc::text("()"),
        };
        if self.precedence() > precedence {
            RcDoc::text("(")
                .append(result)
                .append(RcDoc::text(")"))
                .group()
        } else {
            result
        }
    }

    /// Get this type's precedence level
    pub fn precedence(&self) -> usize {
        match self {
            SnowType::Universal(_)
            | SnowType::Unsolved(_)
            | SnowType::Annotation(_)
            | SnowType::Star(_)
            | SnowType::Unit
            | SnowType::ExprUnit => SnowType::ATOM_LEVEL,
            SnowType::Application(_) => SnowType::APP_LEVEL,
            SnowType::Effectful(_) => SnowType::EFFECT_LEVEL,
            SnowType::Pi(_) | SnowType::Forall(_) | SnowType::Exists(_) | SnowType::Lambda(..) => {
                SnowType::ABS_LEVEL
            }
        }
    }

    /// The precedence level for an atom
    pub const ATOM_LEVEL: usize = 0;

    /// The precedence level for an application
    pub const APP_LEVEL: usize = 1;

    /// The precedence level for an effectful type
    pub const EFFECT_LEVEL: usize = 2;

    /// The precedence level for binders and lambdas
    pub const ABS_LEVEL: usize = 3;
}

fn binder_doc<'a>(
    symbol: &'static str,
    name: &'a str,
    domain: &'a SnowType,
    codomain: &'a SnowType,
) -> RcDoc<'a, ()> {
    RcDoc::text(symbol)
        .append(RcDoc::text("("))
        .append(RcDoc::text(name))
        .append(RcDoc::text(" : "))
        .append(domain.to_doc(SnowType::ABS_LEVEL))
        .append(RcDoc::text(")."))
        .append(RcDoc::line())
        .append(codomain.to_doc(SnowType::ABS_LEVEL))
        .nest(2)
        .group()
}

impl Existential {
    /// Pretty-print an existential
    pub fn to_doc(&self) -> RcDoc<()> {
        RcDoc::text("^")
            .append(RcDoc::text(self.name.as_str()))
            .append(RcDoc::text("#"))
            .append(RcDoc::as_string(self.id.0))
    }
}

impl ContextElement {
    /// Pretty-print a context entry
    pub fn to_doc(&self) -> RcDoc<()> {
        match self {
            ContextElement::CUniversal { name, domain } => RcDoc::text(name.as_str())
                .append(RcDoc::text(" :"))
                .append(RcDoc::line())
                .append(match domain {
                    Some(domain) => domain.to_doc(SnowType::ABS_LEVEL),
                    None => RcDoc::text("?"),
                })
                .nest(2)
                .group(),
            ContextElement::CExistential {
                existential,
                domain,
                solution,
            } => {
                let decl = existential
                    .to_doc()
                    .append(RcDoc::text(" :"))
                    .append(RcDoc::line())
                    .append(domain.to_doc(SnowType::ABS_LEVEL));
                match solution {
                    Some(solution) => decl
                        .append(RcDoc::text(" ="))
                        .append(RcDoc::line())
                        .append(solution.to_doc(SnowType::ABS_LEVEL)),
                    None => decl,
                }
                .nest(2)
                .group()
            }
            ContextElement::CMarker(existential) => RcDoc::text("▸").append(existential.to_doc()),
        }
    }
}

impl Ctx {
    /// Pretty-print a context
    ///
    /// Short contexts are printed on one line; long ones put each entry on its own line.
    pub fn to_doc(&self) -> RcDoc<()> {
        if self.is_empty() {
            return RcDoc::text("[]");
        }
        RcDoc::text("[")
            .append(
                RcDoc::intersperse(
                    self.iter().map(|elem| elem.to_doc()),
                    RcDoc::text(",").append(RcDoc::line()),
                )
                .nest(1)
                .group(),
            )
            .append(RcDoc::text("]"))
    }
}

fn operand(ty: &SnowType) -> RcDoc<()> {
    ty.to_doc(SnowType::ABS_LEVEL)
}

/// A lead sentence followed by an indented operand
fn block<'a>(lead: impl Into<Cow<'a, str>>, operand: RcDoc<'a, ()>) -> RcDoc<'a, ()> {
    RcDoc::text(lead).append(RcDoc::hardline().append(operand).nest(INDENT))
}

/// Lead sentences with indented operands, one after another
fn blocks<'a, S: Into<Cow<'a, str>>>(
    parts: impl IntoIterator<Item = (S, RcDoc<'a, ()>)>,
) -> RcDoc<'a, ()> {
    RcDoc::intersperse(
        parts.into_iter().map(|(lead, operand)| block(lead, operand)),
        RcDoc::hardline(),
    )
}

impl CheckLogDetails {
    /// Pretty-print a checking event
    pub fn to_doc(&self) -> RcDoc<()> {
        match self {
            CheckLogDetails::Checking { expr, ty } => blocks([
                ("Checking that expression", operand(expr)),
                ("has type", operand(ty)),
            ]),
            CheckLogDetails::Inferring { expr } => {
                blocks([("Inferring the type of expression", operand(expr))])
            }
            CheckLogDetails::Inferred { expr, ty } => blocks([
                ("Inferred that expression", operand(expr)),
                ("has type", operand(ty)),
            ]),
            CheckLogDetails::InferringCall { function, argument } => blocks([
                ("Inferring the result of calling a function of type", operand(function)),
                ("with argument", operand(argument)),
            ]),
            CheckLogDetails::InferredCall {
                function,
                argument,
                result,
            } => blocks([
                ("Inferred that calling a function of type", operand(function)),
                ("with argument", operand(argument)),
                ("has result type", operand(result)),
            ]),
            CheckLogDetails::Instantiating {
                existential,
                rule,
                ty,
            } => blocks([
                (Cow::from("Instantiating existential"), existential.to_doc()),
                (
                    Cow::from(format!("so that it is a {} of", rule.relation())),
                    operand(ty),
                ),
            ]),
            CheckLogDetails::Subtyping { sub, sup } => blocks([
                ("Checking that type", operand(sub)),
                ("is a subtype of", operand(sup)),
            ]),
            CheckLogDetails::Solved {
                existential,
                solution,
            } => blocks([
                ("Solved existential", existential.to_doc()),
                ("to", operand(solution)),
            ]),
        }
    }
}

impl CheckLog {
    /// Pretty-print a checking event and its context
    pub fn to_doc(&self) -> RcDoc<()> {
        self.details
            .to_doc()
            .append(RcDoc::hardline())
            .append(block("in context", self.context.to_doc()))
    }
}

impl Display for SnowType {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        write!(fmt, "{}", self.to_doc(SnowType::ABS_LEVEL).pretty(WIDTH))
    }
}

impl Display for Existential {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        write!(fmt, "{}", self.to_doc().pretty(WIDTH))
    }
}

impl Display for ContextElement {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        write!(fmt, "{}", self.to_doc().pretty(WIDTH))
    }
}

impl Display for Ctx {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        write!(fmt, "{}", self.to_doc().pretty(WIDTH))
    }
}

impl Display for Context {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        Display::fmt(self.as_ctx(), fmt)
    }
}

impl Display for CheckLogDetails {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        write!(fmt, "{}", self.to_doc().pretty(WIDTH))
    }
}

impl Display for CheckLog {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        write!(fmt, "{}", self.to_doc().pretty(WIDTH))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::log::InstantiationRule;
    use crate::term::{ExistentialId, ULevel};

    fn ev(name: &str, id: u64) -> Existential {
        Existential::new(name, ExistentialId(id))
    }

    #[test]
    fn render_types() {
        let star = SnowType::star(ULevel::TYPE);
        let id = SnowType::forall(
            "a",
            star.clone(),
            SnowType::pi("x", SnowType::universal("a"), SnowType::universal("a")),
        );
        assert_eq!(id.to_string(), "∀(a : *). Π(x : a). a");
        let call = SnowType::app(
            SnowType::app(SnowType::universal("f"), SnowType::universal("x")),
            SnowType::app(SnowType::universal("g"), SnowType::unsolved(ev("y", 3))),
        );
        assert_eq!(call.to_string(), "f x (g ^y#3)");
        let eff = SnowType::effectful(SnowType::universal("io"), SnowType::unit());
        assert_eq!(eff.to_string(), "⟨io⟩ Unit");
        let annot = SnowType::annot(SnowType::lambda("x", SnowType::expr_unit()), star);
        assert_eq!(annot.to_string(), "(λx. () : *)");
        assert_eq!(SnowType::star(ULevel::new(2)).to_string(), "*2");
    }

    #[test]
    fn render_binder_as_argument() {
        let ty = SnowType::app(
            SnowType::universal("f"),
            SnowType::pi("x", SnowType::unit(), SnowType::unit()),
        );
        assert_eq!(ty.to_string(), "f (Π(x : Unit). Unit)");
    }

    #[test]
    fn render_context() {
        let star = SnowType::star(ULevel::TYPE);
        let cx = Context::new()
            .universal("a", star.clone())
            .pending("x")
            .marker(ev("e", 1))
            .existential(ev("e", 1), star.clone())
            .snoc(ContextElement::solved(ev("f", 2), star, SnowType::unit()));
        assert_eq!(
            cx.to_string(),
            "[a : *, x : ?, ▸^e#1, ^e#1 : *, ^f#2 : * = Unit]"
        );
        assert_eq!(Context::new().to_string(), "[]");
    }

    #[test]
    fn render_check_log() {
        let cx = Context::new().universal("a", SnowType::star(ULevel::TYPE));
        let log = CheckLog::new(
            cx,
            CheckLogDetails::Checking {
                expr: SnowType::expr_unit(),
                ty: SnowType::unit(),
            },
        );
        assert_eq!(
            log.to_string(),
            "Checking that expression\n    ()\nhas type\n    Unit\nin context\n    [a : *]"
        );
    }

    #[test]
    fn render_instantiation() {
        let details = CheckLogDetails::Instantiating {
            existential: ev("a", 0),
            rule: InstantiationRule::More,
            ty: SnowType::unit(),
        };
        assert_eq!(
            details.to_string(),
            "Instantiating existential\n    ^a#0\nso that it is a supertype of\n    Unit"
        );
    }
}
