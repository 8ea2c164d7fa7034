/*!
S-expression reading
*/

use std::{
    fmt::{self, Display, Formatter},
    ops::{Deref, DerefMut, Range},
    sync::Arc,
};

use pretty::RcDoc;
use smol_str::SmolStr;
use unicode_ident::{is_xid_continue, is_xid_start};
use winnow::{
    LocatingSlice,
    ascii::{alphanumeric1, digit1, multispace1},
    combinator::{alt, delimited, opt, preceded, repeat, separated},
    prelude::*,
    token::{any, take_till},
};

/// The width at which S-expressions are laid out when displayed
pub const WIDTH: usize = 80;

/// An S-expression
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Sexpr {
    /// An identifier
    Ident(Ident),
    /// A decimal numeral
    Numeral(Numeral),
    /// A keyword
    Kw(Kw),
    /// A list
    List(Vec<LSexpr>),
}

impl Sexpr {
    /// Compare S-expressions up to span
    pub fn eqv(&self, other: &Sexpr) -> bool {
        match (self, other) {
            (Sexpr::List(a), Sexpr::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eqv(y))
            }
            (a, b) => a == b,
        }
    }

    /// Parse a single S-expression, surrounded by optional whitespace, spanning all of `input`
    ///
    /// # Examples
    /// ```
    /// # use snow_frontend::sexpr::*;
    /// let list = Sexpr::parse_str(" (#pi x #star (f x)) ").unwrap();
    /// assert_eq!(list.val.as_list().map(|l| l.len()), Some(4));
    /// assert_eq!(list.span, 1..20);
    /// assert!(Sexpr::parse_str("(#pi x").is_err());
    /// assert!(Sexpr::parse_str("a b").is_err());
    /// ```
    pub fn parse_str(input: &str) -> Result<LSexpr, (usize, String)> {
        delimited(opt(ws), Sexpr::lsexpr, opt(ws))
            .parse(LocatingSlice::new(input))
            .map_err(|err| (err.offset(), err.inner().to_string()))
    }

    /// Parse a sequence of S-expressions
    pub fn lsexprs(input: &mut LocatingSlice<&str>) -> winnow::Result<Vec<LSexpr>> {
        separated(0.., Sexpr::lsexpr, ws).parse_next(input)
    }

    /// Parse an S-expression with span
    pub fn lsexpr(input: &mut LocatingSlice<&str>) -> winnow::Result<LSexpr> {
        Sexpr::sexpr
            .with_span()
            .map(|(val, span)| Arc::new(Spanned::new(val, span)))
            .parse_next(input)
    }

    /// Parse an S-expression
    pub fn sexpr(input: &mut LocatingSlice<&str>) -> winnow::Result<Sexpr> {
        alt((
            Ident::ident.map(Sexpr::Ident),
            Numeral::numeral.map(Sexpr::Numeral),
            Kw::kw.map(Sexpr::Kw),
            delimited(
                ("(", opt(ws)),
                Sexpr::lsexprs.map(Sexpr::List),
                (opt(ws), ")"),
            ),
        ))
        .parse_next(input)
    }

    /// Get this S-expression's elements, if it is a list
    pub fn as_list(&self) -> Option<&[LSexpr]> {
        match self {
            Sexpr::List(list) => Some(list),
            _ => None,
        }
    }

    /// Get this S-expression's keyword, if it is one
    pub fn as_kw(&self) -> Option<&Kw> {
        match self {
            Sexpr::Kw(kw) => Some(kw),
            _ => None,
        }
    }

    /// Pretty print an S-expression
    pub fn to_doc(&self) -> RcDoc<()> {
        match self {
            Sexpr::Ident(ident) => ident.to_doc(),
            Sexpr::Numeral(numeral) => numeral.to_doc(),
            Sexpr::Kw(kw) => kw.to_doc(),
            Sexpr::List(list) => RcDoc::text("(")
                .append(
                    RcDoc::intersperse(list.iter().map(|x| x.to_doc()), RcDoc::line())
                        .nest(1)
                        .group(),
                )
                .append(RcDoc::text(")")),
        }
    }
}

impl Display for Sexpr {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.to_doc().pretty(WIDTH))
    }
}

/// An S-expression with a span
pub type LSexpr = Arc<Spanned<Sexpr>>;

/// An identifier
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Ident(SmolStr);

impl Deref for Ident {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A decimal numeral
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Numeral(SmolStr);

impl Deref for Numeral {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A keyword
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Kw(SmolStr);

impl Deref for Kw {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Ident {
    /// Get this identifier as a name
    pub fn name(&self) -> SmolStr {
        self.0.clone()
    }

    /// Parse an identifier
    ///
    /// # Examples
    /// ```
    /// # use winnow::{LocatingSlice, Parser};
    /// # use snow_frontend::sexpr::*;
    /// let valid = ["x", "xy", "x3", "my_obj", "_", "你好", "x'", "x₁"];
    /// for ident in valid {
    ///     assert_eq!(&*Ident::ident.parse(LocatingSlice::new(ident)).unwrap(), ident);
    /// }
    /// let invalid = ["x+y", "λ", "Π", "()", "#x", "3x", "₀x", "∀x", "^x"];
    /// for ident in invalid {
    ///     assert!(Ident::ident.parse(LocatingSlice::new(ident)).is_err());
    /// }
    /// ```
    pub fn ident(input: &mut LocatingSlice<&str>) -> winnow::Result<Ident> {
        Ident::take.map(|x| Ident(x.into())).parse_next(input)
    }

    /// Parse an identifier, returning its text
    pub fn take<'s>(input: &mut LocatingSlice<&'s str>) -> winnow::Result<&'s str> {
        (
            any.verify(|x| Ident::ident_start(*x)),
            take_till(.., |x| !Ident::ident_continue(x)),
        )
            .take()
            .parse_next(input)
    }

    /// Pretty print an identifier
    pub fn to_doc(&self) -> RcDoc<()> {
        RcDoc::as_string(&self.0)
    }

    /// Whether a character can appear at the start of an identifier
    pub fn ident_start(x: char) -> bool {
        (is_xid_start(x) || x == '_') && x != 'λ' && x != 'Π'
    }

    /// Whether a character can continue an identifier
    pub fn ident_continue(x: char) -> bool {
        (is_xid_continue(x) || x == '\'' || ('₀'..='₉').contains(&x)) && x != 'λ' && x != 'Π'
    }
}

impl Numeral {
    /// Parse a numeral
    pub fn numeral(input: &mut LocatingSlice<&str>) -> winnow::Result<Numeral> {
        digit1
            .map(|x: &str| Numeral(x.into()))
            .parse_next(input)
    }

    /// Get this numeral's value, if it fits in a `u64`
    pub fn to_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    /// Pretty print a numeral
    pub fn to_doc(&self) -> RcDoc<()> {
        RcDoc::as_string(&self.0)
    }
}

impl Kw {
    /// The keyword for the unit type
    pub const UNIT: Self = Self::new_static("unit");

    /// The keyword for the unit value
    pub const EUNIT: Self = Self::new_static("eunit");

    /// The keyword for universes
    pub const STAR: Self = Self::new_static("star");

    /// The keyword for existential variables
    pub const EV: Self = Self::new_static("ev");

    /// The keyword for dependent function types
    pub const PI: Self = Self::new_static("pi");

    /// The keyword for universal quantification
    pub const ALL: Self = Self::new_static("all");

    /// The keyword for existential quantification
    pub const EX: Self = Self::new_static("ex");

    /// The keyword for abstractions
    pub const FN: Self = Self::new_static("fn");

    /// The keyword for an annotation
    pub const ANNOT: Self = Self::new_static("annot");

    /// The keyword for an effectful type
    pub const EFF: Self = Self::new_static("eff");

    /// The keyword for a universal context entry
    pub const U: Self = Self::new_static("u");

    /// The keyword for an existential context entry
    pub const E: Self = Self::new_static("e");

    /// The keyword for a marker context entry
    pub const M: Self = Self::new_static("m");

    /// Create a new keyword from a static string
    pub const fn new_static(text: &'static str) -> Self {
        Kw(SmolStr::new_static(text))
    }

    /// Parse a keyword
    pub fn kw(input: &mut LocatingSlice<&str>) -> winnow::Result<Kw> {
        preceded("#", alphanumeric1)
            .map(|x: &str| Kw(x.into()))
            .parse_next(input)
    }

    /// Pretty print a keyword
    pub fn to_doc(&self) -> RcDoc<()> {
        RcDoc::text("#").append(RcDoc::as_string(&self.0))
    }
}

/// A value annotated with its source span
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Spanned<T> {
    pub val: T,
    pub span: Range<usize>,
}

impl<T> Spanned<T> {
    /// Construct a new spanned value
    pub fn new(val: impl Into<T>, span: Range<usize>) -> Self {
        Spanned {
            val: val.into(),
            span,
        }
    }
}

impl<T> Deref for Spanned<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.val
    }
}

impl<T> DerefMut for Spanned<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.val
    }
}

/// Parse whitespace and `;` line comments
pub fn ws<'s>(input: &mut LocatingSlice<&'s str>) -> winnow::Result<&'s str> {
    repeat(
        1..,
        alt((multispace1.void(), (";", take_till(0.., '\n')).void())),
    )
    .map(|()| ())
    .take()
    .parse_next(input)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_reads_back() {
        for input in [
            "x",
            "#star",
            "42",
            "()",
            "(#pi x #star ; the domain\n (f x))",
            "((#u a #star) (#e x 1 a (#fn y (g y y))))",
        ] {
            let read = Sexpr::parse_str(input).unwrap();
            let shown = read.val.to_string();
            let reread = Sexpr::parse_str(&shown).unwrap();
            assert!(read.eqv(&reread), "{input} displayed as {shown}");
        }
        assert_eq!(
            Sexpr::parse_str("(#pi  x\n #star (f x))").unwrap().val.to_string(),
            "(#pi x #star (f x))"
        );
    }

    #[test]
    fn eqv_ignores_spans() {
        let (a, b) = (
            Sexpr::parse_str("(f (g x))").unwrap(),
            Sexpr::parse_str("  ( f\n(g   x) )").unwrap(),
        );
        assert_ne!(a, b);
        assert!(a.eqv(&b));
        assert!(!a.eqv(&Sexpr::parse_str("(f (g y))").unwrap()));
        assert!(!a.eqv(&Sexpr::parse_str("(f (g x) z)").unwrap()));
    }
}
