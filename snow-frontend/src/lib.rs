/*!
A compact S-expression notation for types and contexts

Types:
- `x` is the universal `x`; `#unit`, `#eunit` and `#star` are `Unit`, `()` and `*`
- `(#star n)` is the universe at level `n`
- `(#ev x n)` is the existential `^x#n`
- `(#pi x A B)`, `(#all x A B)` and `(#ex x A B)` are binders
- `(#fn x B)` is a lambda, `(#annot e T)` an annotation and `(#eff E T)` an effectful type
- `(f a b)` is the application `f a b`

Contexts are lists of entries `(#u a A)`, `(#u a)` (type not yet known), `(#e x n A)`,
`(#e x n A S)` (solved to `S`) and `(#m x n)`.
*/

use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use snow_kernel::{Context, ContextElement, Existential, ExistentialId, Name, SnowType, Ty, ULevel};

pub mod sexpr;

use sexpr::{Kw, LSexpr, Sexpr, Spanned};

/// Parse a type
///
/// # Examples
/// ```
/// # use snow_frontend::*;
/// # use snow_kernel::*;
/// let ty = parse_type("(#all a #star (#pi x a (f x)))").unwrap();
/// assert_eq!(ty.to_string(), "∀(a : *). Π(x : a). f x");
/// assert!(parse_type("(#pi x)").is_err());
/// ```
pub fn parse_type(input: &str) -> Result<Ty> {
    lower_type(&*read(input)?)
}

/// Parse a context
///
/// # Examples
/// ```
/// # use snow_frontend::*;
/// # use snow_kernel::*;
/// let cx = parse_context("((#u a #star) (#e x 1 a))").unwrap();
/// assert_eq!(cx.to_string(), "[a : *, ^x#1 : a]");
/// assert_eq!(parse_context("()").unwrap(), Context::new());
/// ```
pub fn parse_context(input: &str) -> Result<Context> {
    lower_context(&*read(input)?)
}

/// Parse an existential, written `(#ev x n)`
pub fn parse_existential(input: &str) -> Result<Existential> {
    lower_existential(&*read(input)?)
}

fn read(input: &str) -> Result<LSexpr> {
    Sexpr::parse_str(input)
        .map_err(|(offset, message)| eyre!("syntax error at offset {offset}: {message}"))
}

/// Lower an S-expression to a type
pub fn lower_type(sexpr: &Spanned<Sexpr>) -> Result<Ty> {
    match &sexpr.val {
        Sexpr::Ident(ident) => Ok(SnowType::universal(ident.name())),
        Sexpr::Kw(kw) if *kw == Kw::UNIT => Ok(SnowType::unit()),
        Sexpr::Kw(kw) if *kw == Kw::EUNIT => Ok(SnowType::expr_unit()),
        Sexpr::Kw(kw) if *kw == Kw::STAR => Ok(SnowType::star(ULevel::TYPE)),
        Sexpr::Kw(kw) => bail!("unexpected keyword #{} at {:?}", &**kw, sexpr.span),
        Sexpr::Numeral(n) => bail!("unexpected numeral {} at {:?}", &**n, sexpr.span),
        Sexpr::List(list) => match list.split_first() {
            None => bail!("empty type at {:?}", sexpr.span),
            Some((head, args)) => match head.as_kw() {
                Some(kw) => lower_form(kw, args, sexpr)
                    .wrap_err_with(|| format!("in #{} form at {:?}", &**kw, sexpr.span)),
                None => args.iter().try_fold(lower_type(head)?, |f, arg| -> Result<Ty> {
                    Ok(SnowType::app(f, lower_type(arg)?))
                }),
            },
        },
    }
}

fn lower_form(kw: &Kw, args: &[LSexpr], sexpr: &Spanned<Sexpr>) -> Result<Ty> {
    if *kw == Kw::STAR {
        let [level] = arity::<1>(args)?;
        let level = u32::try_from(numeral(level)?)
            .map_err(|_| eyre!("universe level out of range at {:?}", level.span))?;
        Ok(SnowType::star(ULevel::new(level)))
    } else if *kw == Kw::EV {
        Ok(SnowType::unsolved(lower_existential(sexpr)?))
    } else if *kw == Kw::PI || *kw == Kw::ALL || *kw == Kw::EX {
        let [name, domain, codomain] = arity::<3>(args)?;
        let (name, domain, codomain) = (ident(name)?, lower_type(domain)?, lower_type(codomain)?);
        Ok(if *kw == Kw::PI {
            SnowType::pi(name, domain, codomain)
        } else if *kw == Kw::ALL {
            SnowType::forall(name, domain, codomain)
        } else {
            SnowType::exists(name, domain, codomain)
        })
    } else if *kw == Kw::FN {
        let [argument, body] = arity::<2>(args)?;
        Ok(SnowType::lambda(ident(argument)?, lower_type(body)?))
    } else if *kw == Kw::ANNOT {
        let [expr, annotation] = arity::<2>(args)?;
        Ok(SnowType::annot(lower_type(expr)?, lower_type(annotation)?))
    } else if *kw == Kw::EFF {
        let [effect, ty] = arity::<2>(args)?;
        Ok(SnowType::effectful(lower_type(effect)?, lower_type(ty)?))
    } else {
        bail!("unknown type former")
    }
}

/// Lower an S-expression to an existential
pub fn lower_existential(sexpr: &Spanned<Sexpr>) -> Result<Existential> {
    match sexpr.as_list().and_then(|list| list.split_first()) {
        Some((head, args)) if head.as_kw() == Some(&Kw::EV) => {
            let [name, id] = arity::<2>(args)?;
            Ok(Existential::new(ident(name)?, ExistentialId(numeral(id)?)))
        }
        _ => bail!("expected (#ev name id), found {} at {:?}", sexpr.val, sexpr.span),
    }
}

/// Lower an S-expression to a context
///
/// Each entry's annotations must be well-formed in the entries before it, so that the result
/// only ever solves an existential to a type from its left.
pub fn lower_context(sexpr: &Spanned<Sexpr>) -> Result<Context> {
    let Some(entries) = sexpr.as_list() else {
        bail!("expected a list of context entries at {:?}", sexpr.span)
    };
    entries
        .iter()
        .enumerate()
        .try_fold(Context::new(), |cx, (ix, entry)| -> Result<Context> {
            let elem = lower_entry(entry).wrap_err_with(|| format!("in context entry {ix}"))?;
            check_entry(&cx, &elem).wrap_err_with(|| format!("in context entry {ix}"))?;
            Ok(cx.snoc(elem))
        })
}

fn check_entry(cx: &Context, elem: &ContextElement) -> Result<()> {
    match elem {
        ContextElement::CUniversal {
            domain: Some(domain),
            ..
        } => cx.ensure_well_formed(domain)?,
        ContextElement::CExistential {
            domain, solution, ..
        } => {
            cx.ensure_well_formed(domain)?;
            if let Some(solution) = solution {
                cx.ensure_well_formed(solution)?;
            }
        }
        ContextElement::CUniversal { domain: None, .. } | ContextElement::CMarker(_) => {}
    }
    Ok(())
}

/// Lower an S-expression to a context entry
pub fn lower_entry(sexpr: &Spanned<Sexpr>) -> Result<ContextElement> {
    let Some((head, args)) = sexpr.as_list().and_then(|list| list.split_first()) else {
        bail!("expected a context entry at {:?}", sexpr.span)
    };
    match head.as_kw() {
        Some(kw) if *kw == Kw::U => match args {
            [name] => Ok(ContextElement::pending(ident(name)?)),
            [name, domain] => Ok(ContextElement::universal(ident(name)?, lower_type(domain)?)),
            _ => bail!("expected (#u name [type]) at {:?}", sexpr.span),
        },
        Some(kw) if *kw == Kw::E => {
            let (name, id, domain, solution) = match args {
                [name, id, domain] => (name, id, domain, None),
                [name, id, domain, solution] => (name, id, domain, Some(solution)),
                _ => bail!("expected (#e name id type [solution]) at {:?}", sexpr.span),
            };
            let existential = Existential::new(ident(name)?, ExistentialId(numeral(id)?));
            let domain = lower_type(domain)?;
            Ok(match solution {
                Some(solution) => ContextElement::solved(existential, domain, lower_type(solution)?),
                None => ContextElement::existential(existential, domain),
            })
        }
        Some(kw) if *kw == Kw::M => {
            let [name, id] = arity::<2>(args)?;
            Ok(ContextElement::marker(Existential::new(
                ident(name)?,
                ExistentialId(numeral(id)?),
            )))
        }
        _ => bail!("unknown context entry at {:?}", head.span),
    }
}

fn arity<const N: usize>(args: &[LSexpr]) -> Result<&[LSexpr; N]> {
    args.try_into()
        .map_err(|_| eyre!("expected {} arguments, found {}", N, args.len()))
}

fn ident(sexpr: &Spanned<Sexpr>) -> Result<Name> {
    match &sexpr.val {
        Sexpr::Ident(ident) => Ok(ident.name()),
        _ => bail!("expected an identifier, found {} at {:?}", sexpr.val, sexpr.span),
    }
}

fn numeral(sexpr: &Spanned<Sexpr>) -> Result<u64> {
    match &sexpr.val {
        Sexpr::Numeral(n) => n
            .to_u64()
            .ok_or_else(|| eyre!("numeral out of range at {:?}", sexpr.span)),
        _ => bail!("expected a numeral, found {} at {:?}", sexpr.val, sexpr.span),
    }
}
