//! Property tests for well-formedness, solving and prefix queries
//!
//! Generated contexts only solve an existential to a type which is well-formed to its left.

use proptest::prelude::*;
use snow_kernel::*;

const NAMES: &[&str] = &["a", "b", "c", "x", "y"];

fn ev(id: u64) -> Existential {
    Existential::new("e", ExistentialId(id))
}

fn arb_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(NAMES)
}

fn arb_type() -> impl Strategy<Value = Ty> {
    let leaf = prop_oneof![
        arb_name().prop_map(SnowType::universal),
        (0u64..8).prop_map(|id| SnowType::unsolved(ev(id))),
        (0u32..3).prop_map(|level| SnowType::star(ULevel::new(level))),
        Just(SnowType::unit()),
        Just(SnowType::expr_unit()),
    ];
    leaf.prop_recursive(3, 24, 2, |inner| {
        prop_oneof![
            (arb_name(), inner.clone(), inner.clone()).prop_map(|(x, a, b)| SnowType::pi(x, a, b)),
            (arb_name(), inner.clone(), inner.clone())
                .prop_map(|(x, a, b)| SnowType::forall(x, a, b)),
            (arb_name(), inner.clone(), inner.clone())
                .prop_map(|(x, a, b)| SnowType::exists(x, a, b)),
            (inner.clone(), inner.clone()).prop_map(|(f, a)| SnowType::app(f, a)),
            (inner.clone(), inner.clone()).prop_map(|(e, t)| SnowType::annot(e, t)),
            (inner.clone(), inner.clone()).prop_map(|(e, t)| SnowType::effectful(e, t)),
            (arb_name(), inner).prop_map(|(x, b)| SnowType::lambda(x, b)),
        ]
    })
}

/// A context entry before existential ids are assigned
#[derive(Debug, Clone)]
enum Slot {
    Universal(&'static str, Option<Ty>),
    Existential(Ty, Option<Ty>),
    Marker(u64),
}

fn arb_slot() -> impl Strategy<Value = Slot> {
    prop_oneof![
        (arb_name(), prop::option::of(arb_type())).prop_map(|(x, a)| Slot::Universal(x, a)),
        (arb_type(), prop::option::of(arb_type())).prop_map(|(a, s)| Slot::Existential(a, s)),
        (0u64..8).prop_map(Slot::Marker),
    ]
}

/// Build a context whose `i`th existential is `ev(i)`
///
/// A candidate solution is kept only if it is well-formed in the prefix before its entry.
fn build(slots: Vec<Slot>) -> Context {
    let mut cx = Context::new();
    let mut next = 0;
    for slot in slots {
        let elem = match slot {
            Slot::Universal(name, Some(domain)) => ContextElement::universal(name, domain),
            Slot::Universal(name, None) => ContextElement::pending(name),
            Slot::Existential(domain, solution) => {
                let existential = ev(next);
                next += 1;
                match solution {
                    Some(solution) if cx.is_well_formed(&solution) => {
                        ContextElement::solved(existential, domain, solution)
                    }
                    _ => ContextElement::existential(existential, domain),
                }
            }
            Slot::Marker(id) => ContextElement::marker(ev(id)),
        };
        cx = cx.snoc(elem);
    }
    cx
}

fn arb_context() -> impl Strategy<Value = Context> {
    prop::collection::vec(arb_slot(), 0..8).prop_map(build)
}

fn is_prefix(prefix: &Ctx, cx: &Ctx) -> bool {
    prefix.len() <= cx.len() && prefix.elems() == &cx.elems()[..prefix.len()]
}

proptest! {
    #[test]
    fn ensure_agrees_with_is_well_formed(cx in arb_context(), ty in arb_type()) {
        match cx.ensure_well_formed(&ty) {
            Ok(()) => prop_assert!(cx.is_well_formed(&ty)),
            Err(Error::ScopeEscape { escapes, .. }) => {
                prop_assert!(!cx.is_well_formed(&ty));
                prop_assert_eq!(escapes, cx.escapes(&ty));
                prop_assert!(!escapes.is_empty());
            }
            Err(err) => {
                prop_assert!(false, "unexpected error {}", err);
            }
        }
    }

    #[test]
    fn apply_is_idempotent(cx in arb_context(), ty in arb_type()) {
        let once = cx.apply(&ty);
        prop_assert_eq!(cx.apply(&once), once);
    }

    #[test]
    fn apply_leaves_no_solved_existentials(cx in arb_context(), ty in arb_type()) {
        let applied = cx.apply(&ty);
        for existential in applied.free_existentials() {
            prop_assert!(cx.get_solution(&existential).is_none());
        }
    }

    #[test]
    fn solve_preserves_length_and_order(
        cx in arb_context(),
        target in 0u64..8,
        solution in arb_type(),
    ) {
        let target = ev(target);
        let mut logs: Vec<CheckLog> = Vec::new();
        let slot = cx.iter().position(|elem| matches!(
            elem,
            ContextElement::CExistential { existential, solution: None, .. } if *existential == target
        ));
        match (cx.solve(&target, solution.clone(), &mut logs), slot) {
            (Ok(result), None) => {
                prop_assert_eq!(&result, &cx);
                prop_assert!(logs.is_empty());
            }
            (Ok(result), Some(ix)) => {
                prop_assert_eq!(result.len(), cx.len());
                for (jx, (before, after)) in cx.iter().zip(result.iter()).enumerate() {
                    if jx != ix {
                        prop_assert_eq!(before, after);
                    }
                }
                match &result.elems()[ix] {
                    ContextElement::CExistential { solution: Some(stored), .. } => {
                        prop_assert_eq!(stored, &solution);
                    }
                    other => {
                        prop_assert!(false, "entry not solved: {:?}", other);
                    }
                }
                prop_assert_eq!(logs.len(), 1);
                prop_assert_eq!(&logs[0].context, &cx);
            }
            (Err(err), Some(ix)) => {
                let escaped = matches!(err, Error::ScopeEscape { .. });
                prop_assert!(escaped, "unexpected error {}", err);
                prop_assert!(!cx.prefix(ix).is_well_formed(&solution));
                prop_assert!(logs.is_empty());
            }
            (Err(err), None) => {
                prop_assert!(false, "unexpected error {}", err);
            }
        }
    }

    #[test]
    fn solutions_must_reference_the_left(
        len in 1usize..8,
        kinds in prop::collection::vec(any::<bool>(), 8),
        i in 0usize..8,
        j in 0usize..8,
    ) {
        let (i, j) = (i % len, j % len);
        // entry k is either the universal `uk` or the existential `ev(k)`
        let elems: Vec<ContextElement> = (0..len)
            .map(|k| {
                if kinds[k] || k == i {
                    ContextElement::existential(ev(k as u64), SnowType::unit())
                } else {
                    ContextElement::universal(format!("u{k}"), SnowType::unit())
                }
            })
            .collect();
        let cx = Context::from(elems);
        let reference = match &cx.elems()[j] {
            ContextElement::CUniversal { name, .. } => SnowType::universal(name.clone()),
            ContextElement::CExistential { existential, .. } => SnowType::unsolved(existential.clone()),
            ContextElement::CMarker(_) => unreachable!(),
        };
        let result = cx.solve(&ev(i as u64), reference, &mut Discard);
        prop_assert_eq!(result.is_ok(), j < i);
    }

    #[test]
    fn bound_before_is_strict_order(cx in arb_context(), a in 0u64..8, b in 0u64..8) {
        let (a, b) = (ev(a), ev(b));
        let position = |target: &Existential| cx.iter().position(|elem| elem.is_existential(target));
        let expected = match (position(&a), position(&b)) {
            (Some(pa), Some(pb)) => pb < pa,
            _ => false,
        };
        prop_assert_eq!(cx.bound_before(&a, &b), expected);
        prop_assert!(!cx.bound_before(&a, &a));
        prop_assert!(!(cx.bound_before(&a, &b) && cx.bound_before(&b, &a)));
    }

    #[test]
    fn before_queries_are_prefixes(cx in arb_context(), marker in 0u64..8, ix in 0usize..8) {
        let marker = ev(marker);
        let before = cx.before_marker(&marker);
        prop_assert!(is_prefix(before, &cx));
        if !cx.iter().any(|elem| elem.is_marker(&marker)) {
            prop_assert_eq!(before, cx.as_ctx());
        } else {
            prop_assert!(cx.elems()[before.len()].is_marker(&marker));
        }

        let element = cx
            .elems()
            .get(ix)
            .cloned()
            .unwrap_or_else(|| ContextElement::pending("absent"));
        let before = cx.before_element(&element);
        prop_assert!(is_prefix(before, &cx));
        if !cx.iter().any(|elem| *elem == element) {
            prop_assert_eq!(before, cx.as_ctx());
        } else {
            prop_assert_eq!(&cx.elems()[before.len()], &element);
            prop_assert!(before.len() <= ix);
        }

        for name in NAMES {
            prop_assert!(is_prefix(cx.before_universal(name), &cx));
        }
    }
}
