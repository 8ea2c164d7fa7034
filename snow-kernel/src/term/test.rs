use super::*;

fn ev(name: &str, id: u64) -> Existential {
    Existential::new(name, ExistentialId(id))
}

#[test]
fn existential_identity_ignores_name() {
    assert_eq!(ev("a", 3), ev("b", 3));
    assert_ne!(ev("a", 3), ev("a", 4));
    let mut set = ExistentialSet::default();
    set.insert(ev("a", 3));
    assert!(set.contains(&ev("renamed", 3)));
}

#[test]
fn unsolved_nodes_compare_by_id() {
    assert_eq!(SnowType::unsolved(ev("a", 1)), SnowType::unsolved(ev("b", 1)));
    assert_ne!(SnowType::unsolved(ev("a", 1)), SnowType::unsolved(ev("a", 2)));
}

#[test]
fn free_existentials_in_order() {
    let ty = SnowType::app(
        SnowType::pi("x", SnowType::unsolved(ev("b", 2)), SnowType::unsolved(ev("a", 1))),
        SnowType::effectful(SnowType::unsolved(ev("b", 2)), SnowType::unsolved(ev("c", 7))),
    );
    let ids: Vec<_> = ty.free_existentials().iter().map(|e| e.id.0).collect();
    assert_eq!(ids, [2, 1, 7]);
    assert!(SnowType::unit().free_existentials().is_empty());
}

#[test]
fn map_preserves_binder_names() {
    let ty = SnowType::forall("t", SnowType::star(ULevel::TYPE), SnowType::universal("t"));
    let mapped = ty.map(|_| SnowType::unit());
    let Some(binder) = mapped.binder() else {
        panic!("expected a binder, got {mapped:?}");
    };
    assert_eq!(binder.name, "t");
    assert_eq!(binder.domain, SnowType::unit());
    assert_eq!(binder.codomain, SnowType::unit());
}

#[test]
fn children_of_leaves_are_empty() {
    assert!(SnowType::universal("a").children().is_empty());
    assert!(SnowType::star(ULevel::TYPE).children().is_empty());
    assert_eq!(SnowType::lambda("x", SnowType::expr_unit()).children().len(), 1);
    assert_eq!(
        SnowType::annot(SnowType::expr_unit(), SnowType::unit()).children().len(),
        2
    );
}

#[test]
fn level_arithmetic() {
    assert_eq!(ULevel::TYPE.succ(), ULevel::new(1));
    assert_eq!(ULevel::new(3).max(ULevel::new(2)), ULevel::new(3));
}
