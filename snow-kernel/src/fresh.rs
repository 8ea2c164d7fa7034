use crate::term::{Existential, ExistentialId, Name};

/// A supply of fresh existential ids
///
/// Every id returned by a supply must be distinct from every other id it has returned.
pub trait FreshSupply {
    /// Get the next unused id
    fn next_id(&mut self) -> ExistentialId;
}

impl<S: FreshSupply + ?Sized> FreshSupply for &mut S {
    fn next_id(&mut self) -> ExistentialId {
        (**self).next_id()
    }
}

/// A monotonically increasing counter of ids
#[derive(Debug, Clone, Default)]
pub struct Counter {
    next: u64,
}

impl Counter {
    /// Construct a counter whose first id is `next`
    pub fn starting_at(next: u64) -> Counter {
        Counter { next }
    }

    /// Get the id this counter will return next
    pub fn peek(&self) -> ExistentialId {
        ExistentialId(self.next)
    }
}

impl FreshSupply for Counter {
    /// # Panics
    /// If the counter has run out of ids
    fn next_id(&mut self) -> ExistentialId {
        let id = ExistentialId(self.next);
        self.next = self.next.checked_add(1).expect("existential id overflow");
        id
    }
}

/// Create a new existential with a fresh id
///
/// Names need not be unique: existentials created for shadowed variables share a name but never
/// an id.
///
/// # Examples
/// ```rust
/// # use snow_kernel::*;
/// let mut supply = Counter::default();
/// let e2 = make_existential(&mut supply, "x");
/// let e3 = make_existential(&mut supply, "x");
/// assert_eq!(e2.name, e3.name);
/// assert_ne!(e2.id, e3.id);
/// assert_ne!(e2, e3);
/// ```
pub fn make_existential(supply: &mut impl FreshSupply, name: impl Into<Name>) -> Existential {
    Existential::new(name, supply.next_id())
}
