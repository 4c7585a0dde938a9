use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::render::{Slot, Slots};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique id used for render keys (`"anvil-1"`, `"anvil-2"`, ...).
pub fn unique_id() -> String {
    format!("anvil-{}", NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// A value, or a closure producing it from an argument.
pub enum MaybeFn<T, A: ?Sized> {
    Value(T),
    Fn(Box<dyn FnOnce(&A) -> T>),
}

impl<T, A: ?Sized> MaybeFn<T, A> {
    pub fn value(value: T) -> Self {
        MaybeFn::Value(value)
    }

    pub fn from_fn(f: impl FnOnce(&A) -> T + 'static) -> Self {
        MaybeFn::Fn(Box::new(f))
    }

    pub fn resolve(self, arg: &A) -> T {
        match self {
            MaybeFn::Value(value) => value,
            MaybeFn::Fn(f) => f(arg),
        }
    }
}

/// Pre-bind every slot to `arg`, producing argument-free slots.
pub fn bind_slots<A: 'static>(slots: &Slots<A>, arg: Rc<A>) -> Slots<()> {
    slots
        .iter()
        .map(|(name, slot)| {
            let (slot, arg) = (Rc::clone(slot), Rc::clone(&arg));
            let bound: Slot<()> = Rc::new(move |_: &()| slot(&arg));
            (name.clone(), bound)
        })
        .collect()
}
