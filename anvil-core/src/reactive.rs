//! Minimal single-threaded observer primitives.
//!
//! Every [`Signal`] carries a monotonically increasing version. Derived values
//! ([`Memo`], [`Computed`]) stamp their cache with the versions of the
//! dependencies they were computed from and recompute lazily on the next read
//! after any of them changed.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Anything whose changes can be detected by comparing versions.
pub trait Observable {
    fn version(&self) -> u64;
}

/// Handle returned by [`Signal::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Subscriber = Rc<dyn Fn()>;

struct SignalInner<T> {
    value: RefCell<T>,
    version: Cell<u64>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
    next_id: Cell<u64>,
}

/// A shared, observable cell.
///
/// Cloning a `Signal` clones the handle; both handles see the same value.
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                value: RefCell::new(value),
                version: Cell::new(0),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Borrow the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner.value.borrow().clone()
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.notify();
    }

    /// Mutate the value in place and notify subscribers.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = {
            let mut value = self.inner.value.borrow_mut();
            f(&mut value)
        };
        self.notify();
        result
    }

    /// Register a callback fired after every write.
    pub fn subscribe(&self, f: impl Fn() + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.subscribers.borrow_mut().push((id, Rc::new(f)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .subscribers
            .borrow_mut()
            .retain(|(existing, _)| *existing != id);
    }

    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Type-erased handle usable as a [`Computed`] dependency.
    pub fn observe(&self) -> Rc<dyn Observable>
    where
        T: 'static,
    {
        Rc::new(self.clone())
    }

    fn notify(&self) {
        self.inner.version.set(self.inner.version.get().wrapping_add(1));
        // Snapshot so callbacks may subscribe or write without re-borrowing.
        let subscribers: Vec<Subscriber> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, f)| Rc::clone(f))
            .collect();
        for subscriber in subscribers {
            subscriber();
        }
    }
}

impl<T> Observable for Signal<T> {
    fn version(&self) -> u64 {
        Signal::version(self)
    }
}

fn stamp<'a>(deps: impl IntoIterator<Item = &'a dyn Observable>) -> Vec<u64> {
    deps.into_iter().map(|dep| dep.version()).collect()
}

/// A cache slot recomputed only when its dependencies changed.
///
/// The dependency list is supplied on every read, so it may differ between
/// reads (e.g. when new items with their own cells were added).
pub struct Memo<T> {
    cache: RefCell<Option<(Vec<u64>, T)>>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self {
            cache: RefCell::new(None),
        }
    }
}

impl<T: Clone> Memo<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, deps: &[&dyn Observable], compute: impl FnOnce() -> T) -> T {
        let stamp = stamp(deps.iter().copied());
        if let Some((cached, value)) = &*self.cache.borrow() {
            if *cached == stamp {
                return value.clone();
            }
        }
        let value = compute();
        *self.cache.borrow_mut() = Some((stamp, value.clone()));
        value
    }

    pub fn invalidate(&self) {
        self.cache.borrow_mut().take();
    }
}

struct ComputedInner<T> {
    deps: Vec<Rc<dyn Observable>>,
    compute: Box<dyn Fn() -> T>,
    memo: Memo<T>,
}

/// A derived value with a fixed dependency list.
pub struct Computed<T> {
    inner: Rc<ComputedInner<T>>,
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Computed<T> {
    pub fn new(deps: Vec<Rc<dyn Observable>>, compute: impl Fn() -> T + 'static) -> Self {
        Self {
            inner: Rc::new(ComputedInner {
                deps,
                compute: Box::new(compute),
                memo: Memo::new(),
            }),
        }
    }

    pub fn get(&self) -> T {
        let deps: Vec<&dyn Observable> = self.inner.deps.iter().map(|dep| dep.as_ref()).collect();
        self.inner.memo.get(&deps, || (self.inner.compute)())
    }
}

impl<T> Observable for Computed<T> {
    fn version(&self) -> u64 {
        stamp(self.inner.deps.iter().map(|dep| dep.as_ref()))
            .into_iter()
            .fold(0u64, u64::wrapping_add)
    }
}

/// A boolean that may be a literal, a reactive cell or a predicate.
///
/// Used for `visible` / `disable` switches on items, columns, actions and
/// toolbar buttons. Predicates receive the owning element and a context value
/// (usually the model or the row).
pub enum Flag<A: ?Sized, B: ?Sized = ()> {
    Value(bool),
    Cell(Signal<bool>),
    Fn(Rc<dyn Fn(&A, &B) -> bool>),
}

impl<A: ?Sized, B: ?Sized> Clone for Flag<A, B> {
    fn clone(&self) -> Self {
        match self {
            Flag::Value(value) => Flag::Value(*value),
            Flag::Cell(cell) => Flag::Cell(cell.clone()),
            Flag::Fn(f) => Flag::Fn(Rc::clone(f)),
        }
    }
}

impl<A: ?Sized, B: ?Sized> fmt::Debug for Flag<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flag::Value(value) => write!(f, "Flag::Value({value})"),
            Flag::Cell(cell) => write!(f, "Flag::Cell({})", cell.get()),
            Flag::Fn(_) => f.write_str("Flag::Fn(..)"),
        }
    }
}

impl<A: ?Sized, B: ?Sized> Flag<A, B> {
    pub fn when(predicate: impl Fn(&A, &B) -> bool + 'static) -> Self {
        Flag::Fn(Rc::new(predicate))
    }

    pub fn eval(&self, a: &A, b: &B) -> bool {
        match self {
            Flag::Value(value) => *value,
            Flag::Cell(cell) => cell.get(),
            Flag::Fn(f) => f(a, b),
        }
    }

    /// The observable backing this flag, if it is a cell.
    pub fn source(&self) -> Option<&dyn Observable> {
        match self {
            Flag::Cell(cell) => Some(cell),
            _ => None,
        }
    }
}

impl<A: ?Sized, B: ?Sized> From<bool> for Flag<A, B> {
    fn from(value: bool) -> Self {
        Flag::Value(value)
    }
}

impl<A: ?Sized, B: ?Sized> From<Signal<bool>> for Flag<A, B> {
    fn from(cell: Signal<bool>) -> Self {
        Flag::Cell(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memo_recomputes_only_after_change() {
        let source = Signal::new(1);
        let memo = Memo::new();
        let calls = Cell::new(0);
        let read = || {
            memo.get(&[&source as &dyn Observable], || {
                calls.set(calls.get() + 1);
                source.get() * 10
            })
        };

        assert_eq!(read(), 10);
        assert_eq!(read(), 10);
        assert_eq!(calls.get(), 1);

        source.set(2);
        assert_eq!(read(), 20);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn memo_notices_a_changed_dependency_list() {
        let (a, b, c) = (Signal::new(0), Signal::new(0), Signal::new(0));
        let memo = Memo::new();
        b.set(1);
        assert_eq!(memo.get(&[&a as &dyn Observable, &b], || "first"), "first");

        // Same version total as before, different dependencies.
        a.set(1);
        assert_eq!(memo.get(&[&a as &dyn Observable, &c], || "second"), "second");
        assert_eq!(memo.get(&[&a as &dyn Observable, &c], || "third"), "second");
    }

    #[test]
    fn computed_tracks_declared_deps() {
        let a = Signal::new(2);
        let b = Signal::new(3);
        let (ca, cb) = (a.clone(), b.clone());
        let sum = Computed::new(vec![a.observe(), b.observe()], move || ca.get() + cb.get());

        assert_eq!(sum.get(), 5);
        b.set(10);
        assert_eq!(sum.get(), 12);
    }

    #[test]
    fn subscribers_fire_on_every_write() {
        let signal = Signal::new(Vec::<i32>::new());
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let id = signal.subscribe(move || counter.set(counter.get() + 1));

        signal.update(|v| v.push(1));
        signal.set(vec![]);
        assert_eq!(hits.get(), 2);

        signal.unsubscribe(id);
        signal.set(vec![3]);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn flag_variants_evaluate() {
        let cell = Signal::new(false);
        let literal: Flag<str> = Flag::from(true);
        let reactive: Flag<str> = Flag::from(cell.clone());
        let predicate: Flag<str> = Flag::when(|name: &str, _| name == "on");

        assert!(literal.eval("x", &()));
        assert!(!reactive.eval("x", &()));
        cell.set(true);
        assert!(reactive.eval("x", &()));
        assert!(predicate.eval("on", &()));
        assert!(!predicate.eval("off", &()));
    }
}
