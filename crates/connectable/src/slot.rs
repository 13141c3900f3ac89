//! Slots: callables invoked when a connected signal fires
//!
//! A [`Slot`] is a cheap, clonable handle. Clones share identity, which is
//! what the connection table keys on, so the same handle is used to connect
//! and later disconnect.
//!
//! ```rust
//! use connectable::{Slot, Value};
//!
//! let shout = Slot::new(|v: Value| v.to_string().to_uppercase());
//! let ping = Slot::new(|| "pong");
//! let maybe = Slot::new(|v: Option<Value>| v.is_some());
//!
//! assert_ne!(shout, ping);
//! assert_eq!(shout.clone(), shout);
//! # let _ = maybe;
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::arity::{Arity, Signature};
use crate::value::Value;

/// Type-erased invocation: receives exactly the positional arguments the
/// slot's signature accepts.
type Invoke = dyn Fn(&[Value]) -> Value;

struct SlotInner {
    signature: Signature,
    invoke: Box<Invoke>,
}

/// Handle to a callable registered against a signal.
#[derive(Clone)]
pub struct Slot {
    inner: Rc<SlotInner>,
}

/// Identity of a slot within a connection table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SlotKey(usize);

impl Slot {
    /// Build a slot from a closure or function.
    ///
    /// Supported shapes are `Fn() -> R`, `Fn(Value) -> R`,
    /// `Fn(Option<Value>) -> R` and `Fn(Value, Value) -> R` where
    /// `R: Into<Value>`. Closure parameters must be annotated so the shape
    /// can be inferred.
    pub fn new<M, F: IntoSlot<M>>(f: F) -> Self {
        f.into_slot()
    }

    /// Bind a method to a shared receiver.
    ///
    /// The receiver is held weakly. Once it is dropped, invoking the slot
    /// does nothing and yields [`Value::Nil`]. The receiver is borrowed
    /// mutably for the duration of the call; if it is already borrowed
    /// (a method connected to its own receiver's signal, or a cycle of
    /// connected entities), the call is skipped and yields [`Value::Nil`].
    pub fn bind<T, M, F>(receiver: &Rc<RefCell<T>>, method: F) -> Self
    where
        T: 'static,
        F: IntoMethod<T, M> + 'static,
    {
        let weak = Rc::downgrade(receiver);
        Self::from_parts(F::SIGNATURE, move |args| {
            let Some(receiver) = weak.upgrade() else {
                debug!("bound slot invoked after its receiver was dropped");
                return Value::Nil;
            };
            let Ok(mut receiver) = receiver.try_borrow_mut() else {
                warn!("bound slot skipped: receiver is already borrowed");
                return Value::Nil;
            };
            method.invoke_on(&mut receiver, args)
        })
    }

    /// Build a slot from an explicit signature and an invocation over the
    /// positional arguments.
    pub fn from_parts<F>(signature: Signature, invoke: F) -> Self
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        Self {
            inner: Rc::new(SlotInner {
                signature,
                invoke: Box::new(invoke),
            }),
        }
    }

    /// Invoke the slot with the given positional arguments.
    ///
    /// Callers are expected to check [`accepts`](crate::arity::accepts)
    /// first; missing arguments are filled with `Nil`.
    pub fn call(&self, args: &[Value]) -> Value {
        (self.inner.invoke)(args)
    }

    /// Whether two handles refer to the same slot.
    pub fn ptr_eq(&self, other: &Slot) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn key(&self) -> SlotKey {
        SlotKey(Rc::as_ptr(&self.inner) as *const () as usize)
    }
}

impl Arity for Slot {
    fn signature(&self) -> Signature {
        self.inner.signature
    }
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Slot {}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("id", &self.key().0)
            .field("signature", &self.inner.signature)
            .finish()
    }
}

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or_default()
}

/// Conversion of a callable into a [`Slot`], recording its signature.
///
/// `Marker` only disambiguates the closure shape.
pub trait IntoSlot<Marker> {
    fn into_slot(self) -> Slot;
}

impl<F, R> IntoSlot<fn() -> R> for F
where
    F: Fn() -> R + 'static,
    R: Into<Value>,
{
    fn into_slot(self) -> Slot {
        Slot::from_parts(Signature::nullary(), move |_| self().into())
    }
}

impl<F, R> IntoSlot<fn(Value) -> R> for F
where
    F: Fn(Value) -> R + 'static,
    R: Into<Value>,
{
    fn into_slot(self) -> Slot {
        Slot::from_parts(Signature::unary(), move |args| self(arg(args, 0)).into())
    }
}

impl<F, R> IntoSlot<fn(Option<Value>) -> R> for F
where
    F: Fn(Option<Value>) -> R + 'static,
    R: Into<Value>,
{
    fn into_slot(self) -> Slot {
        Slot::from_parts(Signature::optional(), move |args| {
            self(args.first().cloned()).into()
        })
    }
}

impl<F, R> IntoSlot<fn(Value, Value) -> R> for F
where
    F: Fn(Value, Value) -> R + 'static,
    R: Into<Value>,
{
    fn into_slot(self) -> Slot {
        Slot::from_parts(Signature::new(2, 2), move |args| {
            self(arg(args, 0), arg(args, 1)).into()
        })
    }
}

/// A method taking `&mut T` as its receiver, usable with [`Slot::bind`].
///
/// The receiver is not part of [`SIGNATURE`](IntoMethod::SIGNATURE).
pub trait IntoMethod<T, Marker> {
    const SIGNATURE: Signature;

    fn invoke_on(&self, receiver: &mut T, args: &[Value]) -> Value;
}

impl<T, F, R> IntoMethod<T, fn(&mut T) -> R> for F
where
    F: Fn(&mut T) -> R,
    R: Into<Value>,
{
    const SIGNATURE: Signature = Signature::nullary();

    fn invoke_on(&self, receiver: &mut T, _args: &[Value]) -> Value {
        self(receiver).into()
    }
}

impl<T, F, R> IntoMethod<T, fn(&mut T, Value) -> R> for F
where
    F: Fn(&mut T, Value) -> R,
    R: Into<Value>,
{
    const SIGNATURE: Signature = Signature::unary();

    fn invoke_on(&self, receiver: &mut T, args: &[Value]) -> Value {
        self(receiver, arg(args, 0)).into()
    }
}

impl<T, F, R> IntoMethod<T, fn(&mut T, Option<Value>) -> R> for F
where
    F: Fn(&mut T, Option<Value>) -> R,
    R: Into<Value>,
{
    const SIGNATURE: Signature = Signature::optional();

    fn invoke_on(&self, receiver: &mut T, args: &[Value]) -> Value {
        self(receiver, args.first().cloned()).into()
    }
}

impl<T, F, R> IntoMethod<T, fn(&mut T, Value, Value) -> R> for F
where
    F: Fn(&mut T, Value, Value) -> R,
    R: Into<Value>,
{
    const SIGNATURE: Signature = Signature::new(2, 2);

    fn invoke_on(&self, receiver: &mut T, args: &[Value]) -> Value {
        self(receiver, arg(args, 0), arg(args, 1)).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arity::accepts;
    use pretty_assertions::assert_eq;

    struct Counter {
        hits: i64,
    }

    impl Counter {
        fn bump(&mut self) -> i64 {
            self.hits += 1;
            self.hits
        }

        fn add(&mut self, v: Value) {
            self.hits += v.as_int().unwrap_or(0);
        }

        fn pair(&mut self, _a: Value, _b: Value) {}
    }

    #[test]
    fn test_closure_signatures() {
        assert_eq!(Slot::new(|| ()).signature(), Signature::nullary());
        assert_eq!(Slot::new(|_: Value| ()).signature(), Signature::unary());
        assert_eq!(
            Slot::new(|_: Option<Value>| ()).signature(),
            Signature::optional()
        );
        assert_eq!(
            Slot::new(|_: Value, _: Value| ()).signature(),
            Signature::new(2, 2)
        );
    }

    #[test]
    fn test_bound_method_excludes_receiver() {
        let counter = Rc::new(RefCell::new(Counter { hits: 0 }));

        let bump = Slot::bind(&counter, Counter::bump);
        let add = Slot::bind(&counter, Counter::add);
        let pair = Slot::bind(&counter, Counter::pair);

        assert!(accepts(&bump, 0));
        assert!(accepts(&add, 1));
        assert!(!accepts(&pair, 0));
        assert!(!accepts(&pair, 1));

        assert_eq!(bump.call(&[]), Value::Int(1));
        add.call(&[Value::Int(10)]);
        assert_eq!(counter.borrow().hits, 11);
    }

    #[test]
    fn test_dropped_receiver_yields_nil() {
        let counter = Rc::new(RefCell::new(Counter { hits: 0 }));
        let bump = Slot::bind(&counter, Counter::bump);
        drop(counter);

        assert_eq!(bump.call(&[]), Value::Nil);
    }

    #[test]
    fn test_borrowed_receiver_is_skipped() {
        let counter = Rc::new(RefCell::new(Counter { hits: 0 }));
        let bump = Slot::bind(&counter, Counter::bump);

        {
            let _held = counter.borrow();
            assert_eq!(bump.call(&[]), Value::Nil);
        }
        assert_eq!(counter.borrow().hits, 0);
        assert_eq!(bump.call(&[]), Value::Int(1));
    }

    #[test]
    fn test_identity_follows_handle() {
        let a = Slot::new(|| ());
        let b = Slot::new(|| ());

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.key(), a.clone().key());
    }

    #[test]
    fn test_optional_argument() {
        let echo = Slot::new(|v: Option<Value>| v.unwrap_or_else(|| "nobody".into()));

        assert_eq!(echo.call(&[]), Value::from("nobody"));
        assert_eq!(echo.call(&["Tim".into()]), Value::from("Tim"));
    }
}
