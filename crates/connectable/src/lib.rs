//! Connectable
//!
//! Runtime signal/slot connections for any type that opts in:
//!
//! - **Signals**: named events an entity declares it may emit
//! - **Slots**: callables invoked when a connected signal fires
//! - **Conditions**: optional filters on the emitted value
//! - **Transforms**: optional overrides applied before delivery
//!
//! Slots are called with one argument or none depending on their signature,
//! which is captured from the closure type when the slot is built.
//!
//! # Example
//!
//! ```rust
//! use connectable::{Condition, SignalHub, Slot, Transform, Value};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let hub = SignalHub::new(["valueChanged"]);
//!
//! let received = Rc::new(RefCell::new(Value::Nil));
//! let sink = received.clone();
//! let set_value = Slot::new(move |v: Value| *sink.borrow_mut() = v);
//!
//! hub.connect_with(
//!     "valueChanged",
//!     &set_value,
//!     Transform::template("got {value}"),
//!     Condition::equals("Hello"),
//! )
//! .unwrap();
//!
//! hub.emit(&"valueChanged", "Goodbye");
//! assert_eq!(*received.borrow(), Value::Nil);
//!
//! hub.emit(&"valueChanged", "Hello");
//! assert_eq!(*received.borrow(), Value::from("got Hello"));
//! ```

pub mod arity;
pub mod condition;
pub mod connectable;
pub mod error;
pub mod hub;
pub mod slot;
pub mod transform;
pub mod value;

pub use arity::{accepts, Arity, Signature};
pub use condition::Condition;
pub use connectable::{hub_for, Connectable};
pub use error::{ConnectError, Result};
pub use hub::{SignalHub, SignalKey, SignalSet};
pub use slot::{IntoMethod, IntoSlot, Slot};
pub use transform::Transform;
pub use value::Value;
