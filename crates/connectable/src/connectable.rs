//! Capability trait for entities that emit signals

use crate::condition::Condition;
use crate::error::Result;
use crate::hub::{SignalHub, SignalKey, SignalSet};
use crate::slot::Slot;
use crate::transform::Transform;
use crate::value::Value;

/// An entity that declares signals and owns a [`SignalHub`] for them.
///
/// Implementors list their own signals in [`SIGNALS`](Self::SIGNALS) and
/// expose their hub. Types that compose other emitters override
/// [`declared_signals`](Self::declared_signals) to union the composed sets.
///
/// ```rust
/// use connectable::{Connectable, SignalHub, SignalSet, Slot, Value};
///
/// struct Door {
///     hub: SignalHub,
/// }
///
/// impl Connectable for Door {
///     type Signal = &'static str;
///     const SIGNALS: &'static [&'static str] = &["opened"];
///
///     fn hub(&self) -> &SignalHub {
///         &self.hub
///     }
/// }
///
/// struct AlarmedDoor {
///     hub: SignalHub,
/// }
///
/// impl Connectable for AlarmedDoor {
///     type Signal = &'static str;
///     const SIGNALS: &'static [&'static str] = &["alarm"];
///
///     fn declared_signals() -> SignalSet {
///         SignalSet::from(Self::SIGNALS).union(&Door::declared_signals())
///     }
///
///     fn hub(&self) -> &SignalHub {
///         &self.hub
///     }
/// }
///
/// let door = AlarmedDoor { hub: connectable::hub_for::<AlarmedDoor>() };
/// let log = Slot::new(|v: Value| println!("{v}"));
/// assert!(door.connect("opened", &log).is_ok());
/// assert!(door.connect("alarm", &log).is_ok());
/// assert!(door.connect("closed", &log).is_err());
/// ```
pub trait Connectable {
    type Signal: SignalKey + 'static;

    /// Signals declared by this type itself
    const SIGNALS: &'static [Self::Signal];

    /// Every signal this type may emit.
    fn declared_signals() -> SignalSet<Self::Signal>
    where
        Self: Sized,
    {
        SignalSet::from(Self::SIGNALS)
    }

    fn hub(&self) -> &SignalHub<Self::Signal>;

    fn connect(&self, signal: Self::Signal, slot: &Slot) -> Result<()> {
        self.hub().connect(signal, slot)
    }

    fn connect_with(
        &self,
        signal: Self::Signal,
        slot: &Slot,
        transform: impl Into<Transform>,
        condition: impl Into<Condition>,
    ) -> Result<()> {
        self.hub().connect_with(signal, slot, transform, condition)
    }

    fn disconnect(
        &self,
        signal: Option<&Self::Signal>,
        slot: Option<&Slot>,
        condition: Option<&Condition>,
    ) {
        self.hub().disconnect(signal, slot, condition)
    }

    fn emit(&self, signal: &Self::Signal, value: impl Into<Value>) -> bool {
        self.hub().emit(signal, value)
    }

    fn gather(&self, signal: &Self::Signal, value: impl Into<Value>) -> Vec<Value> {
        self.hub().gather(signal, value)
    }
}

/// Build a hub for `T`, named after the type and accepting its declared
/// signals.
pub fn hub_for<T: Connectable>() -> SignalHub<T::Signal> {
    SignalHub::named(short_type_name::<T>(), T::declared_signals())
}

/// `std::any::type_name` without module path or generic arguments.
fn short_type_name<T>() -> String {
    let name = std::any::type_name::<T>();
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base).to_string()
}
