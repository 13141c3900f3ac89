//! Filters restricting which emitted values reach a slot.

use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// Predicate condition type
pub type Predicate = Rc<dyn Fn(&Value) -> bool>;

/// Decides whether an emitted value triggers the slots registered under it.
///
/// Conditions also act as keys: each signal holds a flat list of distinct
/// conditions, each with its own slots.
#[derive(Clone, Default)]
pub enum Condition {
    /// Matches every emitted value
    #[default]
    Any,
    /// Matches values equal to the literal; `Int` and `Float` literals
    /// match by numeric value (see [`Value::loosely_eq`])
    Equals(Value),
    /// Matches values for which the predicate returns true
    Predicate(Predicate),
}

impl Condition {
    /// Build a predicate condition.
    pub fn when<F: Fn(&Value) -> bool + 'static>(predicate: F) -> Self {
        Self::Predicate(Rc::new(predicate))
    }

    /// Build a literal condition.
    pub fn equals(value: impl Into<Value>) -> Self {
        Self::Equals(value.into())
    }

    /// Whether an emitted `value` satisfies this condition.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Condition::Any => true,
            Condition::Equals(expected) => expected.loosely_eq(value),
            Condition::Predicate(predicate) => predicate(value),
        }
    }

    /// Whether two conditions address the same bucket in a connection table.
    ///
    /// Literals compare by value, predicates by identity. A literal never
    /// shares a bucket with a predicate.
    pub fn same_key(&self, other: &Condition) -> bool {
        match (self, other) {
            (Condition::Any, Condition::Any) => true,
            (Condition::Equals(a), Condition::Equals(b)) => a.loosely_eq(b),
            (Condition::Predicate(a), Condition::Predicate(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Condition::Any)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Any => f.write_str("Any"),
            Condition::Equals(v) => f.debug_tuple("Equals").field(v).finish(),
            Condition::Predicate(p) => f
                .debug_tuple("Predicate")
                .field(&Rc::as_ptr(p).cast::<()>())
                .finish(),
        }
    }
}

impl From<Value> for Condition {
    fn from(value: Value) -> Self {
        Self::Equals(value)
    }
}
