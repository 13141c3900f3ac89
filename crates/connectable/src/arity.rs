//! Argument-arity introspection for slots
//!
//! Rust closures carry their parameter list in their type, so a slot's
//! signature is recorded once when the slot is built (see
//! [`IntoSlot`](crate::slot::IntoSlot)) instead of being discovered by a trial
//! call. Dispatch then asks [`accepts`] which invocation form fits.

/// Declared positional parameters of a callable.
///
/// For receiver-bound methods the receiver is not counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Parameters that must be supplied
    pub required: usize,
    /// Required plus defaultable parameters
    pub positional: usize,
}

impl Signature {
    pub const fn new(required: usize, positional: usize) -> Self {
        Self {
            required,
            positional,
        }
    }

    /// No parameters.
    pub const fn nullary() -> Self {
        Self::new(0, 0)
    }

    /// Exactly one required parameter.
    pub const fn unary() -> Self {
        Self::new(1, 1)
    }

    /// One parameter that may be omitted.
    pub const fn optional() -> Self {
        Self::new(0, 1)
    }

    /// Whether a call with exactly `n` positional arguments is valid.
    pub const fn accepts(&self, n: usize) -> bool {
        self.required <= n && n <= self.positional
    }
}

/// Anything whose parameter list can be inspected without calling it.
pub trait Arity {
    fn signature(&self) -> Signature;
}

impl Arity for Signature {
    fn signature(&self) -> Signature {
        *self
    }
}

/// Returns true if `callable` can be invoked with exactly `n` positional
/// arguments.
pub fn accepts<C: Arity + ?Sized>(callable: &C, n: usize) -> bool {
    callable.signature().accepts(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullary() {
        let sig = Signature::nullary();
        assert!(accepts(&sig, 0));
        assert!(!accepts(&sig, 1));
    }

    #[test]
    fn test_unary() {
        let sig = Signature::unary();
        assert!(!accepts(&sig, 0));
        assert!(accepts(&sig, 1));
    }

    #[test]
    fn test_defaultable_accepts_both() {
        let sig = Signature::optional();
        assert!(accepts(&sig, 0));
        assert!(accepts(&sig, 1));
        assert!(!accepts(&sig, 2));
    }

    #[test]
    fn test_too_many_required() {
        let sig = Signature::new(2, 2);
        assert!(!accepts(&sig, 0));
        assert!(!accepts(&sig, 1));
        assert!(accepts(&sig, 2));
    }
}
