//! Signal hub: connection table and dispatch
//!
//! A [`SignalHub`] belongs to one emitting entity. It stores, per signal, a
//! flat list of conditions in insertion order; each condition holds its
//! slots, also in insertion order, together with the transform to apply
//! before delivery.
//!
//! The hub is single-threaded (`!Send`, `!Sync`). Slots may connect,
//! disconnect or emit on the same hub while being dispatched: each emission
//! works on a snapshot of the signal's connections taken before the first
//! slot runs.

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::arity::accepts;
use crate::condition::Condition;
use crate::error::{ConnectError, Result};
use crate::slot::{Slot, SlotKey};
use crate::transform::Transform;
use crate::value::Value;

/// Trait bound for signal identifiers
pub trait SignalKey: Eq + Hash + Clone + fmt::Debug {}

impl<T: Eq + Hash + Clone + fmt::Debug> SignalKey for T {}

/// The set of signals an entity declares it may emit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalSet<S: SignalKey = &'static str> {
    signals: FxHashSet<S>,
}

impl<S: SignalKey> SignalSet<S> {
    pub fn new() -> Self {
        Self {
            signals: FxHashSet::default(),
        }
    }

    pub fn insert(&mut self, signal: S) -> bool {
        self.signals.insert(signal)
    }

    pub fn contains(&self, signal: &S) -> bool {
        self.signals.contains(signal)
    }

    /// Combine two declarations.
    pub fn union(&self, other: &SignalSet<S>) -> SignalSet<S> {
        Self {
            signals: self.signals.union(&other.signals).cloned().collect(),
        }
    }

    /// Add every signal declared by `other`.
    pub fn extend_from(&mut self, other: &SignalSet<S>) {
        self.signals.extend(other.signals.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.signals.iter()
    }
}

impl<S: SignalKey> Default for SignalSet<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SignalKey> FromIterator<S> for SignalSet<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            signals: iter.into_iter().collect(),
        }
    }
}

impl<S: SignalKey> From<&[S]> for SignalSet<S> {
    fn from(signals: &[S]) -> Self {
        signals.iter().cloned().collect()
    }
}

impl<S: SignalKey, const N: usize> From<[S; N]> for SignalSet<S> {
    fn from(signals: [S; N]) -> Self {
        signals.into_iter().collect()
    }
}

/// A slot and the transform applied before it is invoked
#[derive(Clone, Debug)]
struct Connection {
    slot: Slot,
    transform: Transform,
}

/// All slots registered under one condition of a signal
struct Bucket {
    condition: Condition,
    slots: IndexMap<SlotKey, Connection>,
}

/// Buckets captured at the start of an emission
struct BucketSnapshot {
    condition: Condition,
    connections: SmallVec<[Connection; 4]>,
}

type ConnectionTable<S> = FxHashMap<S, Vec<Bucket>>;

/// Connection registry and dispatcher owned by one emitting entity.
pub struct SignalHub<S: SignalKey = &'static str> {
    owner: Cow<'static, str>,
    declared: SignalSet<S>,
    /// Created on first connect, dropped by a full disconnect
    connections: RefCell<Option<ConnectionTable<S>>>,
}

impl<S: SignalKey> SignalHub<S> {
    /// Create a hub accepting connections to `declared` signals.
    pub fn new(declared: impl Into<SignalSet<S>>) -> Self {
        Self::named("SignalHub", declared)
    }

    /// Create a hub whose owner name appears in errors and logs.
    pub fn named(
        owner: impl Into<Cow<'static, str>>,
        declared: impl Into<SignalSet<S>>,
    ) -> Self {
        Self {
            owner: owner.into(),
            declared: declared.into(),
            connections: RefCell::new(None),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn declared_signals(&self) -> &SignalSet<S> {
        &self.declared
    }

    /// Connect `slot` to `signal` with no transform and no condition.
    pub fn connect(&self, signal: S, slot: &Slot) -> Result<()> {
        self.connect_with(signal, slot, Transform::Pass, Condition::Any)
    }

    /// Connect `slot` to `signal`, delivering `transform` applied to the
    /// emitted value whenever `condition` matches it.
    ///
    /// Connecting the same slot under the same signal and condition again
    /// replaces its transform and keeps its position.
    pub fn connect_with(
        &self,
        signal: S,
        slot: &Slot,
        transform: impl Into<Transform>,
        condition: impl Into<Condition>,
    ) -> Result<()> {
        if !self.declared.contains(&signal) {
            return Err(ConnectError::UndefinedSignal {
                owner: self.owner.to_string(),
                signal: format!("{signal:?}"),
            });
        }

        let transform = transform.into();
        let condition = condition.into();
        debug!(
            owner = %self.owner,
            ?signal,
            ?condition,
            ?transform,
            "connect"
        );

        let mut connections = self.connections.borrow_mut();
        let buckets = connections
            .get_or_insert_with(FxHashMap::default)
            .entry(signal)
            .or_default();

        let index = match buckets
            .iter()
            .position(|bucket| bucket.condition.same_key(&condition))
        {
            Some(index) => index,
            None => {
                buckets.push(Bucket {
                    condition,
                    slots: IndexMap::new(),
                });
                buckets.len() - 1
            }
        };

        buckets[index].slots.insert(
            slot.key(),
            Connection {
                slot: slot.clone(),
                transform,
            },
        );
        Ok(())
    }

    /// Remove connections at the finest granularity given.
    ///
    /// - `slot` given: only that (signal, condition, slot) entry, using the
    ///   catch-all condition when `condition` is `None`
    /// - else a condition other than [`Condition::Any`]: every slot under
    ///   that (signal, condition)
    /// - else `signal` given: everything connected to the signal
    /// - else: the whole table
    ///
    /// Removing something that is not connected is a no-op.
    pub fn disconnect(
        &self,
        signal: Option<&S>,
        slot: Option<&Slot>,
        condition: Option<&Condition>,
    ) {
        let condition = condition.filter(|c| !c.is_any());
        match (signal, slot, condition) {
            (Some(signal), Some(slot), condition) => {
                self.disconnect_slot(signal, condition.unwrap_or(&Condition::Any), slot)
            }
            (None, Some(_), _) => {
                debug!(owner = %self.owner, "disconnect of a slot without a signal ignored");
            }
            (Some(signal), None, Some(condition)) => self.disconnect_condition(signal, condition),
            (None, None, Some(_)) => {
                debug!(owner = %self.owner, "disconnect of a condition without a signal ignored");
            }
            (Some(signal), None, None) => self.disconnect_signal(signal),
            (None, None, None) => self.disconnect_all(),
        }
    }

    /// Remove one (signal, condition, slot) entry.
    pub fn disconnect_slot(&self, signal: &S, condition: &Condition, slot: &Slot) {
        debug!(owner = %self.owner, ?signal, ?condition, ?slot, "disconnect slot");
        let mut connections = self.connections.borrow_mut();
        let Some(table) = connections.as_mut() else {
            return;
        };
        let Some(buckets) = table.get_mut(signal) else {
            return;
        };
        if let Some(index) = buckets
            .iter()
            .position(|bucket| bucket.condition.same_key(condition))
        {
            buckets[index].slots.shift_remove(&slot.key());
            if buckets[index].slots.is_empty() {
                buckets.remove(index);
            }
        }
        if buckets.is_empty() {
            table.remove(signal);
        }
    }

    /// Remove every slot registered under (signal, condition).
    pub fn disconnect_condition(&self, signal: &S, condition: &Condition) {
        debug!(owner = %self.owner, ?signal, ?condition, "disconnect condition");
        let mut connections = self.connections.borrow_mut();
        let Some(table) = connections.as_mut() else {
            return;
        };
        if let Some(buckets) = table.get_mut(signal) {
            buckets.retain(|bucket| !bucket.condition.same_key(condition));
            if buckets.is_empty() {
                table.remove(signal);
            }
        }
    }

    /// Remove everything connected to `signal`.
    pub fn disconnect_signal(&self, signal: &S) {
        debug!(owner = %self.owner, ?signal, "disconnect signal");
        if let Some(table) = self.connections.borrow_mut().as_mut() {
            table.remove(signal);
        }
    }

    /// Clear the whole connection table.
    pub fn disconnect_all(&self) {
        debug!(owner = %self.owner, "disconnect all");
        *self.connections.borrow_mut() = None;
    }

    /// Emit `signal` with `value`, invoking every matching slot in
    /// connection order.
    ///
    /// Returns `true` once dispatch completes, including when nothing is
    /// connected. Emitting an undeclared signal is not an error. A panic in
    /// a slot propagates to the caller and skips the remaining slots.
    pub fn emit(&self, signal: &S, value: impl Into<Value>) -> bool {
        self.dispatch(signal, value.into(), None);
        true
    }

    /// Like [`emit`](Self::emit), but collects each invoked slot's return
    /// value in invocation order.
    ///
    /// A matched slot that can be called neither with one argument nor with
    /// none, or that requires an argument while the delivered value is
    /// `Nil`, contributes an empty string.
    pub fn gather(&self, signal: &S, value: impl Into<Value>) -> Vec<Value> {
        let mut results = Vec::new();
        self.dispatch(signal, value.into(), Some(&mut results));
        results
    }

    fn dispatch(&self, signal: &S, value: Value, mut results: Option<&mut Vec<Value>>) {
        let snapshot = self.snapshot(signal);
        if snapshot.is_empty() {
            trace!(owner = %self.owner, ?signal, "emit with no connections");
            return;
        }

        for bucket in snapshot {
            if !bucket.condition.matches(&value) {
                continue;
            }
            for connection in bucket.connections {
                let used = connection.transform.apply(&value);
                let result = self.invoke(signal, &connection.slot, used);
                if let Some(results) = results.as_mut() {
                    results.push(result);
                }
            }
        }
    }

    fn snapshot(&self, signal: &S) -> SmallVec<[BucketSnapshot; 4]> {
        let connections = self.connections.borrow();
        let Some(buckets) = connections.as_ref().and_then(|table| table.get(signal)) else {
            return SmallVec::new();
        };
        buckets
            .iter()
            .map(|bucket| BucketSnapshot {
                condition: bucket.condition.clone(),
                connections: bucket.slots.values().cloned().collect(),
            })
            .collect()
    }

    fn invoke(&self, signal: &S, slot: &Slot, used: Value) -> Value {
        trace!(owner = %self.owner, ?signal, ?slot, value = ?used, "invoke slot");
        let used_nil = used.is_nil();

        if used_nil {
            if accepts(slot, 0) {
                return slot.call(&[]);
            }
        } else if accepts(slot, 1) {
            return slot.call(&[used]);
        } else if accepts(slot, 0) {
            return slot.call(&[]);
        }

        warn!(
            owner = %self.owner,
            ?signal,
            ?slot,
            nil = used_nil,
            "slot cannot be called with the delivered value; skipped"
        );
        Value::Str(String::new())
    }
}

impl<S: SignalKey> fmt::Debug for SignalHub<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let connected = self
            .connections
            .borrow()
            .as_ref()
            .map_or(0, |table| table.len());
        f.debug_struct("SignalHub")
            .field("owner", &self.owner)
            .field("declared", &self.declared.len())
            .field("connected_signals", &connected)
            .finish()
    }
}
