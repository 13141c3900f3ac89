//! Slots that act on the hub dispatching them, and slots that panic

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use connectable::{SignalHub, Slot, Value};
use pretty_assertions::assert_eq;

const TICK: &str = "tick";

#[test]
fn test_slot_connected_during_emit_runs_next_time() {
    let hub = Rc::new(SignalHub::new([TICK]));
    let late = Slot::new(|| "late");

    let hub_ref = Rc::downgrade(&hub);
    let late_ref = late.clone();
    let connector = Slot::new(move || {
        if let Some(hub) = hub_ref.upgrade() {
            hub.connect(TICK, &late_ref).unwrap();
        }
        "connector"
    });
    hub.connect(TICK, &connector).unwrap();

    assert_eq!(hub.gather(&TICK, ()), vec![Value::from("connector")]);
    assert_eq!(
        hub.gather(&TICK, ()),
        vec![Value::from("connector"), Value::from("late")]
    );
}

#[test]
fn test_slot_disconnected_during_emit_still_runs_once() {
    let hub = Rc::new(SignalHub::new([TICK]));
    let victim = Slot::new(|| "victim");

    let hub_ref = Rc::downgrade(&hub);
    let victim_ref = victim.clone();
    let remover = Slot::new(move || {
        if let Some(hub) = hub_ref.upgrade() {
            hub.disconnect(Some(&TICK), Some(&victim_ref), None);
        }
        "remover"
    });
    hub.connect(TICK, &remover).unwrap();
    hub.connect(TICK, &victim).unwrap();

    assert_eq!(
        hub.gather(&TICK, ()),
        vec![Value::from("remover"), Value::from("victim")]
    );
    assert_eq!(hub.gather(&TICK, ()), vec![Value::from("remover")]);
}

#[test]
fn test_clear_during_emit() {
    let hub = Rc::new(SignalHub::new([TICK]));
    let hub_ref = Rc::downgrade(&hub);
    let clear = Slot::new(move || {
        if let Some(hub) = hub_ref.upgrade() {
            hub.disconnect(None, None, None);
        }
    });
    let after = Slot::new(|| "after");
    hub.connect(TICK, &clear).unwrap();
    hub.connect(TICK, &after).unwrap();

    assert_eq!(
        hub.gather(&TICK, ()),
        vec![Value::Nil, Value::from("after")]
    );
    assert_eq!(hub.gather(&TICK, ()), Vec::<Value>::new());
}

#[test]
fn test_nested_emit() {
    let hub = Rc::new(SignalHub::new([TICK]));
    let depth = Rc::new(Cell::new(0));
    let log = Rc::new(RefCell::new(Vec::new()));

    let hub_ref = Rc::downgrade(&hub);
    let depth_ref = depth.clone();
    let log_ref = log.clone();
    let recurse = Slot::new(move |v: Value| {
        let n = v.as_int().unwrap_or(0);
        log_ref.borrow_mut().push(n);
        depth_ref.set(depth_ref.get().max(n));
        if n < 3 {
            if let Some(hub) = hub_ref.upgrade() {
                hub.emit(&TICK, n + 1);
            }
        }
    });
    hub.connect(TICK, &recurse).unwrap();

    hub.emit(&TICK, 0);

    assert_eq!(*log.borrow(), vec![0, 1, 2, 3]);
    assert_eq!(depth.get(), 3);
}

#[test]
fn test_panic_aborts_remaining_slots() {
    let hub = SignalHub::new([TICK]);
    let ran = Rc::new(Cell::new(0));

    let first_ran = ran.clone();
    let first = Slot::new(move || first_ran.set(first_ran.get() + 1));
    let boom = Slot::new(|v: Value| {
        if v == Value::from("bad") {
            panic!("slot failed on {v}");
        }
    });
    let last_ran = ran.clone();
    let last = Slot::new(move || last_ran.set(last_ran.get() + 1));

    hub.connect(TICK, &first).unwrap();
    hub.connect(TICK, &boom).unwrap();
    hub.connect(TICK, &last).unwrap();

    let result = panic::catch_unwind(AssertUnwindSafe(|| hub.emit(&TICK, "bad")));
    assert!(result.is_err());
    assert_eq!(ran.get(), 1);

    // The table is intact after the unwind
    assert!(hub.emit(&TICK, "good"));
    assert_eq!(ran.get(), 3);
}

struct Echo {
    hits: i64,
    hub: Rc<SignalHub>,
}

impl Echo {
    fn record(&mut self, _value: Value) -> i64 {
        self.hits += 1;
        self.hits
    }

    fn shout(&mut self) -> Vec<Value> {
        self.hub.gather(&TICK, "hi")
    }
}

#[test]
fn test_bound_slot_on_borrowed_receiver_is_skipped() {
    let echo = Rc::new(RefCell::new(Echo {
        hits: 0,
        hub: Rc::new(SignalHub::new([TICK])),
    }));
    let hub = echo.borrow().hub.clone();
    hub.connect(TICK, &Slot::bind(&echo, Echo::record)).unwrap();

    // The receiver is mutably borrowed by `shout` while its own slot fires.
    assert_eq!(echo.borrow_mut().shout(), vec![Value::Nil]);
    assert_eq!(echo.borrow().hits, 0);

    assert_eq!(hub.gather(&TICK, "hi"), vec![Value::Int(1)]);
}
