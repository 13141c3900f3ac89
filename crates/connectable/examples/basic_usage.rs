//! A speaker greets a room; everyone in the room greets back.
//!
//! Run with `RUST_LOG=connectable=trace` to see dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use connectable::{hub_for, Condition, Connectable, SignalHub, Slot, Value};
use tracing_subscriber::EnvFilter;

const SAYS_HELLO: &str = "says_hello";

struct Person {
    name: String,
    hub: SignalHub,
}

impl Connectable for Person {
    type Signal = &'static str;
    const SIGNALS: &'static [&'static str] = &[SAYS_HELLO];

    fn hub(&self) -> &SignalHub {
        &self.hub
    }
}

impl Person {
    fn new(name: &str) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            name: name.to_string(),
            hub: hub_for::<Person>(),
        }))
    }

    fn say_hello(&mut self, to: Option<Value>) {
        match to {
            Some(to) => println!("Hi {to}, this is {}", self.name),
            None => println!("Hi! This is {}", self.name),
        }
        self.emit(&SAYS_HELLO, self.name.as_str());
    }
}

fn main() -> connectable::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let speaker = Person::new("Tim");
    let room = ["Amanda", "Bob", "Ted", "Sue"].map(Person::new);
    let heckler = Person::new("The *Real* Timothy");

    for person in &room {
        speaker
            .borrow()
            .connect(SAYS_HELLO, &Slot::bind(person, Person::say_hello))?;
    }
    speaker.borrow().connect_with(
        SAYS_HELLO,
        &Slot::bind(&heckler, Person::say_hello),
        "you horrible imposter",
        Condition::Any,
    )?;

    speaker.borrow_mut().say_hello(None);
    Ok(())
}
