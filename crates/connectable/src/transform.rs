//! Value transforms applied between emission and delivery
//!
//! A transform decides what a slot actually receives:
//! - `Pass` delivers the emitted value unchanged
//! - `Literal` replaces it with a fixed value
//! - `Template` interpolates it into a string (`{value}` placeholder)
//! - `Map` computes the delivered value from the emitted one

use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// Mapping transform type
pub type MapFn = Rc<dyn Fn(&Value) -> Value>;

const PLACEHOLDER: &str = "value";

/// What a slot receives for an emitted value.
#[derive(Clone, Default)]
pub enum Transform {
    #[default]
    Pass,
    Literal(Value),
    Template(String),
    Map(MapFn),
}

impl Transform {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn template(template: impl Into<String>) -> Self {
        Self::Template(template.into())
    }

    pub fn map<F, R>(f: F) -> Self
    where
        F: Fn(&Value) -> R + 'static,
        R: Into<Value>,
    {
        Self::Map(Rc::new(move |v| f(v).into()))
    }

    /// Compute the value delivered to a slot.
    pub fn apply(&self, value: &Value) -> Value {
        match self {
            Transform::Pass => value.clone(),
            Transform::Literal(literal) => literal.clone(),
            Transform::Template(template) => Value::Str(render_template(template, value)),
            Transform::Map(f) => f(value),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Pass => f.write_str("Pass"),
            Transform::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Transform::Template(t) => f.debug_tuple("Template").field(t).finish(),
            Transform::Map(m) => f
                .debug_tuple("Map")
                .field(&Rc::as_ptr(m).cast::<()>())
                .finish(),
        }
    }
}

/// Strings always act as templates; a string without placeholders renders
/// to itself.
impl From<&str> for Transform {
    fn from(template: &str) -> Self {
        Self::Template(template.to_string())
    }
}

impl From<String> for Transform {
    fn from(template: String) -> Self {
        Self::Template(template)
    }
}

impl From<Value> for Transform {
    fn from(value: Value) -> Self {
        match value {
            Value::Str(s) => Self::Template(s),
            other => Self::Literal(other),
        }
    }
}

/// Replace `{value}` tokens in `template` with `value`.
///
/// `{{` and `}}` escape braces, unknown `{name}` tokens are kept verbatim and
/// an unclosed `{` is literal text.
pub fn render_template(template: &str, value: &Value) -> String {
    if !template.contains('{') && !template.contains('}') {
        return template.to_string();
    }

    let mut out = String::with_capacity(template.len() + 8);
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '}' {
            if chars.peek() == Some(&'}') {
                chars.next();
            }
            out.push('}');
            continue;
        }
        if c != '{' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'{') {
            chars.next();
            out.push('{');
            continue;
        }

        let mut key = String::new();
        let mut closed = false;
        for n in chars.by_ref() {
            if n == '}' {
                closed = true;
                break;
            }
            key.push(n);
        }

        if !closed {
            out.push('{');
            out.push_str(&key);
            break;
        }

        if key.trim() == PLACEHOLDER {
            out.push_str(&value.to_string());
        } else {
            // Keep unknown placeholders visible.
            out.push('{');
            out.push_str(&key);
            out.push('}');
        }
    }

    out
}
