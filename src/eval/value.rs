//! Runtime values for the Jung language.
//!
//! A [`Value`] is a discriminated union over the kinds the language
//! exposes: null, bool, number, string, array, object, and function
//! (builtins share the function kind).
//!
//! Numbers keep an integer/float distinction internally ([`Value::Int`]
//! versus [`Value::Float`]) even though the language surface has a
//! single `number` kind: `10 / 3` divides as integers while `10.0 / 4`
//! divides exactly, and only the representation can tell those apart.
//! Both variants report the type name `number` and compare equal across
//! the divide when their values agree.
//!
//! # Ownership
//!
//! Primitives are by-value and cheap to copy. Strings own their buffer
//! and copy it on clone. Arrays and objects are reference-shared handles
//! (`Rc<RefCell<...>>`): cloning a value clones the handle, so mutation
//! through any alias is visible through every other. This is what makes
//! `this.name = n` inside a method visible to the caller, and it gives
//! the language's `==` a real identity to compare for aggregates.
//! Function values share their declaration with the AST through an `Rc`.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::FunctionDecl;

/// A shared, mutable array payload.
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// A shared, mutable object payload.
///
/// Objects iterate in insertion order; removing an entry preserves the
/// order of the remaining ones.
pub type ObjectRef = Rc<RefCell<IndexMap<String, Value>>>;

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The absence of a value
    Null,
    /// A boolean
    Bool(bool),
    /// An integer number
    Int(i64),
    /// A floating-point number
    Float(f64),
    /// An owned string
    Str(String),
    /// A shared array
    Array(ArrayRef),
    /// A shared object
    Object(ObjectRef),
    /// A user function, sharing its declaration
    Function(Rc<FunctionDecl>),
    /// A builtin operation, identified by its registry name
    Builtin(&'static str),
}

impl Value {
    /// Wraps a vector in a fresh array handle.
    pub fn array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    /// Wraps a map in a fresh object handle.
    pub fn object(entries: IndexMap<String, Value>) -> Value {
        Value::Object(Rc::new(RefCell::new(entries)))
    }

    /// Returns the stable lower-case name of this value's kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) | Value::Float(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) | Value::Builtin(_) => "function",
        }
    }

    /// Returns the numeric value of either number variant.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Maps this value to a boolean for control-flow tests.
    ///
    /// Null, false, zero, the empty string, and the empty array are
    /// falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(items) => !items.borrow().is_empty(),
            Value::Object(_) | Value::Function(_) | Value::Builtin(_) => true,
        }
    }

    /// Language equality: primitives by value (numbers compare across
    /// the int/float divide), strings by content, arrays and objects by
    /// handle identity.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }

    /// Renders this value for printing.
    ///
    /// Strings render bare at the top level; inside arrays and objects
    /// they render quoted and escaped.
    pub fn render(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.render_nested(),
        }
    }

    /// Renders this value in its nested (JSON-like) form.
    ///
    /// This is also the serialized form `jsonStringify` produces, so the
    /// printed and the serialized representation of an aggregate agree.
    pub fn render_nested(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => format_number(*n),
            Value::Str(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('"');
                for ch in s.chars() {
                    match ch {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        '\t' => out.push_str("\\t"),
                        '\r' => out.push_str("\\r"),
                        other => out.push(other),
                    }
                }
                out.push('"');
                out
            }
            Value::Array(items) => {
                let items = items.borrow();
                let parts: Vec<String> = items.iter().map(|v| v.render_nested()).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Object(entries) => {
                let entries = entries.borrow();
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("\"{}\": {}", k, v.render_nested()))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            Value::Function(decl) => format!("<function {}>", decl.name),
            Value::Builtin(name) => format!("<builtin {}>", name),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Formats a float the way the language prints it.
///
/// Integer-valued floats inside `[-1e15, 1e15]` render without a
/// decimal point; everything else uses the shortest general form.
/// NaN and the infinities render through the general form.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
