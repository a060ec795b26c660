//! Runtime evaluation for the Jung language.
//!
//! This module contains the value model, the builtin registry, and the
//! tree-walking interpreter that executes parsed programs.
//!
//! # Example
//!
//! ```rust
//! use jung::eval::{Interpreter, Value};
//!
//! let mut interpreter = Interpreter::new();
//! interpreter.run_source("let x = 2 + 3").unwrap();
//! assert_eq!(interpreter.get_global("x"), Some(Value::Int(5)));
//! ```
//!
//! Numbers are one surface kind with two internal representations:
//! integer arithmetic stays integral (`10 / 3` is `3`) and floats
//! propagate (`10.0 / 4` is `2.5`).

pub mod builtins;
pub mod interpreter;
pub mod value;

pub use interpreter::{Flow, Interpreter};
pub use value::{format_number, Value};
