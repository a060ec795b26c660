//! Builtin functions for the Jung runtime.
//!
//! The builtin registry is keyed by name: the evaluator asks
//! [`is_builtin`] during call resolution and dispatches through
//! [`call_builtin`]. Builtin *methods* (operations invoked with
//! `receiver.method(args)` syntax on strings, arrays, and objects) go
//! through [`call_method`] after class-method dispatch has failed.
//!
//! The higher-order functions `map`, `filter`, and `reduce` are not
//! here: they need to call back into the evaluator and are special-cased
//! by it.

use std::io::Write;
use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;

use crate::ast::Span;
use crate::error::RuntimeError;
use crate::eval::value::Value;

/// Every name the builtin registry answers to.
const BUILTIN_NAMES: &[&str] = &[
    // Collections
    "len", "push", "pop", "range", "slice", "sort", "reverse", "keys", "values", "has", "delete",
    // Strings
    "split", "join",
    // Conversions and introspection
    "str", "toString", "int", "float", "number", "type",
    // Arithmetic
    "abs", "floor", "ceil", "round", "sqrt", "min", "max", "pow",
    // I/O
    "readFile", "writeFile", "appendFile", "input",
    // Serialization
    "jsonStringify", "stringify", "jsonParse", "parse",
    // Time
    "time", "clock",
    // Process
    "exit",
    // Registered for source compatibility; there is no network surface
    "httpGet", "httpPost",
];

/// Returns true if `name` is a registered builtin.
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// Returns the canonical registry entry for `name`, for use as a
/// [`Value::Builtin`] payload.
pub fn lookup(name: &str) -> Option<&'static str> {
    BUILTIN_NAMES.iter().find(|n| **n == name).copied()
}

/// Calls a builtin function by name with the given arguments.
pub fn call_builtin(name: &str, args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    match name {
        "len" => builtin_len(args, span),
        "push" => builtin_push(args, span),
        "pop" => builtin_pop(args, span),
        "range" => builtin_range(args, span),
        "slice" => builtin_slice(args, span),
        "sort" => builtin_sort(args, span),
        "reverse" => builtin_reverse(args, span),
        "keys" => builtin_keys(args, span),
        "values" => builtin_values(args, span),
        "has" => builtin_has(args, span),
        "delete" => builtin_delete(args, span),
        "split" => builtin_split(args, span),
        "join" => builtin_join(args, span),
        "str" | "toString" => builtin_str(args, span),
        "int" => builtin_int(args, span),
        "float" | "number" => builtin_float(args, span),
        "type" => builtin_type(args, span),
        "abs" | "floor" | "ceil" | "round" | "sqrt" => builtin_math_unary(name, args, span),
        "min" | "max" | "pow" => builtin_math_binary(name, args, span),
        "readFile" => builtin_read_file(args, span),
        "writeFile" => builtin_write_file(args, span, false),
        "appendFile" => builtin_write_file(args, span, true),
        "input" => builtin_input(args, span),
        "jsonStringify" | "stringify" => builtin_json_stringify(args, span),
        "jsonParse" | "parse" => builtin_json_parse(args, span),
        "time" => builtin_time(args, span),
        "clock" => builtin_clock(args, span),
        "exit" => builtin_exit(args, span),
        // Sentinel: HTTP names exist only so sources naming them load
        "httpGet" | "httpPost" => Ok(Value::Null),
        other => Err(RuntimeError::UndefinedFunction {
            name: other.to_string(),
            span,
        }),
    }
}

/// Dispatches a builtin method on a receiver value.
///
/// This is the fallback path of method calls: the evaluator only lands
/// here when the receiver is not a class instance or its class does not
/// define the method.
pub fn call_method(
    receiver: &Value,
    method: &str,
    args: &[Value],
    span: Span,
) -> Result<Value, RuntimeError> {
    match receiver {
        Value::Str(s) => string_method(s, method, args, span),
        Value::Array(_) => array_method(receiver, method, args, span),
        Value::Object(entries) => match method {
            "length" => {
                expect_arity(method, "0", args, 0, span)?;
                Ok(Value::Int(entries.borrow().len() as i64))
            }
            _ => Err(no_such_method(method, receiver, span)),
        },
        _ => Err(no_such_method(method, receiver, span)),
    }
}

fn no_such_method(method: &str, receiver: &Value, span: Span) -> RuntimeError {
    RuntimeError::NoSuchMethod {
        method: method.to_string(),
        kind: receiver.type_name(),
        span,
    }
}

fn string_method(s: &str, method: &str, args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    match method {
        "length" => {
            expect_arity(method, "0", args, 0, span)?;
            Ok(Value::Int(s.chars().count() as i64))
        }
        "upper" => {
            expect_arity(method, "0", args, 0, span)?;
            Ok(Value::Str(s.to_uppercase()))
        }
        "lower" => {
            expect_arity(method, "0", args, 0, span)?;
            Ok(Value::Str(s.to_lowercase()))
        }
        "trim" => {
            expect_arity(method, "0", args, 0, span)?;
            Ok(Value::Str(s.trim().to_string()))
        }
        "contains" => {
            expect_arity(method, "1", args, 1, span)?;
            let needle = want_string(method, &args[0], span)?;
            Ok(Value::Bool(s.contains(needle)))
        }
        "replace" => {
            expect_arity(method, "2", args, 2, span)?;
            let old = want_string(method, &args[0], span)?;
            let new = want_string(method, &args[1], span)?;
            Ok(Value::Str(s.replace(old, new)))
        }
        "indexOf" => {
            expect_arity(method, "1", args, 1, span)?;
            let needle = want_string(method, &args[0], span)?;
            match s.find(needle) {
                Some(byte_pos) => Ok(Value::Int(s[..byte_pos].chars().count() as i64)),
                None => Ok(Value::Int(-1)),
            }
        }
        _ => Err(no_such_method(method, &Value::Str(s.to_string()), span)),
    }
}

fn array_method(
    receiver: &Value,
    method: &str,
    args: &[Value],
    span: Span,
) -> Result<Value, RuntimeError> {
    let Value::Array(items) = receiver else {
        unreachable!("array_method called with non-array receiver");
    };
    match method {
        "length" => {
            expect_arity(method, "0", args, 0, span)?;
            Ok(Value::Int(items.borrow().len() as i64))
        }
        "push" => {
            expect_arity(method, "1", args, 1, span)?;
            items.borrow_mut().push(args[0].clone());
            Ok(receiver.clone())
        }
        "pop" => {
            expect_arity(method, "0", args, 0, span)?;
            Ok(items.borrow_mut().pop().unwrap_or(Value::Null))
        }
        "includes" => {
            expect_arity(method, "1", args, 1, span)?;
            let found = items.borrow().iter().any(|v| v.equals(&args[0]));
            Ok(Value::Bool(found))
        }
        "flat" => {
            expect_arity(method, "0", args, 0, span)?;
            let mut out = Vec::new();
            for item in items.borrow().iter() {
                match item {
                    Value::Array(inner) => out.extend(inner.borrow().iter().cloned()),
                    other => out.push(other.clone()),
                }
            }
            Ok(Value::array(out))
        }
        "concat" => {
            expect_arity(method, "1", args, 1, span)?;
            let other = want_array(method, &args[0], span)?;
            let mut out = items.borrow().clone();
            out.extend(other.borrow().iter().cloned());
            Ok(Value::array(out))
        }
        _ => Err(no_such_method(method, receiver, span)),
    }
}

// === Collections ===

/// len(x) - element count of a string, array, or object.
fn builtin_len(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("len", "1", args, 1, span)?;
    let count = match &args[0] {
        Value::Str(s) => s.chars().count(),
        Value::Array(items) => items.borrow().len(),
        Value::Object(entries) => entries.borrow().len(),
        other => {
            return Err(type_error(
                format!("len expects a string, array, or object, got {}", other.type_name()),
                span,
            ));
        }
    };
    Ok(Value::Int(count as i64))
}

/// push(arr, v) - appends in place and returns the array.
fn builtin_push(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("push", "2", args, 2, span)?;
    let items = want_array("push", &args[0], span)?;
    items.borrow_mut().push(args[1].clone());
    Ok(args[0].clone())
}

/// pop(arr) - removes and returns the last element, null when empty.
fn builtin_pop(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("pop", "1", args, 1, span)?;
    let items = want_array("pop", &args[0], span)?;
    let popped = items.borrow_mut().pop();
    Ok(popped.unwrap_or(Value::Null))
}

/// range(n) or range(start, end) - integers from start (default 0) to end - 1.
fn builtin_range(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    let (start, end) = match args.len() {
        1 => (0, want_number("range", &args[0], span)? as i64),
        2 => (
            want_number("range", &args[0], span)? as i64,
            want_number("range", &args[1], span)? as i64,
        ),
        got => return Err(arity_error("range", "1 or 2", got, span)),
    };

    let out: Vec<Value> = (start..end.max(start)).map(Value::Int).collect();
    Ok(Value::array(out))
}

/// slice(str_or_arr, start, end?) - subrange with negative-from-end indices.
fn builtin_slice(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    if args.len() != 2 && args.len() != 3 {
        return Err(arity_error("slice", "2 or 3", args.len(), span));
    }

    let start = want_number("slice", &args[1], span)?;
    match &args[0] {
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let (from, to) = slice_bounds(chars.len(), start, args.get(2), span)?;
            Ok(Value::Str(chars[from..to].iter().collect()))
        }
        Value::Array(items) => {
            let items = items.borrow();
            let (from, to) = slice_bounds(items.len(), start, args.get(2), span)?;
            Ok(Value::array(items[from..to].to_vec()))
        }
        other => Err(type_error(
            format!("slice expects a string or array, got {}", other.type_name()),
            span,
        )),
    }
}

/// Resolves slice endpoints: negative indices count from the end, and
/// the range is clamped to the container.
fn slice_bounds(
    len: usize,
    start: f64,
    end: Option<&Value>,
    span: Span,
) -> Result<(usize, usize), RuntimeError> {
    let resolve = |i: f64| -> usize {
        let i = i.trunc();
        let idx = if i < 0.0 { i + len as f64 } else { i };
        idx.max(0.0).min(len as f64) as usize
    };

    let from = resolve(start);
    let to = match end {
        Some(v) => resolve(want_number("slice", v, span)?),
        None => len,
    };
    Ok((from, to.max(from)))
}

/// sort(arr) - a new sorted array.
///
/// Numbers sort numerically and strings lexicographically. Mixed-type
/// arrays order by type first; the relative order within other types is
/// unspecified but the operation never fails.
fn builtin_sort(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("sort", "1", args, 1, span)?;
    let items = want_array("sort", &args[0], span)?;
    let mut out = items.borrow().clone();
    out.sort_by(compare_for_sort);
    Ok(Value::array(out))
}

fn compare_for_sort(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Str(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
            Value::Function(_) | Value::Builtin(_) => 6,
        }
    }

    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => return x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => {}
    }
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// reverse(arr) - a new reversed array.
fn builtin_reverse(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("reverse", "1", args, 1, span)?;
    let items = want_array("reverse", &args[0], span)?;
    let mut out = items.borrow().clone();
    out.reverse();
    Ok(Value::array(out))
}

/// keys(obj) - the object's keys as an array of strings.
fn builtin_keys(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("keys", "1", args, 1, span)?;
    let entries = want_object("keys", &args[0], span)?;
    let keys: Vec<Value> = entries
        .borrow()
        .keys()
        .map(|k| Value::Str(k.clone()))
        .collect();
    Ok(Value::array(keys))
}

/// values(obj) - the object's values as an array.
fn builtin_values(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("values", "1", args, 1, span)?;
    let entries = want_object("values", &args[0], span)?;
    let values: Vec<Value> = entries.borrow().values().cloned().collect();
    Ok(Value::array(values))
}

/// has(obj, key) - whether the key is present.
///
/// This is the one read path that distinguishes an absent key from a
/// key explicitly mapped to null.
fn builtin_has(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("has", "2", args, 2, span)?;
    let entries = want_object("has", &args[0], span)?;
    let key = want_string("has", &args[1], span)?;
    let present = entries.borrow().contains_key(key);
    Ok(Value::Bool(present))
}

/// delete(obj, key) - removes the key, preserving the iteration order
/// of the remaining entries. Returns whether the key was present.
fn builtin_delete(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("delete", "2", args, 2, span)?;
    let entries = want_object("delete", &args[0], span)?;
    let key = want_string("delete", &args[1], span)?;
    let removed = entries.borrow_mut().shift_remove(key).is_some();
    Ok(Value::Bool(removed))
}

// === Strings ===

/// split(s, delim) - splits into an array of strings.
///
/// An empty delimiter splits into single characters.
fn builtin_split(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("split", "2", args, 2, span)?;
    let s = want_string("split", &args[0], span)?;
    let delim = want_string("split", &args[1], span)?;

    let parts: Vec<Value> = if delim.is_empty() {
        s.chars().map(|c| Value::Str(c.to_string())).collect()
    } else {
        s.split(delim).map(|p| Value::Str(p.to_string())).collect()
    };
    Ok(Value::array(parts))
}

/// join(arr, sep) - concatenates rendered elements with the separator.
fn builtin_join(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("join", "2", args, 2, span)?;
    let items = want_array("join", &args[0], span)?;
    let sep = want_string("join", &args[1], span)?;
    let parts: Vec<String> = items.borrow().iter().map(|v| v.render()).collect();
    Ok(Value::Str(parts.join(sep)))
}

// === Conversions and introspection ===

/// str(x) / toString(x) - the rendered form of any value.
fn builtin_str(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("str", "1", args, 1, span)?;
    Ok(Value::Str(args[0].render()))
}

/// int(x) - truncates numbers, parses strings, maps bools to 0/1.
///
/// A string that does not parse yields null.
fn builtin_int(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("int", "1", args, 1, span)?;
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Float(n) => Ok(Value::Int(n.trunc() as i64)),
        Value::Str(s) => Ok(s
            .trim()
            .parse::<f64>()
            .map(|n| Value::Int(n.trunc() as i64))
            .unwrap_or(Value::Null)),
        Value::Bool(b) => Ok(Value::Int(if *b { 1 } else { 0 })),
        other => Err(type_error(
            format!("int expects a number, string, or bool, got {}", other.type_name()),
            span,
        )),
    }
}

/// float(x) / number(x) - like int without truncation.
fn builtin_float(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("float", "1", args, 1, span)?;
    match &args[0] {
        Value::Int(n) => Ok(Value::Float(*n as f64)),
        Value::Float(n) => Ok(Value::Float(*n)),
        Value::Str(s) => Ok(s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or(Value::Null)),
        Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        other => Err(type_error(
            format!(
                "float expects a number, string, or bool, got {}",
                other.type_name()
            ),
            span,
        )),
    }
}

/// type(x) - the value's kind name.
fn builtin_type(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("type", "1", args, 1, span)?;
    Ok(Value::Str(args[0].type_name().to_string()))
}

// === Arithmetic ===

/// abs, floor, ceil, round, sqrt.
///
/// Integer inputs stay integers where the operation allows it; sqrt
/// always produces a float.
fn builtin_math_unary(name: &str, args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity(name, "1", args, 1, span)?;
    match (name, &args[0]) {
        ("abs", Value::Int(n)) => Ok(Value::Int(n.abs())),
        ("abs", Value::Float(n)) => Ok(Value::Float(n.abs())),
        ("floor" | "ceil" | "round", Value::Int(n)) => Ok(Value::Int(*n)),
        ("floor", Value::Float(n)) => Ok(Value::Float(n.floor())),
        ("ceil", Value::Float(n)) => Ok(Value::Float(n.ceil())),
        ("round", Value::Float(n)) => Ok(Value::Float(n.round())),
        ("sqrt", v) => {
            let n = want_number(name, v, span)?;
            Ok(Value::Float(n.sqrt()))
        }
        (_, other) => Err(type_error(
            format!("{} expects a number, got {}", name, other.type_name()),
            span,
        )),
    }
}

/// min, max, pow.
///
/// Two integers keep an integer result when possible; pow with a
/// negative exponent promotes to float.
fn builtin_math_binary(name: &str, args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity(name, "2", args, 2, span)?;
    if let (Value::Int(a), Value::Int(b)) = (&args[0], &args[1]) {
        return Ok(match name {
            "min" => Value::Int(*a.min(b)),
            "max" => Value::Int(*a.max(b)),
            _ => {
                if *b >= 0 && *b <= u32::MAX as i64 {
                    Value::Int(a.pow(*b as u32))
                } else {
                    Value::Float((*a as f64).powf(*b as f64))
                }
            }
        });
    }

    let a = want_number(name, &args[0], span)?;
    let b = want_number(name, &args[1], span)?;
    Ok(Value::Float(match name {
        "min" => a.min(b),
        "max" => a.max(b),
        _ => a.powf(b),
    }))
}

// === I/O ===

/// readFile(path) - the file's content as a string.
fn builtin_read_file(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("readFile", "1", args, 1, span)?;
    let path = want_string("readFile", &args[0], span)?;
    std::fs::read_to_string(path)
        .map(Value::Str)
        .map_err(|e| io_error(format!("cannot read '{}': {}", path, e), span))
}

/// writeFile(path, content) / appendFile(path, content).
fn builtin_write_file(args: &[Value], span: Span, append: bool) -> Result<Value, RuntimeError> {
    let name = if append { "appendFile" } else { "writeFile" };
    expect_arity(name, "2", args, 2, span)?;
    let path = want_string(name, &args[0], span)?;
    let content = args[1].render();

    let result = if append {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut f| f.write_all(content.as_bytes()))
    } else {
        std::fs::write(path, content.as_bytes())
    };

    result
        .map(|_| Value::Null)
        .map_err(|e| io_error(format!("cannot write '{}': {}", path, e), span))
}

/// input(prompt?) - reads a line from standard input.
///
/// Returns null at end of input.
fn builtin_input(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    if args.len() > 1 {
        return Err(arity_error("input", "0 or 1", args.len(), span));
    }
    if let Some(prompt) = args.first() {
        print!("{}", prompt.render());
        let _ = std::io::stdout().flush();
    }

    let mut line = String::new();
    match std::io::stdin().read_line(&mut line) {
        Ok(0) => Ok(Value::Null),
        Ok(_) => {
            while line.ends_with('\n') || line.ends_with('\r') {
                line.pop();
            }
            Ok(Value::Str(line))
        }
        Err(e) => Err(io_error(format!("cannot read input: {}", e), span)),
    }
}

// === Serialization ===

/// jsonStringify(v) / stringify(v) - the value's serialized form.
fn builtin_json_stringify(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("jsonStringify", "1", args, 1, span)?;
    Ok(Value::Str(args[0].render_nested()))
}

/// jsonParse(s) / parse(s) - parses a JSON value.
///
/// Malformed input yields null.
fn builtin_json_parse(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("jsonParse", "1", args, 1, span)?;
    let text = want_string("jsonParse", &args[0], span)?;
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(json) => Ok(from_json(&json)),
        Err(_) => Ok(Value::Null),
    }
}

/// Converts a parsed JSON tree into a runtime value.
fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => Value::array(items.iter().map(from_json).collect()),
        serde_json::Value::Object(entries) => {
            let mut map = IndexMap::new();
            for (k, v) in entries {
                map.insert(k.clone(), from_json(v));
            }
            Value::object(map)
        }
    }
}

// === Time ===

/// time() - seconds since the Unix epoch.
fn builtin_time(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    expect_arity("time", "0", args, 0, span)?;
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    Ok(Value::Float(secs))
}

/// clock() - seconds elapsed since the interpreter started.
fn builtin_clock(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    static START: OnceLock<Instant> = OnceLock::new();
    expect_arity("clock", "0", args, 0, span)?;
    let start = START.get_or_init(Instant::now);
    Ok(Value::Float(start.elapsed().as_secs_f64()))
}

// === Process ===

/// exit(code?) - terminates the process.
fn builtin_exit(args: &[Value], span: Span) -> Result<Value, RuntimeError> {
    let code = match args.first() {
        Some(v) => want_number("exit", v, span)? as i32,
        None => 0,
    };
    std::process::exit(code)
}

// === Argument helpers ===

fn expect_arity(
    name: &str,
    expected: &str,
    args: &[Value],
    count: usize,
    span: Span,
) -> Result<(), RuntimeError> {
    if args.len() != count {
        return Err(arity_error(name, expected, args.len(), span));
    }
    Ok(())
}

fn arity_error(name: &str, expected: &str, got: usize, span: Span) -> RuntimeError {
    RuntimeError::ArityMismatch {
        name: name.to_string(),
        expected: expected.to_string(),
        got,
        span,
    }
}

fn type_error(message: String, span: Span) -> RuntimeError {
    RuntimeError::TypeError { message, span }
}

fn io_error(message: String, span: Span) -> RuntimeError {
    RuntimeError::Io { message, span }
}

fn want_number(name: &str, value: &Value, span: Span) -> Result<f64, RuntimeError> {
    value.as_number().ok_or_else(|| {
        type_error(
            format!("{} expects a number, got {}", name, value.type_name()),
            span,
        )
    })
}

fn want_string<'a>(name: &str, value: &'a Value, span: Span) -> Result<&'a str, RuntimeError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(type_error(
            format!("{} expects a string, got {}", name, other.type_name()),
            span,
        )),
    }
}

fn want_array<'a>(
    name: &str,
    value: &'a Value,
    span: Span,
) -> Result<&'a crate::eval::value::ArrayRef, RuntimeError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(type_error(
            format!("{} expects an array, got {}", name, other.type_name()),
            span,
        )),
    }
}

fn want_object<'a>(
    name: &str,
    value: &'a Value,
    span: Span,
) -> Result<&'a crate::eval::value::ObjectRef, RuntimeError> {
    match value {
        Value::Object(entries) => Ok(entries),
        other => Err(type_error(
            format!("{} expects an object, got {}", name, other.type_name()),
            span,
        )),
    }
}
