//! The tree-walking evaluator for the Jung language.
//!
//! The [`Interpreter`] owns all runtime state: the scope stack, the
//! function and class registries, the current-instance slot for method
//! bodies, the call-depth counter, and the set of already-imported
//! files. It executes a [`Program`] by walking its statements.
//!
//! # Unwinding
//!
//! Non-local control flow is threaded through the return type rather
//! than jumped: every evaluation returns `Result<_, Flow>`, and
//! `break`, `continue`, `return`, thrown values, and runtime errors are
//! all `Flow` variants. Loops consume `Break`/`Continue`, calls consume
//! `Return`, and `try` consumes `Throw` and `Error`. Because a `try`
//! statement has already returned before its catch body runs, an
//! exception thrown inside the catch propagates to the next enclosing
//! `try`, never back to the one that caught it.

use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;
use log::debug;

use crate::ast::{
    AssignTarget, BinaryOp, ClassDecl, Expr, FunctionDecl, Program, Span, Stmt, UnaryOp,
};
use crate::error::{JungError, RuntimeError};
use crate::eval::builtins;
use crate::eval::value::{ObjectRef, Value};
use crate::parser::Parser;

/// Maximum user-function call depth.
const MAX_CALL_DEPTH: usize = 200;

/// Maximum number of distinct imported files per run.
const MAX_IMPORTS: usize = 64;

/// The object key carrying an instance's class name.
const CLASS_KEY: &str = "__class__";

/// Non-local control flow, threaded through every evaluation result.
#[derive(Debug, Clone)]
pub enum Flow {
    /// `break` looking for its enclosing loop
    Break(Span),
    /// `continue` looking for its enclosing loop
    Continue(Span),
    /// `return` looking for its enclosing call, carrying the value
    Return(Value),
    /// A thrown value looking for an enclosing `try`
    Throw(Value),
    /// A runtime error; catchable as an exception inside `try`
    Error(RuntimeError),
}

impl From<RuntimeError> for Flow {
    fn from(error: RuntimeError) -> Self {
        Flow::Error(error)
    }
}

type Exec<T> = Result<T, Flow>;

/// A runtime class: its name and method table.
#[derive(Debug)]
struct Class {
    methods: IndexMap<String, Rc<FunctionDecl>>,
}

/// A resolved callable, for the higher-order builtins.
enum Callable {
    Function(Rc<FunctionDecl>),
    Builtin(&'static str),
}

/// The interpreter context.
///
/// One instance persists across a whole run; the REPL reuses a single
/// instance across lines so that bindings survive.
pub struct Interpreter {
    /// Scope stack; the base frame holds the globals and is never popped
    scopes: Vec<IndexMap<String, Value>>,

    /// User function registry
    functions: IndexMap<String, Rc<FunctionDecl>>,

    /// Class registry
    classes: IndexMap<String, Class>,

    /// The receiver of the currently executing method body, if any
    current_instance: Option<ObjectRef>,

    /// User-function call depth, bounded by [`MAX_CALL_DEPTH`]
    call_depth: usize,

    /// Paths already imported in this run
    imports: HashSet<String>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates a fresh interpreter with an empty global scope.
    pub fn new() -> Self {
        Interpreter {
            scopes: vec![IndexMap::new()],
            functions: IndexMap::new(),
            classes: IndexMap::new(),
            current_instance: None,
            call_depth: 0,
            imports: HashSet::new(),
        }
    }

    /// Parses and executes a complete source text.
    pub fn run_source(&mut self, source: &str) -> Result<(), JungError> {
        let program = Parser::new(source)?.parse()?;
        self.run(&program)
    }

    /// Executes a parsed program.
    pub fn run(&mut self, program: &Program) -> Result<(), JungError> {
        match self.exec_all(&program.statements) {
            Ok(()) => Ok(()),
            Err(flow) => Err(Self::flow_to_error(flow)),
        }
    }

    /// Parses and executes one REPL line.
    ///
    /// When the line is a single expression statement, its value is
    /// returned so the REPL can print it; any other statement shape
    /// yields `None`.
    pub fn run_repl_line(&mut self, line: &str) -> Result<Option<Value>, JungError> {
        let program = Parser::new(line)?.parse()?;

        if let [Stmt::Expr { expr, .. }] = program.statements.as_slice() {
            return match self.eval_expr(expr) {
                Ok(value) => Ok(Some(value)),
                Err(flow) => Err(Self::flow_to_error(flow)),
            };
        }

        self.run(&program).map(|()| None)
    }

    /// Reads a global binding, mainly for tests and embedding.
    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.scopes[0].get(name).cloned()
    }

    /// Maps an escaped control-flow value to a top-level error.
    fn flow_to_error(flow: Flow) -> JungError {
        match flow {
            Flow::Error(e) => JungError::Runtime(e),
            Flow::Throw(v) => JungError::Uncaught(v.render()),
            Flow::Break(span) => JungError::Runtime(RuntimeError::StrayControlFlow {
                keyword: "break",
                context: "a loop",
                span,
            }),
            Flow::Continue(span) => JungError::Runtime(RuntimeError::StrayControlFlow {
                keyword: "continue",
                context: "a loop",
                span,
            }),
            Flow::Return(_) => JungError::Runtime(RuntimeError::StrayControlFlow {
                keyword: "return",
                context: "a function",
                span: Span::default(),
            }),
        }
    }

    // === Scopes ===

    fn push_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    fn pop_scope(&mut self) {
        // The base frame holds the globals and stays
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    fn current_frame_mut(&mut self) -> &mut IndexMap<String, Value> {
        self.scopes.last_mut().expect("scope stack is never empty")
    }

    /// Searches the scope stack from the innermost frame outward.
    fn lookup_var(&self, name: &str) -> Option<Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).cloned())
    }

    /// Writes through to the nearest enclosing frame that already
    /// defines `name`. Returns false when no frame does.
    fn assign_existing(&mut self, name: &str, value: Value) -> bool {
        for frame in self.scopes.iter_mut().rev() {
            if let Some(slot) = frame.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        false
    }

    // === Statements ===

    fn exec_all(&mut self, statements: &[Stmt]) -> Exec<()> {
        for stmt in statements {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    /// Executes a statement list in a fresh scope, popping it on every
    /// exit path so unwinding leaves the stack balanced.
    fn exec_block(&mut self, statements: &[Stmt]) -> Exec<()> {
        self.push_scope();
        let result = self.exec_all(statements);
        self.pop_scope();
        result
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Exec<()> {
        match stmt {
            Stmt::Let { name, value, .. } => {
                let value = self.eval_expr(value)?;
                self.current_frame_mut().insert(name.clone(), value);
                Ok(())
            }
            Stmt::Assign {
                target,
                op,
                value,
                span,
            } => self.exec_assign(target, *op, value, *span),
            Stmt::Print { value, .. } => {
                let value = self.eval_expr(value)?;
                println!("{}", value);
                Ok(())
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.eval_expr(condition)?.is_truthy() {
                    self.exec_block(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_block(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While {
                condition, body, ..
            } => {
                while self.eval_expr(condition)?.is_truthy() {
                    match self.exec_block(body) {
                        Ok(()) | Err(Flow::Continue(_)) => {}
                        Err(Flow::Break(_)) => break,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            Stmt::ForIn {
                variable,
                iterable,
                body,
                span,
            } => self.exec_for_in(variable, iterable, body, *span),
            Stmt::Function(decl) => {
                self.functions.insert(decl.name.clone(), decl.clone());
                Ok(())
            }
            Stmt::Class(decl) => {
                self.exec_class(decl);
                Ok(())
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                Err(Flow::Return(value))
            }
            Stmt::Break { span } => Err(Flow::Break(*span)),
            Stmt::Continue { span } => Err(Flow::Continue(*span)),
            Stmt::Try {
                body,
                catch_var,
                catch_body,
                ..
            } => self.exec_try(body, catch_var.as_deref(), catch_body),
            Stmt::Throw { value, .. } => {
                let value = self.eval_expr(value)?;
                Err(Flow::Throw(value))
            }
            Stmt::Import { path, span } => self.exec_import(path, *span),
            Stmt::Expr { expr, .. } => {
                self.eval_expr(expr)?;
                Ok(())
            }
        }
    }

    fn exec_assign(
        &mut self,
        target: &AssignTarget,
        op: Option<BinaryOp>,
        value: &Expr,
        span: Span,
    ) -> Exec<()> {
        let new_value = self.eval_expr(value)?;

        match target {
            AssignTarget::Variable { name } => {
                let value = match op {
                    None => new_value,
                    Some(op) => {
                        // Compound assignment requires an existing binding
                        let current = self.lookup_var(name).ok_or_else(|| {
                            RuntimeError::UndefinedVariable {
                                name: name.clone(),
                                span,
                            }
                        })?;
                        apply_binary(op, &current, &new_value, span)?
                    }
                };
                if !self.assign_existing(name, value.clone()) {
                    // No enclosing binding: create in the current scope
                    self.current_frame_mut().insert(name.clone(), value);
                }
                Ok(())
            }
            AssignTarget::Member { object, field } => {
                let container = self.eval_expr(object)?;
                let Value::Object(entries) = container else {
                    return Err(Flow::Error(RuntimeError::TypeError {
                        message: format!(
                            "cannot set field '{}' on {}",
                            field,
                            container.type_name()
                        ),
                        span,
                    }));
                };
                let value = match op {
                    None => new_value,
                    Some(op) => {
                        let current = entries.borrow().get(field).cloned().unwrap_or(Value::Null);
                        apply_binary(op, &current, &new_value, span)?
                    }
                };
                entries.borrow_mut().insert(field.clone(), value);
                Ok(())
            }
            AssignTarget::Index { target, index } => {
                let container = self.eval_expr(target)?;
                let index = self.eval_expr(index)?;
                self.write_index(&container, &index, op, new_value, span)
            }
        }
    }

    fn write_index(
        &mut self,
        container: &Value,
        index: &Value,
        op: Option<BinaryOp>,
        new_value: Value,
        span: Span,
    ) -> Exec<()> {
        match (container, index) {
            (Value::Object(entries), Value::Str(key)) => {
                let value = match op {
                    None => new_value,
                    Some(op) => {
                        let current = entries.borrow().get(key).cloned().unwrap_or(Value::Null);
                        apply_binary(op, &current, &new_value, span)?
                    }
                };
                entries.borrow_mut().insert(key.clone(), value);
                Ok(())
            }
            (Value::Object(_), other) => Err(Flow::Error(RuntimeError::TypeError {
                message: format!("object index must be a string, got {}", other.type_name()),
                span,
            })),
            (Value::Array(items), index) => {
                let Some(n) = index.as_number() else {
                    return Err(Flow::Error(RuntimeError::TypeError {
                        message: format!("array index must be a number, got {}", index.type_name()),
                        span,
                    }));
                };
                let len = items.borrow().len();
                let Some(idx) = resolve_index(n, len) else {
                    // Out-of-range array writes are silently ignored
                    return Ok(());
                };
                let value = match op {
                    None => new_value,
                    Some(op) => {
                        let current = items.borrow()[idx].clone();
                        apply_binary(op, &current, &new_value, span)?
                    }
                };
                items.borrow_mut()[idx] = value;
                Ok(())
            }
            (other, _) => Err(Flow::Error(RuntimeError::TypeError {
                message: format!("cannot index {}", other.type_name()),
                span,
            })),
        }
    }

    fn exec_for_in(
        &mut self,
        variable: &str,
        iterable: &Expr,
        body: &[Stmt],
        span: Span,
    ) -> Exec<()> {
        let iterable = self.eval_expr(iterable)?;

        // Snapshot the iterated values so body mutations cannot
        // invalidate the iteration
        let items: Vec<Value> = match &iterable {
            Value::Array(items) => items.borrow().clone(),
            Value::Str(s) => s.chars().map(|c| Value::Str(c.to_string())).collect(),
            Value::Object(entries) => entries
                .borrow()
                .keys()
                .map(|k| Value::Str(k.clone()))
                .collect(),
            other => {
                return Err(Flow::Error(RuntimeError::TypeError {
                    message: format!("cannot iterate over {}", other.type_name()),
                    span,
                }));
            }
        };

        for item in items {
            self.push_scope();
            self.current_frame_mut().insert(variable.to_string(), item);
            let result = self.exec_all(body);
            self.pop_scope();

            match result {
                Ok(()) | Err(Flow::Continue(_)) => {}
                Err(Flow::Break(_)) => break,
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    fn exec_class(&mut self, decl: &Rc<ClassDecl>) {
        let mut methods = IndexMap::new();
        for method in &decl.methods {
            methods.insert(method.name.clone(), method.clone());
        }
        self.classes.insert(decl.name.clone(), Class { methods });
    }

    fn exec_try(&mut self, body: &[Stmt], catch_var: Option<&str>, catch_body: &[Stmt]) -> Exec<()> {
        let depth = self.scopes.len();
        let result = self.exec_block(body);

        let message = match result {
            Err(Flow::Throw(value)) => value.render(),
            Err(Flow::Error(error)) => error.to_exception_message(),
            other => return other,
        };
        self.scopes.truncate(depth);

        // The guarding try is gone by now: anything thrown below
        // propagates to the next enclosing try
        self.push_scope();
        if let Some(name) = catch_var {
            self.current_frame_mut()
                .insert(name.to_string(), Value::Str(message));
        }
        let result = self.exec_all(catch_body);
        self.pop_scope();
        result
    }

    fn exec_import(&mut self, path: &str, span: Span) -> Exec<()> {
        if self.imports.contains(path) {
            debug!("skipping already imported '{}'", path);
            return Ok(());
        }
        if self.imports.len() >= MAX_IMPORTS {
            return Err(Flow::Error(RuntimeError::TooManyImports {
                limit: MAX_IMPORTS,
                span,
            }));
        }
        self.imports.insert(path.to_string());

        debug!("importing '{}'", path);
        let source =
            std::fs::read_to_string(path).map_err(|e| RuntimeError::ImportFailed {
                path: path.to_string(),
                message: e.to_string(),
                span,
            })?;

        let program = Parser::new(&source)
            .and_then(|mut p| p.parse())
            .map_err(|e| RuntimeError::ImportFailed {
                path: path.to_string(),
                message: e.to_string(),
                span,
            })?;

        self.exec_all(&program.statements)
    }

    // === Expressions ===

    fn eval_expr(&mut self, expr: &Expr) -> Exec<Value> {
        match expr {
            Expr::Int { value, .. } => Ok(Value::Int(*value)),
            Expr::Float { value, .. } => Ok(Value::Float(*value)),
            Expr::Str { value, .. } => Ok(Value::Str(value.clone())),
            Expr::Bool { value, .. } => Ok(Value::Bool(*value)),
            Expr::Null { .. } => Ok(Value::Null),
            Expr::This { .. } => Ok(self
                .current_instance
                .clone()
                .map(Value::Object)
                .unwrap_or(Value::Null)),
            Expr::Identifier { name, span } => self.eval_identifier(name, *span),
            Expr::Array { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expr(element)?);
                }
                Ok(Value::array(values))
            }
            Expr::Object { entries, .. } => {
                let mut map = IndexMap::with_capacity(entries.len());
                for (key, value) in entries {
                    let value = self.eval_expr(value)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::object(map))
            }
            Expr::Interp { parts, .. } => {
                let mut out = String::new();
                for part in parts {
                    let value = self.eval_expr(part)?;
                    out.push_str(&value.render());
                }
                Ok(Value::Str(out))
            }
            Expr::Binary {
                left,
                op,
                right,
                span,
            } => self.eval_binary(left, *op, right, *span),
            Expr::Unary { op, operand, span } => {
                let value = self.eval_expr(operand)?;
                match op {
                    UnaryOp::Neg => match value {
                        Value::Int(n) => Ok(Value::Int(-n)),
                        Value::Float(n) => Ok(Value::Float(-n)),
                        other => Err(Flow::Error(RuntimeError::TypeError {
                            message: format!("cannot negate {}", other.type_name()),
                            span: *span,
                        })),
                    },
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                }
            }
            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.eval_expr(condition)?.is_truthy() {
                    self.eval_expr(then_branch)
                } else {
                    self.eval_expr(else_branch)
                }
            }
            Expr::Index {
                target,
                index,
                span,
            } => {
                let container = self.eval_expr(target)?;
                let index = self.eval_expr(index)?;
                self.read_index(&container, &index, *span)
            }
            Expr::Member {
                object,
                field,
                span,
            } => {
                let value = self.eval_expr(object)?;
                self.read_member(&value, field, *span)
            }
            Expr::MethodCall {
                receiver,
                method,
                args,
                span,
            } => self.eval_method_call(receiver, method, args, *span),
            Expr::Call { callee, args, span } => self.eval_call(callee, args, *span),
            Expr::New { class, args, span } => self.eval_new(class, args, *span),
        }
    }

    /// Resolves a variable reference: scope stack from the innermost
    /// frame outward (the base frame holds the globals), then the
    /// function registry, then the builtin registry (so builtins can be
    /// passed around as values).
    fn eval_identifier(&mut self, name: &str, span: Span) -> Exec<Value> {
        if let Some(value) = self.lookup_var(name) {
            return Ok(value);
        }
        if let Some(decl) = self.functions.get(name) {
            return Ok(Value::Function(decl.clone()));
        }
        if let Some(builtin) = builtins::lookup(name) {
            return Ok(Value::Builtin(builtin));
        }
        Err(Flow::Error(RuntimeError::UndefinedVariable {
            name: name.to_string(),
            span,
        }))
    }

    fn eval_binary(&mut self, left: &Expr, op: BinaryOp, right: &Expr, span: Span) -> Exec<Value> {
        // Short-circuit operators return the decisive operand itself
        match op {
            BinaryOp::And => {
                let left = self.eval_expr(left)?;
                if !left.is_truthy() {
                    return Ok(left);
                }
                return self.eval_expr(right);
            }
            BinaryOp::Or => {
                let left = self.eval_expr(left)?;
                if left.is_truthy() {
                    return Ok(left);
                }
                return self.eval_expr(right);
            }
            _ => {}
        }

        let left = self.eval_expr(left)?;
        let right = self.eval_expr(right)?;
        Ok(apply_binary(op, &left, &right, span)?)
    }

    fn read_index(&mut self, container: &Value, index: &Value, span: Span) -> Exec<Value> {
        match container {
            Value::Array(items) => {
                let Some(n) = index.as_number() else {
                    return Err(Flow::Error(RuntimeError::TypeError {
                        message: format!("index must be a number, got {}", index.type_name()),
                        span,
                    }));
                };
                let items = items.borrow();
                Ok(resolve_index(n, items.len())
                    .map(|i| items[i].clone())
                    .unwrap_or(Value::Null))
            }
            Value::Str(s) => {
                let Some(n) = index.as_number() else {
                    return Err(Flow::Error(RuntimeError::TypeError {
                        message: format!("index must be a number, got {}", index.type_name()),
                        span,
                    }));
                };
                let chars: Vec<char> = s.chars().collect();
                Ok(resolve_index(n, chars.len())
                    .map(|i| Value::Str(chars[i].to_string()))
                    .unwrap_or(Value::Null))
            }
            Value::Object(entries) => match index {
                Value::Str(key) => Ok(entries.borrow().get(key).cloned().unwrap_or(Value::Null)),
                other => Err(Flow::Error(RuntimeError::TypeError {
                    message: format!("object index must be a string, got {}", other.type_name()),
                    span,
                })),
            },
            other => Err(Flow::Error(RuntimeError::TypeError {
                message: format!("cannot index {}", other.type_name()),
                span,
            })),
        }
    }

    fn read_member(&mut self, value: &Value, field: &str, span: Span) -> Exec<Value> {
        match value {
            Value::Object(entries) => {
                if let Some(found) = entries.borrow().get(field) {
                    return Ok(found.clone());
                }
                if field == "length" {
                    return Ok(Value::Int(entries.borrow().len() as i64));
                }
                // Missing keys read as null
                Ok(Value::Null)
            }
            Value::Str(s) if field == "length" => Ok(Value::Int(s.chars().count() as i64)),
            Value::Array(items) if field == "length" => {
                Ok(Value::Int(items.borrow().len() as i64))
            }
            other => Err(Flow::Error(RuntimeError::TypeError {
                message: format!("cannot access field '{}' on {}", field, other.type_name()),
                span,
            })),
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> Exec<Vec<Value>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }
        Ok(values)
    }

    /// Resolves and performs a call by name.
    ///
    /// Priority: the higher-order specials, then the builtin registry,
    /// then the user function registry, then a scope variable holding a
    /// function value.
    fn eval_call(&mut self, callee: &str, args: &[Expr], span: Span) -> Exec<Value> {
        if matches!(callee, "map" | "filter" | "reduce") {
            return self.eval_higher_order(callee, args, span);
        }

        let args = self.eval_args(args)?;

        if let Some(name) = builtins::lookup(callee) {
            return Ok(builtins::call_builtin(name, &args, span)?);
        }

        if let Some(decl) = self.functions.get(callee).cloned() {
            return self.call_function(&decl, args, None, span);
        }

        match self.lookup_var(callee) {
            Some(Value::Function(decl)) => self.call_function(&decl, args, None, span),
            Some(Value::Builtin(name)) => Ok(builtins::call_builtin(name, &args, span)?),
            Some(other) => Err(Flow::Error(RuntimeError::TypeError {
                message: format!("'{}' is not a function (it is {})", callee, other.type_name()),
                span,
            })),
            None => Err(Flow::Error(RuntimeError::UndefinedFunction {
                name: callee.to_string(),
                span,
            })),
        }
    }

    /// Calls a user function.
    ///
    /// Pushes a fresh scope on the live stack (the body sees whatever
    /// scope chain is live at call time), binds parameters left to
    /// right, and evaluates parameter defaults in the new scope when the
    /// caller supplied no argument. Missing arguments without a default
    /// bind null; extra arguments are dropped.
    fn call_function(
        &mut self,
        decl: &Rc<FunctionDecl>,
        args: Vec<Value>,
        instance: Option<ObjectRef>,
        span: Span,
    ) -> Exec<Value> {
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(Flow::Error(RuntimeError::StackOverflow {
                depth: MAX_CALL_DEPTH,
                span,
            }));
        }
        self.call_depth += 1;

        let saved_instance = match instance {
            Some(receiver) => self.current_instance.replace(receiver),
            None => self.current_instance.clone(),
        };

        self.push_scope();
        let mut bind_error = None;
        for (i, param) in decl.params.iter().enumerate() {
            let value = match args.get(i) {
                Some(value) => value.clone(),
                None => match &param.default {
                    Some(default) => match self.eval_expr(default) {
                        Ok(value) => value,
                        Err(flow) => {
                            bind_error = Some(flow);
                            break;
                        }
                    },
                    None => Value::Null,
                },
            };
            self.current_frame_mut().insert(param.name.clone(), value);
        }

        let result = match bind_error {
            Some(flow) => Err(flow),
            None => self.exec_all(&decl.body),
        };

        self.pop_scope();
        self.call_depth -= 1;
        self.current_instance = saved_instance;

        match result {
            Ok(()) => Ok(Value::Null),
            Err(Flow::Return(value)) => Ok(value),
            Err(other) => Err(other),
        }
    }

    /// Constructs a class instance.
    ///
    /// The fresh object carries its class name under a hidden key; if
    /// the class declares `init` (or `constructor`), it runs with the
    /// new object as the current instance.
    fn eval_new(&mut self, class_name: &str, args: &[Expr], span: Span) -> Exec<Value> {
        if !self.classes.contains_key(class_name) {
            return Err(Flow::Error(RuntimeError::UndefinedClass {
                name: class_name.to_string(),
                span,
            }));
        }

        let args = self.eval_args(args)?;

        let mut entries = IndexMap::new();
        entries.insert(CLASS_KEY.to_string(), Value::Str(class_name.to_string()));
        let instance = match Value::object(entries) {
            Value::Object(handle) => handle,
            _ => unreachable!(),
        };

        let init = self.classes[class_name]
            .methods
            .get("init")
            .or_else(|| self.classes[class_name].methods.get("constructor"))
            .cloned();

        if let Some(init) = init {
            self.call_function(&init, args, Some(instance.clone()), span)?;
        }

        Ok(Value::Object(instance))
    }

    /// Dispatches `receiver.method(args)`.
    ///
    /// A class instance first searches its class's method table; only
    /// then does dispatch fall back to the builtin methods for the
    /// receiver's value kind, so class methods shadow builtins.
    fn eval_method_call(
        &mut self,
        receiver: &Expr,
        method: &str,
        args: &[Expr],
        span: Span,
    ) -> Exec<Value> {
        let receiver = self.eval_expr(receiver)?;
        let args = self.eval_args(args)?;

        if let Value::Object(entries) = &receiver {
            let class_name = match entries.borrow().get(CLASS_KEY) {
                Some(Value::Str(name)) => Some(name.clone()),
                _ => None,
            };
            if let Some(class_name) = class_name {
                if let Some(class) = self.classes.get(&class_name) {
                    if let Some(decl) = class.methods.get(method).cloned() {
                        return self.call_function(&decl, args, Some(entries.clone()), span);
                    }
                }
            }
        }

        Ok(builtins::call_method(&receiver, method, &args, span)?)
    }

    // === Higher-order builtins ===

    /// `map`, `filter`, and `reduce`.
    ///
    /// Each accepts the array and the function in either order,
    /// dispatching on argument kinds; the function may be a function
    /// value or the name of a registered function.
    fn eval_higher_order(&mut self, name: &str, args: &[Expr], span: Span) -> Exec<Value> {
        let args = self.eval_args(args)?;

        let expected = if name == "reduce" { "2 or 3" } else { "2" };
        let positional_ok = match name {
            "reduce" => args.len() == 2 || args.len() == 3,
            _ => args.len() == 2,
        };
        if !positional_ok {
            return Err(Flow::Error(RuntimeError::ArityMismatch {
                name: name.to_string(),
                expected: expected.to_string(),
                got: args.len(),
                span,
            }));
        }

        // Either (arr, f) or (f, arr)
        let (items, callable) = match (&args[0], &args[1]) {
            (Value::Array(items), other) => (items.borrow().clone(), other),
            (other, Value::Array(items)) => (items.borrow().clone(), other),
            _ => {
                return Err(Flow::Error(RuntimeError::TypeError {
                    message: format!("{} expects an array and a function", name),
                    span,
                }));
            }
        };
        let callable = self.resolve_callable(callable, span)?;

        match name {
            "map" => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.call_callable(&callable, vec![item], span)?);
                }
                Ok(Value::array(out))
            }
            "filter" => {
                let mut out = Vec::new();
                for item in items {
                    if self
                        .call_callable(&callable, vec![item.clone()], span)?
                        .is_truthy()
                    {
                        out.push(item);
                    }
                }
                Ok(Value::array(out))
            }
            _ => {
                let mut acc = args.get(2).cloned().unwrap_or(Value::Null);
                for item in items {
                    acc = self.call_callable(&callable, vec![acc, item], span)?;
                }
                Ok(acc)
            }
        }
    }

    fn resolve_callable(&self, value: &Value, span: Span) -> Result<Callable, RuntimeError> {
        match value {
            Value::Function(decl) => Ok(Callable::Function(decl.clone())),
            Value::Builtin(name) => Ok(Callable::Builtin(*name)),
            Value::Str(name) => {
                if let Some(decl) = self.functions.get(name.as_str()) {
                    Ok(Callable::Function(decl.clone()))
                } else if let Some(builtin) = builtins::lookup(name) {
                    Ok(Callable::Builtin(builtin))
                } else {
                    Err(RuntimeError::UndefinedFunction {
                        name: name.clone(),
                        span,
                    })
                }
            }
            other => Err(RuntimeError::TypeError {
                message: format!("expected a function, got {}", other.type_name()),
                span,
            }),
        }
    }

    fn call_callable(&mut self, callable: &Callable, args: Vec<Value>, span: Span) -> Exec<Value> {
        match callable {
            Callable::Function(decl) => self.call_function(&decl.clone(), args, None, span),
            Callable::Builtin(name) => Ok(builtins::call_builtin(name, &args, span)?),
        }
    }
}

/// Resolves a possibly negative index against a container length.
///
/// Negative indices count from the end; anything out of range is `None`.
fn resolve_index(n: f64, len: usize) -> Option<usize> {
    let i = n.trunc();
    let idx = if i < 0.0 { i + len as f64 } else { i };
    if idx >= 0.0 && idx < len as f64 {
        Some(idx as usize)
    } else {
        None
    }
}

/// Applies a non-short-circuit binary operator to two values.
///
/// Arithmetic stays in integers when both operands are integers and
/// promotes to floats when either side is one. In particular `/` on two
/// integers is truncated integer division, while a float on either side
/// divides exactly.
fn apply_binary(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    span: Span,
) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Add => match (left, right) {
            // Either operand being a string makes + a concatenation
            (Value::Str(_), _) | (_, Value::Str(_)) => {
                Ok(Value::Str(format!("{}{}", left.render(), right.render())))
            }
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
            _ => numeric_op(op, left, right, span, |a, b| a + b),
        },
        BinaryOp::Sub => match (left, right) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a - b)),
            _ => numeric_op(op, left, right, span, |a, b| a - b),
        },
        BinaryOp::Mul => match (left, right) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a * b)),
            _ => numeric_op(op, left, right, span, |a, b| a * b),
        },
        BinaryOp::Div => match (left, right) {
            (Value::Int(a), Value::Int(b)) => {
                if *b == 0 {
                    return Err(RuntimeError::DivisionByZero { span });
                }
                Ok(Value::Int(a / b))
            }
            _ => {
                if right.as_number() == Some(0.0) {
                    return Err(RuntimeError::DivisionByZero { span });
                }
                numeric_op(op, left, right, span, |a, b| a / b)
            }
        },
        BinaryOp::Mod => match (left, right) {
            (Value::Int(a), Value::Int(b)) => {
                if *b == 0 {
                    return Err(RuntimeError::DivisionByZero { span });
                }
                Ok(Value::Int(a % b))
            }
            _ => {
                if right.as_number() == Some(0.0) {
                    return Err(RuntimeError::DivisionByZero { span });
                }
                numeric_op(op, left, right, span, |a, b| a % b)
            }
        },
        BinaryOp::Eq => Ok(Value::Bool(left.equals(right))),
        BinaryOp::Ne => Ok(Value::Bool(!left.equals(right))),
        BinaryOp::Lt => comparison_op(op, left, right, span, |a, b| a < b),
        BinaryOp::Le => comparison_op(op, left, right, span, |a, b| a <= b),
        BinaryOp::Gt => comparison_op(op, left, right, span, |a, b| a > b),
        BinaryOp::Ge => comparison_op(op, left, right, span, |a, b| a >= b),
        BinaryOp::And | BinaryOp::Or => {
            unreachable!("short-circuit operators are handled before operand evaluation")
        }
    }
}

/// Float fallback for mixed or float operands.
fn numeric_op(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    span: Span,
    f: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok(Value::Float(f(a, b))),
        _ => Err(binary_type_error(op, left, right, span)),
    }
}

fn comparison_op(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    span: Span,
    f: fn(f64, f64) -> bool,
) -> Result<Value, RuntimeError> {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok(Value::Bool(f(a, b))),
        _ => Err(binary_type_error(op, left, right, span)),
    }
}

fn binary_type_error(op: BinaryOp, left: &Value, right: &Value, span: Span) -> RuntimeError {
    RuntimeError::TypeError {
        message: format!(
            "cannot apply '{}' to {} and {}",
            op,
            left.type_name(),
            right.type_name()
        ),
        span,
    }
}
