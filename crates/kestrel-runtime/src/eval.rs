//! Tree-walking evaluator.
//!
//! [`eval`] and [`exec`] wrap the per-node work and, on the way out, stamp
//! a passing error with the node's span and a snapshot of the call stack.
//! Both are only filled in once, so the innermost node wins.

use crate::builtins::get_vtable;
use crate::context::Context;
use crate::error::{bail, Frame, RuntimeError};
use crate::function::Function;
use crate::value::Value;
use kestrel_ast::ast::{
    Assignment, BinOp, Block, Expr, ForLoop, IfThenElse, List, Program, Stmt, UnOp, WhileLoop,
};
use kestrel_ast::span::Span;
use std::cmp::Ordering;
use std::rc::Rc;
use tracing::trace;

/// Execute the statements of a program and return its tail value, or
/// `Unit` when there is none.
pub fn run_program(ctx: &mut Context<'_>, program: &Program) -> Result<Value, RuntimeError> {
    for stmt in &program.stmts {
        exec(ctx, stmt)?;
    }
    match &program.tail {
        Some(tail) => eval(ctx, tail),
        None => Ok(Value::Unit),
    }
}

pub fn exec(ctx: &mut Context<'_>, stmt: &Stmt) -> Result<(), RuntimeError> {
    exec_inner(ctx, stmt).map_err(|e| e.located(|| stmt.span(), &ctx.stack_trace))
}

fn exec_inner(ctx: &mut Context<'_>, stmt: &Stmt) -> Result<(), RuntimeError> {
    match stmt {
        Stmt::Empty(_) => Ok(()),
        Stmt::Expr(s) => eval(ctx, &s.expr).map(drop),
        Stmt::Assignment(a) => exec_assignment(ctx, a),
    }
}

fn exec_assignment(ctx: &mut Context<'_>, a: &Assignment) -> Result<(), RuntimeError> {
    let name = a.field.text.as_str();

    if let Some(base) = &a.base {
        let target = match eval(ctx, base)? {
            Value::Object(object) => object,
            other => bail!("cannot set field '{name}' on a value of type {}", other.kind()),
        };
        let value = eval(ctx, &a.value)?;
        target.set(name, value);
        return Ok(());
    }

    if a.let_kw.is_some() {
        if ctx.scope.has_own(name) {
            bail!("variable '{name}' is already defined in this scope");
        }
        let value = eval(ctx, &a.value)?;
        ctx.scope.set_no_prototype(name, value);
    } else {
        if ctx.scope.try_get(name).is_none() {
            bail!("variable '{name}' is not defined");
        }
        let value = eval(ctx, &a.value)?;
        ctx.scope.set(name, value);
    }
    Ok(())
}

pub fn eval(ctx: &mut Context<'_>, expr: &Expr) -> Result<Value, RuntimeError> {
    eval_inner(ctx, expr).map_err(|e| e.located(|| expr.span(), &ctx.stack_trace))
}

fn eval_inner(ctx: &mut Context<'_>, expr: &Expr) -> Result<Value, RuntimeError> {
    match expr {
        Expr::Variable(v) => {
            let name = &v.name.text;
            match ctx.scope.try_get(name) {
                Some(value) => Ok(value),
                None => bail!("variable '{name}' is not defined"),
            }
        }
        Expr::Block(block) => eval_block(ctx, block),
        Expr::BinaryOp(b) => {
            let left = eval(ctx, &b.left)?;
            let right = eval(ctx, &b.right)?;
            binary_op(b.op, left, right)
        }
        Expr::UnaryOp(u) => {
            let operand = eval(ctx, &u.operand)?;
            unary_op(u.op, operand)
        }
        Expr::FunctionCall(call) => {
            let function = match eval(ctx, &call.function)? {
                Value::Function(f) => f,
                other => bail!("cannot call a value of type {}", other.kind()),
            };
            let args = eval_args(ctx, &call.args)?;
            let name = match &call.function {
                Expr::Variable(v) => v.name.text.as_str(),
                _ => "<anonymous>",
            };
            call_function(ctx, name, &function, args, expr.span())
        }
        Expr::FieldAccess(access) => {
            let base = eval(ctx, &access.base)?;
            get_vtable(ctx, &base).get(&access.field.text)
        }
        Expr::MethodCall(call) => {
            let receiver = eval(ctx, &call.base)?;
            let name = call.method.text.as_str();
            let method = lookup_method(ctx, &receiver, name)?;
            let mut args = Vec::with_capacity(call.args.len() + 1);
            args.push(receiver);
            args.extend(eval_args(ctx, &call.args)?);
            call_function(ctx, name, &method, args, expr.span())
        }
        Expr::WhileLoop(w) => eval_while(ctx, w),
        Expr::ForLoop(f) => eval_for(ctx, f),
        Expr::IfThenElse(i) => eval_if(ctx, i),
        Expr::StringLiteral(s) => Ok(Value::string(s.value.as_str())),
        Expr::NumberLiteral(n) => Ok(Value::Number(n.value())),
        Expr::BoolLiteral(b) => Ok(Value::Boolean(b.value)),
        Expr::ArrayLiteral(a) => Ok(Value::array(eval_args(ctx, &a.items)?)),
        Expr::FunctionLiteral(f) => Ok(Value::Function(Rc::new(Function::Lang {
            params: f.params.clone(),
            body: f.body.clone(),
            globals: ctx.globals.clone(),
            module: ctx.module.clone(),
        }))),
        Expr::Paren(p) => eval(ctx, &p.inner),
    }
}

fn eval_args(ctx: &mut Context<'_>, args: &List<Expr>) -> Result<Vec<Value>, RuntimeError> {
    args.items.iter().map(|arg| eval(ctx, arg)).collect()
}

/// Evaluate a block in a child of the current scope.
pub fn eval_block(ctx: &mut Context<'_>, block: &Block) -> Result<Value, RuntimeError> {
    let scope = ctx.child_scope();
    ctx.with_scope(scope, |ctx| {
        for stmt in &block.stmts {
            exec(ctx, stmt)?;
        }
        match &block.tail {
            Some(tail) => eval(ctx, tail),
            None => Ok(Value::Unit),
        }
    })
}

fn condition(ctx: &mut Context<'_>, cond: &Expr, what: &str) -> Result<bool, RuntimeError> {
    match eval(ctx, cond)? {
        Value::Boolean(b) => Ok(b),
        other => Err(RuntimeError::new(format!(
            "{what} condition must be a boolean, got {}",
            other.kind()
        ))
        .located(|| cond.span(), &ctx.stack_trace)),
    }
}

fn eval_if(ctx: &mut Context<'_>, i: &IfThenElse) -> Result<Value, RuntimeError> {
    if condition(ctx, &i.cond, "if")? {
        eval_block(ctx, &i.then)
    } else {
        match &i.otherwise {
            Some(branch) => eval(ctx, &branch.expr),
            None => Ok(Value::Unit),
        }
    }
}

fn eval_while(ctx: &mut Context<'_>, w: &WhileLoop) -> Result<Value, RuntimeError> {
    while condition(ctx, &w.cond, "while")? {
        eval_block(ctx, &w.body)?;
    }
    Ok(Value::Unit)
}

fn eval_for(ctx: &mut Context<'_>, f: &ForLoop) -> Result<Value, RuntimeError> {
    match eval(ctx, &f.iter)? {
        Value::Array(items) => {
            let mut i = 0;
            loop {
                // Re-read each step: the body may push or pop.
                let item = match items.borrow().get(i) {
                    Some(item) => item.clone(),
                    None => break,
                };
                for_iteration(ctx, f, item)?;
                i += 1;
            }
        }
        Value::String(s) => {
            for c in s.chars() {
                for_iteration(ctx, f, Value::string(c.to_string()))?;
            }
        }
        other => {
            return Err(
                RuntimeError::new(format!("cannot iterate over a value of type {}", other.kind()))
                    .located(|| f.iter.span(), &ctx.stack_trace),
            )
        }
    }
    Ok(Value::Unit)
}

fn for_iteration(ctx: &mut Context<'_>, f: &ForLoop, item: Value) -> Result<(), RuntimeError> {
    let scope = ctx.child_scope();
    scope.set_no_prototype(&f.var.text, item);
    ctx.with_scope(scope, |ctx| eval_block(ctx, &f.body).map(drop))
}

// ======= operators =======

fn unary_op(op: UnOp, operand: Value) -> Result<Value, RuntimeError> {
    match (op, operand) {
        (UnOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnOp::Plus, Value::Number(n)) => Ok(Value::Number(n)),
        (UnOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnOp::Not, other) => bail!("operator '!' expects a boolean, got {}", other.kind()),
        (op, other) => bail!(
            "operator '{}' expects a number, got {}",
            op.symbol(),
            other.kind()
        ),
    }
}

fn binary_op(op: BinOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
            let (a, b) = match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => (*a, *b),
                _ => bail!(
                    "operator '{}' expects numbers, got {} and {}",
                    op.symbol(),
                    left.kind(),
                    right.kind()
                ),
            };
            let result = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => a / b,
                _ => {
                    let (a, b) = (a as i64, b as i64);
                    if b == 0 {
                        bail!("modulo by zero");
                    }
                    match a.checked_rem(b) {
                        Some(rem) => rem as f32,
                        None => bail!("modulo overflow: {a} % {b}"),
                    }
                }
            };
            Ok(Value::Number(result))
        }
        BinOp::Concat => match (left, right) {
            (Value::String(mut a), Value::String(b)) => {
                match Rc::get_mut(&mut a) {
                    Some(owned) => owned.push_str(&b),
                    None => a = Rc::new(format!("{a}{b}")),
                }
                Ok(Value::String(a))
            }
            (left, right) => bail!(
                "operator '~' expects strings, got {} and {}",
                left.kind(),
                right.kind()
            ),
        },
        BinOp::And | BinOp::Or => match (&left, &right) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(if op == BinOp::And {
                *a && *b
            } else {
                *a || *b
            })),
            _ => bail!(
                "operator '{}' expects booleans, got {} and {}",
                op.symbol(),
                left.kind(),
                right.kind()
            ),
        },
        BinOp::Eq => Ok(Value::Boolean(values_equal(&left, &right))),
        BinOp::Ne => Ok(Value::Boolean(!values_equal(&left, &right))),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            compare(op, &left, &right).map(Value::Boolean)
        }
    }
}

/// Heap kinds other than strings compare by identity.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Unit, Value::Unit) => true,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
        (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

fn compare(op: BinOp, left: &Value, right: &Value) -> Result<bool, RuntimeError> {
    if let (Value::Number(a), Value::Number(b)) = (left, right) {
        return Ok(match op {
            BinOp::Lt => a < b,
            BinOp::Le => a <= b,
            BinOp::Gt => a > b,
            _ => a >= b,
        });
    }

    let ordering = match (left, right) {
        (Value::Unit, Value::Unit) => Ordering::Equal,
        (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
        (Value::String(a), Value::String(b)) => a.as_bytes().cmp(b.as_bytes()),
        _ => bail!(
            "cannot order {} and {} with '{}'",
            left.kind(),
            right.kind(),
            op.symbol()
        ),
    };
    Ok(match op {
        BinOp::Lt => ordering.is_lt(),
        BinOp::Le => ordering.is_le(),
        BinOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    })
}

// ======= calls =======

fn lookup_method(
    ctx: &Context<'_>,
    receiver: &Value,
    name: &str,
) -> Result<Rc<Function>, RuntimeError> {
    match get_vtable(ctx, receiver).get(name)? {
        Value::Function(f) => Ok(f),
        other => bail!(
            "field '{name}' of {} is a {}, not a function",
            receiver.kind(),
            other.kind()
        ),
    }
}

/// Invoke `function` with a stack frame for `name` pushed for the duration
/// of the call.
pub fn call_function(
    ctx: &mut Context<'_>,
    name: &str,
    function: &Function,
    args: Vec<Value>,
    call_site: Span,
) -> Result<Value, RuntimeError> {
    let limit = ctx.global.max_call_depth();
    if ctx.stack_trace.len() >= limit {
        bail!("maximum call depth exceeded (limit: {limit} calls)");
    }

    trace!(function = name, args = args.len(), depth = ctx.stack_trace.len(), "call");
    ctx.stack_trace.push(Frame {
        name: name.to_string(),
        call_site,
    });
    let result = function
        .call(ctx, args)
        .map_err(|e| e.with_trace(&ctx.stack_trace));
    ctx.stack_trace.pop();
    result
}

/// Call the method `name` on `receiver`, looked up through its vtable.
pub fn call_method(
    ctx: &mut Context<'_>,
    receiver: Value,
    name: &str,
    args: Vec<Value>,
    call_site: Span,
) -> Result<Value, RuntimeError> {
    let method = lookup_method(ctx, &receiver, name)?;
    let mut full_args = Vec::with_capacity(args.len() + 1);
    full_args.push(receiver);
    full_args.extend(args);
    call_function(ctx, name, &method, full_args, call_site)
}

/// Text of `value` as produced by its `to_s` method.
pub fn stringify(ctx: &mut Context<'_>, value: &Value) -> Result<String, RuntimeError> {
    let call_site = ctx
        .stack_trace
        .last()
        .map(|frame| frame.call_site.clone())
        .unwrap_or_else(Span::empty);
    match call_method(ctx, value.clone(), "to_s", Vec::new(), call_site)? {
        Value::String(s) => Ok(s.to_string()),
        other => bail!("to_s must return a string, got {}", other.kind()),
    }
}
