//! Built-in prototypes, one per value kind.
//!
//! Method calls on non-object values (`"abc".len()`, `3.5.floor()`) are
//! looked up here. Every method receives its receiver as argument 0.

use crate::context::Context;
use crate::error::{bail, RuntimeError};
use crate::eval::stringify;
use crate::function::Function;
use crate::object::ObjectRef;
use crate::value::{ArrayRef, FromArgs, Value};
use std::rc::Rc;

pub struct Core {
    pub object: ObjectRef,
    pub unit: ObjectRef,
    pub number: ObjectRef,
    pub boolean: ObjectRef,
    pub string: ObjectRef,
    pub function: ObjectRef,
    pub array: ObjectRef,
}

impl Default for Core {
    fn default() -> Self {
        Self::new()
    }
}

impl Core {
    pub fn new() -> Self {
        Self {
            object: object_prototype(),
            unit: unit_prototype(),
            number: number_prototype(),
            boolean: boolean_prototype(),
            string: string_prototype(),
            function: function_prototype(),
            array: array_prototype(),
        }
    }
}

/// The object that supplies methods for `value`. Objects are their own
/// vtable, so user-defined methods and prototypes take part in dispatch.
pub fn get_vtable(ctx: &Context<'_>, value: &Value) -> ObjectRef {
    let core = &ctx.global.core;
    match value {
        Value::Unit => core.unit.clone(),
        Value::Number(_) => core.number.clone(),
        Value::Boolean(_) => core.boolean.clone(),
        Value::String(_) => core.string.clone(),
        Value::Function(_) => core.function.clone(),
        Value::Object(object) => object.clone(),
        Value::Array(_) => core.array.clone(),
    }
}

fn method<A, F>(proto: &ObjectRef, name: &str, f: F)
where
    A: FromArgs,
    F: Fn(&mut Context<'_>, A) -> Result<Value, RuntimeError> + 'static,
{
    let function = Function::native_expanded(name, f);
    proto.set_no_prototype(name, Value::Function(Rc::new(function)));
}

/// Indices must be non-negative integers.
fn index(n: f32) -> Result<usize, RuntimeError> {
    if !n.is_finite() || n < 0.0 || n.fract() != 0.0 {
        bail!("invalid index {n}: expected a non-negative integer");
    }
    Ok(n as usize)
}

fn format_number(n: f32) -> String {
    format!("{n}")
}

// ======= prototypes =======

fn object_prototype() -> ObjectRef {
    let proto = ObjectRef::new(None);
    method(&proto, "to_s", |_, (_,): (Value,)| Ok(Value::string("<object>")));
    proto
}

fn unit_prototype() -> ObjectRef {
    let proto = ObjectRef::new(None);
    method(&proto, "to_s", |_, (): ()| Ok(Value::string("()")));
    proto
}

fn boolean_prototype() -> ObjectRef {
    let proto = ObjectRef::new(None);
    method(&proto, "to_s", |_, (b,): (bool,)| Ok(Value::string(b.to_string())));
    proto
}

fn function_prototype() -> ObjectRef {
    let proto = ObjectRef::new(None);
    method(&proto, "to_s", |_, (_,): (Value,)| Ok(Value::string("<function>")));
    proto
}

fn number_prototype() -> ObjectRef {
    let proto = ObjectRef::new(None);
    method(&proto, "to_s", |_, (n,): (f32,)| Ok(Value::string(format_number(n))));
    method(&proto, "ceil", |_, (n,): (f32,)| Ok(Value::Number(n.ceil())));
    method(&proto, "floor", |_, (n,): (f32,)| Ok(Value::Number(n.floor())));
    method(&proto, "round", |_, (n,): (f32,)| Ok(Value::Number(n.round())));
    method(&proto, "pow", |_, (n, exp): (f32, f32)| {
        Ok(Value::Number(n.powf(exp)))
    });
    method(&proto, "chr", |_, (n,): (f32,)| {
        let code = index(n)?;
        match u32::try_from(code).ok().and_then(char::from_u32) {
            Some(c) => Ok(Value::string(c.to_string())),
            None => bail!("invalid character code {n}"),
        }
    });
    proto
}

fn string_prototype() -> ObjectRef {
    let proto = ObjectRef::new(None);
    method(&proto, "to_s", |_, (s,): (Rc<String>,)| Ok(Value::String(s)));
    method(&proto, "to_n", |_, (s,): (Rc<String>,)| match s.trim().parse::<f32>() {
        Ok(n) => Ok(Value::Number(n)),
        Err(_) => bail!("cannot convert \"{s}\" to a number"),
    });
    method(&proto, "ord", |_, (s,): (Rc<String>,)| match s.chars().next() {
        Some(c) => Ok(Value::Number(c as u32 as f32)),
        None => bail!("ord of an empty string"),
    });
    method(&proto, "len", |_, (s,): (Rc<String>,)| {
        Ok(Value::Number(s.len() as f32))
    });
    method(&proto, "at", |_, (s, i): (Rc<String>, f32)| {
        let i = index(i)?;
        if i >= s.len() {
            bail!("index {i} out of range for string of length {}", s.len());
        }
        match s.get(i..).and_then(|rest| rest.chars().next()) {
            Some(c) => Ok(Value::string(c.to_string())),
            None => bail!("index {i} does not fall on a character boundary"),
        }
    });
    method(&proto, "slice", |_, (s, start, end): (Rc<String>, f32, f32)| {
        let (start, end) = (index(start)?, index(end)?);
        if start > end {
            bail!("slice start {start} is greater than end {end}");
        }
        if end > s.len() {
            bail!("slice end {end} out of range for string of length {}", s.len());
        }
        match s.get(start..end) {
            Some(slice) => Ok(Value::string(slice)),
            None => bail!("slice {start}..{end} does not fall on character boundaries"),
        }
    });
    proto
}

fn array_prototype() -> ObjectRef {
    let proto = ObjectRef::new(None);
    method(&proto, "to_s", |ctx, (items,): (ArrayRef,)| {
        // Snapshot so element `to_s` methods may touch the array.
        let items: Vec<Value> = items.borrow().clone();
        let parts = items
            .iter()
            .map(|item| stringify(ctx, item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::string(format!("[{}]", parts.join(", "))))
    });
    method(&proto, "len", |_, (items,): (ArrayRef,)| {
        let len = items.borrow().len();
        Ok(Value::Number(len as f32))
    });
    method(&proto, "push", |_, (items, value): (ArrayRef, Value)| {
        items.borrow_mut().push(value);
        Ok(Value::Unit)
    });
    method(&proto, "pop", |_, (items,): (ArrayRef,)| {
        let popped = items.borrow_mut().pop();
        match popped {
            Some(value) => Ok(value),
            None => bail!("pop from an empty array"),
        }
    });
    method(&proto, "at", |_, (items, i): (ArrayRef, f32)| {
        let i = index(i)?;
        let items = items.borrow();
        match items.get(i) {
            Some(value) => Ok(value.clone()),
            None => bail!("index {i} out of range for array of length {}", items.len()),
        }
    });
    method(&proto, "set", |_, (items, i, value): (ArrayRef, f32, Value)| {
        let i = index(i)?;
        let mut items = items.borrow_mut();
        let len = items.len();
        match items.get_mut(i) {
            Some(slot) => *slot = value,
            None => bail!("index {i} out of range for array of length {len}"),
        }
        Ok(Value::Unit)
    });
    proto
}
