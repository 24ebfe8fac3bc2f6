use crate::error::RuntimeError;
use crate::function::Function;
use crate::object::ObjectRef;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// Runtime values in Kestrel.
///
/// Heap kinds (string, function, object, array) are reference counted, so
/// cloning a `Value` aliases rather than copies.
#[derive(Clone)]
pub enum Value {
    Unit,
    Number(f32),
    Boolean(bool),
    /// Mutated in place by `~` only while uniquely owned.
    String(Rc<String>),
    Function(Rc<Function>),
    Object(ObjectRef),
    Array(ArrayRef),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Unit,
    Number,
    Boolean,
    String,
    Function,
    Object,
    Array,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Unit => "unit",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::String => "string",
            ValueKind::Function => "function",
            ValueKind::Object => "object",
            ValueKind::Array => "array",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Unit => ValueKind::Unit,
            Value::Number(_) => ValueKind::Number,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::String(_) => ValueKind::String,
            Value::Function(_) => ValueKind::Function,
            Value::Object(_) => ValueKind::Object,
            Value::Array(_) => ValueKind::Array,
        }
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::String(Rc::new(s.into()))
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }
}

/// Shallow: never descends into objects or arrays, which may be cyclic.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "Unit"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Function(func) => match func.name() {
                Some(name) => write!(f, "Function({name})"),
                None => write!(f, "Function(<anonymous>)"),
            },
            Value::Object(o) => write!(f, "{o:?}"),
            Value::Array(items) => match items.try_borrow() {
                Ok(items) => write!(f, "Array(len={})", items.len()),
                Err(_) => write!(f, "Array(<borrowed>)"),
            },
        }
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

// ======= argument conversion =======

fn wrong_type(expected: &str, got: &Value) -> RuntimeError {
    RuntimeError::new(format!("wrong type: expected {expected}, got {}", got.kind()))
}

/// A Rust type a native function can take as one argument.
pub trait FromValue: Sized {
    const KIND: &'static str;

    fn from_value(value: Value) -> Result<Self, RuntimeError>;
}

impl FromValue for Value {
    const KIND: &'static str = "any";

    fn from_value(value: Value) -> Result<Self, RuntimeError> {
        Ok(value)
    }
}

macro_rules! impl_from_value {
    ($ty:ty, $kind:expr, $variant:ident) => {
        impl FromValue for $ty {
            const KIND: &'static str = $kind;

            fn from_value(value: Value) -> Result<Self, RuntimeError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(wrong_type(Self::KIND, &other)),
                }
            }
        }
    };
}

impl_from_value!(f32, "number", Number);
impl_from_value!(bool, "boolean", Boolean);
impl_from_value!(Rc<String>, "string", String);
impl_from_value!(Rc<Function>, "function", Function);
impl_from_value!(ObjectRef, "object", Object);
impl_from_value!(ArrayRef, "array", Array);

/// A tuple of [`FromValue`] types, taken from the front of an argument list.
pub trait FromArgs: Sized {
    const COUNT: usize;

    /// `args` holds at least `COUNT` values; extra ones are dropped.
    fn from_args(args: Vec<Value>) -> Result<Self, RuntimeError>;
}

macro_rules! impl_from_args {
    ($count:expr; $($name:ident),*) => {
        impl<$($name: FromValue),*> FromArgs for ($($name,)*) {
            const COUNT: usize = $count;

            #[allow(unused_mut, unused_variables)]
            fn from_args(args: Vec<Value>) -> Result<Self, RuntimeError> {
                let mut args = args.into_iter();
                Ok(($($name::from_value(args.next().unwrap_or(Value::Unit))?,)*))
            }
        }
    };
}

impl_from_args!(0;);
impl_from_args!(1; A);
impl_from_args!(2; A, B);
impl_from_args!(3; A, B, C);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_type_names_both_kinds() {
        let err = f32::from_value(Value::string("x")).unwrap_err();
        assert_eq!(err.message, "wrong type: expected number, got string");
    }

    #[test]
    fn from_args_drops_extras() {
        let args = vec![Value::Number(1.0), Value::Boolean(true), Value::Unit];
        let (n, b) = <(f32, bool)>::from_args(args).unwrap();
        assert_eq!(n, 1.0);
        assert!(b);
    }

    #[test]
    fn strings_alias_on_clone() {
        let a = Value::string("hi");
        let b = a.clone();
        match (a, b) {
            (Value::String(x), Value::String(y)) => assert!(Rc::ptr_eq(&x, &y)),
            _ => unreachable!(),
        }
    }
}
