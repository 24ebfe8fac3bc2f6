use crate::context::Context;
use crate::error::{bail, RuntimeError};
use crate::eval::eval;
use crate::object::ObjectRef;
use crate::value::{FromArgs, Value};
use kestrel_ast::ast::{Expr, List};
use kestrel_ast::lexeme::Word;
use std::fmt;
use std::rc::Rc;

pub type NativeFn = dyn Fn(&mut Context<'_>, Vec<Value>) -> Result<Value, RuntimeError>;

/// Host function, or a function literal evaluated in a fresh scope per call.
pub enum Function {
    Native {
        name: String,
        func: Rc<NativeFn>,
    },
    Lang {
        params: Rc<List<Word>>,
        body: Expr,
        /// Prelude of the defining module.
        globals: ObjectRef,
        module: Rc<str>,
    },
}

fn native_fn<F>(f: F) -> Rc<NativeFn>
where
    F: Fn(&mut Context<'_>, Vec<Value>) -> Result<Value, RuntimeError> + 'static,
{
    Rc::new(f)
}

impl Function {
    /// Native function taking its arguments unchecked.
    pub fn native<F>(name: &str, f: F) -> Self
    where
        F: Fn(&mut Context<'_>, Vec<Value>) -> Result<Value, RuntimeError> + 'static,
    {
        Function::Native {
            name: name.to_string(),
            func: native_fn(f),
        }
    }

    /// Native function whose leading arguments are converted to `A`.
    ///
    /// Fewer than `A::COUNT` arguments is an error; extra arguments are
    /// ignored.
    pub fn native_expanded<A, F>(name: &str, f: F) -> Self
    where
        A: FromArgs,
        F: Fn(&mut Context<'_>, A) -> Result<Value, RuntimeError> + 'static,
    {
        Function::native(name, move |ctx, args| {
            if args.len() < A::COUNT {
                bail!(
                    "not enough arguments: need at least {}, got {}",
                    A::COUNT,
                    args.len()
                );
            }
            f(ctx, A::from_args(args)?)
        })
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Function::Native { name, .. } => Some(name),
            Function::Lang { .. } => None,
        }
    }

    pub fn call(&self, ctx: &mut Context<'_>, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match self {
            Function::Native { func, .. } => func(ctx, args),
            Function::Lang {
                params,
                body,
                globals,
                module,
            } => {
                // The call-site scope is not visible from the body.
                let scope = ObjectRef::scope(Some(globals.clone()));
                let mut args = args.into_iter();
                for param in &params.items {
                    scope.set_no_prototype(&param.text, args.next().unwrap_or(Value::Unit));
                }
                ctx.with_env(scope, globals.clone(), module.clone(), |ctx| eval(ctx, body))
            }
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Native { name, .. } => write!(f, "Native({name})"),
            Function::Lang { params, .. } => {
                let names: Vec<&str> = params.items.iter().map(|p| p.text.as_str()).collect();
                write!(f, "Lang({})", names.join(", "))
            }
        }
    }
}
