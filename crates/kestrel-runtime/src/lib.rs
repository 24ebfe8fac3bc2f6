//! Values, objects, and the tree-walking evaluator for Kestrel.
//!
//! Everything here is single-threaded: values share state through `Rc` and
//! `RefCell`, so none of the runtime types are `Send`.

#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

pub mod builtins;
pub mod context;
pub mod error;
pub mod eval;
pub mod function;
pub mod object;
pub mod value;

pub use context::{Context, GlobalContext, MemoryResolver, ModuleResolver, MAX_CALL_DEPTH};
pub use error::{Frame, RuntimeError};
pub use eval::{call_function, call_method, eval, exec, run_program, stringify, values_equal};
pub use function::Function;
pub use object::ObjectRef;
pub use value::{ArrayRef, FromArgs, FromValue, Value, ValueKind};
