use crate::builtins::Core;
use crate::error::{bail, Frame, RuntimeError};
use crate::eval::run_program;
use crate::function::Function;
use crate::object::ObjectRef;
use crate::value::{FromArgs, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::debug;

/// Default limit on nested calls before evaluation is aborted.
pub const MAX_CALL_DEPTH: usize = 512;

/// Maps `require` names to module keys and module keys to source text.
pub trait ModuleResolver {
    /// Turn a module name as written in `require(...)` into a stable key.
    /// `importer` is the key of the requiring module, if any.
    fn resolve(
        &self,
        name: &str,
        importer: Option<&str>,
        search_paths: &[PathBuf],
    ) -> Result<String, RuntimeError>;

    fn read(&self, key: &str) -> Result<String, RuntimeError>;
}

/// Modules held in memory, keyed by name. A leading `./` and a missing
/// `.ks` extension are both tolerated.
#[derive(Debug, Default, Clone)]
pub struct MemoryResolver {
    modules: HashMap<String, String>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, name: &str, source: &str) -> Self {
        self.insert(name, source);
        self
    }

    pub fn insert(&mut self, name: &str, source: &str) {
        self.modules.insert(name.to_string(), source.to_string());
    }
}

impl ModuleResolver for MemoryResolver {
    fn resolve(
        &self,
        name: &str,
        _importer: Option<&str>,
        _search_paths: &[PathBuf],
    ) -> Result<String, RuntimeError> {
        let name = name.strip_prefix("./").unwrap_or(name);
        if self.modules.contains_key(name) {
            return Ok(name.to_string());
        }
        let with_ext = format!("{name}.ks");
        if self.modules.contains_key(&with_ext) {
            return Ok(with_ext);
        }
        bail!("module '{name}' not found")
    }

    fn read(&self, key: &str) -> Result<String, RuntimeError> {
        match self.modules.get(key) {
            Some(source) => Ok(source.clone()),
            None => bail!("module '{key}' not found"),
        }
    }
}

/// State shared by every module of one run.
pub struct GlobalContext {
    pub core: Core,
    natives: RefCell<Vec<(String, Value)>>,
    modules: RefCell<HashMap<String, Value>>,
    sources: RefCell<HashMap<String, Rc<str>>>,
    search_paths: Vec<PathBuf>,
    resolver: Box<dyn ModuleResolver>,
    max_call_depth: usize,
}

impl Default for GlobalContext {
    fn default() -> Self {
        Self::new(Box::new(MemoryResolver::new()))
    }
}

impl GlobalContext {
    /// Build the core prototypes and install `obj` and `require`.
    pub fn new(resolver: Box<dyn ModuleResolver>) -> Self {
        let global = Self {
            core: Core::new(),
            natives: RefCell::new(Vec::new()),
            modules: RefCell::new(HashMap::new()),
            sources: RefCell::new(HashMap::new()),
            search_paths: Vec::new(),
            resolver,
            max_call_depth: MAX_CALL_DEPTH,
        };

        global.define_native("obj", |ctx, (): ()| {
            Ok(Value::Object(ObjectRef::new(Some(ctx.global.core.object.clone()))))
        });
        global.define_native("require", |ctx, (name,): (Rc<String>,)| {
            let importer = ctx.module.clone();
            ctx.global.load(&name, Some(&*importer), ctx.stack_trace.clone())
        });
        global
    }

    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }

    /// Make `value` visible as `name` in every module loaded afterwards.
    pub fn define_global(&self, name: &str, value: Value) {
        let mut natives = self.natives.borrow_mut();
        match natives.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => natives.push((name.to_string(), value)),
        }
    }

    pub fn define_native<A, F>(&self, name: &str, f: F)
    where
        A: FromArgs,
        F: Fn(&mut Context<'_>, A) -> Result<Value, RuntimeError> + 'static,
    {
        let function = Function::native_expanded(name, f);
        self.define_global(name, Value::Function(Rc::new(function)));
    }

    /// A fresh prelude holding the globals, and a module scope on top of it.
    pub fn new_module_scope(&self) -> (ObjectRef, ObjectRef) {
        let prelude = ObjectRef::scope(None);
        for (name, value) in self.natives.borrow().iter() {
            prelude.set_no_prototype(name, value.clone());
        }
        let scope = ObjectRef::scope(Some(prelude.clone()));
        (prelude, scope)
    }

    /// Source text of a file that has been run, for diagnostics.
    pub fn source(&self, file: &str) -> Option<Rc<str>> {
        self.sources.borrow().get(file).cloned()
    }

    /// Run `src` as a module named `file` and return the value of its tail
    /// expression.
    pub fn run_source(&self, file: &str, src: &str) -> Result<Value, RuntimeError> {
        self.execute(file, src, Vec::new()).map(|(value, _)| value)
    }

    /// Run `src` as a module named `file` and return its export: the value
    /// bound to `export`, or the module scope itself.
    pub fn run_module(&self, file: &str, src: &str) -> Result<Value, RuntimeError> {
        self.run_module_with_trace(file, src, Vec::new())
    }

    fn run_module_with_trace(
        &self,
        file: &str,
        src: &str,
        trace: Vec<Frame>,
    ) -> Result<Value, RuntimeError> {
        let (_, scope) = self.execute(file, src, trace)?;
        Ok(scope
            .try_get_no_prototype("export")
            .unwrap_or(Value::Object(scope)))
    }

    /// Resolve, load, and cache a module. Each module runs at most once per
    /// `GlobalContext`.
    pub fn load_module(&self, name: &str, importer: Option<&str>) -> Result<Value, RuntimeError> {
        self.load(name, importer, Vec::new())
    }

    /// The module body runs on top of `trace`, so nested loads count
    /// against the call depth limit and a require cycle ends in an error.
    fn load(
        &self,
        name: &str,
        importer: Option<&str>,
        trace: Vec<Frame>,
    ) -> Result<Value, RuntimeError> {
        let key = self.resolver.resolve(name, importer, &self.search_paths)?;
        let cached = self.modules.borrow().get(&key).cloned();
        if let Some(export) = cached {
            debug!(module = %key, "module cache hit");
            return Ok(export);
        }

        let source = self.resolver.read(&key)?;
        debug!(module = %key, bytes = source.len(), "loading module");
        let export = self.run_module_with_trace(&key, &source, trace)?;
        self.modules.borrow_mut().insert(key, export.clone());
        Ok(export)
    }

    fn execute(
        &self,
        file: &str,
        src: &str,
        trace: Vec<Frame>,
    ) -> Result<(Value, ObjectRef), RuntimeError> {
        self.sources
            .borrow_mut()
            .insert(file.to_string(), Rc::from(src));
        let program = kestrel_parse::parse_str(file, src)?;
        let (prelude, scope) = self.new_module_scope();
        let mut ctx = Context::new(self, scope.clone(), prelude, Rc::from(file));
        ctx.stack_trace = trace;
        let value = run_program(&mut ctx, &program)?;
        Ok((value, scope))
    }
}

/// Per-evaluation state.
pub struct Context<'g> {
    pub global: &'g GlobalContext,
    pub scope: ObjectRef,
    /// Prelude of the module being evaluated.
    pub globals: ObjectRef,
    /// Key of the module being evaluated.
    pub module: Rc<str>,
    pub stack_trace: Vec<Frame>,
}

impl<'g> Context<'g> {
    pub fn new(global: &'g GlobalContext, scope: ObjectRef, globals: ObjectRef, module: Rc<str>) -> Self {
        Self {
            global,
            scope,
            globals,
            module,
            stack_trace: Vec::new(),
        }
    }

    pub fn child_scope(&self) -> ObjectRef {
        ObjectRef::scope(Some(self.scope.clone()))
    }

    /// Run `f` with `scope` as the current scope, restoring the previous one
    /// afterwards, even on error.
    pub fn with_scope<T>(
        &mut self,
        scope: ObjectRef,
        f: impl FnOnce(&mut Self) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        let saved = std::mem::replace(&mut self.scope, scope);
        let result = f(self);
        self.scope = saved;
        result
    }

    /// Like [`Context::with_scope`], also switching module and prelude.
    pub fn with_env<T>(
        &mut self,
        scope: ObjectRef,
        globals: ObjectRef,
        module: Rc<str>,
        f: impl FnOnce(&mut Self) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        let saved_globals = std::mem::replace(&mut self.globals, globals);
        let saved_module = std::mem::replace(&mut self.module, module);
        let result = self.with_scope(scope, f);
        self.globals = saved_globals;
        self.module = saved_module;
        result
    }
}
