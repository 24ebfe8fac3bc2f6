//! Host side of the interpreter: module files on disk and process I/O.
//!
//! The runtime only knows the [`ModuleResolver`] trait and a registry of
//! native functions. This module supplies the file-system resolver used by
//! the `kestrel` binary and the `print` / `readline` natives.

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use kestrel_runtime::{stringify, Function, GlobalContext, ModuleResolver, RuntimeError, Value};
use tracing::debug;

use crate::MAX_SOURCE_SIZE;

/// Extension added to module names that do not name an existing file.
pub const SOURCE_EXTENSION: &str = "ks";

// ---------------------------------------------------------------------------
// FsResolver
// ---------------------------------------------------------------------------

/// Resolves `require` names against the file system.
///
/// Names starting with `./` or `../` are relative to the directory of the
/// importing module. Anything else is tried against each search path in
/// order, then against the working directory. The resolved path, as text,
/// is the module's cache key.
#[derive(Debug, Default, Clone)]
pub struct FsResolver;

impl FsResolver {
    pub fn new() -> Self {
        Self
    }

    fn candidate(base: &Path, name: &str) -> Result<Option<PathBuf>, RuntimeError> {
        let bare = base.join(name);
        if bare.is_dir() {
            return Err(RuntimeError::new(format!(
                "module '{name}' is a directory: {}",
                bare.display()
            )));
        }
        if bare.is_file() {
            return Ok(Some(bare));
        }
        if bare.extension().is_none() {
            let with_ext = bare.with_extension(SOURCE_EXTENSION);
            if with_ext.is_file() {
                return Ok(Some(with_ext));
            }
        }
        Ok(None)
    }
}

fn is_relative_name(name: &str) -> bool {
    name.starts_with("./") || name.starts_with("../")
}

impl ModuleResolver for FsResolver {
    fn resolve(
        &self,
        name: &str,
        importer: Option<&str>,
        search_paths: &[PathBuf],
    ) -> Result<String, RuntimeError> {
        let bases: Vec<PathBuf> = if is_relative_name(name) {
            let dir = importer
                .and_then(|importer| Path::new(importer).parent())
                .map(Path::to_path_buf)
                .unwrap_or_default();
            vec![dir]
        } else {
            let mut bases = search_paths.to_vec();
            bases.push(PathBuf::new());
            bases
        };

        for base in &bases {
            if let Some(path) = Self::candidate(base, name)? {
                let key = path.display().to_string();
                debug!(module = name, key = %key, "resolved module");
                return Ok(key);
            }
        }
        Err(RuntimeError::new(format!("module '{name}' not found")))
    }

    fn read(&self, key: &str) -> Result<String, RuntimeError> {
        let source = std::fs::read_to_string(key)
            .map_err(|e| RuntimeError::new(format!("cannot read module '{key}': {e}")))?;
        if source.len() > MAX_SOURCE_SIZE {
            return Err(RuntimeError::new(format!(
                "module '{key}' exceeds the {MAX_SOURCE_SIZE} byte source limit"
            )));
        }
        Ok(source)
    }
}

// ---------------------------------------------------------------------------
// Process I/O natives
// ---------------------------------------------------------------------------

/// Install `print` and `readline`, writing to `out` and reading from `input`.
pub fn install_io<W, R>(global: &GlobalContext, out: W, input: R)
where
    W: Write + 'static,
    R: BufRead + 'static,
{
    let out = Rc::new(RefCell::new(out));
    let print = Function::native("print", move |ctx, args| {
        let parts = args
            .iter()
            .map(|arg| stringify(ctx, arg))
            .collect::<Result<Vec<_>, _>>()?;
        let mut out = out.borrow_mut();
        writeln!(out, "{}", parts.join(" "))
            .and_then(|()| out.flush())
            .map_err(|e| RuntimeError::new(format!("print failed: {e}")))?;
        Ok(Value::Unit)
    });
    global.define_global("print", Value::Function(Rc::new(print)));

    let input = RefCell::new(input);
    global.define_native("readline", move |_, (): ()| {
        let mut line = String::new();
        let read = input
            .borrow_mut()
            .read_line(&mut line)
            .map_err(|e| RuntimeError::new(format!("readline failed: {e}")))?;
        if read == 0 {
            return Ok(Value::Unit);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Value::string(line))
    });
}

/// Runtime wired to the file system and the process's stdin and stdout.
pub fn global_context(search_paths: Vec<PathBuf>) -> GlobalContext {
    let global = GlobalContext::new(Box::new(FsResolver::new())).with_search_paths(search_paths);
    install_io(&global, std::io::stdout(), std::io::BufReader::new(std::io::stdin()));
    global
}
