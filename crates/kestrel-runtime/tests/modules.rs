use kestrel_runtime::{GlobalContext, MemoryResolver, RuntimeError, Value};

fn global(resolver: MemoryResolver) -> GlobalContext {
    GlobalContext::new(Box::new(resolver))
}

fn number(result: Result<Value, RuntimeError>) -> f32 {
    match result {
        Ok(Value::Number(n)) => n,
        other => panic!("expected number, got {other:?}"),
    }
}

#[test]
fn export_binding_is_the_module_value() {
    let resolver = MemoryResolver::new().with_module(
        "math.ks",
        "let export = obj();\nexport.square = func(self, x) x * x;\nexport.half = func(x) x / 2;",
    );
    let global = global(resolver);

    let src = "let m = require(\"math\"); m.square(3)";
    assert_eq!(number(global.run_source("main.ks", src)), 9.0);

    // field access followed by a call passes no receiver
    let src = "let m = require(\"./math.ks\"); let half = m.half; half(10)";
    assert_eq!(number(global.run_source("main.ks", src)), 5.0);
}

#[test]
fn module_scope_is_exported_without_export_binding() {
    let resolver = MemoryResolver::new().with_module("consts.ks", "let answer = 42;");
    let global = global(resolver);
    let src = "require(\"consts\").answer";
    assert_eq!(number(global.run_source("main.ks", src)), 42.0);
}

#[test]
fn modules_run_once_and_are_cached() {
    let resolver = MemoryResolver::new()
        .with_module("counter.ks", "let export = obj(); export.hits = 0;");
    let global = global(resolver);
    let src = "let a = require(\"counter\");
               a.hits = a.hits + 1;
               let b = require(\"./counter\");
               b.hits = b.hits + 1;
               [a == b, b.hits]";
    match global.run_source("main.ks", src) {
        Ok(Value::Array(items)) => {
            let items = items.borrow();
            assert!(matches!(items[0], Value::Boolean(true)));
            assert!(matches!(items[1], Value::Number(n) if n == 2.0));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn missing_module_is_an_error() {
    let global = global(MemoryResolver::new());
    let err = global
        .run_source("main.ks", "require(\"nope\")")
        .unwrap_err();
    assert_eq!(err.message, "module 'nope' not found");
    assert_eq!(err.stack_trace.map(|t| t[0].name.clone()), Some("require".to_string()));
}

#[test]
fn syntax_error_in_module_points_into_that_module() {
    let resolver = MemoryResolver::new().with_module("bad.ks", "let x = ;");
    let global = global(resolver);
    let err = global
        .run_source("main.ks", "require(\"bad\")")
        .unwrap_err();
    assert_eq!(err.message, "expected expression but got `;`");
    let span = err.span.expect("span");
    assert_eq!(&*span.file, "bad.ks");
    assert_eq!(span.start, 8);
    assert!(global.source("bad.ks").is_some());
}

#[test]
fn modules_do_not_see_importer_bindings() {
    let resolver = MemoryResolver::new().with_module("peek.ks", "let export = secret;");
    let global = global(resolver);
    let err = global
        .run_source("main.ks", "let secret = 1; require(\"peek\")")
        .unwrap_err();
    assert_eq!(err.message, "variable 'secret' is not defined");
    assert_eq!(err.span.map(|s| s.file.to_string()), Some("peek.ks".to_string()));
}

#[test]
fn module_functions_keep_their_own_prelude() {
    let resolver = MemoryResolver::new()
        .with_module("lib.ks", "let export = func() require(\"data\").value;")
        .with_module("data.ks", "let value = 7;");
    let global = global(resolver);
    let src = "let get = require(\"lib\"); get()";
    assert_eq!(number(global.run_source("main.ks", src)), 7.0);
}

#[test]
fn run_module_returns_export() {
    let global = GlobalContext::default();
    match global.run_module("m.ks", "let export = \"hi\";") {
        Ok(Value::String(s)) => assert_eq!(s.as_str(), "hi"),
        other => panic!("unexpected {other:?}"),
    }
    match global.run_module("n.ks", "let a = 1;") {
        Ok(Value::Object(scope)) => assert!(scope.has_own("a")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn globals_defined_later_reach_new_modules() {
    let global = GlobalContext::default();
    global.define_global("version", Value::Number(3.0));
    assert_eq!(number(global.run_source("a.ks", "version")), 3.0);
    global.define_global("version", Value::Number(4.0));
    assert_eq!(number(global.run_source("b.ks", "version")), 4.0);
}

#[test]
fn require_cycle_hits_call_depth_limit() {
    let resolver = MemoryResolver::new()
        .with_module("a.ks", "let export = require(\"b\");")
        .with_module("b.ks", "let export = require(\"a\");");
    let global = global(resolver).with_max_call_depth(16);
    let err = global
        .run_source("main.ks", "require(\"a\")")
        .unwrap_err();
    assert_eq!(err.message, "maximum call depth exceeded (limit: 16 calls)");
    let trace = err.stack_trace.expect("trace");
    assert_eq!(trace.len(), 16);
    assert!(trace.iter().all(|frame| frame.name == "require"));
}

#[test]
fn errors_inside_modules_keep_the_require_frame() {
    let resolver = MemoryResolver::new().with_module("oops.ks", "let x = 1 + true;");
    let global = global(resolver);
    let err = global
        .run_source("main.ks", "\nrequire(\"oops\")")
        .unwrap_err();
    let trace = err.stack_trace.expect("trace");
    assert_eq!(trace.len(), 1);
    assert_eq!(trace[0].name, "require");
    assert_eq!(&*trace[0].call_site.file, "main.ks");
    assert_eq!(trace[0].call_site.start, 1);
}
