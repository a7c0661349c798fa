//! Exception propagation and script stack traces

use super::*;
use jsrun::{FunctionDeclaration, StackElement};

fn catching(try_block: Block, handler: Block) -> Statement {
    let identifier = JsString::from("e");
    Statement::at_line(10, move |ctx: &mut ExecutionContext| match try_block.execute(ctx) {
        Ok(completion) => Ok(completion),
        Err(err) => ctx.execute_catch(&handler, &identifier, err),
    })
}

/// Declares `inner`, which throws on line 3, and `outer`, which calls it on line 7
fn with_nested_functions(code: Code) -> Code {
    let inner = FunctionDeclaration::new(
        "inner",
        &[],
        body(vec![Statement::at_line(3, |ctx| Err(throw(ctx, "Error", "boom")))]),
    );
    let outer = FunctionDeclaration::new(
        "outer",
        &[],
        body(vec![Statement::at_line(7, |ctx| {
            call(ctx, "inner", &[])?;
            Ok(Completion::empty())
        })]),
    );
    code.declare_function(inner)
        .declare_function(outer)
        .with_file_name("test.js")
}

fn frame(name: &str, line: u32) -> StackElement {
    StackElement::new("test.js", line, name)
}

#[test]
fn test_trace_records_frames_innermost_first() {
    let runtime = Runtime::new();
    let code = with_nested_functions(body(vec![Statement::at_line(12, |ctx| {
        call(ctx, "outer", &[])?;
        Ok(Completion::empty())
    })]));

    let err = run(&runtime, code).unwrap_err();
    let trace = err.trace().unwrap();
    assert_eq!(
        trace.frames(),
        &[frame("inner", 3), frame("outer", 7), frame("<global>", 12)]
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("Error: boom\n"), "{}", rendered);
    assert!(rendered.contains("    at inner (test.js:3)"), "{}", rendered);
    assert!(rendered.ends_with("    at <global> (test.js:12)"), "{}", rendered);
}

#[test]
fn test_catch_rewrites_error_frames() {
    let runtime = Runtime::new();
    let handler = Block::new(vec![expr(|ctx| get(ctx, "e"))]);
    let try_block = Block::new(vec![exec(|ctx| call(ctx, "outer", &[]).map(|_| ()))]);
    let code = with_nested_functions(body(vec![catching(try_block, handler)]));

    let error = run(&runtime, code).unwrap();
    let data = error_data(&error);
    assert!(data.trace_materialized);
    assert_eq!(data.frames, vec![frame("inner", 3), frame("outer", 7)]);
    assert_eq!(
        own(&error, "stack"),
        Some(JsValue::from(
            "Error: boom\n    at inner (test.js:3)\n    at outer (test.js:7)"
        ))
    );
}

#[test]
fn test_native_frames_are_not_recorded() {
    let runtime = Runtime::new();
    runtime.define_host_function("host", 0, |_ctx, _this, _args| {
        Err(JsError::type_error("host failure"))
    });
    let caller = FunctionDeclaration::new(
        "caller",
        &[],
        body(vec![Statement::at_line(4, |ctx| {
            call(ctx, "host", &[])?;
            Ok(Completion::empty())
        })]),
    );
    let code = body(vec![Statement::at_line(9, |ctx| {
        call(ctx, "caller", &[])?;
        Ok(Completion::empty())
    })])
    .with_file_name("test.js")
    .declare_function(caller);

    let err = run(&runtime, code).unwrap_err();
    assert_eq!(
        err.trace().unwrap().frames(),
        &[frame("caller", 4), frame("<global>", 9)]
    );
    let data = thrown_error(&err);
    assert_eq!(data.kind.as_str(), "TypeError");
    assert!(data.frames.first().unwrap().is_native());
    assert_eq!(data.frames.first().unwrap().debug_context, "host");
}

#[test]
fn test_catch_keeps_leading_native_frames() {
    let runtime = Runtime::new();
    runtime.define_host_function("host", 0, |_ctx, _this, _args| {
        Err(JsError::type_error("host failure"))
    });
    let caller = FunctionDeclaration::new(
        "caller",
        &[],
        body(vec![Statement::at_line(4, |ctx| {
            call(ctx, "host", &[])?;
            Ok(Completion::empty())
        })]),
    );
    let try_block = Block::new(vec![exec(|ctx| call(ctx, "caller", &[]).map(|_| ()))]);
    let handler = Block::new(vec![expr(|ctx| get(ctx, "e"))]);
    let code = body(vec![catching(try_block, handler)])
        .with_file_name("test.js")
        .declare_function(caller);

    let error = run(&runtime, code).unwrap();
    let data = error_data(&error);
    assert_eq!(
        data.frames,
        vec![StackElement::native("host"), frame("caller", 4)]
    );
    let stack = own(&error, "stack").unwrap().to_js_string().to_string();
    assert_eq!(
        stack,
        "TypeError: host failure\n    at host (native)\n    at caller (test.js:4)"
    );
}

#[test]
fn test_rethrown_error_keeps_first_trace() {
    let runtime = Runtime::new();
    let rethrow = Block::new(vec![exec(|ctx| Err(JsError::thrown(get(ctx, "e")?)))]);
    let inner_try = Block::new(vec![exec(|ctx| call(ctx, "outer", &[]).map(|_| ()))]);
    let outer_try = Block::new(vec![catching(inner_try, rethrow)]);
    let handler = Block::new(vec![expr(|ctx| get(ctx, "e"))]);
    let code = with_nested_functions(body(vec![catching(outer_try, handler)]));

    let error = run(&runtime, code).unwrap();
    let data = error_data(&error);
    assert_eq!(data.frames, vec![frame("inner", 3), frame("outer", 7)]);
}

#[test]
fn test_thrown_primitive_carries_trace() {
    let runtime = Runtime::new();
    let code = body(vec![Statement::at_line(2, |_ctx| {
        Err(JsError::thrown(JsValue::from("plain")))
    })])
    .with_file_name("test.js");
    let err = run(&runtime, code).unwrap_err();
    assert_eq!(err.thrown_value(), Some(&JsValue::from("plain")));
    assert_eq!(err.trace().unwrap().frames(), &[frame("<global>", 2)]);
    assert!(err.to_string().starts_with("Uncaught plain"));
}

#[test]
fn test_stack_is_empty_after_unwinding() {
    let runtime = Runtime::new();
    let _ = run(&runtime, with_nested_functions(body(vec![])));
    let mut ctx = runtime.create_global_context();
    let _ = call(&mut ctx, "outer", &[]);
    assert_eq!(runtime.realm().stack().depth(), 0);
}
