//! Declaration binding instantiation for program code

use super::*;
use jsrun::value::Property;
use jsrun::FunctionDeclaration;

fn double() -> FunctionDeclaration {
    FunctionDeclaration::new(
        "double",
        &["x"],
        body(vec![returning(|ctx| {
            Ok(JsValue::Number(get(ctx, "x")?.to_number() * 2.0))
        })]),
    )
}

#[test]
fn test_function_declaration_hoisted() {
    let runtime = Runtime::new();
    let code = body(vec![expr(|ctx| call(ctx, "double", &[JsValue::from(21)]))])
        .declare_function(double());
    assert_eq!(run(&runtime, code).unwrap(), JsValue::Number(42.0));
}

#[test]
fn test_var_hoisted_as_undefined() {
    let runtime = Runtime::new();
    let code = body(vec![expr(|ctx| get(ctx, "v"))]).declare_var("v");
    assert_eq!(run(&runtime, code).unwrap(), JsValue::Undefined);
    assert!(
        runtime
            .global_object()
            .borrow()
            .has_own_property(&PropertyKey::from("v"))
    );
}

#[test]
fn test_undeclared_read_is_reference_error() {
    let runtime = Runtime::new();
    let err = run(&runtime, body(vec![expr(|ctx| get(ctx, "missing"))])).unwrap_err();
    let (kind, message) = thrown_kind(&err);
    assert_eq!(kind, "ReferenceError");
    assert_eq!(message, "missing is not defined");
}

#[test]
fn test_program_bindings_are_not_deletable() {
    let runtime = Runtime::new();
    run(&runtime, body(vec![]).declare_var("kept")).unwrap();

    let prop = runtime
        .global_object()
        .borrow()
        .get_own_property(&PropertyKey::from("kept"))
        .cloned()
        .unwrap();
    assert!(!prop.configurable);
    assert!(prop.enumerable);

    let deleted = run(
        &runtime,
        body(vec![expr(|ctx| {
            let reference = ctx.resolve("kept");
            Ok(JsValue::Boolean(reference.delete(ctx)?))
        })]),
    )
    .unwrap();
    assert_eq!(deleted, JsValue::Boolean(false));
}

#[test]
fn test_var_does_not_replace_function() {
    let runtime = Runtime::new();
    let code = body(vec![expr(|ctx| get(ctx, "double"))])
        .declare_function(double())
        .declare_var("double");
    assert!(run(&runtime, code).unwrap().is_callable());
}

#[test]
fn test_existing_var_keeps_its_value() {
    let runtime = Runtime::new();
    run(
        &runtime,
        body(vec![exec(|ctx| set(ctx, "count", JsValue::from(3)))]).declare_var("count"),
    )
    .unwrap();
    let again = run(&runtime, body(vec![expr(|ctx| get(ctx, "count"))]).declare_var("count"));
    assert_eq!(again.unwrap(), JsValue::Number(3.0));
}

#[test]
fn test_function_over_read_only_global_is_type_error() {
    let runtime = Runtime::new();
    let nan = FunctionDeclaration::new("NaN", &[], body(vec![]));
    let err = run(&runtime, body(vec![]).declare_function(nan)).unwrap_err();
    let (kind, message) = thrown_kind(&err);
    assert_eq!(kind, "TypeError");
    assert_eq!(message, "unable to bind function 'NaN'");
}

#[test]
fn test_function_over_accessor_global_is_type_error() {
    let runtime = Runtime::new();
    runtime.global_object().borrow_mut().define_property(
        PropertyKey::from("locked"),
        Property::accessor(None, None, true, false),
    );
    let locked = FunctionDeclaration::new("locked", &[], body(vec![]));
    let err = run(&runtime, body(vec![]).declare_function(locked)).unwrap_err();
    assert_eq!(thrown_kind(&err).0, "TypeError");
}

#[test]
fn test_function_replaces_configurable_global() {
    let runtime = Runtime::new();
    runtime.define_host_function("greet", 0, |_ctx, _this, _args| Ok(JsValue::from("host")));

    let greet = FunctionDeclaration::new(
        "greet",
        &[],
        body(vec![returning(|_ctx| Ok(JsValue::from("script")))]),
    );
    let code = body(vec![expr(|ctx| call(ctx, "greet", &[]))]).declare_function(greet);
    assert_eq!(run(&runtime, code).unwrap(), JsValue::from("script"));

    let prop = runtime
        .global_object()
        .borrow()
        .get_own_property(&PropertyKey::from("greet"))
        .cloned()
        .unwrap();
    assert!(!prop.configurable);
    assert!(prop.is_writable());
}

#[test]
fn test_function_over_writable_non_configurable_global() {
    let runtime = Runtime::new();
    runtime.global_object().borrow_mut().define_property(
        PropertyKey::from("slot"),
        Property::with_attributes(JsValue::from(1), true, true, false),
    );
    let slot = FunctionDeclaration::new("slot", &[], body(vec![]));
    run(&runtime, body(vec![]).declare_function(slot)).unwrap();
    assert!(global(&runtime, "slot").is_callable());
}

#[test]
fn test_sloppy_assignment_creates_global() {
    let runtime = Runtime::new();
    run(
        &runtime,
        body(vec![exec(|ctx| set(ctx, "implicit", JsValue::from(5)))]),
    )
    .unwrap();
    assert_eq!(global(&runtime, "implicit"), JsValue::Number(5.0));
}

#[test]
fn test_strict_assignment_to_undeclared_is_reference_error() {
    let runtime = Runtime::new();
    let code = body(vec![exec(|ctx| set(ctx, "implicit", JsValue::from(5)))]).strict(true);
    let err = run(&runtime, code).unwrap_err();
    assert_eq!(thrown_kind(&err).0, "ReferenceError");
    assert_eq!(global(&runtime, "implicit"), JsValue::Undefined);
}

#[test]
fn test_nested_function_declarations_are_local() {
    let runtime = Runtime::new();
    let helper = FunctionDeclaration::new(
        "helper",
        &[],
        body(vec![returning(|_ctx| Ok(JsValue::from("inner")))]),
    );
    let outer = FunctionDeclaration::new(
        "outer",
        &[],
        body(vec![returning(|ctx| call(ctx, "helper", &[]))]).declare_function(helper),
    );
    let code = body(vec![expr(|ctx| call(ctx, "outer", &[]))]).declare_function(outer);
    assert_eq!(run(&runtime, code).unwrap(), JsValue::from("inner"));
    assert_eq!(global(&runtime, "helper"), JsValue::Undefined);
}

fn pick(result: &'static str) -> FunctionDeclaration {
    FunctionDeclaration::new(
        "pick",
        &[],
        body(vec![returning(move |_ctx| Ok(JsValue::from(result)))]),
    )
}

#[test]
fn test_later_function_declaration_wins() {
    let runtime = Runtime::new();
    let code = body(vec![expr(|ctx| call(ctx, "pick", &[]))])
        .declare_function(pick("first"))
        .declare_function(pick("second"));
    assert_eq!(run(&runtime, code).unwrap(), JsValue::from("second"));
}

#[test]
fn test_later_nested_function_declaration_wins() {
    let runtime = Runtime::new();
    let outer = FunctionDeclaration::new(
        "outer",
        &[],
        body(vec![returning(|ctx| call(ctx, "pick", &[]))])
            .declare_function(pick("first"))
            .declare_function(pick("second")),
    );
    let code = body(vec![expr(|ctx| call(ctx, "outer", &[]))]).declare_function(outer);
    assert_eq!(run(&runtime, code).unwrap(), JsValue::from("second"));
}

#[test]
fn test_var_does_not_reset_parameter() {
    let runtime = Runtime::new();
    let f = FunctionDeclaration::new(
        "f",
        &["x"],
        body(vec![returning(|ctx| get(ctx, "x"))]).declare_var("x"),
    );
    let code = body(vec![expr(|ctx| call(ctx, "f", &[JsValue::from(5)]))]).declare_function(f);
    assert_eq!(run(&runtime, code).unwrap(), JsValue::Number(5.0));
}
