//! `new` semantics

use std::cell::Cell;
use std::rc::Rc;

use super::*;
use jsrun::FunctionDeclaration;

fn point() -> FunctionDeclaration {
    FunctionDeclaration::new(
        "Point",
        &["x"],
        body(vec![exec(|ctx| {
            let this = ctx.this_binding().clone();
            let x = get(ctx, "x")?;
            set_prop(ctx, this, "x", x)
        })]),
    )
}

fn construct(ctx: &mut ExecutionContext, name: &str, args: &[JsValue]) -> Result<JsValue, JsError> {
    let reference = ctx.resolve(name);
    ctx.construct_reference(&reference, args).map(JsValue::Object)
}

#[test]
fn test_construct_initializes_new_object() {
    let runtime = Runtime::new();
    let code = body(vec![expr(|ctx| construct(ctx, "Point", &[JsValue::from(3)]))])
        .declare_function(point());
    let obj = run(&runtime, code).unwrap();

    assert_eq!(own(&obj, "x"), Some(JsValue::Number(3.0)));
    let point = global(&runtime, "Point");
    let prototype = own(&point, "prototype").unwrap();
    assert!(
        obj.as_object()
            .unwrap()
            .prototype()
            .unwrap()
            .ptr_eq(prototype.as_object().unwrap())
    );
}

#[test]
fn test_constructed_object_records_constructor_name() {
    let runtime = Runtime::new();
    let code = body(vec![expr(|ctx| construct(ctx, "Point", &[JsValue::from(3)]))])
        .declare_function(point());
    let obj = run(&runtime, code).unwrap();

    assert_eq!(own(&obj, "__ctor__"), Some(JsValue::from("Point")));
    let prop = obj
        .as_object()
        .unwrap()
        .borrow()
        .get_own_property(&PropertyKey::from("__ctor__"))
        .cloned()
        .unwrap();
    assert!(!prop.enumerable);
}

#[test]
fn test_anonymous_constructor_named_after_reference() {
    let runtime = Runtime::new();
    let code = body(vec![
        exec(|ctx| {
            let this = ctx.this_binding().clone();
            let anonymous = ctx.create_function(None, &[], body(vec![]))?;
            set_prop(ctx, this, "Widget", JsValue::Object(anonymous))
        }),
        expr(|ctx| construct(ctx, "Widget", &[])),
    ]);
    let obj = run(&runtime, code).unwrap();
    assert_eq!(own(&obj, "__ctor__"), Some(JsValue::from("Widget")));
}

#[test]
fn test_returned_object_replaces_allocation() {
    let runtime = Runtime::new();
    let factory = FunctionDeclaration::new(
        "Factory",
        &[],
        body(vec![returning(|ctx| {
            let replacement = ctx.realm().new_object();
            set_prop(ctx, JsValue::Object(replacement.clone()), "made", JsValue::from(true))?;
            Ok(JsValue::Object(replacement))
        })]),
    );
    let code = body(vec![expr(|ctx| construct(ctx, "Factory", &[]))]).declare_function(factory);
    let obj = run(&runtime, code).unwrap();
    assert_eq!(own(&obj, "made"), Some(JsValue::Boolean(true)));
    assert_eq!(own(&obj, "__ctor__"), Some(JsValue::from("Factory")));
}

#[test]
fn test_returned_primitive_is_ignored() {
    let runtime = Runtime::new();
    let primitive = FunctionDeclaration::new(
        "Primitive",
        &[],
        body(vec![returning(|_ctx| Ok(JsValue::from(42)))]),
    );
    let code =
        body(vec![expr(|ctx| construct(ctx, "Primitive", &[]))]).declare_function(primitive);
    let obj = run(&runtime, code).unwrap();
    assert!(obj.is_object());
    assert_eq!(own(&obj, "__ctor__"), Some(JsValue::from("Primitive")));
}

#[test]
fn test_non_constructor_is_rejected_before_running() {
    let runtime = Runtime::new();
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    runtime.define_host_function("plain", 0, move |_ctx, _this, _args| {
        counter.set(counter.get() + 1);
        Ok(JsValue::Undefined)
    });

    let err = run(&runtime, body(vec![expr(|ctx| construct(ctx, "plain", &[]))])).unwrap_err();
    let (kind, message) = thrown_kind(&err);
    assert_eq!(kind, "TypeError");
    assert_eq!(message, "plain is not a constructor");
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_constructing_non_function_is_type_error() {
    let runtime = Runtime::new();
    let code = body(vec![
        exec(|ctx| set(ctx, "n", JsValue::from(5))),
        expr(|ctx| construct(ctx, "n", &[])),
    ])
    .declare_var("n");
    let err = run(&runtime, code).unwrap_err();
    let (kind, message) = thrown_kind(&err);
    assert_eq!(kind, "TypeError");
    assert_eq!(message, "n is not a constructor");
}

#[test]
fn test_non_object_prototype_falls_back_to_object_prototype() {
    let runtime = Runtime::new();
    let code = body(vec![
        exec(|ctx| {
            let point = get(ctx, "Point")?;
            set_prop(ctx, point, "prototype", JsValue::from(1))
        }),
        expr(|ctx| construct(ctx, "Point", &[JsValue::from(0)])),
    ])
    .declare_function(point());
    let obj = run(&runtime, code).unwrap();
    assert!(
        obj.as_object()
            .unwrap()
            .prototype()
            .unwrap()
            .ptr_eq(runtime.realm().object_prototype())
    );
}

#[test]
fn test_new_error_builtin() {
    let runtime = Runtime::new();
    let code = body(vec![expr(|ctx| {
        construct(ctx, "TypeError", &[JsValue::from("boom")])
    })]);
    let error = run(&runtime, code).unwrap();

    let data = error_data(&error);
    assert_eq!(data.kind.as_str(), "TypeError");
    assert_eq!(data.message.as_ref().map(|m| m.as_str()), Some("boom"));
    assert_eq!(own(&error, "__ctor__"), Some(JsValue::from("TypeError")));
    assert!(
        error
            .as_object()
            .unwrap()
            .prototype()
            .unwrap()
            .ptr_eq(&runtime.realm().prototype_for("TypeError").unwrap())
    );

    let mut ctx = runtime.create_global_context();
    let to_string = ctx.create_property_reference(error, "toString");
    assert_eq!(
        ctx.call_reference(&to_string, &[]).unwrap(),
        JsValue::from("TypeError: boom")
    );
}

#[test]
fn test_error_called_without_new_allocates() {
    let runtime = Runtime::new();
    let code = body(vec![expr(|ctx| call(ctx, "RangeError", &[JsValue::from("far")]))]);
    let error = run(&runtime, code).unwrap();
    let data = error_data(&error);
    assert_eq!(data.kind.as_str(), "RangeError");
    assert_eq!(own(&error, "message"), Some(JsValue::from("far")));
}
