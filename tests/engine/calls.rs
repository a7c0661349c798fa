//! Function calls and `this` binding

use super::*;
use jsrun::value::Property;
use jsrun::FunctionDeclaration;

fn this_of(strict: bool) -> Code {
    body(vec![returning(|ctx| Ok(ctx.this_binding().clone()))]).strict(strict)
}

#[test]
fn test_sloppy_undefined_this_is_global_object() {
    let runtime = Runtime::new();
    let mut ctx = runtime.create_global_context();
    let f = ctx.create_function(Some("f"), &[], this_of(false)).unwrap();
    let this = ctx.call(None, &f, JsValue::Undefined, &[]).unwrap();
    assert!(this.as_object().unwrap().ptr_eq(runtime.global_object()));
}

#[test]
fn test_strict_undefined_this_stays_undefined() {
    let runtime = Runtime::new();
    let mut ctx = runtime.create_global_context();
    let f = ctx.create_function(Some("f"), &[], this_of(true)).unwrap();
    assert_eq!(
        ctx.call(None, &f, JsValue::Undefined, &[]).unwrap(),
        JsValue::Undefined
    );
}

#[test]
fn test_sloppy_primitive_this_is_wrapped() {
    let runtime = Runtime::new();
    let mut ctx = runtime.create_global_context();
    let f = ctx.create_function(Some("f"), &[], this_of(false)).unwrap();
    let this = ctx.call(None, &f, JsValue::from("abc"), &[]).unwrap();
    assert!(this.is_object());
    assert_eq!(own(&this, "length"), Some(JsValue::Number(3.0)));
}

#[test]
fn test_strict_primitive_this_is_unchanged() {
    let runtime = Runtime::new();
    let mut ctx = runtime.create_global_context();
    let f = ctx.create_function(Some("f"), &[], this_of(true)).unwrap();
    assert_eq!(
        ctx.call(None, &f, JsValue::from(7), &[]).unwrap(),
        JsValue::Number(7.0)
    );
}

#[test]
fn test_method_call_binds_base_as_this() {
    let runtime = Runtime::new();
    let mut ctx = runtime.create_global_context();
    let method = ctx.create_function(Some("m"), &[], this_of(true)).unwrap();
    let obj = runtime.realm().new_object();
    obj.borrow_mut()
        .define_property(PropertyKey::from("m"), Property::data(JsValue::Object(method)));

    let reference = ctx.create_property_reference(JsValue::Object(obj.clone()), "m");
    let this = ctx.call_reference(&reference, &[]).unwrap();
    assert!(this.as_object().unwrap().ptr_eq(&obj));
}

#[test]
fn test_calling_non_function_is_type_error() {
    let runtime = Runtime::new();
    let code = body(vec![
        exec(|ctx| set(ctx, "n", JsValue::from(1))),
        expr(|ctx| call(ctx, "n", &[])),
    ])
    .declare_var("n");
    let err = run(&runtime, code).unwrap_err();
    let (kind, message) = thrown_kind(&err);
    assert_eq!(kind, "TypeError");
    assert_eq!(message, "n is not a function");
}

#[test]
fn test_missing_parameters_are_undefined() {
    let runtime = Runtime::new();
    let f = FunctionDeclaration::new("f", &["a", "b"], body(vec![returning(|ctx| get(ctx, "b"))]));
    let code = body(vec![expr(|ctx| call(ctx, "f", &[JsValue::from(1)]))]).declare_function(f);
    assert_eq!(run(&runtime, code).unwrap(), JsValue::Undefined);
}

#[test]
fn test_body_without_return_yields_undefined() {
    let runtime = Runtime::new();
    let f = FunctionDeclaration::new("f", &[], body(vec![expr(|_ctx| Ok(JsValue::from(1)))]));
    let code = body(vec![expr(|ctx| call(ctx, "f", &[]))]).declare_function(f);
    assert_eq!(run(&runtime, code).unwrap(), JsValue::Undefined);
}

#[test]
fn test_closures_share_captured_scope() {
    let runtime = Runtime::new();
    let make_counter = FunctionDeclaration::new(
        "makeCounter",
        &[],
        body(vec![
            exec(|ctx| set(ctx, "count", JsValue::from(0))),
            returning(|ctx| {
                let increment = body(vec![
                    exec(|ctx| {
                        let next = get(ctx, "count")?.to_number() + 1.0;
                        set(ctx, "count", JsValue::Number(next))
                    }),
                    returning(|ctx| get(ctx, "count")),
                ]);
                Ok(JsValue::Object(ctx.create_function(None, &[], increment)?))
            }),
        ])
        .declare_var("count"),
    );
    let code = body(vec![
        exec(|ctx| {
            let counter = call(ctx, "makeCounter", &[])?;
            set(ctx, "counter", counter)
        }),
        exec(|ctx| call(ctx, "counter", &[]).map(|_| ())),
        expr(|ctx| call(ctx, "counter", &[])),
    ])
    .declare_function(make_counter)
    .declare_var("counter");
    assert_eq!(run(&runtime, code).unwrap(), JsValue::Number(2.0));
    assert_eq!(global(&runtime, "count"), JsValue::Undefined);
}

#[test]
fn test_function_prototype_call_forwards_this() {
    let runtime = Runtime::new();
    let mut ctx = runtime.create_global_context();
    let f = ctx
        .create_function(
            Some("f"),
            &["x"],
            body(vec![returning(|ctx| {
                let x = get(ctx, "x")?;
                Ok(JsValue::from(format!(
                    "{}:{}",
                    ctx.this_binding().to_js_string(),
                    x.to_js_string()
                )))
            })])
            .strict(true),
        )
        .unwrap();
    let reference = ctx.create_property_reference(JsValue::Object(f), "call");
    let result = ctx
        .call_reference(&reference, &[JsValue::from("self"), JsValue::from(1)])
        .unwrap();
    assert_eq!(result, JsValue::from("self:1"));
}

#[test]
fn test_host_function_receives_arguments() {
    let runtime = Runtime::new();
    runtime.define_host_function("sum", 2, |_ctx, _this, args| {
        Ok(JsValue::Number(args.iter().map(|a| a.to_number()).sum()))
    });
    let code = body(vec![expr(|ctx| {
        call(ctx, "sum", &[JsValue::from(1), JsValue::from(2), JsValue::from(3)])
    })]);
    assert_eq!(run(&runtime, code).unwrap(), JsValue::Number(6.0));
}

#[test]
fn test_function_properties() {
    let runtime = Runtime::new();
    let mut ctx = runtime.create_global_context();
    let f = JsValue::Object(
        ctx.create_function(Some("area"), &["w", "h"], body(vec![]))
            .unwrap(),
    );
    assert_eq!(own(&f, "length"), Some(JsValue::Number(2.0)));
    assert_eq!(own(&f, "name"), Some(JsValue::from("area")));
    let prototype = own(&f, "prototype").unwrap();
    let constructor = own(&prototype, "constructor").unwrap();
    assert!(constructor.as_object().unwrap().ptr_eq(f.as_object().unwrap()));
}

#[test]
fn test_call_function_by_name_with_json_arguments() {
    let runtime = Runtime::new();
    let add = FunctionDeclaration::new(
        "add",
        &["a", "b"],
        body(vec![returning(|ctx| {
            Ok(JsValue::Number(
                get(ctx, "a")?.to_number() + get(ctx, "b")?.to_number(),
            ))
        })]),
    );
    run(&runtime, body(vec![]).declare_function(add)).unwrap();
    let result = runtime
        .call_function("add", &serde_json::json!([40, 2]))
        .unwrap();
    assert_eq!(result, JsValue::Number(42.0));
}
