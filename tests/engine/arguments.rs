//! The arguments object

use super::*;
use jsrun::FunctionDeclaration;

fn arguments(ctx: &mut ExecutionContext) -> JsValue {
    get(ctx, "arguments").unwrap()
}

/// Runs `f` declared with `params` and `statements`, called with `args`
fn call_with(
    params: &[&str],
    strict: bool,
    statements: Vec<Statement>,
    args: Vec<JsValue>,
) -> Result<JsValue, JsError> {
    let runtime = Runtime::new();
    let f = FunctionDeclaration::new("f", params, body(statements).strict(strict));
    let code = body(vec![expr(move |ctx| call(ctx, "f", &args))]).declare_function(f);
    run(&runtime, code)
}

#[test]
fn test_writing_arguments_updates_parameter() {
    let result = call_with(
        &["a"],
        false,
        vec![
            exec(|ctx| {
                let args = arguments(ctx);
                set_prop(ctx, args, "0", JsValue::from(10))
            }),
            returning(|ctx| get(ctx, "a")),
        ],
        vec![JsValue::from(1)],
    );
    assert_eq!(result.unwrap(), JsValue::Number(10.0));
}

#[test]
fn test_writing_parameter_updates_arguments() {
    let result = call_with(
        &["a"],
        false,
        vec![
            exec(|ctx| set(ctx, "a", JsValue::from(7))),
            returning(|ctx| {
                let args = arguments(ctx);
                get_prop(ctx, args, "0")
            }),
        ],
        vec![JsValue::from(1)],
    );
    assert_eq!(result.unwrap(), JsValue::Number(7.0));
}

#[test]
fn test_length_counts_actual_arguments() {
    let result = call_with(
        &["a"],
        false,
        vec![returning(|ctx| {
            let args = arguments(ctx);
            let length = get_prop(ctx, args.clone(), "length")?;
            let last = get_prop(ctx, args, "2")?;
            Ok(JsValue::Number(length.to_number() * 10.0 + last.to_number()))
        })],
        vec![JsValue::from(1), JsValue::from(2), JsValue::from(3)],
    );
    assert_eq!(result.unwrap(), JsValue::Number(33.0));
}

#[test]
fn test_missing_argument_is_not_mapped() {
    let result = call_with(
        &["a", "b"],
        false,
        vec![
            exec(|ctx| set(ctx, "b", JsValue::from(5))),
            returning(|ctx| {
                let args = arguments(ctx);
                get_prop(ctx, args, "1")
            }),
        ],
        vec![JsValue::from(1)],
    );
    assert_eq!(result.unwrap(), JsValue::Undefined);
}

#[test]
fn test_duplicate_parameter_maps_first_position() {
    let result = call_with(
        &["a", "a"],
        false,
        vec![
            // The later parameter wins the binding
            returning(|ctx| {
                let args = arguments(ctx);
                let first = get_prop(ctx, args.clone(), "0")?;
                assert_eq!(first, JsValue::Number(2.0));

                set_prop(ctx, args.clone(), "1", JsValue::from(9))?;
                assert_eq!(get(ctx, "a")?, JsValue::Number(2.0));

                set_prop(ctx, args, "0", JsValue::from(5))?;
                get(ctx, "a")
            }),
        ],
        vec![JsValue::from(1), JsValue::from(2)],
    );
    assert_eq!(result.unwrap(), JsValue::Number(5.0));
}

#[test]
fn test_deleting_index_unlinks_parameter() {
    let result = call_with(
        &["a"],
        false,
        vec![returning(|ctx| {
            let args = arguments(ctx);
            let reference = ctx.create_property_reference(args.clone(), "0");
            assert!(reference.delete(ctx)?);
            set(ctx, "a", JsValue::from(3))?;
            get_prop(ctx, args, "0")
        })],
        vec![JsValue::from(1)],
    );
    assert_eq!(result.unwrap(), JsValue::Undefined);
}

#[test]
fn test_strict_arguments_are_not_aliased() {
    let result = call_with(
        &["a"],
        true,
        vec![
            exec(|ctx| set(ctx, "a", JsValue::from(2))),
            returning(|ctx| {
                let args = arguments(ctx);
                get_prop(ctx, args, "0")
            }),
        ],
        vec![JsValue::from(1)],
    );
    assert_eq!(result.unwrap(), JsValue::Number(1.0));
}

#[test]
fn test_strict_callee_access_throws() {
    let err = call_with(
        &[],
        true,
        vec![returning(|ctx| {
            let args = arguments(ctx);
            get_prop(ctx, args, "callee")
        })],
        vec![],
    )
    .unwrap_err();
    assert_eq!(thrown_kind(&err).0, "TypeError");
}

#[test]
fn test_strict_arguments_binding_is_immutable() {
    let result = call_with(
        &[],
        true,
        vec![returning(|ctx| {
            let err = set(ctx, "arguments", JsValue::from(1)).unwrap_err();
            Ok(JsValue::from(err.to_string()))
        })],
        vec![],
    );
    let message = result.unwrap().to_js_string().to_string();
    assert!(message.contains("TypeError"), "{}", message);
}

#[test]
fn test_callee_is_the_function() {
    let runtime = Runtime::new();
    let f = FunctionDeclaration::new(
        "f",
        &[],
        body(vec![returning(|ctx| {
            let args = arguments(ctx);
            get_prop(ctx, args, "callee")
        })]),
    );
    let code = body(vec![expr(|ctx| call(ctx, "f", &[]))]).declare_function(f);
    let callee = run(&runtime, code).unwrap();
    let f = global(&runtime, "f");
    assert!(callee.as_object().unwrap().ptr_eq(f.as_object().unwrap()));
}

#[test]
fn test_declared_arguments_parameter_shadows_object() {
    let result = call_with(
        &["arguments"],
        false,
        vec![returning(|ctx| get(ctx, "arguments"))],
        vec![JsValue::from("plain")],
    );
    assert_eq!(result.unwrap(), JsValue::from("plain"));
}
