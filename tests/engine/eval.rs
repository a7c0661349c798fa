//! Direct, indirect and strict eval

use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::*;
use jsrun::{FunctionDeclaration, SourceParser};

/// Parser that knows a fixed set of sources
struct CannedParser {
    programs: FxHashMap<String, Program>,
}

impl SourceParser for CannedParser {
    fn parse(&self, source: &str, _file_name: &str) -> Result<Program, JsError> {
        self.programs
            .get(source)
            .cloned()
            .ok_or_else(|| JsError::syntax_error(format!("Unexpected token in '{}'", source)))
    }
}

fn eval_program(code: Code) -> Program {
    Program::new(code)
}

#[test]
fn test_direct_eval_sees_caller_locals() {
    let runtime = Runtime::new();
    let read_x = eval_program(body(vec![expr(|ctx| get(ctx, "x"))]));
    let f = FunctionDeclaration::new(
        "f",
        &["x"],
        body(vec![returning(move |ctx| ctx.eval(&read_x, true))]),
    );
    let code = body(vec![expr(|ctx| call(ctx, "f", &[JsValue::from("local")]))])
        .declare_function(f);
    assert_eq!(run(&runtime, code).unwrap(), JsValue::from("local"));
}

#[test]
fn test_direct_eval_var_lands_in_caller_scope_and_is_deletable() {
    let runtime = Runtime::new();
    let declare_y = eval_program(
        body(vec![exec(|ctx| set(ctx, "y", JsValue::from(7)))]).declare_var("y"),
    );
    let f = FunctionDeclaration::new(
        "f",
        &[],
        body(vec![
            exec(move |ctx| ctx.eval(&declare_y, true).map(|_| ())),
            returning(|ctx| {
                let y = get(ctx, "y")?;
                let reference = ctx.resolve("y");
                let deleted = reference.delete(ctx)?;
                assert!(deleted);
                assert!(ctx.resolve("y").is_unresolvable());
                Ok(y)
            }),
        ]),
    );
    let code = body(vec![expr(|ctx| call(ctx, "f", &[]))]).declare_function(f);
    assert_eq!(run(&runtime, code).unwrap(), JsValue::Number(7.0));
    assert_eq!(global(&runtime, "y"), JsValue::Undefined);
}

#[test]
fn test_global_eval_declarations_are_configurable() {
    let runtime = Runtime::new();
    let declare = eval_program(body(vec![]).declare_var("fromEval"));
    let code = body(vec![exec(move |ctx| ctx.eval(&declare, true).map(|_| ()))]);
    run(&runtime, code).unwrap();

    let prop = runtime
        .global_object()
        .borrow()
        .get_own_property(&PropertyKey::from("fromEval"))
        .cloned()
        .unwrap();
    assert!(prop.configurable);
}

#[test]
fn test_strict_eval_keeps_vars_local() {
    let runtime = Runtime::new();
    let declare_z = eval_program(
        body(vec![
            exec(|ctx| set(ctx, "z", JsValue::from(1))),
            expr(|ctx| get(ctx, "z")),
        ])
        .declare_var("z")
        .strict(true),
    );
    let code = body(vec![expr(move |ctx| {
        let value = ctx.eval(&declare_z, true)?;
        assert_eq!(value, JsValue::Number(1.0));
        Ok(JsValue::Boolean(ctx.resolve("z").is_unresolvable()))
    })]);
    assert_eq!(run(&runtime, code).unwrap(), JsValue::Boolean(true));
    assert_eq!(global(&runtime, "z"), JsValue::Undefined);
}

#[test]
fn test_direct_eval_in_strict_code_is_strict() {
    let runtime = Runtime::new();
    let declare = eval_program(body(vec![]).declare_var("hidden"));
    let code = body(vec![expr(move |ctx| {
        ctx.eval(&declare, true)?;
        Ok(JsValue::Boolean(ctx.resolve("hidden").is_unresolvable()))
    })])
    .strict(true);
    assert_eq!(run(&runtime, code).unwrap(), JsValue::Boolean(true));
}

#[test]
fn test_indirect_eval_uses_global_scope() {
    let runtime = Runtime::new();
    let read_x = eval_program(body(vec![expr(|ctx| get(ctx, "x"))]));
    let f = FunctionDeclaration::new(
        "f",
        &[],
        body(vec![
            exec(|ctx| set(ctx, "x", JsValue::from("local"))),
            returning(move |ctx| ctx.eval(&read_x, false)),
        ])
        .declare_var("x"),
    );
    let code = body(vec![
        exec(|ctx| set(ctx, "x", JsValue::from("global"))),
        expr(|ctx| call(ctx, "f", &[])),
    ])
    .declare_var("x")
    .declare_function(f);
    assert_eq!(run(&runtime, code).unwrap(), JsValue::from("global"));
}

#[test]
fn test_indirect_eval_this_is_global_object() {
    let runtime = Runtime::new();
    let read_this = eval_program(body(vec![expr(|ctx| Ok(ctx.this_binding().clone()))]));
    let mut ctx = runtime.create_global_context();
    let method = ctx
        .create_function(
            Some("m"),
            &[],
            body(vec![returning(move |ctx| ctx.eval(&read_this, false))]).strict(true),
        )
        .unwrap();
    let receiver = runtime.realm().new_object();
    let this = ctx
        .call(None, &method, JsValue::Object(receiver), &[])
        .unwrap();
    assert!(this.as_object().unwrap().ptr_eq(runtime.global_object()));
}

#[test]
fn test_direct_eval_shares_this() {
    let runtime = Runtime::new();
    let read_this = eval_program(body(vec![expr(|ctx| Ok(ctx.this_binding().clone()))]));
    let mut ctx = runtime.create_global_context();
    let method = ctx
        .create_function(
            Some("m"),
            &[],
            body(vec![returning(move |ctx| ctx.eval(&read_this, true))]).strict(true),
        )
        .unwrap();
    let receiver = runtime.realm().new_object();
    let this = ctx
        .call(None, &method, JsValue::Object(receiver.clone()), &[])
        .unwrap();
    assert!(this.as_object().unwrap().ptr_eq(&receiver));
}

#[test]
fn test_eval_function_declaration_is_visible_to_caller() {
    let runtime = Runtime::new();
    let declare = eval_program(body(vec![]).declare_function(FunctionDeclaration::new(
        "fromEval",
        &[],
        body(vec![returning(|_ctx| Ok(JsValue::from("hi")))]),
    )));
    let code = body(vec![
        exec(move |ctx| ctx.eval(&declare, true).map(|_| ())),
        expr(|ctx| call(ctx, "fromEval", &[])),
    ]);
    assert_eq!(run(&runtime, code).unwrap(), JsValue::from("hi"));
}

#[test]
fn test_global_eval_function_parses_source() {
    let runtime = Runtime::new();
    let mut programs = FxHashMap::default();
    programs.insert(
        "answer".to_string(),
        eval_program(body(vec![expr(|_ctx| Ok(JsValue::from(42)))])),
    );
    runtime.set_parser(Rc::new(CannedParser { programs }));

    let code = body(vec![expr(|ctx| call(ctx, "eval", &[JsValue::from("answer")]))]);
    assert_eq!(run(&runtime, code).unwrap(), JsValue::Number(42.0));
}

#[test]
fn test_global_eval_returns_non_strings_unchanged() {
    let runtime = Runtime::new();
    let code = body(vec![expr(|ctx| call(ctx, "eval", &[JsValue::from(5)]))]);
    assert_eq!(run(&runtime, code).unwrap(), JsValue::Number(5.0));
}

#[test]
fn test_global_eval_without_parser_is_syntax_error() {
    let runtime = Runtime::new();
    let code = body(vec![expr(|ctx| call(ctx, "eval", &[JsValue::from("1 + 1")]))]);
    let err = run(&runtime, code).unwrap_err();
    assert_eq!(thrown_kind(&err).0, "SyntaxError");
}

#[test]
fn test_global_eval_parse_failure_is_catchable() {
    let runtime = Runtime::new();
    runtime.set_parser(Rc::new(CannedParser {
        programs: FxHashMap::default(),
    }));
    let handler = Block::new(vec![expr(|ctx| get(ctx, "e"))]);
    let code = body(vec![Statement::new(move |ctx| {
        match call(ctx, "eval", &[JsValue::from("(")]) {
            Ok(value) => Ok(Completion::normal(value)),
            Err(err) => ctx.execute_catch(&handler, &JsString::from("e"), err),
        }
    })]);
    let error = run(&runtime, code).unwrap();
    let data = error_data(&error);
    assert_eq!(data.kind.as_str(), "SyntaxError");
    assert_eq!(
        data.message.map(|m| m.to_string()),
        Some("Unexpected token in '('".to_string())
    );
}
