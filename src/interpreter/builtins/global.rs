//! Global value properties, `eval` and the strict-mode poison accessor

use std::rc::Rc;

use crate::error::JsError;
use crate::interpreter::builtins::{arg, define_global};
use crate::interpreter::context::ExecutionContext;
use crate::interpreter::realm::Realm;
use crate::value::{CheapClone, JsValue, Property};

pub(crate) fn install(realm: &Rc<Realm>) {
    {
        let mut global = realm.global_object().borrow_mut();
        for (name, value) in [
            ("undefined", JsValue::Undefined),
            ("NaN", JsValue::Number(f64::NAN)),
            ("Infinity", JsValue::Number(f64::INFINITY)),
        ] {
            global.define_property(
                realm.key(name),
                Property::with_attributes(value, false, false, false),
            );
        }
    }

    let eval = realm.new_native_function("eval", 1, Rc::new(global_eval));
    define_global(realm, "eval", JsValue::Object(eval));
    define_global(
        realm,
        "__throwTypeError",
        JsValue::Object(realm.throw_type_error().cheap_clone()),
    );
}

/// Poison accessor installed on strict functions and strict arguments objects
pub(crate) fn throw_type_error(
    _ctx: &mut ExecutionContext,
    _this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    Err(JsError::type_error(
        "'caller', 'callee', and 'arguments' properties may not be accessed on strict mode functions or the arguments objects for calls to them",
    ))
}

/// The global `eval` function. Calls through it are always indirect.
fn global_eval(
    ctx: &mut ExecutionContext,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let JsValue::String(source) = arg(args, 0) else {
        return Ok(arg(args, 0));
    };
    let Some(parser) = ctx.realm().parser() else {
        return Err(JsError::syntax_error(
            "eval is unavailable: no source parser installed",
        ));
    };
    let file_name = ctx.config().default_file_name.clone();
    let program = parser.parse(source.as_str(), &file_name)?;
    ctx.eval(&program, false)
}
