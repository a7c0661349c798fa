//! Error constructors

use std::rc::Rc;

use crate::error::{JsError, StackElement};
use crate::interpreter::builtins::{arg, define_global, define_hidden};
use crate::interpreter::context::ExecutionContext;
use crate::interpreter::object_ops;
use crate::interpreter::realm::Realm;
use crate::value::{
    CheapClone, ErrorData, ExoticObject, JsObject, JsObjectRef, JsString, JsValue, ObjectPolicy,
    Property,
};

/// Native error kinds, `Error` first
pub const ERROR_KINDS: [&str; 7] = [
    "Error",
    "TypeError",
    "ReferenceError",
    "RangeError",
    "SyntaxError",
    "URIError",
    "EvalError",
];

/// Initialize Error and all derived error constructors and add them to globals
pub(crate) fn install(realm: &Rc<Realm>) {
    let error_prototype = realm.new_object();
    let to_string = realm.new_native_function("toString", 0, Rc::new(error_to_string));
    define_hidden(realm, &error_prototype, "toString", JsValue::Object(to_string));

    for kind in ERROR_KINDS {
        let prototype = if kind == "Error" {
            error_prototype.cheap_clone()
        } else {
            realm.alloc(JsObject::with_prototype(error_prototype.cheap_clone()))
        };
        define_hidden(realm, &prototype, "name", JsValue::from(kind));
        define_hidden(realm, &prototype, "message", JsValue::from(""));

        let kind_name = realm.intern(kind);
        let ctor = realm.new_native_constructor(
            kind,
            1,
            ObjectPolicy::Error(kind_name.cheap_clone()),
            Rc::new(
                move |ctx: &mut ExecutionContext, this: JsValue, args: &[JsValue]| {
                    error_constructor(ctx, &kind_name, this, args)
                },
            ),
        );
        ctor.borrow_mut().define_property(
            realm.key("prototype"),
            Property::with_attributes(
                JsValue::Object(prototype.cheap_clone()),
                false,
                false,
                false,
            ),
        );
        define_hidden(realm, &prototype, "constructor", JsValue::Object(ctor.cheap_clone()));
        realm.register_prototype(kind, prototype);
        define_global(realm, kind, JsValue::Object(ctor));
    }
}

/// Shared body of every error constructor. Called through `new`, it fills in
/// the object allocated for it; called plainly, it allocates its own.
fn error_constructor(
    ctx: &mut ExecutionContext,
    kind: &JsString,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let message = match arg(args, 0) {
        JsValue::Undefined => None,
        value => Some(value.to_js_string()),
    };
    // The innermost frame is the constructor's own
    let frames: Vec<StackElement> = ctx.collect_stack_elements().into_iter().skip(1).collect();

    if let JsValue::Object(obj) = &this {
        if is_uninitialized_error(obj, kind) {
            initialize_error(ctx.realm(), obj, message, frames);
            return Ok(this);
        }
    }
    let realm = ctx.realm().cheap_clone();
    Ok(JsValue::Object(new_error_object(
        &realm,
        kind.as_str(),
        message,
        frames,
    )))
}

fn is_uninitialized_error(obj: &JsObjectRef, kind: &JsString) -> bool {
    matches!(
        &obj.borrow().exotic,
        ExoticObject::Error(data)
            if &data.kind == kind && data.frames.is_empty() && data.message.is_none()
    )
}

fn initialize_error(
    realm: &Realm,
    obj: &JsObjectRef,
    message: Option<JsString>,
    frames: Vec<StackElement>,
) {
    let mut borrowed = obj.borrow_mut();
    if let Some(message) = &message {
        borrowed.define_property(
            realm.key("message"),
            Property::with_attributes(JsValue::String(message.cheap_clone()), true, false, true),
        );
    }
    if let ExoticObject::Error(data) = &mut borrowed.exotic {
        data.message = message;
        data.frames = frames;
    }
}

/// Error object of the given kind, built without running its constructor
pub(crate) fn new_error_object(
    realm: &Realm,
    kind: &str,
    message: Option<JsString>,
    frames: Vec<StackElement>,
) -> JsObjectRef {
    let prototype = realm
        .prototype_for(kind)
        .unwrap_or_else(|| realm.object_prototype().cheap_clone());
    let obj = realm.alloc(JsObject::with_exotic(
        Some(prototype),
        ExoticObject::Error(ErrorData {
            kind: realm.intern(kind),
            message: None,
            frames: Vec::new(),
            trace_materialized: false,
        }),
    ));
    initialize_error(realm, &obj, message, frames);
    obj
}

/// `Kind: message` followed by one line per frame
pub(crate) fn render_stack(data: &ErrorData) -> String {
    let mut out = match &data.message {
        Some(message) if !message.is_empty() => format!("{}: {}", data.kind, message),
        _ => data.kind.to_string(),
    };
    for frame in &data.frames {
        out.push('\n');
        out.push_str(&frame.to_string());
    }
    out
}

/// Error.prototype.toString
fn error_to_string(
    ctx: &mut ExecutionContext,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let JsValue::Object(obj) = this else {
        return Err(JsError::type_error(
            "Error.prototype.toString called on non-object",
        ));
    };
    let realm = ctx.realm().cheap_clone();
    let name = match object_ops::get(ctx, &obj, &realm.key("name"))? {
        JsValue::Undefined => JsString::from("Error"),
        value => value.to_js_string(),
    };
    let message = match object_ops::get(ctx, &obj, &realm.key("message"))? {
        JsValue::Undefined => JsString::from(""),
        value => value.to_js_string(),
    };
    let text = if message.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        message.to_string()
    } else {
        format!("{}: {}", name, message)
    };
    Ok(JsValue::from(text))
}
