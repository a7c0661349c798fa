//! Object and Function constructors and the prototype methods the engine's
//! callers rely on

use std::rc::Rc;

use crate::error::JsError;
use crate::interpreter::builtins::{arg, define_global, define_hidden};
use crate::interpreter::context::ExecutionContext;
use crate::interpreter::object_ops;
use crate::interpreter::realm::Realm;
use crate::value::{
    CheapClone, ExoticObject, JsObjectRef, JsValue, ObjectPolicy, Property, PropertyDescriptor,
    PropertyKey,
};

type BuiltinFn = fn(&mut ExecutionContext, JsValue, &[JsValue]) -> Result<JsValue, JsError>;

pub(crate) fn install(realm: &Rc<Realm>) {
    let object_prototype = realm.object_prototype().cheap_clone();
    let function_prototype = realm.function_prototype().cheap_clone();

    let object_ctor = realm.new_native_constructor(
        "Object",
        1,
        ObjectPolicy::Ordinary,
        Rc::new(object_constructor),
    );
    object_ctor.borrow_mut().define_property(
        realm.key("prototype"),
        Property::with_attributes(
            JsValue::Object(object_prototype.cheap_clone()),
            false,
            false,
            false,
        ),
    );
    let constructor = JsValue::Object(object_ctor.cheap_clone());
    define_hidden(realm, &object_prototype, "constructor", constructor);

    let statics: [(&str, usize, BuiltinFn); 2] = [
        ("defineProperty", 3, object_define_property),
        ("getPrototypeOf", 1, object_get_prototype_of),
    ];
    for (name, arity, func) in statics {
        let method = realm.new_native_function(name, arity, Rc::new(func));
        define_hidden(realm, &object_ctor, name, JsValue::Object(method));
    }

    let methods: [(&str, usize, BuiltinFn); 2] = [
        ("hasOwnProperty", 1, object_has_own_property),
        ("toString", 0, object_to_string),
    ];
    for (name, arity, func) in methods {
        let method = realm.new_native_function(name, arity, Rc::new(func));
        define_hidden(realm, &object_prototype, name, JsValue::Object(method));
    }
    define_global(realm, "Object", JsValue::Object(object_ctor));

    let function_ctor = realm.new_native_constructor(
        "Function",
        1,
        ObjectPolicy::Ordinary,
        Rc::new(function_constructor),
    );
    function_ctor.borrow_mut().define_property(
        realm.key("prototype"),
        Property::with_attributes(
            JsValue::Object(function_prototype.cheap_clone()),
            false,
            false,
            false,
        ),
    );
    let constructor = JsValue::Object(function_ctor.cheap_clone());
    define_hidden(realm, &function_prototype, "constructor", constructor);
    let call = realm.new_native_function("call", 1, Rc::new(function_call));
    define_hidden(realm, &function_prototype, "call", JsValue::Object(call));
    define_global(realm, "Function", JsValue::Object(function_ctor));
}

fn object_constructor(
    ctx: &mut ExecutionContext,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    match arg(args, 0) {
        JsValue::Undefined | JsValue::Null => Ok(JsValue::Object(ctx.realm().new_object())),
        value => Ok(JsValue::Object(object_ops::to_object(ctx, &value)?)),
    }
}

fn function_constructor(
    _ctx: &mut ExecutionContext,
    _this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    Err(JsError::type_error(
        "Function constructor requires a source compiler",
    ))
}

/// Function.prototype.call
fn function_call(
    ctx: &mut ExecutionContext,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let JsValue::Object(function) = this else {
        return Err(JsError::type_error("Function.prototype.call called on non-function"));
    };
    let rest = args.get(1..).unwrap_or_default();
    ctx.call(None, &function, arg(args, 0), rest)
}

fn require_object(value: &JsValue, method: &str) -> Result<JsObjectRef, JsError> {
    match value {
        JsValue::Object(obj) => Ok(obj.cheap_clone()),
        _ => Err(JsError::type_error(format!(
            "{} called on non-object",
            method
        ))),
    }
}

/// ToPropertyDescriptor
fn to_property_descriptor(
    ctx: &mut ExecutionContext,
    attributes: &JsObjectRef,
) -> Result<PropertyDescriptor, JsError> {
    let realm = ctx.realm().cheap_clone();
    let mut desc = PropertyDescriptor::default();
    let field = |ctx: &mut ExecutionContext, name: &str| -> Result<Option<JsValue>, JsError> {
        let key = realm.key(name);
        if object_ops::has_property(attributes, &key) {
            Ok(Some(object_ops::get(ctx, attributes, &key)?))
        } else {
            Ok(None)
        }
    };

    desc.enumerable = field(ctx, "enumerable")?.map(|v| v.to_boolean());
    desc.configurable = field(ctx, "configurable")?.map(|v| v.to_boolean());
    desc.value = field(ctx, "value")?;
    desc.writable = field(ctx, "writable")?.map(|v| v.to_boolean());
    for (name, slot) in [("get", &mut desc.getter), ("set", &mut desc.setter)] {
        match field(ctx, name)? {
            None => {}
            Some(JsValue::Undefined) => *slot = Some(None),
            Some(JsValue::Object(f)) if f.borrow().is_callable() => *slot = Some(Some(f)),
            Some(_) => {
                return Err(JsError::type_error(format!(
                    "Getter/setter must be a function: {}",
                    name
                )));
            }
        }
    }
    if desc.is_accessor_descriptor() && desc.is_data_descriptor() {
        return Err(JsError::type_error(
            "Invalid property descriptor. Cannot both specify accessors and a value or writable attribute",
        ));
    }
    Ok(desc)
}

/// Object.defineProperty(o, p, attributes)
fn object_define_property(
    ctx: &mut ExecutionContext,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let target = require_object(&arg(args, 0), "Object.defineProperty")?;
    let key = PropertyKey::from_value(&arg(args, 1));
    let attributes = require_object(&arg(args, 2), "Object.defineProperty")?;
    let desc = to_property_descriptor(ctx, &attributes)?;
    object_ops::define_own_property(ctx, &target, key, desc, true)?;
    Ok(JsValue::Object(target))
}

fn object_get_prototype_of(
    _ctx: &mut ExecutionContext,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let target = require_object(&arg(args, 0), "Object.getPrototypeOf")?;
    Ok(target
        .prototype()
        .map(JsValue::Object)
        .unwrap_or(JsValue::Null))
}

fn object_has_own_property(
    ctx: &mut ExecutionContext,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let obj = object_ops::to_object(ctx, &this)?;
    let key = PropertyKey::from_value(&arg(args, 0));
    Ok(JsValue::Boolean(obj.borrow().has_own_property(&key)))
}

fn object_to_string(
    _ctx: &mut ExecutionContext,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let tag = match &this {
        JsValue::Undefined => "Undefined",
        JsValue::Null => "Null",
        JsValue::Boolean(_) => "Boolean",
        JsValue::Number(_) => "Number",
        JsValue::String(_) => "String",
        JsValue::Object(obj) => match &obj.borrow().exotic {
            ExoticObject::Ordinary => "Object",
            ExoticObject::Function(_) => "Function",
            ExoticObject::Arguments { .. } => "Arguments",
            ExoticObject::Error(_) => "Error",
            ExoticObject::Primitive(JsValue::String(_)) => "String",
            ExoticObject::Primitive(JsValue::Number(_)) => "Number",
            ExoticObject::Primitive(JsValue::Boolean(_)) => "Boolean",
            ExoticObject::Primitive(_) => "Object",
        },
    };
    Ok(JsValue::from(format!("[object {}]", tag)))
}
